//! Scenario generation for bump-and-revalue sensitivities.
//!
//! This module provides:
//! - [`rebucket`]: triangular weights mapping bucket shifts onto native nodes
//! - [`ScenarioGenerator`]: the ordered Base / Up / Down / Cross enumeration
//! - [`ScenarioSet`]: scenarios, factors and their index lookups
//!
//! # Examples
//!
//! ```
//! use sensi_core::market::{MarketSnapshot, RiskFactorKind};
//! use sensi_core::types::Tenor;
//! use sensi_risk::config::{SensitivityConfig, ShiftEntry, ShiftSpec};
//! use sensi_risk::scenarios::{ScenarioGenerator, ScenarioType};
//!
//! let market = MarketSnapshot::new()
//!     .with_curve(
//!         RiskFactorKind::DiscountCurve,
//!         "EUR",
//!         &[(Tenor::years(1), 0.01), (Tenor::years(5), 0.02)],
//!     )
//!     .unwrap();
//! let config = SensitivityConfig::new().with_shift(ShiftEntry::new(
//!     RiskFactorKind::DiscountCurve,
//!     ["EUR"],
//!     ShiftSpec::absolute(1e-4).with_tenors(vec![Tenor::years(1), Tenor::years(5)]),
//! ));
//!
//! let set = ScenarioGenerator::new(&config).unwrap().generate(&market);
//! let factor = &set.factors()[1];
//! assert_eq!(factor.key.to_string(), "DiscountCurve/EUR/1/5Y");
//! assert_eq!(set.get(factor.up).unwrap().descriptor().scenario_type(), ScenarioType::Up);
//! ```

mod generator;
pub mod rebucket;
mod scenario;

pub use generator::ScenarioGenerator;
pub use rebucket::{surface_weight, triangular_weight, triangular_weights, BUCKET_TOLERANCE};
pub use scenario::{
    CrossPair, FactorInfo, Scenario, ScenarioDescriptor, ScenarioSet, ScenarioType,
    SkippedFactor, BASE_SCENARIO,
};
