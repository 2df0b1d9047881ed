//! # sensi_core: Foundation types for bump-and-revalue sensitivities
//!
//! ## Layer 1 (Foundation) Role
//!
//! sensi_core is the bottom layer of the sensitivity workspace, providing:
//! - Currency and tenor types (`types`)
//! - Risk factor identification and its string wire form (`market::risk_factor`)
//! - Immutable market snapshots and per-scenario market views (`market`)
//! - The pricing boundary consumed by the valuation driver (`traits`)
//!
//! ## Value-based scenario application
//!
//! A [`market::MarketSnapshot`] is never mutated once built. Applying a
//! scenario produces a fresh [`market::MarketView`] that borrows the snapshot
//! and owns patched copies of the few objects the scenario touches, so
//! independent scenarios can be priced on different threads.
//!
//! ## Usage Examples
//!
//! ```rust
//! use sensi_core::market::{MarketSnapshot, RiskFactorKey, RiskFactorKind};
//! use sensi_core::types::Tenor;
//!
//! let market = MarketSnapshot::new()
//!     .with_curve(
//!         RiskFactorKind::DiscountCurve,
//!         "EUR",
//!         &[(Tenor::years(1), 0.02), (Tenor::years(5), 0.025)],
//!     )
//!     .unwrap();
//!
//! let view = market.view();
//! let df = view.discount_factor("EUR", 1.0).unwrap();
//! assert!((df - (-0.02_f64).exp()).abs() < 1e-12);
//!
//! let key: RiskFactorKey = "DiscountCurve/EUR/1/5Y".parse().unwrap();
//! assert_eq!(key.to_string(), "DiscountCurve/EUR/1/5Y");
//! ```
//!
//! ## Feature Flags
//!
//! - `serde` (default): Enable serialisation for currencies, tenors, keys and market data

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod market;
pub mod traits;
pub mod types;
