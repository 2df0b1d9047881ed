//! # sensi_risk (L4: Application)
//!
//! Bump-and-revalue sensitivities: delta, gamma and cross-gamma of a
//! portfolio by finite differences over perturbed market scenarios.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │               sensi_risk (L4)                │
//! ├──────────────────────────────────────────────┤
//! │  config/       - shift specs, cross-gamma    │
//! │  scenarios/    - rebucketing, generator      │
//! │  valuation/    - driver, failures, cancel    │
//! │  cube/         - dense and sparse NPV cubes  │
//! │  sensitivity/  - extractor, stream, filter,  │
//! │                  aggregation, CSV export     │
//! │  parallel/     - rayon utilities             │
//! └──────────────────────────────────────────────┘
//!          ↓
//! ┌──────────────────────────────────────────────┐
//! │               sensi_core (L1)                │
//! │  market snapshot, views, risk factor keys    │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! ## Flow
//!
//! 1. [`SensitivityConfig`](config::SensitivityConfig) is validated; errors
//!    stop the run before any pricing.
//! 2. [`ScenarioGenerator`](scenarios::ScenarioGenerator) enumerates Base,
//!    then Up/Down per factor, then Cross for filtered pairs.
//! 3. [`ValuationDriver`](valuation::ValuationDriver) prices every trade
//!    under every scenario into an [`NpvCube`](cube::NpvCube).
//! 4. [`SensitivityExtractor`](sensitivity::SensitivityExtractor) turns the
//!    cube into [`SensitivityRecord`](sensitivity::SensitivityRecord)s.
//!
//! [`generate_sensitivities`] runs steps 1 to 3.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod config;
pub mod cube;
pub mod error;
pub mod parallel;
pub mod pipeline;
pub mod scenarios;
pub mod sensitivity;
pub mod valuation;

pub use config::{ConfigError, SensitivityConfig};
pub use error::SensiError;
pub use parallel::{ParallelConfig, DEFAULT_BATCH_SIZE};
pub use pipeline::{generate_sensitivities, Diagnostics, SensitivityReport, SensitivityRun};
pub use sensitivity::{SensitivityExtractor, SensitivityRecord, SensitivityValue};
