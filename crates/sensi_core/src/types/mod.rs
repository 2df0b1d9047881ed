//! Core financial value types.
//!
//! This module provides:
//! - `currency`: ISO 4217 currency codes with metadata
//! - `tenor`: Tenor labels such as `3M` or `10Y` with year-fraction conversion
//! - `error`: Structured error types for currency, tenor and pricing operations

pub mod currency;
pub mod error;
pub mod tenor;

pub use currency::Currency;
pub use error::{CurrencyError, PricingError, TenorError};
pub use tenor::{Tenor, TenorUnit};
