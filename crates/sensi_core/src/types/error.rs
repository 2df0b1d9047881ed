//! Error types for structured error handling.
//!
//! This module provides:
//! - `CurrencyError`: Errors from currency parsing
//! - `TenorError`: Errors from tenor parsing
//! - `PricingError`: Errors reported by a pricer for one trade under one market

use crate::market::MarketDataError;
use thiserror::Error;

/// Currency-related errors.
///
/// # Examples
/// ```
/// use sensi_core::types::CurrencyError;
///
/// let err = CurrencyError::UnknownCurrency("XYZ".to_string());
/// assert_eq!(format!("{}", err), "Unknown currency: XYZ");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CurrencyError {
    /// Unknown currency code.
    #[error("Unknown currency: {0}")]
    UnknownCurrency(String),
}

/// Tenor parsing errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TenorError {
    /// The string is empty or has no numeric part.
    #[error("Invalid tenor: '{0}'")]
    Invalid(String),

    /// Unit suffix other than D, W, M or Y.
    #[error("Unknown tenor unit '{unit}' in '{input}'")]
    UnknownUnit {
        /// The offending unit character
        unit: char,
        /// The full input string
        input: String,
    },
}

/// Categorised pricing errors.
///
/// A pricing error never aborts a run: the valuation driver records it against
/// the (trade, scenario) cell and every sensitivity depending on that cell is
/// reported as unavailable.
///
/// # Examples
/// ```
/// use sensi_core::types::PricingError;
///
/// let err = PricingError::InvalidInput("Negative notional".to_string());
/// assert_eq!(format!("{}", err), "Invalid input: Negative notional");
/// ```
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PricingError {
    /// Invalid trade data or parameters.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Required market data is missing or unusable.
    #[error("Market data error: {0}")]
    MarketData(#[from] MarketDataError),

    /// Numerical instability during computation.
    #[error("Numerical instability: {0}")]
    NumericalInstability(String),

    /// Model failed to produce a valid result.
    #[error("Model failure: {0}")]
    ModelFailure(String),
}
