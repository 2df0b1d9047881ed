//! Instrument construction errors.

use thiserror::Error;

/// Invalid instrument terms, caught before any pricing happens.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InstrumentError {
    /// Notional is zero, negative or not finite.
    #[error("Notional must be positive and finite, got {0}")]
    InvalidNotional(f64),

    /// Strike or fixed rate is not usable.
    #[error("Invalid strike: {0}")]
    InvalidStrike(f64),

    /// Expiry or maturity must lie in the future.
    #[error("Invalid expiry: {0}")]
    InvalidExpiry(String),

    /// A swap needs at least one payment.
    #[error("Swap term must be at least one year")]
    EmptySchedule,

    /// Index curve name is empty or contains the key separator.
    #[error("Invalid index name: '{0}'")]
    InvalidIndex(String),

    /// Trade identifiers must not be blank.
    #[error("Trade identifier must not be empty")]
    EmptyTradeId,

    /// FX trades need two distinct currencies.
    #[error("Currency pair needs two distinct currencies, got {0}{0}")]
    SameCurrency(String),
}
