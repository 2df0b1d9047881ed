//! Market data error types.

use super::risk_factor::RiskFactorKind;
use thiserror::Error;

/// Market data operation errors.
///
/// # Examples
///
/// ```
/// use sensi_core::market::{MarketDataError, RiskFactorKind};
///
/// let err = MarketDataError::MissingObject {
///     kind: RiskFactorKind::FxSpot,
///     name: "EURUSD".to_string(),
/// };
/// assert_eq!(format!("{}", err), "Missing market object: FxSpot/EURUSD");
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MarketDataError {
    /// No object of that category and name in the market.
    #[error("Missing market object: {kind}/{name}")]
    MissingObject {
        /// Category looked up
        kind: RiskFactorKind,
        /// Name looked up
        name: String,
    },

    /// The object exists but has a different shape than the caller needs.
    #[error("Market object {kind}/{name} is not a {expected}")]
    WrongObjectType {
        /// Category of the object
        kind: RiskFactorKind,
        /// Name of the object
        name: String,
        /// Shape the caller expected
        expected: &'static str,
    },

    /// Not enough points to build the object.
    #[error("Insufficient data: got {got} points, need at least {need}")]
    InsufficientData {
        /// Points supplied
        got: usize,
        /// Points required
        need: usize,
    },

    /// Grid coordinates not strictly increasing.
    #[error("Grid coordinates must be strictly increasing: {0}")]
    UnsortedGrid(String),

    /// Value matrix does not match grid dimensions.
    #[error("Dimension mismatch: expected {expected} values, got {got}")]
    DimensionMismatch {
        /// Expected number of values
        expected: usize,
        /// Supplied number of values
        got: usize,
    },

    /// Quote value is NaN or infinite.
    #[error("Non-finite quote in {0}")]
    NonFiniteValue(String),

    /// Object name cannot be used in a risk factor key.
    #[error("Invalid market object name '{0}': names must be non-empty and must not contain '/'")]
    InvalidName(String),

    /// A shifted quote addresses a node the object does not have.
    #[error("Node {index} out of range for {key} with {nodes} nodes")]
    NodeOutOfRange {
        /// Wire form of the shifted key
        key: String,
        /// Requested node index
        index: usize,
        /// Number of nodes in the object
        nodes: usize,
    },
}
