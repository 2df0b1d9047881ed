//! Configuration errors.

use std::path::PathBuf;

use sensi_core::market::RiskFactorKind;
use thiserror::Error;

/// A malformed sensitivity configuration.
///
/// Raised by [`SensitivityConfig::validate`](super::SensitivityConfig::validate)
/// before any scenario is generated.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Shift size is zero or not finite.
    #[error("Invalid shift size {size} for {category}: must be finite and non-zero")]
    InvalidShiftSize {
        /// Category of the offending entry
        category: RiskFactorKind,
        /// The configured size
        size: f64,
    },

    /// Entry lists no qualifiers.
    #[error("Shift entry for {0} has no qualifiers")]
    NoQualifiers(RiskFactorKind),

    /// Qualifier is empty or contains the key separator.
    #[error("Invalid qualifier '{qualifier}' for {category}")]
    InvalidQualifier {
        /// Category of the offending entry
        category: RiskFactorKind,
        /// The qualifier
        qualifier: String,
    },

    /// The same category and qualifier are configured twice.
    #[error("Duplicate shift entry for {category}/{qualifier}")]
    DuplicateEntry {
        /// Category
        category: RiskFactorKind,
        /// Qualifier
        qualifier: String,
    },

    /// Tenors configured on a spot category.
    #[error("{0} is a spot category and takes no shift tenors")]
    UnexpectedTenors(RiskFactorKind),

    /// Strikes configured on a category that is not a surface.
    #[error("{0} is not a surface category and takes no shift strikes")]
    UnexpectedStrikes(RiskFactorKind),

    /// Curve or surface category without tenors.
    #[error("{0} needs at least one shift tenor")]
    MissingTenors(RiskFactorKind),

    /// Bucket grid is not strictly increasing.
    #[error("Shift {axis} for {category} must be strictly increasing and finite")]
    UnsortedGrid {
        /// Category
        category: RiskFactorKind,
        /// `"tenors"` or `"strikes"`
        axis: &'static str,
    },

    /// Cross-gamma selector that does not name a known category.
    #[error("Invalid cross-gamma selector '{0}': expected Category or Category/Qualifier")]
    InvalidSelector(String),

    /// TOML syntax or schema error.
    #[error("Failed to parse sensitivity configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config file could not be read.
    #[error("Failed to read {path}: {source}")]
    Io {
        /// File path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}
