//! Sensitivity run configuration.
//!
//! A [`SensitivityConfig`] lists the shifted categories with their
//! [`ShiftSpec`] and the [`CrossGammaFilter`] pairs. It is loaded from TOML:
//!
//! ```toml
//! cross_gamma = [["DiscountCurve/EUR", "IndexCurve"]]
//!
//! [[shifts]]
//! category = "DiscountCurve"
//! qualifiers = ["EUR"]
//! shift_type = "Absolute"
//! shift_size = 0.00001
//! shift_tenors = ["1Y", "2Y", "5Y", "10Y"]
//!
//! [[shifts]]
//! category = "FxSpot"
//! qualifiers = ["EURUSD"]
//! shift_type = "Relative"
//! shift_size = 0.001
//! compute_gamma = false
//! ```
//!
//! Validation is fail-fast and happens before any scenario is generated.

mod cross_gamma;
mod error;
mod shift;

pub use cross_gamma::{CrossGammaFilter, FactorSelector};
pub use error::ConfigError;
pub use shift::{ShiftEntry, ShiftSpec, ShiftType};

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Shift entries plus cross-gamma pairs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SensitivityConfig {
    /// Shifted categories, in generation order
    #[serde(default)]
    pub shifts: Vec<ShiftEntry>,
    /// Cross-gamma selector pairs
    #[serde(default)]
    pub cross_gamma: Vec<(String, String)>,
}

impl SensitivityConfig {
    /// Creates an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a shift entry.
    pub fn with_shift(mut self, entry: ShiftEntry) -> Self {
        self.shifts.push(entry);
        self
    }

    /// Adds a cross-gamma pair of selectors.
    pub fn with_cross_gamma(mut self, a: impl Into<String>, b: impl Into<String>) -> Self {
        self.cross_gamma.push((a.into(), b.into()));
        self
    }

    /// Parses and validates a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Checks every entry and the cross-gamma selectors.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = BTreeSet::new();
        for entry in &self.shifts {
            entry.validate()?;
            for qualifier in &entry.qualifiers {
                if !seen.insert((entry.category, qualifier.as_str())) {
                    return Err(ConfigError::DuplicateEntry {
                        category: entry.category,
                        qualifier: qualifier.clone(),
                    });
                }
            }
        }
        self.cross_gamma_filter()?;
        Ok(())
    }

    /// Builds the cross-gamma filter from the configured selector pairs.
    pub fn cross_gamma_filter(&self) -> Result<CrossGammaFilter, ConfigError> {
        CrossGammaFilter::from_pairs(&self.cross_gamma)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sensi_core::market::RiskFactorKind;
    use sensi_core::types::Tenor;

    const CONFIG: &str = r#"
cross_gamma = [["DiscountCurve/EUR", "IndexCurve"]]

[[shifts]]
category = "DiscountCurve"
qualifiers = ["EUR"]
shift_type = "Absolute"
shift_size = 0.00001
shift_tenors = ["1Y", "2Y", "5Y", "10Y"]

[[shifts]]
category = "FxVolatility"
qualifiers = ["EURUSD"]
shift_type = "Absolute"
shift_size = 0.001
shift_tenors = ["6M", "1Y"]
shift_strikes = [1.0, 1.2]

[[shifts]]
category = "FxSpot"
qualifiers = ["EURUSD"]
shift_type = "Relative"
shift_size = 0.001
compute_gamma = false
"#;

    #[test]
    fn test_from_toml_str() {
        let config = SensitivityConfig::from_toml_str(CONFIG).unwrap();
        assert_eq!(config.shifts.len(), 3);

        let curve = &config.shifts[0];
        assert_eq!(curve.category, RiskFactorKind::DiscountCurve);
        assert_eq!(curve.spec.shift_tenors[3], Tenor::years(10));
        assert!(curve.spec.compute_gamma);

        let vol = &config.shifts[1];
        assert_eq!(vol.spec.shift_strikes, vec![1.0, 1.2]);

        let spot = &config.shifts[2];
        assert_eq!(spot.spec.shift_type, ShiftType::Relative);
        assert!(!spot.spec.compute_gamma);

        assert_eq!(config.cross_gamma_filter().unwrap().len(), 1);
    }

    #[test]
    fn test_zero_shift_fails_before_generation() {
        let text = CONFIG.replace("shift_size = 0.00001", "shift_size = 0.0");
        assert!(matches!(
            SensitivityConfig::from_toml_str(&text),
            Err(ConfigError::InvalidShiftSize { .. })
        ));
    }

    #[test]
    fn test_unknown_shift_type_is_parse_error() {
        let text = CONFIG.replace("\"Relative\"", "\"Logarithmic\"");
        assert!(matches!(
            SensitivityConfig::from_toml_str(&text),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_duplicate_entry_rejected() {
        let config = SensitivityConfig::new()
            .with_shift(ShiftEntry::new(
                RiskFactorKind::FxSpot,
                ["EURUSD"],
                ShiftSpec::absolute(1e-4),
            ))
            .with_shift(ShiftEntry::new(
                RiskFactorKind::FxSpot,
                ["GBPUSD", "EURUSD"],
                ShiftSpec::relative(1e-3),
            ));
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DuplicateEntry { .. })
        ));
    }

    #[test]
    fn test_bad_cross_gamma_selector_rejected() {
        let config = SensitivityConfig::new().with_cross_gamma("DiscountCurve", "Nonsense");
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidSelector(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            SensitivityConfig::from_file("/nonexistent/sensitivity.toml"),
            Err(ConfigError::Io { .. })
        ));
    }
}
