//! Shift policies per risk factor category.

use sensi_core::market::{RiskFactorKind, ShiftGeometry, KEY_SEPARATOR};
use sensi_core::types::Tenor;
use serde::{Deserialize, Serialize};

use super::error::ConfigError;

/// How a shift size perturbs a quote.
///
/// # Variants
/// - `Absolute`: `v' = v + w * s`
/// - `Relative`: `v' = v * (1 + w * s)`, so a negative size shrinks the quote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShiftType {
    /// Additive shift.
    Absolute,
    /// Multiplicative shift.
    Relative,
}

impl ShiftType {
    /// Applies a shift of `size` scaled by the triangular `weight`.
    #[inline]
    pub fn apply(&self, value: f64, size: f64, weight: f64) -> f64 {
        match self {
            ShiftType::Absolute => value + weight * size,
            ShiftType::Relative => value * (1.0 + weight * size),
        }
    }

    /// Absolute perturbation a shift of `size` causes on a quote worth `base`.
    #[inline]
    pub fn absolute_size(&self, size: f64, base: f64) -> f64 {
        match self {
            ShiftType::Absolute => size,
            ShiftType::Relative => size * base,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Shift policy: type, size and bucket grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShiftSpec {
    /// Absolute or relative
    pub shift_type: ShiftType,
    /// Shift size (a rate for absolute shifts, a fraction for relative ones)
    pub shift_size: f64,
    /// Bucket tenors for curves and surface expiries
    #[serde(default)]
    pub shift_tenors: Vec<Tenor>,
    /// Bucket strikes for surfaces; empty shifts the whole smile
    #[serde(default)]
    pub shift_strikes: Vec<f64>,
    /// Generate a Down scenario per factor so gamma can be extracted
    #[serde(default = "default_true")]
    pub compute_gamma: bool,
}

impl ShiftSpec {
    /// Absolute shift without buckets, for spot categories.
    pub fn absolute(size: f64) -> Self {
        Self {
            shift_type: ShiftType::Absolute,
            shift_size: size,
            shift_tenors: Vec::new(),
            shift_strikes: Vec::new(),
            compute_gamma: true,
        }
    }

    /// Relative shift without buckets, for spot categories.
    pub fn relative(size: f64) -> Self {
        Self {
            shift_type: ShiftType::Relative,
            ..Self::absolute(size)
        }
    }

    /// Sets the bucket tenors.
    pub fn with_tenors(mut self, tenors: Vec<Tenor>) -> Self {
        self.shift_tenors = tenors;
        self
    }

    /// Sets the bucket strikes.
    pub fn with_strikes(mut self, strikes: Vec<f64>) -> Self {
        self.shift_strikes = strikes;
        self
    }

    /// Enables or disables Down scenarios.
    pub fn with_gamma(mut self, compute_gamma: bool) -> Self {
        self.compute_gamma = compute_gamma;
        self
    }

    pub(crate) fn validate(&self, category: RiskFactorKind) -> Result<(), ConfigError> {
        if !self.shift_size.is_finite() || self.shift_size == 0.0 {
            return Err(ConfigError::InvalidShiftSize {
                category,
                size: self.shift_size,
            });
        }
        let geometry = category.geometry();
        match geometry {
            ShiftGeometry::Scalar if !self.shift_tenors.is_empty() => {
                return Err(ConfigError::UnexpectedTenors(category));
            }
            ShiftGeometry::Curve | ShiftGeometry::Surface if self.shift_tenors.is_empty() => {
                return Err(ConfigError::MissingTenors(category));
            }
            _ => {}
        }
        if geometry != ShiftGeometry::Surface && !self.shift_strikes.is_empty() {
            return Err(ConfigError::UnexpectedStrikes(category));
        }
        let times: Vec<f64> = self.shift_tenors.iter().map(Tenor::as_years).collect();
        if !strictly_increasing(&times) {
            return Err(ConfigError::UnsortedGrid {
                category,
                axis: "tenors",
            });
        }
        if !strictly_increasing(&self.shift_strikes) {
            return Err(ConfigError::UnsortedGrid {
                category,
                axis: "strikes",
            });
        }
        Ok(())
    }
}

fn strictly_increasing(xs: &[f64]) -> bool {
    xs.iter().all(|x| x.is_finite()) && xs.windows(2).all(|w| w[0] < w[1])
}

/// One configured category with the qualifiers it applies to.
///
/// In TOML:
///
/// ```toml
/// [[shifts]]
/// category = "DiscountCurve"
/// qualifiers = ["EUR", "USD"]
/// shift_type = "Absolute"
/// shift_size = 0.0001
/// shift_tenors = ["1Y", "2Y", "5Y", "10Y"]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShiftEntry {
    /// Risk factor category
    pub category: RiskFactorKind,
    /// Curve names, currency pairs or tickers
    pub qualifiers: Vec<String>,
    /// Shift policy
    #[serde(flatten)]
    pub spec: ShiftSpec,
}

impl ShiftEntry {
    /// Creates an entry.
    pub fn new<I, S>(category: RiskFactorKind, qualifiers: I, spec: ShiftSpec) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            category,
            qualifiers: qualifiers.into_iter().map(Into::into).collect(),
            spec,
        }
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.qualifiers.is_empty() {
            return Err(ConfigError::NoQualifiers(self.category));
        }
        for qualifier in &self.qualifiers {
            if qualifier.is_empty() || qualifier.contains(KEY_SEPARATOR) {
                return Err(ConfigError::InvalidQualifier {
                    category: self.category,
                    qualifier: qualifier.clone(),
                });
            }
        }
        self.spec.validate(self.category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shift_type_apply() {
        assert!((ShiftType::Absolute.apply(0.02, 0.0001, 1.0) - 0.0201).abs() < 1e-15);
        assert!((ShiftType::Relative.apply(1.10, 0.01, 0.5) - 1.10 * 1.005).abs() < 1e-15);
        // A negative relative size shrinks the quote
        assert!(ShiftType::Relative.apply(2.0, -0.5, 1.0) < 2.0);
    }

    #[test]
    fn test_absolute_size() {
        assert_eq!(ShiftType::Absolute.absolute_size(1e-4, 0.03), 1e-4);
        assert!((ShiftType::Relative.absolute_size(0.01, 1.2) - 0.012).abs() < 1e-15);
    }

    #[test]
    fn test_validate_rejects_zero_size() {
        let spec = ShiftSpec::absolute(0.0);
        assert!(matches!(
            spec.validate(RiskFactorKind::FxSpot),
            Err(ConfigError::InvalidShiftSize { .. })
        ));
    }

    #[test]
    fn test_validate_accepts_negative_relative_size() {
        assert!(ShiftSpec::relative(-0.01).validate(RiskFactorKind::FxSpot).is_ok());
    }

    #[test]
    fn test_validate_geometry_rules() {
        let tenors = vec![Tenor::years(1), Tenor::years(5)];
        assert!(matches!(
            ShiftSpec::absolute(1e-4)
                .with_tenors(tenors.clone())
                .validate(RiskFactorKind::FxSpot),
            Err(ConfigError::UnexpectedTenors(_))
        ));
        assert!(matches!(
            ShiftSpec::absolute(1e-4).validate(RiskFactorKind::DiscountCurve),
            Err(ConfigError::MissingTenors(_))
        ));
        assert!(matches!(
            ShiftSpec::absolute(1e-4)
                .with_tenors(tenors.clone())
                .with_strikes(vec![1.0])
                .validate(RiskFactorKind::IndexCurve),
            Err(ConfigError::UnexpectedStrikes(_))
        ));
        assert!(ShiftSpec::absolute(1e-4)
            .with_tenors(tenors)
            .with_strikes(vec![0.9, 1.1])
            .validate(RiskFactorKind::FxVolatility)
            .is_ok());
    }

    #[test]
    fn test_validate_rejects_unsorted_tenors() {
        let spec = ShiftSpec::absolute(1e-4).with_tenors(vec![Tenor::years(5), Tenor::months(60)]);
        assert!(matches!(
            spec.validate(RiskFactorKind::DiscountCurve),
            Err(ConfigError::UnsortedGrid { axis: "tenors", .. })
        ));
    }

    #[test]
    fn test_entry_rejects_bad_qualifiers() {
        let entry = ShiftEntry::new(RiskFactorKind::FxSpot, Vec::<String>::new(), ShiftSpec::absolute(1e-4));
        assert!(matches!(entry.validate(), Err(ConfigError::NoQualifiers(_))));

        let entry = ShiftEntry::new(RiskFactorKind::FxSpot, ["EUR/USD"], ShiftSpec::absolute(1e-4));
        assert!(matches!(entry.validate(), Err(ConfigError::InvalidQualifier { .. })));
    }
}
