//! Cross-gamma pair selection.
//!
//! Cross-gamma scenarios grow quadratically with the number of factors, so
//! they are generated only for pairs of factors whose categories (optionally
//! narrowed to a qualifier) are listed in the filter. Every other pair has a
//! cross-gamma of exactly zero by convention.

use std::fmt;
use std::str::FromStr;

use sensi_core::market::{RiskFactorKey, RiskFactorKind, KEY_SEPARATOR};

use super::error::ConfigError;

/// Matches factors by category, and optionally by qualifier.
///
/// Written as `"Category"` or `"Category/Qualifier"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FactorSelector {
    kind: RiskFactorKind,
    qualifier: Option<String>,
}

impl FactorSelector {
    /// Selects every factor of a category.
    pub fn category(kind: RiskFactorKind) -> Self {
        Self {
            kind,
            qualifier: None,
        }
    }

    /// Selects the factors of one market object.
    pub fn qualified(kind: RiskFactorKind, qualifier: impl Into<String>) -> Self {
        Self {
            kind,
            qualifier: Some(qualifier.into()),
        }
    }

    /// Returns true if `factor` is selected.
    pub fn matches(&self, factor: &RiskFactorKey) -> bool {
        factor.kind() == self.kind
            && self
                .qualifier
                .as_deref()
                .map_or(true, |q| q == factor.qualifier())
    }
}

impl fmt::Display for FactorSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.qualifier {
            Some(q) => write!(f, "{}{}{}", self.kind, KEY_SEPARATOR, q),
            None => write!(f, "{}", self.kind),
        }
    }
}

impl FromStr for FactorSelector {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || ConfigError::InvalidSelector(s.to_string());
        match s.split_once(KEY_SEPARATOR) {
            None => Ok(Self::category(s.parse().map_err(|_| invalid())?)),
            Some((kind, qualifier)) => {
                if qualifier.is_empty() || qualifier.contains(KEY_SEPARATOR) {
                    return Err(invalid());
                }
                Ok(Self::qualified(kind.parse().map_err(|_| invalid())?, qualifier))
            }
        }
    }
}

/// Unordered pairs of selectors for which cross scenarios are generated.
///
/// # Examples
///
/// ```
/// use sensi_core::market::{RiskFactorKey, RiskFactorKind};
/// use sensi_risk::config::CrossGammaFilter;
///
/// let filter = CrossGammaFilter::from_pairs(&[("DiscountCurve/EUR", "FxSpot")]).unwrap();
/// let rate = RiskFactorKey::new(RiskFactorKind::DiscountCurve, "EUR", 2, "5Y");
/// let spot = RiskFactorKey::new(RiskFactorKind::FxSpot, "EURUSD", 0, "spot");
/// assert!(filter.allows(&spot, &rate));
/// assert!(!filter.allows(&rate, &rate));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CrossGammaFilter {
    pairs: Vec<(FactorSelector, FactorSelector)>,
}

impl CrossGammaFilter {
    /// Filter that allows no pair.
    pub fn none() -> Self {
        Self::default()
    }

    /// Builds a filter from selector strings.
    pub fn from_pairs<A, B>(pairs: &[(A, B)]) -> Result<Self, ConfigError>
    where
        A: AsRef<str>,
        B: AsRef<str>,
    {
        let mut filter = Self::none();
        for (a, b) in pairs {
            filter = filter.with_pair(a.as_ref().parse()?, b.as_ref().parse()?);
        }
        Ok(filter)
    }

    /// Adds a pair of selectors.
    pub fn with_pair(mut self, a: FactorSelector, b: FactorSelector) -> Self {
        // Stored in canonical order so duplicates collapse
        let pair = if a <= b { (a, b) } else { (b, a) };
        if !self.pairs.contains(&pair) {
            self.pairs.push(pair);
        }
        self
    }

    /// Number of selector pairs.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Returns true if no pair is configured.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Returns true if a cross scenario should be generated for `f1`, `f2`.
    ///
    /// Symmetric in its arguments; a factor is never paired with itself.
    pub fn allows(&self, f1: &RiskFactorKey, f2: &RiskFactorKey) -> bool {
        if f1 == f2 {
            return false;
        }
        self.pairs.iter().any(|(a, b)| {
            (a.matches(f1) && b.matches(f2)) || (a.matches(f2) && b.matches(f1))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(kind: RiskFactorKind, q: &str, i: usize) -> RiskFactorKey {
        RiskFactorKey::new(kind, q, i, format!("{}Y", i + 1))
    }

    #[test]
    fn test_selector_parse_and_display() {
        let s: FactorSelector = "DiscountCurve/EUR".parse().unwrap();
        assert_eq!(s, FactorSelector::qualified(RiskFactorKind::DiscountCurve, "EUR"));
        assert_eq!(s.to_string(), "DiscountCurve/EUR");
        let s: FactorSelector = " FxSpot ".parse().unwrap();
        assert_eq!(s, FactorSelector::category(RiskFactorKind::FxSpot));
    }

    #[test]
    fn test_selector_parse_errors() {
        for bad in ["Bogus", "DiscountCurve/", "DiscountCurve/EUR/1", ""] {
            assert!(matches!(
                bad.parse::<FactorSelector>(),
                Err(ConfigError::InvalidSelector(_))
            ));
        }
    }

    #[test]
    fn test_allows_is_symmetric() {
        let filter = CrossGammaFilter::none().with_pair(
            FactorSelector::category(RiskFactorKind::IndexCurve),
            FactorSelector::qualified(RiskFactorKind::DiscountCurve, "EUR"),
        );
        let a = key(RiskFactorKind::DiscountCurve, "EUR", 0);
        let b = key(RiskFactorKind::IndexCurve, "EURIBOR", 3);
        let c = key(RiskFactorKind::DiscountCurve, "USD", 0);
        assert!(filter.allows(&a, &b));
        assert!(filter.allows(&b, &a));
        assert!(!filter.allows(&c, &b));
    }

    #[test]
    fn test_same_category_pairs_exclude_self() {
        let filter = CrossGammaFilter::from_pairs(&[("DiscountCurve", "DiscountCurve")]).unwrap();
        let a = key(RiskFactorKind::DiscountCurve, "EUR", 0);
        let b = key(RiskFactorKind::DiscountCurve, "EUR", 1);
        assert!(filter.allows(&a, &b));
        assert!(!filter.allows(&a, &a));
    }

    #[test]
    fn test_duplicate_pairs_collapse() {
        let filter =
            CrossGammaFilter::from_pairs(&[("FxSpot", "DiscountCurve"), ("DiscountCurve", "FxSpot")])
                .unwrap();
        assert_eq!(filter.len(), 1);
    }
}
