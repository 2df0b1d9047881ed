//! Priceable market views.

use std::collections::BTreeMap;

use super::error::MarketDataError;
use super::object::MarketObject;
use super::risk_factor::RiskFactorKind;
use super::snapshot::{MarketSnapshot, QuoteMap};

/// The market a pricer sees: a base snapshot plus patched copies of the
/// objects a scenario shifts.
///
/// A view is built per scenario and owned by whoever prices under it.
/// Nothing in it is shared mutably, so views for different scenarios can
/// live on different threads at the same time.
#[derive(Debug, Clone)]
pub struct MarketView<'a> {
    base: &'a MarketSnapshot,
    patched: BTreeMap<RiskFactorKind, BTreeMap<String, MarketObject>>,
}

impl<'a> MarketView<'a> {
    pub(crate) fn base(base: &'a MarketSnapshot) -> Self {
        Self {
            base,
            patched: BTreeMap::new(),
        }
    }

    pub(crate) fn with_overlay(
        base: &'a MarketSnapshot,
        overlay: &QuoteMap,
    ) -> Result<Self, MarketDataError> {
        let mut patched: BTreeMap<RiskFactorKind, BTreeMap<String, MarketObject>> =
            BTreeMap::new();
        for (key, &value) in overlay {
            if !value.is_finite() {
                return Err(MarketDataError::NonFiniteValue(key.to_string()));
            }
            let by_name = patched.entry(key.kind()).or_default();
            if !by_name.contains_key(key.qualifier()) {
                let original = base.object(key.kind(), key.qualifier()).ok_or_else(|| {
                    MarketDataError::MissingObject {
                        kind: key.kind(),
                        name: key.qualifier().to_string(),
                    }
                })?;
                by_name.insert(key.qualifier().to_string(), original.clone());
            }
            if let Some(object) = by_name.get_mut(key.qualifier()) {
                if !object.set_node(key.index(), value) {
                    return Err(MarketDataError::NodeOutOfRange {
                        key: key.to_string(),
                        index: key.index(),
                        nodes: object.node_count(),
                    });
                }
            }
        }
        Ok(Self { base, patched })
    }

    /// Returns true if no quote differs from the base snapshot.
    pub fn is_base(&self) -> bool {
        self.patched.is_empty()
    }

    /// The underlying base snapshot.
    pub fn snapshot(&self) -> &'a MarketSnapshot {
        self.base
    }

    /// Looks up an object, preferring the shifted copy.
    pub fn object(&self, kind: RiskFactorKind, name: &str) -> Result<&MarketObject, MarketDataError> {
        self.patched
            .get(&kind)
            .and_then(|m| m.get(name))
            .or_else(|| self.base.object(kind, name))
            .ok_or_else(|| MarketDataError::MissingObject {
                kind,
                name: name.to_string(),
            })
    }

    /// Continuously compounded zero rate of a curve at time `t`.
    pub fn zero_rate(&self, kind: RiskFactorKind, name: &str, t: f64) -> Result<f64, MarketDataError> {
        match self.object(kind, name)? {
            MarketObject::Curve(curve) => Ok(curve.value_at(t)),
            _ => Err(MarketDataError::WrongObjectType {
                kind,
                name: name.to_string(),
                expected: "curve",
            }),
        }
    }

    /// Discount factor `exp(-z(t) * t)` from any curve category.
    pub fn curve_discount(
        &self,
        kind: RiskFactorKind,
        name: &str,
        t: f64,
    ) -> Result<f64, MarketDataError> {
        let z = self.zero_rate(kind, name, t)?;
        Ok((-z * t).exp())
    }

    /// Discount factor from the discount curve of `currency`.
    pub fn discount_factor(&self, currency: &str, t: f64) -> Result<f64, MarketDataError> {
        self.curve_discount(RiskFactorKind::DiscountCurve, currency, t)
    }

    /// Scalar quote (FX or equity spot).
    pub fn spot(&self, kind: RiskFactorKind, name: &str) -> Result<f64, MarketDataError> {
        match self.object(kind, name)? {
            MarketObject::Scalar(v) => Ok(*v),
            _ => Err(MarketDataError::WrongObjectType {
                kind,
                name: name.to_string(),
                expected: "scalar",
            }),
        }
    }

    /// Volatility at `(expiry, strike)` from a surface.
    pub fn volatility(
        &self,
        kind: RiskFactorKind,
        name: &str,
        expiry: f64,
        strike: f64,
    ) -> Result<f64, MarketDataError> {
        match self.object(kind, name)? {
            MarketObject::Surface(surface) => Ok(surface.value_at(expiry, strike)),
            _ => Err(MarketDataError::WrongObjectType {
                kind,
                name: name.to_string(),
                expected: "surface",
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::RiskFactorKey;
    use crate::types::Tenor;
    use approx::assert_relative_eq;

    fn market() -> MarketSnapshot {
        MarketSnapshot::new()
            .with_curve(
                RiskFactorKind::DiscountCurve,
                "EUR",
                &[(Tenor::years(1), 0.01), (Tenor::years(5), 0.02)],
            )
            .unwrap()
            .with_spot(RiskFactorKind::FxSpot, "EURUSD", 1.1)
            .unwrap()
    }

    #[test]
    fn test_base_view() {
        let m = market();
        let view = m.view();
        assert!(view.is_base());
        assert_relative_eq!(view.discount_factor("EUR", 1.0).unwrap(), (-0.01_f64).exp());
        assert_eq!(view.spot(RiskFactorKind::FxSpot, "EURUSD").unwrap(), 1.1);
    }

    #[test]
    fn test_overlay_does_not_touch_base() {
        let m = market();
        let mut overlay = QuoteMap::new();
        overlay.insert(
            RiskFactorKey::new(RiskFactorKind::DiscountCurve, "EUR", 1, "5Y"),
            0.03,
        );
        let shifted = m.apply(&overlay).unwrap();
        assert!(!shifted.is_base());
        assert_eq!(
            shifted.zero_rate(RiskFactorKind::DiscountCurve, "EUR", 5.0).unwrap(),
            0.03
        );
        // Unshifted objects and the snapshot are untouched
        assert_eq!(m.view().zero_rate(RiskFactorKind::DiscountCurve, "EUR", 5.0).unwrap(), 0.02);
        assert_eq!(shifted.spot(RiskFactorKind::FxSpot, "EURUSD").unwrap(), 1.1);
    }

    #[test]
    fn test_overlay_missing_object() {
        let m = market();
        let mut overlay = QuoteMap::new();
        overlay.insert(RiskFactorKey::new(RiskFactorKind::FxSpot, "GBPUSD", 0, "spot"), 1.3);
        assert!(matches!(
            m.apply(&overlay),
            Err(MarketDataError::MissingObject { .. })
        ));
    }

    #[test]
    fn test_overlay_node_out_of_range() {
        let m = market();
        let mut overlay = QuoteMap::new();
        overlay.insert(
            RiskFactorKey::new(RiskFactorKind::DiscountCurve, "EUR", 7, "30Y"),
            0.03,
        );
        assert!(matches!(
            m.apply(&overlay),
            Err(MarketDataError::NodeOutOfRange { index: 7, nodes: 2, .. })
        ));
    }

    #[test]
    fn test_wrong_shape_lookup() {
        let m = market();
        let view = m.view();
        assert!(matches!(
            view.spot(RiskFactorKind::DiscountCurve, "EUR"),
            Err(MarketDataError::WrongObjectType { expected: "scalar", .. })
        ));
        assert!(matches!(
            view.discount_factor("USD", 1.0),
            Err(MarketDataError::MissingObject { .. })
        ));
    }
}
