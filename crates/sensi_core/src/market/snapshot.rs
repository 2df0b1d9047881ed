//! Immutable base market snapshot.

use std::collections::BTreeMap;

use super::error::MarketDataError;
use super::object::{GridSurface, MarketObject, PillarCurve};
use super::risk_factor::{RiskFactorKey, RiskFactorKind, ShiftGeometry, KEY_SEPARATOR};
use super::view::MarketView;
use crate::types::Tenor;

/// Sparse set of shifted native quotes, keyed by native node key.
pub type QuoteMap = BTreeMap<RiskFactorKey, f64>;

fn expected_shape(geometry: ShiftGeometry) -> &'static str {
    match geometry {
        ShiftGeometry::Scalar => "scalar",
        ShiftGeometry::Curve => "curve",
        ShiftGeometry::Surface => "surface",
    }
}

fn shape_geometry(object: &MarketObject) -> ShiftGeometry {
    match object {
        MarketObject::Scalar(_) => ShiftGeometry::Scalar,
        MarketObject::Curve(_) => ShiftGeometry::Curve,
        MarketObject::Surface(_) => ShiftGeometry::Surface,
    }
}

/// Base market: every simulated object, by category and name.
///
/// Built once per run and shared read-only by all scenario valuations.
///
/// # Examples
///
/// ```
/// use sensi_core::market::{MarketSnapshot, RiskFactorKind};
///
/// let market = MarketSnapshot::new()
///     .with_spot(RiskFactorKind::FxSpot, "EURUSD", 1.10)
///     .unwrap();
/// assert!(market.contains(RiskFactorKind::FxSpot, "EURUSD"));
/// assert_eq!(market.native_keys(RiskFactorKind::FxSpot, "EURUSD").len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MarketSnapshot {
    objects: BTreeMap<RiskFactorKind, BTreeMap<String, MarketObject>>,
}

impl MarketSnapshot {
    /// Creates an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an object, replacing any previous one with the same key.
    ///
    /// The object's shape must match the category's shift geometry and the
    /// name must be usable as a key qualifier.
    pub fn insert(
        &mut self,
        kind: RiskFactorKind,
        name: impl Into<String>,
        object: MarketObject,
    ) -> Result<(), MarketDataError> {
        let name = name.into();
        if name.is_empty() || name.contains(KEY_SEPARATOR) {
            return Err(MarketDataError::InvalidName(name));
        }
        if shape_geometry(&object) != kind.geometry() {
            return Err(MarketDataError::WrongObjectType {
                kind,
                name,
                expected: expected_shape(kind.geometry()),
            });
        }
        if let MarketObject::Scalar(v) = object {
            if !v.is_finite() {
                return Err(MarketDataError::NonFiniteValue(format!("{}/{}", kind, name)));
            }
        }
        self.objects.entry(kind).or_default().insert(name, object);
        Ok(())
    }

    /// Builder form of [`MarketSnapshot::insert`].
    pub fn with_object(
        mut self,
        kind: RiskFactorKind,
        name: impl Into<String>,
        object: MarketObject,
    ) -> Result<Self, MarketDataError> {
        self.insert(kind, name, object)?;
        Ok(self)
    }

    /// Adds a pillar curve.
    pub fn with_curve(
        self,
        kind: RiskFactorKind,
        name: impl Into<String>,
        points: &[(Tenor, f64)],
    ) -> Result<Self, MarketDataError> {
        let curve = PillarCurve::new(points)?;
        self.with_object(kind, name, MarketObject::Curve(curve))
    }

    /// Adds a scalar quote.
    pub fn with_spot(
        self,
        kind: RiskFactorKind,
        name: impl Into<String>,
        value: f64,
    ) -> Result<Self, MarketDataError> {
        self.with_object(kind, name, MarketObject::Scalar(value))
    }

    /// Adds an expiry by strike surface.
    pub fn with_surface(
        self,
        kind: RiskFactorKind,
        name: impl Into<String>,
        expiries: &[Tenor],
        strikes: &[f64],
        rows: &[Vec<f64>],
    ) -> Result<Self, MarketDataError> {
        let surface = GridSurface::new(expiries, strikes, rows)?;
        self.with_object(kind, name, MarketObject::Surface(surface))
    }

    /// Looks up an object.
    pub fn object(&self, kind: RiskFactorKind, name: &str) -> Option<&MarketObject> {
        self.objects.get(&kind).and_then(|m| m.get(name))
    }

    /// Returns true if the market simulates the given object.
    pub fn contains(&self, kind: RiskFactorKind, name: &str) -> bool {
        self.object(kind, name).is_some()
    }

    /// Number of objects.
    pub fn len(&self) -> usize {
        self.objects.values().map(BTreeMap::len).sum()
    }

    /// Returns true if the snapshot holds no objects.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates over `(kind, name, object)` in key order.
    pub fn iter(&self) -> impl Iterator<Item = (RiskFactorKind, &str, &MarketObject)> {
        self.objects.iter().flat_map(|(kind, by_name)| {
            by_name
                .iter()
                .map(move |(name, obj)| (*kind, name.as_str(), obj))
        })
    }

    /// Native node keys of an object, in node order. Empty if absent.
    pub fn native_keys(&self, kind: RiskFactorKind, name: &str) -> Vec<RiskFactorKey> {
        let Some(object) = self.object(kind, name) else {
            return Vec::new();
        };
        (0..object.node_count())
            .filter_map(|i| {
                object
                    .node_label(i)
                    .map(|label| RiskFactorKey::new(kind, name, i, label))
            })
            .collect()
    }

    /// Base quote of a native node.
    pub fn quote(&self, key: &RiskFactorKey) -> Option<f64> {
        self.object(key.kind(), key.qualifier())
            .and_then(|o| o.node_value(key.index()))
    }

    /// View of the unshifted market.
    pub fn view(&self) -> MarketView<'_> {
        MarketView::base(self)
    }

    /// Applies a sparse set of shifted quotes, producing a fresh view.
    ///
    /// The snapshot itself is not modified; the view owns patched copies of
    /// the objects the overlay touches.
    pub fn apply(&self, overlay: &QuoteMap) -> Result<MarketView<'_>, MarketDataError> {
        MarketView::with_overlay(self, overlay)
    }
}

/// Serialisable description of a market, as read from JSON.
#[cfg(feature = "serde")]
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct MarketData {
    /// Market objects
    pub objects: Vec<MarketEntry>,
}

/// One market object in a [`MarketData`] description.
#[cfg(feature = "serde")]
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct MarketEntry {
    /// Category
    pub category: RiskFactorKind,
    /// Name (qualifier)
    pub name: String,
    /// Quotes
    #[serde(flatten)]
    pub data: MarketObjectData,
}

/// Quote payload of a [`MarketEntry`].
#[cfg(feature = "serde")]
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MarketObjectData {
    /// Scalar quote
    Spot {
        /// Spot value
        value: f64,
    },
    /// Pillar curve
    Curve {
        /// `(tenor, value)` pillars
        pillars: Vec<(Tenor, f64)>,
    },
    /// Expiry by strike surface
    Surface {
        /// Expiry axis
        expiries: Vec<Tenor>,
        /// Strike axis
        strikes: Vec<f64>,
        /// One row per expiry
        values: Vec<Vec<f64>>,
    },
}

#[cfg(feature = "serde")]
impl TryFrom<MarketData> for MarketSnapshot {
    type Error = MarketDataError;

    fn try_from(data: MarketData) -> Result<Self, Self::Error> {
        let mut market = MarketSnapshot::new();
        for entry in data.objects {
            let object = match entry.data {
                MarketObjectData::Spot { value } => MarketObject::Scalar(value),
                MarketObjectData::Curve { pillars } => {
                    MarketObject::Curve(PillarCurve::new(&pillars)?)
                }
                MarketObjectData::Surface {
                    expiries,
                    strikes,
                    values,
                } => MarketObject::Surface(GridSurface::new(&expiries, &strikes, &values)?),
            };
            market.insert(entry.category, entry.name, object)?;
        }
        Ok(market)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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
    fn test_insert_rejects_wrong_shape() {
        let err = MarketSnapshot::new().with_spot(RiskFactorKind::DiscountCurve, "EUR", 0.01);
        assert!(matches!(err, Err(MarketDataError::WrongObjectType { .. })));
    }

    #[test]
    fn test_insert_rejects_separator_in_name() {
        let err = MarketSnapshot::new().with_spot(RiskFactorKind::FxSpot, "EUR/USD", 1.1);
        assert!(matches!(err, Err(MarketDataError::InvalidName(_))));
    }

    #[test]
    fn test_native_keys() {
        let m = market();
        let keys = m.native_keys(RiskFactorKind::DiscountCurve, "EUR");
        let wire: Vec<String> = keys.iter().map(ToString::to_string).collect();
        assert_eq!(wire, vec!["DiscountCurve/EUR/0/1Y", "DiscountCurve/EUR/1/5Y"]);
        assert!(m.native_keys(RiskFactorKind::DiscountCurve, "USD").is_empty());
    }

    #[test]
    fn test_quote_lookup() {
        let m = market();
        let key = RiskFactorKey::new(RiskFactorKind::DiscountCurve, "EUR", 1, "5Y");
        assert_eq!(m.quote(&key), Some(0.02));
        assert_eq!(m.len(), 2);
        assert_eq!(m.iter().count(), 2);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_market_data_from_json() {
        let json = r#"{
            "objects": [
                {"category": "DiscountCurve", "name": "EUR", "type": "curve",
                 "pillars": [["1Y", 0.01], ["10Y", 0.02]]},
                {"category": "FxSpot", "name": "EURUSD", "type": "spot", "value": 1.1},
                {"category": "FxVolatility", "name": "EURUSD", "type": "surface",
                 "expiries": ["1Y"], "strikes": [1.1], "values": [[0.1]]}
            ]
        }"#;
        let data: MarketData = serde_json::from_str(json).unwrap();
        let market = MarketSnapshot::try_from(data).unwrap();
        assert_eq!(market.len(), 3);
        assert!(market.contains(RiskFactorKind::FxVolatility, "EURUSD"));
    }
}
