//! Market objects: scalar quotes, pillar curves and expiry/strike surfaces.
//!
//! Every object exposes its quotes as a flat list of native nodes so that a
//! scenario can address any of them by index, and every node has a
//! coordinate on which rebucketing weights are evaluated.

use super::error::MarketDataError;
use crate::types::Tenor;

/// Label of the single node of a scalar quote.
pub const SPOT_LABEL: &str = "spot";

/// Linear interpolation with flat extrapolation on strictly increasing `xs`.
pub(crate) fn interpolate_flat(xs: &[f64], ys: &[f64], x: f64) -> f64 {
    debug_assert_eq!(xs.len(), ys.len());
    let n = xs.len();
    if n == 1 || x <= xs[0] {
        return ys[0];
    }
    if x >= xs[n - 1] {
        return ys[n - 1];
    }
    // First index with xs[i] > x; x lies in [xs[i-1], xs[i])
    let i = xs.partition_point(|&xi| xi <= x);
    let (x0, x1) = (xs[i - 1], xs[i]);
    let (y0, y1) = (ys[i - 1], ys[i]);
    y0 + (y1 - y0) * (x - x0) / (x1 - x0)
}

fn check_increasing(xs: &[f64], what: &str) -> Result<(), MarketDataError> {
    if xs.windows(2).any(|w| w[1] <= w[0]) {
        return Err(MarketDataError::UnsortedGrid(what.to_string()));
    }
    Ok(())
}

fn check_finite(values: &[f64], what: &str) -> Result<(), MarketDataError> {
    if values.iter().any(|v| !v.is_finite()) {
        return Err(MarketDataError::NonFiniteValue(what.to_string()));
    }
    Ok(())
}

/// Term structure of values on tenor pillars (zero rates, spreads).
///
/// Interpolation is linear in the value with flat extrapolation beyond the
/// first and last pillar.
#[derive(Debug, Clone, PartialEq)]
pub struct PillarCurve {
    tenors: Vec<Tenor>,
    times: Vec<f64>,
    values: Vec<f64>,
}

impl PillarCurve {
    /// Builds a curve from `(tenor, value)` pillars in increasing tenor order.
    pub fn new(points: &[(Tenor, f64)]) -> Result<Self, MarketDataError> {
        if points.is_empty() {
            return Err(MarketDataError::InsufficientData { got: 0, need: 1 });
        }
        let tenors: Vec<Tenor> = points.iter().map(|(t, _)| *t).collect();
        let times: Vec<f64> = tenors.iter().map(Tenor::as_years).collect();
        let values: Vec<f64> = points.iter().map(|(_, v)| *v).collect();
        check_increasing(&times, "curve pillars")?;
        check_finite(&values, "curve values")?;
        Ok(Self {
            tenors,
            times,
            values,
        })
    }

    /// Pillar tenors.
    #[inline]
    pub fn tenors(&self) -> &[Tenor] {
        &self.tenors
    }

    /// Pillar times in years.
    #[inline]
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    /// Pillar values.
    #[inline]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Interpolated value at time `t` (years).
    #[inline]
    pub fn value_at(&self, t: f64) -> f64 {
        interpolate_flat(&self.times, &self.values, t)
    }
}

/// Volatility grid over expiries (rows) and strikes (columns).
///
/// For swaption surfaces the strike axis holds the underlying swap term in
/// years. Interpolation is bilinear with flat extrapolation on both axes.
#[derive(Debug, Clone, PartialEq)]
pub struct GridSurface {
    expiries: Vec<Tenor>,
    expiry_times: Vec<f64>,
    strikes: Vec<f64>,
    /// Row-major: `values[e * strikes.len() + k]`
    values: Vec<f64>,
}

impl GridSurface {
    /// Builds a surface from an expiry axis, a strike axis and one row of
    /// values per expiry.
    pub fn new(
        expiries: &[Tenor],
        strikes: &[f64],
        rows: &[Vec<f64>],
    ) -> Result<Self, MarketDataError> {
        if expiries.is_empty() || strikes.is_empty() {
            return Err(MarketDataError::InsufficientData {
                got: expiries.len().min(strikes.len()),
                need: 1,
            });
        }
        if rows.len() != expiries.len() {
            return Err(MarketDataError::DimensionMismatch {
                expected: expiries.len(),
                got: rows.len(),
            });
        }
        let expiry_times: Vec<f64> = expiries.iter().map(Tenor::as_years).collect();
        check_increasing(&expiry_times, "surface expiries")?;
        check_increasing(strikes, "surface strikes")?;

        let mut values = Vec::with_capacity(expiries.len() * strikes.len());
        for row in rows {
            if row.len() != strikes.len() {
                return Err(MarketDataError::DimensionMismatch {
                    expected: strikes.len(),
                    got: row.len(),
                });
            }
            values.extend_from_slice(row);
        }
        check_finite(&values, "surface values")?;

        Ok(Self {
            expiries: expiries.to_vec(),
            expiry_times,
            strikes: strikes.to_vec(),
            values,
        })
    }

    /// Expiry tenors.
    #[inline]
    pub fn expiries(&self) -> &[Tenor] {
        &self.expiries
    }

    /// Expiry times in years.
    #[inline]
    pub fn expiry_times(&self) -> &[f64] {
        &self.expiry_times
    }

    /// Strike axis.
    #[inline]
    pub fn strikes(&self) -> &[f64] {
        &self.strikes
    }

    /// Bilinear value at `(expiry, strike)`.
    pub fn value_at(&self, expiry: f64, strike: f64) -> f64 {
        let n_k = self.strikes.len();
        // Interpolate each row in strike, then the resulting column in expiry
        let column: Vec<f64> = self
            .values
            .chunks(n_k)
            .map(|row| interpolate_flat(&self.strikes, row, strike))
            .collect();
        interpolate_flat(&self.expiry_times, &column, expiry)
    }
}

/// A market object addressable node by node.
#[derive(Debug, Clone, PartialEq)]
pub enum MarketObject {
    /// Single quote (FX or equity spot).
    Scalar(f64),
    /// Term structure on tenor pillars.
    Curve(PillarCurve),
    /// Expiry by strike grid.
    Surface(GridSurface),
}

impl MarketObject {
    /// Shape name used in error messages.
    pub fn shape(&self) -> &'static str {
        match self {
            MarketObject::Scalar(_) => "scalar",
            MarketObject::Curve(_) => "curve",
            MarketObject::Surface(_) => "surface",
        }
    }

    /// Number of native nodes.
    pub fn node_count(&self) -> usize {
        match self {
            MarketObject::Scalar(_) => 1,
            MarketObject::Curve(c) => c.values.len(),
            MarketObject::Surface(s) => s.values.len(),
        }
    }

    /// Quote at node `index`.
    pub fn node_value(&self, index: usize) -> Option<f64> {
        match self {
            MarketObject::Scalar(v) => (index == 0).then_some(*v),
            MarketObject::Curve(c) => c.values.get(index).copied(),
            MarketObject::Surface(s) => s.values.get(index).copied(),
        }
    }

    /// Label of node `index` (`spot`, `10Y`, `1Y/0.95`).
    pub fn node_label(&self, index: usize) -> Option<String> {
        match self {
            MarketObject::Scalar(_) => (index == 0).then(|| SPOT_LABEL.to_string()),
            MarketObject::Curve(c) => c.tenors.get(index).map(Tenor::to_string),
            MarketObject::Surface(s) => {
                let n_k = s.strikes.len();
                s.expiries
                    .get(index / n_k)
                    .filter(|_| index < s.values.len())
                    .map(|e| format!("{}/{}", e, s.strikes[index % n_k]))
            }
        }
    }

    /// Coordinates of node `index`: `(time, strike)`.
    ///
    /// Scalars report `(0, 0)`, curves report `(pillar time, 0)`.
    pub fn node_coordinates(&self, index: usize) -> Option<(f64, f64)> {
        match self {
            MarketObject::Scalar(_) => (index == 0).then_some((0.0, 0.0)),
            MarketObject::Curve(c) => c.times.get(index).map(|&t| (t, 0.0)),
            MarketObject::Surface(s) => {
                if index >= s.values.len() {
                    return None;
                }
                let n_k = s.strikes.len();
                Some((s.expiry_times[index / n_k], s.strikes[index % n_k]))
            }
        }
    }

    /// Value at an arbitrary coordinate, interpolated on the native grid.
    pub fn value_at(&self, time: f64, strike: f64) -> f64 {
        match self {
            MarketObject::Scalar(v) => *v,
            MarketObject::Curve(c) => c.value_at(time),
            MarketObject::Surface(s) => s.value_at(time, strike),
        }
    }

    /// Replaces the quote at node `index`, returning false if out of range.
    pub(crate) fn set_node(&mut self, index: usize, value: f64) -> bool {
        let slot = match self {
            MarketObject::Scalar(v) if index == 0 => Some(v),
            MarketObject::Scalar(_) => None,
            MarketObject::Curve(c) => c.values.get_mut(index),
            MarketObject::Surface(s) => s.values.get_mut(index),
        };
        match slot {
            Some(v) => {
                *v = value;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn curve() -> PillarCurve {
        PillarCurve::new(&[
            (Tenor::years(1), 0.01),
            (Tenor::years(2), 0.02),
            (Tenor::years(5), 0.03),
        ])
        .unwrap()
    }

    #[test]
    fn test_interpolate_flat_extrapolation() {
        let c = curve();
        assert_eq!(c.value_at(0.5), 0.01);
        assert_eq!(c.value_at(10.0), 0.03);
        assert_relative_eq!(c.value_at(1.5), 0.015, epsilon = 1e-15);
        assert_relative_eq!(c.value_at(3.5), 0.025, epsilon = 1e-15);
        assert_eq!(c.value_at(2.0), 0.02);
    }

    #[test]
    fn test_curve_rejects_unsorted() {
        let err = PillarCurve::new(&[(Tenor::years(2), 0.01), (Tenor::months(12), 0.02)]);
        assert!(matches!(err, Err(MarketDataError::UnsortedGrid(_))));
    }

    #[test]
    fn test_curve_rejects_non_finite() {
        let err = PillarCurve::new(&[(Tenor::years(1), f64::NAN)]);
        assert!(matches!(err, Err(MarketDataError::NonFiniteValue(_))));
    }

    #[test]
    fn test_surface_bilinear() {
        let s = GridSurface::new(
            &[Tenor::years(1), Tenor::years(2)],
            &[0.9, 1.1],
            &[vec![0.10, 0.20], vec![0.30, 0.40]],
        )
        .unwrap();
        assert_relative_eq!(s.value_at(1.5, 1.0), 0.25, epsilon = 1e-14);
        assert_eq!(s.value_at(0.1, 0.5), 0.10);
        assert_eq!(s.value_at(5.0, 2.0), 0.40);
    }

    #[test]
    fn test_surface_dimension_mismatch() {
        let err = GridSurface::new(&[Tenor::years(1)], &[0.9, 1.1], &[vec![0.1]]);
        assert!(matches!(
            err,
            Err(MarketDataError::DimensionMismatch {
                expected: 2,
                got: 1
            })
        ));
    }

    #[test]
    fn test_node_addressing() {
        let s = MarketObject::Surface(
            GridSurface::new(
                &[Tenor::years(1), Tenor::years(2)],
                &[0.9, 1.1],
                &[vec![0.10, 0.20], vec![0.30, 0.40]],
            )
            .unwrap(),
        );
        assert_eq!(s.node_count(), 4);
        assert_eq!(s.node_value(2), Some(0.30));
        assert_eq!(s.node_label(3).as_deref(), Some("2Y/1.1"));
        assert_eq!(s.node_coordinates(1), Some((1.0, 1.1)));
        assert_eq!(s.node_label(4), None);

        let spot = MarketObject::Scalar(1.1);
        assert_eq!(spot.node_label(0).as_deref(), Some(SPOT_LABEL));
        assert_eq!(spot.node_value(1), None);
    }

    #[test]
    fn test_set_node() {
        let mut c = MarketObject::Curve(curve());
        assert!(c.set_node(1, 0.025));
        assert_eq!(c.node_value(1), Some(0.025));
        assert!(!c.set_node(3, 0.0));
    }
}
