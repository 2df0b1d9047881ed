//! Scenario generation.
//!
//! Turns a validated [`SensitivityConfig`] and a base [`MarketSnapshot`]
//! into the ordered [`ScenarioSet`]:
//!
//! 1. Base (index 0)
//! 2. Per factor, in configuration order: Up, then Down if gamma is requested
//! 3. Per filtered factor pair `(i < j)`: Cross, with both up shifts applied
//!
//! Configured qualifiers missing from the market are skipped with a warning.

use sensi_core::market::{
    MarketObject, MarketSnapshot, QuoteMap, RiskFactorKey, RiskFactorKind, ShiftGeometry,
    SPOT_LABEL,
};
use sensi_core::types::Tenor;

use super::rebucket::{surface_weight, triangular_weight};
use super::scenario::{
    CrossPair, FactorInfo, Scenario, ScenarioDescriptor, ScenarioSet, ScenarioType,
    SkippedFactor,
};
use crate::config::{ConfigError, CrossGammaFilter, SensitivityConfig, ShiftSpec, ShiftType};

/// One bucket shift laid out on native nodes.
#[derive(Debug, Clone)]
struct BucketShift {
    key: RiskFactorKey,
    shift_type: ShiftType,
    shift_size: f64,
    base_value: f64,
    /// Native node keys with non-zero weight.
    weights: Vec<(RiskFactorKey, f64)>,
    compute_gamma: bool,
}

impl BucketShift {
    fn absolute_shift(&self) -> f64 {
        self.shift_type.absolute_size(self.shift_size, self.base_value)
    }

    /// Writes this bucket's shift on top of `overlay`, reading unshifted
    /// nodes from the base market.
    fn apply_onto(&self, market: &MarketSnapshot, overlay: &mut QuoteMap, sign: f64) {
        for (node, weight) in &self.weights {
            let current = match overlay.get(node) {
                Some(&v) => v,
                None => match market.quote(node) {
                    Some(v) => v,
                    None => continue,
                },
            };
            let shifted = self.shift_type.apply(current, sign * self.shift_size, *weight);
            overlay.insert(node.clone(), shifted);
        }
    }
}

/// Builds scenario sets from a sensitivity configuration.
///
/// # Examples
///
/// ```
/// use sensi_core::market::{MarketSnapshot, RiskFactorKind};
/// use sensi_risk::config::{SensitivityConfig, ShiftEntry, ShiftSpec};
/// use sensi_risk::scenarios::ScenarioGenerator;
///
/// let market = MarketSnapshot::new()
///     .with_spot(RiskFactorKind::FxSpot, "EURUSD", 1.1)
///     .unwrap();
/// let config = SensitivityConfig::new().with_shift(ShiftEntry::new(
///     RiskFactorKind::FxSpot,
///     ["EURUSD", "GBPUSD"],
///     ShiftSpec::relative(0.001),
/// ));
///
/// let set = ScenarioGenerator::new(&config).unwrap().generate(&market);
/// assert_eq!(set.len(), 3); // Base, Up, Down
/// assert_eq!(set.skipped().len(), 1); // GBPUSD is not in the market
/// ```
#[derive(Debug, Clone)]
pub struct ScenarioGenerator {
    config: SensitivityConfig,
    filter: CrossGammaFilter,
}

impl ScenarioGenerator {
    /// Validates the configuration and prepares a generator.
    pub fn new(config: &SensitivityConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            filter: config.cross_gamma_filter()?,
            config: config.clone(),
        })
    }

    /// The cross-gamma filter in use.
    pub fn filter(&self) -> &CrossGammaFilter {
        &self.filter
    }

    /// Generates every scenario needed for the configured sensitivities.
    pub fn generate(&self, market: &MarketSnapshot) -> ScenarioSet {
        let (buckets, skipped) = self.collect_buckets(market);

        let mut scenarios = vec![Scenario::new(ScenarioDescriptor::base(), QuoteMap::new())];
        let mut factors = Vec::with_capacity(buckets.len());
        let mut up_overlays = Vec::with_capacity(buckets.len());

        for bucket in &buckets {
            let mut up = QuoteMap::new();
            bucket.apply_onto(market, &mut up, 1.0);
            let up_index = scenarios.len();
            scenarios.push(Scenario::new(
                ScenarioDescriptor::single(up_index, ScenarioType::Up, bucket.key.clone()),
                up.clone(),
            ));
            up_overlays.push(up);

            let down_index = if bucket.compute_gamma {
                let mut down = QuoteMap::new();
                bucket.apply_onto(market, &mut down, -1.0);
                let index = scenarios.len();
                scenarios.push(Scenario::new(
                    ScenarioDescriptor::single(index, ScenarioType::Down, bucket.key.clone()),
                    down,
                ));
                Some(index)
            } else {
                None
            };

            factors.push(FactorInfo {
                key: bucket.key.clone(),
                shift_type: bucket.shift_type,
                shift_size: bucket.shift_size,
                absolute_shift: bucket.absolute_shift(),
                base_value: bucket.base_value,
                up: up_index,
                down: down_index,
            });
        }

        let mut cross_pairs = Vec::new();
        if !self.filter.is_empty() {
            for i in 0..buckets.len() {
                for j in (i + 1)..buckets.len() {
                    if !self.filter.allows(&buckets[i].key, &buckets[j].key) {
                        continue;
                    }
                    // Factor 2's shift lands on top of factor 1's
                    let mut cross = up_overlays[i].clone();
                    buckets[j].apply_onto(market, &mut cross, 1.0);
                    let index = scenarios.len();
                    scenarios.push(Scenario::new(
                        ScenarioDescriptor::cross(
                            index,
                            buckets[i].key.clone(),
                            buckets[j].key.clone(),
                        ),
                        cross,
                    ));
                    cross_pairs.push(CrossPair {
                        factor1: i,
                        factor2: j,
                        scenario: index,
                    });
                }
            }
        }

        let set = ScenarioSet::new(scenarios, factors, cross_pairs, skipped);
        let (ups, downs, crosses) = set.counts();
        tracing::info!(
            factors = set.factors().len(),
            up = ups,
            down = downs,
            cross = crosses,
            skipped = set.skipped().len(),
            "Generated {} scenarios",
            set.len()
        );
        set
    }

    fn collect_buckets(&self, market: &MarketSnapshot) -> (Vec<BucketShift>, Vec<SkippedFactor>) {
        let mut buckets = Vec::new();
        let mut skipped = Vec::new();
        for entry in &self.config.shifts {
            for qualifier in &entry.qualifiers {
                match market.object(entry.category, qualifier) {
                    Some(object) => buckets.extend(object_buckets(
                        market,
                        entry.category,
                        qualifier,
                        object,
                        &entry.spec,
                    )),
                    None => {
                        tracing::warn!(
                            category = %entry.category,
                            qualifier = %qualifier,
                            "Configured risk factor is not simulated by the market, skipping"
                        );
                        skipped.push(SkippedFactor {
                            category: entry.category,
                            qualifier: qualifier.clone(),
                            reason: "not present in base market".to_string(),
                        });
                    }
                }
            }
        }
        (buckets, skipped)
    }
}

/// Lays out every bucket of one configured market object.
fn object_buckets(
    market: &MarketSnapshot,
    kind: RiskFactorKind,
    qualifier: &str,
    object: &MarketObject,
    spec: &ShiftSpec,
) -> Vec<BucketShift> {
    let nodes: Vec<(RiskFactorKey, (f64, f64))> = market
        .native_keys(kind, qualifier)
        .into_iter()
        .filter_map(|key| object.node_coordinates(key.index()).map(|c| (key, c)))
        .collect();

    let bucket = |index: usize, label: String, base_value: f64, weight: &dyn Fn(f64, f64) -> f64| {
        let weights: Vec<(RiskFactorKey, f64)> = nodes
            .iter()
            .filter_map(|(key, (t, k))| {
                let w = weight(*t, *k);
                (w != 0.0).then(|| (key.clone(), w))
            })
            .collect();
        if weights.is_empty() {
            tracing::debug!(
                %kind,
                qualifier,
                bucket = %label,
                "Bucket touches no native node; its sensitivities will be zero"
            );
        }
        BucketShift {
            key: RiskFactorKey::new(kind, qualifier, index, label),
            shift_type: spec.shift_type,
            shift_size: spec.shift_size,
            base_value,
            weights,
            compute_gamma: spec.compute_gamma,
        }
    };

    let times: Vec<f64> = spec.shift_tenors.iter().map(Tenor::as_years).collect();
    match kind.geometry() {
        ShiftGeometry::Scalar => {
            vec![bucket(0, SPOT_LABEL.to_string(), object.value_at(0.0, 0.0), &|_: f64, _: f64| 1.0)]
        }
        ShiftGeometry::Curve => spec
            .shift_tenors
            .iter()
            .enumerate()
            .map(|(k, tenor)| {
                bucket(
                    k,
                    tenor.to_string(),
                    object.value_at(times[k], 0.0),
                    &|t: f64, _: f64| triangular_weight(&times, k, t),
                )
            })
            .collect(),
        ShiftGeometry::Surface if spec.shift_strikes.is_empty() => {
            let native_strikes: Vec<f64> = match object {
                MarketObject::Surface(s) => s.strikes().to_vec(),
                _ => vec![0.0],
            };
            spec.shift_tenors
                .iter()
                .enumerate()
                .map(|(e, tenor)| {
                    // Whole-smile bucket: its base level is the mean across the smile
                    let base = native_strikes
                        .iter()
                        .map(|&k| object.value_at(times[e], k))
                        .sum::<f64>()
                        / native_strikes.len() as f64;
                    bucket(e, tenor.to_string(), base, &|t: f64, k: f64| {
                        surface_weight(&times, &[], e, None, t, k)
                    })
                })
                .collect()
        }
        ShiftGeometry::Surface => {
            let strikes = &spec.shift_strikes;
            let mut out = Vec::with_capacity(times.len() * strikes.len());
            for (e, tenor) in spec.shift_tenors.iter().enumerate() {
                for (s, &strike) in strikes.iter().enumerate() {
                    let index = e * strikes.len() + s;
                    let label = format!("{tenor}/{strike}");
                    out.push(bucket(
                        index,
                        label,
                        object.value_at(times[e], strike),
                        &|t: f64, k: f64| surface_weight(&times, strikes, e, Some(s), t, k),
                    ));
                }
            }
            out
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ShiftEntry;
    use crate::scenarios::BASE_SCENARIO;

    fn market() -> MarketSnapshot {
        MarketSnapshot::new()
            .with_curve(
                RiskFactorKind::DiscountCurve,
                "EUR",
                &[
                    (Tenor::years(1), 0.01),
                    (Tenor::years(2), 0.015),
                    (Tenor::years(5), 0.02),
                    (Tenor::years(10), 0.025),
                ],
            )
            .unwrap()
            .with_spot(RiskFactorKind::FxSpot, "EURUSD", 1.10)
            .unwrap()
            .with_surface(
                RiskFactorKind::FxVolatility,
                "EURUSD",
                &[Tenor::months(6), Tenor::years(1)],
                &[1.0, 1.1, 1.2],
                &[vec![0.11, 0.10, 0.12], vec![0.12, 0.11, 0.13]],
            )
            .unwrap()
    }

    fn curve_entry(tenors: Vec<Tenor>, gamma: bool) -> ShiftEntry {
        ShiftEntry::new(
            RiskFactorKind::DiscountCurve,
            ["EUR"],
            ShiftSpec::absolute(1e-4).with_tenors(tenors).with_gamma(gamma),
        )
    }

    fn native_tenors() -> Vec<Tenor> {
        vec![Tenor::years(1), Tenor::years(2), Tenor::years(5), Tenor::years(10)]
    }

    #[test]
    fn test_base_first_then_up_down_per_factor() {
        let config = SensitivityConfig::new().with_shift(curve_entry(native_tenors(), true));
        let set = ScenarioGenerator::new(&config).unwrap().generate(&market());

        assert_eq!(set.len(), 1 + 2 * 4);
        assert_eq!(set.get(BASE_SCENARIO).unwrap().descriptor().scenario_type(), ScenarioType::Base);
        assert!(set.get(BASE_SCENARIO).unwrap().shifts().is_empty());
        for (i, f) in set.factors().iter().enumerate() {
            assert_eq!(f.up, 1 + 2 * i);
            assert_eq!(f.down, Some(2 + 2 * i));
        }
        for (i, s) in set.iter().enumerate() {
            assert_eq!(s.index(), i);
        }
        assert_eq!(set.get(5).unwrap().label(), "Up:DiscountCurve/EUR/2/5Y");
    }

    #[test]
    fn test_no_down_without_gamma() {
        let config = SensitivityConfig::new().with_shift(curve_entry(native_tenors(), false));
        let set = ScenarioGenerator::new(&config).unwrap().generate(&market());
        assert_eq!(set.len(), 5);
        assert!(set.factors().iter().all(|f| f.down.is_none()));
    }

    #[test]
    fn test_matching_grid_shifts_single_pillar() {
        let m = market();
        let config = SensitivityConfig::new().with_shift(curve_entry(native_tenors(), false));
        let set = ScenarioGenerator::new(&config).unwrap().generate(&m);
        for (k, f) in set.factors().iter().enumerate() {
            let shifts = set.get(f.up).unwrap().shifts();
            assert_eq!(shifts.len(), 1);
            let (node, value) = shifts.iter().next().unwrap();
            assert_eq!(node.index(), k);
            assert_eq!(*value, m.quote(node).unwrap() + 1e-4);
        }
    }

    #[test]
    fn test_coarse_grid_spreads_triangle() {
        let m = market();
        // Buckets 1Y and 10Y over native pillars 1Y, 2Y, 5Y, 10Y
        let config = SensitivityConfig::new()
            .with_shift(curve_entry(vec![Tenor::years(1), Tenor::years(10)], false));
        let set = ScenarioGenerator::new(&config).unwrap().generate(&m);
        let up_1y = set.get(set.factors()[0].up).unwrap().shifts();
        let shift_at = |i: usize| {
            let node = RiskFactorKey::new(
                RiskFactorKind::DiscountCurve,
                "EUR",
                i,
                native_tenors()[i].to_string(),
            );
            up_1y.get(&node).map(|v| v - m.quote(&node).unwrap())
        };
        assert!((shift_at(0).unwrap() - 1e-4).abs() < 1e-15);
        assert!((shift_at(1).unwrap() - 1e-4 * 8.0 / 9.0).abs() < 1e-15);
        assert!((shift_at(2).unwrap() - 1e-4 * 5.0 / 9.0).abs() < 1e-15);
        assert!(shift_at(3).is_none());
    }

    #[test]
    fn test_relative_shift_size() {
        let config = SensitivityConfig::new().with_shift(ShiftEntry::new(
            RiskFactorKind::FxSpot,
            ["EURUSD"],
            ShiftSpec::relative(0.01),
        ));
        let set = ScenarioGenerator::new(&config).unwrap().generate(&market());
        let f = &set.factors()[0];
        assert_eq!(f.key.to_string(), "FxSpot/EURUSD/0/spot");
        assert!((f.absolute_shift - 0.011).abs() < 1e-15);
        let down = set.get(f.down.unwrap()).unwrap().shifts();
        assert!((down.values().next().unwrap() - 1.10 * 0.99).abs() < 1e-15);
    }

    #[test]
    fn test_surface_buckets() {
        let config = SensitivityConfig::new().with_shift(ShiftEntry::new(
            RiskFactorKind::FxVolatility,
            ["EURUSD"],
            ShiftSpec::absolute(0.01)
                .with_tenors(vec![Tenor::years(1)])
                .with_strikes(vec![1.0, 1.2]),
        ));
        let set = ScenarioGenerator::new(&config).unwrap().generate(&market());
        let labels: Vec<String> = set.factors().iter().map(|f| f.key.to_string()).collect();
        assert_eq!(
            labels,
            vec!["FxVolatility/EURUSD/0/1Y/1", "FxVolatility/EURUSD/1/1Y/1.2"]
        );
        // Single expiry bucket covers both native expiries; the 1.1 strike
        // sits halfway between the strike buckets
        let up = set.get(set.factors()[0].up).unwrap().shifts();
        assert_eq!(up.len(), 4);
        let mid = up
            .iter()
            .find(|(k, _)| k.label() == "6M/1.1")
            .map(|(_, v)| *v)
            .unwrap();
        assert!((mid - (0.10 + 0.005)).abs() < 1e-12);
    }

    #[test]
    fn test_whole_smile_bucket() {
        let config = SensitivityConfig::new().with_shift(ShiftEntry::new(
            RiskFactorKind::FxVolatility,
            ["EURUSD"],
            ShiftSpec::absolute(0.01).with_tenors(vec![Tenor::months(6), Tenor::years(1)]),
        ));
        let set = ScenarioGenerator::new(&config).unwrap().generate(&market());
        let f = &set.factors()[1];
        assert_eq!(f.key.label(), "1Y");
        assert!((f.base_value - 0.12).abs() < 1e-12);
        assert_eq!(set.get(f.up).unwrap().shifts().len(), 3);
    }

    #[test]
    fn test_missing_qualifier_is_skipped() {
        let config = SensitivityConfig::new()
            .with_shift(ShiftEntry::new(
                RiskFactorKind::DiscountCurve,
                ["EUR", "JPY"],
                ShiftSpec::absolute(1e-4).with_tenors(native_tenors()),
            ));
        let set = ScenarioGenerator::new(&config).unwrap().generate(&market());
        assert_eq!(set.factors().len(), 4);
        assert_eq!(set.skipped().len(), 1);
        assert_eq!(set.skipped()[0].qualifier, "JPY");
    }

    #[test]
    fn test_cross_scenarios_only_for_filtered_pairs() {
        let config = SensitivityConfig::new()
            .with_shift(curve_entry(vec![Tenor::years(2), Tenor::years(5)], false))
            .with_shift(ShiftEntry::new(
                RiskFactorKind::FxSpot,
                ["EURUSD"],
                ShiftSpec::absolute(1e-4),
            ))
            .with_cross_gamma("DiscountCurve", "FxSpot");
        let set = ScenarioGenerator::new(&config).unwrap().generate(&market());

        // Two curve factors times one spot factor; no curve/curve pair
        assert_eq!(set.cross_pairs().len(), 2);
        let (ups, downs, crosses) = set.counts();
        assert_eq!((ups, downs, crosses), (3, 1, 2));
        let curve = &set.factors()[0].key;
        let spot = &set.factors()[2].key;
        let cross = set.cross_index(spot, curve).unwrap();
        let shifts = set.get(cross).unwrap().shifts();
        // Both factors' nodes are shifted
        assert!(shifts.keys().any(|k| k.kind() == RiskFactorKind::FxSpot));
        assert!(shifts.keys().any(|k| k.kind() == RiskFactorKind::DiscountCurve));
        assert!(set.cross_index(curve, &set.factors()[1].key).is_none());
    }

    #[test]
    fn test_cross_shifts_compose_on_shared_nodes() {
        let m = market();
        let config = SensitivityConfig::new()
            .with_shift(curve_entry(vec![Tenor::years(1), Tenor::years(10)], false))
            .with_cross_gamma("DiscountCurve/EUR", "DiscountCurve/EUR");
        let set = ScenarioGenerator::new(&config).unwrap().generate(&m);
        let cross = set.get(set.cross_pairs()[0].scenario).unwrap().shifts();
        // Every native pillar ends up shifted by the full size: the two
        // triangles partition unity
        for (node, value) in cross {
            assert!((value - m.quote(node).unwrap() - 1e-4).abs() < 1e-15);
        }
        assert_eq!(cross.len(), 4);
    }

    #[test]
    fn test_generation_is_deterministic() {
        let config = SensitivityConfig::new()
            .with_shift(curve_entry(native_tenors(), true))
            .with_cross_gamma("DiscountCurve", "DiscountCurve");
        let generator = ScenarioGenerator::new(&config).unwrap();
        let a = generator.generate(&market());
        let b = generator.generate(&market());
        assert_eq!(a.scenarios(), b.scenarios());
    }
}
