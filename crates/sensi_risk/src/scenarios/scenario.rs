//! Scenario descriptors, overlays and the ordered scenario set.

use std::collections::HashMap;
use std::fmt;

use sensi_core::market::{QuoteMap, RiskFactorKey, RiskFactorKind};

use crate::config::ShiftType;

/// Index of the base scenario in every scenario set.
pub const BASE_SCENARIO: usize = 0;

/// Role of a scenario in the finite-difference scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScenarioType {
    /// Unshifted market.
    Base,
    /// One factor shifted up.
    Up,
    /// One factor shifted down.
    Down,
    /// Two factors shifted up together.
    Cross,
}

impl fmt::Display for ScenarioType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScenarioType::Base => "Base",
            ScenarioType::Up => "Up",
            ScenarioType::Down => "Down",
            ScenarioType::Cross => "Cross",
        };
        f.write_str(name)
    }
}

/// What a scenario shifts and where it sits in the set.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScenarioDescriptor {
    index: usize,
    scenario_type: ScenarioType,
    factor1: Option<RiskFactorKey>,
    factor2: Option<RiskFactorKey>,
}

impl ScenarioDescriptor {
    pub(crate) fn base() -> Self {
        Self {
            index: BASE_SCENARIO,
            scenario_type: ScenarioType::Base,
            factor1: None,
            factor2: None,
        }
    }

    pub(crate) fn single(index: usize, scenario_type: ScenarioType, factor: RiskFactorKey) -> Self {
        Self {
            index,
            scenario_type,
            factor1: Some(factor),
            factor2: None,
        }
    }

    pub(crate) fn cross(index: usize, factor1: RiskFactorKey, factor2: RiskFactorKey) -> Self {
        Self {
            index,
            scenario_type: ScenarioType::Cross,
            factor1: Some(factor1),
            factor2: Some(factor2),
        }
    }

    /// Position in the scenario set (and cube column).
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Base, Up, Down or Cross.
    #[inline]
    pub fn scenario_type(&self) -> ScenarioType {
        self.scenario_type
    }

    /// Shifted factor (first factor of a cross).
    #[inline]
    pub fn factor1(&self) -> Option<&RiskFactorKey> {
        self.factor1.as_ref()
    }

    /// Second factor of a cross.
    #[inline]
    pub fn factor2(&self) -> Option<&RiskFactorKey> {
        self.factor2.as_ref()
    }
}

impl fmt::Display for ScenarioDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.factor1, &self.factor2) {
            (Some(a), Some(b)) => write!(f, "{}:{}&{}", self.scenario_type, a, b),
            (Some(a), None) => write!(f, "{}:{}", self.scenario_type, a),
            _ => write!(f, "{}", self.scenario_type),
        }
    }
}

/// Immutable sparse overlay of shifted native quotes.
///
/// Only nodes whose value differs from the base market are present; the
/// base scenario's overlay is empty.
#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    descriptor: ScenarioDescriptor,
    shifts: QuoteMap,
}

impl Scenario {
    pub(crate) fn new(descriptor: ScenarioDescriptor, shifts: QuoteMap) -> Self {
        Self { descriptor, shifts }
    }

    /// Provenance of this scenario.
    #[inline]
    pub fn descriptor(&self) -> &ScenarioDescriptor {
        &self.descriptor
    }

    /// Position in the set.
    #[inline]
    pub fn index(&self) -> usize {
        self.descriptor.index
    }

    /// Human-readable label, e.g. `Up:DiscountCurve/EUR/3/5Y`.
    pub fn label(&self) -> String {
        self.descriptor.to_string()
    }

    /// Shifted native quotes keyed by native node.
    #[inline]
    pub fn shifts(&self) -> &QuoteMap {
        &self.shifts
    }
}

/// A generated sensitivity factor and the scenarios that address it.
#[derive(Debug, Clone, PartialEq)]
pub struct FactorInfo {
    /// Bucket key, e.g. `DiscountCurve/EUR/3/5Y`
    pub key: RiskFactorKey,
    /// Configured shift type
    pub shift_type: ShiftType,
    /// Configured shift size
    pub shift_size: f64,
    /// Absolute perturbation at the bucket coordinate (`h`)
    pub absolute_shift: f64,
    /// Base market value at the bucket coordinate
    pub base_value: f64,
    /// Up scenario index
    pub up: usize,
    /// Down scenario index, when gamma is requested
    pub down: Option<usize>,
}

/// A generated cross-gamma pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CrossPair {
    /// Position of the first factor in [`ScenarioSet::factors`]
    pub factor1: usize,
    /// Position of the second factor, always greater than `factor1`
    pub factor2: usize,
    /// Cross scenario index
    pub scenario: usize,
}

/// A configured qualifier the market does not simulate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFactor {
    /// Configured category
    pub category: RiskFactorKind,
    /// Configured qualifier
    pub qualifier: String,
    /// Why it was skipped
    pub reason: String,
}

impl fmt::Display for SkippedFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}: {}", self.category, self.qualifier, self.reason)
    }
}

/// The ordered output of scenario generation.
///
/// Index 0 is always the base scenario. Indices are stable for the life of
/// the set and address the columns of the NPV cube.
#[derive(Debug, Clone)]
pub struct ScenarioSet {
    scenarios: Vec<Scenario>,
    factors: Vec<FactorInfo>,
    factor_lookup: HashMap<RiskFactorKey, usize>,
    cross_pairs: Vec<CrossPair>,
    cross_lookup: HashMap<(usize, usize), usize>,
    skipped: Vec<SkippedFactor>,
}

impl ScenarioSet {
    pub(crate) fn new(
        scenarios: Vec<Scenario>,
        factors: Vec<FactorInfo>,
        cross_pairs: Vec<CrossPair>,
        skipped: Vec<SkippedFactor>,
    ) -> Self {
        let factor_lookup = factors
            .iter()
            .enumerate()
            .map(|(i, f)| (f.key.clone(), i))
            .collect();
        let cross_lookup = cross_pairs
            .iter()
            .map(|p| ((p.factor1, p.factor2), p.scenario))
            .collect();
        Self {
            scenarios,
            factors,
            factor_lookup,
            cross_pairs,
            cross_lookup,
            skipped,
        }
    }

    /// Number of scenarios, base included.
    #[inline]
    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    /// Always false for a generated set, which holds at least the base.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }

    /// Scenario at `index`.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&Scenario> {
        self.scenarios.get(index)
    }

    /// All scenarios in index order.
    #[inline]
    pub fn scenarios(&self) -> &[Scenario] {
        &self.scenarios
    }

    /// Iterates scenarios in index order; call again to restart.
    pub fn iter(&self) -> std::slice::Iter<'_, Scenario> {
        self.scenarios.iter()
    }

    /// Generated factors in generation order.
    #[inline]
    pub fn factors(&self) -> &[FactorInfo] {
        &self.factors
    }

    /// Position of `factor` in [`factors`](Self::factors).
    pub fn factor_position(&self, factor: &RiskFactorKey) -> Option<usize> {
        self.factor_lookup.get(factor).copied()
    }

    /// Generated factor info.
    pub fn factor(&self, factor: &RiskFactorKey) -> Option<&FactorInfo> {
        self.factor_position(factor).map(|i| &self.factors[i])
    }

    /// Up scenario of `factor`.
    pub fn up_index(&self, factor: &RiskFactorKey) -> Option<usize> {
        self.factor(factor).map(|f| f.up)
    }

    /// Down scenario of `factor`, if gamma was requested.
    pub fn down_index(&self, factor: &RiskFactorKey) -> Option<usize> {
        self.factor(factor).and_then(|f| f.down)
    }

    /// Cross scenario of a factor pair, in either order.
    pub fn cross_index(&self, f1: &RiskFactorKey, f2: &RiskFactorKey) -> Option<usize> {
        let (a, b) = (self.factor_position(f1)?, self.factor_position(f2)?);
        self.cross_index_by_position(a, b)
    }

    pub(crate) fn cross_index_by_position(&self, a: usize, b: usize) -> Option<usize> {
        let key = if a < b { (a, b) } else { (b, a) };
        self.cross_lookup.get(&key).copied()
    }

    /// Generated cross pairs in scenario order.
    #[inline]
    pub fn cross_pairs(&self) -> &[CrossPair] {
        &self.cross_pairs
    }

    /// Configured qualifiers skipped because the market lacks them.
    #[inline]
    pub fn skipped(&self) -> &[SkippedFactor] {
        &self.skipped
    }

    /// Counts of `(up, down, cross)` scenarios.
    pub fn counts(&self) -> (usize, usize, usize) {
        let mut counts = (0, 0, 0);
        for s in &self.scenarios {
            match s.descriptor().scenario_type() {
                ScenarioType::Up => counts.0 += 1,
                ScenarioType::Down => counts.1 += 1,
                ScenarioType::Cross => counts.2 += 1,
                ScenarioType::Base => {}
            }
        }
        counts
    }
}

impl<'a> IntoIterator for &'a ScenarioSet {
    type Item = &'a Scenario;
    type IntoIter = std::slice::Iter<'a, Scenario>;

    fn into_iter(self) -> Self::IntoIter {
        self.scenarios.iter()
    }
}
