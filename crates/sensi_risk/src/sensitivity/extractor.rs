//! Finite-difference sensitivities from an NPV cube.
//!
//! With `h` the absolute shift of a factor (for relative shifts,
//! `shift_size * base value` at the bucket):
//!
//! ```text
//! delta       = (NPV_up - NPV_base) / h
//! gamma       = (NPV_up - 2 NPV_base + NPV_down) / h^2
//! cross_gamma = (NPV_upup - NPV_up1 - NPV_up2 + NPV_base) / (h1 h2)
//! ```
//!
//! A cube cell that was never populated (and did not fail) is unchanged from
//! base. A missing base NPV makes every sensitivity of the trade
//! unavailable; a failed shifted NPV makes the sensitivities that use it
//! unavailable.

use sensi_core::market::RiskFactorKey;
use sensi_core::types::Currency;

use super::record::{SensitivityKind, SensitivityRecord, SensitivityValue, UnavailableReason};
use super::stream::SensitivityStream;
use crate::cube::{CubeError, NpvCube};
use crate::scenarios::{ScenarioSet, BASE_SCENARIO};
use crate::valuation::FailureIndex;

/// Shifts smaller than this in absolute value are treated as degenerate.
pub const MIN_ABS_SHIFT: f64 = 1e-14;

/// One record position in a trade's emission plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Slot {
    Delta(usize),
    Gamma(usize),
    Cross(usize),
}

/// Reads sensitivities out of a filled cube.
///
/// Borrows everything it reads; nothing is cached, so every call recomputes
/// from the cube.
pub struct SensitivityExtractor<'a> {
    scenarios: &'a ScenarioSet,
    cube: &'a dyn NpvCube,
    failures: &'a FailureIndex,
    currencies: &'a [Currency],
    plan: Vec<Slot>,
}

impl<'a> SensitivityExtractor<'a> {
    /// Creates an extractor over a cube filled from `scenarios`.
    ///
    /// `currencies` holds each trade's NPV currency in cube trade order.
    pub fn new(
        scenarios: &'a ScenarioSet,
        cube: &'a dyn NpvCube,
        failures: &'a FailureIndex,
        currencies: &'a [Currency],
    ) -> Result<Self, CubeError> {
        if cube.num_scenarios() != scenarios.len() {
            return Err(CubeError::ShapeMismatch {
                axis: "scenarios",
                expected: scenarios.len(),
                got: cube.num_scenarios(),
            });
        }
        if currencies.len() != cube.num_trades() {
            return Err(CubeError::ShapeMismatch {
                axis: "trades",
                expected: cube.num_trades(),
                got: currencies.len(),
            });
        }
        Ok(Self::assemble(scenarios, cube, failures, currencies))
    }

    /// Builds an extractor whose inputs are known to agree in shape.
    pub(crate) fn assemble(
        scenarios: &'a ScenarioSet,
        cube: &'a dyn NpvCube,
        failures: &'a FailureIndex,
        currencies: &'a [Currency],
    ) -> Self {
        let mut plan = Vec::new();
        for (i, factor) in scenarios.factors().iter().enumerate() {
            plan.push(Slot::Delta(i));
            if factor.down.is_some() {
                plan.push(Slot::Gamma(i));
            }
        }
        plan.extend((0..scenarios.cross_pairs().len()).map(Slot::Cross));

        Self {
            scenarios,
            cube,
            failures,
            currencies,
            plan,
        }
    }

    /// The scenario set the cube was filled from.
    pub fn scenarios(&self) -> &'a ScenarioSet {
        self.scenarios
    }

    /// The underlying cube.
    pub fn cube(&self) -> &'a dyn NpvCube {
        self.cube
    }

    /// Base NPV of a trade, if it priced.
    pub fn base_npv(&self, trade_id: &str) -> Option<f64> {
        let trade = self.cube.trade_index(trade_id)?;
        self.base(trade).ok()
    }

    /// First-order sensitivity to `factor`.
    pub fn delta(&self, trade_id: &str, factor: &RiskFactorKey) -> SensitivityValue {
        self.with_trade(trade_id, |trade| {
            let f = self
                .scenarios
                .factor_position(factor)
                .ok_or(UnavailableReason::MissingScenario)?;
            self.delta_at(trade, f)
        })
    }

    /// Second-order sensitivity to `factor`.
    ///
    /// Unavailable with [`UnavailableReason::MissingScenario`] when no Down
    /// scenario was generated for the factor.
    pub fn gamma(&self, trade_id: &str, factor: &RiskFactorKey) -> SensitivityValue {
        self.with_trade(trade_id, |trade| {
            let f = self
                .scenarios
                .factor_position(factor)
                .ok_or(UnavailableReason::MissingScenario)?;
            self.gamma_at(trade, f)
        })
    }

    /// Mixed second-order sensitivity to `f1` and `f2`.
    ///
    /// Symmetric in its factors. Exactly `0.0` for a pair the cross-gamma
    /// filter excluded; the gamma of `f1` when both factors are the same.
    pub fn cross_gamma(
        &self,
        trade_id: &str,
        f1: &RiskFactorKey,
        f2: &RiskFactorKey,
    ) -> SensitivityValue {
        self.with_trade(trade_id, |trade| {
            let a = self
                .scenarios
                .factor_position(f1)
                .ok_or(UnavailableReason::MissingScenario)?;
            let b = self
                .scenarios
                .factor_position(f2)
                .ok_or(UnavailableReason::MissingScenario)?;
            if a == b {
                return self.gamma_at(trade, a);
            }
            match self.scenarios.cross_index_by_position(a, b) {
                Some(scenario) => self.cross_at(trade, a.min(b), a.max(b), scenario),
                None => {
                    self.base(trade)?;
                    Ok(0.0)
                }
            }
        })
    }

    /// Lazily streams every record, trade by trade.
    pub fn stream(&self) -> SensitivityStream<'_, 'a> {
        SensitivityStream::new(self, 0..self.cube.num_trades())
    }

    /// Streams the records of one trade; empty for an unknown trade.
    pub fn stream_for_trade(&self, trade_id: &str) -> SensitivityStream<'_, 'a> {
        let range = match self.cube.trade_index(trade_id) {
            Some(t) => t..t + 1,
            None => 0..0,
        };
        SensitivityStream::new(self, range)
    }

    /// Number of records emitted per trade.
    pub fn records_per_trade(&self) -> usize {
        self.plan.len()
    }

    pub(crate) fn plan(&self) -> &[Slot] {
        &self.plan
    }

    /// Builds the record of `slot` for trade index `trade`.
    pub(crate) fn record(&self, trade: usize, slot: Slot) -> SensitivityRecord {
        let factors = self.scenarios.factors();
        let (kind, f1, f2, value) = match slot {
            Slot::Delta(f) => (SensitivityKind::Delta, f, None, self.delta_at(trade, f)),
            Slot::Gamma(f) => (SensitivityKind::Gamma, f, None, self.gamma_at(trade, f)),
            Slot::Cross(p) => {
                let pair = self.scenarios.cross_pairs()[p];
                let value = self.cross_at(trade, pair.factor1, pair.factor2, pair.scenario);
                (
                    SensitivityKind::CrossGamma,
                    pair.factor1,
                    Some(pair.factor2),
                    value,
                )
            }
        };
        SensitivityRecord {
            trade_id: self.cube.trade_ids()[trade].clone(),
            factor1: factors[f1].key.clone(),
            shift_size1: factors[f1].absolute_shift,
            factor2: f2.map(|f| factors[f].key.clone()),
            shift_size2: f2.map(|f| factors[f].absolute_shift),
            kind,
            value: value.into(),
            base_npv: self.base(trade).ok(),
            currency: self.currencies[trade],
        }
    }

    fn with_trade<F>(&self, trade_id: &str, compute: F) -> SensitivityValue
    where
        F: FnOnce(usize) -> Result<f64, UnavailableReason>,
    {
        match self.cube.trade_index(trade_id) {
            Some(trade) => compute(trade).into(),
            None => SensitivityValue::Unavailable(UnavailableReason::BaseNpvUnavailable),
        }
    }

    fn base(&self, trade: usize) -> Result<f64, UnavailableReason> {
        if self.failures.base_failed(trade) {
            return Err(UnavailableReason::BaseNpvUnavailable);
        }
        self.cube
            .get(trade, BASE_SCENARIO)
            .ok_or(UnavailableReason::BaseNpvUnavailable)
    }

    fn npv(&self, trade: usize, scenario: usize, base: f64) -> Result<f64, UnavailableReason> {
        if self.failures.contains(trade, scenario) {
            return Err(UnavailableReason::PricingFailure);
        }
        Ok(self.cube.get(trade, scenario).unwrap_or(base))
    }

    fn shift(&self, factor: usize) -> Result<f64, UnavailableReason> {
        let h = self.scenarios.factors()[factor].absolute_shift;
        if !h.is_finite() || h.abs() < MIN_ABS_SHIFT {
            return Err(UnavailableReason::DegenerateShift);
        }
        Ok(h)
    }

    pub(crate) fn delta_at(&self, trade: usize, factor: usize) -> Result<f64, UnavailableReason> {
        let base = self.base(trade)?;
        let h = self.shift(factor)?;
        let up = self.npv(trade, self.scenarios.factors()[factor].up, base)?;
        Ok((up - base) / h)
    }

    pub(crate) fn gamma_at(&self, trade: usize, factor: usize) -> Result<f64, UnavailableReason> {
        let base = self.base(trade)?;
        let info = &self.scenarios.factors()[factor];
        let down = info.down.ok_or(UnavailableReason::MissingScenario)?;
        let h = self.shift(factor)?;
        let up = self.npv(trade, info.up, base)?;
        let down = self.npv(trade, down, base)?;
        Ok((up - 2.0 * base + down) / (h * h))
    }

    fn cross_at(
        &self,
        trade: usize,
        f1: usize,
        f2: usize,
        scenario: usize,
    ) -> Result<f64, UnavailableReason> {
        let base = self.base(trade)?;
        let (h1, h2) = (self.shift(f1)?, self.shift(f2)?);
        let factors = self.scenarios.factors();
        let up1 = self.npv(trade, factors[f1].up, base)?;
        let up2 = self.npv(trade, factors[f2].up, base)?;
        let upup = self.npv(trade, scenario, base)?;
        Ok((upup - up1 - up2 + base) / (h1 * h2))
    }
}
