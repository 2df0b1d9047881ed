//! Valuation driver: prices every trade under every scenario.

use std::time::Instant;

use sensi_core::market::{MarketSnapshot, MarketView};
use sensi_core::traits::Priceable;
use sensi_core::types::PricingError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::cancel::CancellationToken;
use super::failures::{FailureIndex, PricingFailureRecord};
use crate::cube::{CubeBackend, CubeError, NpvCube};
use crate::parallel::{ordered_map, ParallelConfig};
use crate::scenarios::{Scenario, ScenarioSet, BASE_SCENARIO};

/// Errors that abort a whole valuation.
///
/// Individual pricing failures never do; they end up in the
/// [`FailureIndex`].
#[derive(Debug, Error)]
pub enum ValuationError {
    /// The run was cancelled; the partial cube has been discarded.
    #[error("Valuation cancelled after {completed} of {total} scenarios")]
    Cancelled {
        /// Scenarios fully valued before cancellation was observed
        completed: usize,
        /// Scenarios in the set
        total: usize,
    },

    /// The scenario set has no base scenario.
    #[error("Scenario set has no base scenario")]
    MissingBaseScenario,

    /// Cube allocation or write failed.
    #[error("Cube error: {0}")]
    Cube(#[from] CubeError),

    /// The dedicated thread pool could not be built.
    #[error("Failed to build valuation thread pool: {0}")]
    ThreadPool(String),
}

/// Valuation options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValuationConfig {
    /// Sequential/parallel switch over scenarios
    pub parallel: ParallelConfig,
    /// Cube backing
    pub backend: CubeBackend,
    /// Dedicated pool size; `None` uses the global rayon pool
    pub threads: Option<usize>,
}

impl ValuationConfig {
    /// Sets the cube backing.
    pub fn with_backend(mut self, backend: CubeBackend) -> Self {
        self.backend = backend;
        self
    }

    /// Sets the parallel configuration.
    pub fn with_parallel(mut self, parallel: ParallelConfig) -> Self {
        self.parallel = parallel;
        self
    }

    /// Runs on a dedicated pool of `threads` workers.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }
}

/// Statistics for one valuation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValuationStats {
    /// Number of trades.
    pub trades: usize,
    /// Number of scenarios, base included.
    pub scenarios: usize,
    /// Trade pricings attempted.
    pub pricings: usize,
    /// Pricings that failed.
    pub failures: usize,
    /// Cells stored in the cube.
    pub populated_cells: usize,
    /// Wall time in nanoseconds.
    pub total_time_ns: u64,
    /// Whether the non-base scenarios were valued in parallel.
    pub used_parallel: bool,
}

impl ValuationStats {
    /// Wall time in milliseconds.
    #[inline]
    pub fn total_time_ms(&self) -> f64 {
        self.total_time_ns as f64 / 1_000_000.0
    }

    /// Share of pricings that succeeded, as a percentage.
    #[inline]
    pub fn success_rate(&self) -> f64 {
        if self.pricings == 0 {
            0.0
        } else {
            (self.pricings - self.failures) as f64 / self.pricings as f64 * 100.0
        }
    }
}

/// A completed valuation.
pub struct Valuation {
    /// NPVs by (trade, scenario)
    pub cube: Box<dyn NpvCube>,
    /// Cells that failed to price
    pub failures: FailureIndex,
    /// Run statistics
    pub stats: ValuationStats,
}

impl std::fmt::Debug for Valuation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Valuation")
            .field("trades", &self.cube.num_trades())
            .field("scenarios", &self.cube.num_scenarios())
            .field("failures", &self.failures.len())
            .field("stats", &self.stats)
            .finish()
    }
}

type Column = Vec<Result<f64, PricingError>>;

/// Prices a portfolio under every scenario of a [`ScenarioSet`].
///
/// The base scenario is valued first; the remaining scenarios are valued
/// sequentially or in parallel over the scenario index. Each worker builds
/// its own [`MarketView`] from the shared snapshot and returns one column,
/// and columns are written to the cube after collection.
#[derive(Debug, Clone, Default)]
pub struct ValuationDriver {
    config: ValuationConfig,
}

impl ValuationDriver {
    /// Creates a driver.
    pub fn new(config: ValuationConfig) -> Self {
        Self { config }
    }

    /// The driver's configuration.
    pub fn config(&self) -> &ValuationConfig {
        &self.config
    }

    /// Values `trades` under every scenario.
    ///
    /// # Errors
    ///
    /// [`ValuationError::Cancelled`] if `cancel` fires before the run
    /// completes; no partial results are returned.
    pub fn value<T>(
        &self,
        market: &MarketSnapshot,
        scenarios: &ScenarioSet,
        trades: &[T],
        cancel: &CancellationToken,
    ) -> Result<Valuation, ValuationError>
    where
        T: Priceable + Sync,
    {
        let start = Instant::now();
        let total = scenarios.len();
        let base = scenarios
            .get(BASE_SCENARIO)
            .ok_or(ValuationError::MissingBaseScenario)?;

        let trade_ids: Vec<String> = trades.iter().map(|t| t.trade_id().to_string()).collect();
        let mut cube = self.config.backend.allocate(trade_ids, total)?;
        let mut failures = FailureIndex::new();

        if cancel.is_cancelled() {
            return Err(ValuationError::Cancelled {
                completed: 0,
                total,
            });
        }
        let base_column = price_column(market, base, trades);
        store_column(cube.as_mut(), &mut failures, trades, base, base_column)?;

        let rest = &scenarios.scenarios()[1..];
        let run = || {
            ordered_map(rest, &self.config.parallel, |scenario| {
                if cancel.is_cancelled() {
                    return None;
                }
                tracing::debug!(scenario = scenario.index(), label = %scenario.label(), "Valuing scenario");
                Some(price_column(market, scenario, trades))
            })
        };
        let (columns, used_parallel) = match self.config.threads {
            Some(threads) => rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()
                .map_err(|e| ValuationError::ThreadPool(e.to_string()))?
                .install(run),
            None => run(),
        };

        if cancel.is_cancelled() {
            let completed = 1 + columns.iter().filter(|c| c.is_some()).count();
            tracing::warn!(completed, total, "Valuation cancelled, discarding partial cube");
            return Err(ValuationError::Cancelled { completed, total });
        }

        for (scenario, column) in rest.iter().zip(columns) {
            let column = column.ok_or(ValuationError::Cancelled {
                completed: scenario.index(),
                total,
            })?;
            store_column(cube.as_mut(), &mut failures, trades, scenario, column)?;
        }

        let total_time_ns = start.elapsed().as_nanos() as u64;
        let stats = ValuationStats {
            trades: trades.len(),
            scenarios: total,
            pricings: trades.len() * total,
            failures: failures.len(),
            populated_cells: cube.populated(),
            total_time_ns,
            used_parallel,
        };
        tracing::info!(
            trades = stats.trades,
            scenarios = stats.scenarios,
            failures = stats.failures,
            parallel = stats.used_parallel,
            backend = %self.config.backend,
            "Valuation completed in {:.1} ms",
            stats.total_time_ms()
        );

        Ok(Valuation {
            cube,
            failures,
            stats,
        })
    }
}

fn price_trade<T: Priceable>(trade: &T, view: &MarketView<'_>) -> Result<f64, PricingError> {
    let npv = trade.price(view)?;
    if npv.is_finite() {
        Ok(npv)
    } else {
        Err(PricingError::NumericalInstability(format!(
            "non-finite NPV {npv}"
        )))
    }
}

fn price_column<T: Priceable>(market: &MarketSnapshot, scenario: &Scenario, trades: &[T]) -> Column {
    let view = if scenario.shifts().is_empty() {
        Ok(market.view())
    } else {
        market.apply(scenario.shifts())
    };
    match view {
        Ok(view) => trades.iter().map(|t| price_trade(t, &view)).collect(),
        Err(e) => trades
            .iter()
            .map(|_| Err(PricingError::MarketData(e.clone())))
            .collect(),
    }
}

fn store_column<T: Priceable>(
    cube: &mut dyn NpvCube,
    failures: &mut FailureIndex,
    trades: &[T],
    scenario: &Scenario,
    column: Column,
) -> Result<(), ValuationError> {
    for (trade, result) in column.into_iter().enumerate() {
        match result {
            Ok(npv) => cube.set(trade, scenario.index(), npv)?,
            Err(error) => {
                let failure = PricingFailureRecord {
                    trade_id: trades[trade].trade_id().to_string(),
                    trade,
                    scenario: scenario.index(),
                    scenario_label: scenario.label(),
                    error,
                };
                tracing::debug!(%failure, "Pricing failed");
                failures.record(failure);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{SensitivityConfig, ShiftEntry, ShiftSpec};
    use crate::scenarios::ScenarioGenerator;
    use sensi_core::market::RiskFactorKind;
    use sensi_core::types::Currency;

    /// Holds `units` of the EURUSD spot; fails to price above `cap`.
    struct SpotTrade {
        id: String,
        units: f64,
        cap: f64,
    }

    impl Priceable for SpotTrade {
        fn trade_id(&self) -> &str {
            &self.id
        }

        fn currency(&self) -> Currency {
            Currency::USD
        }

        fn price(&self, market: &MarketView<'_>) -> Result<f64, PricingError> {
            let spot = market.spot(RiskFactorKind::FxSpot, "EURUSD")?;
            if spot > self.cap {
                return Err(PricingError::ModelFailure("spot above cap".into()));
            }
            Ok(self.units * spot)
        }
    }

    fn trade(id: &str, units: f64, cap: f64) -> SpotTrade {
        SpotTrade {
            id: id.to_string(),
            units,
            cap,
        }
    }

    fn setup() -> (MarketSnapshot, ScenarioSet) {
        let market = MarketSnapshot::new()
            .with_spot(RiskFactorKind::FxSpot, "EURUSD", 1.0)
            .unwrap();
        let config = SensitivityConfig::new().with_shift(ShiftEntry::new(
            RiskFactorKind::FxSpot,
            ["EURUSD"],
            ShiftSpec::absolute(0.01),
        ));
        let set = ScenarioGenerator::new(&config).unwrap().generate(&market);
        (market, set)
    }

    #[test]
    fn test_value_fills_cube() {
        let (market, set) = setup();
        let trades = vec![trade("A", 100.0, f64::INFINITY), trade("B", -50.0, f64::INFINITY)];
        let valuation = ValuationDriver::default()
            .value(&market, &set, &trades, &CancellationToken::new())
            .unwrap();
        let cube = &valuation.cube;
        assert_eq!(cube.get(0, 0), Some(100.0));
        assert!((cube.get(0, 1).unwrap() - 101.0).abs() < 1e-12);
        assert!((cube.get(1, 2).unwrap() + 49.5).abs() < 1e-12);
        assert_eq!(valuation.stats.pricings, 6);
        assert!(valuation.failures.is_empty());
        assert!((valuation.stats.success_rate() - 100.0).abs() < 1e-12);
    }

    #[test]
    fn test_pricing_failure_is_isolated() {
        let (market, set) = setup();
        let trades = vec![trade("A", 100.0, 1.005), trade("B", 1.0, f64::INFINITY)];
        let valuation = ValuationDriver::default()
            .value(&market, &set, &trades, &CancellationToken::new())
            .unwrap();
        // A fails only under the up scenario
        assert_eq!(valuation.failures.len(), 1);
        assert!(valuation.failures.contains(0, 1));
        assert_eq!(valuation.cube.get(0, 1), None);
        assert!(valuation.cube.get(0, 2).is_some());
        assert!(valuation.cube.get(1, 1).is_some());
        assert_eq!(
            valuation.failures.records()[0].scenario_label,
            "Up:FxSpot/EURUSD/0/spot"
        );
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let (market, set) = setup();
        let trades: Vec<SpotTrade> = (0..20)
            .map(|i| trade(&format!("T{i}"), i as f64, f64::INFINITY))
            .collect();
        let seq = ValuationDriver::new(ValuationConfig::default().with_parallel(ParallelConfig::sequential()))
            .value(&market, &set, &trades, &CancellationToken::new())
            .unwrap();
        let par = ValuationDriver::new(
            ValuationConfig::default()
                .with_parallel(ParallelConfig::new(1, 1))
                .with_threads(2),
        )
        .value(&market, &set, &trades, &CancellationToken::new())
        .unwrap();
        assert!(par.stats.used_parallel);
        assert!(!seq.stats.used_parallel);
        for t in 0..trades.len() {
            for s in 0..set.len() {
                assert_eq!(seq.cube.get(t, s), par.cube.get(t, s));
            }
        }
    }

    #[test]
    fn test_cancelled_run_returns_no_cube() {
        let (market, set) = setup();
        let token = CancellationToken::new();
        token.cancel();
        let result = ValuationDriver::default().value(&market, &set, &[trade("A", 1.0, 2.0)], &token);
        assert!(matches!(
            result,
            Err(ValuationError::Cancelled { completed: 0, .. })
        ));
    }

    #[test]
    fn test_duplicate_trade_ids_rejected() {
        let (market, set) = setup();
        let trades = vec![trade("A", 1.0, 2.0), trade("A", 2.0, 2.0)];
        let result = ValuationDriver::default().value(&market, &set, &trades, &CancellationToken::new());
        assert!(matches!(
            result,
            Err(ValuationError::Cube(CubeError::DuplicateTrade(_)))
        ));
    }
}
