//! End-to-end sensitivity run.

use sensi_core::market::MarketSnapshot;
use sensi_core::traits::Priceable;
use sensi_core::types::Currency;

use crate::config::SensitivityConfig;
use crate::error::SensiError;
use crate::scenarios::{ScenarioGenerator, ScenarioSet, SkippedFactor};
use crate::sensitivity::{RiskFilter, SensitivityExtractor, SensitivityRecord};
use crate::valuation::{
    CancellationToken, PricingFailureRecord, Valuation, ValuationConfig, ValuationDriver,
};

/// Validates `config`, generates the scenarios for `market`, and values
/// `trades` under each of them.
///
/// Configuration errors are returned before any pricing work starts.
/// Unsimulated factors and pricing failures do not fail the run; they are
/// reported through [`SensitivityRun::report`].
///
/// # Examples
///
/// ```
/// use sensi_core::market::{MarketSnapshot, MarketView, RiskFactorKey, RiskFactorKind};
/// use sensi_core::traits::Priceable;
/// use sensi_core::types::{Currency, PricingError};
/// use sensi_risk::config::{SensitivityConfig, ShiftEntry, ShiftSpec};
/// use sensi_risk::generate_sensitivities;
/// use sensi_risk::valuation::{CancellationToken, ValuationConfig};
///
/// struct Stock(f64);
///
/// impl Priceable for Stock {
///     fn trade_id(&self) -> &str {
///         "STOCK"
///     }
///     fn currency(&self) -> Currency {
///         Currency::USD
///     }
///     fn price(&self, market: &MarketView<'_>) -> Result<f64, PricingError> {
///         Ok(self.0 * market.spot(RiskFactorKind::EquitySpot, "ACME")?)
///     }
/// }
///
/// let market = MarketSnapshot::new()
///     .with_spot(RiskFactorKind::EquitySpot, "ACME", 50.0)
///     .unwrap();
/// let config = SensitivityConfig::new().with_shift(ShiftEntry::new(
///     RiskFactorKind::EquitySpot,
///     ["ACME"],
///     ShiftSpec::absolute(0.5),
/// ));
///
/// let run = generate_sensitivities(
///     &config,
///     &market,
///     &[Stock(10.0)],
///     &ValuationConfig::default(),
///     &CancellationToken::new(),
/// )
/// .unwrap();
///
/// let spot: RiskFactorKey = "EquitySpot/ACME/0/spot".parse().unwrap();
/// let delta = run.extractor().delta("STOCK", &spot).value().unwrap();
/// assert!((delta - 10.0).abs() < 1e-9);
/// ```
pub fn generate_sensitivities<T>(
    config: &SensitivityConfig,
    market: &MarketSnapshot,
    trades: &[T],
    options: &ValuationConfig,
    cancel: &CancellationToken,
) -> Result<SensitivityRun, SensiError>
where
    T: Priceable + Sync,
{
    let generator = ScenarioGenerator::new(config)?;
    let scenarios = generator.generate(market);
    let valuation = ValuationDriver::new(options.clone()).value(market, &scenarios, trades, cancel)?;
    let currencies = trades.iter().map(Priceable::currency).collect();

    let run = SensitivityRun {
        scenarios,
        valuation,
        currencies,
    };
    tracing::info!(
        factors = run.scenarios.factors().len(),
        records_per_trade = run.extractor().records_per_trade(),
        skipped = run.scenarios.skipped().len(),
        failures = run.valuation.failures.len(),
        "Sensitivity run ready"
    );
    Ok(run)
}

/// Everything a completed run produced.
///
/// The cube is retained, so records can be streamed as many times as
/// needed.
#[derive(Debug)]
pub struct SensitivityRun {
    /// Generated scenarios and factors
    pub scenarios: ScenarioSet,
    /// Filled cube, pricing failures and statistics
    pub valuation: Valuation,
    /// NPV currency of each trade, in cube order
    pub currencies: Vec<Currency>,
}

impl SensitivityRun {
    /// Extractor over this run's cube.
    pub fn extractor(&self) -> SensitivityExtractor<'_> {
        SensitivityExtractor::assemble(
            &self.scenarios,
            self.valuation.cube.as_ref(),
            &self.valuation.failures,
            &self.currencies,
        )
    }

    /// Every record, collected.
    pub fn records(&self) -> Vec<SensitivityRecord> {
        self.extractor().stream().collect()
    }

    /// Every record plus the run diagnostics.
    pub fn report(&self) -> SensitivityReport {
        self.report_filtered(&RiskFilter::new())
    }

    /// The records `filter` selects, plus the full run diagnostics.
    pub fn report_filtered(&self, filter: &RiskFilter) -> SensitivityReport {
        let extractor = self.extractor();
        SensitivityReport {
            records: filter.apply(extractor.stream()).collect(),
            diagnostics: self.diagnostics(),
        }
    }

    /// Skipped factors and pricing failures.
    pub fn diagnostics(&self) -> Diagnostics {
        Diagnostics {
            skipped_factors: self.scenarios.skipped().to_vec(),
            pricing_failures: self.valuation.failures.records().to_vec(),
        }
    }
}

/// A sensitivity report: records, some possibly unavailable, and the
/// sidecar diagnostics explaining them.
#[derive(Debug, Clone)]
pub struct SensitivityReport {
    /// Records in stream order
    pub records: Vec<SensitivityRecord>,
    /// What went wrong along the way
    pub diagnostics: Diagnostics,
}

/// Run diagnostics.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    /// Configured factors the market does not simulate
    pub skipped_factors: Vec<SkippedFactor>,
    /// Cells that failed to price
    pub pricing_failures: Vec<PricingFailureRecord>,
}

impl Diagnostics {
    /// Returns true if nothing was skipped and everything priced.
    pub fn is_clean(&self) -> bool {
        self.skipped_factors.is_empty() && self.pricing_failures.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigError, ShiftEntry, ShiftSpec};
    use crate::cube::CubeError;
    use crate::sensitivity::SensitivityKind;
    use crate::valuation::ValuationError;
    use sensi_core::market::{MarketView, RiskFactorKind};
    use sensi_core::types::PricingError;

    struct Fx {
        id: &'static str,
        units: f64,
    }

    impl Priceable for Fx {
        fn trade_id(&self) -> &str {
            self.id
        }

        fn currency(&self) -> Currency {
            Currency::USD
        }

        fn price(&self, market: &MarketView<'_>) -> Result<f64, PricingError> {
            let s = market.spot(RiskFactorKind::FxSpot, "EURUSD")?;
            Ok(self.units * s * s)
        }
    }

    fn market() -> MarketSnapshot {
        MarketSnapshot::new()
            .with_spot(RiskFactorKind::FxSpot, "EURUSD", 1.1)
            .unwrap()
    }

    fn config() -> SensitivityConfig {
        SensitivityConfig::new()
            .with_shift(ShiftEntry::new(
                RiskFactorKind::FxSpot,
                ["EURUSD", "GBPUSD"],
                ShiftSpec::relative(1e-4),
            ))
    }

    #[test]
    fn test_run_and_report() {
        let trades = [Fx { id: "A", units: 1.0 }, Fx { id: "B", units: -2.0 }];
        let run = generate_sensitivities(
            &config(),
            &market(),
            &trades,
            &ValuationConfig::default(),
            &CancellationToken::new(),
        )
        .unwrap();

        let report = run.report();
        // One factor with delta and gamma, two trades
        assert_eq!(report.records.len(), 4);
        assert_eq!(report.diagnostics.skipped_factors.len(), 1);
        assert!(report.diagnostics.pricing_failures.is_empty());

        let gamma = report
            .records
            .iter()
            .find(|r| r.trade_id == "B" && r.kind == SensitivityKind::Gamma)
            .unwrap();
        // d2/ds2 of -2 s^2
        assert!((gamma.value.value().unwrap() + 4.0).abs() < 1e-4);

        let deltas = run.report_filtered(&RiskFilter::new().with_kind(SensitivityKind::Delta));
        assert_eq!(deltas.records.len(), 2);
    }

    #[test]
    fn test_config_error_fails_fast() {
        let bad = SensitivityConfig::new().with_shift(ShiftEntry::new(
            RiskFactorKind::FxSpot,
            ["EURUSD"],
            ShiftSpec::absolute(0.0),
        ));
        let result = generate_sensitivities(
            &bad,
            &market(),
            &[Fx { id: "A", units: 1.0 }],
            &ValuationConfig::default(),
            &CancellationToken::new(),
        );
        assert!(matches!(
            result,
            Err(SensiError::Config(ConfigError::InvalidShiftSize { .. }))
        ));
    }

    #[test]
    fn test_duplicate_trade_ids() {
        let trades = [Fx { id: "A", units: 1.0 }, Fx { id: "A", units: 2.0 }];
        let result = generate_sensitivities(
            &config(),
            &market(),
            &trades,
            &ValuationConfig::default(),
            &CancellationToken::new(),
        );
        assert!(matches!(
            result,
            Err(SensiError::Valuation(ValuationError::Cube(CubeError::DuplicateTrade(_))))
        ));
    }
}
