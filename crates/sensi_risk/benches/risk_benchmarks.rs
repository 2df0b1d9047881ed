//! Criterion benchmarks for sensi_risk.
//!
//! Benchmarks cover:
//! - Scenario generation with and without cross-gamma pairs
//! - Cube fill (valuation) with dense and sparse backings
//! - Sensitivity extraction and aggregation

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use sensi_core::market::{MarketSnapshot, RiskFactorKind};
use sensi_core::types::{Currency, Tenor};
use sensi_models::{FxOption, Instrument, OptionType, SwapDirection, Trade, VanillaSwap};
use sensi_risk::config::{SensitivityConfig, ShiftEntry, ShiftSpec};
use sensi_risk::cube::CubeBackend;
use sensi_risk::scenarios::ScenarioGenerator;
use sensi_risk::sensitivity::SensitivityAggregator;
use sensi_risk::valuation::{CancellationToken, ValuationConfig, ValuationDriver};
use sensi_risk::generate_sensitivities;

fn pillars() -> Vec<Tenor> {
    [1, 2, 3, 4, 5, 7, 10, 12, 15, 20, 30]
        .into_iter()
        .map(Tenor::years)
        .collect()
}

fn market() -> MarketSnapshot {
    let curve = |r: f64| -> Vec<(Tenor, f64)> {
        pillars()
            .into_iter()
            .map(|t| (t, r + 0.0005 * t.as_years()))
            .collect()
    };
    MarketSnapshot::new()
        .with_curve(RiskFactorKind::DiscountCurve, "EUR", &curve(0.02))
        .unwrap()
        .with_curve(RiskFactorKind::IndexCurve, "EURIBOR", &curve(0.025))
        .unwrap()
        .with_curve(RiskFactorKind::DiscountCurve, "USD", &curve(0.04))
        .unwrap()
        .with_spot(RiskFactorKind::FxSpot, "EURUSD", 1.1)
        .unwrap()
        .with_surface(
            RiskFactorKind::FxVolatility,
            "EURUSD",
            &[Tenor::months(6), Tenor::years(1), Tenor::years(2)],
            &[1.0, 1.1, 1.2],
            &[
                vec![0.11, 0.10, 0.11],
                vec![0.12, 0.11, 0.12],
                vec![0.13, 0.12, 0.13],
            ],
        )
        .unwrap()
}

fn config(cross_gamma: bool) -> SensitivityConfig {
    let config = SensitivityConfig::new()
        .with_shift(ShiftEntry::new(
            RiskFactorKind::DiscountCurve,
            ["EUR", "USD"],
            ShiftSpec::absolute(1e-4).with_tenors(pillars()),
        ))
        .with_shift(ShiftEntry::new(
            RiskFactorKind::IndexCurve,
            ["EURIBOR"],
            ShiftSpec::absolute(1e-4).with_tenors(pillars()),
        ))
        .with_shift(ShiftEntry::new(
            RiskFactorKind::FxSpot,
            ["EURUSD"],
            ShiftSpec::relative(1e-4),
        ))
        .with_shift(ShiftEntry::new(
            RiskFactorKind::FxVolatility,
            ["EURUSD"],
            ShiftSpec::absolute(1e-4)
                .with_tenors(vec![Tenor::months(6), Tenor::years(1), Tenor::years(2)])
                .with_strikes(vec![1.0, 1.1, 1.2]),
        ));
    if cross_gamma {
        config.with_cross_gamma("DiscountCurve", "IndexCurve")
    } else {
        config
    }
}

fn portfolio(n: usize) -> Vec<Trade> {
    (0..n)
        .map(|i| {
            let instrument = if i % 2 == 0 {
                Instrument::Swap(
                    VanillaSwap::new(
                        Currency::EUR,
                        "EURIBOR",
                        1e6,
                        0.02 + 0.001 * (i % 10) as f64,
                        1 + (i % 30) as u32,
                        SwapDirection::Payer,
                    )
                    .unwrap(),
                )
            } else {
                Instrument::FxOption(
                    FxOption::new(
                        Currency::EUR,
                        Currency::USD,
                        1e6,
                        1.0 + 0.02 * (i % 10) as f64,
                        Tenor::years(1),
                        OptionType::Call,
                    )
                    .unwrap(),
                )
            };
            Trade::new(format!("T{i:05}"), instrument).unwrap()
        })
        .collect()
}

/// Benchmark scenario enumeration.
fn bench_scenario_generation(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenario_generation");
    let market = market();

    for cross_gamma in [false, true] {
        let generator = ScenarioGenerator::new(&config(cross_gamma)).unwrap();
        let label = if cross_gamma { "with_cross" } else { "no_cross" };
        group.bench_function(label, |b| {
            b.iter(|| generator.generate(black_box(&market)));
        });
    }

    group.finish();
}

/// Benchmark cube fill per backing and portfolio size.
fn bench_cube_fill(c: &mut Criterion) {
    let mut group = c.benchmark_group("cube_fill");
    group.sample_size(10);
    let market = market();
    let scenarios = ScenarioGenerator::new(&config(false))
        .unwrap()
        .generate(&market);
    let cancel = CancellationToken::new();

    for n_trades in [10, 100] {
        let trades = portfolio(n_trades);
        for backend in [CubeBackend::Dense, CubeBackend::Sparse] {
            let driver = ValuationDriver::new(ValuationConfig::default().with_backend(backend));
            group.bench_with_input(
                BenchmarkId::new(backend.to_string(), n_trades),
                &trades,
                |b, trades| {
                    b.iter(|| {
                        driver
                            .value(&market, &scenarios, black_box(trades.as_slice()), &cancel)
                            .unwrap()
                    });
                },
            );
        }
    }

    group.finish();
}

/// Benchmark record extraction and aggregation from a filled cube.
fn bench_extraction(c: &mut Criterion) {
    let mut group = c.benchmark_group("extraction");
    let run = generate_sensitivities(
        &config(true),
        &market(),
        &portfolio(100),
        &ValuationConfig::default(),
        &CancellationToken::new(),
    )
    .unwrap();

    group.bench_function("stream_all", |b| {
        b.iter(|| run.extractor().stream().count());
    });

    let records = run.records();
    let aggregator = SensitivityAggregator::new();
    group.bench_function("aggregate_by_category", |b| {
        b.iter(|| aggregator.by_currency_category_kind(black_box(&records)));
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_scenario_generation,
    bench_cube_fill,
    bench_extraction
);
criterion_main!(benches);
