//! Run command implementation
//!
//! Generates the scenarios, values the portfolio, writes the sensitivity
//! CSV and the diagnostics sidecar.

use std::fs;
use std::path::Path;

use serde::Serialize;
use sensi_risk::sensitivity::{write_csv_file, RiskFilter};
use sensi_risk::valuation::{CancellationToken, ValuationStats};
use sensi_risk::{generate_sensitivities, Diagnostics, SensitivityReport};
use tracing::{info, warn};

use crate::config::RunConfig;
use crate::error::{CliError, Result};
use crate::inputs::RunInputs;

/// Diagnostics sidecar layout.
#[derive(Debug, Serialize)]
struct DiagnosticsFile {
    records: usize,
    unavailable: usize,
    stats: StatsEntry,
    skipped_factors: Vec<SkippedEntry>,
    pricing_failures: Vec<FailureEntry>,
}

#[derive(Debug, Serialize)]
struct StatsEntry {
    trades: usize,
    scenarios: usize,
    pricings: usize,
    failures: usize,
    populated_cells: usize,
    total_time_ms: f64,
    used_parallel: bool,
}

#[derive(Debug, Serialize)]
struct SkippedEntry {
    category: String,
    qualifier: String,
    reason: String,
}

#[derive(Debug, Serialize)]
struct FailureEntry {
    trade_id: String,
    scenario: usize,
    scenario_label: String,
    error: String,
}

impl DiagnosticsFile {
    fn new(report: &SensitivityReport, stats: &ValuationStats) -> Self {
        let Diagnostics {
            skipped_factors,
            pricing_failures,
        } = &report.diagnostics;
        Self {
            records: report.records.len(),
            unavailable: report
                .records
                .iter()
                .filter(|r| !r.value.is_available())
                .count(),
            stats: StatsEntry {
                trades: stats.trades,
                scenarios: stats.scenarios,
                pricings: stats.pricings,
                failures: stats.failures,
                populated_cells: stats.populated_cells,
                total_time_ms: stats.total_time_ms(),
                used_parallel: stats.used_parallel,
            },
            skipped_factors: skipped_factors
                .iter()
                .map(|s| SkippedEntry {
                    category: s.category.to_string(),
                    qualifier: s.qualifier.clone(),
                    reason: s.reason.clone(),
                })
                .collect(),
            pricing_failures: pricing_failures
                .iter()
                .map(|f| FailureEntry {
                    trade_id: f.trade_id.clone(),
                    scenario: f.scenario,
                    scenario_label: f.scenario_label.clone(),
                    error: f.error.to_string(),
                })
                .collect(),
        }
    }
}

fn ensure_parent(path: &Path) -> Result<()> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => {
            fs::create_dir_all(dir).map_err(|source| CliError::Io {
                path: dir.to_path_buf(),
                source,
            })
        }
        _ => Ok(()),
    }
}

fn write_diagnostics(path: &Path, diagnostics: &DiagnosticsFile) -> Result<()> {
    ensure_parent(path)?;
    let json = serde_json::to_string_pretty(diagnostics).map_err(|source| CliError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, json).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Run the sensitivity command
pub fn run(config: &RunConfig, filter: &RiskFilter) -> Result<()> {
    info!(
        backend = %config.valuation.backend,
        threads = ?config.valuation.threads,
        cpus = num_cpus::get(),
        "Starting sensitivity run"
    );
    let inputs = RunInputs::load(&config.inputs)?;

    let sensitivities = generate_sensitivities(
        &inputs.shifts,
        &inputs.market,
        &inputs.trades,
        &config.valuation,
        &CancellationToken::new(),
    )?;
    let report = sensitivities.report_filtered(filter);

    ensure_parent(&config.output.sensitivities)?;
    let written = write_csv_file(&config.output.sensitivities, &report.records)?;

    let diagnostics = DiagnosticsFile::new(&report, &sensitivities.valuation.stats);
    if let Some(path) = &config.output.diagnostics {
        write_diagnostics(path, &diagnostics)?;
        info!(path = %path.display(), "Diagnostics written");
    }
    for skipped in &report.diagnostics.skipped_factors {
        warn!(
            category = %skipped.category,
            qualifier = %skipped.qualifier,
            reason = %skipped.reason,
            "Factor not simulated"
        );
    }
    if !report.diagnostics.pricing_failures.is_empty() {
        warn!(
            failures = report.diagnostics.pricing_failures.len(),
            "Some scenarios failed to price; affected sensitivities are unavailable"
        );
    }

    println!("Trades:          {}", diagnostics.stats.trades);
    println!("Scenarios:       {}", diagnostics.stats.scenarios);
    println!("Records written: {}", written);
    println!("Unavailable:     {}", diagnostics.unavailable);
    println!("Skipped factors: {}", diagnostics.skipped_factors.len());
    println!("Failed pricings: {}", diagnostics.pricing_failures.len());
    println!("Elapsed:         {:.1} ms", diagnostics.stats.total_time_ms);
    println!("Output:          {}", config.output.sensitivities.display());
    Ok(())
}
