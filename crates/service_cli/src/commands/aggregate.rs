//! Aggregate command implementation
//!
//! Reads a sensitivity CSV back and prints grouped totals.

use std::path::Path;

use clap::ValueEnum;
use sensi_risk::sensitivity::{read_csv_file, AggregatedValue, SensitivityAggregator};

use crate::error::{CliError, Result};

/// Grouping applied to the records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum GroupBy {
    /// Currency, factor category and kind
    Category,
    /// Currency, factor (pair) and kind
    Factor,
    /// Trade and kind
    Trade,
}

fn cell(value: &AggregatedValue) -> String {
    if value.is_complete() {
        format!("{:>18.6}  {:>6}", value.total, value.count)
    } else {
        format!(
            "{:>18.6}  {:>6}  ({} unavailable)",
            value.total, value.count, value.unavailable
        )
    }
}

/// Run the aggregate command
pub fn run(input: &Path, by: GroupBy) -> Result<()> {
    if !input.exists() {
        return Err(CliError::FileNotFound(input.to_path_buf()));
    }
    let records = read_csv_file(input)?;
    let aggregator = SensitivityAggregator::new();
    tracing::info!(records = records.len(), by = ?by, "Aggregating");

    match by {
        GroupBy::Category => {
            for (group, value) in aggregator.by_currency_category_kind(&records) {
                println!(
                    "{:<4} {:<20} {:<11} {}",
                    group.currency.to_string(),
                    group.category.to_string(),
                    group.kind.to_string(),
                    cell(&value)
                );
            }
        }
        GroupBy::Factor => {
            for (group, value) in aggregator.by_factor(&records) {
                let factor = match &group.factor2 {
                    Some(f2) => format!("{} x {}", group.factor1, f2),
                    None => group.factor1.to_string(),
                };
                println!(
                    "{:<4} {:<60} {:<11} {}",
                    group.currency.to_string(),
                    factor,
                    group.kind.to_string(),
                    cell(&value)
                );
            }
        }
        GroupBy::Trade => {
            for ((trade_id, kind), value) in aggregator.by_trade(&records) {
                println!("{:<20} {:<11} {}", trade_id, kind.to_string(), cell(&value));
            }
        }
    }
    Ok(())
}
