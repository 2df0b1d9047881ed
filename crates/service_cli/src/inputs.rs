//! Loading the shift configuration, market and portfolio of a run.

use std::collections::HashSet;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use sensi_core::market::{MarketData, MarketSnapshot};
use sensi_core::traits::Priceable;
use sensi_models::Trade;
use sensi_risk::config::SensitivityConfig;

use crate::config::InputPaths;
use crate::error::{CliError, Result};

/// Portfolio file layout: `{"trades": [...]}`.
#[derive(Debug, Deserialize)]
struct Portfolio {
    trades: Vec<Trade>,
}

/// Validated inputs of one run.
#[derive(Debug)]
pub struct RunInputs {
    pub shifts: SensitivityConfig,
    pub market: MarketSnapshot,
    pub trades: Vec<Trade>,
}

impl RunInputs {
    /// Reads and validates all three inputs.
    pub fn load(paths: &InputPaths) -> Result<Self> {
        let shifts = load_shifts(&paths.shifts)?;
        let market = load_market(&paths.market)?;
        let trades = load_portfolio(&paths.portfolio)?;
        tracing::info!(
            shift_entries = shifts.shifts.len(),
            market_objects = market.len(),
            trades = trades.len(),
            "Inputs loaded"
        );
        Ok(Self {
            shifts,
            market,
            trades,
        })
    }
}

fn read(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(CliError::FileNotFound(path.to_path_buf()));
    }
    std::fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_json<T: DeserializeOwned>(path: &Path, text: &str) -> Result<T> {
    serde_json::from_str(text).map_err(|source| CliError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads and validates a shift configuration.
pub fn load_shifts(path: &Path) -> Result<SensitivityConfig> {
    if !path.exists() {
        return Err(CliError::FileNotFound(path.to_path_buf()));
    }
    let config = SensitivityConfig::from_file(path)?;
    config.validate()?;
    Ok(config)
}

/// Reads a market description and builds the snapshot.
pub fn load_market(path: &Path) -> Result<MarketSnapshot> {
    let data: MarketData = parse_json(path, &read(path)?)?;
    Ok(MarketSnapshot::try_from(data)?)
}

/// Reads a portfolio, validating every trade and rejecting duplicate ids.
pub fn load_portfolio(path: &Path) -> Result<Vec<Trade>> {
    let portfolio: Portfolio = parse_json(path, &read(path)?)?;
    parse_trades(portfolio.trades)
}

fn parse_trades(trades: Vec<Trade>) -> Result<Vec<Trade>> {
    {
        let mut seen = HashSet::new();
        for trade in &trades {
            trade.validate().map_err(|source| CliError::Trade {
                trade_id: trade.trade_id().to_string(),
                source,
            })?;
            if !seen.insert(trade.trade_id()) {
                return Err(CliError::InvalidArgument(format!(
                    "duplicate trade id '{}' in portfolio",
                    trade.trade_id()
                )));
            }
        }
    }
    Ok(trades)
}
