//! NPV cube: one NPV per (trade, scenario).
//!
//! The cube is a passive store. Readers treat a cell that was never
//! populated as "unchanged from base"; pricing failures are tracked
//! separately by the valuation driver, so the cube only ever holds finite
//! values.
//!
//! Two interchangeable backings implement [`NpvCube`]:
//!
//! | Backing | Storage | Suited to |
//! |---------|---------|-----------|
//! | [`DenseNpvCube`] | scenario-major `Vec<f64>` | most portfolios |
//! | [`SparseNpvCube`] | hash map, base-equal cells dropped | many factors a trade is blind to |

mod dense;
mod sparse;

pub use dense::DenseNpvCube;
pub use sparse::SparseNpvCube;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from writing to a cube.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CubeError {
    /// Trade index beyond the cube.
    #[error("Trade index {index} out of range (cube has {len} trades)")]
    TradeOutOfRange {
        /// Requested index
        index: usize,
        /// Number of trades
        len: usize,
    },

    /// Scenario index beyond the cube.
    #[error("Scenario index {index} out of range (cube has {len} scenarios)")]
    ScenarioOutOfRange {
        /// Requested index
        index: usize,
        /// Number of scenarios
        len: usize,
    },

    /// NaN or infinite NPV.
    #[error("Non-finite NPV {value} for trade {trade}, scenario {scenario}")]
    NonFinite {
        /// Trade index
        trade: usize,
        /// Scenario index
        scenario: usize,
        /// The rejected value
        value: f64,
    },

    /// Cube dimensions disagree with the scenario set or portfolio.
    #[error("Cube shape mismatch: expected {expected} {axis}, got {got}")]
    ShapeMismatch {
        /// `"trades"` or `"scenarios"`
        axis: &'static str,
        /// Expected count
        expected: usize,
        /// Actual count
        got: usize,
    },

    /// Two trades share an identifier.
    #[error("Duplicate trade id: {0}")]
    DuplicateTrade(String),
}

/// Read/write access to a (trade × scenario) NPV grid.
///
/// Trades and scenarios are addressed by compact indices; trade identifiers
/// map to indices through [`trade_index`](Self::trade_index).
pub trait NpvCube: Send + Sync {
    /// Number of trades.
    fn num_trades(&self) -> usize;

    /// Number of scenarios.
    fn num_scenarios(&self) -> usize;

    /// Trade identifiers in index order.
    fn trade_ids(&self) -> &[String];

    /// Index of a trade identifier.
    fn trade_index(&self, trade_id: &str) -> Option<usize>;

    /// NPV of `(trade, scenario)`, or `None` if not populated.
    fn get(&self, trade: usize, scenario: usize) -> Option<f64>;

    /// Stores a finite NPV.
    fn set(&mut self, trade: usize, scenario: usize, value: f64) -> Result<(), CubeError>;

    /// Number of populated cells.
    fn populated(&self) -> usize;
}

/// Which cube backing to allocate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CubeBackend {
    /// [`DenseNpvCube`]
    #[default]
    Dense,
    /// [`SparseNpvCube`]
    Sparse,
}

impl CubeBackend {
    /// Allocates an empty cube of this backing.
    pub fn allocate(
        &self,
        trade_ids: Vec<String>,
        num_scenarios: usize,
    ) -> Result<Box<dyn NpvCube>, CubeError> {
        Ok(match self {
            CubeBackend::Dense => Box::new(DenseNpvCube::new(trade_ids, num_scenarios)?),
            CubeBackend::Sparse => Box::new(SparseNpvCube::new(trade_ids, num_scenarios)?),
        })
    }
}

impl std::fmt::Display for CubeBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CubeBackend::Dense => write!(f, "dense"),
            CubeBackend::Sparse => write!(f, "sparse"),
        }
    }
}

/// Identifier to index map, rejecting duplicates.
pub(crate) fn index_trades(trade_ids: &[String]) -> Result<HashMap<String, usize>, CubeError> {
    let mut index = HashMap::with_capacity(trade_ids.len());
    for (i, id) in trade_ids.iter().enumerate() {
        if index.insert(id.clone(), i).is_some() {
            return Err(CubeError::DuplicateTrade(id.clone()));
        }
    }
    Ok(index)
}

/// Bounds and finiteness checks shared by both backings.
pub(crate) fn check_cell(
    cube: &dyn NpvCube,
    trade: usize,
    scenario: usize,
    value: f64,
) -> Result<(), CubeError> {
    if trade >= cube.num_trades() {
        return Err(CubeError::TradeOutOfRange {
            index: trade,
            len: cube.num_trades(),
        });
    }
    if scenario >= cube.num_scenarios() {
        return Err(CubeError::ScenarioOutOfRange {
            index: scenario,
            len: cube.num_scenarios(),
        });
    }
    if !value.is_finite() {
        return Err(CubeError::NonFinite {
            trade,
            scenario,
            value,
        });
    }
    Ok(())
}
