//! Dense in-memory cube.

use std::collections::HashMap;

use super::{check_cell, index_trades, CubeError, NpvCube};

/// Scenario-major dense grid.
///
/// Cell `(trade, scenario)` lives at `scenario * num_trades + trade`, so one
/// scenario's column is contiguous. NaN marks an unpopulated cell, which is
/// why [`set`](NpvCube::set) rejects non-finite values.
#[derive(Debug, Clone)]
pub struct DenseNpvCube {
    trade_ids: Vec<String>,
    trade_lookup: HashMap<String, usize>,
    num_scenarios: usize,
    values: Vec<f64>,
    populated: usize,
}

impl DenseNpvCube {
    /// Allocates an empty cube.
    pub fn new(trade_ids: Vec<String>, num_scenarios: usize) -> Result<Self, CubeError> {
        let trade_lookup = index_trades(&trade_ids)?;
        let values = vec![f64::NAN; trade_ids.len() * num_scenarios];
        Ok(Self {
            trade_ids,
            trade_lookup,
            num_scenarios,
            values,
            populated: 0,
        })
    }

    #[inline]
    fn offset(&self, trade: usize, scenario: usize) -> usize {
        scenario * self.trade_ids.len() + trade
    }

    /// Populated NPVs of one scenario, in trade order.
    pub fn column(&self, scenario: usize) -> Option<&[f64]> {
        if scenario >= self.num_scenarios {
            return None;
        }
        let n = self.trade_ids.len();
        Some(&self.values[scenario * n..(scenario + 1) * n])
    }
}

impl NpvCube for DenseNpvCube {
    fn num_trades(&self) -> usize {
        self.trade_ids.len()
    }

    fn num_scenarios(&self) -> usize {
        self.num_scenarios
    }

    fn trade_ids(&self) -> &[String] {
        &self.trade_ids
    }

    fn trade_index(&self, trade_id: &str) -> Option<usize> {
        self.trade_lookup.get(trade_id).copied()
    }

    #[inline]
    fn get(&self, trade: usize, scenario: usize) -> Option<f64> {
        if trade >= self.trade_ids.len() || scenario >= self.num_scenarios {
            return None;
        }
        let v = self.values[self.offset(trade, scenario)];
        (!v.is_nan()).then_some(v)
    }

    fn set(&mut self, trade: usize, scenario: usize, value: f64) -> Result<(), CubeError> {
        check_cell(&*self, trade, scenario, value)?;
        let offset = self.offset(trade, scenario);
        if self.values[offset].is_nan() {
            self.populated += 1;
        }
        self.values[offset] = value;
        Ok(())
    }

    fn populated(&self) -> usize {
        self.populated
    }
}
