//! Sparse hash-map cube.

use std::collections::HashMap;

use super::{check_cell, index_trades, CubeError, NpvCube};
use crate::scenarios::BASE_SCENARIO;

/// Hash-map backed cube storing only cells that differ from base.
///
/// A write to a non-base scenario whose value is bit-identical to the
/// trade's populated base NPV is dropped (and any earlier value for that
/// cell removed): the trade is blind to that scenario, and readers recover
/// the value as "unchanged from base".
#[derive(Debug, Clone)]
pub struct SparseNpvCube {
    trade_ids: Vec<String>,
    trade_lookup: HashMap<String, usize>,
    num_scenarios: usize,
    values: HashMap<(usize, usize), f64>,
}

impl SparseNpvCube {
    /// Allocates an empty cube.
    pub fn new(trade_ids: Vec<String>, num_scenarios: usize) -> Result<Self, CubeError> {
        let trade_lookup = index_trades(&trade_ids)?;
        Ok(Self {
            trade_ids,
            trade_lookup,
            num_scenarios,
            values: HashMap::new(),
        })
    }

    /// Fraction of cells stored.
    pub fn fill_ratio(&self) -> f64 {
        let cells = self.trade_ids.len() * self.num_scenarios;
        if cells == 0 {
            0.0
        } else {
            self.values.len() as f64 / cells as f64
        }
    }
}

impl NpvCube for SparseNpvCube {
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
        self.values.get(&(trade, scenario)).copied()
    }

    fn set(&mut self, trade: usize, scenario: usize, value: f64) -> Result<(), CubeError> {
        check_cell(&*self, trade, scenario, value)?;
        if scenario != BASE_SCENARIO {
            if let Some(base) = self.values.get(&(trade, BASE_SCENARIO)) {
                if base.to_bits() == value.to_bits() {
                    self.values.remove(&(trade, scenario));
                    return Ok(());
                }
            }
        }
        self.values.insert((trade, scenario), value);
        Ok(())
    }

    fn populated(&self) -> usize {
        self.values.len()
    }
}
