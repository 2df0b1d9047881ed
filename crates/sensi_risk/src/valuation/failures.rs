//! Per-cell pricing failures.

use std::collections::HashSet;
use std::fmt;

use sensi_core::types::PricingError;

use crate::scenarios::BASE_SCENARIO;

/// A trade that could not be priced under one scenario.
#[derive(Debug, Clone, PartialEq)]
pub struct PricingFailureRecord {
    /// Trade identifier
    pub trade_id: String,
    /// Trade index in the cube
    pub trade: usize,
    /// Scenario index
    pub scenario: usize,
    /// Scenario label, e.g. `Up:FxSpot/EURUSD/0/spot`
    pub scenario_label: String,
    /// What went wrong
    pub error: PricingError,
}

impl fmt::Display for PricingFailureRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} under {} (#{}): {}",
            self.trade_id, self.scenario_label, self.scenario, self.error
        )
    }
}

/// All pricing failures of a valuation, indexed by cell.
#[derive(Debug, Clone, Default)]
pub struct FailureIndex {
    records: Vec<PricingFailureRecord>,
    cells: HashSet<(usize, usize)>,
}

impl FailureIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a failure.
    pub fn record(&mut self, failure: PricingFailureRecord) {
        self.cells.insert((failure.trade, failure.scenario));
        self.records.push(failure);
    }

    /// Returns true if `(trade, scenario)` failed to price.
    #[inline]
    pub fn contains(&self, trade: usize, scenario: usize) -> bool {
        self.cells.contains(&(trade, scenario))
    }

    /// Returns true if the trade has no base NPV.
    #[inline]
    pub fn base_failed(&self, trade: usize) -> bool {
        self.contains(trade, BASE_SCENARIO)
    }

    /// Number of failed cells.
    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if every cell priced.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Failures in the order they were recorded.
    #[inline]
    pub fn records(&self) -> &[PricingFailureRecord] {
        &self.records
    }

    /// Failures of one trade.
    pub fn for_trade(&self, trade: usize) -> impl Iterator<Item = &PricingFailureRecord> {
        self.records.iter().filter(move |r| r.trade == trade)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failure(trade: usize, scenario: usize) -> PricingFailureRecord {
        PricingFailureRecord {
            trade_id: format!("T{trade}"),
            trade,
            scenario,
            scenario_label: "Base".to_string(),
            error: PricingError::ModelFailure("boom".to_string()),
        }
    }

    #[test]
    fn test_failure_index() {
        let mut index = FailureIndex::new();
        assert!(index.is_empty());
        index.record(failure(1, 0));
        index.record(failure(1, 3));
        index.record(failure(2, 3));
        assert_eq!(index.len(), 3);
        assert!(index.base_failed(1));
        assert!(!index.base_failed(2));
        assert!(index.contains(2, 3));
        assert_eq!(index.for_trade(1).count(), 2);
    }

    #[test]
    fn test_display() {
        assert_eq!(
            failure(0, 0).to_string(),
            "T0 under Base (#0): Model failure: boom"
        );
    }
}
