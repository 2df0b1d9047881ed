//! Lazy record streams.

use std::iter::FusedIterator;
use std::ops::Range;

use super::extractor::SensitivityExtractor;
use super::record::SensitivityRecord;

/// Iterator over [`SensitivityRecord`]s, computed on demand from the cube.
///
/// Trades come out in cube order. Within a trade: for each factor in
/// generation order its Delta, then its Gamma when a Down scenario exists;
/// then one CrossGamma per generated pair.
///
/// The cube is borrowed, not consumed, so a stream is restarted by asking
/// the extractor for a new one.
#[derive(Clone)]
pub struct SensitivityStream<'e, 'a> {
    extractor: &'e SensitivityExtractor<'a>,
    trades: Range<usize>,
    slot: usize,
}

impl<'e, 'a> SensitivityStream<'e, 'a> {
    pub(crate) fn new(extractor: &'e SensitivityExtractor<'a>, trades: Range<usize>) -> Self {
        Self {
            extractor,
            trades,
            slot: 0,
        }
    }

    fn remaining(&self) -> usize {
        let per_trade = self.extractor.plan().len();
        (self.trades.len() * per_trade).saturating_sub(self.slot)
    }
}

impl Iterator for SensitivityStream<'_, '_> {
    type Item = SensitivityRecord;

    fn next(&mut self) -> Option<Self::Item> {
        let plan = self.extractor.plan();
        if plan.is_empty() {
            return None;
        }
        loop {
            let trade = self.trades.start;
            if trade >= self.trades.end {
                return None;
            }
            if let Some(&slot) = plan.get(self.slot) {
                self.slot += 1;
                return Some(self.extractor.record(trade, slot));
            }
            self.trades.start += 1;
            self.slot = 0;
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining();
        (n, Some(n))
    }
}

impl ExactSizeIterator for SensitivityStream<'_, '_> {}

impl FusedIterator for SensitivityStream<'_, '_> {}
