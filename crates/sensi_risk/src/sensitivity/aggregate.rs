//! Portfolio-level reductions over sensitivity records.
//!
//! [`aggregate`] groups records by a key and combines the per-record values
//! of each group. The combine function must be associative and commutative:
//! [`aggregate_parallel`] folds chunks of records independently and then
//! merges the partial maps, so any other combine function would make the
//! result depend on how rayon split the work. Floating-point sums agree
//! with the sequential result up to rounding.

use std::borrow::Borrow;
use std::collections::BTreeMap;

use rayon::prelude::*;
use sensi_core::market::{RiskFactorKey, RiskFactorKind};
use sensi_core::types::Currency;

use super::record::{SensitivityKind, SensitivityRecord};
use crate::parallel::ParallelConfig;

/// Groups `records` by `key_fn` and reduces each group with `combine_fn`.
///
/// Each record is first lifted into a `V` with `V::from(&record)`.
pub fn aggregate<I, R, K, V, KF, CF>(records: I, key_fn: KF, combine_fn: CF) -> BTreeMap<K, V>
where
    I: IntoIterator<Item = R>,
    R: Borrow<SensitivityRecord>,
    K: Ord,
    V: for<'r> From<&'r SensitivityRecord>,
    KF: Fn(&SensitivityRecord) -> K,
    CF: Fn(V, V) -> V,
{
    let mut groups = BTreeMap::new();
    for record in records {
        insert(&mut groups, record.borrow(), &key_fn, &combine_fn);
    }
    groups
}

/// Parallel form of [`aggregate`] over a slice, using rayon fold/reduce.
pub fn aggregate_parallel<K, V, KF, CF>(
    records: &[SensitivityRecord],
    key_fn: KF,
    combine_fn: CF,
) -> BTreeMap<K, V>
where
    K: Ord + Send,
    V: for<'r> From<&'r SensitivityRecord> + Send,
    KF: Fn(&SensitivityRecord) -> K + Sync + Send,
    CF: Fn(V, V) -> V + Sync + Send,
{
    records
        .par_iter()
        .fold(BTreeMap::new, |mut groups, record| {
            insert(&mut groups, record, &key_fn, &combine_fn);
            groups
        })
        .reduce(BTreeMap::new, |left, right| merge(left, right, &combine_fn))
}

fn insert<K, V, KF, CF>(groups: &mut BTreeMap<K, V>, record: &SensitivityRecord, key_fn: &KF, combine_fn: &CF)
where
    K: Ord,
    V: for<'r> From<&'r SensitivityRecord>,
    KF: Fn(&SensitivityRecord) -> K,
    CF: Fn(V, V) -> V,
{
    let key = key_fn(record);
    let value = V::from(record);
    let combined = match groups.remove(&key) {
        Some(existing) => combine_fn(existing, value),
        None => value,
    };
    groups.insert(key, combined);
}

fn merge<K, V, CF>(mut left: BTreeMap<K, V>, right: BTreeMap<K, V>, combine_fn: &CF) -> BTreeMap<K, V>
where
    K: Ord,
    CF: Fn(V, V) -> V,
{
    for (key, value) in right {
        let combined = match left.remove(&key) {
            Some(existing) => combine_fn(existing, value),
            None => value,
        };
        left.insert(key, combined);
    }
    left
}

/// Sum of the available values in a group.
///
/// Unavailable records are counted separately and never enter `total`, so
/// a group with `unavailable > 0` is an incomplete figure rather than a
/// smaller one.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AggregatedValue {
    /// Sum of available values
    pub total: f64,
    /// Number of available values summed
    pub count: usize,
    /// Number of unavailable records in the group
    pub unavailable: usize,
}

impl AggregatedValue {
    /// Combines two partial aggregates.
    #[inline]
    pub fn merge(self, other: Self) -> Self {
        Self {
            total: self.total + other.total,
            count: self.count + other.count,
            unavailable: self.unavailable + other.unavailable,
        }
    }

    /// Returns true if every record in the group was available.
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.unavailable == 0
    }
}

impl From<&SensitivityRecord> for AggregatedValue {
    fn from(record: &SensitivityRecord) -> Self {
        match record.value.value() {
            Some(v) => Self {
                total: v,
                count: 1,
                unavailable: 0,
            },
            None => Self {
                total: 0.0,
                count: 0,
                unavailable: 1,
            },
        }
    }
}

/// Group key of [`SensitivityAggregator::by_currency_category_kind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CategoryGroup {
    /// NPV currency
    pub currency: Currency,
    /// Category of the first factor
    pub category: RiskFactorKind,
    /// Sensitivity kind
    pub kind: SensitivityKind,
}

/// Group key of [`SensitivityAggregator::by_factor`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FactorGroup {
    /// NPV currency
    pub currency: Currency,
    /// First factor
    pub factor1: RiskFactorKey,
    /// Second factor of a cross-gamma
    pub factor2: Option<RiskFactorKey>,
    /// Sensitivity kind
    pub kind: SensitivityKind,
}

/// Ready-made portfolio views over [`aggregate`] and [`aggregate_parallel`].
///
/// Records in different currencies are never summed together.
#[derive(Debug, Clone, Default)]
pub struct SensitivityAggregator {
    parallel: ParallelConfig,
}

impl SensitivityAggregator {
    /// Creates an aggregator with the default parallel settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets when the parallel reduction is used.
    pub fn with_parallel(mut self, parallel: ParallelConfig) -> Self {
        self.parallel = parallel;
        self
    }

    /// Totals per `(currency, category, kind)`, e.g. the EUR discount-curve
    /// delta of the whole portfolio.
    pub fn by_currency_category_kind(
        &self,
        records: &[SensitivityRecord],
    ) -> BTreeMap<CategoryGroup, AggregatedValue> {
        self.run(records, |r| CategoryGroup {
            currency: r.currency,
            category: r.factor1.kind(),
            kind: r.kind,
        })
    }

    /// Totals per factor (or factor pair) across trades.
    pub fn by_factor(&self, records: &[SensitivityRecord]) -> BTreeMap<FactorGroup, AggregatedValue> {
        self.run(records, |r| FactorGroup {
            currency: r.currency,
            factor1: r.factor1.clone(),
            factor2: r.factor2.clone(),
            kind: r.kind,
        })
    }

    /// Totals per `(trade, kind)` across factors.
    pub fn by_trade(
        &self,
        records: &[SensitivityRecord],
    ) -> BTreeMap<(String, SensitivityKind), AggregatedValue> {
        self.run(records, |r| (r.trade_id.clone(), r.kind))
    }

    fn run<K, KF>(&self, records: &[SensitivityRecord], key_fn: KF) -> BTreeMap<K, AggregatedValue>
    where
        K: Ord + Send,
        KF: Fn(&SensitivityRecord) -> K + Sync + Send,
    {
        if self.parallel.should_parallelize(records.len()) {
            aggregate_parallel(records, key_fn, AggregatedValue::merge)
        } else {
            aggregate(records, key_fn, AggregatedValue::merge)
        }
    }
}
