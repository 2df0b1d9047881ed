//! Record filtering.

use std::collections::BTreeSet;

use sensi_core::market::RiskFactorKind;
use sensi_core::types::Currency;

use super::record::{SensitivityKind, SensitivityRecord};

/// Selects records by trade, factor category or qualifier, currency, kind
/// and magnitude.
///
/// Each criterion left empty accepts everything. A cross-gamma record
/// matches a category or qualifier criterion when either of its factors
/// does.
///
/// # Examples
///
/// ```
/// use sensi_core::market::RiskFactorKind;
/// use sensi_risk::sensitivity::{RiskFilter, SensitivityKind};
///
/// let filter = RiskFilter::new()
///     .with_category(RiskFactorKind::DiscountCurve)
///     .with_kind(SensitivityKind::Delta)
///     .with_min_abs_value(1e-8);
/// assert!(!filter.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RiskFilter {
    trades: BTreeSet<String>,
    categories: BTreeSet<RiskFactorKind>,
    qualifiers: BTreeSet<String>,
    currencies: BTreeSet<Currency>,
    kinds: BTreeSet<SensitivityKind>,
    min_abs_value: Option<f64>,
}

impl RiskFilter {
    /// A filter that accepts every record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Accepts records of `trade_id` (in addition to any already added).
    pub fn with_trade(mut self, trade_id: impl Into<String>) -> Self {
        self.trades.insert(trade_id.into());
        self
    }

    /// Accepts records of any of `trade_ids`.
    pub fn with_trades<I, S>(mut self, trade_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.trades.extend(trade_ids.into_iter().map(Into::into));
        self
    }

    /// Accepts records on factors of `category`.
    pub fn with_category(mut self, category: RiskFactorKind) -> Self {
        self.categories.insert(category);
        self
    }

    /// Accepts records on factors with qualifier `qualifier`.
    pub fn with_qualifier(mut self, qualifier: impl Into<String>) -> Self {
        self.qualifiers.insert(qualifier.into());
        self
    }

    /// Accepts records in `currency`.
    pub fn with_currency(mut self, currency: Currency) -> Self {
        self.currencies.insert(currency);
        self
    }

    /// Accepts records of `kind`.
    pub fn with_kind(mut self, kind: SensitivityKind) -> Self {
        self.kinds.insert(kind);
        self
    }

    /// Drops available values smaller than `threshold` in absolute value.
    ///
    /// Unavailable records always pass this criterion.
    pub fn with_min_abs_value(mut self, threshold: f64) -> Self {
        self.min_abs_value = Some(threshold.abs());
        self
    }

    /// Returns true if no criterion is set.
    pub fn is_empty(&self) -> bool {
        self.trades.is_empty()
            && self.categories.is_empty()
            && self.qualifiers.is_empty()
            && self.currencies.is_empty()
            && self.kinds.is_empty()
            && self.min_abs_value.is_none()
    }

    /// Returns true if `record` passes every criterion.
    pub fn matches(&self, record: &SensitivityRecord) -> bool {
        if !self.trades.is_empty() && !self.trades.contains(&record.trade_id) {
            return false;
        }
        if !self.currencies.is_empty() && !self.currencies.contains(&record.currency) {
            return false;
        }
        if !self.kinds.is_empty() && !self.kinds.contains(&record.kind) {
            return false;
        }

        let factors = || std::iter::once(&record.factor1).chain(record.factor2.as_ref());
        if !self.categories.is_empty() && !factors().any(|f| self.categories.contains(&f.kind())) {
            return false;
        }
        if !self.qualifiers.is_empty() && !factors().any(|f| self.qualifiers.contains(f.qualifier()))
        {
            return false;
        }

        match (self.min_abs_value, record.value.value()) {
            (Some(threshold), Some(v)) => v.abs() >= threshold,
            _ => true,
        }
    }

    /// Lazily keeps the records that match.
    pub fn apply<'f, I>(&'f self, records: I) -> impl Iterator<Item = SensitivityRecord> + 'f
    where
        I: IntoIterator<Item = SensitivityRecord>,
        I::IntoIter: 'f,
    {
        records.into_iter().filter(move |r| self.matches(r))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensitivity::{SensitivityValue, UnavailableReason};
    use sensi_core::market::RiskFactorKey;

    fn record(trade: &str, kind: RiskFactorKind, qualifier: &str, value: SensitivityValue) -> SensitivityRecord {
        SensitivityRecord {
            trade_id: trade.to_string(),
            factor1: RiskFactorKey::new(kind, qualifier, 0, "1Y"),
            shift_size1: 1e-4,
            factor2: None,
            shift_size2: None,
            kind: SensitivityKind::Delta,
            value,
            base_npv: Some(1.0),
            currency: Currency::EUR,
        }
    }

    fn cross(trade: &str) -> SensitivityRecord {
        SensitivityRecord {
            factor2: Some(RiskFactorKey::new(RiskFactorKind::FxSpot, "EURUSD", 0, "spot")),
            shift_size2: Some(0.01),
            kind: SensitivityKind::CrossGamma,
            ..record(trade, RiskFactorKind::DiscountCurve, "EUR", SensitivityValue::Available(3.0))
        }
    }

    #[test]
    fn test_empty_filter_accepts_everything() {
        let filter = RiskFilter::new();
        assert!(filter.is_empty());
        assert!(filter.matches(&cross("T1")));
    }

    #[test]
    fn test_trade_and_currency() {
        let filter = RiskFilter::new().with_trades(["T1", "T2"]).with_currency(Currency::EUR);
        assert!(filter.matches(&cross("T1")));
        assert!(!filter.matches(&cross("T3")));
        let usd = RiskFilter::new().with_currency(Currency::USD);
        assert!(!usd.matches(&cross("T1")));
    }

    #[test]
    fn test_category_matches_either_factor() {
        let filter = RiskFilter::new().with_category(RiskFactorKind::FxSpot);
        assert!(filter.matches(&cross("T1")));
        let delta = record("T1", RiskFactorKind::DiscountCurve, "EUR", SensitivityValue::Available(1.0));
        assert!(!filter.matches(&delta));
        assert!(RiskFilter::new().with_qualifier("EURUSD").matches(&cross("T1")));
    }

    #[test]
    fn test_min_abs_value_keeps_unavailable() {
        let filter = RiskFilter::new().with_min_abs_value(0.5);
        let small = record("T1", RiskFactorKind::DiscountCurve, "EUR", SensitivityValue::Available(-0.1));
        let big = record("T1", RiskFactorKind::DiscountCurve, "EUR", SensitivityValue::Available(-0.7));
        let na = record(
            "T1",
            RiskFactorKind::DiscountCurve,
            "EUR",
            SensitivityValue::Unavailable(UnavailableReason::PricingFailure),
        );
        let kept: Vec<_> = filter.apply(vec![small, big.clone(), na.clone()]).collect();
        assert_eq!(kept, vec![big, na]);
    }

    #[test]
    fn test_kind() {
        let filter = RiskFilter::new().with_kind(SensitivityKind::CrossGamma);
        assert!(filter.matches(&cross("T1")));
        let delta = record("T1", RiskFactorKind::DiscountCurve, "EUR", SensitivityValue::Available(1.0));
        assert!(!filter.matches(&delta));
    }
}
