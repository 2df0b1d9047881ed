//! The pricing boundary.
//!
//! Instruments and their pricing formulas live outside this workspace's core;
//! the valuation driver only needs an identifier, a reporting currency, and
//! an NPV for a given market view.

use crate::market::MarketView;
use crate::types::{Currency, PricingError};

/// A trade that can be priced against a market view.
///
/// # Invariants
///
/// - `price` must be pure: the same view yields the same NPV, and nothing
///   outside the view influences the result.
/// - `price` is called concurrently from several threads with different
///   views, hence the `Sync` bound used by the valuation driver.
///
/// # Examples
///
/// ```
/// use sensi_core::market::{MarketSnapshot, MarketView, RiskFactorKind};
/// use sensi_core::traits::Priceable;
/// use sensi_core::types::{Currency, PricingError};
///
/// struct SpotLinear {
///     id: String,
///     units: f64,
/// }
///
/// impl Priceable for SpotLinear {
///     fn trade_id(&self) -> &str {
///         &self.id
///     }
///
///     fn currency(&self) -> Currency {
///         Currency::USD
///     }
///
///     fn price(&self, market: &MarketView<'_>) -> Result<f64, PricingError> {
///         Ok(self.units * market.spot(RiskFactorKind::FxSpot, "EURUSD")?)
///     }
/// }
///
/// let market = MarketSnapshot::new()
///     .with_spot(RiskFactorKind::FxSpot, "EURUSD", 1.25)
///     .unwrap();
/// let trade = SpotLinear { id: "T1".into(), units: 100.0 };
/// assert_eq!(trade.price(&market.view()).unwrap(), 125.0);
/// ```
pub trait Priceable {
    /// Unique trade identifier.
    fn trade_id(&self) -> &str;

    /// Currency in which `price` is expressed.
    fn currency(&self) -> Currency;

    /// Net present value under `market`.
    fn price(&self, market: &MarketView<'_>) -> Result<f64, PricingError>;
}
