//! Reference instruments and the trade wrapper.
//!
//! # Architecture
//!
//! Uses enum dispatch (not trait objects) for static dispatch:
//! - [`Instrument`] wraps every instrument type
//! - [`Trade`] pairs an instrument with an identifier and implements
//!   [`Priceable`], which is all the valuation driver needs
//!
//! # Examples
//!
//! ```
//! use sensi_core::market::{MarketSnapshot, RiskFactorKind};
//! use sensi_core::traits::Priceable;
//! use sensi_core::types::{Currency, Tenor};
//! use sensi_models::{FxForward, Instrument, Trade};
//!
//! let market = MarketSnapshot::new()
//!     .with_curve(RiskFactorKind::DiscountCurve, "USD", &[(Tenor::years(1), 0.0)])
//!     .unwrap()
//!     .with_curve(RiskFactorKind::DiscountCurve, "EUR", &[(Tenor::years(1), 0.0)])
//!     .unwrap()
//!     .with_spot(RiskFactorKind::FxSpot, "EURUSD", 1.2)
//!     .unwrap();
//!
//! let forward = FxForward::new(Currency::EUR, Currency::USD, 100.0, 1.1, Tenor::years(1)).unwrap();
//! let trade = Trade::new("FWD-1", Instrument::FxForward(forward)).unwrap();
//! assert_eq!(trade.currency(), Currency::USD);
//! assert!((trade.price(&market.view()).unwrap() - 10.0).abs() < 1e-9);
//! ```

mod error;
mod fx;
mod swap;
mod swaption;

pub use error::InstrumentError;
pub use fx::{pair_name, FxForward, FxOption, OptionType};
pub use swap::{SwapDirection, VanillaSwap};
pub use swaption::EuropeanSwaption;

use sensi_core::market::MarketView;
use sensi_core::traits::Priceable;
use sensi_core::types::{Currency, PricingError};

/// Static dispatch over the reference instruments.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "type", rename_all = "snake_case")
)]
pub enum Instrument {
    /// Fixed-for-floating swap.
    Swap(VanillaSwap),
    /// European swaption.
    Swaption(EuropeanSwaption),
    /// FX forward.
    FxForward(FxForward),
    /// European FX option.
    FxOption(FxOption),
}

impl Instrument {
    /// Reporting currency of the instrument's NPV.
    pub fn currency(&self) -> Currency {
        match self {
            Instrument::Swap(s) => s.currency(),
            Instrument::Swaption(s) => s.currency(),
            Instrument::FxForward(f) => f.currency(),
            Instrument::FxOption(o) => o.currency(),
        }
    }

    /// Checks the instrument's terms (deserialised instruments bypass the
    /// constructors).
    pub fn validate(&self) -> Result<(), InstrumentError> {
        match self {
            Instrument::Swap(s) => s.validate(),
            Instrument::Swaption(s) => s.validate(),
            Instrument::FxForward(f) => f.validate(),
            Instrument::FxOption(o) => o.validate(),
        }
    }

    /// Net present value under `market`.
    pub fn price(&self, market: &MarketView<'_>) -> Result<f64, PricingError> {
        match self {
            Instrument::Swap(s) => s.price(market),
            Instrument::Swaption(s) => s.price(market),
            Instrument::FxForward(f) => f.price(market),
            Instrument::FxOption(o) => o.price(market),
        }
    }
}

/// A uniquely identified position in one instrument.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Trade {
    id: String,
    #[cfg_attr(feature = "serde", serde(flatten))]
    instrument: Instrument,
}

impl Trade {
    /// Creates a trade, validating the identifier and the instrument.
    pub fn new(id: impl Into<String>, instrument: Instrument) -> Result<Self, InstrumentError> {
        let trade = Self {
            id: id.into(),
            instrument,
        };
        trade.validate()?;
        Ok(trade)
    }

    /// Checks the trade after deserialisation.
    pub fn validate(&self) -> Result<(), InstrumentError> {
        if self.id.trim().is_empty() {
            return Err(InstrumentError::EmptyTradeId);
        }
        self.instrument.validate()
    }

    /// The underlying instrument.
    #[inline]
    pub fn instrument(&self) -> &Instrument {
        &self.instrument
    }
}

impl Priceable for Trade {
    fn trade_id(&self) -> &str {
        &self.id
    }

    fn currency(&self) -> Currency {
        self.instrument.currency()
    }

    fn price(&self, market: &MarketView<'_>) -> Result<f64, PricingError> {
        self.instrument.price(market)
    }
}
