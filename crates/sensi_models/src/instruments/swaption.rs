//! European swaption priced with Black's formula.
//!
//! The underlying is an annual fixed-for-floating swap starting at the
//! option expiry. The volatility is read from the `SwaptionVolatility`
//! surface of the currency at `(expiry, term)`, the strike axis of that
//! surface holding the underlying term in years.

use sensi_core::market::{MarketView, RiskFactorKind};
use sensi_core::types::{Currency, PricingError, Tenor};

use super::error::InstrumentError;
use super::swap::{validate_index, SwapDirection, SwapLegs};
use crate::analytical::{norm_cdf, norm_pdf};

/// Black inputs shared by price and vega.
struct BlackInputs {
    annuity: f64,
    forward: f64,
    vol: f64,
    expiry: f64,
}

impl BlackInputs {
    fn d1_d2(&self, strike: f64) -> (f64, f64) {
        let std_dev = self.vol * self.expiry.sqrt();
        let d1 = ((self.forward / strike).ln() + 0.5 * std_dev * std_dev) / std_dev;
        (d1, d1 - std_dev)
    }
}

/// European physically settled swaption.
///
/// A payer swaption is the right to enter a payer swap at the strike.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EuropeanSwaption {
    currency: Currency,
    index: String,
    notional: f64,
    strike: f64,
    expiry: Tenor,
    term_years: u32,
    direction: SwapDirection,
}

impl EuropeanSwaption {
    /// Creates a swaption, validating its terms.
    pub fn new(
        currency: Currency,
        index: impl Into<String>,
        notional: f64,
        strike: f64,
        expiry: Tenor,
        term_years: u32,
        direction: SwapDirection,
    ) -> Result<Self, InstrumentError> {
        let swaption = Self {
            currency,
            index: index.into(),
            notional,
            strike,
            expiry,
            term_years,
            direction,
        };
        swaption.validate()?;
        Ok(swaption)
    }

    /// Checks the swaption's terms.
    pub fn validate(&self) -> Result<(), InstrumentError> {
        if !(self.notional.is_finite() && self.notional > 0.0) {
            return Err(InstrumentError::InvalidNotional(self.notional));
        }
        if !(self.strike.is_finite() && self.strike > 0.0) {
            return Err(InstrumentError::InvalidStrike(self.strike));
        }
        if self.expiry.as_years() <= 0.0 {
            return Err(InstrumentError::InvalidExpiry(self.expiry.to_string()));
        }
        if self.term_years == 0 {
            return Err(InstrumentError::EmptySchedule);
        }
        validate_index(&self.index)
    }

    /// Settlement currency.
    #[inline]
    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Option expiry.
    #[inline]
    pub fn expiry(&self) -> Tenor {
        self.expiry
    }

    /// Underlying swap term in years.
    #[inline]
    pub fn term_years(&self) -> u32 {
        self.term_years
    }

    /// Strike rate.
    #[inline]
    pub fn strike(&self) -> f64 {
        self.strike
    }

    fn black_inputs(&self, market: &MarketView<'_>) -> Result<BlackInputs, PricingError> {
        let expiry = self.expiry.as_years();
        let legs = SwapLegs::project(market, self.currency, &self.index, expiry, self.term_years)?;
        let annuity = legs.annuity();
        let forward = legs.float_value() / annuity;
        let vol = market.volatility(
            RiskFactorKind::SwaptionVolatility,
            self.currency.code(),
            expiry,
            f64::from(self.term_years),
        )?;
        if !(forward > 0.0) {
            return Err(PricingError::ModelFailure(format!(
                "Black model needs a positive forward swap rate, got {forward}"
            )));
        }
        if !(vol > 0.0) {
            return Err(PricingError::NumericalInstability(format!(
                "non-positive swaption volatility {vol}"
            )));
        }
        Ok(BlackInputs {
            annuity,
            forward,
            vol,
            expiry,
        })
    }

    /// Forward swap rate of the underlying.
    pub fn forward_rate(&self, market: &MarketView<'_>) -> Result<f64, PricingError> {
        Ok(self.black_inputs(market)?.forward)
    }

    /// Black price in the swaption currency.
    pub fn price(&self, market: &MarketView<'_>) -> Result<f64, PricingError> {
        let inputs = self.black_inputs(market)?;
        let (d1, d2) = inputs.d1_d2(self.strike);
        let (s, k) = (inputs.forward, self.strike);
        let undiscounted = match self.direction {
            SwapDirection::Payer => s * norm_cdf(d1) - k * norm_cdf(d2),
            SwapDirection::Receiver => k * norm_cdf(-d2) - s * norm_cdf(-d1),
        };
        Ok(self.notional * inputs.annuity * undiscounted)
    }

    /// Closed-form Black vega: `N * A * S * sqrt(T) * pdf(d1)`, per unit of
    /// absolute volatility.
    pub fn vega(&self, market: &MarketView<'_>) -> Result<f64, PricingError> {
        let inputs = self.black_inputs(market)?;
        let (d1, _) = inputs.d1_d2(self.strike);
        Ok(self.notional * inputs.annuity * inputs.forward * inputs.expiry.sqrt() * norm_pdf(d1))
    }
}
