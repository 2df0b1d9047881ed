//! Fixed-for-floating interest rate swap with annual payments.
//!
//! Both legs pay annually on the same schedule. Fixed cash flows are
//! discounted on the currency's discount curve; floating coupons are
//! projected as simple forwards off the index curve:
//!
//! ```text
//! F_i = P_idx(t_{i-1}) / P_idx(t_i) - 1
//! NPV = sign * N * sum_i DF(t_i) * (F_i - K)
//! ```

use sensi_core::market::{MarketObject, MarketView, RiskFactorKind, KEY_SEPARATOR};
use sensi_core::types::{Currency, PricingError};

use super::error::InstrumentError;
use crate::analytical::{annual_schedule, interpolation_weights};

/// Pay or receive the fixed leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SwapDirection {
    /// Pay fixed, receive floating.
    Payer,
    /// Receive fixed, pay floating.
    Receiver,
}

impl SwapDirection {
    /// +1 for payer, -1 for receiver.
    #[inline]
    pub fn sign(&self) -> f64 {
        match self {
            SwapDirection::Payer => 1.0,
            SwapDirection::Receiver => -1.0,
        }
    }
}

/// Projected legs of an annual swap under one market view.
#[derive(Debug, Clone)]
pub(crate) struct SwapLegs {
    /// Payment times.
    pub times: Vec<f64>,
    /// Discount factors at the payment times.
    pub discounts: Vec<f64>,
    /// Index discount factors at the accrual start times.
    pub index_start: Vec<f64>,
    /// Index discount factors at the payment times.
    pub index_end: Vec<f64>,
}

impl SwapLegs {
    pub(crate) fn project(
        market: &MarketView<'_>,
        currency: Currency,
        index: &str,
        start: f64,
        years: u32,
    ) -> Result<Self, PricingError> {
        let times = annual_schedule(start, years);
        let mut discounts = Vec::with_capacity(times.len());
        let mut index_start = Vec::with_capacity(times.len());
        let mut index_end = Vec::with_capacity(times.len());
        let mut previous = start;
        for &t in &times {
            discounts.push(market.discount_factor(currency.code(), t)?);
            index_start.push(market.curve_discount(RiskFactorKind::IndexCurve, index, previous)?);
            index_end.push(market.curve_discount(RiskFactorKind::IndexCurve, index, t)?);
            previous = t;
        }
        Ok(Self {
            times,
            discounts,
            index_start,
            index_end,
        })
    }

    /// Simple annual forward of period `i`.
    #[inline]
    pub fn forward(&self, i: usize) -> f64 {
        self.index_start[i] / self.index_end[i] - 1.0
    }

    /// Sum of discount factors (annual accrual).
    pub fn annuity(&self) -> f64 {
        self.discounts.iter().sum()
    }

    /// Present value of the floating leg per unit notional.
    pub fn float_value(&self) -> f64 {
        (0..self.times.len())
            .map(|i| self.discounts[i] * self.forward(i))
            .sum()
    }
}

pub(crate) fn curve_pillar_times(
    market: &MarketView<'_>,
    kind: RiskFactorKind,
    name: &str,
) -> Result<Vec<f64>, PricingError> {
    match market.object(kind, name)? {
        MarketObject::Curve(curve) => Ok(curve.times().to_vec()),
        _ => Err(PricingError::InvalidInput(format!(
            "{kind}/{name} is not a curve"
        ))),
    }
}

pub(crate) fn validate_index(index: &str) -> Result<(), InstrumentError> {
    if index.is_empty() || index.contains(KEY_SEPARATOR) {
        return Err(InstrumentError::InvalidIndex(index.to_string()));
    }
    Ok(())
}

/// Spot-starting fixed-for-floating swap.
///
/// # Examples
///
/// ```
/// use sensi_models::{SwapDirection, VanillaSwap};
/// use sensi_core::types::Currency;
///
/// let swap = VanillaSwap::new(Currency::EUR, "EURIBOR", 1e6, 0.02, 5, SwapDirection::Payer).unwrap();
/// assert_eq!(swap.maturity_years(), 5);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VanillaSwap {
    currency: Currency,
    index: String,
    notional: f64,
    fixed_rate: f64,
    maturity_years: u32,
    direction: SwapDirection,
}

impl VanillaSwap {
    /// Creates a swap, validating its terms.
    pub fn new(
        currency: Currency,
        index: impl Into<String>,
        notional: f64,
        fixed_rate: f64,
        maturity_years: u32,
        direction: SwapDirection,
    ) -> Result<Self, InstrumentError> {
        let swap = Self {
            currency,
            index: index.into(),
            notional,
            fixed_rate,
            maturity_years,
            direction,
        };
        swap.validate()?;
        Ok(swap)
    }

    /// Checks the swap's terms.
    pub fn validate(&self) -> Result<(), InstrumentError> {
        if !(self.notional.is_finite() && self.notional > 0.0) {
            return Err(InstrumentError::InvalidNotional(self.notional));
        }
        if !self.fixed_rate.is_finite() {
            return Err(InstrumentError::InvalidStrike(self.fixed_rate));
        }
        if self.maturity_years == 0 {
            return Err(InstrumentError::EmptySchedule);
        }
        validate_index(&self.index)
    }

    /// Settlement currency.
    #[inline]
    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Index curve name.
    #[inline]
    pub fn index(&self) -> &str {
        &self.index
    }

    /// Notional.
    #[inline]
    pub fn notional(&self) -> f64 {
        self.notional
    }

    /// Fixed rate.
    #[inline]
    pub fn fixed_rate(&self) -> f64 {
        self.fixed_rate
    }

    /// Final payment in years.
    #[inline]
    pub fn maturity_years(&self) -> u32 {
        self.maturity_years
    }

    /// Payer or receiver.
    #[inline]
    pub fn direction(&self) -> SwapDirection {
        self.direction
    }

    fn legs(&self, market: &MarketView<'_>) -> Result<SwapLegs, PricingError> {
        SwapLegs::project(market, self.currency, &self.index, 0.0, self.maturity_years)
    }

    /// Net present value in the swap currency.
    pub fn price(&self, market: &MarketView<'_>) -> Result<f64, PricingError> {
        let legs = self.legs(market)?;
        let value = legs.float_value() - self.fixed_rate * legs.annuity();
        Ok(self.direction.sign() * self.notional * value)
    }

    /// Par fixed rate.
    pub fn par_rate(&self, market: &MarketView<'_>) -> Result<f64, PricingError> {
        let legs = self.legs(market)?;
        Ok(legs.float_value() / legs.annuity())
    }

    /// Closed-form derivative of the NPV with respect to each discount curve
    /// pillar's zero rate.
    ///
    /// `dNPV/dz_k = -sign * N * sum_i (F_i - K) * t_i * DF_i * w_k(t_i)`
    pub fn discount_pillar_deltas(&self, market: &MarketView<'_>) -> Result<Vec<f64>, PricingError> {
        let legs = self.legs(market)?;
        let pillars = curve_pillar_times(market, RiskFactorKind::DiscountCurve, self.currency.code())?;
        let mut deltas = vec![0.0; pillars.len()];
        for (i, &t) in legs.times.iter().enumerate() {
            let cash = legs.forward(i) - self.fixed_rate;
            let weights = interpolation_weights(&pillars, t);
            for (delta, w) in deltas.iter_mut().zip(weights) {
                *delta -= cash * t * legs.discounts[i] * w;
            }
        }
        let scale = self.direction.sign() * self.notional;
        Ok(deltas.into_iter().map(|d| d * scale).collect())
    }

    /// Closed-form derivative of the NPV with respect to each index curve
    /// pillar's zero rate.
    ///
    /// `dF_i/dz_k = (P_{i-1} / P_i) * (t_i w_k(t_i) - t_{i-1} w_k(t_{i-1}))`
    pub fn index_pillar_deltas(&self, market: &MarketView<'_>) -> Result<Vec<f64>, PricingError> {
        let legs = self.legs(market)?;
        let pillars = curve_pillar_times(market, RiskFactorKind::IndexCurve, &self.index)?;
        let mut deltas = vec![0.0; pillars.len()];
        let mut previous = 0.0;
        for (i, &t) in legs.times.iter().enumerate() {
            let ratio = legs.index_start[i] / legs.index_end[i];
            let w_end = interpolation_weights(&pillars, t);
            let w_start = interpolation_weights(&pillars, previous);
            for k in 0..pillars.len() {
                let d_forward = ratio * (t * w_end[k] - previous * w_start[k]);
                deltas[k] += legs.discounts[i] * d_forward;
            }
            previous = t;
        }
        let scale = self.direction.sign() * self.notional;
        Ok(deltas.into_iter().map(|d| d * scale).collect())
    }
}
