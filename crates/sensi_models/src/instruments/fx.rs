//! FX forward and European FX option.
//!
//! Pairs are named `FOREIGNDOMESTIC` (for example `EURUSD`), the spot being
//! units of domestic currency per unit of foreign. Notionals are in the
//! foreign currency and values are reported in the domestic currency.

use sensi_core::market::{MarketView, RiskFactorKind};
use sensi_core::types::{Currency, PricingError, Tenor};

use super::error::InstrumentError;
use crate::analytical::{norm_cdf, norm_pdf};

/// Call or put on the foreign currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OptionType {
    /// Right to buy foreign currency at the strike.
    Call,
    /// Right to sell foreign currency at the strike.
    Put,
}

/// Pair name used as the FX spot and FX volatility qualifier.
pub fn pair_name(foreign: Currency, domestic: Currency) -> String {
    format!("{}{}", foreign.code(), domestic.code())
}

fn validate_common(
    foreign: Currency,
    domestic: Currency,
    notional: f64,
    strike: f64,
    maturity: Tenor,
) -> Result<(), InstrumentError> {
    if foreign == domestic {
        return Err(InstrumentError::SameCurrency(foreign.code().to_string()));
    }
    if !(notional.is_finite() && notional > 0.0) {
        return Err(InstrumentError::InvalidNotional(notional));
    }
    if !(strike.is_finite() && strike > 0.0) {
        return Err(InstrumentError::InvalidStrike(strike));
    }
    if maturity.as_years() <= 0.0 {
        return Err(InstrumentError::InvalidExpiry(maturity.to_string()));
    }
    Ok(())
}

/// Outright FX forward: buy `notional` foreign for `notional * strike`
/// domestic at maturity.
///
/// `NPV = N * (S * DF_for(T) - K * DF_dom(T))`
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FxForward {
    foreign: Currency,
    domestic: Currency,
    notional: f64,
    strike: f64,
    maturity: Tenor,
}

impl FxForward {
    /// Creates a forward, validating its terms.
    pub fn new(
        foreign: Currency,
        domestic: Currency,
        notional: f64,
        strike: f64,
        maturity: Tenor,
    ) -> Result<Self, InstrumentError> {
        let forward = Self {
            foreign,
            domestic,
            notional,
            strike,
            maturity,
        };
        forward.validate()?;
        Ok(forward)
    }

    /// Checks the forward's terms.
    pub fn validate(&self) -> Result<(), InstrumentError> {
        validate_common(
            self.foreign,
            self.domestic,
            self.notional,
            self.strike,
            self.maturity,
        )
    }

    /// Reporting currency.
    #[inline]
    pub fn currency(&self) -> Currency {
        self.domestic
    }

    /// Pair name, e.g. `EURUSD`.
    pub fn pair(&self) -> String {
        pair_name(self.foreign, self.domestic)
    }

    /// Net present value in the domestic currency.
    pub fn price(&self, market: &MarketView<'_>) -> Result<f64, PricingError> {
        let t = self.maturity.as_years();
        let spot = market.spot(RiskFactorKind::FxSpot, &self.pair())?;
        let df_for = market.discount_factor(self.foreign.code(), t)?;
        let df_dom = market.discount_factor(self.domestic.code(), t)?;
        Ok(self.notional * (spot * df_for - self.strike * df_dom))
    }

    /// Closed-form spot delta: `N * DF_for(T)`. The forward is linear in
    /// spot, so its spot gamma is zero.
    pub fn spot_delta(&self, market: &MarketView<'_>) -> Result<f64, PricingError> {
        let df_for = market.discount_factor(self.foreign.code(), self.maturity.as_years())?;
        Ok(self.notional * df_for)
    }
}

/// Garman-Kohlhagen inputs for one valuation.
struct GkInputs {
    spot: f64,
    df_for: f64,
    df_dom: f64,
    vol: f64,
    expiry: f64,
}

impl GkInputs {
    fn d1_d2(&self, strike: f64) -> (f64, f64) {
        let forward = self.spot * self.df_for / self.df_dom;
        let std_dev = self.vol * self.expiry.sqrt();
        let d1 = ((forward / strike).ln() + 0.5 * std_dev * std_dev) / std_dev;
        (d1, d1 - std_dev)
    }
}

/// European FX option priced with Garman-Kohlhagen.
///
/// Volatility is read from the pair's `FxVolatility` surface at
/// `(expiry, strike)`.
///
/// # Examples
///
/// ```
/// use sensi_models::{FxOption, OptionType};
/// use sensi_core::types::{Currency, Tenor};
///
/// let option = FxOption::new(
///     Currency::EUR,
///     Currency::USD,
///     1_000_000.0,
///     1.12,
///     Tenor::years(1),
///     OptionType::Call,
/// )
/// .unwrap();
/// assert_eq!(option.pair(), "EURUSD");
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FxOption {
    foreign: Currency,
    domestic: Currency,
    notional: f64,
    strike: f64,
    expiry: Tenor,
    option_type: OptionType,
}

impl FxOption {
    /// Creates an option, validating its terms.
    pub fn new(
        foreign: Currency,
        domestic: Currency,
        notional: f64,
        strike: f64,
        expiry: Tenor,
        option_type: OptionType,
    ) -> Result<Self, InstrumentError> {
        let option = Self {
            foreign,
            domestic,
            notional,
            strike,
            expiry,
            option_type,
        };
        option.validate()?;
        Ok(option)
    }

    /// Checks the option's terms.
    pub fn validate(&self) -> Result<(), InstrumentError> {
        validate_common(
            self.foreign,
            self.domestic,
            self.notional,
            self.strike,
            self.expiry,
        )
    }

    /// Reporting currency.
    #[inline]
    pub fn currency(&self) -> Currency {
        self.domestic
    }

    /// Pair name, e.g. `EURUSD`.
    pub fn pair(&self) -> String {
        pair_name(self.foreign, self.domestic)
    }

    /// Strike.
    #[inline]
    pub fn strike(&self) -> f64 {
        self.strike
    }

    fn inputs(&self, market: &MarketView<'_>) -> Result<GkInputs, PricingError> {
        let pair = self.pair();
        let expiry = self.expiry.as_years();
        let spot = market.spot(RiskFactorKind::FxSpot, &pair)?;
        let vol = market.volatility(RiskFactorKind::FxVolatility, &pair, expiry, self.strike)?;
        if !(spot > 0.0) {
            return Err(PricingError::InvalidInput(format!(
                "non-positive FX spot {spot} for {pair}"
            )));
        }
        if !(vol > 0.0) {
            return Err(PricingError::NumericalInstability(format!(
                "non-positive FX volatility {vol} for {pair}"
            )));
        }
        Ok(GkInputs {
            spot,
            df_for: market.discount_factor(self.foreign.code(), expiry)?,
            df_dom: market.discount_factor(self.domestic.code(), expiry)?,
            vol,
            expiry,
        })
    }

    /// Garman-Kohlhagen price in the domestic currency.
    pub fn price(&self, market: &MarketView<'_>) -> Result<f64, PricingError> {
        let g = self.inputs(market)?;
        let (d1, d2) = g.d1_d2(self.strike);
        let (s, k) = (g.spot * g.df_for, self.strike * g.df_dom);
        let value = match self.option_type {
            OptionType::Call => s * norm_cdf(d1) - k * norm_cdf(d2),
            OptionType::Put => k * norm_cdf(-d2) - s * norm_cdf(-d1),
        };
        Ok(self.notional * value)
    }

    /// Closed-form spot delta: `N * DF_for * N(d1)` for calls,
    /// `-N * DF_for * N(-d1)` for puts.
    pub fn spot_delta(&self, market: &MarketView<'_>) -> Result<f64, PricingError> {
        let g = self.inputs(market)?;
        let (d1, _) = g.d1_d2(self.strike);
        let delta = match self.option_type {
            OptionType::Call => norm_cdf(d1),
            OptionType::Put => -norm_cdf(-d1),
        };
        Ok(self.notional * g.df_for * delta)
    }

    /// Closed-form spot gamma: `N * DF_for * pdf(d1) / (S * vol * sqrt(T))`.
    pub fn spot_gamma(&self, market: &MarketView<'_>) -> Result<f64, PricingError> {
        let g = self.inputs(market)?;
        let (d1, _) = g.d1_d2(self.strike);
        Ok(self.notional * g.df_for * norm_pdf(d1) / (g.spot * g.vol * g.expiry.sqrt()))
    }

    /// Closed-form vega per unit of absolute volatility:
    /// `N * S * DF_for * pdf(d1) * sqrt(T)`.
    pub fn vega(&self, market: &MarketView<'_>) -> Result<f64, PricingError> {
        let g = self.inputs(market)?;
        let (d1, _) = g.d1_d2(self.strike);
        Ok(self.notional * g.spot * g.df_for * norm_pdf(d1) * g.expiry.sqrt())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use sensi_core::market::{MarketSnapshot, QuoteMap, RiskFactorKey};

    fn market() -> MarketSnapshot {
        let curve = |r: f64| vec![(Tenor::years(1), r), (Tenor::years(5), r)];
        MarketSnapshot::new()
            .with_curve(RiskFactorKind::DiscountCurve, "USD", &curve(0.03))
            .unwrap()
            .with_curve(RiskFactorKind::DiscountCurve, "EUR", &curve(0.01))
            .unwrap()
            .with_spot(RiskFactorKind::FxSpot, "EURUSD", 1.10)
            .unwrap()
            .with_surface(
                RiskFactorKind::FxVolatility,
                "EURUSD",
                &[Tenor::years(1)],
                &[1.0, 1.2],
                &[vec![0.1, 0.1]],
            )
            .unwrap()
    }

    fn bump_spot(h: f64) -> QuoteMap {
        let key = RiskFactorKey::new(RiskFactorKind::FxSpot, "EURUSD", 0, "spot");
        let mut overlay = QuoteMap::new();
        overlay.insert(key, 1.10 + h);
        overlay
    }

    #[test]
    fn test_forward_value_and_delta() {
        let m = market();
        let fwd = FxForward::new(Currency::EUR, Currency::USD, 1e6, 1.10, Tenor::years(1)).unwrap();
        let expected = 1e6 * (1.10 * (-0.01_f64).exp() - 1.10 * (-0.03_f64).exp());
        assert_relative_eq!(fwd.price(&m.view()).unwrap(), expected, max_relative = 1e-12);
        assert_relative_eq!(
            fwd.spot_delta(&m.view()).unwrap(),
            1e6 * (-0.01_f64).exp(),
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_same_currency_rejected() {
        assert!(matches!(
            FxForward::new(Currency::EUR, Currency::EUR, 1e6, 1.0, Tenor::years(1)),
            Err(InstrumentError::SameCurrency(_))
        ));
    }

    #[test]
    fn test_option_put_call_parity() {
        let m = market();
        let view = m.view();
        let call = FxOption::new(Currency::EUR, Currency::USD, 1e6, 1.12, Tenor::years(1), OptionType::Call).unwrap();
        let put = FxOption::new(Currency::EUR, Currency::USD, 1e6, 1.12, Tenor::years(1), OptionType::Put).unwrap();
        let fwd = FxForward::new(Currency::EUR, Currency::USD, 1e6, 1.12, Tenor::years(1)).unwrap();
        let diff = call.price(&view).unwrap() - put.price(&view).unwrap();
        assert!((diff - fwd.price(&view).unwrap()).abs() < 1.0);
    }

    #[test]
    fn test_option_delta_and_gamma_match_central_differences() {
        let m = market();
        let call = FxOption::new(Currency::EUR, Currency::USD, 1e6, 1.12, Tenor::years(1), OptionType::Call).unwrap();
        let h = 1e-4;
        let up = call.price(&m.apply(&bump_spot(h)).unwrap()).unwrap();
        let down = call.price(&m.apply(&bump_spot(-h)).unwrap()).unwrap();
        let base = call.price(&m.view()).unwrap();
        let delta = call.spot_delta(&m.view()).unwrap();
        let gamma = call.spot_gamma(&m.view()).unwrap();
        assert_relative_eq!((up - down) / (2.0 * h), delta, max_relative = 1e-4);
        assert_relative_eq!((up - 2.0 * base + down) / (h * h), gamma, max_relative = 1e-2);
    }
}
