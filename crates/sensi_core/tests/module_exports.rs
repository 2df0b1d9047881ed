//! Integration tests for module exports.
//!
//! Verify that public modules and types are reachable via absolute paths and
//! compose the way downstream crates use them.

use sensi_core::market::{MarketSnapshot, QuoteMap, RiskFactorKey, RiskFactorKind};
use sensi_core::traits::Priceable;
use sensi_core::types::{Currency, PricingError, Tenor};

struct ZeroCouponBond {
    maturity: f64,
}

impl Priceable for ZeroCouponBond {
    fn trade_id(&self) -> &str {
        "ZCB"
    }

    fn currency(&self) -> Currency {
        Currency::EUR
    }

    fn price(&self, market: &sensi_core::market::MarketView<'_>) -> Result<f64, PricingError> {
        Ok(100.0 * market.discount_factor("EUR", self.maturity)?)
    }
}

fn market() -> MarketSnapshot {
    MarketSnapshot::new()
        .with_curve(
            RiskFactorKind::DiscountCurve,
            "EUR",
            &[
                (Tenor::years(1), 0.01),
                (Tenor::years(2), 0.015),
                (Tenor::years(5), 0.02),
            ],
        )
        .unwrap()
}

#[test]
fn test_price_under_base_and_overlay() {
    let market = market();
    let bond = ZeroCouponBond { maturity: 2.0 };
    let base = bond.price(&market.view()).unwrap();
    assert!((base - 100.0 * (-0.03_f64).exp()).abs() < 1e-12);

    let mut overlay = QuoteMap::new();
    overlay.insert(
        RiskFactorKey::new(RiskFactorKind::DiscountCurve, "EUR", 1, "2Y"),
        0.016,
    );
    let shifted = bond.price(&market.apply(&overlay).unwrap()).unwrap();
    assert!(shifted < base);

    // The snapshot is untouched by the overlay
    assert_eq!(bond.price(&market.view()).unwrap(), base);
}

#[test]
fn test_native_keys_roundtrip_through_wire_form() {
    let market = market();
    for key in market.native_keys(RiskFactorKind::DiscountCurve, "EUR") {
        let parsed: RiskFactorKey = key.to_string().parse().unwrap();
        assert_eq!(parsed, key);
    }
}

#[test]
fn test_missing_curve_is_pricing_error() {
    let bond = ZeroCouponBond { maturity: 1.0 };
    let empty = MarketSnapshot::new();
    assert!(matches!(
        bond.price(&empty.view()),
        Err(PricingError::MarketData(_))
    ));
}
