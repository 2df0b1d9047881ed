//! Risk factor identification for sensitivity analysis.
//!
//! This module provides [`RiskFactorKind`], the category of a perturbable
//! market quantity, and [`RiskFactorKey`], which pins down a single quote:
//! a category, a qualifier (curve or pair name), and a bucket (index plus
//! label).
//!
//! Keys have a stable string form, `Category/Qualifier/index/label`, which
//! is the wire format of exported sensitivity records:
//!
//! ```rust
//! use sensi_core::market::{RiskFactorKey, RiskFactorKind};
//!
//! let key = RiskFactorKey::new(RiskFactorKind::DiscountCurve, "EUR", 5, "4Y");
//! assert_eq!(key.to_string(), "DiscountCurve/EUR/5/4Y");
//!
//! let parsed: RiskFactorKey = "DiscountCurve/EUR/5/4Y".parse().unwrap();
//! assert_eq!(parsed, key);
//! ```

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Separator between the fields of a key's wire form.
pub const KEY_SEPARATOR: char = '/';

/// Errors from parsing the wire form of a [`RiskFactorKey`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FactorKeyError {
    /// Fewer than four `/`-separated fields.
    #[error("Malformed risk factor key '{0}': expected Category/Qualifier/index/label")]
    Malformed(String),

    /// Unknown category name.
    #[error("Unknown risk factor category: {0}")]
    UnknownKind(String),

    /// Bucket index is not a non-negative integer.
    #[error("Invalid bucket index '{index}' in key '{key}'")]
    InvalidIndex {
        /// The offending index field
        index: String,
        /// The full key string
        key: String,
    },
}

/// How shifts for a category are laid out over its native quotes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ShiftGeometry {
    /// A single quote (spot rates and prices).
    Scalar,
    /// A term structure over tenors, shifted by 1-D triangular rebucketing.
    Curve,
    /// An expiry by strike grid, shifted by 2-D triangular rebucketing.
    Surface,
}

/// Category of a risk factor.
///
/// The variant order defines the ordering of keys, which in turn fixes the
/// canonical order of factor pairs.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RiskFactorKind {
    /// Discounting zero curve, qualified by currency.
    DiscountCurve,
    /// Forwarding curve of an index, qualified by index name.
    IndexCurve,
    /// Generic named yield curve.
    YieldCurve,
    /// Credit spread curve, qualified by reference entity.
    CreditCurve,
    /// FX spot rate, qualified by pair (e.g. `EURUSD`).
    FxSpot,
    /// Equity spot price, qualified by ticker.
    EquitySpot,
    /// FX implied volatility surface, qualified by pair.
    FxVolatility,
    /// Equity implied volatility surface, qualified by ticker.
    EquityVolatility,
    /// Swaption volatility surface (expiry by underlying term), qualified by currency.
    SwaptionVolatility,
}

impl RiskFactorKind {
    /// All categories in ordering sequence.
    pub const ALL: [RiskFactorKind; 9] = [
        RiskFactorKind::DiscountCurve,
        RiskFactorKind::IndexCurve,
        RiskFactorKind::YieldCurve,
        RiskFactorKind::CreditCurve,
        RiskFactorKind::FxSpot,
        RiskFactorKind::EquitySpot,
        RiskFactorKind::FxVolatility,
        RiskFactorKind::EquityVolatility,
        RiskFactorKind::SwaptionVolatility,
    ];

    /// Category name as used in the wire format.
    pub fn name(&self) -> &'static str {
        match self {
            RiskFactorKind::DiscountCurve => "DiscountCurve",
            RiskFactorKind::IndexCurve => "IndexCurve",
            RiskFactorKind::YieldCurve => "YieldCurve",
            RiskFactorKind::CreditCurve => "CreditCurve",
            RiskFactorKind::FxSpot => "FxSpot",
            RiskFactorKind::EquitySpot => "EquitySpot",
            RiskFactorKind::FxVolatility => "FxVolatility",
            RiskFactorKind::EquityVolatility => "EquityVolatility",
            RiskFactorKind::SwaptionVolatility => "SwaptionVolatility",
        }
    }

    /// Shift layout of this category.
    pub fn geometry(&self) -> ShiftGeometry {
        match self {
            RiskFactorKind::DiscountCurve
            | RiskFactorKind::IndexCurve
            | RiskFactorKind::YieldCurve
            | RiskFactorKind::CreditCurve => ShiftGeometry::Curve,
            RiskFactorKind::FxSpot | RiskFactorKind::EquitySpot => ShiftGeometry::Scalar,
            RiskFactorKind::FxVolatility
            | RiskFactorKind::EquityVolatility
            | RiskFactorKind::SwaptionVolatility => ShiftGeometry::Surface,
        }
    }
}

impl fmt::Display for RiskFactorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RiskFactorKind {
    type Err = FactorKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| FactorKeyError::UnknownKind(s.to_string()))
    }
}

/// Identifier of a single perturbable market quote.
///
/// Used both for native market quotes (index = pillar/node position in the
/// market object) and for sensitivity factors (index = bucket position in
/// the shift grid). Equality and ordering are total over
/// `(kind, qualifier, index, label)`.
///
/// The qualifier must not contain `/`; the label may, since it is the last
/// field of the wire form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "String", into = "String")
)]
pub struct RiskFactorKey {
    kind: RiskFactorKind,
    qualifier: String,
    index: usize,
    label: String,
}

impl RiskFactorKey {
    /// Creates a new key.
    pub fn new(
        kind: RiskFactorKind,
        qualifier: impl Into<String>,
        index: usize,
        label: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            qualifier: qualifier.into(),
            index,
            label: label.into(),
        }
    }

    /// Risk factor category.
    #[inline]
    pub fn kind(&self) -> RiskFactorKind {
        self.kind
    }

    /// Qualifier (curve name, currency pair, ticker).
    #[inline]
    pub fn qualifier(&self) -> &str {
        &self.qualifier
    }

    /// Bucket or node index.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Bucket or node label (e.g. `10Y`, `1Y/0.95`).
    #[inline]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Returns true if this key belongs to the given market object.
    #[inline]
    pub fn belongs_to(&self, kind: RiskFactorKind, qualifier: &str) -> bool {
        self.kind == kind && self.qualifier == qualifier
    }
}

impl fmt::Display for RiskFactorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{sep}{}{sep}{}{sep}{}",
            self.kind,
            self.qualifier,
            self.index,
            self.label,
            sep = KEY_SEPARATOR
        )
    }
}

impl FromStr for RiskFactorKey {
    type Err = FactorKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(4, KEY_SEPARATOR);
        let (kind, qualifier, index, label) =
            match (parts.next(), parts.next(), parts.next(), parts.next()) {
                (Some(k), Some(q), Some(i), Some(l)) => (k, q, i, l),
                _ => return Err(FactorKeyError::Malformed(s.to_string())),
            };
        let kind: RiskFactorKind = kind.parse()?;
        let index = index
            .parse::<usize>()
            .map_err(|_| FactorKeyError::InvalidIndex {
                index: index.to_string(),
                key: s.to_string(),
            })?;
        Ok(Self::new(kind, qualifier, index, label))
    }
}

impl TryFrom<String> for RiskFactorKey {
    type Error = FactorKeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RiskFactorKey> for String {
    fn from(key: RiskFactorKey) -> Self {
        key.to_string()
    }
}
