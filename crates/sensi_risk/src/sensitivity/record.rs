//! Sensitivity values and records.

use std::fmt;
use std::str::FromStr;

use sensi_core::market::RiskFactorKey;
use sensi_core::types::Currency;

/// Why a sensitivity could not be computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum UnavailableReason {
    /// The trade has no base NPV.
    BaseNpvUnavailable,
    /// A shifted NPV the formula needs failed to price.
    PricingFailure,
    /// A scenario the formula needs was never generated.
    MissingScenario,
    /// The shift size is (near) zero.
    DegenerateShift,
}

impl UnavailableReason {
    /// Stable name used in exports.
    pub fn as_str(&self) -> &'static str {
        match self {
            UnavailableReason::BaseNpvUnavailable => "BaseNpvUnavailable",
            UnavailableReason::PricingFailure => "PricingFailure",
            UnavailableReason::MissingScenario => "MissingScenario",
            UnavailableReason::DegenerateShift => "DegenerateShift",
        }
    }
}

impl fmt::Display for UnavailableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UnavailableReason {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BaseNpvUnavailable" => Ok(UnavailableReason::BaseNpvUnavailable),
            "PricingFailure" => Ok(UnavailableReason::PricingFailure),
            "MissingScenario" => Ok(UnavailableReason::MissingScenario),
            "DegenerateShift" => Ok(UnavailableReason::DegenerateShift),
            other => Err(format!("unknown unavailable reason '{other}'")),
        }
    }
}

/// A computed sensitivity, or the reason it could not be computed.
///
/// "No risk" is `Available(0.0)`; "could not compute" is never zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SensitivityValue {
    /// Finite-difference result.
    Available(f64),
    /// Could not be computed.
    Unavailable(UnavailableReason),
}

impl SensitivityValue {
    /// The value, if available.
    #[inline]
    pub fn value(&self) -> Option<f64> {
        match self {
            SensitivityValue::Available(v) => Some(*v),
            SensitivityValue::Unavailable(_) => None,
        }
    }

    /// Returns true if a value was computed.
    #[inline]
    pub fn is_available(&self) -> bool {
        matches!(self, SensitivityValue::Available(_))
    }

    /// The reason, if unavailable.
    #[inline]
    pub fn reason(&self) -> Option<UnavailableReason> {
        match self {
            SensitivityValue::Available(_) => None,
            SensitivityValue::Unavailable(r) => Some(*r),
        }
    }
}

impl From<Result<f64, UnavailableReason>> for SensitivityValue {
    fn from(result: Result<f64, UnavailableReason>) -> Self {
        match result {
            Ok(v) => SensitivityValue::Available(v),
            Err(r) => SensitivityValue::Unavailable(r),
        }
    }
}

/// Order of the derivative a record holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SensitivityKind {
    /// First order.
    Delta,
    /// Second order in one factor.
    Gamma,
    /// Mixed second order in two factors.
    CrossGamma,
}

impl SensitivityKind {
    /// All kinds in emission order.
    pub const ALL: [SensitivityKind; 3] = [
        SensitivityKind::Delta,
        SensitivityKind::Gamma,
        SensitivityKind::CrossGamma,
    ];

    /// Stable name used in exports.
    pub fn as_str(&self) -> &'static str {
        match self {
            SensitivityKind::Delta => "Delta",
            SensitivityKind::Gamma => "Gamma",
            SensitivityKind::CrossGamma => "CrossGamma",
        }
    }
}

impl fmt::Display for SensitivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SensitivityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Delta" => Ok(SensitivityKind::Delta),
            "Gamma" => Ok(SensitivityKind::Gamma),
            "CrossGamma" => Ok(SensitivityKind::CrossGamma),
            other => Err(format!("unknown sensitivity kind '{other}'")),
        }
    }
}

/// One sensitivity of one trade: the unit of exchange with reporting.
#[derive(Debug, Clone, PartialEq)]
pub struct SensitivityRecord {
    /// Trade identifier
    pub trade_id: String,
    /// Shifted factor
    pub factor1: RiskFactorKey,
    /// Absolute shift applied to `factor1`
    pub shift_size1: f64,
    /// Second factor of a cross-gamma
    pub factor2: Option<RiskFactorKey>,
    /// Absolute shift applied to `factor2`
    pub shift_size2: Option<f64>,
    /// Delta, Gamma or CrossGamma
    pub kind: SensitivityKind,
    /// The sensitivity
    pub value: SensitivityValue,
    /// Base NPV, if the trade priced
    pub base_npv: Option<f64>,
    /// Currency of the NPVs
    pub currency: Currency,
}
