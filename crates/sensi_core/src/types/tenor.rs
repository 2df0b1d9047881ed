//! Tenor labels for curve pillars and sensitivity buckets.
//!
//! A tenor is a length plus a unit (`D`, `W`, `M`, `Y`). Year fractions are
//! simple: days over 365, weeks as seven days, months over 12. Two tenors
//! with the same label always map to bit-identical year fractions, which the
//! rebucketing logic relies on when bucket and pillar grids coincide.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use super::error::TenorError;

/// Tenor unit.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TenorUnit {
    /// Calendar days
    Days,
    /// Weeks
    Weeks,
    /// Months
    Months,
    /// Years
    Years,
}

impl TenorUnit {
    /// Single-letter suffix used in tenor labels.
    pub fn suffix(&self) -> char {
        match self {
            TenorUnit::Days => 'D',
            TenorUnit::Weeks => 'W',
            TenorUnit::Months => 'M',
            TenorUnit::Years => 'Y',
        }
    }
}

/// A tenor such as `6M` or `10Y`.
///
/// Ordering and equality are by year fraction, so `12M == 1Y`.
///
/// # Examples
///
/// ```
/// use sensi_core::types::Tenor;
///
/// let t: Tenor = "18M".parse().unwrap();
/// assert_eq!(t.as_years(), 1.5);
/// assert_eq!(t.to_string(), "18M");
/// assert!(t > Tenor::years(1));
/// ```
#[derive(Copy, Clone, Debug)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "String", into = "String")
)]
pub struct Tenor {
    length: u32,
    unit: TenorUnit,
}

impl Tenor {
    /// Creates a tenor from a length and unit.
    #[inline]
    pub fn new(length: u32, unit: TenorUnit) -> Self {
        Self { length, unit }
    }

    /// Tenor of `n` days.
    #[inline]
    pub fn days(n: u32) -> Self {
        Self::new(n, TenorUnit::Days)
    }

    /// Tenor of `n` weeks.
    #[inline]
    pub fn weeks(n: u32) -> Self {
        Self::new(n, TenorUnit::Weeks)
    }

    /// Tenor of `n` months.
    #[inline]
    pub fn months(n: u32) -> Self {
        Self::new(n, TenorUnit::Months)
    }

    /// Tenor of `n` years.
    #[inline]
    pub fn years(n: u32) -> Self {
        Self::new(n, TenorUnit::Years)
    }

    /// Numeric length.
    #[inline]
    pub fn length(&self) -> u32 {
        self.length
    }

    /// Unit.
    #[inline]
    pub fn unit(&self) -> TenorUnit {
        self.unit
    }

    /// Year fraction of this tenor.
    pub fn as_years(&self) -> f64 {
        let n = self.length as f64;
        match self.unit {
            TenorUnit::Days => n / 365.0,
            TenorUnit::Weeks => n * 7.0 / 365.0,
            TenorUnit::Months => n / 12.0,
            TenorUnit::Years => n,
        }
    }
}

impl PartialEq for Tenor {
    fn eq(&self, other: &Self) -> bool {
        self.as_years() == other.as_years()
    }
}

impl PartialOrd for Tenor {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.as_years().partial_cmp(&other.as_years())
    }
}

impl fmt::Display for Tenor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.length, self.unit.suffix())
    }
}

impl FromStr for Tenor {
    type Err = TenorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let unit_char = trimmed
            .chars()
            .last()
            .ok_or_else(|| TenorError::Invalid(s.to_string()))?;
        let unit = match unit_char.to_ascii_uppercase() {
            'D' => TenorUnit::Days,
            'W' => TenorUnit::Weeks,
            'M' => TenorUnit::Months,
            'Y' => TenorUnit::Years,
            c if c.is_ascii_digit() => return Err(TenorError::Invalid(s.to_string())),
            c => {
                return Err(TenorError::UnknownUnit {
                    unit: c,
                    input: s.to_string(),
                })
            }
        };
        let length = trimmed[..trimmed.len() - unit_char.len_utf8()]
            .parse::<u32>()
            .map_err(|_| TenorError::Invalid(s.to_string()))?;
        Ok(Self::new(length, unit))
    }
}

impl TryFrom<String> for Tenor {
    type Error = TenorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Tenor> for String {
    fn from(tenor: Tenor) -> Self {
        tenor.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tenor_parse_units() {
        assert_eq!("1D".parse::<Tenor>().unwrap(), Tenor::days(1));
        assert_eq!("2w".parse::<Tenor>().unwrap(), Tenor::weeks(2));
        assert_eq!("6M".parse::<Tenor>().unwrap(), Tenor::months(6));
        assert_eq!("30Y".parse::<Tenor>().unwrap(), Tenor::years(30));
    }

    #[test]
    fn test_tenor_parse_rejects_garbage() {
        assert!(matches!("".parse::<Tenor>(), Err(TenorError::Invalid(_))));
        assert!(matches!("10".parse::<Tenor>(), Err(TenorError::Invalid(_))));
        assert!(matches!("Y".parse::<Tenor>(), Err(TenorError::Invalid(_))));
        assert!(matches!(
            "3Q".parse::<Tenor>(),
            Err(TenorError::UnknownUnit { unit: 'Q', .. })
        ));
    }

    #[test]
    fn test_tenor_years() {
        assert_eq!(Tenor::months(6).as_years(), 0.5);
        assert_eq!(Tenor::years(10).as_years(), 10.0);
        assert!((Tenor::weeks(1).as_years() - 7.0 / 365.0).abs() < 1e-15);
    }

    #[test]
    fn test_tenor_equality_by_year_fraction() {
        assert_eq!(Tenor::months(12), Tenor::years(1));
        assert!(Tenor::months(3) < Tenor::months(6));
        assert_eq!(Tenor::months(12).to_string(), "12M");
    }

    #[test]
    fn test_tenor_display_roundtrip() {
        for label in ["1D", "1W", "3M", "18M", "5Y", "50Y"] {
            let tenor: Tenor = label.parse().unwrap();
            assert_eq!(tenor.to_string(), label);
        }
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_tenor_serde_as_string() {
        let json = serde_json::to_string(&Tenor::years(10)).unwrap();
        assert_eq!(json, "\"10Y\"");
        let back: Tenor = serde_json::from_str("\"3M\"").unwrap();
        assert_eq!(back, Tenor::months(3));
    }
}
