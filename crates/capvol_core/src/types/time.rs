//! Dates, tenors and day count conventions.
//!
//! This module provides:
//! - `Date`: Type-safe date wrapper around chrono::NaiveDate
//! - `Tenor`: Month-based period such as `3M` or `2Y`
//! - `DayCountConvention`: Mapping of a date pair to a year fraction
//!
//! # Examples
//!
//! ```
//! use capvol_core::types::time::{Date, DayCountConvention, Tenor};
//!
//! let start = Date::from_ymd(2024, 1, 15).unwrap();
//! let end = start.plus_tenor("6M".parse::<Tenor>().unwrap()).unwrap();
//! assert_eq!(end, Date::from_ymd(2024, 7, 15).unwrap());
//!
//! let yf = DayCountConvention::Act365Fixed.year_fraction(start, end);
//! assert!((yf - 182.0 / 365.0).abs() < 1e-12);
//! ```

use chrono::{Datelike, Months, NaiveDate};
use std::fmt;
use std::ops::Sub;
use std::str::FromStr;

use super::error::DateError;

/// Type-safe date wrapper around chrono::NaiveDate.
///
/// Subtracting two dates yields the signed number of calendar days.
///
/// ```
/// use capvol_core::types::time::Date;
///
/// let start = Date::from_ymd(2024, 1, 1).unwrap();
/// let end: Date = "2024-01-11".parse().unwrap();
/// assert_eq!(end - start, 10);
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Date(NaiveDate);

impl Date {
    /// Creates a Date from year, month, and day components.
    ///
    /// Returns `Err(DateError::InvalidDate)` for dates that do not exist.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Result<Self, DateError> {
        NaiveDate::from_ymd_opt(year, month, day)
            .map(Date)
            .ok_or(DateError::InvalidDate { year, month, day })
    }

    /// Parses a date from ISO 8601 format (YYYY-MM-DD).
    pub fn parse(s: &str) -> Result<Self, DateError> {
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Date)
            .map_err(|e| DateError::ParseError(e.to_string()))
    }

    /// Returns the underlying NaiveDate.
    #[inline]
    pub fn into_inner(self) -> NaiveDate {
        self.0
    }

    /// Year component.
    #[inline]
    pub fn year(&self) -> i32 {
        self.0.year()
    }

    /// Month component (1-12).
    #[inline]
    pub fn month(&self) -> u32 {
        self.0.month()
    }

    /// Day-of-month component (1-31).
    #[inline]
    pub fn day(&self) -> u32 {
        self.0.day()
    }

    /// Adds a number of calendar months, clamping to the end of the month
    /// when the target day does not exist (31 Jan + 1M = 29 Feb in a leap year).
    pub fn plus_months(&self, months: u32) -> Result<Self, DateError> {
        self.0
            .checked_add_months(Months::new(months))
            .map(Date)
            .ok_or(DateError::Overflow { months })
    }

    /// Adds a tenor.
    #[inline]
    pub fn plus_tenor(&self, tenor: Tenor) -> Result<Self, DateError> {
        self.plus_months(tenor.months())
    }
}

impl From<NaiveDate> for Date {
    fn from(date: NaiveDate) -> Self {
        Date(date)
    }
}

impl Sub for Date {
    type Output = i64;

    fn sub(self, rhs: Self) -> Self::Output {
        (self.0 - rhs.0).num_days()
    }
}

impl FromStr for Date {
    type Err = DateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Date::parse(s)
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

/// A month-based period, the unit in which cap maturities and index tenors
/// are quoted.
///
/// Whole years are displayed as `nY`, everything else as `nM`.
///
/// ```
/// use capvol_core::types::time::Tenor;
///
/// let t: Tenor = "18M".parse().unwrap();
/// assert_eq!(t.months(), 18);
/// assert_eq!(Tenor::from_years(2).to_string(), "2Y");
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tenor {
    months: u32,
}

impl Tenor {
    /// Tenor of `months` months.
    #[inline]
    pub const fn from_months(months: u32) -> Self {
        Self { months }
    }

    /// Tenor of `years` years.
    #[inline]
    pub const fn from_years(years: u32) -> Self {
        Self { months: years * 12 }
    }

    /// Length in months.
    #[inline]
    pub const fn months(&self) -> u32 {
        self.months
    }

    /// True for the zero-length tenor.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.months == 0
    }
}

impl fmt::Display for Tenor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.months != 0 && self.months % 12 == 0 {
            write!(f, "{}Y", self.months / 12)
        } else {
            write!(f, "{}M", self.months)
        }
    }
}

impl FromStr for Tenor {
    type Err = DateError;

    /// Parses `"<n>M"` or `"<n>Y"`, case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_uppercase();
        let parse_error = || DateError::ParseError(format!("Invalid tenor: {}", s));
        if s.len() < 2 {
            return Err(parse_error());
        }
        let (count, unit) = s.split_at(s.len() - 1);
        let count: u32 = count.parse().map_err(|_| parse_error())?;
        match unit {
            "M" => Ok(Tenor::from_months(count)),
            "Y" => count
                .checked_mul(12)
                .map(Tenor::from_months)
                .ok_or_else(parse_error),
            _ => Err(parse_error()),
        }
    }
}

/// Day count conventions for year fraction calculation.
///
/// - `Act365Fixed`: actual days / 365
/// - `Act360`: actual days / 360
/// - `Thirty360`: 30/360 US bond basis
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DayCountConvention {
    /// Actual/365 Fixed.
    #[default]
    Act365Fixed,
    /// Actual/360.
    Act360,
    /// 30/360 US.
    Thirty360,
}

impl DayCountConvention {
    /// Conventional market name.
    pub fn name(&self) -> &'static str {
        match self {
            DayCountConvention::Act365Fixed => "ACT/365F",
            DayCountConvention::Act360 => "ACT/360",
            DayCountConvention::Thirty360 => "30/360",
        }
    }

    /// Year fraction between two dates; negative when `end` precedes `start`.
    pub fn year_fraction(&self, start: Date, end: Date) -> f64 {
        match self {
            DayCountConvention::Act365Fixed => (end - start) as f64 / 365.0,
            DayCountConvention::Act360 => (end - start) as f64 / 360.0,
            DayCountConvention::Thirty360 => {
                let (first, second, sign) = if start <= end {
                    (start, end, 1.0)
                } else {
                    (end, start, -1.0)
                };
                let d1 = first.day().min(30);
                let d2 = if second.day() == 31 && d1 == 30 {
                    30
                } else {
                    second.day()
                };
                let days = 360 * (second.year() - first.year())
                    + 30 * (second.month() as i32 - first.month() as i32)
                    + (d2 as i32 - d1 as i32);
                sign * days as f64 / 360.0
            }
        }
    }
}

impl FromStr for DayCountConvention {
    type Err = DateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().replace(['/', ' '], "").as_str() {
            "ACT365F" | "ACT365" | "ACTUAL365FIXED" | "A365F" => {
                Ok(DayCountConvention::Act365Fixed)
            }
            "ACT360" | "ACTUAL360" | "A360" => Ok(DayCountConvention::Act360),
            "30360" | "THIRTY360" => Ok(DayCountConvention::Thirty360),
            _ => Err(DateError::ParseError(format!(
                "Unknown day count convention: {}",
                s
            ))),
        }
    }
}

impl fmt::Display for DayCountConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn date(y: i32, m: u32, d: u32) -> Date {
        Date::from_ymd(y, m, d).unwrap()
    }

    // ===== Date =====

    #[test]
    fn test_invalid_date_rejected() {
        assert!(Date::from_ymd(2023, 2, 29).is_err());
        assert!(Date::from_ymd(2024, 2, 29).is_ok());
    }

    #[test]
    fn test_parse_and_display() {
        let d: Date = "2024-06-15".parse().unwrap();
        assert_eq!(d.to_string(), "2024-06-15");
        assert!("15/06/2024".parse::<Date>().is_err());
    }

    #[test]
    fn test_plus_months_clamps_to_month_end() {
        assert_eq!(date(2024, 1, 31).plus_months(1).unwrap(), date(2024, 2, 29));
        assert_eq!(date(2023, 1, 31).plus_months(1).unwrap(), date(2023, 2, 28));
        assert_eq!(date(2024, 11, 15).plus_months(3).unwrap(), date(2025, 2, 15));
    }

    // ===== Tenor =====

    #[test]
    fn test_tenor_parse() {
        assert_eq!("3M".parse::<Tenor>().unwrap(), Tenor::from_months(3));
        assert_eq!("2y".parse::<Tenor>().unwrap(), Tenor::from_months(24));
        assert!("Y".parse::<Tenor>().is_err());
        assert!("3W".parse::<Tenor>().is_err());
        assert!("-1M".parse::<Tenor>().is_err());
    }

    #[test]
    fn test_tenor_display() {
        assert_eq!(Tenor::from_months(12).to_string(), "1Y");
        assert_eq!(Tenor::from_months(18).to_string(), "18M");
        assert_eq!(Tenor::from_months(0).to_string(), "0M");
    }

    #[test]
    fn test_tenor_ordering() {
        assert!(Tenor::from_months(6) < Tenor::from_years(1));
        assert!(Tenor::from_years(2) > Tenor::from_months(18));
    }

    // ===== Day counts =====

    #[test]
    fn test_act_conventions() {
        let start = date(2024, 1, 1);
        let end = date(2024, 7, 1);
        assert_relative_eq!(
            DayCountConvention::Act365Fixed.year_fraction(start, end),
            182.0 / 365.0,
            epsilon = 1e-14
        );
        assert_relative_eq!(
            DayCountConvention::Act360.year_fraction(start, end),
            182.0 / 360.0,
            epsilon = 1e-14
        );
    }

    #[test]
    fn test_thirty_360() {
        let yf = DayCountConvention::Thirty360.year_fraction(date(2024, 1, 31), date(2024, 3, 31));
        assert_relative_eq!(yf, 60.0 / 360.0, epsilon = 1e-14);
        let back = DayCountConvention::Thirty360.year_fraction(date(2024, 3, 31), date(2024, 1, 31));
        assert_relative_eq!(back, -60.0 / 360.0, epsilon = 1e-14);
    }

    #[test]
    fn test_day_count_from_str() {
        assert_eq!(
            "act/365f".parse::<DayCountConvention>().unwrap(),
            DayCountConvention::Act365Fixed
        );
        assert_eq!(
            "30/360".parse::<DayCountConvention>().unwrap(),
            DayCountConvention::Thirty360
        );
        assert!("BUS/252".parse::<DayCountConvention>().is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_tenor_serde() {
        let tenor = Tenor::from_months(18);
        let json = serde_json::to_string(&tenor).unwrap();
        let back: Tenor = serde_json::from_str(&json).unwrap();
        assert_eq!(tenor, back);
    }

    // ===== Property tests =====

    proptest! {
        #[test]
        fn prop_year_fraction_antisymmetric(a in 0i64..20_000, b in 0i64..20_000) {
            let base = date(2000, 1, 1).into_inner();
            let d1 = Date::from(base + chrono::Duration::days(a));
            let d2 = Date::from(base + chrono::Duration::days(b));
            for dc in [DayCountConvention::Act365Fixed, DayCountConvention::Act360, DayCountConvention::Thirty360] {
                let forward = dc.year_fraction(d1, d2);
                let backward = dc.year_fraction(d2, d1);
                prop_assert!((forward + backward).abs() < 1e-12);
            }
        }

        #[test]
        fn prop_tenor_display_roundtrip(months in 0u32..600) {
            let tenor = Tenor::from_months(months);
            let parsed: Tenor = tenor.to_string().parse().unwrap();
            prop_assert_eq!(parsed, tenor);
        }
    }

    #[cfg(feature = "serde")]
    mod serde_tests {
        use super::*;

        #[test]
        fn test_date_serde_roundtrip() {
            let d = date(2024, 6, 15);
            let json = serde_json::to_string(&d).unwrap();
            assert_eq!(json, "\"2024-06-15\"");
            let parsed: Date = serde_json::from_str(&json).unwrap();
            assert_eq!(parsed, d);
        }

        #[test]
        fn test_tenor_serde_roundtrip() {
            let tenor = Tenor::from_years(5);
            let json = serde_json::to_string(&tenor).unwrap();
            let parsed: Tenor = serde_json::from_str(&json).unwrap();
            assert_eq!(parsed, tenor);
        }
    }
}
