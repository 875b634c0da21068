//! Period definition for scheduled instruments.

use capvol_core::types::time::{Date, DayCountConvention};
use std::fmt;

/// A single accrual period in a schedule.
///
/// # Examples
///
/// ```
/// use capvol_models::schedules::Period;
/// use capvol_core::types::time::{Date, DayCountConvention};
///
/// let period = Period::new(
///     Date::from_ymd(2024, 1, 15).unwrap(),
///     Date::from_ymd(2024, 7, 15).unwrap(),
///     DayCountConvention::Act360,
/// );
///
/// assert!((period.year_fraction() - 182.0 / 360.0).abs() < 1e-12);
/// assert_eq!(period.payment(), period.end());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Period {
    start: Date,
    end: Date,
    day_count: DayCountConvention,
}

impl Period {
    /// Creates a period paying on its end date.
    #[inline]
    pub fn new(start: Date, end: Date, day_count: DayCountConvention) -> Self {
        Self {
            start,
            end,
            day_count,
        }
    }

    /// Start of accrual. Ibor periods fix on this date.
    #[inline]
    pub fn start(&self) -> Date {
        self.start
    }

    /// End of accrual.
    #[inline]
    pub fn end(&self) -> Date {
        self.end
    }

    /// Payment date, equal to the end of accrual.
    #[inline]
    pub fn payment(&self) -> Date {
        self.end
    }

    /// Day count used for the accrual fraction.
    #[inline]
    pub fn day_count(&self) -> DayCountConvention {
        self.day_count
    }

    /// Accrual year fraction.
    #[inline]
    pub fn year_fraction(&self) -> f64 {
        self.day_count.year_fraction(self.start, self.end)
    }

    /// Number of calendar days in the period.
    #[inline]
    pub fn days(&self) -> i64 {
        self.end - self.start
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Period({} to {}, {})", self.start, self.end, self.day_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors() {
        let period = Period::new(
            Date::from_ymd(2024, 1, 1).unwrap(),
            Date::from_ymd(2024, 1, 31).unwrap(),
            DayCountConvention::Act365Fixed,
        );
        assert_eq!(period.days(), 30);
        assert_eq!(period.payment(), Date::from_ymd(2024, 1, 31).unwrap());
        assert!((period.year_fraction() - 30.0 / 365.0).abs() < 1e-15);
    }

    #[test]
    fn test_display() {
        let period = Period::new(
            Date::from_ymd(2024, 1, 15).unwrap(),
            Date::from_ymd(2024, 4, 15).unwrap(),
            DayCountConvention::Act360,
        );
        assert_eq!(
            period.to_string(),
            "Period(2024-01-15 to 2024-04-15, ACT/360)"
        );
    }
}
