//! Schedule and ScheduleBuilder implementation.

use super::error::ScheduleError;
use super::period::Period;
use capvol_core::types::time::{Date, DayCountConvention, Tenor};

/// A non-empty sequence of contiguous accrual periods.
///
/// # Examples
///
/// ```
/// use capvol_models::schedules::ScheduleBuilder;
/// use capvol_core::types::time::{Date, DayCountConvention, Tenor};
///
/// let schedule = ScheduleBuilder::new()
///     .start(Date::from_ymd(2024, 1, 15).unwrap())
///     .end(Date::from_ymd(2026, 1, 15).unwrap())
///     .tenor(Tenor::from_months(6))
///     .day_count(DayCountConvention::Act360)
///     .build()
///     .unwrap();
///
/// assert_eq!(schedule.len(), 4);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Schedule {
    periods: Vec<Period>,
}

impl Schedule {
    /// Returns the periods in the schedule.
    #[inline]
    pub fn periods(&self) -> &[Period] {
        &self.periods
    }

    /// Returns the number of periods.
    #[inline]
    pub fn len(&self) -> usize {
        self.periods.len()
    }

    /// Always false: a built schedule has at least one period.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    /// Start of the first period.
    #[inline]
    pub fn start_date(&self) -> Date {
        self.periods[0].start()
    }

    /// End of the last period.
    #[inline]
    pub fn end_date(&self) -> Date {
        self.periods[self.periods.len() - 1].end()
    }

    /// Returns an iterator over the periods.
    pub fn iter(&self) -> impl Iterator<Item = &Period> {
        self.periods.iter()
    }

    /// Sum of the accrual fractions.
    pub fn total_year_fraction(&self) -> f64 {
        self.periods.iter().map(|p| p.year_fraction()).sum()
    }
}

/// Builder for regular schedules rolled forward from the start date.
///
/// Period ends are `start + k × tenor`, so end-of-month starts do not
/// drift. When the tenor does not divide the span the final period is a
/// short stub ending on the end date.
#[derive(Debug, Clone)]
pub struct ScheduleBuilder {
    start_date: Option<Date>,
    end_date: Option<Date>,
    tenor: Option<Tenor>,
    day_count: DayCountConvention,
}

impl Default for ScheduleBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ScheduleBuilder {
    /// Creates a builder. The default day count is ACT/365F.
    pub fn new() -> Self {
        Self {
            start_date: None,
            end_date: None,
            tenor: None,
            day_count: DayCountConvention::Act365Fixed,
        }
    }

    /// Sets the start date of the schedule.
    pub fn start(mut self, date: Date) -> Self {
        self.start_date = Some(date);
        self
    }

    /// Sets the end date of the schedule.
    pub fn end(mut self, date: Date) -> Self {
        self.end_date = Some(date);
        self
    }

    /// Sets the regular period length.
    pub fn tenor(mut self, tenor: Tenor) -> Self {
        self.tenor = Some(tenor);
        self
    }

    /// Sets the day count convention.
    pub fn day_count(mut self, dc: DayCountConvention) -> Self {
        self.day_count = dc;
        self
    }

    /// Builds the schedule.
    ///
    /// # Errors
    ///
    /// - `MissingField` if start, end or tenor is unset
    /// - `ZeroTenor` for a zero-month tenor
    /// - `InvalidDateRange` unless start < end
    pub fn build(self) -> Result<Schedule, ScheduleError> {
        let start = self
            .start_date
            .ok_or(ScheduleError::MissingField { field: "start" })?;
        let end = self
            .end_date
            .ok_or(ScheduleError::MissingField { field: "end" })?;
        let tenor = self
            .tenor
            .ok_or(ScheduleError::MissingField { field: "tenor" })?;
        if tenor.is_zero() {
            return Err(ScheduleError::ZeroTenor);
        }
        if start >= end {
            return Err(ScheduleError::InvalidDateRange { start, end });
        }

        let mut periods = Vec::new();
        let mut period_start = start;
        let mut k: u32 = 1;
        while period_start < end {
            let rolled = start.plus_months(tenor.months() * k)?;
            let period_end = if rolled > end { end } else { rolled };
            periods.push(Period::new(period_start, period_end, self.day_count));
            period_start = period_end;
            k += 1;
        }

        Ok(Schedule { periods })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> Date {
        Date::from_ymd(y, m, d).unwrap()
    }

    // ===== Regular schedules =====

    #[test]
    fn test_quarterly_schedule() {
        let schedule = ScheduleBuilder::new()
            .start(date(2024, 1, 15))
            .end(date(2025, 1, 15))
            .tenor(Tenor::from_months(3))
            .build()
            .unwrap();
        assert_eq!(schedule.len(), 4);
        assert_eq!(schedule.start_date(), date(2024, 1, 15));
        assert_eq!(schedule.end_date(), date(2025, 1, 15));
        for w in schedule.periods().windows(2) {
            assert_eq!(w[0].end(), w[1].start());
        }
    }

    #[test]
    fn test_month_end_does_not_drift() {
        let schedule = ScheduleBuilder::new()
            .start(date(2024, 1, 31))
            .end(date(2024, 7, 31))
            .tenor(Tenor::from_months(1))
            .build()
            .unwrap();
        let ends: Vec<Date> = schedule.iter().map(|p| p.end()).collect();
        assert_eq!(ends[0], date(2024, 2, 29));
        assert_eq!(ends[1], date(2024, 3, 31));
        assert_eq!(ends[5], date(2024, 7, 31));
    }

    // ===== Stubs and errors =====

    #[test]
    fn test_short_final_stub() {
        let schedule = ScheduleBuilder::new()
            .start(date(2024, 6, 1))
            .end(date(2025, 3, 1))
            .tenor(Tenor::from_months(6))
            .build()
            .unwrap();
        assert_eq!(schedule.len(), 2);
        let stub = schedule.periods()[1];
        assert_eq!(stub.start(), date(2024, 12, 1));
        assert_eq!(stub.end(), date(2025, 3, 1));
    }

    #[test]
    fn test_empty_span_rejected() {
        let err = ScheduleBuilder::new()
            .start(date(2024, 6, 1))
            .end(date(2024, 6, 1))
            .tenor(Tenor::from_months(6))
            .build()
            .unwrap_err();
        assert!(matches!(err, ScheduleError::InvalidDateRange { .. }));
    }

    #[test]
    fn test_missing_fields() {
        let err = ScheduleBuilder::new().end(date(2025, 1, 1)).build().unwrap_err();
        assert_eq!(err, ScheduleError::MissingField { field: "start" });
        let err = ScheduleBuilder::new()
            .start(date(2024, 1, 1))
            .end(date(2025, 1, 1))
            .tenor(Tenor::from_months(0))
            .build()
            .unwrap_err();
        assert_eq!(err, ScheduleError::ZeroTenor);
    }
}
