//! Ibor cap and floor legs.
//!
//! A cap (floor) is a strip of caplets (floorlets), each an option on one
//! Ibor fixing. Caplet `i` pays at the end of its accrual period
//!
//! ```text
//! max(±(L_i - K), 0) × τ_i × N
//! ```
//!
//! where `L_i` fixes at the start of the period.
//!
//! # Example
//!
//! ```
//! use capvol_core::types::{Currency, Date, DayCountConvention, IborIndex, Tenor};
//! use capvol_models::instruments::{CapFloorLeg, PutCall};
//!
//! let index = IborIndex::new("EUR-EURIBOR-6M", Currency::EUR, Tenor::from_months(6), DayCountConvention::Act360);
//! let leg = CapFloorLeg::builder()
//!     .index(index)
//!     .start(Date::from_ymd(2024, 7, 15).unwrap())
//!     .end(Date::from_ymd(2027, 1, 15).unwrap())
//!     .strike(0.03)
//!     .put_call(PutCall::Call)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(leg.len(), 5);
//! assert_eq!(leg.final_fixing_date(), Some(Date::from_ymd(2026, 7, 15).unwrap()));
//! ```

use std::fmt;

use capvol_core::types::{Date, IborIndex};

use super::error::PricingError;
use crate::schedules::{Period, ScheduleBuilder, ScheduleError};

/// Option direction of a caplet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PutCall {
    /// Caplet: pays when the fixing is above the strike.
    #[default]
    Call,
    /// Floorlet: pays when the fixing is below the strike.
    Put,
}

impl PutCall {
    /// `+1` for a call, `-1` for a put.
    #[inline]
    pub fn sign(&self) -> f64 {
        match self {
            PutCall::Call => 1.0,
            PutCall::Put => -1.0,
        }
    }

    /// True for a call.
    #[inline]
    pub fn is_call(&self) -> bool {
        matches!(self, PutCall::Call)
    }
}

impl fmt::Display for PutCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PutCall::Call => write!(f, "Call"),
            PutCall::Put => write!(f, "Put"),
        }
    }
}

/// One caplet or floorlet of a leg.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CapletPeriod {
    fixing_date: Date,
    period: Period,
    strike: f64,
    put_call: PutCall,
}

impl CapletPeriod {
    /// Caplet on `period`, fixing at the period start.
    pub fn new(period: Period, strike: f64, put_call: PutCall) -> Self {
        Self {
            fixing_date: period.start(),
            period,
            strike,
            put_call,
        }
    }

    /// Fixing date of the underlying rate.
    #[inline]
    pub fn fixing_date(&self) -> Date {
        self.fixing_date
    }

    /// Accrual start.
    #[inline]
    pub fn start_date(&self) -> Date {
        self.period.start()
    }

    /// Accrual end.
    #[inline]
    pub fn end_date(&self) -> Date {
        self.period.end()
    }

    /// Payment date.
    #[inline]
    pub fn payment_date(&self) -> Date {
        self.period.payment()
    }

    /// Accrual year fraction.
    #[inline]
    pub fn year_fraction(&self) -> f64 {
        self.period.year_fraction()
    }

    /// Strike rate.
    #[inline]
    pub fn strike(&self) -> f64 {
        self.strike
    }

    /// Caplet or floorlet.
    #[inline]
    pub fn put_call(&self) -> PutCall {
        self.put_call
    }
}

/// A strip of caplets or floorlets on one Ibor index with a common strike.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CapFloorLeg {
    index: IborIndex,
    notional: f64,
    strike: f64,
    put_call: PutCall,
    periods: Vec<CapletPeriod>,
}

impl CapFloorLeg {
    /// Starts building a leg.
    pub fn builder() -> CapFloorLegBuilder {
        CapFloorLegBuilder::default()
    }

    /// Underlying index.
    pub fn index(&self) -> &IborIndex {
        &self.index
    }

    /// Notional.
    #[inline]
    pub fn notional(&self) -> f64 {
        self.notional
    }

    /// Common strike.
    #[inline]
    pub fn strike(&self) -> f64 {
        self.strike
    }

    /// Cap (call) or floor (put).
    #[inline]
    pub fn put_call(&self) -> PutCall {
        self.put_call
    }

    /// Caplets in schedule order.
    pub fn periods(&self) -> &[CapletPeriod] {
        &self.periods
    }

    /// Number of caplets.
    pub fn len(&self) -> usize {
        self.periods.len()
    }

    /// True when the leg has no caplets.
    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    /// Fixing date of the last caplet.
    pub fn final_fixing_date(&self) -> Option<Date> {
        self.periods.last().map(|p| p.fixing_date())
    }

    /// The same schedule and strike with another direction.
    pub fn with_put_call(&self, put_call: PutCall) -> Self {
        Self {
            index: self.index.clone(),
            notional: self.notional,
            strike: self.strike,
            put_call,
            periods: self
                .periods
                .iter()
                .map(|p| CapletPeriod { put_call, ..*p })
                .collect(),
        }
    }
}

/// Builder for [`CapFloorLeg`].
///
/// Periods roll by the index tenor from the start date and accrue with the
/// index day count. The notional defaults to 1 and the direction to a cap.
#[derive(Debug, Clone, Default)]
pub struct CapFloorLegBuilder {
    index: Option<IborIndex>,
    start: Option<Date>,
    end: Option<Date>,
    strike: Option<f64>,
    notional: Option<f64>,
    put_call: PutCall,
}

impl CapFloorLegBuilder {
    /// Sets the index.
    pub fn index(mut self, index: IborIndex) -> Self {
        self.index = Some(index);
        self
    }

    /// Sets the accrual start of the first caplet.
    pub fn start(mut self, date: Date) -> Self {
        self.start = Some(date);
        self
    }

    /// Sets the accrual end of the last caplet.
    pub fn end(mut self, date: Date) -> Self {
        self.end = Some(date);
        self
    }

    /// Sets the strike.
    pub fn strike(mut self, strike: f64) -> Self {
        self.strike = Some(strike);
        self
    }

    /// Sets the notional.
    pub fn notional(mut self, notional: f64) -> Self {
        self.notional = Some(notional);
        self
    }

    /// Sets cap or floor.
    pub fn put_call(mut self, put_call: PutCall) -> Self {
        self.put_call = put_call;
        self
    }

    /// Builds the leg.
    ///
    /// # Errors
    ///
    /// - `PricingError::Schedule` for a missing field or an empty span
    /// - `PricingError::InvalidInput` for a non-finite strike or notional
    pub fn build(self) -> Result<CapFloorLeg, PricingError> {
        let index = self
            .index
            .ok_or(ScheduleError::MissingField { field: "index" })?;
        let strike = self
            .strike
            .ok_or(ScheduleError::MissingField { field: "strike" })?;
        if !strike.is_finite() {
            return Err(PricingError::InvalidInput(format!(
                "strike must be finite, got {}",
                strike
            )));
        }
        let notional = self.notional.unwrap_or(1.0);
        if !notional.is_finite() {
            return Err(PricingError::InvalidInput(format!(
                "notional must be finite, got {}",
                notional
            )));
        }

        let mut schedule = ScheduleBuilder::new()
            .tenor(index.tenor())
            .day_count(index.day_count());
        if let Some(start) = self.start {
            schedule = schedule.start(start);
        }
        if let Some(end) = self.end {
            schedule = schedule.end(end);
        }
        let schedule = schedule.build()?;

        let periods = schedule
            .iter()
            .map(|p| CapletPeriod::new(*p, strike, self.put_call))
            .collect();
        Ok(CapFloorLeg {
            index,
            notional,
            strike,
            put_call: self.put_call,
            periods,
        })
    }
}
