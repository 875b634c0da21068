//! Accrual schedules for cap and floor legs.
//!
//! - [`Schedule`]: contiguous accrual periods
//! - [`Period`]: a single accrual period
//! - [`ScheduleBuilder`]: rolls a tenor from a start date, with a short final stub

mod error;
mod period;
mod schedule;

pub use error::ScheduleError;
pub use period::Period;
pub use schedule::{Schedule, ScheduleBuilder};
