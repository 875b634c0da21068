//! Core time, convention and error types.
//!
//! This module provides:
//! - `time`: `Date`, `Tenor` and `DayCountConvention`
//! - `currency`: ISO 4217 currency codes
//! - `index`: `IborIndex` conventions
//! - `error`: Structured error types for dates, currencies, interpolation and solvers

pub mod currency;
pub mod error;
pub mod index;
pub mod time;

pub use currency::Currency;
pub use error::{CurrencyError, DateError, InterpolationError, SolverError};
pub use index::IborIndex;
pub use time::{Date, DayCountConvention, Tenor};
