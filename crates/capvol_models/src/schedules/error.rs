//! Schedule generation error types.

use capvol_core::types::time::Date;
use capvol_core::types::DateError;
use thiserror::Error;

/// Errors that can occur during schedule generation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ScheduleError {
    /// Start date must be before end date.
    #[error("Start date {start} must be before end date {end}")]
    InvalidDateRange {
        /// The start date.
        start: Date,
        /// The end date.
        end: Date,
    },

    /// Missing required field in builder.
    #[error("Missing required field: {field}")]
    MissingField {
        /// The name of the missing field.
        field: &'static str,
    },

    /// Zero-length period tenor.
    #[error("Period tenor must be positive")]
    ZeroTenor,

    /// Date arithmetic failure.
    #[error("Date arithmetic failed: {0}")]
    Date(#[from] DateError),
}
