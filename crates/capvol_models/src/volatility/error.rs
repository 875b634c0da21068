//! Volatility object error types.

use capvol_core::types::InterpolationError;
use thiserror::Error;

use crate::analytical::AnalyticalError;

/// Errors raised while building or querying caplet volatilities.
///
/// # Examples
/// ```
/// use capvol_models::volatility::VolatilityError;
///
/// let err = VolatilityError::InvalidSabrParameter { name: "rho", value: 1.0 };
/// assert_eq!(format!("{}", err), "Invalid SABR parameter: rho = 1");
/// ```
#[derive(Debug, Clone, Error, PartialEq)]
pub enum VolatilityError {
    /// SABR parameter outside its domain.
    #[error("Invalid SABR parameter: {name} = {value}")]
    InvalidSabrParameter {
        /// Parameter name
        name: &'static str,
        /// Offending value
        value: f64,
    },

    /// Forward or strike not positive after shifting.
    #[error("Non-positive shifted rate: {rate} + {shift}")]
    NonPositiveShiftedRate {
        /// Forward or strike
        rate: f64,
        /// Shift
        shift: f64,
    },

    /// Parameter curve cannot be built.
    #[error("Invalid parameter curve: {0}")]
    InvalidParameterCurve(String),

    /// Node metadata and values are inconsistent.
    #[error("Invalid surface nodes: {0}")]
    InvalidNodes(String),

    /// NaN or infinity produced.
    #[error("Non-finite value in {0}")]
    NonFinite(String),

    /// Interpolation failure.
    #[error("Interpolation error: {0}")]
    Interpolation(#[from] InterpolationError),

    /// Closed-form pricing failure.
    #[error("Pricing formula error: {0}")]
    Analytical(#[from] AnalyticalError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = VolatilityError::NonPositiveShiftedRate {
            rate: -0.02,
            shift: 0.01,
        };
        assert_eq!(format!("{}", err), "Non-positive shifted rate: -0.02 + 0.01");
        assert_eq!(
            VolatilityError::NonFinite("surface".to_string()).to_string(),
            "Non-finite value in surface"
        );
    }

    #[test]
    fn test_from_conversions() {
        let err: VolatilityError = InterpolationError::InsufficientData { got: 0, need: 1 }.into();
        assert!(matches!(err, VolatilityError::Interpolation(_)));
        let err: VolatilityError = AnalyticalError::InvalidVolatility { volatility: -1.0 }.into();
        assert!(matches!(err, VolatilityError::Analytical(_)));
    }
}
