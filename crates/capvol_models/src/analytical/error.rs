//! Error types for analytical pricing operations.

use thiserror::Error;

use crate::instruments::PricingError;

/// Analytical pricing errors.
///
/// # Examples
/// ```
/// use capvol_models::analytical::AnalyticalError;
///
/// let err = AnalyticalError::InvalidVolatility { volatility: -0.2 };
/// assert!(format!("{}", err).contains("volatility"));
/// ```
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AnalyticalError {
    /// Negative or non-finite volatility.
    #[error("Invalid volatility: σ = {volatility}")]
    InvalidVolatility {
        /// The invalid volatility value
        volatility: f64,
    },

    /// Shifted forward not strictly positive under a lognormal model.
    #[error("Invalid forward for lognormal model: F = {forward}, shift = {shift}")]
    InvalidForward {
        /// Forward rate
        forward: f64,
        /// Shift applied to forward and strike
        shift: f64,
    },

    /// Numerical instability during computation.
    #[error("Numerical instability: {message}")]
    NumericalInstability {
        /// Description of the numerical issue
        message: String,
    },
}

impl From<AnalyticalError> for PricingError {
    fn from(err: AnalyticalError) -> Self {
        match err {
            AnalyticalError::InvalidVolatility { volatility } => {
                PricingError::InvalidInput(format!("volatility σ = {}", volatility))
            }
            AnalyticalError::InvalidForward { forward, shift } => PricingError::InvalidInput(
                format!("lognormal forward F = {}, shift = {}", forward, shift),
            ),
            AnalyticalError::NumericalInstability { message } => {
                PricingError::NumericalInstability(message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ===== Display =====

    #[test]
    fn test_invalid_volatility_display() {
        let err = AnalyticalError::InvalidVolatility { volatility: -0.2 };
        assert_eq!(format!("{}", err), "Invalid volatility: σ = -0.2");
    }

    #[test]
    fn test_invalid_forward_display() {
        let err = AnalyticalError::InvalidForward {
            forward: -0.02,
            shift: 0.01,
        };
        assert_eq!(
            format!("{}", err),
            "Invalid forward for lognormal model: F = -0.02, shift = 0.01"
        );
    }

    // ===== Conversion =====

    #[test]
    fn test_into_pricing_error() {
        let err: PricingError = AnalyticalError::InvalidVolatility { volatility: -1.0 }.into();
        assert!(matches!(err, PricingError::InvalidInput(ref msg) if msg.contains("volatility")));

        let err: PricingError = AnalyticalError::NumericalInstability {
            message: "overflow".to_string(),
        }
        .into();
        assert_eq!(err, PricingError::NumericalInstability("overflow".to_string()));
    }

    #[test]
    fn test_pricing_error_message_not_doubled() {
        let err: PricingError = AnalyticalError::InvalidForward {
            forward: -0.02,
            shift: 0.01,
        }
        .into();
        assert_eq!(
            err.to_string(),
            "Invalid input: lognormal forward F = -0.02, shift = 0.01"
        );

        let err: PricingError = AnalyticalError::NumericalInstability {
            message: "overflow".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "Numerical instability: overflow");
    }
}
