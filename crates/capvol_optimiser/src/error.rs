//! Calibration error types.
//!
//! Every failure is fatal to the calibration call; no partial result is
//! returned.

use capvol_core::market_data::MarketDataError;
use capvol_core::types::SolverError;
use capvol_models::instruments::PricingError;
use capvol_models::volatility::VolatilityError;
use thiserror::Error;

/// Errors raised by ingestion, definitions and calibrators.
///
/// # Variants
///
/// - `InvalidConfiguration`: definition rule violated at construction
/// - `DataShape`: raw quote grid is malformed
/// - `UnsupportedValueType`: quote value type or quote type not calibratable
/// - `InsufficientData`: no usable instrument in the grid
/// - `NonConvergence`: solver budget exhausted
///
/// # Examples
///
/// ```
/// use capvol_optimiser::CalibrationError;
///
/// let err = CalibrationError::non_convergence(200, 0.5);
/// assert!(format!("{}", err).contains("200"));
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalibrationError {
    /// Definition violates an interpolation, extrapolation or weight rule.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Quote matrix, error matrix or axes are inconsistent.
    #[error("Data shape error: {0}")]
    DataShape(String),

    /// Value type or quote type that cannot be calibrated.
    #[error("Unsupported value type: {0}")]
    UnsupportedValueType(String),

    /// No instrument could be built from the grid.
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// Solver stopped without meeting its tolerance.
    #[error("Calibration did not converge after {iterations} iterations: chi-square = {chi_square}")]
    NonConvergence {
        /// Iterations performed
        iterations: usize,
        /// Chi-square at the last iterate
        chi_square: f64,
    },

    /// Wrapped market data error.
    #[error("Market data error: {0}")]
    MarketData(#[from] MarketDataError),

    /// Wrapped pricing error.
    #[error("Pricing error: {0}")]
    Pricing(#[from] PricingError),

    /// Wrapped volatility error.
    #[error("Volatility error: {0}")]
    Volatility(#[from] VolatilityError),

    /// Wrapped solver failure other than an exhausted budget.
    #[error("Solver error: {0}")]
    Solver(#[from] SolverError),
}

impl CalibrationError {
    /// Create an invalid configuration error.
    pub fn invalid_configuration(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration(message.into())
    }

    /// Create a data shape error.
    pub fn data_shape(message: impl Into<String>) -> Self {
        Self::DataShape(message.into())
    }

    /// Create an unsupported value type error.
    pub fn unsupported_value_type(message: impl Into<String>) -> Self {
        Self::UnsupportedValueType(message.into())
    }

    /// Create an insufficient data error.
    pub fn insufficient_data(message: impl Into<String>) -> Self {
        Self::InsufficientData(message.into())
    }

    /// Create a non-convergence error.
    pub fn non_convergence(iterations: usize, chi_square: f64) -> Self {
        Self::NonConvergence {
            iterations,
            chi_square,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========================================
    // Display Tests
    // ========================================

    #[test]
    fn test_display() {
        assert_eq!(
            CalibrationError::invalid_configuration("left extrapolator must be flat").to_string(),
            "Invalid configuration: left extrapolator must be flat"
        );
        assert_eq!(
            CalibrationError::data_shape("3 rows, expected 2").to_string(),
            "Data shape error: 3 rows, expected 2"
        );
        assert_eq!(
            CalibrationError::non_convergence(50, 1.5).to_string(),
            "Calibration did not converge after 50 iterations: chi-square = 1.5"
        );
    }

    // ========================================
    // Conversion Tests
    // ========================================

    #[test]
    fn test_from_wrapped_errors() {
        let err: CalibrationError = MarketDataError::MissingCurve {
            name: "USD".to_string(),
        }
        .into();
        assert!(matches!(err, CalibrationError::MarketData(_)));

        let err: CalibrationError = PricingError::InvalidInput("x".to_string()).into();
        assert!(matches!(err, CalibrationError::Pricing(_)));

        let err: CalibrationError = VolatilityError::NonFinite("alpha".to_string()).into();
        assert!(matches!(err, CalibrationError::Volatility(_)));
    }

    #[test]
    fn test_from_solver_error() {
        let err: CalibrationError = SolverError::DimensionMismatch {
            expected: 3,
            got: 2,
        }
        .into();
        assert!(matches!(err, CalibrationError::Solver(_)));
    }
}
