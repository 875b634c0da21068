//! Calibration output.

use capvol_models::volatility::{IborCapletFloorletVolatilities, ParameterMetadata};

/// A calibrated caplet volatility object and its fit statistics.
///
/// `chi_square` is the sum of squared weighted residuals at the solution;
/// any smoothness penalty is excluded.
#[derive(Debug, Clone, PartialEq)]
pub struct CapletCalibrationResult {
    volatilities: IborCapletFloorletVolatilities,
    chi_square: f64,
    iterations: usize,
    metadata: Vec<ParameterMetadata>,
}

impl CapletCalibrationResult {
    /// Assembles a result.
    pub fn new(
        volatilities: IborCapletFloorletVolatilities,
        chi_square: f64,
        iterations: usize,
        metadata: Vec<ParameterMetadata>,
    ) -> Self {
        Self {
            volatilities,
            chi_square,
            iterations,
            metadata,
        }
    }

    /// Calibrated volatilities.
    pub fn volatilities(&self) -> &IborCapletFloorletVolatilities {
        &self.volatilities
    }

    /// Takes the calibrated volatilities.
    pub fn into_volatilities(self) -> IborCapletFloorletVolatilities {
        self.volatilities
    }

    /// Sum of squared weighted residuals.
    pub fn chi_square(&self) -> f64 {
        self.chi_square
    }

    /// Solver steps taken, summed over sequential solves.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Metadata of the optimised parameters, in solver order.
    pub fn parameter_metadata(&self) -> &[ParameterMetadata] {
        &self.metadata
    }
}
