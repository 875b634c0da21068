//! Definition of a penalised caplet surface fitted in one regression.

use capvol_core::math::interpolators::GridSurfaceInterpolator;
use capvol_core::types::{DayCountConvention, IborIndex};
use capvol_models::volatility::ShiftCurve;

use super::check_shift;
use crate::data::{create_metadata, RawOptionData, SurfaceMetadata};
use crate::error::CalibrationError;
use crate::penalty::{penalty_matrix, Matrix};

/// A caplet surface with a node at every caplet fixing time and strike,
/// fitted to all caps at once under a smoothness penalty.
///
/// `lambda_expiry` and `lambda_strike` weight the curvature of the node
/// values along each axis.
///
/// ```
/// use capvol_core::math::interpolators::{CurveInterpolator, GridSurfaceInterpolator};
/// use capvol_core::types::{Currency, DayCountConvention, IborIndex, Tenor};
/// use capvol_optimiser::definitions::DirectDefinition;
///
/// let index = IborIndex::new("USD-LIBOR-3M", Currency::USD, Tenor::from_months(3), DayCountConvention::Act360);
/// let definition = DirectDefinition::of(
///     "USD-CAPLET",
///     index,
///     DayCountConvention::Act365Fixed,
///     10.0,
///     1.0,
///     GridSurfaceInterpolator::new(CurveInterpolator::Linear, CurveInterpolator::Linear),
/// )
/// .unwrap();
/// let p = definition.compute_penalty_matrix(&[0.01, 0.02], &[0.25, 0.5, 0.75]).unwrap();
/// assert_eq!(p.len(), 6);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DirectDefinition {
    name: String,
    index: IborIndex,
    day_count: DayCountConvention,
    lambda_expiry: f64,
    lambda_strike: f64,
    interpolator: GridSurfaceInterpolator,
    shift: Option<ShiftCurve>,
}

impl DirectDefinition {
    /// Creates the definition.
    ///
    /// # Errors
    ///
    /// `CalibrationError::InvalidConfiguration` for a negative or non-finite
    /// penalty weight.
    pub fn of(
        name: impl Into<String>,
        index: IborIndex,
        day_count: DayCountConvention,
        lambda_expiry: f64,
        lambda_strike: f64,
        interpolator: GridSurfaceInterpolator,
    ) -> Result<Self, CalibrationError> {
        for (axis, lambda) in [("expiry", lambda_expiry), ("strike", lambda_strike)] {
            if !lambda.is_finite() || lambda < 0.0 {
                return Err(CalibrationError::invalid_configuration(format!(
                    "{} penalty weight must be non-negative, got {}",
                    axis, lambda
                )));
            }
        }
        Ok(Self {
            name: name.into(),
            index,
            day_count,
            lambda_expiry,
            lambda_strike,
            interpolator,
            shift: None,
        })
    }

    /// Adds a constant or term-structured shift.
    ///
    /// # Errors
    ///
    /// `CalibrationError::InvalidConfiguration` for a non-finite shift.
    pub fn with_shift(mut self, shift: ShiftCurve) -> Result<Self, CalibrationError> {
        check_shift(&shift)?;
        self.shift = Some(shift);
        Ok(self)
    }

    /// Surface name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Index whose caps are quoted.
    pub fn index(&self) -> &IborIndex {
        &self.index
    }

    /// Day count of the expiry axis.
    pub fn day_count(&self) -> DayCountConvention {
        self.day_count
    }

    /// Curvature weight along expiries.
    pub fn lambda_expiry(&self) -> f64 {
        self.lambda_expiry
    }

    /// Curvature weight along strikes.
    pub fn lambda_strike(&self) -> f64 {
        self.lambda_strike
    }

    /// Interpolation scheme, expiry first.
    pub fn interpolator(&self) -> GridSurfaceInterpolator {
        self.interpolator
    }

    /// Shift curve, if any.
    pub fn shift_curve(&self) -> Option<&ShiftCurve> {
        self.shift.as_ref()
    }

    /// Metadata of the quote grid `raw`.
    pub fn create_metadata(&self, raw: &RawOptionData) -> Result<SurfaceMetadata, CalibrationError> {
        create_metadata(&self.name, raw)
    }

    /// Penalty on the expiry-major node vector of `expiries × strikes`.
    ///
    /// # Errors
    ///
    /// `CalibrationError::InvalidConfiguration` when an axis is not strictly
    /// increasing.
    pub fn compute_penalty_matrix(
        &self,
        strikes: &[f64],
        expiries: &[f64],
    ) -> Result<Matrix, CalibrationError> {
        penalty_matrix(expiries, strikes, self.lambda_expiry, self.lambda_strike)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::penalty::penalty_matrix_1d;
    use approx::assert_relative_eq;
    use capvol_core::math::interpolators::CurveInterpolator;
    use capvol_core::types::{Currency, Tenor};
    use capvol_models::volatility::ParameterCurve;

    fn index() -> IborIndex {
        IborIndex::new(
            "GBP-LIBOR-6M",
            Currency::GBP,
            Tenor::from_months(6),
            DayCountConvention::Act365Fixed,
        )
    }

    fn definition(lambda_expiry: f64, lambda_strike: f64) -> Result<DirectDefinition, CalibrationError> {
        DirectDefinition::of(
            "GBP-CAPLET",
            index(),
            DayCountConvention::Act365Fixed,
            lambda_expiry,
            lambda_strike,
            GridSurfaceInterpolator::new(CurveInterpolator::Linear, CurveInterpolator::Linear),
        )
    }

    #[test]
    fn test_negative_lambda_rejected() {
        assert!(matches!(
            definition(-1.0, 1.0).unwrap_err(),
            CalibrationError::InvalidConfiguration(_)
        ));
        assert!(definition(1.0, -0.1).is_err());
        assert!(definition(f64::INFINITY, 0.0).is_err());
        assert!(definition(0.0, 0.0).is_ok());
    }

    #[test]
    fn test_penalty_uses_both_weights() {
        let definition = definition(3.0, 0.0).unwrap();
        let expiries = [0.5, 1.0, 1.5];
        let p = definition.compute_penalty_matrix(&[0.02], &expiries).unwrap();
        let expected = penalty_matrix_1d(&expiries, 2, 3.0).unwrap();
        for i in 0..3 {
            for j in 0..3 {
                assert_relative_eq!(p[i][j], expected[i][j]);
            }
        }
    }

    #[test]
    fn test_shift() {
        let definition = definition(1.0, 1.0)
            .unwrap()
            .with_shift(ParameterCurve::constant(0.01))
            .unwrap();
        assert_eq!(definition.shift_curve(), Some(&ParameterCurve::constant(0.01)));
        assert_eq!(definition.lambda_expiry(), 1.0);
        assert_eq!(definition.name(), "GBP-CAPLET");
    }
}
