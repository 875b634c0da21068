//! Calibration model definitions.
//!
//! A definition names the surface, fixes its index and day count and the
//! interpolation rules of the calibrated object. All rules are checked at
//! construction; a definition that exists is valid.
//!
//! - [`SurfaceDefinition`]: nodes on the quote grid, bootstrapped row by row
//! - [`DirectDefinition`]: nodes on the caplet grid, penalised regression
//! - [`SabrDefinition`]: SABR parameter curves, fitted expiry by expiry

mod direct;
mod sabr;
mod surface;

pub use direct::DirectDefinition;
pub use sabr::{SabrDefinition, SabrParameterSpec};
pub use surface::SurfaceDefinition;

use capvol_core::math::interpolators::{CurveExtrapolator, CurveInterpolator};
use capvol_models::volatility::ShiftCurve;

use crate::error::CalibrationError;

/// Rejects expiry interpolation that would let later nodes move earlier
/// caplets.
pub(crate) fn check_sequential_expiry_axis(
    what: &str,
    interpolator: CurveInterpolator,
    left: CurveExtrapolator,
) -> Result<(), CalibrationError> {
    if !interpolator.is_local() {
        return Err(CalibrationError::invalid_configuration(format!(
            "{} interpolator must be local, got {}",
            what,
            interpolator.name()
        )));
    }
    if left != CurveExtrapolator::Flat {
        return Err(CalibrationError::invalid_configuration(format!(
            "{} left extrapolator must be flat, got {}",
            what,
            left.name()
        )));
    }
    Ok(())
}

pub(crate) fn check_shift(shift: &ShiftCurve) -> Result<(), CalibrationError> {
    if shift.values().iter().any(|v| !v.is_finite()) {
        return Err(CalibrationError::invalid_configuration(
            "shift curve must be finite",
        ));
    }
    Ok(())
}
