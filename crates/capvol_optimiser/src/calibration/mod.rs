//! Caplet volatility calibrators.
//!
//! All three calibrators share the same skeleton: quotes are turned into
//! resolved caps and floors priced at their flat quoted volatility, model
//! parameters are seeded, and Levenberg-Marquardt minimises the weighted
//! price residuals.
//!
//! - [`SurfaceCalibrator`]: sequential Brent bootstrap plus global polish
//! - [`DirectCalibrator`]: one penalised regression over the caplet grid
//! - [`SabrCalibrator`]: SABR parameters fitted expiry by expiry
//!
//! The configuration is shared through [`CalibrationConfig`] and every
//! calibrator returns a [`CapletCalibrationResult`].

mod config;
mod direct;
mod market;
mod problem;
mod result;
mod sabr;
mod surface;

pub use config::{CalibrationConfig, CalibrationConfigBuilder, ResidualScale};
pub use direct::DirectCalibrator;
pub use result::CapletCalibrationResult;
pub use sabr::SabrCalibrator;
pub use surface::SurfaceCalibrator;

use capvol_core::math::interpolators::GridSurfaceInterpolator;
use capvol_core::math::solvers::LMResult;
use capvol_models::volatility::{
    CapletVolatilityType, ShiftCurve, SurfaceCapletVolatilities, SurfaceNodeMetadata,
    VolatilityContext,
};

use crate::error::CalibrationError;

fn check_converged(result: &LMResult) -> Result<(), CalibrationError> {
    if result.converged {
        Ok(())
    } else {
        Err(CalibrationError::non_convergence(
            result.iterations,
            result.residual_ss,
        ))
    }
}

fn surface_template(
    context: &VolatilityContext,
    volatility_type: CapletVolatilityType,
    interpolator: GridSurfaceInterpolator,
    nodes: Vec<SurfaceNodeMetadata>,
    values: Vec<f64>,
    shift: Option<&ShiftCurve>,
) -> Result<SurfaceCapletVolatilities, CalibrationError> {
    let surface = SurfaceCapletVolatilities::new(
        context.clone(),
        volatility_type,
        interpolator,
        nodes,
        values,
    )?;
    Ok(match shift {
        Some(shift) => surface.with_shift(shift.clone())?,
        None => surface,
    })
}
