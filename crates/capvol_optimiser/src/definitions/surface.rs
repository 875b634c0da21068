//! Definition of a nonparametric caplet surface bootstrapped from cap quotes.

use capvol_core::math::interpolators::{
    CurveExtrapolator, CurveInterpolator, GridSurfaceInterpolator,
};
use capvol_core::types::{DayCountConvention, IborIndex};
use capvol_models::volatility::ShiftCurve;

use super::{check_sequential_expiry_axis, check_shift};
use crate::data::{create_metadata, RawOptionData, SurfaceMetadata};
use crate::error::CalibrationError;

/// A caplet volatility surface with one node per quoted cell.
///
/// Nodes sit at the final caplet fixing of each quoted cap, so the expiry
/// axis is solved row by row. This requires a local expiry interpolator and
/// flat extrapolation to the left of the first expiry.
///
/// # Examples
///
/// ```
/// use capvol_core::math::interpolators::CurveInterpolator;
/// use capvol_core::types::{Currency, DayCountConvention, IborIndex, Tenor};
/// use capvol_optimiser::definitions::SurfaceDefinition;
///
/// let index = IborIndex::new("USD-LIBOR-3M", Currency::USD, Tenor::from_months(3), DayCountConvention::Act360);
/// let definition = SurfaceDefinition::of(
///     "USD-CAPLET",
///     index.clone(),
///     DayCountConvention::Act365Fixed,
///     CurveInterpolator::Linear,
///     CurveInterpolator::Linear,
/// )
/// .unwrap();
/// assert_eq!(definition.name(), "USD-CAPLET");
///
/// // a natural spline couples every expiry
/// assert!(SurfaceDefinition::of(
///     "USD-CAPLET",
///     index,
///     DayCountConvention::Act365Fixed,
///     CurveInterpolator::NaturalSpline,
///     CurveInterpolator::Linear,
/// )
/// .is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceDefinition {
    name: String,
    index: IborIndex,
    day_count: DayCountConvention,
    interpolator: GridSurfaceInterpolator,
    shift: Option<ShiftCurve>,
}

impl SurfaceDefinition {
    /// Definition with flat/linear expiry and linear/linear strike
    /// extrapolation.
    ///
    /// # Errors
    ///
    /// `CalibrationError::InvalidConfiguration` for a non-local expiry
    /// interpolator.
    pub fn of(
        name: impl Into<String>,
        index: IborIndex,
        day_count: DayCountConvention,
        expiry_interpolator: CurveInterpolator,
        strike_interpolator: CurveInterpolator,
    ) -> Result<Self, CalibrationError> {
        Self::with_extrapolators(
            name,
            index,
            day_count,
            expiry_interpolator,
            CurveExtrapolator::Flat,
            CurveExtrapolator::Linear,
            strike_interpolator,
            CurveExtrapolator::Linear,
            CurveExtrapolator::Linear,
        )
    }

    /// Definition with explicit extrapolators on both axes.
    ///
    /// # Errors
    ///
    /// `CalibrationError::InvalidConfiguration` for a non-local expiry
    /// interpolator or a non-flat left expiry extrapolator.
    #[allow(clippy::too_many_arguments)]
    pub fn with_extrapolators(
        name: impl Into<String>,
        index: IborIndex,
        day_count: DayCountConvention,
        expiry_interpolator: CurveInterpolator,
        expiry_left: CurveExtrapolator,
        expiry_right: CurveExtrapolator,
        strike_interpolator: CurveInterpolator,
        strike_left: CurveExtrapolator,
        strike_right: CurveExtrapolator,
    ) -> Result<Self, CalibrationError> {
        check_sequential_expiry_axis("expiry", expiry_interpolator, expiry_left)?;
        Ok(Self {
            name: name.into(),
            index,
            day_count,
            interpolator: GridSurfaceInterpolator::with_extrapolators(
                expiry_interpolator,
                expiry_left,
                expiry_right,
                strike_interpolator,
                strike_left,
                strike_right,
            ),
            shift: None,
        })
    }

    /// Adds a shift curve; Black quotes are then read as shifted Black.
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

    /// Interpolation scheme, expiry first.
    pub fn interpolator(&self) -> GridSurfaceInterpolator {
        self.interpolator
    }

    /// Shift curve, if any.
    pub fn shift_curve(&self) -> Option<&ShiftCurve> {
        self.shift.as_ref()
    }

    /// Metadata of the surface calibrated to `raw`.
    pub fn create_metadata(&self, raw: &RawOptionData) -> Result<SurfaceMetadata, CalibrationError> {
        create_metadata(&self.name, raw)
    }
}
