//! Definition of SABR caplet volatilities fitted expiry by expiry.

use capvol_core::math::interpolators::{CurveExtrapolator, CurveInterpolator};
use capvol_core::types::{DayCountConvention, IborIndex};
use capvol_models::models::SabrFormula;
use capvol_models::volatility::{ParameterCurve, SabrParameterType, ShiftCurve};

use super::{check_sequential_expiry_axis, check_shift};
use crate::data::{create_metadata, RawOptionData, SurfaceMetadata};
use crate::error::CalibrationError;

/// Whether a SABR parameter is calibrated or held at a given curve.
#[derive(Debug, Clone, PartialEq)]
pub enum SabrParameterSpec {
    /// Calibrated, one node per quoted expiry.
    Free,
    /// Held at the given curve.
    Pinned(ParameterCurve),
}

impl SabrParameterSpec {
    /// True when the parameter is calibrated.
    pub fn is_free(&self) -> bool {
        matches!(self, SabrParameterSpec::Free)
    }

    /// The pinned curve, if any.
    pub fn pinned(&self) -> Option<&ParameterCurve> {
        match self {
            SabrParameterSpec::Free => None,
            SabrParameterSpec::Pinned(curve) => Some(curve),
        }
    }
}

/// SABR caplet volatilities with term-structured parameters.
///
/// Alpha and nu are always calibrated. Beta and rho are each free or
/// pinned, and at least one of them is pinned. Calibrated curves get a node
/// at the final caplet fixing of every quoted expiry and are fitted in
/// expiry order, so the curve interpolator must be local with flat left
/// extrapolation.
///
/// # Examples
///
/// ```
/// use capvol_core::math::interpolators::{CurveExtrapolator, CurveInterpolator};
/// use capvol_core::types::{Currency, DayCountConvention, IborIndex, Tenor};
/// use capvol_models::models::SabrFormula;
/// use capvol_models::volatility::ParameterCurve;
/// use capvol_optimiser::definitions::SabrDefinition;
///
/// let index = IborIndex::new("USD-LIBOR-3M", Currency::USD, Tenor::from_months(3), DayCountConvention::Act360);
/// let definition = SabrDefinition::of_fixed_beta(
///     "USD-SABR",
///     index,
///     DayCountConvention::Act365Fixed,
///     ParameterCurve::constant(0.5),
///     CurveInterpolator::Linear,
///     CurveExtrapolator::Flat,
///     CurveExtrapolator::Flat,
///     SabrFormula::Hagan,
/// )
/// .unwrap();
/// assert_eq!(definition.free_parameters().len(), 3);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SabrDefinition {
    name: String,
    index: IborIndex,
    day_count: DayCountConvention,
    beta: SabrParameterSpec,
    rho: SabrParameterSpec,
    shift: ShiftCurve,
    interpolator: CurveInterpolator,
    left: CurveExtrapolator,
    right: CurveExtrapolator,
    formula: SabrFormula,
}

impl SabrDefinition {
    /// General constructor.
    ///
    /// # Errors
    ///
    /// `CalibrationError::InvalidConfiguration` when neither beta nor rho is
    /// pinned, a pinned curve leaves its domain, the interpolator is not
    /// local, the left extrapolator is not flat, or the shift is not finite.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: impl Into<String>,
        index: IborIndex,
        day_count: DayCountConvention,
        beta: SabrParameterSpec,
        rho: SabrParameterSpec,
        shift: ShiftCurve,
        interpolator: CurveInterpolator,
        left: CurveExtrapolator,
        right: CurveExtrapolator,
        formula: SabrFormula,
    ) -> Result<Self, CalibrationError> {
        if beta.is_free() && rho.is_free() {
            return Err(CalibrationError::invalid_configuration(
                "one of beta and rho must be pinned",
            ));
        }
        if let Some(curve) = beta.pinned() {
            if !curve.values_within(0.0, 1.0) {
                return Err(CalibrationError::invalid_configuration(format!(
                    "pinned beta must lie in [0, 1], got {:?}",
                    curve.values()
                )));
            }
        }
        if let Some(curve) = rho.pinned() {
            if curve.values().iter().any(|v| !(*v > -1.0 && *v < 1.0)) {
                return Err(CalibrationError::invalid_configuration(format!(
                    "pinned rho must lie in (-1, 1), got {:?}",
                    curve.values()
                )));
            }
        }
        check_sequential_expiry_axis("parameter curve", interpolator, left)?;
        check_shift(&shift)?;
        Ok(Self {
            name: name.into(),
            index,
            day_count,
            beta,
            rho,
            shift,
            interpolator,
            left,
            right,
            formula,
        })
    }

    /// Beta pinned, rho calibrated, no shift.
    #[allow(clippy::too_many_arguments)]
    pub fn of_fixed_beta(
        name: impl Into<String>,
        index: IborIndex,
        day_count: DayCountConvention,
        beta: ParameterCurve,
        interpolator: CurveInterpolator,
        left: CurveExtrapolator,
        right: CurveExtrapolator,
        formula: SabrFormula,
    ) -> Result<Self, CalibrationError> {
        Self::of_fixed_beta_with_shift(
            name,
            index,
            day_count,
            ParameterCurve::constant(0.0),
            beta,
            interpolator,
            left,
            right,
            formula,
        )
    }

    /// Beta pinned, rho calibrated, with a shift.
    #[allow(clippy::too_many_arguments)]
    pub fn of_fixed_beta_with_shift(
        name: impl Into<String>,
        index: IborIndex,
        day_count: DayCountConvention,
        shift: ShiftCurve,
        beta: ParameterCurve,
        interpolator: CurveInterpolator,
        left: CurveExtrapolator,
        right: CurveExtrapolator,
        formula: SabrFormula,
    ) -> Result<Self, CalibrationError> {
        Self::new(
            name,
            index,
            day_count,
            SabrParameterSpec::Pinned(beta),
            SabrParameterSpec::Free,
            shift,
            interpolator,
            left,
            right,
            formula,
        )
    }

    /// Rho pinned, beta calibrated, no shift.
    #[allow(clippy::too_many_arguments)]
    pub fn of_fixed_rho(
        name: impl Into<String>,
        index: IborIndex,
        day_count: DayCountConvention,
        rho: ParameterCurve,
        interpolator: CurveInterpolator,
        left: CurveExtrapolator,
        right: CurveExtrapolator,
        formula: SabrFormula,
    ) -> Result<Self, CalibrationError> {
        Self::of_fixed_rho_with_shift(
            name,
            index,
            day_count,
            ParameterCurve::constant(0.0),
            rho,
            interpolator,
            left,
            right,
            formula,
        )
    }

    /// Rho pinned, beta calibrated, with a shift.
    #[allow(clippy::too_many_arguments)]
    pub fn of_fixed_rho_with_shift(
        name: impl Into<String>,
        index: IborIndex,
        day_count: DayCountConvention,
        shift: ShiftCurve,
        rho: ParameterCurve,
        interpolator: CurveInterpolator,
        left: CurveExtrapolator,
        right: CurveExtrapolator,
        formula: SabrFormula,
    ) -> Result<Self, CalibrationError> {
        Self::new(
            name,
            index,
            day_count,
            SabrParameterSpec::Free,
            SabrParameterSpec::Pinned(rho),
            shift,
            interpolator,
            left,
            right,
            formula,
        )
    }

    /// Definition name.
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

    /// Beta specification.
    pub fn beta(&self) -> &SabrParameterSpec {
        &self.beta
    }

    /// Rho specification.
    pub fn rho(&self) -> &SabrParameterSpec {
        &self.rho
    }

    /// Shift curve; zero when unshifted.
    pub fn shift_curve(&self) -> &ShiftCurve {
        &self.shift
    }

    /// Implied volatility formula.
    pub fn formula(&self) -> SabrFormula {
        self.formula
    }

    /// Interpolator of the calibrated curves.
    pub fn interpolator(&self) -> CurveInterpolator {
        self.interpolator
    }

    /// Left extrapolator of the calibrated curves.
    pub fn left_extrapolator(&self) -> CurveExtrapolator {
        self.left
    }

    /// Right extrapolator of the calibrated curves.
    pub fn right_extrapolator(&self) -> CurveExtrapolator {
        self.right
    }

    /// Calibrated parameters per expiry, in curve order.
    pub fn free_parameters(&self) -> Vec<SabrParameterType> {
        let mut free = vec![SabrParameterType::Alpha];
        if self.beta.is_free() {
            free.push(SabrParameterType::Beta);
        }
        if self.rho.is_free() {
            free.push(SabrParameterType::Rho);
        }
        free.push(SabrParameterType::Nu);
        free
    }

    /// Calibrated curve through `(times, values)` with this definition's
    /// interpolation.
    pub fn make_curve(&self, times: &[f64], values: &[f64]) -> Result<ParameterCurve, CalibrationError> {
        Ok(ParameterCurve::interpolated(
            times,
            values,
            self.interpolator,
            self.left,
            self.right,
        )?)
    }

    /// Metadata of the quote grid `raw`.
    pub fn create_metadata(&self, raw: &RawOptionData) -> Result<SurfaceMetadata, CalibrationError> {
        create_metadata(&self.name, raw)
    }
}
