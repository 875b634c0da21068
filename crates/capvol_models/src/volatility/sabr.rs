//! Caplet volatilities generated by SABR parameter term structures.

use capvol_core::types::{Date, DayCountConvention, IborIndex};

use super::context::VolatilityContext;
use super::error::VolatilityError;
use super::metadata::{
    CapletVolatilityType, ParameterMetadata, SabrNodeMetadata, SabrParameterType,
};
use super::parameter_curve::{ParameterCurve, ShiftCurve};
use super::traits::CapletVolatilities;
use crate::models::sabr::{SabrFormula, SabrParameters};

/// Shifted Black caplet volatilities from SABR parameter curves.
///
/// The model parameters are the nodes of the alpha, beta, rho and nu curves,
/// in that order. The shift curve is not a model parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct SabrCapletVolatilities {
    context: VolatilityContext,
    alpha: ParameterCurve,
    beta: ParameterCurve,
    rho: ParameterCurve,
    nu: ParameterCurve,
    shift: ShiftCurve,
    formula: SabrFormula,
    metadata: Vec<ParameterMetadata>,
}

impl SabrCapletVolatilities {
    /// Unshifted SABR volatilities.
    pub fn new(
        context: VolatilityContext,
        alpha: ParameterCurve,
        beta: ParameterCurve,
        rho: ParameterCurve,
        nu: ParameterCurve,
    ) -> Self {
        Self::with_shift(context, alpha, beta, rho, nu, ParameterCurve::constant(0.0))
    }

    /// SABR volatilities with a shift curve.
    pub fn with_shift(
        context: VolatilityContext,
        alpha: ParameterCurve,
        beta: ParameterCurve,
        rho: ParameterCurve,
        nu: ParameterCurve,
        shift: ShiftCurve,
    ) -> Self {
        let mut metadata = Vec::new();
        for (parameter, curve) in [
            (SabrParameterType::Alpha, &alpha),
            (SabrParameterType::Beta, &beta),
            (SabrParameterType::Rho, &rho),
            (SabrParameterType::Nu, &nu),
        ] {
            metadata.extend(curve_metadata(parameter, curve));
        }
        Self {
            context,
            alpha,
            beta,
            rho,
            nu,
            shift,
            formula: SabrFormula::default(),
            metadata,
        }
    }

    /// Replaces the implied volatility formula.
    pub fn with_formula(mut self, formula: SabrFormula) -> Self {
        self.formula = formula;
        self
    }

    /// Alpha curve.
    pub fn alpha(&self) -> &ParameterCurve {
        &self.alpha
    }

    /// Beta curve.
    pub fn beta(&self) -> &ParameterCurve {
        &self.beta
    }

    /// Rho curve.
    pub fn rho(&self) -> &ParameterCurve {
        &self.rho
    }

    /// Nu curve.
    pub fn nu(&self) -> &ParameterCurve {
        &self.nu
    }

    /// Shift curve.
    pub fn shift_curve(&self) -> &ShiftCurve {
        &self.shift
    }

    /// Implied volatility formula.
    pub fn formula(&self) -> SabrFormula {
        self.formula
    }

    /// SABR parameters in force at `expiry`.
    ///
    /// # Errors
    ///
    /// `VolatilityError::InvalidSabrParameter` when the curves produce a
    /// value outside the SABR domain at this expiry.
    pub fn parameters_at(&self, expiry: f64) -> Result<SabrParameters, VolatilityError> {
        SabrParameters::with_shift(
            self.alpha.value(expiry),
            self.beta.value(expiry),
            self.rho.value(expiry),
            self.nu.value(expiry),
            self.shift.value(expiry),
        )
    }
}

fn curve_metadata(parameter: SabrParameterType, curve: &ParameterCurve) -> Vec<ParameterMetadata> {
    match curve {
        ParameterCurve::Constant(_) => {
            vec![ParameterMetadata::SabrNode(SabrNodeMetadata::new(parameter, None))]
        }
        ParameterCurve::Interpolated(_) => curve
            .node_times()
            .iter()
            .map(|&t| ParameterMetadata::SabrNode(SabrNodeMetadata::new(parameter, Some(t))))
            .collect(),
    }
}

impl CapletVolatilities for SabrCapletVolatilities {
    fn name(&self) -> &str {
        self.context.name()
    }

    fn index(&self) -> &IborIndex {
        self.context.index()
    }

    fn valuation_date(&self) -> Date {
        self.context.valuation_date()
    }

    fn day_count(&self) -> DayCountConvention {
        self.context.day_count()
    }

    fn volatility_type(&self) -> CapletVolatilityType {
        CapletVolatilityType::Black
    }

    fn volatility(&self, expiry: f64, strike: f64, forward: f64) -> Result<f64, VolatilityError> {
        let params = self.parameters_at(expiry)?;
        self.formula.volatility(forward, strike, expiry, &params)
    }

    fn parameter_sensitivity(
        &self,
        expiry: f64,
        strike: f64,
        forward: f64,
    ) -> Result<Vec<f64>, VolatilityError> {
        let params = self.parameters_at(expiry)?;
        let (_, derivatives) = self
            .formula
            .volatility_adjoint(forward, strike, expiry, &params)?;
        let mut sensitivity = Vec::with_capacity(self.metadata.len());
        for (curve, d) in [&self.alpha, &self.beta, &self.rho, &self.nu]
            .into_iter()
            .zip(derivatives)
        {
            sensitivity.extend(curve.parameter_sensitivity(expiry).into_iter().map(|w| w * d));
        }
        Ok(sensitivity)
    }

    fn parameter_metadata(&self) -> &[ParameterMetadata] {
        &self.metadata
    }

    fn shift(&self, expiry: f64) -> f64 {
        self.shift.value(expiry)
    }
}
