//! Least-squares problem over the node values of a caplet surface.

use capvol_core::math::solvers::LeastSquaresProblem;
use capvol_models::volatility::SurfaceCapletVolatilities;

use super::config::ResidualScale;
use super::market::CapQuote;
use crate::error::CalibrationError;
use crate::penalty::Matrix;

/// Weighted price residuals of a set of caps as a function of the node
/// values of `template`, with an analytic Jacobian.
pub(crate) struct SurfaceProblem<'a> {
    template: SurfaceCapletVolatilities,
    quotes: Vec<&'a CapQuote>,
    scale: ResidualScale,
    bounds: Vec<(f64, f64)>,
    penalty: Option<Matrix>,
}

impl<'a> SurfaceProblem<'a> {
    pub fn new(
        template: SurfaceCapletVolatilities,
        quotes: Vec<&'a CapQuote>,
        scale: ResidualScale,
        bounds: (f64, f64),
    ) -> Self {
        let n = template.node_values().len();
        Self {
            template,
            quotes,
            scale,
            bounds: vec![bounds; n],
            penalty: None,
        }
    }

    pub fn with_penalty(mut self, penalty: Matrix) -> Self {
        self.penalty = Some(penalty);
        self
    }

    pub fn surface(&self, params: &[f64]) -> Result<SurfaceCapletVolatilities, CalibrationError> {
        Ok(self.template.with_values(params.to_vec())?)
    }

    fn try_residuals(&self, params: &[f64]) -> Result<Vec<f64>, CalibrationError> {
        let surface = self.surface(params)?;
        self.quotes
            .iter()
            .map(|q| {
                let model = q.model_price(&surface)?;
                Ok(self.scale.residual(model, q.market_price, q.error))
            })
            .collect()
    }

    fn try_jacobian(&self, params: &[f64]) -> Result<Vec<Vec<f64>>, CalibrationError> {
        let surface = self.surface(params)?;
        self.quotes
            .iter()
            .map(|q| {
                let factor = self.scale.derivative(q.market_price, q.error);
                let sensitivity = q.model_sensitivity(&surface)?;
                Ok(sensitivity.into_iter().map(|s| factor * s).collect())
            })
            .collect()
    }
}

impl LeastSquaresProblem for SurfaceProblem<'_> {
    fn residuals(&self, params: &[f64]) -> Vec<f64> {
        self.try_residuals(params)
            .unwrap_or_else(|_| vec![f64::NAN; self.quotes.len()])
    }

    fn jacobian(&self, params: &[f64], _residuals: &[f64]) -> Vec<Vec<f64>> {
        self.try_jacobian(params)
            .unwrap_or_else(|_| vec![vec![f64::NAN; params.len()]; self.quotes.len()])
    }

    fn penalty(&self) -> Option<&[Vec<f64>]> {
        self.penalty.as_deref()
    }

    fn bounds(&self) -> Option<&[(f64, f64)]> {
        Some(&self.bounds)
    }
}
