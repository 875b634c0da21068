//! Penalised regression of caplet volatilities on the full caplet grid.
//!
//! The unknowns are the caplet volatilities at every distinct caplet fixing
//! time and every quoted strike. There are usually more of them than quotes;
//! the curvature penalty of [`DirectDefinition`] selects the smooth solution.

use capvol_core::market_data::RatesProvider;
use capvol_core::math::solvers::LevenbergMarquardtSolver;
use capvol_core::types::Date;
use capvol_models::volatility::{CapletVolatilities, NodeExpiry, SurfaceNodeMetadata, VolatilityContext};
use tracing::{debug, info};

use super::config::CalibrationConfig;
use super::market::{build_quotes, MarketQuotes, QuoteSource};
use super::problem::SurfaceProblem;
use super::result::CapletCalibrationResult;
use super::{check_converged, surface_template};
use crate::data::RawOptionData;
use crate::definitions::DirectDefinition;
use crate::error::CalibrationError;

/// Calibrates a [`DirectDefinition`] to a quote grid.
#[derive(Debug, Clone, Default)]
pub struct DirectCalibrator {
    config: CalibrationConfig,
}

impl DirectCalibrator {
    /// Calibrator with the given configuration.
    pub fn new(config: CalibrationConfig) -> Self {
        Self { config }
    }

    /// Calibrator with the default configuration.
    pub fn with_defaults() -> Self {
        Self::default()
    }

    /// Configuration in use.
    pub fn config(&self) -> &CalibrationConfig {
        &self.config
    }

    /// Fits the caplet grid of `definition` to `raw`.
    ///
    /// # Errors
    ///
    /// - `UnsupportedValueType` for price quotes or moneyness strikes
    /// - `InsufficientData` when the grid yields no instrument
    /// - `NonConvergence` when the regression exhausts its budget
    pub fn calibrate(
        &self,
        definition: &DirectDefinition,
        valuation_date: Date,
        raw: &RawOptionData,
        provider: &dyn RatesProvider,
    ) -> Result<CapletCalibrationResult, CalibrationError> {
        let metadata = definition.create_metadata(raw)?;
        let source = QuoteSource {
            index: definition.index(),
            day_count: definition.day_count(),
            shift: definition.shift_curve(),
        };
        let market = build_quotes(&source, valuation_date, raw, provider)?;
        let context = VolatilityContext::new(
            definition.name(),
            definition.index().clone(),
            valuation_date,
            definition.day_count(),
        );

        let times = fixing_times(&market);
        let strikes = quoted_strikes(&market);
        let mut nodes = Vec::with_capacity(times.len() * strikes.len());
        let mut values = Vec::with_capacity(times.len() * strikes.len());
        for &t in &times {
            for &k in &strikes {
                nodes.push(SurfaceNodeMetadata::new(NodeExpiry::YearFraction(t), k));
                values.push(seed(&market, t, k));
            }
        }
        let penalty = definition.compute_penalty_matrix(&strikes, &times)?;

        info!(
            surface = definition.name(),
            quotes = metadata.nodes().len(),
            instruments = market.len(),
            expiries = times.len(),
            strikes = strikes.len(),
            lambda_expiry = definition.lambda_expiry(),
            lambda_strike = definition.lambda_strike(),
            "starting direct caplet calibration"
        );

        let template = surface_template(
            &context,
            market.volatility_type,
            definition.interpolator(),
            nodes,
            values.clone(),
            definition.shift_curve(),
        )?;
        let problem = SurfaceProblem::new(
            template,
            market.quotes().collect(),
            self.config.residual_scale,
            self.config.volatility_bounds(market.volatility_type),
        )
        .with_penalty(penalty);
        let solver = LevenbergMarquardtSolver::new(self.config.to_lm_config());
        let result = solver.solve_problem(&problem, values)?;
        debug!(
            objective = result.objective,
            residual_ss = result.residual_ss,
            converged = result.converged,
            "direct regression finished"
        );
        check_converged(&result)?;

        let surface = problem.surface(&result.params)?;
        info!(
            surface = definition.name(),
            chi_square = result.residual_ss,
            iterations = result.iterations,
            "direct caplet calibration complete"
        );
        let parameters = surface.parameter_metadata().to_vec();
        Ok(CapletCalibrationResult::new(
            surface.into(),
            result.residual_ss,
            result.iterations,
            parameters,
        ))
    }
}

/// Distinct caplet fixing times, ascending.
fn fixing_times(market: &MarketQuotes) -> Vec<f64> {
    let mut times: Vec<f64> = market
        .quotes()
        .flat_map(|q| q.caplets.iter().map(|c| c.expiry))
        .collect();
    times.sort_by(f64::total_cmp);
    times.dedup();
    times
}

/// Distinct quoted strikes, ascending.
fn quoted_strikes(market: &MarketQuotes) -> Vec<f64> {
    let mut strikes: Vec<f64> = market.quotes().map(|q| q.strike).collect();
    strikes.sort_by(f64::total_cmp);
    strikes.dedup();
    strikes
}

/// Quote of the shortest cap at `strike` covering `time`, else the mean quote.
fn seed(market: &MarketQuotes, time: f64, strike: f64) -> f64 {
    market
        .quotes()
        .find(|q| q.strike == strike && q.final_fixing_time() >= time)
        .map(|q| q.market_volatility)
        .unwrap_or_else(|| {
            let sum: f64 = market.quotes().map(|q| q.market_volatility).sum();
            sum / market.len() as f64
        })
}
