//! Expiry-by-expiry SABR calibration.
//!
//! Each group of caps sharing a final fixing time adds one node to every
//! calibrated parameter curve. The group's free parameters are fitted by
//! Levenberg-Marquardt with a finite-difference Jacobian while all earlier
//! nodes stay frozen; local interpolation with flat left extrapolation
//! keeps earlier caps priced as they were fitted.

use capvol_core::market_data::RatesProvider;
use capvol_core::math::solvers::{LeastSquaresProblem, LevenbergMarquardtSolver};
use capvol_core::types::Date;
use capvol_models::volatility::{
    CapletVolatilities, CapletVolatilityType, ParameterCurve, ParameterMetadata,
    SabrCapletVolatilities, SabrParameterType, VolatilityContext,
};
use tracing::{debug, info};

use super::check_converged;
use super::config::{CalibrationConfig, ResidualScale};
use super::market::{build_quotes, CapQuote, ExpiryGroup, QuoteSource};
use super::result::CapletCalibrationResult;
use crate::data::RawOptionData;
use crate::definitions::{SabrDefinition, SabrParameterSpec};
use crate::error::CalibrationError;

const ALPHA_BOUNDS: (f64, f64) = (1e-6, 5.0);
const BETA_BOUNDS: (f64, f64) = (0.0, 1.0);
const RHO_BOUNDS: (f64, f64) = (-0.999, 0.999);
const NU_BOUNDS: (f64, f64) = (1e-4, 5.0);

const INITIAL_BETA: f64 = 0.5;
const INITIAL_RHO: f64 = 0.0;
const INITIAL_NU: f64 = 0.3;

fn bounds_of(parameter: SabrParameterType) -> (f64, f64) {
    match parameter {
        SabrParameterType::Alpha => ALPHA_BOUNDS,
        SabrParameterType::Beta => BETA_BOUNDS,
        SabrParameterType::Rho => RHO_BOUNDS,
        SabrParameterType::Nu => NU_BOUNDS,
    }
}

/// Calibrates a [`SabrDefinition`] to a quote grid.
#[derive(Debug, Clone, Default)]
pub struct SabrCalibrator {
    config: CalibrationConfig,
}

impl SabrCalibrator {
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

    /// Fits the SABR curves of `definition` to `raw`.
    ///
    /// Black quotes are priced with the definition's shift; normal quotes
    /// with the Bachelier formula. The calibrated object is always shifted
    /// Black SABR.
    ///
    /// # Errors
    ///
    /// - `UnsupportedValueType` for price quotes or moneyness strikes
    /// - `InsufficientData` when the grid yields no instrument
    /// - `NonConvergence` when any expiry exhausts its budget
    pub fn calibrate(
        &self,
        definition: &SabrDefinition,
        valuation_date: Date,
        raw: &RawOptionData,
        provider: &dyn RatesProvider,
    ) -> Result<CapletCalibrationResult, CalibrationError> {
        let metadata = definition.create_metadata(raw)?;
        let shift = definition.shift_curve();
        let shifted = shift.values().iter().any(|s| *s != 0.0);
        let quote_shift = (shifted && metadata.volatility_type() == CapletVolatilityType::Black)
            .then_some(shift);
        let source = QuoteSource {
            index: definition.index(),
            day_count: definition.day_count(),
            shift: quote_shift,
        };
        let market = build_quotes(&source, valuation_date, raw, provider)?;
        let context = VolatilityContext::new(
            definition.name(),
            definition.index().clone(),
            valuation_date,
            definition.day_count(),
        );
        let free = definition.free_parameters();

        info!(
            definition = definition.name(),
            instruments = market.len(),
            expiries = market.groups.len(),
            free_parameters = free.len(),
            formula = definition.formula().name(),
            "starting SABR caplet calibration"
        );

        let solver = LevenbergMarquardtSolver::new(self.config.to_lm_config());
        let mut fitted = FittedNodes::new(free.len());
        let mut chi_square = 0.0;
        let mut iterations = 0;
        for group in &market.groups {
            let initial = initial_guess(definition, &free, &fitted, group, market.volatility_type);
            let (result, params) = {
                let problem = ExpiryProblem {
                    definition,
                    context: &context,
                    free: &free,
                    fitted: &fitted,
                    time: group.time,
                    quotes: &group.quotes,
                    scale: self.config.residual_scale,
                    bounds: free.iter().map(|p| bounds_of(*p)).collect(),
                };
                let result = solver.solve_problem(&problem, initial)?;
                let params = problem.project(&result.params);
                (result, params)
            };
            check_converged(&result)?;
            debug!(
                time = group.time,
                params = ?params,
                chi_square = result.residual_ss,
                iterations = result.iterations,
                "SABR expiry fitted"
            );
            chi_square += result.residual_ss;
            iterations += result.iterations;
            fitted.push(group.time, params);
        }

        let volatilities = build_volatilities(definition, &context, &free, &fitted.times, &fitted.values)?;
        info!(
            definition = definition.name(),
            chi_square,
            iterations,
            "SABR caplet calibration complete"
        );
        let parameters: Vec<ParameterMetadata> = volatilities
            .parameter_metadata()
            .iter()
            .filter(|m| match m {
                ParameterMetadata::SabrNode(node) => free.contains(&node.parameter()),
                ParameterMetadata::SurfaceNode(_) => false,
            })
            .cloned()
            .collect();
        Ok(CapletCalibrationResult::new(
            volatilities.into(),
            chi_square,
            iterations,
            parameters,
        ))
    }
}

/// Node times and, per free parameter, the values fitted so far.
struct FittedNodes {
    times: Vec<f64>,
    values: Vec<Vec<f64>>,
}

impl FittedNodes {
    fn new(n_free: usize) -> Self {
        Self {
            times: Vec::new(),
            values: vec![Vec::new(); n_free],
        }
    }

    fn push(&mut self, time: f64, params: Vec<f64>) {
        self.times.push(time);
        for (curve, p) in self.values.iter_mut().zip(params) {
            curve.push(p);
        }
    }

    fn last(&self, slot: usize) -> Option<f64> {
        self.values[slot].last().copied()
    }
}

fn initial_guess(
    definition: &SabrDefinition,
    free: &[SabrParameterType],
    fitted: &FittedNodes,
    group: &ExpiryGroup,
    volatility_type: CapletVolatilityType,
) -> Vec<f64> {
    let slot = |p: SabrParameterType| free.iter().position(|q| *q == p);
    let beta = match definition.beta() {
        SabrParameterSpec::Pinned(curve) => curve.value(group.time),
        SabrParameterSpec::Free => slot(SabrParameterType::Beta)
            .and_then(|s| fitted.last(s))
            .unwrap_or(INITIAL_BETA),
    };

    let atm = group
        .quotes
        .iter()
        .min_by(|a, b| {
            (a.strike - a.par_rate)
                .abs()
                .total_cmp(&(b.strike - b.par_rate).abs())
        });
    let alpha = atm.map_or(0.01, |q| {
        let shifted_forward = q.par_rate + definition.shift_curve().value(group.time);
        let black = match volatility_type {
            CapletVolatilityType::Black => q.market_volatility,
            CapletVolatilityType::Normal => q.market_volatility / shifted_forward,
        };
        black * shifted_forward.powf(1.0 - beta)
    });

    free.iter()
        .enumerate()
        .map(|(s, p)| {
            let (lo, hi) = bounds_of(*p);
            let guess = match p {
                SabrParameterType::Alpha => alpha,
                SabrParameterType::Beta => beta,
                SabrParameterType::Rho => fitted.last(s).unwrap_or(INITIAL_RHO),
                SabrParameterType::Nu => fitted.last(s).unwrap_or(INITIAL_NU),
            };
            if guess.is_finite() {
                guess.max(lo).min(hi)
            } else {
                lo.max(1e-2).min(hi)
            }
        })
        .collect()
}

fn build_volatilities(
    definition: &SabrDefinition,
    context: &VolatilityContext,
    free: &[SabrParameterType],
    times: &[f64],
    values: &[Vec<f64>],
) -> Result<SabrCapletVolatilities, CalibrationError> {
    let curve = |p: SabrParameterType, spec: Option<&SabrParameterSpec>| -> Result<ParameterCurve, CalibrationError> {
        if let Some(SabrParameterSpec::Pinned(curve)) = spec {
            return Ok(curve.clone());
        }
        let slot = free.iter().position(|q| *q == p).ok_or_else(|| {
            CalibrationError::invalid_configuration(format!("{} is neither free nor pinned", p.name()))
        })?;
        definition.make_curve(times, &values[slot])
    };
    let alpha = curve(SabrParameterType::Alpha, None)?;
    let beta = curve(SabrParameterType::Beta, Some(definition.beta()))?;
    let rho = curve(SabrParameterType::Rho, Some(definition.rho()))?;
    let nu = curve(SabrParameterType::Nu, None)?;
    Ok(SabrCapletVolatilities::with_shift(
        context.clone(),
        alpha,
        beta,
        rho,
        nu,
        definition.shift_curve().clone(),
    )
    .with_formula(definition.formula()))
}

/// Residuals of one expiry group as a function of its free parameters.
struct ExpiryProblem<'a> {
    definition: &'a SabrDefinition,
    context: &'a VolatilityContext,
    free: &'a [SabrParameterType],
    fitted: &'a FittedNodes,
    time: f64,
    quotes: &'a [CapQuote],
    scale: ResidualScale,
    bounds: Vec<(f64, f64)>,
}

impl ExpiryProblem<'_> {
    /// Clamps trial parameters into their domain, so finite-difference
    /// bumps at a bound stay evaluable.
    fn project(&self, params: &[f64]) -> Vec<f64> {
        params
            .iter()
            .zip(&self.bounds)
            .map(|(p, (lo, hi))| p.max(*lo).min(*hi))
            .collect()
    }

    fn try_residuals(&self, params: &[f64]) -> Result<Vec<f64>, CalibrationError> {
        let params = self.project(params);
        let mut times = self.fitted.times.clone();
        times.push(self.time);
        let values: Vec<Vec<f64>> = self
            .fitted
            .values
            .iter()
            .zip(&params)
            .map(|(earlier, p)| {
                let mut curve = earlier.clone();
                curve.push(*p);
                curve
            })
            .collect();
        let vols = build_volatilities(self.definition, self.context, self.free, &times, &values)?;
        self.quotes
            .iter()
            .map(|q| {
                let model = q.model_price(&vols)?;
                Ok(self.scale.residual(model, q.market_price, q.error))
            })
            .collect()
    }
}

impl LeastSquaresProblem for ExpiryProblem<'_> {
    fn residuals(&self, params: &[f64]) -> Vec<f64> {
        self.try_residuals(params)
            .unwrap_or_else(|_| vec![f64::NAN; self.quotes.len()])
    }

    fn bounds(&self) -> Option<&[(f64, f64)]> {
        Some(&self.bounds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{QuoteType, ValueType};
    use capvol_core::market_data::curves::FlatCurve;
    use capvol_core::market_data::CurveRatesProvider;
    use capvol_core::math::interpolators::{CurveExtrapolator, CurveInterpolator};
    use capvol_core::types::{Currency, DayCountConvention, IborIndex, Tenor};
    use capvol_models::models::SabrFormula;
    use std::sync::Arc;

    fn valuation() -> Date {
        Date::from_ymd(2024, 3, 1).unwrap()
    }

    fn index() -> IborIndex {
        IborIndex::new(
            "USD-LIBOR-3M",
            Currency::USD,
            Tenor::from_months(3),
            DayCountConvention::Act360,
        )
    }

    fn provider() -> CurveRatesProvider {
        CurveRatesProvider::new(valuation())
            .with_discount_curve(Currency::USD, Arc::new(FlatCurve::new(0.03)))
    }

    fn definition() -> SabrDefinition {
        SabrDefinition::of_fixed_beta(
            "USD-SABR",
            index(),
            DayCountConvention::Act365Fixed,
            ParameterCurve::constant(0.5),
            CurveInterpolator::Linear,
            CurveExtrapolator::Flat,
            CurveExtrapolator::Flat,
            SabrFormula::Hagan,
        )
        .unwrap()
    }

    fn raw() -> RawOptionData {
        RawOptionData::of(
            vec![Tenor::from_years(1), Tenor::from_years(2)],
            vec![0.02, 0.03, 0.04],
            QuoteType::Strike,
            vec![vec![0.30, 0.26, 0.25], vec![0.29, 0.25, 0.24]],
            ValueType::BlackVolatility,
        )
        .unwrap()
    }

    // ========================================
    // Seeding Tests
    // ========================================

    #[test]
    fn test_initial_alpha_from_atm_quote() {
        let definition = definition();
        let index = index();
        let source = QuoteSource {
            index: &index,
            day_count: DayCountConvention::Act365Fixed,
            shift: None,
        };
        let market = build_quotes(&source, valuation(), &raw(), &provider()).unwrap();
        let free = definition.free_parameters();
        let fitted = FittedNodes::new(free.len());
        let group = &market.groups[0];
        let guess = initial_guess(&definition, &free, &fitted, group, CapletVolatilityType::Black);
        assert_eq!(guess.len(), 3);
        let atm = &group.quotes[1];
        let expected = 0.26 * atm.par_rate.powf(0.5);
        assert!((guess[0] - expected).abs() < 1e-12);
        assert_eq!(guess[1], INITIAL_RHO);
        assert_eq!(guess[2], INITIAL_NU);
    }

    // ========================================
    // Calibration Tests
    // ========================================

    #[test]
    fn test_one_node_per_expiry() {
        let result = SabrCalibrator::with_defaults()
            .calibrate(&definition(), valuation(), &raw(), &provider())
            .unwrap();
        let sabr = result.volatilities().as_sabr().unwrap();
        assert_eq!(sabr.alpha().parameter_count(), 2);
        assert_eq!(sabr.rho().parameter_count(), 2);
        assert_eq!(sabr.nu().parameter_count(), 2);
        assert_eq!(sabr.beta(), &ParameterCurve::constant(0.5));
        // alpha, rho and nu at two expiries; beta is pinned
        assert_eq!(result.parameter_metadata().len(), 6);
        assert!(result
            .parameter_metadata()
            .iter()
            .all(|m| !m.label().starts_with("beta")));
        assert!(result.chi_square().is_finite());
    }

    #[test]
    fn test_smile_repriced() {
        let definition = definition();
        let result = SabrCalibrator::new(CalibrationConfig::default().with_residual_scale(ResidualScale::Relative))
            .calibrate(&definition, valuation(), &raw(), &provider())
            .unwrap();
        let vols = result.volatilities();
        let index = index();
        let source = QuoteSource {
            index: &index,
            day_count: DayCountConvention::Act365Fixed,
            shift: None,
        };
        let market = build_quotes(&source, valuation(), &raw(), &provider()).unwrap();
        for quote in market.quotes() {
            let model = quote.model_price(vols).unwrap();
            assert!(
                ((model - quote.market_price) / quote.market_price).abs() < 0.02,
                "strike {} row {}: {} vs {}",
                quote.strike,
                quote.row,
                model,
                quote.market_price
            );
        }
    }
}
