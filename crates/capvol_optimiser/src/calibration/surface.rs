//! Bootstrap of a nonparametric caplet surface.
//!
//! Each quoted cap gets a node at its final caplet fixing time and its
//! strike. Groups of caps are processed in expiry order: the nodes a group
//! introduces are backed out one by one with Brent's method while every
//! earlier node stays fixed, which is exact as long as the expiry
//! interpolator is local and extrapolates flat to the left. A global
//! Levenberg-Marquardt pass then polishes all nodes together.

use std::cell::RefCell;

use capvol_core::market_data::RatesProvider;
use capvol_core::math::solvers::{BrentSolver, LevenbergMarquardtSolver, SolverConfig};
use capvol_core::types::Date;
use capvol_models::volatility::{
    CapletVolatilities, NodeExpiry, SurfaceCapletVolatilities, SurfaceNodeMetadata,
    VolatilityContext,
};
use tracing::{debug, info, warn};

use super::config::CalibrationConfig;
use super::market::{build_quotes, CapQuote, QuoteSource};
use super::problem::SurfaceProblem;
use super::result::CapletCalibrationResult;
use super::{check_converged, surface_template};
use crate::data::RawOptionData;
use crate::definitions::SurfaceDefinition;
use crate::error::CalibrationError;

/// Calibrates a [`SurfaceDefinition`] to a quote grid.
#[derive(Debug, Clone, Default)]
pub struct SurfaceCalibrator {
    config: CalibrationConfig,
}

impl SurfaceCalibrator {
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

    /// Bootstraps the surface of `definition` from `raw`.
    ///
    /// # Errors
    ///
    /// - `UnsupportedValueType` for price quotes or moneyness strikes
    /// - `InsufficientData` when the grid yields no instrument
    /// - `NonConvergence` when the global polish exhausts its budget
    pub fn calibrate(
        &self,
        definition: &SurfaceDefinition,
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
        let volatility_type = market.volatility_type;
        let context = VolatilityContext::new(
            definition.name(),
            definition.index().clone(),
            valuation_date,
            definition.day_count(),
        );

        // one node per (final fixing, strike); later duplicates share it
        let mut nodes: Vec<SurfaceNodeMetadata> = Vec::new();
        let mut values: Vec<f64> = Vec::new();
        let mut node_quotes: Vec<&CapQuote> = Vec::new();
        let mut group_ends: Vec<usize> = Vec::with_capacity(market.groups.len());
        for group in &market.groups {
            for quote in &group.quotes {
                let node = SurfaceNodeMetadata::new(NodeExpiry::YearFraction(group.time), quote.strike);
                if !nodes.iter().any(|n| n.same_node(&node)) {
                    nodes.push(node);
                    values.push(quote.market_volatility);
                    node_quotes.push(quote);
                }
            }
            group_ends.push(nodes.len());
        }

        info!(
            surface = definition.name(),
            quotes = metadata.nodes().len(),
            instruments = market.len(),
            nodes = nodes.len(),
            "starting caplet surface bootstrap"
        );

        let (lower, upper) = self.config.volatility_bounds(volatility_type);
        let brent = BrentSolver::<f64>::new(SolverConfig::default());
        let mut start = 0;
        for (group, &end) in market.groups.iter().zip(&group_ends) {
            for k in start..end {
                let quote = node_quotes[k];
                let price_gap = |v: f64| -> Result<f64, CalibrationError> {
                    let mut trial = values[..end].to_vec();
                    trial[k] = v;
                    let surface = surface_template(
                        &context,
                        volatility_type,
                        definition.interpolator(),
                        nodes[..end].to_vec(),
                        trial,
                        definition.shift_curve(),
                    )?;
                    Ok(quote.model_price(&surface)? - quote.market_price)
                };
                let gap_lower = price_gap(lower)?;
                let gap_upper = price_gap(upper)?;
                let solved = if gap_lower * gap_upper > 0.0 {
                    let closest = if gap_lower.abs() <= gap_upper.abs() {
                        lower
                    } else {
                        upper
                    };
                    warn!(
                        node = nodes[k].label(),
                        volatility = closest,
                        "cap price not bracketed, node set to closest bound"
                    );
                    closest
                } else {
                    find_root(&brent, price_gap, lower, upper)?
                };
                debug!(node = nodes[k].label(), time = group.time, volatility = solved, "node bootstrapped");
                values[k] = solved;
            }
            start = end;
        }

        let template = surface_template(
            &context,
            volatility_type,
            definition.interpolator(),
            nodes,
            values.clone(),
            definition.shift_curve(),
        )?;
        let problem = SurfaceProblem::new(
            template,
            market.quotes().collect(),
            self.config.residual_scale,
            (lower, upper),
        );
        let solver = LevenbergMarquardtSolver::new(self.config.to_lm_config());
        let result = solver.solve_problem(&problem, values)?;
        check_converged(&result)?;

        let surface: SurfaceCapletVolatilities = problem.surface(&result.params)?;
        info!(
            surface = definition.name(),
            chi_square = result.residual_ss,
            iterations = result.iterations,
            "caplet surface bootstrap complete"
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

/// Brent root of a fallible function; the first error raised during the
/// search is returned in place of the root.
fn find_root<F>(brent: &BrentSolver<f64>, f: F, lower: f64, upper: f64) -> Result<f64, CalibrationError>
where
    F: Fn(f64) -> Result<f64, CalibrationError>,
{
    let failure: RefCell<Option<CalibrationError>> = RefCell::new(None);
    let root = brent.find_root(
        |v| match f(v) {
            Ok(gap) => gap,
            Err(err) => {
                let mut slot = failure.borrow_mut();
                if slot.is_none() {
                    *slot = Some(err);
                }
                f64::NAN
            }
        },
        lower,
        upper,
    );
    match failure.into_inner() {
        Some(err) => Err(err),
        None => Ok(root?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{QuoteType, ValueType};
    use approx::assert_relative_eq;
    use capvol_core::market_data::curves::FlatCurve;
    use capvol_core::market_data::CurveRatesProvider;
    use capvol_core::math::interpolators::CurveInterpolator;
    use capvol_core::types::{Currency, DayCountConvention, IborIndex, Tenor};
    use capvol_models::volatility::CapletVolatilityType;
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

    fn definition() -> SurfaceDefinition {
        SurfaceDefinition::of(
            "USD-CAPLET",
            index(),
            DayCountConvention::Act365Fixed,
            CurveInterpolator::Linear,
            CurveInterpolator::Linear,
        )
        .unwrap()
    }

    // ========================================
    // Bootstrap Tests
    // ========================================

    #[test]
    fn test_flat_quotes_give_flat_surface() {
        let raw = RawOptionData::of(
            vec![Tenor::from_years(1), Tenor::from_years(2), Tenor::from_years(3)],
            vec![0.02, 0.03, 0.04],
            QuoteType::Strike,
            vec![vec![0.25; 3]; 3],
            ValueType::BlackVolatility,
        )
        .unwrap();
        let result = SurfaceCalibrator::with_defaults()
            .calibrate(&definition(), valuation(), &raw, &provider())
            .unwrap();
        let surface = result.volatilities().as_surface().unwrap();
        assert_eq!(surface.nodes().len(), 9);
        assert_eq!(surface.volatility_type(), CapletVolatilityType::Black);
        for v in surface.node_values() {
            assert_relative_eq!(*v, 0.25, epsilon = 1e-6);
        }
        assert!(result.chi_square() < 1e-20);
        assert_eq!(result.parameter_metadata().len(), 9);
    }

    #[test]
    fn test_normal_term_structure_is_repriced() {
        let raw = RawOptionData::of(
            vec![Tenor::from_years(1), Tenor::from_years(2), Tenor::from_years(5)],
            vec![0.025, 0.035],
            QuoteType::Strike,
            vec![vec![0.0080, 0.0075], vec![0.0090, 0.0085], vec![0.0095, 0.0092]],
            ValueType::NormalVolatility,
        )
        .unwrap();
        let result = SurfaceCalibrator::with_defaults()
            .calibrate(&definition(), valuation(), &raw, &provider())
            .unwrap();
        assert_eq!(
            result.volatilities().volatility_type(),
            CapletVolatilityType::Normal
        );
        assert!(result.chi_square() < 1e-16);
    }

    // ========================================
    // Root Search Tests
    // ========================================

    #[test]
    fn test_root_search_propagates_pricing_error() {
        let brent = BrentSolver::<f64>::new(SolverConfig::default());
        let err = find_root(
            &brent,
            |v| {
                if v > 0.5 {
                    Err(CalibrationError::insufficient_data("no price above 0.5"))
                } else {
                    Ok(v - 0.25)
                }
            },
            0.0,
            1.0,
        )
        .unwrap_err();
        assert!(matches!(err, CalibrationError::InsufficientData(_)));
    }

    #[test]
    fn test_root_search_finds_root() {
        let brent = BrentSolver::<f64>::new(SolverConfig::default());
        let root = find_root(&brent, |v| Ok(v * v - 0.04), 0.0, 1.0).unwrap();
        assert_relative_eq!(root, 0.2, epsilon = 1e-8);
    }
}
