//! Pricing cap legs through the caplet volatility objects.

use std::sync::Arc;

use approx::assert_relative_eq;
use capvol_core::market_data::curves::FlatCurve;
use capvol_core::market_data::CurveRatesProvider;
use capvol_core::math::interpolators::{CurveExtrapolator, CurveInterpolator, GridSurfaceInterpolator};
use capvol_core::types::{Currency, Date, DayCountConvention, IborIndex, Tenor};
use capvol_models::instruments::{CapFloorLeg, CapFloorLegPricer, PutCall};
use capvol_models::volatility::{
    CapletVolatilities, CapletVolatilityType, IborCapletFloorletVolatilities, NodeExpiry,
    ParameterCurve, SabrCapletVolatilities, SurfaceCapletVolatilities, SurfaceNodeMetadata,
    VolatilityContext,
};

fn valuation() -> Date {
    Date::from_ymd(2024, 1, 15).unwrap()
}

fn index() -> IborIndex {
    IborIndex::new(
        "EUR-EURIBOR-6M",
        Currency::EUR,
        Tenor::from_months(6),
        DayCountConvention::Act360,
    )
}

fn context(name: &str) -> VolatilityContext {
    VolatilityContext::new(name, index(), valuation(), DayCountConvention::Act365Fixed)
}

fn provider() -> CurveRatesProvider {
    CurveRatesProvider::new(valuation())
        .with_discount_curve(Currency::EUR, Arc::new(FlatCurve::new(0.03)))
}

fn cap(strike: f64, years: u32) -> CapFloorLeg {
    CapFloorLeg::builder()
        .index(index())
        .start(valuation().plus_tenor(Tenor::from_months(6)).unwrap())
        .end(valuation().plus_tenor(Tenor::from_years(years)).unwrap())
        .strike(strike)
        .put_call(PutCall::Call)
        .build()
        .unwrap()
}

#[test]
fn test_lognormal_sabr_matches_flat_black() {
    // β = 1, ν = 0 reduces SABR to Black with σ = α
    let sabr = SabrCapletVolatilities::new(
        context("SABR"),
        ParameterCurve::constant(0.22),
        ParameterCurve::constant(1.0),
        ParameterCurve::constant(0.0),
        ParameterCurve::constant(0.0),
    );
    let provider = provider();
    let pricer = CapFloorLegPricer::new();
    let leg = cap(0.035, 5);
    let pv = pricer.present_value(&leg, &provider, &sabr).unwrap();
    let flat = pricer
        .present_value_flat(
            &leg,
            &provider,
            DayCountConvention::Act365Fixed,
            CapletVolatilityType::Black,
            0.22,
            None,
        )
        .unwrap();
    assert_relative_eq!(pv, flat, max_relative = 1e-12);
}

#[test]
fn test_enum_dispatch_preserves_values() {
    let surface = SurfaceCapletVolatilities::new(
        context("SURFACE"),
        CapletVolatilityType::Normal,
        GridSurfaceInterpolator::with_extrapolators(
            CurveInterpolator::Linear,
            CurveExtrapolator::Flat,
            CurveExtrapolator::Linear,
            CurveInterpolator::Linear,
            CurveExtrapolator::Linear,
            CurveExtrapolator::Linear,
        ),
        vec![
            SurfaceNodeMetadata::new(NodeExpiry::YearFraction(1.0), 0.01),
            SurfaceNodeMetadata::new(NodeExpiry::YearFraction(1.0), 0.03),
            SurfaceNodeMetadata::new(NodeExpiry::YearFraction(3.0), 0.01),
            SurfaceNodeMetadata::new(NodeExpiry::YearFraction(3.0), 0.03),
        ],
        vec![0.009, 0.007, 0.0085, 0.0065],
    )
    .unwrap();
    let wrapped = IborCapletFloorletVolatilities::from(surface.clone());
    assert!(wrapped.as_surface().is_some());
    assert!(wrapped.as_sabr().is_none());
    assert_eq!(wrapped.name(), "SURFACE");
    assert_eq!(wrapped.parameter_count(), 4);
    assert_eq!(
        wrapped.volatility(2.0, 0.02, 0.0).unwrap(),
        surface.volatility(2.0, 0.02, 0.0).unwrap()
    );

    let provider = provider();
    let pricer = CapFloorLegPricer::new();
    let leg = cap(0.02, 4);
    assert_relative_eq!(
        pricer.present_value(&leg, &provider, &wrapped).unwrap(),
        pricer.present_value(&leg, &provider, &surface).unwrap()
    );
}

#[test]
fn test_leg_sensitivity_only_touches_covered_nodes() {
    let alpha = ParameterCurve::interpolated(
        &[1.0, 2.0, 10.0],
        &[0.02, 0.025, 0.03],
        CurveInterpolator::Linear,
        CurveExtrapolator::Flat,
        CurveExtrapolator::Flat,
    )
    .unwrap();
    let sabr = SabrCapletVolatilities::new(
        context("SABR"),
        alpha,
        ParameterCurve::constant(0.5),
        ParameterCurve::constant(-0.1),
        ParameterCurve::constant(0.3),
    );
    let sens = CapFloorLegPricer::new()
        .present_value_sensitivity(&cap(0.03, 2), &provider(), &sabr)
        .unwrap();
    assert_eq!(sens.len(), sabr.parameter_count());
    // Fixings stop at 1.5y, so alpha[10.0] never contributes
    assert_eq!(sens[2], 0.0);
    assert!(sens[0] > 0.0 && sens[1] > 0.0);
}
