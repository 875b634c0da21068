//! Benchmarks for capvol_optimiser.

use std::sync::Arc;

use capvol_core::market_data::curves::FlatCurve;
use capvol_core::market_data::CurveRatesProvider;
use capvol_core::math::interpolators::{CurveExtrapolator, CurveInterpolator, GridSurfaceInterpolator};
use capvol_core::types::{Currency, Date, DayCountConvention, IborIndex, Tenor};
use capvol_models::models::SabrFormula;
use capvol_models::volatility::ParameterCurve;
use capvol_optimiser::penalty::penalty_matrix;
use capvol_optimiser::prelude::*;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

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

/// Quote grid with `rows` annual expiries and a mild smile.
fn generate_quotes(rows: u32) -> RawOptionData {
    let strikes = vec![0.02, 0.025, 0.03, 0.035, 0.04];
    let data = (1..=rows)
        .map(|y| {
            strikes
                .iter()
                .map(|k| 0.22 - 0.003 * y as f64 + 2.0 * (k - 0.03_f64).abs())
                .collect()
        })
        .collect();
    RawOptionData::of(
        (1..=rows).map(Tenor::from_years).collect(),
        strikes,
        QuoteType::Strike,
        data,
        ValueType::BlackVolatility,
    )
    .unwrap()
}

fn benchmark_penalty_matrix(c: &mut Criterion) {
    let mut group = c.benchmark_group("penalty_matrix");

    for size in [10, 20, 40] {
        let times: Vec<f64> = (1..=size).map(|i| i as f64 * 0.25).collect();
        let strikes: Vec<f64> = (0..8).map(|i| 0.01 + i as f64 * 0.005).collect();

        group.bench_with_input(BenchmarkId::from_parameter(size), &times, |b, times| {
            b.iter(|| penalty_matrix(black_box(times), black_box(&strikes), 0.1, 0.01))
        });
    }

    group.finish();
}

fn benchmark_surface_calibration(c: &mut Criterion) {
    let mut group = c.benchmark_group("surface_calibration");
    group.sample_size(10);

    let provider = provider();
    let definition = SurfaceDefinition::of(
        "USD-CAPLET",
        index(),
        DayCountConvention::Act365Fixed,
        CurveInterpolator::Linear,
        CurveInterpolator::Linear,
    )
    .unwrap();
    let calibrator = SurfaceCalibrator::with_defaults();

    for rows in [2, 5, 10] {
        let raw = generate_quotes(rows);
        group.bench_with_input(BenchmarkId::from_parameter(rows), &raw, |b, raw| {
            b.iter(|| calibrator.calibrate(&definition, valuation(), black_box(raw), &provider))
        });
    }

    group.finish();
}

fn benchmark_direct_calibration(c: &mut Criterion) {
    let mut group = c.benchmark_group("direct_calibration");
    group.sample_size(10);

    let provider = provider();
    let definition = DirectDefinition::of(
        "USD-CAPLET-DIRECT",
        index(),
        DayCountConvention::Act365Fixed,
        0.1,
        0.01,
        GridSurfaceInterpolator::new(CurveInterpolator::Linear, CurveInterpolator::Linear),
    )
    .unwrap();
    let calibrator = DirectCalibrator::with_defaults();

    for rows in [2, 3] {
        let raw = generate_quotes(rows);
        group.bench_with_input(BenchmarkId::from_parameter(rows), &raw, |b, raw| {
            b.iter(|| calibrator.calibrate(&definition, valuation(), black_box(raw), &provider))
        });
    }

    group.finish();
}

fn benchmark_sabr_calibration(c: &mut Criterion) {
    let mut group = c.benchmark_group("sabr_calibration");
    group.sample_size(10);

    let provider = provider();
    let definition = SabrDefinition::of_fixed_beta(
        "USD-SABR",
        index(),
        DayCountConvention::Act365Fixed,
        ParameterCurve::constant(0.5),
        CurveInterpolator::Linear,
        CurveExtrapolator::Flat,
        CurveExtrapolator::Flat,
        SabrFormula::Hagan,
    )
    .unwrap();
    let calibrator = SabrCalibrator::with_defaults();

    for rows in [2, 5] {
        let raw = generate_quotes(rows);
        group.bench_with_input(BenchmarkId::from_parameter(rows), &raw, |b, raw| {
            b.iter(|| calibrator.calibrate(&definition, valuation(), black_box(raw), &provider))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_penalty_matrix,
    benchmark_surface_calibration,
    benchmark_direct_calibration,
    benchmark_sabr_calibration,
);
criterion_main!(benches);
