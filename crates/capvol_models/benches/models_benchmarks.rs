//! Criterion benchmarks for capvol_models formulas and leg pricing.

use std::sync::Arc;

use capvol_core::market_data::curves::FlatCurve;
use capvol_core::market_data::CurveRatesProvider;
use capvol_core::types::{Currency, Date, DayCountConvention, IborIndex, Tenor};
use capvol_models::analytical::{Bachelier, Black76};
use capvol_models::instruments::{CapFloorLeg, CapFloorLegPricer, PutCall};
use capvol_models::models::{SabrFormula, SabrParameters};
use capvol_models::volatility::CapletVolatilityType;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn bench_formulas(c: &mut Criterion) {
    let mut group = c.benchmark_group("formulas");

    let black = Black76::shifted(0.02, 0.25, 0.01).unwrap();
    group.bench_function("black_price", |b| {
        b.iter(|| black.price(black_box(0.025), black_box(2.0), PutCall::Call));
    });

    let normal = Bachelier::new(0.02, 0.008).unwrap();
    group.bench_function("bachelier_price", |b| {
        b.iter(|| normal.price(black_box(0.025), black_box(2.0), PutCall::Put));
    });

    let params = SabrParameters::new(0.03, 0.5, -0.2, 0.4).unwrap();
    group.bench_function("sabr_hagan", |b| {
        b.iter(|| {
            SabrFormula::Hagan
                .volatility(black_box(0.03), black_box(0.035), 2.0, &params)
                .unwrap()
        });
    });
    group.bench_function("sabr_hagan_adjoint", |b| {
        b.iter(|| {
            SabrFormula::Hagan
                .volatility_adjoint(black_box(0.03), black_box(0.035), 2.0, &params)
                .unwrap()
        });
    });

    group.finish();
}

fn bench_leg_pricing(c: &mut Criterion) {
    let mut group = c.benchmark_group("cap_leg");
    let valuation = Date::from_ymd(2024, 1, 15).unwrap();
    let provider = CurveRatesProvider::new(valuation)
        .with_discount_curve(Currency::USD, Arc::new(FlatCurve::new(0.03)));
    let index = IborIndex::new(
        "USD-LIBOR-3M",
        Currency::USD,
        Tenor::from_months(3),
        DayCountConvention::Act360,
    );
    let pricer = CapFloorLegPricer::new();

    for years in [2u32, 10, 30] {
        let leg = CapFloorLeg::builder()
            .index(index.clone())
            .start(Date::from_ymd(2024, 4, 15).unwrap())
            .end(valuation.plus_tenor(Tenor::from_years(years)).unwrap())
            .strike(0.03)
            .build()
            .unwrap();
        group.bench_with_input(BenchmarkId::new("flat_black", years), &leg, |b, leg| {
            b.iter(|| {
                pricer
                    .present_value_flat(
                        leg,
                        &provider,
                        DayCountConvention::Act365Fixed,
                        CapletVolatilityType::Black,
                        black_box(0.2),
                        None,
                    )
                    .unwrap()
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_formulas, bench_leg_pricing);
criterion_main!(benches);
