//! # Caplet Volatility Models (L2: Business Logic)
//!
//! Pricing formulas, volatility objects and cap/floor instruments.
//!
//! This crate provides:
//! - Black, shifted Black and Bachelier caplet formulas
//! - The Hagan SABR implied volatility approximation
//! - Caplet volatility objects: interpolated surfaces and SABR parameter curves
//! - Accrual schedules, cap/floor legs and a leg pricer
//!
//! ## Design Principles
//!
//! - **Immutable values**: volatility objects have no setters; `with_*`
//!   methods return new objects
//! - **Enum dispatch** through [`volatility::IborCapletFloorletVolatilities`]
//! - **Parameter sensitivities** ordered as the parameter metadata, so
//!   calibrators can build Jacobians without knowing the model
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use capvol_core::market_data::curves::FlatCurve;
//! use capvol_core::market_data::CurveRatesProvider;
//! use capvol_core::types::{Currency, Date, DayCountConvention, IborIndex, Tenor};
//! use capvol_models::instruments::{CapFloorLeg, CapFloorLegPricer};
//!
//! let valuation = Date::from_ymd(2024, 1, 15).unwrap();
//! let provider = CurveRatesProvider::new(valuation)
//!     .with_discount_curve(Currency::EUR, Arc::new(FlatCurve::new(0.025)));
//! let index = IborIndex::new("EUR-EURIBOR-6M", Currency::EUR, Tenor::from_months(6), DayCountConvention::Act360);
//! let leg = CapFloorLeg::builder()
//!     .index(index)
//!     .start(Date::from_ymd(2024, 7, 15).unwrap())
//!     .end(Date::from_ymd(2029, 1, 15).unwrap())
//!     .strike(0.025)
//!     .build()
//!     .unwrap();
//!
//! let par = CapFloorLegPricer::new().par_rate(&leg, &provider).unwrap();
//! assert!((par - 0.025).abs() < 1e-3);
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod analytical;
pub mod instruments;
pub mod models;
pub mod schedules;
pub mod volatility;
