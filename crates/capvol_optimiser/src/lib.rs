//! # capvol_optimiser
//!
//! Calibration of caplet/floorlet volatilities to market cap and floor
//! quotes.
//!
//! This crate sits on top of Models (L2): it turns a grid of quoted cap
//! volatilities into a calibrated volatility object that reprices the caps.
//!
//! ## Architecture Position
//!
//! Layer 2.5 in the pricer stack.
//! Depends on `capvol_core` (L1) and `capvol_models` (L2).
//!
//! ## Modules
//!
//! - `data`: quote grid ingestion and surface metadata
//! - `definitions`: what to calibrate (surface, direct regression, SABR)
//! - `penalty`: curvature penalty matrices for the direct regression
//! - `calibration`: the calibrators and their shared configuration
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use capvol_core::market_data::curves::FlatCurve;
//! use capvol_core::market_data::CurveRatesProvider;
//! use capvol_core::math::interpolators::CurveInterpolator;
//! use capvol_core::types::{Currency, Date, DayCountConvention, IborIndex, Tenor};
//! use capvol_optimiser::prelude::*;
//!
//! let valuation = Date::from_ymd(2024, 3, 1).unwrap();
//! let provider = CurveRatesProvider::new(valuation)
//!     .with_discount_curve(Currency::USD, Arc::new(FlatCurve::new(0.03)));
//! let index = IborIndex::new("USD-LIBOR-3M", Currency::USD, Tenor::from_months(3), DayCountConvention::Act360);
//!
//! let raw = RawOptionData::of(
//!     vec![Tenor::from_years(1), Tenor::from_years(2)],
//!     vec![0.03],
//!     QuoteType::Strike,
//!     vec![vec![0.25], vec![0.25]],
//!     ValueType::BlackVolatility,
//! )
//! .unwrap();
//! let definition = SurfaceDefinition::of(
//!     "USD-CAPLET",
//!     index,
//!     DayCountConvention::Act365Fixed,
//!     CurveInterpolator::Linear,
//!     CurveInterpolator::Linear,
//! )
//! .unwrap();
//!
//! let result = SurfaceCalibrator::with_defaults()
//!     .calibrate(&definition, valuation, &raw, &provider)
//!     .unwrap();
//! assert!(result.chi_square() < 1e-12);
//! ```

pub mod calibration;
pub mod data;
pub mod definitions;
pub mod penalty;

mod error;

pub use error::CalibrationError;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::calibration::*;
    pub use crate::data::*;
    pub use crate::definitions::*;
    pub use crate::CalibrationError;
}
