//! # capvol_core: Foundation for Caplet Volatility Calibration
//!
//! ## Layer 1 (Foundation) Role
//!
//! capvol_core is the bottom layer of the workspace and provides:
//! - Time types: `Date`, `Tenor`, `DayCountConvention` (`types::time`)
//! - Currency and Ibor index conventions (`types::currency`, `types::index`)
//! - Curve and grid interpolation with parameter sensitivities (`math::interpolators`)
//! - Brent root finding and Levenberg-Marquardt least squares (`math::solvers`)
//! - Yield curves and the `RatesProvider` market view (`market_data`)
//! - Error types: `DateError`, `InterpolationError`, `SolverError`, `MarketDataError`
//!
//! It has no dependencies on other capvol_* crates and only a small external stack:
//! - num-traits: generic floating-point code
//! - chrono: calendar arithmetic
//! - thiserror: error enums
//! - tracing: solver diagnostics
//! - serde: serialisation of value types (optional)
//!
//! ## Usage Examples
//!
//! ```rust
//! use capvol_core::math::solvers::BrentSolver;
//! use capvol_core::types::{Date, DayCountConvention, Tenor};
//!
//! let start = Date::from_ymd(2024, 1, 15).unwrap();
//! let end = start.plus_tenor(Tenor::from_months(6)).unwrap();
//! let tau = DayCountConvention::Act360.year_fraction(start, end);
//! assert!((tau - 182.0 / 360.0).abs() < 1e-12);
//!
//! let solver = BrentSolver::<f64>::with_defaults();
//! let root = solver.find_root(|x| x * x - 2.0, 0.0, 2.0).unwrap();
//! assert!((root - 2.0_f64.sqrt()).abs() < 1e-9);
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialisation for dates, tenors, conventions, indices and interpolator choices

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod market_data;
pub mod math;
pub mod types;
