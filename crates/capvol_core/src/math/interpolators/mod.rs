//! Interpolation of volatility and parameter nodes.
//!
//! ## Available Schemes
//!
//! - [`CurveInterpolator`]: one-dimensional schemes (`Linear`, `StepUpper`,
//!   `TimeSquare`, `NaturalSpline`) with [`CurveExtrapolator`] rules on
//!   each side, bound to data as a [`BoundCurveInterpolator`]
//! - [`GridSurfaceInterpolator`]: two-dimensional scheme over grid columns,
//!   bound to data as a [`BoundGridSurface`]
//!
//! Every bound interpolator reports the sensitivity of an interpolated value
//! to its node values, which is what calibration Jacobians and downstream
//! risk are built from.
//!
//! ## Example
//!
//! ```
//! use capvol_core::math::interpolators::{CurveInterpolator, GridSurfaceInterpolator};
//!
//! let scheme = GridSurfaceInterpolator::new(CurveInterpolator::Linear, CurveInterpolator::Linear);
//! let surface = scheme
//!     .bind(&[1.0, 2.0], &[0.02, 0.02], &[0.2, 0.3])
//!     .unwrap();
//! assert!((surface.value(1.5, 0.02).unwrap() - 0.25).abs() < 1e-12);
//! ```

mod curve;
mod grid;

pub use curve::{BoundCurveInterpolator, CurveExtrapolator, CurveInterpolator};
pub use grid::{BoundGridSurface, GridSurfaceInterpolator};
