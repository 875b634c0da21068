//! Discount and forward curves.
//!
//! - [`YieldCurve`]: discount factor by time, with derived zero and forward rates
//! - [`FlatCurve`]: constant rate
//! - [`InterpolatedCurve`]: zero-rate pillars, linear or log-linear

mod flat;
mod interpolated;
mod traits;

pub use flat::FlatCurve;
pub use interpolated::{CurveInterpolation, InterpolatedCurve};
pub use traits::YieldCurve;
