//! Market data: yield curves and the rates provider used by calibration.
//!
//! - [`curves`]: the [`YieldCurve`](curves::YieldCurve) trait with flat and
//!   interpolated implementations
//! - [`RatesProvider`]: discount factors and Ibor forwards by date
//! - [`MarketDataError`]: curve lookup and construction failures

pub mod curves;
pub mod error;
pub mod provider;

pub use error::MarketDataError;
pub use provider::{CurveRatesProvider, RatesProvider, SharedCurve};
