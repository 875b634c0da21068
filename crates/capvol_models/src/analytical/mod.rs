//! Closed-form caplet and floorlet formulas.
//!
//! - Black and shifted Black for lognormal dynamics
//! - Bachelier for normal dynamics
//! - Standard normal CDF and PDF
//!
//! Prices are undiscounted values per unit accrual; the leg pricer applies
//! notional, accrual and discounting.

pub mod bachelier;
pub mod black;
pub mod distributions;
pub mod error;

pub use bachelier::Bachelier;
pub use black::Black76;
pub use distributions::{norm_cdf, norm_pdf};
pub use error::AnalyticalError;
