//! Cap/floor instruments and their pricer.
//!
//! - [`CapFloorLeg`]: a strip of caplets or floorlets on one Ibor index
//! - [`CapFloorLegPricer`]: present value off a rates provider, either under
//!   a caplet volatility object or a single quoted volatility

mod capfloor;
mod error;
mod pricing;

pub use capfloor::{CapFloorLeg, CapFloorLegBuilder, CapletPeriod, PutCall};
pub use error::PricingError;
pub use pricing::{CapFloorLegPricer, ResolvedCaplet};
