//! Caplet/floorlet volatility objects.
//!
//! Two families implement [`CapletVolatilities`]:
//! - [`SurfaceCapletVolatilities`]: node values on an (expiry, strike) grid
//! - [`SabrCapletVolatilities`]: SABR parameter curves in expiry
//!
//! [`IborCapletFloorletVolatilities`] wraps either one for static dispatch.

mod context;
mod error;
mod metadata;
mod parameter_curve;
mod sabr;
mod surface;
mod traits;

pub use context::VolatilityContext;
pub use error::VolatilityError;
pub use metadata::{
    CapletVolatilityType, NodeExpiry, ParameterMetadata, SabrNodeMetadata, SabrParameterType,
    SurfaceNodeMetadata,
};
pub use parameter_curve::{ParameterCurve, ShiftCurve};
pub use sabr::SabrCapletVolatilities;
pub use surface::SurfaceCapletVolatilities;
pub use traits::CapletVolatilities;

use capvol_core::types::{Date, DayCountConvention, IborIndex};

/// Any caplet volatility object produced by calibration.
#[derive(Debug, Clone, PartialEq)]
pub enum IborCapletFloorletVolatilities {
    /// Interpolated surface.
    Surface(SurfaceCapletVolatilities),
    /// SABR parameter curves.
    Sabr(SabrCapletVolatilities),
}

impl IborCapletFloorletVolatilities {
    /// The surface, if this is one.
    pub fn as_surface(&self) -> Option<&SurfaceCapletVolatilities> {
        match self {
            IborCapletFloorletVolatilities::Surface(s) => Some(s),
            IborCapletFloorletVolatilities::Sabr(_) => None,
        }
    }

    /// The SABR object, if this is one.
    pub fn as_sabr(&self) -> Option<&SabrCapletVolatilities> {
        match self {
            IborCapletFloorletVolatilities::Sabr(s) => Some(s),
            IborCapletFloorletVolatilities::Surface(_) => None,
        }
    }
}

impl From<SurfaceCapletVolatilities> for IborCapletFloorletVolatilities {
    fn from(value: SurfaceCapletVolatilities) -> Self {
        IborCapletFloorletVolatilities::Surface(value)
    }
}

impl From<SabrCapletVolatilities> for IborCapletFloorletVolatilities {
    fn from(value: SabrCapletVolatilities) -> Self {
        IborCapletFloorletVolatilities::Sabr(value)
    }
}

macro_rules! delegate {
    ($self:ident, $v:ident => $body:expr) => {
        match $self {
            IborCapletFloorletVolatilities::Surface($v) => $body,
            IborCapletFloorletVolatilities::Sabr($v) => $body,
        }
    };
}

impl CapletVolatilities for IborCapletFloorletVolatilities {
    fn name(&self) -> &str {
        delegate!(self, v => v.name())
    }

    fn index(&self) -> &IborIndex {
        delegate!(self, v => v.index())
    }

    fn valuation_date(&self) -> Date {
        delegate!(self, v => v.valuation_date())
    }

    fn day_count(&self) -> DayCountConvention {
        delegate!(self, v => v.day_count())
    }

    fn volatility_type(&self) -> CapletVolatilityType {
        delegate!(self, v => v.volatility_type())
    }

    fn volatility(&self, expiry: f64, strike: f64, forward: f64) -> Result<f64, VolatilityError> {
        delegate!(self, v => v.volatility(expiry, strike, forward))
    }

    fn parameter_sensitivity(
        &self,
        expiry: f64,
        strike: f64,
        forward: f64,
    ) -> Result<Vec<f64>, VolatilityError> {
        delegate!(self, v => v.parameter_sensitivity(expiry, strike, forward))
    }

    fn parameter_metadata(&self) -> &[ParameterMetadata] {
        delegate!(self, v => v.parameter_metadata())
    }

    fn shift(&self, expiry: f64) -> f64 {
        delegate!(self, v => v.shift(expiry))
    }
}
