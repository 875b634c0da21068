//! The caplet volatility lookup contract.

use capvol_core::types::{Date, DayCountConvention, IborIndex};

use super::error::VolatilityError;
use super::metadata::{CapletVolatilityType, ParameterMetadata};
use crate::analytical::{Bachelier, Black76};
use crate::instruments::PutCall;

/// Calibrated caplet/floorlet volatilities for one Ibor index.
///
/// Expiries are year fractions from the valuation date under
/// [`day_count`](Self::day_count). Implementations are immutable.
pub trait CapletVolatilities {
    /// Name of the volatility object.
    fn name(&self) -> &str;

    /// Index whose caplets the object prices.
    fn index(&self) -> &IborIndex;

    /// Valuation date.
    fn valuation_date(&self) -> Date;

    /// Day count mapping dates to expiry times.
    fn day_count(&self) -> DayCountConvention;

    /// Quoting convention of [`volatility`](Self::volatility).
    fn volatility_type(&self) -> CapletVolatilityType;

    /// Volatility at `(expiry, strike)`. Surfaces ignore `forward`.
    fn volatility(&self, expiry: f64, strike: f64, forward: f64) -> Result<f64, VolatilityError>;

    /// Sensitivity of [`volatility`](Self::volatility) to each model
    /// parameter, ordered as [`parameter_metadata`](Self::parameter_metadata).
    fn parameter_sensitivity(
        &self,
        expiry: f64,
        strike: f64,
        forward: f64,
    ) -> Result<Vec<f64>, VolatilityError>;

    /// Metadata of the model parameters.
    fn parameter_metadata(&self) -> &[ParameterMetadata];

    /// Shift at `expiry`; zero for unshifted and normal objects.
    fn shift(&self, expiry: f64) -> f64;

    /// Number of model parameters.
    fn parameter_count(&self) -> usize {
        self.parameter_metadata().len()
    }

    /// Expiry time of `date`.
    fn relative_time(&self, date: Date) -> f64 {
        self.day_count().year_fraction(self.valuation_date(), date)
    }

    /// Undiscounted caplet value per unit accrual under this object's formula.
    fn price(
        &self,
        expiry: f64,
        put_call: PutCall,
        strike: f64,
        forward: f64,
        volatility: f64,
    ) -> Result<f64, VolatilityError> {
        Ok(match self.volatility_type() {
            CapletVolatilityType::Black => {
                Black76::shifted(forward, volatility, self.shift(expiry))?
                    .price(strike, expiry, put_call)
            }
            CapletVolatilityType::Normal => {
                Bachelier::new(forward, volatility)?.price(strike, expiry, put_call)
            }
        })
    }

    /// Sensitivity of [`price`](Self::price) to the volatility.
    fn price_vega(
        &self,
        expiry: f64,
        strike: f64,
        forward: f64,
        volatility: f64,
    ) -> Result<f64, VolatilityError> {
        Ok(match self.volatility_type() {
            CapletVolatilityType::Black => {
                Black76::shifted(forward, volatility, self.shift(expiry))?.vega(strike, expiry)
            }
            CapletVolatilityType::Normal => Bachelier::new(forward, volatility)?.vega(strike, expiry),
        })
    }
}
