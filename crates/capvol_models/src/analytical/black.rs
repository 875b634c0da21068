//! Black (lognormal) and shifted Black model for caplets and floorlets.
//!
//! ## Mathematical Formulas
//!
//! With shifted forward F' = F + s and strike K' = K + s:
//!
//! **Call Price**: C = F'·N(d1) - K'·N(d2)
//! **Put Price**: P = K'·N(-d2) - F'·N(-d1)
//! **Vega**: F'·φ(d1)·√T
//!
//! Where d1 = (ln(F'/K') + σ²T/2) / (σ√T), d2 = d1 - σ√T. Prices are
//! undiscounted and per unit accrual.

use super::distributions::{norm_cdf, norm_pdf};
use super::error::AnalyticalError;
use crate::instruments::PutCall;

/// Expiries below this are priced at intrinsic value.
const MIN_EXPIRY: f64 = 1e-10;

/// Black model for a single forward rate, optionally shifted.
///
/// # Examples
/// ```
/// use capvol_models::analytical::Black76;
/// use capvol_models::instruments::PutCall;
///
/// let model = Black76::new(0.03, 0.2).unwrap();
/// let call = model.price(0.035, 2.0, PutCall::Call);
/// assert!(call > 0.0 && call < 0.03);
///
/// // Negative forward with a shift
/// let shifted = Black76::shifted(-0.002, 0.15, 0.01).unwrap();
/// assert!(shifted.price(0.0, 1.0, PutCall::Put) > 0.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Black76 {
    forward: f64,
    volatility: f64,
    shift: f64,
}

impl Black76 {
    /// Creates an unshifted model.
    ///
    /// # Errors
    /// - `AnalyticalError::InvalidVolatility` if volatility is negative or non-finite
    /// - `AnalyticalError::InvalidForward` if the forward is not positive
    pub fn new(forward: f64, volatility: f64) -> Result<Self, AnalyticalError> {
        Self::shifted(forward, volatility, 0.0)
    }

    /// Creates a model applying `shift` to forward and strike.
    ///
    /// # Errors
    /// - `AnalyticalError::InvalidVolatility` if volatility is negative or non-finite
    /// - `AnalyticalError::InvalidForward` if `forward + shift` is not positive
    pub fn shifted(forward: f64, volatility: f64, shift: f64) -> Result<Self, AnalyticalError> {
        if !volatility.is_finite() || volatility < 0.0 {
            return Err(AnalyticalError::InvalidVolatility { volatility });
        }
        let shifted_forward = forward + shift;
        if shifted_forward.is_nan() || shifted_forward <= 0.0 {
            return Err(AnalyticalError::InvalidForward { forward, shift });
        }
        Ok(Self {
            forward,
            volatility,
            shift,
        })
    }

    /// Returns the unshifted forward rate.
    #[inline]
    pub fn forward(&self) -> f64 {
        self.forward
    }

    /// Returns the volatility.
    #[inline]
    pub fn volatility(&self) -> f64 {
        self.volatility
    }

    /// Returns the shift.
    #[inline]
    pub fn shift(&self) -> f64 {
        self.shift
    }

    /// Undiscounted option value.
    pub fn price(&self, strike: f64, expiry: f64, put_call: PutCall) -> f64 {
        let sign = put_call.sign();
        let f = self.forward + self.shift;
        let k = strike + self.shift;
        if k <= 0.0 {
            // Strike below the shifted support: call is a forward, put is worthless.
            return if sign > 0.0 { f - k } else { 0.0 };
        }
        let std_dev = self.volatility * expiry.max(0.0).sqrt();
        if expiry <= MIN_EXPIRY || std_dev == 0.0 {
            return (sign * (f - k)).max(0.0);
        }
        let d1 = (f / k).ln() / std_dev + 0.5 * std_dev;
        let d2 = d1 - std_dev;
        sign * (f * norm_cdf(sign * d1) - k * norm_cdf(sign * d2))
    }

    /// Sensitivity of the price to the lognormal volatility.
    pub fn vega(&self, strike: f64, expiry: f64) -> f64 {
        let f = self.forward + self.shift;
        let k = strike + self.shift;
        if k <= 0.0 || expiry <= MIN_EXPIRY {
            return 0.0;
        }
        let sqrt_t = expiry.sqrt();
        let std_dev = self.volatility * sqrt_t;
        if std_dev == 0.0 {
            return if f == k { f * sqrt_t * norm_pdf(0.0) } else { 0.0 };
        }
        let d1 = (f / k).ln() / std_dev + 0.5 * std_dev;
        f * norm_pdf(d1) * sqrt_t
    }
}
