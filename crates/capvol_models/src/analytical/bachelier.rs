//! Bachelier (normal) model for caplets and floorlets.
//!
//! ## Mathematical Formulas
//!
//! **Call Price**: C = (F - K)·N(d) + σ√T·φ(d)
//! **Put Price**: P = (K - F)·N(-d) + σ√T·φ(d)
//! **Vega**: ∂C/∂σ = ∂P/∂σ = √T·φ(d)
//!
//! Where d = (F - K) / (σ√T). Prices are undiscounted and per unit accrual.

use super::distributions::{norm_cdf, norm_pdf};
use super::error::AnalyticalError;
use crate::instruments::PutCall;

/// Expiries below this are priced at intrinsic value.
const MIN_EXPIRY: f64 = 1e-10;

/// Bachelier model for a single forward rate.
///
/// Negative forwards are allowed.
///
/// # Examples
/// ```
/// use capvol_models::analytical::Bachelier;
/// use capvol_models::instruments::PutCall;
///
/// let model = Bachelier::new(0.01, 0.005).unwrap();
/// let call = model.price(0.012, 1.0, PutCall::Call);
/// let put = model.price(0.012, 1.0, PutCall::Put);
///
/// // Put-call parity: C - P = F - K
/// assert!((call - put - (0.01 - 0.012)).abs() < 1e-14);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bachelier {
    forward: f64,
    volatility: f64,
}

impl Bachelier {
    /// Creates a model from a forward and a normal volatility.
    ///
    /// # Errors
    /// - `AnalyticalError::InvalidVolatility` if volatility is negative or non-finite
    pub fn new(forward: f64, volatility: f64) -> Result<Self, AnalyticalError> {
        if !volatility.is_finite() || volatility < 0.0 {
            return Err(AnalyticalError::InvalidVolatility { volatility });
        }
        Ok(Self { forward, volatility })
    }

    /// Returns the forward rate.
    #[inline]
    pub fn forward(&self) -> f64 {
        self.forward
    }

    /// Returns the volatility.
    #[inline]
    pub fn volatility(&self) -> f64 {
        self.volatility
    }

    /// Undiscounted option value.
    pub fn price(&self, strike: f64, expiry: f64, put_call: PutCall) -> f64 {
        let sign = put_call.sign();
        let std_dev = self.volatility * expiry.max(0.0).sqrt();
        if expiry <= MIN_EXPIRY || std_dev == 0.0 {
            return (sign * (self.forward - strike)).max(0.0);
        }
        let d = (self.forward - strike) / std_dev;
        sign * (self.forward - strike) * norm_cdf(sign * d) + std_dev * norm_pdf(d)
    }

    /// Sensitivity of the price to the normal volatility.
    pub fn vega(&self, strike: f64, expiry: f64) -> f64 {
        if expiry <= MIN_EXPIRY {
            return 0.0;
        }
        let sqrt_t = expiry.sqrt();
        let std_dev = self.volatility * sqrt_t;
        if std_dev == 0.0 {
            return if self.forward == strike {
                sqrt_t * norm_pdf(0.0)
            } else {
                0.0
            };
        }
        let d = (self.forward - strike) / std_dev;
        sqrt_t * norm_pdf(d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    // ===== Constructor =====

    #[test]
    fn test_negative_forward_allowed() {
        let model = Bachelier::new(-0.005, 0.01).unwrap();
        assert_eq!(model.forward(), -0.005);
    }

    #[test]
    fn test_invalid_volatility() {
        assert_eq!(
            Bachelier::new(0.03, -0.01).unwrap_err(),
            AnalyticalError::InvalidVolatility { volatility: -0.01 }
        );
        assert!(Bachelier::new(0.03, f64::NAN).is_err());
    }

    // ===== Price =====

    #[test]
    fn test_atm_price() {
        // ATM: C = σ√T·φ(0)
        let model = Bachelier::new(0.02, 0.01).unwrap();
        let expected = 0.01 * 2.0_f64.sqrt() * norm_pdf(0.0);
        assert_relative_eq!(model.price(0.02, 2.0, PutCall::Call), expected, epsilon = 1e-16);
        assert_relative_eq!(model.price(0.02, 2.0, PutCall::Put), expected, epsilon = 1e-16);
    }

    #[test]
    fn test_zero_expiry_is_intrinsic() {
        let model = Bachelier::new(0.03, 0.01).unwrap();
        assert_relative_eq!(model.price(0.02, 0.0, PutCall::Call), 0.01, epsilon = 1e-16);
        assert_eq!(model.price(0.02, 0.0, PutCall::Put), 0.0);
    }

    // ===== Vega =====

    #[test]
    fn test_vega_matches_finite_difference() {
        let h = 1e-7;
        for strike in [-0.005, 0.01, 0.025] {
            let up = Bachelier::new(0.012, 0.008 + h).unwrap();
            let down = Bachelier::new(0.012, 0.008 - h).unwrap();
            let fd = (up.price(strike, 1.5, PutCall::Call) - down.price(strike, 1.5, PutCall::Call))
                / (2.0 * h);
            let model = Bachelier::new(0.012, 0.008).unwrap();
            assert_relative_eq!(model.vega(strike, 1.5), fd, max_relative = 1e-6);
        }
    }
}
