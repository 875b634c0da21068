//! SABR implied volatility.
//!
//! The SABR (Stochastic Alpha, Beta, Rho) model is described by
//! ```text
//! dF = alpha * (F + s)^beta * dW_F
//! d(alpha) = nu * alpha * dW_alpha
//! E[dW_F * dW_alpha] = rho * dt
//! ```
//! where:
//! - F = forward rate, s = shift
//! - alpha = initial volatility
//! - beta = CEV exponent (0: normal-like, 1: lognormal)
//! - nu = volatility of volatility
//! - rho = correlation between forward and volatility
//!
//! ## Hagan formula
//!
//! [`SabrFormula::Hagan`] is the Hagan et al. (2002) lognormal implied
//! volatility approximation, applied to the shifted forward and strike. The
//! `z / x(z)` factor is replaced by its Taylor expansion near the money.
//!
//! ## Example
//!
//! ```
//! use capvol_models::models::sabr::{SabrFormula, SabrParameters};
//!
//! let params = SabrParameters::new(0.03, 0.5, -0.2, 0.4).unwrap();
//! let vol = SabrFormula::Hagan.volatility(0.03, 0.035, 2.0, &params).unwrap();
//! assert!(vol > 0.0 && vol < 1.0);
//! ```

use crate::volatility::VolatilityError;

/// Below this |z| the Taylor expansion of z / x(z) is used.
const Z_EXPANSION_THRESHOLD: f64 = 1e-6;

/// Relative bump for finite-difference parameter sensitivities.
const SENSITIVITY_BUMP: f64 = 1e-6;

/// SABR parameters at a single expiry.
///
/// # Examples
///
/// ```
/// use capvol_models::models::sabr::SabrParameters;
///
/// assert!(SabrParameters::new(0.02, 0.5, 0.0, 0.3).is_ok());
/// assert!(SabrParameters::new(0.02, 1.5, 0.0, 0.3).is_err());
/// assert!(SabrParameters::new(0.02, 0.5, 1.0, 0.3).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SabrParameters {
    alpha: f64,
    beta: f64,
    rho: f64,
    nu: f64,
    shift: f64,
}

impl SabrParameters {
    /// Unshifted parameters.
    ///
    /// # Errors
    ///
    /// `VolatilityError::InvalidSabrParameter` unless alpha > 0,
    /// beta in [0, 1], rho in (-1, 1) and nu >= 0.
    pub fn new(alpha: f64, beta: f64, rho: f64, nu: f64) -> Result<Self, VolatilityError> {
        Self::with_shift(alpha, beta, rho, nu, 0.0)
    }

    /// Parameters with a shift applied to forward and strike.
    pub fn with_shift(
        alpha: f64,
        beta: f64,
        rho: f64,
        nu: f64,
        shift: f64,
    ) -> Result<Self, VolatilityError> {
        let invalid = |name: &'static str, value: f64| {
            Err(VolatilityError::InvalidSabrParameter { name, value })
        };
        if !(alpha.is_finite() && alpha > 0.0) {
            return invalid("alpha", alpha);
        }
        if !(0.0..=1.0).contains(&beta) {
            return invalid("beta", beta);
        }
        if !(rho > -1.0 && rho < 1.0) {
            return invalid("rho", rho);
        }
        if !(nu.is_finite() && nu >= 0.0) {
            return invalid("nu", nu);
        }
        if !shift.is_finite() {
            return invalid("shift", shift);
        }
        Ok(Self {
            alpha,
            beta,
            rho,
            nu,
            shift,
        })
    }

    /// Initial volatility.
    #[inline]
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// CEV exponent.
    #[inline]
    pub fn beta(&self) -> f64 {
        self.beta
    }

    /// Forward/volatility correlation.
    #[inline]
    pub fn rho(&self) -> f64 {
        self.rho
    }

    /// Volatility of volatility.
    #[inline]
    pub fn nu(&self) -> f64 {
        self.nu
    }

    /// Shift applied to forward and strike.
    #[inline]
    pub fn shift(&self) -> f64 {
        self.shift
    }

    fn as_array(&self) -> [f64; 4] {
        [self.alpha, self.beta, self.rho, self.nu]
    }
}

/// SABR implied volatility approximation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SabrFormula {
    /// Hagan et al. (2002) lognormal expansion.
    #[default]
    Hagan,
}

impl SabrFormula {
    /// Conventional name.
    pub fn name(&self) -> &'static str {
        match self {
            SabrFormula::Hagan => "Hagan",
        }
    }

    /// Lognormal (shifted Black) implied volatility.
    ///
    /// # Errors
    ///
    /// - `VolatilityError::NonPositiveShiftedRate` if forward or strike plus
    ///   shift is not positive
    /// - `VolatilityError::NonFinite` if the expansion breaks down
    pub fn volatility(
        &self,
        forward: f64,
        strike: f64,
        expiry: f64,
        params: &SabrParameters,
    ) -> Result<f64, VolatilityError> {
        let f = forward + params.shift;
        let k = strike + params.shift;
        if f.is_nan() || f <= 0.0 {
            return Err(VolatilityError::NonPositiveShiftedRate {
                rate: forward,
                shift: params.shift,
            });
        }
        if k.is_nan() || k <= 0.0 {
            return Err(VolatilityError::NonPositiveShiftedRate {
                rate: strike,
                shift: params.shift,
            });
        }
        let vol = match self {
            SabrFormula::Hagan => hagan(f, k, expiry.max(0.0), params.as_array()),
        };
        if !vol.is_finite() {
            return Err(VolatilityError::NonFinite("SABR volatility".to_string()));
        }
        Ok(vol)
    }

    /// Volatility and its sensitivities to `[alpha, beta, rho, nu]`.
    ///
    /// Sensitivities are central differences of [`volatility`](Self::volatility),
    /// one-sided where a bump would leave the parameter domain.
    pub fn volatility_adjoint(
        &self,
        forward: f64,
        strike: f64,
        expiry: f64,
        params: &SabrParameters,
    ) -> Result<(f64, [f64; 4]), VolatilityError> {
        let vol = self.volatility(forward, strike, expiry, params)?;
        let base = params.as_array();
        let mut derivatives = [0.0; 4];
        for (i, derivative) in derivatives.iter_mut().enumerate() {
            let h = SENSITIVITY_BUMP * base[i].abs().max(1e-2);
            let bumped = |delta: f64| -> Result<f64, VolatilityError> {
                let mut p = base;
                p[i] += delta;
                let bumped = SabrParameters::with_shift(p[0], p[1], p[2], p[3], params.shift)?;
                self.volatility(forward, strike, expiry, &bumped)
            };
            *derivative = match (bumped(h), bumped(-h)) {
                (Ok(up), Ok(down)) => (up - down) / (2.0 * h),
                (Ok(up), Err(_)) => (up - vol) / h,
                (Err(_), Ok(down)) => (vol - down) / h,
                (Err(e), Err(_)) => return Err(e),
            };
        }
        Ok((vol, derivatives))
    }
}

fn hagan(f: f64, k: f64, t: f64, [alpha, beta, rho, nu]: [f64; 4]) -> f64 {
    let one_minus_beta = 1.0 - beta;
    let omb2 = one_minus_beta * one_minus_beta;
    let log_fk = (f / k).ln();
    let fk = f * k;
    let fk_pow_half = fk.powf(0.5 * one_minus_beta);

    // D(F/K) = 1 + ((1-β)²/24)·ln²(F/K) + ((1-β)⁴/1920)·ln⁴(F/K)
    let log2 = log_fk * log_fk;
    let denominator = 1.0 + omb2 / 24.0 * log2 + omb2 * omb2 / 1920.0 * log2 * log2;

    let z = nu / alpha * fk_pow_half * log_fk;
    let z_over_x = if z.abs() < Z_EXPANSION_THRESHOLD {
        1.0 - 0.5 * rho * z + (2.0 - 3.0 * rho * rho) * z * z / 12.0
    } else {
        let sqrt_term = (1.0 - 2.0 * rho * z + z * z).sqrt();
        z / ((sqrt_term + z - rho) / (1.0 - rho)).ln()
    };

    let correction = 1.0
        + (omb2 / 24.0 * alpha * alpha / (fk_pow_half * fk_pow_half)
            + 0.25 * rho * beta * nu * alpha / fk_pow_half
            + (2.0 - 3.0 * rho * rho) / 24.0 * nu * nu)
            * t;

    alpha / (fk_pow_half * denominator) * z_over_x * correction
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    // ===== Parameters =====

    #[test]
    fn test_parameter_validation() {
        assert!(matches!(
            SabrParameters::new(0.0, 0.5, 0.0, 0.3),
            Err(VolatilityError::InvalidSabrParameter { name: "alpha", .. })
        ));
        assert!(matches!(
            SabrParameters::new(0.02, 0.5, -1.0, 0.3),
            Err(VolatilityError::InvalidSabrParameter { name: "rho", .. })
        ));
        assert!(matches!(
            SabrParameters::new(0.02, 0.5, 0.0, -0.1),
            Err(VolatilityError::InvalidSabrParameter { name: "nu", .. })
        ));
        let p = SabrParameters::with_shift(0.02, 0.0, 0.1, 0.3, 0.01).unwrap();
        assert_eq!(p.shift(), 0.01);
    }

    // ===== Hagan formula =====

    #[test]
    fn test_lognormal_no_volvol_is_flat() {
        // β = 1, ν = 0: σ_B = α for every strike
        let params = SabrParameters::new(0.25, 1.0, 0.0, 0.0).unwrap();
        for strike in [0.01, 0.03, 0.08] {
            let vol = SabrFormula::Hagan.volatility(0.03, strike, 5.0, &params).unwrap();
            assert_relative_eq!(vol, 0.25, epsilon = 1e-14);
        }
    }

    #[test]
    fn test_atm_closed_form() {
        let (alpha, beta, rho, nu, f, t) = (0.04, 0.6, -0.3, 0.5, 0.025, 1.5);
        let params = SabrParameters::new(alpha, beta, rho, nu).unwrap();
        let vol = SabrFormula::Hagan.volatility(f, f, t, &params).unwrap();
        let fb = f.powf(1.0 - beta);
        let expected = alpha / fb
            * (1.0
                + ((1.0 - beta).powi(2) / 24.0 * alpha * alpha / (fb * fb)
                    + 0.25 * rho * beta * nu * alpha / fb
                    + (2.0 - 3.0 * rho * rho) / 24.0 * nu * nu)
                    * t);
        assert_relative_eq!(vol, expected, epsilon = 1e-14);
    }

    #[test]
    fn test_continuous_across_expansion_threshold() {
        let params = SabrParameters::new(0.03, 0.5, 0.2, 0.6).unwrap();
        let f = 0.03;
        let near = SabrFormula::Hagan.volatility(f, f * (1.0 + 1e-9), 1.0, &params).unwrap();
        let further = SabrFormula::Hagan.volatility(f, f * (1.0 + 1e-4), 1.0, &params).unwrap();
        let atm = SabrFormula::Hagan.volatility(f, f, 1.0, &params).unwrap();
        assert_relative_eq!(near, atm, max_relative = 1e-8);
        assert_relative_eq!(further, atm, max_relative = 1e-3);
    }

    #[test]
    fn test_negative_rho_gives_downward_skew() {
        let params = SabrParameters::new(0.02, 0.5, -0.5, 0.4).unwrap();
        let low = SabrFormula::Hagan.volatility(0.03, 0.02, 1.0, &params).unwrap();
        let high = SabrFormula::Hagan.volatility(0.03, 0.04, 1.0, &params).unwrap();
        assert!(low > high);
    }

    #[test]
    fn test_shift_allows_negative_rates() {
        let params = SabrParameters::with_shift(0.02, 0.5, 0.0, 0.3, 0.02).unwrap();
        assert!(SabrFormula::Hagan.volatility(-0.005, 0.0, 1.0, &params).is_ok());
        let unshifted = SabrParameters::new(0.02, 0.5, 0.0, 0.3).unwrap();
        assert!(matches!(
            SabrFormula::Hagan.volatility(-0.005, 0.0, 1.0, &unshifted),
            Err(VolatilityError::NonPositiveShiftedRate { .. })
        ));
    }

    // ===== Sensitivities =====

    #[test]
    fn test_adjoint_alpha_derivative() {
        // β = 1, ν = 0: σ = α, so ∂σ/∂α = 1
        let params = SabrParameters::new(0.2, 1.0, 0.0, 0.0).unwrap();
        let (vol, d) = SabrFormula::Hagan
            .volatility_adjoint(0.03, 0.04, 2.0, &params)
            .unwrap();
        assert_relative_eq!(vol, 0.2, epsilon = 1e-14);
        assert_relative_eq!(d[0], 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_adjoint_at_beta_boundary_is_one_sided() {
        let params = SabrParameters::new(0.02, 1.0, 0.1, 0.3).unwrap();
        let (_, d) = SabrFormula::Hagan
            .volatility_adjoint(0.03, 0.035, 1.0, &params)
            .unwrap();
        assert!(d.iter().all(|v| v.is_finite()));
    }
}
