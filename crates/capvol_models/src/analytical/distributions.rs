//! Standard normal distribution functions.
//!
//! - `norm_cdf`: cumulative distribution function, via `libm::erfc`
//! - `norm_pdf`: probability density function

/// 1 / sqrt(2 * pi)
const FRAC_1_SQRT_2PI: f64 = 0.398_942_280_401_432_7;

/// Standard normal cumulative distribution function.
///
/// Φ(x) = erfc(-x / √2) / 2, accurate to machine precision in both tails.
///
/// # Examples
/// ```
/// use capvol_models::analytical::distributions::norm_cdf;
///
/// assert!((norm_cdf(0.0) - 0.5).abs() < 1e-15);
/// assert!(norm_cdf(-3.0) < 0.01);
/// ```
#[inline]
pub fn norm_cdf(x: f64) -> f64 {
    0.5 * libm::erfc(-x / std::f64::consts::SQRT_2)
}

/// Standard normal probability density function.
///
/// φ(x) = exp(-x² / 2) / √(2π)
#[inline]
pub fn norm_pdf(x: f64) -> f64 {
    FRAC_1_SQRT_2PI * (-0.5 * x * x).exp()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    // ===== norm_cdf =====

    #[test]
    fn test_norm_cdf_reference_values() {
        assert_relative_eq!(norm_cdf(1.0), 0.8413447460685429, epsilon = 1e-15);
        assert_relative_eq!(norm_cdf(-1.0), 0.15865525393145707, epsilon = 1e-15);
        assert_relative_eq!(norm_cdf(2.0), 0.9772498680518208, epsilon = 1e-15);
        assert_relative_eq!(norm_cdf(-2.0), 0.022750131948179195, epsilon = 1e-15);
    }

    #[test]
    fn test_norm_cdf_deep_tail_keeps_relative_accuracy() {
        // Φ(-8) ≈ 6.22e-16
        assert_relative_eq!(norm_cdf(-8.0), 6.220960574271785e-16, max_relative = 1e-10);
        assert_eq!(norm_cdf(40.0), 1.0);
    }

    // ===== norm_pdf =====

    #[test]
    fn test_norm_pdf_reference_values() {
        assert_relative_eq!(norm_pdf(0.0), FRAC_1_SQRT_2PI, epsilon = 1e-16);
        assert_relative_eq!(norm_pdf(1.0), 0.24197072451914337, epsilon = 1e-15);
        assert_relative_eq!(norm_pdf(-2.0), 0.05399096651318806, epsilon = 1e-15);
    }

    #[test]
    fn test_cdf_derivative_is_pdf() {
        let h = 1e-5;
        for x in [-2.0, -0.3, 0.0, 1.1, 2.5] {
            let derivative = (norm_cdf(x + h) - norm_cdf(x - h)) / (2.0 * h);
            assert_relative_eq!(derivative, norm_pdf(x), epsilon = 1e-9);
        }
    }

    // ===== Property-based =====

    proptest! {
        #[test]
        fn prop_cdf_symmetry(x in -10.0f64..10.0) {
            prop_assert!((norm_cdf(x) + norm_cdf(-x) - 1.0).abs() < 1e-14);
        }

        #[test]
        fn prop_cdf_monotone(x in -8.0f64..8.0, dx in 1e-3f64..1.0) {
            prop_assert!(norm_cdf(x + dx) > norm_cdf(x));
        }
    }
}
