//! Root-finder configuration.

use num_traits::Float;

/// Configuration for one-dimensional root finders.
///
/// # Example
///
/// ```
/// use capvol_core::math::solvers::SolverConfig;
///
/// let config: SolverConfig<f64> = SolverConfig::default();
/// assert_eq!(config.max_iterations, 100);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SolverConfig<T: Float> {
    /// Absolute tolerance on the root (and on `|f|`). Default: 1e-10.
    pub tolerance: T,
    /// Maximum number of iterations. Default: 100.
    pub max_iterations: usize,
}

pub(crate) fn constant<T: Float>(value: f64) -> T {
    T::from(value).unwrap_or_else(T::nan)
}

impl<T: Float> Default for SolverConfig<T> {
    fn default() -> Self {
        Self {
            tolerance: constant(1e-10),
            max_iterations: 100,
        }
    }
}

impl<T: Float> SolverConfig<T> {
    /// Creates a configuration.
    ///
    /// # Panics
    ///
    /// Panics if `tolerance` is not positive or `max_iterations` is zero.
    pub fn new(tolerance: T, max_iterations: usize) -> Self {
        assert!(tolerance > T::zero(), "tolerance must be positive");
        assert!(max_iterations > 0, "max_iterations must be > 0");
        Self {
            tolerance,
            max_iterations,
        }
    }

    /// Tight tolerance, large budget.
    pub fn high_precision() -> Self {
        Self {
            tolerance: constant(1e-14),
            max_iterations: 500,
        }
    }

    /// Loose tolerance, small budget.
    pub fn fast() -> Self {
        Self {
            tolerance: constant(1e-6),
            max_iterations: 50,
        }
    }
}
