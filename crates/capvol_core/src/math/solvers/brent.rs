//! Brent's method root-finding solver.

use super::config::constant;
use super::SolverConfig;
use crate::types::SolverError;
use num_traits::Float;

/// Brent's method root finder.
///
/// Combines bisection, secant and inverse quadratic interpolation. Converges
/// for any continuous function given a sign-changing bracket.
///
/// # Example
///
/// ```
/// use capvol_core::math::solvers::{BrentSolver, SolverConfig};
///
/// let solver = BrentSolver::new(SolverConfig::default());
/// let f = |x: f64| x * x * x - x - 2.0;
/// let root = solver.find_root(f, 1.0, 2.0).unwrap();
/// assert!(f(root).abs() < 1e-9);
/// ```
#[derive(Debug, Clone)]
pub struct BrentSolver<T: Float> {
    config: SolverConfig<T>,
}

impl<T: Float> BrentSolver<T> {
    /// Creates a solver with the given configuration.
    pub fn new(config: SolverConfig<T>) -> Self {
        Self { config }
    }

    /// Creates a solver with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(SolverConfig::default())
    }

    /// Solver configuration.
    pub fn config(&self) -> &SolverConfig<T> {
        &self.config
    }

    /// Finds a root of `f` in `[a, b]`.
    ///
    /// # Errors
    ///
    /// * `SolverError::NoBracket` if `f(a)` and `f(b)` have the same sign
    /// * `SolverError::MaxIterationsExceeded` if the budget runs out
    pub fn find_root<F>(&self, f: F, a: T, b: T) -> Result<T, SolverError>
    where
        F: Fn(T) -> T,
    {
        let two: T = constant(2.0);
        let three: T = constant(3.0);
        let half: T = constant(0.5);
        let eps: T = T::epsilon();

        let mut a = a;
        let mut b = b;
        let mut fa = f(a);
        let mut fb = f(b);

        if fa == T::zero() {
            return Ok(a);
        }
        if fb == T::zero() {
            return Ok(b);
        }
        if (fa > T::zero()) == (fb > T::zero()) {
            return Err(SolverError::NoBracket {
                a: a.to_f64().unwrap_or(f64::NAN),
                b: b.to_f64().unwrap_or(f64::NAN),
            });
        }

        let mut c = b;
        let mut fc = fb;
        let mut d = b - a;
        let mut e = d;

        for _ in 0..self.config.max_iterations {
            if (fb > T::zero()) == (fc > T::zero()) {
                c = a;
                fc = fa;
                d = b - a;
                e = d;
            }
            if fc.abs() < fb.abs() {
                a = b;
                b = c;
                c = a;
                fa = fb;
                fb = fc;
                fc = fa;
            }

            let tol = two * eps * b.abs() + half * self.config.tolerance;
            let m = half * (c - b);
            if m.abs() <= tol || fb.abs() < self.config.tolerance {
                return Ok(b);
            }

            if e.abs() >= tol && fa.abs() > fb.abs() {
                let s = fb / fa;
                let mut p;
                let mut q;
                if a == c {
                    // secant
                    p = two * m * s;
                    q = T::one() - s;
                } else {
                    // inverse quadratic
                    let qa = fa / fc;
                    let r = fb / fc;
                    p = s * (two * m * qa * (qa - r) - (b - a) * (r - T::one()));
                    q = (qa - T::one()) * (r - T::one()) * (s - T::one());
                }
                if p > T::zero() {
                    q = -q;
                }
                p = p.abs();
                let min1 = three * m * q - (tol * q).abs();
                let min2 = (e * q).abs();
                if two * p < min1.min(min2) {
                    e = d;
                    d = p / q;
                } else {
                    d = m;
                    e = d;
                }
            } else {
                d = m;
                e = d;
            }

            a = b;
            fa = fb;
            if d.abs() > tol {
                b = b + d;
            } else {
                b = b + if m > T::zero() { tol } else { -tol };
            }
            fb = f(b);
        }

        Err(SolverError::MaxIterationsExceeded {
            iterations: self.config.max_iterations,
        })
    }
}
