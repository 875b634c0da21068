//! Levenberg-Marquardt nonlinear least-squares solver.
//!
//! Minimises
//!
//! ```text
//! Φ(p) = ‖r(p)‖² + pᵀ P p
//! ```
//!
//! where `r` is the residual vector of a [`LeastSquaresProblem`] and `P` an
//! optional symmetric positive-semidefinite penalty matrix. Each iteration
//! solves the damped normal equations
//!
//! ```text
//! (JᵀJ + P + λ D) δ = -(Jᵀr + P p),    D = diag(JᵀJ + P)
//! ```
//!
//! and projects `p + δ` back onto the parameter bounds when the problem has
//! any. Parameters sitting on a bound with the gradient pointing outward are
//! held fixed for the step, and convergence is judged on the gradient of the
//! remaining free parameters. The damping `λ` shrinks after an accepted step
//! and grows after a rejected one.
//!
//! # Example
//!
//! ```
//! use capvol_core::math::solvers::{LevenbergMarquardtSolver, LMConfig};
//!
//! let x_data = vec![0.0, 1.0, 2.0, 3.0, 4.0];
//! let y_data: Vec<f64> = x_data.iter().map(|x: &f64| 2.0 * (-0.5 * x).exp()).collect();
//!
//! let residuals = |params: &[f64]| -> Vec<f64> {
//!     x_data
//!         .iter()
//!         .zip(&y_data)
//!         .map(|(&x, &y)| params[0] * (-params[1] * x).exp() - y)
//!         .collect()
//! };
//!
//! let solver = LevenbergMarquardtSolver::new(LMConfig::default());
//! let result = solver.solve(residuals, vec![1.0, 1.0]).unwrap();
//! assert!(result.converged);
//! assert!((result.params[0] - 2.0).abs() < 1e-6);
//! ```

use tracing::trace;

use crate::types::SolverError;

/// Steps taken with damping above this level are too short to judge
/// convergence by the objective decrease.
const MAX_CONVERGENCE_DAMPING: f64 = 1.0;

/// Configuration for [`LevenbergMarquardtSolver`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LMConfig {
    /// Relative decrease of the objective below which an accepted step
    /// counts as converged. Default: 1e-10.
    pub tolerance: f64,
    /// Objective value treated as an exact fit. Default: 1e-28.
    pub objective_tolerance: f64,
    /// Maximum number of trial steps. Default: 100.
    pub max_iterations: usize,
    /// Initial damping factor. Default: 1e-3.
    pub initial_lambda: f64,
    /// Damping multiplier after a rejected step. Default: 10.
    pub lambda_up: f64,
    /// Damping multiplier after an accepted step. Default: 0.1.
    pub lambda_down: f64,
    /// Lower bound on damping. Default: 1e-10.
    pub min_lambda: f64,
    /// Upper bound on damping; reaching it means no descent is possible.
    /// Default: 1e10.
    pub max_lambda: f64,
    /// Relative step length treated as converged. Default: 1e-12.
    pub param_tolerance: f64,
    /// Largest projected gradient component treated as stationary.
    /// Default: 1e-14.
    pub gradient_tolerance: f64,
}

impl Default for LMConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-10,
            objective_tolerance: 1e-28,
            max_iterations: 100,
            initial_lambda: 1e-3,
            lambda_up: 10.0,
            lambda_down: 0.1,
            min_lambda: 1e-10,
            max_lambda: 1e10,
            param_tolerance: 1e-12,
            gradient_tolerance: 1e-14,
        }
    }
}

impl LMConfig {
    /// Default configuration with the given tolerance and budget.
    pub fn new(tolerance: f64, max_iterations: usize) -> Self {
        Self {
            tolerance,
            max_iterations,
            ..Default::default()
        }
    }

    /// Loose tolerance, small budget.
    pub fn fast() -> Self {
        Self {
            tolerance: 1e-6,
            max_iterations: 50,
            ..Default::default()
        }
    }

    /// Tight tolerance, large budget.
    pub fn high_precision() -> Self {
        Self {
            tolerance: 1e-14,
            max_iterations: 500,
            param_tolerance: 1e-14,
            ..Default::default()
        }
    }
}

/// Outcome of a least-squares solve.
#[derive(Debug, Clone, PartialEq)]
pub struct LMResult {
    /// Final parameters.
    pub params: Vec<f64>,
    /// Sum of squared residuals at `params`, excluding the penalty.
    pub residual_ss: f64,
    /// Objective at `params`, including the penalty.
    pub objective: f64,
    /// Number of trial steps taken.
    pub iterations: usize,
    /// Whether a convergence criterion was met.
    pub converged: bool,
    /// Damping factor at exit.
    pub final_lambda: f64,
}

impl LMResult {
    /// Creates a result.
    pub fn new(
        params: Vec<f64>,
        residual_ss: f64,
        objective: f64,
        iterations: usize,
        converged: bool,
        final_lambda: f64,
    ) -> Self {
        Self {
            params,
            residual_ss,
            objective,
            iterations,
            converged,
            final_lambda,
        }
    }

    /// Root-mean-square residual.
    pub fn rmse(&self, n_observations: usize) -> f64 {
        if n_observations == 0 {
            return 0.0;
        }
        (self.residual_ss / n_observations as f64).sqrt()
    }
}

/// A nonlinear least-squares problem.
///
/// Only [`residuals`](LeastSquaresProblem::residuals) is required. The
/// Jacobian defaults to forward finite differences; implementors with an
/// analytic Jacobian override it.
pub trait LeastSquaresProblem {
    /// Residual vector at `params`. Non-finite entries mark the point as
    /// infeasible.
    fn residuals(&self, params: &[f64]) -> Vec<f64>;

    /// Jacobian `J[i][j] = ∂r_i/∂p_j` at `params`, where `residuals` is
    /// `self.residuals(params)`.
    fn jacobian(&self, params: &[f64], residuals: &[f64]) -> Vec<Vec<f64>> {
        finite_difference_jacobian(|p| self.residuals(p), params, residuals)
    }

    /// Symmetric positive-semidefinite penalty matrix added as `pᵀ P p`.
    fn penalty(&self) -> Option<&[Vec<f64>]> {
        None
    }

    /// Inclusive `(lower, upper)` bounds per parameter.
    fn bounds(&self) -> Option<&[(f64, f64)]> {
        None
    }
}

struct ClosureProblem<F>(F);

impl<F> LeastSquaresProblem for ClosureProblem<F>
where
    F: Fn(&[f64]) -> Vec<f64>,
{
    fn residuals(&self, params: &[f64]) -> Vec<f64> {
        (self.0)(params)
    }
}

/// Forward finite-difference Jacobian of `f` at `params`, given `r0 = f(params)`.
pub fn finite_difference_jacobian<F>(f: F, params: &[f64], r0: &[f64]) -> Vec<Vec<f64>>
where
    F: Fn(&[f64]) -> Vec<f64>,
{
    let n_params = params.len();
    let mut jacobian = vec![vec![0.0; n_params]; r0.len()];
    let mut bumped = params.to_vec();
    for j in 0..n_params {
        let h = 1e-8 * params[j].abs().max(1.0);
        bumped[j] = params[j] + h;
        let r_plus = f(&bumped);
        bumped[j] = params[j];
        for (row, (plus, base)) in jacobian.iter_mut().zip(r_plus.iter().zip(r0)) {
            row[j] = (plus - base) / h;
        }
    }
    jacobian
}

/// Levenberg-Marquardt solver.
#[derive(Debug, Clone)]
pub struct LevenbergMarquardtSolver {
    config: LMConfig,
}

impl LevenbergMarquardtSolver {
    /// Creates a solver with the given configuration.
    pub fn new(config: LMConfig) -> Self {
        Self { config }
    }

    /// Creates a solver with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(LMConfig::default())
    }

    /// Solver configuration.
    pub fn config(&self) -> &LMConfig {
        &self.config
    }

    /// Minimises the squared norm of a residual closure, using a
    /// finite-difference Jacobian.
    pub fn solve<F>(&self, residuals: F, initial_params: Vec<f64>) -> Result<LMResult, SolverError>
    where
        F: Fn(&[f64]) -> Vec<f64>,
    {
        self.solve_problem(&ClosureProblem(residuals), initial_params)
    }

    /// Minimises the objective of `problem` starting from `initial_params`.
    ///
    /// An unconverged run is returned as `Ok` with `converged == false`;
    /// callers decide whether that is an error.
    ///
    /// # Errors
    ///
    /// * `SolverError::NumericalInstability` for empty or non-finite inputs
    /// * `SolverError::DimensionMismatch` when the Jacobian, penalty or
    ///   bounds do not match the parameter and residual counts
    pub fn solve_problem<P>(&self, problem: &P, initial_params: Vec<f64>) -> Result<LMResult, SolverError>
    where
        P: LeastSquaresProblem + ?Sized,
    {
        let n_params = initial_params.len();
        if n_params == 0 {
            return Err(SolverError::NumericalInstability(
                "Empty parameter vector".to_string(),
            ));
        }
        let penalty = problem.penalty();
        if let Some(p) = penalty {
            check_square(p, n_params)?;
        }
        let bounds = problem.bounds();
        if let Some(b) = bounds {
            if b.len() != n_params {
                return Err(SolverError::DimensionMismatch {
                    expected: n_params,
                    got: b.len(),
                });
            }
        }

        let mut params = project(initial_params, bounds);
        let mut r = problem.residuals(&params);
        if r.is_empty() {
            return Err(SolverError::NumericalInstability(
                "Empty residual vector".to_string(),
            ));
        }
        if r.iter().any(|v| !v.is_finite()) {
            return Err(SolverError::NumericalInstability(
                "Non-finite residual at initial parameters".to_string(),
            ));
        }
        let mut ss = sum_of_squares(&r);
        let mut objective = ss + quadratic_form(penalty, &params);
        let mut lambda = self.config.initial_lambda;
        let mut system: Option<(Vec<Vec<f64>>, Vec<f64>)> = None;

        for iteration in 0..self.config.max_iterations {
            if objective <= self.config.objective_tolerance {
                return Ok(LMResult::new(params, ss, objective, iteration, true, lambda));
            }

            let (a, g) = match system.take() {
                Some(cached) => cached,
                None => {
                    let jacobian = problem.jacobian(&params, &r);
                    let (a, g) = normal_equations(&jacobian, &r, penalty, &params)?;
                    freeze_active(a, g, &params, bounds)
                }
            };
            let gradient = g.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
            if gradient <= self.config.gradient_tolerance {
                return Ok(LMResult::new(params, ss, objective, iteration, true, lambda));
            }

            let delta = match solve_damped(&a, &g, lambda) {
                Some(d) => d,
                None => {
                    lambda = (lambda * self.config.lambda_up).min(self.config.max_lambda);
                    system = Some((a, g));
                    continue;
                }
            };

            let trial: Vec<f64> = params.iter().zip(&delta).map(|(p, d)| p + d).collect();
            let trial = project(trial, bounds);
            let step: Vec<f64> = trial.iter().zip(&params).map(|(t, p)| t - p).collect();
            if lambda <= MAX_CONVERGENCE_DAMPING
                && norm(&step)
                    <= self.config.param_tolerance * (norm(&params) + self.config.param_tolerance)
            {
                return Ok(LMResult::new(params, ss, objective, iteration, true, lambda));
            }

            let trial_r = problem.residuals(&trial);
            let trial_ss = sum_of_squares(&trial_r);
            let trial_objective = trial_ss + quadratic_form(penalty, &trial);

            if trial_r.len() == r.len() && trial_objective.is_finite() && trial_objective < objective {
                let decrease = (objective - trial_objective) / objective;
                let damping_used = lambda;
                trace!(iteration, objective = trial_objective, lambda, "accepted step");
                params = trial;
                r = trial_r;
                ss = trial_ss;
                objective = trial_objective;
                lambda = (lambda * self.config.lambda_down).max(self.config.min_lambda);
                if decrease < self.config.tolerance && damping_used <= MAX_CONVERGENCE_DAMPING {
                    return Ok(LMResult::new(params, ss, objective, iteration + 1, true, lambda));
                }
            } else {
                if lambda >= self.config.max_lambda {
                    return Ok(LMResult::new(params, ss, objective, iteration + 1, true, lambda));
                }
                lambda = (lambda * self.config.lambda_up).min(self.config.max_lambda);
                system = Some((a, g));
            }
        }

        Ok(LMResult::new(
            params,
            ss,
            objective,
            self.config.max_iterations,
            false,
            lambda,
        ))
    }
}

fn check_square(matrix: &[Vec<f64>], n: usize) -> Result<(), SolverError> {
    if matrix.len() != n {
        return Err(SolverError::DimensionMismatch {
            expected: n,
            got: matrix.len(),
        });
    }
    match matrix.iter().find(|row| row.len() != n) {
        Some(row) => Err(SolverError::DimensionMismatch {
            expected: n,
            got: row.len(),
        }),
        None => Ok(()),
    }
}

fn project(mut params: Vec<f64>, bounds: Option<&[(f64, f64)]>) -> Vec<f64> {
    if let Some(bounds) = bounds {
        for (p, (lo, hi)) in params.iter_mut().zip(bounds) {
            *p = p.max(*lo).min(*hi);
        }
    }
    params
}

/// Removes parameters held at a bound by an outward gradient from the
/// system: their row and column become the identity and their gradient
/// component zero, so the damped step leaves them in place.
fn freeze_active(
    mut a: Vec<Vec<f64>>,
    mut g: Vec<f64>,
    params: &[f64],
    bounds: Option<&[(f64, f64)]>,
) -> (Vec<Vec<f64>>, Vec<f64>) {
    let Some(bounds) = bounds else {
        return (a, g);
    };
    let n = g.len();
    for (i, (p, (lo, hi))) in params.iter().zip(bounds).enumerate() {
        let at_lower = *p <= *lo && g[i] > 0.0;
        let at_upper = *p >= *hi && g[i] < 0.0;
        if !(at_lower || at_upper) {
            continue;
        }
        for j in 0..n {
            a[i][j] = 0.0;
            a[j][i] = 0.0;
        }
        a[i][i] = 1.0;
        g[i] = 0.0;
    }
    (a, g)
}

/// Returns `(JᵀJ + P, Jᵀr + P p)`.
fn normal_equations(
    jacobian: &[Vec<f64>],
    residuals: &[f64],
    penalty: Option<&[Vec<f64>]>,
    params: &[f64],
) -> Result<(Vec<Vec<f64>>, Vec<f64>), SolverError> {
    let n = params.len();
    if jacobian.len() != residuals.len() {
        return Err(SolverError::DimensionMismatch {
            expected: residuals.len(),
            got: jacobian.len(),
        });
    }
    check_square_rows(jacobian, n)?;
    if jacobian.iter().flatten().any(|v| !v.is_finite()) {
        return Err(SolverError::NumericalInstability(
            "Non-finite Jacobian entry".to_string(),
        ));
    }

    let mut a = vec![vec![0.0; n]; n];
    let mut g = vec![0.0; n];
    for (row, r) in jacobian.iter().zip(residuals) {
        for i in 0..n {
            if row[i] == 0.0 {
                continue;
            }
            g[i] += row[i] * r;
            for j in i..n {
                a[i][j] += row[i] * row[j];
            }
        }
    }
    for i in 0..n {
        for j in 0..i {
            a[i][j] = a[j][i];
        }
    }
    if let Some(p) = penalty {
        for i in 0..n {
            for j in 0..n {
                a[i][j] += p[i][j];
                g[i] += p[i][j] * params[j];
            }
        }
    }
    Ok((a, g))
}

fn check_square_rows(jacobian: &[Vec<f64>], n: usize) -> Result<(), SolverError> {
    match jacobian.iter().find(|row| row.len() != n) {
        Some(row) => Err(SolverError::DimensionMismatch {
            expected: n,
            got: row.len(),
        }),
        None => Ok(()),
    }
}

fn solve_damped(a: &[Vec<f64>], g: &[f64], lambda: f64) -> Option<Vec<f64>> {
    let n = g.len();
    let max_diag = (0..n).map(|i| a[i][i]).fold(0.0_f64, f64::max);
    let floor = (max_diag * 1e-12).max(f64::MIN_POSITIVE);
    let mut damped = a.to_vec();
    for (i, row) in damped.iter_mut().enumerate() {
        row[i] += lambda * a[i][i].max(floor);
    }
    let rhs: Vec<f64> = g.iter().map(|v| -v).collect();
    solve_cholesky(&damped, &rhs)
}

#[inline]
fn sum_of_squares(v: &[f64]) -> f64 {
    v.iter().map(|x| x * x).sum()
}

#[inline]
fn norm(v: &[f64]) -> f64 {
    sum_of_squares(v).sqrt()
}

fn quadratic_form(matrix: Option<&[Vec<f64>]>, x: &[f64]) -> f64 {
    match matrix {
        None => 0.0,
        Some(m) => m
            .iter()
            .zip(x)
            .map(|(row, xi)| xi * row.iter().zip(x).map(|(a, b)| a * b).sum::<f64>())
            .sum(),
    }
}

/// Solves `A x = b` for symmetric positive-definite `A`.
pub fn solve_cholesky(a: &[Vec<f64>], b: &[f64]) -> Option<Vec<f64>> {
    let n = b.len();
    if n == 0 || a.len() != n {
        return None;
    }

    let mut l = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in 0..=i {
            let mut sum = a[i][j];
            for k in 0..j {
                sum -= l[i][k] * l[j][k];
            }
            if i == j {
                if sum <= 0.0 || !sum.is_finite() {
                    return None;
                }
                l[i][j] = sum.sqrt();
            } else {
                l[i][j] = sum / l[j][j];
            }
        }
    }

    // L y = b
    let mut y = vec![0.0; n];
    for i in 0..n {
        let mut sum = b[i];
        for k in 0..i {
            sum -= l[i][k] * y[k];
        }
        y[i] = sum / l[i][i];
    }

    // Lᵀ x = y
    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let mut sum = y[i];
        for k in (i + 1)..n {
            sum -= l[k][i] * x[k];
        }
        x[i] = sum / l[i][i];
    }
    Some(x)
}
