//! Root-finding and least-squares solvers.
//!
//! - [`BrentSolver`]: bracketing root finder, used to back out single node
//!   volatilities from prices
//! - [`LevenbergMarquardtSolver`]: damped Gauss-Newton for calibration, with
//!   optional penalty matrix and parameter bounds supplied through
//!   [`LeastSquaresProblem`]
//!
//! ```
//! use capvol_core::math::solvers::{BrentSolver, SolverConfig};
//!
//! let solver = BrentSolver::new(SolverConfig::default());
//! let root = solver.find_root(|x: f64| x * x - 2.0, 0.0, 2.0).unwrap();
//! assert!((root - std::f64::consts::SQRT_2).abs() < 1e-10);
//! ```

mod brent;
mod config;
mod levenberg_marquardt;

pub use brent::BrentSolver;
pub use config::SolverConfig;
pub use levenberg_marquardt::{
    finite_difference_jacobian, solve_cholesky, LMConfig, LMResult, LeastSquaresProblem,
    LevenbergMarquardtSolver,
};
