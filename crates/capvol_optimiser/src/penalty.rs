//! Smoothness penalty matrices for nonparametric surfaces.
//!
//! For node coordinates `x` rescaled to `[0, 1]`, a difference operator `D`
//! of order 1 or 2 approximates the first or second derivative of the node
//! values on the actual (possibly non-uniform) grid. The one-axis penalty is
//! `λ DᵀD`; the surface penalty on the expiry-major flattened node vector is
//!
//! ```text
//! P = λ_T (D_Tᵀ D_T ⊗ I_K) + λ_K (I_T ⊗ D_Kᵀ D_K)
//! ```
//!
//! The order on each axis is `min(2, n - 1)`; an axis with a single node
//! has order 0 and contributes nothing.

use crate::error::CalibrationError;

/// Highest difference order used on an axis.
pub const MAX_DIFFERENCE_ORDER: usize = 2;

/// Dense square matrix, row-major.
pub type Matrix = Vec<Vec<f64>>;

/// Difference order for an axis with `n` nodes.
pub fn difference_order(n: usize) -> usize {
    MAX_DIFFERENCE_ORDER.min(n.saturating_sub(1))
}

/// Difference operator of `order` on nodes `x`, with `n - order` rows.
///
/// # Errors
///
/// `CalibrationError::InvalidConfiguration` when `x` is not strictly
/// increasing and finite, or `order` exceeds 2 or `x.len() - 1`.
///
/// # Examples
///
/// ```
/// use capvol_optimiser::penalty::difference_operator;
///
/// let d = difference_operator(&[0.0, 1.0, 2.0], 2).unwrap();
/// assert_eq!(d.len(), 1);
/// // second difference on the unit interval, h = 0.5
/// assert!((d[0][0] - 4.0).abs() < 1e-12);
/// assert!((d[0][1] + 8.0).abs() < 1e-12);
/// ```
pub fn difference_operator(x: &[f64], order: usize) -> Result<Matrix, CalibrationError> {
    let n = x.len();
    if x.iter().any(|v| !v.is_finite()) || x.windows(2).any(|w| w[0] >= w[1]) {
        return Err(CalibrationError::invalid_configuration(
            "penalty nodes must be finite and strictly increasing",
        ));
    }
    if order > MAX_DIFFERENCE_ORDER || order >= n.max(1) {
        return Err(CalibrationError::invalid_configuration(format!(
            "difference order {} unavailable on {} nodes",
            order, n
        )));
    }
    if order == 0 {
        return Ok(Vec::new());
    }

    let span = x[n - 1] - x[0];
    let u: Vec<f64> = x.iter().map(|v| (v - x[0]) / span).collect();
    let h: Vec<f64> = u.windows(2).map(|w| w[1] - w[0]).collect();

    let mut rows = Vec::with_capacity(n - order);
    match order {
        1 => {
            for (i, hi) in h.iter().enumerate() {
                let mut row = vec![0.0; n];
                row[i] = -1.0 / hi;
                row[i + 1] = 1.0 / hi;
                rows.push(row);
            }
        }
        _ => {
            for i in 1..n - 1 {
                let (hl, hr) = (h[i - 1], h[i]);
                let mut row = vec![0.0; n];
                row[i - 1] = 2.0 / (hl * (hl + hr));
                row[i] = -2.0 / (hl * hr);
                row[i + 1] = 2.0 / (hr * (hl + hr));
                rows.push(row);
            }
        }
    }
    Ok(rows)
}

/// One-axis penalty `λ DᵀD`, `n × n`. Zero for order 0.
///
/// # Errors
///
/// As [`difference_operator`], and for a negative or non-finite `lambda`.
pub fn penalty_matrix_1d(x: &[f64], order: usize, lambda: f64) -> Result<Matrix, CalibrationError> {
    check_lambda(lambda)?;
    let d = difference_operator(x, order)?;
    let n = x.len();
    let mut p = vec![vec![0.0; n]; n];
    for row in &d {
        for i in 0..n {
            if row[i] == 0.0 {
                continue;
            }
            for j in 0..n {
                p[i][j] += lambda * row[i] * row[j];
            }
        }
    }
    Ok(p)
}

/// Surface penalty on the expiry-major flattening of `expiries × strikes`.
///
/// # Examples
///
/// ```
/// use capvol_optimiser::penalty::penalty_matrix;
///
/// let p = penalty_matrix(&[1.0, 2.0, 3.0], &[0.01, 0.02], 1.0, 0.5).unwrap();
/// assert_eq!(p.len(), 6);
/// for i in 0..6 {
///     for j in 0..6 {
///         assert!((p[i][j] - p[j][i]).abs() < 1e-12);
///     }
/// }
/// ```
pub fn penalty_matrix(
    expiries: &[f64],
    strikes: &[f64],
    lambda_expiry: f64,
    lambda_strike: f64,
) -> Result<Matrix, CalibrationError> {
    check_lambda(lambda_expiry)?;
    check_lambda(lambda_strike)?;
    let (n_t, n_k) = (expiries.len(), strikes.len());
    let order_t = difference_order(n_t);
    let order_k = difference_order(n_k);
    let p_t = penalty_matrix_1d(expiries, order_t, if order_t == 0 { 0.0 } else { lambda_expiry })?;
    let p_k = penalty_matrix_1d(strikes, order_k, if order_k == 0 { 0.0 } else { lambda_strike })?;

    let size = n_t * n_k;
    let mut p = vec![vec![0.0; size]; size];
    // P_T ⊗ I_K
    for (a, row_t) in p_t.iter().enumerate() {
        for (b, &v) in row_t.iter().enumerate() {
            if v == 0.0 {
                continue;
            }
            for k in 0..n_k {
                p[a * n_k + k][b * n_k + k] += v;
            }
        }
    }
    // I_T ⊗ P_K
    for t in 0..n_t {
        for (a, row_k) in p_k.iter().enumerate() {
            for (b, &v) in row_k.iter().enumerate() {
                p[t * n_k + a][t * n_k + b] += v;
            }
        }
    }
    Ok(p)
}

/// `xᵀ P x`.
pub fn quadratic_form(p: &[Vec<f64>], x: &[f64]) -> f64 {
    p.iter()
        .zip(x)
        .map(|(row, xi)| xi * row.iter().zip(x).map(|(a, b)| a * b).sum::<f64>())
        .sum()
}

fn check_lambda(lambda: f64) -> Result<(), CalibrationError> {
    if !lambda.is_finite() || lambda < 0.0 {
        return Err(CalibrationError::invalid_configuration(format!(
            "penalty weight must be non-negative, got {}",
            lambda
        )));
    }
    Ok(())
}
