//! One-dimensional node interpolation with explicit extrapolation rules.

use crate::types::InterpolationError;

/// Interpolation scheme between curve nodes.
///
/// `Linear`, `StepUpper` and `TimeSquare` are local: the value between two
/// nodes depends on those two nodes only. `NaturalSpline` is global.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CurveInterpolator {
    /// Piecewise-linear in the node values.
    Linear,
    /// Step function taking the value of the upper node of each interval.
    StepUpper,
    /// Linear in `x * y^2`, i.e. linear in total variance when `x` is time.
    TimeSquare,
    /// Natural cubic spline.
    NaturalSpline,
}

impl CurveInterpolator {
    /// True when each interval depends on its two bounding nodes only.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            CurveInterpolator::Linear | CurveInterpolator::StepUpper | CurveInterpolator::TimeSquare
        )
    }

    /// Conventional name.
    pub fn name(&self) -> &'static str {
        match self {
            CurveInterpolator::Linear => "Linear",
            CurveInterpolator::StepUpper => "StepUpper",
            CurveInterpolator::TimeSquare => "TimeSquare",
            CurveInterpolator::NaturalSpline => "NaturalSpline",
        }
    }

    /// Binds the scheme to node data.
    ///
    /// `xs` must be strictly increasing and the same length as `ys`, with at
    /// least one node. A single node yields a constant curve.
    pub fn bind(
        &self,
        xs: &[f64],
        ys: &[f64],
        left: CurveExtrapolator,
        right: CurveExtrapolator,
    ) -> Result<BoundCurveInterpolator, InterpolationError> {
        BoundCurveInterpolator::new(*self, xs, ys, left, right)
    }

    fn is_linear_in_values(&self) -> bool {
        !matches!(self, CurveInterpolator::TimeSquare)
    }
}

/// Extrapolation rule outside the node range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CurveExtrapolator {
    /// Value of the boundary node.
    Flat,
    /// Tangent of the interpolant at the boundary node.
    Linear,
}

impl CurveExtrapolator {
    /// Conventional name.
    pub fn name(&self) -> &'static str {
        match self {
            CurveExtrapolator::Flat => "Flat",
            CurveExtrapolator::Linear => "Linear",
        }
    }
}

/// Node data bound to an interpolator and a pair of extrapolators.
///
/// # Example
///
/// ```
/// use capvol_core::math::interpolators::{CurveExtrapolator, CurveInterpolator};
///
/// let curve = CurveInterpolator::Linear
///     .bind(&[1.0, 2.0], &[0.2, 0.3], CurveExtrapolator::Flat, CurveExtrapolator::Linear)
///     .unwrap();
/// assert!((curve.value(1.5) - 0.25).abs() < 1e-12);
/// assert!((curve.value(0.0) - 0.2).abs() < 1e-12);
/// assert!((curve.value(3.0) - 0.4).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct BoundCurveInterpolator {
    interpolator: CurveInterpolator,
    left: CurveExtrapolator,
    right: CurveExtrapolator,
    xs: Vec<f64>,
    ys: Vec<f64>,
    second_derivatives: Vec<f64>,
}

impl BoundCurveInterpolator {
    fn new(
        interpolator: CurveInterpolator,
        xs: &[f64],
        ys: &[f64],
        left: CurveExtrapolator,
        right: CurveExtrapolator,
    ) -> Result<Self, InterpolationError> {
        if xs.is_empty() {
            return Err(InterpolationError::InsufficientData { got: 0, need: 1 });
        }
        if xs.len() != ys.len() {
            return Err(InterpolationError::InvalidInput(format!(
                "xs and ys must have same length: got {} and {}",
                xs.len(),
                ys.len()
            )));
        }
        if let Some(index) = xs.iter().chain(ys).position(|v| !v.is_finite()) {
            return Err(InterpolationError::InvalidInput(format!(
                "non-finite node value at position {}",
                index % xs.len()
            )));
        }
        if let Some(index) = xs.windows(2).position(|w| w[1] <= w[0]) {
            return Err(InterpolationError::NonMonotonicData { index: index + 1 });
        }
        let second_derivatives = match interpolator {
            CurveInterpolator::NaturalSpline => natural_spline_second_derivatives(xs, ys),
            _ => Vec::new(),
        };
        Ok(Self {
            interpolator,
            left,
            right,
            xs: xs.to_vec(),
            ys: ys.to_vec(),
            second_derivatives,
        })
    }

    /// Node coordinates.
    #[inline]
    pub fn xs(&self) -> &[f64] {
        &self.xs
    }

    /// Node values.
    #[inline]
    pub fn ys(&self) -> &[f64] {
        &self.ys
    }

    /// Number of nodes.
    #[inline]
    pub fn len(&self) -> usize {
        self.xs.len()
    }

    /// Always false; binding requires at least one node.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }

    /// Interpolation scheme.
    #[inline]
    pub fn interpolator(&self) -> CurveInterpolator {
        self.interpolator
    }

    /// Extrapolator below the first node.
    #[inline]
    pub fn left_extrapolator(&self) -> CurveExtrapolator {
        self.left
    }

    /// Extrapolator above the last node.
    #[inline]
    pub fn right_extrapolator(&self) -> CurveExtrapolator {
        self.right
    }

    /// Same nodes and scheme with new values.
    pub fn with_ys(&self, ys: &[f64]) -> Result<Self, InterpolationError> {
        Self::new(self.interpolator, &self.xs, ys, self.left, self.right)
    }

    /// Interpolated or extrapolated value at `x`.
    pub fn value(&self, x: f64) -> f64 {
        evaluate(
            self.interpolator,
            self.left,
            self.right,
            &self.xs,
            &self.ys,
            &self.second_derivatives,
            x,
        )
    }

    /// Sensitivity of `value(x)` to each node value.
    pub fn parameter_sensitivity(&self, x: f64) -> Vec<f64> {
        let n = self.xs.len();
        if self.interpolator.is_linear_in_values() {
            let mut unit = vec![0.0; n];
            (0..n)
                .map(|j| {
                    unit[j] = 1.0;
                    let m = match self.interpolator {
                        CurveInterpolator::NaturalSpline => {
                            natural_spline_second_derivatives(&self.xs, &unit)
                        }
                        _ => Vec::new(),
                    };
                    let w = evaluate(
                        self.interpolator,
                        self.left,
                        self.right,
                        &self.xs,
                        &unit,
                        &m,
                        x,
                    );
                    unit[j] = 0.0;
                    w
                })
                .collect()
        } else {
            let mut bumped = self.ys.clone();
            (0..n)
                .map(|j| {
                    let h = 1e-6 * self.ys[j].abs().max(1e-4);
                    bumped[j] = self.ys[j] + h;
                    let up = self.value_with(&bumped, x);
                    bumped[j] = self.ys[j] - h;
                    let down = self.value_with(&bumped, x);
                    bumped[j] = self.ys[j];
                    (up - down) / (2.0 * h)
                })
                .collect()
        }
    }

    fn value_with(&self, ys: &[f64], x: f64) -> f64 {
        evaluate(self.interpolator, self.left, self.right, &self.xs, ys, &[], x)
    }
}

fn evaluate(
    interpolator: CurveInterpolator,
    left: CurveExtrapolator,
    right: CurveExtrapolator,
    xs: &[f64],
    ys: &[f64],
    m: &[f64],
    x: f64,
) -> f64 {
    let n = xs.len();
    if n == 1 {
        return ys[0];
    }
    if x < xs[0] {
        return match left {
            CurveExtrapolator::Flat => ys[0],
            CurveExtrapolator::Linear => {
                ys[0] + boundary_slope(interpolator, xs, ys, m, true) * (x - xs[0])
            }
        };
    }
    if x > xs[n - 1] {
        return match right {
            CurveExtrapolator::Flat => ys[n - 1],
            CurveExtrapolator::Linear => {
                ys[n - 1] + boundary_slope(interpolator, xs, ys, m, false) * (x - xs[n - 1])
            }
        };
    }
    interpolate_inside(interpolator, xs, ys, m, x)
}

fn find_segment(xs: &[f64], x: f64) -> usize {
    let pos = xs.partition_point(|&xi| xi <= x);
    pos.saturating_sub(1).min(xs.len() - 2)
}

fn interpolate_inside(
    interpolator: CurveInterpolator,
    xs: &[f64],
    ys: &[f64],
    m: &[f64],
    x: f64,
) -> f64 {
    match interpolator {
        CurveInterpolator::Linear => {
            let i = find_segment(xs, x);
            let w = (x - xs[i]) / (xs[i + 1] - xs[i]);
            ys[i] + w * (ys[i + 1] - ys[i])
        }
        CurveInterpolator::StepUpper => {
            let idx = xs.partition_point(|&xi| xi < x).min(xs.len() - 1);
            ys[idx]
        }
        CurveInterpolator::TimeSquare => {
            if x <= 0.0 {
                return ys[0];
            }
            let i = find_segment(xs, x);
            let v0 = xs[i] * ys[i] * ys[i];
            let v1 = xs[i + 1] * ys[i + 1] * ys[i + 1];
            let w = (x - xs[i]) / (xs[i + 1] - xs[i]);
            ((v0 + w * (v1 - v0)) / x).max(0.0).sqrt()
        }
        CurveInterpolator::NaturalSpline => {
            let i = find_segment(xs, x);
            let h = xs[i + 1] - xs[i];
            let a = xs[i + 1] - x;
            let b = x - xs[i];
            m[i] * a * a * a / (6.0 * h)
                + m[i + 1] * b * b * b / (6.0 * h)
                + (ys[i] / h - m[i] * h / 6.0) * a
                + (ys[i + 1] / h - m[i + 1] * h / 6.0) * b
        }
    }
}

fn boundary_slope(
    interpolator: CurveInterpolator,
    xs: &[f64],
    ys: &[f64],
    m: &[f64],
    at_left: bool,
) -> f64 {
    let n = xs.len();
    let (i, x) = if at_left { (0, xs[0]) } else { (n - 2, xs[n - 1]) };
    let h = xs[i + 1] - xs[i];
    match interpolator {
        CurveInterpolator::Linear => (ys[i + 1] - ys[i]) / h,
        CurveInterpolator::StepUpper => 0.0,
        CurveInterpolator::TimeSquare => {
            let v0 = xs[i] * ys[i] * ys[i];
            let v1 = xs[i + 1] * ys[i + 1] * ys[i + 1];
            let slope = (v1 - v0) / h;
            let v = if at_left { v0 } else { v1 };
            let y = if at_left { ys[i] } else { ys[i + 1] };
            if x <= 0.0 || y == 0.0 {
                0.0
            } else {
                (slope * x - v) / (2.0 * y * x * x)
            }
        }
        CurveInterpolator::NaturalSpline => {
            if at_left {
                (ys[1] - ys[0]) / h - h * (2.0 * m[0] + m[1]) / 6.0
            } else {
                (ys[n - 1] - ys[n - 2]) / h + h * (m[n - 2] + 2.0 * m[n - 1]) / 6.0
            }
        }
    }
}

/// Second derivatives of the natural cubic spline through `(xs, ys)`.
fn natural_spline_second_derivatives(xs: &[f64], ys: &[f64]) -> Vec<f64> {
    let n = xs.len();
    let mut m = vec![0.0; n];
    if n < 3 {
        return m;
    }
    let h: Vec<f64> = xs.windows(2).map(|w| w[1] - w[0]).collect();
    let size = n - 2;
    let mut c_prime = vec![0.0; size];
    let mut d_prime = vec![0.0; size];
    for k in 0..size {
        let i = k + 1;
        let sub = h[i - 1];
        let diag = 2.0 * (h[i - 1] + h[i]);
        let sup = h[i];
        let rhs = 6.0 * ((ys[i + 1] - ys[i]) / h[i] - (ys[i] - ys[i - 1]) / h[i - 1]);
        if k == 0 {
            c_prime[k] = sup / diag;
            d_prime[k] = rhs / diag;
        } else {
            let denom = diag - sub * c_prime[k - 1];
            c_prime[k] = sup / denom;
            d_prime[k] = (rhs - sub * d_prime[k - 1]) / denom;
        }
    }
    m[size] = d_prime[size - 1];
    for k in (0..size - 1).rev() {
        m[k + 1] = d_prime[k] - c_prime[k] * m[k + 2];
    }
    m
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    const XS: [f64; 4] = [0.5, 1.0, 2.0, 5.0];
    const YS: [f64; 4] = [0.30, 0.25, 0.22, 0.20];

    fn bind(interp: CurveInterpolator, left: CurveExtrapolator, right: CurveExtrapolator) -> BoundCurveInterpolator {
        interp.bind(&XS, &YS, left, right).unwrap()
    }

    // ===== Construction =====

    #[test]
    fn test_rejects_unsorted_nodes() {
        let err = CurveInterpolator::Linear
            .bind(&[1.0, 1.0], &[0.1, 0.2], CurveExtrapolator::Flat, CurveExtrapolator::Flat)
            .unwrap_err();
        assert_eq!(err, InterpolationError::NonMonotonicData { index: 1 });
    }

    #[test]
    fn test_rejects_empty_and_mismatched() {
        assert!(CurveInterpolator::Linear
            .bind(&[], &[], CurveExtrapolator::Flat, CurveExtrapolator::Flat)
            .is_err());
        assert!(CurveInterpolator::Linear
            .bind(&[1.0], &[0.1, 0.2], CurveExtrapolator::Flat, CurveExtrapolator::Flat)
            .is_err());
    }

    #[test]
    fn test_locality() {
        assert!(CurveInterpolator::Linear.is_local());
        assert!(CurveInterpolator::StepUpper.is_local());
        assert!(CurveInterpolator::TimeSquare.is_local());
        assert!(!CurveInterpolator::NaturalSpline.is_local());
    }

    // ===== Interpolation =====

    #[test]
    fn test_all_schemes_hit_nodes() {
        for interp in [
            CurveInterpolator::Linear,
            CurveInterpolator::StepUpper,
            CurveInterpolator::TimeSquare,
            CurveInterpolator::NaturalSpline,
        ] {
            let curve = bind(interp, CurveExtrapolator::Flat, CurveExtrapolator::Flat);
            for (x, y) in XS.iter().zip(YS.iter()) {
                assert_relative_eq!(curve.value(*x), *y, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_step_upper_takes_upper_node() {
        let curve = bind(CurveInterpolator::StepUpper, CurveExtrapolator::Flat, CurveExtrapolator::Flat);
        assert_relative_eq!(curve.value(0.75), 0.25);
        assert_relative_eq!(curve.value(1.0 + 1e-9), 0.22);
    }

    #[test]
    fn test_time_square_interpolates_variance() {
        let curve = bind(CurveInterpolator::TimeSquare, CurveExtrapolator::Flat, CurveExtrapolator::Flat);
        let x = 1.5;
        let v = 0.5 * (1.0 * 0.25 * 0.25) + 0.5 * (2.0 * 0.22 * 0.22);
        assert_relative_eq!(curve.value(x), (v / x).sqrt(), epsilon = 1e-14);
    }

    #[test]
    fn test_natural_spline_reproduces_line() {
        let ys: Vec<f64> = XS.iter().map(|x| 0.1 + 0.02 * x).collect();
        let curve = CurveInterpolator::NaturalSpline
            .bind(&XS, &ys, CurveExtrapolator::Linear, CurveExtrapolator::Linear)
            .unwrap();
        for x in [0.0, 0.7, 1.3, 3.0, 6.0] {
            assert_relative_eq!(curve.value(x), 0.1 + 0.02 * x, epsilon = 1e-12);
        }
    }

    // ===== Extrapolation =====

    #[test]
    fn test_flat_and_linear_extrapolation() {
        let curve = bind(CurveInterpolator::Linear, CurveExtrapolator::Flat, CurveExtrapolator::Linear);
        assert_relative_eq!(curve.value(0.0), 0.30);
        let slope = (0.20 - 0.22) / 3.0;
        assert_relative_eq!(curve.value(6.0), 0.20 + slope, epsilon = 1e-14);
    }

    #[test]
    fn test_single_node_is_constant() {
        let curve = CurveInterpolator::NaturalSpline
            .bind(&[1.0], &[0.3], CurveExtrapolator::Linear, CurveExtrapolator::Linear)
            .unwrap();
        assert_relative_eq!(curve.value(-1.0), 0.3);
        assert_relative_eq!(curve.value(9.0), 0.3);
        assert_eq!(curve.parameter_sensitivity(4.0), vec![1.0]);
    }

    // ===== Sensitivities =====

    #[test]
    fn test_linear_sensitivity_weights() {
        let curve = bind(CurveInterpolator::Linear, CurveExtrapolator::Flat, CurveExtrapolator::Flat);
        let sens = curve.parameter_sensitivity(1.5);
        assert_relative_eq!(sens[0], 0.0);
        assert_relative_eq!(sens[1], 0.5);
        assert_relative_eq!(sens[2], 0.5);
        assert_relative_eq!(sens[3], 0.0);
    }

    #[test]
    fn test_sensitivity_matches_bump() {
        for interp in [
            CurveInterpolator::Linear,
            CurveInterpolator::TimeSquare,
            CurveInterpolator::NaturalSpline,
        ] {
            let curve = bind(interp, CurveExtrapolator::Flat, CurveExtrapolator::Linear);
            for x in [0.2, 0.8, 1.7, 4.0, 7.0] {
                let sens = curve.parameter_sensitivity(x);
                for j in 0..XS.len() {
                    let mut ys = YS.to_vec();
                    ys[j] += 1e-7;
                    let bumped = interp
                        .bind(&XS, &ys, CurveExtrapolator::Flat, CurveExtrapolator::Linear)
                        .unwrap();
                    let fd = (bumped.value(x) - curve.value(x)) / 1e-7;
                    assert!((fd - sens[j]).abs() < 1e-5, "{:?} x={} j={}", interp, x, j);
                }
            }
        }
    }

    // ===== Property tests =====

    proptest! {
        #[test]
        fn prop_linear_within_node_range(x in 0.5f64..5.0) {
            let curve = bind(CurveInterpolator::Linear, CurveExtrapolator::Flat, CurveExtrapolator::Flat);
            let v = curve.value(x);
            prop_assert!((0.20 - 1e-12..=0.30 + 1e-12).contains(&v));
        }

        #[test]
        fn prop_sensitivities_sum_to_one(x in -1.0f64..8.0) {
            let curve = bind(CurveInterpolator::NaturalSpline, CurveExtrapolator::Flat, CurveExtrapolator::Linear);
            let total: f64 = curve.parameter_sensitivity(x).iter().sum();
            prop_assert!((total - 1.0).abs() < 1e-10);
        }
    }
}
