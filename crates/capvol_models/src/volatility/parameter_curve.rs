//! Term structures of model parameters and shifts.

use capvol_core::math::interpolators::{
    BoundCurveInterpolator, CurveExtrapolator, CurveInterpolator,
};

use super::error::VolatilityError;

/// A parameter as a function of time to expiry.
///
/// ```
/// use capvol_core::math::interpolators::{CurveExtrapolator, CurveInterpolator};
/// use capvol_models::volatility::ParameterCurve;
///
/// let beta = ParameterCurve::constant(0.5);
/// assert_eq!(beta.value(3.0), 0.5);
///
/// let alpha = ParameterCurve::interpolated(
///     &[1.0, 2.0],
///     &[0.02, 0.03],
///     CurveInterpolator::Linear,
///     CurveExtrapolator::Flat,
///     CurveExtrapolator::Flat,
/// )
/// .unwrap();
/// assert!((alpha.value(1.5) - 0.025).abs() < 1e-15);
/// assert_eq!(alpha.value(0.1), 0.02);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterCurve {
    /// Same value at every expiry. Counts as one parameter.
    Constant(f64),
    /// Values at node times, interpolated in between.
    Interpolated(BoundCurveInterpolator),
}

/// Shift applied to forward and strike under a shifted lognormal model.
pub type ShiftCurve = ParameterCurve;

impl ParameterCurve {
    /// Constant curve.
    pub fn constant(value: f64) -> Self {
        ParameterCurve::Constant(value)
    }

    /// Interpolated curve through `(times, values)`.
    ///
    /// # Errors
    ///
    /// `VolatilityError::InvalidParameterCurve` when node times are not
    /// strictly increasing, a node is non-finite, or the slices differ in
    /// length.
    pub fn interpolated(
        times: &[f64],
        values: &[f64],
        interpolator: CurveInterpolator,
        left: CurveExtrapolator,
        right: CurveExtrapolator,
    ) -> Result<Self, VolatilityError> {
        interpolator
            .bind(times, values, left, right)
            .map(ParameterCurve::Interpolated)
            .map_err(|e| VolatilityError::InvalidParameterCurve(e.to_string()))
    }

    /// Value at time `t`.
    pub fn value(&self, t: f64) -> f64 {
        match self {
            ParameterCurve::Constant(v) => *v,
            ParameterCurve::Interpolated(curve) => curve.value(t),
        }
    }

    /// Number of parameters.
    pub fn parameter_count(&self) -> usize {
        match self {
            ParameterCurve::Constant(_) => 1,
            ParameterCurve::Interpolated(curve) => curve.len(),
        }
    }

    /// Parameter values.
    pub fn values(&self) -> &[f64] {
        match self {
            ParameterCurve::Constant(v) => std::slice::from_ref(v),
            ParameterCurve::Interpolated(curve) => curve.ys(),
        }
    }

    /// Node times; empty for a constant curve.
    pub fn node_times(&self) -> &[f64] {
        match self {
            ParameterCurve::Constant(_) => &[],
            ParameterCurve::Interpolated(curve) => curve.xs(),
        }
    }

    /// Sensitivity of `value(t)` to each parameter.
    pub fn parameter_sensitivity(&self, t: f64) -> Vec<f64> {
        match self {
            ParameterCurve::Constant(_) => vec![1.0],
            ParameterCurve::Interpolated(curve) => curve.parameter_sensitivity(t),
        }
    }

    /// Same shape with new parameter values.
    pub fn with_values(&self, values: &[f64]) -> Result<Self, VolatilityError> {
        match self {
            ParameterCurve::Constant(_) => match values {
                [v] if v.is_finite() => Ok(ParameterCurve::Constant(*v)),
                _ => Err(VolatilityError::InvalidParameterCurve(format!(
                    "constant curve takes one finite value, got {:?}",
                    values
                ))),
            },
            ParameterCurve::Interpolated(curve) => curve
                .with_ys(values)
                .map(ParameterCurve::Interpolated)
                .map_err(|e| VolatilityError::InvalidParameterCurve(e.to_string())),
        }
    }

    /// True when every parameter lies in `[lower, upper]`.
    pub fn values_within(&self, lower: f64, upper: f64) -> bool {
        self.values().iter().all(|v| (lower..=upper).contains(v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn linear_curve() -> ParameterCurve {
        ParameterCurve::interpolated(
            &[0.5, 1.0, 2.0],
            &[0.1, 0.2, 0.4],
            CurveInterpolator::Linear,
            CurveExtrapolator::Flat,
            CurveExtrapolator::Flat,
        )
        .unwrap()
    }

    // ===== Construction =====

    #[test]
    fn test_rejects_unsorted_times() {
        let err = ParameterCurve::interpolated(
            &[1.0, 1.0],
            &[0.1, 0.2],
            CurveInterpolator::Linear,
            CurveExtrapolator::Flat,
            CurveExtrapolator::Flat,
        )
        .unwrap_err();
        assert!(matches!(err, VolatilityError::InvalidParameterCurve(_)));
    }

    #[test]
    fn test_rejects_non_finite_value() {
        assert!(ParameterCurve::interpolated(
            &[1.0, 2.0],
            &[0.1, f64::NAN],
            CurveInterpolator::Linear,
            CurveExtrapolator::Flat,
            CurveExtrapolator::Flat,
        )
        .is_err());
    }

    // ===== Evaluation =====

    #[test]
    fn test_constant_curve() {
        let curve = ParameterCurve::constant(0.7);
        assert_eq!(curve.parameter_count(), 1);
        assert_eq!(curve.values(), &[0.7]);
        assert!(curve.node_times().is_empty());
        assert_eq!(curve.parameter_sensitivity(4.0), vec![1.0]);
    }

    #[test]
    fn test_interpolated_sensitivity() {
        let curve = linear_curve();
        let sens = curve.parameter_sensitivity(1.5);
        assert_relative_eq!(sens[0], 0.0);
        assert_relative_eq!(sens[1], 0.5, epsilon = 1e-15);
        assert_relative_eq!(sens[2], 0.5, epsilon = 1e-15);
    }

    #[test]
    fn test_with_values() {
        let curve = linear_curve().with_values(&[0.3, 0.3, 0.3]).unwrap();
        assert_relative_eq!(curve.value(1.7), 0.3, epsilon = 1e-15);
        assert!(linear_curve().with_values(&[0.3]).is_err());
        assert!(ParameterCurve::constant(0.1).with_values(&[0.2, 0.3]).is_err());
    }

    #[test]
    fn test_values_within() {
        assert!(linear_curve().values_within(0.0, 1.0));
        assert!(!linear_curve().values_within(0.15, 1.0));
    }
}
