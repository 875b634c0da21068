//! Interpolated yield curve implementation.

use super::YieldCurve;
use crate::market_data::error::MarketDataError;
use num_traits::Float;

/// Interpolation method for yield curves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CurveInterpolation {
    /// Linear in zero rates.
    Linear,
    /// Linear in log discount factors (piecewise-constant forwards).
    #[default]
    LogLinear,
}

/// Yield curve through zero-rate pillars.
///
/// Outside the pillar range the boundary zero rate is held flat.
///
/// ```
/// use capvol_core::market_data::curves::{CurveInterpolation, InterpolatedCurve, YieldCurve};
///
/// let curve = InterpolatedCurve::new(
///     &[0.5, 1.0, 2.0],
///     &[0.02, 0.025, 0.03],
///     CurveInterpolation::LogLinear,
/// )
/// .unwrap();
/// let df = curve.discount_factor(1.5).unwrap();
/// assert!(df < 1.0 && df > 0.95);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct InterpolatedCurve<T: Float> {
    tenors: Vec<T>,
    rates: Vec<T>,
    method: CurveInterpolation,
}

impl<T: Float> InterpolatedCurve<T> {
    /// Builds a curve from strictly increasing positive pillar times.
    ///
    /// # Errors
    ///
    /// * `MarketDataError::InsufficientData` for fewer than two pillars or
    ///   mismatched lengths
    /// * `MarketDataError::InvalidMaturity` for non-positive or unsorted pillars
    pub fn new(tenors: &[T], rates: &[T], method: CurveInterpolation) -> Result<Self, MarketDataError> {
        if tenors.len() < 2 {
            return Err(MarketDataError::InsufficientData {
                got: tenors.len(),
                need: 2,
            });
        }
        if tenors.len() != rates.len() {
            return Err(MarketDataError::InsufficientData {
                got: rates.len(),
                need: tenors.len(),
            });
        }
        for (i, &t) in tenors.iter().enumerate() {
            if t <= T::zero() || (i > 0 && t <= tenors[i - 1]) {
                return Err(MarketDataError::InvalidMaturity {
                    t: t.to_f64().unwrap_or(0.0),
                });
            }
        }
        Ok(Self {
            tenors: tenors.to_vec(),
            rates: rates.to_vec(),
            method,
        })
    }

    /// Pillar range.
    #[inline]
    pub fn domain(&self) -> (T, T) {
        (self.tenors[0], self.tenors[self.tenors.len() - 1])
    }

    /// Interpolation method.
    #[inline]
    pub fn method(&self) -> CurveInterpolation {
        self.method
    }

    fn interpolate(&self, t: T, values: impl Fn(usize) -> T) -> T {
        let n = self.tenors.len();
        let pos = self.tenors.partition_point(|&x| x <= t);
        let i = pos.saturating_sub(1).min(n - 2);
        let w = (t - self.tenors[i]) / (self.tenors[i + 1] - self.tenors[i]);
        values(i) + w * (values(i + 1) - values(i))
    }
}

impl<T: Float> YieldCurve<T> for InterpolatedCurve<T> {
    fn discount_factor(&self, t: T) -> Result<T, MarketDataError> {
        if t < T::zero() {
            return Err(MarketDataError::InvalidMaturity {
                t: t.to_f64().unwrap_or(0.0),
            });
        }
        if t == T::zero() {
            return Ok(T::one());
        }
        let (t_min, t_max) = self.domain();
        if t <= t_min {
            return Ok((-self.rates[0] * t).exp());
        }
        if t >= t_max {
            return Ok((-self.rates[self.rates.len() - 1] * t).exp());
        }
        match self.method {
            CurveInterpolation::Linear => {
                let rate = self.interpolate(t, |i| self.rates[i]);
                Ok((-rate * t).exp())
            }
            CurveInterpolation::LogLinear => {
                let log_df = self.interpolate(t, |i| -self.rates[i] * self.tenors[i]);
                Ok(log_df.exp())
            }
        }
    }
}
