//! Calibration configuration.

use capvol_core::math::solvers::LMConfig;
use capvol_models::volatility::CapletVolatilityType;

/// How a price mismatch is turned into a residual.
///
/// # Variants
///
/// - `Absolute`: `(model - market) / error`
/// - `Relative`: `(model - market) / (market × error)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ResidualScale {
    /// Price difference over the quote error.
    #[default]
    Absolute,
    /// Price difference relative to the market price, over the quote error.
    Relative,
}

impl ResidualScale {
    /// Residual of `model` against `market` with quote error `error`.
    #[inline]
    pub fn residual(&self, model: f64, market: f64, error: f64) -> f64 {
        match self {
            ResidualScale::Absolute => (model - market) / error,
            ResidualScale::Relative => (model - market) / (market * error),
        }
    }

    /// Derivative of [`residual`](Self::residual) with respect to `model`.
    #[inline]
    pub fn derivative(&self, market: f64, error: f64) -> f64 {
        match self {
            ResidualScale::Absolute => 1.0 / error,
            ResidualScale::Relative => 1.0 / (market * error),
        }
    }
}

/// Configuration shared by the caplet calibrators.
///
/// # Examples
///
/// ```
/// use capvol_optimiser::calibration::{CalibrationConfig, ResidualScale};
///
/// let config = CalibrationConfig::default();
/// assert_eq!(config.max_iterations, 200);
///
/// let config = CalibrationConfig::builder()
///     .tolerance(1e-12)
///     .residual_scale(ResidualScale::Relative)
///     .build();
/// assert_eq!(config.residual_scale, ResidualScale::Relative);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CalibrationConfig {
    /// Relative objective decrease treated as converged.
    ///
    /// Default: 1e-10
    pub tolerance: f64,

    /// Levenberg-Marquardt step budget per solve.
    ///
    /// Default: 200
    pub max_iterations: usize,

    /// Initial Levenberg-Marquardt damping.
    ///
    /// Default: 1e-3
    pub initial_damping: f64,

    /// Residual definition.
    ///
    /// Default: `ResidualScale::Absolute`
    pub residual_scale: ResidualScale,

    /// Search range for Black node volatilities.
    ///
    /// Default: (1e-4, 5.0)
    pub black_volatility_bounds: (f64, f64),

    /// Search range for normal node volatilities.
    ///
    /// Default: (1e-6, 1.0)
    pub normal_volatility_bounds: (f64, f64),
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-10,
            max_iterations: 200,
            initial_damping: 1e-3,
            residual_scale: ResidualScale::Absolute,
            black_volatility_bounds: (1e-4, 5.0),
            normal_volatility_bounds: (1e-6, 1.0),
        }
    }
}

impl CalibrationConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a configuration builder.
    pub fn builder() -> CalibrationConfigBuilder {
        CalibrationConfigBuilder::new()
    }

    /// Tight tolerance (1e-14), 500 iterations.
    pub fn high_precision() -> Self {
        Self {
            tolerance: 1e-14,
            max_iterations: 500,
            ..Self::default()
        }
    }

    /// Relaxed tolerance (1e-6), 50 iterations.
    pub fn fast() -> Self {
        Self {
            tolerance: 1e-6,
            max_iterations: 50,
            ..Self::default()
        }
    }

    /// Set the convergence tolerance.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Set the iteration budget.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Set the initial damping.
    pub fn with_initial_damping(mut self, initial_damping: f64) -> Self {
        self.initial_damping = initial_damping;
        self
    }

    /// Set the residual definition.
    pub fn with_residual_scale(mut self, residual_scale: ResidualScale) -> Self {
        self.residual_scale = residual_scale;
        self
    }

    /// Set the Black volatility range.
    pub fn with_black_volatility_bounds(mut self, lower: f64, upper: f64) -> Self {
        self.black_volatility_bounds = (lower, upper);
        self
    }

    /// Set the normal volatility range.
    pub fn with_normal_volatility_bounds(mut self, lower: f64, upper: f64) -> Self {
        self.normal_volatility_bounds = (lower, upper);
        self
    }

    /// Volatility range for `volatility_type`.
    pub fn volatility_bounds(&self, volatility_type: CapletVolatilityType) -> (f64, f64) {
        match volatility_type {
            CapletVolatilityType::Black => self.black_volatility_bounds,
            CapletVolatilityType::Normal => self.normal_volatility_bounds,
        }
    }

    /// Solver configuration for the least-squares steps.
    pub fn to_lm_config(&self) -> LMConfig {
        LMConfig {
            initial_lambda: self.initial_damping,
            ..LMConfig::new(self.tolerance, self.max_iterations)
        }
    }
}

/// Builder for [`CalibrationConfig`].
#[derive(Debug, Clone, Default)]
pub struct CalibrationConfigBuilder {
    config: CalibrationConfig,
}

impl CalibrationConfigBuilder {
    /// Builder starting from the defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the convergence tolerance.
    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.config.tolerance = tolerance;
        self
    }

    /// Set the iteration budget.
    pub fn max_iterations(mut self, max_iterations: usize) -> Self {
        self.config.max_iterations = max_iterations;
        self
    }

    /// Set the initial damping.
    pub fn initial_damping(mut self, initial_damping: f64) -> Self {
        self.config.initial_damping = initial_damping;
        self
    }

    /// Set the residual definition.
    pub fn residual_scale(mut self, residual_scale: ResidualScale) -> Self {
        self.config.residual_scale = residual_scale;
        self
    }

    /// Set the Black volatility range.
    pub fn black_volatility_bounds(mut self, lower: f64, upper: f64) -> Self {
        self.config.black_volatility_bounds = (lower, upper);
        self
    }

    /// Set the normal volatility range.
    pub fn normal_volatility_bounds(mut self, lower: f64, upper: f64) -> Self {
        self.config.normal_volatility_bounds = (lower, upper);
        self
    }

    /// Build the configuration.
    pub fn build(self) -> CalibrationConfig {
        self.config
    }
}
