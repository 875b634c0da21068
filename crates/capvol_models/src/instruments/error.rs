//! Pricing error types.

use capvol_core::market_data::MarketDataError;
use thiserror::Error;

use crate::schedules::ScheduleError;
use crate::volatility::VolatilityError;

/// Errors raised while building or pricing cap/floor legs.
///
/// # Examples
/// ```
/// use capvol_models::instruments::PricingError;
///
/// let err = PricingError::InvalidInput("notional must be finite".to_string());
/// assert_eq!(format!("{}", err), "Invalid input: notional must be finite");
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PricingError {
    /// Invalid instrument or pricing input.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Numerical breakdown in a pricing formula.
    #[error("Numerical instability: {0}")]
    NumericalInstability(String),

    /// Discount factor or forward unavailable.
    #[error("Market data error: {0}")]
    MarketData(#[from] MarketDataError),

    /// Volatility lookup failed.
    #[error("Volatility error: {0}")]
    Volatility(#[from] VolatilityError),

    /// Accrual schedule cannot be built.
    #[error("Schedule error: {0}")]
    Schedule(#[from] ScheduleError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytical::AnalyticalError;

    #[test]
    fn test_from_analytical_error() {
        let err: PricingError = AnalyticalError::InvalidVolatility { volatility: -0.1 }.into();
        assert!(matches!(err, PricingError::InvalidInput(_)));
        let err: PricingError = AnalyticalError::NumericalInstability {
            message: "overflow".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "Numerical instability: overflow");
    }

    #[test]
    fn test_from_market_data_error() {
        let err: PricingError = MarketDataError::MissingCurve {
            name: "EUR".to_string(),
        }
        .into();
        assert!(matches!(err, PricingError::MarketData(_)));
    }
}
