//! Rates provider: discount factors and Ibor forwards by date.

use std::collections::HashMap;
use std::sync::Arc;

use super::curves::YieldCurve;
use super::error::MarketDataError;
use crate::types::{Currency, Date, DayCountConvention, IborIndex};

/// Shared handle to a yield curve.
pub type SharedCurve = Arc<dyn YieldCurve<f64> + Send + Sync>;

/// Source of discount factors and forward Ibor rates at a valuation date.
///
/// Calibration reads the market exclusively through this trait.
pub trait RatesProvider: Send + Sync {
    /// Valuation date.
    fn valuation_date(&self) -> Date;

    /// Discount factor in `currency` from the valuation date to `date`.
    fn discount_factor(&self, currency: Currency, date: Date) -> Result<f64, MarketDataError>;

    /// Forward rate of `index` fixing on `fixing_date`.
    fn ibor_rate(&self, index: &IborIndex, fixing_date: Date) -> Result<f64, MarketDataError>;
}

/// [`RatesProvider`] backed by time-indexed yield curves.
///
/// Curve time is measured ACT/365F from the valuation date. Forward rates
/// come from the index's own curve when one is registered, otherwise from the
/// discount curve of the index currency.
///
/// ```
/// use std::sync::Arc;
/// use capvol_core::market_data::curves::FlatCurve;
/// use capvol_core::market_data::{CurveRatesProvider, RatesProvider};
/// use capvol_core::types::{Currency, Date};
///
/// let valuation = Date::from_ymd(2024, 1, 15).unwrap();
/// let provider = CurveRatesProvider::new(valuation)
///     .with_discount_curve(Currency::EUR, Arc::new(FlatCurve::new(0.02)));
/// let df = provider
///     .discount_factor(Currency::EUR, Date::from_ymd(2025, 1, 15).unwrap())
///     .unwrap();
/// assert!(df < 1.0);
/// ```
#[derive(Clone)]
pub struct CurveRatesProvider {
    valuation_date: Date,
    discount_curves: HashMap<Currency, SharedCurve>,
    forward_curves: HashMap<IborIndex, SharedCurve>,
}

impl CurveRatesProvider {
    /// Empty provider at `valuation_date`.
    pub fn new(valuation_date: Date) -> Self {
        Self {
            valuation_date,
            discount_curves: HashMap::new(),
            forward_curves: HashMap::new(),
        }
    }

    /// Registers the discount curve for `currency`.
    pub fn with_discount_curve(mut self, currency: Currency, curve: SharedCurve) -> Self {
        self.discount_curves.insert(currency, curve);
        self
    }

    /// Registers the forward curve for `index`.
    pub fn with_forward_curve(mut self, index: IborIndex, curve: SharedCurve) -> Self {
        self.forward_curves.insert(index, curve);
        self
    }

    fn curve_time(&self, date: Date) -> f64 {
        DayCountConvention::Act365Fixed.year_fraction(self.valuation_date, date)
    }

    fn discount_curve(&self, currency: Currency) -> Result<&SharedCurve, MarketDataError> {
        self.discount_curves
            .get(&currency)
            .ok_or_else(|| MarketDataError::MissingCurve {
                name: currency.code().to_string(),
            })
    }

    fn forward_curve(&self, index: &IborIndex) -> Result<&SharedCurve, MarketDataError> {
        match self.forward_curves.get(index) {
            Some(curve) => Ok(curve),
            None => self
                .discount_curve(index.currency())
                .map_err(|_| MarketDataError::MissingCurve {
                    name: index.name().to_string(),
                }),
        }
    }
}

impl std::fmt::Debug for CurveRatesProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CurveRatesProvider")
            .field("valuation_date", &self.valuation_date)
            .field("discount_curves", &self.discount_curves.keys().collect::<Vec<_>>())
            .field("forward_curves", &self.forward_curves.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl RatesProvider for CurveRatesProvider {
    fn valuation_date(&self) -> Date {
        self.valuation_date
    }

    fn discount_factor(&self, currency: Currency, date: Date) -> Result<f64, MarketDataError> {
        let curve = self.discount_curve(currency)?;
        curve.discount_factor(self.curve_time(date))
    }

    fn ibor_rate(&self, index: &IborIndex, fixing_date: Date) -> Result<f64, MarketDataError> {
        let curve = self.forward_curve(index)?;
        let end = index.maturity(fixing_date)?;
        let accrual = index.day_count().year_fraction(fixing_date, end);
        if accrual <= 0.0 {
            return Err(MarketDataError::InvalidMaturity { t: accrual });
        }
        let df_start = curve.discount_factor(self.curve_time(fixing_date))?;
        let df_end = curve.discount_factor(self.curve_time(end))?;
        Ok((df_start / df_end - 1.0) / accrual)
    }
}
