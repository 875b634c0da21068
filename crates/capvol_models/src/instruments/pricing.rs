//! Present value of cap/floor legs.
//!
//! Each caplet is resolved once against the rates provider into an expiry,
//! a forward and an annuity `N × τ × DF(payment)`. Its value is then
//!
//! ```text
//! PV = annuity × price(T, K, F, σ)
//! ```
//!
//! with `price` the undiscounted Black, shifted Black or Bachelier formula.

use capvol_core::market_data::RatesProvider;
use capvol_core::types::DayCountConvention;

use super::capfloor::{CapFloorLeg, PutCall};
use super::error::PricingError;
use crate::analytical::{Bachelier, Black76};
use crate::volatility::{CapletVolatilities, CapletVolatilityType, ShiftCurve};

/// A caplet with its market inputs resolved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedCaplet {
    /// Time to fixing under the volatility day count.
    pub expiry: f64,
    /// Strike rate.
    pub strike: f64,
    /// Forward Ibor rate.
    pub forward: f64,
    /// Notional × accrual × discount factor to payment.
    pub annuity: f64,
    /// Caplet or floorlet.
    pub put_call: PutCall,
}

impl ResolvedCaplet {
    /// Present value under `vols`.
    pub fn present_value<V>(&self, vols: &V) -> Result<f64, PricingError>
    where
        V: CapletVolatilities + ?Sized,
    {
        let sigma = vols.volatility(self.expiry, self.strike, self.forward)?;
        let price = vols.price(self.expiry, self.put_call, self.strike, self.forward, sigma)?;
        Ok(self.annuity * price)
    }

    /// Sensitivity of [`present_value`](Self::present_value) to each model
    /// parameter of `vols`.
    pub fn present_value_sensitivity<V>(&self, vols: &V) -> Result<Vec<f64>, PricingError>
    where
        V: CapletVolatilities + ?Sized,
    {
        let sigma = vols.volatility(self.expiry, self.strike, self.forward)?;
        let vega = vols.price_vega(self.expiry, self.strike, self.forward, sigma)?;
        let scale = self.annuity * vega;
        let sensitivity = vols.parameter_sensitivity(self.expiry, self.strike, self.forward)?;
        Ok(sensitivity.into_iter().map(|s| scale * s).collect())
    }

    /// Present value under a single quoted volatility.
    pub fn present_value_flat(
        &self,
        volatility_type: CapletVolatilityType,
        volatility: f64,
        shift: f64,
    ) -> Result<f64, PricingError> {
        let price = match volatility_type {
            CapletVolatilityType::Black => Black76::shifted(self.forward, volatility, shift)?
                .price(self.strike, self.expiry, self.put_call),
            CapletVolatilityType::Normal => {
                Bachelier::new(self.forward, volatility)?.price(self.strike, self.expiry, self.put_call)
            }
        };
        Ok(self.annuity * price)
    }

    /// Vega of [`present_value_flat`](Self::present_value_flat).
    pub fn vega_flat(
        &self,
        volatility_type: CapletVolatilityType,
        volatility: f64,
        shift: f64,
    ) -> Result<f64, PricingError> {
        let vega = match volatility_type {
            CapletVolatilityType::Black => {
                Black76::shifted(self.forward, volatility, shift)?.vega(self.strike, self.expiry)
            }
            CapletVolatilityType::Normal => {
                Bachelier::new(self.forward, volatility)?.vega(self.strike, self.expiry)
            }
        };
        Ok(self.annuity * vega)
    }
}

/// Prices cap/floor legs off a [`RatesProvider`].
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use capvol_core::market_data::curves::FlatCurve;
/// use capvol_core::market_data::CurveRatesProvider;
/// use capvol_core::types::{Currency, Date, DayCountConvention, IborIndex, Tenor};
/// use capvol_models::instruments::{CapFloorLeg, CapFloorLegPricer};
/// use capvol_models::volatility::CapletVolatilityType;
///
/// let valuation = Date::from_ymd(2024, 1, 15).unwrap();
/// let provider = CurveRatesProvider::new(valuation)
///     .with_discount_curve(Currency::USD, Arc::new(FlatCurve::new(0.03)));
/// let index = IborIndex::new("USD-LIBOR-3M", Currency::USD, Tenor::from_months(3), DayCountConvention::Act360);
/// let leg = CapFloorLeg::builder()
///     .index(index)
///     .start(Date::from_ymd(2024, 4, 15).unwrap())
///     .end(Date::from_ymd(2026, 1, 15).unwrap())
///     .strike(0.03)
///     .build()
///     .unwrap();
///
/// let pricer = CapFloorLegPricer::new();
/// let pv = pricer
///     .present_value_flat(&leg, &provider, DayCountConvention::Act365Fixed, CapletVolatilityType::Black, 0.2, None)
///     .unwrap();
/// assert!(pv > 0.0);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct CapFloorLegPricer;

impl CapFloorLegPricer {
    /// Creates a pricer.
    pub fn new() -> Self {
        Self
    }

    /// Resolves every caplet of `leg`, measuring expiries with `day_count`.
    pub fn resolve(
        &self,
        leg: &CapFloorLeg,
        provider: &dyn RatesProvider,
        day_count: DayCountConvention,
    ) -> Result<Vec<ResolvedCaplet>, PricingError> {
        let valuation = provider.valuation_date();
        let index = leg.index();
        let mut caplets = Vec::with_capacity(leg.len());
        for period in leg.periods() {
            let forward = provider.ibor_rate(index, period.fixing_date())?;
            let df = provider.discount_factor(index.currency(), period.payment_date())?;
            caplets.push(ResolvedCaplet {
                expiry: day_count.year_fraction(valuation, period.fixing_date()),
                strike: period.strike(),
                forward,
                annuity: leg.notional() * period.year_fraction() * df,
                put_call: period.put_call(),
            });
        }
        Ok(caplets)
    }

    /// Par rate of the leg: `Σ τ·DF·F / Σ τ·DF`.
    ///
    /// # Errors
    ///
    /// `PricingError::InvalidInput` for an empty leg.
    pub fn par_rate(
        &self,
        leg: &CapFloorLeg,
        provider: &dyn RatesProvider,
    ) -> Result<f64, PricingError> {
        let index = leg.index();
        let mut annuity = 0.0;
        let mut floating = 0.0;
        for period in leg.periods() {
            let df = provider.discount_factor(index.currency(), period.payment_date())?;
            let forward = provider.ibor_rate(index, period.fixing_date())?;
            annuity += period.year_fraction() * df;
            floating += period.year_fraction() * df * forward;
        }
        if annuity <= 0.0 {
            return Err(PricingError::InvalidInput(
                "par rate of a leg without accrual".to_string(),
            ));
        }
        Ok(floating / annuity)
    }

    /// Present value under a caplet volatility object.
    pub fn present_value<V>(
        &self,
        leg: &CapFloorLeg,
        provider: &dyn RatesProvider,
        vols: &V,
    ) -> Result<f64, PricingError>
    where
        V: CapletVolatilities + ?Sized,
    {
        self.resolve(leg, provider, vols.day_count())?
            .iter()
            .map(|caplet| caplet.present_value(vols))
            .sum()
    }

    /// Sensitivity of the present value to each parameter of `vols`.
    pub fn present_value_sensitivity<V>(
        &self,
        leg: &CapFloorLeg,
        provider: &dyn RatesProvider,
        vols: &V,
    ) -> Result<Vec<f64>, PricingError>
    where
        V: CapletVolatilities + ?Sized,
    {
        let mut total = vec![0.0; vols.parameter_count()];
        for caplet in self.resolve(leg, provider, vols.day_count())? {
            for (t, s) in total.iter_mut().zip(caplet.present_value_sensitivity(vols)?) {
                *t += s;
            }
        }
        Ok(total)
    }

    /// Present value with every caplet at the same quoted volatility.
    ///
    /// `shift` only applies to Black volatilities and is read at each
    /// caplet expiry.
    pub fn present_value_flat(
        &self,
        leg: &CapFloorLeg,
        provider: &dyn RatesProvider,
        day_count: DayCountConvention,
        volatility_type: CapletVolatilityType,
        volatility: f64,
        shift: Option<&ShiftCurve>,
    ) -> Result<f64, PricingError> {
        self.resolve(leg, provider, day_count)?
            .iter()
            .map(|caplet| {
                let s = shift.map_or(0.0, |curve| curve.value(caplet.expiry));
                caplet.present_value_flat(volatility_type, volatility, s)
            })
            .sum()
    }
}
