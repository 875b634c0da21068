//! Cap/floor instruments built from a quote grid.
//!
//! Row `i` of the grid becomes one cap or floor per quoted strike, running
//! from `valuation + index tenor` to `valuation + expiry[i]` in periods of
//! the index tenor. Each instrument is resolved once against the rates
//! provider; calibrators then reprice it under trial volatilities without
//! touching the curves again.

use capvol_core::market_data::RatesProvider;
use capvol_core::types::{Date, DayCountConvention, IborIndex};
use capvol_models::instruments::{CapFloorLeg, CapFloorLegPricer, PutCall, ResolvedCaplet};
use capvol_models::volatility::{CapletVolatilities, CapletVolatilityType, ShiftCurve};
use tracing::{debug, warn};

use crate::data::{volatility_type_of, QuoteType, RawOptionData};
use crate::error::CalibrationError;

/// One quoted cap or floor.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CapQuote {
    pub row: usize,
    pub strike: f64,
    pub put_call: PutCall,
    pub caplets: Vec<ResolvedCaplet>,
    pub market_volatility: f64,
    pub market_price: f64,
    pub error: f64,
    pub par_rate: f64,
}

impl CapQuote {
    /// Present value under `vols`.
    pub fn model_price<V>(&self, vols: &V) -> Result<f64, CalibrationError>
    where
        V: CapletVolatilities + ?Sized,
    {
        let mut pv = 0.0;
        for caplet in &self.caplets {
            pv += caplet.present_value(vols)?;
        }
        Ok(pv)
    }

    /// Sensitivity of [`model_price`](Self::model_price) to every parameter
    /// of `vols`.
    pub fn model_sensitivity<V>(&self, vols: &V) -> Result<Vec<f64>, CalibrationError>
    where
        V: CapletVolatilities + ?Sized,
    {
        let mut total = vec![0.0; vols.parameter_count()];
        for caplet in &self.caplets {
            for (t, s) in total.iter_mut().zip(caplet.present_value_sensitivity(vols)?) {
                *t += s;
            }
        }
        Ok(total)
    }

    /// Time to the last caplet fixing.
    pub fn final_fixing_time(&self) -> f64 {
        self.caplets.iter().map(|c| c.expiry).fold(f64::NEG_INFINITY, f64::max)
    }
}

/// Quotes whose caps share a final fixing time.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ExpiryGroup {
    pub time: f64,
    pub quotes: Vec<CapQuote>,
}

/// Every usable quote of a grid, grouped by final fixing time in
/// increasing order.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct MarketQuotes {
    pub volatility_type: CapletVolatilityType,
    pub groups: Vec<ExpiryGroup>,
}

impl MarketQuotes {
    pub fn quotes(&self) -> impl Iterator<Item = &CapQuote> {
        self.groups.iter().flat_map(|g| g.quotes.iter())
    }

    pub fn len(&self) -> usize {
        self.groups.iter().map(|g| g.quotes.len()).sum()
    }
}

/// Inputs shared by every calibrator.
pub(crate) struct QuoteSource<'a> {
    pub index: &'a IborIndex,
    pub day_count: DayCountConvention,
    pub shift: Option<&'a ShiftCurve>,
}

/// Builds and prices the instruments of `raw`.
///
/// # Errors
///
/// - `UnsupportedValueType` for price quotes or moneyness strikes
/// - `InvalidConfiguration` when `valuation_date` is not the provider's, or
///   a shift is combined with normal quotes
/// - `InsufficientData` when no row yields an instrument with a positive
///   price
pub(crate) fn build_quotes(
    source: &QuoteSource<'_>,
    valuation_date: Date,
    raw: &RawOptionData,
    provider: &dyn RatesProvider,
) -> Result<MarketQuotes, CalibrationError> {
    let volatility_type = volatility_type_of(raw.value_type())?;
    if raw.quote_type() != QuoteType::Strike {
        return Err(CalibrationError::unsupported_value_type(
            "only absolute strike grids can be calibrated",
        ));
    }
    if provider.valuation_date() != valuation_date {
        return Err(CalibrationError::invalid_configuration(format!(
            "valuation date {} differs from rates provider date {}",
            valuation_date,
            provider.valuation_date()
        )));
    }
    if source.shift.is_some() && volatility_type == CapletVolatilityType::Normal {
        return Err(CalibrationError::invalid_configuration(
            "a shift curve requires Black volatility quotes",
        ));
    }

    let pricer = CapFloorLegPricer::new();
    let index = source.index;
    let start = valuation_date
        .plus_tenor(index.tenor())
        .map_err(|e| CalibrationError::data_shape(e.to_string()))?;

    let mut groups: Vec<ExpiryGroup> = Vec::new();
    for (i, &tenor) in raw.expiries().iter().enumerate() {
        let end = valuation_date
            .plus_tenor(tenor)
            .map_err(|e| CalibrationError::data_shape(e.to_string()))?;
        if end <= start {
            warn!(expiry = %tenor, "expiry not beyond the first fixing, row skipped");
            continue;
        }

        let mut row_quotes = Vec::new();
        for (j, volatility) in raw.available_in_row(i) {
            let strike = raw.strikes()[j];
            let leg = CapFloorLeg::builder()
                .index(index.clone())
                .start(start)
                .end(end)
                .strike(strike)
                .build()?;
            let par_rate = pricer.par_rate(&leg, provider)?;
            let put_call = if strike >= par_rate {
                PutCall::Call
            } else {
                PutCall::Put
            };
            let leg = leg.with_put_call(put_call);
            let caplets = pricer.resolve(&leg, provider, source.day_count)?;
            let mut market_price = 0.0;
            for caplet in &caplets {
                let shift = source.shift.map_or(0.0, |s| s.value(caplet.expiry));
                market_price += caplet.present_value_flat(volatility_type, volatility, shift)?;
            }
            if !(market_price.is_finite() && market_price > 0.0) {
                warn!(expiry = %tenor, strike, market_price, "quote has no positive price, skipped");
                continue;
            }
            row_quotes.push(CapQuote {
                row: i,
                strike,
                put_call,
                caplets,
                market_volatility: volatility,
                market_price,
                error: raw.error_or_default(i, j),
                par_rate,
            });
        }
        if row_quotes.is_empty() {
            debug!(expiry = %tenor, "no quotes in row");
            continue;
        }

        let time = row_quotes[0].final_fixing_time();
        match groups.last_mut() {
            Some(last) if last.time == time => last.quotes.extend(row_quotes),
            _ => groups.push(ExpiryGroup {
                time,
                quotes: row_quotes,
            }),
        }
    }

    if groups.is_empty() {
        return Err(CalibrationError::insufficient_data(
            "no cap or floor could be built from the quote grid",
        ));
    }
    Ok(MarketQuotes {
        volatility_type,
        groups,
    })
}
