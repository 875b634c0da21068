//! Ibor index conventions.

use std::fmt;

use super::currency::Currency;
use super::error::DateError;
use super::time::{Date, DayCountConvention, Tenor};

/// A floating-rate index such as `EUR-EURIBOR-6M`.
///
/// The index fixes on the start of its accrual period; fixing lags and
/// business-day adjustment are not modelled.
///
/// ```
/// use capvol_core::types::{Currency, DayCountConvention, IborIndex, Tenor};
///
/// let index = IborIndex::new("USD-LIBOR-3M", Currency::USD, Tenor::from_months(3), DayCountConvention::Act360);
/// assert_eq!(index.tenor().months(), 3);
/// assert_eq!(index.to_string(), "USD-LIBOR-3M");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IborIndex {
    name: String,
    currency: Currency,
    tenor: Tenor,
    day_count: DayCountConvention,
}

impl IborIndex {
    /// Creates an index description.
    pub fn new(
        name: impl Into<String>,
        currency: Currency,
        tenor: Tenor,
        day_count: DayCountConvention,
    ) -> Self {
        Self {
            name: name.into(),
            currency,
            tenor,
            day_count,
        }
    }

    /// Index name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Currency of the index.
    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Tenor of the underlying deposit.
    pub fn tenor(&self) -> Tenor {
        self.tenor
    }

    /// Accrual day count.
    pub fn day_count(&self) -> DayCountConvention {
        self.day_count
    }

    /// Maturity of the deposit fixing on `fixing_date`.
    pub fn maturity(&self, fixing_date: Date) -> Result<Date, DateError> {
        fixing_date.plus_tenor(self.tenor)
    }
}

impl fmt::Display for IborIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_maturity() {
        let index = IborIndex::new(
            "EUR-EURIBOR-6M",
            Currency::EUR,
            Tenor::from_months(6),
            DayCountConvention::Act360,
        );
        let fixing = Date::from_ymd(2024, 8, 31).unwrap();
        assert_eq!(
            index.maturity(fixing).unwrap(),
            Date::from_ymd(2025, 2, 28).unwrap()
        );
    }
}
