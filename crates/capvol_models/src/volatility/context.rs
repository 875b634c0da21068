//! Identity shared by every caplet volatility object.

use capvol_core::types::{Date, DayCountConvention, IborIndex};

/// Name, index, valuation date and day count of a volatility object.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VolatilityContext {
    name: String,
    index: IborIndex,
    valuation_date: Date,
    day_count: DayCountConvention,
}

impl VolatilityContext {
    /// Creates a context.
    pub fn new(
        name: impl Into<String>,
        index: IborIndex,
        valuation_date: Date,
        day_count: DayCountConvention,
    ) -> Self {
        Self {
            name: name.into(),
            index,
            valuation_date,
            day_count,
        }
    }

    /// Object name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Ibor index.
    pub fn index(&self) -> &IborIndex {
        &self.index
    }

    /// Valuation date.
    pub fn valuation_date(&self) -> Date {
        self.valuation_date
    }

    /// Expiry day count.
    pub fn day_count(&self) -> DayCountConvention {
        self.day_count
    }
}
