//! Raw cap/floor quote grids.

use std::fmt;

use capvol_core::types::Tenor;

use crate::error::CalibrationError;

/// What the quoted numbers are.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ValueType {
    /// Lognormal (or shifted lognormal) cap volatility.
    BlackVolatility,
    /// Normal cap volatility.
    NormalVolatility,
    /// Cap premium.
    Price,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::BlackVolatility => write!(f, "BlackVolatility"),
            ValueType::NormalVolatility => write!(f, "NormalVolatility"),
            ValueType::Price => write!(f, "Price"),
        }
    }
}

/// How the strike axis is expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum QuoteType {
    /// Absolute strike rates.
    #[default]
    Strike,
    /// Strikes relative to the at-the-money rate.
    Moneyness,
}

/// A validated grid of cap quotes: rows are cap expiries, columns strikes.
///
/// Non-finite cells mean "no quote" and are skipped by
/// [`available_data`](Self::available_data).
///
/// # Examples
///
/// ```
/// use capvol_core::types::Tenor;
/// use capvol_optimiser::data::{QuoteType, RawOptionData, ValueType};
///
/// let data = RawOptionData::of(
///     vec![Tenor::from_years(1), Tenor::from_years(2)],
///     vec![0.01, 0.02],
///     QuoteType::Strike,
///     vec![vec![0.25, f64::NAN], vec![0.22, 0.20]],
///     ValueType::BlackVolatility,
/// )
/// .unwrap();
///
/// assert_eq!(data.available_data().count(), 3);
/// assert_eq!(data.error_or_default(0, 0), 1.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RawOptionData {
    expiries: Vec<Tenor>,
    strikes: Vec<f64>,
    quote_type: QuoteType,
    data: Vec<Vec<f64>>,
    errors: Option<Vec<Vec<f64>>>,
    value_type: ValueType,
}

impl RawOptionData {
    /// Grid without quote errors.
    ///
    /// # Errors
    ///
    /// `CalibrationError::DataShape` when the matrix is not
    /// `expiries × strikes`, or an axis is empty or not strictly increasing.
    pub fn of(
        expiries: Vec<Tenor>,
        strikes: Vec<f64>,
        quote_type: QuoteType,
        data: Vec<Vec<f64>>,
        value_type: ValueType,
    ) -> Result<Self, CalibrationError> {
        validate_axes(&expiries, &strikes)?;
        validate_shape("data", &data, expiries.len(), strikes.len())?;
        Ok(Self {
            expiries,
            strikes,
            quote_type,
            data,
            errors: None,
            value_type,
        })
    }

    /// Grid with one error per cell.
    ///
    /// # Errors
    ///
    /// As [`of`](Self::of), and `CalibrationError::DataShape` when the error
    /// matrix differs in shape or holds a non-positive or non-finite entry.
    pub fn of_with_errors(
        expiries: Vec<Tenor>,
        strikes: Vec<f64>,
        quote_type: QuoteType,
        data: Vec<Vec<f64>>,
        value_type: ValueType,
        errors: Vec<Vec<f64>>,
    ) -> Result<Self, CalibrationError> {
        let mut raw = Self::of(expiries, strikes, quote_type, data, value_type)?;
        validate_shape("errors", &errors, raw.expiries.len(), raw.strikes.len())?;
        for (i, row) in errors.iter().enumerate() {
            for (j, &e) in row.iter().enumerate() {
                if !e.is_finite() || e <= 0.0 {
                    return Err(CalibrationError::data_shape(format!(
                        "error at ({}, {}) must be positive, got {}",
                        i, j, e
                    )));
                }
            }
        }
        raw.errors = Some(errors);
        Ok(raw)
    }

    /// Cap expiries.
    pub fn expiries(&self) -> &[Tenor] {
        &self.expiries
    }

    /// Strikes.
    pub fn strikes(&self) -> &[f64] {
        &self.strikes
    }

    /// Strike convention.
    pub fn quote_type(&self) -> QuoteType {
        self.quote_type
    }

    /// Quote convention.
    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    /// Quote matrix.
    pub fn data(&self) -> &[Vec<f64>] {
        &self.data
    }

    /// Error matrix, if supplied.
    pub fn errors(&self) -> Option<&[Vec<f64>]> {
        self.errors.as_deref()
    }

    /// Quote at `(i, j)`, possibly non-finite.
    pub fn value(&self, i: usize, j: usize) -> f64 {
        self.data[i][j]
    }

    /// Error at `(i, j)`, or 1.0 without an error matrix.
    pub fn error_or_default(&self, i: usize, j: usize) -> f64 {
        self.errors.as_ref().map_or(1.0, |e| e[i][j])
    }

    /// Finite quotes as `(i, j, value)` in row-major order.
    pub fn available_data(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        self.data.iter().enumerate().flat_map(|(i, row)| {
            row.iter()
                .enumerate()
                .filter(|(_, v)| v.is_finite())
                .map(move |(j, &v)| (i, j, v))
        })
    }

    /// Finite quotes in row `i` as `(j, value)`.
    pub fn available_in_row(&self, i: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.data[i]
            .iter()
            .enumerate()
            .filter(|(_, v)| v.is_finite())
            .map(|(j, &v)| (j, v))
    }
}

fn validate_axes(expiries: &[Tenor], strikes: &[f64]) -> Result<(), CalibrationError> {
    if expiries.is_empty() {
        return Err(CalibrationError::data_shape("no expiries"));
    }
    if strikes.is_empty() {
        return Err(CalibrationError::data_shape("no strikes"));
    }
    if expiries.windows(2).any(|w| w[0] >= w[1]) {
        return Err(CalibrationError::data_shape(
            "expiries must be strictly increasing",
        ));
    }
    if strikes.iter().any(|k| !k.is_finite()) {
        return Err(CalibrationError::data_shape("strikes must be finite"));
    }
    if strikes.windows(2).any(|w| w[0] >= w[1]) {
        return Err(CalibrationError::data_shape(
            "strikes must be strictly increasing",
        ));
    }
    Ok(())
}

fn validate_shape(
    what: &str,
    matrix: &[Vec<f64>],
    rows: usize,
    columns: usize,
) -> Result<(), CalibrationError> {
    if matrix.len() != rows {
        return Err(CalibrationError::data_shape(format!(
            "{} has {} rows, expected {}",
            what,
            matrix.len(),
            rows
        )));
    }
    if let Some((i, row)) = matrix.iter().enumerate().find(|(_, r)| r.len() != columns) {
        return Err(CalibrationError::data_shape(format!(
            "{} row {} has {} columns, expected {}",
            what,
            i,
            row.len(),
            columns
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expiries() -> Vec<Tenor> {
        vec![Tenor::from_years(1), Tenor::from_years(2)]
    }

    fn grid() -> Vec<Vec<f64>> {
        vec![vec![0.3, 0.25, f64::NAN], vec![f64::INFINITY, 0.22, 0.21]]
    }

    fn raw() -> RawOptionData {
        RawOptionData::of(
            expiries(),
            vec![0.01, 0.02, 0.03],
            QuoteType::Strike,
            grid(),
            ValueType::BlackVolatility,
        )
        .unwrap()
    }

    // ========================================
    // Validation Tests
    // ========================================

    #[test]
    fn test_row_count_mismatch() {
        let err = RawOptionData::of(
            vec![Tenor::from_years(1)],
            vec![0.01, 0.02, 0.03],
            QuoteType::Strike,
            grid(),
            ValueType::BlackVolatility,
        )
        .unwrap_err();
        assert!(matches!(err, CalibrationError::DataShape(_)));
    }

    #[test]
    fn test_column_count_mismatch() {
        assert!(RawOptionData::of(
            expiries(),
            vec![0.01, 0.02],
            QuoteType::Strike,
            grid(),
            ValueType::BlackVolatility,
        )
        .is_err());
    }

    #[test]
    fn test_unsorted_axes() {
        assert!(RawOptionData::of(
            vec![Tenor::from_years(2), Tenor::from_years(1)],
            vec![0.01, 0.02, 0.03],
            QuoteType::Strike,
            grid(),
            ValueType::BlackVolatility,
        )
        .is_err());
        assert!(RawOptionData::of(
            expiries(),
            vec![0.01, 0.03, 0.02],
            QuoteType::Strike,
            grid(),
            ValueType::BlackVolatility,
        )
        .is_err());
    }

    #[test]
    fn test_non_positive_error_rejected() {
        for bad in [0.0, -1.0, f64::NAN] {
            let err = RawOptionData::of_with_errors(
                expiries(),
                vec![0.01, 0.02, 0.03],
                QuoteType::Strike,
                grid(),
                ValueType::BlackVolatility,
                vec![vec![1.0, 1.0, 1.0], vec![1.0, bad, 1.0]],
            )
            .unwrap_err();
            assert!(matches!(err, CalibrationError::DataShape(_)));
        }
    }

    #[test]
    fn test_error_shape_mismatch() {
        assert!(RawOptionData::of_with_errors(
            expiries(),
            vec![0.01, 0.02, 0.03],
            QuoteType::Strike,
            grid(),
            ValueType::BlackVolatility,
            vec![vec![1.0, 1.0, 1.0]],
        )
        .is_err());
    }

    // ========================================
    // Access Tests
    // ========================================

    #[test]
    fn test_available_data_skips_non_finite() {
        let cells: Vec<(usize, usize)> = raw().available_data().map(|(i, j, _)| (i, j)).collect();
        assert_eq!(cells, vec![(0, 0), (0, 1), (1, 1), (1, 2)]);
        let row: Vec<usize> = raw().available_in_row(1).map(|(j, _)| j).collect();
        assert_eq!(row, vec![1, 2]);
    }

    #[test]
    fn test_error_or_default() {
        assert_eq!(raw().error_or_default(1, 2), 1.0);
        assert!(raw().errors().is_none());
        let with_errors = RawOptionData::of_with_errors(
            expiries(),
            vec![0.01, 0.02, 0.03],
            QuoteType::Strike,
            grid(),
            ValueType::NormalVolatility,
            vec![vec![0.5, 0.5, 0.5], vec![0.5, 2.0, 0.5]],
        )
        .unwrap();
        assert_eq!(with_errors.error_or_default(1, 1), 2.0);
        assert_eq!(with_errors.value_type(), ValueType::NormalVolatility);
    }
}
