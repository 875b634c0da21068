//! Surface metadata built from raw quote grids.

use capvol_models::volatility::{CapletVolatilityType, NodeExpiry, SurfaceNodeMetadata};

use super::raw_option_data::{RawOptionData, ValueType};
use crate::error::CalibrationError;

/// Shape of the surface a grid calibrates: name, volatility type and one
/// node per quoted cell in row-major order.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SurfaceMetadata {
    name: String,
    volatility_type: CapletVolatilityType,
    nodes: Vec<SurfaceNodeMetadata>,
}

impl SurfaceMetadata {
    /// Surface name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Volatility type of the calibrated surface.
    pub fn volatility_type(&self) -> CapletVolatilityType {
        self.volatility_type
    }

    /// Node metadata, one per quoted cell.
    pub fn nodes(&self) -> &[SurfaceNodeMetadata] {
        &self.nodes
    }
}

/// Maps a quote value type onto the caplet volatility type it calibrates.
///
/// # Errors
///
/// `CalibrationError::UnsupportedValueType` for anything but Black or
/// normal volatilities.
pub fn volatility_type_of(value_type: ValueType) -> Result<CapletVolatilityType, CalibrationError> {
    match value_type {
        ValueType::BlackVolatility => Ok(CapletVolatilityType::Black),
        ValueType::NormalVolatility => Ok(CapletVolatilityType::Normal),
        other => Err(CalibrationError::unsupported_value_type(format!(
            "cannot calibrate caplet volatilities to {} quotes",
            other
        ))),
    }
}

/// Builds the metadata of surface `name` from `raw`.
///
/// ```
/// use capvol_core::types::Tenor;
/// use capvol_optimiser::data::{create_metadata, QuoteType, RawOptionData, ValueType};
///
/// let raw = RawOptionData::of(
///     vec![Tenor::from_years(1)],
///     vec![0.01, 0.02],
///     QuoteType::Strike,
///     vec![vec![0.3, 0.25]],
///     ValueType::BlackVolatility,
/// )
/// .unwrap();
/// let metadata = create_metadata("EUR-CAPLET", &raw).unwrap();
/// assert_eq!(metadata.nodes()[1].label(), "[1Y, Strike=0.02]");
/// ```
pub fn create_metadata(name: &str, raw: &RawOptionData) -> Result<SurfaceMetadata, CalibrationError> {
    let volatility_type = volatility_type_of(raw.value_type())?;
    let nodes = raw
        .available_data()
        .map(|(i, j, _)| {
            SurfaceNodeMetadata::new(NodeExpiry::Tenor(raw.expiries()[i]), raw.strikes()[j])
        })
        .collect();
    Ok(SurfaceMetadata {
        name: name.to_string(),
        volatility_type,
        nodes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::QuoteType;
    use capvol_core::types::Tenor;

    fn raw(value_type: ValueType) -> RawOptionData {
        RawOptionData::of(
            vec![Tenor::from_years(1), Tenor::from_years(2)],
            vec![0.01, 0.02],
            QuoteType::Strike,
            vec![vec![f64::NAN, 0.25], vec![0.22, 0.20]],
            value_type,
        )
        .unwrap()
    }

    #[test]
    fn test_nodes_in_row_major_order() {
        let metadata = create_metadata("CAP", &raw(ValueType::NormalVolatility)).unwrap();
        assert_eq!(metadata.name(), "CAP");
        assert_eq!(metadata.volatility_type(), CapletVolatilityType::Normal);
        let labels: Vec<&str> = metadata.nodes().iter().map(|n| n.label()).collect();
        assert_eq!(
            labels,
            vec!["[1Y, Strike=0.02]", "[2Y, Strike=0.01]", "[2Y, Strike=0.02]"]
        );
    }

    #[test]
    fn test_price_quotes_unsupported() {
        let err = create_metadata("CAP", &raw(ValueType::Price)).unwrap_err();
        assert!(matches!(err, CalibrationError::UnsupportedValueType(_)));
    }
}
