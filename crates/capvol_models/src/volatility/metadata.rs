//! Parameter metadata attached to calibrated volatility objects.

use std::fmt;

use capvol_core::types::Tenor;

/// Quoting convention of a caplet volatility object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CapletVolatilityType {
    /// Lognormal volatility, shifted when the object carries a shift.
    Black,
    /// Normal (Bachelier) volatility.
    Normal,
}

impl CapletVolatilityType {
    /// Conventional name.
    pub fn name(&self) -> &'static str {
        match self {
            CapletVolatilityType::Black => "BlackVolatility",
            CapletVolatilityType::Normal => "NormalVolatility",
        }
    }
}

impl fmt::Display for CapletVolatilityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Expiry coordinate of a surface node.
///
/// Metadata built from raw quotes carries the quoted tenor; calibrated
/// surfaces carry the year fraction to the node.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NodeExpiry {
    /// Quoted expiry tenor.
    Tenor(Tenor),
    /// Time to expiry in years.
    YearFraction(f64),
}

impl NodeExpiry {
    /// Year fraction, if this is one.
    pub fn year_fraction(&self) -> Option<f64> {
        match self {
            NodeExpiry::YearFraction(t) => Some(*t),
            NodeExpiry::Tenor(_) => None,
        }
    }
}

impl fmt::Display for NodeExpiry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeExpiry::Tenor(tenor) => write!(f, "{}", tenor),
            NodeExpiry::YearFraction(t) => write!(f, "{:?}", t),
        }
    }
}

/// Identity of a surface node: expiry, strike and a readable label.
///
/// Two nodes are the same node when expiry and strike agree.
///
/// ```
/// use capvol_models::volatility::{NodeExpiry, SurfaceNodeMetadata};
/// use capvol_core::types::Tenor;
///
/// let node = SurfaceNodeMetadata::new(NodeExpiry::YearFraction(1.0), 0.02);
/// assert_eq!(node.label(), "[1.0, Strike=0.02]");
///
/// let quoted = SurfaceNodeMetadata::new(NodeExpiry::Tenor(Tenor::from_years(1)), 0.02);
/// assert_eq!(quoted.label(), "[1Y, Strike=0.02]");
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SurfaceNodeMetadata {
    expiry: NodeExpiry,
    strike: f64,
    label: String,
}

impl SurfaceNodeMetadata {
    /// Node with the default label.
    pub fn new(expiry: NodeExpiry, strike: f64) -> Self {
        let label = format!("[{}, Strike={:?}]", expiry, strike);
        Self {
            expiry,
            strike,
            label,
        }
    }

    /// Node with an explicit label.
    pub fn with_label(expiry: NodeExpiry, strike: f64, label: impl Into<String>) -> Self {
        Self {
            expiry,
            strike,
            label: label.into(),
        }
    }

    /// Expiry coordinate.
    #[inline]
    pub fn expiry(&self) -> NodeExpiry {
        self.expiry
    }

    /// Strike coordinate.
    #[inline]
    pub fn strike(&self) -> f64 {
        self.strike
    }

    /// Readable label.
    #[inline]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// True when `other` has the same expiry and strike.
    pub fn same_node(&self, other: &SurfaceNodeMetadata) -> bool {
        self.expiry == other.expiry && self.strike == other.strike
    }
}

/// SABR parameter name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SabrParameterType {
    /// Initial volatility.
    Alpha,
    /// CEV exponent.
    Beta,
    /// Correlation.
    Rho,
    /// Volatility of volatility.
    Nu,
}

impl SabrParameterType {
    /// Lower-case name.
    pub fn name(&self) -> &'static str {
        match self {
            SabrParameterType::Alpha => "alpha",
            SabrParameterType::Beta => "beta",
            SabrParameterType::Rho => "rho",
            SabrParameterType::Nu => "nu",
        }
    }
}

/// Identity of one SABR curve parameter.
///
/// `expiry` is `None` for a constant curve.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SabrNodeMetadata {
    parameter: SabrParameterType,
    expiry: Option<f64>,
    label: String,
}

impl SabrNodeMetadata {
    /// Parameter node with the default label, e.g. `alpha[1.0]`.
    pub fn new(parameter: SabrParameterType, expiry: Option<f64>) -> Self {
        let label = match expiry {
            Some(t) => format!("{}[{:?}]", parameter.name(), t),
            None => parameter.name().to_string(),
        };
        Self {
            parameter,
            expiry,
            label,
        }
    }

    /// Which SABR parameter.
    #[inline]
    pub fn parameter(&self) -> SabrParameterType {
        self.parameter
    }

    /// Node time, if the curve is interpolated.
    #[inline]
    pub fn expiry(&self) -> Option<f64> {
        self.expiry
    }

    /// Readable label.
    #[inline]
    pub fn label(&self) -> &str {
        &self.label
    }
}

/// Metadata of one model parameter, in sensitivity order.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ParameterMetadata {
    /// A node of an interpolated surface.
    SurfaceNode(SurfaceNodeMetadata),
    /// A node of a SABR parameter curve.
    SabrNode(SabrNodeMetadata),
}

impl ParameterMetadata {
    /// Readable label.
    pub fn label(&self) -> &str {
        match self {
            ParameterMetadata::SurfaceNode(m) => m.label(),
            ParameterMetadata::SabrNode(m) => m.label(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surface_node_identity_ignores_label() {
        let a = SurfaceNodeMetadata::new(NodeExpiry::YearFraction(0.5), 0.01);
        let b = SurfaceNodeMetadata::with_label(NodeExpiry::YearFraction(0.5), 0.01, "custom");
        let c = SurfaceNodeMetadata::new(NodeExpiry::YearFraction(0.5), 0.015);
        assert!(a.same_node(&b));
        assert!(!a.same_node(&c));
        assert_ne!(a, b);
    }

    #[test]
    fn test_labels() {
        let node = SurfaceNodeMetadata::new(NodeExpiry::Tenor(Tenor::from_months(18)), 0.025);
        assert_eq!(node.label(), "[18M, Strike=0.025]");
        let sabr = SabrNodeMetadata::new(SabrParameterType::Nu, Some(2.0));
        assert_eq!(sabr.label(), "nu[2.0]");
        let constant = SabrNodeMetadata::new(SabrParameterType::Beta, None);
        assert_eq!(ParameterMetadata::SabrNode(constant).label(), "beta");
    }

    #[test]
    fn test_node_expiry_year_fraction() {
        assert_eq!(NodeExpiry::YearFraction(1.25).year_fraction(), Some(1.25));
        assert_eq!(NodeExpiry::Tenor(Tenor::from_years(2)).year_fraction(), None);
    }

    #[test]
    fn test_volatility_type_display() {
        assert_eq!(CapletVolatilityType::Black.to_string(), "BlackVolatility");
        assert_eq!(CapletVolatilityType::Normal.to_string(), "NormalVolatility");
    }
}
