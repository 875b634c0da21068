//! Caplet volatilities interpolated on an (expiry, strike) node grid.

use capvol_core::math::interpolators::{BoundGridSurface, GridSurfaceInterpolator};
use capvol_core::types::{Date, DayCountConvention, IborIndex};

use super::context::VolatilityContext;
use super::error::VolatilityError;
use super::metadata::{CapletVolatilityType, NodeExpiry, ParameterMetadata, SurfaceNodeMetadata};
use super::parameter_curve::ShiftCurve;
use super::traits::CapletVolatilities;

/// Caplet volatilities read off an interpolated surface.
///
/// Expiry is the first surface coordinate and strike the second. Node
/// values are the model parameters, in the order of the node metadata.
///
/// # Examples
///
/// ```
/// use capvol_core::math::interpolators::{CurveInterpolator, GridSurfaceInterpolator};
/// use capvol_core::types::{Currency, Date, DayCountConvention, IborIndex, Tenor};
/// use capvol_models::volatility::{
///     CapletVolatilities, CapletVolatilityType, NodeExpiry, SurfaceCapletVolatilities,
///     SurfaceNodeMetadata, VolatilityContext,
/// };
///
/// let index = IborIndex::new("EUR-EURIBOR-3M", Currency::EUR, Tenor::from_months(3), DayCountConvention::Act360);
/// let context = VolatilityContext::new(
///     "EUR-CAPLET",
///     index,
///     Date::from_ymd(2024, 1, 15).unwrap(),
///     DayCountConvention::Act365Fixed,
/// );
/// let nodes = vec![
///     SurfaceNodeMetadata::new(NodeExpiry::YearFraction(1.0), 0.02),
///     SurfaceNodeMetadata::new(NodeExpiry::YearFraction(2.0), 0.02),
/// ];
/// let vols = SurfaceCapletVolatilities::new(
///     context,
///     CapletVolatilityType::Black,
///     GridSurfaceInterpolator::new(CurveInterpolator::Linear, CurveInterpolator::Linear),
///     nodes,
///     vec![0.20, 0.30],
/// )
/// .unwrap();
/// assert!((vols.volatility(1.5, 0.02, 0.0).unwrap() - 0.25).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceCapletVolatilities {
    context: VolatilityContext,
    volatility_type: CapletVolatilityType,
    surface: BoundGridSurface,
    nodes: Vec<SurfaceNodeMetadata>,
    values: Vec<f64>,
    metadata: Vec<ParameterMetadata>,
    shift: Option<ShiftCurve>,
}

impl SurfaceCapletVolatilities {
    /// Binds `values` at `nodes` with the given interpolation scheme.
    ///
    /// # Errors
    ///
    /// `VolatilityError::InvalidNodes` when node and value counts differ, a
    /// node expiry is not a year fraction, or two nodes coincide.
    pub fn new(
        context: VolatilityContext,
        volatility_type: CapletVolatilityType,
        interpolator: GridSurfaceInterpolator,
        nodes: Vec<SurfaceNodeMetadata>,
        values: Vec<f64>,
    ) -> Result<Self, VolatilityError> {
        if nodes.len() != values.len() {
            return Err(VolatilityError::InvalidNodes(format!(
                "{} nodes but {} values",
                nodes.len(),
                values.len()
            )));
        }
        let mut times = Vec::with_capacity(nodes.len());
        for node in &nodes {
            match node.expiry() {
                NodeExpiry::YearFraction(t) => times.push(t),
                NodeExpiry::Tenor(tenor) => {
                    return Err(VolatilityError::InvalidNodes(format!(
                        "node {} has tenor expiry {}, expected a year fraction",
                        node.label(),
                        tenor
                    )))
                }
            }
        }
        let strikes: Vec<f64> = nodes.iter().map(|n| n.strike()).collect();
        let surface = interpolator
            .bind(&times, &strikes, &values)
            .map_err(|e| VolatilityError::InvalidNodes(e.to_string()))?;
        let metadata = nodes
            .iter()
            .cloned()
            .map(ParameterMetadata::SurfaceNode)
            .collect();
        Ok(Self {
            context,
            volatility_type,
            surface,
            nodes,
            values,
            metadata,
            shift: None,
        })
    }

    /// Adds a shift curve to a Black surface.
    ///
    /// # Errors
    ///
    /// `VolatilityError::InvalidParameterCurve` for a normal surface.
    pub fn with_shift(mut self, shift: ShiftCurve) -> Result<Self, VolatilityError> {
        if self.volatility_type != CapletVolatilityType::Black {
            return Err(VolatilityError::InvalidParameterCurve(
                "shift curve requires a Black surface".to_string(),
            ));
        }
        self.shift = Some(shift);
        Ok(self)
    }

    /// Same nodes and scheme with new node values.
    pub fn with_values(&self, values: Vec<f64>) -> Result<Self, VolatilityError> {
        let rebuilt = Self::new(
            self.context.clone(),
            self.volatility_type,
            *self.surface.scheme(),
            self.nodes.clone(),
            values,
        )?;
        Ok(Self {
            shift: self.shift.clone(),
            ..rebuilt
        })
    }

    /// Node values, in node order.
    pub fn node_values(&self) -> &[f64] {
        &self.values
    }

    /// Node identities.
    pub fn nodes(&self) -> &[SurfaceNodeMetadata] {
        &self.nodes
    }

    /// Interpolation scheme.
    pub fn interpolator(&self) -> GridSurfaceInterpolator {
        *self.surface.scheme()
    }

    /// Shift curve, if any.
    pub fn shift_curve(&self) -> Option<&ShiftCurve> {
        self.shift.as_ref()
    }
}

impl CapletVolatilities for SurfaceCapletVolatilities {
    fn name(&self) -> &str {
        self.context.name()
    }

    fn index(&self) -> &IborIndex {
        self.context.index()
    }

    fn valuation_date(&self) -> Date {
        self.context.valuation_date()
    }

    fn day_count(&self) -> DayCountConvention {
        self.context.day_count()
    }

    fn volatility_type(&self) -> CapletVolatilityType {
        self.volatility_type
    }

    fn volatility(&self, expiry: f64, strike: f64, _forward: f64) -> Result<f64, VolatilityError> {
        Ok(self.surface.value(expiry, strike)?)
    }

    fn parameter_sensitivity(
        &self,
        expiry: f64,
        strike: f64,
        _forward: f64,
    ) -> Result<Vec<f64>, VolatilityError> {
        Ok(self.surface.parameter_sensitivity(expiry, strike)?)
    }

    fn parameter_metadata(&self) -> &[ParameterMetadata] {
        &self.metadata
    }

    fn shift(&self, expiry: f64) -> f64 {
        self.shift.as_ref().map_or(0.0, |s| s.value(expiry))
    }
}
