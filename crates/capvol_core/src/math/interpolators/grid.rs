//! Two-dimensional interpolation over nodes lying on (possibly sparse) grid
//! columns.
//!
//! Nodes are grouped by their `x` coordinate. Each group forms a column
//! curve in `y`; a query first evaluates every column at `y` and then
//! interpolates the column values along `x`. Columns may carry different
//! sets of `y` values, which is how sparse market grids are represented.

use super::curve::{BoundCurveInterpolator, CurveExtrapolator, CurveInterpolator};
use crate::types::InterpolationError;

/// Interpolation scheme for a surface: one curve scheme per axis, each with
/// its own extrapolators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridSurfaceInterpolator {
    x_interpolator: CurveInterpolator,
    x_left: CurveExtrapolator,
    x_right: CurveExtrapolator,
    y_interpolator: CurveInterpolator,
    y_left: CurveExtrapolator,
    y_right: CurveExtrapolator,
}

impl GridSurfaceInterpolator {
    /// Scheme with flat extrapolation on every side.
    pub fn new(x_interpolator: CurveInterpolator, y_interpolator: CurveInterpolator) -> Self {
        Self::with_extrapolators(
            x_interpolator,
            CurveExtrapolator::Flat,
            CurveExtrapolator::Flat,
            y_interpolator,
            CurveExtrapolator::Flat,
            CurveExtrapolator::Flat,
        )
    }

    /// Scheme with explicit extrapolators.
    pub fn with_extrapolators(
        x_interpolator: CurveInterpolator,
        x_left: CurveExtrapolator,
        x_right: CurveExtrapolator,
        y_interpolator: CurveInterpolator,
        y_left: CurveExtrapolator,
        y_right: CurveExtrapolator,
    ) -> Self {
        Self {
            x_interpolator,
            x_left,
            x_right,
            y_interpolator,
            y_left,
            y_right,
        }
    }

    /// Interpolator along `x`.
    pub fn x_interpolator(&self) -> CurveInterpolator {
        self.x_interpolator
    }

    /// Left extrapolator along `x`.
    pub fn x_left_extrapolator(&self) -> CurveExtrapolator {
        self.x_left
    }

    /// Right extrapolator along `x`.
    pub fn x_right_extrapolator(&self) -> CurveExtrapolator {
        self.x_right
    }

    /// Interpolator along `y`.
    pub fn y_interpolator(&self) -> CurveInterpolator {
        self.y_interpolator
    }

    /// Left extrapolator along `y`.
    pub fn y_left_extrapolator(&self) -> CurveExtrapolator {
        self.y_left
    }

    /// Right extrapolator along `y`.
    pub fn y_right_extrapolator(&self) -> CurveExtrapolator {
        self.y_right
    }

    /// Binds the scheme to node data given as parallel slices.
    ///
    /// Nodes may be supplied in any order; sensitivities are reported in
    /// the order supplied. Duplicate `(x, y)` pairs are rejected.
    pub fn bind(
        &self,
        xs: &[f64],
        ys: &[f64],
        zs: &[f64],
    ) -> Result<BoundGridSurface, InterpolationError> {
        if xs.is_empty() {
            return Err(InterpolationError::InsufficientData { got: 0, need: 1 });
        }
        if xs.len() != ys.len() || xs.len() != zs.len() {
            return Err(InterpolationError::InvalidInput(format!(
                "node slices differ in length: {}, {}, {}",
                xs.len(),
                ys.len(),
                zs.len()
            )));
        }
        if xs.iter().chain(ys).any(|v| !v.is_finite()) {
            return Err(InterpolationError::InvalidInput(
                "non-finite node coordinate".to_string(),
            ));
        }

        let mut order: Vec<usize> = (0..xs.len()).collect();
        order.sort_by(|&a, &b| {
            xs[a]
                .total_cmp(&xs[b])
                .then_with(|| ys[a].total_cmp(&ys[b]))
        });

        let mut columns: Vec<GridColumn> = Vec::new();
        let mut start = 0;
        while start < order.len() {
            let x = xs[order[start]];
            let end = start + order[start..].iter().take_while(|&&k| xs[k] == x).count();
            let members: Vec<usize> = order[start..end].to_vec();
            let column_ys: Vec<f64> = members.iter().map(|&k| ys[k]).collect();
            let column_zs: Vec<f64> = members.iter().map(|&k| zs[k]).collect();
            if column_ys.windows(2).any(|w| w[0] == w[1]) {
                return Err(InterpolationError::InvalidInput(format!(
                    "duplicate node in column x = {}",
                    x
                )));
            }
            let curve =
                self.y_interpolator
                    .bind(&column_ys, &column_zs, self.y_left, self.y_right)?;
            columns.push(GridColumn {
                x,
                curve,
                node_indices: members,
            });
            start = end;
        }

        Ok(BoundGridSurface {
            scheme: *self,
            columns,
            node_count: xs.len(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
struct GridColumn {
    x: f64,
    curve: BoundCurveInterpolator,
    node_indices: Vec<usize>,
}

/// Node data bound to a [`GridSurfaceInterpolator`].
#[derive(Debug, Clone, PartialEq)]
pub struct BoundGridSurface {
    scheme: GridSurfaceInterpolator,
    columns: Vec<GridColumn>,
    node_count: usize,
}

impl BoundGridSurface {
    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// Distinct `x` coordinates, ascending.
    pub fn column_xs(&self) -> Vec<f64> {
        self.columns.iter().map(|c| c.x).collect()
    }

    /// Interpolation scheme.
    pub fn scheme(&self) -> &GridSurfaceInterpolator {
        &self.scheme
    }

    /// Surface value at `(x, y)`.
    pub fn value(&self, x: f64, y: f64) -> Result<f64, InterpolationError> {
        let column_values: Vec<f64> = self.columns.iter().map(|c| c.curve.value(y)).collect();
        let across = self.across(&column_values)?;
        Ok(across.value(x))
    }

    /// Sensitivity of `value(x, y)` to every node, in binding order.
    pub fn parameter_sensitivity(&self, x: f64, y: f64) -> Result<Vec<f64>, InterpolationError> {
        let column_values: Vec<f64> = self.columns.iter().map(|c| c.curve.value(y)).collect();
        let across = self.across(&column_values)?;
        let column_weights = across.parameter_sensitivity(x);

        let mut sensitivity = vec![0.0; self.node_count];
        for (column, weight) in self.columns.iter().zip(column_weights) {
            if weight == 0.0 {
                continue;
            }
            let inner = column.curve.parameter_sensitivity(y);
            for (&node, w) in column.node_indices.iter().zip(inner) {
                sensitivity[node] += weight * w;
            }
        }
        Ok(sensitivity)
    }

    fn across(&self, column_values: &[f64]) -> Result<BoundCurveInterpolator, InterpolationError> {
        let column_xs = self.column_xs();
        self.scheme.x_interpolator.bind(
            &column_xs,
            column_values,
            self.scheme.x_left,
            self.scheme.x_right,
        )
    }
}
