use crate::core::forcefield::funnel::FunnelPotential;
use ndarray::{Array, Array1, Array2, ArrayBase, Data, Dimension, Zip};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum GridError {
    #[error("Grid resolution must be at least 2, got {0}")]
    Resolution(usize),

    #[error("Invalid grid bounds: [{min_x}, {max_x}] x [{min_y}, {max_y}]")]
    Bounds {
        min_x: f64,
        max_x: f64,
        min_y: f64,
        max_y: f64,
    },

    #[error("Coordinate arrays have incompatible shapes {x:?} and {y:?}")]
    ShapeMismatch { x: Vec<usize>, y: Vec<usize> },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct GridBounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl GridBounds {
    pub fn new(min_x: f64, max_x: f64, min_y: f64, max_y: f64) -> Self {
        Self {
            min_x,
            max_x,
            min_y,
            max_y,
        }
    }

    /// Square bounds `[-half_width, half_width]²`.
    pub fn symmetric(half_width: f64) -> Self {
        Self::new(-half_width, half_width, -half_width, half_width)
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn validate(&self) -> Result<(), GridError> {
        let finite = [self.min_x, self.max_x, self.min_y, self.max_y]
            .iter()
            .all(|v| v.is_finite());
        if !finite || self.width() <= 0.0 || self.height() <= 0.0 {
            return Err(GridError::Bounds {
                min_x: self.min_x,
                max_x: self.max_x,
                min_y: self.min_y,
                max_y: self.max_y,
            });
        }
        Ok(())
    }

    /// Grid spacing for `resolution`: the longer side is split into
    /// `resolution` equal steps and the same step is used on both axes.
    pub fn step(&self, resolution: usize) -> f64 {
        self.width().max(self.height()) / resolution as f64
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }
}

/// Half-open axis samples `min, min + step, ...` strictly below `max`.
fn axis(min: f64, max: f64, step: f64) -> Array1<f64> {
    // Shave a relative epsilon so an exact multiple of `step` does not gain a sample.
    let count = (((max - min) / step) * (1.0 - 1e-12)).ceil().max(1.0) as usize;
    Array1::from_shape_fn(count, |i| min + i as f64 * step)
}

/// A scalar field sampled on a regular mesh.
///
/// `values[[j, i]]` is the field at `(xs[i], ys[j])`, so rows run along y.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    pub bounds: GridBounds,
    pub step: f64,
    pub xs: Array1<f64>,
    pub ys: Array1<f64>,
    pub values: Array2<f64>,
}

impl Grid {
    pub fn evaluate<F>(bounds: GridBounds, resolution: usize, field: F) -> Result<Self, GridError>
    where
        F: Fn(f64, f64) -> f64,
    {
        if resolution < 2 {
            return Err(GridError::Resolution(resolution));
        }
        bounds.validate()?;

        let step = bounds.step(resolution);
        let xs = axis(bounds.min_x, bounds.max_x, step);
        let ys = axis(bounds.min_y, bounds.max_y, step);
        let values = Array2::from_shape_fn((ys.len(), xs.len()), |(j, i)| field(xs[i], ys[j]));

        Ok(Self {
            bounds,
            step,
            xs,
            ys,
            values,
        })
    }

    /// Samples the in-plane funnel energy.
    pub fn funnel(bounds: GridBounds, resolution: usize) -> Result<Self, GridError> {
        Self::evaluate(bounds, resolution, FunnelPotential::potential)
    }

    pub fn shape(&self) -> (usize, usize) {
        self.values.dim()
    }

    /// Smallest and largest finite values, or `None` if there are none.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.values
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    pub fn is_finite(&self) -> bool {
        self.values.iter().all(|v| v.is_finite())
    }
}

/// Elementwise in-plane funnel energy over coordinate arrays.
///
/// `x` and `y` must have the same shape, or one of them must broadcast to the
/// other's shape (for instance a single row against a full mesh).
pub fn potential_array<S1, S2, D>(
    x: &ArrayBase<S1, D>,
    y: &ArrayBase<S2, D>,
) -> Result<Array<f64, D>, GridError>
where
    S1: Data<Elem = f64>,
    S2: Data<Elem = f64>,
    D: Dimension,
{
    let field = |&x: &f64, &y: &f64| FunnelPotential::potential(x, y);
    if x.shape() == y.shape() {
        return Ok(Zip::from(x).and(y).map_collect(field));
    }
    if let Some(yb) = y.broadcast(x.raw_dim()) {
        return Ok(Zip::from(x).and(&yb).map_collect(field));
    }
    if let Some(xb) = x.broadcast(y.raw_dim()) {
        return Ok(Zip::from(&xb).and(y).map_collect(field));
    }
    Err(GridError::ShapeMismatch {
        x: x.shape().to_vec(),
        y: y.shape().to_vec(),
    })
}

/// Coordinate matrices for `xs` × `ys`, both shaped `(ys.len(), xs.len())`.
pub fn meshgrid(xs: &Array1<f64>, ys: &Array1<f64>) -> (Array2<f64>, Array2<f64>) {
    let shape = (ys.len(), xs.len());
    (
        Array2::from_shape_fn(shape, |(_, i)| xs[i]),
        Array2::from_shape_fn(shape, |(j, _)| ys[j]),
    )
}
