//! # Render Module
//!
//! The rendering-sink capability. Workflows describe what to draw as plain
//! requests (a filled contour of a [`Grid`], scatter layers of particle
//! positions) and hand them to an explicit [`RenderSink`]; there is no global
//! "current figure". The in-memory [`Figure`] records requests in order and
//! is what file renderers wrap.

pub mod figure;
pub mod levels;

pub use figure::{Figure, Layer};
pub use levels::ContourLevels;

use std::path::PathBuf;

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::grid::Grid;
use crate::core::models::snapshot::Snapshot;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Invalid render request: {0}")]
    InvalidRequest(String),

    #[error("Figure already flushed")]
    Flushed,

    #[error("I/O error writing '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Rendering backend failed: {0}")]
    Backend(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContourRequest {
    pub grid: Grid,
    pub levels: ContourLevels,
    pub colorbar: bool,
}

impl ContourRequest {
    pub fn validate(&self) -> Result<(), RenderError> {
        let expected = (self.grid.ys.len(), self.grid.xs.len());
        if self.grid.values.dim() != expected {
            return Err(RenderError::InvalidRequest(format!(
                "grid values {:?} do not match axes {:?}",
                self.grid.values.dim(),
                expected
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct MarkerStyle {
    /// Marker radius in pixels.
    pub size: f64,
    pub alpha: f64,
    /// Fixed RGB colour; `None` lets the sink pick one per layer.
    pub color: Option<[u8; 3]>,
}

impl Default for MarkerStyle {
    fn default() -> Self {
        Self {
            size: 3.0,
            alpha: 0.8,
            color: None,
        }
    }
}

/// One scatter layer: `points` is `(N, 2)` with columns x, y.
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterRequest {
    pub sample: usize,
    pub points: Array2<f64>,
    pub style: MarkerStyle,
}

impl ScatterRequest {
    pub fn from_snapshot(snapshot: &Snapshot, style: MarkerStyle) -> Self {
        Self {
            sample: snapshot.sample,
            points: snapshot.xy.clone(),
            style,
        }
    }

    pub fn validate(&self) -> Result<(), RenderError> {
        if self.points.ncols() != 2 {
            return Err(RenderError::InvalidRequest(format!(
                "scatter points must have 2 columns, got {}",
                self.points.ncols()
            )));
        }
        if !(0.0..=1.0).contains(&self.style.alpha) || !(self.style.size > 0.0) {
            return Err(RenderError::InvalidRequest(format!(
                "invalid marker style {:?}",
                self.style
            )));
        }
        Ok(())
    }
}

/// A rendering target. Calls arrive in drawing order.
///
/// `present` renders everything drawn so far and keeps the sink open for
/// more layers. `flush` renders and finalizes: once it succeeds, every
/// later request fails with [`RenderError::Flushed`].
pub trait RenderSink {
    fn contour_filled(&mut self, request: &ContourRequest) -> Result<(), RenderError>;

    fn scatter(&mut self, request: &ScatterRequest) -> Result<(), RenderError>;

    fn present(&mut self) -> Result<(), RenderError> {
        Ok(())
    }

    fn flush(&mut self) -> Result<(), RenderError>;
}
