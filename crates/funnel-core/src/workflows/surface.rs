use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::core::grid::{Grid, GridBounds};
use crate::engine::error::EngineError;
use crate::render::{ContourLevels, ContourRequest, RenderSink};

pub const DEFAULT_SURFACE_HALF_WIDTH: f64 = 12.0;
pub const DEFAULT_RESOLUTION: usize = 100;
pub const DEFAULT_LEVELS: usize = 8;

/// How the energy surface is drawn underneath trajectories.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SurfacePlot {
    pub bounds: GridBounds,
    pub resolution: usize,
    pub levels: usize,
    pub colorbar: bool,
}

impl Default for SurfacePlot {
    fn default() -> Self {
        Self {
            bounds: GridBounds::symmetric(DEFAULT_SURFACE_HALF_WIDTH),
            resolution: DEFAULT_RESOLUTION,
            levels: DEFAULT_LEVELS,
            colorbar: true,
        }
    }
}

/// Evaluates the in-plane funnel energy on a grid over `bounds` and sends one
/// filled contour with `levels` bands and a colorbar to `sink`.
#[instrument(skip_all, name = "surface_workflow")]
pub fn plot<S>(
    sink: &mut S,
    bounds: GridBounds,
    resolution: usize,
    levels: usize,
) -> Result<Grid, EngineError>
where
    S: RenderSink + ?Sized,
{
    draw(
        sink,
        &SurfacePlot {
            bounds,
            resolution,
            levels,
            colorbar: true,
        },
    )
}

/// Like [`plot`], with every drawing option explicit.
pub fn draw<S>(sink: &mut S, options: &SurfacePlot) -> Result<Grid, EngineError>
where
    S: RenderSink + ?Sized,
{
    let grid = Grid::funnel(options.bounds, options.resolution)?;
    let (lo, hi) = grid.value_range().ok_or_else(|| {
        EngineError::Internal("energy grid has no finite values".to_string())
    })?;
    let levels = ContourLevels::linear(lo, hi, options.levels)?;
    info!(
        nx = grid.xs.len(),
        ny = grid.ys.len(),
        min = lo,
        max = hi,
        "Evaluated energy surface."
    );

    let request = ContourRequest {
        grid,
        levels,
        colorbar: options.colorbar,
    };
    sink.contour_filled(&request)?;
    Ok(request.grid)
}
