use funnelmd::render::MarkerStyle;
use funnelmd::workflows::surface::{DEFAULT_LEVELS, DEFAULT_RESOLUTION, DEFAULT_SURFACE_HALF_WIDTH};
use std::path::PathBuf;

/// Output defaults of the CLI. Ensemble defaults live in the library's
/// `EnsembleConfig`.
pub struct DefaultsConfig {
    pub plot: PathBuf,
    pub surface_half_width: f64,
    pub resolution: usize,
    pub levels: usize,
    pub marker: MarkerStyle,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            plot: PathBuf::from("funnel.svg"),
            surface_half_width: DEFAULT_SURFACE_HALF_WIDTH,
            resolution: DEFAULT_RESOLUTION,
            levels: DEFAULT_LEVELS,
            marker: MarkerStyle::default(),
        }
    }
}
