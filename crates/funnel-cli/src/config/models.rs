use funnelmd::core::forcefield::funnel::FunnelPotential;
use funnelmd::engine::config::EnsembleConfig;
use funnelmd::workflows::sample::SampleOptions;
use std::path::PathBuf;

/// Everything the `run` command needs, fully resolved and validated.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub ensemble: EnsembleConfig,
    pub potential: FunnelPotential,
    pub sample_options: SampleOptions,
    /// `None` when plotting is disabled.
    pub plot: Option<PathBuf>,
    pub trajectory: Option<PathBuf>,
}
