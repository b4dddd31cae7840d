use funnelmd::core::forcefield::ForceFieldError;
use funnelmd::core::io::trajectory::TrajectoryError;
use funnelmd::engine::config::ConfigError;
use funnelmd::engine::error::EngineError;
use funnelmd::render::RenderError;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to parse file '{path}': {source}", path = path.display())]
    FileParsing {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid argument: {0}")]
    Argument(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<ForceFieldError> for CliError {
    fn from(e: ForceFieldError) -> Self {
        CliError::Engine(e.into())
    }
}

impl From<RenderError> for CliError {
    fn from(e: RenderError) -> Self {
        CliError::Engine(e.into())
    }
}

impl From<TrajectoryError> for CliError {
    fn from(e: TrajectoryError) -> Self {
        CliError::Engine(e.into())
    }
}
