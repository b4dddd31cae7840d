use thiserror::Error;

use super::config::ConfigError;
use crate::core::forcefield::ForceFieldError;
use crate::core::grid::GridError;
use crate::core::io::trajectory::TrajectoryError;
use crate::render::RenderError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Force field error: {0}")]
    Expression(#[from] ForceFieldError),

    #[error(
        "Initial positions unsatisfiable: {unsatisfied} particle(s) still off the target radius after {rounds} rounds"
    )]
    InitializationUnsatisfiable { rounds: usize, unsatisfied: usize },

    #[error("Numerical instability at step {step}: particle {particle} has a non-finite state")]
    NumericalInstability { step: u64, particle: usize },

    #[error("Grid evaluation failed: {0}")]
    Grid(#[from] GridError),

    #[error("Rendering failed: {0}")]
    Render(#[from] RenderError),

    #[error("Trajectory output failed: {0}")]
    Trajectory(#[from] TrajectoryError),

    #[error("Internal logic error: {0}")]
    Internal(String),
}
