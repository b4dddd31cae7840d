use std::iter::FusedIterator;

use tracing::{debug, info};

use super::error::EngineError;
use super::simulation::Simulation;
use crate::core::models::snapshot::Snapshot;

/// Lifecycle of a sampling run. A built [`Simulation`] is `Ready`; initial
/// conditions move it to `Running`; it ends `Done` or `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Ready,
    Running,
    Done,
    Failed,
}

impl RunState {
    pub fn is_terminal(self) -> bool {
        matches!(self, RunState::Done | RunState::Failed)
    }
}

/// Lazily advances a simulation and yields one [`Snapshot`] every
/// `steps_per_sample` steps, `num_samples` times.
///
/// The first call to `next` assigns initial conditions unless
/// [`Sampler::initialize`] already did. After the last snapshot or the first
/// error the iterator only returns `None`.
pub struct Sampler {
    simulation: Simulation,
    steps_per_sample: u64,
    num_samples: usize,
    emitted: usize,
    state: RunState,
}

impl Sampler {
    /// Samples with the simulation's own `steps_per_sample` and `num_samples`.
    pub fn new(simulation: Simulation) -> Self {
        let steps_per_sample = simulation.config().steps_per_sample;
        let num_samples = simulation.config().num_samples;
        Self {
            simulation,
            steps_per_sample,
            num_samples,
            emitted: 0,
            state: RunState::Ready,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    pub fn into_simulation(self) -> Simulation {
        self.simulation
    }

    pub fn samples_emitted(&self) -> usize {
        self.emitted
    }

    pub fn steps_per_sample(&self) -> u64 {
        self.steps_per_sample
    }

    pub fn num_samples(&self) -> usize {
        self.num_samples
    }

    /// Assigns initial positions and velocities. Only valid in `Ready`.
    pub fn initialize(&mut self) -> Result<(), EngineError> {
        if self.state != RunState::Ready {
            return Err(EngineError::Internal(format!(
                "cannot initialize a sampler in state {:?}",
                self.state
            )));
        }
        match self.simulation.initialize() {
            Ok(()) => {
                self.state = RunState::Running;
                info!(
                    particles = self.simulation.particle_count(),
                    temperature = self.simulation.temperature(),
                    "Initial conditions assigned."
                );
                Ok(())
            }
            Err(e) => {
                self.state = RunState::Failed;
                Err(e)
            }
        }
    }

    fn advance(&mut self) -> Result<Snapshot, EngineError> {
        self.simulation.step(self.steps_per_sample)?;
        let snapshot = Snapshot::from_particles(
            self.emitted,
            self.simulation.current_step(),
            self.simulation.time_ps(),
            self.simulation.particles(),
        );
        debug!(
            sample = snapshot.sample,
            step = snapshot.step,
            "Recorded snapshot."
        );
        Ok(snapshot)
    }
}

impl Iterator for Sampler {
    type Item = Result<Snapshot, EngineError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.state == RunState::Ready {
            if let Err(e) = self.initialize() {
                return Some(Err(e));
            }
        }
        if self.state != RunState::Running {
            return None;
        }

        match self.advance() {
            Ok(snapshot) => {
                self.emitted += 1;
                if self.emitted == self.num_samples {
                    self.state = RunState::Done;
                }
                Some(Ok(snapshot))
            }
            Err(e) => {
                self.state = RunState::Failed;
                Some(Err(e))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.state {
            RunState::Done | RunState::Failed => (0, Some(0)),
            _ => (0, Some(self.num_samples - self.emitted)),
        }
    }
}

impl FusedIterator for Sampler {}
