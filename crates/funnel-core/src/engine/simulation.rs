use nalgebra::{Point3, Vector3};
use ndarray::Array2;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, trace};

use super::config::{EnsembleConfig, validate};
use super::error::EngineError;
use super::initialization::{RingPlacement, maxwell_boltzmann_velocities, sample_ring_positions};
use super::integrator::{self, Integrator};
use super::state::{State, positions_of};
use crate::core::forcefield::ForceField;
use crate::core::forcefield::custom::CustomExternalForce;
use crate::core::forcefield::funnel::FunnelPotential;
use crate::core::models::particle::Particle;
use crate::core::units::BOLTZMANN;

/// Assembles a [`Simulation`] from a configuration and a force field.
///
/// Building validates the configuration and compiles the force field; the
/// particles start at the origin at rest until initial conditions are set.
pub struct SimulationBuilder<'a> {
    config: EnsembleConfig,
    force_field: Option<&'a dyn ForceField>,
    integrator: Option<Box<dyn Integrator>>,
    parameters: Vec<f64>,
}

impl<'a> SimulationBuilder<'a> {
    pub fn new(config: EnsembleConfig) -> Self {
        Self {
            config,
            force_field: None,
            integrator: None,
            parameters: Vec::new(),
        }
    }

    pub fn force_field(mut self, force_field: &'a dyn ForceField) -> Self {
        self.force_field = Some(force_field);
        self
    }

    /// Overrides the integrator chosen by the configuration.
    pub fn integrator(mut self, integrator: Box<dyn Integrator>) -> Self {
        self.integrator = Some(integrator);
        self
    }

    /// Per-particle parameter values, shared by every particle.
    pub fn parameters(mut self, values: Vec<f64>) -> Self {
        self.parameters = values;
        self
    }

    pub fn build(self) -> Result<Simulation, EngineError> {
        validate(&self.config)?;

        let force = match self.force_field {
            Some(ff) => CustomExternalForce::new(ff)?,
            None => CustomExternalForce::new(&FunnelPotential::new())?,
        };
        let particles: Vec<Particle> = (0..self.config.particle_count)
            .map(|i| {
                Particle::new(i, self.config.mass, Point3::origin())
                    .with_parameters(self.parameters.clone())
            })
            .collect();
        force.validate_particles(&particles)?;

        let integrator = self
            .integrator
            .unwrap_or_else(|| integrator::from_config(&self.config));
        let rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        debug!(
            particles = particles.len(),
            integrator = integrator.name(),
            force = force.name(),
            seeded = self.config.seed.is_some(),
            "Simulation built."
        );

        let mut simulation = Simulation {
            forces: vec![Vector3::zeros(); particles.len()],
            particles,
            force,
            integrator,
            rng,
            step: 0,
            time_ps: 0.0,
            config: self.config,
        };
        simulation.refresh_forces();
        Ok(simulation)
    }
}

/// The simulation context: exclusively owns the particles, the compiled
/// force, the integrator and the random stream.
pub struct Simulation {
    config: EnsembleConfig,
    particles: Vec<Particle>,
    forces: Vec<Vector3<f64>>,
    force: CustomExternalForce,
    integrator: Box<dyn Integrator>,
    rng: StdRng,
    step: u64,
    time_ps: f64,
}

impl Simulation {
    pub fn builder<'a>(config: EnsembleConfig) -> SimulationBuilder<'a> {
        SimulationBuilder::new(config)
    }

    pub fn config(&self) -> &EnsembleConfig {
        &self.config
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    pub fn force(&self) -> &CustomExternalForce {
        &self.force
    }

    pub fn integrator_name(&self) -> &'static str {
        self.integrator.name()
    }

    pub fn current_step(&self) -> u64 {
        self.step
    }

    pub fn time_ps(&self) -> f64 {
        self.time_ps
    }

    fn refresh_forces(&mut self) {
        self.force.compute_forces(&self.particles, &mut self.forces);
    }

    /// Replaces all positions; `positions.len()` must equal the particle count.
    pub fn set_positions(&mut self, positions: &[Point3<f64>]) -> Result<(), EngineError> {
        if positions.len() != self.particles.len() {
            return Err(EngineError::Internal(format!(
                "expected {} positions, got {}",
                self.particles.len(),
                positions.len()
            )));
        }
        for (particle, &position) in self.particles.iter_mut().zip(positions) {
            particle.position = position;
        }
        self.refresh_forces();
        Ok(())
    }

    pub fn set_velocities(&mut self, velocities: &[Vector3<f64>]) -> Result<(), EngineError> {
        if velocities.len() != self.particles.len() {
            return Err(EngineError::Internal(format!(
                "expected {} velocities, got {}",
                self.particles.len(),
                velocities.len()
            )));
        }
        for (particle, &velocity) in self.particles.iter_mut().zip(velocities) {
            particle.velocity = velocity;
        }
        Ok(())
    }

    /// Draws Maxwell-Boltzmann velocities at `temperature` from the
    /// simulation's random stream.
    pub fn set_velocities_to_temperature(&mut self, temperature: f64) {
        let masses: Vec<f64> = self.particles.iter().map(|p| p.mass).collect();
        let velocities = maxwell_boltzmann_velocities(&masses, temperature, &mut self.rng);
        for (particle, velocity) in self.particles.iter_mut().zip(velocities) {
            particle.velocity = velocity;
        }
    }

    /// Places every particle on the configured ring and thermalizes the
    /// velocities at the configured temperature.
    pub fn initialize(&mut self) -> Result<(), EngineError> {
        let placement = RingPlacement::from_config(&self.config);
        let positions = sample_ring_positions(self.particles.len(), &placement, &mut self.rng)?;
        self.set_positions(&positions)?;
        self.set_velocities_to_temperature(self.config.temperature);
        self.check_finite()
    }

    /// Advances the ensemble by `steps` integrator steps.
    ///
    /// Stops at the first step that leaves any particle with a non-finite
    /// position, velocity or force.
    pub fn step(&mut self, steps: u64) -> Result<(), EngineError> {
        let dt = self.integrator.timestep();
        for _ in 0..steps {
            self.integrator.step(
                &mut self.particles,
                &mut self.forces,
                &self.force,
                &mut self.rng,
            );
            self.step += 1;
            self.time_ps = self.step as f64 * dt;
            self.check_finite()?;
        }
        trace!(step = self.step, "Advanced simulation.");
        Ok(())
    }

    fn check_finite(&self) -> Result<(), EngineError> {
        let bad = self
            .particles
            .iter()
            .zip(&self.forces)
            .find(|(p, f)| !p.is_finite() || !f.iter().all(|c| c.is_finite()));
        match bad {
            Some((p, _)) => Err(EngineError::NumericalInstability {
                step: self.step,
                particle: p.index,
            }),
            None => Ok(()),
        }
    }

    /// Positions as an `(N, 3)` array in nm.
    pub fn positions(&self) -> Array2<f64> {
        positions_of(&self.particles)
    }

    pub fn potential_energy(&self) -> f64 {
        self.force.total_energy(&self.particles)
    }

    pub fn kinetic_energy(&self) -> f64 {
        self.particles.iter().map(Particle::kinetic_energy).sum()
    }

    /// Instantaneous kinetic temperature over `3N` degrees of freedom.
    pub fn temperature(&self) -> f64 {
        if self.particles.is_empty() {
            return 0.0;
        }
        2.0 * self.kinetic_energy() / (3.0 * self.particles.len() as f64 * BOLTZMANN)
    }

    pub fn state(&self) -> State {
        State::capture(&self.particles, self.step, self.time_ps, self.potential_energy())
    }
}
