use nalgebra::Vector3;
use rand::Rng;
use rand::rngs::StdRng;
use rand_distr::StandardNormal;

use super::config::{EnsembleConfig, IntegratorKind};
use crate::core::forcefield::custom::CustomExternalForce;
use crate::core::models::particle::Particle;
use crate::core::units::thermal_energy;

/// Advances an ensemble of independent particles by one timestep.
///
/// On entry `forces` holds the forces at the current positions; on return it
/// holds the forces at the new positions. Stochastic integrators draw all of
/// their noise from `rng`, so a seeded generator reproduces a run exactly.
pub trait Integrator: Send {
    fn name(&self) -> &'static str;

    /// Timestep in ps.
    fn timestep(&self) -> f64;

    fn step(
        &mut self,
        particles: &mut [Particle],
        forces: &mut [Vector3<f64>],
        force: &CustomExternalForce,
        rng: &mut StdRng,
    );
}

#[inline]
fn gaussian_vector(rng: &mut StdRng) -> Vector3<f64> {
    Vector3::new(
        rng.sample(StandardNormal),
        rng.sample(StandardNormal),
        rng.sample(StandardNormal),
    )
}

/// Langevin dynamics with the "middle" splitting: velocity kick, half drift,
/// Ornstein-Uhlenbeck velocity update, half drift, force recomputation.
#[derive(Debug, Clone, PartialEq)]
pub struct LangevinIntegrator {
    temperature: f64,
    friction: f64,
    timestep: f64,
    kt: f64,
    decay: f64,
}

impl LangevinIntegrator {
    pub fn new(temperature: f64, friction: f64, timestep: f64) -> Self {
        Self {
            temperature,
            friction,
            timestep,
            kt: thermal_energy(temperature),
            decay: (-friction * timestep).exp(),
        }
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    pub fn friction(&self) -> f64 {
        self.friction
    }
}

impl Integrator for LangevinIntegrator {
    fn name(&self) -> &'static str {
        "langevin"
    }

    fn timestep(&self) -> f64 {
        self.timestep
    }

    fn step(
        &mut self,
        particles: &mut [Particle],
        forces: &mut [Vector3<f64>],
        force: &CustomExternalForce,
        rng: &mut StdRng,
    ) {
        let dt = self.timestep;
        let noise_scale = (1.0 - self.decay * self.decay).sqrt();
        for (p, f) in particles.iter_mut().zip(forces.iter()) {
            p.velocity += f * (dt / p.mass);
            p.position += p.velocity * (0.5 * dt);
            let sigma = (self.kt / p.mass).sqrt();
            p.velocity = p.velocity * self.decay + gaussian_vector(rng) * (sigma * noise_scale);
            p.position += p.velocity * (0.5 * dt);
        }
        force.compute_forces(particles, forces);
    }
}

/// Overdamped Langevin (Brownian) dynamics. Velocities are set to the
/// displacement over the step so kinetic readbacks stay meaningful.
#[derive(Debug, Clone, PartialEq)]
pub struct BrownianIntegrator {
    temperature: f64,
    friction: f64,
    timestep: f64,
    kt: f64,
}

impl BrownianIntegrator {
    pub fn new(temperature: f64, friction: f64, timestep: f64) -> Self {
        Self {
            temperature,
            friction,
            timestep,
            kt: thermal_energy(temperature),
        }
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    pub fn friction(&self) -> f64 {
        self.friction
    }
}

impl Integrator for BrownianIntegrator {
    fn name(&self) -> &'static str {
        "brownian"
    }

    fn timestep(&self) -> f64 {
        self.timestep
    }

    fn step(
        &mut self,
        particles: &mut [Particle],
        forces: &mut [Vector3<f64>],
        force: &CustomExternalForce,
        rng: &mut StdRng,
    ) {
        let dt = self.timestep;
        for (p, f) in particles.iter_mut().zip(forces.iter()) {
            let mobility = dt / (self.friction * p.mass);
            let spread = (2.0 * self.kt * mobility).sqrt();
            let displacement = f * mobility + gaussian_vector(rng) * spread;
            p.position += displacement;
            p.velocity = displacement / dt;
        }
        force.compute_forces(particles, forces);
    }
}

/// Deterministic velocity Verlet. Ignores temperature and friction.
#[derive(Debug, Clone, PartialEq)]
pub struct VerletIntegrator {
    timestep: f64,
}

impl VerletIntegrator {
    pub fn new(timestep: f64) -> Self {
        Self { timestep }
    }
}

impl Integrator for VerletIntegrator {
    fn name(&self) -> &'static str {
        "verlet"
    }

    fn timestep(&self) -> f64 {
        self.timestep
    }

    fn step(
        &mut self,
        particles: &mut [Particle],
        forces: &mut [Vector3<f64>],
        force: &CustomExternalForce,
        _rng: &mut StdRng,
    ) {
        let dt = self.timestep;
        for (p, f) in particles.iter_mut().zip(forces.iter()) {
            p.velocity += f * (0.5 * dt / p.mass);
            p.position += p.velocity * dt;
        }
        force.compute_forces(particles, forces);
        for (p, f) in particles.iter_mut().zip(forces.iter()) {
            p.velocity += f * (0.5 * dt / p.mass);
        }
    }
}

/// Builds the integrator selected by `config.integrator`.
pub fn from_config(config: &EnsembleConfig) -> Box<dyn Integrator> {
    match config.integrator {
        IntegratorKind::Langevin => Box::new(LangevinIntegrator::new(
            config.temperature,
            config.friction,
            config.timestep,
        )),
        IntegratorKind::Brownian => Box::new(BrownianIntegrator::new(
            config.temperature,
            config.friction,
            config.timestep,
        )),
        IntegratorKind::Verlet => Box::new(VerletIntegrator::new(config.timestep)),
    }
}
