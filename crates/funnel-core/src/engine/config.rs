use crate::core::units::femtoseconds_to_picoseconds;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_PARTICLE_COUNT: usize = 10;
pub const DEFAULT_MASS: f64 = 1000.0;
pub const DEFAULT_TEMPERATURE: f64 = 750.0;
pub const DEFAULT_FRICTION: f64 = 100.0;
pub const DEFAULT_TIMESTEP_FS: f64 = 10.0;
pub const DEFAULT_STEPS_PER_SAMPLE: u64 = 250;
pub const DEFAULT_NUM_SAMPLES: usize = 1000;
pub const DEFAULT_INITIAL_RADIUS: f64 = 10.0;
pub const DEFAULT_BOX_HALF_WIDTH: f64 = 10.0;
pub const DEFAULT_MAX_INIT_ROUNDS: usize = 5_000_000;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Particle count must be positive")]
    ParticleCount,

    #[error("Parameter '{name}' must be positive, got {value}")]
    NonPositive { name: &'static str, value: f64 },

    #[error("Parameter '{name}' must be non-negative, got {value}")]
    Negative { name: &'static str, value: f64 },

    #[error("Parameter '{0}' must be at least 1")]
    Zero(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IntegratorKind {
    #[default]
    Langevin,
    Brownian,
    Verlet,
}

impl IntegratorKind {
    pub fn name(self) -> &'static str {
        match self {
            IntegratorKind::Langevin => "langevin",
            IntegratorKind::Brownian => "brownian",
            IntegratorKind::Verlet => "verlet",
        }
    }

    pub fn is_stochastic(self) -> bool {
        !matches!(self, IntegratorKind::Verlet)
    }
}

/// Closeness predicate on the squared in-plane radius, with the semantics of
/// an `isclose` test: `|ρ² − r²| <= absolute + relative·r²`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RadiusTolerance {
    pub relative: f64,
    pub absolute: f64,
}

impl Default for RadiusTolerance {
    fn default() -> Self {
        Self {
            relative: 1e-5,
            absolute: 1e-8,
        }
    }
}

impl RadiusTolerance {
    #[inline]
    pub fn accepts(&self, radius_squared: f64, target_radius: f64) -> bool {
        let target = target_radius * target_radius;
        (radius_squared - target).abs() <= self.absolute + self.relative * target
    }
}

/// Immutable parameters of one sampling run. Construct through
/// [`EnsembleConfigBuilder`], which validates every field.
///
/// Units: mass in amu, temperature in K, friction in 1/ps, timestep in ps,
/// lengths in nm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct EnsembleConfig {
    pub particle_count: usize,
    pub mass: f64,
    pub temperature: f64,
    pub friction: f64,
    pub timestep: f64,
    pub steps_per_sample: u64,
    pub num_samples: usize,
    pub integrator: IntegratorKind,
    pub initial_radius: f64,
    pub box_half_width: f64,
    pub radius_tolerance: RadiusTolerance,
    pub max_init_rounds: usize,
    pub seed: Option<u64>,
}

impl EnsembleConfig {
    pub fn total_steps(&self) -> u64 {
        self.steps_per_sample * self.num_samples as u64
    }

    pub fn builder() -> EnsembleConfigBuilder {
        EnsembleConfigBuilder::new()
    }
}

impl Default for EnsembleConfig {
    fn default() -> Self {
        Self {
            particle_count: DEFAULT_PARTICLE_COUNT,
            mass: DEFAULT_MASS,
            temperature: DEFAULT_TEMPERATURE,
            friction: DEFAULT_FRICTION,
            timestep: femtoseconds_to_picoseconds(DEFAULT_TIMESTEP_FS),
            steps_per_sample: DEFAULT_STEPS_PER_SAMPLE,
            num_samples: DEFAULT_NUM_SAMPLES,
            integrator: IntegratorKind::default(),
            initial_radius: DEFAULT_INITIAL_RADIUS,
            box_half_width: DEFAULT_BOX_HALF_WIDTH,
            radius_tolerance: RadiusTolerance::default(),
            max_init_rounds: DEFAULT_MAX_INIT_ROUNDS,
            seed: None,
        }
    }
}

#[derive(Default)]
pub struct EnsembleConfigBuilder {
    particle_count: Option<usize>,
    mass: Option<f64>,
    temperature: Option<f64>,
    friction: Option<f64>,
    timestep: Option<f64>,
    steps_per_sample: Option<u64>,
    num_samples: Option<usize>,
    integrator: Option<IntegratorKind>,
    initial_radius: Option<f64>,
    box_half_width: Option<f64>,
    radius_tolerance: Option<RadiusTolerance>,
    max_init_rounds: Option<usize>,
    seed: Option<u64>,
}

impl EnsembleConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn particle_count(mut self, n: usize) -> Self {
        self.particle_count = Some(n);
        self
    }
    pub fn mass(mut self, mass: f64) -> Self {
        self.mass = Some(mass);
        self
    }
    pub fn temperature(mut self, kelvin: f64) -> Self {
        self.temperature = Some(kelvin);
        self
    }
    pub fn friction(mut self, per_ps: f64) -> Self {
        self.friction = Some(per_ps);
        self
    }
    pub fn timestep_ps(mut self, ps: f64) -> Self {
        self.timestep = Some(ps);
        self
    }
    pub fn timestep_fs(mut self, fs: f64) -> Self {
        self.timestep = Some(femtoseconds_to_picoseconds(fs));
        self
    }
    pub fn steps_per_sample(mut self, steps: u64) -> Self {
        self.steps_per_sample = Some(steps);
        self
    }
    pub fn num_samples(mut self, samples: usize) -> Self {
        self.num_samples = Some(samples);
        self
    }
    pub fn integrator(mut self, kind: IntegratorKind) -> Self {
        self.integrator = Some(kind);
        self
    }
    pub fn initial_radius(mut self, radius: f64) -> Self {
        self.initial_radius = Some(radius);
        self
    }
    pub fn box_half_width(mut self, half_width: f64) -> Self {
        self.box_half_width = Some(half_width);
        self
    }
    pub fn radius_tolerance(mut self, tolerance: RadiusTolerance) -> Self {
        self.radius_tolerance = Some(tolerance);
        self
    }
    pub fn max_init_rounds(mut self, rounds: usize) -> Self {
        self.max_init_rounds = Some(rounds);
        self
    }
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn build(self) -> Result<EnsembleConfig, ConfigError> {
        let defaults = EnsembleConfig::default();
        let config = EnsembleConfig {
            particle_count: self.particle_count.unwrap_or(defaults.particle_count),
            mass: self.mass.unwrap_or(defaults.mass),
            temperature: self.temperature.unwrap_or(defaults.temperature),
            friction: self.friction.unwrap_or(defaults.friction),
            timestep: self.timestep.unwrap_or(defaults.timestep),
            steps_per_sample: self.steps_per_sample.unwrap_or(defaults.steps_per_sample),
            num_samples: self.num_samples.unwrap_or(defaults.num_samples),
            integrator: self.integrator.unwrap_or(defaults.integrator),
            initial_radius: self.initial_radius.unwrap_or(defaults.initial_radius),
            box_half_width: self.box_half_width.unwrap_or(defaults.box_half_width),
            radius_tolerance: self.radius_tolerance.unwrap_or(defaults.radius_tolerance),
            max_init_rounds: self.max_init_rounds.unwrap_or(defaults.max_init_rounds),
            seed: self.seed,
        };
        validate(&config)?;
        Ok(config)
    }
}

fn positive(name: &'static str, value: f64) -> Result<(), ConfigError> {
    // `!(value > 0.0)` also rejects NaN.
    if !(value > 0.0) || !value.is_finite() {
        return Err(ConfigError::NonPositive { name, value });
    }
    Ok(())
}

fn non_negative(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if !(value >= 0.0) || !value.is_finite() {
        return Err(ConfigError::Negative { name, value });
    }
    Ok(())
}

/// Validates a configuration, including one deserialized directly.
pub fn validate(config: &EnsembleConfig) -> Result<(), ConfigError> {
    if config.particle_count == 0 {
        return Err(ConfigError::ParticleCount);
    }
    positive("mass", config.mass)?;
    positive("timestep", config.timestep)?;
    non_negative("temperature", config.temperature)?;
    non_negative("friction", config.friction)?;
    if config.steps_per_sample == 0 {
        return Err(ConfigError::Zero("steps_per_sample"));
    }
    if config.num_samples == 0 {
        return Err(ConfigError::Zero("num_samples"));
    }
    if config.max_init_rounds == 0 {
        return Err(ConfigError::Zero("max_init_rounds"));
    }
    positive("initial_radius", config.initial_radius)?;
    positive("box_half_width", config.box_half_width)?;
    non_negative("radius_tolerance.relative", config.radius_tolerance.relative)?;
    non_negative("radius_tolerance.absolute", config.radius_tolerance.absolute)?;
    if config.radius_tolerance.relative == 0.0 && config.radius_tolerance.absolute == 0.0 {
        return Err(ConfigError::NonPositive {
            name: "radius_tolerance",
            value: 0.0,
        });
    }
    if matches!(config.integrator, IntegratorKind::Brownian) {
        positive("friction", config.friction)?;
    }
    Ok(())
}
