use nalgebra::{Point3, Vector3};
use rand::Rng;
use rand_distr::StandardNormal;
use tracing::{debug, warn};

use super::config::{EnsembleConfig, RadiusTolerance};
use super::error::EngineError;
use crate::core::units::thermal_energy;

/// Parameters of the ring placement: every particle must start at in-plane
/// distance `radius` from the origin, drawn from the box `[-half_width, half_width]²`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RingPlacement {
    pub radius: f64,
    pub half_width: f64,
    pub tolerance: RadiusTolerance,
    pub max_rounds: usize,
}

impl RingPlacement {
    pub fn from_config(config: &EnsembleConfig) -> Self {
        Self {
            radius: config.initial_radius,
            half_width: config.box_half_width,
            tolerance: config.radius_tolerance,
            max_rounds: config.max_init_rounds,
        }
    }

    /// Whether the target circle passes through the sampling box at all.
    pub fn is_reachable(&self) -> bool {
        self.radius <= self.half_width * std::f64::consts::SQRT_2
    }
}

/// Masked batch rejection sampling of `count` positions on the ring.
///
/// Every round redraws a uniform candidate for each particle that is still
/// unsatisfied; accepted particles are frozen. All positions have `z = 0`.
pub fn sample_ring_positions<R: Rng + ?Sized>(
    count: usize,
    placement: &RingPlacement,
    rng: &mut R,
) -> Result<Vec<Point3<f64>>, EngineError> {
    if !placement.is_reachable() {
        return Err(EngineError::InitializationUnsatisfiable {
            rounds: 0,
            unsatisfied: count,
        });
    }
    let band = placement.tolerance.absolute + placement.tolerance.relative * placement.radius.powi(2);
    if band > 0.1 * placement.radius.powi(2) {
        warn!(
            band,
            radius = placement.radius,
            "Radius tolerance is loose; initial positions may be far from the ring."
        );
    }

    let h = placement.half_width;
    let mut positions = vec![Point3::origin(); count];
    let mut satisfied = vec![false; count];
    let mut remaining = count;
    let mut rounds = 0usize;

    while remaining > 0 {
        if rounds == placement.max_rounds {
            return Err(EngineError::InitializationUnsatisfiable {
                rounds,
                unsatisfied: remaining,
            });
        }
        rounds += 1;
        for (position, done) in positions.iter_mut().zip(satisfied.iter_mut()) {
            if *done {
                continue;
            }
            let x = rng.gen_range(-h..=h);
            let y = rng.gen_range(-h..=h);
            *position = Point3::new(x, y, 0.0);
            if placement.tolerance.accepts(x * x + y * y, placement.radius) {
                *done = true;
                remaining -= 1;
            }
        }
    }

    debug!(count, rounds, "Placed particles on the initial ring.");
    Ok(positions)
}

/// Maxwell-Boltzmann velocities: each Cartesian component is normal with
/// standard deviation `sqrt(k_B·T/m)`.
pub fn maxwell_boltzmann_velocities<R: Rng + ?Sized>(
    masses: &[f64],
    temperature: f64,
    rng: &mut R,
) -> Vec<Vector3<f64>> {
    let kt = thermal_energy(temperature);
    masses
        .iter()
        .map(|&mass| {
            let sigma = (kt / mass).sqrt();
            Vector3::new(
                sigma * rng.sample::<f64, _>(StandardNormal),
                sigma * rng.sample::<f64, _>(StandardNormal),
                sigma * rng.sample::<f64, _>(StandardNormal),
            )
        })
        .collect()
}
