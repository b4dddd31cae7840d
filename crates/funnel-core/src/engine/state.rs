use ndarray::{Array2, ArrayView2, s};

use crate::core::models::particle::Particle;

/// A read-only copy of the simulation state at one instant.
///
/// `positions` and `velocities` are `(N, 3)` arrays in nm and nm/ps.
#[derive(Debug, Clone, PartialEq)]
pub struct State {
    pub step: u64,
    pub time_ps: f64,
    pub positions: Array2<f64>,
    pub velocities: Array2<f64>,
    pub potential_energy: f64,
    pub kinetic_energy: f64,
}

impl State {
    pub(crate) fn capture(
        particles: &[Particle],
        step: u64,
        time_ps: f64,
        potential_energy: f64,
    ) -> Self {
        Self {
            step,
            time_ps,
            positions: positions_of(particles),
            velocities: Array2::from_shape_fn((particles.len(), 3), |(i, k)| {
                particles[i].velocity[k]
            }),
            potential_energy,
            kinetic_energy: particles.iter().map(Particle::kinetic_energy).sum(),
        }
    }

    pub fn total_energy(&self) -> f64 {
        self.potential_energy + self.kinetic_energy
    }

    pub fn particle_count(&self) -> usize {
        self.positions.nrows()
    }

    /// The in-plane `(x, y)` columns of `positions`.
    pub fn xy(&self) -> ArrayView2<'_, f64> {
        self.positions.slice(s![.., 0..2])
    }
}

pub(crate) fn positions_of(particles: &[Particle]) -> Array2<f64> {
    Array2::from_shape_fn((particles.len(), 3), |(i, k)| particles[i].position[k])
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{Point3, Vector3};

    #[test]
    fn capture_copies_positions_velocities_and_energies() {
        let particles = vec![
            Particle::new(0, 2.0, Point3::new(1.0, 2.0, 3.0)).with_velocity(Vector3::new(1.0, 0.0, 0.0)),
            Particle::new(1, 2.0, Point3::new(-1.0, -2.0, 0.5)),
        ];
        let state = State::capture(&particles, 40, 0.4, -3.0);
        assert_eq!(state.particle_count(), 2);
        assert_eq!(state.positions[[1, 2]], 0.5);
        assert_eq!(state.velocities[[0, 0]], 1.0);
        assert!((state.kinetic_energy - 1.0).abs() < 1e-12);
        assert!((state.total_energy() + 2.0).abs() < 1e-12);
        assert_eq!(state.xy().shape(), &[2, 2]);
        assert_eq!(state.xy()[[1, 1]], -2.0);
    }
}
