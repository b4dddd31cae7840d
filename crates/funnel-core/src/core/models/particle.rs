use nalgebra::{Point3, Vector3};

/// A point particle of the ensemble.
///
/// Particles carry no topology or naming; the index is the only identity.
/// `parameters` holds per-particle parameter values in the order declared by
/// the force field (empty for force fields without parameters).
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub index: usize,
    pub mass: f64,
    pub position: Point3<f64>,
    pub velocity: Vector3<f64>,
    pub parameters: Vec<f64>,
}

impl Particle {
    pub fn new(index: usize, mass: f64, position: Point3<f64>) -> Self {
        Self {
            index,
            mass,
            position,
            velocity: Vector3::zeros(),
            parameters: Vec::new(),
        }
    }

    pub fn with_velocity(mut self, velocity: Vector3<f64>) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_parameters(mut self, parameters: Vec<f64>) -> Self {
        self.parameters = parameters;
        self
    }

    #[inline]
    pub fn kinetic_energy(&self) -> f64 {
        0.5 * self.mass * self.velocity.norm_squared()
    }

    /// In-plane distance from the origin.
    #[inline]
    pub fn radius(&self) -> f64 {
        self.position.x.hypot(self.position.y)
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.position.iter().all(|c| c.is_finite()) && self.velocity.iter().all(|c| c.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_particle_starts_at_rest() {
        let p = Particle::new(3, 1000.0, Point3::new(6.0, 8.0, 0.0));
        assert_eq!(p.index, 3);
        assert_eq!(p.velocity, Vector3::zeros());
        assert_eq!(p.kinetic_energy(), 0.0);
        assert!(p.parameters.is_empty());
    }

    #[test]
    fn radius_ignores_out_of_plane_coordinate() {
        let p = Particle::new(0, 1.0, Point3::new(6.0, 8.0, 5.0));
        assert!((p.radius() - 10.0).abs() < 1e-12);
    }

    #[test]
    fn kinetic_energy_uses_full_velocity() {
        let p = Particle::new(0, 2.0, Point3::origin()).with_velocity(Vector3::new(1.0, 2.0, 2.0));
        assert!((p.kinetic_energy() - 9.0).abs() < 1e-12);
    }

    #[test]
    fn non_finite_coordinates_are_detected() {
        let mut p = Particle::new(0, 1.0, Point3::origin());
        assert!(p.is_finite());
        p.position.x = f64::NAN;
        assert!(!p.is_finite());
        p.position.x = 0.0;
        p.velocity.z = f64::INFINITY;
        assert!(!p.is_finite());
    }
}
