use ndarray::{Array2, ArrayView1};

use super::particle::Particle;

/// One recorded instant of the ensemble: in-plane coordinates of every
/// particle, shape `(N, 2)`, taken after `step` integrator steps.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub sample: usize,
    pub step: u64,
    pub time_ps: f64,
    pub xy: Array2<f64>,
}

impl Snapshot {
    pub fn from_particles(sample: usize, step: u64, time_ps: f64, particles: &[Particle]) -> Self {
        let xy = Array2::from_shape_fn((particles.len(), 2), |(i, axis)| {
            particles[i].position[axis]
        });
        Self {
            sample,
            step,
            time_ps,
            xy,
        }
    }

    pub fn particle_count(&self) -> usize {
        self.xy.nrows()
    }

    pub fn xs(&self) -> ArrayView1<'_, f64> {
        self.xy.column(0)
    }

    pub fn ys(&self) -> ArrayView1<'_, f64> {
        self.xy.column(1)
    }

    pub fn is_finite(&self) -> bool {
        self.xy.iter().all(|v| v.is_finite())
    }
}
