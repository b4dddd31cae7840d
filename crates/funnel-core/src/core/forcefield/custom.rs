use super::{COORDINATE_VARIABLES, ForceField, ForceFieldError};
use crate::core::expr::{Expr, Program};
use crate::core::models::particle::Particle;
use nalgebra::Vector3;
use tracing::debug;

const INLINE_INPUTS: usize = 8;

/// A per-particle external force compiled from a [`ForceField`] expression.
///
/// The energy and its three coordinate derivatives are derived symbolically
/// at construction and compiled to [`Program`]s; forces are the negative
/// gradient. Program inputs are ordered `x, y, z` followed by the force
/// field's per-particle parameters.
#[derive(Debug, Clone)]
pub struct CustomExternalForce {
    name: String,
    expression: Expr,
    gradient_expressions: [Expr; 3],
    parameters: Vec<String>,
    energy: Program,
    gradient: [Program; 3],
}

impl CustomExternalForce {
    pub fn new(force_field: &dyn ForceField) -> Result<Self, ForceFieldError> {
        let expression = force_field.symbolic_expression()?;
        Self::from_expression(
            force_field.name(),
            expression,
            force_field.per_particle_parameters(),
        )
    }

    pub fn from_expression(
        name: &str,
        expression: Expr,
        parameters: Vec<String>,
    ) -> Result<Self, ForceFieldError> {
        for (i, parameter) in parameters.iter().enumerate() {
            if COORDINATE_VARIABLES.contains(&parameter.as_str())
                || parameters[..i].contains(parameter)
            {
                return Err(ForceFieldError::DuplicateParameter(parameter.clone()));
            }
        }

        let inputs: Vec<&str> = COORDINATE_VARIABLES
            .iter()
            .copied()
            .chain(parameters.iter().map(String::as_str))
            .collect();

        let [dx, dy, dz] = COORDINATE_VARIABLES.map(|v| expression.derivative(v));
        let energy = Program::compile(&expression, &inputs)?;
        let gradient = [
            Program::compile(&dx, &inputs)?,
            Program::compile(&dy, &inputs)?,
            Program::compile(&dz, &inputs)?,
        ];

        debug!(
            force = name,
            energy_ops = energy.len(),
            gradient_ops = gradient.iter().map(Program::len).sum::<usize>(),
            "Compiled custom external force."
        );

        Ok(Self {
            name: name.to_string(),
            expression,
            gradient_expressions: [dx, dy, dz],
            parameters,
            energy,
            gradient,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn expression(&self) -> &Expr {
        &self.expression
    }

    /// Symbolic `dE/dx`, `dE/dy`, `dE/dz`.
    pub fn gradient_expressions(&self) -> &[Expr; 3] {
        &self.gradient_expressions
    }

    pub fn parameters(&self) -> &[String] {
        &self.parameters
    }

    /// Checks that every particle carries one value per declared parameter.
    pub fn validate_particles(&self, particles: &[Particle]) -> Result<(), ForceFieldError> {
        let expected = self.parameters.len();
        match particles.iter().find(|p| p.parameters.len() != expected) {
            Some(p) => Err(ForceFieldError::ParameterCount {
                particle: p.index,
                expected,
                found: p.parameters.len(),
            }),
            None => Ok(()),
        }
    }

    fn with_inputs<R>(&self, particle: &Particle, f: impl FnOnce(&[f64]) -> R) -> R {
        let n = 3 + self.parameters.len();
        let fill = |buf: &mut [f64]| {
            buf[0] = particle.position.x;
            buf[1] = particle.position.y;
            buf[2] = particle.position.z;
            for (slot, value) in buf[3..].iter_mut().zip(&particle.parameters) {
                *slot = *value;
            }
        };
        if n <= INLINE_INPUTS {
            let mut buf = [0.0f64; INLINE_INPUTS];
            fill(&mut buf[..n]);
            f(&buf[..n])
        } else {
            let mut buf = vec![0.0f64; n];
            fill(&mut buf);
            f(&buf)
        }
    }

    #[inline]
    pub fn energy(&self, particle: &Particle) -> f64 {
        self.with_inputs(particle, |inputs| self.energy.evaluate(inputs))
    }

    #[inline]
    pub fn force(&self, particle: &Particle) -> Vector3<f64> {
        self.with_inputs(particle, |inputs| {
            -Vector3::new(
                self.gradient[0].evaluate(inputs),
                self.gradient[1].evaluate(inputs),
                self.gradient[2].evaluate(inputs),
            )
        })
    }

    pub fn total_energy(&self, particles: &[Particle]) -> f64 {
        particles.iter().map(|p| self.energy(p)).sum()
    }

    /// Writes the force on each particle into `forces` (same length as `particles`).
    pub fn compute_forces(&self, particles: &[Particle], forces: &mut [Vector3<f64>]) {
        debug_assert_eq!(particles.len(), forces.len());
        for (force, particle) in forces.iter_mut().zip(particles) {
            *force = self.force(particle);
        }
    }
}
