//! # Force Field Module
//!
//! Force fields are described by a single energy expression over per-particle
//! coordinates (`x`, `y`, `z`) plus optional per-particle parameters. Any type
//! implementing [`ForceField`] can drive the engine: the expression is parsed,
//! differentiated symbolically and compiled once by [`custom::CustomExternalForce`].
//!
//! ## Key Components
//!
//! - [`ForceField`] - the capability the engine accepts
//! - [`funnel`] - the two-dimensional funnel landscape with a stiff z restraint
//! - [`custom`] - compiled energy and force evaluation for any force field
//! - [`ExpressionForceField`] - a force field built directly from text

pub mod custom;
pub mod funnel;

use crate::core::expr::{Expr, ExprError};
use thiserror::Error;

/// Names bound to the particle's Cartesian coordinates inside expressions.
pub const COORDINATE_VARIABLES: [&str; 3] = ["x", "y", "z"];

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ForceFieldError {
    #[error("Invalid force field expression: {0}")]
    Expression(#[from] ExprError),

    #[error("Per-particle parameter name '{0}' collides with a coordinate or another parameter")]
    DuplicateParameter(String),

    #[error("Particle {particle} has {found} per-particle parameter value(s), expected {expected}")]
    ParameterCount {
        particle: usize,
        expected: usize,
        found: usize,
    },
}

/// An external potential acting independently on every particle.
pub trait ForceField {
    /// Short human-readable identifier used in logs.
    fn name(&self) -> &str;

    /// Energy in kJ/mol as an expression over `x`, `y`, `z` (nm) and the
    /// declared per-particle parameters.
    fn expression(&self) -> String;

    /// Names of per-particle parameters referenced by the expression.
    fn per_particle_parameters(&self) -> Vec<String> {
        Vec::new()
    }

    fn symbolic_expression(&self) -> Result<Expr, ExprError> {
        Expr::parse(&self.expression())
    }
}

/// A force field defined by arbitrary expression text.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionForceField {
    pub name: String,
    pub expression: String,
    pub parameters: Vec<String>,
}

impl ExpressionForceField {
    pub fn new(name: impl Into<String>, expression: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            expression: expression.into(),
            parameters: Vec::new(),
        }
    }

    pub fn with_parameter(mut self, name: impl Into<String>) -> Self {
        self.parameters.push(name.into());
        self
    }
}

impl ForceField for ExpressionForceField {
    fn name(&self) -> &str {
        &self.name
    }

    fn expression(&self) -> String {
        self.expression.clone()
    }

    fn per_particle_parameters(&self) -> Vec<String> {
        self.parameters.clone()
    }
}
