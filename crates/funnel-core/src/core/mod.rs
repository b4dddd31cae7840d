//! # Core Module
//!
//! Stateless building blocks: the expression language, force fields, particle
//! models, grid evaluation of scalar fields, units and trajectory I/O.
//!
//! - **Expressions** ([`expr`]) - parsing, symbolic derivatives and compiled evaluation
//! - **Force Fields** ([`forcefield`]) - the [`forcefield::ForceField`] capability,
//!   the funnel landscape and the compiled custom external force
//! - **Models** ([`models`]) - particles and snapshots
//! - **Grids** ([`grid`]) - regular-mesh evaluation for plotting
//! - **Units** ([`units`]) - nm / ps / amu / kJ·mol⁻¹ / K
//! - **I/O** ([`io`]) - CSV trajectory output

pub mod expr;
pub mod forcefield;
pub mod grid;
pub mod io;
pub mod models;
pub mod units;
