//! # Engine Module
//!
//! Stateful simulation machinery for sampling an ensemble of independent
//! particles on an external potential.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - ensemble parameters, the validating builder
//! - **Simulation** ([`simulation`]) - the context owning particles, forces and RNG
//! - **Integrators** ([`integrator`]) - Langevin, Brownian and velocity Verlet steps
//! - **Initialization** ([`initialization`]) - ring placement and thermal velocities
//! - **Sampling** ([`sampler`]) - the lazy snapshot iterator and its run state
//! - **State** ([`state`]) - read-only state captures
//! - **Progress** ([`progress`]) - callback-based progress events
//! - **Errors** ([`error`])
//!
//! A run is single-threaded; reproducibility comes from seeding the
//! simulation's `StdRng`.

pub mod config;
pub mod error;
pub mod initialization;
pub mod integrator;
pub mod progress;
pub mod sampler;
pub mod simulation;
pub mod state;
