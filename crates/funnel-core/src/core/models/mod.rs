//! # Core Models Module
//!
//! Plain data carried through a simulation run.
//!
//! - [`particle`] - a single point particle with mass, position and velocity
//! - [`snapshot`] - one recorded instant of the ensemble's in-plane positions

pub mod particle;
pub mod snapshot;
