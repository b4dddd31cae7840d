//! # I/O Module
//!
//! Serialization of simulation output.
//!
//! - [`trajectory`] - CSV export of sampled snapshots

pub mod trajectory;
