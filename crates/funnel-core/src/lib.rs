//! # FunnelMD Core Library
//!
//! Stochastic sampling of a two-dimensional "funnel" energy landscape by an
//! ensemble of independent particles, with a self-contained particle engine
//! and a backend-agnostic rendering adapter.
//!
//! ## Architecture
//!
//! - **[`core`]: The Foundation.** Stateless pieces: the expression language
//!   used to define force fields and derive forces symbolically, the funnel
//!   potential, particle and snapshot models, grid evaluation and CSV
//!   trajectory I/O.
//!
//! - **[`engine`]: The Simulation.** The validated ensemble configuration,
//!   integrators (Langevin, Brownian, velocity Verlet), the simulation context,
//!   ring initialization and the lazy [`engine::sampler::Sampler`].
//!
//! - **[`render`]: The Sink.** Draw requests and the [`render::RenderSink`]
//!   capability, with an in-memory [`render::Figure`].
//!
//! - **[`workflows`]: The Public API.** Complete procedures: drawing the
//!   energy surface and running a sampling experiment onto a sink.

pub mod core;
pub mod engine;
pub mod render;
pub mod workflows;
