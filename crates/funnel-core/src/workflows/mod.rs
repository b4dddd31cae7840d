//! # Workflows Module
//!
//! End-to-end procedures that tie the [`crate::engine`] and [`crate::core`]
//! layers to a [`crate::render::RenderSink`].
//!
//! - **Surface** ([`surface`]) - evaluate the funnel energy on a grid and draw it as a filled contour
//! - **Sampling** ([`sample`]) - run the Langevin ensemble and draw every snapshot over the surface

pub mod sample;
pub mod surface;
