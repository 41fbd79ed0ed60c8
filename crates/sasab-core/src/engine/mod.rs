//! # Engine Module
//!
//! The computational layer: the Shrake-Rupley surface area estimator together
//! with its configuration, error types and progress reporting.
//!
//! - **Configuration** ([`config`]) - Estimator parameters and batch settings, built through validating builders
//! - **Estimation** ([`estimator`]) - [`estimator::SurfaceAreaEstimator`], parallel over atoms with the `parallel` feature
//! - **Sampling** ([`sphere`]) - The Fibonacci lattice of unit-sphere sample points
//! - **Progress Monitoring** ([`progress`]) - Callback-based progress events for front ends
//! - **Error Handling** ([`error`]) - Engine-specific error types
//!
//! Neighbor search uses a k-d tree over atom centers, built once per surface.

pub mod config;
pub mod error;
pub mod estimator;
pub(crate) mod neighbors;
pub mod progress;
pub mod sphere;
