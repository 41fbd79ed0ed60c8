//! # Workflows Module
//!
//! High-level entry points that tie the [`crate::core`] data model and the
//! [`crate::engine`] estimator together.
//!
//! - **Annotation** ([`annotate`]) - Surface areas for one structure, written into each atom's B-factor,
//!   plus per-residue totals.
//! - **Batch** ([`batch`]) - Directory-to-directory conversion with extension filtering, per-file
//!   failure isolation and progress reporting.

pub mod annotate;
pub mod batch;
