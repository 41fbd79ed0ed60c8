//! # Core Module
//!
//! The stateless foundation of the library: molecular data structures, file
//! formats and the element radius table.
//!
//! - **Molecular Representation** ([`models`]) - Atoms, residues, chains and models held in a [`models::system::MolecularSystem`]
//! - **File I/O** ([`io`]) - PDB reading and writing with record preservation, plus CSV reports
//! - **Atomic Radii** ([`radii`]) - Van der Waals radii by element with overrides and an explicit fallback

pub mod io;
pub mod models;
pub mod radii;
