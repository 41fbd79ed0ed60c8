//! Provides input/output functionality for molecular structure files.
//!
//! Structure formats implement the [`traits::MolecularFile`] trait; [`pdb`]
//! is the fixed-column PDB implementation used by the batch workflow. The
//! [`report`] module writes derived per-residue tables.

pub mod pdb;
pub mod report;
pub mod traits;
