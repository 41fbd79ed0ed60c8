//! # Core Models Module
//!
//! Data structures used to represent a molecular structure read from disk.
//!
//! ## Overview
//!
//! A [`system::MolecularSystem`] owns every atom, residue and chain of a structure
//! in slot maps addressed by the stable IDs from [`ids`]. Models group chains
//! the way `MODEL` blocks do in a PDB file, and file order is remembered so that
//! a structure can be written back out in the layout it was read in.
//!
//! ## Key Components
//!
//! - [`atom`] - Individual atom with coordinates, PDB fields and its surface area slot
//! - [`residue`] - Residue grouping with primary-conformer lookup by atom name
//! - [`chain`] - Chain grouping within a model
//! - [`system`] - The complete structure and its models
//! - [`builder`] - Incremental construction from a stream of atom records
//! - [`ids`] - Unique identifier types for atoms, residues, and chains
//!
//! ## Usage
//!
//! ```ignore
//! use sasab::core::models::{atom::Atom, builder::{MolecularSystemBuilder, ResidueKey}};
//!
//! let mut builder = MolecularSystemBuilder::new();
//! let key = ResidueKey { chain_id: 'A', number: 1, insertion_code: None, name: "GLY" };
//! builder.add_atom(&key, Atom::new(1, " CA ", Default::default(), Point3::origin()));
//! let system = builder.build();
//! ```

pub mod atom;
pub mod builder;
pub mod chain;
pub mod ids;
pub mod residue;
pub mod system;
