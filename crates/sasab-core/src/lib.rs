//! # SASA-B Core Library
//!
//! Per-atom solvent-accessible surface area (SASA) for protein structures,
//! estimated with the Shrake-Rupley algorithm and written into the B-factor
//! column so that structure viewers can color atoms by exposure.
//!
//! ## Architecture
//!
//! - **[`core`]: The Foundation.** Stateless data models (`MolecularSystem`),
//!   the PDB reader/writer and the van der Waals radius table.
//!
//! - **[`engine`]: The Computation.** The `SurfaceAreaEstimator` with its
//!   sphere point lattice and k-d tree neighbor search, configuration builders,
//!   errors and progress events.
//!
//! - **[`workflows`]: The Public API.** Annotating a single structure and
//!   converting a whole directory of structure files.
//!
//! ## Example
//!
//! ```no_run
//! use sasab::core::io::pdb::PdbFile;
//! use sasab::core::io::traits::MolecularFile;
//! use sasab::core::radii::RadiusTable;
//! use sasab::engine::estimator::SurfaceAreaEstimator;
//!
//! let (mut system, metadata) = PdbFile::read_from_path("1abc.pdb")?;
//! let summary = SurfaceAreaEstimator::default().compute_all(&mut system, &RadiusTable::new())?;
//! println!("total SASA: {:.2}", summary.total_sasa);
//! PdbFile::write_to_path(&system, &metadata, "1abc_sasa_b.pdb")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod core;
pub mod engine;
pub mod workflows;
