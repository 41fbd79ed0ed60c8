use std::path::PathBuf;
use thiserror::Error;

use crate::core::io::pdb::PdbError;
use crate::core::io::report::ReportError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Input directory not found: {}", path.display())]
    InputNotFound { path: PathBuf },

    #[error("No van der Waals radius for element '{element}' (atom {serial} '{atom_name}')")]
    UnknownRadius {
        element: String,
        serial: usize,
        atom_name: String,
    },

    #[error("Malformed structure file '{}': {source}", path.display())]
    Structure {
        path: PathBuf,
        #[source]
        source: PdbError,
    },

    #[error("Failed to write residue report '{}': {source}", path.display())]
    Report {
        path: PathBuf,
        #[source]
        source: ReportError,
    },

    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Internal logic error: {0}")]
    Internal(String),
}
