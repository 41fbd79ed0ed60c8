//! Tabular per-residue surface area report.

use serde::Serialize;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Solvent-accessible surface area summed over one residue.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResidueSasa {
    pub model: usize,
    pub chain: char,
    pub residue_name: String,
    pub residue_number: isize,
    pub insertion_code: String,
    pub atoms: usize,
    pub sasa: f64,
}

/// Writes residue rows as CSV with a header line.
pub fn write_residue_report(rows: &[ResidueSasa], writer: impl Write) -> Result<(), ReportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn write_residue_report_to_path(rows: &[ResidueSasa], path: &Path) -> Result<(), ReportError> {
    let file = std::fs::File::create(path)?;
    write_residue_report(rows, std::io::BufWriter::new(file))
}
