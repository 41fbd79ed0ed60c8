use crate::core::models::system::MolecularSystem;
use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Cursor, Write};
use std::path::Path;

/// Defines the interface for reading and writing structure file formats.
///
/// A format reads into a [`MolecularSystem`] plus format-specific metadata
/// (whatever the format needs to reproduce the parts of the file the model does
/// not represent), and writes a system back together with that metadata.
pub trait MolecularFile {
    /// Format-specific data carried from reading to writing.
    type Metadata;

    /// The error type for I/O and parse failures.
    type Error: Error + From<io::Error>;

    /// Reads a molecular system from a buffered reader.
    ///
    /// # Errors
    ///
    /// Returns an error if parsing fails or the reader fails.
    fn read_from(
        reader: &mut impl BufRead,
    ) -> Result<(MolecularSystem, Self::Metadata), Self::Error>;

    /// Writes a molecular system, reproducing the layout captured in `metadata`.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails or the metadata refers to atoms the
    /// system does not contain.
    fn write_to(
        system: &MolecularSystem,
        metadata: &Self::Metadata,
        writer: &mut impl Write,
    ) -> Result<(), Self::Error>;

    /// Reads a molecular system from an in-memory string.
    fn read_from_str(content: &str) -> Result<(MolecularSystem, Self::Metadata), Self::Error> {
        Self::read_from(&mut Cursor::new(content))
    }

    /// Reads a molecular system from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or parsing fails.
    fn read_from_path<P: AsRef<Path>>(
        path: P,
    ) -> Result<(MolecularSystem, Self::Metadata), Self::Error> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        Self::read_from(&mut reader)
    }

    /// Writes a molecular system and metadata to a file path.
    ///
    /// The writer is flushed before returning so that write errors surface
    /// here rather than being lost when the buffer is dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or writing fails.
    fn write_to_path<P: AsRef<Path>>(
        system: &MolecularSystem,
        metadata: &Self::Metadata,
        path: P,
    ) -> Result<(), Self::Error> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        Self::write_to(system, metadata, &mut writer)?;
        writer.flush()?;
        Ok(())
    }
}
