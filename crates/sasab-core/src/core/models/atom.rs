use super::ids::ResidueId;
use nalgebra::Point3;
use std::fmt;
use std::str::FromStr;

/// Distinguishes standard polymer atoms from heteroatoms, mirroring the
/// `ATOM` and `HETATM` record names of the PDB format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RecordKind {
    /// Standard residue atom (`ATOM`).
    #[default]
    Atom,
    /// Ligand, water, ion or modified residue atom (`HETATM`).
    Hetatm,
}

impl RecordKind {
    /// Returns the record name as written in column 1-6 of a PDB file.
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Atom => "ATOM",
            RecordKind::Hetatm => "HETATM",
        }
    }
}

impl FromStr for RecordKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ATOM" => Ok(RecordKind::Atom),
            "HETATM" => Ok(RecordKind::Hetatm),
            _ => Err(()),
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Represents an atom read from a structure file together with its
/// computed solvent-accessible surface area.
///
/// The coordinate and identity fields are read-only inputs for the surface
/// calculation. `sasa` stays `None` until the atom has been annotated, and
/// `b_factor` is the value that ends up in the temperature-factor column when
/// the structure is written back out.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// The atom serial number from the source file, 0 when it was not a
    /// decimal number.
    pub serial: usize,
    /// The raw serial column when it did not parse as a decimal number.
    pub serial_text: Option<String>,
    /// The trimmed atom name (e.g., "CA", "OG1", "FE").
    pub name: String,
    /// The alternate location indicator, if the atom has one.
    pub alt_loc: Option<char>,
    /// Whether the atom came from an `ATOM` or `HETATM` record.
    pub record: RecordKind,
    /// The ID of the parent residue this atom belongs to.
    pub residue_id: ResidueId,
    /// The 3D coordinates of the atom in Angstroms.
    pub position: Point3<f64>,
    /// Site occupancy.
    pub occupancy: f64,
    /// The temperature-factor column. Overwritten with the SASA on annotation.
    pub b_factor: f64,
    /// Upper-case element symbol, read from the file or inferred from the name.
    pub element: String,
    /// Segment identifier (columns 73-76), kept for round-tripping.
    pub segment_id: String,
    /// Formal charge text (columns 79-80), kept for round-tripping.
    pub formal_charge: String,
    /// Solvent-accessible surface area in square Angstroms, once computed.
    pub sasa: Option<f64>,
}

impl Atom {
    /// Creates a new `Atom` with default values for the optional PDB fields.
    ///
    /// The element is inferred from the atom name; callers that have an
    /// explicit element column should overwrite it.
    pub fn new(serial: usize, name: &str, residue_id: ResidueId, position: Point3<f64>) -> Self {
        Self {
            serial,
            serial_text: None,
            name: name.trim().to_string(),
            alt_loc: None,
            record: RecordKind::default(),
            residue_id,
            position,
            occupancy: 1.0,
            b_factor: 0.0,
            element: infer_element(name).unwrap_or_default(),
            segment_id: String::new(),
            formal_charge: String::new(),
            sasa: None,
        }
    }

    /// Stores the computed surface area and mirrors it into the B-factor column.
    pub fn set_sasa(&mut self, area: f64) {
        self.sasa = Some(area);
        self.b_factor = area;
    }
}

// Two-letter elements that occur in biological structures often enough to be
// worth recognizing from a left-aligned atom name.
const TWO_LETTER_ELEMENTS: &[&str] = &[
    "HE", "LI", "BE", "NA", "MG", "AL", "SI", "CL", "AR", "CA", "MN", "FE", "CO", "NI", "CU",
    "ZN", "GA", "SE", "BR", "KR", "RB", "SR", "MO", "AG", "CD", "SN", "SB", "XE", "CS", "BA",
    "PT", "AU", "HG", "TL", "PB",
];

/// Infers an element symbol from a PDB atom-name field.
///
/// The field is expected in its raw 4-column form (columns 13-16). Names that
/// start in column 13 and consist of a known two-letter element, optionally
/// followed by a short numeric label (e.g. `"FE  "`, `"ZN  "`, `"CL1 "`), map to
/// that element. Otherwise the first alphabetic character is used, which
/// covers names such as `" CA "`, `"1HB "` and `"HG21"`.
pub fn infer_element(name_field: &str) -> Option<String> {
    let starts_in_first_column = name_field
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic());
    let trimmed = name_field.trim().to_ascii_uppercase();

    if starts_in_first_column && (2..=3).contains(&trimmed.len()) {
        let candidate = &trimmed[..2];
        let label_ok = trimmed.len() == 2
            || (!trimmed.starts_with('H') && trimmed[2..].chars().all(|c| c.is_ascii_digit()));
        if label_ok && TWO_LETTER_ELEMENTS.contains(&candidate) {
            return Some(candidate.to_string());
        }
    }

    trimmed
        .chars()
        .find(|c| c.is_ascii_alphabetic())
        .map(|c| c.to_string())
}
