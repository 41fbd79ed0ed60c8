use crate::core::io::traits::MolecularFile;
use crate::core::models::atom::{Atom, RecordKind, infer_element};
use crate::core::models::builder::{MolecularSystemBuilder, ResidueKey};
use crate::core::models::ids::{AtomId, ResidueId};
use crate::core::models::system::MolecularSystem;
use nalgebra::Point3;
use std::io::{self, BufRead, Write};
use thiserror::Error;
use tracing::warn;

/// A line of the source file in its original position.
///
/// Atom records point at the atom they produced so that the writer can emit
/// the (possibly updated) atom in place; every other record is carried verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PdbRecord {
    Raw(String),
    Atom(AtomId),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PdbMetadata {
    pub records: Vec<PdbRecord>,
}

impl PdbMetadata {
    /// Number of records that are not atom records.
    pub fn raw_record_count(&self) -> usize {
        self.records
            .iter()
            .filter(|r| matches!(r, PdbRecord::Raw(_)))
            .count()
    }
}

#[derive(Debug, Error)]
pub enum PdbError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse { line: usize, kind: PdbParseErrorKind },
    #[error("Inconsistent data: {0}")]
    Inconsistency(String),
}

#[derive(Debug, Error)]
pub enum PdbParseErrorKind {
    #[error("Invalid integer format in columns {columns} (value: '{value}')")]
    InvalidInt { columns: &'static str, value: String },
    #[error("Invalid float format in columns {columns} (value: '{value}')")]
    InvalidFloat { columns: &'static str, value: String },
    #[error("Required field in columns {columns} is empty")]
    MissingRequiredField { columns: &'static str },
    #[error("Line is too short for ATOM/HETATM record (must reach column 54)")]
    LineTooShort,
}

const MIN_ATOM_LINE_LEN: usize = 54;

fn column(line: &str, start: usize, end: usize) -> &str {
    line.get(start..end.min(line.len())).unwrap_or("")
}

fn slice_and_trim(line: &str, start: usize, end: usize) -> &str {
    column(line, start, end).trim()
}

fn optional_char(line: &str, at: usize) -> Option<char> {
    column(line, at, at + 1)
        .chars()
        .next()
        .filter(|c| !c.is_whitespace())
}

fn parse_float(
    line: &str,
    line_num: usize,
    (start, end): (usize, usize),
    columns: &'static str,
) -> Result<f64, PdbError> {
    let value = slice_and_trim(line, start, end);
    value.parse().map_err(|_| PdbError::Parse {
        line: line_num,
        kind: PdbParseErrorKind::InvalidFloat {
            columns,
            value: value.into(),
        },
    })
}

fn parse_optional_float(
    line: &str,
    line_num: usize,
    span: (usize, usize),
    columns: &'static str,
    default: f64,
) -> Result<f64, PdbError> {
    if slice_and_trim(line, span.0, span.1).is_empty() {
        Ok(default)
    } else {
        parse_float(line, line_num, span, columns)
    }
}

fn parse_int<T: std::str::FromStr>(
    line: &str,
    line_num: usize,
    (start, end): (usize, usize),
    columns: &'static str,
) -> Result<T, PdbError> {
    let value = slice_and_trim(line, start, end);
    value.parse().map_err(|_| PdbError::Parse {
        line: line_num,
        kind: PdbParseErrorKind::InvalidInt {
            columns,
            value: value.into(),
        },
    })
}

struct AtomSite<'a> {
    key: ResidueKey<'a>,
    atom: Atom,
}

fn parse_atom_line(line: &str, line_num: usize, record: RecordKind) -> Result<AtomSite<'_>, PdbError> {
    if line.len() < MIN_ATOM_LINE_LEN {
        return Err(PdbError::Parse {
            line: line_num,
            kind: PdbParseErrorKind::LineTooShort,
        });
    }

    // Files past 99,999 atoms carry `*****` or hybrid-36 serials. Those read
    // as 0 and are written back as found.
    let serial_field = slice_and_trim(line, 6, 11);
    let (serial, serial_text) = match serial_field.parse::<usize>() {
        Ok(serial) => (serial, None),
        Err(_) => (0, Some(serial_field.to_string())),
    };
    let name_field = column(line, 12, 16);
    if name_field.trim().is_empty() {
        return Err(PdbError::Parse {
            line: line_num,
            kind: PdbParseErrorKind::MissingRequiredField { columns: "13-16" },
        });
    }
    let res_number: isize = parse_int(line, line_num, (22, 26), "23-26")?;
    let x = parse_float(line, line_num, (30, 38), "31-38")?;
    let y = parse_float(line, line_num, (38, 46), "39-46")?;
    let z = parse_float(line, line_num, (46, 54), "47-54")?;
    let occupancy = parse_optional_float(line, line_num, (54, 60), "55-60", 1.0)?;
    let b_factor = parse_optional_float(line, line_num, (60, 66), "61-66", 0.0)?;

    let element_col = slice_and_trim(line, 76, 78);
    let element = if !element_col.is_empty() && element_col.chars().all(|c| c.is_ascii_alphabetic())
    {
        element_col.to_ascii_uppercase()
    } else {
        infer_element(name_field).unwrap_or_default()
    };

    let mut atom = Atom::new(serial, name_field, ResidueId::default(), Point3::new(x, y, z));
    atom.serial_text = serial_text;
    atom.alt_loc = optional_char(line, 16);
    atom.record = record;
    atom.occupancy = occupancy;
    atom.b_factor = b_factor;
    atom.element = element;
    atom.segment_id = slice_and_trim(line, 72, 76).to_string();
    atom.formal_charge = slice_and_trim(line, 78, 80).to_string();

    Ok(AtomSite {
        key: ResidueKey {
            chain_id: optional_char(line, 21).unwrap_or(' '),
            number: res_number,
            insertion_code: optional_char(line, 26),
            name: slice_and_trim(line, 17, 20),
        },
        atom,
    })
}

const B_FACTOR_WIDTH: usize = 6;

/// Formats the temperature-factor column (61-66) with two decimals, dropping
/// decimals for values that would otherwise spill into column 67.
fn b_factor_field(value: f64) -> String {
    (0..=2)
        .rev()
        .map(|precision| format!("{:>width$.precision$}", value, width = B_FACTOR_WIDTH))
        .find(|field| field.len() <= B_FACTOR_WIDTH)
        .unwrap_or_else(|| format!("{:>width$.0}", value, width = B_FACTOR_WIDTH))
}

fn b_factor_fits(value: f64) -> bool {
    format!("{:.2}", value).len() <= B_FACTOR_WIDTH
}

/// Lays out an atom name in columns 13-16 following the PDB convention.
fn format_atom_name(name: &str, element: &str) -> String {
    if name.len() >= 4 {
        name.chars().take(4).collect()
    } else if element.len() == 2 || name.starts_with(|c: char| c.is_ascii_digit()) {
        format!("{:<4}", name)
    } else {
        format!(" {:<3}", name)
    }
}

fn format_atom_line(system: &MolecularSystem, atom: &Atom) -> Result<String, PdbError> {
    let residue = system.residue(atom.residue_id).ok_or_else(|| {
        PdbError::Inconsistency(format!("Atom {} has no parent residue", atom.serial))
    })?;
    let chain = system.chain(residue.chain_id).ok_or_else(|| {
        PdbError::Inconsistency(format!(
            "Residue {} {} has no parent chain",
            residue.name, residue.number
        ))
    })?;

    let serial = match &atom.serial_text {
        Some(text) => text.clone(),
        None => atom.serial.to_string(),
    };

    Ok(format!(
        "{:<6}{:>5} {}{}{:>3} {}{:>4}{}   {:>8.3}{:>8.3}{:>8.3}{:>6.2}{}      {:<4}{:>2}{:<2}",
        atom.record.as_str(),
        serial,
        format_atom_name(&atom.name, &atom.element),
        atom.alt_loc.unwrap_or(' '),
        residue.name,
        chain.id,
        residue.number,
        residue.insertion_code.unwrap_or(' '),
        atom.position.x,
        atom.position.y,
        atom.position.z,
        atom.occupancy,
        b_factor_field(atom.b_factor),
        atom.segment_id,
        atom.element,
        atom.formal_charge,
    ))
}

fn write_atom(
    system: &MolecularSystem,
    atom_id: AtomId,
    writer: &mut impl Write,
) -> Result<(), PdbError> {
    let atom = system
        .atom(atom_id)
        .ok_or_else(|| PdbError::Inconsistency(format!("Atom {:?} not found", atom_id)))?;
    writeln!(writer, "{}", format_atom_line(system, atom)?)?;
    Ok(())
}

pub struct PdbFile;

impl MolecularFile for PdbFile {
    type Metadata = PdbMetadata;
    type Error = PdbError;

    fn read_from(
        reader: &mut impl BufRead,
    ) -> Result<(MolecularSystem, Self::Metadata), Self::Error> {
        let mut builder = MolecularSystemBuilder::new();
        let mut metadata = PdbMetadata::default();
        let mut models_seen = 0usize;
        let mut non_numeric_serials = 0usize;

        for (line_num, line_res) in reader.lines().enumerate() {
            let line = line_res?;
            let line = line.trim_end_matches(['\r', '\n']);
            let line_num = line_num + 1;

            if line.trim().is_empty() {
                continue;
            }

            let record_type = slice_and_trim(line, 0, 6);
            match record_type {
                "ATOM" | "HETATM" => {
                    let record: RecordKind = record_type.parse().unwrap_or_default();
                    let site = parse_atom_line(line, line_num, record)?;
                    if site.atom.serial_text.is_some() {
                        non_numeric_serials += 1;
                    }
                    let atom_id = builder.add_atom(&site.key, site.atom).ok_or_else(|| {
                        PdbError::Inconsistency(format!(
                            "Could not place atom from line {} in the structure",
                            line_num
                        ))
                    })?;
                    metadata.records.push(PdbRecord::Atom(atom_id));
                }
                "MODEL" => {
                    models_seen += 1;
                    let serial = column(line, 6, line.len())
                        .trim()
                        .parse()
                        .unwrap_or(models_seen);
                    builder.start_model(serial);
                    metadata.records.push(PdbRecord::Raw(line.to_string()));
                }
                "ENDMDL" => {
                    builder.end_model();
                    metadata.records.push(PdbRecord::Raw(line.to_string()));
                }
                "END" => break,
                _ => metadata.records.push(PdbRecord::Raw(line.to_string())),
            }
        }

        if non_numeric_serials > 0 {
            warn!(
                atoms = non_numeric_serials,
                "Atom serials that are not decimal numbers were read as 0."
            );
        }

        Ok((builder.build(), metadata))
    }

    fn write_to(
        system: &MolecularSystem,
        metadata: &Self::Metadata,
        writer: &mut impl Write,
    ) -> Result<(), Self::Error> {
        let mut rounded = 0usize;
        for record in &metadata.records {
            match record {
                PdbRecord::Raw(line) => writeln!(writer, "{}", line)?,
                PdbRecord::Atom(atom_id) => {
                    if system.atom(*atom_id).is_some_and(|a| !b_factor_fits(a.b_factor)) {
                        rounded += 1;
                    }
                    write_atom(system, *atom_id, writer)?
                }
            }
        }
        writeln!(writer, "END")?;
        if rounded > 0 {
            warn!(
                atoms = rounded,
                "B-factor values too wide for two decimals; written with reduced precision."
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const SMALL_PDB: &str = "\
HEADER    TEST STRUCTURE                          01-JAN-00   1ABC
CRYST1   50.000   50.000   50.000  90.00  90.00  90.00 P 1           1
ATOM      1  N   GLY A   1      11.104   6.134  -6.504  1.00 10.00           N
ATOM      2  CA  GLY A   1      11.639   6.071  -5.147  1.00 11.50           C
ATOM      3  C   GLY A   1      13.011   6.715  -5.013  0.50  9.00           C
TER       4      GLY A   1
HETATM    5 FE   HEM A 101       0.000   0.000   0.000  1.00 20.00          FE
HETATM    6  O   HOH B 201       5.000   5.000   5.000  1.00 30.00           O
CONECT    5    6
END
";

    fn read(content: &str) -> Result<(MolecularSystem, PdbMetadata), PdbError> {
        PdbFile::read_from(&mut Cursor::new(content))
    }

    fn write(system: &MolecularSystem, metadata: &PdbMetadata) -> String {
        let mut buffer = Vec::new();
        PdbFile::write_to(system, metadata, &mut buffer).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn read_parses_atom_fields() {
        let (system, metadata) = read(SMALL_PDB).unwrap();
        assert_eq!(system.atom_count(), 6);
        assert_eq!(metadata.raw_record_count(), 4);

        let atoms: Vec<&Atom> = system.atoms_iter().map(|(_, a)| a).collect();
        let ca = atoms[1];
        assert_eq!(ca.serial, 2);
        assert_eq!(ca.name, "CA");
        assert_eq!(ca.element, "C");
        assert_eq!(ca.record, RecordKind::Atom);
        assert!((ca.position.x - 11.639).abs() < 1e-9);
        assert!((ca.position.z + 5.147).abs() < 1e-9);
        assert_eq!(ca.b_factor, 11.5);
        assert_eq!(atoms[2].occupancy, 0.5);

        let fe = atoms[4];
        assert_eq!(fe.element, "FE");
        assert_eq!(fe.record, RecordKind::Hetatm);
        let residue = system.residue(fe.residue_id).unwrap();
        assert_eq!(residue.name, "HEM");
        assert_eq!(residue.number, 101);
    }

    #[test]
    fn read_groups_chains_and_residues() {
        let (system, _) = read(SMALL_PDB).unwrap();
        assert_eq!(system.models().len(), 1);
        let model = &system.models()[0];
        assert_eq!(model.chains().len(), 2);
        let chain_a = system.chain(model.chains()[0]).unwrap();
        assert_eq!(chain_a.id, 'A');
        assert_eq!(chain_a.residues().len(), 2);
    }

    #[test]
    fn element_is_inferred_when_column_is_missing() {
        let content = "ATOM      1  CA  ALA A   1       1.000   2.000   3.000\n\
                       HETATM    2 ZN    ZN A 300       0.000   0.000   0.000\n";
        let (system, _) = read(content).unwrap();
        let elements: Vec<String> = system.atoms_iter().map(|(_, a)| a.element.clone()).collect();
        assert_eq!(elements, vec!["C", "ZN"]);
        let first = system.atoms_iter().next().unwrap().1;
        assert_eq!(first.occupancy, 1.0);
        assert_eq!(first.b_factor, 0.0);
    }

    #[test]
    fn alternate_locations_and_insertion_codes_are_read() {
        let content = "\
ATOM      1  OG ASER A  10A      1.000   2.000   3.000  0.60 10.00           O
ATOM      2  OG BSER A  10A      1.500   2.500   3.500  0.40 10.00           O
";
        let (system, _) = read(content).unwrap();
        let atoms: Vec<(AtomId, &Atom)> = system.atoms_iter().collect();
        assert_eq!(atoms[0].1.alt_loc, Some('A'));
        assert_eq!(atoms[1].1.alt_loc, Some('B'));
        let residue = system.residue(atoms[0].1.residue_id).unwrap();
        assert_eq!(residue.insertion_code, Some('A'));
        assert!(system.is_primary_conformer(atoms[0].0));
        assert!(!system.is_primary_conformer(atoms[1].0));
    }

    #[test]
    fn multiple_models_are_separated() {
        let content = "\
MODEL        1
ATOM      1  N   GLY A   1       0.000   0.000   0.000  1.00  0.00           N
ENDMDL
MODEL        2
ATOM      1  N   GLY A   1       1.000   0.000   0.000  1.00  0.00           N
ENDMDL
END
";
        let (system, metadata) = read(content).unwrap();
        assert_eq!(system.models().len(), 2);
        assert_eq!(system.models()[1].serial, 2);
        assert_eq!(system.models()[0].atoms().len(), 1);
        assert_eq!(metadata.raw_record_count(), 4);
    }

    #[test]
    fn reading_stops_at_end_record() {
        let content = "\
ATOM      1  N   GLY A   1       0.000   0.000   0.000  1.00  0.00           N
END
ATOM      2  CA  GLY A   1       1.000   0.000   0.000  1.00  0.00           C
";
        let (system, _) = read(content).unwrap();
        assert_eq!(system.atom_count(), 1);
    }

    #[test]
    fn file_without_atoms_reads_as_empty_system() {
        let (system, metadata) = read("HEADER    EMPTY\nEND\n").unwrap();
        assert!(system.is_empty());
        assert_eq!(metadata.records.len(), 1);
    }

    #[test]
    fn short_atom_line_is_rejected() {
        let err = read("ATOM      1  N   GLY A   1       0.000   0.000\n").unwrap_err();
        assert!(matches!(
            err,
            PdbError::Parse {
                line: 1,
                kind: PdbParseErrorKind::LineTooShort
            }
        ));
    }

    #[test]
    fn invalid_coordinate_reports_columns_and_line() {
        let content = "HEADER    X\nATOM      1  N   GLY A   1       0.000   abc     0.000  1.00  0.00\n";
        let err = read(content).unwrap_err();
        match err {
            PdbError::Parse {
                line,
                kind: PdbParseErrorKind::InvalidFloat { columns, value },
            } => {
                assert_eq!(line, 2);
                assert_eq!(columns, "39-46");
                assert_eq!(value, "abc");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_atom_name_is_rejected() {
        let no_name = "ATOM      1      GLY A   1       0.000   0.000   0.000  1.00  0.00\n";
        assert!(matches!(
            read(no_name).unwrap_err(),
            PdbError::Parse {
                kind: PdbParseErrorKind::MissingRequiredField { columns: "13-16" },
                ..
            }
        ));
    }

    #[test]
    fn write_preserves_records_and_updates_b_factor() {
        let (mut system, metadata) = read(SMALL_PDB).unwrap();
        let ids: Vec<AtomId> = system.atoms_iter().map(|(id, _)| id).collect();
        for (i, id) in ids.iter().enumerate() {
            system.atom_mut(*id).unwrap().set_sasa(i as f64 * 10.5);
        }

        let output = write(&system, &metadata);
        let lines: Vec<&str> = output.lines().collect();

        assert!(lines[0].starts_with("HEADER"));
        assert!(lines[1].starts_with("CRYST1"));
        assert!(lines[5].starts_with("TER"));
        assert!(lines[8].starts_with("CONECT"));
        assert_eq!(*lines.last().unwrap(), "END");

        let ca_line = lines[3];
        assert!(ca_line.starts_with("ATOM      2  CA  GLY A   1"));
        assert_eq!(&ca_line[60..66], " 10.50");
        assert_eq!(&ca_line[54..60], "  1.00");
        assert_eq!(&ca_line[30..38], "  11.639");

        let fe_line = lines[6];
        assert_eq!(&fe_line[12..16], "FE  ");
        assert_eq!(&fe_line[60..66], " 42.00");
        assert_eq!(fe_line[76..78].trim(), "FE");
    }

    #[test]
    fn written_file_reads_back_with_same_atoms() {
        let (mut system, metadata) = read(SMALL_PDB).unwrap();
        let ids: Vec<AtomId> = system.atoms_iter().map(|(id, _)| id).collect();
        for id in &ids {
            system.atom_mut(*id).unwrap().set_sasa(7.25);
        }
        let output = write(&system, &metadata);
        let (reread, _) = read(&output).unwrap();

        assert_eq!(reread.atom_count(), system.atom_count());
        for ((_, a), (_, b)) in system.atoms_iter().zip(reread.atoms_iter()) {
            assert_eq!(a.name, b.name);
            assert_eq!(a.element, b.element);
            assert!((a.position - b.position).norm() < 1e-3);
            assert_eq!(b.b_factor, 7.25);
        }
    }

    #[test]
    fn overflowed_serials_read_as_zero_and_write_back_unchanged() {
        let content = "\
ATOM  *****  N   GLY A   1       0.000   0.000   0.000  1.00  0.00           N
ATOM  A0000  CA  GLY A   1       1.000   0.000   0.000  1.00  0.00           C
ATOM  99999  C   GLY A   1       2.000   0.000   0.000  1.00  0.00           C
";
        let (system, metadata) = read(content).unwrap();
        let atoms: Vec<&Atom> = system.atoms_iter().map(|(_, a)| a).collect();
        assert_eq!(atoms[0].serial, 0);
        assert_eq!(atoms[0].serial_text.as_deref(), Some("*****"));
        assert_eq!(atoms[1].serial, 0);
        assert_eq!(atoms[1].serial_text.as_deref(), Some("A0000"));
        assert_eq!(atoms[2].serial, 99999);
        assert_eq!(atoms[2].serial_text, None);

        let output = write(&system, &metadata);
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(&lines[0][6..11], "*****");
        assert_eq!(&lines[1][6..11], "A0000");
        assert_eq!(&lines[2][6..11], "99999");
    }

    #[test]
    fn wide_b_factors_keep_the_column_layout() {
        assert_eq!(b_factor_field(42.0), " 42.00");
        assert_eq!(b_factor_field(999.99), "999.99");
        assert_eq!(b_factor_field(1234.5678), "1234.6");
        assert_eq!(b_factor_field(12345.6), " 12346");
        assert!(b_factor_fits(999.99));
        assert!(!b_factor_fits(1000.0));

        let (mut system, metadata) = read(SMALL_PDB).unwrap();
        let ids: Vec<AtomId> = system.atoms_iter().map(|(id, _)| id).collect();
        system.atom_mut(ids[1]).unwrap().set_sasa(1520.537);
        let output = write(&system, &metadata);
        let ca_line = output.lines().nth(3).unwrap();

        assert_eq!(&ca_line[60..66], "1520.5");
        assert_eq!(ca_line[76..78].trim(), "C");
        assert_eq!(ca_line.len(), 80);
    }

    #[test]
    fn atom_names_follow_column_convention() {
        assert_eq!(format_atom_name("CA", "C"), " CA ");
        assert_eq!(format_atom_name("N", "N"), " N  ");
        assert_eq!(format_atom_name("OG1", "O"), " OG1");
        assert_eq!(format_atom_name("FE", "FE"), "FE  ");
        assert_eq!(format_atom_name("HG21", "H"), "HG21");
        assert_eq!(format_atom_name("1HB", "H"), "1HB ");
    }
}
