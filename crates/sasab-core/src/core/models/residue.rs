use super::ids::{AtomId, ChainId};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Conformer {
    atom_id: AtomId,
    occupancy: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Residue {
    pub number: isize,                // Residue sequence number from source file
    pub insertion_code: Option<char>, // PDB insertion code (column 27)
    pub name: String,                 // Name of the residue (e.g., "ALA", "HOH")
    pub chain_id: ChainId,            // ID of the parent chain
    pub(crate) atoms: Vec<AtomId>,    // Atoms in file order, all conformers included
    primary_conformers: HashMap<String, Conformer>, // Alternate-location atoms only
}

impl Residue {
    pub(crate) fn new(
        number: isize,
        insertion_code: Option<char>,
        name: &str,
        chain_id: ChainId,
    ) -> Self {
        Self {
            number,
            insertion_code,
            name: name.to_string(),
            chain_id,
            atoms: Vec::new(),
            primary_conformers: HashMap::new(),
        }
    }

    pub(crate) fn add_atom(&mut self, atom_id: AtomId) {
        self.atoms.push(atom_id);
    }

    /// Registers one alternate-location conformer of `atom_name`.
    ///
    /// The conformer with the highest occupancy becomes the primary one; on a
    /// tie the one registered first keeps the role.
    pub(crate) fn add_conformer(&mut self, atom_name: &str, atom_id: AtomId, occupancy: f64) {
        self.atoms.push(atom_id);
        let candidate = Conformer {
            atom_id,
            occupancy,
        };
        self.primary_conformers
            .entry(atom_name.to_string())
            .and_modify(|best| {
                if occupancy > best.occupancy {
                    *best = candidate;
                }
            })
            .or_insert(candidate);
    }

    pub fn atoms(&self) -> &[AtomId] {
        &self.atoms
    }

    /// The primary conformer registered under `name`, if the name has
    /// alternate locations.
    pub fn primary_conformer(&self, name: &str) -> Option<AtomId> {
        self.primary_conformers.get(name).map(|c| c.atom_id)
    }

    /// Returns `true` if `atom_id` is the primary conformer for `name`.
    pub fn is_primary(&self, name: &str, atom_id: AtomId) -> bool {
        self.primary_conformer(name) == Some(atom_id)
    }
}
