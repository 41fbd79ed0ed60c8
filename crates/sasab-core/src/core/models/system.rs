use super::atom::Atom;
use super::chain::Chain;
use super::ids::{AtomId, ChainId, ResidueId};
use super::residue::Residue;
use slotmap::SlotMap;
use std::collections::HashMap;

/// One `MODEL` block of a structure file.
///
/// Files without `MODEL` records contain a single implicit model with serial 1.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Model {
    /// The model serial number from the `MODEL` record.
    pub serial: usize,
    pub(crate) chains: Vec<ChainId>,
    pub(crate) atoms: Vec<AtomId>,
}

impl Model {
    pub(crate) fn new(serial: usize) -> Self {
        Self {
            serial,
            chains: Vec::new(),
            atoms: Vec::new(),
        }
    }

    /// Chains of this model in order of first appearance.
    pub fn chains(&self) -> &[ChainId] {
        &self.chains
    }

    /// Atoms of this model in file order.
    pub fn atoms(&self) -> &[AtomId] {
        &self.atoms
    }
}

/// Represents a complete molecular structure with models, chains, residues and atoms.
///
/// Atoms, residues and chains live in slot maps and are addressed by stable
/// IDs. File order is tracked separately so that iteration and serialization
/// reproduce the source layout.
#[derive(Debug, Clone, Default)]
pub struct MolecularSystem {
    /// Primary storage for atoms.
    atoms: SlotMap<AtomId, Atom>,
    /// Primary storage for residues.
    residues: SlotMap<ResidueId, Residue>,
    /// Primary storage for chains.
    chains: SlotMap<ChainId, Chain>,
    /// Models in file order.
    models: Vec<Model>,
    /// All atom IDs in file order.
    atom_order: Vec<AtomId>,
    /// Lookup map for chains by model index and chain identifier.
    chain_id_map: HashMap<(usize, char), ChainId>,
    /// Lookup map for residues by chain, sequence number and insertion code.
    residue_id_map: HashMap<(ChainId, isize, Option<char>), ResidueId>,
}

impl MolecularSystem {
    /// Creates a new, empty molecular system.
    pub fn new() -> Self {
        Self::default()
    }

    /// Retrieves an immutable reference to an atom by its ID.
    pub fn atom(&self, id: AtomId) -> Option<&Atom> {
        self.atoms.get(id)
    }

    /// Retrieves a mutable reference to an atom by its ID.
    pub fn atom_mut(&mut self, id: AtomId) -> Option<&mut Atom> {
        self.atoms.get_mut(id)
    }

    /// Returns an iterator over all atoms in file order.
    ///
    /// # Return
    ///
    /// An iterator yielding `(AtomId, &Atom)` pairs.
    pub fn atoms_iter(&self) -> impl Iterator<Item = (AtomId, &Atom)> {
        self.atom_order
            .iter()
            .filter_map(|&id| self.atoms.get(id).map(|atom| (id, atom)))
    }

    /// Returns the number of atoms across all models.
    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    /// Returns `true` if the system contains no atoms.
    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    /// Retrieves an immutable reference to a residue by its ID.
    pub fn residue(&self, id: ResidueId) -> Option<&Residue> {
        self.residues.get(id)
    }

    /// Retrieves an immutable reference to a chain by its ID.
    pub fn chain(&self, id: ChainId) -> Option<&Chain> {
        self.chains.get(id)
    }

    /// Returns the models in file order.
    pub fn models(&self) -> &[Model] {
        &self.models
    }

    /// Appends a new model and returns its index.
    pub fn add_model(&mut self, serial: usize) -> usize {
        self.models.push(Model::new(serial));
        self.models.len() - 1
    }

    /// Adds a new chain to a model or returns the existing one.
    ///
    /// This method is idempotent per model; if a chain with the given ID
    /// already exists in that model, the existing chain ID is returned.
    ///
    /// # Return
    ///
    /// Returns `None` if `model` is not a valid model index.
    pub fn add_chain(&mut self, model: usize, id: char) -> Option<ChainId> {
        if model >= self.models.len() {
            return None;
        }
        if let Some(&existing) = self.chain_id_map.get(&(model, id)) {
            return Some(existing);
        }
        let chain_id = self.chains.insert(Chain::new(id, model));
        self.chain_id_map.insert((model, id), chain_id);
        self.models[model].chains.push(chain_id);
        Some(chain_id)
    }

    /// Adds a new residue to a chain or returns the existing one.
    ///
    /// Residues are identified by sequence number and insertion code within
    /// their chain; the name of an existing residue is left untouched.
    ///
    /// # Return
    ///
    /// Returns `None` if the chain does not exist.
    pub fn add_residue(
        &mut self,
        chain_id: ChainId,
        number: isize,
        insertion_code: Option<char>,
        name: &str,
    ) -> Option<ResidueId> {
        let chain = self.chains.get_mut(chain_id)?;
        let key = (chain_id, number, insertion_code);

        let residue_id = *self.residue_id_map.entry(key).or_insert_with(|| {
            let residue = Residue::new(number, insertion_code, name, chain_id);
            self.residues.insert(residue)
        });

        if !chain.residues.contains(&residue_id) {
            chain.residues.push(residue_id);
        }
        Some(residue_id)
    }

    /// Adds an atom to an existing residue.
    ///
    /// The atom's `residue_id` is overwritten with `residue_id`.
    ///
    /// # Return
    ///
    /// Returns `None` if the residue or its chain does not exist.
    pub fn add_atom_to_residue(&mut self, residue_id: ResidueId, mut atom: Atom) -> Option<AtomId> {
        let chain_id = self.residues.get(residue_id)?.chain_id;
        let model = self.chains.get(chain_id)?.model;

        atom.residue_id = residue_id;
        let conformer = atom.alt_loc.map(|_| (atom.name.clone(), atom.occupancy));
        let atom_id = self.atoms.insert(atom);

        let residue = self.residues.get_mut(residue_id)?;
        match conformer {
            Some((name, occupancy)) => residue.add_conformer(&name, atom_id, occupancy),
            None => residue.add_atom(atom_id),
        }
        self.models.get_mut(model)?.atoms.push(atom_id);
        self.atom_order.push(atom_id);
        Some(atom_id)
    }

    /// Returns `true` if the atom is the primary conformer of its residue.
    ///
    /// Atoms without alternate locations are always primary. Among the
    /// alternate locations of a name, the highest-occupancy conformer is
    /// primary, the first listed one on a tie.
    pub fn is_primary_conformer(&self, atom_id: AtomId) -> bool {
        let Some(atom) = self.atoms.get(atom_id) else {
            return false;
        };
        if atom.alt_loc.is_none() {
            return true;
        }
        self.residues
            .get(atom.residue_id)
            .is_some_and(|residue| residue.is_primary(&atom.name, atom_id))
    }

    /// Returns the primary conformer that an atom shadows, or the atom itself.
    pub fn primary_conformer_of(&self, atom_id: AtomId) -> Option<AtomId> {
        let atom = self.atoms.get(atom_id)?;
        if atom.alt_loc.is_none() {
            return Some(atom_id);
        }
        self.residues
            .get(atom.residue_id)?
            .primary_conformer(&atom.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    fn atom(serial: usize, name: &str) -> Atom {
        Atom::new(serial, name, ResidueId::default(), Point3::origin())
    }

    fn two_model_system() -> MolecularSystem {
        let mut system = MolecularSystem::new();
        for serial in 1..=2 {
            let model = system.add_model(serial);
            let chain = system.add_chain(model, 'A').unwrap();
            let residue = system.add_residue(chain, 1, None, "GLY").unwrap();
            system.add_atom_to_residue(residue, atom(1, " N  ")).unwrap();
            system.add_atom_to_residue(residue, atom(2, " CA ")).unwrap();
        }
        system
    }

    #[test]
    fn new_system_is_empty() {
        let system = MolecularSystem::new();
        assert!(system.is_empty());
        assert_eq!(system.atom_count(), 0);
        assert!(system.models().is_empty());
        assert_eq!(system.atoms_iter().count(), 0);
    }

    #[test]
    fn add_chain_requires_existing_model() {
        let mut system = MolecularSystem::new();
        assert!(system.add_chain(0, 'A').is_none());
        let model = system.add_model(1);
        assert!(system.add_chain(model, 'A').is_some());
    }

    #[test]
    fn add_chain_and_residue_are_idempotent() {
        let mut system = MolecularSystem::new();
        let model = system.add_model(1);
        let chain1 = system.add_chain(model, 'A').unwrap();
        let chain2 = system.add_chain(model, 'A').unwrap();
        assert_eq!(chain1, chain2);

        let res1 = system.add_residue(chain1, 5, None, "ALA").unwrap();
        let res2 = system.add_residue(chain1, 5, None, "GLY").unwrap();
        let res3 = system.add_residue(chain1, 5, Some('A'), "ALA").unwrap();
        assert_eq!(res1, res2);
        assert_ne!(res1, res3);
        assert_eq!(system.residue(res1).unwrap().name, "ALA");
        assert_eq!(system.chain(chain1).unwrap().residues(), &[res1, res3]);
    }

    #[test]
    fn models_keep_separate_chains_and_atoms() {
        let system = two_model_system();
        assert_eq!(system.models().len(), 2);
        assert_eq!(system.atom_count(), 4);

        let first = &system.models()[0];
        let second = &system.models()[1];
        assert_eq!(first.atoms().len(), 2);
        assert_eq!(second.atoms().len(), 2);
        assert_ne!(first.chains()[0], second.chains()[0]);
        assert_eq!(system.chain(second.chains()[0]).unwrap().model, 1);
    }

    #[test]
    fn atoms_iter_follows_insertion_order() {
        let system = two_model_system();
        let serials: Vec<usize> = system.atoms_iter().map(|(_, a)| a.serial).collect();
        assert_eq!(serials, vec![1, 2, 1, 2]);
    }

    #[test]
    fn add_atom_sets_residue_id() {
        let mut system = MolecularSystem::new();
        let model = system.add_model(1);
        let chain = system.add_chain(model, 'B').unwrap();
        let residue = system.add_residue(chain, 3, None, "SER").unwrap();
        let id = system.add_atom_to_residue(residue, atom(9, " OG ")).unwrap();
        assert_eq!(system.atom(id).unwrap().residue_id, residue);
        assert_eq!(system.residue(residue).unwrap().atoms(), &[id]);
    }

    #[test]
    fn alternate_conformers_point_at_their_primary() {
        let mut system = MolecularSystem::new();
        let model = system.add_model(1);
        let chain = system.add_chain(model, 'A').unwrap();
        let residue = system.add_residue(chain, 1, None, "SER").unwrap();

        let mut og_a = atom(1, " OG ");
        og_a.alt_loc = Some('A');
        og_a.occupancy = 0.5;
        let mut og_b = atom(2, " OG ");
        og_b.alt_loc = Some('B');
        og_b.occupancy = 0.5;
        let a = system.add_atom_to_residue(residue, og_a).unwrap();
        let b = system.add_atom_to_residue(residue, og_b).unwrap();

        assert!(system.is_primary_conformer(a));
        assert!(!system.is_primary_conformer(b));
        assert_eq!(system.primary_conformer_of(b), Some(a));
        assert_eq!(system.primary_conformer_of(a), Some(a));
    }

    #[test]
    fn higher_occupancy_conformer_listed_later_is_primary() {
        let mut system = MolecularSystem::new();
        let model = system.add_model(1);
        let chain = system.add_chain(model, 'A').unwrap();
        let residue = system.add_residue(chain, 1, None, "SER").unwrap();

        let mut og_a = atom(1, " OG ");
        og_a.alt_loc = Some('A');
        og_a.occupancy = 0.4;
        let mut og_b = atom(2, " OG ");
        og_b.alt_loc = Some('B');
        og_b.occupancy = 0.6;
        let a = system.add_atom_to_residue(residue, og_a).unwrap();
        let b = system.add_atom_to_residue(residue, og_b).unwrap();
        let cb = system.add_atom_to_residue(residue, atom(3, " CB ")).unwrap();

        assert!(!system.is_primary_conformer(a));
        assert!(system.is_primary_conformer(b));
        assert!(system.is_primary_conformer(cb));
        assert_eq!(system.primary_conformer_of(a), Some(b));
        assert_eq!(system.residue(residue).unwrap().atoms(), &[a, b, cb]);
    }

    #[test]
    fn duplicate_names_without_alt_loc_are_all_primary() {
        let mut system = MolecularSystem::new();
        let model = system.add_model(1);
        let chain = system.add_chain(model, 'A').unwrap();
        let residue = system.add_residue(chain, 1, None, "LIG").unwrap();

        let first = system.add_atom_to_residue(residue, atom(1, " C  ")).unwrap();
        let second = system.add_atom_to_residue(residue, atom(2, " C  ")).unwrap();

        assert!(system.is_primary_conformer(first));
        assert!(system.is_primary_conformer(second));
        assert_eq!(system.primary_conformer_of(second), Some(second));
    }
}
