use super::atom::Atom;
use super::ids::{AtomId, ChainId, ResidueId};
use super::system::MolecularSystem;

const IMPLICIT_MODEL_SERIAL: usize = 1;

/// Residue-level fields of an atom record, used to place the atom in the hierarchy.
#[derive(Debug, Clone, PartialEq)]
pub struct ResidueKey<'a> {
    pub chain_id: char,
    pub number: isize,
    pub insertion_code: Option<char>,
    pub name: &'a str,
}

/// Incrementally assembles a [`MolecularSystem`] from a stream of atom records.
///
/// Models are opened explicitly with [`start_model`](Self::start_model); atoms
/// added before any model is opened go into an implicit model with serial 1.
/// Chains and residues are created on demand from each atom's [`ResidueKey`].
pub struct MolecularSystemBuilder {
    system: MolecularSystem,

    // --- Builder-specific state for efficient construction ---
    current_model: Option<usize>,
    current_chain: Option<(char, ChainId)>,
    current_residue: Option<((isize, Option<char>), ResidueId)>,
}

impl Default for MolecularSystemBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MolecularSystemBuilder {
    pub fn new() -> Self {
        Self {
            system: MolecularSystem::new(),
            current_model: None,
            current_chain: None,
            current_residue: None,
        }
    }

    pub fn start_model(&mut self, serial: usize) -> &mut Self {
        self.current_model = Some(self.system.add_model(serial));
        self.current_chain = None;
        self.current_residue = None;
        self
    }

    pub fn end_model(&mut self) -> &mut Self {
        self.current_model = None;
        self.current_chain = None;
        self.current_residue = None;
        self
    }

    /// Adds an atom under the residue described by `key`.
    ///
    /// # Return
    ///
    /// The ID of the inserted atom, or `None` if the hierarchy could not be
    /// resolved (which only happens if the system was left inconsistent).
    pub fn add_atom(&mut self, key: &ResidueKey<'_>, atom: Atom) -> Option<AtomId> {
        let model = match self.current_model {
            Some(model) => model,
            None => {
                let model = self.system.add_model(IMPLICIT_MODEL_SERIAL);
                self.current_model = Some(model);
                model
            }
        };

        let chain_id = match self.current_chain {
            Some((id, chain_id)) if id == key.chain_id => chain_id,
            _ => {
                let chain_id = self.system.add_chain(model, key.chain_id)?;
                self.current_chain = Some((key.chain_id, chain_id));
                self.current_residue = None;
                chain_id
            }
        };

        let residue_key = (key.number, key.insertion_code);
        let residue_id = match self.current_residue {
            Some((current, residue_id)) if current == residue_key => residue_id,
            _ => {
                let residue_id = self.system.add_residue(
                    chain_id,
                    key.number,
                    key.insertion_code,
                    key.name,
                )?;
                self.current_residue = Some((residue_key, residue_id));
                residue_id
            }
        };

        self.system.add_atom_to_residue(residue_id, atom)
    }

    pub fn build(self) -> MolecularSystem {
        self.system
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    fn key(chain_id: char, number: isize, name: &str) -> ResidueKey<'_> {
        ResidueKey {
            chain_id,
            number,
            insertion_code: None,
            name,
        }
    }

    fn atom(serial: usize, name: &str) -> Atom {
        Atom::new(serial, name, ResidueId::default(), Point3::origin())
    }

    #[test]
    fn atoms_without_model_go_to_implicit_model() {
        let mut builder = MolecularSystemBuilder::new();
        builder.add_atom(&key('A', 1, "GLY"), atom(1, " N  ")).unwrap();
        let system = builder.build();

        assert_eq!(system.models().len(), 1);
        assert_eq!(system.models()[0].serial, 1);
        assert_eq!(system.models()[0].atoms().len(), 1);
    }

    #[test]
    fn consecutive_atoms_share_residue_and_chain() {
        let mut builder = MolecularSystemBuilder::new();
        let a = builder.add_atom(&key('A', 1, "GLY"), atom(1, " N  ")).unwrap();
        let b = builder.add_atom(&key('A', 1, "GLY"), atom(2, " CA ")).unwrap();
        let c = builder.add_atom(&key('A', 2, "ALA"), atom(3, " N  ")).unwrap();
        let d = builder.add_atom(&key('B', 1, "HOH"), atom(4, " O  ")).unwrap();
        let system = builder.build();

        let res_a = system.atom(a).unwrap().residue_id;
        assert_eq!(res_a, system.atom(b).unwrap().residue_id);
        assert_ne!(res_a, system.atom(c).unwrap().residue_id);

        let model = &system.models()[0];
        assert_eq!(model.chains().len(), 2);
        let chain_b = system.residue(system.atom(d).unwrap().residue_id).unwrap().chain_id;
        assert_eq!(system.chain(chain_b).unwrap().id, 'B');
    }

    #[test]
    fn explicit_models_are_kept_apart() {
        let mut builder = MolecularSystemBuilder::new();
        builder.start_model(1);
        builder.add_atom(&key('A', 1, "GLY"), atom(1, " N  ")).unwrap();
        builder.end_model();
        builder.start_model(2);
        builder.add_atom(&key('A', 1, "GLY"), atom(1, " N  ")).unwrap();
        builder.end_model();
        let system = builder.build();

        assert_eq!(system.models().len(), 2);
        assert_eq!(system.models()[1].serial, 2);
        assert_eq!(system.models()[0].atoms().len(), 1);
        assert_eq!(system.models()[1].atoms().len(), 1);
    }

    #[test]
    fn returning_to_an_earlier_chain_reuses_it() {
        let mut builder = MolecularSystemBuilder::new();
        builder.add_atom(&key('A', 1, "GLY"), atom(1, " N  ")).unwrap();
        builder.add_atom(&key('B', 1, "GLY"), atom(2, " N  ")).unwrap();
        builder.add_atom(&key('A', 1, "GLY"), atom(3, " CA ")).unwrap();
        let system = builder.build();

        assert_eq!(system.models()[0].chains().len(), 2);
        let chain_a = system.models()[0].chains()[0];
        let residue = system.chain(chain_a).unwrap().residues()[0];
        assert_eq!(system.residue(residue).unwrap().atoms().len(), 2);
    }
}
