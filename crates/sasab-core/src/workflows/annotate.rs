use crate::core::io::report::ResidueSasa;
use crate::core::models::ids::AtomId;
use crate::core::models::system::MolecularSystem;
use crate::core::radii::RadiusTable;
use crate::engine::error::EngineError;
use crate::engine::estimator::{SurfaceAreaEstimator, SurfaceAtom};
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AnnotationSummary {
    pub models: usize,
    /// Atoms that entered the estimator (primary conformers).
    pub atoms_annotated: usize,
    /// Alternate conformers that received their primary conformer's area.
    pub alternates_copied: usize,
    /// Atoms whose radius came from the configured fallback.
    pub fallback_radii: usize,
    pub total_sasa: f64,
}

/// Computes the solvent-accessible area of every atom and stores it in the
/// atom's `sasa` and `b_factor` fields.
///
/// Each model is an independent surface. Within a model only primary
/// conformers are sampled; alternate conformers are given the area of the
/// primary conformer they shadow. Radii are resolved for all models before any
/// atom is modified, so an unknown element leaves the system untouched.
///
/// # Errors
///
/// Returns [`EngineError::UnknownRadius`] for the first atom whose element has
/// no radius when `radii` has no fallback.
#[instrument(skip_all, name = "annotate_workflow")]
pub fn run(
    system: &mut MolecularSystem,
    estimator: &SurfaceAreaEstimator,
    radii: &RadiusTable,
) -> Result<AnnotationSummary, EngineError> {
    let mut summary = AnnotationSummary {
        models: system.models().len(),
        ..Default::default()
    };

    let surfaces = collect_surfaces(system, radii, &mut summary)?;
    if summary.fallback_radii > 0 {
        warn!(
            atoms = summary.fallback_radii,
            radius = radii.fallback(),
            "Fallback radius used for elements missing from the radius table."
        );
    }

    for (model_index, (ids, atoms)) in surfaces.into_iter().enumerate() {
        let areas = estimator.compute(&atoms);
        debug!(model = model_index, atoms = ids.len(), "Model surface computed.");
        for (atom_id, area) in ids.into_iter().zip(areas) {
            let atom = system.atom_mut(atom_id).ok_or_else(|| {
                EngineError::Internal(format!("Atom {:?} disappeared during annotation", atom_id))
            })?;
            atom.set_sasa(area);
            summary.atoms_annotated += 1;
            summary.total_sasa += area;
        }
    }

    summary.alternates_copied = copy_to_alternates(system);

    info!(
        models = summary.models,
        atoms = summary.atoms_annotated,
        alternates = summary.alternates_copied,
        total_sasa = summary.total_sasa,
        "Structure annotated."
    );
    Ok(summary)
}

type Surface = (Vec<AtomId>, Vec<SurfaceAtom>);

fn collect_surfaces(
    system: &MolecularSystem,
    radii: &RadiusTable,
    summary: &mut AnnotationSummary,
) -> Result<Vec<Surface>, EngineError> {
    let mut surfaces = Vec::with_capacity(system.models().len());
    for model in system.models() {
        let mut ids = Vec::with_capacity(model.atoms().len());
        let mut atoms = Vec::with_capacity(model.atoms().len());
        for &atom_id in model.atoms() {
            if !system.is_primary_conformer(atom_id) {
                continue;
            }
            let Some(atom) = system.atom(atom_id) else {
                continue;
            };
            let lookup = radii
                .lookup(&atom.element)
                .map_err(|_| EngineError::UnknownRadius {
                    element: atom.element.clone(),
                    serial: atom.serial,
                    atom_name: atom.name.clone(),
                })?;
            if lookup.is_fallback() {
                summary.fallback_radii += 1;
            }
            ids.push(atom_id);
            atoms.push(SurfaceAtom::new(atom.position, lookup.value()));
        }
        surfaces.push((ids, atoms));
    }
    Ok(surfaces)
}

fn copy_to_alternates(system: &mut MolecularSystem) -> usize {
    let copies: Vec<(AtomId, f64)> = system
        .atoms_iter()
        .filter(|&(id, _)| !system.is_primary_conformer(id))
        .filter_map(|(id, _)| {
            let primary = system.primary_conformer_of(id)?;
            let area = system.atom(primary)?.sasa?;
            Some((id, area))
        })
        .collect();

    let count = copies.len();
    for (atom_id, area) in copies {
        if let Some(atom) = system.atom_mut(atom_id) {
            atom.set_sasa(area);
        }
    }
    count
}

/// Sums annotated atom areas per residue, in file order.
///
/// Only primary conformers contribute, so residues with alternate locations
/// are not counted twice. Atoms that were never annotated contribute nothing.
pub fn residue_totals(system: &MolecularSystem) -> Vec<ResidueSasa> {
    let mut rows = Vec::new();
    for model in system.models() {
        for &chain_id in model.chains() {
            let Some(chain) = system.chain(chain_id) else {
                continue;
            };
            for &residue_id in chain.residues() {
                let Some(residue) = system.residue(residue_id) else {
                    continue;
                };
                let (atoms, sasa) = residue
                    .atoms()
                    .iter()
                    .filter(|&&id| system.is_primary_conformer(id))
                    .filter_map(|&id| system.atom(id).and_then(|a| a.sasa))
                    .fold((0usize, 0.0f64), |(n, total), area| (n + 1, total + area));

                rows.push(ResidueSasa {
                    model: model.serial,
                    chain: chain.id,
                    residue_name: residue.name.clone(),
                    residue_number: residue.number,
                    insertion_code: residue.insertion_code.map(String::from).unwrap_or_default(),
                    atoms,
                    sasa,
                });
            }
        }
    }
    rows
}
