use super::config::{LOW_POINT_COUNT_THRESHOLD, ShrakeRupleyConfig};
use super::error::EngineError;
use super::neighbors::NeighborIndex;
use super::sphere::SpherePointSet;
use crate::core::models::system::MolecularSystem;
use crate::core::radii::RadiusTable;
use crate::workflows::annotate::{self, AnnotationSummary};
use nalgebra::Point3;
use std::f64::consts::PI;
use std::sync::OnceLock;
use tracing::{instrument, trace, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// One sphere of a surface: an atom center and its van der Waals radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceAtom {
    pub position: Point3<f64>,
    pub radius: f64,
}

impl SurfaceAtom {
    pub fn new(position: Point3<f64>, radius: f64) -> Self {
        Self { position, radius }
    }
}

/// Shrake-Rupley solvent-accessible surface area estimator.
///
/// Every atom's sphere is expanded by the probe radius and sampled with a
/// fixed set of points. A point is exposed when it lies outside every other
/// expanded sphere; the atom's area is the exposed fraction of its expanded
/// sphere's area. The sample points are generated on first use and reused for
/// every atom and every structure this estimator sees.
#[derive(Debug)]
pub struct SurfaceAreaEstimator {
    config: ShrakeRupleyConfig,
    points: OnceLock<SpherePointSet>,
}

impl Default for SurfaceAreaEstimator {
    fn default() -> Self {
        Self::new(ShrakeRupleyConfig::default())
    }
}

impl SurfaceAreaEstimator {
    pub fn new(config: ShrakeRupleyConfig) -> Self {
        if config.points_per_atom < LOW_POINT_COUNT_THRESHOLD {
            warn!(
                points_per_atom = config.points_per_atom,
                "Very few sample points per atom; surface areas will have high variance."
            );
        }
        Self {
            config,
            points: OnceLock::new(),
        }
    }

    fn sphere_points(&self) -> &SpherePointSet {
        self.points
            .get_or_init(|| SpherePointSet::fibonacci(self.config.points_per_atom))
    }

    /// Estimates the solvent-accessible area of each atom, in input order.
    ///
    /// All atoms form one surface: each is occluded by every other atom in the
    /// slice. Areas are in squared length units of the input coordinates and
    /// fall in `[0, 4π(radius + probe)²]`.
    #[instrument(skip_all, name = "shrake_rupley", fields(atoms = atoms.len()))]
    pub fn compute(&self, atoms: &[SurfaceAtom]) -> Vec<f64> {
        if atoms.is_empty() {
            return Vec::new();
        }

        let probe = self.config.probe_radius;
        let expanded: Vec<f64> = atoms.iter().map(|a| a.radius + probe).collect();
        let centers: Vec<[f64; 3]> = atoms
            .iter()
            .map(|a| [a.position.x, a.position.y, a.position.z])
            .collect();
        let index = NeighborIndex::new(centers, &expanded);
        let points = self.sphere_points();
        let total_points = points.len() as f64;

        let area_of = |i: usize| -> f64 {
            let center = atoms[i].position;
            let radius = expanded[i];
            let neighbors: Vec<(Point3<f64>, f64)> = index
                .overlapping(i)
                .into_iter()
                .map(|j| (atoms[j].position, expanded[j] * expanded[j]))
                .collect();

            let exposed = points
                .points()
                .iter()
                .filter(|&&p| {
                    let sample = center + p * radius;
                    !neighbors
                        .iter()
                        .any(|(other, radius_sq)| (sample - *other).norm_squared() < *radius_sq)
                })
                .count();

            exposed as f64 / total_points * 4.0 * PI * radius * radius
        };

        #[cfg(not(feature = "parallel"))]
        let iterator = 0..atoms.len();

        #[cfg(feature = "parallel")]
        let iterator = (0..atoms.len()).into_par_iter();

        let areas: Vec<f64> = iterator.map(area_of).collect();
        trace!(total = areas.iter().sum::<f64>(), "Surface computed.");
        areas
    }

    /// Annotates every atom of `system` with its surface area, model by model.
    ///
    /// See [`annotate::run`] for how radii and alternate locations are handled.
    pub fn compute_all(
        &self,
        system: &mut MolecularSystem,
        radii: &RadiusTable,
    ) -> Result<AnnotationSummary, EngineError> {
        annotate::run(system, self, radii)
    }
}
