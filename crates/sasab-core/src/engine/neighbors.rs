use kiddo::{KdTree, SquaredEuclidean};
use std::cmp::Ordering;
use tracing::debug;

// Leaf capacity of `kiddo::KdTree`. Splitting a full leaf whose items all share
// the split coordinate panics, so no axis value may repeat this often.
const TREE_BUCKET_SIZE: usize = 32;

enum Search {
    Tree(KdTree<f64, 3>),
    Scan,
}

/// Spatial index answering "which spheres overlap sphere `i`?" queries.
///
/// Built once per surface from the sphere centers and their (probe-expanded)
/// radii and then shared read-only between workers. Inputs with many atoms on
/// one coordinate plane (flat layers, unplaced atoms at the origin) cannot be
/// stored in the k-d tree and are answered by a linear scan instead.
pub(crate) struct NeighborIndex<'a> {
    search: Search,
    centers: Vec<[f64; 3]>,
    radii: &'a [f64],
    max_radius: f64,
}

impl<'a> NeighborIndex<'a> {
    pub fn new(centers: Vec<[f64; 3]>, radii: &'a [f64]) -> Self {
        let search = if has_crowded_axis(&centers) {
            debug!(
                atoms = centers.len(),
                "Too many atoms share a coordinate plane for the k-d tree; using a linear scan."
            );
            Search::Scan
        } else {
            Search::Tree((&centers).into())
        };
        Self::with_search(search, centers, radii)
    }

    fn with_search(search: Search, centers: Vec<[f64; 3]>, radii: &'a [f64]) -> Self {
        let max_radius = radii.iter().copied().fold(0.0, f64::max);
        Self {
            search,
            centers,
            radii,
            max_radius,
        }
    }

    #[cfg(test)]
    fn uses_tree(&self) -> bool {
        matches!(self.search, Search::Tree(_))
    }

    /// Indices of the spheres whose centers lie closer to sphere `index` than
    /// the sum of both radii, nearest first. The sphere itself is excluded.
    pub fn overlapping(&self, index: usize) -> Vec<usize> {
        let radius = self.radii[index];
        let query = &self.centers[index];
        let is_contact = |other: usize, dist_sq: f64| {
            let contact = radius + self.radii[other];
            other != index && dist_sq < contact * contact
        };

        match &self.search {
            Search::Tree(tree) => {
                let reach = radius + self.max_radius;
                tree.within::<SquaredEuclidean>(query, reach * reach)
                    .into_iter()
                    .filter_map(|neighbour| {
                        let other = neighbour.item as usize;
                        is_contact(other, neighbour.distance).then_some(other)
                    })
                    .collect()
            }
            Search::Scan => {
                let mut hits: Vec<(f64, usize)> = self
                    .centers
                    .iter()
                    .enumerate()
                    .filter_map(|(other, center)| {
                        let dist_sq = squared_distance(query, center);
                        is_contact(other, dist_sq).then_some((dist_sq, other))
                    })
                    .collect();
                hits.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));
                hits.into_iter().map(|(_, other)| other).collect()
            }
        }
    }
}

fn squared_distance(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

fn has_crowded_axis(centers: &[[f64; 3]]) -> bool {
    if centers.len() < TREE_BUCKET_SIZE {
        return false;
    }
    (0..3).any(|axis| {
        // `+ 0.0` folds -0.0 into 0.0, which the tree treats as equal.
        let mut values: Vec<f64> = centers.iter().map(|c| c[axis] + 0.0).collect();
        values.sort_by(f64::total_cmp);
        values
            .chunk_by(|a, b| a == b)
            .any(|run| run.len() >= TREE_BUCKET_SIZE)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlapping_excludes_self_and_distant_spheres() {
        let centers = vec![[0.0, 0.0, 0.0], [3.0, 0.0, 0.0], [10.0, 0.0, 0.0]];
        let radii = [2.0, 2.0, 2.0];
        let index = NeighborIndex::new(centers, &radii);

        assert_eq!(index.overlapping(0), vec![1]);
        assert_eq!(index.overlapping(1), vec![0]);
        assert!(index.overlapping(2).is_empty());
    }

    #[test]
    fn overlapping_is_sorted_nearest_first() {
        let centers = vec![
            [0.0, 0.0, 0.0],
            [3.5, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, -2.0],
        ];
        let radii = [2.0, 2.0, 2.0, 2.0];
        let index = NeighborIndex::new(centers.clone(), &radii);
        assert_eq!(index.overlapping(0), vec![2, 3, 1]);

        let scan = NeighborIndex::with_search(Search::Scan, centers, &radii);
        assert_eq!(scan.overlapping(0), vec![2, 3, 1]);
    }

    #[test]
    fn a_large_neighbor_is_found_from_a_small_sphere() {
        let centers = vec![[0.0, 0.0, 0.0], [5.0, 0.0, 0.0]];
        let radii = [1.0, 4.5];
        let index = NeighborIndex::new(centers, &radii);

        assert_eq!(index.overlapping(0), vec![1]);
        assert_eq!(index.overlapping(1), vec![0]);
    }

    #[test]
    fn touching_spheres_do_not_overlap() {
        let centers = vec![[0.0, 0.0, 0.0], [4.0, 0.0, 0.0]];
        let radii = [2.0, 2.0];
        let index = NeighborIndex::new(centers, &radii);

        assert!(index.overlapping(0).is_empty());
    }

    #[test]
    fn coincident_centers_fall_back_to_a_scan() {
        let centers = vec![[0.0, 0.0, 0.0]; 40];
        let radii = vec![2.9; 40];
        let index = NeighborIndex::new(centers, &radii);

        assert!(!index.uses_tree());
        let hits = index.overlapping(7);
        assert_eq!(hits.len(), 39);
        assert!(!hits.contains(&7));
    }

    #[test]
    fn signed_zeros_count_as_one_plane() {
        let centers: Vec<[f64; 3]> = (0..40)
            .map(|i| {
                let z = if i % 2 == 0 { 0.0 } else { -0.0 };
                [i as f64 * 3.0, (i * i) as f64 * 0.5, z]
            })
            .collect();
        let radii = vec![2.0; 40];

        assert!(!NeighborIndex::new(centers, &radii).uses_tree());
    }

    #[test]
    fn coplanar_grid_finds_its_grid_neighbors() {
        let centers: Vec<[f64; 3]> = (0..100)
            .map(|i| [(i % 10) as f64 * 3.0, (i / 10) as f64 * 3.0, 0.0])
            .collect();
        let radii = vec![2.0; 100];
        let index = NeighborIndex::new(centers, &radii);

        assert!(!index.uses_tree());
        let mut corner = index.overlapping(0);
        corner.sort_unstable();
        assert_eq!(corner, vec![1, 10]);
        let mut inner = index.overlapping(55);
        inner.sort_unstable();
        assert_eq!(inner, vec![45, 54, 56, 65]);
    }

    #[test]
    fn tree_and_scan_agree_on_scattered_centers() {
        let centers: Vec<[f64; 3]> = (0..200)
            .map(|i| {
                let t = i as f64;
                [
                    (t * 0.731).sin() * 12.0,
                    (t * 1.213).cos() * 12.0,
                    (t * 0.377).sin() * (t * 0.19).cos() * 12.0,
                ]
            })
            .collect();
        let radii: Vec<f64> = (0..200).map(|i| 2.9 + (i % 3) as f64 * 0.15).collect();
        let tree = NeighborIndex::new(centers.clone(), &radii);
        let scan = NeighborIndex::with_search(Search::Scan, centers, &radii);

        assert!(tree.uses_tree());
        for i in 0..200 {
            let mut from_tree = tree.overlapping(i);
            let mut from_scan = scan.overlapping(i);
            from_tree.sort_unstable();
            from_scan.sort_unstable();
            assert_eq!(from_tree, from_scan, "atom {}", i);
        }
    }
}
