use nalgebra::Vector3;
use std::f64::consts::PI;

/// Approximately uniform sample points on the unit sphere.
///
/// Generated with the Fibonacci (golden-angle) lattice: point `i` of `n` sits
/// at height `z = 1 - 2(i + 0.5)/n` and is rotated by `i` golden angles about
/// the z axis. The heights are evenly spaced, so each point stands for an equal
/// share of the sphere's area.
#[derive(Debug, Clone, PartialEq)]
pub struct SpherePointSet {
    points: Vec<Vector3<f64>>,
}

impl SpherePointSet {
    pub fn fibonacci(n: usize) -> Self {
        let golden_angle = PI * (3.0 - 5f64.sqrt());
        let count = n as f64;
        let points = (0..n)
            .map(|i| {
                let z = 1.0 - 2.0 * (i as f64 + 0.5) / count;
                let r = (1.0 - z * z).max(0.0).sqrt();
                let theta = i as f64 * golden_angle;
                Vector3::new(r * theta.cos(), r * theta.sin(), z)
            })
            .collect();
        Self { points }
    }

    pub fn points(&self) -> &[Vector3<f64>] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn points_lie_on_the_unit_sphere() {
        let set = SpherePointSet::fibonacci(500);
        assert_eq!(set.len(), 500);
        for p in set.points() {
            assert!((p.norm() - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn generation_is_deterministic() {
        assert_eq!(SpherePointSet::fibonacci(137), SpherePointSet::fibonacci(137));
    }

    #[test]
    fn heights_are_evenly_spaced_and_centroid_is_near_origin() {
        let n = 1000;
        let set = SpherePointSet::fibonacci(n);
        let points = set.points();
        for pair in points.windows(2) {
            assert!((pair[0].z - pair[1].z - 2.0 / n as f64).abs() < 1e-12);
        }
        let centroid: Vector3<f64> = points.iter().sum::<Vector3<f64>>() / n as f64;
        assert!(centroid.norm() < 1e-2);
    }

    #[test]
    fn zero_points_gives_an_empty_set() {
        assert!(SpherePointSet::fibonacci(0).is_empty());
    }
}
