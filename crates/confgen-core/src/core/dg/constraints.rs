use crate::core::utils::geometry::signed_volume;
use nalgebra::Vector3;

/// Bounds on the distance between two atoms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistanceConstraint {
    pub atoms: [usize; 2],
    pub lower: f64,
    pub upper: f64,
}

impl DistanceConstraint {
    pub fn new(a: usize, b: usize, lower: f64, upper: f64) -> Self {
        Self {
            atoms: [a, b],
            lower,
            upper,
        }
    }

    pub fn distance(&self, coords: &[Vector3<f64>]) -> f64 {
        let [a, b] = self.atoms;
        (coords[a] - coords[b]).norm()
    }

    /// Amount by which the current distance lies outside `[lower, upper]`.
    pub fn violation(&self, coords: &[Vector3<f64>]) -> f64 {
        let d = self.distance(coords);
        if d < self.lower {
            self.lower - d
        } else if d > self.upper {
            d - self.upper
        } else {
            0.0
        }
    }
}

/// Bounds on the signed volume `(p1 - p4) · ((p2 - p4) × (p3 - p4))` of four atoms.
///
/// Chirality constraints bound the volume away from zero on one side; planarity
/// constraints keep it in a narrow band around zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumeConstraint {
    pub atoms: [usize; 4],
    pub lower: f64,
    pub upper: f64,
}

impl VolumeConstraint {
    pub fn new(atoms: [usize; 4], lower: f64, upper: f64) -> Self {
        Self {
            atoms,
            lower,
            upper,
        }
    }

    pub fn volume(&self, coords: &[Vector3<f64>]) -> f64 {
        let [a, b, c, d] = self.atoms;
        signed_volume(&coords[a], &coords[b], &coords[c], &coords[d])
    }

    pub fn violation(&self, coords: &[Vector3<f64>]) -> f64 {
        let v = self.volume(coords);
        if v < self.lower {
            self.lower - v
        } else if v > self.upper {
            v - self.upper
        } else {
            0.0
        }
    }

    pub fn is_satisfied(&self, coords: &[Vector3<f64>]) -> bool {
        self.violation(coords) == 0.0
    }
}

/// Receiver of generated constraints.
pub trait ConstraintSink {
    fn add_distance_constraint(&mut self, constraint: DistanceConstraint);
    fn add_volume_constraint(&mut self, constraint: VolumeConstraint);
}

/// Plain collection of distance and volume constraints.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConstraintSet {
    pub distances: Vec<DistanceConstraint>,
    pub volumes: Vec<VolumeConstraint>,
}

impl ConstraintSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.distances.clear();
        self.volumes.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.distances.is_empty() && self.volumes.is_empty()
    }
}

impl ConstraintSink for ConstraintSet {
    fn add_distance_constraint(&mut self, constraint: DistanceConstraint) {
        self.distances.push(constraint);
    }

    fn add_volume_constraint(&mut self, constraint: VolumeConstraint) {
        self.volumes.push(constraint);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_violation_is_zero_inside_bounds() {
        let coords = vec![Vector3::zeros(), Vector3::new(1.5, 0.0, 0.0)];
        assert_eq!(DistanceConstraint::new(0, 1, 1.0, 2.0).violation(&coords), 0.0);
        assert!((DistanceConstraint::new(0, 1, 1.8, 2.0).violation(&coords) - 0.3).abs() < 1e-12);
        assert!((DistanceConstraint::new(0, 1, 1.0, 1.2).violation(&coords) - 0.3).abs() < 1e-12);
    }

    #[test]
    fn volume_constraint_reports_sign_violations() {
        let coords = vec![
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
            Vector3::new(0.0, 0.0, 1.0),
            Vector3::zeros(),
        ];
        let positive = VolumeConstraint::new([0, 1, 2, 3], 0.5, f64::INFINITY);
        let negative = VolumeConstraint::new([0, 1, 2, 3], f64::NEG_INFINITY, -0.5);
        assert!((positive.volume(&coords) - 1.0).abs() < 1e-12);
        assert!(positive.is_satisfied(&coords));
        assert!(!negative.is_satisfied(&coords));
        assert!((negative.violation(&coords) - 1.5).abs() < 1e-12);
    }

    #[test]
    fn constraint_set_collects_and_clears() {
        let mut set = ConstraintSet::new();
        set.add_distance_constraint(DistanceConstraint::new(0, 1, 1.0, 2.0));
        set.add_volume_constraint(VolumeConstraint::new([0, 1, 2, 3], -0.1, 0.1));
        assert_eq!(set.distances.len(), 1);
        assert_eq!(set.volumes.len(), 1);
        set.clear();
        assert!(set.is_empty());
    }
}
