use super::constraints::DistanceConstraint;
use nalgebra::DMatrix;
use tracing::trace;

/// Symmetric matrix of `[lower, upper]` distance bounds.
///
/// Upper bounds are stored above the diagonal and lower bounds below it, so both
/// accessors are symmetric by construction. Unconstrained pairs default to `[0, ∞)`.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceBoundsMatrix {
    matrix: DMatrix<f64>,
}

impl DistanceBoundsMatrix {
    pub fn new(size: usize) -> Self {
        let matrix = DMatrix::from_fn(size, size, |i, j| if i < j { f64::INFINITY } else { 0.0 });
        Self { matrix }
    }

    /// Bounds matrix holding the intersection of all constraints on each pair.
    ///
    /// If two constraints on the same pair do not overlap, their union is kept instead.
    pub fn from_constraints(size: usize, constraints: &[DistanceConstraint]) -> Self {
        let mut bounds = Self::new(size);
        let mut seen = DMatrix::from_element(size, size, false);
        for c in constraints {
            let [a, b] = c.atoms;
            if a == b || a >= size || b >= size {
                continue;
            }
            let (i, j) = (a.min(b), a.max(b));
            if !seen[(i, j)] {
                seen[(i, j)] = true;
                bounds.set_bounds(i, j, c.lower, c.upper);
                continue;
            }
            let (lower, upper) = (bounds.lower(i, j), bounds.upper(i, j));
            let (l, u) = (lower.max(c.lower), upper.min(c.upper));
            if l <= u {
                bounds.set_bounds(i, j, l, u);
            } else {
                trace!(i, j, "Disjoint constraints on one pair; keeping their union.");
                bounds.set_bounds(i, j, lower.min(c.lower), upper.max(c.upper));
            }
        }
        bounds
    }

    pub fn size(&self) -> usize {
        self.matrix.nrows()
    }

    #[inline]
    pub fn lower(&self, i: usize, j: usize) -> f64 {
        if i == j {
            0.0
        } else {
            self.matrix[(i.max(j), i.min(j))]
        }
    }

    #[inline]
    pub fn upper(&self, i: usize, j: usize) -> f64 {
        if i == j {
            0.0
        } else {
            self.matrix[(i.min(j), i.max(j))]
        }
    }

    pub fn set_bounds(&mut self, i: usize, j: usize, lower: f64, upper: f64) {
        if i == j {
            return;
        }
        self.matrix[(i.max(j), i.min(j))] = lower;
        self.matrix[(i.min(j), i.max(j))] = upper;
    }

    /// Tightens all bounds with the triangle inequality.
    ///
    /// Returns `false` if some pair ends up with `lower > upper`, i.e. the constraints
    /// cannot be realized by any point set.
    pub fn smooth(&mut self) -> bool {
        let n = self.size();
        for k in 0..n {
            for i in 0..n {
                if i == k {
                    continue;
                }
                for j in (i + 1)..n {
                    if j == k {
                        continue;
                    }
                    let (u_ik, u_kj) = (self.upper(i, k), self.upper(k, j));
                    let mut u_ij = self.upper(i, j);
                    if u_ik + u_kj < u_ij {
                        u_ij = u_ik + u_kj;
                    }
                    let mut l_ij = self.lower(i, j);
                    let via_i = self.lower(i, k) - u_kj;
                    let via_j = self.lower(j, k) - u_ik;
                    l_ij = l_ij.max(via_i).max(via_j);
                    if l_ij > u_ij {
                        trace!(i, j, k, l_ij, u_ij, "Bounds smoothing found an infeasible pair.");
                        return false;
                    }
                    self.set_bounds(i, j, l_ij, u_ij);
                }
            }
        }
        true
    }

    pub fn is_consistent(&self) -> bool {
        (0..self.size()).all(|i| ((i + 1)..self.size()).all(|j| self.lower(i, j) <= self.upper(i, j)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_matrix_is_unconstrained() {
        let m = DistanceBoundsMatrix::new(3);
        assert_eq!(m.size(), 3);
        assert_eq!(m.lower(0, 2), 0.0);
        assert_eq!(m.upper(2, 0), f64::INFINITY);
        assert_eq!(m.upper(1, 1), 0.0);
    }

    #[test]
    fn accessors_are_symmetric() {
        let mut m = DistanceBoundsMatrix::new(4);
        m.set_bounds(3, 1, 1.2, 2.5);
        assert_eq!(m.lower(1, 3), 1.2);
        assert_eq!(m.lower(3, 1), 1.2);
        assert_eq!(m.upper(1, 3), 2.5);
        assert_eq!(m.upper(3, 1), 2.5);
    }

    #[test]
    fn duplicate_constraints_are_intersected() {
        let constraints = [
            DistanceConstraint::new(0, 1, 1.0, 3.0),
            DistanceConstraint::new(1, 0, 2.0, 4.0),
        ];
        let m = DistanceBoundsMatrix::from_constraints(2, &constraints);
        assert_eq!((m.lower(0, 1), m.upper(0, 1)), (2.0, 3.0));

        let disjoint = [
            DistanceConstraint::new(0, 1, 1.0, 1.5),
            DistanceConstraint::new(0, 1, 2.0, 2.5),
        ];
        let m = DistanceBoundsMatrix::from_constraints(2, &disjoint);
        assert_eq!((m.lower(0, 1), m.upper(0, 1)), (1.0, 2.5));
    }

    #[test]
    fn smoothing_applies_triangle_inequality() {
        let mut m = DistanceBoundsMatrix::new(3);
        m.set_bounds(0, 1, 1.0, 1.0);
        m.set_bounds(1, 2, 1.0, 1.0);
        m.set_bounds(0, 2, 0.0, 10.0);
        assert!(m.smooth());
        assert_eq!(m.upper(0, 2), 2.0);

        let mut m = DistanceBoundsMatrix::new(3);
        m.set_bounds(0, 1, 1.0, 1.0);
        m.set_bounds(1, 2, 5.0, 5.0);
        assert!(m.smooth());
        assert_eq!(m.lower(0, 2), 4.0);
        assert_eq!(m.upper(0, 2), 6.0);
        assert!(m.is_consistent());
    }

    #[test]
    fn smoothing_detects_infeasible_bounds() {
        let mut m = DistanceBoundsMatrix::new(3);
        m.set_bounds(0, 1, 1.0, 1.0);
        m.set_bounds(1, 2, 1.0, 1.0);
        m.set_bounds(0, 2, 5.0, 6.0);
        assert!(!m.smooth());
    }
}
