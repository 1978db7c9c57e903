use nalgebra::{DVector, Vector3};

/// Vector-space operations the minimizer needs from its variable container.
///
/// Implemented for flat `DVector<f64>` arrays and for coordinate arrays of 3D points, so
/// the same minimizer runs directly on molecular coordinates without flattening.
pub trait MinimizerVariables: Clone {
    /// A zero-filled container with the same shape as `self`.
    fn zeros_like(&self) -> Self;

    /// Copies `other` into `self`, resizing if necessary.
    fn assign(&mut self, other: &Self);

    /// Sets every component to zero.
    fn set_zero(&mut self);

    fn scale(&mut self, factor: f64);

    fn dot(&self, other: &Self) -> f64;

    /// `self += alpha * x`
    fn axpy(&mut self, alpha: f64, x: &Self);

    fn norm2(&self) -> f64 {
        self.dot(self).sqrt()
    }

    /// `self = a - b`
    fn assign_difference(&mut self, a: &Self, b: &Self) {
        self.assign(a);
        self.axpy(-1.0, b);
    }
}

impl MinimizerVariables for DVector<f64> {
    fn zeros_like(&self) -> Self {
        DVector::zeros(self.len())
    }

    fn assign(&mut self, other: &Self) {
        if self.len() == other.len() {
            self.copy_from(other);
        } else {
            *self = other.clone();
        }
    }

    fn set_zero(&mut self) {
        self.fill(0.0);
    }

    fn scale(&mut self, factor: f64) {
        *self *= factor;
    }

    fn dot(&self, other: &Self) -> f64 {
        DVector::dot(self, other)
    }

    fn axpy(&mut self, alpha: f64, x: &Self) {
        DVector::axpy(self, alpha, x, 1.0);
    }
}

impl MinimizerVariables for Vec<Vector3<f64>> {
    fn zeros_like(&self) -> Self {
        vec![Vector3::zeros(); self.len()]
    }

    fn assign(&mut self, other: &Self) {
        self.clear();
        self.extend_from_slice(other);
    }

    fn set_zero(&mut self) {
        self.iter_mut().for_each(|v| *v = Vector3::zeros());
    }

    fn scale(&mut self, factor: f64) {
        self.iter_mut().for_each(|v| *v *= factor);
    }

    fn dot(&self, other: &Self) -> f64 {
        self.iter().zip(other).map(|(a, b)| a.dot(b)).sum()
    }

    fn axpy(&mut self, alpha: f64, x: &Self) {
        self.iter_mut().zip(x).for_each(|(v, d)| *v += d * alpha);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_vector_operations() {
        let mut a = DVector::from_vec(vec![1.0, 2.0, 2.0]);
        let b = DVector::from_vec(vec![1.0, 0.0, -1.0]);
        assert_eq!(a.norm2(), 3.0);
        assert_eq!(MinimizerVariables::dot(&a, &b), -1.0);
        MinimizerVariables::axpy(&mut a, 2.0, &b);
        assert_eq!(a, DVector::from_vec(vec![3.0, 2.0, 0.0]));
        MinimizerVariables::scale(&mut a, 0.5);
        assert_eq!(a, DVector::from_vec(vec![1.5, 1.0, 0.0]));
        let mut d = a.zeros_like();
        d.assign_difference(&a, &b);
        assert_eq!(d, DVector::from_vec(vec![0.5, 1.0, 1.0]));
        d.set_zero();
        assert_eq!(d.norm2(), 0.0);
    }

    #[test]
    fn coordinate_array_operations() {
        let mut a = vec![Vector3::new(1.0, 0.0, 0.0), Vector3::new(0.0, 2.0, 0.0)];
        let b = vec![Vector3::new(0.0, 1.0, 0.0), Vector3::new(0.0, 1.0, 2.0)];
        assert_eq!(a.dot(&b), 2.0);
        a.axpy(-1.0, &b);
        assert_eq!(a[1], Vector3::new(0.0, 1.0, -2.0));
        let mut c: Vec<Vector3<f64>> = Vec::new();
        c.assign(&a);
        assert_eq!(c, a);
        c.set_zero();
        assert_eq!(c.len(), 2);
        assert_eq!(c.norm2(), 0.0);
    }
}
