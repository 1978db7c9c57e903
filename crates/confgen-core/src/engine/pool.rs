use nalgebra::Vector3;
use std::cell::RefCell;
use std::collections::HashMap;
use std::ops::{Deref, DerefMut};

/// Free list of coordinate buffers, keyed by length.
///
/// Buffers are zeroed on checkout and returned to the pool when the guard is dropped.
#[derive(Debug, Default)]
pub struct CoordinatesPool {
    free: RefCell<HashMap<usize, Vec<Vec<Vector3<f64>>>>>,
}

impl CoordinatesPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn checkout(&self, len: usize) -> PooledCoordinates<'_> {
        let reused = self.free.borrow_mut().get_mut(&len).and_then(Vec::pop);
        let buffer = match reused {
            Some(mut buffer) => {
                buffer.iter_mut().for_each(|v| *v = Vector3::zeros());
                buffer
            }
            None => vec![Vector3::zeros(); len],
        };
        PooledCoordinates { pool: self, buffer }
    }

    /// Number of idle buffers of the given length.
    pub fn available(&self, len: usize) -> usize {
        self.free.borrow().get(&len).map_or(0, Vec::len)
    }

    fn release(&self, buffer: Vec<Vector3<f64>>) {
        self.free
            .borrow_mut()
            .entry(buffer.len())
            .or_default()
            .push(buffer);
    }
}

/// A checked-out buffer; dereferences to the coordinate vector.
pub struct PooledCoordinates<'a> {
    pool: &'a CoordinatesPool,
    buffer: Vec<Vector3<f64>>,
}

impl Deref for PooledCoordinates<'_> {
    type Target = Vec<Vector3<f64>>;

    fn deref(&self) -> &Self::Target {
        &self.buffer
    }
}

impl DerefMut for PooledCoordinates<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.buffer
    }
}

impl Drop for PooledCoordinates<'_> {
    fn drop(&mut self) {
        self.pool.release(std::mem::take(&mut self.buffer));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffers_return_to_the_pool_on_drop() {
        let pool = CoordinatesPool::new();
        {
            let mut coords = pool.checkout(4);
            assert_eq!(coords.len(), 4);
            coords[0] = Vector3::new(1.0, 2.0, 3.0);
            assert_eq!(pool.available(4), 0);
        }
        assert_eq!(pool.available(4), 1);

        let coords = pool.checkout(4);
        assert_eq!(pool.available(4), 0);
        assert!(coords.iter().all(|v| *v == Vector3::zeros()));
    }

    #[test]
    fn buffers_of_other_lengths_are_not_shared() {
        let pool = CoordinatesPool::new();
        drop(pool.checkout(3));
        let coords = pool.checkout(5);
        assert_eq!(coords.len(), 5);
        assert_eq!(pool.available(3), 1);
    }
}
