use nalgebra::Vector3;
use std::collections::BinaryHeap;

/// A minimized structure that passed every acceptance check.
#[derive(Debug, Clone)]
pub struct Conformer {
    pub energy: f64,
    pub coords: Vec<Vector3<f64>>,
    /// 1-based index of the trial that produced it.
    pub trial: usize,
}

impl PartialEq for Conformer {
    fn eq(&self, other: &Self) -> bool {
        self.energy == other.energy
    }
}
impl Eq for Conformer {}

impl PartialOrd for Conformer {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Conformer {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.energy.total_cmp(&other.energy)
    }
}

/// Keeps the lowest-energy conformers seen so far.
///
/// At most `capacity` conformers are held, and none more than `energy_window` above the
/// current best.
#[derive(Debug, Clone)]
pub struct ConformerCollector {
    heap: BinaryHeap<Conformer>,
    capacity: usize,
    energy_window: f64,
    best_energy: f64,
}

impl ConformerCollector {
    pub fn new(capacity: usize, energy_window: f64) -> Self {
        Self {
            heap: BinaryHeap::with_capacity(capacity + 1),
            capacity,
            energy_window,
            best_energy: f64::INFINITY,
        }
    }

    /// Offers a conformer; returns whether it was kept.
    pub fn offer(&mut self, conformer: Conformer) -> bool {
        if conformer.energy > self.best_energy + self.energy_window {
            return false;
        }
        if self.heap.len() >= self.capacity
            && self
                .heap
                .peek()
                .is_some_and(|worst| conformer.energy >= worst.energy)
        {
            return false;
        }

        self.best_energy = self.best_energy.min(conformer.energy);
        self.heap.push(conformer);

        let cutoff = self.best_energy + self.energy_window;
        while self.heap.len() > self.capacity
            || self.heap.peek().is_some_and(|worst| worst.energy > cutoff)
        {
            self.heap.pop();
        }
        true
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.heap.len() >= self.capacity
    }

    pub fn best_energy(&self) -> Option<f64> {
        self.best_energy.is_finite().then_some(self.best_energy)
    }

    /// The collected conformers, lowest energy first.
    pub fn into_sorted_vec(self) -> Vec<Conformer> {
        self.heap.into_sorted_vec()
    }
}
