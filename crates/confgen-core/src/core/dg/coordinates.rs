use super::bounds::DistanceBoundsMatrix;
use super::constraints::{ConstraintSet, ConstraintSink, DistanceConstraint, VolumeConstraint};
use crate::core::minimizer::bfgs::BfgsMinimizer;
use crate::core::minimizer::variables::MinimizerVariables;
use crate::core::utils::geometry::signed_volume_gradient;
use nalgebra::Vector3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{trace, warn};

pub const DEFAULT_BOX_SIZE: f64 = 10.0;
pub const DEFAULT_NUM_CYCLES: usize = 50;
pub const DEFAULT_STEPS_PER_CONSTRAINT: f64 = 1.0;
pub const DEFAULT_DISTANCE_TOLERANCE: f64 = 0.1;
pub const DEFAULT_VOLUME_TOLERANCE: f64 = 0.1;

const START_LEARNING_RATE: f64 = 1.0;
const END_LEARNING_RATE: f64 = 0.1;
const POLISH_ITERATIONS: usize = 300;
const POLISH_GRADIENT_NORM: f64 = 1e-5;
const MIN_DISTANCE: f64 = 1e-8;

/// Embeds atoms in 3D so that a set of distance and signed-volume constraints holds.
///
/// Coordinates are drawn uniformly from a cube and refined by stochastic proximity
/// embedding: random single-constraint corrections with a decaying learning rate,
/// followed by a BFGS polish of the squared constraint violations.
#[derive(Debug, Clone)]
pub struct DgCoordinatesGenerator {
    atom_count: usize,
    excluded: Vec<bool>,
    constraints: ConstraintSet,
    box_size: f64,
    num_cycles: usize,
    steps_per_constraint: f64,
    distance_tolerance: f64,
    volume_tolerance: f64,
    rng: StdRng,
    prepared: bool,
    feasible: bool,
}

impl Default for DgCoordinatesGenerator {
    fn default() -> Self {
        Self::new(0)
    }
}

impl DgCoordinatesGenerator {
    pub fn new(atom_count: usize) -> Self {
        Self {
            atom_count,
            excluded: vec![false; atom_count],
            constraints: ConstraintSet::new(),
            box_size: DEFAULT_BOX_SIZE,
            num_cycles: DEFAULT_NUM_CYCLES,
            steps_per_constraint: DEFAULT_STEPS_PER_CONSTRAINT,
            distance_tolerance: DEFAULT_DISTANCE_TOLERANCE,
            volume_tolerance: DEFAULT_VOLUME_TOLERANCE,
            rng: StdRng::from_entropy(),
            prepared: false,
            feasible: true,
        }
    }

    /// Resizes the problem and drops all constraints.
    pub fn set_atom_count(&mut self, atom_count: usize) {
        self.atom_count = atom_count;
        self.excluded = vec![false; atom_count];
        self.clear_constraints();
    }

    pub fn atom_count(&self) -> usize {
        self.atom_count
    }

    /// Atoms flagged in `mask` are not embedded and are left at the origin.
    pub fn set_excluded_atoms(&mut self, mask: &[bool]) {
        self.excluded = (0..self.atom_count)
            .map(|i| mask.get(i).copied().unwrap_or(false))
            .collect();
    }

    pub fn set_box_size(&mut self, box_size: f64) {
        self.box_size = box_size;
    }

    pub fn box_size(&self) -> f64 {
        self.box_size
    }

    pub fn set_num_cycles(&mut self, num_cycles: usize) {
        self.num_cycles = num_cycles.max(1);
    }

    pub fn set_steps_per_constraint(&mut self, steps: f64) {
        self.steps_per_constraint = steps;
    }

    pub fn set_distance_tolerance(&mut self, tolerance: f64) {
        self.distance_tolerance = tolerance;
    }

    pub fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    pub fn clear_constraints(&mut self) {
        self.constraints.clear();
        self.prepared = false;
        self.feasible = true;
    }

    pub fn constraints(&self) -> &ConstraintSet {
        &self.constraints
    }

    /// False once smoothing has shown the distance constraints to be contradictory.
    pub fn is_feasible(&self) -> bool {
        self.feasible
    }

    /// Smooths the distance bounds with the triangle inequality and writes the tightened
    /// bounds back into the constraints.
    fn prepare(&mut self) {
        let mut bounds =
            DistanceBoundsMatrix::from_constraints(self.atom_count, &self.constraints.distances);
        self.feasible = bounds.smooth();
        if self.feasible {
            for c in &mut self.constraints.distances {
                let [a, b] = c.atoms;
                if a < self.atom_count && b < self.atom_count {
                    c.lower = bounds.lower(a, b);
                    c.upper = bounds.upper(a, b);
                }
            }
        } else {
            warn!(
                atoms = self.atom_count,
                constraints = self.constraints.distances.len(),
                "Distance bounds are infeasible after triangle smoothing."
            );
        }
        self.prepared = true;
    }

    /// One random start plus refinement. Overwrites `coords`; returns true on convergence.
    pub fn generate(&mut self, coords: &mut Vec<Vector3<f64>>) -> bool {
        if self.atom_count == 0 {
            return false;
        }
        if !self.prepared {
            self.prepare();
        }
        if !self.feasible {
            return false;
        }

        coords.clear();
        let half = 0.5 * self.box_size;
        for i in 0..self.atom_count {
            if self.excluded[i] {
                coords.push(Vector3::zeros());
            } else {
                coords.push(Vector3::new(
                    self.rng.gen_range(-half..=half),
                    self.rng.gen_range(-half..=half),
                    self.rng.gen_range(-half..=half),
                ));
            }
        }
        self.refine(coords)
    }

    /// Refines existing coordinates against the current constraints.
    pub fn refine(&mut self, coords: &mut [Vector3<f64>]) -> bool {
        if coords.len() != self.atom_count {
            return false;
        }
        if !self.prepared {
            self.prepare();
        }
        if !self.feasible {
            return false;
        }
        let total = self.constraints.distances.len() + self.constraints.volumes.len();
        if total == 0 {
            return true;
        }

        let steps = ((self.steps_per_constraint * total as f64).round() as usize).max(1);
        for cycle in 0..self.num_cycles {
            let progress = if self.num_cycles > 1 {
                cycle as f64 / (self.num_cycles - 1) as f64
            } else {
                1.0
            };
            let lambda = START_LEARNING_RATE + (END_LEARNING_RATE - START_LEARNING_RATE) * progress;
            for _ in 0..steps {
                let k = self.rng.gen_range(0..total);
                if k < self.constraints.distances.len() {
                    let c = self.constraints.distances[k];
                    self.distance_step(&c, coords, lambda);
                } else {
                    let c = self.constraints.volumes[k - self.constraints.distances.len()];
                    volume_step(&c, coords, lambda);
                }
            }
        }

        self.polish(coords);
        let (max_distance, max_volume) = self.max_violations(coords);
        let converged = max_distance <= self.distance_tolerance && max_volume <= self.volume_tolerance;
        trace!(max_distance, max_volume, converged, "Embedding refinement finished.");
        converged
    }

    fn distance_step(&mut self, c: &DistanceConstraint, coords: &mut [Vector3<f64>], lambda: f64) {
        let [a, b] = c.atoms;
        let mut delta = coords[a] - coords[b];
        let mut d = delta.norm();
        if d < MIN_DISTANCE {
            delta = Vector3::new(
                self.rng.gen_range(-1.0..1.0),
                self.rng.gen_range(-1.0..1.0),
                self.rng.gen_range(-1.0..1.0),
            ) * 1e-3;
            d = delta.norm().max(MIN_DISTANCE);
        }
        let target = d.max(c.lower).min(c.upper);
        if target == d {
            return;
        }
        let shift = delta * (lambda * 0.5 * (target - d) / d);
        coords[a] += shift;
        coords[b] -= shift;
    }

    /// BFGS minimization of the summed squared violations.
    fn polish(&self, coords: &mut [Vector3<f64>]) {
        let constraints = &self.constraints;
        let mut x: Vec<Vector3<f64>> = coords.to_vec();
        let mut grad = x.zeros_like();
        let mut minimizer = BfgsMinimizer::new(
            &x,
            |x: &Vec<Vector3<f64>>| constraint_error(constraints, x, None),
            |x: &Vec<Vector3<f64>>, g: &mut Vec<Vector3<f64>>| {
                constraint_error(constraints, x, Some(g))
            },
        );
        let status = minimizer.minimize(&mut x, &mut grad, POLISH_ITERATIONS, POLISH_GRADIENT_NORM, -1.0, true);
        let error = minimizer.function_value();
        trace!(?status, error, "Polished embedding.");
        if error.is_finite() {
            coords.copy_from_slice(&x);
        }
    }

    /// Largest distance and volume violations of the current constraints.
    pub fn max_violations(&self, coords: &[Vector3<f64>]) -> (f64, f64) {
        let distance = self
            .constraints
            .distances
            .iter()
            .map(|c| c.violation(coords))
            .fold(0.0, f64::max);
        let volume = self
            .constraints
            .volumes
            .iter()
            .map(|c| c.violation(coords))
            .fold(0.0, f64::max);
        (distance, volume)
    }
}

impl ConstraintSink for DgCoordinatesGenerator {
    fn add_distance_constraint(&mut self, constraint: DistanceConstraint) {
        self.constraints.add_distance_constraint(constraint);
        self.prepared = false;
    }

    fn add_volume_constraint(&mut self, constraint: VolumeConstraint) {
        self.constraints.add_volume_constraint(constraint);
    }
}

fn volume_step(c: &VolumeConstraint, coords: &mut [Vector3<f64>], lambda: f64) {
    let [a, b, cc, d] = c.atoms;
    let volume = c.volume(coords);
    let target = volume.max(c.lower).min(c.upper);
    if target == volume {
        return;
    }
    let grads = signed_volume_gradient(&coords[a], &coords[b], &coords[cc], &coords[d]);
    let norm: f64 = grads.iter().map(|g| g.norm_squared()).sum();
    if norm < MIN_DISTANCE {
        return;
    }
    let factor = lambda * (target - volume) / norm;
    for (atom, g) in [a, b, cc, d].into_iter().zip(grads) {
        coords[atom] += g * factor;
    }
}

/// Sum of squared constraint violations, optionally with its gradient.
fn constraint_error(
    constraints: &ConstraintSet,
    coords: &[Vector3<f64>],
    mut grad: Option<&mut Vec<Vector3<f64>>>,
) -> f64 {
    if let Some(g) = grad.as_deref_mut() {
        g.set_zero();
    }
    let mut error = 0.0;

    for c in &constraints.distances {
        let [a, b] = c.atoms;
        let delta = coords[a] - coords[b];
        let d = delta.norm();
        let excess = if d < c.lower {
            d - c.lower
        } else if d > c.upper {
            d - c.upper
        } else {
            continue;
        };
        error += excess * excess;
        if let Some(g) = grad.as_deref_mut() {
            if d > MIN_DISTANCE {
                let f = delta * (2.0 * excess / d);
                g[a] += f;
                g[b] -= f;
            }
        }
    }

    for c in &constraints.volumes {
        let [a, b, cc, d] = c.atoms;
        let volume = c.volume(coords);
        let excess = if volume < c.lower {
            volume - c.lower
        } else if volume > c.upper {
            volume - c.upper
        } else {
            continue;
        };
        error += excess * excess;
        if let Some(g) = grad.as_deref_mut() {
            let dv = signed_volume_gradient(&coords[a], &coords[b], &coords[cc], &coords[d]);
            for (atom, gv) in [a, b, cc, d].into_iter().zip(dv) {
                g[atom] += gv * (2.0 * excess);
            }
        }
    }
    error
}
