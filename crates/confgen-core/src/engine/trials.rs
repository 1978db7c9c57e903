use super::config::{GenerationConfig, MinimizationConfig, NanPolicy};
use super::error::GenerationError;
use super::pool::CoordinatesPool;
use super::progress::{Progress, ProgressReporter, TrialFailure};
use super::state::{Conformer, ConformerCollector};
use crate::core::dg::structure::DgStructureGenerator;
use crate::core::forcefield::energy::EnergyFunction;
use crate::core::minimizer::bfgs::{BfgsMinimizer, MinimizerStatus};
use crate::core::models::molecule::Molecule;
use crate::core::models::stereo::BondStereoDescriptor;
use crate::core::utils::hydrogens::{orient_stereo_hydrogens, place_hydrogens};
use nalgebra::Vector3;
use std::cell::Cell;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, trace, warn};

/// Source of initial coordinates for the trial loop.
pub trait CoordinateEmbedder {
    /// Writes a fresh embedding into `coords`; returns `false` when no feasible one was found.
    fn generate(&mut self, coords: &mut Vec<Vector3<f64>>) -> bool;

    fn check_atom_configurations(&self, coords: &[Vector3<f64>]) -> bool;

    fn check_bond_configurations(&self, coords: &[Vector3<f64>]) -> bool;

    /// Atoms left out of the embedding that must be placed before minimization.
    fn excluded_hydrogen_mask(&self) -> &[bool];

    /// Stereo bonds whose hydrogen references are oriented after placement.
    fn bond_stereo_centers(&self) -> &[BondStereoDescriptor] {
        &[]
    }
}

impl CoordinateEmbedder for DgStructureGenerator {
    fn generate(&mut self, coords: &mut Vec<Vector3<f64>>) -> bool {
        DgStructureGenerator::generate(self, coords)
    }

    fn check_atom_configurations(&self, coords: &[Vector3<f64>]) -> bool {
        DgStructureGenerator::check_atom_configurations(self, coords)
    }

    fn check_bond_configurations(&self, coords: &[Vector3<f64>]) -> bool {
        DgStructureGenerator::check_bond_configurations(self, coords)
    }

    fn excluded_hydrogen_mask(&self) -> &[bool] {
        DgStructureGenerator::excluded_hydrogen_mask(self)
    }

    fn bond_stereo_centers(&self) -> &[BondStereoDescriptor] {
        DgStructureGenerator::bond_stereo_centers(self)
    }
}

#[derive(Debug, Clone)]
pub struct GenerationResult {
    /// Accepted conformers, lowest energy first.
    pub conformers: Vec<Conformer>,
    pub trials: usize,
    pub elapsed: Duration,
    /// The timeout ended the run before the requested number of conformers was found.
    pub timed_out: bool,
}

impl GenerationResult {
    pub fn best(&self) -> Option<&Conformer> {
        self.conformers.first()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Interrupt {
    Timeout,
    Aborted,
}

#[derive(Debug, Clone, Copy)]
struct Deadline {
    start: Instant,
    timeout: Duration,
}

impl Deadline {
    fn check(&self, reporter: &ProgressReporter<'_>) -> Result<(), Interrupt> {
        if reporter.should_abort() {
            return Err(Interrupt::Aborted);
        }
        if self.start.elapsed() >= self.timeout {
            return Err(Interrupt::Timeout);
        }
        Ok(())
    }
}

enum TrialResult {
    Accepted(f64),
    Failed(TrialFailure),
    Interrupted(Interrupt),
}

enum Relaxation {
    Finished(f64),
    NonFinite,
    Interrupted(Interrupt),
}

/// Embeds, minimizes and checks structures until enough conformers are accepted or the
/// trial budget or timeout runs out.
#[instrument(skip_all, name = "trial_loop")]
pub fn run_trials<E, F>(
    molecule: &Molecule,
    embedder: &mut E,
    energy: &F,
    config: &GenerationConfig,
    reporter: &ProgressReporter<'_>,
) -> Result<GenerationResult, GenerationError>
where
    E: CoordinateEmbedder,
    F: EnergyFunction,
{
    let deadline = Deadline {
        start: Instant::now(),
        timeout: config.trials.timeout,
    };
    let max_trials = config.trials.max_num_trials;
    let pool = CoordinatesPool::new();
    let mut collector =
        ConformerCollector::new(config.trials.num_conformers, config.trials.energy_window);
    let mut trial = 0;
    let mut timed_out = false;

    while max_trials == 0 || trial < max_trials {
        match deadline.check(reporter) {
            Ok(()) => {}
            Err(Interrupt::Aborted) => return Err(GenerationError::Aborted),
            Err(Interrupt::Timeout) => {
                timed_out = true;
                break;
            }
        }
        trial += 1;
        reporter.report(Progress::TrialStart { trial });

        let mut coords = pool.checkout(molecule.atom_count());
        match run_trial(molecule, embedder, energy, config, &mut coords, deadline, reporter) {
            TrialResult::Accepted(value) => {
                let kept = collector.offer(Conformer {
                    energy: value,
                    coords: coords.to_vec(),
                    trial,
                });
                if kept {
                    debug!(trial, energy = value, "Conformer accepted");
                    reporter.report(Progress::ConformerAccepted { trial, energy: value });
                } else {
                    reporter.report(Progress::TrialFailed {
                        trial,
                        reason: TrialFailure::OutsideEnergyWindow,
                    });
                }
                if collector.is_full() {
                    break;
                }
            }
            TrialResult::Failed(TrialFailure::NonFiniteEnergy)
                if config.trials.nan_policy == NanPolicy::Abort =>
            {
                warn!(trial, "Non-finite energy during minimization, aborting");
                return Err(GenerationError::ForcefieldMinimizationFailed { trial });
            }
            TrialResult::Failed(reason) => {
                debug!(trial, ?reason, "Trial failed");
                reporter.report(Progress::TrialFailed { trial, reason });
            }
            TrialResult::Interrupted(Interrupt::Aborted) => return Err(GenerationError::Aborted),
            TrialResult::Interrupted(Interrupt::Timeout) => {
                timed_out = true;
                break;
            }
        }
    }

    let elapsed = deadline.start.elapsed();
    if collector.is_empty() {
        return Err(if timed_out {
            GenerationError::TimeoutExceeded { elapsed }
        } else {
            GenerationError::MaxNumTrialsExceeded { trials: trial }
        });
    }
    if timed_out {
        warn!(
            collected = collector.len(),
            requested = config.trials.num_conformers,
            "Timeout reached, returning the conformers found so far"
        );
    }
    info!(
        trials = trial,
        conformers = collector.len(),
        best_energy = collector.best_energy(),
        "Trial loop finished"
    );

    Ok(GenerationResult {
        conformers: collector.into_sorted_vec(),
        trials: trial,
        elapsed,
        timed_out,
    })
}

fn run_trial<E, F>(
    molecule: &Molecule,
    embedder: &mut E,
    energy: &F,
    config: &GenerationConfig,
    coords: &mut Vec<Vector3<f64>>,
    deadline: Deadline,
    reporter: &ProgressReporter<'_>,
) -> TrialResult
where
    E: CoordinateEmbedder,
    F: EnergyFunction,
{
    if !embedder.generate(coords) {
        return TrialResult::Failed(TrialFailure::EmbeddingFailed);
    }

    let mask = embedder.excluded_hydrogen_mask();
    if mask.len() == coords.len() && mask.iter().any(|&excluded| excluded) {
        place_hydrogens(molecule, coords, mask);
        if config.stereo.regard_bond_configuration {
            orient_stereo_hydrogens(molecule, coords, mask, embedder.bond_stereo_centers());
        }
    }

    let value = match relax(energy, &config.minimization, coords, deadline, reporter) {
        Relaxation::Finished(value) => value,
        Relaxation::NonFinite => return TrialResult::Failed(TrialFailure::NonFiniteEnergy),
        Relaxation::Interrupted(interrupt) => return TrialResult::Interrupted(interrupt),
    };
    if coords.iter().any(|v| !v.iter().all(|c| c.is_finite())) {
        return TrialResult::Failed(TrialFailure::NonFiniteEnergy);
    }

    if config.stereo.regard_atom_configuration && !embedder.check_atom_configurations(coords) {
        return TrialResult::Failed(TrialFailure::AtomConfigurationMismatch);
    }
    if config.stereo.regard_bond_configuration && !embedder.check_bond_configurations(coords) {
        return TrialResult::Failed(TrialFailure::BondConfigurationMismatch);
    }
    TrialResult::Accepted(value)
}

/// Minimizes in chunks of `timeout_check_interval` iterations, checking the deadline
/// between chunks.
fn relax<F: EnergyFunction>(
    energy: &F,
    settings: &MinimizationConfig,
    coords: &mut Vec<Vector3<f64>>,
    deadline: Deadline,
    reporter: &ProgressReporter<'_>,
) -> Relaxation {
    let non_finite = Cell::new(false);
    let watch = |value: f64| {
        if !value.is_finite() {
            non_finite.set(true);
        }
        value
    };
    let mut minimizer = BfgsMinimizer::new(
        &*coords,
        |x: &Vec<Vector3<f64>>| watch(energy.energy(x)),
        |x: &Vec<Vector3<f64>>, g: &mut Vec<Vector3<f64>>| watch(energy.energy_and_gradient(x, g)),
    )
    .with_line_search(settings.step_size, settings.line_search_tolerance);

    let mut grad = vec![Vector3::zeros(); coords.len()];
    let mut steps = 0;
    let mut first_chunk = true;
    loop {
        let chunk = if settings.max_steps == 0 {
            settings.timeout_check_interval
        } else {
            settings.timeout_check_interval.min(settings.max_steps - steps)
        };
        let status = minimizer.minimize(
            coords,
            &mut grad,
            chunk,
            settings.gradient_norm,
            settings.energy_delta,
            first_chunk,
        );
        first_chunk = false;

        if non_finite.get() || !minimizer.function_value().is_finite() {
            return Relaxation::NonFinite;
        }
        if !status.contains(MinimizerStatus::ITER_LIMIT_REACHED) {
            trace!(?status, "Minimization stopped");
            break;
        }
        steps += chunk;
        if settings.max_steps != 0 && steps >= settings.max_steps {
            break;
        }
        if let Err(interrupt) = deadline.check(reporter) {
            return Relaxation::Interrupted(interrupt);
        }
    }
    Relaxation::Finished(minimizer.function_value())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::thread::sleep;

    struct FailingEmbedder {
        calls: usize,
        delay: Duration,
    }

    impl CoordinateEmbedder for FailingEmbedder {
        fn generate(&mut self, _coords: &mut Vec<Vector3<f64>>) -> bool {
            self.calls += 1;
            sleep(self.delay);
            false
        }
        fn check_atom_configurations(&self, _coords: &[Vector3<f64>]) -> bool {
            true
        }
        fn check_bond_configurations(&self, _coords: &[Vector3<f64>]) -> bool {
            true
        }
        fn excluded_hydrogen_mask(&self) -> &[bool] {
            &[]
        }
    }

    struct FixedEmbedder {
        coords: Vec<Vector3<f64>>,
        stereo_ok: bool,
        delay: Duration,
        atom_checks: Cell<usize>,
        bond_checks: Cell<usize>,
    }

    impl FixedEmbedder {
        fn new(stereo_ok: bool) -> Self {
            Self {
                coords: vec![Vector3::new(1.0, 0.0, 0.0), Vector3::new(0.0, 1.0, 0.5)],
                stereo_ok,
                delay: Duration::ZERO,
                atom_checks: Cell::new(0),
                bond_checks: Cell::new(0),
            }
        }
    }

    impl CoordinateEmbedder for FixedEmbedder {
        fn generate(&mut self, coords: &mut Vec<Vector3<f64>>) -> bool {
            sleep(self.delay);
            coords.clone_from(&self.coords);
            true
        }
        fn check_atom_configurations(&self, _coords: &[Vector3<f64>]) -> bool {
            self.atom_checks.set(self.atom_checks.get() + 1);
            self.stereo_ok
        }
        fn check_bond_configurations(&self, _coords: &[Vector3<f64>]) -> bool {
            self.bond_checks.set(self.bond_checks.get() + 1);
            self.stereo_ok
        }
        fn excluded_hydrogen_mask(&self) -> &[bool] {
            &[]
        }
    }

    /// Harmonic well at the origin that turns non-finite after `finite_evaluations` calls.
    struct Well {
        evaluations: Cell<usize>,
        finite_evaluations: usize,
    }

    impl Well {
        fn new(finite_evaluations: usize) -> Self {
            Self {
                evaluations: Cell::new(0),
                finite_evaluations,
            }
        }

        fn tick(&self) -> bool {
            let n = self.evaluations.get() + 1;
            self.evaluations.set(n);
            n > self.finite_evaluations
        }
    }

    impl EnergyFunction for Well {
        fn energy(&self, coords: &[Vector3<f64>]) -> f64 {
            if self.tick() {
                return f64::NAN;
            }
            coords.iter().map(|v| v.norm_squared()).sum()
        }

        fn energy_and_gradient(&self, coords: &[Vector3<f64>], grad: &mut [Vector3<f64>]) -> f64 {
            if self.tick() {
                grad.iter_mut().for_each(|g| *g = Vector3::repeat(f64::NAN));
                return f64::NAN;
            }
            for (g, v) in grad.iter_mut().zip(coords) {
                *g = 2.0 * v;
            }
            coords.iter().map(|v| v.norm_squared()).sum()
        }
    }

    fn two_atoms() -> Molecule {
        use crate::core::models::atom::Atom;
        use crate::core::models::element::Element;
        use crate::core::models::topology::BondOrder;
        let mut mol = Molecule::new();
        let a = mol.add_atom(Atom::new(Element::C));
        let b = mol.add_atom(Atom::new(Element::C));
        mol.add_bond(a, b, BondOrder::Single).unwrap();
        mol
    }

    fn config(max_trials: usize) -> GenerationConfig {
        GenerationConfig::builder()
            .max_num_trials(max_trials)
            .minimization_gradient_norm(1e-6)
            .build()
            .unwrap()
    }

    #[test]
    fn always_failing_embedder_uses_exactly_the_trial_budget() {
        let mol = two_atoms();
        let mut embedder = FailingEmbedder {
            calls: 0,
            delay: Duration::ZERO,
        };
        let result = run_trials(
            &mol,
            &mut embedder,
            &Well::new(usize::MAX),
            &config(3),
            &ProgressReporter::new(),
        );
        assert!(matches!(
            result,
            Err(GenerationError::MaxNumTrialsExceeded { trials: 3 })
        ));
        assert_eq!(embedder.calls, 3);
    }

    #[test]
    fn accepted_conformer_is_minimized() {
        let mol = two_atoms();
        let mut embedder = FixedEmbedder::new(true);
        let result = run_trials(
            &mol,
            &mut embedder,
            &Well::new(usize::MAX),
            &config(5),
            &ProgressReporter::new(),
        )
        .unwrap();
        assert_eq!(result.trials, 1);
        assert_eq!(result.conformers.len(), 1);
        let best = result.best().unwrap();
        assert!(best.energy < 1e-8);
        assert!(best.coords.iter().all(|v| v.norm() < 1e-3));
        assert!(!result.timed_out);
    }

    #[test]
    fn stereo_checks_are_skipped_when_not_regarded() {
        let mol = two_atoms();
        let mut embedder = FixedEmbedder::new(false);
        let mut cfg = config(2);
        cfg.stereo.regard_atom_configuration = false;
        cfg.stereo.regard_bond_configuration = false;
        let result = run_trials(
            &mol,
            &mut embedder,
            &Well::new(usize::MAX),
            &cfg,
            &ProgressReporter::new(),
        );
        assert!(result.is_ok());
        assert_eq!(embedder.atom_checks.get(), 0);
        assert_eq!(embedder.bond_checks.get(), 0);
    }

    #[test]
    fn stereo_mismatch_fails_the_trial() {
        let mol = two_atoms();
        let mut embedder = FixedEmbedder::new(false);
        let result = run_trials(
            &mol,
            &mut embedder,
            &Well::new(usize::MAX),
            &config(2),
            &ProgressReporter::new(),
        );
        assert!(matches!(
            result,
            Err(GenerationError::MaxNumTrialsExceeded { trials: 2 })
        ));
        assert_eq!(embedder.atom_checks.get(), 2);
        assert_eq!(embedder.bond_checks.get(), 0);
    }

    #[test]
    fn non_finite_energy_fails_trials_under_retry_policy() {
        let mol = two_atoms();
        let mut embedder = FixedEmbedder::new(true);
        let failures = Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|event| {
            if let Progress::TrialFailed { reason, .. } = event {
                failures.lock().unwrap().push(reason);
            }
        }));
        let result = run_trials(&mol, &mut embedder, &Well::new(2), &config(3), &reporter);
        assert!(matches!(
            result,
            Err(GenerationError::MaxNumTrialsExceeded { trials: 3 })
        ));
        drop(reporter);
        assert_eq!(
            failures.into_inner().unwrap(),
            vec![TrialFailure::NonFiniteEnergy; 3]
        );
    }

    #[test]
    fn non_finite_energy_stops_generation_under_abort_policy() {
        let mol = two_atoms();
        let mut embedder = FixedEmbedder::new(true);
        let mut cfg = config(3);
        cfg.trials.nan_policy = NanPolicy::Abort;
        let result = run_trials(
            &mol,
            &mut embedder,
            &Well::new(2),
            &cfg,
            &ProgressReporter::new(),
        );
        assert!(matches!(
            result,
            Err(GenerationError::ForcefieldMinimizationFailed { trial: 1 })
        ));
    }

    #[test]
    fn timeout_without_conformers_is_an_error() {
        let mol = two_atoms();
        let mut embedder = FailingEmbedder {
            calls: 0,
            delay: Duration::from_millis(5),
        };
        let mut cfg = config(0);
        cfg.trials.timeout = Duration::from_millis(1);
        let result = run_trials(
            &mol,
            &mut embedder,
            &Well::new(usize::MAX),
            &cfg,
            &ProgressReporter::new(),
        );
        assert!(matches!(result, Err(GenerationError::TimeoutExceeded { .. })));
        assert_eq!(embedder.calls, 1);
    }

    #[test]
    fn timeout_returns_conformers_collected_so_far() {
        let mol = two_atoms();
        let mut embedder = FixedEmbedder::new(true);
        embedder.delay = Duration::from_millis(5);
        let mut cfg = config(0);
        cfg.trials.timeout = Duration::from_millis(1);
        cfg.trials.num_conformers = 3;
        cfg.minimization.timeout_check_interval = 10_000;
        let result = run_trials(
            &mol,
            &mut embedder,
            &Well::new(usize::MAX),
            &cfg,
            &ProgressReporter::new(),
        )
        .unwrap();
        assert!(result.timed_out);
        assert_eq!(result.conformers.len(), 1);
    }

    #[test]
    fn abort_callback_stops_generation() {
        let mol = two_atoms();
        let mut embedder = FixedEmbedder::new(true);
        let reporter = ProgressReporter::new().with_abort(Box::new(|| true));
        let result = run_trials(
            &mol,
            &mut embedder,
            &Well::new(usize::MAX),
            &config(3),
            &reporter,
        );
        assert!(matches!(result, Err(GenerationError::Aborted)));
    }
}
