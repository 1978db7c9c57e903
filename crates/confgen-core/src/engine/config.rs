use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Invalid value for parameter '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

/// What to do when the force field yields a non-finite energy during minimization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NanPolicy {
    /// Count the trial as failed and continue with the next one.
    #[default]
    RetryTrial,
    /// Stop the whole generation call with `ForcefieldMinimizationFailed`.
    Abort,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingConfig {
    /// Side of the random-start cube per bond (the cube is never smaller than 1 Å).
    pub box_size_factor: f64,
    /// Leave terminal hydrogens out of the embedding and place them afterwards.
    pub exclude_hydrogens: bool,
    pub num_cycles: usize,
    pub steps_per_constraint: f64,
    /// Largest distance violation (Å) an embedding may keep and still count as converged.
    pub distance_tolerance: f64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            box_size_factor: 2.0,
            exclude_hydrogens: true,
            num_cycles: 50,
            steps_per_constraint: 1.0,
            distance_tolerance: 0.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MinimizationConfig {
    /// Iteration budget per trial; 0 means unlimited.
    pub max_steps: usize,
    /// Gradient-norm convergence threshold; negative disables the test.
    pub gradient_norm: f64,
    /// Energy-change convergence threshold; negative disables the test.
    pub energy_delta: f64,
    /// Minimizer iterations between two timeout checks.
    pub timeout_check_interval: usize,
    pub step_size: f64,
    pub line_search_tolerance: f64,
}

impl Default for MinimizationConfig {
    fn default() -> Self {
        Self {
            max_steps: 0,
            gradient_norm: 0.1,
            energy_delta: -1.0,
            timeout_check_interval: 10,
            step_size: 0.001,
            line_search_tolerance: 0.15,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrialConfig {
    /// Trial budget; 0 means unlimited (bounded by the timeout only).
    pub max_num_trials: usize,
    pub timeout: Duration,
    /// Fixed seed for the embedder; `None` seeds from system entropy.
    pub seed: Option<u64>,
    pub nan_policy: NanPolicy,
    pub num_conformers: usize,
    /// Conformers more than this (kcal/mol) above the best one are discarded.
    pub energy_window: f64,
}

impl Default for TrialConfig {
    fn default() -> Self {
        Self {
            max_num_trials: 10,
            timeout: Duration::from_secs(600),
            seed: None,
            nan_policy: NanPolicy::RetryTrial,
            num_conformers: 1,
            energy_window: 10.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StereoConfig {
    pub regard_atom_configuration: bool,
    pub regard_bond_configuration: bool,
}

impl Default for StereoConfig {
    fn default() -> Self {
        Self {
            regard_atom_configuration: true,
            regard_bond_configuration: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct GenerationConfig {
    pub embedding: EmbeddingConfig,
    pub minimization: MinimizationConfig,
    pub trials: TrialConfig,
    pub stereo: StereoConfig,
}

impl GenerationConfig {
    pub fn builder() -> GenerationConfigBuilder {
        GenerationConfigBuilder::new()
    }

    /// Embedding cube side for a molecule with `bond_count` bonds.
    pub fn box_size(&self, bond_count: usize) -> f64 {
        (self.embedding.box_size_factor * bond_count as f64).max(1.0)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let e = &self.embedding;
        let m = &self.minimization;
        let t = &self.trials;
        require(
            e.box_size_factor.is_finite() && e.box_size_factor > 0.0,
            "box_size_factor",
            "must be a positive number",
        )?;
        require(e.num_cycles > 0, "num_cycles", "must be at least 1")?;
        require(
            e.steps_per_constraint.is_finite() && e.steps_per_constraint > 0.0,
            "steps_per_constraint",
            "must be a positive number",
        )?;
        require(
            e.distance_tolerance.is_finite() && e.distance_tolerance > 0.0,
            "distance_tolerance",
            "must be a positive number",
        )?;
        require(
            !m.gradient_norm.is_nan(),
            "gradient_norm",
            "must be a number (negative disables the test)",
        )?;
        require(
            !m.energy_delta.is_nan(),
            "energy_delta",
            "must be a number (negative disables the test)",
        )?;
        require(
            m.timeout_check_interval > 0,
            "timeout_check_interval",
            "must be at least 1",
        )?;
        require(
            m.step_size.is_finite() && m.step_size > 0.0,
            "step_size",
            "must be a positive number",
        )?;
        require(
            m.line_search_tolerance > 0.01 && m.line_search_tolerance < 1.0,
            "line_search_tolerance",
            "must lie strictly between 0.01 and 1",
        )?;
        require(!t.timeout.is_zero(), "timeout", "must be positive")?;
        require(t.num_conformers > 0, "num_conformers", "must be at least 1")?;
        require(
            t.energy_window.is_finite() && t.energy_window >= 0.0,
            "energy_window",
            "must be a non-negative number",
        )?;
        Ok(())
    }
}

fn require(condition: bool, name: &'static str, reason: &str) -> Result<(), ConfigError> {
    if condition {
        Ok(())
    } else {
        Err(ConfigError::InvalidParameter {
            name,
            reason: reason.to_string(),
        })
    }
}

/// Fluent construction of a validated [`GenerationConfig`]; unset values keep their defaults.
#[derive(Debug, Default)]
pub struct GenerationConfigBuilder {
    config: GenerationConfig,
}

impl GenerationConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn box_size_factor(mut self, factor: f64) -> Self {
        self.config.embedding.box_size_factor = factor;
        self
    }
    pub fn exclude_hydrogens(mut self, exclude: bool) -> Self {
        self.config.embedding.exclude_hydrogens = exclude;
        self
    }
    pub fn num_cycles(mut self, cycles: usize) -> Self {
        self.config.embedding.num_cycles = cycles;
        self
    }
    pub fn steps_per_constraint(mut self, steps: f64) -> Self {
        self.config.embedding.steps_per_constraint = steps;
        self
    }
    pub fn distance_tolerance(mut self, tolerance: f64) -> Self {
        self.config.embedding.distance_tolerance = tolerance;
        self
    }
    pub fn max_minimization_steps(mut self, steps: usize) -> Self {
        self.config.minimization.max_steps = steps;
        self
    }
    pub fn minimization_gradient_norm(mut self, threshold: f64) -> Self {
        self.config.minimization.gradient_norm = threshold;
        self
    }
    pub fn minimization_energy_delta(mut self, threshold: f64) -> Self {
        self.config.minimization.energy_delta = threshold;
        self
    }
    pub fn timeout_check_interval(mut self, steps: usize) -> Self {
        self.config.minimization.timeout_check_interval = steps;
        self
    }
    pub fn step_size(mut self, step: f64) -> Self {
        self.config.minimization.step_size = step;
        self
    }
    pub fn line_search_tolerance(mut self, tolerance: f64) -> Self {
        self.config.minimization.line_search_tolerance = tolerance;
        self
    }
    pub fn max_num_trials(mut self, trials: usize) -> Self {
        self.config.trials.max_num_trials = trials;
        self
    }
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.trials.timeout = timeout;
        self
    }
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.trials.seed = Some(seed);
        self
    }
    pub fn nan_policy(mut self, policy: NanPolicy) -> Self {
        self.config.trials.nan_policy = policy;
        self
    }
    pub fn num_conformers(mut self, n: usize) -> Self {
        self.config.trials.num_conformers = n;
        self
    }
    pub fn energy_window(mut self, window: f64) -> Self {
        self.config.trials.energy_window = window;
        self
    }
    pub fn regard_atom_configuration(mut self, regard: bool) -> Self {
        self.config.stereo.regard_atom_configuration = regard;
        self
    }
    pub fn regard_bond_configuration(mut self, regard: bool) -> Self {
        self.config.stereo.regard_bond_configuration = regard;
        self
    }

    pub fn build(self) -> Result<GenerationConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
