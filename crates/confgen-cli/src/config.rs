use crate::cli::GenerateArgs;
use crate::error::{CliError, Result};
use confgen::core::forcefield::params::ForcefieldParams;
use confgen::engine::config::{GenerationConfig, GenerationConfigBuilder, NanPolicy};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialEmbeddingConfig {
    box_size_factor: Option<f64>,
    exclude_hydrogens: Option<bool>,
    num_cycles: Option<usize>,
    steps_per_constraint: Option<f64>,
    distance_tolerance: Option<f64>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialMinimizationConfig {
    max_steps: Option<usize>,
    gradient_norm: Option<f64>,
    energy_delta: Option<f64>,
    timeout_check_interval: Option<usize>,
    step_size: Option<f64>,
    line_search_tolerance: Option<f64>,
}

#[derive(Deserialize, Debug, Clone, Copy)]
#[serde(rename_all = "kebab-case")]
enum PartialNanPolicy {
    RetryTrial,
    Abort,
}

impl From<PartialNanPolicy> for NanPolicy {
    fn from(p: PartialNanPolicy) -> Self {
        match p {
            PartialNanPolicy::RetryTrial => NanPolicy::RetryTrial,
            PartialNanPolicy::Abort => NanPolicy::Abort,
        }
    }
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialTrialConfig {
    max_num_trials: Option<usize>,
    timeout_secs: Option<f64>,
    seed: Option<u64>,
    nan_policy: Option<PartialNanPolicy>,
    num_conformers: Option<usize>,
    energy_window: Option<f64>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialStereoConfig {
    regard_atom_configuration: Option<bool>,
    regard_bond_configuration: Option<bool>,
}

/// The TOML configuration file; every key is optional.
#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct PartialGenerationConfig {
    forcefield_params: Option<PathBuf>,
    #[serde(default)]
    embedding: PartialEmbeddingConfig,
    #[serde(default)]
    minimization: PartialMinimizationConfig,
    #[serde(default)]
    trials: PartialTrialConfig,
    #[serde(default)]
    stereo: PartialStereoConfig,
}

impl PartialGenerationConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    fn from_toml(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Applies `--set` pairs and command-line flags on top of the file values.
    pub fn merge_with_cli(
        mut self,
        args: &GenerateArgs,
    ) -> Result<(GenerationConfig, ForcefieldParams)> {
        self.apply_set_values(&args.set_values)?;

        let params_path = args.forcefield_params.as_ref().or(self.forcefield_params.as_ref());
        let params = match params_path {
            Some(path) => ForcefieldParams::load(path).map_err(|e| CliError::FileParsing {
                path: path.clone(),
                source: e.into(),
            })?,
            None => ForcefieldParams::default(),
        };

        let mut builder = GenerationConfig::builder();
        builder = self.apply_file_values(builder)?;

        if let Some(n) = args.num_conformers {
            builder = builder.num_conformers(n);
        }
        if let Some(seed) = args.seed {
            builder = builder.seed(seed);
        }
        if let Some(trials) = args.max_trials {
            builder = builder.max_num_trials(trials);
        }
        if let Some(secs) = args.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        if args.keep_hydrogens {
            builder = builder.exclude_hydrogens(false);
        }
        if args.ignore_stereo {
            builder = builder
                .regard_atom_configuration(false)
                .regard_bond_configuration(false);
        }

        Ok((builder.build()?, params))
    }

    fn apply_file_values(&self, mut b: GenerationConfigBuilder) -> Result<GenerationConfigBuilder> {
        let e = &self.embedding;
        let m = &self.minimization;
        let t = &self.trials;
        let s = &self.stereo;

        if let Some(v) = e.box_size_factor {
            b = b.box_size_factor(v);
        }
        if let Some(v) = e.exclude_hydrogens {
            b = b.exclude_hydrogens(v);
        }
        if let Some(v) = e.num_cycles {
            b = b.num_cycles(v);
        }
        if let Some(v) = e.steps_per_constraint {
            b = b.steps_per_constraint(v);
        }
        if let Some(v) = e.distance_tolerance {
            b = b.distance_tolerance(v);
        }
        if let Some(v) = m.max_steps {
            b = b.max_minimization_steps(v);
        }
        if let Some(v) = m.gradient_norm {
            b = b.minimization_gradient_norm(v);
        }
        if let Some(v) = m.energy_delta {
            b = b.minimization_energy_delta(v);
        }
        if let Some(v) = m.timeout_check_interval {
            b = b.timeout_check_interval(v);
        }
        if let Some(v) = m.step_size {
            b = b.step_size(v);
        }
        if let Some(v) = m.line_search_tolerance {
            b = b.line_search_tolerance(v);
        }
        if let Some(v) = t.max_num_trials {
            b = b.max_num_trials(v);
        }
        if let Some(secs) = t.timeout_secs {
            let timeout = Duration::try_from_secs_f64(secs).map_err(|_| {
                CliError::Config(format!("`trials.timeout-secs` is not a valid duration: {secs}"))
            })?;
            b = b.timeout(timeout);
        }
        if let Some(v) = t.seed {
            b = b.seed(v);
        }
        if let Some(v) = t.nan_policy {
            b = b.nan_policy(v.into());
        }
        if let Some(v) = t.num_conformers {
            b = b.num_conformers(v);
        }
        if let Some(v) = t.energy_window {
            b = b.energy_window(v);
        }
        if let Some(v) = s.regard_atom_configuration {
            b = b.regard_atom_configuration(v);
        }
        if let Some(v) = s.regard_bond_configuration {
            b = b.regard_bond_configuration(v);
        }
        Ok(b)
    }

    fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let Some((key, value)) = kv_pair.split_once('=') else {
                return Err(CliError::Config(format!(
                    "Invalid --set format: '{}'. Expected KEY=VALUE.",
                    kv_pair
                )));
            };
            let (key, value) = (key.trim(), value.trim());

            match key {
                "embedding.box-size-factor" => {
                    self.embedding.box_size_factor = Some(parse_value(key, value)?)
                }
                "embedding.exclude-hydrogens" => {
                    self.embedding.exclude_hydrogens = Some(parse_value(key, value)?)
                }
                "embedding.num-cycles" => self.embedding.num_cycles = Some(parse_value(key, value)?),
                "minimization.max-steps" => {
                    self.minimization.max_steps = Some(parse_value(key, value)?)
                }
                "minimization.gradient-norm" => {
                    self.minimization.gradient_norm = Some(parse_value(key, value)?)
                }
                "minimization.energy-delta" => {
                    self.minimization.energy_delta = Some(parse_value(key, value)?)
                }
                "trials.max-num-trials" => {
                    self.trials.max_num_trials = Some(parse_value(key, value)?)
                }
                "trials.timeout-secs" => self.trials.timeout_secs = Some(parse_value(key, value)?),
                "trials.num-conformers" => {
                    self.trials.num_conformers = Some(parse_value(key, value)?)
                }
                "trials.energy-window" => {
                    self.trials.energy_window = Some(parse_value(key, value)?)
                }
                "stereo.regard-atom-configuration" => {
                    self.stereo.regard_atom_configuration = Some(parse_value(key, value)?)
                }
                "stereo.regard-bond-configuration" => {
                    self.stereo.regard_bond_configuration = Some(parse_value(key, value)?)
                }
                _ => {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            }
        }
        Ok(())
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| CliError::Config(format!("Invalid value for {}: {}", key, value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use std::fs;
    use tempfile::tempdir;

    fn generate_args(extra: &[&str]) -> GenerateArgs {
        let mut argv = vec!["confgen", "generate", "-i", "mol.toml"];
        argv.extend_from_slice(extra);
        let Commands::Generate(args) = Cli::parse_from(argv).command;
        args
    }

    #[test]
    fn empty_file_yields_library_defaults() {
        let partial = PartialGenerationConfig::from_toml("").unwrap();
        let (config, params) = partial.merge_with_cli(&generate_args(&[])).unwrap();
        assert_eq!(config, GenerationConfig::default());
        assert_eq!(params, ForcefieldParams::default());
    }

    #[test]
    fn file_values_are_applied() {
        let partial = PartialGenerationConfig::from_toml(
            r#"
            [embedding]
            box-size-factor = 3.0

            [trials]
            max-num-trials = 25
            timeout-secs = 1.5
            nan-policy = "abort"

            [stereo]
            regard-bond-configuration = false
            "#,
        )
        .unwrap();
        let (config, _) = partial.merge_with_cli(&generate_args(&[])).unwrap();
        assert_eq!(config.embedding.box_size_factor, 3.0);
        assert_eq!(config.trials.max_num_trials, 25);
        assert_eq!(config.trials.timeout, Duration::from_millis(1500));
        assert_eq!(config.trials.nan_policy, NanPolicy::Abort);
        assert!(!config.stereo.regard_bond_configuration);
        assert!(config.stereo.regard_atom_configuration);
    }

    #[test]
    fn cli_flags_override_file_values() {
        let partial = PartialGenerationConfig::from_toml(
            r#"
            [trials]
            num-conformers = 5
            seed = 1
            "#,
        )
        .unwrap();
        let args = generate_args(&["-n", "2", "--seed", "9", "--keep-hydrogens", "--ignore-stereo"]);
        let (config, _) = partial.merge_with_cli(&args).unwrap();
        assert_eq!(config.trials.num_conformers, 2);
        assert_eq!(config.trials.seed, Some(9));
        assert!(!config.embedding.exclude_hydrogens);
        assert!(!config.stereo.regard_atom_configuration);
        assert!(!config.stereo.regard_bond_configuration);
    }

    #[test]
    fn set_values_override_the_file() {
        let partial = PartialGenerationConfig::from_toml("[trials]\nenergy-window = 3.0\n").unwrap();
        let args = generate_args(&["-S", "trials.energy-window=7.5", "-S", "minimization.max-steps=200"]);
        let (config, _) = partial.merge_with_cli(&args).unwrap();
        assert_eq!(config.trials.energy_window, 7.5);
        assert_eq!(config.minimization.max_steps, 200);
    }

    #[test]
    fn invalid_set_values_are_rejected() {
        let bad_format = generate_args(&["-S", "trials.energy-window"]);
        assert!(matches!(
            PartialGenerationConfig::default().merge_with_cli(&bad_format),
            Err(CliError::Config(_))
        ));
        let unknown_key = generate_args(&["-S", "trials.color=blue"]);
        assert!(matches!(
            PartialGenerationConfig::default().merge_with_cli(&unknown_key),
            Err(CliError::Config(_))
        ));
        let bad_value = generate_args(&["-S", "trials.num-conformers=many"]);
        assert!(matches!(
            PartialGenerationConfig::default().merge_with_cli(&bad_value),
            Err(CliError::Config(_))
        ));
    }

    #[test]
    fn out_of_range_values_fail_validation() {
        let partial = PartialGenerationConfig::from_toml("[embedding]\nnum-cycles = 0\n").unwrap();
        let result = partial.merge_with_cli(&generate_args(&[]));
        assert!(matches!(result, Err(CliError::Config(msg)) if msg.contains("num_cycles")));
    }

    #[test]
    fn unknown_keys_in_file_are_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[trials]\nmax-trials = 3\n").unwrap();
        let result = PartialGenerationConfig::from_file(&path);
        assert!(matches!(result, Err(CliError::FileParsing { .. })));
    }

    #[test]
    fn forcefield_params_are_loaded_from_the_given_path() {
        let dir = tempdir().unwrap();
        let params_path = dir.path().join("ff.toml");
        fs::write(&params_path, "bond_stretch_k = 500.0\n").unwrap();
        let args = generate_args(&["--forcefield-params", params_path.to_str().unwrap()]);
        let (_, params) = PartialGenerationConfig::default().merge_with_cli(&args).unwrap();
        assert_eq!(params.bond_stretch_k, 500.0);
    }
}
