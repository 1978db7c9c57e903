use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "confgen - 3D conformer generation for small molecules by distance geometry and force-field refinement.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate 3D conformers for a molecule described in a TOML file.
    Generate(GenerateArgs),
}

/// Arguments for the `generate` subcommand.
#[derive(Args, Debug)]
pub struct GenerateArgs {
    // --- Core Arguments ---
    /// Path to the molecule description (TOML with [[atoms]] and [[bonds]] tables).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Path for the XYZ output. Prints to stdout when omitted.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Path to a generation configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Override the force-field parameter file.
    #[arg(long, value_name = "PATH")]
    pub forcefield_params: Option<PathBuf>,

    // --- Trial Overrides ---
    /// Number of conformers to collect.
    #[arg(short, long, value_name = "INT")]
    pub num_conformers: Option<usize>,

    /// Seed for the embedder; makes runs reproducible.
    #[arg(long, value_name = "INT")]
    pub seed: Option<u64>,

    /// Maximum number of embedding trials (0 = unlimited).
    #[arg(long, value_name = "INT")]
    pub max_trials: Option<usize>,

    /// Wall-clock limit for the whole generation in seconds.
    #[arg(long, value_name = "SECONDS")]
    pub timeout_secs: Option<u64>,

    // --- Embedding Overrides ---
    /// Embed terminal hydrogens together with the heavy atoms.
    #[arg(long)]
    pub keep_hydrogens: bool,

    /// Accept structures regardless of their atom and bond configurations.
    #[arg(long)]
    pub ignore_stereo: bool,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S trials.energy-window=5.0
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_arguments_are_parsed() {
        let cli = Cli::parse_from([
            "confgen",
            "-vv",
            "generate",
            "-i",
            "mol.toml",
            "-n",
            "3",
            "--seed",
            "42",
            "--ignore-stereo",
            "-S",
            "trials.energy-window=5",
        ]);
        assert_eq!(cli.verbose, 2);
        let Commands::Generate(args) = cli.command;
        assert_eq!(args.input, PathBuf::from("mol.toml"));
        assert_eq!(args.num_conformers, Some(3));
        assert_eq!(args.seed, Some(42));
        assert!(args.ignore_stereo);
        assert!(!args.keep_hydrogens);
        assert_eq!(args.set_values, vec!["trials.energy-window=5".to_string()]);
        assert!(args.output.is_none());
    }

    #[test]
    fn quiet_conflicts_with_verbose() {
        let result = Cli::try_parse_from(["confgen", "-q", "-v", "generate", "-i", "m.toml"]);
        assert!(result.is_err());
    }
}
