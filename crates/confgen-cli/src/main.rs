mod cli;
mod commands;
mod config;
mod error;
mod input;
mod logging;
mod output;
mod utils;

use crate::cli::{Cli, Commands};
use crate::error::{CliError, Result};
use clap::Parser;
use tracing::{debug, error, info};

fn main() {
    if let Err(e) = run_app() {
        eprintln!("\n❌ Error: {}", e);
        std::process::exit(exit_code(&e));
    }
}

fn run_app() -> Result<()> {
    let cli = Cli::parse();
    logging::setup_logging(cli.verbose, cli.quiet, cli.log_file.as_deref())?;

    info!("🚀 confgen v{} starting up.", env!("CARGO_PKG_VERSION"));
    debug!("Full CLI arguments parsed: {:?}", &cli);

    let command_result = match cli.command {
        Commands::Generate(args) => {
            info!("Dispatching to 'generate' command.");
            commands::generate::run(args)
        }
    };

    match &command_result {
        Ok(()) => info!("✅ Command completed successfully."),
        Err(e) => error!("❌ Command failed: {}", e),
    }
    command_result
}

/// Distinct exit statuses for the generation outcomes; everything else exits with 1.
fn exit_code(error: &CliError) -> i32 {
    use confgen::engine::error::ReturnCode;
    match error {
        CliError::Generation(e) => match e.code() {
            ReturnCode::Success => 0,
            ReturnCode::Uninitialized => 10,
            ReturnCode::MaxNumTrialsExceeded => 11,
            ReturnCode::TimeoutExceeded => 12,
            ReturnCode::ForcefieldSetupFailed => 13,
            ReturnCode::ForcefieldMinimizationFailed => 14,
            ReturnCode::Aborted => 15,
        },
        _ => 1,
    }
}
