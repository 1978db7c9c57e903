use crate::cli::GenerateArgs;
use crate::config::PartialGenerationConfig;
use crate::error::Result;
use crate::input::MoleculeFile;
use crate::output::write_xyz;
use crate::utils::progress::CliProgressHandler;
use confgen::engine::progress::ProgressReporter;
use confgen::workflows;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use tracing::info;

pub fn run(args: GenerateArgs) -> Result<()> {
    let partial_config = match &args.config {
        Some(path) => PartialGenerationConfig::from_file(path)?,
        None => PartialGenerationConfig::default(),
    };
    info!("Merging configuration from file and CLI arguments...");
    let (config, params) = partial_config.merge_with_cli(&args)?;

    info!("Loading molecule from {:?}", &args.input);
    let description = MoleculeFile::from_file(&args.input)?;
    let molecule = description.to_molecule()?;
    let name = description.name.as_deref().unwrap_or("molecule");

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    info!("Invoking the conformer generation workflow...");
    let outcome = workflows::generate::run(&molecule, &config, &params, &reporter);
    progress_handler.finish();
    let result = outcome?;

    if result.timed_out {
        eprintln!(
            "Warning: timeout reached after {:.1}s; writing the {} conformer(s) found so far.",
            result.elapsed.as_secs_f64(),
            result.conformers.len()
        );
    }

    match &args.output {
        Some(path) => {
            let mut writer = BufWriter::new(File::create(path)?);
            write_xyz(&mut writer, &molecule, name, &result.conformers)?;
            writer.flush()?;
            if let Some(best) = result.best() {
                println!(
                    "✓ {} conformer(s) written to {} (best energy: {:.4} kcal/mol)",
                    result.conformers.len(),
                    path.display(),
                    best.energy
                );
            }
        }
        None => {
            let stdout = io::stdout();
            let mut writer = stdout.lock();
            write_xyz(&mut writer, &molecule, name, &result.conformers)?;
            writer.flush()?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use crate::error::CliError;
    use clap::Parser;
    use confgen::engine::error::ReturnCode;
    use std::fs;
    use tempfile::tempdir;

    const ETHANOL: &str = r#"
        name = "ethanol"
        atoms = [
            { element = "C" }, { element = "C" }, { element = "O" },
            { element = "H" }, { element = "H" }, { element = "H" },
            { element = "H" }, { element = "H" }, { element = "H" },
        ]
        bonds = [
            { atoms = [0, 1] }, { atoms = [1, 2] },
            { atoms = [0, 3] }, { atoms = [0, 4] }, { atoms = [0, 5] },
            { atoms = [1, 6] }, { atoms = [1, 7] }, { atoms = [2, 8] },
        ]
    "#;

    fn args(argv: &[&str]) -> GenerateArgs {
        let mut full = vec!["confgen", "generate"];
        full.extend_from_slice(argv);
        let Commands::Generate(args) = Cli::parse_from(full).command;
        args
    }

    #[test]
    fn generate_writes_xyz_file() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("ethanol.toml");
        let output = dir.path().join("ethanol.xyz");
        fs::write(&input, ETHANOL).unwrap();

        run(args(&[
            "-i",
            input.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
            "--seed",
            "5",
            "--max-trials",
            "20",
        ]))
        .unwrap();

        let text = fs::read_to_string(&output).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "9");
        assert!(lines[1].starts_with("ethanol conformer=1 energy="));
        assert_eq!(lines.len(), 11);
    }

    #[test]
    fn generation_errors_are_propagated() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("empty.toml");
        fs::write(&input, "atoms = []\n").unwrap();
        let result = run(args(&["-i", input.to_str().unwrap()]));
        assert!(matches!(
            result,
            Err(CliError::Generation(ref e)) if e.code() == ReturnCode::ForcefieldSetupFailed
        ));
    }
}
