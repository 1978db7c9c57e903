use crate::core::forcefield::params::ForcefieldParams;
use crate::core::models::molecule::Molecule;
use crate::engine::config::GenerationConfig;
use crate::engine::error::GenerationError;
use crate::engine::generator::StructureGenerator;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::trials::GenerationResult;
use tracing::{info, instrument};

#[instrument(skip_all, name = "generation_workflow")]
pub fn run(
    molecule: &Molecule,
    config: &GenerationConfig,
    params: &ForcefieldParams,
    reporter: &ProgressReporter,
) -> Result<GenerationResult, GenerationError> {
    // === Phase 0: Parameterization and constraint setup ===
    info!(
        atoms = molecule.atom_count(),
        bonds = molecule.bond_count(),
        "Starting conformer generation."
    );
    reporter.report(Progress::Message("Preparing force field and constraints".into()));
    let mut generator = StructureGenerator::with_forcefield_params(config.clone(), params.clone());
    generator.setup(molecule)?;

    // === Phase 1: Embedding and minimization trials ===
    let result = generator.generate(reporter)?;

    info!(
        conformers = result.conformers.len(),
        trials = result.trials,
        elapsed_ms = result.elapsed.as_millis() as u64,
        "Conformer generation finished."
    );
    Ok(result)
}
