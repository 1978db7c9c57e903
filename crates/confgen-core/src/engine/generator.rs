use super::config::GenerationConfig;
use super::error::GenerationError;
use super::progress::ProgressReporter;
use super::trials::{GenerationResult, run_trials};
use crate::core::dg::structure::DgStructureGenerator;
use crate::core::forcefield::energy::ForceField;
use crate::core::forcefield::parameterization::Parameterizer;
use crate::core::forcefield::params::ForcefieldParams;
use crate::core::models::molecule::Molecule;
use crate::core::models::stereo::{AtomStereoDescriptor, BondStereoDescriptor};
use tracing::{debug, info};

/// Stateful conformer generator: parameterize once, then generate as often as needed.
#[derive(Debug, Clone)]
pub struct StructureGenerator {
    config: GenerationConfig,
    params: ForcefieldParams,
    embedder: DgStructureGenerator,
    prepared: Option<Prepared>,
}

#[derive(Debug, Clone)]
struct Prepared {
    molecule: Molecule,
    forcefield: ForceField,
}

impl StructureGenerator {
    pub fn new(config: GenerationConfig) -> Self {
        Self::with_forcefield_params(config, ForcefieldParams::default())
    }

    pub fn with_forcefield_params(config: GenerationConfig, params: ForcefieldParams) -> Self {
        let mut embedder = DgStructureGenerator::new();
        embedder.exclude_hydrogens(config.embedding.exclude_hydrogens);
        embedder.regard_atom_configuration(config.stereo.regard_atom_configuration);
        embedder.regard_bond_configuration(config.stereo.regard_bond_configuration);
        embedder.set_num_cycles(config.embedding.num_cycles);
        embedder.set_steps_per_constraint(config.embedding.steps_per_constraint);
        embedder.set_distance_tolerance(config.embedding.distance_tolerance);
        if let Some(seed) = config.trials.seed {
            embedder.reseed(seed);
        }
        Self {
            config,
            params,
            embedder,
            prepared: None,
        }
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    pub fn is_initialized(&self) -> bool {
        self.prepared.is_some()
    }

    pub fn embedder(&self) -> &DgStructureGenerator {
        &self.embedder
    }

    /// Parameterizes `molecule` and builds the embedding constraints.
    ///
    /// On failure the generator is left uninitialized.
    pub fn setup(&mut self, molecule: &Molecule) -> Result<(), GenerationError> {
        self.prepared = None;
        let data = Parameterizer::new(&self.params).parameterize(molecule)?;
        self.embedder.setup(molecule, Some(&data.bonded()));

        let box_size = self.config.box_size(molecule.bond_count());
        self.embedder.set_box_size(box_size);
        debug!(
            atoms = molecule.atom_count(),
            bonds = molecule.bond_count(),
            box_size,
            "Structure generator set up."
        );

        self.prepared = Some(Prepared {
            molecule: molecule.clone(),
            forcefield: ForceField::new(data),
        });
        Ok(())
    }

    /// Registers a stereocentre in addition to those stored on the molecule.
    pub fn add_atom_stereo_center(&mut self, descriptor: AtomStereoDescriptor) {
        self.embedder.add_atom_stereo_center(descriptor);
    }

    pub fn add_bond_stereo_center(&mut self, descriptor: BondStereoDescriptor) {
        self.embedder.add_bond_stereo_center(descriptor);
    }

    pub fn reseed(&mut self, seed: u64) {
        self.embedder.reseed(seed);
    }

    pub fn generate(
        &mut self,
        reporter: &ProgressReporter<'_>,
    ) -> Result<GenerationResult, GenerationError> {
        let Some(prepared) = &self.prepared else {
            return Err(GenerationError::Uninitialized);
        };
        info!(
            max_trials = self.config.trials.max_num_trials,
            conformers = self.config.trials.num_conformers,
            "Generating conformers."
        );
        run_trials(
            &prepared.molecule,
            &mut self.embedder,
            &prepared.forcefield,
            &self.config,
            reporter,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::Atom;
    use crate::core::models::element::Element;
    use crate::core::models::molecule::tests::{acetaldimine, butene, chiral_methane, ethane};
    use crate::core::models::stereo::{AtomConfiguration, BondConfiguration};
    use crate::engine::error::ReturnCode;

    fn seeded_config() -> GenerationConfig {
        GenerationConfig::builder()
            .seed(1234)
            .max_num_trials(20)
            .build()
            .unwrap()
    }

    #[test]
    fn generate_before_setup_is_uninitialized() {
        let mut generator = StructureGenerator::new(seeded_config());
        let err = generator.generate(&ProgressReporter::new()).unwrap_err();
        assert_eq!(err.code(), ReturnCode::Uninitialized);
    }

    #[test]
    fn failed_setup_leaves_generator_uninitialized() {
        let mut generator = StructureGenerator::new(seeded_config());
        generator.setup(&ethane()).unwrap();
        assert!(generator.is_initialized());

        let mut mol = Molecule::new();
        mol.add_atom(Atom::new(Element::Other(99)));
        let err = generator.setup(&mol).unwrap_err();
        assert_eq!(err.code(), ReturnCode::ForcefieldSetupFailed);
        assert!(!generator.is_initialized());
        assert!(matches!(
            generator.generate(&ProgressReporter::new()),
            Err(GenerationError::Uninitialized)
        ));
    }

    #[test]
    fn box_size_follows_bond_count() {
        let mut generator = StructureGenerator::new(seeded_config());
        generator.setup(&ethane()).unwrap();
        assert_eq!(generator.embedder().box_size(), 14.0);
    }

    #[test]
    fn ethane_conformer_has_reasonable_carbon_carbon_distance() {
        let mut generator = StructureGenerator::new(seeded_config());
        generator.setup(&ethane()).unwrap();
        let result = generator.generate(&ProgressReporter::new()).unwrap();
        let best = result.best().unwrap();
        let cc = (best.coords[0] - best.coords[1]).norm();
        assert!((cc - 1.52).abs() < 0.05, "C-C distance {cc}");
        assert!(best.coords.iter().all(|v| v.iter().all(|c| c.is_finite())));
    }

    #[test]
    fn generated_conformer_keeps_requested_chirality() {
        for configuration in [AtomConfiguration::R, AtomConfiguration::S] {
            let mol = chiral_methane(configuration);
            let mut generator = StructureGenerator::new(seeded_config());
            generator.setup(&mol).unwrap();
            let result = generator.generate(&ProgressReporter::new()).unwrap();
            let best = result.best().unwrap();
            assert!(mol.atom_stereo_descriptors()[0].matches(&best.coords));
        }
    }

    fn assert_bond_configuration_kept(mol: &Molecule) {
        let mut generator = StructureGenerator::new(seeded_config());
        generator.setup(mol).unwrap();
        let result = generator.generate(&ProgressReporter::new()).unwrap();
        let desc = mol.bond_stereo_descriptors()[0];
        for conformer in &result.conformers {
            assert_eq!(
                desc.configuration_in(&conformer.coords),
                Some(desc.configuration),
                "trial {}",
                conformer.trial
            );
        }
    }

    #[test]
    fn imine_configuration_set_by_its_hydrogen_is_kept() {
        for configuration in [BondConfiguration::Cis, BondConfiguration::Trans] {
            let mut mol = acetaldimine();
            mol.add_bond_stereo(BondStereoDescriptor::new([0, 1, 2, 7], configuration))
                .unwrap();
            assert_bond_configuration_kept(&mol);
        }
    }

    #[test]
    fn butene_configuration_is_kept() {
        for configuration in [BondConfiguration::Cis, BondConfiguration::Trans] {
            assert_bond_configuration_kept(&butene(configuration));
        }
    }
}
