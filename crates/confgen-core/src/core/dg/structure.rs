use super::bounds::DistanceBoundsMatrix;
use super::coordinates::DgCoordinatesGenerator;
use super::generator::ConstraintGenerator;
use crate::core::forcefield::parameterization::BondedInteractionData;
use crate::core::models::molecule::Molecule;
use crate::core::models::stereo::{AtomStereoDescriptor, BondStereoDescriptor};
use nalgebra::Vector3;
use tracing::{debug, trace};

/// Two-phase distance-geometry embedder for a whole molecule.
///
/// Phase one embeds from a random start with distance and planarity constraints only;
/// phase two refines that result with every constraint, including chirality volumes and
/// bond configurations.
#[derive(Debug, Clone)]
pub struct DgStructureGenerator {
    constraints: ConstraintGenerator,
    coarse: DgCoordinatesGenerator,
    fine: DgCoordinatesGenerator,
    extra_atom_stereo: Vec<AtomStereoDescriptor>,
    extra_bond_stereo: Vec<BondStereoDescriptor>,
    initialized: bool,
}

impl Default for DgStructureGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl DgStructureGenerator {
    pub fn new() -> Self {
        Self {
            constraints: ConstraintGenerator::new(),
            coarse: DgCoordinatesGenerator::default(),
            fine: DgCoordinatesGenerator::default(),
            extra_atom_stereo: Vec::new(),
            extra_bond_stereo: Vec::new(),
            initialized: false,
        }
    }

    pub fn exclude_hydrogens(&mut self, exclude: bool) {
        self.constraints.exclude_hydrogens(exclude);
    }

    pub fn regard_atom_configuration(&mut self, regard: bool) {
        self.constraints.regard_atom_configuration(regard);
    }

    pub fn regard_bond_configuration(&mut self, regard: bool) {
        self.constraints.regard_bond_configuration(regard);
    }

    pub fn atom_configuration_regarded(&self) -> bool {
        self.constraints.atom_configuration_regarded()
    }

    pub fn bond_configuration_regarded(&self) -> bool {
        self.constraints.bond_configuration_regarded()
    }

    /// Builds both embedding phases for `mol`. Stereocentres registered through
    /// [`add_atom_stereo_center`](Self::add_atom_stereo_center) survive repeated setups.
    pub fn setup(&mut self, mol: &Molecule, bonded: Option<&BondedInteractionData>) {
        self.constraints.setup(mol, bonded);
        for desc in &self.extra_atom_stereo {
            self.constraints.add_atom_stereo_center(*desc);
        }
        for desc in &self.extra_bond_stereo {
            self.constraints.add_bond_stereo_center(*desc);
        }
        self.initialized = true;
        self.load_constraints();
    }

    fn load_constraints(&mut self) {
        let n = self.constraints.atom_count();
        let mask = self.constraints.excluded_hydrogen_mask().to_vec();
        for phase in [&mut self.coarse, &mut self.fine] {
            phase.set_atom_count(n);
            phase.set_excluded_atoms(&mask);
        }

        let c = &self.constraints;
        c.add_bond_length_constraints(&mut self.coarse);
        c.add_bond_angle_constraints(&mut self.coarse);
        c.add_torsion_constraints(&mut self.coarse);
        c.add_default_distance_constraints(&mut self.coarse);
        c.add_bond_configuration_constraints(&mut self.coarse);
        c.add_atom_planarity_constraints(&mut self.coarse);
        c.add_bond_planarity_constraints(&mut self.coarse);

        c.add_bond_length_constraints(&mut self.fine);
        c.add_bond_angle_constraints(&mut self.fine);
        c.add_torsion_constraints(&mut self.fine);
        c.add_default_distance_constraints(&mut self.fine);
        c.add_bond_configuration_constraints(&mut self.fine);
        c.add_atom_planarity_constraints(&mut self.fine);
        c.add_bond_planarity_constraints(&mut self.fine);
        c.add_atom_configuration_constraints(&mut self.fine);

        debug!(
            atoms = n,
            coarse_distances = self.coarse.constraints().distances.len(),
            coarse_volumes = self.coarse.constraints().volumes.len(),
            fine_volumes = self.fine.constraints().volumes.len(),
            "Loaded embedding constraints."
        );
    }

    pub fn add_atom_stereo_center(&mut self, descriptor: AtomStereoDescriptor) {
        self.extra_atom_stereo.push(descriptor);
        if self.initialized {
            self.constraints.add_atom_stereo_center(descriptor);
            self.load_constraints();
        }
    }

    pub fn add_bond_stereo_center(&mut self, descriptor: BondStereoDescriptor) {
        self.extra_bond_stereo.push(descriptor);
        if self.initialized {
            self.constraints.add_bond_stereo_center(descriptor);
            self.load_constraints();
        }
    }

    /// Forgets manually registered stereocentres; takes effect at the next setup.
    pub fn clear_stereo_centers(&mut self) {
        self.extra_atom_stereo.clear();
        self.extra_bond_stereo.clear();
    }

    pub fn set_box_size(&mut self, box_size: f64) {
        self.coarse.set_box_size(box_size);
        self.fine.set_box_size(box_size);
    }

    pub fn box_size(&self) -> f64 {
        self.coarse.box_size()
    }

    pub fn set_num_cycles(&mut self, num_cycles: usize) {
        self.coarse.set_num_cycles(num_cycles);
        self.fine.set_num_cycles(num_cycles);
    }

    pub fn set_steps_per_constraint(&mut self, steps: f64) {
        self.coarse.set_steps_per_constraint(steps);
        self.fine.set_steps_per_constraint(steps);
    }

    pub fn set_distance_tolerance(&mut self, tolerance: f64) {
        self.coarse.set_distance_tolerance(tolerance);
        self.fine.set_distance_tolerance(tolerance);
    }

    pub fn reseed(&mut self, seed: u64) {
        self.coarse.reseed(seed);
        self.fine.reseed(seed.wrapping_add(1));
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Runs one embedding attempt into `coords`. Excluded hydrogens are left at the origin.
    pub fn generate(&mut self, coords: &mut Vec<Vector3<f64>>) -> bool {
        if !self.initialized {
            return false;
        }
        let coarse_converged = self.coarse.generate(coords);
        if !self.coarse.is_feasible() {
            return false;
        }
        // Only infeasible bounds stop here; an unconverged coarse result is still refined.
        let converged = self.fine.refine(coords);
        trace!(coarse_converged, converged, "Embedding attempt finished.");
        converged
    }

    /// True if every atom stereocentre has its target configuration.
    ///
    /// Checks the descriptors as registered, so `coords` must be complete, with excluded
    /// hydrogens already placed.
    pub fn check_atom_configurations(&self, coords: &[Vector3<f64>]) -> bool {
        self.constraints
            .atom_stereo_centers()
            .iter()
            .all(|desc| desc.matches(coords))
    }

    /// True if every stereo bond has its target configuration; `coords` must be complete.
    pub fn check_bond_configurations(&self, coords: &[Vector3<f64>]) -> bool {
        self.constraints
            .bond_stereo_centers()
            .iter()
            .all(|desc| desc.matches(coords))
    }

    pub fn bond_stereo_centers(&self) -> &[BondStereoDescriptor] {
        self.constraints.bond_stereo_centers()
    }

    pub fn excluded_hydrogen_mask(&self) -> &[bool] {
        self.constraints.excluded_hydrogen_mask()
    }

    pub fn bounds_matrix(&self) -> DistanceBoundsMatrix {
        self.constraints.bounds_matrix()
    }

    pub fn constraint_generator(&self) -> &ConstraintGenerator {
        &self.constraints
    }
}
