use super::bounds::DistanceBoundsMatrix;
use super::constraints::{ConstraintSet, ConstraintSink, DistanceConstraint, VolumeConstraint};
use crate::core::forcefield::parameterization::BondedInteractionData;
use crate::core::models::atom::Hybridization;
use crate::core::models::ideal::{ideal_bond_angle, ideal_bond_length, is_planar_ring};
use crate::core::models::molecule::{DISCONNECTED, Molecule};
use crate::core::models::stereo::{AtomStereoDescriptor, BondConfiguration, BondStereoDescriptor};
use crate::core::models::topology::BondOrder;
use crate::core::utils::geometry::{one_four_distance, one_three_distance};
use std::f64::consts::PI;
use tracing::{debug, warn};

pub const BOND_LENGTH_TOLERANCE: f64 = 0.02;
pub const BOND_ANGLE_TOLERANCE: f64 = 0.06;
pub const RING_BOND_ANGLE_TOLERANCE: f64 = 0.08;
pub const TORSION_MARGIN: f64 = 0.1;
pub const FIXED_TORSION_TOLERANCE: f64 = 0.05;
pub const CHIRAL_VOLUME_BOUND: f64 = 0.5;
pub const PLANARITY_VOLUME_TOLERANCE: f64 = 0.05;

const VDW_LOWER_BOUND_SCALE: f64 = 0.65;
const MAX_PLANAR_RING_SIZE: usize = 8;
const DEFAULT_BOND_LENGTH: f64 = 1.5;

/// Largest torsion (degrees) a saturated ring of the given size can adopt.
fn ring_max_torsion(ring_size: usize) -> Option<f64> {
    match ring_size {
        4 => Some(30.0),
        5 => Some(50.0),
        6 => Some(65.0),
        _ => None,
    }
}

/// Translates a molecular graph into distance and signed-volume constraints.
///
/// [`setup`](Self::setup) precomputes every constraint family; the `add_*` methods push a
/// family into a [`ConstraintSink`]. Pair families are filled in priority order (bonds,
/// then 1-3, then 1-4, then defaults), so every atom pair is constrained by exactly one
/// of them.
#[derive(Debug, Clone)]
pub struct ConstraintGenerator {
    exclude_hydrogens: bool,
    regard_atom_configuration: bool,
    regard_bond_configuration: bool,
    molecule: Option<Molecule>,
    bonded: Option<BondedInteractionData>,
    excluded: Vec<bool>,
    bond_constraints: Vec<DistanceConstraint>,
    angle_constraints: Vec<DistanceConstraint>,
    torsion_constraints: Vec<DistanceConstraint>,
    default_constraints: Vec<DistanceConstraint>,
    atom_planarity: Vec<VolumeConstraint>,
    bond_planarity: Vec<VolumeConstraint>,
    atom_stereo: Vec<AtomStereoDescriptor>,
    bond_stereo: Vec<BondStereoDescriptor>,
}

impl Default for ConstraintGenerator {
    fn default() -> Self {
        Self {
            exclude_hydrogens: false,
            regard_atom_configuration: true,
            regard_bond_configuration: true,
            molecule: None,
            bonded: None,
            excluded: Vec::new(),
            bond_constraints: Vec::new(),
            angle_constraints: Vec::new(),
            torsion_constraints: Vec::new(),
            default_constraints: Vec::new(),
            atom_planarity: Vec::new(),
            bond_planarity: Vec::new(),
            atom_stereo: Vec::new(),
            bond_stereo: Vec::new(),
        }
    }
}

impl ConstraintGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn exclude_hydrogens(&mut self, exclude: bool) {
        self.exclude_hydrogens = exclude;
    }

    pub fn regard_atom_configuration(&mut self, regard: bool) {
        self.regard_atom_configuration = regard;
    }

    pub fn atom_configuration_regarded(&self) -> bool {
        self.regard_atom_configuration
    }

    pub fn regard_bond_configuration(&mut self, regard: bool) {
        self.regard_bond_configuration = regard;
    }

    pub fn bond_configuration_regarded(&self) -> bool {
        self.regard_bond_configuration
    }

    /// Recomputes all constraint families for `mol`, discarding any previous state
    /// including manually registered stereocentres.
    ///
    /// Bond lengths and angles come from `bonded` where available and from covalent radii
    /// and hybridization otherwise. Angles inside rings always use the ring geometry.
    pub fn setup(&mut self, mol: &Molecule, bonded: Option<&BondedInteractionData>) {
        self.clear();
        let n = mol.atom_count();
        let exclude = self.exclude_hydrogens;
        self.excluded = (0..n)
            .map(|i| exclude && mol.is_terminal_hydrogen(i))
            .collect();
        self.molecule = Some(mol.clone());
        self.bonded = bonded.cloned();

        let mut constrained = vec![false; n * n];
        self.setup_bond_constraints(mol, &mut constrained);
        self.setup_angle_constraints(mol, &mut constrained);
        self.setup_torsion_constraints(mol, &mut constrained);
        self.setup_default_constraints(mol, &constrained);
        self.setup_atom_planarity(mol);
        self.setup_bond_planarity(mol);

        self.atom_stereo = mol.atom_stereo_descriptors().to_vec();
        self.bond_stereo = mol.bond_stereo_descriptors().to_vec();

        debug!(
            atoms = n,
            excluded = self.excluded.iter().filter(|&&e| e).count(),
            bonds = self.bond_constraints.len(),
            one_three = self.angle_constraints.len(),
            one_four = self.torsion_constraints.len(),
            defaults = self.default_constraints.len(),
            planar_atoms = self.atom_planarity.len(),
            planar_bond_quads = self.bond_planarity.len(),
            "Constraint generator set up."
        );
    }

    fn clear(&mut self) {
        self.molecule = None;
        self.bonded = None;
        self.excluded.clear();
        self.bond_constraints.clear();
        self.angle_constraints.clear();
        self.torsion_constraints.clear();
        self.default_constraints.clear();
        self.atom_planarity.clear();
        self.bond_planarity.clear();
        self.atom_stereo.clear();
        self.bond_stereo.clear();
    }

    pub fn add_atom_stereo_center(&mut self, descriptor: AtomStereoDescriptor) {
        self.atom_stereo.push(descriptor);
    }

    pub fn add_bond_stereo_center(&mut self, descriptor: BondStereoDescriptor) {
        self.bond_stereo.push(descriptor);
    }

    pub fn atom_stereo_centers(&self) -> &[AtomStereoDescriptor] {
        &self.atom_stereo
    }

    pub fn bond_stereo_centers(&self) -> &[BondStereoDescriptor] {
        &self.bond_stereo
    }

    /// Atoms left out of the embedding problem (terminal hydrogens when excluded).
    pub fn excluded_hydrogen_mask(&self) -> &[bool] {
        &self.excluded
    }

    pub fn atom_count(&self) -> usize {
        self.excluded.len()
    }

    fn is_excluded(&self, atom: usize) -> bool {
        self.excluded.get(atom).copied().unwrap_or(false)
    }

    /// Embedded neighbours of `atom` other than `partner`.
    fn substituents(&self, mol: &Molecule, atom: usize, partner: usize) -> Vec<usize> {
        mol.neighbors(atom)
            .filter(|&x| x != partner && !self.is_excluded(x))
            .collect()
    }

    fn bond_length(&self, mol: &Molecule, a: usize, b: usize) -> f64 {
        if let Some(r0) = self.bonded.as_ref().and_then(|d| d.bond_length(a, b)) {
            return r0;
        }
        match mol.bond_between(a, b) {
            Some(bond) => ideal_bond_length(mol, bond),
            None => mol.element(a).covalent_radius() + mol.element(b).covalent_radius(),
        }
    }

    fn bond_angle(&self, mol: &Molecule, a: usize, center: usize, c: usize) -> f64 {
        if mol.smallest_ring_containing_path(&[a, center, c]).is_some() {
            return ideal_bond_angle(mol, a, center, c);
        }
        self.bonded
            .as_ref()
            .and_then(|d| d.bond_angle(a, center, c))
            .unwrap_or_else(|| ideal_bond_angle(mol, a, center, c))
    }

    /// Distance between `a` and `d` across the `b-c` bond at the given torsion.
    fn one_four(&self, mol: &Molecule, [a, b, c, d]: [usize; 4], torsion: f64) -> f64 {
        one_four_distance(
            self.bond_length(mol, a, b),
            self.bond_length(mol, b, c),
            self.bond_length(mol, c, d),
            self.bond_angle(mol, a, b, c),
            self.bond_angle(mol, b, c, d),
            torsion,
        )
    }

    fn setup_bond_constraints(&mut self, mol: &Molecule, constrained: &mut [bool]) {
        let n = mol.atom_count();
        for bond in mol.bonds() {
            let (a, b) = (bond.begin, bond.end);
            if self.is_excluded(a) || self.is_excluded(b) {
                continue;
            }
            let r = self.bond_length(mol, a, b);
            self.bond_constraints.push(DistanceConstraint::new(
                a,
                b,
                r - BOND_LENGTH_TOLERANCE,
                r + BOND_LENGTH_TOLERANCE,
            ));
            mark(constrained, n, a, b);
        }
    }

    fn setup_angle_constraints(&mut self, mol: &Molecule, constrained: &mut [bool]) {
        let n = mol.atom_count();
        for center in 0..n {
            if self.is_excluded(center) {
                continue;
            }
            let neighbors: Vec<usize> = mol
                .neighbors(center)
                .filter(|&x| !self.is_excluded(x))
                .collect();
            for (i, &a) in neighbors.iter().enumerate() {
                for &c in &neighbors[i + 1..] {
                    if is_marked(constrained, n, a, c) {
                        continue;
                    }
                    let d = one_three_distance(
                        self.bond_length(mol, a, center),
                        self.bond_length(mol, center, c),
                        self.bond_angle(mol, a, center, c),
                    );
                    let tolerance = if mol.smallest_ring_containing_path(&[a, center, c]).is_some() {
                        RING_BOND_ANGLE_TOLERANCE
                    } else {
                        BOND_ANGLE_TOLERANCE
                    };
                    self.angle_constraints
                        .push(DistanceConstraint::new(a, c, d - tolerance, d + tolerance));
                    mark(constrained, n, a, c);
                }
            }
        }
    }

    fn setup_torsion_constraints(&mut self, mol: &Molecule, constrained: &mut [bool]) {
        let n = mol.atom_count();
        for bond in mol.bonds() {
            let (b, c) = (bond.begin, bond.end);
            if self.is_excluded(b) || self.is_excluded(c) {
                continue;
            }
            let planar_ring = mol
                .smallest_ring_containing_path(&[b, c])
                .filter(|ring| ring.len() <= MAX_PLANAR_RING_SIZE && is_planar_ring(mol, ring));

            let (subs_b, subs_c) = (self.substituents(mol, b, c), self.substituents(mol, c, b));
            for &a in &subs_b {
                for &d in &subs_c {
                    if a == d || is_marked(constrained, n, a, d) {
                        continue;
                    }
                    let quad = [a, b, c, d];
                    let cis = self.one_four(mol, quad, 0.0);
                    let trans = self.one_four(mol, quad, PI);

                    let (lower, upper) = if let Some(ring) = planar_ring {
                        let fixed = if ring.contains(&a) == ring.contains(&d) { cis } else { trans };
                        (fixed - FIXED_TORSION_TOLERANCE, fixed + FIXED_TORSION_TOLERANCE)
                    } else if let Some(max_torsion) = mol
                        .smallest_ring_containing_path(&quad)
                        .and_then(|ring| ring_max_torsion(ring.len()))
                    {
                        let widest = self.one_four(mol, quad, max_torsion.to_radians());
                        (cis - TORSION_MARGIN, widest + TORSION_MARGIN)
                    } else {
                        (cis - TORSION_MARGIN, trans + TORSION_MARGIN)
                    };
                    self.torsion_constraints
                        .push(DistanceConstraint::new(a, d, lower, upper));
                    mark(constrained, n, a, d);
                }
            }
        }
    }

    fn setup_default_constraints(&mut self, mol: &Molecule, constrained: &[bool]) {
        let n = mol.atom_count();
        let topological = mol.topological_distances();
        let max_bond_upper = self
            .bond_constraints
            .iter()
            .map(|c| c.upper)
            .fold(f64::NEG_INFINITY, f64::max);
        let max_bond_upper = if max_bond_upper.is_finite() {
            max_bond_upper
        } else {
            DEFAULT_BOND_LENGTH
        };

        for i in 0..n {
            if self.is_excluded(i) {
                continue;
            }
            for j in (i + 1)..n {
                if self.is_excluded(j) || is_marked(constrained, n, i, j) {
                    continue;
                }
                let upper = match topological[i][j] {
                    DISCONNECTED => n as f64 * max_bond_upper,
                    bonds => bonds as f64 * max_bond_upper,
                };
                let vdw = mol.element(i).vdw_radius() + mol.element(j).vdw_radius();
                let lower = (VDW_LOWER_BOUND_SCALE * vdw).min(upper);
                self.default_constraints
                    .push(DistanceConstraint::new(i, j, lower, upper));
            }
        }
    }

    fn setup_atom_planarity(&mut self, mol: &Molecule) {
        for center in 0..mol.atom_count() {
            if self.is_excluded(center) || mol.hybridization(center) != Hybridization::Sp2 {
                continue;
            }
            let neighbors: Vec<usize> = mol
                .neighbors(center)
                .filter(|&x| !self.is_excluded(x))
                .collect();
            if neighbors.len() != 3 || is_cumulated(mol, center) {
                continue;
            }
            self.atom_planarity.push(VolumeConstraint::new(
                [neighbors[0], neighbors[1], neighbors[2], center],
                -PLANARITY_VOLUME_TOLERANCE,
                PLANARITY_VOLUME_TOLERANCE,
            ));
        }
    }

    fn setup_bond_planarity(&mut self, mol: &Molecule) {
        for bond in mol.bonds() {
            if !matches!(bond.order, BondOrder::Double | BondOrder::Aromatic) {
                continue;
            }
            let (b, c) = (bond.begin, bond.end);
            if self.is_excluded(b)
                || self.is_excluded(c)
                || mol.hybridization(b) != Hybridization::Sp2
                || mol.hybridization(c) != Hybridization::Sp2
            {
                continue;
            }
            let (subs_b, subs_c) = (self.substituents(mol, b, c), self.substituents(mol, c, b));
            for &a in &subs_b {
                for &d in &subs_c {
                    if a == d {
                        continue;
                    }
                    self.bond_planarity.push(VolumeConstraint::new(
                        [a, b, c, d],
                        -PLANARITY_VOLUME_TOLERANCE,
                        PLANARITY_VOLUME_TOLERANCE,
                    ));
                }
            }
        }
    }

    pub fn add_bond_length_constraints(&self, sink: &mut dyn ConstraintSink) {
        self.bond_constraints
            .iter()
            .for_each(|c| sink.add_distance_constraint(*c));
    }

    pub fn add_bond_angle_constraints(&self, sink: &mut dyn ConstraintSink) {
        self.angle_constraints
            .iter()
            .for_each(|c| sink.add_distance_constraint(*c));
    }

    pub fn add_torsion_constraints(&self, sink: &mut dyn ConstraintSink) {
        self.torsion_constraints
            .iter()
            .for_each(|c| sink.add_distance_constraint(*c));
    }

    pub fn add_default_distance_constraints(&self, sink: &mut dyn ConstraintSink) {
        self.default_constraints
            .iter()
            .for_each(|c| sink.add_distance_constraint(*c));
    }

    pub fn add_atom_planarity_constraints(&self, sink: &mut dyn ConstraintSink) {
        self.atom_planarity
            .iter()
            .for_each(|c| sink.add_volume_constraint(*c));
    }

    pub fn add_bond_planarity_constraints(&self, sink: &mut dyn ConstraintSink) {
        self.bond_planarity
            .iter()
            .for_each(|c| sink.add_volume_constraint(*c));
    }

    /// Signed-volume constraints for every resolvable tetrahedral stereocentre.
    pub fn add_atom_configuration_constraints(&self, sink: &mut dyn ConstraintSink) {
        if !self.regard_atom_configuration {
            return;
        }
        for desc in self.effective_atom_stereo_centers() {
            let (lower, upper) = if desc.configuration.volume_sign() < 0.0 {
                (f64::NEG_INFINITY, -CHIRAL_VOLUME_BOUND)
            } else {
                (CHIRAL_VOLUME_BOUND, f64::INFINITY)
            };
            sink.add_volume_constraint(VolumeConstraint::new(desc.reference_atoms, lower, upper));
        }
    }

    /// Fixed cis or trans 1-4 distances for every substituent pair of each stereo bond.
    pub fn add_bond_configuration_constraints(&self, sink: &mut dyn ConstraintSink) {
        if !self.regard_bond_configuration {
            return;
        }
        let Some(mol) = self.molecule.as_ref() else {
            return;
        };
        for desc in self.effective_bond_stereo_centers() {
            let [a, b, c, d] = desc.reference_atoms;
            for x in self.substituents(mol, b, c) {
                for y in self.substituents(mol, c, b) {
                    if x == y {
                        continue;
                    }
                    let flipped = (x != a) ^ (y != d);
                    let cis = (desc.configuration == BondConfiguration::Cis) ^ flipped;
                    let torsion = if cis { 0.0 } else { PI };
                    let dist = self.one_four(mol, [x, b, c, y], torsion);
                    sink.add_distance_constraint(DistanceConstraint::new(
                        x,
                        y,
                        dist - FIXED_TORSION_TOLERANCE,
                        dist + FIXED_TORSION_TOLERANCE,
                    ));
                }
            }
        }
    }

    /// Atom stereocentres rewritten to reference only embedded atoms.
    ///
    /// An excluded hydrogen reference is moved to the last slot (inverting the
    /// configuration for an odd permutation) and replaced by the centre itself, which lies
    /// on the same side of the plane through the other three references.
    pub fn effective_atom_stereo_centers(&self) -> Vec<AtomStereoDescriptor> {
        let mut result = Vec::with_capacity(self.atom_stereo.len());
        for desc in &self.atom_stereo {
            let excluded: Vec<usize> = (0..4)
                .filter(|&k| {
                    let r = desc.reference_atoms[k];
                    r != desc.center && self.is_excluded(r)
                })
                .collect();
            match excluded.as_slice() {
                [] => result.push(*desc),
                [k] => {
                    let mut refs = desc.reference_atoms;
                    let mut configuration = desc.configuration;
                    if *k != 3 {
                        refs.swap(*k, 3);
                        configuration = configuration.inverted();
                    }
                    refs[3] = desc.center;
                    result.push(AtomStereoDescriptor::new(desc.center, refs, configuration));
                }
                _ => warn!(
                    center = desc.center,
                    "Stereocentre references several excluded hydrogens; skipping its constraint."
                ),
            }
        }
        result
    }

    /// Bond stereocentres rewritten to reference only embedded atoms.
    ///
    /// An excluded hydrogen reference is replaced by another embedded substituent on the
    /// same end, inverting cis and trans. Centres without such a substituent are returned
    /// unchanged; they produce no constraints and are settled by hydrogen placement.
    pub fn effective_bond_stereo_centers(&self) -> Vec<BondStereoDescriptor> {
        let Some(mol) = self.molecule.as_ref() else {
            return self.bond_stereo.clone();
        };
        let mut result = Vec::with_capacity(self.bond_stereo.len());
        for desc in &self.bond_stereo {
            let [mut a, b, c, mut d] = desc.reference_atoms;
            let mut configuration = desc.configuration;
            let mut resolvable = true;
            for (end, partner, slot) in [(b, c, &mut a), (c, b, &mut d)] {
                if !self.is_excluded(*slot) {
                    continue;
                }
                match mol
                    .neighbors(end)
                    .find(|&x| x != partner && x != *slot && !self.is_excluded(x))
                {
                    Some(substitute) => {
                        *slot = substitute;
                        configuration = configuration.inverted();
                    }
                    None => resolvable = false,
                }
            }
            if resolvable {
                result.push(BondStereoDescriptor::new([a, b, c, d], configuration));
            } else {
                debug!(
                    bond = ?(b, c),
                    "Stereo bond has no embedded substituent on one end; no embedding constraint."
                );
                result.push(*desc);
            }
        }
        result
    }

    /// Unsmoothed bounds matrix over all pair constraints (including bond configuration
    /// constraints when regarded).
    pub fn bounds_matrix(&self) -> DistanceBoundsMatrix {
        let mut all = ConstraintSet::new();
        self.add_bond_length_constraints(&mut all);
        self.add_bond_angle_constraints(&mut all);
        self.add_torsion_constraints(&mut all);
        self.add_default_distance_constraints(&mut all);
        self.add_bond_configuration_constraints(&mut all);
        DistanceBoundsMatrix::from_constraints(self.atom_count(), &all.distances)
    }
}

#[inline]
fn mark(constrained: &mut [bool], n: usize, a: usize, b: usize) {
    constrained[a * n + b] = true;
    constrained[b * n + a] = true;
}

#[inline]
fn is_marked(constrained: &[bool], n: usize, a: usize, b: usize) -> bool {
    constrained[a * n + b]
}

/// True if `atom` is double bonded to a partner that carries a second double bond.
fn is_cumulated(mol: &Molecule, atom: usize) -> bool {
    mol.bonded(atom).iter().any(|&(partner, bond)| {
        mol.bond(bond).order == BondOrder::Double
            && mol
                .bonded(partner)
                .iter()
                .filter(|&&(_, b)| mol.bond(b).order == BondOrder::Double)
                .count()
                > 1
    })
}
