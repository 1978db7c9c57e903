use super::params::ForcefieldParams;
use crate::core::models::atom::Hybridization;
use crate::core::models::element::Element;
use crate::core::models::ideal::{ideal_bond_angle, ideal_bond_length};
use crate::core::models::molecule::Molecule;
use crate::core::models::topology::BondOrder;
use std::f64::consts::PI;
use thiserror::Error;
use tracing::debug;

const MAX_SUPPORTED_VALENCE: usize = 6;
const MIN_REPULSION_SEPARATION: usize = 3;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParameterizationError {
    #[error("Cannot parameterize a molecule without atoms")]
    NoAtoms,
    #[error("Atom {atom} has {degree} neighbours; at most 6 are supported")]
    UnsupportedValence { atom: usize, degree: usize },
    #[error("Atom {atom} has an element (Z = {atomic_number}) without force-field parameters")]
    UnknownElement { atom: usize, atomic_number: u8 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BondStretch {
    pub atoms: [usize; 2],
    /// Reference length in Angstroms.
    pub r0: f64,
    pub k: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AngleBend {
    /// Terminal, central, terminal.
    pub atoms: [usize; 3],
    /// Reference angle in radians.
    pub theta0: f64,
    pub k: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Torsion {
    pub atoms: [usize; 4],
    pub barrier: f64,
    pub periodicity: f64,
    pub phase: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutOfPlane {
    /// Three neighbours followed by the central atom.
    pub atoms: [usize; 4],
    pub k: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Repulsion {
    pub atoms: [usize; 2],
    pub r_min: f64,
    pub k: f64,
}

/// Bond-stretching and angle-bending interactions, used to tighten distance bounds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BondedInteractionData {
    pub bond_stretches: Vec<BondStretch>,
    pub angle_bends: Vec<AngleBend>,
}

impl BondedInteractionData {
    pub fn bond_length(&self, a: usize, b: usize) -> Option<f64> {
        self.bond_stretches
            .iter()
            .find(|s| s.atoms == [a, b] || s.atoms == [b, a])
            .map(|s| s.r0)
    }

    pub fn bond_angle(&self, a: usize, center: usize, c: usize) -> Option<f64> {
        self.angle_bends
            .iter()
            .find(|s| s.atoms == [a, center, c] || s.atoms == [c, center, a])
            .map(|s| s.theta0)
    }
}

/// Complete set of parameterized interactions for one molecule.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InteractionData {
    pub atom_count: usize,
    pub bond_stretches: Vec<BondStretch>,
    pub angle_bends: Vec<AngleBend>,
    pub torsions: Vec<Torsion>,
    pub out_of_planes: Vec<OutOfPlane>,
    pub repulsions: Vec<Repulsion>,
}

impl InteractionData {
    pub fn bonded(&self) -> BondedInteractionData {
        BondedInteractionData {
            bond_stretches: self.bond_stretches.clone(),
            angle_bends: self.angle_bends.clone(),
        }
    }
}

pub struct Parameterizer<'a> {
    params: &'a ForcefieldParams,
}

impl<'a> Parameterizer<'a> {
    pub fn new(params: &'a ForcefieldParams) -> Self {
        Self { params }
    }

    pub fn parameterize(&self, mol: &Molecule) -> Result<InteractionData, ParameterizationError> {
        if mol.atom_count() == 0 {
            return Err(ParameterizationError::NoAtoms);
        }
        for atom in 0..mol.atom_count() {
            if let Element::Other(z) = mol.element(atom) {
                return Err(ParameterizationError::UnknownElement {
                    atom,
                    atomic_number: z,
                });
            }
            let degree = mol.degree(atom);
            if degree > MAX_SUPPORTED_VALENCE {
                return Err(ParameterizationError::UnsupportedValence { atom, degree });
            }
        }

        let data = InteractionData {
            atom_count: mol.atom_count(),
            bond_stretches: self.bond_stretches(mol),
            angle_bends: self.angle_bends(mol),
            torsions: self.torsions(mol),
            out_of_planes: self.out_of_planes(mol),
            repulsions: self.repulsions(mol),
        };
        debug!(
            bonds = data.bond_stretches.len(),
            angles = data.angle_bends.len(),
            torsions = data.torsions.len(),
            out_of_planes = data.out_of_planes.len(),
            repulsions = data.repulsions.len(),
            "Parameterized reference force field."
        );
        Ok(data)
    }

    fn bond_stretches(&self, mol: &Molecule) -> Vec<BondStretch> {
        mol.bonds()
            .iter()
            .enumerate()
            .map(|(idx, bond)| BondStretch {
                atoms: [bond.begin, bond.end],
                r0: ideal_bond_length(mol, idx),
                k: self.params.bond_stretch_k,
            })
            .collect()
    }

    fn angle_bends(&self, mol: &Molecule) -> Vec<AngleBend> {
        let mut angles = Vec::new();
        for center in 0..mol.atom_count() {
            let neighbors: Vec<usize> = mol.neighbors(center).collect();
            for (i, &a) in neighbors.iter().enumerate() {
                for &c in &neighbors[i + 1..] {
                    angles.push(AngleBend {
                        atoms: [a, center, c],
                        theta0: ideal_bond_angle(mol, a, center, c),
                        k: self.params.angle_bend_k,
                    });
                }
            }
        }
        angles
    }

    fn torsions(&self, mol: &Molecule) -> Vec<Torsion> {
        let mut torsions = Vec::new();
        for bond in mol.bonds() {
            let (b, c) = (bond.begin, bond.end);
            let Some((barrier, periodicity, phase)) = self.torsion_profile(mol, b, c, bond.order)
            else {
                continue;
            };
            for a in mol.neighbors(b).filter(|&a| a != c) {
                for d in mol.neighbors(c).filter(|&d| d != b) {
                    // Three-membered rings carry no independent torsion.
                    if a == d || mol.bond_between(a, c).is_some() || mol.bond_between(b, d).is_some()
                    {
                        continue;
                    }
                    torsions.push(Torsion {
                        atoms: [a, b, c, d],
                        barrier,
                        periodicity,
                        phase,
                    });
                }
            }
        }
        torsions
    }

    fn torsion_profile(
        &self,
        mol: &Molecule,
        b: usize,
        c: usize,
        order: BondOrder,
    ) -> Option<(f64, f64, f64)> {
        let t = &self.params.torsion;
        let (hb, hc) = (mol.hybridization(b), mol.hybridization(c));
        if hb == Hybridization::Sp || hc == Hybridization::Sp {
            return None;
        }
        match (order, hb, hc) {
            (BondOrder::Double, _, _) => Some((t.double, 2.0, PI)),
            (BondOrder::Aromatic, _, _) => Some((t.aromatic, 2.0, PI)),
            (_, Hybridization::Sp2, Hybridization::Sp2) => Some((t.conjugated, 2.0, PI)),
            (_, Hybridization::Sp3, Hybridization::Sp3) => Some((t.sp3_sp3, 3.0, 0.0)),
            _ => Some((t.sp2_sp3, 6.0, 0.0)),
        }
    }

    fn out_of_planes(&self, mol: &Molecule) -> Vec<OutOfPlane> {
        (0..mol.atom_count())
            .filter(|&c| mol.degree(c) == 3 && mol.hybridization(c) == Hybridization::Sp2)
            .map(|c| {
                let n: Vec<usize> = mol.neighbors(c).collect();
                OutOfPlane {
                    atoms: [n[0], n[1], n[2], c],
                    k: self.params.out_of_plane_k,
                }
            })
            .collect()
    }

    fn repulsions(&self, mol: &Molecule) -> Vec<Repulsion> {
        let distances = mol.topological_distances();
        let mut pairs = Vec::new();
        for i in 0..mol.atom_count() {
            for j in (i + 1)..mol.atom_count() {
                if distances[i][j] < MIN_REPULSION_SEPARATION {
                    continue;
                }
                let r_min = self.params.repulsion_scale
                    * (mol.element(i).vdw_radius() + mol.element(j).vdw_radius());
                pairs.push(Repulsion {
                    atoms: [i, j],
                    r_min,
                    k: self.params.repulsion_k,
                });
            }
        }
        pairs
    }
}
