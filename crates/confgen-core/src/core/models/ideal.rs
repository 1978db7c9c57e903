//! Reference bond lengths and bond angles derived from the molecular graph.
//!
//! These values are shared by the reference force field (equilibrium terms) and by the
//! constraint generator when no bonded force-field data is supplied.

use super::atom::Hybridization;
use super::molecule::Molecule;

const THREE_RING_ANGLE: f64 = 60.0;
const FOUR_RING_ANGLE: f64 = 90.0;
const PUCKERED_FIVE_RING_ANGLE: f64 = 106.0;
const THREE_RING_EXOCYCLIC_ANGLE: f64 = 117.0;
const FOUR_RING_EXOCYCLIC_ANGLE: f64 = 114.0;

/// Ideal length (Angstroms) of the bond with index `bond`.
pub fn ideal_bond_length(mol: &Molecule, bond: usize) -> f64 {
    let b = mol.bond(bond);
    mol.element(b.begin).covalent_radius()
        + mol.element(b.end).covalent_radius()
        + b.order.length_correction()
}

/// True if every atom of `ring` is sp2 hybridized or aromatic.
pub fn is_planar_ring(mol: &Molecule, ring: &[usize]) -> bool {
    ring.iter()
        .all(|&a| mol.atom(a).aromatic || mol.hybridization(a) == Hybridization::Sp2)
}

/// Ideal angle (radians) at `b` between the bonds to `a` and `c`.
pub fn ideal_bond_angle(mol: &Molecule, a: usize, b: usize, c: usize) -> f64 {
    if let Some(ring) = mol.smallest_ring_containing_path(&[a, b, c]) {
        return ring_angle(mol, ring).to_radians();
    }

    let hybridization = mol.hybridization(b);
    let degrees = match endocyclic_angle(mol, b) {
        Some(inner) if hybridization == Hybridization::Sp2 && mol.degree(b) == 3 => {
            (360.0 - inner) / 2.0
        }
        Some(inner) if inner <= THREE_RING_ANGLE => THREE_RING_EXOCYCLIC_ANGLE,
        Some(inner) if inner <= FOUR_RING_ANGLE => FOUR_RING_EXOCYCLIC_ANGLE,
        _ => hybridization.ideal_angle(),
    };
    degrees.to_radians()
}

/// Internal angle (degrees) of a ring, assuming a regular polygon when the ring is planar.
fn ring_angle(mol: &Molecule, ring: &[usize]) -> f64 {
    let n = ring.len() as f64;
    match ring.len() {
        3 => THREE_RING_ANGLE,
        4 => FOUR_RING_ANGLE,
        _ if is_planar_ring(mol, ring) => (n - 2.0) * 180.0 / n,
        5 => PUCKERED_FIVE_RING_ANGLE,
        _ => {
            // Non-planar rings larger than five keep the local hybridization angle.
            let sp3 = ring.iter().any(|&a| mol.hybridization(a) == Hybridization::Sp3);
            if sp3 {
                Hybridization::Sp3.ideal_angle()
            } else {
                Hybridization::Sp2.ideal_angle()
            }
        }
    }
}

/// Ring angle at `center` in the smallest ring passing through it, if any.
fn endocyclic_angle(mol: &Molecule, center: usize) -> Option<f64> {
    let neighbors: Vec<usize> = mol.neighbors(center).collect();
    let mut best: Option<&[usize]> = None;
    for (i, &x) in neighbors.iter().enumerate() {
        for &y in &neighbors[i + 1..] {
            if let Some(ring) = mol.smallest_ring_containing_path(&[x, center, y]) {
                if best.is_none_or(|r| ring.len() < r.len()) {
                    best = Some(ring);
                }
            }
        }
    }
    best.map(|ring| ring_angle(mol, ring))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::Atom;
    use crate::core::models::element::Element;
    use crate::core::models::molecule::tests::{benzene, ethane};
    use crate::core::models::topology::BondOrder;

    fn deg(rad: f64) -> f64 {
        rad.to_degrees()
    }

    #[test]
    fn aromatic_ring_angles_are_regular_hexagon_angles() {
        let mol = benzene();
        assert!((deg(ideal_bond_angle(&mol, 0, 1, 2)) - 120.0).abs() < 1e-9);
        assert!((deg(ideal_bond_angle(&mol, 6, 0, 1)) - 120.0).abs() < 1e-9);
        assert!(is_planar_ring(&mol, &mol.rings()[0]));
    }

    #[test]
    fn small_ring_angles_are_strained() {
        let mut mol = Molecule::new();
        for _ in 0..3 {
            mol.add_atom(Atom::new(Element::C));
        }
        mol.add_bond(0, 1, BondOrder::Single).unwrap();
        mol.add_bond(1, 2, BondOrder::Single).unwrap();
        mol.add_bond(2, 0, BondOrder::Single).unwrap();
        let h = mol.add_atom(Atom::new(Element::H));
        mol.add_bond(0, h, BondOrder::Single).unwrap();
        assert!((deg(ideal_bond_angle(&mol, 1, 0, 2)) - 60.0).abs() < 1e-9);
        assert!((deg(ideal_bond_angle(&mol, h, 0, 1)) - 117.0).abs() < 1e-9);
    }

    #[test]
    fn acyclic_angles_follow_hybridization() {
        let mol = ethane();
        assert!((deg(ideal_bond_angle(&mol, 2, 0, 1)) - 109.47).abs() < 1e-9);
    }

    #[test]
    fn bond_lengths_shrink_with_bond_order() {
        let mut mol = Molecule::new();
        let a = mol.add_atom(Atom::new(Element::C));
        let b = mol.add_atom(Atom::new(Element::C));
        let c = mol.add_atom(Atom::new(Element::C));
        let single = mol.add_bond(a, b, BondOrder::Single).unwrap();
        let double = mol.add_bond(b, c, BondOrder::Double).unwrap();
        assert!((ideal_bond_length(&mol, single) - 1.52).abs() < 1e-9);
        assert!(ideal_bond_length(&mol, double) < ideal_bond_length(&mol, single));
    }
}
