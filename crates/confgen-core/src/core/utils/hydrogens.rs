use super::geometry::{any_perpendicular, rotation_from_axis_angle, rotation_to_align};
use crate::core::models::atom::Hybridization;
use crate::core::models::ideal::ideal_bond_length;
use crate::core::models::molecule::Molecule;
use crate::core::models::stereo::BondStereoDescriptor;
use nalgebra::Vector3;
use std::f64::consts::PI;
use tracing::trace;

const TETRAHEDRAL_ANGLE: f64 = 109.47;
const MIN_VECTOR_NORM: f64 = 1e-8;

/// Fills the coordinates of every hydrogen flagged in `mask` from the positions of its
/// parent's already placed substituents.
///
/// Unmasked atoms are never written. Hydrogens whose parent is itself masked are left
/// untouched.
pub fn place_hydrogens(mol: &Molecule, coords: &mut [Vector3<f64>], mask: &[bool]) {
    for parent in 0..mol.atom_count() {
        if mask[parent] {
            continue;
        }
        let hydrogens: Vec<(usize, usize)> = mol
            .bonded(parent)
            .iter()
            .copied()
            .filter(|&(n, _)| mask[n])
            .collect();
        if hydrogens.is_empty() {
            continue;
        }

        let origin = coords[parent];
        let placed: Vec<Vector3<f64>> = mol
            .neighbors(parent)
            .filter(|&n| !mask[n])
            .filter_map(|n| unit(&(coords[n] - origin)))
            .collect();
        let plane_ref = plane_reference(mol, coords, mask, parent);

        let directions = substituent_directions(
            mol.hybridization(parent),
            &placed,
            hydrogens.len(),
            plane_ref.as_ref(),
        );
        trace!(
            parent,
            placed = placed.len(),
            hydrogens = hydrogens.len(),
            "Placing hydrogens"
        );
        for (&(h, bond), dir) in hydrogens.iter().zip(directions) {
            coords[h] = origin + dir * ideal_bond_length(mol, bond);
        }
    }
}

/// Swaps placed hydrogens into the other trigonal slots where a stereo bond names one of
/// them and the placed geometry realizes the wrong configuration.
///
/// An end is only flipped when its sole embedded neighbour is the double-bond partner;
/// otherwise the embedded substituents already fix the configuration. All masked
/// hydrogens on that end are rotated by half a turn about the double-bond axis.
pub fn orient_stereo_hydrogens(
    mol: &Molecule,
    coords: &mut [Vector3<f64>],
    mask: &[bool],
    descriptors: &[BondStereoDescriptor],
) {
    for desc in descriptors {
        if desc.matches(coords) {
            continue;
        }
        let [a, b, c, d] = desc.reference_atoms;
        let flippable = [(a, b, c), (d, c, b)]
            .into_iter()
            .find(|&(h, end, partner)| {
                mask[h]
                    && !mask[end]
                    && mol.neighbors(end).all(|n| n == partner || mask[n])
            });
        let Some((_, end, partner)) = flippable else {
            continue;
        };
        let Some(axis) = unit(&(coords[partner] - coords[end])) else {
            continue;
        };
        let half_turn = rotation_from_axis_angle(&axis, PI);
        let origin = coords[end];
        for h in mol.neighbors(end).filter(|&n| mask[n]) {
            coords[h] = origin + half_turn * (coords[h] - origin);
        }
        trace!(end, partner, "Flipped hydrogens to match the bond configuration");
    }
}

/// Direction (relative to the first placed neighbour of `parent`) towards a placed atom two
/// bonds away, used to orient trigonal and staggered tetrahedral templates.
fn plane_reference(
    mol: &Molecule,
    coords: &[Vector3<f64>],
    mask: &[bool],
    parent: usize,
) -> Option<Vector3<f64>> {
    let first = mol.neighbors(parent).find(|&n| !mask[n])?;
    mol.neighbors(first)
        .filter(|&n| n != parent && !mask[n])
        .find_map(|n| unit(&(coords[n] - coords[first])))
}

fn unit(v: &Vector3<f64>) -> Option<Vector3<f64>> {
    let norm = v.norm();
    (norm > MIN_VECTOR_NORM && norm.is_finite()).then(|| v / norm)
}

/// Unit directions for `count` new substituents around a centre whose existing
/// substituents point along `placed`.
pub fn substituent_directions(
    hybridization: Hybridization,
    placed: &[Vector3<f64>],
    count: usize,
    plane_ref: Option<&Vector3<f64>>,
) -> Vec<Vector3<f64>> {
    if count == 0 {
        return Vec::new();
    }
    if placed.len() + count <= hybridization.coordination() {
        if let Some(mut dirs) = template_directions(hybridization, placed, plane_ref) {
            dirs.truncate(count);
            if dirs.len() == count {
                return dirs;
            }
        }
    }
    spiral_directions(placed, count)
}

/// Remaining positions of the ideal coordination polyhedron, or `None` when the placed
/// substituents leave no well-defined template.
fn template_directions(
    hybridization: Hybridization,
    placed: &[Vector3<f64>],
    plane_ref: Option<&Vector3<f64>>,
) -> Option<Vec<Vector3<f64>>> {
    match (hybridization, placed) {
        (_, []) => Some(isolated_template(hybridization)),
        (Hybridization::Sp, [n1]) => Some(vec![-n1]),
        (Hybridization::Sp2, [n1]) => {
            let normal = plane_normal(n1, plane_ref);
            let rot = rotation_from_axis_angle(&normal, 2.0 * PI / 3.0);
            let h1 = rot * n1;
            let h2 = rot * h1;
            Some(vec![h1, h2])
        }
        (Hybridization::Sp2, [n1, n2]) => unit(&-(n1 + n2)).map(|d| vec![d]),
        (Hybridization::Sp3, [n1]) => {
            // Staggered relative to the reference atom across the n1 bond.
            let away = match plane_ref {
                Some(r) => unit(&-(r - n1 * n1.dot(r))).unwrap_or_else(|| any_perpendicular(n1)),
                None => any_perpendicular(n1),
            };
            let tilt_axis = n1.cross(&away);
            let h1 = rotation_from_axis_angle(&tilt_axis, TETRAHEDRAL_ANGLE.to_radians()) * n1;
            let spin = rotation_from_axis_angle(n1, 2.0 * PI / 3.0);
            let h2 = spin * h1;
            let h3 = spin * h2;
            Some(vec![h1, h2, h3])
        }
        (Hybridization::Sp3, [n1, n2]) => {
            let bisector = unit(&(n1 + n2))?;
            let normal = unit(&n1.cross(n2)).unwrap_or_else(|| any_perpendicular(&bisector));
            let half = (TETRAHEDRAL_ANGLE / 2.0).to_radians();
            Some(vec![
                -bisector * half.cos() + normal * half.sin(),
                -bisector * half.cos() - normal * half.sin(),
            ])
        }
        (Hybridization::Sp3, [n1, n2, n3]) => {
            let dir = unit(&-(n1 + n2 + n3))
                .or_else(|| unit(&(n1 - n3).cross(&(n2 - n3))))?;
            Some(vec![dir])
        }
        _ => None,
    }
}

fn isolated_template(hybridization: Hybridization) -> Vec<Vector3<f64>> {
    match hybridization {
        Hybridization::Sp => vec![Vector3::x(), -Vector3::x()],
        Hybridization::Sp2 => vec![
            Vector3::x(),
            Vector3::new(-0.5, 3f64.sqrt() / 2.0, 0.0),
            Vector3::new(-0.5, -(3f64.sqrt()) / 2.0, 0.0),
        ],
        Hybridization::Sp3 => {
            let s = 1.0 / 3f64.sqrt();
            vec![
                Vector3::new(s, s, s),
                Vector3::new(s, -s, -s),
                Vector3::new(-s, s, -s),
                Vector3::new(-s, -s, s),
            ]
        }
    }
}

fn plane_normal(n1: &Vector3<f64>, plane_ref: Option<&Vector3<f64>>) -> Vector3<f64> {
    plane_ref
        .and_then(|r| unit(&n1.cross(r)))
        .unwrap_or_else(|| any_perpendicular(n1))
}

/// Points evenly distributed on the unit sphere along a golden-section spiral.
fn golden_spiral(n: usize) -> Vec<Vector3<f64>> {
    let increment = PI * (3.0 - 5f64.sqrt());
    let offset = 2.0 / n as f64;
    (0..n)
        .map(|i| {
            let y = i as f64 * offset - 1.0 + offset / 2.0;
            let r = (1.0 - y * y).max(0.0).sqrt();
            let phi = i as f64 * increment;
            Vector3::new(phi.cos() * r, y, phi.sin() * r)
        })
        .collect()
}

/// Fallback for centres with more substituents than their hybridization template covers.
///
/// Spiral point 0 is aligned with the first placed substituent. When a second substituent
/// exists, the spiral point whose angle to point 0 best matches the observed angle between
/// the first two substituents is rotated into their plane. Remaining placed substituents
/// claim their nearest free points, and the new substituents take the free points farthest
/// from everything already occupied.
fn spiral_directions(placed: &[Vector3<f64>], count: usize) -> Vec<Vector3<f64>> {
    let total = placed.len() + count;
    let mut points = golden_spiral(total);
    let mut used = vec![false; total];

    if let Some(reference) = placed.first() {
        let align = rotation_to_align(&points[0], reference).unwrap_or_else(|| {
            rotation_from_axis_angle(&any_perpendicular(reference), PI)
        });
        for p in points.iter_mut() {
            *p = align * *p;
        }
        used[0] = true;

        if let Some(second) = placed.get(1) {
            let target = reference.dot(second).clamp(-1.0, 1.0).acos();
            let best = (1..total)
                .min_by(|&i, &j| {
                    let di = (points[i].dot(reference).clamp(-1.0, 1.0).acos() - target).abs();
                    let dj = (points[j].dot(reference).clamp(-1.0, 1.0).acos() - target).abs();
                    di.total_cmp(&dj)
                })
                .unwrap_or(1);
            let from = points[best] - reference * points[best].dot(reference);
            let to = second - reference * second.dot(reference);
            if let (Some(from), Some(to)) = (unit(&from), unit(&to)) {
                let angle = from.cross(&to).dot(reference).atan2(from.dot(&to));
                let spin = rotation_from_axis_angle(reference, angle);
                for p in points.iter_mut() {
                    *p = spin * *p;
                }
            }
            used[best] = true;
        }

        for dir in placed.iter().skip(2) {
            if let Some(nearest) = (0..total)
                .filter(|&i| !used[i])
                .max_by(|&i, &j| points[i].dot(dir).total_cmp(&points[j].dot(dir)))
            {
                used[nearest] = true;
            }
        }
    }

    let mut occupied: Vec<Vector3<f64>> = placed.to_vec();
    let mut result = Vec::with_capacity(count);
    for _ in 0..count {
        let closeness = |i: usize| {
            occupied
                .iter()
                .map(|o| points[i].dot(o))
                .fold(f64::NEG_INFINITY, f64::max)
        };
        let Some(pick) = (0..total)
            .filter(|&i| !used[i])
            .min_by(|&i, &j| closeness(i).total_cmp(&closeness(j)))
        else {
            break;
        };
        used[pick] = true;
        occupied.push(points[pick]);
        result.push(points[pick]);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::Atom;
    use crate::core::models::element::Element;
    use crate::core::models::molecule::tests::{acetaldimine, benzene, ethane};
    use crate::core::models::stereo::BondConfiguration;
    use crate::core::models::topology::BondOrder;
    use crate::core::utils::geometry::bond_angle;

    fn hydrogen_mask(mol: &Molecule) -> Vec<bool> {
        (0..mol.atom_count())
            .map(|i| mol.is_terminal_hydrogen(i))
            .collect()
    }

    #[test]
    fn ethane_hydrogens_are_tetrahedral() {
        let mol = ethane();
        let mask = hydrogen_mask(&mol);
        let mut coords = vec![Vector3::zeros(); mol.atom_count()];
        coords[1] = Vector3::new(1.52, 0.0, 0.0);
        place_hydrogens(&mol, &mut coords, &mask);

        assert_eq!(coords[0], Vector3::zeros());
        assert_eq!(coords[1], Vector3::new(1.52, 0.0, 0.0));
        for h in 2..8 {
            let parent = if h < 5 { 0 } else { 1 };
            let other = 1 - parent;
            assert!(((coords[h] - coords[parent]).norm() - 1.07).abs() < 1e-9);
            let angle = bond_angle(&coords[h], &coords[parent], &coords[other]).to_degrees();
            assert!((angle - 109.47).abs() < 1.0, "angle {angle}");
        }
        let hch = bond_angle(&coords[2], &coords[0], &coords[3]).to_degrees();
        assert!((hch - 109.47).abs() < 1.0, "angle {hch}");
    }

    #[test]
    fn aromatic_hydrogens_lie_in_the_ring_plane() {
        let mol = benzene();
        let mask = hydrogen_mask(&mol);
        let mut coords = vec![Vector3::zeros(); mol.atom_count()];
        for k in 0..6 {
            let phi = k as f64 * PI / 3.0;
            coords[k] = Vector3::new(1.39 * phi.cos(), 1.39 * phi.sin(), 0.0);
        }
        place_hydrogens(&mol, &mut coords, &mask);
        for k in 0..6 {
            let h = coords[k + 6];
            assert!(h.z.abs() < 1e-9);
            let angle = bond_angle(&h, &coords[k], &coords[(k + 1) % 6]).to_degrees();
            assert!((angle - 120.0).abs() < 1e-6);
        }
    }

    #[test]
    fn isolated_parent_uses_fixed_axes() {
        let mut mol = Molecule::new();
        let c = mol.add_atom(Atom::new(Element::C));
        for _ in 0..4 {
            let h = mol.add_atom(Atom::new(Element::H));
            mol.add_bond(c, h, BondOrder::Single).unwrap();
        }
        let mask = hydrogen_mask(&mol);
        let mut coords = vec![Vector3::new(1.0, 2.0, 3.0); mol.atom_count()];
        place_hydrogens(&mol, &mut coords, &mask);
        for i in 1..5 {
            for j in (i + 1)..5 {
                let angle = bond_angle(&coords[i], &coords[0], &coords[j]).to_degrees();
                assert!((angle - 109.47).abs() < 0.1);
            }
        }
    }

    #[test]
    fn overcrowded_centre_falls_back_to_spiral() {
        let n1 = Vector3::x();
        let n2 = Vector3::y();
        let dirs = substituent_directions(Hybridization::Sp3, &[n1, n2], 4, None);
        assert_eq!(dirs.len(), 4);
        let all: Vec<Vector3<f64>> = [n1, n2].into_iter().chain(dirs).collect();
        for i in 0..all.len() {
            for j in (i + 1)..all.len() {
                let angle = all[i].dot(&all[j]).clamp(-1.0, 1.0).acos().to_degrees();
                assert!(angle > 60.0, "substituents {i} and {j} only {angle} degrees apart");
            }
        }
    }

    #[test]
    fn degenerate_neighbors_do_not_produce_nan() {
        let mol = ethane();
        let mask = hydrogen_mask(&mol);
        let mut coords = vec![Vector3::zeros(); mol.atom_count()];
        place_hydrogens(&mol, &mut coords, &mask);
        assert!(coords.iter().all(|c| c.iter().all(|v| v.is_finite())));
    }

    #[test]
    fn imine_hydrogen_is_moved_to_the_requested_side() {
        let mol = acetaldimine();
        let mask = hydrogen_mask(&mol);
        let mut heavy = vec![Vector3::zeros(); mol.atom_count()];
        heavy[0] = Vector3::new(-0.76, 1.32, 0.0);
        heavy[2] = Vector3::new(1.28, 0.0, 0.0);

        let mut placed = Vec::new();
        for configuration in [BondConfiguration::Cis, BondConfiguration::Trans] {
            let desc = BondStereoDescriptor::new([0, 1, 2, 7], configuration);
            let mut coords = heavy.clone();
            place_hydrogens(&mol, &mut coords, &mask);
            orient_stereo_hydrogens(&mol, &mut coords, &mask, &[desc]);

            assert!(desc.matches(&coords), "{configuration:?} not realized");
            assert_eq!(&coords[..3], &heavy[..3]);
            assert!(((coords[7] - coords[2]).norm() - 1.02).abs() < 1e-9);
            let angle = bond_angle(&coords[7], &coords[2], &coords[1]).to_degrees();
            assert!((angle - 120.0).abs() < 1e-6, "angle {angle}");
            placed.push(coords[7]);
        }
        assert!((placed[0] - placed[1]).norm() > 1.0);
    }

    #[test]
    fn only_the_end_without_embedded_substituents_is_flipped() {
        let mol = acetaldimine();
        let mask = hydrogen_mask(&mol);
        let mut coords = vec![Vector3::zeros(); mol.atom_count()];
        coords[0] = Vector3::new(-0.76, 1.32, 0.0);
        coords[2] = Vector3::new(1.28, 0.0, 0.0);
        place_hydrogens(&mol, &mut coords, &mask);
        let before = coords.clone();

        // H6 shares C1 with the embedded methyl carbon, so only H7 on N2 can move.
        let cis = BondStereoDescriptor::new([6, 1, 2, 7], BondConfiguration::Cis);
        let wrong = if cis.matches(&coords) {
            BondStereoDescriptor::new([6, 1, 2, 7], BondConfiguration::Trans)
        } else {
            cis
        };
        orient_stereo_hydrogens(&mol, &mut coords, &mask, &[wrong]);

        assert!(wrong.matches(&coords));
        assert_eq!(coords[6], before[6]);
        assert!((coords[7] - before[7]).norm() > 1.0);
    }
}
