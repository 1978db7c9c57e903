use super::parameterization::InteractionData;
use super::potentials;
use super::term::EnergyTerm;
use crate::core::utils::geometry::{dihedral_angle, signed_volume, signed_volume_gradient};
use nalgebra::Vector3;

const MIN_DISTANCE: f64 = 1e-10;

/// Energy oracle consumed by the minimizer.
///
/// Implementations must be pure functions of the coordinates: the minimizer caches
/// evaluations by line-search position.
pub trait EnergyFunction {
    fn energy(&self, coords: &[Vector3<f64>]) -> f64;

    /// Writes the gradient into `grad` (same length as `coords`) and returns the energy.
    fn energy_and_gradient(&self, coords: &[Vector3<f64>], grad: &mut [Vector3<f64>]) -> f64;
}

/// The reference bonded force field evaluated over parameterized interaction data.
#[derive(Debug, Clone)]
pub struct ForceField {
    data: InteractionData,
}

impl ForceField {
    pub fn new(data: InteractionData) -> Self {
        Self { data }
    }

    pub fn data(&self) -> &InteractionData {
        &self.data
    }

    /// Energy split by interaction family.
    pub fn energy_terms(&self, coords: &[Vector3<f64>]) -> EnergyTerm {
        self.evaluate(coords, None)
    }

    fn evaluate(
        &self,
        coords: &[Vector3<f64>],
        mut grad: Option<&mut [Vector3<f64>]>,
    ) -> EnergyTerm {
        if let Some(g) = grad.as_deref_mut() {
            g.iter_mut().for_each(|v| *v = Vector3::zeros());
        }
        let mut term = EnergyTerm::default();

        for s in &self.data.bond_stretches {
            let [i, j] = s.atoms;
            term.bond += pair_term(coords, grad.as_deref_mut(), i, j, |r| {
                potentials::bond_stretch(r, s.r0, s.k)
            });
        }

        for s in &self.data.repulsions {
            let [i, j] = s.atoms;
            term.repulsion += pair_term(coords, grad.as_deref_mut(), i, j, |r| {
                potentials::repulsion(r, s.r_min, s.k)
            });
        }

        for s in &self.data.angle_bends {
            let [a, b, c] = s.atoms;
            let u = coords[a] - coords[b];
            let v = coords[c] - coords[b];
            let (lu, lv) = (u.norm(), v.norm());
            if lu < MIN_DISTANCE || lv < MIN_DISTANCE {
                continue;
            }
            let cos = (u.dot(&v) / (lu * lv)).clamp(-1.0, 1.0);
            let (e, de) = potentials::angle_bend(cos, s.theta0.cos(), s.k);
            term.angle += e;
            if let Some(g) = grad.as_deref_mut() {
                let da = (v / (lu * lv) - u * (cos / (lu * lu))) * de;
                let dc = (u / (lu * lv) - v * (cos / (lv * lv))) * de;
                g[a] += da;
                g[c] += dc;
                g[b] -= da + dc;
            }
        }

        for s in &self.data.torsions {
            let [i, j, k, l] = s.atoms;
            let phi = dihedral_angle(&coords[i], &coords[j], &coords[k], &coords[l]);
            let (e, de) = potentials::torsion(phi, s.barrier, s.periodicity, s.phase);
            term.torsion += e;
            if let Some(g) = grad.as_deref_mut() {
                if let Some(d) = dihedral_gradient(&coords[i], &coords[j], &coords[k], &coords[l]) {
                    g[i] += d[0] * de;
                    g[j] += d[1] * de;
                    g[k] += d[2] * de;
                    g[l] += d[3] * de;
                }
            }
        }

        for s in &self.data.out_of_planes {
            let [a, b, c, d] = s.atoms;
            let (p1, p2, p3, p4) = (&coords[a], &coords[b], &coords[c], &coords[d]);
            let (e, de) = potentials::out_of_plane(signed_volume(p1, p2, p3, p4), s.k);
            term.out_of_plane += e;
            if let Some(g) = grad.as_deref_mut() {
                let dv = signed_volume_gradient(p1, p2, p3, p4);
                g[a] += dv[0] * de;
                g[b] += dv[1] * de;
                g[c] += dv[2] * de;
                g[d] += dv[3] * de;
            }
        }

        term
    }
}

fn pair_term(
    coords: &[Vector3<f64>],
    grad: Option<&mut [Vector3<f64>]>,
    i: usize,
    j: usize,
    potential: impl Fn(f64) -> (f64, f64),
) -> f64 {
    let d = coords[i] - coords[j];
    let r = d.norm();
    let (e, de) = potential(r);
    if let Some(g) = grad {
        if r > MIN_DISTANCE {
            let f = d * (de / r);
            g[i] += f;
            g[j] -= f;
        }
    }
    e
}

/// Partial derivatives of the dihedral angle with respect to its four points.
fn dihedral_gradient(
    p1: &Vector3<f64>,
    p2: &Vector3<f64>,
    p3: &Vector3<f64>,
    p4: &Vector3<f64>,
) -> Option<[Vector3<f64>; 4]> {
    let f = p1 - p2;
    let g = p2 - p3;
    let h = p4 - p3;
    let a = f.cross(&g);
    let b = h.cross(&g);
    let (a2, b2, gn) = (a.norm_squared(), b.norm_squared(), g.norm());
    if a2 < MIN_DISTANCE || b2 < MIN_DISTANCE || gn < MIN_DISTANCE {
        return None;
    }
    let fg = f.dot(&g) / (a2 * gn);
    let hg = h.dot(&g) / (b2 * gn);
    let d1 = -a * (gn / a2);
    let d4 = b * (gn / b2);
    let d2 = a * (gn / a2) + a * fg - b * hg;
    let d3 = -b * (gn / b2) - a * fg + b * hg;
    Some([d1, d2, d3, d4])
}

impl EnergyFunction for ForceField {
    fn energy(&self, coords: &[Vector3<f64>]) -> f64 {
        self.evaluate(coords, None).total()
    }

    fn energy_and_gradient(&self, coords: &[Vector3<f64>], grad: &mut [Vector3<f64>]) -> f64 {
        self.evaluate(coords, Some(grad)).total()
    }
}
