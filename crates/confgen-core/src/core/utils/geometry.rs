use nalgebra::{Rotation3, Unit, Vector3};

pub fn rotation_to_align(from: &Vector3<f64>, to: &Vector3<f64>) -> Option<Rotation3<f64>> {
    Rotation3::rotation_between(from, to)
}

pub fn rotation_from_axis_angle(axis: &Vector3<f64>, angle_radians: f64) -> Rotation3<f64> {
    Rotation3::from_axis_angle(&Unit::new_normalize(*axis), angle_radians)
}

/// Returns any unit vector perpendicular to `v`.
pub fn any_perpendicular(v: &Vector3<f64>) -> Vector3<f64> {
    let helper = if v.x.abs() < 0.9 {
        Vector3::x()
    } else {
        Vector3::y()
    };
    (helper - v * v.dot(&helper) / v.norm_squared().max(f64::MIN_POSITIVE)).normalize()
}

/// Signed volume `(p1 - p4) · ((p2 - p4) × (p3 - p4))`.
///
/// This is six times the signed volume of the tetrahedron `p1 p2 p3 p4`. It is negative
/// when `p1 → p2 → p3` runs clockwise as seen from the side opposite to `p4`.
#[inline]
pub fn signed_volume(
    p1: &Vector3<f64>,
    p2: &Vector3<f64>,
    p3: &Vector3<f64>,
    p4: &Vector3<f64>,
) -> f64 {
    (p1 - p4).dot(&(p2 - p4).cross(&(p3 - p4)))
}

/// Partial derivatives of [`signed_volume`] with respect to each of the four points.
pub fn signed_volume_gradient(
    p1: &Vector3<f64>,
    p2: &Vector3<f64>,
    p3: &Vector3<f64>,
    p4: &Vector3<f64>,
) -> [Vector3<f64>; 4] {
    let a = p1 - p4;
    let b = p2 - p4;
    let c = p3 - p4;
    let g1 = b.cross(&c);
    let g2 = c.cross(&a);
    let g3 = a.cross(&b);
    let g4 = -(g1 + g2 + g3);
    [g1, g2, g3, g4]
}

/// Angle (radians) at `b` spanned by `a` and `c`.
pub fn bond_angle(a: &Vector3<f64>, b: &Vector3<f64>, c: &Vector3<f64>) -> f64 {
    let u = a - b;
    let v = c - b;
    let denom = u.norm() * v.norm();
    if denom < 1e-12 {
        return 0.0;
    }
    (u.dot(&v) / denom).clamp(-1.0, 1.0).acos()
}

/// Dihedral angle (radians, in `(-π, π]`) about the `p2-p3` axis.
pub fn dihedral_angle(
    p1: &Vector3<f64>,
    p2: &Vector3<f64>,
    p3: &Vector3<f64>,
    p4: &Vector3<f64>,
) -> f64 {
    let f = p1 - p2;
    let g = p2 - p3;
    let h = p4 - p3;
    let a = f.cross(&g);
    let b = h.cross(&g);
    let g_norm = g.norm();
    if g_norm < 1e-12 {
        return 0.0;
    }
    let y = b.cross(&a).dot(&g) / g_norm;
    let x = a.dot(&b);
    y.atan2(x)
}

/// Distance between the outer atoms of a two-bond chain (law of cosines).
#[inline]
pub fn one_three_distance(l1: f64, l2: f64, angle: f64) -> f64 {
    (l1 * l1 + l2 * l2 - 2.0 * l1 * l2 * angle.cos()).max(0.0).sqrt()
}

/// Distance between the outer atoms of a three-bond chain `a-b-c-d`.
///
/// `l1`, `l2`, `l3` are the `a-b`, `b-c` and `c-d` bond lengths, `angle1` and `angle2`
/// the bond angles at `b` and `c`, and `torsion` the dihedral about `b-c`
/// (0 gives the cis distance, π the trans distance).
pub fn one_four_distance(
    l1: f64,
    l2: f64,
    l3: f64,
    angle1: f64,
    angle2: f64,
    torsion: f64,
) -> f64 {
    let x = l2 - l3 * angle2.cos() - l1 * angle1.cos();
    let y = l3 * angle2.sin() * torsion.cos() - l1 * angle1.sin();
    let z = l3 * angle2.sin() * torsion.sin();
    (x * x + y * y + z * z).sqrt()
}
