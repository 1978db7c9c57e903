//! Functional forms of the reference force field.
//!
//! Each function returns the energy together with its derivative with respect to the
//! scalar internal coordinate it is written in.

/// `E = k (r - r0)²`
#[inline]
pub fn bond_stretch(r: f64, r0: f64, k: f64) -> (f64, f64) {
    let dr = r - r0;
    (k * dr * dr, 2.0 * k * dr)
}

/// Cosine-harmonic angle bend `E = k (cos θ - cos θ0)²`, derivative with respect to `cos θ`.
#[inline]
pub fn angle_bend(cos_theta: f64, cos_theta0: f64, k: f64) -> (f64, f64) {
    let dc = cos_theta - cos_theta0;
    (k * dc * dc, 2.0 * k * dc)
}

/// Periodic torsion `E = V (1 + cos(n φ - γ))`.
#[inline]
pub fn torsion(phi: f64, barrier: f64, periodicity: f64, phase: f64) -> (f64, f64) {
    let arg = periodicity * phi - phase;
    (
        barrier * (1.0 + arg.cos()),
        -barrier * periodicity * arg.sin(),
    )
}

/// `E = k V²` on the signed volume of a centre and its three neighbours.
#[inline]
pub fn out_of_plane(volume: f64, k: f64) -> (f64, f64) {
    (k * volume * volume, 2.0 * k * volume)
}

/// One-sided harmonic wall `E = k (r_min - r)²` for `r < r_min`, zero beyond.
#[inline]
pub fn repulsion(r: f64, r_min: f64, k: f64) -> (f64, f64) {
    if r >= r_min {
        return (0.0, 0.0);
    }
    let dr = r_min - r;
    (k * dr * dr, -2.0 * k * dr)
}
