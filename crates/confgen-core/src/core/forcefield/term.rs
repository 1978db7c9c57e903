use std::ops::{Add, AddAssign};

/// Per-family breakdown of the reference force-field energy.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EnergyTerm {
    pub bond: f64,
    pub angle: f64,
    pub torsion: f64,
    pub out_of_plane: f64,
    pub repulsion: f64,
}

impl EnergyTerm {
    pub fn new(bond: f64, angle: f64, torsion: f64, out_of_plane: f64, repulsion: f64) -> Self {
        Self {
            bond,
            angle,
            torsion,
            out_of_plane,
            repulsion,
        }
    }

    #[inline]
    pub fn total(&self) -> f64 {
        self.bond + self.angle + self.torsion + self.out_of_plane + self.repulsion
    }
}

impl Add for EnergyTerm {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            bond: self.bond + rhs.bond,
            angle: self.angle + rhs.angle,
            torsion: self.torsion + rhs.torsion,
            out_of_plane: self.out_of_plane + rhs.out_of_plane,
            repulsion: self.repulsion + rhs.repulsion,
        }
    }
}

impl AddAssign for EnergyTerm {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}
