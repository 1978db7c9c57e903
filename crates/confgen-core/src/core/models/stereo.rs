use crate::core::utils::geometry::{dihedral_angle, signed_volume};
use nalgebra::Vector3;
use std::f64::consts::FRAC_PI_2;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Signed volumes with a magnitude below this value are treated as planar, i.e. as carrying
/// no configuration at all.
pub const DEGENERATE_VOLUME_TOLERANCE: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AtomConfiguration {
    R,
    S,
}

impl AtomConfiguration {
    pub fn inverted(&self) -> Self {
        match self {
            Self::R => Self::S,
            Self::S => Self::R,
        }
    }

    /// Sign the signed volume over the priority-ordered reference atoms must have.
    pub fn volume_sign(&self) -> f64 {
        match self {
            Self::R => -1.0,
            Self::S => 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BondConfiguration {
    Cis,
    Trans,
}

impl BondConfiguration {
    pub fn inverted(&self) -> Self {
        match self {
            Self::Cis => Self::Trans,
            Self::Trans => Self::Cis,
        }
    }
}

#[derive(Debug, Error)]
#[error("Invalid stereo configuration string '{0}'")]
pub struct ParseConfigurationError(pub String);

impl FromStr for AtomConfiguration {
    type Err = ParseConfigurationError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "r" => Ok(Self::R),
            "s" => Ok(Self::S),
            _ => Err(ParseConfigurationError(s.to_string())),
        }
    }
}

impl FromStr for BondConfiguration {
    type Err = ParseConfigurationError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cis" | "z" => Ok(Self::Cis),
            "trans" | "e" => Ok(Self::Trans),
            _ => Err(ParseConfigurationError(s.to_string())),
        }
    }
}

impl fmt::Display for AtomConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", if *self == Self::R { "R" } else { "S" })
    }
}

impl fmt::Display for BondConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", if *self == Self::Cis { "cis" } else { "trans" })
    }
}

/// Tetrahedral stereocentre.
///
/// `reference_atoms` are listed in descending priority. For centres with only three
/// explicit substituents the fourth entry is the centre itself, standing in for the
/// implicit hydrogen or lone pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AtomStereoDescriptor {
    pub center: usize,
    pub reference_atoms: [usize; 4],
    pub configuration: AtomConfiguration,
}

impl AtomStereoDescriptor {
    pub fn new(center: usize, reference_atoms: [usize; 4], configuration: AtomConfiguration) -> Self {
        Self {
            center,
            reference_atoms,
            configuration,
        }
    }

    pub fn signed_volume(&self, coords: &[Vector3<f64>]) -> f64 {
        let [a, b, c, d] = self.reference_atoms;
        signed_volume(&coords[a], &coords[b], &coords[c], &coords[d])
    }

    /// Configuration realized by `coords`, or `None` for a flat centre.
    pub fn configuration_in(&self, coords: &[Vector3<f64>]) -> Option<AtomConfiguration> {
        let volume = self.signed_volume(coords);
        if volume.abs() < DEGENERATE_VOLUME_TOLERANCE || !volume.is_finite() {
            None
        } else if volume < 0.0 {
            Some(AtomConfiguration::R)
        } else {
            Some(AtomConfiguration::S)
        }
    }

    pub fn matches(&self, coords: &[Vector3<f64>]) -> bool {
        self.configuration_in(coords) == Some(self.configuration)
    }
}

/// Double-bond stereocentre `a-b=c-d`.
///
/// `a` must be bonded to `b`, `d` to `c`, and `b-c` is the stereogenic bond. The
/// configuration describes the relation between `a` and `d`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BondStereoDescriptor {
    pub reference_atoms: [usize; 4],
    pub configuration: BondConfiguration,
}

impl BondStereoDescriptor {
    pub fn new(reference_atoms: [usize; 4], configuration: BondConfiguration) -> Self {
        Self {
            reference_atoms,
            configuration,
        }
    }

    pub fn begin(&self) -> usize {
        self.reference_atoms[1]
    }

    pub fn end(&self) -> usize {
        self.reference_atoms[2]
    }

    pub fn configuration_in(&self, coords: &[Vector3<f64>]) -> Option<BondConfiguration> {
        let [a, b, c, d] = self.reference_atoms;
        let torsion = dihedral_angle(&coords[a], &coords[b], &coords[c], &coords[d]);
        if !torsion.is_finite() {
            None
        } else if torsion.abs() < FRAC_PI_2 {
            Some(BondConfiguration::Cis)
        } else {
            Some(BondConfiguration::Trans)
        }
    }

    pub fn matches(&self, coords: &[Vector3<f64>]) -> bool {
        self.configuration_in(coords) == Some(self.configuration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tetrahedron() -> Vec<Vector3<f64>> {
        vec![
            Vector3::zeros(),
            Vector3::new(0.0, 1.0, 0.3),
            Vector3::new(0.866, -0.5, 0.3),
            Vector3::new(-0.866, -0.5, 0.3),
            Vector3::new(0.0, 0.0, -1.0),
        ]
    }

    #[test]
    fn configuration_in_detects_r_and_s() {
        let coords = tetrahedron();
        let r = AtomStereoDescriptor::new(0, [1, 2, 3, 4], AtomConfiguration::R);
        assert_eq!(r.configuration_in(&coords), Some(AtomConfiguration::R));
        assert!(r.matches(&coords));

        let swapped = AtomStereoDescriptor::new(0, [2, 1, 3, 4], AtomConfiguration::R);
        assert_eq!(swapped.configuration_in(&coords), Some(AtomConfiguration::S));
        assert!(!swapped.matches(&coords));
    }

    #[test]
    fn center_can_stand_in_for_the_lowest_priority_substituent() {
        let coords = tetrahedron();
        let explicit = AtomStereoDescriptor::new(0, [1, 2, 3, 4], AtomConfiguration::R);
        let implicit = AtomStereoDescriptor::new(0, [1, 2, 3, 0], AtomConfiguration::R);
        assert_eq!(
            explicit.configuration_in(&coords),
            implicit.configuration_in(&coords)
        );
    }

    #[test]
    fn flat_center_has_no_configuration() {
        let coords = vec![
            Vector3::zeros(),
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(-0.5, 0.866, 0.0),
            Vector3::new(-0.5, -0.866, 0.0),
        ];
        let desc = AtomStereoDescriptor::new(0, [1, 2, 3, 0], AtomConfiguration::S);
        assert_eq!(desc.configuration_in(&coords), None);
        assert!(!desc.matches(&coords));
    }

    #[test]
    fn bond_configuration_follows_the_dihedral() {
        let cis = vec![
            Vector3::new(-0.7, 1.0, 0.0),
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(1.34, 0.0, 0.0),
            Vector3::new(2.04, 1.0, 0.0),
        ];
        let mut trans = cis.clone();
        trans[3].y = -1.0;
        let desc = BondStereoDescriptor::new([0, 1, 2, 3], BondConfiguration::Cis);
        assert_eq!(desc.configuration_in(&cis), Some(BondConfiguration::Cis));
        assert_eq!(desc.configuration_in(&trans), Some(BondConfiguration::Trans));
        assert!(desc.matches(&cis));
        assert!(!desc.matches(&trans));
        assert_eq!(desc.begin(), 1);
        assert_eq!(desc.end(), 2);
    }

    #[test]
    fn configurations_parse_and_invert() {
        assert_eq!("r".parse::<AtomConfiguration>().unwrap(), AtomConfiguration::R);
        assert_eq!("E".parse::<BondConfiguration>().unwrap(), BondConfiguration::Trans);
        assert!("x".parse::<AtomConfiguration>().is_err());
        assert_eq!(AtomConfiguration::R.inverted(), AtomConfiguration::S);
        assert_eq!(BondConfiguration::Cis.inverted(), BondConfiguration::Trans);
    }
}
