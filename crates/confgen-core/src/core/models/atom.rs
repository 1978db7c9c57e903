use super::element::Element;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Hybridization state of an atom's valence orbitals.
///
/// Determines the reference geometry around a centre: linear for `Sp`, trigonal planar
/// for `Sp2` and tetrahedral for `Sp3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Hybridization {
    Sp,
    Sp2,
    Sp3,
}

impl Hybridization {
    /// Ideal angle (degrees) between two substituents of a centre with this hybridization.
    pub fn ideal_angle(&self) -> f64 {
        match self {
            Self::Sp => 180.0,
            Self::Sp2 => 120.0,
            Self::Sp3 => 109.47,
        }
    }

    /// Number of substituent positions of the ideal coordination polyhedron.
    pub fn coordination(&self) -> usize {
        match self {
            Self::Sp => 2,
            Self::Sp2 => 3,
            Self::Sp3 => 4,
        }
    }
}

#[derive(Debug, Error)]
#[error("Invalid hybridization string")]
pub struct ParseHybridizationError;

impl FromStr for Hybridization {
    type Err = ParseHybridizationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sp" | "1" => Ok(Self::Sp),
            "sp2" | "2" => Ok(Self::Sp2),
            "sp3" | "3" => Ok(Self::Sp3),
            _ => Err(ParseHybridizationError),
        }
    }
}

impl fmt::Display for Hybridization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Sp => "sp",
                Self::Sp2 => "sp2",
                Self::Sp3 => "sp3",
            }
        )
    }
}

/// A node of the molecular graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// The chemical element.
    pub element: Element,
    /// Formal charge in elementary charge units.
    pub formal_charge: i8,
    /// Whether the atom is part of an aromatic system.
    pub aromatic: bool,
    /// Explicit hybridization; derived from the bonding pattern when `None`.
    pub hybridization: Option<Hybridization>,
}

impl Atom {
    pub fn new(element: Element) -> Self {
        Self {
            element,
            formal_charge: 0,
            aromatic: false,
            hybridization: None,
        }
    }

    pub fn aromatic(mut self, aromatic: bool) -> Self {
        self.aromatic = aromatic;
        self
    }

    pub fn with_hybridization(mut self, hybridization: Hybridization) -> Self {
        self.hybridization = Some(hybridization);
        self
    }

    pub fn with_formal_charge(mut self, charge: i8) -> Self {
        self.formal_charge = charge;
        self
    }

    pub fn is_hydrogen(&self) -> bool {
        self.element.is_hydrogen()
    }
}
