use phf::{Map, phf_map};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Chemical elements understood by the structure generator.
///
/// Elements outside the common organic subset are carried as [`Element::Other`] with
/// their atomic number; geometry falls back to generic radii for them and the
/// reference force field refuses to parameterize them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Element {
    H,
    B,
    C,
    N,
    O,
    F,
    Si,
    P,
    S,
    Cl,
    Se,
    Br,
    I,
    Other(u8),
}

static ELEMENT_SYMBOLS: Map<&'static str, Element> = phf_map! {
    "H" => Element::H,
    "B" => Element::B,
    "C" => Element::C,
    "N" => Element::N,
    "O" => Element::O,
    "F" => Element::F,
    "SI" => Element::Si,
    "P" => Element::P,
    "S" => Element::S,
    "CL" => Element::Cl,
    "SE" => Element::Se,
    "BR" => Element::Br,
    "I" => Element::I,
};

const DEFAULT_COVALENT_RADIUS: f64 = 0.77;
const DEFAULT_VDW_RADIUS: f64 = 1.70;

impl Element {
    pub fn atomic_number(&self) -> u8 {
        match self {
            Self::H => 1,
            Self::B => 5,
            Self::C => 6,
            Self::N => 7,
            Self::O => 8,
            Self::F => 9,
            Self::Si => 14,
            Self::P => 15,
            Self::S => 16,
            Self::Cl => 17,
            Self::Se => 34,
            Self::Br => 35,
            Self::I => 53,
            Self::Other(z) => *z,
        }
    }

    /// Single-bond covalent radius in Angstroms.
    pub fn covalent_radius(&self) -> f64 {
        match self {
            Self::H => 0.31,
            Self::B => 0.84,
            Self::C => 0.76,
            Self::N => 0.71,
            Self::O => 0.66,
            Self::F => 0.57,
            Self::Si => 1.11,
            Self::P => 1.07,
            Self::S => 1.05,
            Self::Cl => 1.02,
            Self::Se => 1.20,
            Self::Br => 1.20,
            Self::I => 1.39,
            Self::Other(_) => DEFAULT_COVALENT_RADIUS,
        }
    }

    /// Van der Waals radius in Angstroms.
    pub fn vdw_radius(&self) -> f64 {
        match self {
            Self::H => 1.20,
            Self::B => 1.92,
            Self::C => 1.70,
            Self::N => 1.55,
            Self::O => 1.52,
            Self::F => 1.47,
            Self::Si => 2.10,
            Self::P => 1.80,
            Self::S => 1.80,
            Self::Cl => 1.75,
            Self::Se => 1.90,
            Self::Br => 1.85,
            Self::I => 1.98,
            Self::Other(_) => DEFAULT_VDW_RADIUS,
        }
    }

    pub fn is_hydrogen(&self) -> bool {
        matches!(self, Self::H)
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Self::H => "H",
            Self::B => "B",
            Self::C => "C",
            Self::N => "N",
            Self::O => "O",
            Self::F => "F",
            Self::Si => "Si",
            Self::P => "P",
            Self::S => "S",
            Self::Cl => "Cl",
            Self::Se => "Se",
            Self::Br => "Br",
            Self::I => "I",
            Self::Other(_) => "X",
        }
    }
}

#[derive(Debug, Error)]
#[error("Unknown element symbol '{0}'")]
pub struct ParseElementError(pub String);

impl FromStr for Element {
    type Err = ParseElementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ELEMENT_SYMBOLS
            .get(s.trim().to_uppercase().as_str())
            .copied()
            .ok_or_else(|| ParseElementError(s.to_string()))
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Other(z) => write!(f, "X{}", z),
            _ => write!(f, "{}", self.symbol()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_str_is_case_insensitive() {
        assert_eq!("c".parse::<Element>().unwrap(), Element::C);
        assert_eq!("Cl".parse::<Element>().unwrap(), Element::Cl);
        assert_eq!("BR".parse::<Element>().unwrap(), Element::Br);
        assert_eq!(" si ".parse::<Element>().unwrap(), Element::Si);
    }

    #[test]
    fn from_str_rejects_unknown_symbols() {
        assert!("Xx".parse::<Element>().is_err());
        assert!("".parse::<Element>().is_err());
    }

    #[test]
    fn other_elements_fall_back_to_generic_radii() {
        let e = Element::Other(26);
        assert_eq!(e.atomic_number(), 26);
        assert_eq!(e.covalent_radius(), DEFAULT_COVALENT_RADIUS);
        assert_eq!(e.vdw_radius(), DEFAULT_VDW_RADIUS);
        assert_eq!(e.to_string(), "X26");
    }

    #[test]
    fn only_hydrogen_reports_is_hydrogen() {
        assert!(Element::H.is_hydrogen());
        assert!(!Element::C.is_hydrogen());
    }
}
