use crate::error::{CliError, Result};
use confgen::core::models::atom::{Atom, Hybridization};
use confgen::core::models::element::Element;
use confgen::core::models::molecule::Molecule;
use confgen::core::models::stereo::{
    AtomConfiguration, AtomStereoDescriptor, BondConfiguration, BondStereoDescriptor,
};
use confgen::core::models::topology::BondOrder;
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
struct AtomRecord {
    element: String,
    #[serde(default)]
    charge: i8,
    #[serde(default)]
    aromatic: bool,
    hybridization: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
struct BondRecord {
    atoms: [usize; 2],
    order: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
struct AtomStereoRecord {
    center: usize,
    /// Substituents in descending priority.
    references: [usize; 4],
    configuration: String,
}

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
struct BondStereoRecord {
    atoms: [usize; 4],
    configuration: String,
}

/// A molecule description in TOML.
///
/// ```toml
/// name = "ethene"
///
/// [[atoms]]
/// element = "C"
///
/// [[bonds]]
/// atoms = [0, 1]
/// order = "double"
/// ```
#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct MoleculeFile {
    pub name: Option<String>,
    atoms: Vec<AtomRecord>,
    #[serde(default)]
    bonds: Vec<BondRecord>,
    #[serde(default)]
    atom_stereo: Vec<AtomStereoRecord>,
    #[serde(default)]
    bond_stereo: Vec<BondStereoRecord>,
}

impl MoleculeFile {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading molecule from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    pub fn to_molecule(&self) -> Result<Molecule> {
        let mut mol = Molecule::new();
        for (index, record) in self.atoms.iter().enumerate() {
            let element: Element = record
                .element
                .parse()
                .map_err(|e| invalid(format!("atom {index}: {e}")))?;
            let mut atom = Atom::new(element)
                .aromatic(record.aromatic)
                .with_formal_charge(record.charge);
            if let Some(text) = &record.hybridization {
                let hybridization: Hybridization = text
                    .parse()
                    .map_err(|_| invalid(format!("atom {index}: unknown hybridization '{text}'")))?;
                atom = atom.with_hybridization(hybridization);
            }
            mol.add_atom(atom);
        }

        for record in &self.bonds {
            let [a, b] = record.atoms;
            let order = match &record.order {
                Some(text) => text
                    .parse::<BondOrder>()
                    .map_err(|_| invalid(format!("bond {a}-{b}: unknown order '{text}'")))?,
                None => BondOrder::Single,
            };
            mol.add_bond(a, b, order)
                .map_err(|e| invalid(e.to_string()))?;
        }

        for record in &self.atom_stereo {
            let configuration: AtomConfiguration = record
                .configuration
                .parse()
                .map_err(|e| invalid(format!("{e}")))?;
            mol.add_atom_stereo(AtomStereoDescriptor::new(
                record.center,
                record.references,
                configuration,
            ))
            .map_err(|e| invalid(e.to_string()))?;
        }

        for record in &self.bond_stereo {
            let configuration: BondConfiguration = record
                .configuration
                .parse()
                .map_err(|e| invalid(format!("{e}")))?;
            mol.add_bond_stereo(BondStereoDescriptor::new(record.atoms, configuration))
                .map_err(|e| invalid(e.to_string()))?;
        }

        debug!(
            atoms = mol.atom_count(),
            bonds = mol.bond_count(),
            "Molecule description converted."
        );
        Ok(mol)
    }
}

fn invalid(message: String) -> CliError {
    CliError::Molecule(message)
}
