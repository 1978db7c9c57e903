use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Torsion barrier heights (kcal/mol) by central-bond class.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct TorsionParams {
    pub sp3_sp3: f64,
    pub sp2_sp3: f64,
    pub conjugated: f64,
    pub aromatic: f64,
    pub double: f64,
}

impl Default for TorsionParams {
    fn default() -> Self {
        Self {
            sp3_sp3: 1.0,
            sp2_sp3: 0.2,
            conjugated: 1.5,
            aromatic: 6.0,
            double: 12.0,
        }
    }
}

/// Force constants of the reference bonded force field.
///
/// Every field has a built-in default; a TOML file only needs to list the values it
/// overrides.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ForcefieldParams {
    /// Bond stretch constant in kcal/(mol·Å²).
    pub bond_stretch_k: f64,
    /// Angle bend constant in kcal/mol (cosine-harmonic).
    pub angle_bend_k: f64,
    /// Out-of-plane constant in kcal/(mol·Å⁶) applied to the squared signed volume.
    pub out_of_plane_k: f64,
    /// Repulsion constant in kcal/(mol·Å²).
    pub repulsion_k: f64,
    /// Fraction of the van der Waals radius sum below which non-bonded pairs repel.
    pub repulsion_scale: f64,
    pub torsion: TorsionParams,
}

impl Default for ForcefieldParams {
    fn default() -> Self {
        Self {
            bond_stretch_k: 350.0,
            angle_bend_k: 100.0,
            out_of_plane_k: 5.0,
            repulsion_k: 10.0,
            repulsion_scale: 0.7,
            torsion: TorsionParams::default(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ParamLoadError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
}

impl ForcefieldParams {
    pub fn load(path: &Path) -> Result<Self, ParamLoadError> {
        let content = std::fs::read_to_string(path).map_err(|e| ParamLoadError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ParamLoadError::Toml {
            path: path.to_string_lossy().to_string(),
            source: e,
        })
    }
}
