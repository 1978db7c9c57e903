//! # Force Field Module
//!
//! This module provides the molecular-mechanics energy oracle used to refine embedded
//! structures.
//!
//! ## Overview
//!
//! The reference force field is a compact covalent-radius-based bonded model with the
//! interaction families a full molecular-mechanics force field uses for conformer
//! refinement:
//!
//! - **Bond stretching** with harmonic potentials around covalent-radius reference lengths
//! - **Angle bending** with cosine-harmonic potentials around ring-aware reference angles
//! - **Torsions** with periodic potentials chosen by the hybridization of the central bond
//! - **Out-of-plane** penalties on the signed volume of trigonal centres
//! - **Non-bonded repulsion** between atoms three or more bonds apart
//!
//! ## Key Components
//!
//! - [`params`] - Force constants with defaults and TOML loading
//! - [`parameterization`] - Assignment of interactions to a molecule
//! - [`energy`] - The [`energy::EnergyFunction`] oracle trait and its implementation
//! - [`term`] - Per-family energy breakdown
//!
//! ## Usage
//!
//! ```ignore
//! use confgen::core::forcefield::{energy::ForceField, parameterization::Parameterizer};
//!
//! let params = ForcefieldParams::default();
//! let data = Parameterizer::new(&params).parameterize(&molecule)?;
//! let forcefield = ForceField::new(data);
//! let energy = forcefield.energy(&coords);
//! ```

pub mod energy;
pub mod parameterization;
pub mod params;
pub(crate) mod potentials;
pub mod term;
