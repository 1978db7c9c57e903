//! # Core Models Module
//!
//! This module contains the data structures used to describe the molecule whose
//! conformers are generated.
//!
//! ## Overview
//!
//! The molecular graph is consumed read-only by the constraint generator, the reference
//! force field and the stereo validators. Atoms and bonds use dense indices so that every
//! coordinate array produced by the pipeline is index-aligned with the graph.
//!
//! ## Key Components
//!
//! - [`element`] - Element table with covalent and van der Waals radii
//! - [`atom`] - Atom nodes and hybridization states
//! - [`topology`] - Bonds and bond orders
//! - [`molecule`] - The molecular graph with ring perception and hybridization queries
//! - [`stereo`] - Tetrahedral and double-bond stereo descriptors
//! - [`ideal`] - Reference bond lengths and ring-aware bond angles
//!
//! ## Usage
//!
//! ```ignore
//! use confgen::core::models::{atom::Atom, element::Element, molecule::Molecule};
//! use confgen::core::models::topology::BondOrder;
//!
//! let mut mol = Molecule::new();
//! let c = mol.add_atom(Atom::new(Element::C));
//! let o = mol.add_atom(Atom::new(Element::O));
//! mol.add_bond(c, o, BondOrder::Double)?;
//! ```

pub mod atom;
pub mod element;
pub mod ideal;
pub mod molecule;
pub mod stereo;
pub mod topology;
