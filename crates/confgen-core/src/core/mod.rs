//! # Core Module
//!
//! This module provides the data models and algorithms the conformer engine is built
//! from. Everything here is either stateless or owns only private scratch state, so the
//! orchestration in [`crate::engine`] can compose the pieces freely.
//!
//! ## Architecture
//!
//! - **Molecular Representation** ([`models`]) - Molecular graph, elements, bonds, ring
//!   perception and stereo descriptors
//! - **Energy Calculations** ([`forcefield`]) - Reference force field, parameterization
//!   and the energy oracle trait
//! - **Distance Geometry** ([`dg`]) - Constraint generation, bounds smoothing and
//!   embedding
//! - **Optimization** ([`minimizer`]) - BFGS minimization over generic variable containers
//! - **Utilities** ([`utils`]) - Geometry helpers and hydrogen placement
//!
//! ## Scientific Foundation
//!
//! - **Distance geometry** for turning topological knowledge into 3D coordinates
//! - **Molecular mechanics** for relaxing embedded structures
//! - **Quasi-Newton optimization** with Fletcher's line search

pub mod dg;
pub mod forcefield;
pub mod minimizer;
pub mod models;
pub mod utils;
