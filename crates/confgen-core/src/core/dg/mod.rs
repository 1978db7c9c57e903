//! # Distance Geometry Module
//!
//! Turns a molecular graph into 3D coordinates by constraint satisfaction.
//!
//! ## Overview
//!
//! The [`generator::ConstraintGenerator`] derives pairwise distance bounds (bonds, 1-3 and
//! 1-4 distances, van der Waals defaults) and signed-volume constraints (chirality,
//! planarity) from the molecular graph. A [`coordinates::DgCoordinatesGenerator`] receives
//! those constraints through the [`constraints::ConstraintSink`] trait, smooths the bounds
//! and embeds random starting coordinates until the constraints hold.
//! [`structure::DgStructureGenerator`] wires both together into the two-phase embedder
//! used by the engine.
//!
//! ## Key Components
//!
//! - [`constraints`] - Distance and volume constraint types
//! - [`bounds`] - The symmetric [`bounds::DistanceBoundsMatrix`] and triangle smoothing
//! - [`generator`] - Constraint generation from topology and stereo descriptors
//! - [`coordinates`] - Random embedding with stochastic refinement and BFGS polish
//! - [`structure`] - Two-phase embedding and stereo validation

pub mod bounds;
pub mod constraints;
pub mod coordinates;
pub mod generator;
pub mod structure;
