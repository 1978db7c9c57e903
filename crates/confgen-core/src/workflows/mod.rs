//! # Workflows Module
//!
//! High-level entry points that tie the [`crate::engine`] and [`crate::core`] layers
//! together into complete procedures.
//!
//! - **Generation Workflow** ([`generate`]) - Parameterizes a molecule and runs the
//!   embedding and minimization trials that produce its conformers.

pub mod generate;
