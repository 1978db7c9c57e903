//! # Engine Module
//!
//! This module implements the retry orchestration that turns the distance-geometry
//! embedder and the BFGS minimizer into a conformer generator.
//!
//! ## Overview
//!
//! A generation call runs independent trials. Each trial embeds the molecule, places the
//! hydrogens that were left out of the embedding, relaxes the structure in the force
//! field and checks that every stereocentre survived. Trials repeat until enough
//! conformers are accepted, the trial budget is spent or the timeout expires.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Embedding, minimization, trial and stereo settings
//! - **Orchestration** ([`generator`], [`trials`]) - The stateful generator and its trial loop
//! - **State Tracking** ([`state`]) - Accepted conformers bounded by count and energy window
//! - **Progress Monitoring** ([`progress`]) - Per-trial events and cooperative abort
//! - **Error Handling** ([`error`]) - Failure kinds and their plain return codes
//! - **Buffers** ([`pool`]) - Reusable coordinate scratch space

pub mod config;
pub mod error;
pub mod generator;
pub mod pool;
pub mod progress;
pub mod state;
pub mod trials;
