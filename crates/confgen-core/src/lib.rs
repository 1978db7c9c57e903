//! # Confgen Core Library
//!
//! A small-molecule conformer generator built on distance geometry and force-field
//! minimization.
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer architecture with a clear separation of concerns.
//!
//! - **[`core`]: The Foundation.** Molecular graph and stereo models, the reference force
//!   field, distance-geometry constraint generation and embedding, and the BFGS minimizer.
//!   Nothing here knows about trials or timeouts.
//!
//! - **[`engine`]: The Logic Core.** The stateful [`engine::generator::StructureGenerator`]
//!   and its trial loop: embed, place hydrogens, minimize in timeout-checked chunks and
//!   verify stereochemistry until enough conformers are accepted.
//!
//! - **[`workflows`]: The Public API.** One-call procedures such as
//!   [`workflows::generate::run`] for callers that do not need to keep a generator around.

pub mod core;
pub mod engine;
pub mod workflows;
