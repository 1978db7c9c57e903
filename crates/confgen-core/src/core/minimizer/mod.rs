//! # Minimizer Module
//!
//! A quasi-Newton (BFGS) minimizer used both to polish distance-geometry embeddings and
//! to relax embedded structures on the force-field energy surface.
//!
//! ## Key Components
//!
//! - [`bfgs`] - [`bfgs::BfgsMinimizer`] with Fletcher's line search and
//!   [`bfgs::MinimizerStatus`] result flags
//! - [`variables`] - The [`variables::MinimizerVariables`] container trait, implemented for
//!   flat vectors and 3D coordinate arrays
//!
//! ## Usage
//!
//! ```ignore
//! use confgen::core::minimizer::bfgs::{BfgsMinimizer, MinimizerStatus};
//!
//! let mut minimizer = BfgsMinimizer::new(&coords, |x| ff.energy(x), |x, g| ff.energy_and_gradient(x, g));
//! let status = minimizer.minimize(&mut coords, &mut grad, 1000, 0.1, -1.0, true);
//! ```

pub mod bfgs;
pub mod variables;
