pub mod geometry;
pub mod hydrogens;
