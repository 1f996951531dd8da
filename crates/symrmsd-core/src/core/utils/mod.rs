//! Geometric helpers shared by the RMSD algorithms.

pub mod geometry;
