//! # Core Models Module
//!
//! This module contains the data structures the RMSD algorithms operate on.
//!
//! ## Overview
//!
//! Every comparison starts from two molecules exposed through the [`molecule::MolecularStructure`]
//! capability trait. They are snapshotted into immutable [`coords::CoordinateSet`]s and, when
//! symmetry correction needs it, into [`graph::LabeledGraph`]s. These models are designed to:
//!
//! - **Preserve atom identity** - Atom order is significant and only changes through explicit permutations
//! - **Stay immutable** - Centering, permuting and selecting always produce new values
//! - **Decouple from file formats** - Any molecule provider can implement the adapter trait
//!
//! ## Key Components
//!
//! - [`coords`] - Point cloud paired with atomic numbers
//! - [`graph`] - Connectivity graph with atomic-number vertex labels
//! - [`molecule`] - Molecule adapter trait and an in-memory molecule with a bond table
//! - [`structure`] - Prepared coordinates + graph, with hydrogen stripping
//! - [`error`] - Construction errors for the models
//!
//! ## Usage
//!
//! ```ignore
//! use symrmsd::core::models::molecule::{Molecule, MolecularStructure};
//!
//! let mol = Molecule::new(vec![8, 1, 1], positions, vec![(0, 1), (0, 2)])?;
//! let graph = mol.to_graph()?;
//! ```

pub mod coords;
pub mod error;
pub mod graph;
pub mod molecule;
pub mod structure;
