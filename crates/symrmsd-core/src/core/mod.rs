//! # Core Module
//!
//! This module provides the stateless building blocks of symmetry-corrected RMSD: the
//! molecular data models, rigid-body superposition, and the atom-correspondence search
//! capabilities.
//!
//! ## Overview
//!
//! Everything in `core` is a pure function of its inputs. The engine composes these pieces
//! into per-pair comparisons, and the workflows run those comparisons in parallel.
//!
//! ## Architecture
//!
//! - **Molecular Representation** ([`models`]) - Coordinate sets, labeled graphs, and the molecule adapter trait
//! - **Superposition** ([`superposition`]) - Quaternion characteristic polynomial RMSD
//! - **Correspondence Search** ([`matching`]) - Graph isomorphism and linear assignment capabilities
//! - **Geometry** ([`utils`]) - Centroids, translations and plain RMSD
//! - **Errors** ([`error`]) - Failure kinds of a single pairwise comparison
//!
//! ## Scientific Foundation
//!
//! - **QCP superposition** (Theobald, 2005): the optimal-rotation RMSD is read off the largest
//!   eigenvalue of a 4x4 key matrix, found by Newton-Raphson on its characteristic polynomial
//! - **Graph automorphisms**: symmetric molecules admit several valid atom correspondences,
//!   and only the minimum RMSD over all of them is physically meaningful
//! - **Hungarian method**: a polynomial-time, geometry-only approximation of that minimum

pub mod error;
pub mod matching;
pub mod models;
pub mod superposition;
pub mod utils;
