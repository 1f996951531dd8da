//! # Engine Module
//!
//! This module implements the pairwise RMSD computations and the settings that drive them.
//!
//! ## Overview
//!
//! The engine sits between the stateless primitives of [`crate::core`] and the batch
//! workflow. Given two molecules and a set of [`config::RmsdSettings`], it prepares both
//! structures (optionally stripping hydrogens), chooses the atom-correspondence strategy and
//! returns a single RMSD value or a typed error.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Comparison settings, batch options and the TOML loader
//! - **Tasks** ([`tasks`]) - Plain, isomorphism-corrected and assignment-corrected RMSD
//! - **Cancellation** ([`cancel`]) - Cooperative stop signal checked by long enumerations
//! - **Progress Monitoring** ([`progress`]) - Progress callbacks for batch execution
//! - **Error Handling** ([`error`]) - Engine-level errors
//!
//! ## Key Capabilities
//!
//! - **Exact symmetry correction** by minimizing over every graph isomorphism
//! - **Polynomial approximation** through per-element linear assignment
//! - **Optimal superposition** through the quaternion characteristic polynomial
//! - **Prompt abandonment** of enumerations once a caller stops waiting

pub mod cancel;
pub mod config;
pub mod error;
pub mod progress;
pub mod tasks;
