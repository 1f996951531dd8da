//! # symrmsd Core Library
//!
//! Symmetry-corrected root-mean-square deviation between molecular structures.
//!
//! ## Architectural Philosophy
//!
//! The library is designed with a strict three-layer architecture to ensure a clear separation
//! of concerns, making it modular, testable, and extensible.
//!
//! - **[`core`]: The Foundation.** Contains immutable data models (`CoordinateSet`,
//!   `LabeledGraph`, `Molecule`), the QCP superposition kernel, and the graph-isomorphism and
//!   linear-assignment capabilities behind their traits.
//!
//! - **[`engine`]: The Logic Core.** Implements the pairwise computations: plain RMSD,
//!   RMSD minimized over graph isomorphisms, and the assignment-based approximation, along
//!   with configuration, cancellation and progress reporting.
//!
//! - **[`workflows`]: The Public API.** Compares one reference against many targets on a
//!   bounded worker pool with per-pair timeouts, returning one result per target in order.
//!
//! ## Usage
//!
//! ```ignore
//! use symrmsd::engine::config::BatchConfigBuilder;
//! use symrmsd::workflows::batch::batch_rmsd;
//!
//! let config = BatchConfigBuilder::new().minimize(true).build()?;
//! let results = batch_rmsd(&reference, &poses, &config)?;
//! let values: Vec<f64> = results.iter().map(|r| r.as_f64()).collect();
//! ```

pub mod core;
pub mod engine;
pub mod workflows;
