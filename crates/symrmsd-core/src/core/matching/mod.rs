//! Atom correspondence search.
//!
//! Two capabilities are consumed through traits so that alternative backends can be
//! injected without touching the RMSD algorithms:
//!
//! - [`isomorphism`] - Label-preserving graph isomorphism enumeration (`GraphMatcher`),
//!   with a VF2 backend from `petgraph`.
//! - [`assignment`] - Minimum-cost perfect bipartite matching (`AssignmentSolver`),
//!   with an in-crate Hungarian backend.

pub mod assignment;
pub mod isomorphism;
