//! # Workflows Module
//!
//! This module provides the high-level entry points that compare one reference molecule
//! against many targets.
//!
//! ## Overview
//!
//! Workflows are the top-level entry points for users of the library. They validate the
//! configuration, distribute pairs over a bounded worker pool, enforce per-pair timeouts,
//! report progress and collect one result per target in input order.
//!
//! ## Architecture
//!
//! - **Batch Workflow** ([`batch`]) - Reference-versus-targets RMSD with timeouts and
//!   explicit per-pair status tracking.
//!
//! ## Key Capabilities
//!
//! - **Order preservation** with one pre-indexed result slot per target
//! - **Fault isolation** so that one failing or slow pair never affects the others
//! - **Explicit unavailability** through [`batch::RmsdResult::Unavailable`], read as NaN

pub mod batch;
