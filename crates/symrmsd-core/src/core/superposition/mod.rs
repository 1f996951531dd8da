//! Rigid-body superposition.
//!
//! Only the RMSD after optimal rotation is computed; the rotation matrix itself is never
//! built. See [`qcp`] for the quaternion characteristic polynomial method.

pub mod qcp;
