use super::matching::assignment::AssignmentError;
use super::matching::isomorphism::MatchError;
use super::models::error::ModelError;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ShapeMismatch {
    #[error("first structure has {first} atoms, second has {second}")]
    AtomCount { first: usize, second: usize },

    #[error("atom {index} has atomic number {first} in the first structure but {second} in the second")]
    AtomicNumber { index: usize, first: u8, second: u8 },
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RmsdError {
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(ShapeMismatch),

    #[error("Graphs are not isomorphic: {reason}")]
    GraphMismatch { reason: String },

    #[error(
        "Atomic number {atomic_number} occurs {first} time(s) in the first structure but {second} time(s) in the second"
    )]
    LabelCountMismatch {
        atomic_number: u8,
        first: usize,
        second: usize,
    },

    #[error("Graph has no atomic-number labels and structure-only matching is not allowed")]
    UnlabeledGraph,

    #[error("Coordinates are not centered: centroid lies {offset:.3e} A from the origin")]
    NotCentered { offset: f64 },

    #[error("Computation was cancelled")]
    Cancelled,

    #[error("Invalid structure: {0}")]
    Model(#[from] ModelError),

    #[error("Assignment solver failed: {0}")]
    Assignment(#[from] AssignmentError),
}

impl From<ShapeMismatch> for RmsdError {
    fn from(mismatch: ShapeMismatch) -> Self {
        RmsdError::ShapeMismatch(mismatch)
    }
}

impl From<MatchError> for RmsdError {
    fn from(err: MatchError) -> Self {
        match err {
            MatchError::NotIsomorphic { reason } => RmsdError::GraphMismatch { reason },
            MatchError::Unlabeled => RmsdError::UnlabeledGraph,
        }
    }
}

pub(crate) fn ensure_same_len(first: usize, second: usize) -> Result<(), RmsdError> {
    if first != second {
        return Err(ShapeMismatch::AtomCount { first, second }.into());
    }
    Ok(())
}

pub(crate) fn ensure_same_atomic_numbers(first: &[u8], second: &[u8]) -> Result<(), RmsdError> {
    ensure_same_len(first.len(), second.len())?;
    match first.iter().zip(second).position(|(a, b)| a != b) {
        Some(index) => Err(ShapeMismatch::AtomicNumber {
            index,
            first: first[index],
            second: second[index],
        }
        .into()),
        None => Ok(()),
    }
}
