use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("Coordinate set must contain at least one atom")]
    Empty,

    #[error("Got {positions} positions but {labels} atomic numbers")]
    LabelLengthMismatch { positions: usize, labels: usize },

    #[error("Bond ({atom1}, {atom2}) references an atom outside 0..{num_atoms}")]
    BondOutOfRange {
        atom1: usize,
        atom2: usize,
        num_atoms: usize,
    },

    #[error("Adjacency matrix row {row} has {len} entries, expected {expected}")]
    MalformedAdjacency {
        row: usize,
        len: usize,
        expected: usize,
    },

    #[error("Selection index {index} is outside 0..{num_atoms}")]
    IndexOutOfRange { index: usize, num_atoms: usize },

    #[error("Permutation of length {len} is not a permutation of 0..{expected}")]
    InvalidPermutation { len: usize, expected: usize },
}
