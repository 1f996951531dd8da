use super::error::ModelError;
use crate::core::utils::geometry;
use nalgebra::{Point3, Vector3};

/// Atomic number of hydrogen, used when stripping hydrogens from a structure.
pub const HYDROGEN: u8 = 1;

/// An ordered set of atomic positions paired with their atomic numbers.
///
/// The order of atoms defines atom identity: index `i` of the positions and index `i`
/// of the atomic numbers describe the same atom. A `CoordinateSet` is never modified
/// in place; every transformation (centering, permuting, selecting) returns a new set.
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinateSet {
    positions: Vec<Point3<f64>>,
    atomic_numbers: Vec<u8>,
}

impl CoordinateSet {
    /// Creates a new coordinate set.
    ///
    /// # Arguments
    ///
    /// * `positions` - Cartesian coordinates of each atom, in Angstroms.
    /// * `atomic_numbers` - Atomic number of each atom, in the same order.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Empty`] if no atoms are given and
    /// [`ModelError::LabelLengthMismatch`] if the two sequences differ in length.
    pub fn new(positions: Vec<Point3<f64>>, atomic_numbers: Vec<u8>) -> Result<Self, ModelError> {
        if positions.len() != atomic_numbers.len() {
            return Err(ModelError::LabelLengthMismatch {
                positions: positions.len(),
                labels: atomic_numbers.len(),
            });
        }
        if positions.is_empty() {
            return Err(ModelError::Empty);
        }
        Ok(Self {
            positions,
            atomic_numbers,
        })
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Always `false`; a coordinate set holds at least one atom.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn positions(&self) -> &[Point3<f64>] {
        &self.positions
    }

    pub fn atomic_numbers(&self) -> &[u8] {
        &self.atomic_numbers
    }

    /// Returns the geometric center of the atoms.
    pub fn centroid(&self) -> Point3<f64> {
        geometry::centroid(&self.positions).unwrap_or_else(Point3::origin)
    }

    /// Returns a copy translated by `offset`.
    pub fn translated(&self, offset: &Vector3<f64>) -> Self {
        Self {
            positions: geometry::translate(&self.positions, offset),
            atomic_numbers: self.atomic_numbers.clone(),
        }
    }

    /// Returns a copy whose centroid sits at the origin.
    pub fn centered(&self) -> Self {
        self.translated(&-self.centroid().coords)
    }

    /// Returns a copy reordered so that atom `i` of the result is atom `order[i]` of `self`.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidPermutation`] if `order` is not a permutation of
    /// `0..self.len()`.
    pub fn permuted(&self, order: &[usize]) -> Result<Self, ModelError> {
        let n = self.len();
        let invalid = ModelError::InvalidPermutation {
            len: order.len(),
            expected: n,
        };
        if order.len() != n {
            return Err(invalid);
        }
        let mut seen = vec![false; n];
        for &idx in order {
            if idx >= n || seen[idx] {
                return Err(invalid);
            }
            seen[idx] = true;
        }
        Ok(self.gather(order))
    }

    /// Returns the subset of atoms at `indices`, in the order given.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::IndexOutOfRange`] for an index past the end, and
    /// [`ModelError::Empty`] if `indices` is empty.
    pub fn select(&self, indices: &[usize]) -> Result<Self, ModelError> {
        if let Some(&index) = indices.iter().find(|&&i| i >= self.len()) {
            return Err(ModelError::IndexOutOfRange {
                index,
                num_atoms: self.len(),
            });
        }
        if indices.is_empty() {
            return Err(ModelError::Empty);
        }
        Ok(self.gather(indices))
    }

    /// Indices of all atoms that are not hydrogen.
    pub fn heavy_atom_indices(&self) -> Vec<usize> {
        self.atomic_numbers
            .iter()
            .enumerate()
            .filter(|&(_, &z)| z != HYDROGEN)
            .map(|(idx, _)| idx)
            .collect()
    }

    fn gather(&self, indices: &[usize]) -> Self {
        Self {
            positions: indices.iter().map(|&i| self.positions[i]).collect(),
            atomic_numbers: indices.iter().map(|&i| self.atomic_numbers[i]).collect(),
        }
    }
}
