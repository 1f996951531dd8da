use super::coords::CoordinateSet;
use super::error::ModelError;
use super::graph::LabeledGraph;
use crate::core::utils::geometry;
use nalgebra::Point3;

/// Capability interface through which the library reads a molecule.
///
/// Parsing molecule files and perceiving bonds are left to the implementor; the RMSD
/// algorithms depend only on this trait.
pub trait MolecularStructure {
    /// Atomic number of every atom, in atom order.
    fn atomic_numbers(&self) -> &[u8];

    /// Cartesian coordinates of every atom, in atom order.
    fn coordinates(&self) -> &[Point3<f64>];

    /// Geometric center of the coordinates.
    fn centroid(&self) -> Point3<f64> {
        geometry::centroid(self.coordinates()).unwrap_or_else(Point3::origin)
    }

    /// Connectivity graph with atomic-number labels.
    fn to_graph(&self) -> Result<LabeledGraph, ModelError>;

    /// Snapshot of the atoms as an immutable [`CoordinateSet`].
    fn coordinate_set(&self) -> Result<CoordinateSet, ModelError> {
        CoordinateSet::new(self.coordinates().to_vec(), self.atomic_numbers().to_vec())
    }
}

impl<T: MolecularStructure + ?Sized> MolecularStructure for &T {
    fn atomic_numbers(&self) -> &[u8] {
        (**self).atomic_numbers()
    }

    fn coordinates(&self) -> &[Point3<f64>] {
        (**self).coordinates()
    }

    fn centroid(&self) -> Point3<f64> {
        (**self).centroid()
    }

    fn to_graph(&self) -> Result<LabeledGraph, ModelError> {
        (**self).to_graph()
    }
}

/// In-memory molecule with an explicit bond table.
#[derive(Debug, Clone, PartialEq)]
pub struct Molecule {
    atomic_numbers: Vec<u8>,
    coordinates: Vec<Point3<f64>>,
    bonds: Vec<(usize, usize)>,
}

impl Molecule {
    /// Creates a molecule from atoms and bonds.
    ///
    /// # Arguments
    ///
    /// * `atomic_numbers` - Atomic number of every atom.
    /// * `coordinates` - Position of every atom, in Angstroms.
    /// * `bonds` - Pairs of zero-based atom indices.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError`] if there are no atoms, the two per-atom sequences differ in
    /// length, or a bond refers to a missing atom.
    pub fn new(
        atomic_numbers: Vec<u8>,
        coordinates: Vec<Point3<f64>>,
        bonds: Vec<(usize, usize)>,
    ) -> Result<Self, ModelError> {
        if coordinates.len() != atomic_numbers.len() {
            return Err(ModelError::LabelLengthMismatch {
                positions: coordinates.len(),
                labels: atomic_numbers.len(),
            });
        }
        if coordinates.is_empty() {
            return Err(ModelError::Empty);
        }
        let num_atoms = coordinates.len();
        if let Some(&(atom1, atom2)) = bonds
            .iter()
            .find(|&&(a, b)| a >= num_atoms || b >= num_atoms)
        {
            return Err(ModelError::BondOutOfRange {
                atom1,
                atom2,
                num_atoms,
            });
        }
        Ok(Self {
            atomic_numbers,
            coordinates,
            bonds,
        })
    }

    pub fn len(&self) -> usize {
        self.atomic_numbers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atomic_numbers.is_empty()
    }

    pub fn bonds(&self) -> &[(usize, usize)] {
        &self.bonds
    }

    /// Returns a copy with coordinates replaced, keeping atoms and bonds.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::LabelLengthMismatch`] if the number of positions changes.
    pub fn with_coordinates(&self, coordinates: Vec<Point3<f64>>) -> Result<Self, ModelError> {
        if coordinates.len() != self.len() {
            return Err(ModelError::LabelLengthMismatch {
                positions: coordinates.len(),
                labels: self.len(),
            });
        }
        Ok(Self {
            atomic_numbers: self.atomic_numbers.clone(),
            coordinates,
            bonds: self.bonds.clone(),
        })
    }

    /// Returns a copy with atoms renumbered: atom `i` of the result is atom `order[i]`.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidPermutation`] if `order` is not a permutation.
    pub fn renumbered(&self, order: &[usize]) -> Result<Self, ModelError> {
        let set = self.coordinate_set()?.permuted(order)?;
        let mut new_index = vec![0; self.len()];
        for (new, &old) in order.iter().enumerate() {
            new_index[old] = new;
        }
        let bonds = self
            .bonds
            .iter()
            .map(|&(a, b)| (new_index[a], new_index[b]))
            .collect();
        Ok(Self {
            atomic_numbers: set.atomic_numbers().to_vec(),
            coordinates: set.positions().to_vec(),
            bonds,
        })
    }
}

impl MolecularStructure for Molecule {
    fn atomic_numbers(&self) -> &[u8] {
        &self.atomic_numbers
    }

    fn coordinates(&self) -> &[Point3<f64>] {
        &self.coordinates
    }

    fn to_graph(&self) -> Result<LabeledGraph, ModelError> {
        LabeledGraph::from_bonds(self.len(), Some(&self.atomic_numbers), &self.bonds)
    }
}
