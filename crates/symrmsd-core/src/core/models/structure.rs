use super::coords::CoordinateSet;
use super::error::ModelError;
use super::graph::LabeledGraph;
use super::molecule::MolecularStructure;

/// A molecule snapshot prepared for comparison: its coordinates and, when needed,
/// its connectivity graph.
#[derive(Debug, Clone)]
pub struct Structure {
    coords: CoordinateSet,
    graph: Option<LabeledGraph>,
}

impl Structure {
    /// Creates a structure from coordinates and an optional graph.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::LabelLengthMismatch`] if the graph does not have one vertex
    /// per atom.
    pub fn new(coords: CoordinateSet, graph: Option<LabeledGraph>) -> Result<Self, ModelError> {
        if let Some(g) = &graph {
            if g.num_vertices() != coords.len() {
                return Err(ModelError::LabelLengthMismatch {
                    positions: coords.len(),
                    labels: g.num_vertices(),
                });
            }
        }
        Ok(Self { coords, graph })
    }

    /// Snapshots a molecule; the graph is only built when `with_graph` is set.
    pub fn from_molecule<M: MolecularStructure + ?Sized>(
        molecule: &M,
        with_graph: bool,
    ) -> Result<Self, ModelError> {
        let coords = molecule.coordinate_set()?;
        let graph = if with_graph {
            Some(molecule.to_graph()?)
        } else {
            None
        };
        Self::new(coords, graph)
    }

    pub fn coords(&self) -> &CoordinateSet {
        &self.coords
    }

    pub fn graph(&self) -> Option<&LabeledGraph> {
        self.graph.as_ref()
    }

    /// Removes every hydrogen atom, together with its vertex in the graph.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Empty`] if the structure has no heavy atoms.
    pub fn without_hydrogens(&self) -> Result<Self, ModelError> {
        let keep = self.coords.heavy_atom_indices();
        if keep.len() == self.coords.len() {
            return Ok(self.clone());
        }
        let coords = self.coords.select(&keep)?;
        let graph = self
            .graph
            .as_ref()
            .map(|g| g.induced_subgraph(&keep))
            .transpose()?;
        Ok(Self { coords, graph })
    }
}
