use super::error::ModelError;
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;

/// Molecular connectivity graph with optional atomic-number vertex labels.
///
/// Vertices are numbered `0..N` in the same order as the atoms of the coordinate set
/// the graph was built for. When the graph was built without atomic numbers every vertex
/// carries the label `0` and [`LabeledGraph::is_labeled`] returns `false`; matchers use
/// this to decide whether label equality can be enforced.
#[derive(Debug, Clone)]
pub struct LabeledGraph {
    graph: UnGraph<u8, ()>,
    labeled: bool,
}

impl LabeledGraph {
    /// Builds a graph from a bond list.
    ///
    /// Repeated bonds collapse into a single edge.
    ///
    /// # Arguments
    ///
    /// * `num_atoms` - Number of vertices.
    /// * `atomic_numbers` - Optional vertex labels, one per atom.
    /// * `bonds` - Pairs of zero-based atom indices.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError`] if the graph would be empty, the labels do not cover every
    /// atom, or a bond refers to a missing atom.
    pub fn from_bonds(
        num_atoms: usize,
        atomic_numbers: Option<&[u8]>,
        bonds: &[(usize, usize)],
    ) -> Result<Self, ModelError> {
        let mut graph = Self::with_vertices(num_atoms, atomic_numbers)?;
        for &(atom1, atom2) in bonds {
            if atom1 >= num_atoms || atom2 >= num_atoms {
                return Err(ModelError::BondOutOfRange {
                    atom1,
                    atom2,
                    num_atoms,
                });
            }
            graph
                .graph
                .update_edge(NodeIndex::new(atom1), NodeIndex::new(atom2), ());
        }
        Ok(graph)
    }

    /// Builds a graph from a square adjacency matrix; any non-zero entry is a bond.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::MalformedAdjacency`] for a non-square matrix, plus the
    /// errors of [`LabeledGraph::from_bonds`].
    pub fn from_adjacency_matrix(
        matrix: &[Vec<u8>],
        atomic_numbers: Option<&[u8]>,
    ) -> Result<Self, ModelError> {
        let n = matrix.len();
        if let Some((row, entries)) = matrix.iter().enumerate().find(|(_, r)| r.len() != n) {
            return Err(ModelError::MalformedAdjacency {
                row,
                len: entries.len(),
                expected: n,
            });
        }
        let bonds: Vec<(usize, usize)> = (0..n)
            .flat_map(|i| (i..n).map(move |j| (i, j)))
            .filter(|&(i, j)| matrix[i][j] != 0 || matrix[j][i] != 0)
            .collect();
        Self::from_bonds(n, atomic_numbers, &bonds)
    }

    fn with_vertices(num_atoms: usize, atomic_numbers: Option<&[u8]>) -> Result<Self, ModelError> {
        if num_atoms == 0 {
            return Err(ModelError::Empty);
        }
        if let Some(labels) = atomic_numbers {
            if labels.len() != num_atoms {
                return Err(ModelError::LabelLengthMismatch {
                    positions: num_atoms,
                    labels: labels.len(),
                });
            }
        }
        let mut graph = UnGraph::with_capacity(num_atoms, num_atoms);
        for idx in 0..num_atoms {
            graph.add_node(atomic_numbers.map_or(0, |labels| labels[idx]));
        }
        Ok(Self {
            graph,
            labeled: atomic_numbers.is_some(),
        })
    }

    pub fn num_vertices(&self) -> usize {
        self.graph.node_count()
    }

    pub fn num_edges(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_labeled(&self) -> bool {
        self.labeled
    }

    /// Atomic number stored on vertex `idx`, or `None` for unlabeled graphs and
    /// out-of-range indices.
    pub fn vertex_label(&self, idx: usize) -> Option<u8> {
        if !self.labeled {
            return None;
        }
        self.graph.node_weight(NodeIndex::new(idx)).copied()
    }

    pub fn has_edge(&self, atom1: usize, atom2: usize) -> bool {
        atom1 < self.num_vertices()
            && atom2 < self.num_vertices()
            && self
                .graph
                .find_edge(NodeIndex::new(atom1), NodeIndex::new(atom2))
                .is_some()
    }

    /// Returns the subgraph induced by `indices`; vertex `k` of the result is vertex
    /// `indices[k]` of `self`.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::IndexOutOfRange`] for an index past the end and
    /// [`ModelError::Empty`] if no vertex is kept.
    pub fn induced_subgraph(&self, indices: &[usize]) -> Result<Self, ModelError> {
        let n = self.num_vertices();
        let mut new_index = vec![None; n];
        for (k, &old) in indices.iter().enumerate() {
            if old >= n {
                return Err(ModelError::IndexOutOfRange {
                    index: old,
                    num_atoms: n,
                });
            }
            new_index[old] = Some(k);
        }
        let labels: Vec<u8> = indices
            .iter()
            .map(|&old| self.graph[NodeIndex::new(old)])
            .collect();
        let bonds: Vec<(usize, usize)> = self
            .graph
            .edge_references()
            .filter_map(|edge| {
                let a = new_index[edge.source().index()]?;
                let b = new_index[edge.target().index()]?;
                Some((a, b))
            })
            .collect();
        let mut sub = Self::from_bonds(indices.len(), Some(&labels), &bonds)?;
        sub.labeled = self.labeled;
        Ok(sub)
    }

    pub(crate) fn inner(&self) -> &UnGraph<u8, ()> {
        &self.graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ethanol_heavy() -> LabeledGraph {
        LabeledGraph::from_bonds(3, Some(&[6, 6, 8]), &[(0, 1), (1, 2)]).unwrap()
    }

    #[test]
    fn from_bonds_records_vertices_edges_and_labels() {
        let graph = ethanol_heavy();
        assert_eq!(graph.num_vertices(), 3);
        assert_eq!(graph.num_edges(), 2);
        assert!(graph.is_labeled());
        assert_eq!(graph.vertex_label(2), Some(8));
        assert!(graph.has_edge(1, 0));
        assert!(!graph.has_edge(0, 2));
    }

    #[test]
    fn from_bonds_collapses_duplicate_bonds() {
        let graph = LabeledGraph::from_bonds(2, None, &[(0, 1), (1, 0), (0, 1)]).unwrap();
        assert_eq!(graph.num_edges(), 1);
    }

    #[test]
    fn from_bonds_rejects_out_of_range_bond() {
        let result = LabeledGraph::from_bonds(2, None, &[(0, 2)]);
        assert!(matches!(
            result,
            Err(ModelError::BondOutOfRange { atom2: 2, .. })
        ));
    }

    #[test]
    fn from_bonds_rejects_label_count_mismatch() {
        let result = LabeledGraph::from_bonds(3, Some(&[6, 6]), &[]);
        assert!(matches!(result, Err(ModelError::LabelLengthMismatch { .. })));
    }

    #[test]
    fn unlabeled_graph_reports_no_vertex_labels() {
        let graph = LabeledGraph::from_bonds(2, None, &[(0, 1)]).unwrap();
        assert!(!graph.is_labeled());
        assert_eq!(graph.vertex_label(0), None);
    }

    #[test]
    fn from_adjacency_matrix_builds_cycle() {
        let matrix = vec![vec![0, 1, 1], vec![1, 0, 1], vec![1, 1, 0]];
        let graph = LabeledGraph::from_adjacency_matrix(&matrix, Some(&[6, 6, 6])).unwrap();
        assert_eq!(graph.num_vertices(), 3);
        assert_eq!(graph.num_edges(), 3);
    }

    #[test]
    fn from_adjacency_matrix_rejects_ragged_rows() {
        let matrix = vec![vec![0, 1], vec![1]];
        assert!(matches!(
            LabeledGraph::from_adjacency_matrix(&matrix, None),
            Err(ModelError::MalformedAdjacency { row: 1, .. })
        ));
    }

    #[test]
    fn induced_subgraph_keeps_edges_between_selected_vertices() {
        // H-O-H: drop the first hydrogen.
        let graph = LabeledGraph::from_bonds(3, Some(&[1, 8, 1]), &[(0, 1), (1, 2)]).unwrap();
        let sub = graph.induced_subgraph(&[1, 2]).unwrap();
        assert_eq!(sub.num_vertices(), 2);
        assert_eq!(sub.num_edges(), 1);
        assert_eq!(sub.vertex_label(0), Some(8));
        assert!(sub.has_edge(0, 1));
    }
}
