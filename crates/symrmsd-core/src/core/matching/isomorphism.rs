use crate::core::models::graph::LabeledGraph;
use petgraph::algo::{is_isomorphic_matching, subgraph_isomorphisms_iter};
use std::ops::ControlFlow;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MatchError {
    #[error("{reason}")]
    NotIsomorphic { reason: String },

    #[error("graph has no atomic-number labels")]
    Unlabeled,
}

/// How to match graphs when atomic-number labels are missing on either side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LabelPolicy {
    /// Refuse to match unlabeled graphs.
    #[default]
    RequireLabels,
    /// Fall back to structure-only matching, which admits chemically invalid mappings.
    AllowStructureOnly,
}

/// A vertex correspondence between two isomorphic graphs.
///
/// Reordering the first graph by `first` and the second graph by `second` yields
/// identical adjacency and labels: vertex `first[k]` of graph 1 corresponds to vertex
/// `second[k]` of graph 2.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IsomorphismMapping {
    pub first: Vec<usize>,
    pub second: Vec<usize>,
}

impl IsomorphismMapping {
    pub fn len(&self) -> usize {
        self.first.len()
    }

    pub fn is_empty(&self) -> bool {
        self.first.is_empty()
    }
}

/// Graph isomorphism capability consumed by symmetry-corrected RMSD.
pub trait GraphMatcher: Send + Sync {
    /// Whether the two graphs are isomorphic under this matcher's label rules.
    fn is_isomorphic(&self, g1: &LabeledGraph, g2: &LabeledGraph) -> Result<bool, MatchError>;

    /// Feeds every isomorphism between `g1` and `g2` to `visit`, lazily, until the
    /// enumeration is exhausted or `visit` breaks. Returns the number of mappings visited.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError::NotIsomorphic`] if no isomorphism exists.
    fn for_each_isomorphism(
        &self,
        g1: &LabeledGraph,
        g2: &LabeledGraph,
        visit: &mut dyn FnMut(IsomorphismMapping) -> ControlFlow<()>,
    ) -> Result<usize, MatchError>;

    /// Collects all isomorphisms. The count can grow factorially with symmetry.
    fn isomorphisms(
        &self,
        g1: &LabeledGraph,
        g2: &LabeledGraph,
    ) -> Result<Vec<IsomorphismMapping>, MatchError> {
        let mut mappings = Vec::new();
        self.for_each_isomorphism(g1, g2, &mut |mapping| {
            mappings.push(mapping);
            ControlFlow::Continue(())
        })?;
        Ok(mappings)
    }
}

/// VF2 matcher backed by `petgraph`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Vf2Matcher {
    label_policy: LabelPolicy,
}

impl Vf2Matcher {
    pub fn new(label_policy: LabelPolicy) -> Self {
        Self { label_policy }
    }

    pub fn label_policy(&self) -> LabelPolicy {
        self.label_policy
    }

    fn compare_labels(&self, g1: &LabeledGraph, g2: &LabeledGraph) -> Result<bool, MatchError> {
        if g1.is_labeled() && g2.is_labeled() {
            return Ok(true);
        }
        match self.label_policy {
            LabelPolicy::RequireLabels => Err(MatchError::Unlabeled),
            LabelPolicy::AllowStructureOnly => {
                warn!(
                    "No atomic number information stored on graph vertices; \
                     matching on structure only, which admits chemically invalid mappings."
                );
                Ok(false)
            }
        }
    }

    fn precheck(g1: &LabeledGraph, g2: &LabeledGraph) -> Result<(), MatchError> {
        if g1.num_vertices() != g2.num_vertices() {
            return Err(MatchError::NotIsomorphic {
                reason: format!(
                    "vertex counts differ ({} vs {})",
                    g1.num_vertices(),
                    g2.num_vertices()
                ),
            });
        }
        if g1.num_edges() != g2.num_edges() {
            return Err(MatchError::NotIsomorphic {
                reason: format!(
                    "edge counts differ ({} vs {})",
                    g1.num_edges(),
                    g2.num_edges()
                ),
            });
        }
        Ok(())
    }
}

impl GraphMatcher for Vf2Matcher {
    fn is_isomorphic(&self, g1: &LabeledGraph, g2: &LabeledGraph) -> Result<bool, MatchError> {
        let compare_labels = self.compare_labels(g1, g2)?;
        if Self::precheck(g1, g2).is_err() {
            return Ok(false);
        }
        Ok(is_isomorphic_matching(
            g1.inner(),
            g2.inner(),
            |a: &u8, b: &u8| !compare_labels || a == b,
            |_: &(), _: &()| true,
        ))
    }

    fn for_each_isomorphism(
        &self,
        g1: &LabeledGraph,
        g2: &LabeledGraph,
        visit: &mut dyn FnMut(IsomorphismMapping) -> ControlFlow<()>,
    ) -> Result<usize, MatchError> {
        let compare_labels = self.compare_labels(g1, g2)?;
        Self::precheck(g1, g2)?;

        let (graph1, graph2) = (g1.inner(), g2.inner());
        let mut node_match = |a: &u8, b: &u8| !compare_labels || a == b;
        let mut edge_match = |_: &(), _: &()| true;
        let identity: Vec<usize> = (0..g1.num_vertices()).collect();

        let mut visited = 0;
        if let Some(mappings) =
            subgraph_isomorphisms_iter(&graph1, &graph2, &mut node_match, &mut edge_match)
        {
            for mapping in mappings {
                visited += 1;
                let flow = visit(IsomorphismMapping {
                    first: identity.clone(),
                    second: mapping,
                });
                if flow.is_break() {
                    break;
                }
            }
        }

        if visited == 0 {
            return Err(MatchError::NotIsomorphic {
                reason: "no label-preserving vertex correspondence exists".to_string(),
            });
        }
        Ok(visited)
    }
}
