use crate::core::error::{RmsdError, ensure_same_len};
use crate::core::matching::isomorphism::{GraphMatcher, IsomorphismMapping};
use crate::core::models::coords::CoordinateSet;
use crate::core::models::graph::LabeledGraph;
use crate::core::models::molecule::MolecularStructure;
use crate::core::superposition::qcp;
use crate::core::utils::geometry;
use crate::engine::cancel::CancelFlag;
use nalgebra::Point3;
use std::ops::ControlFlow;
use tracing::{debug, instrument};

/// Best correspondence found by [`run`].
#[derive(Debug, Clone, PartialEq)]
pub struct SymmetricOutcome {
    pub rmsd: f64,
    pub mapping: IsomorphismMapping,
    pub mappings_visited: usize,
}

/// Minimum RMSD over every isomorphism between `graph1` and `graph2`.
///
/// Each mapping reorders both coordinate sets; the candidate RMSD is the atom-order
/// RMSD of the reordered sets, superposed with QCP when `minimize` is set. `center` is
/// only honored without `minimize`, since superposition always centers. The enumeration
/// stops as soon as `cancel` is raised.
///
/// # Errors
///
/// - [`RmsdError::ShapeMismatch`] if the sets differ in atom count.
/// - [`RmsdError::GraphMismatch`] if the graphs are not isomorphic.
/// - [`RmsdError::UnlabeledGraph`] if labels are missing and the matcher requires them.
/// - [`RmsdError::Cancelled`] if `cancel` was raised before the enumeration finished.
#[instrument(skip_all, name = "symmetric_rmsd_task")]
#[allow(clippy::too_many_arguments)]
pub fn run(
    coords1: &CoordinateSet,
    graph1: &LabeledGraph,
    coords2: &CoordinateSet,
    graph2: &LabeledGraph,
    minimize: bool,
    center: bool,
    matcher: &dyn GraphMatcher,
    cancel: &CancelFlag,
) -> Result<SymmetricOutcome, RmsdError> {
    ensure_same_len(coords1.len(), coords2.len())?;
    ensure_same_len(graph1.num_vertices(), coords1.len())?;
    ensure_same_len(graph2.num_vertices(), coords2.len())?;

    // Reordering atoms leaves the centroid unchanged, so each set is centered once.
    let (positions1, positions2) = if minimize || center {
        (
            geometry::center(coords1.positions()),
            geometry::center(coords2.positions()),
        )
    } else {
        (coords1.positions().to_vec(), coords2.positions().to_vec())
    };

    let num_atoms = positions1.len();
    let mut reordered1 = Vec::with_capacity(num_atoms);
    let mut reordered2 = Vec::with_capacity(num_atoms);
    let mut best: Option<(f64, IsomorphismMapping)> = None;
    let mut failure: Option<RmsdError> = None;

    let visited = matcher.for_each_isomorphism(graph1, graph2, &mut |mapping| {
        if cancel.is_cancelled() {
            failure = Some(RmsdError::Cancelled);
            return ControlFlow::Break(());
        }
        if !is_valid_mapping(&mapping, num_atoms) {
            failure = Some(RmsdError::GraphMismatch {
                reason: format!("matcher produced a malformed mapping for {num_atoms} atoms"),
            });
            return ControlFlow::Break(());
        }
        gather_into(&positions1, &mapping.first, &mut reordered1);
        gather_into(&positions2, &mapping.second, &mut reordered2);

        match candidate_rmsd(&reordered1, &reordered2, minimize) {
            Ok(value) => {
                if best.as_ref().is_none_or(|(current, _)| value < *current) {
                    best = Some((value, mapping));
                }
                ControlFlow::Continue(())
            }
            Err(e) => {
                failure = Some(e);
                ControlFlow::Break(())
            }
        }
    })?;

    if let Some(err) = failure {
        return Err(err);
    }
    let (rmsd, mapping) = best.ok_or_else(|| RmsdError::GraphMismatch {
        reason: "no isomorphism was evaluated".to_string(),
    })?;
    debug!(rmsd, mappings_visited = visited, "Symmetry-corrected RMSD found.");
    Ok(SymmetricOutcome {
        rmsd,
        mapping,
        mappings_visited: visited,
    })
}

/// Symmetry-corrected RMSD between two molecules, using their own connectivity graphs.
///
/// No hydrogen stripping is applied here; callers that want it should compare
/// [`Structure::without_hydrogens`](crate::core::models::structure::Structure::without_hydrogens)
/// snapshots through [`super::compare_pair`].
pub fn symmetric_rmsd<M1, M2>(
    mol1: &M1,
    mol2: &M2,
    minimize: bool,
    center: bool,
    matcher: &dyn GraphMatcher,
) -> Result<f64, RmsdError>
where
    M1: MolecularStructure + ?Sized,
    M2: MolecularStructure + ?Sized,
{
    let (coords1, coords2) = (mol1.coordinate_set()?, mol2.coordinate_set()?);
    let (graph1, graph2) = (mol1.to_graph()?, mol2.to_graph()?);
    run(
        &coords1,
        &graph1,
        &coords2,
        &graph2,
        minimize,
        center,
        matcher,
        &CancelFlag::new(),
    )
    .map(|outcome| outcome.rmsd)
}

fn candidate_rmsd(
    coords1: &[Point3<f64>],
    coords2: &[Point3<f64>],
    minimize: bool,
) -> Result<f64, RmsdError> {
    if minimize {
        qcp::minimal_rmsd(coords1, coords2)
    } else {
        geometry::calculate_rmsd(coords1, coords2).ok_or_else(|| RmsdError::GraphMismatch {
            reason: "mapping produced sets of different sizes".to_string(),
        })
    }
}

fn is_valid_mapping(mapping: &IsomorphismMapping, num_atoms: usize) -> bool {
    mapping.first.len() == num_atoms
        && mapping.second.len() == num_atoms
        && mapping
            .first
            .iter()
            .chain(&mapping.second)
            .all(|&idx| idx < num_atoms)
}

fn gather_into(source: &[Point3<f64>], order: &[usize], target: &mut Vec<Point3<f64>>) {
    target.clear();
    target.extend(order.iter().map(|&idx| source[idx]));
}
