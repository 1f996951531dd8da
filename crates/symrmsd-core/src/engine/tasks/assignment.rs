use crate::core::error::{RmsdError, ensure_same_len};
use crate::core::matching::assignment::{AssignmentError, AssignmentSolver, Hungarian};
use crate::core::models::coords::CoordinateSet;
use crate::core::utils::geometry;
use crate::engine::cancel::CancelFlag;
use crate::engine::config::AssignmentCost;
use itertools::Itertools;
use nalgebra::{DMatrix, Point3};
use std::collections::HashMap;
use tracing::{debug, instrument};

/// Result of assignment-based correction.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentOutcome {
    pub rmsd: f64,
    /// `permutation[i]` is the atom of the second set matched to atom `i` of the first.
    pub permutation: Vec<usize>,
}

/// Approximate symmetry correction: matches same-element atoms by minimum-cost linear
/// assignment on geometry alone, then measures the atom-order RMSD of the matched pairs.
///
/// Bonds are ignored, so the result is a lower bound on the isomorphism-corrected RMSD
/// for the same poses when the cost is [`AssignmentCost::SquaredEuclidean`]. No rotation is
/// applied.
///
/// # Errors
///
/// - [`RmsdError::ShapeMismatch`] if the sets differ in atom count.
/// - [`RmsdError::LabelCountMismatch`] if an element occurs a different number of times.
/// - [`RmsdError::Cancelled`] if `cancel` was raised between element classes.
/// - [`RmsdError::Assignment`] if the solver rejects a cost matrix or returns columns that
///   are not a permutation of the class members.
#[instrument(skip_all, name = "assignment_rmsd_task")]
pub fn run(
    coords1: &CoordinateSet,
    coords2: &CoordinateSet,
    center: bool,
    cost: AssignmentCost,
    solver: &dyn AssignmentSolver,
    cancel: &CancelFlag,
) -> Result<AssignmentOutcome, RmsdError> {
    ensure_same_len(coords1.len(), coords2.len())?;

    let (positions1, positions2) = if center {
        (
            geometry::center(coords1.positions()),
            geometry::center(coords2.positions()),
        )
    } else {
        (coords1.positions().to_vec(), coords2.positions().to_vec())
    };

    let classes1 = group_by_element(coords1.atomic_numbers());
    let classes2 = group_by_element(coords2.atomic_numbers());
    check_populations(&classes1, &classes2)?;

    let mut permutation = vec![0; coords1.len()];
    for (atomic_number, members1) in classes1.iter().sorted_by_key(|(z, _)| **z) {
        if cancel.is_cancelled() {
            return Err(RmsdError::Cancelled);
        }
        let members2 = &classes2[atomic_number];
        let matrix = cost_matrix(&positions1, members1, &positions2, members2, cost);
        let columns = solver.solve(&matrix)?;
        ensure_permutation(&columns, members2.len())?;
        for (row, col) in columns.into_iter().enumerate() {
            permutation[members1[row]] = members2[col];
        }
        debug!(atomic_number, atoms = members1.len(), "Element class assigned.");
    }

    let matched: Vec<Point3<f64>> = permutation.iter().map(|&j| positions2[j]).collect();
    let rmsd = (geometry::squared_deviation_sum(&positions1, &matched) / matched.len() as f64)
        .sqrt();
    Ok(AssignmentOutcome { rmsd, permutation })
}

/// Assignment-corrected RMSD over raw points and labels, using the squared-distance cost
/// and the built-in Hungarian solver.
pub fn assignment_rmsd(
    coords1: &[Point3<f64>],
    coords2: &[Point3<f64>],
    labels1: &[u8],
    labels2: &[u8],
    center: bool,
) -> Result<AssignmentOutcome, RmsdError> {
    let set1 = CoordinateSet::new(coords1.to_vec(), labels1.to_vec())?;
    let set2 = CoordinateSet::new(coords2.to_vec(), labels2.to_vec())?;
    run(
        &set1,
        &set2,
        center,
        AssignmentCost::default(),
        &Hungarian,
        &CancelFlag::new(),
    )
}

fn ensure_permutation(columns: &[usize], expected: usize) -> Result<(), AssignmentError> {
    let invalid = AssignmentError::InvalidPermutation {
        len: columns.len(),
        expected,
    };
    if columns.len() != expected {
        return Err(invalid);
    }
    let mut seen = vec![false; expected];
    for &col in columns {
        if col >= expected || seen[col] {
            return Err(invalid);
        }
        seen[col] = true;
    }
    Ok(())
}

fn group_by_element(atomic_numbers: &[u8]) -> HashMap<u8, Vec<usize>> {
    atomic_numbers
        .iter()
        .enumerate()
        .map(|(idx, &z)| (z, idx))
        .into_group_map()
}

fn check_populations(
    classes1: &HashMap<u8, Vec<usize>>,
    classes2: &HashMap<u8, Vec<usize>>,
) -> Result<(), RmsdError> {
    let population = |classes: &HashMap<u8, Vec<usize>>, z: u8| classes.get(&z).map_or(0, Vec::len);
    let mismatch = classes1
        .keys()
        .chain(classes2.keys())
        .copied()
        .sorted()
        .dedup()
        .find(|&z| population(classes1, z) != population(classes2, z));
    match mismatch {
        Some(atomic_number) => Err(RmsdError::LabelCountMismatch {
            atomic_number,
            first: population(classes1, atomic_number),
            second: population(classes2, atomic_number),
        }),
        None => Ok(()),
    }
}

fn cost_matrix(
    positions1: &[Point3<f64>],
    members1: &[usize],
    positions2: &[Point3<f64>],
    members2: &[usize],
    cost: AssignmentCost,
) -> DMatrix<f64> {
    DMatrix::from_fn(members1.len(), members2.len(), |row, col| {
        let squared = (positions1[members1[row]] - positions2[members2[col]]).norm_squared();
        match cost {
            AssignmentCost::SquaredEuclidean => squared,
            AssignmentCost::Euclidean => squared.sqrt(),
        }
    })
}
