pub mod assignment;
pub mod plain;
pub mod symmetric;

use super::cancel::CancelFlag;
use super::config::{RmsdSettings, SymmetryMode};
use crate::core::error::RmsdError;
use crate::core::matching::assignment::AssignmentSolver;
use crate::core::matching::isomorphism::GraphMatcher;
use crate::core::models::molecule::MolecularStructure;
use crate::core::models::structure::Structure;
use tracing::instrument;

/// Computes the RMSD of one pair of molecules under `settings`.
///
/// The molecules are snapshotted (with their graphs only when isomorphism-based correction
/// is selected), optionally stripped of hydrogens, then routed to the plain, symmetric or
/// assignment computation.
#[instrument(skip_all, name = "compare_pair_task")]
pub fn compare_pair<M1, M2>(
    reference: &M1,
    target: &M2,
    settings: &RmsdSettings,
    matcher: &dyn GraphMatcher,
    solver: &dyn AssignmentSolver,
    cancel: &CancelFlag,
) -> Result<f64, RmsdError>
where
    M1: MolecularStructure + ?Sized,
    M2: MolecularStructure + ?Sized,
{
    let with_graph = settings.symmetry == SymmetryMode::Isomorphism;
    let mut structure1 = Structure::from_molecule(reference, with_graph)?;
    let mut structure2 = Structure::from_molecule(target, with_graph)?;
    if settings.strip_hydrogens {
        structure1 = structure1.without_hydrogens()?;
        structure2 = structure2.without_hydrogens()?;
    }
    compare_structures(&structure1, &structure2, settings, matcher, solver, cancel)
}

/// Computes the RMSD of two prepared structures under `settings`; hydrogen stripping is
/// assumed to have been applied already.
///
/// # Errors
///
/// Returns [`RmsdError::GraphMismatch`] if isomorphism-based correction is selected and
/// either structure was prepared without a graph.
pub fn compare_structures(
    structure1: &Structure,
    structure2: &Structure,
    settings: &RmsdSettings,
    matcher: &dyn GraphMatcher,
    solver: &dyn AssignmentSolver,
    cancel: &CancelFlag,
) -> Result<f64, RmsdError> {
    let (coords1, coords2) = (structure1.coords(), structure2.coords());
    match settings.symmetry {
        SymmetryMode::Disabled => plain::rmsd(coords1, coords2, settings.center, settings.minimize),
        SymmetryMode::Isomorphism => {
            let (Some(graph1), Some(graph2)) = (structure1.graph(), structure2.graph()) else {
                return Err(RmsdError::GraphMismatch {
                    reason: "structure was prepared without a connectivity graph".to_string(),
                });
            };
            symmetric::run(
                coords1,
                graph1,
                coords2,
                graph2,
                settings.minimize,
                settings.center,
                matcher,
                cancel,
            )
            .map(|outcome| outcome.rmsd)
        }
        SymmetryMode::Assignment => {
            let outcome = assignment::run(
                coords1,
                coords2,
                settings.center || settings.minimize,
                settings.assignment_cost,
                solver,
                cancel,
            )?;
            if settings.minimize {
                let matched = coords2.permuted(&outcome.permutation)?;
                plain::qcp_rmsd(coords1, &matched)
            } else {
                Ok(outcome.rmsd)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::matching::assignment::Hungarian;
    use crate::core::matching::isomorphism::Vf2Matcher;
    use crate::core::models::molecule::Molecule;
    use nalgebra::{Point3, Rotation3, Vector3};

    const TOLERANCE: f64 = 1e-6;

    // Water with its hydrogens listed in swapped order in the second copy.
    fn water_pair() -> (Molecule, Molecule) {
        let first = Molecule::new(
            vec![8, 1, 1],
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(0.96, 0.0, 0.0),
                Point3::new(-0.24, 0.93, 0.0),
            ],
            vec![(0, 1), (0, 2)],
        )
        .unwrap();
        let second = first.renumbered(&[0, 2, 1]).unwrap();
        (first, second)
    }

    // Carboxyl carbon with two equivalent oxygens and an out-of-plane carbon neighbor.
    fn carboxyl() -> Molecule {
        Molecule::new(
            vec![6, 8, 8, 6],
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.25, 0.0, 0.0),
                Point3::new(-0.6, 1.1, 0.0),
                Point3::new(1.0, -0.3, 1.2),
            ],
            vec![(0, 1), (0, 2), (0, 3)],
        )
        .unwrap()
    }

    fn settings(symmetry: SymmetryMode, minimize: bool, strip_hydrogens: bool) -> RmsdSettings {
        RmsdSettings {
            symmetry,
            minimize,
            strip_hydrogens,
            ..RmsdSettings::default()
        }
    }

    fn compare(
        mol1: &Molecule,
        mol2: &Molecule,
        settings: &RmsdSettings,
    ) -> Result<f64, RmsdError> {
        compare_pair(
            mol1,
            mol2,
            settings,
            &Vf2Matcher::default(),
            &Hungarian,
            &CancelFlag::new(),
        )
    }

    #[test]
    fn every_mode_recovers_zero_for_renumbered_copy_with_hydrogens() {
        let (first, second) = water_pair();
        for mode in [SymmetryMode::Isomorphism, SymmetryMode::Assignment] {
            let rmsd = compare(&first, &second, &settings(mode, false, false)).unwrap();
            assert!(rmsd < TOLERANCE, "{mode:?} gave {rmsd}");
        }
        let plain = compare(&first, &second, &settings(SymmetryMode::Disabled, false, false));
        assert!(plain.unwrap() > 0.5);
    }

    #[test]
    fn stripping_hydrogens_leaves_heavy_atoms_only() {
        let (first, second) = water_pair();
        let rmsd = compare(&first, &second, &settings(SymmetryMode::Disabled, false, true));
        assert_eq!(rmsd.unwrap(), 0.0);
    }

    #[test]
    fn minimized_modes_agree_on_rotated_renumbered_copy() {
        let mol = carboxyl();
        let rotation = Rotation3::from_euler_angles(0.2, 0.4, -0.9);
        let moved: Vec<_> = mol
            .coordinates()
            .iter()
            .map(|p| rotation * p + Vector3::new(0.5, 0.5, 0.5))
            .collect();
        let other = mol
            .with_coordinates(moved)
            .unwrap()
            .renumbered(&[0, 2, 1, 3])
            .unwrap();

        let isomorphism = compare(&mol, &other, &settings(SymmetryMode::Isomorphism, true, true));
        assert!(isomorphism.unwrap() < TOLERANCE);
        let plain = compare(&mol, &other, &settings(SymmetryMode::Disabled, true, true));
        assert!(plain.unwrap() > 0.3);
    }

    #[test]
    fn isomorphism_mode_requires_graphs_on_prepared_structures() {
        let mol = carboxyl();
        let structure = Structure::from_molecule(&mol, false).unwrap();
        let result = compare_structures(
            &structure,
            &structure,
            &settings(SymmetryMode::Isomorphism, false, false),
            &Vf2Matcher::default(),
            &Hungarian,
            &CancelFlag::new(),
        );
        assert!(matches!(result, Err(RmsdError::GraphMismatch { .. })));
    }

    #[test]
    fn disabled_mode_reports_element_mismatch() {
        let mol = carboxyl();
        let other = mol.renumbered(&[1, 0, 2, 3]).unwrap();
        let result = compare(&mol, &other, &settings(SymmetryMode::Disabled, false, false));
        assert!(matches!(result, Err(RmsdError::ShapeMismatch(_))));
    }
}
