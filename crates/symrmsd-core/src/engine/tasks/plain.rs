use crate::core::error::{RmsdError, ShapeMismatch, ensure_same_atomic_numbers};
use crate::core::models::coords::CoordinateSet;
use crate::core::models::molecule::MolecularStructure;
use crate::core::superposition::qcp;
use crate::core::utils::geometry;

/// RMSD in input atom order, without rotation.
///
/// # Errors
///
/// Returns [`RmsdError::ShapeMismatch`] unless both sets have the same atomic numbers in
/// the same order.
pub fn dummy_rmsd(
    coords1: &CoordinateSet,
    coords2: &CoordinateSet,
    center: bool,
) -> Result<f64, RmsdError> {
    ensure_same_atomic_numbers(coords1.atomic_numbers(), coords2.atomic_numbers())?;
    let rmsd = if center {
        geometry::calculate_rmsd(coords1.centered().positions(), coords2.centered().positions())
    } else {
        geometry::calculate_rmsd(coords1.positions(), coords2.positions())
    };
    rmsd.ok_or_else(|| {
        ShapeMismatch::AtomCount {
            first: coords1.len(),
            second: coords2.len(),
        }
        .into()
    })
}

/// RMSD in input atom order after centering both sets and applying the optimal rotation.
pub fn qcp_rmsd(coords1: &CoordinateSet, coords2: &CoordinateSet) -> Result<f64, RmsdError> {
    ensure_same_atomic_numbers(coords1.atomic_numbers(), coords2.atomic_numbers())?;
    qcp::minimal_rmsd(
        coords1.centered().positions(),
        coords2.centered().positions(),
    )
}

/// Atom-order RMSD; `minimize` selects [`qcp_rmsd`] over [`dummy_rmsd`].
pub fn rmsd(
    coords1: &CoordinateSet,
    coords2: &CoordinateSet,
    center: bool,
    minimize: bool,
) -> Result<f64, RmsdError> {
    if minimize {
        qcp_rmsd(coords1, coords2)
    } else {
        dummy_rmsd(coords1, coords2, center)
    }
}

pub fn molecule_rmsd<M1, M2>(
    mol1: &M1,
    mol2: &M2,
    center: bool,
    minimize: bool,
) -> Result<f64, RmsdError>
where
    M1: MolecularStructure + ?Sized,
    M2: MolecularStructure + ?Sized,
{
    rmsd(&mol1.coordinate_set()?, &mol2.coordinate_set()?, center, minimize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::molecule::Molecule;
    use nalgebra::{Point3, Rotation3, Vector3};

    const TOLERANCE: f64 = 1e-9;

    fn f64_approx_equal(a: f64, b: f64) -> bool {
        (a - b).abs() < TOLERANCE
    }

    fn chain() -> CoordinateSet {
        CoordinateSet::new(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.5, 0.0, 0.0),
                Point3::new(2.0, 1.4, 0.0),
                Point3::new(3.5, 1.4, 0.3),
            ],
            vec![6, 6, 8, 6],
        )
        .unwrap()
    }

    #[test]
    fn identical_structures_give_zero_for_dummy_and_qcp() {
        let c = chain();
        assert_eq!(dummy_rmsd(&c, &c, false).unwrap(), 0.0);
        assert_eq!(qcp_rmsd(&c, &c).unwrap(), 0.0);
    }

    #[test]
    fn dummy_rmsd_of_translated_copy_is_translation_length_unless_centered() {
        let c = chain();
        let shifted = c.translated(&Vector3::new(0.0, 3.0, 4.0));
        assert!(f64_approx_equal(dummy_rmsd(&c, &shifted, false).unwrap(), 5.0));
        assert!(dummy_rmsd(&c, &shifted, true).unwrap() < TOLERANCE);
    }

    #[test]
    fn qcp_rmsd_removes_rigid_motion() {
        let c = chain();
        let rotation = Rotation3::from_euler_angles(0.3, -1.1, 2.0);
        let moved = CoordinateSet::new(
            c.positions()
                .iter()
                .map(|p| rotation * p + Vector3::new(5.0, -2.0, 1.0))
                .collect(),
            c.atomic_numbers().to_vec(),
        )
        .unwrap();
        assert!(dummy_rmsd(&c, &moved, false).unwrap() > 1.0);
        assert!(qcp_rmsd(&c, &moved).unwrap() < 1e-6);
    }

    #[test]
    fn rmsd_rejects_different_atomic_numbers() {
        let c = chain();
        let other = CoordinateSet::new(c.positions().to_vec(), vec![6, 6, 7, 6]).unwrap();
        assert!(matches!(
            rmsd(&c, &other, false, false),
            Err(RmsdError::ShapeMismatch(ShapeMismatch::AtomicNumber { index: 2, .. }))
        ));
        assert!(matches!(
            rmsd(&c, &other, false, true),
            Err(RmsdError::ShapeMismatch(_))
        ));
    }

    #[test]
    fn rmsd_rejects_different_atom_counts() {
        let c = chain();
        let shorter = c.select(&[0, 1, 2]).unwrap();
        assert!(matches!(
            rmsd(&c, &shorter, false, false),
            Err(RmsdError::ShapeMismatch(ShapeMismatch::AtomCount { first: 4, second: 3 }))
        ));
    }

    #[test]
    fn molecule_rmsd_reads_coordinates_through_the_structure_adapter() {
        let c = chain();
        let mol = Molecule::new(
            c.atomic_numbers().to_vec(),
            c.positions().to_vec(),
            vec![(0, 1), (1, 2), (2, 3)],
        )
        .unwrap();
        let rotation = Rotation3::from_euler_angles(0.2, 0.9, -0.5);
        let shifted = mol
            .with_coordinates(c.translated(&Vector3::new(0.0, 3.0, 4.0)).positions().to_vec())
            .unwrap();
        let moved = mol
            .with_coordinates(c.positions().iter().map(|p| rotation * p).collect())
            .unwrap();

        assert!(f64_approx_equal(molecule_rmsd(&mol, &shifted, false, false).unwrap(), 5.0));
        assert!(molecule_rmsd(&mol, &shifted, true, false).unwrap() < TOLERANCE);
        assert!(molecule_rmsd(&mol, &moved, false, true).unwrap() < 1e-6);
    }

    #[test]
    fn molecule_rmsd_rejects_molecules_with_different_elements() {
        let c = chain();
        let bonds = vec![(0, 1), (1, 2), (2, 3)];
        let mol = Molecule::new(c.atomic_numbers().to_vec(), c.positions().to_vec(), bonds.clone())
            .unwrap();
        let other = Molecule::new(vec![6, 6, 7, 6], c.positions().to_vec(), bonds).unwrap();
        assert!(matches!(
            molecule_rmsd(&mol, &other, false, false),
            Err(RmsdError::ShapeMismatch(ShapeMismatch::AtomicNumber { index: 2, .. }))
        ));
    }
}
