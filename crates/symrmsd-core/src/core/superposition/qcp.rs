use crate::core::error::{RmsdError, ensure_same_len};
use crate::core::models::error::ModelError;
use crate::core::utils::geometry;
use nalgebra::{Matrix3, Matrix4, Point3};
use tracing::warn;

pub const DEFAULT_TOLERANCE: f64 = 1e-11;
pub const DEFAULT_MAX_ITERATIONS: usize = 50;

// Centroid offsets below this (scaled by the coordinate magnitude) count as centered.
const CENTERING_TOLERANCE: f64 = 1e-6;
// Radicands below this fraction of G1 + G2 are rounding noise around an exact fit.
const ZERO_RADICAND_TOLERANCE: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QcpOutcome {
    pub rmsd: f64,
    pub lambda_max: f64,
    pub iterations: usize,
    pub converged: bool,
}

/// Quaternion characteristic polynomial (Theobald, 2005) superposition.
///
/// Computes the RMSD after the optimal rigid rotation of the second set onto the
/// first without building the rotation: the largest eigenvalue of the 4x4 key matrix
/// is found by Newton-Raphson on its characteristic polynomial.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QcpSolver {
    pub tolerance: f64,
    /// Newton step budget; at least one step is always taken.
    pub max_iterations: usize,
}

impl Default for QcpSolver {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl QcpSolver {
    pub fn new(tolerance: f64, max_iterations: usize) -> Self {
        Self {
            tolerance,
            max_iterations,
        }
    }

    /// Superposes two centered, atom-corresponding point sets.
    ///
    /// # Errors
    ///
    /// Returns [`RmsdError::ShapeMismatch`] for sets of different length,
    /// [`RmsdError::Model`] for empty sets and [`RmsdError::NotCentered`] if either
    /// centroid is away from the origin. Failure to converge is not an error: the
    /// best estimate is returned with `converged == false`.
    pub fn superpose(
        &self,
        coords1: &[Point3<f64>],
        coords2: &[Point3<f64>],
    ) -> Result<QcpOutcome, RmsdError> {
        ensure_same_len(coords1.len(), coords2.len())?;
        if coords1.is_empty() {
            return Err(ModelError::Empty.into());
        }
        ensure_centered(coords1)?;
        ensure_centered(coords2)?;

        let m = cross_covariance(coords1, coords2);
        let g1 = geometry::squared_norm_sum(coords1);
        let g2 = geometry::squared_norm_sum(coords2);
        let k = key_matrix(&m);

        let c2 = -2.0 * (m.transpose() * m).trace();
        let c1 = -8.0 * m.determinant();
        let c0 = k.determinant();

        let (lambda_max, iterations, converged) =
            self.largest_eigenvalue(0.5 * (g1 + g2), c2, c1, c0);
        if !converged {
            warn!(
                iterations,
                lambda_max, "QCP eigenvalue iteration did not converge; using best estimate."
            );
        }

        let mut radicand = (g1 + g2 - 2.0 * lambda_max).max(0.0);
        if radicand <= ZERO_RADICAND_TOLERANCE * (g1 + g2) {
            radicand = 0.0;
        }
        Ok(QcpOutcome {
            rmsd: (radicand / coords1.len() as f64).sqrt(),
            lambda_max,
            iterations,
            converged,
        })
    }

    // The seed is an upper bound that reads as an exact fit; it is only returned when no
    // Newton step can be taken from it.
    fn largest_eigenvalue(&self, seed: f64, c2: f64, c1: f64, c0: f64) -> (f64, usize, bool) {
        let p = |x: f64| x.powi(4) + c2 * x * x + c1 * x + c0;
        let dp = |x: f64| 4.0 * x.powi(3) + 2.0 * c2 * x + c1;

        let limit = self.max_iterations.max(1);
        let mut x = seed;
        let mut best: Option<(f64, f64)> = None;
        for iteration in 0..limit {
            let value = p(x);
            if value == 0.0 {
                return (x, iteration, true);
            }
            let slope = dp(x);
            if slope == 0.0 || !slope.is_finite() {
                break;
            }
            let next = x - value / slope;
            if !next.is_finite() {
                break;
            }
            let step = (next - x).abs();
            x = next;
            let residual = p(x).abs();
            if best.is_none_or(|(_, current)| residual < current) {
                best = Some((x, residual));
            }
            if step <= self.tolerance * x.abs() {
                return (x, iteration + 1, true);
            }
        }
        (best.map_or(seed, |(estimate, _)| estimate), limit, false)
    }
}

/// Minimal RMSD over all rigid rotations of two centered, atom-corresponding sets.
pub fn minimal_rmsd(coords1: &[Point3<f64>], coords2: &[Point3<f64>]) -> Result<f64, RmsdError> {
    QcpSolver::default()
        .superpose(coords1, coords2)
        .map(|outcome| outcome.rmsd)
}

fn ensure_centered(coords: &[Point3<f64>]) -> Result<(), RmsdError> {
    let Some(c) = geometry::centroid(coords) else {
        return Ok(());
    };
    let scale = coords
        .iter()
        .map(|p| p.coords.amax())
        .fold(0.0_f64, f64::max);
    let offset = c.coords.norm();
    if offset > CENTERING_TOLERANCE * (1.0 + scale) {
        return Err(RmsdError::NotCentered { offset });
    }
    Ok(())
}

fn cross_covariance(coords1: &[Point3<f64>], coords2: &[Point3<f64>]) -> Matrix3<f64> {
    coords1
        .iter()
        .zip(coords2.iter())
        .fold(Matrix3::zeros(), |acc, (p1, p2)| {
            acc + p2.coords * p1.coords.transpose()
        })
}

#[rustfmt::skip]
fn key_matrix(m: &Matrix3<f64>) -> Matrix4<f64> {
    let (sxx, sxy, sxz) = (m[(0, 0)], m[(0, 1)], m[(0, 2)]);
    let (syx, syy, syz) = (m[(1, 0)], m[(1, 1)], m[(1, 2)]);
    let (szx, szy, szz) = (m[(2, 0)], m[(2, 1)], m[(2, 2)]);
    Matrix4::new(
        sxx + syy + szz, syz - szy,       szx - sxz,        sxy - syx,
        syz - szy,       sxx - syy - szz, sxy + syx,        szx + sxz,
        szx - sxz,       sxy + syx,       -sxx + syy - szz, syz + szy,
        sxy - syx,       szx + sxz,       syz + szy,        -sxx - syy + szz,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{Rotation3, Vector3};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    const TOLERANCE: f64 = 1e-6;

    fn f64_approx_equal(a: f64, b: f64) -> bool {
        (a - b).abs() < TOLERANCE
    }

    fn random_cloud(rng: &mut StdRng, n: usize) -> Vec<Point3<f64>> {
        let points: Vec<Point3<f64>> = (0..n)
            .map(|_| {
                Point3::new(
                    rng.gen_range(-5.0..5.0),
                    rng.gen_range(-5.0..5.0),
                    rng.gen_range(-5.0..5.0),
                )
            })
            .collect();
        geometry::center(&points)
    }

    fn random_rotation(rng: &mut StdRng) -> Rotation3<f64> {
        Rotation3::from_euler_angles(
            rng.gen_range(-3.1..3.1),
            rng.gen_range(-1.5..1.5),
            rng.gen_range(-3.1..3.1),
        )
    }

    fn rotate(points: &[Point3<f64>], rotation: &Rotation3<f64>) -> Vec<Point3<f64>> {
        points.iter().map(|p| rotation * p).collect()
    }

    fn kabsch_rmsd(coords1: &[Point3<f64>], coords2: &[Point3<f64>]) -> f64 {
        let h = coords1
            .iter()
            .zip(coords2)
            .fold(Matrix3::zeros(), |acc, (p1, p2)| {
                acc + p2.coords * p1.coords.transpose()
            });
        let svd = h.svd(true, true);
        let u = svd.u.unwrap();
        let v_t = svd.v_t.unwrap();
        let d = (v_t.transpose() * u.transpose()).determinant().signum();
        let correction = Matrix3::from_diagonal(&Vector3::new(1.0, 1.0, d));
        let rotation = v_t.transpose() * correction * u.transpose();
        let moved: Vec<Point3<f64>> = coords2
            .iter()
            .map(|p| Point3::from(rotation * p.coords))
            .collect();
        geometry::calculate_rmsd(coords1, &moved).unwrap()
    }

    #[test]
    fn minimal_rmsd_of_identical_sets_is_zero() {
        let mut rng = StdRng::seed_from_u64(7);
        let cloud = random_cloud(&mut rng, 12);
        assert_eq!(minimal_rmsd(&cloud, &cloud).unwrap(), 0.0);
    }

    #[test]
    fn minimal_rmsd_of_rotated_copy_is_zero() {
        let mut rng = StdRng::seed_from_u64(11);
        let cloud = random_cloud(&mut rng, 20);
        let rotated = rotate(&cloud, &random_rotation(&mut rng));
        assert!(minimal_rmsd(&cloud, &rotated).unwrap() < TOLERANCE);
    }

    #[test]
    fn minimal_rmsd_is_invariant_under_rotation_of_second_set() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..10 {
            let a = random_cloud(&mut rng, 15);
            let b = random_cloud(&mut rng, 15);
            let reference = minimal_rmsd(&a, &b).unwrap();
            let rotated = rotate(&b, &random_rotation(&mut rng));
            assert!(f64_approx_equal(minimal_rmsd(&a, &rotated).unwrap(), reference));
        }
    }

    #[test]
    fn minimal_rmsd_matches_svd_superposition() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..10 {
            let a = random_cloud(&mut rng, 9);
            let b = random_cloud(&mut rng, 9);
            assert!(f64_approx_equal(
                minimal_rmsd(&a, &b).unwrap(),
                kabsch_rmsd(&a, &b)
            ));
        }
    }

    #[test]
    fn minimal_rmsd_never_exceeds_plain_rmsd() {
        let mut rng = StdRng::seed_from_u64(5);
        let a = random_cloud(&mut rng, 8);
        let b = random_cloud(&mut rng, 8);
        let plain = geometry::calculate_rmsd(&a, &b).unwrap();
        assert!(minimal_rmsd(&a, &b).unwrap() <= plain + TOLERANCE);
    }

    #[test]
    fn minimal_rmsd_of_single_atom_is_zero() {
        let origin = [Point3::origin()];
        assert_eq!(minimal_rmsd(&origin, &origin).unwrap(), 0.0);
    }

    #[test]
    fn superpose_reports_convergence() {
        let mut rng = StdRng::seed_from_u64(19);
        let a = random_cloud(&mut rng, 10);
        let b = random_cloud(&mut rng, 10);
        let outcome = QcpSolver::default().superpose(&a, &b).unwrap();
        assert!(outcome.converged);
        assert!(outcome.iterations <= DEFAULT_MAX_ITERATIONS);
    }

    #[test]
    fn superpose_with_zero_budget_still_takes_one_newton_step() {
        let mut rng = StdRng::seed_from_u64(23);
        let a = random_cloud(&mut rng, 10);
        let b = random_cloud(&mut rng, 10);
        let full = QcpSolver::default().superpose(&a, &b).unwrap();
        let outcome = QcpSolver::new(DEFAULT_TOLERANCE, 0).superpose(&a, &b).unwrap();
        assert!(!outcome.converged);
        assert_eq!(outcome.iterations, 1);
        assert!(outcome.rmsd > 0.0);
        assert!(outcome.rmsd <= full.rmsd + TOLERANCE);
    }

    #[test]
    fn superpose_rejects_uncentered_input() {
        let a = [Point3::new(1.0, 0.0, 0.0), Point3::new(3.0, 0.0, 0.0)];
        let b = geometry::center(&a);
        assert!(matches!(
            minimal_rmsd(&a, &b),
            Err(RmsdError::NotCentered { .. })
        ));
    }

    #[test]
    fn superpose_rejects_length_mismatch() {
        let a = [Point3::origin()];
        let b = geometry::center(&[Point3::origin(), Point3::new(1.0, 0.0, 0.0)]);
        assert!(matches!(
            minimal_rmsd(&a, &b),
            Err(RmsdError::ShapeMismatch(_))
        ));
    }

    #[test]
    fn superpose_rejects_empty_input() {
        assert!(matches!(
            minimal_rmsd(&[], &[]),
            Err(RmsdError::Model(ModelError::Empty))
        ));
    }
}
