use nalgebra::{Point3, Vector3};

pub fn centroid(points: &[Point3<f64>]) -> Option<Point3<f64>> {
    if points.is_empty() {
        return None;
    }
    let sum = points
        .iter()
        .fold(Vector3::zeros(), |acc, p| acc + p.coords);
    Some(Point3::from(sum / points.len() as f64))
}

pub fn translate(points: &[Point3<f64>], offset: &Vector3<f64>) -> Vec<Point3<f64>> {
    points.iter().map(|p| p + offset).collect()
}

/// Returns a copy of `points` with its centroid moved to the origin.
pub fn center(points: &[Point3<f64>]) -> Vec<Point3<f64>> {
    match centroid(points) {
        Some(c) => translate(points, &-c.coords),
        None => Vec::new(),
    }
}

pub fn squared_norm_sum(points: &[Point3<f64>]) -> f64 {
    points.iter().map(|p| p.coords.norm_squared()).sum()
}

pub fn squared_deviation_sum(coords1: &[Point3<f64>], coords2: &[Point3<f64>]) -> f64 {
    coords1
        .iter()
        .zip(coords2.iter())
        .map(|(p1, p2)| (p1 - p2).norm_squared())
        .sum()
}

/// Plain coordinate-order RMSD, without any superposition.
pub fn calculate_rmsd(coords1: &[Point3<f64>], coords2: &[Point3<f64>]) -> Option<f64> {
    if coords1.len() != coords2.len() || coords1.is_empty() {
        return None;
    }
    let n = coords1.len() as f64;
    Some((squared_deviation_sum(coords1, coords2) / n).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-12;

    fn f64_approx_equal(a: f64, b: f64) -> bool {
        (a - b).abs() < TOLERANCE
    }

    #[test]
    fn centroid_of_empty_slice_is_none() {
        assert!(centroid(&[]).is_none());
    }

    #[test]
    fn centroid_is_arithmetic_mean_of_points() {
        let points = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(0.0, 4.0, 6.0),
        ];
        let c = centroid(&points).unwrap();
        assert!(f64_approx_equal(c.x, 2.0 / 3.0));
        assert!(f64_approx_equal(c.y, 4.0 / 3.0));
        assert!(f64_approx_equal(c.z, 2.0));
    }

    #[test]
    fn center_moves_centroid_to_origin_without_touching_input() {
        let points = vec![Point3::new(1.0, 1.0, 1.0), Point3::new(3.0, 5.0, -1.0)];
        let centered = center(&points);
        let c = centroid(&centered).unwrap();
        assert!(c.coords.norm() < TOLERANCE);
        assert_eq!(points[0], Point3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn calculate_rmsd_of_identical_sets_is_zero() {
        let points = [Point3::new(1.0, 2.0, 3.0), Point3::new(-1.0, 0.5, 2.0)];
        assert_eq!(calculate_rmsd(&points, &points), Some(0.0));
    }

    #[test]
    fn calculate_rmsd_of_uniform_shift_equals_shift_length() {
        let a = [Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0)];
        let b = [Point3::new(0.0, 3.0, 4.0), Point3::new(1.0, 3.0, 4.0)];
        assert!(f64_approx_equal(calculate_rmsd(&a, &b).unwrap(), 5.0));
    }

    #[test]
    fn calculate_rmsd_rejects_mismatched_or_empty_inputs() {
        let a = [Point3::new(0.0, 0.0, 0.0)];
        let b = [Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0)];
        assert!(calculate_rmsd(&a, &b).is_none());
        assert!(calculate_rmsd(&[], &[]).is_none());
    }

    #[test]
    fn squared_norm_sum_adds_squared_lengths() {
        let points = [Point3::new(1.0, 2.0, 2.0), Point3::new(0.0, 0.0, 2.0)];
        assert!(f64_approx_equal(squared_norm_sum(&points), 13.0));
    }
}
