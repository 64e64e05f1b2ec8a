//! Small 2D vector helpers used by the evaluators

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::Vector2;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Magnitude under which vectors and dot products are treated as zero.
pub const GEOM_EPS: f64 = 1.0e-10;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Left hand normal of the line `from -> to`, not normalised.
pub fn normal(from: &Vector2<f64>, to: &Vector2<f64>) -> Vector2<f64> {
    let d = to - from;
    Vector2::new(-d.y, d.x)
}

/// Normalise the vector, leaving it untouched if its length is below
/// `GEOM_EPS`.
pub fn normalize(vec: Vector2<f64>) -> Vector2<f64> {
    let length = vec.norm();

    if length < GEOM_EPS {
        vec
    } else {
        vec / length
    }
}

/// Scale `n` by `1 / (n . reference)`, so that its projection onto the
/// reference normal has unit length.
///
/// Skipped if the dot product is below `GEOM_EPS`.
pub fn scale_onto(n: Vector2<f64>, reference: &Vector2<f64>) -> Vector2<f64> {
    let dot = n.dot(reference);

    if dot.abs() > GEOM_EPS {
        n / dot
    } else {
        n
    }
}

/// The z component of the cross product of two planar vectors.
pub fn cross(a: &Vector2<f64>, b: &Vector2<f64>) -> f64 {
    a.x * b.y - a.y * b.x
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_normal() {
        let n = normal(&Vector2::new(1.0, 1.0), &Vector2::new(3.0, 1.0));
        assert_eq!(n, Vector2::new(0.0, 2.0));
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(Vector2::new(0.0, 2.0)), Vector2::new(0.0, 1.0));

        // Degenerate vectors are left as they are
        let tiny = Vector2::new(1e-12, 0.0);
        assert_eq!(normalize(tiny), tiny);
    }

    #[test]
    fn test_scale_onto() {
        let reference = Vector2::new(0.0, 1.0);
        let n = normalize(Vector2::new(1.0, 1.0));
        let scaled = scale_onto(n, &reference);

        assert!((scaled.dot(&reference) - 1.0).abs() < 1e-12);

        // Perpendicular vectors are not scaled
        let perp = Vector2::new(1.0, 0.0);
        assert_eq!(scale_onto(perp, &reference), perp);
    }

    #[test]
    fn test_cross() {
        assert_eq!(cross(&Vector2::new(1.0, 0.0), &Vector2::new(0.0, 1.0)), 1.0);
        assert_eq!(cross(&Vector2::new(0.0, 1.0), &Vector2::new(1.0, 0.0)), -1.0);
    }
}
