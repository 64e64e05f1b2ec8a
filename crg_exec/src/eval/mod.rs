//! # Evaluation module
//!
//! Stateless evaluations of a reference line:
//!
//! - `eval_uv_to_xy`: road coordinates to a cartesian position.
//! - `eval_uv_to_pk`: road coordinates to the local heading and curvature.
//! - `eval_xy_to_uv`: a cartesian position back to road coordinates.
//!
//! All of them are implemented on `ReferenceLine`. When the reference line
//! has no geometry they fall back to the identity (`x = u`, `y = v`) or to
//! zero heading and curvature. Only the inverse transform can fail, when no
//! part of the road contains the position.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod calc_uv_to_pk;
mod calc_uv_to_xy;
mod calc_xy_to_uv;
mod wrap;

pub use calc_uv_to_pk::{CURV_BASELINE_M, CURV_CENTER_EPS_M, MAX_CURV_M};

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Vector2;
use serde::Serialize;

// Internal
use crate::{
    data_store::CpId,
    geom::{normal, normalize, scale_onto},
    ref_line::ReferenceLine,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A cartesian position.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Xy {
    pub x_m: f64,
    pub y_m: f64,
}

/// A road position, `u` along the reference line and `v` lateral to it.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Uv {
    pub u_m: f64,
    pub v_m: f64,
}

/// The heading and curvature of the road at a position.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Pk {
    /// Heading, angle to the +ve x axis.
    ///
    /// Units: radians
    pub phi_rad: f64,

    /// Curvature, positive when turning left.
    ///
    /// Units: 1/meters
    pub curv_m: f64,
}

/// The geometry of one segment of the reference line needed to map lateral
/// offsets onto it.
///
/// A road position in the segment is `a + frac * (b - a)` with
/// `a = p1 + v * n1` and `b = p2 + v * n2`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SegmentFrame {
    pub p1: Vector2<f64>,
    pub p2: Vector2<f64>,

    /// Unit normal of the segment itself
    pub n12: Vector2<f64>,

    /// Lateral direction at `p1`, scaled to unit projection on `n12`
    pub n1: Vector2<f64>,

    /// Lateral direction at `p2`, scaled to unit projection on `n12`
    pub n2: Vector2<f64>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors reported by evaluations.
///
/// In every case the outputs of the evaluation still hold a defined fallback
/// value.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum EvalError {
    #[error("No contact point with id {0}")]
    UnknownContactPoint(CpId),

    #[error("The reference line has no x/y geometry, fallback values were used")]
    NoGeometry,

    #[error("Could not find a road position for x/y = {x_m:.4}/{y_m:.4}")]
    InverseNotConverged { x_m: f64, y_m: f64 },
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ReferenceLine {
    /// Find the segment containing `u_m`.
    ///
    /// Returns the index of the segment's first sample, always in
    /// `[0, num_samples - 2]`, and the fraction of `u_m` along it. The
    /// fraction is negative before the first sample and above 1 after the
    /// last one.
    pub(crate) fn locate_u(&self, u_m: f64) -> (usize, f64) {
        let frac = (u_m - self.u.first_m) / self.u.inc_m;

        let index = if frac < 0.0 {
            0
        } else {
            (frac as usize).min(self.u.num - 2)
        };

        (index, frac - index as f64)
    }

    /// Build the lateral frame of the segment starting at `index`.
    ///
    /// The lateral direction at each end blends in the neighbouring segment
    /// (the normal of `p0 -> p2` at `p1`, of `p1 -> p3` at `p2`), so that
    /// offset curves stay continuous across segment joints.
    pub(crate) fn segment_frame(&self, index: usize) -> SegmentFrame {
        let p1 = self.point(index);
        let p2 = self.point(index + 1);

        let n12 = normalize(normal(&p1, &p2));

        let n1 = if index > 0 {
            normalize(normal(&self.point(index - 1), &p2))
        } else {
            n12
        };

        let n2 = if index + 2 < self.u.num {
            normalize(normal(&p1, &self.point(index + 2)))
        } else {
            n12
        };

        SegmentFrame {
            p1,
            p2,
            n12,
            n1: scale_onto(n1, &n12),
            n2: scale_onto(n2, &n12),
        }
    }
}

impl SegmentFrame {
    /// The cartesian position at `frac` along the segment and `v_m` lateral
    /// to it.
    pub fn position(&self, frac: f64, v_m: f64) -> Vector2<f64> {
        let a = self.p1 + v_m * self.n1;
        let b = self.p2 + v_m * self.n2;

        a + frac * (b - a)
    }
}

impl From<Vector2<f64>> for Xy {
    fn from(v: Vector2<f64>) -> Self {
        Self { x_m: v.x, y_m: v.y }
    }
}

impl From<Xy> for Vector2<f64> {
    fn from(xy: Xy) -> Self {
        Vector2::new(xy.x_m, xy.y_m)
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_locate_u() {
        let rl = ReferenceLine::from_points(
            1.0,
            0.5,
            vec![0.0, 1.0, 2.0, 3.0],
            vec![0.0, 0.0, 0.0, 0.0],
        )
        .unwrap();

        assert_eq!(rl.locate_u(1.0), (0, 0.0));
        assert_eq!(rl.locate_u(1.75), (1, 0.5));
        assert_eq!(rl.locate_u(0.5), (0, -1.0));

        // The last sample belongs to the last segment
        assert_eq!(rl.locate_u(2.5), (2, 1.0));
        assert_eq!(rl.locate_u(3.5), (2, 3.0));
    }

    #[test]
    fn test_segment_frame_straight() {
        let rl = ReferenceLine::from_points(
            0.0,
            1.0,
            vec![0.0, 1.0, 2.0],
            vec![0.0, 0.0, 0.0],
        )
        .unwrap();

        let frame = rl.segment_frame(0);
        assert_eq!(frame.n12, Vector2::new(0.0, 1.0));
        assert_eq!(frame.n1, Vector2::new(0.0, 1.0));
        assert_eq!(frame.n2, Vector2::new(0.0, 1.0));
        assert_eq!(frame.position(0.25, 2.0), Vector2::new(0.25, 2.0));
    }
}
