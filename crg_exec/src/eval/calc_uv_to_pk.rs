//! Road (u/v) to heading and curvature calculations

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::trace;

// Internal
use super::Pk;
use crate::{contact_point::CpOptions, geom::cross, ref_line::ReferenceLine};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Length of road either side of the evaluated sample used to estimate the
/// curvature.
///
/// Units: meters
pub const CURV_BASELINE_M: f64 = 0.5;

/// Curvatures at or below this magnitude are not corrected for the lateral
/// offset.
///
/// Units: 1/meters
const LATERAL_CURV_EPS_M: f64 = 1.0e-10;

/// Distance to the center of curvature under which the evaluated point is
/// considered to be on the center.
///
/// Units: meters
pub const CURV_CENTER_EPS_M: f64 = 1.0e-6;

/// Curvature reported when evaluating on the center of curvature.
///
/// Units: 1/meters
pub const MAX_CURV_M: f64 = 1.0e6;

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ReferenceLine {
    /// Calculate the heading and curvature of the road at a road position.
    ///
    /// The heading is the one stored for the sample at or before `u_m`, it is
    /// not interpolated as the centerline is straight between samples. The
    /// curvature is estimated from the centerline points `CURV_BASELINE_M`
    /// either side of that sample. Too close to either end the heading of the
    /// first/last sample and a zero curvature are returned.
    ///
    /// With `CurvMode::Lateral` the curvature is that of the path offset by
    /// `v_m` from the centerline.
    pub fn eval_uv_to_pk(&self, options: &CpOptions, u_m: f64, v_m: f64) -> Pk {
        if !self.has_geometry() {
            trace!("uv -> pk without geometry, zero used for u/v = {}/{}", u_m, v_m);
            return Pk::default();
        }

        let u_m = self.wrap_u(u_m);
        let (index, _) = self.locate_u(u_m);
        let n_u = self.curv_span();

        // Not enough road behind the sample
        if n_u > index {
            return Pk {
                phi_rad: self.phi.first(),
                curv_m: 0.0,
            };
        }

        // Not enough road ahead of the sample
        if index + n_u >= self.phi.len() {
            return Pk {
                phi_rad: self.phi.last(),
                curv_m: 0.0,
            };
        }

        // Cross product of the two chords P0->P1 and P1->P2, normalised by
        // the cube of the chord length. Approximates dphi/ds.
        let p0 = self.point(index - n_u);
        let p1 = self.point(index);
        let p2 = self.point(index + n_u);

        let chord_m = self.u.inc_m * n_u as f64;
        let mut curv_m = cross(&(p1 - p0), &(p2 - p1)) / chord_m.powi(3);

        if options.is_curv_lateral() && curv_m.abs() > LATERAL_CURV_EPS_M {
            let radius_m = 1.0 / curv_m - v_m;

            curv_m = if radius_m.abs() < CURV_CENTER_EPS_M {
                MAX_CURV_M
            } else {
                1.0 / radius_m
            };
        }

        Pk {
            phi_rad: self.phi.data()[index],
            curv_m,
        }
    }

    /// Number of samples spanning `CURV_BASELINE_M`, at least 1.
    pub fn curv_span(&self) -> usize {
        ((CURV_BASELINE_M / self.u.inc_m) as usize).max(1)
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::contact_point::CurvMode;
    use approx::assert_abs_diff_eq;

    fn lateral() -> CpOptions {
        CpOptions {
            curv_mode: CurvMode::Lateral,
            ..Default::default()
        }
    }

    fn ref_line_mode() -> CpOptions {
        CpOptions {
            curv_mode: CurvMode::RefLine,
            ..Default::default()
        }
    }

    fn straight(num: usize, u_inc_m: f64) -> ReferenceLine {
        ReferenceLine::from_headings(0.0, u_inc_m, 0.0, 0.0, vec![0.0; num]).unwrap()
    }

    fn circle(radius_m: f64, u_inc_m: f64, num: usize) -> ReferenceLine {
        let dphi = u_inc_m / radius_m;

        ReferenceLine::from_headings(
            0.0,
            u_inc_m,
            0.0,
            0.0,
            (0..num).map(|i| (i as f64 + 0.5) * dphi).collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_curv_span() {
        assert_eq!(straight(10, 1.0).curv_span(), 1);
        assert_eq!(straight(10, 0.5).curv_span(), 1);
        assert_eq!(straight(10, 0.1).curv_span(), 5);
        assert_eq!(straight(10, 0.01).curv_span(), 50);
    }

    #[test]
    fn test_straight_road() {
        let rl = straight(6, 1.0);

        let pk = rl.eval_uv_to_pk(&lateral(), 2.5, 1.0);
        assert_eq!(pk, Pk { phi_rad: 0.0, curv_m: 0.0 });

        // Zero everywhere in the interior, independent of v
        for i in 0..100 {
            let u_m = 1.0 + i as f64 * 0.03;
            for v_m in &[-3.0, 0.0, 2.0] {
                assert_eq!(rl.eval_uv_to_pk(&lateral(), u_m, *v_m).curv_m, 0.0);
            }
        }
    }

    #[test]
    fn test_boundaries() {
        let rl = circle(10.0, 0.1, 100);
        let n_u = rl.curv_span();
        assert_eq!(n_u, 5);

        // Within n_u samples of the start
        for i in 0..n_u {
            let pk = rl.eval_uv_to_pk(&lateral(), i as f64 * 0.1 + 0.05, 0.5);
            assert_eq!(pk.phi_rad, rl.phi().first());
            assert_eq!(pk.curv_m, 0.0);
        }

        // Before the start
        let pk = rl.eval_uv_to_pk(&lateral(), -4.0, 0.0);
        assert_eq!(pk.phi_rad, rl.phi().first());
        assert_eq!(pk.curv_m, 0.0);

        // Within n_u samples of the end and beyond
        for u_m in &[9.55, 9.9, 12.0] {
            let pk = rl.eval_uv_to_pk(&lateral(), *u_m, 0.5);
            assert_eq!(pk.phi_rad, rl.phi().last());
            assert_eq!(pk.curv_m, 0.0);
        }

        // First interior sample
        let pk = rl.eval_uv_to_pk(&lateral(), 0.55, 0.0);
        assert_eq!(pk.phi_rad, rl.phi().data()[5]);
        assert!(pk.curv_m > 0.0);
    }

    #[test]
    fn test_heading_is_step() {
        let rl = circle(10.0, 0.1, 100);

        // Heading is constant across a segment
        let a = rl.eval_uv_to_pk(&ref_line_mode(), 3.01, 0.0);
        let b = rl.eval_uv_to_pk(&ref_line_mode(), 3.09, 0.0);
        assert_eq!(a.phi_rad, b.phi_rad);
        assert_eq!(a.phi_rad, rl.phi().data()[30]);
    }

    #[test]
    fn test_circle_curvature() {
        let radius_m = 10.0;
        let rl = circle(radius_m, 0.1, 200);

        for u_m in &[1.0, 5.0, 12.34, 19.0] {
            let pk = rl.eval_uv_to_pk(&ref_line_mode(), *u_m, 0.0);
            assert_abs_diff_eq!(pk.curv_m, 1.0 / radius_m, epsilon = 1e-3);
        }

        // Turning right gives a negative curvature
        let right = ReferenceLine::from_headings(
            0.0,
            0.1,
            0.0,
            0.0,
            (0..200).map(|i| -(i as f64 + 0.5) * 0.01).collect(),
        )
        .unwrap();
        let pk = right.eval_uv_to_pk(&ref_line_mode(), 10.0, 0.0);
        assert_abs_diff_eq!(pk.curv_m, -0.1, epsilon = 1e-3);
    }

    #[test]
    fn test_ref_line_mode_ignores_v() {
        let rl = circle(10.0, 0.1, 200);

        let base = rl.eval_uv_to_pk(&ref_line_mode(), 7.3, 0.0);
        for v_m in &[-5.0, -1.0, 1.0, 5.0, 10.0] {
            assert_eq!(rl.eval_uv_to_pk(&ref_line_mode(), 7.3, *v_m), base);
        }
    }

    #[test]
    fn test_lateral_correction() {
        let rl = circle(10.0, 0.1, 200);

        let curv_0 = rl.eval_uv_to_pk(&lateral(), 7.3, 0.0).curv_m;
        let radius_m = 1.0 / curv_0;

        // Inside the bend the curvature grows, outside it shrinks
        let inside = rl.eval_uv_to_pk(&lateral(), 7.3, 2.0).curv_m;
        let outside = rl.eval_uv_to_pk(&lateral(), 7.3, -2.0).curv_m;
        assert_abs_diff_eq!(inside, 1.0 / (radius_m - 2.0), epsilon = 1e-12);
        assert_abs_diff_eq!(outside, 1.0 / (radius_m + 2.0), epsilon = 1e-12);

        // Beyond the center the sense of the curvature flips
        let beyond = rl.eval_uv_to_pk(&lateral(), 7.3, 2.0 * radius_m).curv_m;
        assert!(beyond < 0.0);
    }

    #[test]
    fn test_center_of_curvature_sentinel() {
        let rl = circle(10.0, 0.1, 200);

        let curv_0 = rl.eval_uv_to_pk(&lateral(), 7.3, 0.0).curv_m;
        assert_abs_diff_eq!(curv_0, 0.1, epsilon = 1e-3);

        // Evaluating exactly on the center of curvature
        let pk = rl.eval_uv_to_pk(&lateral(), 7.3, 1.0 / curv_0);
        assert_eq!(pk.curv_m, MAX_CURV_M);
        assert!(pk.curv_m.is_finite());

        // Close to the center, within the tolerance
        let pk = rl.eval_uv_to_pk(&lateral(), 7.3, 1.0 / curv_0 + 0.5e-6);
        assert_eq!(pk.curv_m, MAX_CURV_M);
    }

    #[test]
    fn test_no_geometry() {
        let rl = ReferenceLine::without_geometry(0.0, 0.1, 100).unwrap();

        assert_eq!(rl.eval_uv_to_pk(&lateral(), 3.0, 1.0), Pk::default());
    }
}
