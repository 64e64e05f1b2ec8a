//! Cartesian (x/y) to road (u/v) transformation
//!
//! The forward transformation maps every segment of the reference line onto
//! a quadrilateral, bilinear in the fraction along the segment and the
//! lateral offset. Inverting it means solving that bilinear map for each
//! candidate segment, which is done with a Newton iteration started from the
//! orthogonal projection onto the segment. The straight extensions before
//! the start and after the end of open reference lines are inverted
//! directly.
//!
//! When several candidates contain the point (for example inside a tight
//! bend) the one closest to the centerline is chosen.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::trace;
use nalgebra::{Matrix2, Vector2};

// Internal
use super::{EvalError, SegmentFrame, Uv};
use crate::{contact_point::CpOptions, ref_line::ReferenceLine};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Tolerance on the segment fraction when accepting a solution, so that
/// points on a joint are found from both neighbouring segments.
const FRAC_TOLERANCE: f64 = 1.0e-9;

/// Initial fraction guesses outside of this range are not iterated on.
const FRAC_SEARCH_RANGE: (f64, f64) = (-1.0, 2.0);

/// Residual, relative to the segment length, below which the iteration is
/// considered converged whatever the step size.
const RESIDUAL_REL_TOLERANCE: f64 = 1.0e-12;

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ReferenceLine {
    /// Transform a cartesian position into a road position.
    ///
    /// Without geometry the identity `u = x`, `v = y` is returned. If no
    /// segment or extension of the reference line contains the point an
    /// `EvalError::InverseNotConverged` is returned.
    pub fn eval_xy_to_uv(
        &self,
        options: &CpOptions,
        x_m: f64,
        y_m: f64,
    ) -> Result<Uv, EvalError> {
        if !self.has_geometry() {
            trace!("xy -> uv without geometry, identity used for x/y = {}/{}", x_m, y_m);
            return Ok(Uv { u_m: x_m, v_m: y_m });
        }

        let q = Vector2::new(x_m, y_m);
        let mut best: Option<Uv> = None;

        let mut consider = |candidate: Uv| match best {
            Some(b) if b.v_m.abs() <= candidate.v_m.abs() => (),
            _ => best = Some(candidate),
        };

        // Straight extensions only exist on open reference lines
        if !self.util.is_closed {
            if let Some(uv) = self.invert_before_start(&q) {
                consider(uv);
            }
            if let Some(uv) = self.invert_beyond_end(&q) {
                consider(uv);
            }
        }

        for index in 0..self.u.num - 1 {
            let frame = self.segment_frame(index);

            if let Some((frac, v_m)) = invert_segment(&frame, &q, options) {
                consider(Uv {
                    u_m: self.u.first_m + (index as f64 + frac) * self.u.inc_m,
                    v_m,
                });
            }
        }

        best.ok_or(EvalError::InverseNotConverged { x_m, y_m })
    }

    /// Invert the straight extension before the first sample.
    fn invert_before_start(&self, q: &Vector2<f64>) -> Option<Uv> {
        let w = q - self.point(0);
        let (c, s) = (self.util.phi_first_cos, self.util.phi_first_sin);

        let du_m = w.x * c + w.y * s;

        if du_m < 0.0 {
            Some(Uv {
                u_m: self.u.first_m + du_m,
                v_m: -w.x * s + w.y * c,
            })
        } else {
            None
        }
    }

    /// Invert the straight extension beyond the last sample.
    fn invert_beyond_end(&self, q: &Vector2<f64>) -> Option<Uv> {
        let w = q - self.point(self.u.num - 1);
        let (c, s) = (self.util.phi_last_cos, self.util.phi_last_sin);

        let du_m = w.x * c + w.y * s;

        if du_m > 0.0 {
            Some(Uv {
                u_m: self.u.last_m + du_m,
                v_m: -w.x * s + w.y * c,
            })
        } else {
            None
        }
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Solve `frame.position(frac, v) = q` for `(frac, v)`.
///
/// The iteration runs relative to `frame.p1` so that its precision does not
/// depend on how far the road is from the origin.
///
/// Returns `None` if the iteration does not converge or if the solution lies
/// outside of the segment.
fn invert_segment(
    frame: &SegmentFrame,
    q: &Vector2<f64>,
    options: &CpOptions,
) -> Option<(f64, f64)> {
    let d = frame.p2 - frame.p1;
    let e = frame.n2 - frame.n1;

    let len_sq = d.norm_squared();
    if len_sq < crate::geom::GEOM_EPS {
        return None;
    }
    let len_m = len_sq.sqrt();
    let residual_tol_m = options
        .inverse_tolerance_m
        .max(RESIDUAL_REL_TOLERANCE * len_m);

    // Start from the orthogonal projection onto the segment
    let w = q - frame.p1;
    let mut frac = w.dot(&d) / len_sq;
    let mut v_m = w.dot(&frame.n12);

    if frac < FRAC_SEARCH_RANGE.0 || frac > FRAC_SEARCH_RANGE.1 {
        return None;
    }

    let mut converged = false;

    for _ in 0..options.inverse_max_iterations {
        let residual = v_m * frame.n1 + frac * (d + v_m * e) - w;

        if residual.norm() <= residual_tol_m {
            converged = true;
            break;
        }

        // Columns are the partial derivatives by frac and by v
        let d_frac = d + v_m * e;
        let d_v = frame.n1 + frac * e;
        let jacobian = Matrix2::new(d_frac.x, d_v.x, d_frac.y, d_v.y);

        let step = jacobian.try_inverse()? * residual;

        frac -= step.x;
        v_m -= step.y;

        if step.x.abs() * len_m < options.inverse_tolerance_m
            && step.y.abs() < options.inverse_tolerance_m
        {
            converged = true;
            break;
        }
    }

    if !converged || !frac.is_finite() || !v_m.is_finite() {
        return None;
    }

    if frac < -FRAC_TOLERANCE || frac > 1.0 + FRAC_TOLERANCE {
        return None;
    }

    Some((frac.max(0.0).min(1.0), v_m))
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
