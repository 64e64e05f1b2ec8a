//! Road (u/v) to cartesian (x/y) transformation

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::trace;

// Internal
use super::Xy;
use crate::ref_line::ReferenceLine;

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ReferenceLine {
    /// Transform a road position into a cartesian position.
    ///
    /// Inside the sampled range the position is interpolated on the segment
    /// containing `u_m`. Before the first and after the last sample the
    /// reference line is extended as a straight line along the first/last
    /// heading. Without geometry the identity `x = u`, `y = v` is returned.
    pub fn eval_uv_to_xy(&self, u_m: f64, v_m: f64) -> Xy {
        if !self.has_geometry() {
            trace!("uv -> xy without geometry, identity used for u/v = {}/{}", u_m, v_m);
            return Xy { x_m: u_m, y_m: v_m };
        }

        let u_m = self.wrap_u(u_m);
        let (index, frac) = self.locate_u(u_m);

        // Before the start, straight extension along the first heading
        if frac < 0.0 {
            let du_m = frac * self.u.inc_m;

            return Xy {
                x_m: self.x.first() + du_m * self.util.phi_first_cos
                    - v_m * self.util.phi_first_sin,
                y_m: self.y.first() + du_m * self.util.phi_first_sin
                    + v_m * self.util.phi_first_cos,
            };
        }

        // Beyond the end, straight extension along the last heading
        if frac > 1.0 {
            let du_m = (frac - 1.0) * self.u.inc_m;

            return Xy {
                x_m: self.x.last() + du_m * self.util.phi_last_cos
                    - v_m * self.util.phi_last_sin,
                y_m: self.y.last() + du_m * self.util.phi_last_sin
                    + v_m * self.util.phi_last_cos,
            };
        }

        self.segment_frame(index).position(frac, v_m).into()
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
