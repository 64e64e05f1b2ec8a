//! U wrapping on closed reference lines

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use crate::ref_line::ReferenceLine;
use util::maths::wrap_into_range;

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ReferenceLine {
    /// Map `u_m` into the valid U range if the reference line is closed.
    ///
    /// On a closed line the last sample coincides with the first, so the
    /// result lies in `[u_first, u_last)` and `u_last` itself maps onto
    /// `u_first`. Open lines return `u_m` unchanged.
    pub fn wrap_u(&self, u_m: f64) -> f64 {
        if self.util.is_closed {
            wrap_into_range(u_m, self.u.first_m, self.u.last_m)
        } else {
            u_m
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
