//! # Contact point
//!
//! A contact point binds one reference line to a small cursor holding the
//! last queried and last computed position. Every evaluation overwrites the
//! cursor fields it touches, including when it falls back to the identity or
//! zero values of a reference line without geometry.
//!
//! A contact point shares its reference line with the data store and other
//! contact points, so the line stays alive for as long as any contact point
//! bound to it does.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod options;
pub use options::*;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Serialize;
use std::sync::Arc;

// Internal
use crate::{
    data_store::DataSetId,
    eval::{EvalError, Pk, Uv, Xy},
    ref_line::ReferenceLine,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The last queried and computed values of a contact point.
///
/// Each evaluation only writes the fields it queries or computes. `uv -> xy`
/// leaves the heading and curvature of an earlier evaluation in place and
/// `uv -> pk` leaves the cartesian position, so after mixed calls the fields
/// may describe different positions.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Cursor {
    pub u_m: f64,
    pub v_m: f64,
    pub x_m: f64,
    pub y_m: f64,
    pub phi_rad: f64,
    pub curv_m: f64,
}

/// A cursor bound to one reference line.
#[derive(Debug, Clone)]
pub struct ContactPoint {
    data_set_id: DataSetId,
    ref_line: Arc<ReferenceLine>,
    options: CpOptions,
    cursor: Cursor,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ContactPoint {
    /// Create a new contact point on the given reference line with default
    /// options.
    pub fn new(data_set_id: DataSetId, ref_line: Arc<ReferenceLine>) -> Self {
        Self {
            data_set_id,
            ref_line,
            options: CpOptions::default(),
            cursor: Cursor::default(),
        }
    }

    pub fn data_set_id(&self) -> DataSetId {
        self.data_set_id
    }

    pub fn ref_line(&self) -> &ReferenceLine {
        &self.ref_line
    }

    pub fn options(&self) -> &CpOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: CpOptions) {
        self.options = options;
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    /// Transform a road position into a cartesian position.
    ///
    /// Returns `EvalError::NoGeometry` if the reference line has no
    /// centerline, the cursor then holds the identity fallback.
    pub fn eval_uv_to_xy(&mut self, u_m: f64, v_m: f64) -> Result<Xy, EvalError> {
        let xy = self.ref_line.eval_uv_to_xy(u_m, v_m);

        self.cursor.u_m = u_m;
        self.cursor.v_m = v_m;
        self.cursor.x_m = xy.x_m;
        self.cursor.y_m = xy.y_m;

        self.check_geometry(xy)
    }

    /// Calculate the heading and curvature at a road position.
    ///
    /// Returns `EvalError::NoGeometry` if the reference line has no
    /// centerline, the cursor then holds zero heading and curvature.
    pub fn eval_uv_to_pk(&mut self, u_m: f64, v_m: f64) -> Result<Pk, EvalError> {
        let pk = self.ref_line.eval_uv_to_pk(&self.options, u_m, v_m);

        self.cursor.u_m = u_m;
        self.cursor.v_m = v_m;
        self.cursor.phi_rad = pk.phi_rad;
        self.cursor.curv_m = pk.curv_m;

        self.check_geometry(pk)
    }

    /// Transform a cartesian position into a road position.
    ///
    /// If the transform fails the cursor holds the identity fallback
    /// (`u = x`, `v = y`).
    pub fn eval_xy_to_uv(&mut self, x_m: f64, y_m: f64) -> Result<Uv, EvalError> {
        self.cursor.x_m = x_m;
        self.cursor.y_m = y_m;

        let result = self.ref_line.eval_xy_to_uv(&self.options, x_m, y_m);
        let uv = match result {
            Ok(uv) => uv,
            Err(_) => Uv { u_m: x_m, v_m: y_m },
        };

        self.cursor.u_m = uv.u_m;
        self.cursor.v_m = uv.v_m;

        result.and_then(|uv| self.check_geometry(uv))
    }

    /// Calculate the heading and curvature at a cartesian position.
    ///
    /// The position is first transformed into a road position. If that fails
    /// the heading and curvature in the cursor are set to zero.
    pub fn eval_xy_to_pk(&mut self, x_m: f64, y_m: f64) -> Result<Pk, EvalError> {
        match self.eval_xy_to_uv(x_m, y_m) {
            Ok(uv) => self.eval_uv_to_pk(uv.u_m, uv.v_m),
            Err(e) => {
                self.cursor.phi_rad = 0.0;
                self.cursor.curv_m = 0.0;
                Err(e)
            }
        }
    }

    fn check_geometry<T>(&self, value: T) -> Result<T, EvalError> {
        if self.ref_line.has_geometry() {
            Ok(value)
        } else {
            Err(EvalError::NoGeometry)
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn straight_cp() -> ContactPoint {
        let rl = ReferenceLine::from_points(
            0.0,
            1.0,
            (0..6).map(|i| i as f64).collect(),
            vec![0.0; 6],
        )
        .unwrap();

        ContactPoint::new(DataSetId::default(), Arc::new(rl))
    }

    fn no_geometry_cp() -> ContactPoint {
        ContactPoint::new(
            DataSetId::default(),
            Arc::new(ReferenceLine::without_geometry(0.0, 1.0, 6).unwrap()),
        )
    }

    #[test]
    fn test_straight_scenario() {
        let mut cp = straight_cp();

        let xy = cp.eval_uv_to_xy(2.5, 1.0).unwrap();
        assert_abs_diff_eq!(xy.x_m, 2.5, epsilon = 1e-12);
        assert_abs_diff_eq!(xy.y_m, 1.0, epsilon = 1e-12);

        let pk = cp.eval_uv_to_pk(2.5, 1.0).unwrap();
        assert_eq!(pk, Pk { phi_rad: 0.0, curv_m: 0.0 });

        let c = cp.cursor();
        assert_eq!((c.u_m, c.v_m), (2.5, 1.0));
        assert_abs_diff_eq!(c.x_m, 2.5, epsilon = 1e-12);
        assert_abs_diff_eq!(c.y_m, 1.0, epsilon = 1e-12);
        assert_eq!((c.phi_rad, c.curv_m), (0.0, 0.0));
    }

    #[test]
    fn test_xy_variants() {
        let mut cp = straight_cp();

        let uv = cp.eval_xy_to_uv(3.25, -0.5).unwrap();
        assert_abs_diff_eq!(uv.u_m, 3.25, epsilon = 1e-9);
        assert_abs_diff_eq!(uv.v_m, -0.5, epsilon = 1e-9);

        let pk = cp.eval_xy_to_pk(1.5, 2.0).unwrap();
        assert_eq!(pk.curv_m, 0.0);
        assert_abs_diff_eq!(cp.cursor().u_m, 1.5, epsilon = 1e-9);
        assert_abs_diff_eq!(cp.cursor().v_m, 2.0, epsilon = 1e-9);
        assert_eq!((cp.cursor().x_m, cp.cursor().y_m), (1.5, 2.0));
    }

    #[test]
    fn test_no_geometry_fallbacks() {
        let mut cp = no_geometry_cp();

        assert_eq!(cp.eval_uv_to_xy(1.0, 2.0), Err(EvalError::NoGeometry));
        assert_eq!((cp.cursor().x_m, cp.cursor().y_m), (1.0, 2.0));

        // Stale values from a previous query are overwritten
        cp.cursor.phi_rad = 3.0;
        cp.cursor.curv_m = 0.5;
        assert_eq!(cp.eval_uv_to_pk(1.0, 2.0), Err(EvalError::NoGeometry));
        assert_eq!((cp.cursor().phi_rad, cp.cursor().curv_m), (0.0, 0.0));

        assert_eq!(cp.eval_xy_to_uv(-4.0, 7.0), Err(EvalError::NoGeometry));
        assert_eq!((cp.cursor().u_m, cp.cursor().v_m), (-4.0, 7.0));

        assert_eq!(cp.eval_xy_to_pk(-4.0, 7.0), Err(EvalError::NoGeometry));
    }

    #[test]
    fn test_inverse_failure_fallback() {
        let mut cp = straight_cp();
        cp.set_options(CpOptions {
            inverse_max_iterations: 0,
            ..Default::default()
        });

        // Above the line, inside the sampled range, so only the segments
        // could contain it
        let err = cp.eval_xy_to_pk(2.5, 1.0).unwrap_err();
        assert_eq!(err, EvalError::InverseNotConverged { x_m: 2.5, y_m: 1.0 });

        let c = cp.cursor();
        assert_eq!((c.u_m, c.v_m), (2.5, 1.0));
        assert_eq!((c.phi_rad, c.curv_m), (0.0, 0.0));
    }

    #[test]
    fn test_cursor_keeps_fields_not_computed() {
        let dphi = 0.01;
        let rl = ReferenceLine::from_headings(
            0.0,
            0.1,
            0.0,
            0.0,
            (0..200).map(|i| (i as f64 + 0.5) * dphi).collect(),
        )
        .unwrap();
        let mut cp = ContactPoint::new(DataSetId::default(), Arc::new(rl));

        let xy = cp.eval_uv_to_xy(2.0, 1.0).unwrap();
        let pk = cp.eval_uv_to_pk(10.0, -1.0).unwrap();
        assert!(pk.phi_rad > 0.0 && pk.curv_m > 0.0);

        // Position of the first call, road position of the second
        let c = *cp.cursor();
        assert_eq!((c.u_m, c.v_m), (10.0, -1.0));
        assert_eq!((c.x_m, c.y_m), (xy.x_m, xy.y_m));

        // Heading and curvature of the second call survive a new position
        let xy = cp.eval_uv_to_xy(3.0, 0.5).unwrap();
        let c = *cp.cursor();
        assert_eq!((c.u_m, c.v_m), (3.0, 0.5));
        assert_eq!((c.x_m, c.y_m), (xy.x_m, xy.y_m));
        assert_eq!((c.phi_rad, c.curv_m), (pk.phi_rad, pk.curv_m));
    }

    #[test]
    fn test_options_select_curvature_mode() {
        let dphi = 0.01;
        let rl = ReferenceLine::from_headings(
            0.0,
            0.1,
            0.0,
            0.0,
            (0..200).map(|i| (i as f64 + 0.5) * dphi).collect(),
        )
        .unwrap();
        let mut cp = ContactPoint::new(DataSetId::default(), Arc::new(rl));

        let lateral = cp.eval_uv_to_pk(10.0, 2.0).unwrap().curv_m;

        cp.set_options(CpOptions {
            curv_mode: CurvMode::RefLine,
            ..Default::default()
        });
        let ref_line = cp.eval_uv_to_pk(10.0, 2.0).unwrap().curv_m;

        assert!(lateral > ref_line);
        assert_abs_diff_eq!(ref_line, 0.1, epsilon = 1e-3);
    }
}
