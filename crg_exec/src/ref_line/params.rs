//! Reference line definition parameters
//!
//! A reference line is described in a TOML file as a U axis plus one of
//! several centerline forms, for example:
//!
//! ```toml
//! u_first_m = 0.0
//! u_inc_m = 0.1
//!
//! [centerline]
//! type = "curv_seq"
//! x_first_m = 0.0
//! y_first_m = 0.0
//! phi_first_rad = 0.0
//! seq = [[0.0, 20.0], [0.02, 30.0], [0.0, 20.0]]
//! ```

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Deserialize;

// Internal
use super::{RefLineError, ReferenceLine};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters describing a reference line.
#[derive(Debug, Clone, Deserialize)]
pub struct RefLineParams {
    /// U position of the first sample.
    ///
    /// Units: meters
    pub u_first_m: f64,

    /// Spacing between U samples.
    ///
    /// Units: meters
    pub u_inc_m: f64,

    /// The centerline geometry.
    pub centerline: CenterlineSpec,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The supported ways of describing a centerline.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CenterlineSpec {
    /// Explicit centerline points, one per U sample.
    Points { x_m: Vec<f64>, y_m: Vec<f64> },

    /// A start point and one heading per U sample.
    Headings {
        x_first_m: f64,
        y_first_m: f64,
        phi_rad: Vec<f64>,
    },

    /// A start pose and a sequence of constant curvature sections.
    ///
    /// Each element of `seq` is a `(curvature, length)` pair, the curvature
    /// in 1/meters (positive turning left) and the length in meters.
    CurvSeq {
        x_first_m: f64,
        y_first_m: f64,
        phi_first_rad: f64,
        seq: Vec<(f64, f64)>,
    },

    /// No centerline, only the U axis. `num` gives the number of samples.
    NoGeometry { num: usize },
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl RefLineParams {
    /// Build the reference line described by these parameters.
    pub fn build(&self) -> Result<ReferenceLine, RefLineError> {
        match &self.centerline {
            CenterlineSpec::Points { x_m, y_m } => ReferenceLine::from_points(
                self.u_first_m,
                self.u_inc_m,
                x_m.clone(),
                y_m.clone(),
            ),
            CenterlineSpec::Headings {
                x_first_m,
                y_first_m,
                phi_rad,
            } => ReferenceLine::from_headings(
                self.u_first_m,
                self.u_inc_m,
                *x_first_m,
                *y_first_m,
                phi_rad.clone(),
            ),
            CenterlineSpec::CurvSeq {
                x_first_m,
                y_first_m,
                phi_first_rad,
                seq,
            } => ReferenceLine::from_headings(
                self.u_first_m,
                self.u_inc_m,
                *x_first_m,
                *y_first_m,
                sample_curv_seq(seq, *phi_first_rad, self.u_inc_m)?,
            ),
            CenterlineSpec::NoGeometry { num } => {
                ReferenceLine::without_geometry(self.u_first_m, self.u_inc_m, *num)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Sample a curvature sequence into one heading per U sample.
///
/// Each segment takes the heading of the sequence at its midpoint, which
/// places the segment ends on the arcs. The last sample takes the heading at
/// the very end of the sequence.
fn sample_curv_seq(
    seq: &[(f64, f64)],
    phi_first_rad: f64,
    u_inc_m: f64,
) -> Result<Vec<f64>, RefLineError> {
    if seq.is_empty() {
        return Err(RefLineError::EmptySequence);
    }
    if !(u_inc_m > 0.0) || !u_inc_m.is_finite() {
        return Err(RefLineError::InvalidIncrement(u_inc_m));
    }

    let length_m: f64 = seq.iter().map(|(_, l)| l).sum();
    let num_segments = (length_m / u_inc_m).round() as usize;

    if num_segments < 1 {
        return Err(RefLineError::NotEnoughSamples(num_segments + 1));
    }

    let mut phi_rad: Vec<f64> = (0..num_segments)
        .map(|i| heading_at(seq, phi_first_rad, (i as f64 + 0.5) * u_inc_m))
        .collect();
    phi_rad.push(heading_at(seq, phi_first_rad, length_m));

    Ok(phi_rad)
}

/// Heading of a curvature sequence at the distance `s_m` from its start.
///
/// Distances beyond the end continue with the last section's curvature.
fn heading_at(seq: &[(f64, f64)], phi_first_rad: f64, s_m: f64) -> f64 {
    let mut head_rad = phi_first_rad;
    let mut remaining_m = s_m;

    for (i, (curv_m, dist_m)) in seq.iter().enumerate() {
        let is_last = i == seq.len() - 1;

        if remaining_m <= *dist_m || is_last {
            return head_rad + curv_m * remaining_m;
        }

        head_rad += curv_m * dist_m;
        remaining_m -= dist_m;
    }

    head_rad
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::PI;

    #[test]
    fn test_heading_at() {
        let seq = [(0.0, 10.0), (0.1, 10.0), (0.0, 5.0)];

        assert_eq!(heading_at(&seq, 0.5, 3.0), 0.5);
        assert_abs_diff_eq!(heading_at(&seq, 0.5, 15.0), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(heading_at(&seq, 0.5, 25.0), 1.5, epsilon = 1e-12);
        assert_abs_diff_eq!(heading_at(&seq, 0.5, 30.0), 1.5, epsilon = 1e-12);
    }

    #[test]
    fn test_parse_points() {
        let params: RefLineParams = toml::from_str(
            r#"
            u_first_m = 0.0
            u_inc_m = 1.0

            [centerline]
            type = "points"
            x_m = [0.0, 1.0, 2.0]
            y_m = [0.0, 0.0, 0.0]
            "#,
        )
        .unwrap();

        let rl = params.build().unwrap();
        assert_eq!(rl.num_samples(), 3);
        assert_eq!(rl.phi().first(), 0.0);
    }

    #[test]
    fn test_parse_curv_seq() {
        let params: RefLineParams = toml::from_str(
            r#"
            u_first_m = 0.0
            u_inc_m = 0.1

            [centerline]
            type = "curv_seq"
            x_first_m = 0.0
            y_first_m = 0.0
            phi_first_rad = 0.0
            seq = [[0.0, 10.0], [0.1, 15.707963267948966]]
            "#,
        )
        .unwrap();

        let rl = params.build().unwrap();

        // 10 m straight then a quarter circle of radius 10 m
        assert_eq!(rl.num_samples(), 258);
        assert_abs_diff_eq!(rl.phi().last(), PI / 2.0, epsilon = 1e-9);
        assert_abs_diff_eq!(rl.x().data()[100], 10.0, epsilon = 1e-9);
        assert_abs_diff_eq!(rl.x().last(), 20.0, epsilon = 0.02);
        assert_abs_diff_eq!(rl.y().last(), 10.0, epsilon = 0.02);
    }

    #[test]
    fn test_parse_no_geometry() {
        let params: RefLineParams = toml::from_str(
            r#"
            u_first_m = -5.0
            u_inc_m = 0.5

            [centerline]
            type = "no_geometry"
            num = 21
            "#,
        )
        .unwrap();

        let rl = params.build().unwrap();
        assert!(!rl.has_geometry());
        assert_eq!(rl.u_range(), (-5.0, 5.0));
    }

    #[test]
    fn test_empty_seq() {
        let params = RefLineParams {
            u_first_m: 0.0,
            u_inc_m: 0.1,
            centerline: CenterlineSpec::CurvSeq {
                x_first_m: 0.0,
                y_first_m: 0.0,
                phi_first_rad: 0.0,
                seq: vec![],
            },
        };

        assert_eq!(params.build().unwrap_err(), RefLineError::EmptySequence);
    }

    #[test]
    fn test_params_files() {
        let dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../params/ref_lines");
        let load = |name: &str| {
            util::params::load_from_path::<RefLineParams, _>(dir.join(name))
                .unwrap()
                .build()
                .unwrap()
        };

        let straight = load("straight.toml");
        assert_eq!(straight.num_samples(), 11);
        assert!(!straight.is_closed());

        let s_curve = load("s_curve.toml");
        assert_eq!(s_curve.num_samples(), 901);
        assert_abs_diff_eq!(s_curve.phi().last(), 0.0, epsilon = 1e-9);

        let closed = load("loop.toml");
        assert_eq!(closed.num_samples(), 629);
        assert!(closed.is_closed());

        assert!(!load("flat.toml").has_geometry());
    }
}
