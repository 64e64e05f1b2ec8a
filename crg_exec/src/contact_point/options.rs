//! Options structure for contact points

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Options consulted by the evaluations of a contact point.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CpOptions {
    /// How the curvature is reported.
    pub curv_mode: CurvMode,

    // ---- INVERSE TRANSFORM ----

    /// Maximum number of Newton iterations per segment when transforming a
    /// cartesian position into a road position.
    pub inverse_max_iterations: usize,

    /// Step size under which the inverse transform is considered converged.
    ///
    /// Units: meters
    pub inverse_tolerance_m: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Curvature reporting modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CurvMode {
    /// Curvature of the path offset laterally by `v` from the centerline.
    Lateral,

    /// Curvature of the centerline, independent of `v`.
    RefLine,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for CpOptions {
    fn default() -> Self {
        Self {
            curv_mode: CurvMode::default(),
            inverse_max_iterations: 20,
            inverse_tolerance_m: 1.0e-10,
        }
    }
}

impl CpOptions {
    pub fn is_curv_lateral(&self) -> bool {
        self.curv_mode == CurvMode::Lateral
    }
}

impl Default for CurvMode {
    fn default() -> Self {
        CurvMode::Lateral
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_defaults() {
        let opts = CpOptions::default();

        assert!(opts.is_curv_lateral());
        assert_eq!(opts.inverse_max_iterations, 20);
    }

    #[test]
    fn test_parse() {
        let opts: CpOptions = toml::from_str("curv_mode = \"ref_line\"").unwrap();
        assert_eq!(opts.curv_mode, CurvMode::RefLine);
        assert_eq!(opts.inverse_tolerance_m, 1.0e-10);

        let opts: CpOptions = toml::from_str(
            "inverse_max_iterations = 5\ninverse_tolerance_m = 1e-6",
        )
        .unwrap();
        assert!(opts.is_curv_lateral());
        assert_eq!(opts.inverse_max_iterations, 5);
        assert_eq!(opts.inverse_tolerance_m, 1e-6);

        assert!(toml::from_str::<CpOptions>("curv_mode = \"sideways\"").is_err());
    }
}
