//! # CRG Executable Parameters
//!
//! Parameters shared by the `crg_exec` and `curv_scan` executables.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::LevelFilter;
use serde::Deserialize;

use crate::contact_point::CpOptions;

// ---------------------------------------------------------------------------
// STRUCTS
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct ExecParams {
    /// Reference line definition, relative to the params directory
    pub ref_line_file: String,

    /// Minimum level of the log output
    pub log_level: LevelFilter,

    /// Options of the contact point used for the evaluations
    #[serde(default)]
    pub cp_options: CpOptions,

    // ---- ROUND TRIP SCAN ----

    /// Number of steps along the U range of the reference line
    pub num_steps_u: usize,

    /// Number of steps across the V range
    pub num_steps_v: usize,

    /// Number of additional steps scanned before the start and after the end
    /// of the U range
    pub num_border_u: usize,

    /// Number of additional steps scanned either side of the V range
    pub num_border_v: usize,

    /// Lateral range to scan.
    ///
    /// Units: meters
    pub v_min_m: f64,

    /// Units: meters
    pub v_max_m: f64,

    /// Difference between the scanned and recovered road positions above
    /// which a round trip is reported as inaccurate.
    ///
    /// Units: meters
    pub round_trip_tol_m: f64,

    // ---- CURVATURE SCAN ----

    /// Step along U between two heading/curvature evaluations.
    ///
    /// Units: meters
    pub curv_scan_step_m: f64,

    /// Lateral offsets at which the heading and curvature are scanned.
    ///
    /// Units: meters
    pub curv_scan_v_m: Vec<f64>,
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
