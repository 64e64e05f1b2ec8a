//! # CRG road evaluation library.
//!
//! Evaluates positions on a road described by a reference line sampled at a
//! constant U spacing. Positions are given either in road coordinates (`u`
//! along the road, `v` lateral to it) or in cartesian coordinates (`x`, `y`).
//!
//! The usual entry point is the `DataStore`, which owns reference lines and
//! the contact points evaluating them:
//!
//! ```no_run
//! use crg_lib::{data_store::DataStore, ref_line::ReferenceLine};
//!
//! let mut store = DataStore::new();
//! let ds = store.add_data_set(
//!     ReferenceLine::from_headings(0.0, 1.0, 0.0, 0.0, vec![0.0; 10]).unwrap()
//! );
//! let cp = store.create_contact_point(ds).unwrap();
//!
//! let xy = store.eval_uv_to_xy(cp, 2.5, 1.0).unwrap();
//! ```

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

/// Contact points - cursors evaluating one reference line
pub mod contact_point;

/// Data store - registry of reference lines and contact points
pub mod data_store;

/// Evaluations of a reference line (uv -> xy, uv -> heading/curvature, xy -> uv)
pub mod eval;

/// Small 2D vector helpers
pub mod geom;

/// Executable parameters
pub mod params;

/// Reference line storage and construction
pub mod ref_line;
