//! Main CRG executable entry point.
//!
//! Loads a reference line and scans a grid of road positions extending past
//! both ends and both sides of the road. Every position is transformed into
//! cartesian coordinates and back, and the deviation of the recovered road
//! position is checked against the round trip tolerance.
//!
//! The results of the scan are saved as `round_trip.json` in the session
//! directory.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{eyre::WrapErr, Report};
use log::{debug, info, warn};
use serde::Serialize;

// Internal
use crg_lib::{data_store::DataStore, params::ExecParams, ref_line::RefLineParams};
use util::{logger::logger_init, maths::lin_map, session::Session};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// One evaluated point of the round trip scan.
#[derive(Debug, Serialize)]
struct RoundTripRecord {
    u_m: f64,
    v_m: f64,
    x_m: f64,
    y_m: f64,
    u_back_m: f64,
    v_back_m: f64,
}

/// Summary of the whole scan.
#[derive(Debug, Default, Serialize)]
struct RoundTripSummary {
    num_points: usize,
    num_forward_errors: usize,
    num_inverse_errors: usize,
    num_inaccurate: usize,
    max_du_m: f64,
    max_dv_m: f64,
}

#[derive(Debug, Serialize)]
struct RoundTripReport {
    summary: RoundTripSummary,
    records: Vec<RoundTripRecord>,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    // ---- EARLY INITIALISATION ----

    let exec_params: ExecParams =
        util::params::load("crg_exec.toml").wrap_err("Could not load exec params")?;

    let session = Session::new("crg_exec", "sessions").wrap_err("Failed to create the session")?;

    logger_init(exec_params.log_level, &session).wrap_err("Failed to initialise logging")?;

    info!("CRG Round Trip Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD REFERENCE LINE ----

    let ref_line_params: RefLineParams = util::params::load(&exec_params.ref_line_file)
        .wrap_err_with(|| format!("Could not load {}", exec_params.ref_line_file))?;

    let ref_line = ref_line_params
        .build()
        .wrap_err("Could not build the reference line")?;

    let (u_min_m, u_max_m) = ref_line.u_range();
    info!(
        "Reference line loaded: u = [{}, {}], {} samples, closed: {}",
        u_min_m,
        u_max_m,
        ref_line.num_samples(),
        ref_line.is_closed()
    );

    let mut store = DataStore::new();
    let data_set_id = store.add_data_set(ref_line);
    let cp_id = store
        .create_contact_point(data_set_id)
        .wrap_err("Could not create the contact point")?;
    store
        .set_cp_options(cp_id, exec_params.cp_options)
        .wrap_err("Could not set the contact point options")?;

    // ---- SCAN ----

    let num_steps_u = exec_params.num_steps_u.max(1);
    let num_steps_v = exec_params.num_steps_v.max(1);

    let steps = |num_steps: usize, num_border: usize| {
        let border = num_border as i64;
        -border..=(num_steps as i64 + border)
    };

    let mut summary = RoundTripSummary::default();
    let mut records = Vec::new();

    for i in steps(num_steps_u, exec_params.num_border_u) {
        let u_m = lin_map((0.0, num_steps_u as f64), (u_min_m, u_max_m), i as f64);

        for j in steps(num_steps_v, exec_params.num_border_v) {
            let v_m = lin_map(
                (0.0, num_steps_v as f64),
                (exec_params.v_min_m, exec_params.v_max_m),
                j as f64,
            );
            summary.num_points += 1;

            let xy = match store.eval_uv_to_xy(cp_id, u_m, v_m) {
                Ok(xy) => xy,
                Err(e) => {
                    warn!("Error converting u/v = {:.3}/{:.3} to x/y: {}", u_m, v_m, e);
                    summary.num_forward_errors += 1;
                    continue;
                }
            };

            let uv = match store.eval_xy_to_uv(cp_id, xy.x_m, xy.y_m) {
                Ok(uv) => uv,
                Err(e) => {
                    warn!("Error converting x/y = {:.3}/{:.3} to u/v: {}", xy.x_m, xy.y_m, e);
                    summary.num_inverse_errors += 1;
                    continue;
                }
            };

            debug!(
                "u/v = {:+10.4}/{:+10.4} ----> x/y = {:+10.4}/{:+10.4} ----> u/v = {:+10.4}/{:+10.4}",
                u_m, v_m, xy.x_m, xy.y_m, uv.u_m, uv.v_m
            );

            // On a closed reference line the recovered u lies in the first
            // loop, compare against the wrapped u
            let u_expected_m = store
                .data_set(data_set_id)
                .map(|rl| rl.wrap_u(u_m))
                .unwrap_or(u_m);

            let delta_u_m = (u_expected_m - uv.u_m).abs();
            let delta_v_m = (v_m - uv.v_m).abs();

            if delta_u_m > exec_params.round_trip_tol_m || delta_v_m > exec_params.round_trip_tol_m
            {
                warn!(
                    "Round trip error when converting back: du/dv = {:.8}/{:.8}",
                    delta_u_m, delta_v_m
                );
                summary.num_inaccurate += 1;
            }

            summary.max_du_m = summary.max_du_m.max(delta_u_m);
            summary.max_dv_m = summary.max_dv_m.max(delta_v_m);

            records.push(RoundTripRecord {
                u_m,
                v_m,
                x_m: xy.x_m,
                y_m: xy.y_m,
                u_back_m: uv.u_m,
                v_back_m: uv.v_m,
            });
        }
    }

    info!("Scan complete: {:#?}", summary);

    // ---- SAVE ----

    session
        .save("round_trip.json", &RoundTripReport { summary, records })
        .wrap_err("Could not save the round trip results")?;

    info!("End of execution");

    Ok(())
}
