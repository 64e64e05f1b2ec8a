//! # Curvature Scan
//!
//! Evaluates the heading and curvature along the whole reference line, plus
//! a border before and after it, at each of the lateral offsets given in the
//! exec params. One CSV archive is written per offset.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use color_eyre::{eyre::WrapErr, Result};
use log::{info, warn};
use serde::Serialize;

use crg_lib::{data_store::DataStore, params::ExecParams, ref_line::RefLineParams};
use util::{archive::Archiver, logger::logger_init, session::Session};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct CurvRecord {
    u_m: f64,
    v_m: f64,
    x_m: f64,
    y_m: f64,
    phi_rad: f64,
    curv_m: f64,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    color_eyre::install()?;

    let exec_params: ExecParams =
        util::params::load("crg_exec.toml").wrap_err("Could not load exec params")?;

    let session = Session::new("curv_scan", "sessions").wrap_err("Failed to create the session")?;
    logger_init(exec_params.log_level, &session).wrap_err("Failed to initialise logging")?;

    info!("CRG Curvature Scan\n");

    let ref_line = util::params::load::<RefLineParams>(&exec_params.ref_line_file)
        .wrap_err_with(|| format!("Could not load {}", exec_params.ref_line_file))?
        .build()
        .wrap_err("Could not build the reference line")?;

    let (u_min_m, u_max_m) = ref_line.u_range();
    let step_m = exec_params.curv_scan_step_m;
    if !(step_m > 0.0) {
        return Err(color_eyre::eyre::eyre!(
            "curv_scan_step_m must be positive, found {}",
            step_m
        ));
    }

    let mut store = DataStore::new();
    let data_set_id = store.add_data_set(ref_line);
    let cp_id = store.create_contact_point(data_set_id)?;
    store.set_cp_options(cp_id, exec_params.cp_options)?;

    // Scan one step size past both ends
    let num_steps = ((u_max_m - u_min_m) / step_m).ceil() as i64;

    for (k, v_m) in exec_params.curv_scan_v_m.iter().enumerate() {
        let mut archiver = Archiver::from_path(&session, format!("curv_scan_{}.csv", k))
            .wrap_err("Could not create the archive")?;

        let mut max_abs_curv_m: f64 = 0.0;

        for i in -1..=(num_steps + 1) {
            let u_m = u_min_m + i as f64 * step_m;

            let xy = store.eval_uv_to_xy(cp_id, u_m, *v_m);
            let pk = store.eval_uv_to_pk(cp_id, u_m, *v_m);

            let (xy, pk) = match (xy, pk) {
                (Ok(xy), Ok(pk)) => (xy, pk),
                (Err(e), _) | (_, Err(e)) => {
                    warn!("Cannot evaluate u/v = {:.3}/{:.3}: {}", u_m, v_m, e);
                    continue;
                }
            };

            max_abs_curv_m = max_abs_curv_m.max(pk.curv_m.abs());

            archiver.serialise(CurvRecord {
                u_m,
                v_m: *v_m,
                x_m: xy.x_m,
                y_m: xy.y_m,
                phi_rad: pk.phi_rad,
                curv_m: pk.curv_m,
            })?;
        }

        info!(
            "v = {:+.3} m: max |curvature| = {:.6} 1/m, saved to {:?}",
            v_m,
            max_abs_curv_m,
            archiver.path()
        );
    }

    info!("End of execution");

    Ok(())
}
