//! Logger initialisation
//!
//! Log records are written both to stdout, with a coloured level tag, and to
//! the session's log file in plain text. Every line is prefixed with the
//! number of seconds elapsed since the session epoch.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use colored::{ColoredString, Colorize};
use fern::FormatCallback;
use log::{info, Level, Record};
use std::fmt::{Arguments, Display};
use thiserror::Error;

// Internal imports
use crate::session::{self, Session};

// Re-exports
pub use log::LevelFilter;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors associated with initialising the logger.
#[derive(Debug, Error)]
pub enum LoggerInitError {
    #[error("Expected a log level of at least `INFO`, found `{0}`")]
    InvalidMinLogLevel(LevelFilter),

    #[error("Error initialising the log file: {0}")]
    LogFileInitError(std::io::Error),

    #[error("An error occured while setting up the logger: {0}")]
    FernInitError(log::SetLoggerError),
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Initialise the logger for this execution.
///
/// `min_level` must be `Info` or more verbose. Records from other crates are
/// capped at `Info`, only the workspace crates log at `Debug` or `Trace`.
///
/// Must only be called once per process.
pub fn logger_init(min_level: LevelFilter, session: &Session) -> Result<(), LoggerInitError> {
    if min_level < Level::Info {
        return Err(LoggerInitError::InvalidMinLogLevel(min_level));
    }

    let log_file =
        fern::log_file(&session.log_file_path).map_err(LoggerInitError::LogFileInitError)?;

    let terminal = fern::Dispatch::new()
        .format(|out, message, record| {
            write_line(out, level_to_colored(record.level()), message, record)
        })
        .chain(std::io::stdout());

    let file = fern::Dispatch::new()
        .format(|out, message, record| {
            write_line(out, level_to_str(record.level()), message, record)
        })
        .chain(log_file);

    fern::Dispatch::new()
        .level(LevelFilter::Info)
        .level_for("crg_lib", min_level)
        .level_for("crg_exec", min_level)
        .level_for("curv_scan", min_level)
        .level_for("util", min_level)
        .chain(terminal)
        .chain(file)
        .apply()
        .map_err(LoggerInitError::FernInitError)?;

    info!("Logging initialised");
    if let Some(epoch) = session::get_epoch() {
        info!("    Session epoch: {}", epoch);
    }
    info!("    Log level: {:?}", min_level);
    info!("    Log file path: {:?}", session.log_file_path);

    Ok(())
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Write one log line. Debug and trace lines include the record's target.
fn write_line<L>(out: FormatCallback, level: L, message: &Arguments, record: &Record)
where
    L: Display,
{
    let elapsed_s = session::get_elapsed_seconds();

    if record.level() > Level::Info {
        out.finish(format_args!(
            "[{:10.6} {}] {}: {}",
            elapsed_s,
            level,
            record.target(),
            message
        ))
    } else {
        out.finish(format_args!("[{:10.6} {}] {}", elapsed_s, level, message))
    }
}

fn level_to_str(level: Level) -> &'static str {
    match level {
        Level::Trace => "TRC",
        Level::Debug => "DBG",
        Level::Info => "INF",
        Level::Warn => "WRN",
        Level::Error => "ERR",
    }
}

fn level_to_colored(level: Level) -> ColoredString {
    match level {
        Level::Trace => level_to_str(level).dimmed().italic(),
        Level::Debug => level_to_str(level).dimmed(),
        Level::Info => level_to_str(level).normal(),
        Level::Warn => level_to_str(level).yellow(),
        Level::Error => level_to_str(level).red().bold(),
    }
}
