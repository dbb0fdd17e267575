//! Process wiring: load the table, bind handlers, serve the streams.

use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use std::rc::Rc;

use tablekit::{DispatchError, Dispatcher};
use tablekit_config::Config;
use thiserror::Error;
use tracing::info;

use crate::TABLE_TARGET;
use crate::handlers;
use crate::table::{FileSource, StaticTable, StaticTableError};
use crate::telemetry::{self, TelemetryError};

/// Errors that stop the backend process.
#[derive(Debug, Error)]
pub enum AppError {
    /// Telemetry could not be configured.
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),

    /// The table could not be loaded at startup.
    #[error(transparent)]
    Table(#[from] StaticTableError),

    /// The dispatch loop stopped with an error.
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

impl AppError {
    /// Returns the process exit status for this error.
    #[must_use]
    pub const fn exit_status(&self) -> i32 {
        match self {
            Self::Dispatch(error) => error.exit_status(),
            Self::Telemetry(_) | Self::Table(_) => 2,
        }
    }
}

/// Serves the configured table over explicit streams.
///
/// Telemetry is left untouched so tests can drive this directly.
///
/// # Errors
///
/// Returns [`AppError`] if the table cannot be loaded or dispatch stops.
pub fn run_with_io<R: BufRead, W: Write>(
    config: &Config,
    input: R,
    output: W,
) -> Result<(), AppError> {
    let table = Rc::new(StaticTable::open(FileSource::new(config.table_path()))?);
    info!(
        target: TABLE_TARGET,
        path = %config.table_path(),
        entries = table.len(),
        layout = %config.layout(),
        policy = %config.error_policy(),
        "table loaded"
    );

    let mut dispatcher = Dispatcher::new(
        handlers::registry(table),
        config.layout(),
        config.error_policy(),
    )?;
    dispatcher.run(input, output)?;
    Ok(())
}

/// Runs the backend on the process standard streams.
#[must_use]
pub fn run(config: &Config) -> ExitCode {
    serve(config).map_or_else(
        |error| {
            writeln!(io::stderr().lock(), "{error}").ok();
            ExitCode::from(u8::try_from(error.exit_status()).unwrap_or(1))
        },
        |()| ExitCode::SUCCESS,
    )
}

fn serve(config: &Config) -> Result<(), AppError> {
    let _telemetry = telemetry::initialise(config)?;
    let stdin = io::stdin();
    let stdout = io::stdout();
    run_with_io(config, stdin.lock(), stdout.lock())
}
