//! Shared configuration for tablekit binaries.
//!
//! Configuration comes from command-line flags. Every flag has a built-in
//! default except the table path, so a bare invocation with one positional
//! argument yields a working setup:
//!
//! | Flag             | Default     | Values                      |
//! |------------------|-------------|-----------------------------|
//! | `--log-filter`   | `info`      | any `tracing` filter        |
//! | `--log-format`   | `json`      | `json`, `compact`           |
//! | `--layout`       | `extended`  | `extended`, `compact`       |
//! | `--error-policy` | `fail-fast` | `fail-fast`, `skip`         |
//!
//! Logs always go to standard error; standard output belongs to the table
//! protocol.

mod defaults;
mod logging;

use std::ffi::OsString;

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use tablekit::{ErrorPolicy, Layout};
use thiserror::Error;

pub use self::defaults::{
    DEFAULT_LOG_FILTER, default_error_policy, default_layout, default_log_filter,
    default_log_format,
};
pub use self::logging::{LogFormat, LogFormatParseError};

/// Resolved configuration for a table backend process.
#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(
    name = "tablekit-static",
    version,
    about = "Serve a static key/value file over the table line protocol"
)]
pub struct Config {
    /// Tracing filter expression for diagnostics written to stderr.
    #[arg(long, default_value = DEFAULT_LOG_FILTER)]
    log_filter: String,

    /// Diagnostic output format.
    #[arg(long, default_value_t = default_log_format())]
    log_format: LogFormat,

    /// Request header layout spoken by the peer.
    #[arg(long, default_value_t = default_layout())]
    layout: Layout,

    /// Whether a malformed request stops the process or is skipped.
    #[arg(long, default_value_t = default_error_policy())]
    error_policy: ErrorPolicy,

    /// Path to the table file served by the backend.
    table_path: Utf8PathBuf,
}

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Command-line arguments were rejected, or help or version output was
    /// requested.
    #[error("invalid arguments: {source}")]
    Arguments {
        /// Underlying parser error, which can render usage output.
        #[source]
        source: clap::Error,
    },
}

impl ConfigError {
    /// Returns the parser error so callers can print usage and exit.
    #[must_use]
    pub fn into_clap(self) -> clap::Error {
        match self {
            Self::Arguments { source } => source,
        }
    }
}

impl Config {
    /// Creates a configuration with built-in defaults for the given table.
    #[must_use]
    pub fn new(table_path: impl Into<Utf8PathBuf>) -> Self {
        Self {
            log_filter: DEFAULT_LOG_FILTER.to_owned(),
            log_format: default_log_format(),
            layout: default_layout(),
            error_policy: default_error_policy(),
            table_path: table_path.into(),
        }
    }

    /// Loads configuration from the process arguments.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Arguments`] if the arguments are invalid.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_iter(std::env::args_os())
    }

    /// Loads configuration from an explicit argument list, program name
    /// first.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Arguments`] if the arguments are invalid.
    pub fn load_from_iter<I, T>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        Self::try_parse_from(args).map_err(|source| ConfigError::Arguments { source })
    }

    /// Tracing filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        self.log_filter.as_str()
    }

    /// Diagnostic output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Request header layout.
    #[must_use]
    pub const fn layout(&self) -> Layout {
        self.layout
    }

    /// Policy for rejected request lines.
    #[must_use]
    pub const fn error_policy(&self) -> ErrorPolicy {
        self.error_policy
    }

    /// Path to the served table file.
    #[must_use]
    pub fn table_path(&self) -> &Utf8Path {
        self.table_path.as_path()
    }
}
