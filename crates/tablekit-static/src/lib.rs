//! Static file table backend for the table line protocol.
//!
//! `tablekit-static` loads a plain-text key/value file and answers `check`,
//! `lookup`, and `fetch` requests from it. An `update` request re-reads the
//! file; if the new contents fail to load the previous entries keep serving.
//!
//! The [`table`] module holds the file format and in-memory table,
//! [`handlers`] binds it to a [`tablekit::Registry`], and [`app`] wires the
//! dispatcher to the process streams.

pub mod app;
pub mod handlers;
pub mod table;
pub mod telemetry;

#[cfg(test)]
mod tests;

/// Tracing target for table backend events.
pub const TABLE_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::table");

pub use app::{AppError, run, run_with_io};
pub use table::{
    Entries, Entry, FileSource, StaticTable, StaticTableError, TableSource, parse_entries,
};
