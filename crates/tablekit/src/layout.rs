//! Versioned header layouts for request lines.
//!
//! Every request starts with a fixed header ahead of the operation field:
//!
//! ```text
//! extended: table|<version>|<timestamp>|<table-name>|<operation>|<token>|...
//! compact:  table|<version>|<header>|<operation>|<token>|...
//! ```
//!
//! Both layouts share the stream tag and protocol version. A dispatcher
//! speaks exactly one of them; the compact layout exists for peers that omit
//! the table name.

use strum::{Display, EnumString};

/// Literal tag opening every request line.
pub const STREAM_TAG: &str = "table";

/// The single protocol version this crate speaks.
pub const PROTOCOL_VERSION: &str = "0.1";

/// Header layout preceding the operation field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, EnumString, Display)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Layout {
    /// Four header fields: tag, version, timestamp, table name.
    #[default]
    Extended,
    /// Three header fields: tag, version, one opaque header field.
    Compact,
}

/// Errors encountered while parsing a [`Layout`] from text.
pub type LayoutParseError = strum::ParseError;

impl Layout {
    /// Number of fields ahead of the operation field.
    #[must_use]
    pub const fn header_fields(self) -> usize {
        match self {
            Self::Extended => 4,
            Self::Compact => 3,
        }
    }

    /// Position of the operation field.
    #[must_use]
    pub const fn operation_index(self) -> usize {
        self.header_fields()
    }

    /// Minimum field count of any valid request: header, operation, token.
    #[must_use]
    pub const fn min_fields(self) -> usize {
        self.header_fields() + 2
    }

    /// Position of the table name field, when the layout carries one.
    #[must_use]
    pub const fn table_name_index(self) -> Option<usize> {
        match self {
            Self::Extended => Some(3),
            Self::Compact => None,
        }
    }
}
