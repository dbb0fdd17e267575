//! Request decoding for the dispatch loop.
//!
//! This module turns one raw request line into a typed [`Request`]. Checks
//! run in a fixed order (field count, stream tag, version, operation) so the
//! first violation on a line is the one reported. Keys may contain the field
//! delimiter; they are recovered from the unsplit remainder of the line rather
//! than by joining split fields back together.

use strum::Display;

use crate::error::DecodeError;
use crate::fields::{self, DELIMITER};
use crate::layout::{Layout, PROTOCOL_VERSION, STREAM_TAG};
use crate::service::ServiceKind;

/// Table operations a request may ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Operation {
    /// Reload or refresh the table.
    Update,
    /// Test whether a key is present.
    Check,
    /// Retrieve the value for a key.
    Lookup,
    /// Retrieve the next value of a table without a key.
    Fetch,
}

impl Operation {
    /// Every operation kind, in slot order.
    pub const ALL: [Self; 4] = [Self::Update, Self::Check, Self::Lookup, Self::Fetch];

    /// Parses an operation name (case-sensitive).
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::UnsupportedOperation`] if the name is not one of
    /// `update`, `check`, `lookup`, or `fetch`.
    pub fn parse(value: &str) -> Result<Self, DecodeError> {
        match value {
            "update" => Ok(Self::Update),
            "check" => Ok(Self::Check),
            "lookup" => Ok(Self::Lookup),
            "fetch" => Ok(Self::Fetch),
            _ => Err(DecodeError::unsupported_operation(value)),
        }
    }

    /// Returns the wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Update => "update",
            Self::Check => "check",
            Self::Lookup => "lookup",
            Self::Fetch => "fetch",
        }
    }

    const fn takes_service(self) -> bool {
        !matches!(self, Self::Update)
    }
}

/// Operation-specific arguments of a decoded request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<'line> {
    /// `update` carries no arguments.
    Update,
    /// `check` carries a service kind and a key.
    Check {
        /// Requested service kind.
        service: ServiceKind,
        /// Key to test, delimiters preserved.
        key: &'line str,
    },
    /// `lookup` carries a service kind and a key.
    Lookup {
        /// Requested service kind.
        service: ServiceKind,
        /// Key to resolve, delimiters preserved.
        key: &'line str,
    },
    /// `fetch` carries a service kind only.
    Fetch {
        /// Requested service kind.
        service: ServiceKind,
    },
}

/// A decoded request borrowing from its input line.
///
/// A request lives for one dispatch cycle and is never retained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Request<'line> {
    table: Option<&'line str>,
    token: &'line str,
    command: Command<'line>,
}

impl<'line> Request<'line> {
    /// Decodes a request line using the given header layout.
    ///
    /// # Errors
    ///
    /// Returns a [`DecodeError`] describing the first violation found:
    /// too few fields, a wrong stream tag, an unsupported version, or an
    /// unsupported operation.
    ///
    /// # Example
    ///
    /// ```
    /// use tablekit::{Layout, Operation, Request, ServiceKind};
    ///
    /// let request = Request::decode(
    ///     "table|0.1|1591022347|aliases|lookup|a1b2|alias|user|name",
    ///     Layout::Extended,
    /// )
    /// .expect("valid request");
    /// assert_eq!(request.operation(), Operation::Lookup);
    /// assert_eq!(request.table_name(), Some("aliases"));
    /// assert_eq!(request.token(), "a1b2");
    /// assert_eq!(request.service(), Some(ServiceKind::Alias));
    /// assert_eq!(request.key(), Some("user|name"));
    /// ```
    pub fn decode(line: &'line str, layout: Layout) -> Result<Self, DecodeError> {
        let minimum = layout.min_fields();
        let actual = fields::count(line);
        if actual < minimum {
            return Err(DecodeError::malformed(minimum, actual, line));
        }

        // Header, operation, token, then everything else as one remainder.
        let mut parts = fields::split_bounded(line, minimum + 1);

        let tag = parts.next().unwrap_or_default();
        if tag != STREAM_TAG {
            return Err(DecodeError::invalid_stream(tag));
        }

        let version = parts.next().unwrap_or_default();
        if version != PROTOCOL_VERSION {
            return Err(DecodeError::unsupported_version(version));
        }

        let mut table = None;
        for index in 2..layout.header_fields() {
            let field = parts.next().unwrap_or_default();
            if layout.table_name_index() == Some(index) {
                table = Some(field);
            }
        }

        let operation = Operation::parse(parts.next().unwrap_or_default())?;
        let token = parts.next().unwrap_or_default();

        let remainder_field = parts.next();
        if operation.takes_service() && remainder_field.is_none() {
            return Err(DecodeError::malformed(minimum + 1, actual, line));
        }
        let remainder = remainder_field.unwrap_or_default();

        let command = match operation {
            Operation::Update => Command::Update,
            Operation::Check => {
                let (service, key) = service_and_key(remainder);
                Command::Check { service, key }
            }
            Operation::Lookup => {
                let (service, key) = service_and_key(remainder);
                Command::Lookup { service, key }
            }
            Operation::Fetch => {
                let name = fields::split(remainder).next().unwrap_or_default();
                Command::Fetch {
                    service: ServiceKind::from_name(name),
                }
            }
        };

        Ok(Self {
            table,
            token,
            command,
        })
    }

    /// Returns the operation kind.
    #[must_use]
    pub const fn operation(&self) -> Operation {
        match self.command {
            Command::Update => Operation::Update,
            Command::Check { .. } => Operation::Check,
            Command::Lookup { .. } => Operation::Lookup,
            Command::Fetch { .. } => Operation::Fetch,
        }
    }

    /// Returns the session token to echo in the result.
    #[must_use]
    pub const fn token(&self) -> &'line str {
        self.token
    }

    /// Returns the table name carried by the extended layout.
    #[must_use]
    pub const fn table_name(&self) -> Option<&'line str> {
        self.table
    }

    /// Returns the operation-specific arguments.
    #[must_use]
    pub const fn command(&self) -> Command<'line> {
        self.command
    }

    /// Returns the service kind for `check`, `lookup`, and `fetch`.
    #[must_use]
    pub const fn service(&self) -> Option<ServiceKind> {
        match self.command {
            Command::Update => None,
            Command::Check { service, .. }
            | Command::Lookup { service, .. }
            | Command::Fetch { service } => Some(service),
        }
    }

    /// Returns the key for `check` and `lookup`.
    #[must_use]
    pub const fn key(&self) -> Option<&'line str> {
        match self.command {
            Command::Check { key, .. } | Command::Lookup { key, .. } => Some(key),
            Command::Update | Command::Fetch { .. } => None,
        }
    }
}

fn service_and_key(remainder: &str) -> (ServiceKind, &str) {
    let (name, key) = remainder.split_once(DELIMITER).unwrap_or((remainder, ""));
    (ServiceKind::from_name(name), key)
}
