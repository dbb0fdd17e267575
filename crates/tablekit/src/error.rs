//! Error types for request decoding and dispatch.
//!
//! Decode failures are raised per input line before any handler runs, so a
//! rejected request never produces a result line. Dispatch failures cover the
//! surrounding loop: a decode failure escalated by the configured policy, a
//! gap in the routing table, or broken I/O on either stream.

use std::io;
use std::sync::Arc;

use thiserror::Error;

use crate::request::Operation;

/// Errors raised while decoding one request line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The line carries fewer fields than the layout requires.
    #[error("malformed request: expected at least {expected} fields, got {actual}: {line}")]
    MalformedRequest {
        /// Minimum field count for the request.
        expected: usize,
        /// Field count found on the line.
        actual: usize,
        /// The offending line.
        line: String,
    },

    /// The line is not valid UTF-8.
    #[error("request is not valid UTF-8: {line}")]
    InvalidEncoding {
        /// The line with invalid sequences replaced.
        line: String,
    },

    /// The leading field is not the protocol stream tag.
    #[error("invalid stream: {tag}")]
    InvalidStream {
        /// Tag found in the first field.
        tag: String,
    },

    /// The version field names a protocol version this dispatcher does not
    /// speak.
    #[error("unsupported protocol version: {version}")]
    UnsupportedVersion {
        /// Version found on the line.
        version: String,
    },

    /// The operation field is outside the closed operation set.
    #[error("unsupported operation: {operation}")]
    UnsupportedOperation {
        /// Operation found on the line.
        operation: String,
    },
}

impl DecodeError {
    /// Creates a malformed request error.
    pub fn malformed(expected: usize, actual: usize, line: impl Into<String>) -> Self {
        Self::MalformedRequest {
            expected,
            actual,
            line: line.into(),
        }
    }

    /// Creates an invalid encoding error from the raw line bytes.
    #[must_use]
    pub fn invalid_encoding(raw: &[u8]) -> Self {
        Self::InvalidEncoding {
            line: String::from_utf8_lossy(raw).into_owned(),
        }
    }

    /// Creates an invalid stream error.
    pub fn invalid_stream(tag: impl Into<String>) -> Self {
        Self::InvalidStream { tag: tag.into() }
    }

    /// Creates an unsupported version error.
    pub fn unsupported_version(version: impl Into<String>) -> Self {
        Self::UnsupportedVersion {
            version: version.into(),
        }
    }

    /// Creates an unsupported operation error.
    pub fn unsupported_operation(operation: impl Into<String>) -> Self {
        Self::UnsupportedOperation {
            operation: operation.into(),
        }
    }
}

/// Errors surfaced by the dispatch loop.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// A request line was rejected and the policy halts on rejection.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// No handler is bound for an operation kind.
    #[error("no handler bound for operation '{operation}'")]
    NoHandlerBound {
        /// Operation kind missing from the routing table.
        operation: Operation,
    },

    /// Reading a request or writing a result failed.
    #[error("I/O error on protocol stream: {0}")]
    Io(#[source] Arc<io::Error>),
}

impl DispatchError {
    /// Returns the process exit status for this error.
    ///
    /// Protocol violations return status 1. Setup defects and broken streams
    /// return status 2.
    #[must_use]
    pub const fn exit_status(&self) -> i32 {
        match self {
            Self::Decode(_) => 1,
            Self::NoHandlerBound { .. } | Self::Io(_) => 2,
        }
    }

    /// Creates a missing handler error.
    #[must_use]
    pub const fn no_handler_bound(operation: Operation) -> Self {
        Self::NoHandlerBound { operation }
    }
}

impl From<io::Error> for DispatchError {
    fn from(source: io::Error) -> Self {
        Self::Io(Arc::new(source))
    }
}

/// Failure reported by a handler body.
///
/// A handler failure is a normal protocol outcome: the dispatcher logs the
/// message and answers the request with `failure`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct HandlerFailure {
    message: String,
}

impl HandlerFailure {
    /// Creates a handler failure with a diagnostic message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Returns the diagnostic message.
    #[must_use]
    pub const fn message(&self) -> &str {
        self.message.as_str()
    }
}
