//! Result line encoding.
//!
//! Every request is answered with exactly one line:
//!
//! ```text
//! table-result|<token>|failure
//! table-result|<token>|updated
//! table-result|<token>|found
//! table-result|<token>|found|<value>
//! table-result|<token>|not-found
//! ```
//!
//! The value is the final field, so it may contain the delimiter. It must not
//! contain a line terminator; see [`is_framable`].

use std::fmt;
use std::io::{self, Write};

use thiserror::Error;

use crate::fields::{self, DELIMITER};

/// Literal tag opening every result line.
pub const RESULT_TAG: &str = "table-result";

/// Outcome carried by a result line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// The handler could not answer the request.
    Failure,
    /// An `update` request was acknowledged.
    Updated,
    /// A `check` found the key.
    Found,
    /// A `lookup` or `fetch` produced a value.
    FoundValue(String),
    /// The key or value is absent.
    NotFound,
}

impl Reply {
    /// Outcome of a `check`.
    #[must_use]
    pub const fn boolean(found: bool) -> Self {
        if found { Self::Found } else { Self::NotFound }
    }

    /// Outcome of a `lookup` or `fetch`.
    #[must_use]
    pub fn result(value: Option<String>) -> Self {
        value.map_or(Self::NotFound, Self::FoundValue)
    }
}

/// A result line: the echoed token and its outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyLine {
    token: String,
    reply: Reply,
}

/// Errors raised while parsing a result line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReplyParseError {
    /// The line does not start with the result tag.
    #[error("not a table result: {line}")]
    MissingTag {
        /// The offending line.
        line: String,
    },
    /// The line ends before the outcome field.
    #[error("truncated table result: {line}")]
    Truncated {
        /// The offending line.
        line: String,
    },
    /// The outcome field is not part of the result grammar.
    #[error("unknown table result outcome: {outcome}")]
    UnknownOutcome {
        /// Outcome found on the line.
        outcome: String,
    },
}

impl ReplyLine {
    /// Pairs a token with an outcome.
    pub fn new(token: impl Into<String>, reply: Reply) -> Self {
        Self {
            token: token.into(),
            reply,
        }
    }

    /// Returns the echoed session token.
    #[must_use]
    pub const fn token(&self) -> &str {
        self.token.as_str()
    }

    /// Returns the outcome.
    #[must_use]
    pub const fn reply(&self) -> &Reply {
        &self.reply
    }

    /// Parses a result line, without its terminator.
    ///
    /// # Errors
    ///
    /// Returns a [`ReplyParseError`] if the line does not follow the result
    /// grammar.
    ///
    /// # Example
    ///
    /// ```
    /// use tablekit::{Reply, ReplyLine};
    ///
    /// let line = ReplyLine::parse("table-result|TOK1|found|1.2.3.4").expect("valid result");
    /// assert_eq!(line.token(), "TOK1");
    /// assert_eq!(line.reply(), &Reply::FoundValue(String::from("1.2.3.4")));
    /// ```
    pub fn parse(line: &str) -> Result<Self, ReplyParseError> {
        let mut parts = fields::split_bounded(line, 4);
        if parts.next() != Some(RESULT_TAG) {
            return Err(ReplyParseError::MissingTag {
                line: line.to_owned(),
            });
        }

        let (Some(token), Some(outcome)) = (parts.next(), parts.next()) else {
            return Err(ReplyParseError::Truncated {
                line: line.to_owned(),
            });
        };

        let reply = match (outcome, parts.next()) {
            ("failure", None) => Reply::Failure,
            ("updated", None) => Reply::Updated,
            ("found", None) => Reply::Found,
            ("found", Some(value)) => Reply::FoundValue(value.to_owned()),
            ("not-found", None) => Reply::NotFound,
            _ => {
                return Err(ReplyParseError::UnknownOutcome {
                    outcome: outcome.to_owned(),
                });
            }
        };

        Ok(Self::new(token, reply))
    }
}

impl fmt::Display for ReplyLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{RESULT_TAG}{DELIMITER}{}{DELIMITER}", self.token)?;
        match &self.reply {
            Reply::Failure => f.write_str("failure"),
            Reply::Updated => f.write_str("updated"),
            Reply::Found => f.write_str("found"),
            Reply::FoundValue(value) => write!(f, "found{DELIMITER}{value}"),
            Reply::NotFound => f.write_str("not-found"),
        }
    }
}

/// Returns whether a value fits on a single result line.
#[must_use]
pub fn is_framable(value: &str) -> bool {
    !value.contains(['\n', '\r'])
}

/// Writer that emits result lines to the output stream.
///
/// Each line is flushed as soon as it is written so the peer can read the
/// answer before sending its next request.
#[derive(Debug)]
pub struct ReplyWriter<W> {
    writer: W,
}

impl<W: Write> ReplyWriter<W> {
    /// Wraps an output stream.
    pub const fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Writes one result line and flushes the stream.
    ///
    /// # Errors
    ///
    /// Returns an error if writing or flushing fails.
    pub fn write_line(&mut self, line: &ReplyLine) -> io::Result<()> {
        writeln!(self.writer, "{line}")?;
        self.writer.flush()
    }

    /// Reports a generic handler failure.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn failure(&mut self, token: &str) -> io::Result<()> {
        self.write_line(&ReplyLine::new(token, Reply::Failure))
    }

    /// Acknowledges an `update`.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn updated(&mut self, token: &str) -> io::Result<()> {
        self.write_line(&ReplyLine::new(token, Reply::Updated))
    }

    /// Reports the outcome of a `check`.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn boolean(&mut self, token: &str, found: bool) -> io::Result<()> {
        self.write_line(&ReplyLine::new(token, Reply::boolean(found)))
    }

    /// Reports the outcome of a `lookup` or `fetch`.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn result(&mut self, token: &str, value: Option<&str>) -> io::Result<()> {
        self.write_line(&ReplyLine::new(
            token,
            Reply::result(value.map(str::to_owned)),
        ))
    }

    /// Consumes the writer, returning the output stream.
    pub fn into_inner(self) -> W {
        self.writer
    }
}
