//! Line-protocol dispatcher for external lookup tables.
//!
//! The `tablekit` crate lets a lookup server delegate table operations to a
//! pluggable backend running as a subprocess. The server writes one request
//! per line to the backend's standard input and reads exactly one result line
//! back from its standard output before sending the next request.
//!
//! # Architecture
//!
//! A request travels through a fixed pipeline:
//!
//! 1. [`LineReader`] pulls the next raw line from the input stream, and the
//!    dispatcher rejects it if it is not valid UTF-8.
//! 2. [`fields`] splits it on the `|` delimiter.
//! 3. [`Request::decode`] validates the header and extracts the operation,
//!    session token, [`ServiceKind`], and key.
//! 4. [`Dispatcher`] routes the request to the handler bound in its
//!    [`Registry`].
//! 5. [`ReplyWriter`] encodes the handler outcome as a single
//!    `table-result|...` line.
//!
//! Handlers never write to the output stream themselves. They return typed
//! outcomes and the dispatcher performs the one emission each request is
//! owed.
//!
//! # Example
//!
//! ```rust
//! use std::io::Cursor;
//!
//! use tablekit::{Dispatcher, ErrorPolicy, Layout, Registry};
//!
//! let mut registry = Registry::new();
//! registry
//!     .on_check(|_token, _service, key| Ok(key == "example.com"))
//!     .on_lookup(|_token, _service, _key| Ok(Some(String::from("1.2.3.4"))))
//!     .on_fetch(|_token, _service| Ok(None));
//!
//! let mut dispatcher = Dispatcher::new(registry, Layout::Compact, ErrorPolicy::FailFast)
//!     .expect("all handlers are bound");
//!
//! let input = Cursor::new("table|0.1|link|lookup|TOK1|domain|example.com\n");
//! let mut output = Vec::new();
//! dispatcher.run(input, &mut output).expect("dispatch succeeds");
//!
//! assert_eq!(output, b"table-result|TOK1|found|1.2.3.4\n");
//! ```

pub mod dispatcher;
pub mod error;
pub mod fields;
pub mod layout;
pub mod reader;
pub mod registry;
pub mod reply;
pub mod request;
pub mod service;

#[cfg(test)]
mod tests;

pub use self::dispatcher::{DISPATCH_TARGET, Dispatcher, ErrorPolicy, ErrorPolicyParseError};
pub use self::error::{DecodeError, DispatchError, HandlerFailure};
pub use self::layout::{Layout, LayoutParseError, PROTOCOL_VERSION, STREAM_TAG};
pub use self::reader::LineReader;
pub use self::registry::Registry;
pub use self::reply::{RESULT_TAG, Reply, ReplyLine, ReplyParseError, ReplyWriter};
pub use self::request::{Command, Operation, Request};
pub use self::service::ServiceKind;
