//! Operation routing and the request/response loop.
//!
//! The dispatcher owns a complete routing table. It reads one request line,
//! decodes it, invokes the handler bound to its operation, and writes the
//! single result line the request is owed before reading the next line.
//! Rejected lines produce no output; the [`ErrorPolicy`] decides whether the
//! loop stops or moves on.

use std::io::{BufRead, Write};

use strum::{Display, EnumString};
use tracing::{debug, info, warn};

use crate::error::{DecodeError, DispatchError, HandlerFailure};
use crate::layout::Layout;
use crate::reader::LineReader;
use crate::registry::{CheckHandler, FetchHandler, LookupHandler, Registry, UpdateHandler};
use crate::reply::{self, Reply, ReplyLine, ReplyWriter};
use crate::request::{Command, Operation, Request};

/// Tracing target for dispatch operations.
pub const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");

/// What the loop does with a request line it cannot decode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, EnumString, Display)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum ErrorPolicy {
    /// Stop the loop and report the error.
    #[default]
    FailFast,
    /// Log the error and continue with the next line.
    Skip,
}

/// Errors encountered while parsing an [`ErrorPolicy`] from text.
pub type ErrorPolicyParseError = strum::ParseError;

/// Routes decoded requests to their bound handlers.
pub struct Dispatcher {
    update: UpdateHandler,
    check: CheckHandler,
    lookup: LookupHandler,
    fetch: FetchHandler,
    layout: Layout,
    policy: ErrorPolicy,
}

impl Dispatcher {
    /// Builds a dispatcher from a fully populated registration table.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::NoHandlerBound`] naming the first operation
    /// whose slot is empty.
    pub fn new(
        registry: Registry,
        layout: Layout,
        policy: ErrorPolicy,
    ) -> Result<Self, DispatchError> {
        let Registry {
            update,
            check,
            lookup,
            fetch,
        } = registry;

        Ok(Self {
            update: update.ok_or_else(|| DispatchError::no_handler_bound(Operation::Update))?,
            check: check.ok_or_else(|| DispatchError::no_handler_bound(Operation::Check))?,
            lookup: lookup.ok_or_else(|| DispatchError::no_handler_bound(Operation::Lookup))?,
            fetch: fetch.ok_or_else(|| DispatchError::no_handler_bound(Operation::Fetch))?,
            layout,
            policy,
        })
    }

    /// Returns the header layout this dispatcher decodes.
    #[must_use]
    pub const fn layout(&self) -> Layout {
        self.layout
    }

    /// Returns the policy applied to rejected lines.
    #[must_use]
    pub const fn policy(&self) -> ErrorPolicy {
        self.policy
    }

    /// Invokes the handler bound to the request's operation.
    ///
    /// Handler failures and values that cannot be framed on one line become
    /// [`Reply::Failure`].
    pub fn route(&mut self, request: &Request<'_>) -> Reply {
        let token = request.token();
        let outcome = match request.command() {
            Command::Update => (self.update)(token).map(|()| Reply::Updated),
            Command::Check { service, key } => (self.check)(token, service, key).map(Reply::boolean),
            Command::Lookup { service, key } => {
                (self.lookup)(token, service, key).and_then(framed_result)
            }
            Command::Fetch { service } => (self.fetch)(token, service).and_then(framed_result),
        };

        outcome.unwrap_or_else(|failure| {
            warn!(
                target: DISPATCH_TARGET,
                operation = request.operation().as_str(),
                token,
                %failure,
                "handler failed"
            );
            Reply::Failure
        })
    }

    /// Decodes one request line, routes it, and writes its result line.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Decode`] if the line is rejected, in which
    /// case nothing is written, or [`DispatchError::Io`] if the result cannot
    /// be written.
    pub fn dispatch_line<W: Write>(
        &mut self,
        line: &str,
        writer: &mut ReplyWriter<W>,
    ) -> Result<(), DispatchError> {
        let request = Request::decode(line, self.layout)?;

        debug!(
            target: DISPATCH_TARGET,
            operation = request.operation().as_str(),
            token = request.token(),
            service = request.service().map(|service| service.as_str()),
            table = request.table_name(),
            "dispatching request"
        );

        let reply = self.route(&request);
        writer.write_line(&ReplyLine::new(request.token(), reply))?;
        Ok(())
    }

    /// Serves requests from `input` until it is exhausted.
    ///
    /// Each result line is flushed before the next request is read.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Decode`] for the first rejected line under
    /// [`ErrorPolicy::FailFast`], or [`DispatchError::Io`] if either stream
    /// fails. End-of-input is a clean shutdown.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, output: W) -> Result<(), DispatchError> {
        let mut reader = LineReader::new(input);
        let mut writer = ReplyWriter::new(output);
        let mut served: u64 = 0;
        let mut rejected: u64 = 0;

        while let Some(raw) = reader.next_line()? {
            let outcome = std::str::from_utf8(raw)
                .map_err(|_| DispatchError::from(DecodeError::invalid_encoding(raw)))
                .and_then(|line| self.dispatch_line(line, &mut writer));
            match outcome {
                Ok(()) => served += 1,
                Err(DispatchError::Decode(error)) if self.policy == ErrorPolicy::Skip => {
                    rejected += 1;
                    warn!(target: DISPATCH_TARGET, %error, "skipping rejected request");
                }
                Err(error) => {
                    warn!(target: DISPATCH_TARGET, %error, "dispatch stopped");
                    return Err(error);
                }
            }
        }

        info!(
            target: DISPATCH_TARGET,
            served, rejected, "input closed, dispatcher exiting"
        );
        Ok(())
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("layout", &self.layout)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

fn framed_result(value: Option<String>) -> Result<Reply, HandlerFailure> {
    match value {
        Some(value) if !reply::is_framable(&value) => Err(HandlerFailure::new(
            "handler value contains a line terminator",
        )),
        other => Ok(Reply::result(other)),
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::io::Cursor;
    use std::rc::Rc;

    use rstest::{fixture, rstest};

    use super::*;
    use crate::service::ServiceKind;

    #[fixture]
    fn registry() -> Registry {
        let mut registry = Registry::new();
        registry
            .on_check(|_, _, key| Ok(key == "present"))
            .on_lookup(|_, _, key| Ok((key == "example.com").then(|| String::from("1.2.3.4"))))
            .on_fetch(|_, _| Ok(Some(String::from("foobar"))));
        registry
    }

    fn serve(
        registry: Registry,
        layout: Layout,
        policy: ErrorPolicy,
        input: &str,
    ) -> (Result<(), DispatchError>, String) {
        let mut dispatcher = Dispatcher::new(registry, layout, policy).expect("complete registry");
        let mut output = Vec::new();
        let result = dispatcher.run(Cursor::new(input.to_owned()), &mut output);
        (result, String::from_utf8(output).expect("valid utf8"))
    }

    #[rstest]
    #[case::check(Operation::Check)]
    #[case::lookup(Operation::Lookup)]
    #[case::fetch(Operation::Fetch)]
    fn construction_fails_for_missing_slot(#[case] missing: Operation) {
        let mut registry = Registry::new();
        if missing != Operation::Check {
            registry.on_check(|_, _, _| Ok(true));
        }
        if missing != Operation::Lookup {
            registry.on_lookup(|_, _, _| Ok(None));
        }
        if missing != Operation::Fetch {
            registry.on_fetch(|_, _| Ok(None));
        }

        let error = Dispatcher::new(registry, Layout::Extended, ErrorPolicy::FailFast)
            .expect_err("incomplete registry is rejected");
        assert!(
            matches!(error, DispatchError::NoHandlerBound { operation } if operation == missing),
            "expected missing {missing}, got {error:?}"
        );
    }

    #[test]
    fn construction_reports_missing_update_first() {
        let error = Dispatcher::new(Registry::empty(), Layout::Extended, ErrorPolicy::FailFast)
            .expect_err("empty registry is rejected");
        assert!(matches!(
            error,
            DispatchError::NoHandlerBound {
                operation: Operation::Update
            }
        ));
    }

    #[rstest]
    fn default_update_acknowledges(registry: Registry) {
        let (result, output) = serve(
            registry,
            Layout::Compact,
            ErrorPolicy::FailFast,
            "table|0.1|x|update|u1\n",
        );
        assert!(result.is_ok());
        assert_eq!(output, "table-result|u1|updated\n");
    }

    #[test]
    fn failing_update_answers_failure() {
        let mut registry = registry();
        registry.on_update(|_| Err(HandlerFailure::new("reload failed")));
        let (_, output) = serve(
            registry,
            Layout::Compact,
            ErrorPolicy::FailFast,
            "table|0.1|x|update|u1\n",
        );
        assert_eq!(output, "table-result|u1|failure\n");
    }

    #[rstest]
    #[case::lookup_found("table|0.1|link|lookup|TOK1|domain|example.com", "table-result|TOK1|found|1.2.3.4")]
    #[case::lookup_absent("table|0.1|link|lookup|TOK1|domain|other.org", "table-result|TOK1|not-found")]
    #[case::check_found("table|0.1|link|check|TOK2|domain|present", "table-result|TOK2|found")]
    #[case::check_absent("table|0.1|link|check|TOK1|domain|absent", "table-result|TOK1|not-found")]
    #[case::fetch("table|0.1|link|fetch|TOK3|source", "table-result|TOK3|found|foobar")]
    fn compact_requests_get_one_result_line(
        registry: Registry,
        #[case] line: &str,
        #[case] expected: &str,
    ) {
        let (result, output) = serve(
            registry,
            Layout::Compact,
            ErrorPolicy::FailFast,
            &format!("{line}\n"),
        );
        assert!(result.is_ok());
        assert_eq!(output, format!("{expected}\n"));
    }

    #[test]
    fn handler_receives_reassembled_key_and_service() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let mut registry = registry();
        registry.on_lookup(move |token, service, key| {
            sink.borrow_mut()
                .push((token.to_owned(), service, key.to_owned()));
            Ok(None)
        });

        let (_, output) = serve(
            registry,
            Layout::Extended,
            ErrorPolicy::FailFast,
            "table|0.1|1591022347|aliases|lookup|L1|bogus|a|b\n",
        );

        assert_eq!(output, "table-result|L1|not-found\n");
        assert_eq!(
            seen.borrow().as_slice(),
            [(String::from("L1"), ServiceKind::String, String::from("a|b"))]
        );
    }

    #[test]
    fn unframable_value_answers_failure() {
        let mut registry = registry();
        registry.on_fetch(|_, _| Ok(Some(String::from("two\nlines"))));
        let (_, output) = serve(
            registry,
            Layout::Compact,
            ErrorPolicy::FailFast,
            "table|0.1|x|fetch|F1|source\n",
        );
        assert_eq!(output, "table-result|F1|failure\n");
    }

    #[test]
    fn fail_fast_stops_at_first_rejected_line() {
        let calls = Rc::new(RefCell::new(0_u32));
        let counter = Rc::clone(&calls);
        let mut registry = registry();
        registry.on_check(move |_, _, _| {
            *counter.borrow_mut() += 1;
            Ok(true)
        });

        let (result, output) = serve(
            registry,
            Layout::Compact,
            ErrorPolicy::FailFast,
            "table|0.2|link|check|TOK1|domain|x\ntable|0.1|link|check|TOK2|domain|x\n",
        );

        let error = result.expect_err("version 0.2 halts the loop");
        assert!(matches!(
            error,
            DispatchError::Decode(DecodeError::UnsupportedVersion { .. })
        ));
        assert_eq!(error.exit_status(), 1);
        assert!(output.is_empty());
        assert_eq!(*calls.borrow(), 0);
    }

    #[test]
    fn skip_policy_continues_after_rejected_line() {
        let (result, output) = serve(
            registry(),
            Layout::Compact,
            ErrorPolicy::Skip,
            "table|0.1|short\nnot-a-table-line|0.1|x|check|T0|domain|present\ntable|0.1|link|check|TOK2|domain|present\n",
        );
        assert!(result.is_ok());
        assert_eq!(output, "table-result|TOK2|found\n");
    }

    #[rstest]
    #[case::skip(ErrorPolicy::Skip)]
    #[case::fail_fast(ErrorPolicy::FailFast)]
    fn eight_bit_line_is_a_rejected_request(registry: Registry, #[case] policy: ErrorPolicy) {
        let mut dispatcher =
            Dispatcher::new(registry, Layout::Compact, policy).expect("complete registry");
        let input: &[u8] =
            b"table|0.1|x|check|T1|domain|caf\xe9\ntable|0.1|x|check|T2|domain|present\n";

        let mut output = Vec::new();
        let result = dispatcher.run(input, &mut output);

        match policy {
            ErrorPolicy::Skip => {
                assert!(result.is_ok(), "unexpected error: {result:?}");
                assert_eq!(output, b"table-result|T2|found\n");
            }
            ErrorPolicy::FailFast => {
                let error = result.expect_err("bad encoding halts the loop");
                assert!(matches!(
                    error,
                    DispatchError::Decode(DecodeError::InvalidEncoding { .. })
                ));
                assert_eq!(error.exit_status(), 1);
                assert!(output.is_empty());
            }
        }
    }

    #[test]
    fn empty_input_is_clean_shutdown() {
        let (result, output) = serve(registry(), Layout::Extended, ErrorPolicy::FailFast, "");
        assert!(result.is_ok());
        assert!(output.is_empty());
    }

    #[test]
    fn results_follow_request_order() {
        let (result, output) = serve(
            registry(),
            Layout::Extended,
            ErrorPolicy::FailFast,
            concat!(
                "table|0.1|1|t|check|A|domain|present\n",
                "table|0.1|1|t|update|B\n",
                "table|0.1|1|t|lookup|C|domain|example.com\n",
            ),
        );
        assert!(result.is_ok());
        assert_eq!(
            output,
            concat!(
                "table-result|A|found\n",
                "table-result|B|updated\n",
                "table-result|C|found|1.2.3.4\n",
            )
        );
    }

    #[rstest]
    #[case::fail_fast("fail-fast", ErrorPolicy::FailFast)]
    #[case::skip("SKIP", ErrorPolicy::Skip)]
    fn policy_parses_from_text(#[case] text: &str, #[case] expected: ErrorPolicy) {
        assert_eq!(text.parse::<ErrorPolicy>(), Ok(expected));
    }
}
