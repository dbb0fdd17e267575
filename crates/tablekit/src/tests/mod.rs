//! Crate-level integration and BDD tests.

use std::io::Cursor;

use crate::{Dispatcher, ErrorPolicy, Layout, Registry, Reply, ReplyLine, ServiceKind};


fn echo_registry() -> Registry {
    let mut registry = Registry::new();
    registry
        .on_check(|_, _, key| Ok(!key.is_empty()))
        .on_lookup(|_, service, key| Ok(Some(format!("{service}:{key}"))))
        .on_fetch(|_, service| Ok(Some(service.to_string())));
    registry
}

#[test]
fn every_service_kind_round_trips_through_a_lookup() {
    let mut dispatcher = Dispatcher::new(echo_registry(), Layout::Extended, ErrorPolicy::FailFast)
        .expect("complete registry");

    let input: String = ServiceKind::ALL
        .iter()
        .map(|kind| format!("table|0.1|1591022347|t|lookup|{kind}|{kind}|k\n"))
        .collect();
    let mut output = Vec::new();
    dispatcher
        .run(Cursor::new(input), &mut output)
        .expect("dispatch succeeds");

    let text = String::from_utf8(output).expect("valid utf8");
    let lines: Vec<ReplyLine> = text
        .lines()
        .map(|line| ReplyLine::parse(line).expect("parse result"))
        .collect();

    assert_eq!(lines.len(), ServiceKind::ALL.len());
    for (line, kind) in lines.iter().zip(ServiceKind::ALL) {
        assert_eq!(line.token(), kind.as_str());
        assert_eq!(line.reply(), &Reply::FoundValue(format!("{kind}:k")));
    }
}

#[test]
fn check_results_echo_tokens_with_boolean_grammar() {
    let mut dispatcher = Dispatcher::new(echo_registry(), Layout::Compact, ErrorPolicy::FailFast)
        .expect("complete registry");

    let input = "table|0.1|x|check|yes|domain|k\ntable|0.1|x|check|no|domain|\n";
    let mut output = Vec::new();
    dispatcher
        .run(Cursor::new(input), &mut output)
        .expect("dispatch succeeds");

    let text = String::from_utf8(output).expect("valid utf8");
    let lines: Vec<ReplyLine> = text
        .lines()
        .map(|line| ReplyLine::parse(line).expect("parse result"))
        .collect();
    assert_eq!(
        lines,
        [
            ReplyLine::new("yes", Reply::Found),
            ReplyLine::new("no", Reply::NotFound),
        ]
    );
}
