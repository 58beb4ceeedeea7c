//! End-to-end session tests through the public API

use kestrel::repl::{ExecutionStatus, ReplSession};

#[test]
fn interactive_session_walkthrough() {
    let mut session = ReplSession::new();

    // state accumulates across submissions
    assert_eq!(session.submit("x = 2").status, ExecutionStatus::Ok);
    assert_eq!(session.submit("y = x * 21").status, ExecutionStatus::Ok);
    assert_eq!(session.submit("y").result.as_deref(), Some("42"));

    // a failing submission changes nothing
    let failed = session.submit("y = y / 0");
    assert_eq!(failed.status, ExecutionStatus::Error);
    assert_eq!(session.submit("y").result.as_deref(), Some("42"));

    // imports unlock extensions for execution and completion alike
    assert_eq!(session.submit("use std.seq").status, ExecutionStatus::Ok);
    assert_eq!(session.submit("sum([y, 8])").result.as_deref(), Some("50"));

    let completion = session.complete("[3, 1].so", 9);
    assert_eq!(completion.lines, vec!["List[Int] sorted()"]);
    assert_eq!(completion.insertion_suffix, "rted");
}

#[test]
fn literal_receivers_complete() {
    let session = ReplSession::new();

    let completion = session.complete("1234.to_f", 9);
    assert_eq!(completion.lines, vec!["Float to_float()"]);
    assert_eq!(completion.insertion_suffix, "loat");

    // two names share the typed prefix, so nothing further can be inserted
    let completion = session.complete("1234.to_", 8);
    assert_eq!(completion.lines.len(), 2);
    assert_eq!(completion.insertion_suffix, "");
}

#[test]
fn functions_persist_across_submissions() {
    let mut session = ReplSession::new();
    let outcome = session.submit("fn fib(n) { if n < 2 { return n }; return fib(n - 1) + fib(n - 2) }");
    assert_eq!(outcome.status, ExecutionStatus::Ok);
    assert_eq!(session.submit("fib(10)").result.as_deref(), Some("55"));
}

#[test]
fn map_workflow() {
    let mut session = ReplSession::new();
    assert_eq!(
        session.submit("m = {\"a\": 1}").status,
        ExecutionStatus::Ok
    );
    assert_eq!(session.submit("m[\"b\"] = 2").status, ExecutionStatus::Ok);
    assert_eq!(session.submit("m.length").result.as_deref(), Some("2"));
    // method results go through the same bounded rendering as bindings
    assert_eq!(session.submit("m.keys()").result.as_deref(), Some("2 objects"));
    assert_eq!(
        session.submit("m.keys()").result_type.as_deref(),
        Some("List[Str]")
    );
}

#[test]
fn reset_restores_fresh_state() {
    let mut session = ReplSession::new();
    session.submit("use std.seq");
    session.submit("x = 1");

    session.reset();
    assert!(session.bindings().is_empty());

    let outcome = session.submit("x");
    assert_eq!(outcome.status, ExecutionStatus::Error);
    assert!(outcome
        .result
        .as_deref()
        .unwrap_or("")
        .contains("undefined variable: x"));
}

#[test]
fn multi_statement_submission_is_atomic() {
    let mut session = ReplSession::new();
    let outcome = session.submit("a = 1; b = 2; boom(); c = 3");
    assert_eq!(outcome.status, ExecutionStatus::Error);
    // nothing from the failed submission survives, not even the early parts
    assert!(session.bindings().is_empty());
}

#[test]
fn completion_with_user_defined_state() {
    let mut session = ReplSession::new();
    session.submit("use std.text");
    session.submit("message = \"  hello world  \"");

    let completion = session.complete("message.tr", 10);
    assert_eq!(completion.lines, vec!["Str trimmed()"]);
    assert_eq!(completion.insertion_suffix, "immed");

    // the receiver can be an arbitrary expression over session state
    let completion = session.complete("message.trimmed().wo", 20);
    assert_eq!(completion.lines, vec!["List[Str] words()"]);
    assert_eq!(completion.insertion_suffix, "rds");
}
