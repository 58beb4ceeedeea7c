//! Session and completion tests

use super::commands::{CommandHandler, CommandResult};
use super::completion::extract;
use super::outcome::ExecutionStatus;
use super::session::ReplSession;

fn extract_at_end(text: &str) -> (String, String) {
    let e = extract(text, text.len());
    (e.expression, e.prefix)
}

fn submit_ok(session: &mut ReplSession, code: &str) {
    let outcome = session.submit(code);
    assert_eq!(
        outcome.status,
        ExecutionStatus::Ok,
        "submission {code:?} failed: {:?}",
        outcome.result
    );
}

// === Expression extraction ===

#[test]
fn extraction_fixtures() {
    let cases = [
        ("1234", "", ""),
        ("1234.", "1234", ""),
        ("\"test\"", "", ""),
        ("\"test\".", "\"test\"", ""),
        ("\"test\".Leng", "\"test\"", "Leng"),
        ("if (\"test\".Leng", "\"test\"", "Leng"),
        ("k += array[3].", "array[3]", ""),
    ];
    for (input, expression, prefix) in cases {
        assert_eq!(
            extract_at_end(input),
            (expression.to_string(), prefix.to_string()),
            "wrong extraction for {input:?}"
        );
    }
}

#[test]
fn extraction_handles_nested_receivers() {
    assert_eq!(extract_at_end("a.b."), ("a.b".into(), "".into()));
    assert_eq!(extract_at_end("(1..5)."), ("(1..5)".into(), "".into()));
    assert_eq!(
        extract_at_end("f(xs[0].le"),
        ("xs[0]".into(), "le".into())
    );
}

#[test]
fn extraction_requires_member_access_at_cursor() {
    assert_eq!(extract_at_end(""), ("".into(), "".into()));
    assert_eq!(extract_at_end("xs"), ("".into(), "".into()));
    assert_eq!(extract_at_end("xs + 1"), ("".into(), "".into()));
    assert_eq!(extract_at_end("xs.len()"), ("".into(), "".into()));
}

#[test]
fn extraction_truncates_at_cursor() {
    let e = extract("xs.len_extra", 6);
    assert_eq!(e.expression, "xs");
    assert_eq!(e.prefix, "len");
}

#[test]
fn extraction_survives_malformed_input() {
    for input in ["= = x.", "((((", "\"unterminated.", "} k."] {
        // must not panic; the result may or may not carry an expression
        let _ = extract(input, input.len());
    }
}

// === Member resolution ===

#[test]
fn completes_single_member_with_suffix() {
    let mut session = ReplSession::new();
    submit_ok(&mut session, "greeting = \"hello\"");

    let result = session.complete("greeting.up", 11);
    assert_eq!(result.lines, vec!["Str upper()"]);
    assert_eq!(result.insertion_suffix, "per");
}

#[test]
fn single_name_lists_all_overloads() {
    let mut session = ReplSession::new();
    submit_ok(&mut session, "greeting = \"hello\"");

    let result = session.complete("greeting.sl", 11);
    assert_eq!(
        result.lines,
        vec!["Str slice(Int start)", "Str slice(Int start, Int end)"]
    );
    assert_eq!(result.insertion_suffix, "ice");
}

#[test]
fn multiple_names_group_with_overload_counts() {
    let mut session = ReplSession::new();
    submit_ok(&mut session, "greeting = \"hello\"");

    let result = session.complete("greeting.s", 10);
    assert_eq!(
        result.lines,
        vec![
            "slice -- Str slice(Int start) (+1 overload)",
            "split -- List[Str] split(Str separator)",
            "starts_with -- Bool starts_with(Str prefix)",
            "str -- Str str()",
        ]
    );
    assert_eq!(result.insertion_suffix, "");
}

#[test]
fn empty_prefix_lists_every_member() {
    let mut session = ReplSession::new();
    submit_ok(&mut session, "nums = [3, 1, 2]");

    let result = session.complete("nums.", 5);
    let names: Vec<&str> = result
        .lines
        .iter()
        .map(|l| l.split(" -- ").next().unwrap_or(""))
        .collect();
    assert_eq!(
        names,
        vec!["at", "contains", "copy", "index_of", "len", "length", "slice", "str"]
    );
    assert_eq!(result.insertion_suffix, "");
}

#[test]
fn imports_grow_the_candidate_set() {
    let mut session = ReplSession::new();
    submit_ok(&mut session, "nums = [3, 1, 2]");

    assert!(session.complete("nums.so", 7).is_empty());

    submit_ok(&mut session, "use std.seq");
    let result = session.complete("nums.so", 7);
    assert_eq!(result.lines, vec!["List[Int] sorted()"]);
    assert_eq!(result.insertion_suffix, "rted");
}

#[test]
fn generic_constraints_filter_candidates() {
    let mut session = ReplSession::new();
    submit_ok(&mut session, "use std.seq");
    submit_ok(&mut session, "names = [\"b\", \"a\"]");

    // sum requires numeric elements and must not appear for List[Str]
    assert!(session.complete("names.su", 8).is_empty());
    assert_eq!(
        session.complete("names.sor", 9).lines,
        vec!["List[Str] sorted()"]
    );
}

#[test]
fn interface_path_matches_range_receivers() {
    let mut session = ReplSession::new();
    submit_ok(&mut session, "use std.seq");

    let result = session.complete("(1..9).so", 9);
    assert_eq!(result.lines, vec!["List[Int] sorted()"]);
}

#[test]
fn indexed_receiver_completes() {
    let mut session = ReplSession::new();
    submit_ok(&mut session, "words = [\"alpha\", \"beta\"]");

    let result = session.complete("words[0].up", 11);
    assert_eq!(result.lines, vec!["Str upper()"]);
}

#[test]
fn failures_collapse_to_empty_result() {
    let session = ReplSession::new();
    assert!(session.complete("undefined_thing.", 16).is_empty());
    assert!(session.complete("nil.", 4).is_empty());
    assert!(session.complete("\"x\".bogus_prefix", 16).is_empty());
    assert!(session.complete("1 +/ 2.", 7).is_empty());
}

#[test]
fn completion_does_not_mutate_the_session() {
    let mut session = ReplSession::new();
    submit_ok(&mut session, "nums = [1, 2]");
    let before_bindings = session.bindings();
    let before_imports = session.imports();

    let _ = session.complete("nums.", 5);
    let _ = session.complete("nums.slice(1).", 14);

    assert_eq!(session.bindings(), before_bindings);
    assert_eq!(session.imports(), before_imports);
}

// === Session ===

#[test]
fn submit_reports_value_and_type() {
    let mut session = ReplSession::new();
    submit_ok(&mut session, "x = 42");

    let outcome = session.submit("x + 1");
    assert_eq!(outcome.status, ExecutionStatus::Ok);
    assert_eq!(outcome.result.as_deref(), Some("43"));
    assert_eq!(outcome.result_type.as_deref(), Some("Int"));
}

#[test]
fn assignments_produce_no_result() {
    let mut session = ReplSession::new();
    let outcome = session.submit("x = 42");
    assert_eq!(outcome.status, ExecutionStatus::Ok);
    assert_eq!(outcome.result, None);
    assert_eq!(outcome.result_type, None);
}

#[test]
fn container_results_render_as_counts() {
    let mut session = ReplSession::new();
    let outcome = session.submit("[1, 2, 3]");
    assert_eq!(outcome.result.as_deref(), Some("3 objects"));
    assert_eq!(outcome.result_type.as_deref(), Some("List[Int]"));
}

#[test]
fn compile_error_leaves_session_unchanged() {
    let mut session = ReplSession::new();
    submit_ok(&mut session, "x = 1");
    let before = session.bindings();

    let outcome = session.submit("y = ");
    assert_eq!(outcome.status, ExecutionStatus::Error);
    assert!(outcome
        .result
        .as_deref()
        .unwrap_or("")
        .starts_with("Compile error:"));
    assert_eq!(session.bindings(), before);
}

#[test]
fn runtime_error_leaves_session_unchanged() {
    let mut session = ReplSession::new();
    submit_ok(&mut session, "x = 1");
    let before = session.bindings();

    let outcome = session.submit("x = 2; boom()");
    assert_eq!(outcome.status, ExecutionStatus::Error);
    let message = outcome.result.as_deref().unwrap_or("");
    assert!(message.starts_with("Runtime error: [unknown function: boom]"));
    assert!(message.contains("at <input>"));
    assert_eq!(session.bindings(), before);
}

#[test]
fn runtime_error_reports_call_trace() {
    let mut session = ReplSession::new();
    submit_ok(&mut session, "fn inner(x) { return x / 0 }");
    submit_ok(&mut session, "fn outer(x) { return inner(x) }");

    let outcome = session.submit("outer(4)");
    let message = outcome.result.as_deref().unwrap_or("");
    assert!(message.starts_with("Runtime error: [division by zero]"));
    assert!(message.contains("at inner, at outer, at <input>"));
}

#[test]
fn unknown_module_is_a_compile_error() {
    let mut session = ReplSession::new();
    let outcome = session.submit("use std.nothere");
    assert_eq!(outcome.status, ExecutionStatus::Error);
    assert_eq!(
        outcome.result.as_deref(),
        Some("Compile error:\nunknown module: std.nothere")
    );
}

#[test]
fn imports_commit_only_on_success() {
    let mut session = ReplSession::new();

    let outcome = session.submit("use std.seq; boom()");
    assert_eq!(outcome.status, ExecutionStatus::Error);
    assert!(!session.imports().contains(&"std.seq".to_string()));

    submit_ok(&mut session, "use std.seq");
    assert!(session.imports().contains(&"std.seq".to_string()));
}

#[test]
fn redeclaration_keeps_one_entry_with_latest_value() {
    let mut session = ReplSession::new();
    submit_ok(&mut session, "v = 1");
    submit_ok(&mut session, "v = \"hi\"");

    let bindings = session.bindings();
    let entries: Vec<_> = bindings.iter().filter(|b| b.name == "v").collect();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].ty, "Str");
    assert_eq!(entries[0].value, "hi");
}

#[test]
fn bindings_are_sorted_by_name() {
    let mut session = ReplSession::new();
    submit_ok(&mut session, "zed = 1");
    submit_ok(&mut session, "alpha = 2");
    submit_ok(&mut session, "mid = 3");

    let bindings = session.bindings();
    let names: Vec<&str> = bindings.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(names, vec!["alpha", "mid", "zed"]);
}

#[test]
fn binding_sizes_and_values() {
    let mut session = ReplSession::new();
    submit_ok(&mut session, "xs = [1, 2]");
    submit_ok(&mut session, "s = \"hey\"");
    submit_ok(&mut session, "fn add(a, b) { return a + b }");

    let bindings = session.bindings();
    let get = |name: &str| bindings.iter().find(|b| b.name == name).expect(name);

    let xs = get("xs");
    assert_eq!((xs.size, xs.value.as_str()), (2, "2 objects"));
    assert_eq!(xs.ty, "List[Int]");

    let s = get("s");
    assert_eq!((s.size, s.value.as_str()), (1, "hey"));

    let add = get("add");
    assert_eq!(add.ty, "Func");
    assert_eq!(add.value, "fn add(a, b)");
}

#[test]
fn reset_discards_everything() {
    let mut session = ReplSession::new();
    submit_ok(&mut session, "use std.seq");
    submit_ok(&mut session, "x = 1");

    let outcome = session.reset();
    assert_eq!(outcome.status, ExecutionStatus::Ok);
    assert_eq!(outcome.result, None);
    assert!(session.bindings().is_empty());
    assert_eq!(session.imports(), vec!["std.core".to_string()]);

    // idempotent
    session.reset();
    assert!(session.bindings().is_empty());
}

// === Extraction properties ===

mod properties {
    use super::extract;
    use crate::frontend::lexer::tokens::TokenKind;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn trailing_dot_extracts_the_identifier(name in "[a-z_][a-z0-9_]{0,8}") {
            prop_assume!(TokenKind::keyword(&name).is_none());
            let input = format!("{}.", name);
            let e = extract(&input, input.len());
            prop_assert_eq!(e.expression, name);
            prop_assert_eq!(e.prefix, "");
        }

        #[test]
        fn partial_member_extracts_identifier_and_prefix(
            name in "[a-z_][a-z0-9_]{0,8}",
            member in "[a-z][a-z0-9_]{0,8}",
        ) {
            prop_assume!(TokenKind::keyword(&name).is_none());
            prop_assume!(TokenKind::keyword(&member).is_none());
            let input = format!("{}.{}", name, member);
            let e = extract(&input, input.len());
            prop_assert_eq!(e.expression, name);
            prop_assert_eq!(e.prefix, member);
        }

        #[test]
        fn bare_identifier_extracts_nothing(name in "[a-z_][a-z0-9_]{0,8}") {
            prop_assume!(TokenKind::keyword(&name).is_none());
            let e = extract(&name, name.len());
            prop_assert_eq!(e.expression, "");
            prop_assert_eq!(e.prefix, "");
        }
    }
}

// === Commands ===

#[test]
fn commands_act_on_the_session() {
    let mut session = ReplSession::new();
    submit_ok(&mut session, "x = 5");

    let mut handler = CommandHandler::new(&mut session);
    match handler.handle(":vars") {
        CommandResult::Output(out) => assert!(out.contains("x = 5 (Int)")),
        other => panic!("expected output, got {other:?}"),
    }
    match handler.handle(":type x") {
        CommandResult::Output(out) => assert_eq!(out, "x: Int"),
        other => panic!("expected output, got {other:?}"),
    }
    assert!(matches!(handler.handle(":quit"), CommandResult::Exit));
    assert!(matches!(handler.handle(":clear"), CommandResult::Output(_)));
    assert!(session.bindings().is_empty());
}
