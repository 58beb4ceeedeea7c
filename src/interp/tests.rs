//! Engine unit tests

use indexmap::IndexSet;

use super::catalog::CATALOG;
use super::env::Environment;
use super::eval::{EvalError, Interpreter};
use super::types::{implements, satisfies, unify, Constraint, Iface, Subst, Ty};
use super::value::Value;
use crate::frontend::lexer::tokenize;
use crate::frontend::parser::parse;

fn eval_ok(env: &mut Environment, source: &str) -> Option<Value> {
    let tokens = tokenize(source).unwrap();
    let (module, errors) = parse(&tokens);
    assert!(errors.is_empty(), "parse errors in {source:?}: {errors:?}");
    Interpreter::new(env)
        .run_module(&module)
        .unwrap_or_else(|f| panic!("evaluation of {source:?} failed: {}", f.error))
}

fn eval_value(env: &mut Environment, source: &str) -> Value {
    eval_ok(env, source).unwrap_or_else(|| panic!("{source:?} produced no value"))
}

fn eval_err(env: &mut Environment, source: &str) -> EvalError {
    let tokens = tokenize(source).unwrap();
    let (module, errors) = parse(&tokens);
    assert!(errors.is_empty(), "parse errors in {source:?}: {errors:?}");
    match Interpreter::new(env).run_module(&module) {
        Ok(_) => panic!("{source:?} unexpectedly succeeded"),
        Err(failure) => failure.error,
    }
}

#[test]
fn arithmetic() {
    let mut env = Environment::new();
    assert_eq!(eval_value(&mut env, "1 + 2 * 3"), Value::Int(7));
    assert_eq!(eval_value(&mut env, "7 / 2"), Value::Int(3));
    assert_eq!(eval_value(&mut env, "10 % 3"), Value::Int(1));
    assert_eq!(eval_value(&mut env, "1.5 + 1"), Value::Float(2.5));
}

#[test]
fn division_by_zero() {
    let mut env = Environment::new();
    assert_eq!(eval_err(&mut env, "10 / 0"), EvalError::DivisionByZero);
}

#[test]
fn string_concatenation() {
    let mut env = Environment::new();
    assert_eq!(
        eval_value(&mut env, "\"foo\" + \"bar\""),
        Value::Str("foobar".into())
    );
}

#[test]
fn comparison_and_logic() {
    let mut env = Environment::new();
    assert_eq!(
        eval_value(&mut env, "1 < 2 && 3 >= 3"),
        Value::Bool(true)
    );
    assert_eq!(
        eval_value(&mut env, "false || 2 == 2"),
        Value::Bool(true)
    );
}

#[test]
fn state_persists_across_runs() {
    let mut env = Environment::new();
    eval_ok(&mut env, "x = 10");
    assert_eq!(eval_value(&mut env, "x + 5"), Value::Int(15));
}

#[test]
fn compound_assignment() {
    let mut env = Environment::new();
    eval_ok(&mut env, "k = 1; k += 4");
    assert_eq!(eval_value(&mut env, "k"), Value::Int(5));
}

#[test]
fn assignment_produces_no_value() {
    let mut env = Environment::new();
    assert_eq!(eval_ok(&mut env, "x = 1"), None);
}

#[test]
fn list_indexing() {
    let mut env = Environment::new();
    eval_ok(&mut env, "xs = [1, 2, 3]");
    assert_eq!(eval_value(&mut env, "xs[1]"), Value::Int(2));
    assert!(matches!(
        eval_err(&mut env, "xs[7]"),
        EvalError::IndexOutOfBounds { index: 7, len: 3 }
    ));
}

#[test]
fn index_assignment() {
    let mut env = Environment::new();
    eval_ok(&mut env, "xs = [1, 2, 3]; xs[0] = 9");
    assert_eq!(
        eval_value(&mut env, "xs"),
        Value::List(vec![Value::Int(9), Value::Int(2), Value::Int(3)])
    );
}

#[test]
fn nested_index_assignment() {
    let mut env = Environment::new();
    eval_ok(&mut env, "g = {\"xs\": [1, 2]}; g[\"xs\"][0] = 5");
    assert_eq!(eval_value(&mut env, "g[\"xs\"][0]"), Value::Int(5));
}

#[test]
fn map_access() {
    let mut env = Environment::new();
    eval_ok(&mut env, "m = {\"a\": 1}");
    assert_eq!(eval_value(&mut env, "m[\"a\"]"), Value::Int(1));
    assert!(matches!(
        eval_err(&mut env, "m[\"missing\"]"),
        EvalError::KeyNotFound(_)
    ));
    eval_ok(&mut env, "m[\"b\"] = 2");
    assert_eq!(eval_value(&mut env, "m.length"), Value::Int(2));
}

#[test]
fn string_members() {
    let mut env = Environment::new();
    assert_eq!(
        eval_value(&mut env, "\"hello\".upper()"),
        Value::Str("HELLO".into())
    );
    assert_eq!(eval_value(&mut env, "\"hello\".length"), Value::Int(5));
    assert_eq!(
        eval_value(&mut env, "\"hello\".slice(1)"),
        Value::Str("ello".into())
    );
    assert_eq!(
        eval_value(&mut env, "\"hello\".slice(1, 3)"),
        Value::Str("el".into())
    );
}

#[test]
fn extension_from_default_import() {
    let mut env = Environment::new();
    assert_eq!(eval_value(&mut env, "len(\"abc\")"), Value::Int(3));
    assert_eq!(eval_value(&mut env, "\"abc\".len()"), Value::Int(3));
}

#[test]
fn extension_requires_import() {
    let mut env = Environment::new();
    assert!(matches!(
        eval_err(&mut env, "[2, 1].sorted()"),
        EvalError::UnknownMember { .. }
    ));
    env.add_import("std.seq");
    assert_eq!(
        eval_value(&mut env, "[2, 1].sorted()"),
        Value::List(vec![Value::Int(1), Value::Int(2)])
    );
}

#[test]
fn free_call_overloads_pick_by_argument_type() {
    let mut env = Environment::new();
    assert_eq!(eval_value(&mut env, "int(\"12\")"), Value::Int(12));
    assert_eq!(eval_value(&mut env, "int(3.9)"), Value::Int(3));
}

#[test]
fn range_members() {
    let mut env = Environment::new();
    assert_eq!(
        eval_value(&mut env, "(1..4).to_list()"),
        Value::List(vec![Value::Int(1), Value::Int(2), Value::Int(3)])
    );
    assert_eq!(eval_value(&mut env, "(1..4).length"), Value::Int(3));
}

#[test]
fn for_loop_accumulates() {
    let mut env = Environment::new();
    eval_ok(&mut env, "total = 0; for x in 1..5 { total += x }");
    assert_eq!(eval_value(&mut env, "total"), Value::Int(10));
}

#[test]
fn while_with_break() {
    let mut env = Environment::new();
    eval_ok(&mut env, "i = 0; while true { i += 1; if i == 3 { break } }");
    assert_eq!(eval_value(&mut env, "i"), Value::Int(3));
}

#[test]
fn function_definition_and_call() {
    let mut env = Environment::new();
    eval_ok(&mut env, "fn add(a, b) { return a + b }");
    assert_eq!(eval_value(&mut env, "add(2, 3)"), Value::Int(5));
}

#[test]
fn recursive_function() {
    let mut env = Environment::new();
    eval_ok(
        &mut env,
        "fn fact(n) { if n <= 1 { return 1 }; return n * fact(n - 1) }",
    );
    assert_eq!(eval_value(&mut env, "fact(5)"), Value::Int(120));
}

#[test]
fn runaway_recursion_is_cut_off() {
    let mut env = Environment::new();
    eval_ok(&mut env, "fn spin(n) { return spin(n) }");
    let tokens = tokenize("spin(1)").unwrap();
    let (module, _) = parse(&tokens);
    let failure = Interpreter::new(&mut env)
        .run_module(&module)
        .expect_err("expected a failure");
    assert_eq!(failure.error, EvalError::CallStackOverflow);
    assert!(failure.trace_display().contains("at spin"));
}

#[test]
fn undefined_variable() {
    let mut env = Environment::new();
    assert_eq!(
        eval_err(&mut env, "nope"),
        EvalError::Undefined("nope".into())
    );
}

#[test]
fn condition_must_be_bool() {
    let mut env = Environment::new();
    assert!(matches!(
        eval_err(&mut env, "if 1 { }"),
        EvalError::TypeMismatch(_)
    ));
}

#[test]
fn cloned_environment_is_isolated() {
    let mut env = Environment::new();
    eval_ok(&mut env, "xs = [1, 2]");
    let snapshot = env.clone();
    eval_ok(&mut env, "xs[0] = 99");

    let mut restored = snapshot;
    assert_eq!(
        eval_value(&mut restored, "xs"),
        Value::List(vec![Value::Int(1), Value::Int(2)])
    );
}

// === Type matching ===

#[test]
fn unify_binds_type_parameters() {
    let mut subst = Subst::new();
    let recv = Ty::List(Box::new(Ty::Int));
    let decl = Ty::Seq(Box::new(Ty::Var("T")));
    assert!(unify(&recv, &decl, &mut subst));
    assert_eq!(subst.get("T"), Some(&Ty::Int));
}

#[test]
fn unify_rejects_mismatched_constructors() {
    let mut subst = Subst::new();
    assert!(!unify(&Ty::Int, &Ty::List(Box::new(Ty::Var("T"))), &mut subst));
}

#[test]
fn constraint_checks_are_boolean() {
    assert!(implements(&Ty::Int, Iface::Numeric));
    assert!(!implements(&Ty::Str, Iface::Numeric));
    assert!(satisfies(
        Some(&Ty::Int),
        &[Constraint::Implements(Iface::Ordered)]
    ));
    assert!(!satisfies(
        Some(&Ty::Any),
        &[Constraint::Implements(Iface::Ordered)]
    ));
    // a constrained parameter that never got bound cannot be verified
    assert!(!satisfies(None, &[Constraint::Container]));
}

fn seq_imports() -> IndexSet<String> {
    ["std.core", "std.seq"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

#[test]
fn extensions_respect_constraints() {
    let imports = seq_imports();

    let list_int = Ty::List(Box::new(Ty::Int));
    let names: Vec<&str> = CATALOG
        .extensions_for(&imports, &list_int)
        .iter()
        .map(|(d, _)| d.name)
        .collect();
    assert!(names.contains(&"sorted"));
    assert!(names.contains(&"sum"));

    let list_str = Ty::List(Box::new(Ty::Str));
    let names: Vec<&str> = CATALOG
        .extensions_for(&imports, &list_str)
        .iter()
        .map(|(d, _)| d.name)
        .collect();
    assert!(names.contains(&"sorted"));
    assert!(!names.contains(&"sum"));
}

#[test]
fn extensions_match_through_sequence_view() {
    let imports = seq_imports();
    let names: Vec<&str> = CATALOG
        .extensions_for(&imports, &Ty::Range)
        .iter()
        .map(|(d, _)| d.name)
        .collect();
    assert!(names.contains(&"sorted"));
    assert!(names.contains(&"sum"));
}

#[test]
fn unknown_element_type_drops_constrained_extensions() {
    let imports = seq_imports();
    let empty_list = Ty::List(Box::new(Ty::Any));
    let names: Vec<&str> = CATALOG
        .extensions_for(&imports, &empty_list)
        .iter()
        .map(|(d, _)| d.name)
        .collect();
    assert!(names.contains(&"reversed"));
    assert!(!names.contains(&"sorted"));
}

#[test]
fn signature_rendering() {
    let str_contains = CATALOG
        .lookup_method(&Ty::Str, "contains", 1)
        .expect("contains");
    assert_eq!(str_contains.signature(), "Bool contains(Str needle)");

    let length = CATALOG.lookup_property(&Ty::Str, "length").expect("length");
    assert_eq!(length.signature(), "Int length");

    let indexer = CATALOG.lookup_indexer(&Ty::Str).expect("indexer");
    assert_eq!(indexer.signature(), "Str at[Int index]");

    let imports = seq_imports();
    let list_int = Ty::List(Box::new(Ty::Int));
    let (sorted, subst) = CATALOG
        .extensions_for(&imports, &list_int)
        .into_iter()
        .find(|(d, _)| d.name == "sorted")
        .expect("sorted");
    assert_eq!(sorted.extension_signature(&subst), "List[Int] sorted()");
}
