//! Basic parser tests

use crate::frontend::lexer::tokenize;
use crate::frontend::parser::ast::*;
use crate::frontend::parser::{parse, parse_expression};

fn parse_clean(source: &str) -> Module {
    let tokens = tokenize(source).unwrap();
    let (module, errors) = parse(&tokens);
    assert!(errors.is_empty(), "unexpected errors for {source:?}: {errors:?}");
    module
}

fn expr_of(source: &str) -> Expr {
    let tokens = tokenize(source).unwrap();
    parse_expression(&tokens).unwrap()
}

#[test]
fn test_parse_empty_module() {
    let module = parse_clean("");
    assert!(module.items.is_empty());
}

#[test]
fn test_parse_literals() {
    for source in ["42", "3.25", "\"hello\"", "true", "false", "nil"] {
        let tokens = tokenize(source).unwrap();
        assert!(parse_expression(&tokens).is_ok(), "failed for: {}", source);
    }
}

#[test]
fn test_parse_precedence() {
    let expr = expr_of("1 + 2 * 3");
    match expr {
        Expr::Binary {
            op: BinOp::Add,
            right,
            ..
        } => assert!(matches!(*right, Expr::Binary { op: BinOp::Mul, .. })),
        other => panic!("expected Add at the top, got {other:?}"),
    }
}

#[test]
fn test_parse_left_associativity() {
    let expr = expr_of("10 - 2 - 3");
    match expr {
        Expr::Binary {
            op: BinOp::Sub,
            left,
            ..
        } => assert!(matches!(*left, Expr::Binary { op: BinOp::Sub, .. })),
        other => panic!("expected Sub at the top, got {other:?}"),
    }
}

#[test]
fn test_parse_member_access() {
    let expr = expr_of("obj.field");
    match expr {
        Expr::Member { name, .. } => assert_eq!(name, "field"),
        other => panic!("expected member access, got {other:?}"),
    }
}

#[test]
fn test_parse_method_call() {
    let expr = expr_of("xs.contains(3)");
    match expr {
        Expr::Call { callee, args, .. } => {
            assert_eq!(args.len(), 1);
            assert!(matches!(*callee, Expr::Member { .. }));
        }
        other => panic!("expected call, got {other:?}"),
    }
}

#[test]
fn test_parse_index() {
    let expr = expr_of("arr[0]");
    assert!(matches!(expr, Expr::Index { .. }));
}

#[test]
fn test_parse_range() {
    let expr = expr_of("1..10");
    assert!(matches!(
        expr,
        Expr::Binary {
            op: BinOp::Range,
            ..
        }
    ));
}

#[test]
fn test_parse_list_literal() {
    let expr = expr_of("[1, 2, 3]");
    match expr {
        Expr::List(items, _) => assert_eq!(items.len(), 3),
        other => panic!("expected list, got {other:?}"),
    }
}

#[test]
fn test_parse_map_literal() {
    let expr = expr_of("{\"a\": 1, \"b\": 2}");
    match expr {
        Expr::MapLit(entries, _) => assert_eq!(entries.len(), 2),
        other => panic!("expected map, got {other:?}"),
    }
}

#[test]
fn test_parse_unary_binds_tighter_than_binary() {
    let expr = expr_of("-x + 1");
    assert!(matches!(expr, Expr::Binary { op: BinOp::Add, .. }));
}

#[test]
fn test_parse_assignment() {
    let module = parse_clean("x = 42");
    assert_eq!(module.items.len(), 1);
    match &module.items[0].kind {
        StmtKind::Assign {
            target: AssignTarget::Name(name, _),
            op: AssignOp::Set,
            ..
        } => assert_eq!(name, "x"),
        other => panic!("expected assignment, got {other:?}"),
    }
}

#[test]
fn test_parse_compound_assignment() {
    let module = parse_clean("k += 1");
    match &module.items[0].kind {
        StmtKind::Assign {
            op: AssignOp::Add, ..
        } => {}
        other => panic!("expected compound assignment, got {other:?}"),
    }
}

#[test]
fn test_parse_index_assignment() {
    let module = parse_clean("xs[0] = 5");
    match &module.items[0].kind {
        StmtKind::Assign {
            target: AssignTarget::Index { .. },
            ..
        } => {}
        other => panic!("expected index assignment, got {other:?}"),
    }
}

#[test]
fn test_parse_use() {
    let module = parse_clean("use std.seq");
    match &module.items[0].kind {
        StmtKind::Use { path } => assert_eq!(path, "std.seq"),
        other => panic!("expected use, got {other:?}"),
    }
}

#[test]
fn test_parse_fn_definition() {
    let module = parse_clean("fn add(a, b) { return a + b }");
    match &module.items[0].kind {
        StmtKind::FnDef { name, params, body } => {
            assert_eq!(name, "add");
            assert_eq!(params, &["a".to_string(), "b".to_string()]);
            assert_eq!(body.stmts.len(), 1);
        }
        other => panic!("expected fn definition, got {other:?}"),
    }
}

#[test]
fn test_parse_if_else_chain() {
    let module = parse_clean("if x > 0 { y = 1 } else if x == 0 { y = 0 } else { y = -1 }");
    match &module.items[0].kind {
        StmtKind::If { else_branch, .. } => {
            let else_branch = else_branch.as_ref().expect("else branch");
            assert!(matches!(else_branch.stmts[0].kind, StmtKind::If { .. }));
        }
        other => panic!("expected if, got {other:?}"),
    }
}

#[test]
fn test_parse_while() {
    let module = parse_clean("while i < 10 { i += 1 }");
    assert!(matches!(module.items[0].kind, StmtKind::While { .. }));
}

#[test]
fn test_parse_for() {
    let module = parse_clean("for x in 1..5 { total += x }");
    match &module.items[0].kind {
        StmtKind::For { var, .. } => assert_eq!(var, "x"),
        other => panic!("expected for, got {other:?}"),
    }
}

#[test]
fn test_parse_multiple_statements() {
    let module = parse_clean("x = 1; y = 2; x + y");
    assert_eq!(module.items.len(), 3);
    assert!(matches!(module.items[2].kind, StmtKind::Expr(_)));
}

#[test]
fn test_member_assignment_is_rejected() {
    let tokens = tokenize("x.y = 3").unwrap();
    let (_, errors) = parse(&tokens);
    assert!(!errors.is_empty());
}

#[test]
fn test_use_inside_block_is_rejected() {
    let tokens = tokenize("if true { use std.seq }").unwrap();
    let (_, errors) = parse(&tokens);
    assert!(!errors.is_empty());
}
