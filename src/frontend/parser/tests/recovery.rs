//! Error recovery tests
//!
//! The parser must keep producing a useful partial tree for mid-keystroke
//! input; these shapes are what completion extraction depends on.

use crate::frontend::lexer::tokenize;
use crate::frontend::parser::ast::*;
use crate::frontend::parser::parse;

fn parse_tolerant(source: &str) -> (Module, usize) {
    let tokens = tokenize(source).unwrap();
    let (module, errors) = parse(&tokens);
    (module, errors.len())
}

#[test]
fn trailing_operator_keeps_left_operand() {
    let (module, errors) = parse_tolerant("1 +");
    assert!(errors > 0);
    assert_eq!(module.items.len(), 1);
    match &module.items[0].kind {
        StmtKind::Expr(expr) => match expr.as_ref() {
            Expr::Binary {
                op: BinOp::Add,
                left,
                right,
                ..
            } => {
                assert!(matches!(left.as_ref(), Expr::Lit(Literal::Int(1), _)));
                assert!(matches!(right.as_ref(), Expr::Lit(Literal::Nil, _)));
            }
            other => panic!("expected binary, got {other:?}"),
        },
        other => panic!("expected expression statement, got {other:?}"),
    }
}

#[test]
fn dangling_member_access_is_recovered() {
    let source = "k += array[3].";
    let (module, errors) = parse_tolerant(source);
    assert!(errors > 0);
    match &module.items[0].kind {
        StmtKind::Assign { value, .. } => match value.as_ref() {
            Expr::Member { recv, name, span } => {
                assert_eq!(name, "");
                assert_eq!(span.end.offset, source.len());
                assert_eq!(recv.span().text(source), "array[3]");
            }
            other => panic!("expected member access, got {other:?}"),
        },
        other => panic!("expected assignment, got {other:?}"),
    }
}

#[test]
fn member_inside_unclosed_if_condition_survives() {
    let source = "if (\"test\".Leng";
    let (module, errors) = parse_tolerant(source);
    assert!(errors >= 2); // missing ')' and missing '{'
    match &module.items[0].kind {
        StmtKind::If { cond, .. } => match cond.as_ref() {
            Expr::Paren(inner, _) => match inner.as_ref() {
                Expr::Member { recv, name, .. } => {
                    assert_eq!(name, "Leng");
                    assert_eq!(recv.span().text(source), "\"test\"");
                }
                other => panic!("expected member access, got {other:?}"),
            },
            other => panic!("expected parenthesized condition, got {other:?}"),
        },
        other => panic!("expected if, got {other:?}"),
    }
}

#[test]
fn unclosed_call_keeps_arguments() {
    let (module, errors) = parse_tolerant("f(x");
    assert!(errors > 0);
    match &module.items[0].kind {
        StmtKind::Expr(expr) => match expr.as_ref() {
            Expr::Call { args, .. } => assert_eq!(args.len(), 1),
            other => panic!("expected call, got {other:?}"),
        },
        other => panic!("expected expression statement, got {other:?}"),
    }
}

#[test]
fn bare_use_reports_and_recovers() {
    let (module, errors) = parse_tolerant("use");
    assert!(errors > 0);
    assert!(module.items.is_empty());
}

#[test]
fn garbage_before_statement_does_not_eat_it() {
    let (module, errors) = parse_tolerant(") x = 1");
    assert!(errors > 0);
    assert_eq!(module.items.len(), 1);
    assert!(matches!(module.items[0].kind, StmtKind::Assign { .. }));
}

#[test]
fn parser_always_terminates_on_junk() {
    for source in ["]", "((((", "}}}}", ". . .", "= = ="] {
        let tokens = tokenize(source).unwrap();
        let (_, errors) = parse(&tokens);
        assert!(!errors.is_empty(), "expected errors for {source:?}");
    }
}
