//! Parser tests.
//!
//! Coverage:
//! - Declarations (`let`, `const`, `fn`) and type annotations
//! - Control flow statements
//! - Operator precedence and assignment desugaring
//! - Import/export forms
//! - Error collection and recovery

#![expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]

use hml_ir::{BinaryOp, ExportKind, Expr, ExprKind, ImportKind, Stmt, StmtKind, TypeKind, UnaryOp};
use pretty_assertions::assert_eq;

use crate::parse;

// Helper Functions

fn parse_ok(source: &str) -> Vec<Stmt> {
    let result = parse(source);
    assert!(result.errors.is_empty(), "unexpected errors: {:?}", result.errors);
    result.statements
}

fn single(source: &str) -> StmtKind {
    let mut stmts = parse_ok(source);
    assert_eq!(stmts.len(), 1);
    stmts.remove(0).kind
}

fn expr_of(source: &str) -> ExprKind {
    match single(source) {
        StmtKind::Expr(e) => e.kind,
        other => panic!("expected expression statement, got {other:?}"),
    }
}

fn ident(e: &Expr) -> &str {
    match &e.kind {
        ExprKind::Ident(name) => name,
        other => panic!("expected identifier, got {other:?}"),
    }
}

// Declarations

#[test]
fn test_let_with_type() {
    match single("let x: i8 = 300;") {
        StmtKind::Let { name, ty, value } => {
            assert_eq!(&*name, "x");
            assert_eq!(ty, Some(TypeKind::I8));
            assert_eq!(value.kind, ExprKind::Int(300));
        }
        other => panic!("expected let, got {other:?}"),
    }
}

#[test]
fn test_const_with_alias_type() {
    match single("const n: number = 1.5;") {
        StmtKind::Const { ty, value, .. } => {
            assert_eq!(ty, Some(TypeKind::F64));
            assert_eq!(value.kind, ExprKind::Float(1.5));
        }
        other => panic!("expected const, got {other:?}"),
    }
}

#[test]
fn test_unknown_type_is_error() {
    let result = parse("let x: i64 = 1;");
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].message, "unknown type `i64`");
}

#[test]
fn test_fn_decl_desugars_to_let() {
    match single("fn add(a: i32, b): i32 { return a + b; }") {
        StmtKind::Let { name, ty, value } => {
            assert_eq!(&*name, "add");
            assert_eq!(ty, None);
            let ExprKind::Function(def) = value.kind else {
                panic!("expected function literal");
            };
            assert_eq!(def.params.len(), 2);
            assert_eq!(def.params[0].ty, Some(TypeKind::I32));
            assert_eq!(def.params[1].ty, None);
            assert_eq!(def.return_type, Some(TypeKind::I32));
            assert_eq!(def.body.len(), 1);
            assert!(!def.is_async);
        }
        other => panic!("expected let, got {other:?}"),
    }
}

#[test]
fn test_async_fn_decl() {
    match single("async fn work() { return await 1; }") {
        StmtKind::Let { value, .. } => {
            let ExprKind::Function(def) = value.kind else {
                panic!("expected function literal");
            };
            assert!(def.is_async);
        }
        other => panic!("expected let, got {other:?}"),
    }
}

#[test]
fn test_large_int_literal_becomes_float() {
    assert_eq!(expr_of("3000000000;"), ExprKind::Float(3_000_000_000.0));
}

// Control flow

#[test]
fn test_if_else_if_chain() {
    match single("if (a) { 1; } else if (b) { 2; } else { 3; }") {
        StmtKind::If { else_branch, .. } => {
            let else_branch = else_branch.unwrap();
            assert!(matches!(
                else_branch.kind,
                StmtKind::If {
                    else_branch: Some(_),
                    ..
                }
            ));
        }
        other => panic!("expected if, got {other:?}"),
    }
}

#[test]
fn test_for_loop_clauses() {
    match single("for (let i = 0; i < 10; i += 1) { continue; }") {
        StmtKind::For {
            init,
            cond,
            step,
            body,
        } => {
            assert!(matches!(init.unwrap().kind, StmtKind::Let { .. }));
            assert!(matches!(
                cond.unwrap().kind,
                ExprKind::Binary {
                    op: BinaryOp::Lt,
                    ..
                }
            ));
            assert!(matches!(step.unwrap().kind, ExprKind::Assign { .. }));
            let StmtKind::Block(body) = body.kind else {
                panic!("expected block body");
            };
            assert_eq!(body.len(), 1);
            assert_eq!(body[0].kind, StmtKind::Continue);
        }
        other => panic!("expected for, got {other:?}"),
    }
}

#[test]
fn test_for_loop_empty_clauses() {
    match single("for (;;) { break; }") {
        StmtKind::For {
            init, cond, step, ..
        } => {
            assert!(init.is_none());
            assert!(cond.is_none());
            assert!(step.is_none());
        }
        other => panic!("expected for, got {other:?}"),
    }
}

#[test]
fn test_return_without_value() {
    assert_eq!(single("return;"), StmtKind::Return(None));
}

// Expressions

#[test]
fn test_precedence() {
    // 1 + 2 * 3 == 7 && !done
    let ExprKind::Binary { op, left, .. } = expr_of("1 + 2 * 3 == 7 && !done;") else {
        panic!("expected binary");
    };
    assert_eq!(op, BinaryOp::And);
    let ExprKind::Binary { op, left, .. } = left.kind else {
        panic!("expected equality");
    };
    assert_eq!(op, BinaryOp::Eq);
    let ExprKind::Binary { op, right, .. } = left.kind else {
        panic!("expected addition");
    };
    assert_eq!(op, BinaryOp::Add);
    assert!(matches!(
        right.kind,
        ExprKind::Binary {
            op: BinaryOp::Mul,
            ..
        }
    ));
}

#[test]
fn test_unary_and_await() {
    assert!(matches!(
        expr_of("-x;"),
        ExprKind::Unary {
            op: UnaryOp::Neg,
            ..
        }
    ));
    assert!(matches!(expr_of("await f();"), ExprKind::Await(_)));
}

#[test]
fn test_method_call_shape() {
    let ExprKind::Call { callee, args } = expr_of("obj.greet(1, 2);") else {
        panic!("expected call");
    };
    assert_eq!(args.len(), 2);
    let ExprKind::GetProperty { object, property } = callee.kind else {
        panic!("expected property callee");
    };
    assert_eq!(ident(&object), "obj");
    assert_eq!(&*property, "greet");
}

#[test]
fn test_index_assign() {
    let ExprKind::IndexAssign {
        object,
        index,
        op,
        value,
    } = expr_of("b[0] = 90;")
    else {
        panic!("expected index assignment");
    };
    assert_eq!(ident(&object), "b");
    assert_eq!(index.kind, ExprKind::Int(0));
    assert_eq!(op, None);
    assert_eq!(value.kind, ExprKind::Int(90));
}

#[test]
fn test_compound_property_assign_keeps_operator() {
    let ExprKind::SetProperty {
        property, op, value, ..
    } = expr_of("o.n += 2;")
    else {
        panic!("expected property assignment");
    };
    assert_eq!(&*property, "n");
    assert_eq!(op, Some(BinaryOp::Add));
    assert_eq!(value.kind, ExprKind::Int(2));
}

#[test]
fn test_compound_ident_assign_desugars() {
    let ExprKind::Assign { name, value } = expr_of("x -= 1;") else {
        panic!("expected assignment");
    };
    assert_eq!(&*name, "x");
    let ExprKind::Binary { op, left, .. } = value.kind else {
        panic!("expected binary value");
    };
    assert_eq!(op, BinaryOp::Sub);
    assert_eq!(ident(&left), "x");
}

#[test]
fn test_assignment_is_right_associative() {
    let ExprKind::Assign { name, value } = expr_of("a = b = 1;") else {
        panic!("expected assignment");
    };
    assert_eq!(&*name, "a");
    assert!(matches!(value.kind, ExprKind::Assign { .. }));
}

#[test]
fn test_invalid_assignment_target() {
    let result = parse("1 = 2;");
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].message, "invalid assignment target");
}

#[test]
fn test_object_literal_in_expression_position() {
    match single(r#"let o = { a: 1, "b": fn() { return self.a; } };"#) {
        StmtKind::Let { value, .. } => {
            let ExprKind::Object(fields) = value.kind else {
                panic!("expected object literal");
            };
            let names: Vec<&str> = fields.iter().map(|(k, _)| &**k).collect();
            assert_eq!(names, vec!["a", "b"]);
            assert!(matches!(fields[1].1.kind, ExprKind::Function(_)));
        }
        other => panic!("expected let, got {other:?}"),
    }
}

// Modules

#[test]
fn test_named_import() {
    match single(r#"import { a, b as c } from "./lib";"#) {
        StmtKind::Import { kind, path } => {
            assert_eq!(path, "./lib");
            let ImportKind::Named(specs) = kind else {
                panic!("expected named import");
            };
            assert_eq!(specs.len(), 2);
            assert_eq!(&**specs[1].local_name(), "c");
        }
        other => panic!("expected import, got {other:?}"),
    }
}

#[test]
fn test_namespace_import() {
    match single(r#"import * as math from "@stdlib/math";"#) {
        StmtKind::Import { kind, path } => {
            assert_eq!(path, "@stdlib/math");
            assert_eq!(kind, ImportKind::Namespace("math".into()));
        }
        other => panic!("expected import, got {other:?}"),
    }
}

#[test]
fn test_export_forms() {
    let stmts = parse_ok(
        r#"
        export fn f() { return 1; }
        export const K = 2;
        export { f as g, K };
        export { x } from "./other";
        "#,
    );
    assert_eq!(stmts.len(), 4);
    assert!(matches!(
        stmts[0].kind,
        StmtKind::Export(ExportKind::Declaration(_))
    ));
    assert!(matches!(
        stmts[1].kind,
        StmtKind::Export(ExportKind::Declaration(_))
    ));
    match &stmts[2].kind {
        StmtKind::Export(ExportKind::List(specs)) => assert_eq!(specs.len(), 2),
        other => panic!("expected export list, got {other:?}"),
    }
    match &stmts[3].kind {
        StmtKind::Export(ExportKind::Reexport { path, .. }) => assert_eq!(path, "./other"),
        other => panic!("expected re-export, got {other:?}"),
    }
}

// Errors and recovery

#[test]
fn test_recovers_after_error() {
    let result = parse("let = 1;\nlet ok = 2;\nprint(;\nlet also = 3;");
    assert_eq!(result.errors.len(), 2);
    let names: Vec<&str> = result
        .statements
        .iter()
        .filter_map(|s| s.declared_name().map(|n| &**n))
        .collect();
    assert_eq!(names, vec!["ok", "also"]);
}

#[test]
fn test_missing_semicolon_at_eof() {
    let result = parse("let x = 1");
    assert_eq!(result.errors.len(), 1);
    assert_eq!(
        result.errors[0].message,
        "expected `;` after variable declaration, found end of file"
    );
}

#[test]
fn test_into_result() {
    assert!(parse("1;").into_result().is_ok());
    assert_eq!(parse("@").into_result().unwrap_err().len(), 1);
}
