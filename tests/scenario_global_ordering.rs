//! End-to-end coverage of global dependency ordering, promotion, and
//! circular-definition detection through the full pipeline.

use co_semantics::ast::builder::Builder;
use co_semantics::ast::operators::BinaryOp;
use co_semantics::diagnostics::DiagnosticKind;
use co_semantics::passes::AnalysisContext;
use co_semantics::symbols::Symbol;
use co_semantics::token::TokenKind;
use co_semantics::types::{PrimitiveKind, Type};
use std::rc::Rc;

/// `var a: int32 = 1 + 2;` -> global `a` typed int32; initializer typed
/// int32; no PromoteCast inserted (both operands int32).
#[test]
fn same_width_sum_has_no_promotion() {
    let mut b = Builder::new();
    let name = b.name("a");
    let ty = b.primitive_type("int32");
    let one = b.int_literal(TokenKind::INT32_LITERAL, "1");
    let two = b.int_literal(TokenKind::INT32_LITERAL, "2");
    let sum = b.binary(BinaryOp::Add, one, two);
    let init = b.expr_root(sum);
    let decl = b.var_decl(name, ty, Some(init), true);
    b.translation_unit(vec![decl]);
    let ast = b.finish();

    let unit = AnalysisContext::new(ast).run();
    assert!(!unit.has_errors());
    assert_eq!(unit.ast.attributes(init).ty, Some(Rc::new(Type::Primitive(PrimitiveKind::Int32))));
    assert_eq!(unit.ast.attributes(sum).ty, Some(Rc::new(Type::Primitive(PrimitiveKind::Int32))));
    let symbol_id = unit.ast.attributes(name).symbol.unwrap();
    let Symbol::Variable(var) = unit.symbols.get(symbol_id) else { panic!() };
    assert_eq!(var.ty, Some(Rc::new(Type::Primitive(PrimitiveKind::Int32))));
}

/// `var a: int32 = 1; var b: int64 = a + 3;` exercises the
/// dependency-ordering and promotion machinery together — `a` orders before
/// `b`, and within `b`'s initializer the narrower `a` operand is wrapped in
/// a `PromoteCast(int64)`.
#[test]
fn dependent_global_orders_after_its_dependency_and_promotes() {
    let mut b = Builder::new();
    let a_name = b.name("a");
    let a_ty = b.primitive_type("int32");
    let one = b.int_literal(TokenKind::INT32_LITERAL, "1");
    let a_init = b.expr_root(one);
    let a_decl = b.var_decl(a_name, a_ty, Some(a_init), true);

    let b_name = b.name("b");
    let b_ty = b.primitive_type("int64");
    let a_ref = b.name("a");
    let three = b.int_literal(TokenKind::INT64_LITERAL, "3");
    let sum = b.binary(BinaryOp::Add, a_ref, three);
    let b_init = b.expr_root(sum);
    let b_decl = b.var_decl(b_name, b_ty, Some(b_init), true);

    b.translation_unit(vec![a_decl, b_decl]);
    let ast = b.finish();

    let unit = AnalysisContext::new(ast).run();
    assert!(!unit.has_errors());
    assert_eq!(unit.global_order, vec![a_decl, b_decl]);

    let co_semantics::ast::NodeKind::BinaryExpression { lhs, .. } = unit.ast.kind(sum).clone() else { panic!() };
    assert_ne!(lhs, a_ref, "the narrower `a` operand should have been wrapped in a PromoteCast");
    assert!(matches!(unit.ast.kind(lhs), co_semantics::ast::NodeKind::PromoteCast { operand } if *operand == a_ref));
    assert_eq!(unit.ast.attributes(sum).ty, Some(Rc::new(Type::Primitive(PrimitiveKind::Int64))));
}

/// `var a = b + 1; var b: int32 = 2;` -> dependency order: [b, a]; after
/// global inference, symbol `a` has type int32.
#[test]
fn forward_referenced_dependency_is_ordered_first() {
    let mut b = Builder::new();
    let a_name = b.name("a");
    let a_ty = b.alpha_type();
    let b_ref = b.name("b");
    let one = b.int_literal(TokenKind::INT32_LITERAL, "1");
    let sum = b.binary(BinaryOp::Add, b_ref, one);
    let a_init = b.expr_root(sum);
    let a_decl = b.var_decl(a_name, a_ty, Some(a_init), true);

    let b_name = b.name("b");
    let b_ty = b.primitive_type("int32");
    let two = b.int_literal(TokenKind::INT32_LITERAL, "2");
    let b_init = b.expr_root(two);
    let b_decl = b.var_decl(b_name, b_ty, Some(b_init), true);

    b.translation_unit(vec![a_decl, b_decl]);
    let ast = b.finish();

    let unit = AnalysisContext::new(ast).run();
    assert!(!unit.has_errors());
    assert_eq!(unit.global_order, vec![b_decl, a_decl]);

    let symbol_id = unit.ast.attributes(a_name).symbol.unwrap();
    let Symbol::Variable(var) = unit.symbols.get(symbol_id) else { panic!() };
    assert_eq!(var.ty, Some(Rc::new(Type::Primitive(PrimitiveKind::Int32))));
}

/// `var a = b; var b = a;` -> dependency ordering reports a circular
/// definition pointing at one of `a`/`b`; global inference is skipped for
/// those (the global order comes back empty, so neither symbol's type is
/// ever written).
#[test]
fn mutually_dependent_globals_report_a_cycle() {
    let mut b = Builder::new();
    let a_name = b.name("a");
    let a_ty = b.alpha_type();
    let b_ref = b.name("b");
    let a_init = b.expr_root(b_ref);
    let a_decl = b.var_decl(a_name, a_ty, Some(a_init), true);

    let b_name = b.name("b");
    let b_ty = b.alpha_type();
    let a_ref = b.name("a");
    let b_init = b.expr_root(a_ref);
    let b_decl = b.var_decl(b_name, b_ty, Some(b_init), true);

    b.translation_unit(vec![a_decl, b_decl]);
    let ast = b.finish();

    let unit = AnalysisContext::new(ast).run();
    assert!(unit.global_order.is_empty());
    assert!(unit.diagnostics.iter().any(|d| matches!(d.kind, DiagnosticKind::CircularDefinition { .. })));

    let a_symbol = unit.ast.attributes(a_name).symbol.unwrap();
    let Symbol::Variable(var) = unit.symbols.get(a_symbol) else { panic!() };
    assert!(var.ty.is_none());
}
