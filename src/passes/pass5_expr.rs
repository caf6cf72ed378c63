//! Pass 5 — Expression Typing Kernel, shared.
//!
//! A post-order traversal that computes a `type` attribute for every node in
//! an expression tree rooted at an `ExpressionRoot`. The usual unary/binary
//! conversions splice in a `PromoteCast` wrapper by rewriting the owning
//! node's `NodeKind` to point at a freshly allocated `PromoteCast` node
//! (`replace_binary_child`/`replace_unary_operand`), since children are
//! addressed by `NodeId` field rather than by a mutable child list.
//!
//! This is Pass 5a and Pass 5b/5c's shared entry point: both call
//! [`type_expression_root`] on whichever `ExpressionRoot` they're currently
//! typing.

use std::rc::Rc;

use crate::ast::operators::{BinaryOp, UnaryOp};
use crate::ast::{NodeId, NodeKind};
use crate::diagnostics::DiagnosticKind;
use crate::passes::AnalysisContext;
use crate::symbols::Symbol;
use crate::token::TokenKind;
use crate::types::{PrimitiveKind, Type};

/// Types the expression rooted at `node` (an `ExpressionRoot`) and returns
/// its computed type, copying the child's `type` onto the root node itself.
pub fn type_expression_root(ctx: &mut AnalysisContext, node: NodeId) -> Option<Rc<Type>> {
    let expression = match ctx.ast.kind(node).clone() {
        NodeKind::ExpressionRoot { expression } => expression,
        other => panic!("type_expression_root called on a non-ExpressionRoot node: {other:?}"),
    };
    let ty = type_expression(ctx, expression);
    ctx.ast.attributes_mut(node).ty = ty.clone();
    ty
}

fn line_of(ctx: &AnalysisContext, node: NodeId) -> u32 {
    ctx.ast.token(node).map(|t| t.line).unwrap_or(0)
}

fn incompatible(ctx: &mut AnalysisContext, node: NodeId, message: impl Into<String>) {
    let line = line_of(ctx, node);
    ctx.diagnostics.error(line, DiagnosticKind::IncompatibleOperandTypes { message: message.into() });
}

/// Dispatch over the expression-node kinds the kernel handles, computing a
/// `type` attribute for every node via post-order traversal.
fn type_expression(ctx: &mut AnalysisContext, node: NodeId) -> Option<Rc<Type>> {
    let ty = match ctx.ast.kind(node).clone() {
        NodeKind::BinaryExpression { op, lhs, rhs } => type_binary(ctx, node, op, lhs, rhs),
        NodeKind::UnaryExpression { op, operand } => type_unary(ctx, node, op, operand),
        NodeKind::Name { lexeme } => type_name(ctx, node, &lexeme),
        NodeKind::BooleanLiteral { .. } => Some(Rc::new(Type::Primitive(PrimitiveKind::Bool))),
        NodeKind::IntegerLiteral => Some(type_integer_literal(ctx, node)),
        NodeKind::FloatingPointLiteral => Some(type_float_literal(ctx, node)),
        NodeKind::NullLiteral => Some(Rc::new(Type::Primitive(PrimitiveKind::NullT))),
        other => panic!("unexpected node kind inside an expression: {other:?}"),
    };
    ctx.ast.attributes_mut(node).ty = ty.clone();
    ty
}

fn type_integer_literal(ctx: &AnalysisContext, node: NodeId) -> Rc<Type> {
    let kind = match ctx.ast.token(node).map(|t| t.kind) {
        Some(TokenKind::INT32_LITERAL) => PrimitiveKind::Int32,
        Some(TokenKind::INT64_LITERAL) => PrimitiveKind::Int64,
        Some(TokenKind::UINT32_LITERAL) => PrimitiveKind::Uint32,
        Some(TokenKind::UINT64_LITERAL) => PrimitiveKind::Uint64,
        other => panic!("integer literal carries an unexpected token kind: {other:?}"),
    };
    Rc::new(Type::Primitive(kind))
}

fn type_float_literal(ctx: &AnalysisContext, node: NodeId) -> Rc<Type> {
    let kind = match ctx.ast.token(node).map(|t| t.kind) {
        Some(TokenKind::FLOAT32_LITERAL) => PrimitiveKind::Float32,
        Some(TokenKind::FLOAT64_LITERAL) => PrimitiveKind::Float64,
        other => panic!("floating-point literal carries an unexpected token kind: {other:?}"),
    };
    Rc::new(Type::Primitive(kind))
}

/// Resolves `lexeme` in the scope Pass 1 attached to this `Name` node and
/// propagates the symbol's type. A missing symbol leaves the node untyped
/// without emitting a second diagnostic — Pass 3a already reported
/// `UnresolvedName` for every unresolved reference.
fn type_name(ctx: &mut AnalysisContext, node: NodeId, lexeme: &str) -> Option<Rc<Type>> {
    let scope = ctx.ast.attributes(node).scope?;
    let symbol_id = ctx.scopes.resolve(scope, lexeme)?;
    ctx.symbols.get(symbol_id).ty()
}

// ---------------------------------------------------------------------
// Unary expressions
// ---------------------------------------------------------------------

fn replace_unary_operand(ctx: &mut AnalysisContext, node: NodeId, new_operand: NodeId) {
    if let NodeKind::UnaryExpression { op, .. } = ctx.ast.kind(node).clone() {
        ctx.ast.node_mut(node).kind = NodeKind::UnaryExpression { op, operand: new_operand };
    }
}

fn promote_to(ctx: &mut AnalysisContext, operand: NodeId, dest: Rc<Type>) -> NodeId {
    let cast = ctx.ast.alloc(NodeKind::PromoteCast { operand }, None);
    ctx.ast.attributes_mut(cast).ty = Some(dest);
    cast
}

/// An integral operand narrower than int32 (int8, int16, uint8, uint16) is
/// promoted to int32 via an inserted `PromoteCast`. Returns the (possibly
/// replaced) operand id and its resulting type.
fn apply_usual_unary_conversion(ctx: &mut AnalysisContext, node: NodeId, operand: NodeId, operand_ty: Rc<Type>) -> (NodeId, Rc<Type>) {
    let narrow = matches!(
        operand_ty.as_primitive(),
        Some(PrimitiveKind::Int8) | Some(PrimitiveKind::Int16) | Some(PrimitiveKind::Uint8) | Some(PrimitiveKind::Uint16)
    );
    if !narrow {
        return (operand, operand_ty);
    }
    let int32 = Rc::new(Type::Primitive(PrimitiveKind::Int32));
    let cast = promote_to(ctx, operand, int32.clone());
    replace_unary_operand(ctx, node, cast);
    (cast, int32)
}

fn type_unary(ctx: &mut AnalysisContext, node: NodeId, op: UnaryOp, operand: NodeId) -> Option<Rc<Type>> {
    let operand_ty = type_expression(ctx, operand)?;
    if operand_ty.is_void() {
        incompatible(ctx, node, "invalid operand type");
        return None;
    }
    let (_, operand_ty) = apply_usual_unary_conversion(ctx, node, operand, operand_ty);

    match op {
        UnaryOp::Plus | UnaryOp::Minus => {
            if operand_ty.is_numeric() {
                Some(operand_ty)
            } else {
                incompatible(ctx, node, "invalid operand type, must be numeric");
                None
            }
        }
        UnaryOp::Not => {
            if operand_ty.is_bool() || operand_ty.is_numeric() || operand_ty.is_pointer() {
                Some(Rc::new(Type::Primitive(PrimitiveKind::Bool)))
            } else {
                incompatible(ctx, node, "invalid operand type, must be boolean, numeric, or pointer");
                None
            }
        }
        UnaryOp::BitNot => {
            if operand_ty.is_integral() {
                Some(operand_ty)
            } else {
                incompatible(ctx, node, "invalid operand type, must be integral");
                None
            }
        }
        UnaryOp::Deref => match operand_ty.as_ref() {
            Type::Pointer(base) => Some(base.clone()),
            _ => {
                incompatible(ctx, node, "invalid operand type, must be a pointer");
                None
            }
        },
    }
}

// ---------------------------------------------------------------------
// Binary expressions
// ---------------------------------------------------------------------

enum Side {
    Lhs,
    Rhs,
}

fn replace_binary_child(ctx: &mut AnalysisContext, node: NodeId, side: Side, new_child: NodeId) {
    if let NodeKind::BinaryExpression { op, lhs, rhs } = ctx.ast.kind(node).clone() {
        let kind = match side {
            Side::Lhs => NodeKind::BinaryExpression { op, lhs: new_child, rhs },
            Side::Rhs => NodeKind::BinaryExpression { op, lhs, rhs: new_child },
        };
        ctx.ast.node_mut(node).kind = kind;
    }
}

/// The five usual-binary-conversion rules, applied in order. Returns
/// `Err(())` on rule 5 (mixed signed/unsigned integrals of any rank), which
/// the caller reports as `IncompatibleOperandTypes`. Shift operators are
/// exempted unless `AnalysisOptions::shift_co_promotes_rhs` is set.
fn apply_usual_binary_conversions(ctx: &mut AnalysisContext, node: NodeId, op: BinaryOp) -> Result<(), ()> {
    if op.is_shift() && !ctx.options.shift_co_promotes_rhs {
        return Ok(());
    }

    let (lhs, rhs) = match ctx.ast.kind(node).clone() {
        NodeKind::BinaryExpression { lhs, rhs, .. } => (lhs, rhs),
        other => panic!("expected a BinaryExpression, found {other:?}"),
    };
    let lhs_ty = ctx.ast.attributes(lhs).ty.clone();
    let rhs_ty = ctx.ast.attributes(rhs).ty.clone();
    let (Some(lhs_ty), Some(rhs_ty)) = (lhs_ty, rhs_ty) else {
        return Ok(());
    };
    let (Some(l), Some(r)) = (lhs_ty.as_primitive(), rhs_ty.as_primitive()) else {
        return Ok(());
    };

    use PrimitiveKind::{Float32, Float64};

    if l == Float64 && (r == Float32 || r.is_integral()) {
        let cast = promote_to(ctx, rhs, Rc::new(Type::Primitive(Float64)));
        replace_binary_child(ctx, node, Side::Rhs, cast);
    } else if r == Float64 && (l == Float32 || l.is_integral()) {
        let cast = promote_to(ctx, lhs, Rc::new(Type::Primitive(Float64)));
        replace_binary_child(ctx, node, Side::Lhs, cast);
    } else if l == Float32 && r.is_integral() {
        let cast = promote_to(ctx, rhs, Rc::new(Type::Primitive(Float32)));
        replace_binary_child(ctx, node, Side::Rhs, cast);
    } else if r == Float32 && l.is_integral() {
        let cast = promote_to(ctx, lhs, Rc::new(Type::Primitive(Float32)));
        replace_binary_child(ctx, node, Side::Lhs, cast);
    } else if l.is_unsigned_integral() && r.is_unsigned_integral() {
        promote_lower_rank(ctx, node, lhs, rhs, l, r);
    } else if l.is_signed_integral() && r.is_signed_integral() {
        promote_lower_rank(ctx, node, lhs, rhs, l, r);
    } else if l.is_integral() && r.is_integral() {
        return Err(());
    }
    Ok(())
}

fn promote_lower_rank(ctx: &mut AnalysisContext, node: NodeId, lhs: NodeId, rhs: NodeId, l: PrimitiveKind, r: PrimitiveKind) {
    let (Some(lr), Some(rr)) = (l.integral_rank(), r.integral_rank()) else {
        return;
    };
    if lr < rr {
        let cast = promote_to(ctx, lhs, Rc::new(Type::Primitive(r)));
        replace_binary_child(ctx, node, Side::Lhs, cast);
    } else if rr < lr {
        let cast = promote_to(ctx, rhs, Rc::new(Type::Primitive(l)));
        replace_binary_child(ctx, node, Side::Rhs, cast);
    }
}

fn type_binary(ctx: &mut AnalysisContext, node: NodeId, op: BinaryOp, lhs: NodeId, rhs: NodeId) -> Option<Rc<Type>> {
    let lhs_ty = type_expression(ctx, lhs)?;
    let rhs_ty = type_expression(ctx, rhs)?;
    if lhs_ty.is_void() || rhs_ty.is_void() {
        incompatible(ctx, node, "invalid operand type");
        return None;
    }

    if apply_usual_binary_conversions(ctx, node, op).is_err() {
        incompatible(ctx, node, "incompatible operand types; explicit conversion required");
        return None;
    }

    let (lhs, rhs) = match ctx.ast.kind(node).clone() {
        NodeKind::BinaryExpression { lhs, rhs, .. } => (lhs, rhs),
        other => panic!("expected a BinaryExpression, found {other:?}"),
    };
    let lhs_ty = ctx.ast.attributes(lhs).ty.clone()?;
    let rhs_ty = ctx.ast.attributes(rhs).ty.clone()?;

    if op.is_multiplicative() {
        return dispatch_numeric_or_integral(ctx, node, op, &lhs_ty, &rhs_ty);
    }
    if op.is_additive() {
        return if lhs_ty.is_numeric() && rhs_ty.is_numeric() {
            Some(lhs_ty)
        } else {
            incompatible(ctx, node, "invalid operand type, must be numeric");
            None
        };
    }
    if op.is_shift() {
        return if lhs_ty.is_integral() && rhs_ty.is_integral() {
            Some(lhs_ty)
        } else {
            incompatible(ctx, node, "invalid operand type, must be integral");
            None
        };
    }
    if op.is_relational() {
        let ok = |t: &Type| t.is_numeric() || t.is_pointer();
        return if ok(&lhs_ty) && ok(&rhs_ty) {
            Some(Rc::new(Type::Primitive(PrimitiveKind::Bool)))
        } else {
            incompatible(ctx, node, "invalid operand type, must be numeric or pointer");
            None
        };
    }
    if op.is_equality() {
        let ok = |t: &Type| t.is_numeric() || t.is_pointer() || (ctx.options.bool_allowed_in_equality && t.is_bool());
        return if ok(&lhs_ty) && ok(&rhs_ty) {
            Some(Rc::new(Type::Primitive(PrimitiveKind::Bool)))
        } else {
            incompatible(ctx, node, "invalid operand type, must be numeric, boolean, or pointer");
            None
        };
    }
    if op.is_bitwise() {
        return if lhs_ty.is_integral() && rhs_ty.is_integral() {
            Some(lhs_ty)
        } else {
            incompatible(ctx, node, "invalid operand type, must be integral");
            None
        };
    }
    unreachable!("BinaryOp must be one of the dispatched categories")
}

fn dispatch_numeric_or_integral(ctx: &mut AnalysisContext, node: NodeId, op: BinaryOp, lhs_ty: &Rc<Type>, rhs_ty: &Rc<Type>) -> Option<Rc<Type>> {
    if op == BinaryOp::Mod {
        return if lhs_ty.is_integral() && rhs_ty.is_integral() {
            Some(lhs_ty.clone())
        } else {
            incompatible(ctx, node, "invalid operand type, must be integral");
            None
        };
    }
    if lhs_ty.is_numeric() && rhs_ty.is_numeric() {
        Some(lhs_ty.clone())
    } else {
        incompatible(ctx, node, "invalid operand type, must be numeric");
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::builder::Builder;
    use crate::ast::operators::BinaryOp;
    use crate::passes::AnalysisContext;
    use crate::token::TokenKind;

    #[test]
    fn same_width_addition_has_no_promotion() {
        let mut b = Builder::new();
        let one = b.int_literal(TokenKind::INT32_LITERAL, "1");
        let two = b.int_literal(TokenKind::INT32_LITERAL, "2");
        let sum = b.binary(BinaryOp::Add, one, two);
        let root = b.expr_root(sum);
        b.translation_unit(vec![]);
        let ast = b.finish();
        let mut ctx = AnalysisContext::new(ast);

        let ty = type_expression_root(&mut ctx, root);
        assert_eq!(ty, Some(Rc::new(Type::Primitive(PrimitiveKind::Int32))));
        assert!(matches!(ctx.ast.kind(sum), NodeKind::BinaryExpression { .. }));
        if let NodeKind::BinaryExpression { lhs, rhs, .. } = ctx.ast.kind(sum) {
            assert_eq!(*lhs, one);
            assert_eq!(*rhs, two);
        }
    }

    #[test]
    fn mixed_width_addition_inserts_promote_cast_on_narrower_side() {
        let mut b = Builder::new();
        let small = b.int_literal(TokenKind::INT32_LITERAL, "1");
        let big = b.int_literal(TokenKind::INT64_LITERAL, "2");
        let sum = b.binary(BinaryOp::Add, small, big);
        let root = b.expr_root(sum);
        b.translation_unit(vec![]);
        let ast = b.finish();
        let mut ctx = AnalysisContext::new(ast);

        let ty = type_expression_root(&mut ctx, root);
        assert_eq!(ty, Some(Rc::new(Type::Primitive(PrimitiveKind::Int64))));
        let NodeKind::BinaryExpression { lhs, rhs, .. } = ctx.ast.kind(sum).clone() else {
            panic!("expected BinaryExpression");
        };
        assert_ne!(lhs, small, "lhs should have been replaced by a PromoteCast wrapper");
        assert_eq!(rhs, big);
        assert!(matches!(ctx.ast.kind(lhs), NodeKind::PromoteCast { operand } if *operand == small));
        assert_eq!(ctx.ast.attributes(lhs).ty, Some(Rc::new(Type::Primitive(PrimitiveKind::Int64))));
    }

    #[test]
    fn unsigned_signed_mix_is_incompatible() {
        let mut b = Builder::new();
        let u = b.int_literal(TokenKind::UINT32_LITERAL, "1");
        let s = b.int_literal(TokenKind::INT32_LITERAL, "2");
        let sum = b.binary(BinaryOp::Add, u, s);
        let root = b.expr_root(sum);
        b.translation_unit(vec![]);
        let ast = b.finish();
        let mut ctx = AnalysisContext::new(ast);

        let ty = type_expression_root(&mut ctx, root);
        assert_eq!(ty, None);
        assert_eq!(ctx.diagnostics.len(), 1);
        assert!(matches!(ctx.diagnostics.iter().next().unwrap().kind, DiagnosticKind::IncompatibleOperandTypes { .. }));
    }

    #[test]
    fn narrow_unary_operand_is_promoted_to_int32() {
        // Integer literals can only be int32/int64/uint32/uint64 (the
        // grammar has no narrower literal suffix), so exercising narrowing
        // needs a variable actually typed int8.
        let mut b = Builder::new();
        let x_decl_name = b.name("x");
        let x_ty = b.primitive_type("int8");
        let x_decl = b.var_decl(x_decl_name, x_ty, None, true);
        let x_ref = b.name("x");
        let neg = b.unary(crate::ast::operators::UnaryOp::Minus, x_ref);
        let root = b.expr_root(neg);
        b.translation_unit(vec![x_decl]);
        let ast = b.finish();
        let mut ctx = AnalysisContext::new(ast);

        crate::passes::pass1_declare::run(&mut ctx, ctx.ast.root().unwrap());
        let global_scope = ctx.ast.attributes(x_decl_name).scope.unwrap();
        ctx.ast.attributes_mut(x_ref).scope = Some(global_scope);
        let x_symbol = ctx.ast.attributes(x_decl_name).symbol.unwrap();
        if let Symbol::Variable(vs) = ctx.symbols.get_mut(x_symbol) {
            vs.ty = Some(Rc::new(Type::Primitive(PrimitiveKind::Int8)));
        }

        let ty = type_expression_root(&mut ctx, root);
        assert_eq!(ty, Some(Rc::new(Type::Primitive(PrimitiveKind::Int32))));
        let NodeKind::UnaryExpression { operand, .. } = ctx.ast.kind(neg).clone() else { panic!() };
        assert_ne!(operand, x_ref, "operand should have been replaced by a PromoteCast wrapper");
        assert!(matches!(ctx.ast.kind(operand), NodeKind::PromoteCast { operand } if *operand == x_ref));
    }

    #[test]
    fn shift_does_not_co_promote_right_operand_by_default() {
        let mut b = Builder::new();
        let left = b.int_literal(TokenKind::INT64_LITERAL, "1");
        let right = b.int_literal(TokenKind::INT32_LITERAL, "2");
        let shl = b.binary(BinaryOp::Shl, left, right);
        let root = b.expr_root(shl);
        b.translation_unit(vec![]);
        let ast = b.finish();
        let mut ctx = AnalysisContext::new(ast);

        let ty = type_expression_root(&mut ctx, root);
        assert_eq!(ty, Some(Rc::new(Type::Primitive(PrimitiveKind::Int64))));
        let NodeKind::BinaryExpression { rhs, .. } = ctx.ast.kind(shl).clone() else { panic!() };
        assert_eq!(rhs, right, "right operand of a shift must not be wrapped in a PromoteCast");
    }
}
