//! Pass 5c — Constant-Expression Checking.
//!
//! Two independent responsibilities live in this module:
//!
//! - [`run`]: a bottom-up `is_constant` evaluator over expression trees,
//!   enforced (as a diagnostic) only at the two sites the language actually
//!   requires a constant: a global variable's initializer, and any array
//!   type's size expression.
//! - [`eval_constant_u64`]: a separate, self-contained literal folder used
//!   by Pass 2 to resolve `ArraySize::Known` independently of whether the
//!   formal `is_constant` check above would accept the same expression —
//!   "foldable" and "legal here" are different questions (see `DESIGN.md`).

use crate::ast::{NodeId, NodeKind};
use crate::diagnostics::DiagnosticKind;
use crate::passes::AnalysisContext;

pub fn run(ctx: &mut AnalysisContext, root: NodeId) {
    let mut decls = Vec::new();
    ctx.ast.walk(root, |id| {
        if matches!(ctx.ast.kind(id), NodeKind::VariableDeclaration { .. }) {
            decls.push(id);
        }
    });

    for decl in decls {
        check_variable_declaration(ctx, decl);
    }

    let mut array_sizes = Vec::new();
    ctx.ast.walk(root, |id| {
        if let NodeKind::ArrayType { size, .. } = ctx.ast.kind(id) {
            array_sizes.push(*size);
        }
    });
    for size in array_sizes {
        check_is_constant(ctx, size, "array size");
    }
}

fn line_of(ctx: &AnalysisContext, node: NodeId) -> u32 {
    ctx.ast.token(node).map(|t| t.line).unwrap_or(0)
}

fn check_variable_declaration(ctx: &mut AnalysisContext, decl: NodeId) {
    let (initializer, is_global) = match ctx.ast.kind(decl).clone() {
        NodeKind::VariableDeclaration { initializer, .. } => (initializer, ctx.ast.attributes(decl).is_global.unwrap_or(false)),
        other => panic!("expected a VariableDeclaration, found {other:?}"),
    };
    let Some(init) = initializer else { return };
    if is_global {
        check_is_constant(ctx, init, "global variable initializer");
    } else {
        // Always computed, but only enforced at the two sites named above —
        // a local initializer carries the attribute without a diagnostic.
        compute_is_constant(ctx, init);
    }
}

fn check_is_constant(ctx: &mut AnalysisContext, node: NodeId, context: &'static str) {
    if !compute_is_constant(ctx, node) {
        let line = line_of(ctx, node);
        ctx.diagnostics.error(line, DiagnosticKind::ConstantRequired { context });
    }
}

/// Bottom-up `is_constant` propagation: a `Name` is constant iff its
/// resolved symbol's `is_constant` flag is set; a literal is always
/// constant; a unary/binary expression is constant iff every operand is;
/// casts pass through their operand.
fn compute_is_constant(ctx: &mut AnalysisContext, node: NodeId) -> bool {
    let result = match ctx.ast.kind(node).clone() {
        NodeKind::ExpressionRoot { expression } => compute_is_constant(ctx, expression),
        NodeKind::Name { lexeme } => {
            let scope = ctx.ast.attributes(node).scope;
            scope
                .and_then(|s| ctx.scopes.resolve(s, &lexeme))
                .map(|sid| ctx.symbols.get(sid).is_constant())
                .unwrap_or(false)
        }
        NodeKind::BooleanLiteral { .. } | NodeKind::IntegerLiteral | NodeKind::FloatingPointLiteral | NodeKind::NullLiteral => true,
        NodeKind::BinaryExpression { lhs, rhs, .. } => compute_is_constant(ctx, lhs) && compute_is_constant(ctx, rhs),
        NodeKind::UnaryExpression { operand, .. } => compute_is_constant(ctx, operand),
        NodeKind::PromoteCast { operand } | NodeKind::WidenCast { operand } => compute_is_constant(ctx, operand),
        other => panic!("unexpected node kind inside an expression: {other:?}"),
    };
    ctx.ast.attributes_mut(node).is_constant = Some(result);
    result
}

/// Syntactic literal folding, independent of [`compute_is_constant`]'s
/// formal flag-based check. Handles the small arithmetic subset array sizes
/// actually use; anything else (a non-constant name, an unsupported
/// operator) yields `None` and the caller falls back to a symbolic size.
pub(crate) fn eval_constant_u64(ctx: &AnalysisContext, node: NodeId) -> Option<u64> {
    match ctx.ast.kind(node).clone() {
        NodeKind::ExpressionRoot { expression } => eval_constant_u64(ctx, expression),
        NodeKind::IntegerLiteral => ctx.ast.token(node)?.lexeme.parse().ok(),
        NodeKind::Name { lexeme } => {
            let scope = ctx.ast.attributes(node).scope?;
            let sid = ctx.scopes.resolve(scope, &lexeme)?;
            let var = ctx.symbols.get(sid).as_variable()?;
            if !var.is_constant {
                return None;
            }
            let init = match ctx.ast.kind(var.declaration_node).clone() {
                NodeKind::VariableDeclaration { initializer, .. } => initializer,
                _ => None,
            };
            eval_constant_u64(ctx, init?)
        }
        NodeKind::UnaryExpression { op, operand } if op == crate::ast::operators::UnaryOp::Plus => eval_constant_u64(ctx, operand),
        NodeKind::BinaryExpression { op, lhs, rhs } => {
            let l = eval_constant_u64(ctx, lhs)?;
            let r = eval_constant_u64(ctx, rhs)?;
            match op {
                crate::ast::operators::BinaryOp::Add => l.checked_add(r),
                crate::ast::operators::BinaryOp::Sub => l.checked_sub(r),
                crate::ast::operators::BinaryOp::Mul => l.checked_mul(r),
                crate::ast::operators::BinaryOp::Div => l.checked_div(r),
                _ => None,
            }
        }
        _ => None,
    }
}
