//! Pass 3a — Reference Validation.
//!
//! Walks the *whole* tree for `ExpressionRoot` nodes rather than
//! special-casing which declaration kinds carry expressions, so array-size
//! expressions inside type specifiers get the same check as ordinary
//! initializers. For each `Name` inside a found `ExpressionRoot`: resolve
//! it in its attached scope, and if the resolved symbol's declaration is
//! local (not global), require the reference's token position to be at or
//! after the declaration's name-node position.

use crate::ast::{NodeId, NodeKind};
use crate::diagnostics::DiagnosticKind;
use crate::passes::AnalysisContext;
use crate::symbols::ScopeKind;

pub fn run(ctx: &mut AnalysisContext, root: NodeId) {
    let mut roots = Vec::new();
    ctx.ast.walk(root, |id| {
        if matches!(ctx.ast.kind(id), NodeKind::ExpressionRoot { .. }) {
            roots.push(id);
        }
    });
    for expr_root in roots {
        check_expr(ctx, expr_root);
    }
}

fn line_of(ctx: &AnalysisContext, node: NodeId) -> u32 {
    ctx.ast.token(node).map(|t| t.line).unwrap_or(0)
}

fn name_lexeme(ctx: &AnalysisContext, name: NodeId) -> String {
    match ctx.ast.kind(name) {
        NodeKind::Name { lexeme } => lexeme.clone(),
        other => panic!("expected a Name node, found {other:?}"),
    }
}

fn check_expr(ctx: &mut AnalysisContext, node: NodeId) {
    match ctx.ast.kind(node).clone() {
        NodeKind::ExpressionRoot { expression } => check_expr(ctx, expression),
        NodeKind::Name { .. } => check_name(ctx, node),
        NodeKind::BinaryExpression { lhs, rhs, .. } => {
            check_expr(ctx, lhs);
            check_expr(ctx, rhs);
        }
        NodeKind::UnaryExpression { operand, .. } => check_expr(ctx, operand),
        NodeKind::BooleanLiteral { .. } | NodeKind::IntegerLiteral | NodeKind::FloatingPointLiteral | NodeKind::NullLiteral => {}
        other => panic!("unexpected node kind inside an expression: {other:?}"),
    }
}

/// The declaration node's own name child, used to compare source position
/// against the reference.
fn declaration_name_node(ctx: &AnalysisContext, decl_node: NodeId) -> NodeId {
    match ctx.ast.kind(decl_node) {
        NodeKind::VariableDeclaration { name, .. }
        | NodeKind::Parameter { name, .. }
        | NodeKind::FunctionDeclaration { name, .. }
        | NodeKind::StructureDeclaration { name, .. }
        | NodeKind::UnionDeclaration { name, .. }
        | NodeKind::ClassDeclaration { name, .. } => *name,
        other => panic!("unexpected declaration node kind: {other:?}"),
    }
}

fn check_name(ctx: &mut AnalysisContext, name_node: NodeId) {
    let lexeme = name_lexeme(ctx, name_node);
    let scope = ctx
        .ast
        .attributes(name_node)
        .scope
        .expect("Name node must have a scope attribute set by Pass 1");

    let Some(symbol_id) = ctx.scopes.resolve(scope, &lexeme) else {
        let line = line_of(ctx, name_node);
        ctx.diagnostics.error(line, DiagnosticKind::UnresolvedName { name: lexeme });
        return;
    };

    let Some(decl_node) = ctx.symbols.get(symbol_id).declaration_node() else {
        // Type/primitive symbols have no source declaration to order against.
        return;
    };
    let Some(decl_scope) = ctx.ast.attributes(decl_node).scope else {
        return;
    };
    if ctx.scopes.kind(decl_scope) == ScopeKind::Global {
        // Globals are exempt from ordering: forward references are
        // permitted in constant initializers and array sizes.
        return;
    }

    let decl_name = declaration_name_node(ctx, decl_node);
    let ref_pos = ctx.ast.token(name_node).map(|t| t.position).unwrap_or(0);
    let decl_pos = ctx.ast.token(decl_name).map(|t| t.position).unwrap_or(0);
    if ref_pos < decl_pos {
        let line = line_of(ctx, name_node);
        ctx.diagnostics.error(line, DiagnosticKind::UseBeforeDeclaration { name: lexeme });
    }
}
