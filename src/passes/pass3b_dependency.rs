//! Pass 3b — Global Dependency Ordering.
//!
//! Builds a dependency graph over global `VariableDeclaration` nodes (every
//! global is added as a node even with no dependencies), with edges derived
//! from `ExpressionRoot` expressions reachable through the type-specifier
//! (array sizes) and the initializer. The graph is topologically sorted with
//! insertion order as the tie-break, using Kahn's algorithm over a
//! `BTreeSet` of ready node indices so the earliest-declared ready node is
//! always picked next, giving a stable, reproducible order.

use std::collections::{BTreeSet, HashMap};

use crate::ast::{NodeId, NodeKind};
use crate::diagnostics::DiagnosticKind;
use crate::passes::AnalysisContext;
use crate::symbols::Symbol;

pub fn run(ctx: &mut AnalysisContext, root: NodeId) -> Vec<NodeId> {
    let globals = collect_global_variable_decls(ctx, root);

    let mut edges: HashMap<NodeId, Vec<NodeId>> = HashMap::new();
    for &decl in &globals {
        let deps = compute_and_store_deps(ctx, decl);
        edges.insert(decl, deps);
    }

    match topo_sort(&globals, &edges) {
        Ok(order) => order,
        Err(cycle_node) => {
            let name = decl_variable_name(ctx, cycle_node);
            let line = line_of(ctx, cycle_node);
            ctx.diagnostics.error(line, DiagnosticKind::CircularDefinition { name });
            Vec::new()
        }
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

fn decl_variable_name(ctx: &AnalysisContext, decl: NodeId) -> String {
    match ctx.ast.kind(decl).clone() {
        NodeKind::VariableDeclaration { name, .. } => name_lexeme(ctx, name),
        other => panic!("expected a VariableDeclaration, found {other:?}"),
    }
}

fn collect_global_variable_decls(ctx: &AnalysisContext, root: NodeId) -> Vec<NodeId> {
    match ctx.ast.kind(root).clone() {
        NodeKind::TranslationUnit { declarations } => declarations
            .into_iter()
            .filter(|&d| matches!(ctx.ast.kind(d), NodeKind::VariableDeclaration { .. }))
            .collect(),
        other => panic!("ast root must be a TranslationUnit, found {other:?}"),
    }
}

/// Computes `decl`'s full dependency list (type-specifier array sizes plus
/// initializer), writing `dep_list` onto each `ExpressionRoot`/`ArrayType`
/// node visited along the way, and returns the union for the graph edge.
fn compute_and_store_deps(ctx: &mut AnalysisContext, decl: NodeId) -> Vec<NodeId> {
    let (type_spec, initializer) = match ctx.ast.kind(decl).clone() {
        NodeKind::VariableDeclaration { type_spec, initializer, .. } => (type_spec, initializer),
        other => panic!("expected a VariableDeclaration, found {other:?}"),
    };

    let mut all = Vec::new();
    collect_and_store_type_deps(ctx, type_spec, &mut all);
    if let Some(init) = initializer {
        let mut init_deps = Vec::new();
        collect_deps_in_expr(ctx, init, &mut init_deps);
        ctx.ast.attributes_mut(init).dep_list = Some(init_deps.clone());
        all.extend(init_deps);
    }
    all.retain(|&d| d != decl);
    all.dedup();
    all
}

fn collect_and_store_type_deps(ctx: &mut AnalysisContext, node: NodeId, all: &mut Vec<NodeId>) {
    match ctx.ast.kind(node).clone() {
        NodeKind::PrimitiveType { .. } | NodeKind::NominalType { .. } | NodeKind::AlphaType => {}
        NodeKind::PointerType { base } => collect_and_store_type_deps(ctx, base, all),
        NodeKind::ArrayType { base, size } => {
            collect_and_store_type_deps(ctx, base, all);
            let mut size_deps = Vec::new();
            collect_deps_in_expr(ctx, size, &mut size_deps);
            ctx.ast.attributes_mut(size).dep_list = Some(size_deps.clone());
            ctx.ast.attributes_mut(node).dep_list = Some(size_deps.clone());
            all.extend(size_deps);
        }
        other => panic!("unexpected node kind inside a type specifier: {other:?}"),
    }
}

fn collect_deps_in_expr(ctx: &AnalysisContext, node: NodeId, out: &mut Vec<NodeId>) {
    match ctx.ast.kind(node).clone() {
        NodeKind::ExpressionRoot { expression } => collect_deps_in_expr(ctx, expression, out),
        NodeKind::Name { lexeme } => {
            if let Some(scope) = ctx.ast.attributes(node).scope {
                if let Some(sid) = ctx.scopes.resolve(scope, &lexeme) {
                    if let Symbol::Variable(vs) = ctx.symbols.get(sid) {
                        out.push(vs.declaration_node);
                    }
                }
            }
        }
        NodeKind::BinaryExpression { lhs, rhs, .. } => {
            collect_deps_in_expr(ctx, lhs, out);
            collect_deps_in_expr(ctx, rhs, out);
        }
        NodeKind::UnaryExpression { operand, .. } => collect_deps_in_expr(ctx, operand, out),
        NodeKind::BooleanLiteral { .. } | NodeKind::IntegerLiteral | NodeKind::FloatingPointLiteral | NodeKind::NullLiteral => {}
        other => panic!("unexpected node kind inside an expression: {other:?}"),
    }
}

/// Kahn's algorithm with a `BTreeSet<usize>` ready queue keyed by each
/// node's position in `nodes` (declaration/insertion order), so ties always
/// resolve to the earliest-declared global.
fn topo_sort(nodes: &[NodeId], edges: &HashMap<NodeId, Vec<NodeId>>) -> Result<Vec<NodeId>, NodeId> {
    let index_of: HashMap<NodeId, usize> = nodes.iter().enumerate().map(|(i, &n)| (n, i)).collect();
    let mut in_degree: HashMap<NodeId, usize> = nodes.iter().map(|&n| (n, 0)).collect();
    let mut dependents: HashMap<NodeId, Vec<NodeId>> = nodes.iter().map(|&n| (n, Vec::new())).collect();

    for &n in nodes {
        if let Some(deps) = edges.get(&n) {
            for &dep in deps {
                if dep == n || !index_of.contains_key(&dep) {
                    continue;
                }
                *in_degree.get_mut(&n).unwrap() += 1;
                dependents.get_mut(&dep).unwrap().push(n);
            }
        }
    }

    let mut ready: BTreeSet<usize> = nodes.iter().filter(|n| in_degree[n] == 0).map(|n| index_of[n]).collect();
    let mut order = Vec::with_capacity(nodes.len());

    while let Some(&idx) = ready.iter().next() {
        ready.remove(&idx);
        let n = nodes[idx];
        order.push(n);
        for &m in &dependents[&n] {
            let deg = in_degree.get_mut(&m).unwrap();
            *deg -= 1;
            if *deg == 0 {
                ready.insert(index_of[&m]);
            }
        }
    }

    if order.len() == nodes.len() {
        Ok(order)
    } else {
        let cycle_node = *nodes.iter().find(|n| in_degree[n] > 0).expect("cycle must leave an unresolved node");
        Err(cycle_node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::builder::Builder;
    use crate::passes::{pass1_declare, pass2_alias, AnalysisContext};
    use crate::token::TokenKind;

    #[test]
    fn orders_dependents_after_their_dependencies() {
        // var a: int32 = 1; var b: int64 = a + 2;
        let mut b = Builder::new();
        let a_name = b.name("a");
        let a_ty = b.primitive_type("int32");
        let one = b.int_literal(TokenKind::INT32_LITERAL, "1");
        let a_init = b.expr_root(one);
        let a_decl = b.var_decl(a_name, a_ty, Some(a_init), true);

        let b_name = b.name("b");
        let b_ty = b.primitive_type("int64");
        let a_ref = b.name("a");
        let two = b.int_literal(TokenKind::INT32_LITERAL, "2");
        let sum = b.binary(crate::ast::operators::BinaryOp::Add, a_ref, two);
        let b_init = b.expr_root(sum);
        let b_decl = b.var_decl(b_name, b_ty, Some(b_init), true);

        b.translation_unit(vec![a_decl, b_decl]);
        let ast = b.finish();

        let mut ctx = AnalysisContext::new(ast);
        let root = ctx.ast.root().unwrap();
        pass1_declare::run(&mut ctx, root);
        pass2_alias::run(&mut ctx, root);
        let order = run(&mut ctx, root);

        assert_eq!(order, vec![a_decl, b_decl]);
        assert!(ctx.diagnostics.is_empty());
    }

    #[test]
    fn reorders_dependency_declared_after_dependent() {
        // var a = b + 1; var b: int32 = 2;
        let mut b = Builder::new();
        let a_name = b.name("a");
        let a_ty = b.alpha_type();
        let b_ref = b.name("b");
        let one = b.int_literal(TokenKind::INT32_LITERAL, "1");
        let sum = b.binary(crate::ast::operators::BinaryOp::Add, b_ref, one);
        let a_init = b.expr_root(sum);
        let a_decl = b.var_decl(a_name, a_ty, Some(a_init), true);

        let b_name = b.name("b");
        let b_ty = b.primitive_type("int32");
        let two = b.int_literal(TokenKind::INT32_LITERAL, "2");
        let b_init = b.expr_root(two);
        let b_decl = b.var_decl(b_name, b_ty, Some(b_init), true);

        b.translation_unit(vec![a_decl, b_decl]);
        let ast = b.finish();

        let mut ctx = AnalysisContext::new(ast);
        let root = ctx.ast.root().unwrap();
        pass1_declare::run(&mut ctx, root);
        pass2_alias::run(&mut ctx, root);
        let order = run(&mut ctx, root);

        assert_eq!(order, vec![b_decl, a_decl]);
    }

    #[test]
    fn circular_definition_is_reported() {
        // var a = b; var b = a;
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

        let mut ctx = AnalysisContext::new(ast);
        let root = ctx.ast.root().unwrap();
        pass1_declare::run(&mut ctx, root);
        pass2_alias::run(&mut ctx, root);
        let order = run(&mut ctx, root);

        assert!(order.is_empty());
        assert!(ctx
            .diagnostics
            .iter()
            .any(|d| matches!(d.kind, DiagnosticKind::CircularDefinition { .. })));
    }
}
