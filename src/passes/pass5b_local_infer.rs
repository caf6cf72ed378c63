//! Pass 5b — Local Type Inference.
//!
//! For a local declared `AlphaType`, infers its type from its mandatory
//! initializer. A local declared with a concrete type specifier has that
//! type resolved instead (through the same [`pass2_alias::resolve_type_expr`]
//! Pass 5a uses for globals) without letting an accompanying initializer
//! overwrite it — type-compatibility checking between a declared type and
//! its initializer is a later-pass concern, out of scope here.
//!
//! Walks every `FunctionDeclaration` body in declaration order, mirroring
//! the declaration pass's statement recursion: scopes are already attached
//! and declare-before-use is already enforced by Pass 3a, so any local
//! referenced inside an initializer is guaranteed to already carry a type
//! by the time this pass reaches it.

use std::collections::HashSet;

use crate::ast::{NodeId, NodeKind};
use crate::passes::{pass2_alias, pass5_expr, AnalysisContext};
use crate::symbols::Symbol;

pub fn run(ctx: &mut AnalysisContext, root: NodeId) {
    let declarations = match ctx.ast.kind(root).clone() {
        NodeKind::TranslationUnit { declarations } => declarations,
        other => panic!("ast root must be a TranslationUnit, found {other:?}"),
    };
    for decl in declarations {
        if let NodeKind::FunctionDeclaration { body, .. } = ctx.ast.kind(decl).clone() {
            infer_statement(ctx, body);
        }
    }
}

fn infer_statement(ctx: &mut AnalysisContext, stmt: NodeId) {
    match ctx.ast.kind(stmt).clone() {
        NodeKind::VariableDeclaration { name, type_spec, initializer, .. } => {
            infer_local_variable(ctx, stmt, name, type_spec, initializer);
        }
        NodeKind::Assignment { target, value } => {
            pass5_expr::type_expression_root(ctx, target);
            pass5_expr::type_expression_root(ctx, value);
        }
        NodeKind::ExpressionRoot { .. } => {
            pass5_expr::type_expression_root(ctx, stmt);
        }
        NodeKind::Block { statements } | NodeKind::TopBlock { statements } => {
            for s in statements {
                infer_statement(ctx, s);
            }
        }
        other => panic!("unexpected node kind as a statement: {other:?}"),
    }
}

fn infer_local_variable(ctx: &mut AnalysisContext, decl: NodeId, name: NodeId, type_spec: NodeId, initializer: Option<NodeId>) {
    let is_alpha = matches!(ctx.ast.kind(type_spec), NodeKind::AlphaType);

    let declared_ty = if is_alpha {
        let init = initializer.expect("an AlphaType local must carry an initializer, enforced upstream by the parser");
        pass5_expr::type_expression_root(ctx, init)
    } else {
        let scope = ctx
            .ast
            .attributes(decl)
            .scope
            .expect("local variable declaration must have a scope attribute set by Pass 1");
        let resolved = pass2_alias::resolve_type_expr(ctx, type_spec, scope, &mut HashSet::new());
        if let Some(init) = initializer {
            // Typed for completeness (every sub-expression of a successfully
            // typed tree carries a `ty` attribute) but never allowed to
            // override the declared type.
            pass5_expr::type_expression_root(ctx, init);
        }
        resolved
    };

    let Some(ty) = declared_ty else { return };
    ctx.ast.attributes_mut(type_spec).ty = Some(ty.clone());

    let Some(symbol_id) = ctx.ast.attributes(name).symbol else { return };
    if let Symbol::Variable(var) = ctx.symbols.get_mut(symbol_id) {
        var.ty = Some(ty);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::builder::Builder;
    use crate::passes::{pass1_declare, pass2_alias, AnalysisContext};
    use crate::symbols::Symbol;
    use crate::token::TokenKind;
    use crate::types::{PrimitiveKind, Type};

    fn wrap_in_function(b: &mut Builder, statements: Vec<NodeId>) -> NodeId {
        let params = b.parameter_list(vec![]);
        let ret = b.primitive_type("void");
        let body = b.top_block(statements);
        let fn_name = b.name("f");
        b.function_decl(fn_name, params, ret, body)
    }

    #[test]
    fn local_with_alpha_type_infers_from_initializer() {
        let mut b = Builder::new();
        let name = b.name("x");
        let ty_spec = b.alpha_type();
        let one = b.int_literal(TokenKind::INT32_LITERAL, "1");
        let init = b.expr_root(one);
        let decl = b.var_decl(name, ty_spec, Some(init), false);
        let func = wrap_in_function(&mut b, vec![decl]);
        b.translation_unit(vec![func]);
        let ast = b.finish();

        let mut ctx = AnalysisContext::new(ast);
        let root = ctx.ast.root().unwrap();
        pass1_declare::run(&mut ctx, root);
        pass2_alias::run(&mut ctx, root);
        run(&mut ctx, root);

        let symbol_id = ctx.ast.attributes(name).symbol.unwrap();
        let Symbol::Variable(var) = ctx.symbols.get(symbol_id) else { panic!("expected a variable symbol") };
        assert_eq!(var.ty, Some(std::rc::Rc::new(Type::Primitive(PrimitiveKind::Int32))));
    }

    #[test]
    fn local_with_concrete_type_keeps_declared_type_despite_mismatched_initializer() {
        // int64 x = 1; (a narrower literal than the declared type)
        let mut b = Builder::new();
        let name = b.name("x");
        let ty_spec = b.primitive_type("int64");
        let one = b.int_literal(TokenKind::INT32_LITERAL, "1");
        let init = b.expr_root(one);
        let decl = b.var_decl(name, ty_spec, Some(init), false);
        let func = wrap_in_function(&mut b, vec![decl]);
        b.translation_unit(vec![func]);
        let ast = b.finish();

        let mut ctx = AnalysisContext::new(ast);
        let root = ctx.ast.root().unwrap();
        pass1_declare::run(&mut ctx, root);
        pass2_alias::run(&mut ctx, root);
        run(&mut ctx, root);

        let symbol_id = ctx.ast.attributes(name).symbol.unwrap();
        let Symbol::Variable(var) = ctx.symbols.get(symbol_id) else { panic!("expected a variable symbol") };
        assert_eq!(var.ty, Some(std::rc::Rc::new(Type::Primitive(PrimitiveKind::Int64))));
        assert_eq!(ctx.ast.attributes(init).ty, Some(std::rc::Rc::new(Type::Primitive(PrimitiveKind::Int32))));
    }
}
