//! Pass 5a — Global Type Inference.
//!
//! Walks `global_order` (the dependency order Pass 3b computed) and, for
//! each global `VariableDeclaration` with an initializer, types the
//! initializer through the shared kernel
//! ([`pass5_expr::type_expression_root`]) and unconditionally overwrites
//! both the type specifier's `ty` attribute and the symbol's `ty` field with
//! the initializer's computed type, for every global, not only ones whose
//! specifier is `AlphaType`.
//!
//! A global with no initializer (e.g. `var a: int32[n];`) has no expression
//! to type, so its declared type is resolved directly from its concrete
//! type specifier via [`pass2_alias::resolve_type_expr`], the same resolver
//! Pass 2 uses for alias right-hand sides.

use std::collections::HashSet;

use crate::ast::{NodeId, NodeKind};
use crate::passes::{pass2_alias, pass5_expr, AnalysisContext};
use crate::symbols::Symbol;

pub fn run(ctx: &mut AnalysisContext, global_order: &[NodeId]) {
    for &decl in global_order {
        infer_global(ctx, decl);
    }
}

fn infer_global(ctx: &mut AnalysisContext, decl: NodeId) {
    let (name, type_spec, initializer) = match ctx.ast.kind(decl).clone() {
        NodeKind::VariableDeclaration { name, type_spec, initializer, .. } => (name, type_spec, initializer),
        other => panic!("expected a VariableDeclaration, found {other:?}"),
    };

    let ty = match initializer {
        Some(init) => pass5_expr::type_expression_root(ctx, init),
        None => {
            let scope = ctx
                .ast
                .attributes(decl)
                .scope
                .expect("global variable declaration must have a scope attribute set by Pass 1");
            pass2_alias::resolve_type_expr(ctx, type_spec, scope, &mut HashSet::new())
        }
    };

    let Some(ty) = ty else { return };
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
    use crate::passes::{pass1_declare, pass2_alias, pass3b_dependency, AnalysisContext};
    use crate::symbols::Symbol;
    use crate::token::TokenKind;
    use crate::types::{PrimitiveKind, Type};

    #[test]
    fn global_with_alpha_type_infers_from_initializer() {
        // var a = 1;
        let mut b = Builder::new();
        let name = b.name("a");
        let ty_spec = b.alpha_type();
        let one = b.int_literal(TokenKind::INT32_LITERAL, "1");
        let init = b.expr_root(one);
        let decl = b.var_decl(name, ty_spec, Some(init), true);
        b.translation_unit(vec![decl]);
        let ast = b.finish();

        let mut ctx = AnalysisContext::new(ast);
        let root = ctx.ast.root().unwrap();
        pass1_declare::run(&mut ctx, root);
        pass2_alias::run(&mut ctx, root);
        let order = pass3b_dependency::run(&mut ctx, root);
        run(&mut ctx, &order);

        assert_eq!(ctx.ast.attributes(ty_spec).ty, Some(std::rc::Rc::new(Type::Primitive(PrimitiveKind::Int32))));
        let symbol_id = ctx.ast.attributes(name).symbol.unwrap();
        let Symbol::Variable(var) = ctx.symbols.get(symbol_id) else { panic!("expected a variable symbol") };
        assert_eq!(var.ty, Some(std::rc::Rc::new(Type::Primitive(PrimitiveKind::Int32))));
    }

    #[test]
    fn global_without_initializer_resolves_its_concrete_type() {
        // var a: int32;
        let mut b = Builder::new();
        let name = b.name("a");
        let ty_spec = b.primitive_type("int32");
        let decl = b.var_decl(name, ty_spec, None, true);
        b.translation_unit(vec![decl]);
        let ast = b.finish();

        let mut ctx = AnalysisContext::new(ast);
        let root = ctx.ast.root().unwrap();
        pass1_declare::run(&mut ctx, root);
        pass2_alias::run(&mut ctx, root);
        let order = pass3b_dependency::run(&mut ctx, root);
        run(&mut ctx, &order);

        let symbol_id = ctx.ast.attributes(name).symbol.unwrap();
        let Symbol::Variable(var) = ctx.symbols.get(symbol_id) else { panic!("expected a variable symbol") };
        assert_eq!(var.ty, Some(std::rc::Rc::new(Type::Primitive(PrimitiveKind::Int32))));
    }
}
