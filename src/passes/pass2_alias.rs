//! Pass 2 — Type-Alias Resolution.
//!
//! Descends into each `TypealiasDeclaration`'s type expression, mapping
//! `ArrayType`, `PointerType`, `PrimitiveType` and `NominalType` to canonical
//! `Type` values, and resolves a `NominalType` by the lexeme's enclosing
//! scope (`PrimitiveType` resolves via the builtin scope specifically,
//! rather than the current scope). Aliases may forward-reference nominal
//! types declared later at global scope; resolution here happens on demand,
//! recursing into whichever alias declaration a `NominalType` names, rather
//! than requiring declaration order.

use std::collections::HashSet;
use std::rc::Rc;

use crate::ast::{NodeId, NodeKind};
use crate::diagnostics::DiagnosticKind;
use crate::passes::AnalysisContext;
use crate::symbols::{ScopeId, Symbol, SymbolId};
use crate::types::{ArraySize, Type};

pub fn run(ctx: &mut AnalysisContext, root: NodeId) {
    let mut aliases = Vec::new();
    ctx.ast.walk(root, |id| {
        if matches!(ctx.ast.kind(id), NodeKind::TypealiasDeclaration { .. }) {
            aliases.push(id);
        }
    });
    let mut in_progress = HashSet::new();
    for alias in aliases {
        resolve_typealias(ctx, alias, &mut in_progress);
    }
}

fn line_of(ctx: &AnalysisContext, node: NodeId) -> u32 {
    ctx.ast.token(node).map(|t| t.line).unwrap_or(0)
}

fn name_lexeme(ctx: &AnalysisContext, name: NodeId) -> String {
    match ctx.ast.kind(name) {
        NodeKind::Name { lexeme } => lexeme.clone(),
        other => panic!("declaration name child must be a Name node, found {other:?}"),
    }
}

/// Resolves `alias_node`'s underlying type if not already resolved,
/// returning it either way. `in_progress` tracks symbols currently being
/// resolved on the call stack so a cycle reports `InvalidAliasResolution`
/// instead of recursing forever.
fn resolve_typealias(ctx: &mut AnalysisContext, alias_node: NodeId, in_progress: &mut HashSet<SymbolId>) -> Option<Rc<Type>> {
    let (name, type_spec) = match ctx.ast.kind(alias_node).clone() {
        NodeKind::TypealiasDeclaration { name, type_spec } => (name, type_spec),
        other => panic!("expected a TypealiasDeclaration, found {other:?}"),
    };

    let symbol_id = ctx.ast.attributes(name).symbol?;
    if let Symbol::Type(ts) = ctx.symbols.get(symbol_id) {
        if let Type::Typealias { underlying: Some(underlying), .. } = ts.ty.as_ref() {
            return Some(underlying.clone());
        }
    }

    if !in_progress.insert(symbol_id) {
        let lexeme = name_lexeme(ctx, name);
        let line = line_of(ctx, name);
        ctx.diagnostics.error(
            line,
            DiagnosticKind::InvalidAliasResolution { message: format!("'{lexeme}' is defined in terms of itself") },
        );
        return None;
    }

    let scope = ctx
        .ast
        .attributes(alias_node)
        .scope
        .expect("typealias declaration must have a scope attribute set by Pass 1");
    let resolved = resolve_type_expr(ctx, type_spec, scope, in_progress);
    in_progress.remove(&symbol_id);

    if let Some(ty) = &resolved {
        if let Symbol::Type(ts) = ctx.symbols.get_mut(symbol_id) {
            ts.ty = Rc::new(Type::Typealias { name: ts.name.clone(), underlying: Some(ty.clone()) });
        }
    }
    resolved
}

/// Resolves a concrete type specifier to a `Type`, recursing through
/// pointers and arrays and handing nominal lookups to
/// [`resolve_nominal_symbol`]. Shared with Pass 5a/5b for typing a
/// declaration's own (non-alias) type specifier, since the underlying
/// type-expression grammar is identical whether it appears on the right of
/// a typealias or directly on a variable.
pub(crate) fn resolve_type_expr(ctx: &mut AnalysisContext, node: NodeId, scope: ScopeId, in_progress: &mut HashSet<SymbolId>) -> Option<Rc<Type>> {
    let resolved = match ctx.ast.kind(node).clone() {
        NodeKind::PrimitiveType { lexeme } => {
            let builtin = ctx.scopes.builtin();
            match ctx.scopes.resolve(builtin, &lexeme) {
                Some(sid) => ctx.symbols.get(sid).ty(),
                None => {
                    let line = line_of(ctx, node);
                    ctx.diagnostics.error(
                        line,
                        DiagnosticKind::InvalidAliasResolution { message: format!("unknown primitive type '{lexeme}'") },
                    );
                    None
                }
            }
        }
        NodeKind::NominalType { lexeme } => match ctx.scopes.resolve(scope, &lexeme) {
            Some(sid) => resolve_nominal_symbol(ctx, sid, in_progress),
            None => {
                let line = line_of(ctx, node);
                ctx.diagnostics.error(
                    line,
                    DiagnosticKind::InvalidAliasResolution { message: format!("unknown type '{lexeme}'") },
                );
                None
            }
        },
        NodeKind::PointerType { base } => resolve_type_expr(ctx, base, scope, in_progress).map(|b| Rc::new(Type::Pointer(b))),
        NodeKind::ArrayType { base, size } => {
            // A syntactically constant size is folded to `Known` here so
            // downstream passes (and a host reading the resolved `Type`)
            // see a concrete array length whenever one is computable,
            // independent of whether the separate constant-expression
            // checker (Pass 5c) later permits or rejects that same
            // expression in this position.
            let array_size = match crate::passes::constant_check::eval_constant_u64(ctx, size) {
                Some(n) => ArraySize::Known(n),
                None => ArraySize::Symbolic(size),
            };
            resolve_type_expr(ctx, base, scope, in_progress).map(|b| Rc::new(Type::Array { base: b, size: array_size }))
        }
        other => panic!("unexpected node kind inside a type specifier: {other:?}"),
    };
    ctx.ast.attributes_mut(node).ty = resolved.clone();
    resolved
}

fn resolve_nominal_symbol(ctx: &mut AnalysisContext, sid: SymbolId, in_progress: &mut HashSet<SymbolId>) -> Option<Rc<Type>> {
    match ctx.symbols.get(sid).clone() {
        Symbol::Type(ts) => {
            if let Type::Typealias { underlying: None, .. } = ts.ty.as_ref() {
                if let Some(decl_node) = ts.declaration_node {
                    return resolve_typealias(ctx, decl_node, in_progress);
                }
            }
            Some(ts.ty.clone())
        }
        Symbol::Structure(s) => Some(Rc::new(Type::Structure { name: s.name })),
        Symbol::Union(s) => Some(Rc::new(Type::Union { name: s.name })),
        Symbol::Class(s) => Some(Rc::new(Type::Class { name: s.name })),
        other => {
            ctx.diagnostics.error(
                0,
                DiagnosticKind::InvalidAliasResolution { message: format!("'{}' does not name a type", other.name()) },
            );
            None
        }
    }
}
