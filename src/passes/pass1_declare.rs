//! Pass 1 — Declaration & Scope.
//!
//! Walks the AST once, pushes a `Global` scope under `Builtin` at the
//! translation unit, enters every declared type/function/variable/parameter
//! symbol, and attaches the active scope to every `Name` node so later
//! passes need no current-scope threading. `declare_record` folds the
//! near-identical structure/union/class handling into one
//! push-scope-and-recurse helper, since the three only differ in
//! `ScopeKind` and diagnostic label.

use std::rc::Rc;

use crate::ast::{NodeId, NodeKind};
use crate::diagnostics::DiagnosticKind;
use crate::passes::AnalysisContext;
use crate::symbols::{ClassSymbol, ScopeId, ScopeKind, StructureSymbol, Symbol, TypeSymbol, UnionSymbol, VariableSymbol, FunctionSymbol};
use crate::types::Type;

pub fn run(ctx: &mut AnalysisContext, root: NodeId) {
    let global = ctx.scopes.alloc_scope(ScopeKind::Global, Some(ctx.scopes.builtin()));
    ctx.ast.attributes_mut(root).scope = Some(global);

    let declarations = match ctx.ast.kind(root).clone() {
        NodeKind::TranslationUnit { declarations } => declarations,
        other => panic!("ast root must be a TranslationUnit, found {other:?}"),
    };
    for decl in declarations {
        declare(ctx, decl, global);
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

/// Defines `symbol` under `lexeme` in `scope`; on a duplicate, reports
/// `Redeclaration` and leaves the first definition untouched. On success,
/// attaches `scope`/`symbol` to the declaration's `name` node.
fn define_or_report(ctx: &mut AnalysisContext, scope: ScopeId, name: NodeId, lexeme: String, symbol: Symbol, kind_label: &'static str) {
    let symbol_id = ctx.symbols.alloc(symbol);
    match ctx.scopes.define(scope, &lexeme, symbol_id) {
        Ok(()) => {
            ctx.ast.attributes_mut(name).symbol = Some(symbol_id);
        }
        Err(_existing) => {
            let line = line_of(ctx, name);
            ctx.diagnostics.error(line, DiagnosticKind::Redeclaration { kind: kind_label, name: lexeme });
        }
    }
    ctx.ast.attributes_mut(name).scope = Some(scope);
}

fn declare(ctx: &mut AnalysisContext, node: NodeId, scope: ScopeId) {
    ctx.ast.attributes_mut(node).scope = Some(scope);
    match ctx.ast.kind(node).clone() {
        NodeKind::VariableDeclaration { name, type_spec, initializer, is_const } => {
            declare_variable(ctx, node, name, type_spec, initializer, is_const, scope);
        }
        NodeKind::FunctionDeclaration { name, parameters, return_type, body } => {
            declare_function(ctx, node, name, parameters, return_type, body, scope);
        }
        NodeKind::StructureDeclaration { name, members } => {
            declare_record(ctx, node, name, members, ScopeKind::Structure, "structure", scope);
        }
        NodeKind::UnionDeclaration { name, members } => {
            declare_record(ctx, node, name, members, ScopeKind::Union, "union", scope);
        }
        NodeKind::ClassDeclaration { name, members } => {
            declare_record(ctx, node, name, members, ScopeKind::Class, "class", scope);
        }
        NodeKind::TypealiasDeclaration { name, type_spec } => {
            declare_typealias(ctx, node, name, type_spec, scope);
        }
        other => panic!("declare() called on a non-declaration node kind: {other:?}"),
    }
}

fn declare_variable(
    ctx: &mut AnalysisContext,
    node: NodeId,
    name: NodeId,
    type_spec: NodeId,
    initializer: Option<NodeId>,
    is_const: bool,
    scope: ScopeId,
) {
    let lexeme = name_lexeme(ctx, name);
    let symbol = Symbol::Variable(VariableSymbol {
        name: lexeme.clone(),
        ty: None,
        declaration_node: node,
        is_constant: is_const,
        is_final: false,
    });
    define_or_report(ctx, scope, name, lexeme, symbol, "variable");

    attach_scope_in_type(ctx, type_spec, scope);
    if let Some(init) = initializer {
        attach_scope_in_expr(ctx, init, scope);
    }
}

fn declare_parameter(ctx: &mut AnalysisContext, param: NodeId, scope: ScopeId) {
    ctx.ast.attributes_mut(param).scope = Some(scope);
    let (name, type_spec) = match ctx.ast.kind(param).clone() {
        NodeKind::Parameter { name, type_spec } => (name, type_spec),
        other => panic!("expected a Parameter node, found {other:?}"),
    };
    let lexeme = name_lexeme(ctx, name);
    let symbol = Symbol::Variable(VariableSymbol {
        name: lexeme.clone(),
        ty: None,
        declaration_node: param,
        is_constant: false,
        is_final: false,
    });
    define_or_report(ctx, scope, name, lexeme, symbol, "parameter");
    attach_scope_in_type(ctx, type_spec, scope);
}

fn declare_function(
    ctx: &mut AnalysisContext,
    node: NodeId,
    name: NodeId,
    parameters: NodeId,
    return_type: NodeId,
    body: NodeId,
    scope: ScopeId,
) {
    let lexeme = name_lexeme(ctx, name);
    let symbol = Symbol::Function(FunctionSymbol { name: lexeme.clone(), signature: None, declaration_node: node });
    define_or_report(ctx, scope, name, lexeme, symbol, "function");

    let fn_scope = ctx.scopes.alloc_scope(ScopeKind::Local, Some(scope));
    ctx.ast.attributes_mut(parameters).scope = Some(fn_scope);
    ctx.ast.attributes_mut(body).scope = Some(fn_scope);

    let params = match ctx.ast.kind(parameters).clone() {
        NodeKind::ParameterList { parameters } => parameters,
        other => panic!("function parameters must be a ParameterList, found {other:?}"),
    };
    for param in params {
        declare_parameter(ctx, param, fn_scope);
    }

    attach_scope_in_type(ctx, return_type, scope);

    let statements = match ctx.ast.kind(body).clone() {
        NodeKind::TopBlock { statements } | NodeKind::Block { statements } => statements,
        other => panic!("function body must be a Block/TopBlock, found {other:?}"),
    };
    for stmt in statements {
        declare_statement(ctx, stmt, fn_scope);
    }
}

fn declare_statement(ctx: &mut AnalysisContext, stmt: NodeId, scope: ScopeId) {
    match ctx.ast.kind(stmt).clone() {
        NodeKind::VariableDeclaration { name, type_spec, initializer, is_const } => {
            ctx.ast.attributes_mut(stmt).scope = Some(scope);
            declare_variable(ctx, stmt, name, type_spec, initializer, is_const, scope);
        }
        NodeKind::Assignment { target, value } => {
            ctx.ast.attributes_mut(stmt).scope = Some(scope);
            attach_scope_in_expr(ctx, target, scope);
            attach_scope_in_expr(ctx, value, scope);
        }
        NodeKind::ExpressionRoot { .. } => {
            attach_scope_in_expr(ctx, stmt, scope);
        }
        NodeKind::Block { statements } => {
            let inner = ctx.scopes.alloc_scope(ScopeKind::Local, Some(scope));
            ctx.ast.attributes_mut(stmt).scope = Some(inner);
            for s in statements {
                declare_statement(ctx, s, inner);
            }
        }
        other => panic!("unexpected node kind as a statement: {other:?}"),
    }
}

fn declare_record(
    ctx: &mut AnalysisContext,
    node: NodeId,
    name: NodeId,
    members: Vec<NodeId>,
    kind: ScopeKind,
    kind_label: &'static str,
    scope: ScopeId,
) {
    let lexeme = name_lexeme(ctx, name);
    let symbol = match kind {
        ScopeKind::Structure => Symbol::Structure(StructureSymbol { name: lexeme.clone(), declaration_node: node }),
        ScopeKind::Union => Symbol::Union(UnionSymbol { name: lexeme.clone(), declaration_node: node }),
        ScopeKind::Class => Symbol::Class(ClassSymbol { name: lexeme.clone(), declaration_node: node }),
        _ => unreachable!("declare_record only called with Structure/Union/Class"),
    };
    define_or_report(ctx, scope, name, lexeme, symbol, kind_label);

    let member_scope = ctx.scopes.alloc_scope(kind, Some(scope));
    for member in members {
        declare(ctx, member, member_scope);
    }
}

fn declare_typealias(ctx: &mut AnalysisContext, node: NodeId, name: NodeId, _type_spec: NodeId, scope: ScopeId) {
    let lexeme = name_lexeme(ctx, name);
    let placeholder: Rc<Type> = Rc::new(Type::Typealias { name: lexeme.clone(), underlying: None });
    let symbol = Symbol::Type(TypeSymbol { name: lexeme.clone(), ty: placeholder, declaration_node: Some(node) });
    define_or_report(ctx, scope, name, lexeme, symbol, "type");
    // `type_spec` is left to Pass 2: the alias's own `scope` attribute (set
    // on `node` by `declare`'s caller) gives Pass 2 the lexical context it
    // needs to resolve NominalType lexemes, without re-walking here.
}

fn attach_scope_in_type(ctx: &mut AnalysisContext, node: NodeId, scope: ScopeId) {
    match ctx.ast.kind(node).clone() {
        NodeKind::PrimitiveType { .. } | NodeKind::NominalType { .. } | NodeKind::AlphaType => {}
        NodeKind::PointerType { base } => attach_scope_in_type(ctx, base, scope),
        NodeKind::ArrayType { base, size } => {
            attach_scope_in_type(ctx, base, scope);
            attach_scope_in_expr(ctx, size, scope);
        }
        other => panic!("unexpected node kind inside a type specifier: {other:?}"),
    }
}

fn attach_scope_in_expr(ctx: &mut AnalysisContext, node: NodeId, scope: ScopeId) {
    match ctx.ast.kind(node).clone() {
        NodeKind::Name { .. } => {
            ctx.ast.attributes_mut(node).scope = Some(scope);
        }
        NodeKind::ExpressionRoot { expression } => {
            ctx.ast.attributes_mut(node).scope = Some(scope);
            attach_scope_in_expr(ctx, expression, scope);
        }
        NodeKind::BinaryExpression { lhs, rhs, .. } => {
            attach_scope_in_expr(ctx, lhs, scope);
            attach_scope_in_expr(ctx, rhs, scope);
        }
        NodeKind::UnaryExpression { operand, .. } => {
            attach_scope_in_expr(ctx, operand, scope);
        }
        NodeKind::BooleanLiteral { .. }
        | NodeKind::IntegerLiteral
        | NodeKind::FloatingPointLiteral
        | NodeKind::NullLiteral => {}
        other => panic!("unexpected node kind inside an expression: {other:?}"),
    }
}
