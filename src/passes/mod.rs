//! Pass pipeline orchestration.
//!
//! `AnalysisContext` threads the arenas, diagnostic bag and options through
//! every pass explicitly rather than through global mutable state, as a
//! fixed sequence of seven internal passes run directly against an
//! already-built AST.

pub mod constant_check;
pub mod pass1_declare;
pub mod pass2_alias;
pub mod pass3a_reference;
pub mod pass3b_dependency;
pub mod pass5_expr;
pub mod pass5a_global_infer;
pub mod pass5b_local_infer;

use crate::ast::{Ast, NodeId};
use crate::diagnostics::DiagnosticBag;
use crate::symbols::{seed_builtin_scope, ScopeTree, SymbolTable};

/// Behavior knobs for conversion rules that reasonable language designs
/// disagree on, pinned here as explicit fields rather than compile-time
/// constants so a host embedding the crate can override them without a
/// recompile.
#[derive(Debug, Clone, Copy)]
pub struct AnalysisOptions {
    /// Whether shift operators co-promote their right operand. Default
    /// `false`: the result type of a shift is always the left operand's
    /// (possibly promoted) type.
    pub shift_co_promotes_rhs: bool,
    /// Whether `bool` is allowed as an equality operand. Default `true`.
    pub bool_allowed_in_equality: bool,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        AnalysisOptions { shift_co_promotes_rhs: false, bool_allowed_in_equality: true }
    }
}

/// Owns every arena for one translation unit and threads through all seven
/// passes. Built once per `run`, consumed by value at the end.
pub struct AnalysisContext {
    pub ast: Ast,
    pub symbols: SymbolTable,
    pub scopes: ScopeTree,
    pub diagnostics: DiagnosticBag,
    pub options: AnalysisOptions,
}

/// Final output of a completed analysis run: the fully annotated arenas
/// plus the global declaration order Pass 3b computed, for a host (or a
/// test) to inspect.
pub struct AnalyzedUnit {
    pub ast: Ast,
    pub symbols: SymbolTable,
    pub scopes: ScopeTree,
    pub diagnostics: DiagnosticBag,
    pub global_order: Vec<NodeId>,
}

impl AnalyzedUnit {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.has_errors()
    }
}

impl AnalysisContext {
    pub fn new(ast: Ast) -> Self {
        Self::with_options(ast, AnalysisOptions::default())
    }

    pub fn with_options(ast: Ast, options: AnalysisOptions) -> Self {
        let mut symbols = SymbolTable::new();
        let mut scopes = ScopeTree::new();
        seed_builtin_scope(&mut symbols, &mut scopes);
        AnalysisContext { ast, symbols, scopes, diagnostics: DiagnosticBag::new(), options }
    }

    /// Runs the fixed pass order: 1 → 2 → 3a → 3b → 5a → 5b/5c →
    /// constant-check, flushing the diagnostic bag to the tracing
    /// subscriber after each pass so a pass's errors surface as soon as it
    /// finishes.
    pub fn run(mut self) -> AnalyzedUnit {
        let root = self.ast.root().expect("Ast must have a TranslationUnit root before analysis");

        tracing::debug!(pass = 1, "declaration & scope");
        pass1_declare::run(&mut self, root);
        self.diagnostics.flush();

        tracing::debug!(pass = 2, "type-alias resolution");
        pass2_alias::run(&mut self, root);
        self.diagnostics.flush();

        tracing::debug!(pass = "3a", "reference validation");
        pass3a_reference::run(&mut self, root);
        self.diagnostics.flush();

        tracing::debug!(pass = "3b", "global dependency ordering");
        let global_order = pass3b_dependency::run(&mut self, root);
        self.diagnostics.flush();

        tracing::debug!(pass = "5a", "global type inference");
        pass5a_global_infer::run(&mut self, &global_order);
        self.diagnostics.flush();

        tracing::debug!(pass = "5b/5c", "local type inference");
        pass5b_local_infer::run(&mut self, root);
        self.diagnostics.flush();

        tracing::debug!(pass = "5c", "constant-expression check");
        constant_check::run(&mut self, root);
        self.diagnostics.flush();

        AnalyzedUnit {
            ast: self.ast,
            symbols: self.symbols,
            scopes: self.scopes,
            diagnostics: self.diagnostics,
            global_order,
        }
    }
}
