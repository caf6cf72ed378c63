//! Typed per-node attribute record.
//!
//! Rather than a dynamic name→value dictionary per node, `Attributes` is a
//! fixed record naming every field a pass can write, each `Option` so an
//! unset attribute is a compile-time-visible `None` — a pass that hasn't run
//! yet, or that left a node untyped after an error, is represented rather
//! than panicking on lookup.

use std::rc::Rc;

use crate::ast::NodeId;
use crate::symbols::{ScopeId, SymbolId};
use crate::types::Type;

#[derive(Debug, Clone, Default)]
pub struct Attributes {
    /// Set on TranslationUnit, block-like, and Name nodes by Pass 1.
    pub scope: Option<ScopeId>,
    /// Set on declaration name nodes by Pass 1.
    pub symbol: Option<SymbolId>,
    /// Set by the parser on declaration nodes; read-only to every pass.
    pub is_global: Option<bool>,
    /// Set on type-specifier and expression nodes by Pass 2 (aliases) and
    /// Pass 5 family (expressions).
    pub ty: Option<Rc<Type>>,
    /// Set on ExpressionRoot and array-type specifiers by Pass 3b.
    pub dep_list: Option<Vec<NodeId>>,
    /// Set on expression nodes by the constant-expression checker.
    pub is_constant: Option<bool>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }
}
