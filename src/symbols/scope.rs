//! Scope tree.
//!
//! A `Scope` is a name→`SymbolId` map plus an optional enclosing-scope link;
//! `ScopeTree` owns the whole arena and the invariant that the root scope is
//! always `Builtin`, containing exactly the primitive type symbols, shared
//! unchanged across a translation unit.

use std::collections::HashMap;

use crate::symbols::SymbolId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(usize);

impl ScopeId {
    fn new(index: usize) -> Self {
        ScopeId(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Builtin,
    Global,
    Local,
    Class,
    Structure,
    Union,
}

#[derive(Debug, Clone)]
pub struct Scope {
    pub kind: ScopeKind,
    pub enclosing: Option<ScopeId>,
    names: HashMap<String, SymbolId>,
}

impl Scope {
    fn new(kind: ScopeKind, enclosing: Option<ScopeId>) -> Self {
        Scope { kind, enclosing, names: HashMap::new() }
    }
}

/// Scope arena rooted at a single `Builtin` scope, seeded once at startup
/// with the primitive type symbols.
#[derive(Debug)]
pub struct ScopeTree {
    scopes: Vec<Scope>,
    builtin: ScopeId,
}

impl ScopeTree {
    pub fn new() -> Self {
        let builtin = Scope::new(ScopeKind::Builtin, None);
        ScopeTree { scopes: vec![builtin], builtin: ScopeId::new(0) }
    }

    pub fn builtin(&self) -> ScopeId {
        self.builtin
    }

    pub fn alloc_scope(&mut self, kind: ScopeKind, enclosing: Option<ScopeId>) -> ScopeId {
        let id = ScopeId::new(self.scopes.len());
        self.scopes.push(Scope::new(kind, enclosing));
        id
    }

    pub fn kind(&self, scope: ScopeId) -> ScopeKind {
        self.scopes[scope.index()].kind
    }

    pub fn enclosing(&self, scope: ScopeId) -> Option<ScopeId> {
        self.scopes[scope.index()].enclosing
    }

    /// Fails (returns the existing symbol) on a duplicate name in the same
    /// scope — the caller reports `Redeclaration` and does not overwrite
    /// the first definition.
    pub fn define(&mut self, scope: ScopeId, name: &str, symbol: SymbolId) -> Result<(), SymbolId> {
        let scope = &mut self.scopes[scope.index()];
        if let Some(existing) = scope.names.get(name) {
            return Err(*existing);
        }
        scope.names.insert(name.to_string(), symbol);
        Ok(())
    }

    /// Current scope only, no walk up the enclosing chain.
    pub fn lookup(&self, scope: ScopeId, name: &str) -> Option<SymbolId> {
        self.scopes[scope.index()].names.get(name).copied()
    }

    /// Current scope first, then walk enclosing scopes.
    pub fn resolve(&self, scope: ScopeId, name: &str) -> Option<SymbolId> {
        let mut current = Some(scope);
        while let Some(id) = current {
            if let Some(symbol) = self.lookup(id, name) {
                return Some(symbol);
            }
            current = self.enclosing(id);
        }
        None
    }
}

impl Default for ScopeTree {
    fn default() -> Self {
        Self::new()
    }
}
