//! Symbol and scope model.

pub mod builtin;
pub mod scope;
pub mod symbol;

pub use builtin::seed_builtin_scope;
pub use scope::{Scope, ScopeId, ScopeKind, ScopeTree};
pub use symbol::{
    ClassSymbol, FunctionSymbol, StructureSymbol, Symbol, SymbolId, SymbolTable, TypeSymbol, UnionSymbol,
    VariableSymbol,
};
