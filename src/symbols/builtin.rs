//! Built-in scope seeding.
//!
//! The builtin scope is seeded once, before the declaration pass walks any
//! translation unit, with a `TypeSymbol` for each of the thirteen primitive
//! kinds plus the C-flavored alias spellings (`char`, `short`, `int`, `long`,
//! `uchar`, `ushort`, `uint`, `ulong`, `float`, `double`) that source code is
//! free to use interchangeably with the canonical names. Each alias's `Type`
//! is a structurally equal `Type::Primitive` to its canonical spelling, so
//! `int` and `int32` resolve to equal types without introducing a distinct
//! primitive kind.

use crate::symbols::{ScopeTree, Symbol, SymbolId, SymbolTable, TypeSymbol};
use crate::types::{PrimitiveKind, Type};

const CANONICAL: &[(&str, PrimitiveKind)] = &[
    ("null_t", PrimitiveKind::NullT),
    ("bool", PrimitiveKind::Bool),
    ("int8", PrimitiveKind::Int8),
    ("int16", PrimitiveKind::Int16),
    ("int32", PrimitiveKind::Int32),
    ("int64", PrimitiveKind::Int64),
    ("uint8", PrimitiveKind::Uint8),
    ("uint16", PrimitiveKind::Uint16),
    ("uint32", PrimitiveKind::Uint32),
    ("uint64", PrimitiveKind::Uint64),
    ("float32", PrimitiveKind::Float32),
    ("float64", PrimitiveKind::Float64),
    ("void", PrimitiveKind::Void),
];

const ALIASES: &[(&str, PrimitiveKind)] = &[
    ("char", PrimitiveKind::Int8),
    ("short", PrimitiveKind::Int16),
    ("int", PrimitiveKind::Int32),
    ("long", PrimitiveKind::Int64),
    ("uchar", PrimitiveKind::Uint8),
    ("ushort", PrimitiveKind::Uint16),
    ("uint", PrimitiveKind::Uint32),
    ("ulong", PrimitiveKind::Uint64),
    ("float", PrimitiveKind::Float32),
    ("double", PrimitiveKind::Float64),
];

/// Populates `symbols`/`scopes`'s builtin scope with every primitive
/// `TypeSymbol` (canonical name and alias spellings alike). Call once per
/// `SymbolTable`/`ScopeTree` pair, before the declaration pass runs.
pub fn seed_builtin_scope(symbols: &mut SymbolTable, scopes: &mut ScopeTree) {
    let builtin = scopes.builtin();
    let mut define_primitive = |name: &str, kind: PrimitiveKind, symbols: &mut SymbolTable, scopes: &mut ScopeTree| {
        let id: SymbolId = symbols.alloc(Symbol::Type(TypeSymbol {
            name: name.to_string(),
            ty: Type::primitive(kind).into(),
            declaration_node: None,
        }));
        scopes
            .define(builtin, name, id)
            .expect("builtin scope seeded twice or duplicate builtin name");
    };

    for (name, kind) in CANONICAL {
        define_primitive(name, *kind, symbols, scopes);
    }
    for (name, kind) in ALIASES {
        define_primitive(name, *kind, symbols, scopes);
    }
}
