//! Type representation: a sum of type variants covering primitive, pointer,
//! array, structure/union/class (referenced by name, since their bodies live
//! in symbol table entries rather than here), typealias (whose underlying
//! type is filled in once alias resolution runs), and function.
//!
//! Primitive kinds are interned: `PrimitiveKind` is `Copy` and `Type`'s
//! equality is structural, so two `Type::Primitive(Int32)` values compare
//! equal without needing a shared table — exactly one logical value per
//! primitive kind without the extra indirection of an explicit intern table,
//! since primitive kinds have no payload.

use std::fmt;
use std::rc::Rc;

use strum_macros::Display;

use crate::ast::NodeId;

/// Primitive kinds, matching the reserved type keywords recognized by the
/// lexer/parser upstream of this analyzer. `Display` is derived so the
/// canonical spelling lives in one place (here) instead of a hand-written
/// match arm per variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display)]
#[strum(serialize_all = "snake_case")]
pub enum PrimitiveKind {
    NullT,
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Float32,
    Float64,
    Void,
}

impl PrimitiveKind {
    pub fn is_signed_integral(self) -> bool {
        matches!(self, PrimitiveKind::Int8 | PrimitiveKind::Int16 | PrimitiveKind::Int32 | PrimitiveKind::Int64)
    }

    pub fn is_unsigned_integral(self) -> bool {
        matches!(self, PrimitiveKind::Uint8 | PrimitiveKind::Uint16 | PrimitiveKind::Uint32 | PrimitiveKind::Uint64)
    }

    pub fn is_integral(self) -> bool {
        self.is_signed_integral() || self.is_unsigned_integral()
    }

    pub fn is_float(self) -> bool {
        matches!(self, PrimitiveKind::Float32 | PrimitiveKind::Float64)
    }

    pub fn is_numeric(self) -> bool {
        self.is_integral() || self.is_float()
    }

    /// Ascending-by-bit-width rank used by the usual binary conversions:
    /// int8 < int16 < int32 < int64, and parallel for unsigned. Only
    /// meaningful for integral kinds of the same signedness; callers must
    /// check signedness separately.
    pub fn integral_rank(self) -> Option<u8> {
        Some(match self {
            PrimitiveKind::Int8 | PrimitiveKind::Uint8 => 0,
            PrimitiveKind::Int16 | PrimitiveKind::Uint16 => 1,
            PrimitiveKind::Int32 | PrimitiveKind::Uint32 => 2,
            PrimitiveKind::Int64 | PrimitiveKind::Uint64 => 3,
            _ => return None,
        })
    }
}

/// Constant-or-symbolic array size. Alias/type resolution records the
/// literal size when the size expression is already a constant integer;
/// `Symbolic` lets a pass run to completion even when the constant-expression
/// checker has not yet confirmed the size is legal (the check itself lives
/// in `passes::constant_check`, not here).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArraySize {
    Known(u64),
    Symbolic(NodeId),
}

/// A resolved type. Equality is structural (`#[derive(PartialEq)]`), so two
/// independently constructed `Type::Pointer` values over structurally equal
/// bases compare equal.
#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    Primitive(PrimitiveKind),
    Pointer(Rc<Type>),
    Array { base: Rc<Type>, size: ArraySize },
    Structure { name: String },
    Union { name: String },
    Class { name: String },
    /// `underlying` is `None` until alias resolution fills in the alias's
    /// right-hand side; `Typealias(name, None)` is the placeholder installed
    /// when the symbol is first declared.
    Typealias { name: String, underlying: Option<Rc<Type>> },
    Function { params: Vec<Rc<Type>>, ret: Rc<Type> },
}

impl Type {
    pub fn primitive(kind: PrimitiveKind) -> Type {
        Type::Primitive(kind)
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, Type::Primitive(_))
    }

    pub fn as_primitive(&self) -> Option<PrimitiveKind> {
        match self {
            Type::Primitive(kind) => Some(*kind),
            _ => None,
        }
    }

    /// Follows a chain of type aliases to the first non-alias type. Used by
    /// Pass 2's cycle detection and by property test #4 ("non-null and
    /// primitive-only after fully unfolding nested aliases").
    pub fn unfold_aliases(&self) -> Option<&Type> {
        let mut current = self;
        loop {
            match current {
                Type::Typealias { underlying, .. } => match underlying {
                    Some(inner) => current = inner.as_ref(),
                    None => return None,
                },
                other => return Some(other),
            }
        }
    }

    pub fn base(&self) -> Option<&Type> {
        match self {
            Type::Pointer(base) => Some(base),
            Type::Array { base, .. } => Some(base),
            _ => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        self.as_primitive().map(PrimitiveKind::is_numeric).unwrap_or(false)
    }

    pub fn is_integral(&self) -> bool {
        self.as_primitive().map(PrimitiveKind::is_integral).unwrap_or(false)
    }

    pub fn is_bool(&self) -> bool {
        matches!(self, Type::Primitive(PrimitiveKind::Bool))
    }

    pub fn is_pointer(&self) -> bool {
        matches!(self, Type::Pointer(_))
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Type::Primitive(PrimitiveKind::Void))
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Primitive(kind) => write!(f, "{kind}"),
            Type::Pointer(base) => write!(f, "*{base}"),
            Type::Array { base, size } => match size {
                ArraySize::Known(n) => write!(f, "{base}[{n}]"),
                ArraySize::Symbolic(_) => write!(f, "{base}[?]"),
            },
            Type::Structure { name } => write!(f, "struct {name}"),
            Type::Union { name } => write!(f, "union {name}"),
            Type::Class { name } => write!(f, "class {name}"),
            Type::Typealias { name, .. } => write!(f, "{name}"),
            Type::Function { params, ret } => {
                write!(f, "fn(")?;
                for (i, p) in params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{p}")?;
                }
                write!(f, ") -> {ret}")
            }
        }
    }
}
