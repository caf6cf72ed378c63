//! AST node kinds.
//!
//! `NodeKind` is a tagged variant per syntactic category rather than
//! kind-string dispatch, so every pass pattern-matches exhaustively and the
//! compiler flags unhandled kinds. Each variant holds its `NodeId` children
//! by role, in source order.

use crate::ast::operators::{BinaryOp, UnaryOp};
use crate::ast::NodeId;

#[derive(Debug, Clone)]
pub enum NodeKind {
    TranslationUnit {
        declarations: Vec<NodeId>,
    },

    VariableDeclaration {
        name: NodeId,
        type_spec: NodeId,
        initializer: Option<NodeId>,
        /// Parser-supplied const qualifier, folded into a field rather than
        /// a distinct `NodeKind` since const and non-const declarations
        /// share every other shape.
        is_const: bool,
    },
    FunctionDeclaration {
        name: NodeId,
        parameters: NodeId,
        return_type: NodeId,
        body: NodeId,
    },
    StructureDeclaration {
        name: NodeId,
        members: Vec<NodeId>,
    },
    UnionDeclaration {
        name: NodeId,
        members: Vec<NodeId>,
    },
    ClassDeclaration {
        name: NodeId,
        members: Vec<NodeId>,
    },
    TypealiasDeclaration {
        name: NodeId,
        type_spec: NodeId,
    },

    Parameter {
        name: NodeId,
        type_spec: NodeId,
    },
    ParameterList {
        parameters: Vec<NodeId>,
    },

    Block {
        statements: Vec<NodeId>,
    },
    TopBlock {
        statements: Vec<NodeId>,
    },

    /// Synthetic node marking the top of a syntactic expression (glossary).
    ExpressionRoot {
        expression: NodeId,
    },
    /// `target` and `value` are each an `ExpressionRoot` — the assignment
    /// target is itself an expression position, so reference validation's
    /// generic `ExpressionRoot` search covers it the same way it covers any
    /// other reference (e.g. `x = 1; var x: int32;`, a use before the local
    /// declaration).
    Assignment {
        target: NodeId,
        value: NodeId,
    },
    BinaryExpression {
        op: BinaryOp,
        lhs: NodeId,
        rhs: NodeId,
    },
    UnaryExpression {
        op: UnaryOp,
        operand: NodeId,
    },

    /// Used both for reference expressions and for a declaration's own name.
    Name {
        lexeme: String,
    },

    BooleanLiteral {
        value: bool,
    },
    /// Token kind (`INT32_LITERAL`/`INT64_LITERAL`/`UINT32_LITERAL`/
    /// `UINT64_LITERAL`) carries the suffix-derived width.
    IntegerLiteral,
    /// Token kind (`FLOAT32_LITERAL`/`FLOAT64_LITERAL`) carries the width.
    FloatingPointLiteral,
    NullLiteral,

    PrimitiveType {
        lexeme: String,
    },
    NominalType {
        lexeme: String,
    },
    PointerType {
        base: NodeId,
    },
    ArrayType {
        base: NodeId,
        size: NodeId,
    },
    /// Type-inference placeholder (glossary: "infer from initializer").
    AlphaType,

    PromoteCast {
        operand: NodeId,
    },
    WidenCast {
        operand: NodeId,
    },
}

impl NodeKind {
    /// Child node ids in source/child order, used by passes that walk the
    /// whole tree generically (Pass 1's scope walk, Pass 3a's `search`).
    pub fn children(&self) -> Vec<NodeId> {
        match self {
            NodeKind::TranslationUnit { declarations } => declarations.clone(),
            NodeKind::VariableDeclaration { name, type_spec, initializer, .. } => {
                let mut out = vec![*name, *type_spec];
                out.extend(initializer.iter().copied());
                out
            }
            NodeKind::FunctionDeclaration { name, parameters, return_type, body } => {
                vec![*name, *parameters, *return_type, *body]
            }
            NodeKind::StructureDeclaration { name, members }
            | NodeKind::UnionDeclaration { name, members }
            | NodeKind::ClassDeclaration { name, members } => {
                let mut out = vec![*name];
                out.extend(members.iter().copied());
                out
            }
            NodeKind::TypealiasDeclaration { name, type_spec } => vec![*name, *type_spec],
            NodeKind::Parameter { name, type_spec } => vec![*name, *type_spec],
            NodeKind::ParameterList { parameters } => parameters.clone(),
            NodeKind::Block { statements } | NodeKind::TopBlock { statements } => statements.clone(),
            NodeKind::ExpressionRoot { expression } => vec![*expression],
            NodeKind::Assignment { target, value } => vec![*target, *value],
            NodeKind::BinaryExpression { lhs, rhs, .. } => vec![*lhs, *rhs],
            NodeKind::UnaryExpression { operand, .. } => vec![*operand],
            NodeKind::Name { .. }
            | NodeKind::BooleanLiteral { .. }
            | NodeKind::IntegerLiteral
            | NodeKind::FloatingPointLiteral
            | NodeKind::NullLiteral
            | NodeKind::PrimitiveType { .. }
            | NodeKind::NominalType { .. }
            | NodeKind::AlphaType => vec![],
            NodeKind::PointerType { base } => vec![*base],
            NodeKind::ArrayType { base, size } => vec![*base, *size],
            NodeKind::PromoteCast { operand } | NodeKind::WidenCast { operand } => vec![*operand],
        }
    }

    pub fn as_name_lexeme(&self) -> Option<&str> {
        match self {
            NodeKind::Name { lexeme } => Some(lexeme),
            _ => None,
        }
    }
}
