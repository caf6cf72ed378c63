//! Test-only AST construction helpers.
//!
//! Lexing and parsing live upstream of this analyzer, so tests build ASTs
//! directly instead of going through a grammar. `Builder` wraps an `Ast`
//! arena and hands out `NodeId`s the way a parser would, including
//! synthesizing tokens with a monotonically increasing byte `position` so
//! the declare-before-use ordering check in reference validation has
//! something real to compare against.

use crate::ast::operators::{BinaryOp, UnaryOp};
use crate::ast::{Ast, NodeId, NodeKind};
use crate::token::{Token, TokenKind};

pub struct Builder {
    ast: Ast,
    position: usize,
    line: u32,
}

impl Builder {
    pub fn new() -> Self {
        Builder { ast: Ast::new(), position: 0, line: 1 }
    }

    pub fn finish(self) -> Ast {
        self.ast
    }

    pub fn ast(&self) -> &Ast {
        &self.ast
    }

    pub fn ast_mut(&mut self) -> &mut Ast {
        &mut self.ast
    }

    /// Advances the synthetic cursor and returns a token for `lexeme`. Each
    /// call advances strictly past the previous one, so two tokens minted
    /// in call order always compare in that order under `position`.
    fn token(&mut self, kind: TokenKind, lexeme: impl Into<String>) -> Token {
        let lexeme = lexeme.into();
        let position = self.position;
        let line = self.line;
        self.position += lexeme.len().max(1) + 1;
        Token::new(kind, lexeme, position, line, 1)
    }

    /// Starts a new source line; subsequent tokens report an incremented
    /// `line` without otherwise affecting `position` ordering.
    pub fn newline(&mut self) -> &mut Self {
        self.line += 1;
        self
    }

    pub fn name(&mut self, lexeme: &str) -> NodeId {
        let token = self.token(TokenKind::IDENTIFIER, lexeme);
        self.ast.alloc(NodeKind::Name { lexeme: lexeme.to_string() }, Some(token))
    }

    pub fn bool_literal(&mut self, value: bool) -> NodeId {
        let lexeme = if value { "true" } else { "false" };
        let token = self.token(TokenKind::BOOLEAN_LITERAL, lexeme);
        self.ast.alloc(NodeKind::BooleanLiteral { value }, Some(token))
    }

    pub fn int_literal(&mut self, kind: TokenKind, lexeme: &str) -> NodeId {
        debug_assert!(matches!(
            kind,
            TokenKind::INT32_LITERAL | TokenKind::INT64_LITERAL | TokenKind::UINT32_LITERAL | TokenKind::UINT64_LITERAL
        ));
        let token = self.token(kind, lexeme);
        self.ast.alloc(NodeKind::IntegerLiteral, Some(token))
    }

    pub fn float_literal(&mut self, kind: TokenKind, lexeme: &str) -> NodeId {
        debug_assert!(matches!(kind, TokenKind::FLOAT32_LITERAL | TokenKind::FLOAT64_LITERAL));
        let token = self.token(kind, lexeme);
        self.ast.alloc(NodeKind::FloatingPointLiteral, Some(token))
    }

    pub fn null_literal(&mut self) -> NodeId {
        let token = self.token(TokenKind::NULL_LITERAL, "null");
        self.ast.alloc(NodeKind::NullLiteral, Some(token))
    }

    pub fn binary(&mut self, op: BinaryOp, lhs: NodeId, rhs: NodeId) -> NodeId {
        let token = self.token(binary_token_kind(op), op.to_string());
        self.ast.alloc(NodeKind::BinaryExpression { op, lhs, rhs }, Some(token))
    }

    pub fn unary(&mut self, op: UnaryOp, operand: NodeId) -> NodeId {
        let token = self.token(TokenKind::Other, op.to_string());
        self.ast.alloc(NodeKind::UnaryExpression { op, operand }, Some(token))
    }

    pub fn expr_root(&mut self, expression: NodeId) -> NodeId {
        self.ast.alloc(NodeKind::ExpressionRoot { expression }, None)
    }

    /// `target` and `value` must each already be wrapped in an
    /// `ExpressionRoot` (see [`Self::expr_root`]).
    pub fn assignment(&mut self, target: NodeId, value: NodeId) -> NodeId {
        self.ast.alloc(NodeKind::Assignment { target, value }, None)
    }

    pub fn primitive_type(&mut self, lexeme: &str) -> NodeId {
        let token = self.token(TokenKind::IDENTIFIER, lexeme);
        self.ast.alloc(NodeKind::PrimitiveType { lexeme: lexeme.to_string() }, Some(token))
    }

    pub fn nominal_type(&mut self, lexeme: &str) -> NodeId {
        let token = self.token(TokenKind::IDENTIFIER, lexeme);
        self.ast.alloc(NodeKind::NominalType { lexeme: lexeme.to_string() }, Some(token))
    }

    pub fn pointer_type(&mut self, base: NodeId) -> NodeId {
        self.ast.alloc(NodeKind::PointerType { base }, None)
    }

    pub fn array_type(&mut self, base: NodeId, size: NodeId) -> NodeId {
        self.ast.alloc(NodeKind::ArrayType { base, size }, None)
    }

    pub fn alpha_type(&mut self) -> NodeId {
        self.ast.alloc(NodeKind::AlphaType, None)
    }

    pub fn var_decl(&mut self, name: NodeId, type_spec: NodeId, initializer: Option<NodeId>, is_global: bool) -> NodeId {
        self.var_decl_ex(name, type_spec, initializer, is_global, false)
    }

    pub fn const_decl(&mut self, name: NodeId, type_spec: NodeId, initializer: Option<NodeId>, is_global: bool) -> NodeId {
        self.var_decl_ex(name, type_spec, initializer, is_global, true)
    }

    pub fn var_decl_ex(
        &mut self,
        name: NodeId,
        type_spec: NodeId,
        initializer: Option<NodeId>,
        is_global: bool,
        is_const: bool,
    ) -> NodeId {
        let id = self.ast.alloc(NodeKind::VariableDeclaration { name, type_spec, initializer, is_const }, None);
        self.ast.attributes_mut(id).is_global = Some(is_global);
        id
    }

    pub fn parameter(&mut self, name: NodeId, type_spec: NodeId) -> NodeId {
        self.ast.alloc(NodeKind::Parameter { name, type_spec }, None)
    }

    pub fn parameter_list(&mut self, parameters: Vec<NodeId>) -> NodeId {
        self.ast.alloc(NodeKind::ParameterList { parameters }, None)
    }

    pub fn block(&mut self, statements: Vec<NodeId>) -> NodeId {
        self.ast.alloc(NodeKind::Block { statements }, None)
    }

    pub fn top_block(&mut self, statements: Vec<NodeId>) -> NodeId {
        self.ast.alloc(NodeKind::TopBlock { statements }, None)
    }

    pub fn function_decl(&mut self, name: NodeId, parameters: NodeId, return_type: NodeId, body: NodeId) -> NodeId {
        let id = self.ast.alloc(NodeKind::FunctionDeclaration { name, parameters, return_type, body }, None);
        self.ast.attributes_mut(id).is_global = Some(true);
        id
    }

    pub fn typealias_decl(&mut self, name: NodeId, type_spec: NodeId) -> NodeId {
        let id = self.ast.alloc(NodeKind::TypealiasDeclaration { name, type_spec }, None);
        self.ast.attributes_mut(id).is_global = Some(true);
        id
    }

    pub fn structure_decl(&mut self, name: NodeId, members: Vec<NodeId>) -> NodeId {
        let id = self.ast.alloc(NodeKind::StructureDeclaration { name, members }, None);
        self.ast.attributes_mut(id).is_global = Some(true);
        id
    }

    pub fn translation_unit(&mut self, declarations: Vec<NodeId>) -> NodeId {
        let id = self.ast.alloc(NodeKind::TranslationUnit { declarations }, None);
        self.ast.set_root(id);
        id
    }
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}

fn binary_token_kind(op: BinaryOp) -> TokenKind {
    match op {
        BinaryOp::Mul => TokenKind::ASTERISK,
        BinaryOp::Div => TokenKind::SLASH,
        BinaryOp::Mod => TokenKind::PERCENT,
        BinaryOp::Add => TokenKind::PLUS,
        BinaryOp::Sub => TokenKind::MINUS,
        BinaryOp::Shl => TokenKind::LESS_LESS,
        BinaryOp::Shr => TokenKind::GREATER_GREATER,
        BinaryOp::Lt => TokenKind::LESS,
        BinaryOp::Le => TokenKind::LESS_EQUAL,
        BinaryOp::Gt => TokenKind::GREATER,
        BinaryOp::Ge => TokenKind::GREATER_EQUAL,
        BinaryOp::Eq => TokenKind::EQUAL_EQUAL,
        BinaryOp::Ne => TokenKind::EXCLAMATION_EQUAL,
        BinaryOp::BitAnd => TokenKind::AMPERSAND,
        BinaryOp::BitXor => TokenKind::CARET,
        BinaryOp::BitOr => TokenKind::BAR,
    }
}
