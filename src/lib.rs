//! Multi-pass semantic analyzer front-end.
//!
//! This crate is the analyzer stage only: lexing and parsing are out of
//! scope (an AST arrives pre-built, as from a parser upstream), and there is
//! no FFI or CLI surface. The public entry point is [`AnalysisContext`],
//! which owns the AST/symbol/scope arenas for one translation unit and runs
//! the fixed pass order to completion via [`AnalysisContext::run`].

pub mod ast;
pub mod diagnostics;
pub mod passes;
pub mod symbols;
pub mod token;
pub mod types;

pub use ast::{Ast, NodeId};
pub use diagnostics::{Diagnostic, DiagnosticBag, DiagnosticKind, Severity};
pub use passes::{AnalysisContext, AnalysisOptions, AnalyzedUnit};
pub use token::{Token, TokenKind};
pub use types::{ArraySize, PrimitiveKind, Type};
