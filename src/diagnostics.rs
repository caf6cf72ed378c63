//! Error reporter: an ordered diagnostic buffer flushed at pass boundaries.
//!
//! `Diagnostic` carries a kind and line-located text; `DiagnosticBag` is an
//! append-only queue printed at the end of a pass. `DiagnosticKind` is a
//! typed `thiserror` enum rather than free-form message text, so callers can
//! match on error kind instead of scraping strings.

use thiserror::Error;

/// Severity of a diagnostic. The core only ever emits `Error`; `Warning` is
/// carried so a future pass (or a host wrapping this crate) has somewhere to
/// put non-fatal observations without inventing a second channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

/// The seven error kinds this analyzer can report.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum DiagnosticKind {
    #[error("{kind} '{name}' already defined")]
    Redeclaration { kind: &'static str, name: String },

    #[error("name '{name}' not declared")]
    UnresolvedName { name: String },

    #[error("variable '{name}' referenced before declaration")]
    UseBeforeDeclaration { name: String },

    #[error("circular name definition: {name}")]
    CircularDefinition { name: String },

    #[error("{message}")]
    IncompatibleOperandTypes { message: String },

    #[error("{context} must be a constant expression")]
    ConstantRequired { context: &'static str },

    #[error("invalid alias resolution: {message}")]
    InvalidAliasResolution { message: String },
}

/// A single reported diagnostic, pass-ordered and line-located.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub line: u32,
    pub kind: DiagnosticKind,
}

impl Diagnostic {
    pub fn error(line: u32, kind: DiagnosticKind) -> Self {
        Diagnostic { severity: Severity::Error, line, kind }
    }

    pub fn warning(line: u32, kind: DiagnosticKind) -> Self {
        Diagnostic { severity: Severity::Warning, line, kind }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{label}({}): {}", self.line, self.kind)
    }
}

/// Ordered diagnostic buffer. Global order is pass-index major, line number
/// minor: each pass appends to its own bag and `DiagnosticBag::extend`
/// concatenates in pass order; callers that need "line number minor" within
/// a single pass get it for free because every pass visits the AST in
/// source/child order. `flush` only emits messages pushed since the last
/// call, so the full history stays in `messages` for a caller to inspect
/// after the run (e.g. `AnalyzedUnit::has_errors`) while the tracing output
/// still lands once per message, at the pass boundary that produced it.
#[derive(Debug, Default, Clone)]
pub struct DiagnosticBag {
    messages: Vec<Diagnostic>,
    flushed: usize,
}

impl DiagnosticBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        tracing::warn!(line = diagnostic.line, "{}", diagnostic.kind);
        self.messages.push(diagnostic);
    }

    pub fn error(&mut self, line: u32, kind: DiagnosticKind) {
        self.push(Diagnostic::error(line, kind));
    }

    pub fn has_errors(&self) -> bool {
        self.messages.iter().any(|m| m.severity == Severity::Error)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.messages.iter()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn extend(&mut self, other: DiagnosticBag) {
        self.messages.extend(other.messages);
    }

    /// Emits every message pushed since the last `flush` call to the
    /// tracing subscriber, then advances the cursor so a later call only
    /// sees what's new. Called at the end of every pass, so a pass's
    /// diagnostics surface as soon as that pass finishes rather than
    /// waiting for the whole pipeline to complete.
    pub fn flush(&mut self) {
        for message in &self.messages[self.flushed..] {
            match message.severity {
                Severity::Error => tracing::error!("{}", message),
                Severity::Warning => tracing::warn!("{}", message),
            }
        }
        self.flushed = self.messages.len();
    }
}
