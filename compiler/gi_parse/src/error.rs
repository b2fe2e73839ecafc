//! Parse failures.

use gi_ir::{ErrorCode, Span};

/// Where the parser gave up, which decides between "need more input" and
/// "syntax error".
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FailureKind {
    /// The offending token was the end-of-input sentinel.
    EndOfInput,
    /// The offending token appeared before end of input.
    Token,
}

/// The first (and only) error of a parse attempt.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ParseFailure {
    pub kind: FailureKind,
    pub code: ErrorCode,
    pub span: Span,
    pub message: String,
}

impl ParseFailure {
    pub fn new(kind: FailureKind, code: ErrorCode, span: Span, message: impl Into<String>) -> Self {
        ParseFailure {
            kind,
            code,
            span,
            message: message.into(),
        }
    }

    /// A failure at `span` that is known not to be at end of input.
    pub fn at(span: Span, code: ErrorCode, message: impl Into<String>) -> Self {
        Self::new(FailureKind::Token, code, span, message)
    }

    pub fn is_end_of_input(&self) -> bool {
        self.kind == FailureKind::EndOfInput
    }
}
