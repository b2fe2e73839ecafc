//! Checker errors.

use gi_ir::{ErrorCode, Name, Span, StringInterner};
use thiserror::Error;

/// A type error. The checker stops at the first one.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct TypeCheckError {
    pub code: ErrorCode,
    pub span: Span,
    pub message: String,
    /// Secondary locations, e.g. the previous declaration.
    pub related: Vec<(Span, String)>,
}

impl TypeCheckError {
    pub fn new(code: ErrorCode, span: Span, message: impl Into<String>) -> Self {
        TypeCheckError {
            code,
            span,
            message: message.into(),
            related: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_related(mut self, span: Span, note: impl Into<String>) -> Self {
        self.related.push((span, note.into()));
        self
    }
}

/// A method whose name collides with a field of its receiver's struct type.
/// Replacement never resolves this.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Error)]
#[error("field and method with the same name")]
pub struct RedeclarationConflict {
    pub type_name: Name,
    pub member: Name,
    pub span: Span,
}

impl RedeclarationConflict {
    pub fn into_error(self, interner: &StringInterner) -> TypeCheckError {
        TypeCheckError::new(
            ErrorCode::E2008,
            self.span,
            format!("{self} {}", interner.lookup(self.member)),
        )
        .with_related(
            self.span,
            format!("on type {}", interner.lookup(self.type_name)),
        )
    }
}

pub(crate) type CheckResult<T> = Result<T, TypeCheckError>;
