//! Lua emitter for the gi REPL.
//!
//! Turns a [`CheckedUnit`] into LuaJIT source written against the gi
//! runtime vocabulary (`__type__`, `__gi_*`, `__go`, ...). The runtime
//! itself lives outside this workspace; the emitter only decides which
//! runtime entry point each Go construct maps to.
//!
//! # Architecture
//!
//! ```text
//! CheckedUnit + TypePool
//!        ↓
//!   EmitContext   (output buffer, anonymous type descriptors, loop labels)
//!        ↓
//!   lua::{decl, stmt, expr, types}
//!        ↓
//!   String        (one chunk per submitted unit)
//! ```
//!
//! Every top-level item is emitted as a self-contained chunk preceded by
//! the descriptors of the anonymous types it mentions, so the output of one
//! unit can be run on its own against the state left by earlier units.

mod context;
mod lua;

pub use context::EmitContext;

use gi_ir::{ErrorCode, Span, StringInterner};
use gi_types::{CheckedUnit, TypePool};
use thiserror::Error;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct EmitOptions {
    /// Print the values of top-level calls as well as other top-level
    /// expressions (calculator mode, or input with a leading `=`).
    pub print_calls: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum EmitError {
    #[error("cannot translate {what} to Lua")]
    Unsupported { what: String, span: Span },
    /// The checker left out something the emitter relies on.
    #[error("internal emitter error: {message}")]
    Internal { message: String, span: Span },
}

impl EmitError {
    pub fn code(&self) -> ErrorCode {
        match self {
            EmitError::Unsupported { .. } => ErrorCode::E9002,
            EmitError::Internal { .. } => ErrorCode::E9001,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            EmitError::Unsupported { span, .. } | EmitError::Internal { span, .. } => *span,
        }
    }
}

pub(crate) type EmitResult<T> = Result<T, EmitError>;

/// Backend seam between the session and a concrete target language.
pub trait Emit {
    fn emit(&mut self, checked: &CheckedUnit) -> Result<String, EmitError>;
}

/// Emits LuaJIT source.
pub struct LuaEmitter<'a> {
    interner: &'a StringInterner,
    pool: &'a TypePool,
    options: EmitOptions,
}

impl<'a> LuaEmitter<'a> {
    pub fn new(interner: &'a StringInterner, pool: &'a TypePool, options: EmitOptions) -> Self {
        LuaEmitter {
            interner,
            pool,
            options,
        }
    }
}

impl Emit for LuaEmitter<'_> {
    fn emit(&mut self, checked: &CheckedUnit) -> Result<String, EmitError> {
        let mut ctx = EmitContext::new(
            self.interner,
            self.pool,
            &checked.info,
            &checked.unit.arena,
            self.options,
        );
        lua::emit_unit(&mut ctx, &checked.unit)
    }
}

#[cfg(test)]
mod tests;
