//! The incremental session.
//!
//! Lines go into a [`SourceAccumulator`]; after every line the *whole*
//! buffer is classified again. Unfinished input waits for more, a syntax
//! error drops the buffer, and a complete construct is checked against the
//! session's declarations and translated to Lua.
//!
//! ```text
//! submit(line) ─▶ accumulator ─▶ classify ─┬─ Empty         ─▶ Translated("")
//!                                          ├─ NeedMoreInput ─▶ Waiting
//!                                          ├─ SyntaxError   ─▶ Err(Syntax)
//!                                          └─ Complete ─▶ check ─▶ emit ─▶ Translated(lua)
//! ```

use gi_emit::{Emit, EmitError, EmitOptions, LuaEmitter};
use gi_ir::ast::Unit;
use gi_ir::{ErrorCode, StringInterner};
use gi_parse::{trim_leading, Classification, Classifier, GoGrammar};
use gi_types::{DeclarationTable, Declaration, TypeCheckError, TypePool};
use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::config::{DeclarationMode, SessionConfig};
use crate::diagnostic::Position;

/// Text submitted since the last finished construct.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SourceAccumulator {
    pending: String,
}

impl SourceAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one line. Lines are joined with `'\n'`, which Go's semicolon
    /// insertion depends on.
    pub fn append(&mut self, line: &str) {
        if !self.pending.is_empty() {
            self.pending.push('\n');
        }
        self.pending.push_str(line);
    }

    pub fn pending(&self) -> &str {
        &self.pending
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Take the buffer, leaving the accumulator empty.
    pub fn take(&mut self) -> String {
        std::mem::take(&mut self.pending)
    }

    /// Put back a buffer taken with [`SourceAccumulator::take`].
    pub fn restore(&mut self, pending: String) {
        self.pending = pending;
    }
}

/// Outcome of a successful [`IncrementalSession::submit`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionResult {
    /// The buffer is unfinished; prompt for a continuation line.
    Waiting,
    /// A construct was translated. Empty input yields an empty string.
    Translated(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("{position}: {message}")]
    Syntax {
        code: ErrorCode,
        position: Position,
        message: String,
    },
    #[error("{position}: {message}")]
    TypeCheck {
        code: ErrorCode,
        position: Position,
        message: String,
        related: Vec<String>,
    },
    /// A method named like a field of its receiver's struct type.
    #[error("{position}: {message}")]
    RedeclarationConflict { position: Position, message: String },
    /// The checker accepted something the Lua backend cannot express.
    #[error("{position}: {message}")]
    Unsupported { position: Position, message: String },
    /// A defect in the front end, never the user's fault.
    #[error("{position}: internal error: {message}")]
    Internal { position: Position, message: String },
    /// One-shot input ended in the middle of a construct.
    #[error("unexpected end of input")]
    IncompleteInput,
}

impl SessionError {
    pub fn code(&self) -> ErrorCode {
        match self {
            SessionError::Syntax { code, .. } | SessionError::TypeCheck { code, .. } => *code,
            SessionError::RedeclarationConflict { .. } => ErrorCode::E2008,
            SessionError::Unsupported { .. } => ErrorCode::E9002,
            SessionError::Internal { .. } => ErrorCode::E9001,
            SessionError::IncompleteInput => ErrorCode::E1007,
        }
    }

    pub fn position(&self) -> Option<&Position> {
        match self {
            SessionError::Syntax { position, .. }
            | SessionError::TypeCheck { position, .. }
            | SessionError::RedeclarationConflict { position, .. }
            | SessionError::Unsupported { position, .. }
            | SessionError::Internal { position, .. } => Some(position),
            SessionError::IncompleteInput => None,
        }
    }

    /// Notes about other declarations involved, e.g. an earlier definition.
    pub fn related(&self) -> &[String] {
        match self {
            SessionError::TypeCheck { related, .. } => related,
            _ => &[],
        }
    }

    pub fn is_syntax(&self) -> bool {
        matches!(self, SessionError::Syntax { .. })
    }

    fn from_check(err: TypeCheckError, source: &str, base: u32) -> Self {
        let position = Position::of_span(source, base, err.span);
        match err.code {
            ErrorCode::E2008 => {
                return SessionError::RedeclarationConflict {
                    position,
                    message: err.message,
                }
            }
            ErrorCode::E9001 => {
                return SessionError::Internal {
                    position,
                    message: err.message,
                }
            }
            _ => {}
        }
        SessionError::TypeCheck {
            code: err.code,
            position,
            message: err.message,
            // Related spans may point into earlier submissions.
            related: err.related.into_iter().map(|(_, note)| note).collect(),
        }
    }

    fn from_emit(err: &EmitError, source: &str, base: u32) -> Self {
        let position = Position::of_span(source, base, err.span());
        match err {
            EmitError::Unsupported { .. } => SessionError::Unsupported {
                position,
                message: err.to_string(),
            },
            EmitError::Internal { message, .. } => SessionError::Internal {
                position,
                message: message.clone(),
            },
        }
    }
}

/// What one buffer amounted to.
enum Step {
    Empty,
    NeedMoreInput,
    Translated(String),
}

/// One REPL session: the pending buffer plus everything declared so far.
///
/// Sessions share nothing; run as many side by side as needed.
pub struct IncrementalSession {
    config: SessionConfig,
    classifier: Classifier<GoGrammar>,
    interner: StringInterner,
    pool: TypePool,
    table: DeclarationTable,
    accumulator: SourceAccumulator,
    /// Set while the current buffer keeps asking for more input.
    error_run: bool,
}

impl Default for IncrementalSession {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl IncrementalSession {
    pub fn new(config: SessionConfig) -> Self {
        IncrementalSession {
            config,
            classifier: Classifier::go(),
            interner: StringInterner::new(),
            pool: TypePool::new(),
            table: DeclarationTable::new(),
            accumulator: SourceAccumulator::new(),
            error_run: false,
        }
    }

    pub fn config(&self) -> SessionConfig {
        self.config
    }

    pub fn set_config(&mut self, config: SessionConfig) {
        self.config = config;
    }

    /// Feed one line of input.
    pub fn submit(&mut self, line: &str) -> Result<SessionResult, SessionError> {
        self.accumulator.append(line);
        let pending = self.accumulator.take();
        match self.process(&pending) {
            Ok(Step::NeedMoreInput) => {
                if !self.error_run {
                    debug!(len = pending.len(), "waiting for more input");
                }
                self.error_run = true;
                self.accumulator.restore(pending);
                Ok(SessionResult::Waiting)
            }
            Ok(Step::Empty) => {
                self.error_run = false;
                Ok(SessionResult::Translated(String::new()))
            }
            Ok(Step::Translated(lua)) => {
                self.error_run = false;
                Ok(SessionResult::Translated(lua))
            }
            Err(err) => {
                self.error_run = false;
                Err(err)
            }
        }
    }

    /// Classify and translate `source` in one go. Unfinished input is an
    /// error here rather than a reason to wait; the pending buffer of
    /// [`IncrementalSession::submit`] is not touched.
    pub fn translate_one(&mut self, source: &str) -> Result<String, SessionError> {
        match self.process(source)? {
            Step::Empty => Ok(String::new()),
            Step::NeedMoreInput => Err(SessionError::IncompleteInput),
            Step::Translated(lua) => Ok(lua),
        }
    }

    /// Whether the next line continues an unfinished construct.
    pub fn is_continuation(&self) -> bool {
        self.error_run
    }

    pub fn pending(&self) -> &str {
        self.accumulator.pending()
    }

    /// Drop the pending buffer only.
    pub fn discard_pending(&mut self) {
        self.accumulator.clear();
        self.error_run = false;
    }

    /// Forget the pending buffer and everything declared so far.
    pub fn reset(&mut self) {
        self.discard_pending();
        self.table.clear();
        self.pool = TypePool::new();
        debug!("session reset");
    }

    pub fn table(&self) -> &DeclarationTable {
        &self.table
    }

    pub fn interner(&self) -> &StringInterner {
        &self.interner
    }

    /// The live top-level declaration of `name`.
    pub fn lookup(&self, name: &str) -> Option<&Declaration> {
        let name = self.interner.intern(name);
        self.table.lookup(name).map(|(_, decl)| decl)
    }

    /// The method `method` declared directly on type `receiver`.
    pub fn lookup_method(&self, receiver: &str, method: &str) -> Option<&Declaration> {
        let method = self.interner.intern(method);
        let id = *self.lookup(receiver)?.methods()?.get(&method)?;
        self.table.get(id)
    }

    fn process(&mut self, text: &str) -> Result<Step, SessionError> {
        let (source, print_calls) = print_prefix(text);
        let source = trim_leading(source);
        let base = u32::try_from(text.len() - source.len()).unwrap_or(u32::MAX);

        match self.classifier.classify(source, &self.interner) {
            Classification::Empty => Ok(Step::Empty),
            Classification::NeedMoreInput => Ok(Step::NeedMoreInput),
            Classification::SyntaxError {
                code,
                span,
                message,
            } => {
                debug!(%code, start = span.start, "syntax error");
                Err(SessionError::Syntax {
                    code,
                    position: Position::of_span(text, base, span),
                    message,
                })
            }
            Classification::Complete(unit) => {
                let print_calls = print_calls || self.config.calculator_mode;
                self.translate(unit, text, base, print_calls).map(Step::Translated)
            }
        }
    }

    fn translate(
        &mut self,
        unit: Unit,
        text: &str,
        base: u32,
        print_calls: bool,
    ) -> Result<String, SessionError> {
        let snapshot = match self.config.declaration_mode {
            DeclarationMode::Atomic => Some((self.pool.clone(), self.table.clone())),
            DeclarationMode::Partial => None,
        };

        let result = self.check_and_emit(unit, text, base, print_calls);
        if result.is_err() {
            if let Some((pool, table)) = snapshot {
                self.pool = pool;
                self.table = table;
                debug!("restored declarations after failed construct");
            }
        }
        result
    }

    fn check_and_emit(
        &mut self,
        unit: Unit,
        text: &str,
        base: u32,
        print_calls: bool,
    ) -> Result<String, SessionError> {
        let items = unit.items.len();
        let checked = gi_types::check_unit(unit, &self.interner, &mut self.pool, &mut self.table)
            .map_err(|err| {
                debug!(code = %err.code, "check failed");
                SessionError::from_check(err, text, base)
            })?;

        let options = EmitOptions { print_calls };
        let lua = LuaEmitter::new(&self.interner, &self.pool, options)
            .emit(&checked)
            .map_err(|err| {
                if matches!(err, EmitError::Internal { .. }) {
                    warn!(%err, "emitter rejected checked unit");
                }
                SessionError::from_emit(&err, text, base)
            })?;
        trace!(items, bytes = lua.len(), "translated construct");
        Ok(lua)
    }
}

/// Strip a leading `=` (but not `==`), which asks for the value to be
/// printed even when it is a call.
fn print_prefix(text: &str) -> (&str, bool) {
    let trimmed = trim_leading(text);
    match trimmed.strip_prefix('=') {
        Some(rest) if !rest.starts_with('=') => (rest, true),
        _ => (trimmed, false),
    }
}

#[cfg(test)]
mod tests;
