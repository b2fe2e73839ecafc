//! Input completeness classification.
//!
//! A REPL must tell "keep typing" apart from "that is wrong". Rather than
//! predicting with lookahead, the classifier parses the whole buffer and asks
//! where the parse failed: a failure on the end-of-input sentinel means the
//! construct is unfinished, a failure anywhere earlier is a real error.

use crate::{parse_unit, ParseFailure};
use gi_ir::ast::Unit;
use gi_ir::{ErrorCode, Span, StringInterner};
use tracing::{debug, trace};

/// A grammar the classifier can drive.
pub trait Grammar {
    type Unit;

    /// Parse `source` in full, aborting at the first error.
    fn parse_unit(&self, source: &str, interner: &StringInterner)
        -> Result<Self::Unit, ParseFailure>;

    /// Whether `source` contains no tokens at all.
    fn is_blank(&self, source: &str, _interner: &StringInterner) -> bool {
        source.trim().is_empty()
    }
}

/// The Go-like surface grammar.
#[derive(Copy, Clone, Debug, Default)]
pub struct GoGrammar;

impl Grammar for GoGrammar {
    type Unit = Unit;

    fn parse_unit(&self, source: &str, interner: &StringInterner) -> Result<Unit, ParseFailure> {
        parse_unit(source, interner)
    }

    /// Comment-only input has no tokens and counts as blank, unless a block
    /// comment is still open.
    fn is_blank(&self, source: &str, interner: &StringInterner) -> bool {
        let tokens = gi_lexer::lex(source, interner);
        tokens.has_no_content() && !tokens.is_incomplete()
    }
}

/// Outcome of classifying one buffer. Exactly one variant per call.
#[derive(Clone, Debug, PartialEq)]
pub enum Classification<U> {
    /// Nothing but whitespace or comments.
    Empty,
    /// A full construct parsed without error.
    Complete(U),
    /// The parse failed upon reaching end of input.
    NeedMoreInput,
    /// The parse failed at a token before end of input. `span` is relative to
    /// the buffer with leading whitespace trimmed.
    SyntaxError {
        code: ErrorCode,
        span: Span,
        message: String,
    },
}

impl<U> Classification<U> {
    pub fn is_complete(&self) -> bool {
        matches!(self, Classification::Complete(_))
    }

    /// Short label for logging.
    pub fn label(&self) -> &'static str {
        match self {
            Classification::Empty => "empty",
            Classification::Complete(_) => "complete",
            Classification::NeedMoreInput => "need-more-input",
            Classification::SyntaxError { .. } => "syntax-error",
        }
    }
}

/// Classifies buffers with grammar `G`.
#[derive(Clone, Debug, Default)]
pub struct Classifier<G> {
    grammar: G,
}

impl<G: Grammar> Classifier<G> {
    pub fn new(grammar: G) -> Self {
        Classifier { grammar }
    }

    pub fn grammar(&self) -> &G {
        &self.grammar
    }

    /// Classify `buffer`. Pure with respect to its input: the same buffer
    /// always yields the same classification.
    pub fn classify(&self, buffer: &str, interner: &StringInterner) -> Classification<G::Unit> {
        let source = trim_leading(buffer);
        trace!(len = source.len(), "classifying buffer");
        if source.is_empty() || self.grammar.is_blank(source, interner) {
            return Classification::Empty;
        }
        let result = match self.grammar.parse_unit(source, interner) {
            Ok(unit) => Classification::Complete(unit),
            Err(failure) if failure.is_end_of_input() => Classification::NeedMoreInput,
            Err(failure) => Classification::SyntaxError {
                code: failure.code,
                span: failure.span,
                message: failure.message,
            },
        };
        debug!(outcome = result.label(), "classified buffer");
        result
    }
}

impl Classifier<GoGrammar> {
    pub fn go() -> Self {
        Classifier::new(GoGrammar)
    }
}

/// Strip leading spaces, tabs and line breaks only.
pub fn trim_leading(buffer: &str) -> &str {
    buffer.trim_start_matches([' ', '\t', '\n', '\r'])
}

#[cfg(test)]
mod tests;
