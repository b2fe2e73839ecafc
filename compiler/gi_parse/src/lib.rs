//! Parser for the gi REPL front end.
//!
//! Two entry points:
//! - [`parse_unit`] parses one buffer into a [`Unit`], stopping at the first
//!   error.
//! - [`Classifier`] decides whether a buffer is empty, complete, needs more
//!   input or contains a syntax error, by running any [`Grammar`] and looking
//!   at where it failed.
//!
//! ```text
//! buffer ──▶ gi_lexer::lex ──▶ Parser::parse_unit ──▶ Ok(Unit)
//!                                     │
//!                                     └─▶ Err(ParseFailure { kind: EndOfInput | Token })
//! ```

mod completeness;
mod cursor;
mod error;
mod grammar;
mod parser;

pub use completeness::{trim_leading, Classification, Classifier, GoGrammar, Grammar};
pub use error::{FailureKind, ParseFailure};
pub use parser::Parser;

use gi_ir::ast::Unit;
use gi_ir::StringInterner;

/// Lex and parse `source` as one compilation unit.
pub fn parse_unit(source: &str, interner: &StringInterner) -> Result<Unit, ParseFailure> {
    let tokens = gi_lexer::lex(source, interner);
    Parser::new(&tokens, interner).parse_unit()
}

#[cfg(test)]
mod tests;
