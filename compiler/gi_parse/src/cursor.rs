//! Token cursor.
//!
//! The cursor never moves past the trailing `Eof`, so `current()` is always
//! valid.

use crate::{FailureKind, ParseFailure};
use gi_ir::ast::Ident;
use gi_ir::{ErrorCode, Span, StringInterner, Token, TokenKind, TokenList};
use tracing::trace;

pub struct Cursor<'a> {
    tokens: &'a [Token],
    incomplete: bool,
    interner: &'a StringInterner,
    pos: usize,
}

impl<'a> Cursor<'a> {
    /// # Panics
    /// Panics in debug builds if `tokens` does not end with `Eof`.
    pub fn new(tokens: &'a TokenList, interner: &'a StringInterner) -> Self {
        debug_assert!(tokens.last().is_some_and(|t| t.kind == TokenKind::Eof));
        Cursor {
            tokens: tokens.as_slice(),
            incomplete: tokens.is_incomplete(),
            interner,
            pos: 0,
        }
    }

    pub fn interner(&self) -> &'a StringInterner {
        self.interner
    }

    #[inline]
    pub fn current(&self) -> &'a Token {
        let last = self.tokens.len().saturating_sub(1);
        &self.tokens[self.pos.min(last)]
    }

    #[inline]
    pub fn kind(&self) -> TokenKind {
        self.current().kind
    }

    #[inline]
    pub fn span(&self) -> Span {
        self.current().span
    }

    /// Span of the most recently consumed token.
    pub fn previous_span(&self) -> Span {
        self.pos
            .checked_sub(1)
            .and_then(|p| self.tokens.get(p))
            .map_or(Span::DUMMY, |t| t.span)
    }

    /// Kind of the token `n` positions ahead; `Eof` past the end.
    pub fn peek(&self, n: usize) -> TokenKind {
        self.tokens
            .get(self.pos + n)
            .map_or(TokenKind::Eof, |t| t.kind)
    }

    #[inline]
    pub fn is_at_end(&self) -> bool {
        self.kind() == TokenKind::Eof
    }

    /// Lexing stopped inside a raw string or block comment.
    pub fn is_incomplete(&self) -> bool {
        self.incomplete
    }

    #[inline]
    pub fn check(&self, kind: TokenKind) -> bool {
        self.kind() == kind
    }

    pub fn check_ident(&self) -> bool {
        matches!(self.kind(), TokenKind::Ident(_))
    }

    pub fn advance(&mut self) -> &'a Token {
        let token = self.current();
        if token.kind != TokenKind::Eof {
            trace!(kind = ?token.kind, pos = self.pos, "advance");
            self.pos += 1;
        }
        token
    }

    pub fn eat(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub fn expect(&mut self, kind: TokenKind) -> Result<Span, ParseFailure> {
        if self.check(kind) {
            Ok(self.advance().span)
        } else {
            Err(self.unexpected(kind.symbol()))
        }
    }

    pub fn expect_ident(&mut self) -> Result<Ident, ParseFailure> {
        match self.kind() {
            TokenKind::Ident(name) => {
                let span = self.advance().span;
                Ok(Ident::new(name, span))
            }
            _ => Err(self.unexpected_code("name", ErrorCode::E1004)),
        }
    }

    pub fn unexpected(&self, expected: &str) -> ParseFailure {
        self.unexpected_code(expected, ErrorCode::E1001)
    }

    /// Failure at the current token. Lexical error tokens report their own
    /// message, and `Eof` always yields [`FailureKind::EndOfInput`].
    pub fn unexpected_code(&self, expected: &str, code: ErrorCode) -> ParseFailure {
        let token = self.current();
        match token.kind {
            TokenKind::Eof => ParseFailure::new(
                FailureKind::EndOfInput,
                ErrorCode::E1007,
                token.span,
                format!("unexpected EOF, expected {expected}"),
            ),
            TokenKind::Error(lex_code) => {
                ParseFailure::at(token.span, lex_code, lexical_message(lex_code))
            }
            _ => ParseFailure::at(
                token.span,
                code,
                format!("unexpected {}, expected {expected}", self.describe(token)),
            ),
        }
    }

    /// Failure for input that ended inside a raw string or comment.
    pub fn incomplete_failure(&self) -> ParseFailure {
        ParseFailure::new(
            FailureKind::EndOfInput,
            ErrorCode::E1007,
            self.span(),
            "unexpected EOF in raw string or comment",
        )
    }

    fn describe(&self, token: &Token) -> String {
        match token.kind {
            TokenKind::Semicolon if token.is_implicit_semi() => "newline".to_string(),
            TokenKind::Ident(name) => format!("name {}", self.interner.lookup(name)),
            TokenKind::Int(v) => format!("literal {v}"),
            TokenKind::Float(bits) => format!("literal {}", f64::from_bits(bits)),
            TokenKind::Str(name) => format!("literal {:?}", self.interner.lookup(name)),
            TokenKind::Char(c) => format!("literal {c:?}"),
            kind if kind.symbol().chars().all(char::is_alphabetic) => {
                format!("keyword {}", kind.symbol())
            }
            kind => kind.symbol().to_string(),
        }
    }
}

fn lexical_message(code: ErrorCode) -> &'static str {
    match code {
        ErrorCode::E0001 => "string literal not terminated",
        ErrorCode::E0003 => "malformed number literal",
        ErrorCode::E0004 => "invalid escape sequence",
        _ => "invalid character",
    }
}

#[cfg(test)]
mod tests;
