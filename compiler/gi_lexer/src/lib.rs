//! Tokenizer for the gi REPL.
//!
//! Produces a [`TokenList`] ending in exactly one `Eof`. Go's automatic
//! semicolon rule runs during lexing: a line break (or end of input) after an
//! identifier, literal, `break`/`continue`/`fallthrough`/`return`, `++`/`--`
//! or a closing `)`/`]`/`}` yields a `;` token flagged
//! [`TokenFlags::IMPLICIT`].
//!
//! Input that stops inside a raw string or block comment is not an error: the
//! final `Eof` carries [`TokenFlags::INCOMPLETE`] so the parser can report it
//! as running out of input.

mod escape;
mod raw_token;

pub use escape::{raw_string_value, unescape_rune, unescape_string, EscapeError};

use gi_ir::{ErrorCode, Span, StringInterner, Token, TokenFlags, TokenKind, TokenList};
use logos::Logos;
use raw_token::{CommentEnd, RawToken};
use tracing::trace;

/// Tokenize `source`, interning identifiers and string contents.
pub fn lex(source: &str, interner: &StringInterner) -> TokenList {
    Lexer::new(source, interner).lex_all()
}

pub struct Lexer<'src, 'i> {
    source: &'src str,
    interner: &'i StringInterner,
}

impl<'src, 'i> Lexer<'src, 'i> {
    pub fn new(source: &'src str, interner: &'i StringInterner) -> Self {
        Lexer { source, interner }
    }

    pub fn lex_all(&self) -> TokenList {
        let mut out = TokenList::new();
        let mut logos = RawToken::lexer(self.source);
        // The previous real token permits an automatic `;` at the next line break.
        let mut semi_pending = false;
        let mut newline_before = false;
        let mut incomplete = false;

        while let Some(result) = logos.next() {
            let span = Span::from_range(logos.span());
            let raw = match result {
                Ok(raw) => raw,
                Err(()) => {
                    out.push(self.flagged(TokenKind::Error(ErrorCode::E0002), span, newline_before));
                    semi_pending = false;
                    newline_before = false;
                    continue;
                }
            };
            match raw {
                RawToken::Newline | RawToken::BlockComment(CommentEnd::Multiline) => {
                    if semi_pending {
                        out.push(implicit_semicolon(span.start));
                        semi_pending = false;
                    }
                    newline_before = true;
                }
                RawToken::BlockComment(CommentEnd::Inline) => {}
                RawToken::BlockComment(CommentEnd::Unterminated) | RawToken::RawStr(false) => {
                    incomplete = true;
                    break;
                }
                other => {
                    let kind = self.convert(other, logos.slice());
                    semi_pending = kind.ends_statement_line();
                    out.push(self.flagged(kind, span, newline_before));
                    newline_before = false;
                }
            }
        }

        let end = u32::try_from(self.source.len()).unwrap_or(u32::MAX);
        if semi_pending && !incomplete {
            out.push(implicit_semicolon(end));
        }
        let mut eof = Token::new(TokenKind::Eof, Span::point(end));
        if incomplete {
            eof = eof.with_flags(TokenFlags::INCOMPLETE);
        }
        out.push(eof);
        trace!(tokens = out.len(), incomplete, "lexed buffer");
        out
    }

    fn flagged(&self, kind: TokenKind, span: Span, newline_before: bool) -> Token {
        let token = Token::new(kind, span);
        if newline_before {
            token.with_flags(TokenFlags::NEWLINE_BEFORE)
        } else {
            token
        }
    }

    fn convert(&self, raw: RawToken, slice: &str) -> TokenKind {
        match raw {
            RawToken::Ident => TokenKind::Ident(self.interner.intern(slice)),
            RawToken::DecInt => {
                let digits = slice.replace('_', "");
                // A leading zero means legacy octal, as in `0755`.
                let parsed = if digits.len() > 1 && digits.starts_with('0') {
                    u128::from_str_radix(&digits[1..], 8)
                } else {
                    digits.parse::<u128>()
                };
                parsed.map_or(TokenKind::Error(ErrorCode::E0003), TokenKind::Int)
            }
            RawToken::HexInt => radix_int(slice, 16),
            RawToken::OctInt => radix_int(slice, 8),
            RawToken::BinInt => radix_int(slice, 2),
            RawToken::Float => slice
                .replace('_', "")
                .parse::<f64>()
                .map_or(TokenKind::Error(ErrorCode::E0003), |f| TokenKind::Float(f.to_bits())),
            RawToken::Str(terminated) => {
                if !terminated {
                    return TokenKind::Error(ErrorCode::E0001);
                }
                match unescape_string(&slice[1..slice.len() - 1]) {
                    Ok(value) => TokenKind::Str(self.interner.intern(&value)),
                    Err(_) => TokenKind::Error(ErrorCode::E0004),
                }
            }
            RawToken::Rune(terminated) => {
                if !terminated {
                    return TokenKind::Error(ErrorCode::E0001);
                }
                match unescape_rune(&slice[1..slice.len() - 1]) {
                    Ok(c) => TokenKind::Char(c),
                    Err(_) => TokenKind::Error(ErrorCode::E0004),
                }
            }
            RawToken::RawStr(_) => {
                let body = &slice[1..slice.len() - 1];
                TokenKind::Str(self.interner.intern(&raw_string_value(body)))
            }
            RawToken::Break => TokenKind::Break,
            RawToken::Case => TokenKind::Case,
            RawToken::Chan => TokenKind::Chan,
            RawToken::Const => TokenKind::Const,
            RawToken::Continue => TokenKind::Continue,
            RawToken::Default => TokenKind::Default,
            RawToken::Defer => TokenKind::Defer,
            RawToken::Else => TokenKind::Else,
            RawToken::Fallthrough => TokenKind::Fallthrough,
            RawToken::For => TokenKind::For,
            RawToken::Func => TokenKind::Func,
            RawToken::Go => TokenKind::Go,
            RawToken::Goto => TokenKind::Goto,
            RawToken::If => TokenKind::If,
            RawToken::Import => TokenKind::Import,
            RawToken::Interface => TokenKind::Interface,
            RawToken::Map => TokenKind::Map,
            RawToken::Package => TokenKind::Package,
            RawToken::Range => TokenKind::Range,
            RawToken::Return => TokenKind::Return,
            RawToken::Select => TokenKind::Select,
            RawToken::Struct => TokenKind::Struct,
            RawToken::Switch => TokenKind::Switch,
            RawToken::Type => TokenKind::Type,
            RawToken::Var => TokenKind::Var,
            RawToken::Plus => TokenKind::Plus,
            RawToken::Minus => TokenKind::Minus,
            RawToken::Star => TokenKind::Star,
            RawToken::Slash => TokenKind::Slash,
            RawToken::Percent => TokenKind::Percent,
            RawToken::Amp => TokenKind::Amp,
            RawToken::Pipe => TokenKind::Pipe,
            RawToken::Caret => TokenKind::Caret,
            RawToken::Shl => TokenKind::Shl,
            RawToken::Shr => TokenKind::Shr,
            RawToken::AmpCaret => TokenKind::AmpCaret,
            RawToken::PlusEq => TokenKind::PlusEq,
            RawToken::MinusEq => TokenKind::MinusEq,
            RawToken::StarEq => TokenKind::StarEq,
            RawToken::SlashEq => TokenKind::SlashEq,
            RawToken::PercentEq => TokenKind::PercentEq,
            RawToken::AmpEq => TokenKind::AmpEq,
            RawToken::PipeEq => TokenKind::PipeEq,
            RawToken::CaretEq => TokenKind::CaretEq,
            RawToken::ShlEq => TokenKind::ShlEq,
            RawToken::ShrEq => TokenKind::ShrEq,
            RawToken::AmpCaretEq => TokenKind::AmpCaretEq,
            RawToken::AndAnd => TokenKind::AndAnd,
            RawToken::OrOr => TokenKind::OrOr,
            RawToken::Arrow => TokenKind::Arrow,
            RawToken::Inc => TokenKind::Inc,
            RawToken::Dec => TokenKind::Dec,
            RawToken::EqEq => TokenKind::EqEq,
            RawToken::Lt => TokenKind::Lt,
            RawToken::Gt => TokenKind::Gt,
            RawToken::Eq => TokenKind::Eq,
            RawToken::Bang => TokenKind::Bang,
            RawToken::NotEq => TokenKind::NotEq,
            RawToken::LtEq => TokenKind::LtEq,
            RawToken::GtEq => TokenKind::GtEq,
            RawToken::ColonEq => TokenKind::ColonEq,
            RawToken::Ellipsis => TokenKind::Ellipsis,
            RawToken::LParen => TokenKind::LParen,
            RawToken::RParen => TokenKind::RParen,
            RawToken::LBracket => TokenKind::LBracket,
            RawToken::RBracket => TokenKind::RBracket,
            RawToken::LBrace => TokenKind::LBrace,
            RawToken::RBrace => TokenKind::RBrace,
            RawToken::Comma => TokenKind::Comma,
            RawToken::Semicolon => TokenKind::Semicolon,
            RawToken::Dot => TokenKind::Dot,
            RawToken::Colon => TokenKind::Colon,
            // Handled by `lex_all` before conversion.
            RawToken::Newline | RawToken::BlockComment(_) => TokenKind::Error(ErrorCode::E9001),
        }
    }
}

fn implicit_semicolon(offset: u32) -> Token {
    Token::new(TokenKind::Semicolon, Span::point(offset)).with_flags(TokenFlags::IMPLICIT)
}

fn radix_int(slice: &str, radix: u32) -> TokenKind {
    let digits = slice[2..].replace('_', "");
    u128::from_str_radix(&digits, radix).map_or(TokenKind::Error(ErrorCode::E0003), TokenKind::Int)
}

#[cfg(test)]
mod tests;
