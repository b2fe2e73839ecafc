//! Logos token definitions, before literal decoding and semicolon insertion.

use logos::Logos;

/// How a `/* ... */` comment ended.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum CommentEnd {
    /// Closed on the line it opened.
    Inline,
    /// Closed after at least one line break; acts like a newline.
    Multiline,
    /// Input ended first.
    Unterminated,
}

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\f]+")]
#[logos(skip r"//[^\n]*")]
pub(crate) enum RawToken {
    #[token("\n")]
    Newline,

    #[token("/*", block_comment)]
    BlockComment(CommentEnd),

    // Literals. The `bool` records whether the closing quote was found.
    #[token("\"", |lex| quoted(lex, '"'))]
    Str(bool),
    #[token("'", |lex| quoted(lex, '\''))]
    Rune(bool),
    #[token("`", raw_string)]
    RawStr(bool),

    #[regex(r"[0-9][0-9_]*")]
    DecInt,
    #[regex(r"0[xX][0-9a-fA-F_]+")]
    HexInt,
    #[regex(r"0[oO][0-7_]+")]
    OctInt,
    #[regex(r"0[bB][01_]+")]
    BinInt,
    #[regex(r"[0-9][0-9_]*\.[0-9_]*([eE][+-]?[0-9_]+)?")]
    #[regex(r"\.[0-9][0-9_]*([eE][+-]?[0-9_]+)?")]
    #[regex(r"[0-9][0-9_]*[eE][+-]?[0-9_]+")]
    Float,

    #[regex(r"[\p{L}_][\p{L}\p{Nd}_]*")]
    Ident,

    // Keywords
    #[token("break")]
    Break,
    #[token("case")]
    Case,
    #[token("chan")]
    Chan,
    #[token("const")]
    Const,
    #[token("continue")]
    Continue,
    #[token("default")]
    Default,
    #[token("defer")]
    Defer,
    #[token("else")]
    Else,
    #[token("fallthrough")]
    Fallthrough,
    #[token("for")]
    For,
    #[token("func")]
    Func,
    #[token("go")]
    Go,
    #[token("goto")]
    Goto,
    #[token("if")]
    If,
    #[token("import")]
    Import,
    #[token("interface")]
    Interface,
    #[token("map")]
    Map,
    #[token("package")]
    Package,
    #[token("range")]
    Range,
    #[token("return")]
    Return,
    #[token("select")]
    Select,
    #[token("struct")]
    Struct,
    #[token("switch")]
    Switch,
    #[token("type")]
    Type,
    #[token("var")]
    Var,

    // Operators
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("&")]
    Amp,
    #[token("|")]
    Pipe,
    #[token("^")]
    Caret,
    #[token("<<")]
    Shl,
    #[token(">>")]
    Shr,
    #[token("&^")]
    AmpCaret,
    #[token("+=")]
    PlusEq,
    #[token("-=")]
    MinusEq,
    #[token("*=")]
    StarEq,
    #[token("/=")]
    SlashEq,
    #[token("%=")]
    PercentEq,
    #[token("&=")]
    AmpEq,
    #[token("|=")]
    PipeEq,
    #[token("^=")]
    CaretEq,
    #[token("<<=")]
    ShlEq,
    #[token(">>=")]
    ShrEq,
    #[token("&^=")]
    AmpCaretEq,
    #[token("&&")]
    AndAnd,
    #[token("||")]
    OrOr,
    #[token("<-")]
    Arrow,
    #[token("++")]
    Inc,
    #[token("--")]
    Dec,
    #[token("==")]
    EqEq,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("=")]
    Eq,
    #[token("!")]
    Bang,
    #[token("!=")]
    NotEq,
    #[token("<=")]
    LtEq,
    #[token(">=")]
    GtEq,
    #[token(":=")]
    ColonEq,
    #[token("...")]
    Ellipsis,

    // Delimiters
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token(",")]
    Comma,
    #[token(";")]
    Semicolon,
    #[token(".")]
    Dot,
    #[token(":")]
    Colon,
}

fn block_comment(lex: &mut logos::Lexer<'_, RawToken>) -> CommentEnd {
    let rest = lex.remainder();
    if let Some(end) = rest.find("*/") {
        let spans_lines = rest[..end].contains('\n');
        lex.bump(end + 2);
        if spans_lines {
            CommentEnd::Multiline
        } else {
            CommentEnd::Inline
        }
    } else {
        lex.bump(rest.len());
        CommentEnd::Unterminated
    }
}

/// Scan an interpreted string or rune body. A line break ends the literal
/// unterminated and is left for the newline rule.
fn quoted(lex: &mut logos::Lexer<'_, RawToken>, quote: char) -> bool {
    let rest = lex.remainder();
    let mut escaped = false;
    for (i, c) in rest.char_indices() {
        if c == '\n' {
            lex.bump(i);
            return false;
        }
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == quote {
            lex.bump(i + c.len_utf8());
            return true;
        }
    }
    lex.bump(rest.len());
    false
}

fn raw_string(lex: &mut logos::Lexer<'_, RawToken>) -> bool {
    let rest = lex.remainder();
    if let Some(end) = rest.find('`') {
        lex.bump(end + 1);
        true
    } else {
        lex.bump(rest.len());
        false
    }
}
