#![allow(clippy::unwrap_used)]

use super::*;

fn with_cursor<R>(source: &str, f: impl FnOnce(&mut Cursor<'_>) -> R) -> R {
    let interner = StringInterner::new();
    let tokens = gi_lexer::lex(source, &interner);
    let mut cursor = Cursor::new(&tokens, &interner);
    f(&mut cursor)
}

#[test]
fn test_advance_stops_at_eof() {
    with_cursor("x", |c| {
        assert!(c.check_ident());
        c.advance();
        assert!(c.check(TokenKind::Semicolon));
        c.advance();
        assert!(c.is_at_end());
        c.advance();
        assert!(c.is_at_end());
    });
}

#[test]
fn test_unexpected_at_eof_is_end_of_input() {
    with_cursor("", |c| {
        let failure = c.unexpected("expression");
        assert!(failure.is_end_of_input());
        assert_eq!(failure.code, ErrorCode::E1007);
    });
}

#[test]
fn test_unexpected_token_names_it() {
    with_cursor("3 4", |c| {
        c.advance();
        let failure = c.unexpected("end of statement");
        assert!(!failure.is_end_of_input());
        assert_eq!(failure.message, "unexpected literal 4, expected end of statement");
        assert_eq!(failure.span, Span::new(2, 3));
    });
}

#[test]
fn test_implicit_semicolon_described_as_newline() {
    with_cursor("a\n", |c| {
        c.advance();
        assert_eq!(c.unexpected("type").message, "unexpected newline, expected type");
    });
}

#[test]
fn test_lexical_error_message() {
    with_cursor("\"abc", |c| {
        let failure = c.unexpected("expression");
        assert_eq!(failure.code, ErrorCode::E0001);
        assert_eq!(failure.message, "string literal not terminated");
    });
}

#[test]
fn test_keyword_description() {
    with_cursor("func", |c| {
        assert_eq!(c.unexpected("name").message, "unexpected keyword func, expected name");
    });
}

#[test]
fn test_expect_ident() {
    with_cursor("abc", |c| {
        let ident = c.expect_ident().unwrap();
        assert_eq!(c.interner().lookup(ident.name), "abc");
        assert_eq!(ident.span, Span::new(0, 3));
    });
}
