#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn kinds(source: &str) -> Vec<TokenKind> {
    let interner = StringInterner::new();
    lex(source, &interner).iter().map(|t| t.kind).collect()
}

fn implicit_count(source: &str) -> usize {
    let interner = StringInterner::new();
    lex(source, &interner)
        .iter()
        .filter(|t| t.is_implicit_semi())
        .count()
}

#[test]
fn test_expression_gets_semicolon_at_eof() {
    assert_eq!(
        kinds("3 * 4"),
        vec![
            TokenKind::Int(3),
            TokenKind::Star,
            TokenKind::Int(4),
            TokenKind::Semicolon,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_no_semicolon_after_operator() {
    assert_eq!(
        kinds("3 *\n"),
        vec![TokenKind::Int(3), TokenKind::Star, TokenKind::Eof]
    );
}

#[test]
fn test_semicolon_after_closing_delimiters() {
    assert_eq!(implicit_count("f()\n"), 1);
    assert_eq!(implicit_count("a[0]\n"), 1);
    assert_eq!(implicit_count("func f() {\n}"), 1);
    assert_eq!(implicit_count("x++\n"), 1);
    assert_eq!(implicit_count("return\n"), 1);
}

#[test]
fn test_no_semicolon_after_open_brace_or_comma() {
    assert_eq!(implicit_count("if true {\n"), 0);
    assert_eq!(implicit_count("f(a,\n"), 0);
}

#[test]
fn test_line_comment_still_ends_line() {
    assert_eq!(implicit_count("a := 1 // note\nb := 2"), 2);
}

#[test]
fn test_multiline_block_comment_acts_as_newline() {
    assert_eq!(implicit_count("a /* x\n y */ b"), 2);
    assert_eq!(implicit_count("a /* x */ b"), 1);
}

#[test]
fn test_unterminated_raw_string_is_incomplete() {
    let interner = StringInterner::new();
    let tokens = lex("a := `abc", &interner);
    assert!(tokens.is_incomplete());
    assert_eq!(tokens.len(), 3);
}

#[test]
fn test_unterminated_block_comment_is_incomplete() {
    let interner = StringInterner::new();
    assert!(lex("x /* open", &interner).is_incomplete());
}

#[test]
fn test_raw_string_spans_lines() {
    let interner = StringInterner::new();
    let tokens = lex("`a\nb`", &interner);
    let TokenKind::Str(name) = tokens.get(0).unwrap().kind else {
        panic!("expected string token");
    };
    assert_eq!(interner.lookup(name), "a\nb");
}

#[test]
fn test_unterminated_interpreted_string_is_error() {
    assert_eq!(kinds("\"abc")[0], TokenKind::Error(ErrorCode::E0001));
}

#[test]
fn test_integer_bases() {
    assert_eq!(kinds("0x1F")[0], TokenKind::Int(31));
    assert_eq!(kinds("0b101")[0], TokenKind::Int(5));
    assert_eq!(kinds("0o17")[0], TokenKind::Int(15));
    assert_eq!(kinds("017")[0], TokenKind::Int(15));
    assert_eq!(kinds("1_000")[0], TokenKind::Int(1000));
    assert_eq!(kinds("09")[0], TokenKind::Error(ErrorCode::E0003));
}

#[test]
fn test_floats() {
    assert_eq!(kinds("1.5")[0], TokenKind::Float(1.5f64.to_bits()));
    assert_eq!(kinds(".25")[0], TokenKind::Float(0.25f64.to_bits()));
    assert_eq!(kinds("1e3")[0], TokenKind::Float(1000f64.to_bits()));
}

#[test]
fn test_keywords_and_identifiers() {
    let interner = StringInterner::new();
    let tokens: Vec<_> = lex("func format", &interner).iter().map(|t| t.kind).collect();
    assert_eq!(tokens[0], TokenKind::Func);
    assert_eq!(tokens[1], TokenKind::Ident(interner.intern("format")));
}

#[test]
fn test_operators_longest_match() {
    let ops: Vec<_> = kinds("a &^= b <<= c ... d")
        .into_iter()
        .filter(|k| !matches!(k, TokenKind::Ident(_)))
        .collect();
    assert_eq!(
        ops,
        vec![
            TokenKind::AmpCaretEq,
            TokenKind::ShlEq,
            TokenKind::Ellipsis,
            TokenKind::Semicolon,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_invalid_character() {
    assert_eq!(kinds("a @ b")[1], TokenKind::Error(ErrorCode::E0002));
}

#[test]
fn test_newline_flag() {
    let interner = StringInterner::new();
    let tokens = lex("a +\nb", &interner);
    let b = tokens.get(2).unwrap();
    assert!(b.flags.contains(TokenFlags::NEWLINE_BEFORE));
}

proptest! {
    #[test]
    fn prop_always_single_trailing_eof(src in "[ -~\n]{0,40}") {
        let interner = StringInterner::new();
        let tokens = lex(&src, &interner);
        let eofs = tokens.iter().filter(|t| t.kind == TokenKind::Eof).count();
        prop_assert_eq!(eofs, 1);
        prop_assert_eq!(tokens.last().map(|t| t.kind), Some(TokenKind::Eof));
    }

    #[test]
    fn prop_whitespace_has_no_content(src in "[ \t\r\n]{0,20}") {
        let interner = StringInterner::new();
        prop_assert!(lex(&src, &interner).has_no_content());
    }
}
