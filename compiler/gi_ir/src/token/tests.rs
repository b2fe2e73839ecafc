use super::*;

#[test]
fn test_semicolon_triggers() {
    assert!(TokenKind::Ident(Name::BLANK).ends_statement_line());
    assert!(TokenKind::RBrace.ends_statement_line());
    assert!(TokenKind::Inc.ends_statement_line());
    assert!(!TokenKind::Star.ends_statement_line());
    assert!(!TokenKind::LBrace.ends_statement_line());
    assert!(!TokenKind::Comma.ends_statement_line());
}

#[test]
fn test_incomplete_flag_on_eof() {
    let mut list = TokenList::new();
    list.push(Token::new(TokenKind::Eof, Span::point(3)).with_flags(TokenFlags::INCOMPLETE));
    assert!(list.is_incomplete());
    assert!(list.has_no_content());
}

#[test]
fn test_implicit_semicolon() {
    let tok = Token::new(TokenKind::Semicolon, Span::point(1)).with_flags(TokenFlags::IMPLICIT);
    assert!(tok.is_implicit_semi());
    assert!(!Token::new(TokenKind::Semicolon, Span::point(1)).is_implicit_semi());
}
