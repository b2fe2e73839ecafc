use super::*;

#[test]
fn test_simple_escapes() {
    assert_eq!(unescape_string(r#"a\tb\n\"q\""#), Ok("a\tb\n\"q\"".to_string()));
}

#[test]
fn test_numeric_escapes() {
    assert_eq!(unescape_string(r"\x41\101é"), Ok("AAé".to_string()));
    assert_eq!(unescape_string(r"\U0001F600"), Ok("\u{1F600}".to_string()));
}

#[test]
fn test_invalid_escape() {
    assert_eq!(unescape_string(r"\q"), Err(EscapeError::Invalid));
    assert_eq!(unescape_string(r"\x4"), Err(EscapeError::Invalid));
    assert_eq!(unescape_string(r"\400"), Err(EscapeError::OutOfRange));
}

#[test]
fn test_single_quote_only_escapes_in_runes() {
    assert_eq!(unescape_rune(r"\'"), Ok('\''));
    assert_eq!(unescape_string(r"\'"), Err(EscapeError::Invalid));
}

#[test]
fn test_rune_length() {
    assert_eq!(unescape_rune("a"), Ok('a'));
    assert_eq!(unescape_rune("ab"), Err(EscapeError::RuneLength));
    assert_eq!(unescape_rune(""), Err(EscapeError::RuneLength));
}

#[test]
fn test_raw_string_drops_carriage_returns() {
    assert_eq!(raw_string_value("a\r\nb"), "a\nb");
}
