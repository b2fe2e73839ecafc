#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use crate::FailureKind;
use gi_ir::ErrorCode;
use proptest::prelude::*;

fn classify(src: &str) -> &'static str {
    let interner = StringInterner::new();
    Classifier::go().classify(src, &interner).label()
}

const EMPTY: &str = "empty";
const COMPLETE: &str = "complete";
const MORE: &str = "need-more-input";
const SYNTAX: &str = "syntax-error";

#[test]
fn test_blank_input() {
    assert_eq!(classify(""), EMPTY);
    assert_eq!(classify("   \n\t  \r\n"), EMPTY);
    assert_eq!(classify("// just a comment"), EMPTY);
}

#[test]
fn test_arithmetic() {
    assert_eq!(classify("3"), COMPLETE);
    assert_eq!(classify("3 * 4"), COMPLETE);
    assert_eq!(classify("3 * "), MORE);
    assert_eq!(classify("3 * *"), MORE);
    assert_eq!(classify("3 4"), SYNTAX);
}

#[test]
fn test_continuation_lines() {
    assert_eq!(classify("2 / 3 * \n 1"), COMPLETE);
    assert_eq!(classify("2 / 3 * \n "), MORE);
    assert_eq!(classify("2 / 3 * \n *"), MORE);
    assert_eq!(classify("2 / 3 * \n ++"), SYNTAX);
    assert_eq!(classify("2 / ++"), SYNTAX);
}

#[test]
fn test_multiple_assignment() {
    assert_eq!(classify("a, b := 3, 4"), COMPLETE);
    assert_eq!(classify("a,b :=3,"), MORE);
    assert_eq!(classify("a,b :=3, \n 4"), COMPLETE);
    assert_eq!(classify("a,b := \n ,"), SYNTAX);
}

#[test]
fn test_open_blocks_need_more_input() {
    for src in [
        "type A struct {",
        "switch {",
        "select {",
        "if true {",
        "for {",
        "go func() {",
        "func f() {",
    ] {
        assert_eq!(classify(src), MORE, "{src:?}");
    }
}

#[test]
fn test_function_headers() {
    assert_eq!(classify("func f("), MORE);
    assert_eq!(classify("func f( a int,"), MORE);
    assert_eq!(
        classify("func f (\n x float64,\n y float64,\n ) (float64,"),
        MORE
    );
    assert_eq!(classify("func f() {\n}"), COMPLETE);
    assert_eq!(classify("func a f() {\n}"), SYNTAX);
}

#[test]
fn test_unterminated_raw_string_needs_more() {
    assert_eq!(classify("a := `"), MORE);
    assert_eq!(classify("a := `line one\nline two"), MORE);
    assert_eq!(classify("a := `done`"), COMPLETE);
}

#[test]
fn test_unterminated_comment_needs_more() {
    assert_eq!(classify("a := 1 /* still"), MORE);
    assert_eq!(classify("/* open"), MORE);
    assert_eq!(classify("/* open\n still open"), MORE);
    assert_eq!(classify("/* closed */"), EMPTY);
}

#[test]
fn test_earlier_error_wins_over_open_comment() {
    assert_eq!(classify("3 4 /* open"), SYNTAX);
}

#[test]
fn test_unterminated_interpreted_string_is_error() {
    assert_eq!(classify("a := \"abc"), SYNTAX);
}

#[test]
fn test_top_level_pointer_store() {
    assert_eq!(classify("*b = 33"), COMPLETE);
}

#[test]
fn test_method_and_literal_forms() {
    assert_eq!(classify("func (s *S) Hi() {\n}"), COMPLETE);
    assert_eq!(classify("func (s *S) Hi() {"), MORE);
    assert_eq!(classify("func() { println(1) }()"), COMPLETE);
}

#[test]
fn test_syntax_error_span_points_at_offender() {
    let interner = StringInterner::new();
    let Classification::SyntaxError {
        code,
        span,
        message,
    } = Classifier::go().classify("3 4", &interner)
    else {
        panic!("expected syntax error");
    };
    assert_eq!(code, ErrorCode::E1001);
    assert_eq!(span, Span::new(2, 3));
    assert!(message.contains("literal 4"), "{message}");
}

#[test]
fn test_leading_whitespace_is_trimmed() {
    assert_eq!(trim_leading("\n\t  x := 1  "), "x := 1  ");
}

/// A tiny arithmetic grammar over single digits, used to check that the
/// classifier only depends on where a grammar fails.
struct Digits;

impl Grammar for Digits {
    type Unit = i64;

    fn parse_unit(&self, source: &str, _: &StringInterner) -> Result<i64, ParseFailure> {
        let chars: Vec<(usize, char)> = source
            .char_indices()
            .filter(|(_, c)| !c.is_whitespace())
            .collect();
        let end = u32::try_from(source.len()).unwrap();
        let fail = |i: usize| match chars.get(i) {
            None => ParseFailure::new(FailureKind::EndOfInput, ErrorCode::E1007, Span::point(end), "eof"),
            Some(&(at, c)) => {
                let at = u32::try_from(at).unwrap();
                ParseFailure::at(Span::new(at, at + 1), ErrorCode::E1001, format!("unexpected {c}"))
            }
        };
        let digit = |i: usize| match chars.get(i) {
            Some((_, c)) if c.is_ascii_digit() => Ok(i64::from(c.to_digit(10).unwrap())),
            _ => Err(fail(i)),
        };
        let mut total = digit(0)?;
        let mut i = 1;
        while i < chars.len() {
            match chars[i].1 {
                '+' => total += digit(i + 1)?,
                '-' => total -= digit(i + 1)?,
                _ => return Err(fail(i)),
            }
            i += 2;
        }
        Ok(total)
    }
}

#[test]
fn test_classifier_is_generic_over_grammar() {
    let interner = StringInterner::new();
    let calc = Classifier::new(Digits);
    assert_eq!(calc.classify("1 + 2", &interner), Classification::Complete(3));
    assert_eq!(calc.classify("1 +", &interner), Classification::NeedMoreInput);
    assert_eq!(calc.classify("  ", &interner), Classification::Empty);
    assert!(matches!(
        calc.classify("1 2", &interner),
        Classification::SyntaxError { .. }
    ));
}

proptest! {
    #[test]
    fn prop_whitespace_is_always_empty(src in "[ \t\r\n]{0,30}") {
        prop_assert_eq!(classify(&src), EMPTY);
    }

    #[test]
    fn prop_classification_is_pure(src in "[a-z0-9 +*/(){}\n:=,;]{0,24}") {
        let interner = StringInterner::new();
        let classifier = Classifier::go();
        let first = classifier.classify(&src, &interner);
        let second = classifier.classify(&src, &interner);
        prop_assert_eq!(first, second);
    }
}
