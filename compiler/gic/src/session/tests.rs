#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use pretty_assertions::assert_eq;

fn translated(result: Result<SessionResult, SessionError>) -> String {
    match result {
        Ok(SessionResult::Translated(lua)) => lua,
        other => panic!("expected translation, got {other:?}"),
    }
}

#[test]
fn test_accumulator_joins_lines() {
    let mut acc = SourceAccumulator::new();
    assert!(acc.is_empty());
    acc.append("a,b := ");
    acc.append(" ,");
    assert_eq!(acc.pending(), "a,b := \n ,");

    let taken = acc.take();
    assert!(acc.is_empty());
    acc.restore(taken);
    assert_eq!(acc.pending(), "a,b := \n ,");
    acc.clear();
    assert_eq!(acc.pending(), "");
}

#[test]
fn test_print_prefix() {
    assert_eq!(print_prefix("=f()"), ("f()", true));
    assert_eq!(print_prefix("  = 1"), (" 1", true));
    assert_eq!(print_prefix("== 1"), ("== 1", false));
    assert_eq!(print_prefix("a = 1"), ("a = 1", false));
}

#[test]
fn test_waiting_keeps_buffer() {
    let mut session = IncrementalSession::default();
    assert_eq!(session.submit("func f() int {"), Ok(SessionResult::Waiting));
    assert!(session.is_continuation());
    assert_eq!(session.submit("return 1"), Ok(SessionResult::Waiting));
    assert_eq!(session.pending(), "func f() int {\nreturn 1");

    let lua = translated(session.submit("}"));
    assert_eq!(lua, "f = function()\n    return 1LL;\nend;\n");
    assert!(!session.is_continuation());
    assert_eq!(session.pending(), "");
}

#[test]
fn test_syntax_error_clears_buffer() {
    let mut session = IncrementalSession::default();
    assert_eq!(session.submit("a,b := "), Ok(SessionResult::Waiting));
    let err = session.submit(" ,").unwrap_err();
    let SessionError::Syntax { position, .. } = &err else {
        panic!("expected syntax error, got {err:?}");
    };
    assert_eq!((position.line, position.column), (2, 2));
    assert_eq!(session.pending(), "");
    assert!(!session.is_continuation());
    assert_eq!(session.submit(""), Ok(SessionResult::Translated(String::new())));
}

#[test]
fn test_position_accounts_for_leading_whitespace() {
    let mut session = IncrementalSession::default();
    let err = session.submit("   3 4").unwrap_err();
    assert_eq!(err.code(), ErrorCode::E1001);
    assert_eq!(err.to_string().split(':').take(2).collect::<Vec<_>>(), ["1", "6"]);
}

#[test]
fn test_print_prefix_prints_calls() {
    let mut session = IncrementalSession::default();
    translated(session.submit("func two() int { return 2 }"));
    assert_eq!(translated(session.submit("two()")), "two();\n");
    assert_eq!(
        translated(session.submit("=two()")),
        "__gi_ans = two(); __gi_printQuoted(__gi_ans);\n"
    );
}

#[test]
fn test_calculator_mode() {
    let mut session = IncrementalSession::new(SessionConfig {
        calculator_mode: true,
        ..SessionConfig::default()
    });
    translated(session.submit("func two() int { return 2 }"));
    assert_eq!(
        translated(session.submit("two()")),
        "__gi_ans = two(); __gi_printQuoted(__gi_ans);\n"
    );
}

#[test]
fn test_translate_one_reports_incomplete_input() {
    let mut session = IncrementalSession::default();
    assert_eq!(
        session.translate_one("type A struct {"),
        Err(SessionError::IncompleteInput)
    );
    assert_eq!(session.pending(), "");
    assert_eq!(session.translate_one("a := 1\nb := a"), Ok("a = 1LL;\nb = a;\n".to_string()));
}

#[test]
fn test_translate_one_leaves_pending_alone() {
    let mut session = IncrementalSession::default();
    assert_eq!(session.submit("for {"), Ok(SessionResult::Waiting));
    assert_eq!(session.translate_one("x := 2"), Ok("x = 2LL;\n".to_string()));
    assert_eq!(session.pending(), "for {");
}

#[test]
fn test_partial_mode_keeps_earlier_names() {
    let mut session = IncrementalSession::default();
    let err = session.translate_one("a := 1\nb := missing").unwrap_err();
    assert_eq!(err.code(), ErrorCode::E2001);
    assert!(session.lookup("a").is_some());
    assert!(session.lookup("b").is_none());
}

#[test]
fn test_atomic_mode_restores_declarations() {
    let mut session = IncrementalSession::new(SessionConfig {
        declaration_mode: DeclarationMode::Atomic,
        ..SessionConfig::default()
    });
    translated(session.submit("a := \"old\""));
    let err = session.translate_one("a := 1\nb := missing").unwrap_err();
    assert_eq!(err.code(), ErrorCode::E2001);
    assert!(session.lookup("b").is_none());

    // `a` is still the string from before the failed construct.
    assert_eq!(
        translated(session.submit("a + \"!\"")),
        "__gi_ans = a .. \"!\"; __gi_printQuoted(__gi_ans);\n"
    );
}

#[test]
fn test_field_method_collision_is_a_conflict() {
    let mut session = IncrementalSession::default();
    translated(session.submit("type T struct { Hi int }"));
    let err = session.submit("func (t T) Hi() {}").unwrap_err();
    assert!(
        matches!(err, SessionError::RedeclarationConflict { .. }),
        "{err:?}"
    );
    assert_eq!(err.code(), ErrorCode::E2008);
    assert!(session.lookup_method("T", "Hi").is_none());
}

#[test]
fn test_reset_forgets_everything() {
    let mut session = IncrementalSession::default();
    translated(session.submit("a := 10"));
    assert_eq!(session.submit("if true {"), Ok(SessionResult::Waiting));
    session.reset();
    assert_eq!(session.pending(), "");
    assert!(session.lookup("a").is_none());
    assert!(session.table().is_empty());
    let err = session.submit("b := a").unwrap_err();
    assert_eq!(err.code(), ErrorCode::E2001);
}

#[test]
fn test_discard_pending_keeps_declarations() {
    let mut session = IncrementalSession::default();
    translated(session.submit("a := 10"));
    assert_eq!(session.submit("switch {"), Ok(SessionResult::Waiting));
    session.discard_pending();
    assert!(!session.is_continuation());
    assert_eq!(translated(session.submit("b := a")), "b = a;\n");
}

#[test]
fn test_checker_defects_surface_as_internal() {
    let err = TypeCheckError::new(
        ErrorCode::E9001,
        gi_ir::Span::new(0, 4),
        "function declaration inside a block",
    );
    let err = SessionError::from_check(err, "func", 0);
    assert!(matches!(err, SessionError::Internal { .. }), "{err:?}");
    assert_eq!(err.code(), ErrorCode::E9001);
    assert!(!err.is_syntax());

    let err = TypeCheckError::new(ErrorCode::E2001, gi_ir::Span::new(0, 4), "undefined: func");
    let err = SessionError::from_check(err, "func", 0);
    assert!(matches!(err, SessionError::TypeCheck { .. }), "{err:?}");
}
