// Test code uses unwrap/expect for clarity - panics provide good test failure messages
#![allow(clippy::unwrap_used, clippy::expect_used)]

//! End-to-end behavior of an incremental session: classification of
//! partial input, replace semantics across submissions, and the Lua that
//! comes out.

use gic::{IncrementalSession, SessionError, SessionResult};
use gi_ir::ErrorCode;
use pretty_assertions::assert_eq;

#[derive(Debug, PartialEq, Eq)]
enum Outcome {
    Empty,
    Waiting,
    Translated,
    Syntax,
    Other(ErrorCode),
}

/// Submit `lines` one by one to a fresh session and report the last result.
fn outcome(lines: &[&str]) -> Outcome {
    let mut session = IncrementalSession::default();
    outcome_in(&mut session, lines)
}

fn outcome_in(session: &mut IncrementalSession, lines: &[&str]) -> Outcome {
    let mut last = Outcome::Empty;
    for line in lines {
        last = match session.submit(line) {
            Ok(SessionResult::Waiting) => Outcome::Waiting,
            Ok(SessionResult::Translated(lua)) if lua.is_empty() => Outcome::Empty,
            Ok(SessionResult::Translated(_)) => Outcome::Translated,
            Err(SessionError::Syntax { .. }) => Outcome::Syntax,
            Err(other) => Outcome::Other(other.code()),
        };
    }
    last
}

fn lua(session: &mut IncrementalSession, line: &str) -> String {
    match session.submit(line) {
        Ok(SessionResult::Translated(lua)) => lua,
        other => panic!("{line:?}: expected translation, got {other:?}"),
    }
}

#[test]
fn test_arithmetic_classification() {
    assert_eq!(outcome(&["3 * 4"]), Outcome::Translated);
    assert_eq!(outcome(&["3 * "]), Outcome::Waiting);
    assert_eq!(outcome(&["3 * *"]), Outcome::Waiting);
    assert_eq!(outcome(&["3 4"]), Outcome::Syntax);
    assert_eq!(outcome(&[""]), Outcome::Empty);
}

#[test]
fn test_open_blocks_wait() {
    for line in [
        "type A struct {",
        "switch {",
        "select {",
        "if true {",
        "for {",
        "go func() {",
    ] {
        assert_eq!(outcome(&[line]), Outcome::Waiting, "{line}");
    }
}

#[test]
fn test_multi_assignment() {
    assert_eq!(outcome(&["a, b := 3, 4"]), Outcome::Translated);
    assert_eq!(outcome(&["a,b :=3,"]), Outcome::Waiting);
    assert_eq!(outcome(&["a,b := ", " ,"]), Outcome::Syntax);
    assert_eq!(outcome(&["a,b :=3, ", " 4"]), Outcome::Translated);
}

#[test]
fn test_continued_expressions() {
    assert_eq!(outcome(&["2 / 3 * ", " 1"]), Outcome::Translated);
    assert_eq!(outcome(&["2 / 3 * ", ""]), Outcome::Waiting);
    assert_eq!(outcome(&["2 / 3 * ", " *"]), Outcome::Waiting);
    assert_eq!(outcome(&["2 / 3 * ", " ++"]), Outcome::Syntax);
    assert_eq!(outcome(&["2 / ++"]), Outcome::Syntax);
}

#[test]
fn test_function_headers() {
    assert_eq!(
        outcome(&["func f (", " x float64,", " y float64,", " ) (float64,"]),
        Outcome::Waiting
    );
    assert_eq!(outcome(&["func f("]), Outcome::Waiting);
    assert_eq!(outcome(&["func f() {", "}"]), Outcome::Translated);
    assert_eq!(outcome(&["func a f() {", "}"]), Outcome::Syntax);
}

#[test]
fn test_raw_string_waits_for_closing_quote() {
    let mut session = IncrementalSession::default();
    assert_eq!(outcome_in(&mut session, &["a := `"]), Outcome::Waiting);
    assert_eq!(
        lua(&mut session, "two lines`"),
        "a = \"\\ntwo lines\";\n"
    );
}

#[test]
fn test_store_through_pointer_at_prompt() {
    let mut session = IncrementalSession::default();
    lua(&mut session, "x := 1");
    lua(&mut session, "b := &x");
    assert_eq!(outcome_in(&mut session, &["*b = 33"]), Outcome::Translated);
}

#[test]
fn test_empty_after_finished_construct() {
    let mut session = IncrementalSession::default();
    assert_eq!(outcome_in(&mut session, &["3 4"]), Outcome::Syntax);
    assert_eq!(outcome_in(&mut session, &[""]), Outcome::Empty);
    assert_eq!(outcome_in(&mut session, &["x := 1"]), Outcome::Translated);
    assert_eq!(outcome_in(&mut session, &["   "]), Outcome::Empty);
}

#[test]
fn test_method_redefinition_takes_effect() {
    let mut session = IncrementalSession::default();
    lua(&mut session, "type S struct{}");
    lua(&mut session, r#"func (s *S) Hi() { println("hi") }"#);
    lua(&mut session, "var v S");
    assert_eq!(lua(&mut session, "v.Hi()"), "v:Hi();\n");
    let objects = session.table().len();

    assert_eq!(
        lua(&mut session, r#"func (s *S) Hi() { println("hello") }"#),
        "__addMethod(__type__.S, \"Hi\", true, function(s)\n    print(\"hello\");\nend);\n"
    );
    assert_eq!(lua(&mut session, "v.Hi()"), "v:Hi();\n");

    // The old method left the object index and the method set.
    assert_eq!(session.table().len(), objects);
    let methods = session.lookup("S").unwrap().methods().unwrap();
    assert_eq!(methods.len(), 1);
    assert!(session.lookup_method("S", "Hi").is_some());
}

#[test]
fn test_redeclared_name_resolves_to_latest() {
    let mut session = IncrementalSession::default();
    lua(&mut session, "func f() int { return 1 }");
    lua(&mut session, "func f() string { return \"one\" }");
    assert_eq!(
        lua(&mut session, "f() + \"!\""),
        "__gi_ans = f() .. \"!\"; __gi_printQuoted(__gi_ans);\n"
    );
    let err = session.submit("f() + 1").unwrap_err();
    assert!(matches!(err, SessionError::TypeCheck { .. }), "{err:?}");
}

#[test]
fn test_declarations_persist_across_submissions() {
    let mut session = IncrementalSession::default();
    assert_eq!(lua(&mut session, "a := 10"), "a = 10LL;\n");
    assert_eq!(
        lua(&mut session, "func adder(a,b int) int {return a+b}"),
        "adder = function(a, b)\n    return a + b;\nend;\n"
    );
    assert_eq!(lua(&mut session, "sum := adder(5,5)"), "sum = adder(5LL, 5LL);\n");
    assert_eq!(lua(&mut session, "sum2 := adder(a,a)"), "sum2 = adder(a, a);\n");
}

#[test]
fn test_type_errors_are_not_syntax_errors() {
    let mut session = IncrementalSession::default();
    let err = session.submit("x := undefined").unwrap_err();
    assert!(matches!(err, SessionError::TypeCheck { .. }), "{err:?}");
    assert_eq!(err.code(), ErrorCode::E2001);
    assert!(!err.is_syntax());
    assert_eq!(session.pending(), "");
}

#[test]
fn test_field_method_collision_is_never_replaced() {
    let mut session = IncrementalSession::default();
    lua(&mut session, "type P struct { X int }");
    let err = session.submit("func (p P) X() int { return 1 }").unwrap_err();
    assert_eq!(err.code(), ErrorCode::E2008);
    assert!(matches!(err, SessionError::RedeclarationConflict { .. }));
    let err = session.submit("func (p P) X() int { return 2 }").unwrap_err();
    assert_eq!(err.code(), ErrorCode::E2008);
}

#[test]
fn test_sessions_are_independent() {
    let mut first = IncrementalSession::default();
    let mut second = IncrementalSession::default();
    lua(&mut first, "a := 1");
    assert!(second.lookup("a").is_none());
    let err = second.submit("b := a").unwrap_err();
    assert_eq!(err.code(), ErrorCode::E2001);
    assert_eq!(lua(&mut first, "b := a"), "b = a;\n");
}

#[test]
fn test_redeclaration_values_see_previous_bindings() {
    let mut session = IncrementalSession::default();
    lua(&mut session, "x := 1");
    assert_eq!(lua(&mut session, "x, y := \"s\", x"), "x, y = \"s\", x;\n");
    assert_eq!(outcome_in(&mut session, &["var z int = y"]), Outcome::Translated);
    assert_eq!(outcome_in(&mut session, &["var w string = x"]), Outcome::Translated);
}

#[test]
fn test_var_group_values_see_previous_bindings() {
    let mut session = IncrementalSession::default();
    lua(&mut session, "var a = 2");
    lua(&mut session, "var a, b = \"s\", a");
    assert_eq!(outcome_in(&mut session, &["var c int = b"]), Outcome::Translated);
}

#[test]
fn test_open_block_comment_waits() {
    let mut session = IncrementalSession::default();
    assert_eq!(outcome_in(&mut session, &["/* open"]), Outcome::Waiting);
    assert!(session.is_continuation());
    assert_eq!(outcome_in(&mut session, &["*/"]), Outcome::Empty);
    assert_eq!(session.pending(), "");
}
