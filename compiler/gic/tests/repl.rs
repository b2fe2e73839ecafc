// Test code uses unwrap/expect for clarity - panics provide good test failure messages
#![allow(clippy::unwrap_used, clippy::expect_used)]

//! The interactive loop driven from in-memory input.

use gic::commands::{run_repl, ReplOptions};
use gic::IncrementalSession;
use pretty_assertions::assert_eq;

struct Transcript {
    out: String,
    err: String,
}

fn run(input: &str, options: ReplOptions) -> Transcript {
    let mut session = IncrementalSession::default();
    let mut out = Vec::new();
    let mut err = Vec::new();
    run_repl(&mut session, options, input.as_bytes(), &mut out, &mut err).unwrap();
    Transcript {
        out: String::from_utf8(out).unwrap(),
        err: String::from_utf8(err).unwrap(),
    }
}

const SILENT: ReplOptions = ReplOptions {
    banner: false,
    prompts: false,
};

#[test]
fn test_lines_are_translated_in_order() {
    let t = run("a := 10\nfunc f() int {\n\treturn a\n}\nf()\n", SILENT);
    assert_eq!(
        t.out,
        "a = 10LL;\nf = function()\n    return a;\nend;\nf();\n"
    );
    assert_eq!(t.err, "");
}

#[test]
fn test_prompts_follow_continuation() {
    let options = ReplOptions {
        banner: false,
        prompts: true,
    };
    let t = run("if true {\n}\n", options);
    assert!(t.out.starts_with("gi> ... "), "{}", t.out);
    assert!(t.out.ends_with("end\ngi> "), "{}", t.out);
}

#[test]
fn test_syntax_error_is_rendered() {
    let t = run("3 4\nx := 1\n", SILENT);
    assert_eq!(t.out, "x = 1LL;\n");
    assert!(t.err.starts_with("1:3: "), "{}", t.err);
    assert!(t.err.contains("[E1001]\n  3 4\n    ^\n"), "{}", t.err);
}

#[test]
fn test_reset_command() {
    let t = run("a := 1\n:reset\nb := a\n", SILENT);
    assert_eq!(t.out, "a = 1LL;\n");
    assert!(t.err.starts_with("session reset\n"), "{}", t.err);
    assert!(t.err.contains("[E2001]"), "{}", t.err);
}

#[test]
fn test_quit_stops_reading() {
    let t = run("a := 1\n:quit\nb := 2\n", SILENT);
    assert_eq!(t.out, "a = 1LL;\n");
}

#[test]
fn test_colon_lines_inside_raw_string_are_source() {
    let t = run("a := `\n:key\n:quit\n`\n", SILENT);
    assert_eq!(t.out, "a = \"\\n:key\\n:quit\\n\";\n");
    assert_eq!(t.err, "");
}

#[test]
fn test_help_and_unknown_commands() {
    let t = run(":help\n:frobnicate\n", SILENT);
    assert!(t.out.contains(":reset"), "{}", t.out);
    assert_eq!(t.err, "unknown command :frobnicate (try :help)\n");
}

#[test]
fn test_unfinished_input_at_end() {
    let t = run("for {\n", SILENT);
    assert_eq!(t.out, "");
    assert_eq!(t.err, "unexpected end of input [E1007]\n");
}

#[test]
fn test_banner() {
    let options = ReplOptions {
        banner: true,
        prompts: false,
    };
    let t = run("", options);
    assert!(t.out.starts_with("gi "), "{}", t.out);
    assert!(t.out.contains(":help"), "{}", t.out);
}

#[test]
fn test_windows_line_endings() {
    let t = run("a := 1\r\nb := a\r\n", SILENT);
    assert_eq!(t.out, "a = 1LL;\nb = a;\n");
}
