//! The interactive loop.

use std::io::{self, BufRead, Write};

use crate::diagnostic::render;
use crate::{IncrementalSession, SessionError, SessionResult};

pub const PROMPT: &str = "gi> ";
pub const CONTINUATION_PROMPT: &str = "... ";

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ReplOptions {
    pub banner: bool,
    /// Write prompts; off when input is not a terminal.
    pub prompts: bool,
}

impl Default for ReplOptions {
    fn default() -> Self {
        ReplOptions {
            banner: true,
            prompts: true,
        }
    }
}

/// A line starting with `:` at the start of a construct is a shell
/// command, not source.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum ShellCommand<'a> {
    Help,
    Reset,
    Quit,
    Unknown(&'a str),
}

impl<'a> ShellCommand<'a> {
    fn parse(line: &'a str) -> Option<Self> {
        let command = line.trim().strip_prefix(':')?;
        Some(match command {
            "help" | "h" | "?" => ShellCommand::Help,
            "reset" => ShellCommand::Reset,
            "quit" | "q" | "exit" => ShellCommand::Quit,
            other => ShellCommand::Unknown(other),
        })
    }
}

/// Read lines from `input` until end of input or `:quit`, writing Lua to
/// `out` and rendered errors to `err`.
pub fn run_repl<R, W, E>(
    session: &mut IncrementalSession,
    options: ReplOptions,
    mut input: R,
    out: &mut W,
    err: &mut E,
) -> io::Result<()>
where
    R: BufRead,
    W: Write,
    E: Write,
{
    if options.banner {
        writeln!(out, "gi {} (Go to Lua)", env!("CARGO_PKG_VERSION"))?;
        writeln!(out, "Type :help for commands.")?;
    }

    let mut line = String::new();
    loop {
        if options.prompts {
            let prompt = if session.is_continuation() {
                CONTINUATION_PROMPT
            } else {
                PROMPT
            };
            write!(out, "{prompt}")?;
            out.flush()?;
        }

        line.clear();
        if input.read_line(&mut line)? == 0 {
            break;
        }
        let text = line.trim_end_matches(['\n', '\r']);

        // Mid-construct, a line starting with `:` is source text, for
        // example inside a raw string.
        let command = if session.is_continuation() {
            None
        } else {
            ShellCommand::parse(text)
        };
        if let Some(command) = command {
            match command {
                ShellCommand::Quit => break,
                ShellCommand::Help => print_help(out)?,
                ShellCommand::Reset => {
                    session.reset();
                    writeln!(err, "session reset")?;
                }
                ShellCommand::Unknown(name) => {
                    writeln!(err, "unknown command :{name} (try :help)")?;
                }
            }
            continue;
        }

        match session.submit(text) {
            Ok(SessionResult::Waiting) => {}
            Ok(SessionResult::Translated(lua)) => {
                out.write_all(lua.as_bytes())?;
                out.flush()?;
            }
            Err(error) => writeln!(err, "{}", render(&error))?,
        }
    }

    if !session.pending().is_empty() {
        writeln!(err, "{}", render(&SessionError::IncompleteInput))?;
        session.discard_pending();
    }
    Ok(())
}

fn print_help<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "Enter Go declarations, statements or expressions.")?;
    writeln!(out, "Unfinished input continues on the next line.")?;
    writeln!(out)?;
    writeln!(out, "  =expr     print the value of expr, even a call")?;
    writeln!(out, "  :reset    forget all declarations")?;
    writeln!(out, "  :help     show this message")?;
    writeln!(out, "  :quit     leave")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_shell_commands() {
        assert_eq!(ShellCommand::parse(":quit"), Some(ShellCommand::Quit));
        assert_eq!(ShellCommand::parse("  :reset "), Some(ShellCommand::Reset));
        assert_eq!(ShellCommand::parse(":?"), Some(ShellCommand::Help));
        assert_eq!(ShellCommand::parse(":x"), Some(ShellCommand::Unknown("x")));
        assert_eq!(ShellCommand::parse("a := 1"), None);
    }
}
