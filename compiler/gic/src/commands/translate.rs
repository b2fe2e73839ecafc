//! One-shot translation of a whole source file.

use gi_types::DeclKind;
use tracing::debug;

use crate::{IncrementalSession, SessionConfig, SessionError};

/// Translate `source` as one unit. A program that declares `func main()`
/// gets a call to it appended.
pub fn translate_source(source: &str, config: SessionConfig) -> Result<String, SessionError> {
    let mut session = IncrementalSession::new(config);
    let mut lua = session.translate_one(source)?;

    let has_main = session.lookup("main").is_some_and(|decl| {
        matches!(decl.kind, DeclKind::Func { receiver: None })
    });
    if has_main {
        debug!("appending call to main");
        lua.push_str("main();\n");
    }
    Ok(lua)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_program_calls_main() {
        let src = "package main\n\nfunc main() {\n\tprintln(\"hi\")\n}\n";
        let lua = translate_source(src, SessionConfig::default()).unwrap();
        assert_eq!(lua, "main = function()\n    print(\"hi\");\nend;\nmain();\n");
    }

    #[test]
    fn test_fragment_without_main() {
        let lua = translate_source("x := 1\n", SessionConfig::default()).unwrap();
        assert_eq!(lua, "x = 1LL;\n");
    }

    #[test]
    fn test_incomplete_file() {
        let err = translate_source("func f() {\n", SessionConfig::default()).unwrap_err();
        assert_eq!(err, SessionError::IncompleteInput);
    }
}
