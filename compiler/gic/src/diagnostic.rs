//! Source positions and terminal rendering of session errors.

use std::fmt;

use gi_ir::{LineIndex, Span};

use crate::SessionError;

/// Where an error points, resolved against the text it was found in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Position {
    /// One-based.
    pub line: u32,
    /// One-based, in chars.
    pub column: u32,
    /// The full text of `line`.
    pub source_line: String,
}

impl Position {
    /// Resolve byte `offset` in `source`.
    pub fn locate(source: &str, offset: u32) -> Self {
        let index = LineIndex::new(source);
        let lc = index.line_col(source, offset);
        Position {
            line: lc.line,
            column: lc.col,
            source_line: index.line_text(source, lc.line).to_string(),
        }
    }

    /// Resolve `span`, which is relative to the suffix of `source` that
    /// starts at byte `base`.
    pub fn of_span(source: &str, base: u32, span: Span) -> Self {
        Position::locate(source, base.saturating_add(span.start))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Render `error` for a terminal:
///
/// ```text
/// 1:3: unexpected literal 4, expected ; [E1001]
///   3 4
///     ^
/// ```
pub fn render(error: &SessionError) -> String {
    let mut out = format!("{error} [{}]", error.code());
    if let Some(position) = error.position() {
        out.push('\n');
        out.push_str(&snippet(position));
    }
    for note in error.related() {
        out.push_str("\n  note: ");
        out.push_str(note);
    }
    out
}

/// The source line and a caret under the offending column. Tabs before
/// the column are kept so the caret lines up.
fn snippet(position: &Position) -> String {
    let pad: String = position
        .source_line
        .chars()
        .take(position.column.saturating_sub(1) as usize)
        .map(|c| if c == '\t' { '\t' } else { ' ' })
        .collect();
    format!("  {}\n  {pad}^", position.source_line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gi_ir::ErrorCode;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_locate_second_line() {
        let pos = Position::locate("a,b := \n ,", 9);
        assert_eq!(pos.line, 2);
        assert_eq!(pos.column, 2);
        assert_eq!(pos.source_line, " ,");
        assert_eq!(pos.to_string(), "2:2");
    }

    #[test]
    fn test_span_is_shifted_by_base() {
        let pos = Position::of_span("  3 4", 2, Span::new(2, 3));
        assert_eq!((pos.line, pos.column), (1, 5));
    }

    #[test]
    fn test_render_with_caret() {
        let error = SessionError::Syntax {
            code: ErrorCode::E1001,
            position: Position::locate("3 4", 2),
            message: "unexpected literal 4".to_string(),
        };
        assert_eq!(
            render(&error),
            "1:3: unexpected literal 4 [E1001]\n  3 4\n    ^"
        );
    }

    #[test]
    fn test_caret_keeps_tabs() {
        let pos = Position::locate("\tx y", 3);
        assert_eq!(snippet(&pos), "  \tx y\n  \t ^");
    }

    #[test]
    fn test_render_without_position() {
        let rendered = render(&SessionError::IncompleteInput);
        assert_eq!(rendered, "unexpected end of input [E1007]");
    }
}
