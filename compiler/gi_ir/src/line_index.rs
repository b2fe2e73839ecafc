//! Byte offset to `line:col` conversion for diagnostics.

use crate::Span;

/// One-based line and column (columns count chars, not bytes).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LineCol {
    pub line: u32,
    pub col: u32,
}

impl std::fmt::Display for LineCol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

/// Start offsets of every line in a source buffer.
#[derive(Clone, Debug)]
pub struct LineIndex {
    line_starts: Vec<u32>,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        for (i, b) in source.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push(u32::try_from(i + 1).unwrap_or(u32::MAX));
            }
        }
        LineIndex { line_starts }
    }

    pub fn line_col(&self, source: &str, offset: u32) -> LineCol {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(exact) => exact,
            Err(next) => next.saturating_sub(1),
        };
        let start = self.line_starts.get(line).copied().unwrap_or(0) as usize;
        let end = (offset as usize).min(source.len());
        let col = source.get(start..end).map_or(0, |s| s.chars().count());
        LineCol {
            line: u32::try_from(line + 1).unwrap_or(u32::MAX),
            col: u32::try_from(col + 1).unwrap_or(u32::MAX),
        }
    }

    /// The text of the one-based `line`, without its newline.
    pub fn line_text<'a>(&self, source: &'a str, line: u32) -> &'a str {
        let idx = line.saturating_sub(1) as usize;
        let Some(&start) = self.line_starts.get(idx) else {
            return "";
        };
        let end = self
            .line_starts
            .get(idx + 1)
            .map_or(source.len(), |&next| next as usize - 1);
        Span::new(start, u32::try_from(end).unwrap_or(u32::MAX)).slice(source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_first_line() {
        let src = "3 4";
        let idx = LineIndex::new(src);
        assert_eq!(idx.line_col(src, 2), LineCol { line: 1, col: 3 });
    }

    #[test]
    fn test_second_line() {
        let src = "a,b := \n ,";
        let idx = LineIndex::new(src);
        assert_eq!(idx.line_col(src, 9), LineCol { line: 2, col: 2 });
        assert_eq!(idx.line_text(src, 2), " ,");
        assert_eq!(idx.line_text(src, 1), "a,b := ");
    }

    #[test]
    fn test_offset_at_line_start() {
        let src = "x\ny";
        let idx = LineIndex::new(src);
        assert_eq!(idx.line_col(src, 2), LineCol { line: 2, col: 1 });
    }
}
