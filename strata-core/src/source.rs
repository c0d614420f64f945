//! Source inputs of a compilation.

use std::{fmt, path::Path};

use eyre::{Result, WrapErr};

/// A 1-based line/column position in a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Byte offsets of every line start, for offset → line/column lookup.
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(text.match_indices('\n').map(|(i, _)| i + 1));
        Self { line_starts }
    }

    /// Resolve a byte offset. Columns count characters, not bytes.
    pub fn location(&self, text: &str, offset: usize) -> Location {
        let offset = offset.min(text.len());
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        let start = self.line_starts[line];
        let column = text
            .get(start..offset)
            .map_or(offset - start, |prefix| prefix.chars().count());
        Location {
            line: line + 1,
            column: column + 1,
        }
    }

    /// Number of lines in the indexed text.
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

/// A named source text handed to the frontend.
#[derive(Debug, Clone)]
pub struct SourceFile {
    name: String,
    text: String,
    lines: LineIndex,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        let text = text.into();
        let lines = LineIndex::new(&text);
        Self {
            name: name.into(),
            text,
            lines,
        }
    }

    /// Read a source file from disk, naming it after its path.
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read source file '{}'", path.display()))?;
        Ok(Self::new(path.display().to_string(), text))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn line_count(&self) -> usize {
        self.lines.line_count()
    }

    pub fn location(&self, offset: usize) -> Location {
        self.lines.location(&self.text, offset)
    }

    /// Describe an offset as `name:line:column`.
    pub fn describe(&self, offset: usize) -> String {
        format!("{}:{}", self.name, self.location(offset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_first_line() {
        let file = SourceFile::new("main.st", "let x = 1;");
        assert_eq!(file.location(4), Location { line: 1, column: 5 });
    }

    #[test]
    fn test_location_after_newlines() {
        let file = SourceFile::new("main.st", "let x = 1;\n\nlet y = 2;\n");
        assert_eq!(file.location(12), Location { line: 3, column: 1 });
        assert_eq!(file.location(16), Location { line: 3, column: 5 });
        assert_eq!(file.describe(16), "main.st:3:5");
    }

    #[test]
    fn test_location_counts_characters() {
        let file = SourceFile::new("main.st", "let s = \"é\"; x");
        // 'x' sits after a two-byte character
        let offset = file.text().find('x').unwrap();
        assert_eq!(file.location(offset).column, 14);
    }

    #[test]
    fn test_location_clamps_past_end() {
        let file = SourceFile::new("main.st", "ab");
        assert_eq!(file.location(99), Location { line: 1, column: 3 });
    }

    #[test]
    fn test_line_count() {
        assert_eq!(SourceFile::new("a", "").line_count(), 1);
        assert_eq!(SourceFile::new("a", "x\ny\n").line_count(), 3);
    }
}
