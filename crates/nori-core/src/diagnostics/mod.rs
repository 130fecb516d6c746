//! Diagnostics: severities, source locations, suggestions and the sink
//! that collects findings from the lexer, parser and lint rules.

pub mod renderer;

pub use renderer::{DiagnosticRenderer, OutputFormat};

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// How serious a finding is. Ordering matters: at equal source offsets,
/// diagnostics sort most-severe first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Note,
    Help,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Note => "note",
            Severity::Help => "help",
        }
    }

    /// True when `self` is at least as severe as `threshold`.
    pub fn is_at_least(self, threshold: Severity) -> bool {
        self <= threshold
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved source location: byte span plus 1-based line/column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub file: PathBuf,
    pub line: usize,
    pub column: usize,
    pub end_line: Option<usize>,
    pub end_column: Option<usize>,
    pub offset: usize,
    pub length: usize,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file.display(), self.line, self.column)
    }
}

/// Whether a suggested fix can be applied without review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Applicability {
    /// The fix is semantics-preserving and safe to apply automatically.
    Always,
    /// The fix is probably right but may change behavior.
    MaybeIncorrect,
}

/// A machine-applicable replacement attached to a diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeSuggestion {
    pub message: String,
    pub replacement: String,
    pub location: Location,
    pub applicability: Applicability,
}

/// A single finding with a stable `category/name` code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub code: String,
    pub severity: Severity,
    pub message: String,
    pub location: Location,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<CodeSuggestion>,
}

impl Diagnostic {
    pub fn new(
        code: impl Into<String>,
        severity: Severity,
        message: impl Into<String>,
        location: Location,
    ) -> Self {
        Self {
            code: code.into(),
            severity,
            message: message.into(),
            location,
            suggestions: Vec::new(),
        }
    }

    pub fn error(code: impl Into<String>, message: impl Into<String>, location: Location) -> Self {
        Self::new(code, Severity::Error, message, location)
    }

    pub fn warning(
        code: impl Into<String>,
        message: impl Into<String>,
        location: Location,
    ) -> Self {
        Self::new(code, Severity::Warning, message, location)
    }

    pub fn with_suggestion(mut self, suggestion: CodeSuggestion) -> Self {
        self.suggestions.push(suggestion);
        self
    }
}

/// Maps byte offsets to 1-based line/column pairs.
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<usize>,
    len: usize,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        for (i, b) in source.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push(i + 1);
            }
        }
        Self {
            line_starts,
            len: source.len(),
        }
    }

    /// 1-based (line, column) for a byte offset. Offsets past the end clamp
    /// to the final position.
    pub fn line_col(&self, offset: usize) -> (usize, usize) {
        let offset = offset.min(self.len);
        let line = self
            .line_starts
            .partition_point(|&start| start <= offset)
            .saturating_sub(1);
        (line + 1, offset - self.line_starts[line] + 1)
    }

    /// Build a `Location` for a byte span in `file`.
    pub fn location(&self, file: impl Into<PathBuf>, span: std::ops::Range<usize>) -> Location {
        let (line, column) = self.line_col(span.start);
        let (end_line, end_column) = self.line_col(span.end);
        Location {
            file: file.into(),
            line,
            column,
            end_line: Some(end_line),
            end_column: Some(end_column),
            offset: span.start,
            length: span.end.saturating_sub(span.start),
        }
    }
}

/// Append-only collector. Producers push in any order; `into_sorted`
/// yields diagnostics ordered by source position, then severity.
#[derive(Debug, Default)]
pub struct DiagnosticSink {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn extend(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        self.diagnostics.extend(diagnostics);
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    /// The most severe severity present, if any.
    pub fn max_severity(&self) -> Option<Severity> {
        self.diagnostics.iter().map(|d| d.severity).min()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    pub fn into_sorted(mut self) -> Vec<Diagnostic> {
        self.diagnostics
            .sort_by_key(|d| (d.location.offset, d.severity));
        self.diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_ordering() {
        assert!(Severity::Error < Severity::Warning);
        assert!(Severity::Warning.is_at_least(Severity::Note));
        assert!(!Severity::Help.is_at_least(Severity::Warning));
    }

    #[test]
    fn line_index_basic() {
        let index = LineIndex::new("ab\ncd\n");
        assert_eq!(index.line_col(0), (1, 1));
        assert_eq!(index.line_col(2), (1, 3));
        assert_eq!(index.line_col(3), (2, 1));
        assert_eq!(index.line_col(5), (2, 3));
        // clamped past EOF
        assert_eq!(index.line_col(100), (3, 1));
    }

    #[test]
    fn line_index_location_span() {
        let index = LineIndex::new("echo 1;\necho 2;\n");
        let loc = index.location("a.php", 8..14);
        assert_eq!(loc.line, 2);
        assert_eq!(loc.column, 1);
        assert_eq!(loc.end_line, Some(2));
        assert_eq!(loc.end_column, Some(7));
        assert_eq!(loc.length, 6);
    }

    #[test]
    fn sink_sorts_by_offset_then_severity() {
        let mut sink = DiagnosticSink::new();
        let at = |offset: usize| Location {
            offset,
            ..Location::default()
        };
        sink.push(Diagnostic::warning("b", "later", at(10)));
        sink.push(Diagnostic::warning("c", "same spot, less severe", at(3)));
        sink.push(Diagnostic::error("a", "same spot, more severe", at(3)));

        let sorted = sink.into_sorted();
        assert_eq!(sorted[0].code, "a");
        assert_eq!(sorted[1].code, "c");
        assert_eq!(sorted[2].code, "b");
    }

    #[test]
    fn max_severity_picks_worst() {
        let mut sink = DiagnosticSink::new();
        assert_eq!(sink.max_severity(), None);
        sink.push(Diagnostic::new(
            "x",
            Severity::Help,
            "h",
            Location::default(),
        ));
        sink.push(Diagnostic::warning("y", "w", Location::default()));
        assert_eq!(sink.max_severity(), Some(Severity::Warning));
    }
}
