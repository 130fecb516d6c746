//! Terminal and JSON rendering for diagnostics

use std::fs;

use super::{Applicability, CodeSuggestion, Diagnostic, Location, Severity};
use crate::console::{Color, Console};

/// Output format for rendered diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text with code frames
    Text,
    /// Compact JSON for programmatic consumption
    Json,
    /// JSON with pretty-printing
    JsonPretty,
}

pub struct DiagnosticRenderer {
    console: Console,
    output_format: OutputFormat,
}

impl DiagnosticRenderer {
    pub fn new() -> Self {
        Self {
            console: Console::new(),
            output_format: OutputFormat::Text,
        }
    }

    pub fn no_colors() -> Self {
        Self {
            console: Console::no_colors(),
            output_format: OutputFormat::Text,
        }
    }

    pub fn with_format(format: OutputFormat) -> Self {
        let console = match format {
            OutputFormat::Json | OutputFormat::JsonPretty => Console::no_colors(),
            OutputFormat::Text => Console::new(),
        };
        Self {
            console,
            output_format: format,
        }
    }

    pub fn set_colors(&mut self, enabled: bool) {
        if !enabled {
            self.console = Console::no_colors();
        }
    }

    pub fn render(&self, diagnostic: &Diagnostic) -> String {
        match self.output_format {
            OutputFormat::Text => self.render_text(diagnostic),
            OutputFormat::Json => self.render_json(std::slice::from_ref(diagnostic), false),
            OutputFormat::JsonPretty => self.render_json(std::slice::from_ref(diagnostic), true),
        }
    }

    pub fn render_diagnostics(&self, diagnostics: &[Diagnostic]) -> String {
        match self.output_format {
            OutputFormat::Text => {
                let mut output = String::new();
                for (i, diagnostic) in diagnostics.iter().enumerate() {
                    if i > 0 {
                        output.push('\n');
                    }
                    output.push_str(&self.render_text(diagnostic));
                }
                output
            }
            OutputFormat::Json => self.render_json(diagnostics, false),
            OutputFormat::JsonPretty => self.render_json(diagnostics, true),
        }
    }

    fn render_json(&self, diagnostics: &[Diagnostic], pretty: bool) -> String {
        let result = if pretty {
            serde_json::to_string_pretty(diagnostics)
        } else {
            serde_json::to_string(diagnostics)
        };
        result.unwrap_or_else(|e| format!("{{\"error\": \"failed to serialize: {e}\"}}"))
    }

    fn render_text(&self, diagnostic: &Diagnostic) -> String {
        let mut output = String::new();

        output.push_str(&self.render_header(diagnostic));
        output.push('\n');

        match self.render_code_frame(diagnostic) {
            Some(frame) => output.push_str(&frame),
            None => {
                output.push_str(&format!(
                    "  {} {}\n",
                    self.console.colorize("→", Color::Blue),
                    self.console
                        .colorize(&diagnostic.location.to_string(), Color::Dim)
                ));
            }
        }

        for suggestion in &diagnostic.suggestions {
            output.push_str(&self.render_suggestion(suggestion));
        }

        output
    }

    fn severity_color(severity: Severity) -> Color {
        match severity {
            Severity::Error => Color::Red,
            Severity::Warning => Color::Yellow,
            Severity::Note => Color::Blue,
            Severity::Help => Color::Dim,
        }
    }

    fn render_header(&self, diagnostic: &Diagnostic) -> String {
        let severity = self.console.colorize(
            diagnostic.severity.as_str(),
            Self::severity_color(diagnostic.severity),
        );
        let code = self
            .console
            .colorize(&format!("[{}]", diagnostic.code), Color::Dim);
        format!(
            "{}{}: {}",
            severity,
            code,
            self.console.colorize(&diagnostic.message, Color::Bold)
        )
    }

    /// A code frame with two lines of context around the finding.
    fn render_code_frame(&self, diagnostic: &Diagnostic) -> Option<String> {
        let location = &diagnostic.location;
        let source = fs::read_to_string(&location.file).ok()?;
        let lines: Vec<&str> = source.lines().collect();
        if location.line == 0 || location.line > lines.len() {
            return None;
        }

        let error_line = location.line;
        let start_line = error_line.saturating_sub(2).max(1);
        let end_line = (error_line + 2).min(lines.len());
        let gutter_width = end_line.to_string().len();
        let highlight = Self::severity_color(diagnostic.severity);

        let mut frame = String::new();
        frame.push_str(&format!(
            "  {}─[{}:{}:{}]\n",
            self.console.colorize("┌", Color::Blue),
            location.file.display(),
            error_line,
            location.column
        ));

        for line_num in start_line..=end_line {
            let content = lines.get(line_num - 1)?;
            let is_error_line = line_num == error_line;

            if is_error_line {
                frame.push_str(&self.console.colorize(">", highlight));
                frame.push(' ');
            } else {
                frame.push_str("  ");
            }
            frame.push_str(
                &self
                    .console
                    .colorize(&format!("{line_num:>gutter_width$}"), Color::Dim),
            );
            frame.push_str(&self.console.colorize(" │ ", Color::Dim));
            frame.push_str(content);
            frame.push('\n');

            if is_error_line {
                let caret_len = if location.end_line == Some(error_line) {
                    location
                        .end_column
                        .unwrap_or(location.column + 1)
                        .saturating_sub(location.column)
                        .max(1)
                } else {
                    content.len().saturating_sub(location.column - 1).max(1)
                };
                frame.push_str("  ");
                frame.push_str(&" ".repeat(gutter_width));
                frame.push_str(&self.console.colorize(" │ ", Color::Dim));
                frame.push_str(&" ".repeat(location.column.saturating_sub(1)));
                frame.push_str(&self.console.colorize(&"^".repeat(caret_len), highlight));
                frame.push('\n');
            }
        }

        Some(frame)
    }

    fn render_suggestion(&self, suggestion: &CodeSuggestion) -> String {
        let label = match suggestion.applicability {
            Applicability::Always => self.console.colorize("Safe fix", Color::Green),
            Applicability::MaybeIncorrect => self.console.colorize("Unsafe fix", Color::Yellow),
        };
        let mut output = format!(
            "  {} {}: {}\n",
            self.console.colorize("i", Color::Blue),
            label,
            suggestion.message
        );
        if let Some(diff) = self.render_suggestion_diff(suggestion) {
            output.push_str(&diff);
        }
        output
    }

    /// Single-line before/after for a replacement, when the target line can
    /// be recovered from disk.
    fn render_suggestion_diff(&self, suggestion: &CodeSuggestion) -> Option<String> {
        let location = &suggestion.location;
        let source = fs::read_to_string(&location.file).ok()?;
        let lines: Vec<&str> = source.lines().collect();
        if location.line == 0 || location.line > lines.len() {
            return None;
        }
        // Multi-line spans are handled by `fmt`; keep lint suggestion diffs
        // to single-line replacements.
        if location.end_line.is_some_and(|end| end != location.line) {
            return None;
        }

        let original = lines[location.line - 1];
        let start = location.column.saturating_sub(1).min(original.len());
        let end = location
            .end_column
            .unwrap_or(original.len() + 1)
            .saturating_sub(1)
            .min(original.len());
        let modified = format!(
            "{}{}{}",
            &original[..start],
            suggestion.replacement,
            &original[end..]
        );

        let gutter = self
            .console
            .colorize(&format!("{:>4}", location.line), Color::Dim);
        let mut output = String::new();
        output.push_str(&format!(
            "    {gutter} │ {}{}\n",
            self.console.colorize("- ", Color::Red),
            self.console.colorize(original, Color::Red)
        ));
        output.push_str(&format!(
            "    {gutter} │ {}{}\n",
            self.console.colorize("+ ", Color::Green),
            self.console.colorize(&modified, Color::Green)
        ));
        Some(output)
    }
}

impl Default for DiagnosticRenderer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::LineIndex;
    use std::io::Write;

    use tempfile::NamedTempFile;

    fn create_test_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    fn diagnostic_in(file: &NamedTempFile, content: &str, span: std::ops::Range<usize>) -> Diagnostic {
        let index = LineIndex::new(content);
        Diagnostic::error(
            "syntax/unexpected-token",
            "unexpected token",
            index.location(file.path(), span),
        )
    }

    #[test]
    fn header_contains_severity_code_and_message() {
        let renderer = DiagnosticRenderer::no_colors();
        let diagnostic = Diagnostic::warning(
            "style/line-width",
            "line exceeds configured width",
            Location::default(),
        );
        let header = renderer.render_header(&diagnostic);
        assert_eq!(
            header,
            "warning[style/line-width]: line exceeds configured width"
        );
    }

    #[test]
    fn code_frame_shows_context_and_carets() {
        let content = "<?php\n$a = 1;\n$b = ;\n$c = 3;\n";
        let file = create_test_file(content);
        let renderer = DiagnosticRenderer::no_colors();

        // span of the stray `;` on line 3
        let diagnostic = diagnostic_in(&file, content, 19..20);
        let output = renderer.render(&diagnostic);
        assert!(output.contains("$a = 1;"));
        assert!(output.contains("$b = ;"));
        assert!(output.contains("$c = 3;"));
        assert!(output.contains("^"));
        assert!(output.contains(":3:"));
    }

    #[test]
    fn suggestion_renders_before_and_after() {
        let content = "<?php\nif (isset($a) && isset($b)) {}\n";
        let file = create_test_file(content);
        let renderer = DiagnosticRenderer::no_colors();

        let index = LineIndex::new(content);
        let location = index.location(file.path(), 10..32);
        let diagnostic = Diagnostic::warning(
            "redundancy/combine-consecutive-issets",
            "consecutive isset calls can be combined",
            location.clone(),
        )
        .with_suggestion(CodeSuggestion {
            message: "combine into a single isset".to_string(),
            replacement: "isset($a, $b)".to_string(),
            location,
            applicability: Applicability::Always,
        });

        let output = renderer.render(&diagnostic);
        assert!(output.contains("Safe fix"));
        assert!(output.contains("- if (isset($a) && isset($b)) {}"));
        assert!(output.contains("+ if (isset($a, $b)) {}"));
    }

    #[test]
    fn json_output_is_valid() {
        let renderer = DiagnosticRenderer::with_format(OutputFormat::Json);
        let diagnostics = vec![
            Diagnostic::error("syntax/unexpected-token", "boom", Location::default()),
            Diagnostic::warning("style/x", "hm", Location::default()),
        ];
        let output = renderer.render_diagnostics(&diagnostics);
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed.as_array().unwrap().len(), 2);
        assert_eq!(parsed[0]["code"], "syntax/unexpected-token");
        assert_eq!(parsed[0]["severity"], "error");
    }
}
