//! Round-trip validation for the formatter
//!
//! Checks that formatting never changes what a PHP file means:
//! 1. parse(source) reconstructs the source exactly (lossless tree)
//! 2. parse(format(source)) yields the same non-trivia token stream
//! 3. format(format(source)) == format(source) (idempotence)
//!
//! Used by the test suite and by `fmt --verify` style debugging; the
//! formatter itself never consults this module.

use crate::version::PhpVersion;

use super::formatter::{format_source, FormatterConfig};
use super::parser::parse_php;
use super::{PhpSyntaxKind, PhpSyntaxNode};

/// Result of validating one source file through a format cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    pub original: String,
    pub formatted: String,
    /// Discrepancies found, empty when the round trip is clean.
    pub issues: Vec<RoundTripIssue>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }
}

/// A single way the round trip failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundTripIssue {
    /// The tree did not reproduce the input byte for byte.
    LosslessnessBroken,
    /// The formatted output no longer parses cleanly.
    ReparseError { message: String },
    /// Formatting changed the token stream (ignoring trivia).
    TokenMismatch {
        index: usize,
        original: Option<(PhpSyntaxKind, String)>,
        reparsed: Option<(PhpSyntaxKind, String)>,
    },
    /// A second format pass produced different output.
    NotIdempotent,
}

impl std::fmt::Display for RoundTripIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LosslessnessBroken => {
                write!(f, "syntax tree does not reproduce the source text")
            }
            Self::ReparseError { message } => {
                write!(f, "formatted output fails to parse: {message}")
            }
            Self::TokenMismatch {
                index,
                original,
                reparsed,
            } => write!(
                f,
                "token {index} changed: {original:?} became {reparsed:?}"
            ),
            Self::NotIdempotent => write!(f, "formatting twice changes the output"),
        }
    }
}

/// Validates that a format cycle preserves program meaning.
pub struct RoundTripValidator {
    config: FormatterConfig,
    version: PhpVersion,
}

impl RoundTripValidator {
    pub fn new(version: PhpVersion) -> Self {
        Self {
            config: FormatterConfig::default(),
            version,
        }
    }

    pub fn with_config(config: FormatterConfig, version: PhpVersion) -> Self {
        Self { config, version }
    }

    pub fn validate(&self, source: &str) -> ValidationResult {
        let mut issues = Vec::new();

        let parse = parse_php(source, self.version);
        if parse.root.text() != source {
            issues.push(RoundTripIssue::LosslessnessBroken);
        }

        let result = format_source(source, &self.config, self.version);
        if result.skipped {
            // files with parse errors are passed through untouched, which
            // is a valid round trip by definition
            return ValidationResult {
                original: source.to_string(),
                formatted: result.formatted,
                issues,
            };
        }

        let reparse = parse_php(&result.formatted, self.version);
        if reparse.has_errors() {
            let message = reparse
                .errors
                .first()
                .map(|e| e.message.clone())
                .or_else(|| reparse.lexer_errors.first().map(|e| e.message.clone()))
                .unwrap_or_default();
            issues.push(RoundTripIssue::ReparseError { message });
        } else {
            self.compare_tokens(&parse.root, &reparse.root, &mut issues);
        }

        let second = format_source(&result.formatted, &self.config, self.version);
        if second.formatted != result.formatted {
            issues.push(RoundTripIssue::NotIdempotent);
        }

        ValidationResult {
            original: source.to_string(),
            formatted: result.formatted,
            issues,
        }
    }

    /// Compare the two trees as flat streams of meaningful tokens. Inline
    /// HTML participates verbatim; whitespace and comments do not carry
    /// program meaning and are skipped. A synthesized `;` before `?>` or
    /// end of file is accepted.
    fn compare_tokens(
        &self,
        original: &PhpSyntaxNode,
        reparsed: &PhpSyntaxNode,
        issues: &mut Vec<RoundTripIssue>,
    ) {
        let a = significant_tokens(original);
        let b = significant_tokens(reparsed);
        let mut i = 0;
        let mut j = 0;
        loop {
            match (a.get(i), b.get(j)) {
                (None, None) => break,
                (x, y) if x == y => {
                    i += 1;
                    j += 1;
                }
                // the formatter terminates echo/return statements that
                // relied on `?>` or EOF to end them
                (x, Some((PhpSyntaxKind::Semicolon, _)))
                    if x.map(|(k, _)| *k) != Some(PhpSyntaxKind::Semicolon) =>
                {
                    j += 1;
                }
                (x, y) => {
                    issues.push(RoundTripIssue::TokenMismatch {
                        index: i,
                        original: x.cloned(),
                        reparsed: y.cloned(),
                    });
                    break;
                }
            }
        }
    }
}

fn significant_tokens(root: &PhpSyntaxNode) -> Vec<(PhpSyntaxKind, String)> {
    root.descendants_with_tokens()
        .filter_map(|element| element.into_token())
        .filter(|token| !token.kind().is_trivia())
        .map(|token| (token.kind(), token.text().to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validate(src: &str) -> ValidationResult {
        RoundTripValidator::new(PhpVersion::default()).validate(src)
    }

    #[test]
    fn clean_round_trip() {
        let result = validate("<?php\nfunction f($a) {\n    return $a + 1;\n}\n");
        assert!(result.is_valid(), "{:?}", result.issues);
    }

    #[test]
    fn messy_input_round_trips() {
        let result = validate("<?php   $a=1;$b   =   [1,2,3];if($a){echo $b[0];}");
        assert!(result.is_valid(), "{:?}", result.issues);
    }

    #[test]
    fn template_with_inline_html() {
        let result = validate("<?php if ($x): ?>\n<b>yes</b>\n<?php endif; ?>\n");
        assert!(result.is_valid(), "{:?}", result.issues);
    }

    #[test]
    fn parse_error_passthrough_is_valid() {
        let result = validate("<?php $a = ;");
        assert!(result.is_valid(), "{:?}", result.issues);
        assert_eq!(result.formatted, result.original);
    }

    #[test]
    fn strings_survive_the_cycle() {
        let result = validate("<?php\n$s = \"a  {$b->c}  d\";\n$h = <<<EOT\n x \nEOT;\n");
        assert!(result.is_valid(), "{:?}", result.issues);
    }

    #[test]
    fn issue_display_is_readable() {
        let issue = RoundTripIssue::NotIdempotent;
        assert_eq!(issue.to_string(), "formatting twice changes the output");
    }
}
