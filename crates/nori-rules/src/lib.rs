//! Rule engine and built-in lint rules
//!
//! A rule inspects one parsed file through a read-only [`LintContext`] and
//! returns diagnostics. The engine owns the registry, applies per-rule
//! configuration (enabled flag, severity override) from
//! [`LinterConfiguration`], and merges rule findings with the parser's own
//! diagnostics into one sorted list per file.
//!
//! Rules run in registration order and see an immutable tree, so output is
//! deterministic for a given (source, config, version) triple.

pub mod builtin;

use std::path::Path;

use indexmap::IndexMap;

use nori_core::config::LinterConfiguration;
use nori_core::cst::{parse_php, PhpSyntaxNode};
use nori_core::diagnostics::{Diagnostic, DiagnosticSink, LineIndex, Location, Severity};
use nori_core::version::PhpVersion;

/// Read-only view of one file handed to every rule.
pub struct LintContext<'a> {
    pub root: &'a PhpSyntaxNode,
    pub source: &'a str,
    pub file: &'a Path,
    pub line_index: &'a LineIndex,
    pub version: PhpVersion,
}

impl LintContext<'_> {
    /// Resolve a byte span into a reportable location.
    pub fn location(&self, span: std::ops::Range<usize>) -> Location {
        self.line_index.location(self.file, span)
    }

    /// The source text covered by a node.
    pub fn text_of(&self, node: &PhpSyntaxNode) -> &str {
        let range = node.text_range();
        &self.source[usize::from(range.start())..usize::from(range.end())]
    }
}

/// A single lint rule.
pub trait Rule: Send + Sync {
    /// Stable `category/name` identifier, also used as the diagnostic code.
    fn id(&self) -> &'static str;

    fn default_severity(&self) -> Severity;

    fn check(&self, ctx: &LintContext<'_>) -> Vec<Diagnostic>;
}

/// Ordered collection of rules. Registration order is execution order.
#[derive(Default)]
pub struct RuleRegistry {
    rules: IndexMap<&'static str, Box<dyn Rule>>,
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with every built-in rule.
    pub fn with_builtin_rules() -> Self {
        let mut registry = Self::new();
        builtin::register_builtin_rules(&mut registry);
        registry
    }

    pub fn register(&mut self, rule: Box<dyn Rule>) {
        let id = rule.id();
        if self.rules.insert(id, rule).is_some() {
            tracing::warn!("rule '{id}' registered twice, later registration wins");
        }
    }

    pub fn rules(&self) -> impl Iterator<Item = &dyn Rule> {
        self.rules.values().map(|r| r.as_ref())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Runs the registry over source files.
pub struct LintEngine {
    registry: RuleRegistry,
    config: LinterConfiguration,
    version: PhpVersion,
}

impl LintEngine {
    pub fn new(config: LinterConfiguration, version: PhpVersion) -> Self {
        Self {
            registry: RuleRegistry::with_builtin_rules(),
            config,
            version,
        }
    }

    pub fn with_registry(
        registry: RuleRegistry,
        config: LinterConfiguration,
        version: PhpVersion,
    ) -> Self {
        Self {
            registry,
            config,
            version,
        }
    }

    /// Parse and lint one file. Parser and lexer findings are included so
    /// callers get the complete picture in a single sorted list.
    pub fn lint_source(&self, file: &Path, source: &str) -> Vec<Diagnostic> {
        let parse = parse_php(source, self.version);
        let line_index = LineIndex::new(source);
        let mut sink = DiagnosticSink::new();

        for err in &parse.lexer_errors {
            sink.push(Diagnostic::new(
                err.code,
                err.severity,
                err.message.clone(),
                line_index.location(file, err.span.clone()),
            ));
        }
        for err in &parse.errors {
            sink.push(Diagnostic::error(
                err.code,
                err.message.clone(),
                line_index.location(file, err.span.clone()),
            ));
        }

        let ctx = LintContext {
            root: &parse.root,
            source,
            file,
            line_index: &line_index,
            version: self.version,
        };
        for rule in self.registry.rules() {
            if !self.config.is_rule_enabled(rule.id()) {
                continue;
            }
            let severity = self
                .config
                .severity_override(rule.id())
                .unwrap_or_else(|| rule.default_severity());
            for mut diagnostic in rule.check(&ctx) {
                diagnostic.severity = severity;
                sink.push(diagnostic);
            }
        }

        sink.into_sorted()
    }

    /// The most severe finding, if any. `Severity` orders `Error` least,
    /// so the minimum is the worst.
    pub fn max_severity(diagnostics: &[Diagnostic]) -> Option<Severity> {
        diagnostics.iter().map(|d| d.severity).min()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn lint(source: &str) -> Vec<Diagnostic> {
        let engine = LintEngine::new(LinterConfiguration::default(), PhpVersion::default());
        engine.lint_source(&PathBuf::from("test.php"), source)
    }

    #[test]
    fn builtin_rules_are_registered_in_order() {
        let registry = RuleRegistry::with_builtin_rules();
        let ids: Vec<_> = registry.rules().map(|r| r.id()).collect();
        assert_eq!(
            ids,
            vec![
                "redundancy/combine-consecutive-issets",
                "style/prefer-arrow-function",
                "style/prefer-static-closure",
            ]
        );
    }

    #[test]
    fn syntax_errors_surface_as_diagnostics() {
        let diagnostics = lint("<?php $a = ;");
        assert!(diagnostics.iter().any(|d| d.code.starts_with("syntax/")));
    }

    #[test]
    fn disabled_rule_is_skipped() {
        let source = "<?php $ok = isset($a) && isset($b);";
        assert!(lint(source)
            .iter()
            .any(|d| d.code == "redundancy/combine-consecutive-issets"));

        let mut config = LinterConfiguration::default();
        config.rules.insert(
            "redundancy/combine-consecutive-issets".to_string(),
            nori_core::config::RuleConfiguration {
                enabled: false,
                severity: None,
            },
        );
        let engine = LintEngine::new(config, PhpVersion::default());
        let diagnostics = engine.lint_source(&PathBuf::from("test.php"), source);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn severity_override_applies() {
        let mut config = LinterConfiguration::default();
        config.rules.insert(
            "redundancy/combine-consecutive-issets".to_string(),
            nori_core::config::RuleConfiguration {
                enabled: true,
                severity: Some(Severity::Note),
            },
        );
        let engine = LintEngine::new(config, PhpVersion::default());
        let diagnostics =
            engine.lint_source(&PathBuf::from("t.php"), "<?php $x = isset($a) && isset($b);");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].severity, Severity::Note);
    }

    #[test]
    fn output_is_deterministic() {
        let source = "<?php\n$f = function () use ($x) { return $x + 1; };\n$ok = isset($a) && isset($b);\n";
        assert_eq!(lint(source), lint(source));
    }

    #[test]
    fn max_severity_prefers_errors() {
        let diagnostics = lint("<?php $a = ; $ok = isset($a) && isset($b);");
        assert_eq!(LintEngine::max_severity(&diagnostics), Some(Severity::Error));
        assert_eq!(LintEngine::max_severity(&[]), None);
    }
}
