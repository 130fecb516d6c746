//! Typed configuration model
//!
//! The on-disk shape (`nori.toml`) deserializes into these structs; every
//! field has a default so a missing file or empty table behaves like the
//! built-in style. `FormatterConfiguration::resolve` validates the values
//! and produces the [`FormatterConfig`] the formatter consumes.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::cst::{FormatterConfig, IndentStyle};
use crate::diagnostics::Severity;
use crate::error::{NoriError, Result};
use crate::version::PhpVersion;

/// Root of `nori.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct NoriConfiguration {
    pub php_version: PhpVersion,
    pub formatter: FormatterConfiguration,
    pub linter: LinterConfiguration,
    pub files: FilesConfiguration,
}

/// `[formatter]` table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct FormatterConfiguration {
    pub enabled: bool,
    /// "space" or "tab"
    pub indent_style: String,
    pub indent_size: u8,
    pub line_width: usize,
    pub preserve_breaking_condition_statement: bool,
    pub brace_on_same_line: bool,
    pub space_around_concat: bool,
    pub trailing_newline: bool,
}

impl Default for FormatterConfiguration {
    fn default() -> Self {
        Self {
            enabled: true,
            indent_style: "space".to_string(),
            indent_size: 4,
            line_width: 120,
            preserve_breaking_condition_statement: true,
            brace_on_same_line: true,
            space_around_concat: true,
            trailing_newline: true,
        }
    }
}

impl FormatterConfiguration {
    /// Validate and convert into the formatter's config. Bad values fail
    /// here, before any file is read.
    pub fn resolve(&self) -> Result<FormatterConfig> {
        let indentation = match self.indent_style.as_str() {
            "space" | "spaces" => {
                if self.indent_size == 0 || self.indent_size > 16 {
                    return Err(NoriError::config(format!(
                        "indent_size must be between 1 and 16, got {}",
                        self.indent_size
                    )));
                }
                IndentStyle::Spaces(self.indent_size)
            }
            "tab" | "tabs" => IndentStyle::Tabs,
            other => {
                return Err(NoriError::config(format!(
                    "indent_style must be \"space\" or \"tab\", got \"{other}\""
                )));
            }
        };
        if self.line_width < 40 || self.line_width > 500 {
            return Err(NoriError::config(format!(
                "line_width must be between 40 and 500, got {}",
                self.line_width
            )));
        }
        Ok(FormatterConfig {
            indentation,
            line_width: self.line_width,
            preserve_breaking_condition_statement: self.preserve_breaking_condition_statement,
            brace_on_same_line: self.brace_on_same_line,
            space_around_concat: self.space_around_concat,
            trailing_newline: self.trailing_newline,
        })
    }
}

/// `[linter]` table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct LinterConfiguration {
    pub enabled: bool,
    /// Lowest severity that makes `nori lint` exit non-zero.
    pub fail_on: Severity,
    /// Per-rule overrides keyed by rule id; insertion order is preserved
    /// so reporting stays deterministic.
    pub rules: IndexMap<String, RuleConfiguration>,
}

impl Default for LinterConfiguration {
    fn default() -> Self {
        Self {
            enabled: true,
            fail_on: Severity::Error,
            rules: IndexMap::new(),
        }
    }
}

impl LinterConfiguration {
    pub fn rule(&self, id: &str) -> Option<&RuleConfiguration> {
        self.rules.get(id)
    }

    pub fn is_rule_enabled(&self, id: &str) -> bool {
        self.rule(id).map(|r| r.enabled).unwrap_or(true)
    }

    pub fn severity_override(&self, id: &str) -> Option<Severity> {
        self.rule(id).and_then(|r| r.severity)
    }
}

/// `[linter.rules."<id>"]` entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct RuleConfiguration {
    pub enabled: bool,
    pub severity: Option<Severity>,
}

impl Default for RuleConfiguration {
    fn default() -> Self {
        Self {
            enabled: true,
            severity: None,
        }
    }
}

/// `[files]` table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct FilesConfiguration {
    /// Glob patterns relative to the working directory.
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

impl Default for FilesConfiguration {
    fn default() -> Self {
        Self {
            include: vec!["**/*.php".to_string()],
            exclude: vec!["vendor/**".to_string()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_usable_without_a_file() {
        let config = NoriConfiguration::default();
        assert_eq!(config.php_version, PhpVersion::Php84);
        assert!(config.formatter.enabled);
        let resolved = config.formatter.resolve().unwrap();
        assert_eq!(resolved, FormatterConfig::default());
        assert_eq!(config.files.include, vec!["**/*.php"]);
    }

    #[test]
    fn parses_a_full_toml_document() {
        let toml = r#"
php_version = "8.1"

[formatter]
indent_style = "tab"
line_width = 100
space_around_concat = false

[linter]
fail_on = "warning"

[linter.rules."style/prefer-arrow-function"]
enabled = false

[linter.rules."redundancy/combine-consecutive-issets"]
severity = "note"

[files]
include = ["src/**/*.php"]
exclude = ["src/generated/**"]
"#;
        let config: NoriConfiguration = toml::from_str(toml).unwrap();
        assert_eq!(config.php_version, PhpVersion::Php81);
        let resolved = config.formatter.resolve().unwrap();
        assert_eq!(resolved.indentation, IndentStyle::Tabs);
        assert_eq!(resolved.line_width, 100);
        assert!(!resolved.space_around_concat);
        assert_eq!(config.linter.fail_on, Severity::Warning);
        assert!(!config.linter.is_rule_enabled("style/prefer-arrow-function"));
        assert!(config.linter.is_rule_enabled("style/prefer-static-closure"));
        assert_eq!(
            config
                .linter
                .severity_override("redundancy/combine-consecutive-issets"),
            Some(Severity::Note)
        );
    }

    #[test]
    fn invalid_values_fail_fast() {
        let bad_indent = FormatterConfiguration {
            indent_size: 0,
            ..FormatterConfiguration::default()
        };
        assert!(bad_indent.resolve().is_err());

        let bad_style = FormatterConfiguration {
            indent_style: "elastic".to_string(),
            ..FormatterConfiguration::default()
        };
        assert!(bad_style.resolve().is_err());

        let bad_width = FormatterConfiguration {
            line_width: 10,
            ..FormatterConfiguration::default()
        };
        assert!(bad_width.resolve().is_err());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let toml = "[formatter]\nindnet_size = 2\n";
        assert!(toml::from_str::<NoriConfiguration>(toml).is_err());
    }
}
