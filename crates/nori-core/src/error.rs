//! Error types for parsing, formatting and linting operations

use std::path::PathBuf;
use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, NoriError>;

/// Top-level error type. Diagnostics inside a file (syntax errors, lint
/// findings) are not errors at this level; they flow through
/// [`crate::diagnostics::Diagnostic`]. `NoriError` covers failures of the
/// tool itself.
#[derive(Debug, Error)]
pub enum NoriError {
    #[error("configuration error: {message}")]
    ConfigError { message: String },

    #[error("rule error in '{rule_id}': {message}")]
    RuleError { rule_id: String, message: String },

    #[error("io error for path '{path}': {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("formatter error: {message}")]
    FormatterError { message: String },

    #[error("internal error: {message}")]
    InternalError { message: String },
}

impl NoriError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    pub fn rule(rule_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::RuleError {
            rule_id: rule_id.into(),
            message: message.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::IoError {
            path: path.into(),
            source,
        }
    }

    pub fn formatter(message: impl Into<String>) -> Self {
        Self::FormatterError {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::InternalError {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for NoriError {
    fn from(err: std::io::Error) -> Self {
        Self::IoError {
            path: PathBuf::new(),
            source: err,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_name_the_subject() {
        let err = NoriError::rule("style/prefer-arrow-function", "bad pattern");
        assert_eq!(
            err.to_string(),
            "rule error in 'style/prefer-arrow-function': bad pattern"
        );

        let err = NoriError::config("line_width must be positive");
        assert!(err.to_string().starts_with("configuration error:"));
    }
}
