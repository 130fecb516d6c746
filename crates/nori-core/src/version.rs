//! PHP version profile
//!
//! A single version profile gates which grammar productions the lexer and
//! parser accept. Gated constructs are still parsed when encountered below
//! their version so the tree stays complete; the parser reports them as
//! `syntax/version-gated-feature` diagnostics instead of mangling recovery.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported PHP language profiles, oldest to newest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PhpVersion {
    #[serde(rename = "7.3")]
    Php73,
    #[serde(rename = "7.4")]
    Php74,
    #[serde(rename = "8.0")]
    Php80,
    #[serde(rename = "8.1")]
    Php81,
    #[serde(rename = "8.2")]
    Php82,
    #[serde(rename = "8.3")]
    Php83,
    #[serde(rename = "8.4")]
    Php84,
    #[serde(rename = "8.5")]
    Php85,
}

impl Default for PhpVersion {
    fn default() -> Self {
        PhpVersion::Php84
    }
}

impl PhpVersion {
    pub fn supports_arrow_functions(self) -> bool {
        self >= PhpVersion::Php74
    }

    pub fn supports_match(self) -> bool {
        self >= PhpVersion::Php80
    }

    pub fn supports_attributes(self) -> bool {
        self >= PhpVersion::Php80
    }

    pub fn supports_nullsafe_operator(self) -> bool {
        self >= PhpVersion::Php80
    }

    pub fn supports_named_arguments(self) -> bool {
        self >= PhpVersion::Php80
    }

    pub fn supports_promoted_properties(self) -> bool {
        self >= PhpVersion::Php80
    }

    pub fn supports_union_types(self) -> bool {
        self >= PhpVersion::Php80
    }

    pub fn supports_enums(self) -> bool {
        self >= PhpVersion::Php81
    }

    pub fn supports_readonly_properties(self) -> bool {
        self >= PhpVersion::Php81
    }

    pub fn supports_first_class_callables(self) -> bool {
        self >= PhpVersion::Php81
    }

    pub fn supports_intersection_types(self) -> bool {
        self >= PhpVersion::Php81
    }

    pub fn supports_readonly_classes(self) -> bool {
        self >= PhpVersion::Php82
    }

    pub fn supports_pipe_operator(self) -> bool {
        self >= PhpVersion::Php85
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PhpVersion::Php73 => "7.3",
            PhpVersion::Php74 => "7.4",
            PhpVersion::Php80 => "8.0",
            PhpVersion::Php81 => "8.1",
            PhpVersion::Php82 => "8.2",
            PhpVersion::Php83 => "8.3",
            PhpVersion::Php84 => "8.4",
            PhpVersion::Php85 => "8.5",
        }
    }
}

impl fmt::Display for PhpVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned for version strings outside the supported range.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported PHP version '{0}' (supported: 7.3 - 8.5)")]
pub struct VersionParseError(pub String);

impl FromStr for PhpVersion {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "7.3" => Ok(PhpVersion::Php73),
            "7.4" => Ok(PhpVersion::Php74),
            "8.0" => Ok(PhpVersion::Php80),
            "8.1" => Ok(PhpVersion::Php81),
            "8.2" => Ok(PhpVersion::Php82),
            "8.3" => Ok(PhpVersion::Php83),
            "8.4" => Ok(PhpVersion::Php84),
            "8.5" => Ok(PhpVersion::Php85),
            other => Err(VersionParseError(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_drives_feature_gates() {
        assert!(PhpVersion::Php81.supports_enums());
        assert!(!PhpVersion::Php80.supports_enums());
        assert!(PhpVersion::Php85.supports_pipe_operator());
        assert!(!PhpVersion::Php84.supports_pipe_operator());
        assert!(PhpVersion::Php74.supports_arrow_functions());
        assert!(!PhpVersion::Php73.supports_arrow_functions());
        assert!(!PhpVersion::Php74.supports_match());
    }

    #[test]
    fn parse_from_config_string() {
        assert_eq!("8.1".parse::<PhpVersion>().unwrap(), PhpVersion::Php81);
        assert!("5.6".parse::<PhpVersion>().is_err());
    }
}
