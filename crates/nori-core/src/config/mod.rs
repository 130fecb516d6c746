//! Configuration system
//!
//! `nori.toml` is discovered upward from the working directory and
//! deserialized into [`NoriConfiguration`]; see [`ConfigLoader`]. The
//! formatter's resolved options re-export here so consumers only need
//! this module.

mod loader;
mod settings;

pub use loader::{ConfigLoader, CONFIG_FILE_NAME};
pub use settings::{
    FilesConfiguration, FormatterConfiguration, LinterConfiguration, NoriConfiguration,
    RuleConfiguration,
};

pub use crate::cst::{FormatterConfig, IndentStyle};
