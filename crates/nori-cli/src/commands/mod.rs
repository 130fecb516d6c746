//! Subcommand implementations

pub mod fmt;
pub mod lint;
