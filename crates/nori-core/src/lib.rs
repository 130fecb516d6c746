//! nori core
//!
//! Lossless PHP tooling: a mode-aware lexer, an error-recovering parser
//! producing a Rowan CST that reproduces the input byte for byte, a
//! deterministic formatter, and the diagnostics model shared with the lint
//! rules and the CLI. Everything here is pure and synchronous; file
//! discovery and parallelism live in the CLI crate.

pub mod config;
pub mod console; // terminal color handling for rich output
pub mod cst; // concrete syntax tree (lossless, Rowan-based)
pub mod diagnostics;
pub mod error;
pub mod version;

pub use config::{
    ConfigLoader, FilesConfiguration, FormatterConfiguration, LinterConfiguration,
    NoriConfiguration, RuleConfiguration,
};
pub use console::{Color, Console};
pub use cst::{
    format_source, lex_with_trivia, parse_php, FormatResult, FormatterConfig, IndentStyle, Parse,
    ParseError, PhpSyntaxKind, PhpSyntaxNode,
};
pub use diagnostics::{
    CodeSuggestion, Diagnostic, DiagnosticRenderer, DiagnosticSink, LineIndex, Location,
    OutputFormat, Severity,
};
pub use error::{NoriError, Result};
pub use version::PhpVersion;

/// Initialize the tracing subscriber for logging. Verbosity counts map to
/// env-filter directives; `RUST_LOG` wins when set.
pub fn init_tracing(verbosity: u8) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let default_directive = match verbosity {
        0 => "nori=warn",
        1 => "nori=info",
        2 => "nori=debug",
        _ => "nori=trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
