//! Concrete syntax tree for PHP
//!
//! A lossless syntax tree built on the Rowan library. Every byte of the
//! input, including whitespace, comments, inline HTML and malformed
//! regions, lands in the tree, so `parse(source).text() == source` holds
//! for any input. That property is what lets the formatter and the lint
//! fixes rewrite files without disturbing anything they did not mean to
//! touch.
//!
//! Rowan's green/red split does the heavy lifting: the green tree is the
//! immutable, deduplicated storage; red nodes ([`PhpSyntaxNode`]) are the
//! on-demand view with parent pointers used for traversal.
//!
//! ```rust,ignore
//! use nori_core::cst::parse_php;
//! use nori_core::version::PhpVersion;
//!
//! let parse = parse_php("<?php echo 1 + 2; // sum", PhpVersion::Php84);
//! assert_eq!(parse.root.text().to_string(), "<?php echo 1 + 2; // sum");
//! ```

mod language;
mod syntax_kind;

pub mod ast;
pub mod formatter;
mod formatter_snapshot_tests;
pub mod lexer;
pub mod parser;
pub mod round_trip;
pub mod trivia;

pub use formatter::{format_source, FormatResult, FormatterConfig, IndentStyle};
pub use language::{PhpLanguage, PhpSyntaxElement, PhpSyntaxNode, PhpSyntaxToken};
pub use lexer::{lex_with_trivia, CstSpan, CstToken, LexResult, LexerError};
pub use parser::{parse_php, Parse, ParseError};
pub use round_trip::{RoundTripIssue, RoundTripValidator, ValidationResult};
pub use syntax_kind::PhpSyntaxKind;
