//! Trivia inspection helpers
//!
//! Trivia lives in the tree as ordinary tokens, so these helpers answer
//! questions like "how many blank lines separated these statements" by
//! looking at the tokens between two elements rather than at a side table.

use rowan::TextSize;

use super::{PhpSyntaxKind, PhpSyntaxNode, PhpSyntaxToken};

/// Number of newlines in the source between the end of `prev` and `offset`.
/// Two or more means the author left at least one blank line.
pub fn newlines_between(source: &str, prev_end: TextSize, start: TextSize) -> usize {
    let from = usize::from(prev_end).min(source.len());
    let to = usize::from(start).min(source.len());
    if from >= to {
        return 0;
    }
    source[from..to].matches('\n').count()
}

/// True when a comment token shares a line with the element before it.
pub fn is_trailing_comment(source: &str, prev_end: TextSize, comment: &PhpSyntaxToken) -> bool {
    newlines_between(source, prev_end, comment.text_range().start()) == 0
}

/// The source text of the condition header: everything between the first
/// `(` directly under `stmt` and its matching `)`.
pub fn condition_source<'a>(source: &'a str, stmt: &PhpSyntaxNode) -> Option<&'a str> {
    let mut depth = 0usize;
    let mut start = None;
    for element in stmt.children_with_tokens() {
        if let Some(token) = element.as_token() {
            match token.kind() {
                PhpSyntaxKind::LParen => {
                    if depth == 0 {
                        start = Some(usize::from(token.text_range().end()));
                    }
                    depth += 1;
                }
                PhpSyntaxKind::RParen => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        let s = start?;
                        let e = usize::from(token.text_range().start());
                        return source.get(s..e);
                    }
                }
                _ => {}
            }
        } else if depth == 0 {
            // a node before any paren means there is no direct condition
            continue;
        }
    }
    None
}

/// Whether the condition header was written across multiple lines.
pub fn condition_is_multiline(source: &str, stmt: &PhpSyntaxNode) -> bool {
    condition_source(source, stmt).is_some_and(|text| text.contains('\n'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cst::parser::parse_php;
    use crate::version::PhpVersion;

    #[test]
    fn blank_line_detection() {
        let src = "<?php\n$a = 1;\n\n\n$b = 2;\n";
        assert_eq!(newlines_between(src, TextSize::from(13), TextSize::from(16)), 3);
    }

    #[test]
    fn multiline_condition() {
        let src = "<?php\nif (\n    $a && $b\n) {\n}\n";
        let parse = parse_php(src, PhpVersion::default());
        let stmt = parse
            .root
            .descendants()
            .find(|n| n.kind() == PhpSyntaxKind::IfStmt)
            .unwrap();
        assert!(condition_is_multiline(src, &stmt));
        assert_eq!(condition_source(src, &stmt), Some("\n    $a && $b\n"));
    }

    #[test]
    fn single_line_condition() {
        let src = "<?php if ($a) {}";
        let parse = parse_php(src, PhpVersion::default());
        let stmt = parse
            .root
            .descendants()
            .find(|n| n.kind() == PhpSyntaxKind::IfStmt)
            .unwrap();
        assert!(!condition_is_multiline(src, &stmt));
    }
}
