//! Redundancy rules
//!
//! Findings where the code says the same thing twice and PHP offers a
//! shorter equivalent form.

use nori_core::cst::ast::{AstNode, BinaryExpr, IssetExpr};
use nori_core::cst::{PhpSyntaxKind, PhpSyntaxNode};
use nori_core::diagnostics::{Applicability, CodeSuggestion, Diagnostic, Severity};

use crate::{LintContext, Rule};

pub const COMBINE_CONSECUTIVE_ISSETS: &str = "redundancy/combine-consecutive-issets";

/// `isset($a) && isset($b)` is `isset($a, $b)`: `isset` already takes any
/// number of arguments and short-circuits the same way. A chain of `&&`ed
/// `isset` calls is reported once, spanning the whole expression, with the
/// merged call as the fix.
pub struct CombineConsecutiveIssets;

impl Rule for CombineConsecutiveIssets {
    fn id(&self) -> &'static str {
        COMBINE_CONSECUTIVE_ISSETS
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn check(&self, ctx: &LintContext<'_>) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        for node in ctx.root.descendants() {
            if node.kind() != PhpSyntaxKind::BinaryExpr {
                continue;
            }
            let Some(args) = isset_chain_args(ctx, &node) else {
                continue;
            };
            // only the outermost `&&` of a chain reports; inner links are
            // covered by the same finding
            let mut ancestor = node.parent();
            while let Some(p) = &ancestor {
                if p.kind() == PhpSyntaxKind::ParenExpr {
                    ancestor = p.parent();
                } else {
                    break;
                }
            }
            if ancestor.is_some_and(|p| isset_chain_args(ctx, &p).is_some()) {
                continue;
            }

            let range = node.text_range();
            let span = usize::from(range.start())..usize::from(range.end());
            let location = ctx.location(span);
            let replacement = format!("isset({})", args.join(", "));
            diagnostics.push(
                Diagnostic::new(
                    self.id(),
                    self.default_severity(),
                    "consecutive isset() calls joined by && can be a single isset()",
                    location.clone(),
                )
                .with_suggestion(CodeSuggestion {
                    message: "combine into one isset()".to_string(),
                    replacement,
                    location,
                    applicability: Applicability::Always,
                }),
            );
        }
        diagnostics
    }
}

/// The flattened argument texts when `node` is an `&&` chain made entirely
/// of `isset()` calls, in source order.
fn isset_chain_args(ctx: &LintContext<'_>, node: &PhpSyntaxNode) -> Option<Vec<String>> {
    // parentheses around a link change nothing for `&&` of issets
    if node.kind() == PhpSyntaxKind::ParenExpr {
        return isset_chain_args(ctx, &node.children().next()?);
    }
    if let Some(isset) = IssetExpr::cast(node.clone()) {
        let args: Vec<String> = isset
            .args()
            .map(|arg| ctx.text_of(&arg).trim().to_string())
            .collect();
        return if args.is_empty() { None } else { Some(args) };
    }

    let binary = BinaryExpr::cast(node.clone())?;
    if binary.op_token()?.kind() != PhpSyntaxKind::AmpAmp {
        return None;
    }
    let mut args = isset_chain_args(ctx, &binary.lhs()?)?;
    args.extend(isset_chain_args(ctx, &binary.rhs()?)?);
    Some(args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nori_core::cst::parse_php;
    use nori_core::diagnostics::LineIndex;
    use nori_core::version::PhpVersion;
    use std::path::Path;

    fn check(source: &str) -> Vec<Diagnostic> {
        let parse = parse_php(source, PhpVersion::default());
        let line_index = LineIndex::new(source);
        let ctx = LintContext {
            root: &parse.root,
            source,
            file: Path::new("test.php"),
            line_index: &line_index,
            version: PhpVersion::default(),
        };
        CombineConsecutiveIssets.check(&ctx)
    }

    #[test]
    fn flags_two_issets_with_merged_fix() {
        let diagnostics = check("<?php if (isset($a) && isset($b)) {}");
        assert_eq!(diagnostics.len(), 1);
        let diagnostic = &diagnostics[0];
        assert_eq!(diagnostic.code, COMBINE_CONSECUTIVE_ISSETS);
        assert_eq!(diagnostic.suggestions[0].replacement, "isset($a, $b)");
        // the finding spans the whole && expression
        assert_eq!(
            diagnostic.location.length,
            "isset($a) && isset($b)".len()
        );
    }

    #[test]
    fn chain_of_three_reports_once() {
        let diagnostics = check("<?php $ok = isset($a) && isset($b['k']) && isset($c->d);");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0].suggestions[0].replacement,
            "isset($a, $b['k'], $c->d)"
        );
    }

    #[test]
    fn mixed_operands_are_left_alone() {
        assert!(check("<?php $ok = isset($a) && $b;").is_empty());
        assert!(check("<?php $ok = isset($a) || isset($b);").is_empty());
        assert!(check("<?php $ok = isset($a);").is_empty());
    }

    #[test]
    fn parenthesized_links_join_the_chain() {
        let diagnostics = check("<?php $ok = (isset($a)) && isset($b);");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].suggestions[0].replacement, "isset($a, $b)");

        // a pure chain inside parentheses still reports once
        let diagnostics = check("<?php $ok = (isset($a) && isset($b)) && isset($c);");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0].suggestions[0].replacement,
            "isset($a, $b, $c)"
        );
    }

    #[test]
    fn partial_chain_flags_the_isset_pair() {
        // ($x && isset($a) && isset($b)): left-assoc makes the inner pair
        // (($x && isset($a)) && isset($b)), so no pure isset chain exists
        // and nothing is reported
        assert!(check("<?php $ok = $x && isset($a) && isset($b);").is_empty());

        // parenthesized the other way, the pure pair is found
        let diagnostics = check("<?php $ok = $x && (isset($a) && isset($b));");
        assert_eq!(diagnostics.len(), 1);
    }
}
