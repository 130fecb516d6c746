//! Closure style rules

use nori_core::cst::ast::{ArrowFn, AstNode, Closure, ReturnStmt};
use nori_core::cst::{PhpSyntaxKind, PhpSyntaxNode};
use nori_core::diagnostics::{Applicability, CodeSuggestion, Diagnostic, Severity};

use crate::{LintContext, Rule};

pub const PREFER_ARROW_FUNCTION: &str = "style/prefer-arrow-function";
pub const PREFER_STATIC_CLOSURE: &str = "style/prefer-static-closure";

/// A `function (...) use (...) { return <expr>; }` closure fits PHP 7.4's
/// arrow function form. By-reference captures have no arrow equivalent and
/// disqualify the closure; by-value captures become implicit.
pub struct PreferArrowFunction;

impl Rule for PreferArrowFunction {
    fn id(&self) -> &'static str {
        PREFER_ARROW_FUNCTION
    }

    fn default_severity(&self) -> Severity {
        Severity::Note
    }

    fn check(&self, ctx: &LintContext<'_>) -> Vec<Diagnostic> {
        if !ctx.version.supports_arrow_functions() {
            return Vec::new();
        }
        let mut diagnostics = Vec::new();
        for node in ctx.root.descendants() {
            let Some(closure) = Closure::cast(node.clone()) else {
                continue;
            };
            if closure.by_ref() {
                continue;
            }
            if closure
                .use_clause()
                .is_some_and(|uses| uses.captures_by_ref())
            {
                continue;
            }
            let Some(return_expr) = single_return_expr(&closure) else {
                continue;
            };

            let range = node.text_range();
            let location = ctx.location(usize::from(range.start())..usize::from(range.end()));
            let replacement = arrow_fn_text(ctx, &closure, &return_expr);
            diagnostics.push(
                Diagnostic::new(
                    self.id(),
                    self.default_severity(),
                    "closure with a single return statement can be an arrow function",
                    location.clone(),
                )
                .with_suggestion(CodeSuggestion {
                    message: "convert to an arrow function".to_string(),
                    replacement,
                    location,
                    // arrow functions capture the whole enclosing scope by
                    // value, not just the use() list
                    applicability: Applicability::MaybeIncorrect,
                }),
            );
        }
        diagnostics
    }
}

/// The returned expression when the closure body is exactly one `return`.
fn single_return_expr(closure: &Closure) -> Option<PhpSyntaxNode> {
    let body = closure.body()?;
    let mut statements = body.statements();
    let first = statements.next()?;
    if statements.next().is_some() {
        return None;
    }
    ReturnStmt::cast(first)?.expr()
}

fn arrow_fn_text(ctx: &LintContext<'_>, closure: &Closure, return_expr: &PhpSyntaxNode) -> String {
    let mut text = String::new();
    if closure.is_static() {
        text.push_str("static ");
    }
    text.push_str("fn");
    match closure.param_list() {
        Some(params) => text.push_str(ctx.text_of(params.syntax())),
        None => text.push_str("()"),
    }
    if let Some(return_type) = return_type_of(closure.syntax()) {
        text.push_str(": ");
        text.push_str(ctx.text_of(&return_type));
    }
    text.push_str(" => ");
    text.push_str(ctx.text_of(return_expr).trim());
    text
}

fn return_type_of(closure: &PhpSyntaxNode) -> Option<PhpSyntaxNode> {
    closure.children().find(|c| {
        matches!(
            c.kind(),
            PhpSyntaxKind::SimpleType
                | PhpSyntaxKind::NullableType
                | PhpSyntaxKind::UnionType
                | PhpSyntaxKind::IntersectionType
        )
    })
}

/// A closure or arrow function that never touches `$this` can be declared
/// `static`, which prevents accidental binding and is marginally cheaper
/// to create.
pub struct PreferStaticClosure;

impl Rule for PreferStaticClosure {
    fn id(&self) -> &'static str {
        PREFER_STATIC_CLOSURE
    }

    fn default_severity(&self) -> Severity {
        Severity::Help
    }

    fn check(&self, ctx: &LintContext<'_>) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        for node in ctx.root.descendants() {
            let is_candidate = match node.kind() {
                PhpSyntaxKind::Closure => Closure::cast(node.clone())
                    .is_some_and(|c| !c.is_static()),
                PhpSyntaxKind::ArrowFn => !has_static_keyword(&node),
                _ => false,
            };
            if !is_candidate || uses_this(&node) {
                continue;
            }

            let range = node.text_range();
            let location = ctx.location(usize::from(range.start())..usize::from(range.end()));
            let replacement = format!("static {}", ctx.text_of(&node));
            diagnostics.push(
                Diagnostic::new(
                    self.id(),
                    self.default_severity(),
                    "closure does not use $this and can be static",
                    location.clone(),
                )
                .with_suggestion(CodeSuggestion {
                    message: "add the static modifier".to_string(),
                    replacement,
                    location,
                    // callers relying on bindTo() would break
                    applicability: Applicability::MaybeIncorrect,
                }),
            );
        }
        diagnostics
    }
}

fn has_static_keyword(node: &PhpSyntaxNode) -> bool {
    node.children_with_tokens()
        .filter_map(|e| e.into_token())
        .any(|t| t.kind() == PhpSyntaxKind::StaticKw)
}

/// `$this` anywhere in the body, including string interpolations and
/// nested non-static closures (their binding comes from this one).
fn uses_this(node: &PhpSyntaxNode) -> bool {
    node.descendants_with_tokens()
        .filter_map(|e| e.into_token())
        .any(|t| t.kind() == PhpSyntaxKind::Variable && t.text() == "$this")
        || node.text().to_string().contains("$this")
}

#[cfg(test)]
mod tests {
    use super::*;
    use nori_core::cst::parse_php;
    use nori_core::diagnostics::LineIndex;
    use nori_core::version::PhpVersion;
    use std::path::Path;

    fn check_with(rule: &dyn Rule, source: &str, version: PhpVersion) -> Vec<Diagnostic> {
        let parse = parse_php(source, version);
        let line_index = LineIndex::new(source);
        let ctx = LintContext {
            root: &parse.root,
            source,
            file: Path::new("test.php"),
            line_index: &line_index,
            version,
        };
        rule.check(&ctx)
    }

    fn check(rule: &dyn Rule, source: &str) -> Vec<Diagnostic> {
        check_with(rule, source, PhpVersion::default())
    }

    #[test]
    fn single_return_closure_becomes_arrow_fn() {
        let diagnostics = check(
            &PreferArrowFunction,
            "<?php $double = function ($x) use ($factor) { return $x * $factor; };",
        );
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0].suggestions[0].replacement,
            "fn($x) => $x * $factor"
        );
    }

    #[test]
    fn multi_statement_closure_is_kept() {
        let diagnostics = check(
            &PreferArrowFunction,
            "<?php $f = function ($x) { $y = $x + 1; return $y; };",
        );
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn by_ref_capture_disqualifies() {
        let diagnostics = check(
            &PreferArrowFunction,
            "<?php $f = function ($x) use (&$acc) { return $acc + $x; };",
        );
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn return_without_value_is_not_convertible() {
        let diagnostics = check(&PreferArrowFunction, "<?php $f = function () { return; };");
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn return_type_is_carried_over() {
        let diagnostics = check(
            &PreferArrowFunction,
            "<?php $f = function ($x): int { return $x; };",
        );
        assert_eq!(diagnostics[0].suggestions[0].replacement, "fn($x): int => $x");
    }

    #[test]
    fn gated_below_php74() {
        let src = "<?php $f = function ($x) { return $x; };";
        let diagnostics = check_with(&PreferArrowFunction, src, PhpVersion::Php73);
        assert!(diagnostics.is_empty());
        let diagnostics = check_with(&PreferArrowFunction, src, PhpVersion::Php74);
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn closure_without_this_suggested_static() {
        let diagnostics = check(
            &PreferStaticClosure,
            "<?php $f = function ($x) { return $x + 1; };",
        );
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].suggestions[0].replacement.starts_with("static function"));
    }

    #[test]
    fn this_usage_blocks_static_suggestion() {
        let diagnostics = check(
            &PreferStaticClosure,
            "<?php $f = function () { return $this->value; };",
        );
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn interpolated_this_counts_as_usage() {
        let diagnostics = check(
            &PreferStaticClosure,
            "<?php $f = function () { return \"id: {$this->id}\"; };",
        );
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn already_static_closures_are_quiet() {
        let diagnostics = check(
            &PreferStaticClosure,
            "<?php $f = static fn($x) => $x; $g = static function () { return 1; };",
        );
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn arrow_fn_without_this_is_flagged() {
        let diagnostics = check(&PreferStaticClosure, "<?php $f = fn($x) => $x * 2;");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].suggestions[0].replacement, "static fn($x) => $x * 2");
    }
}
