//! Typed views over the raw CST
//!
//! Thin wrappers that cast a [`PhpSyntaxNode`] into a specific construct
//! and expose its interesting children. Casting never copies; the wrapper
//! just holds the node.

use super::{PhpSyntaxKind, PhpSyntaxNode, PhpSyntaxToken};

pub trait AstNode {
    fn can_cast(kind: PhpSyntaxKind) -> bool
    where
        Self: Sized;

    fn cast(syntax: PhpSyntaxNode) -> Option<Self>
    where
        Self: Sized;

    fn syntax(&self) -> &PhpSyntaxNode;

    fn text(&self) -> String {
        self.syntax().text().to_string()
    }
}

/// First child node of the given kind.
pub fn child_of_kind(node: &PhpSyntaxNode, kind: PhpSyntaxKind) -> Option<PhpSyntaxNode> {
    node.children().find(|c| c.kind() == kind)
}

/// First direct token of the given kind.
pub fn token_of_kind(node: &PhpSyntaxNode, kind: PhpSyntaxKind) -> Option<PhpSyntaxToken> {
    node.children_with_tokens()
        .filter_map(|e| e.into_token())
        .find(|t| t.kind() == kind)
}

macro_rules! ast_node {
    ($(#[$attr:meta])* $name:ident, $kind:ident) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub struct $name {
            syntax: PhpSyntaxNode,
        }

        impl AstNode for $name {
            fn can_cast(kind: PhpSyntaxKind) -> bool {
                kind == PhpSyntaxKind::$kind
            }

            fn cast(syntax: PhpSyntaxNode) -> Option<Self> {
                if Self::can_cast(syntax.kind()) {
                    Some(Self { syntax })
                } else {
                    None
                }
            }

            fn syntax(&self) -> &PhpSyntaxNode {
                &self.syntax
            }
        }
    };
}

ast_node!(
    /// The file root.
    Program,
    Program
);

impl Program {
    pub fn statements(&self) -> impl Iterator<Item = PhpSyntaxNode> + '_ {
        self.syntax.children()
    }
}

ast_node!(Block, Block);

impl Block {
    pub fn statements(&self) -> impl Iterator<Item = PhpSyntaxNode> + '_ {
        self.syntax.children()
    }
}

ast_node!(IfStmt, IfStmt);

impl IfStmt {
    /// The parenthesized condition expression.
    pub fn condition(&self) -> Option<PhpSyntaxNode> {
        // first expression child before the body
        self.syntax
            .children()
            .find(|c| is_expression_kind(c.kind()))
    }

    pub fn else_clause(&self) -> Option<PhpSyntaxNode> {
        child_of_kind(&self.syntax, PhpSyntaxKind::ElseClause)
    }

    pub fn elseif_clauses(&self) -> impl Iterator<Item = PhpSyntaxNode> + '_ {
        self.syntax
            .children()
            .filter(|c| c.kind() == PhpSyntaxKind::ElseifClause)
    }

    /// The statement executed when the condition holds.
    pub fn then_branch(&self) -> Option<PhpSyntaxNode> {
        self.syntax
            .children()
            .filter(|c| {
                !matches!(
                    c.kind(),
                    PhpSyntaxKind::ElseifClause | PhpSyntaxKind::ElseClause
                )
            })
            .skip_while(|c| is_expression_kind(c.kind()))
            .next()
    }
}

ast_node!(ExpressionStmt, ExpressionStmt);

impl ExpressionStmt {
    pub fn expr(&self) -> Option<PhpSyntaxNode> {
        self.syntax.children().next()
    }
}

ast_node!(ReturnStmt, ReturnStmt);

impl ReturnStmt {
    pub fn expr(&self) -> Option<PhpSyntaxNode> {
        self.syntax.children().next()
    }
}

ast_node!(FunctionDecl, FunctionDecl);

impl FunctionDecl {
    pub fn name(&self) -> Option<PhpSyntaxToken> {
        token_of_kind(&self.syntax, PhpSyntaxKind::Ident)
    }

    pub fn param_list(&self) -> Option<ParamList> {
        self.syntax.children().find_map(ParamList::cast)
    }

    pub fn body(&self) -> Option<Block> {
        self.syntax.children().find_map(Block::cast)
    }
}

ast_node!(ParamList, ParamList);

impl ParamList {
    pub fn params(&self) -> impl Iterator<Item = Param> + '_ {
        self.syntax.children().filter_map(Param::cast)
    }
}

ast_node!(Param, Param);

impl Param {
    pub fn variable(&self) -> Option<PhpSyntaxToken> {
        token_of_kind(&self.syntax, PhpSyntaxKind::Variable)
    }

    pub fn by_ref(&self) -> bool {
        token_of_kind(&self.syntax, PhpSyntaxKind::Amp).is_some()
    }

    pub fn variadic(&self) -> bool {
        token_of_kind(&self.syntax, PhpSyntaxKind::Ellipsis).is_some()
    }
}

ast_node!(Closure, Closure);

impl Closure {
    pub fn is_static(&self) -> bool {
        token_of_kind(&self.syntax, PhpSyntaxKind::StaticKw).is_some()
    }

    pub fn by_ref(&self) -> bool {
        token_of_kind(&self.syntax, PhpSyntaxKind::Amp).is_some()
    }

    pub fn param_list(&self) -> Option<ParamList> {
        self.syntax.children().find_map(ParamList::cast)
    }

    pub fn use_clause(&self) -> Option<ClosureUse> {
        self.syntax.children().find_map(ClosureUse::cast)
    }

    pub fn body(&self) -> Option<Block> {
        self.syntax.children().find_map(Block::cast)
    }
}

ast_node!(ClosureUse, ClosureUse);

impl ClosureUse {
    pub fn variables(&self) -> impl Iterator<Item = PhpSyntaxToken> + '_ {
        self.syntax
            .children_with_tokens()
            .filter_map(|e| e.into_token())
            .filter(|t| t.kind() == PhpSyntaxKind::Variable)
    }

    /// True when any captured variable is taken by reference.
    pub fn captures_by_ref(&self) -> bool {
        self.syntax
            .children_with_tokens()
            .filter_map(|e| e.into_token())
            .any(|t| t.kind() == PhpSyntaxKind::Amp)
    }
}

ast_node!(ArrowFn, ArrowFn);

impl ArrowFn {
    pub fn param_list(&self) -> Option<ParamList> {
        self.syntax.children().find_map(ParamList::cast)
    }

    pub fn body(&self) -> Option<PhpSyntaxNode> {
        self.syntax.children().filter(|c| is_expression_kind(c.kind())).last()
    }
}

ast_node!(CallExpr, CallExpr);

impl CallExpr {
    pub fn callee(&self) -> Option<PhpSyntaxNode> {
        self.syntax.children().next()
    }

    pub fn arg_list(&self) -> Option<ArgList> {
        self.syntax.children().find_map(ArgList::cast)
    }

    /// The callee name if this is a plain function call like `isset` or
    /// `strlen` (lowercased; PHP function names are case-insensitive).
    pub fn function_name(&self) -> Option<String> {
        let callee = self.callee()?;
        if callee.kind() == PhpSyntaxKind::NameExpr {
            Some(callee.text().to_string().trim().to_ascii_lowercase())
        } else {
            None
        }
    }
}

ast_node!(ArgList, ArgList);

impl ArgList {
    pub fn args(&self) -> impl Iterator<Item = PhpSyntaxNode> + '_ {
        self.syntax
            .children()
            .filter(|c| c.kind() == PhpSyntaxKind::Arg)
    }
}

ast_node!(IssetExpr, IssetExpr);

impl IssetExpr {
    pub fn args(&self) -> impl Iterator<Item = PhpSyntaxNode> + '_ {
        self.syntax
            .children()
            .find_map(ArgList::cast)
            .into_iter()
            .flat_map(|list| list.syntax().children().collect::<Vec<_>>())
            .filter(|c| c.kind() == PhpSyntaxKind::Arg)
    }
}

ast_node!(BinaryExpr, BinaryExpr);

impl BinaryExpr {
    pub fn lhs(&self) -> Option<PhpSyntaxNode> {
        self.syntax.children().next()
    }

    pub fn rhs(&self) -> Option<PhpSyntaxNode> {
        self.syntax.children().nth(1)
    }

    pub fn op_token(&self) -> Option<PhpSyntaxToken> {
        self.syntax
            .children_with_tokens()
            .filter_map(|e| e.into_token())
            .find(|t| !t.kind().is_trivia())
    }
}

ast_node!(UnaryExpr, UnaryExpr);

impl UnaryExpr {
    pub fn op_token(&self) -> Option<PhpSyntaxToken> {
        self.syntax
            .children_with_tokens()
            .filter_map(|e| e.into_token())
            .find(|t| !t.kind().is_trivia())
    }

    pub fn operand(&self) -> Option<PhpSyntaxNode> {
        self.syntax.children().next()
    }
}

ast_node!(VariableExpr, VariableExpr);

impl VariableExpr {
    /// The variable name including the `$`.
    pub fn name(&self) -> Option<String> {
        token_of_kind(&self.syntax, PhpSyntaxKind::Variable).map(|t| t.text().to_string())
    }
}

ast_node!(AssignExpr, AssignExpr);

impl AssignExpr {
    pub fn target(&self) -> Option<PhpSyntaxNode> {
        self.syntax.children().next()
    }

    pub fn value(&self) -> Option<PhpSyntaxNode> {
        self.syntax.children().nth(1)
    }
}

ast_node!(MethodDecl, MethodDecl);

impl MethodDecl {
    pub fn name(&self) -> Option<PhpSyntaxToken> {
        token_of_kind(&self.syntax, PhpSyntaxKind::Ident)
    }

    pub fn body(&self) -> Option<Block> {
        self.syntax.children().find_map(Block::cast)
    }
}

/// Kinds that represent expressions.
pub fn is_expression_kind(kind: PhpSyntaxKind) -> bool {
    use PhpSyntaxKind::*;
    matches!(
        kind,
        Literal
            | VariableExpr
            | NameExpr
            | ParenExpr
            | UnaryExpr
            | PostfixExpr
            | BinaryExpr
            | AssignExpr
            | TernaryExpr
            | CallExpr
            | NewExpr
            | MemberAccessExpr
            | ScopedAccessExpr
            | IndexExpr
            | ArrayExpr
            | Closure
            | ArrowFn
            | MatchExpr
            | IssetExpr
            | CastExpr
            | InterpolatedString
            | YieldExpr
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cst::parser::parse_php;
    use crate::version::PhpVersion;

    fn root(src: &str) -> PhpSyntaxNode {
        parse_php(src, PhpVersion::default()).root
    }

    fn first<N: AstNode>(src: &str) -> N {
        root(src).descendants().find_map(N::cast).unwrap()
    }

    #[test]
    fn if_stmt_condition() {
        let node: IfStmt = first("<?php if ($a && $b) { echo 1; } else { echo 2; }");
        let cond = node.condition().unwrap();
        assert_eq!(cond.text().to_string(), "$a && $b");
        assert!(node.else_clause().is_some());
        assert_eq!(node.then_branch().unwrap().kind(), PhpSyntaxKind::Block);
    }

    #[test]
    fn closure_parts() {
        let node: Closure =
            first("<?php $f = static function ($a) use (&$b) { return $a + $b; };");
        assert!(node.is_static());
        assert_eq!(node.param_list().unwrap().params().count(), 1);
        let uses = node.use_clause().unwrap();
        assert_eq!(
            uses.variables().map(|t| t.text().to_string()).collect::<Vec<_>>(),
            vec!["$b"]
        );
        assert!(uses.captures_by_ref());
        assert_eq!(node.body().unwrap().statements().count(), 1);
    }

    #[test]
    fn call_function_name_is_normalized() {
        let node: CallExpr = first("<?php STRLEN($s);");
        assert_eq!(node.function_name().as_deref(), Some("strlen"));
        assert_eq!(node.arg_list().unwrap().args().count(), 1);

        let node: CallExpr = first("<?php $obj->strlen($s);");
        assert_eq!(node.function_name(), None);
    }

    #[test]
    fn isset_args() {
        let node: IssetExpr = first("<?php isset($a, $b['k']);");
        let args: Vec<String> = node.args().map(|a| a.text().to_string()).collect();
        assert_eq!(args, vec!["$a", "$b['k']"]);
    }

    #[test]
    fn binary_parts() {
        let node: BinaryExpr = first("<?php $x = $a && $b;");
        assert_eq!(node.op_token().unwrap().kind(), PhpSyntaxKind::AmpAmp);
        assert_eq!(node.lhs().unwrap().text().to_string(), "$a");
        assert_eq!(node.rhs().unwrap().text().to_string(), "$b");
    }

    #[test]
    fn arrow_fn_body() {
        let node: ArrowFn = first("<?php $f = fn($x) => $x * 2;");
        assert_eq!(node.body().unwrap().text().to_string(), "$x * 2");
    }
}
