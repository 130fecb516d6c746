//! Deterministic PHP formatter
//!
//! Renders the CST back to source under a configurable style. The core is
//! a measure-then-render printer: every list-like construct (argument
//! lists, parameter lists, array literals) is first rendered speculatively
//! on one line; if that rendering fits the configured width it is kept,
//! otherwise the list breaks one-element-per-line.
//!
//! Guarantees:
//! - output depends only on the tree and the configuration, so formatting
//!   twice is a no-op
//! - comments and blank-line groupings between statements are replayed in
//!   their original relative positions
//! - a file whose parse produced errors is passed through unchanged
//!
//! Statements using the alternate `if (...): ... endif;` syntax are left
//! verbatim; they are almost always interleaved with inline HTML where
//! whitespace is content.

use rowan::TextSize;

use crate::version::PhpVersion;

use super::ast::is_expression_kind;
use super::parser::parse_php;
use super::trivia::{condition_is_multiline, condition_source, is_trailing_comment, newlines_between};
use super::{PhpSyntaxElement, PhpSyntaxKind, PhpSyntaxNode, PhpSyntaxToken};

/// Indentation unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndentStyle {
    Spaces(u8),
    Tabs,
}

/// Formatter style options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatterConfig {
    pub indentation: IndentStyle,
    pub line_width: usize,
    /// Keep a condition header that was written across multiple lines
    /// broken as the author wrote it, instead of collapsing it.
    pub preserve_breaking_condition_statement: bool,
    /// `if ($a) {` versus the brace on its own line. Declarations always
    /// put the brace on its own line.
    pub brace_on_same_line: bool,
    pub space_around_concat: bool,
    pub trailing_newline: bool,
}

impl Default for FormatterConfig {
    fn default() -> Self {
        Self {
            indentation: IndentStyle::Spaces(4),
            line_width: 120,
            preserve_breaking_condition_statement: true,
            brace_on_same_line: true,
            space_around_concat: true,
            trailing_newline: true,
        }
    }
}

/// Outcome of formatting one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatResult {
    pub formatted: String,
    pub changed: bool,
    /// True when the file had parse errors and was passed through untouched.
    pub skipped: bool,
}

/// Format a source file. Files that fail to parse are returned unchanged.
pub fn format_source(source: &str, config: &FormatterConfig, version: PhpVersion) -> FormatResult {
    let parse = parse_php(source, version);
    if parse.has_errors() {
        return FormatResult {
            formatted: source.to_string(),
            changed: false,
            skipped: true,
        };
    }

    let mut formatter = Formatter {
        source,
        config,
        out: String::new(),
        indent: 0,
        force_inline: false,
    };
    formatter.statement_list(&parse.root);

    let mut formatted = formatter.out;
    while formatted.ends_with('\n') || formatted.ends_with(' ') || formatted.ends_with('\t') {
        formatted.pop();
    }
    if config.trailing_newline && !formatted.is_empty() {
        formatted.push('\n');
    }

    FormatResult {
        changed: formatted != source,
        formatted,
        skipped: false,
    }
}

struct Formatter<'a> {
    source: &'a str,
    config: &'a FormatterConfig,
    out: String,
    indent: usize,
    /// Measuring mode: lists never break.
    force_inline: bool,
}

impl<'a> Formatter<'a> {
    // === Output primitives ===

    fn write(&mut self, text: &str) {
        self.out.push_str(text);
    }

    fn column(&self) -> usize {
        match self.out.rfind('\n') {
            Some(i) => self.out.len() - i - 1,
            None => self.out.len(),
        }
    }

    fn ensure_newline(&mut self) {
        while self.out.ends_with(' ') || self.out.ends_with('\t') {
            self.out.pop();
        }
        if !self.out.is_empty() && !self.out.ends_with('\n') {
            self.out.push('\n');
        }
    }

    fn write_indent(&mut self) {
        match self.config.indentation {
            IndentStyle::Spaces(n) => {
                for _ in 0..self.indent * n as usize {
                    self.out.push(' ');
                }
            }
            IndentStyle::Tabs => {
                for _ in 0..self.indent {
                    self.out.push('\t');
                }
            }
        }
    }

    fn break_line(&mut self) {
        self.ensure_newline();
        self.write_indent();
    }

    /// Space unless the output already ends with one (or a newline).
    fn pad(&mut self) {
        if !self.out.is_empty()
            && !self.out.ends_with(' ')
            && !self.out.ends_with('\n')
            && !self.out.ends_with('\t')
        {
            self.out.push(' ');
        }
    }

    fn trim_spaces(&mut self) {
        while self.out.ends_with(' ') {
            self.out.pop();
        }
    }

    /// Inline lists carry no trailing comma even when the source had one.
    fn trim_list_tail(&mut self) {
        self.trim_spaces();
        if self.out.ends_with(',') {
            self.out.pop();
        }
    }

    /// A comment inside an expression. Block comments stay in the flow; a
    /// line comment ends the line, so an inline measurement that contains
    /// one can never fit and the enclosing group breaks.
    fn inline_comment(&mut self, token: &PhpSyntaxToken) {
        if !self.out.ends_with('(') && !self.out.ends_with('[') {
            self.pad();
        }
        self.write(token.text());
        if token.kind() == PhpSyntaxKind::CommentLine {
            self.break_line();
        } else {
            self.write(" ");
        }
    }

    /// A comment between the entries of a broken list: kept on the entry's
    /// line when the author wrote it there, otherwise on its own line.
    fn entry_comment(&mut self, token: &PhpSyntaxToken, prev_end: TextSize) {
        if is_trailing_comment(self.source, prev_end, token) && !self.out.ends_with('\n') {
            self.pad();
            self.write(token.text());
        } else {
            self.break_line();
            self.write(token.text());
        }
    }

    /// `;` after trimming any space a preceding comment left behind.
    fn terminator(&mut self) {
        self.trim_spaces();
        self.write(";");
    }

    fn verbatim(&mut self, node: &PhpSyntaxNode) {
        let range = node.text_range();
        self.write(&self.source[usize::from(range.start())..usize::from(range.end())]);
    }

    /// Render `node` fully inline, returning the text. Constructs that can
    /// never be inline (closure bodies, match arms) keep their newlines, so
    /// callers check for `\n` to know whether inlining succeeded.
    fn probe(&self, node: &PhpSyntaxNode, render: fn(&mut Formatter<'_>, &PhpSyntaxNode)) -> String {
        let mut sub = Formatter {
            source: self.source,
            config: self.config,
            out: String::new(),
            indent: self.indent,
            force_inline: true,
        };
        render(&mut sub, node);
        sub.out
    }

    fn fits(&self, text: &str) -> bool {
        !text.contains('\n') && self.column() + text.len() <= self.config.line_width
    }

    // === Statement lists ===

    fn statement_list(&mut self, parent: &PhpSyntaxNode) {
        let mut prev_end = parent.text_range().start();
        for element in parent.children_with_tokens() {
            match element {
                PhpSyntaxElement::Token(token) => {
                    match token.kind() {
                        // no forced break before the tag: after inline HTML
                        // the tag stays where the markup put it
                        PhpSyntaxKind::OpenTag => self.write("<?php"),
                        PhpSyntaxKind::CloseTag => {
                            if self.out.ends_with('\n') {
                                self.write("?>");
                            } else {
                                self.pad();
                                self.write("?>");
                            }
                        }
                        k if k.is_comment() => {
                            if is_trailing_comment(self.source, prev_end, &token)
                                && !self.out.is_empty()
                                && !self.out.ends_with('\n')
                            {
                                self.pad();
                                self.write(token.text());
                            } else {
                                self.blank_line_gap(prev_end, token.text_range().start());
                                self.break_line();
                                self.write(token.text());
                            }
                        }
                        // whitespace is re-derived; braces are written by
                        // the construct that owns them
                        _ => {}
                    }
                    prev_end = token.text_range().end();
                }
                PhpSyntaxElement::Node(node) => {
                    self.blank_line_gap(prev_end, node.text_range().start());
                    self.emit_statement(&node);
                    prev_end = node.text_range().end();
                }
            }
        }
    }

    fn blank_line_gap(&mut self, prev_end: TextSize, start: TextSize) {
        if !self.out.is_empty() && newlines_between(self.source, prev_end, start) >= 2 {
            self.ensure_newline();
            self.out.push('\n');
        }
    }

    // === Statements ===

    fn emit_statement(&mut self, node: &PhpSyntaxNode) {
        use PhpSyntaxKind::*;
        match node.kind() {
            InlineHtmlStmt => {
                self.verbatim(node);
                return;
            }
            EchoStmt if first_token_is(node, OpenTagEcho) => {
                self.echo_tag(node);
                return;
            }
            ErrorNode => {
                self.break_line();
                self.verbatim(node);
                return;
            }
            _ => {}
        }

        if uses_alternate_syntax(node) {
            self.break_line();
            self.verbatim(node);
            return;
        }

        self.break_line();
        self.statement(node);
    }

    fn statement(&mut self, node: &PhpSyntaxNode) {
        use PhpSyntaxKind::*;
        match node.kind() {
            Block => self.block(node, false),
            IfStmt => self.if_stmt(node),
            WhileStmt | ForStmt | ForeachStmt => self.loop_stmt(node),
            DoWhileStmt => self.do_while(node),
            SwitchStmt => self.switch_stmt(node),
            TryStmt => self.try_stmt(node),
            FunctionDecl => self.function_decl(node),
            ClassDecl | InterfaceDecl | TraitDecl | EnumDecl => self.class_like(node),
            NamespaceDecl => self.namespace_decl(node),
            DeclareStmt => self.declare_stmt(node),
            EchoStmt => {
                self.write("echo");
                self.expr_list_tail(node);
                self.terminator();
            }
            ExpressionStmt => {
                for element in node.children_with_tokens() {
                    match element {
                        PhpSyntaxElement::Node(n) => self.expr(&n),
                        PhpSyntaxElement::Token(t) if t.kind().is_comment() => {
                            self.inline_comment(&t)
                        }
                        _ => {}
                    }
                }
                self.terminator();
            }
            ReturnStmt | ThrowStmt | BreakStmt | ContinueStmt => {
                self.write(keyword_text(node.kind()));
                self.expr_list_tail(node);
                self.terminator();
            }
            GlobalStmt | StaticVarStmt | UnsetStmt | UseDecl | ConstDecl | PropertyDecl
            | TraitUse | EnumCase => {
                self.attributes_on_own_lines(node);
                self.inline_glue(node);
            }
            MethodDecl => self.method_decl(node),
            _ => {
                // anything unexpected keeps its source form
                self.verbatim(node);
            }
        }
    }

    /// ` expr, expr` after a statement keyword, if any operands exist.
    fn expr_list_tail(&mut self, node: &PhpSyntaxNode) {
        for element in node.children_with_tokens() {
            match element {
                PhpSyntaxElement::Node(n) => {
                    self.pad();
                    self.expr(&n);
                }
                PhpSyntaxElement::Token(t) => match t.kind() {
                    PhpSyntaxKind::Comma => {
                        self.trim_spaces();
                        self.write(",");
                    }
                    k if k.is_comment() => self.inline_comment(&t),
                    _ => {}
                },
            }
        }
    }

    fn echo_tag(&mut self, node: &PhpSyntaxNode) {
        self.write("<?=");
        self.expr_list_tail(node);
        if node
            .children_with_tokens()
            .filter_map(|e| e.into_token())
            .any(|t| t.kind() == PhpSyntaxKind::Semicolon)
        {
            self.terminator();
        }
    }

    // === Control structures ===

    /// `kw (header)` with the collapse/preserve behavior for multi-line
    /// headers.
    fn condition_header(&mut self, node: &PhpSyntaxNode, keyword: &str) {
        self.write(keyword);
        self.write(" (");
        if self.config.preserve_breaking_condition_statement
            && condition_is_multiline(self.source, node)
        {
            if let Some(text) = condition_source(self.source, node) {
                self.write(text);
                self.write(")");
                return;
            }
        }
        self.header_contents(node);
        self.trim_spaces();
        self.write(")");
    }

    /// The pieces between the statement's own parentheses, rendered inline:
    /// expressions, `;` separators (for), `as`/`=>`/`&` (foreach).
    fn header_contents(&mut self, node: &PhpSyntaxNode) {
        use PhpSyntaxKind::*;
        let mut inside = false;
        let mut depth = 0usize;
        for element in node.children_with_tokens() {
            match element {
                PhpSyntaxElement::Token(token) => match token.kind() {
                    LParen => {
                        depth += 1;
                        inside = true;
                    }
                    RParen => {
                        depth = depth.saturating_sub(1);
                        if depth == 0 {
                            return;
                        }
                    }
                    Semicolon if inside => self.write("; "),
                    Comma if inside => self.write(", "),
                    AsKw if inside => self.write(" as "),
                    DoubleArrow if inside => self.write(" => "),
                    Amp if inside => {
                        self.pad();
                        self.write("&");
                    }
                    k if k.is_comment() && inside => self.inline_comment(&token),
                    _ => {}
                },
                PhpSyntaxElement::Node(n) => {
                    if inside {
                        self.expr(&n);
                    }
                }
            }
        }
    }

    fn body_after_header(&mut self, body: Option<PhpSyntaxNode>) {
        match body {
            Some(node) if node.kind() == PhpSyntaxKind::Block => {
                self.block(&node, self.config.brace_on_same_line);
            }
            Some(node) => {
                self.indent += 1;
                self.break_line();
                self.statement(&node);
                self.indent -= 1;
            }
            None => {}
        }
    }

    fn if_stmt(&mut self, node: &PhpSyntaxNode) {
        use PhpSyntaxKind::*;
        self.condition_header(node, "if");
        self.body_after_header(then_branch(node));

        for clause in node.children() {
            match clause.kind() {
                ElseifClause => {
                    self.clause_separator();
                    self.condition_header(&clause, "elseif");
                    self.body_after_header(clause_body(&clause));
                }
                ElseClause => {
                    self.clause_separator();
                    self.write("else");
                    match clause_body(&clause) {
                        // `else if (...)` continues on the same line
                        Some(body) if body.kind() == IfStmt => {
                            self.write(" ");
                            self.if_stmt(&body);
                        }
                        body => self.body_after_header(body),
                    }
                }
                _ => {}
            }
        }
    }

    /// ` ` after `}` when braces sit on the statement line, otherwise a
    /// fresh line for the `elseif`/`else`/`catch` keyword.
    fn clause_separator(&mut self) {
        if self.out.ends_with('}') && self.config.brace_on_same_line {
            self.write(" ");
        } else {
            self.break_line();
        }
    }

    fn loop_stmt(&mut self, node: &PhpSyntaxNode) {
        let keyword = keyword_text(node.kind());
        self.condition_header(node, keyword);
        self.body_after_header(then_branch(node));
    }

    fn do_while(&mut self, node: &PhpSyntaxNode) {
        self.write("do");
        let body = node
            .children()
            .find(|c| c.kind() == PhpSyntaxKind::Block || !is_expression_kind(c.kind()));
        self.body_after_header(body);
        if self.out.ends_with('}') {
            self.write(" ");
        } else {
            self.break_line();
        }
        self.write("while (");
        // the condition is the last expression child
        if let Some(cond) = node
            .children()
            .filter(|c| is_expression_kind(c.kind()))
            .last()
        {
            self.expr(&cond);
        }
        self.write(");");
    }

    fn switch_stmt(&mut self, node: &PhpSyntaxNode) {
        self.condition_header(node, "switch");
        if self.config.brace_on_same_line {
            self.write(" {");
        } else {
            self.break_line();
            self.write("{");
        }
        self.indent += 1;
        for case in node
            .children()
            .filter(|c| c.kind() == PhpSyntaxKind::SwitchCase)
        {
            self.break_line();
            if first_token_is(&case, PhpSyntaxKind::DefaultKw) {
                self.write("default:");
            } else {
                self.write("case ");
                if let Some(value) = case.children().find(|c| is_expression_kind(c.kind())) {
                    self.expr(&value);
                }
                self.write(":");
            }
            self.indent += 1;
            let mut prev_end = case.text_range().start();
            for child in case.children() {
                if is_expression_kind(child.kind())
                    && case
                        .children()
                        .find(|c| is_expression_kind(c.kind()))
                        .as_ref()
                        == Some(&child)
                    && !first_token_is(&case, PhpSyntaxKind::DefaultKw)
                {
                    prev_end = child.text_range().end();
                    continue; // the case value
                }
                self.blank_line_gap(prev_end, child.text_range().start());
                self.emit_statement(&child);
                prev_end = child.text_range().end();
            }
            self.indent -= 1;
        }
        self.indent -= 1;
        self.break_line();
        self.write("}");
    }

    fn try_stmt(&mut self, node: &PhpSyntaxNode) {
        use PhpSyntaxKind::*;
        self.write("try");
        if let Some(block) = node.children().find(|c| c.kind() == Block) {
            self.block(&block, self.config.brace_on_same_line);
        }
        for clause in node.children() {
            match clause.kind() {
                CatchClause => {
                    self.clause_separator();
                    self.write("catch (");
                    for element in clause.children_with_tokens() {
                        match element {
                            PhpSyntaxElement::Node(n) if n.kind() != Block => self.expr(&n),
                            PhpSyntaxElement::Token(t) if t.kind() == Variable => {
                                self.pad();
                                self.write(t.text());
                            }
                            _ => {}
                        }
                    }
                    self.write(")");
                    if let Some(block) = clause.children().find(|c| c.kind() == Block) {
                        self.block(&block, self.config.brace_on_same_line);
                    }
                }
                FinallyClause => {
                    self.clause_separator();
                    self.write("finally");
                    if let Some(block) = clause.children().find(|c| c.kind() == Block) {
                        self.block(&block, self.config.brace_on_same_line);
                    }
                }
                _ => {}
            }
        }
    }

    fn block(&mut self, node: &PhpSyntaxNode, same_line: bool) {
        if same_line {
            self.pad();
            self.write("{");
        } else {
            self.break_line();
            self.write("{");
        }
        self.indent += 1;
        self.statement_list(node);
        self.indent -= 1;
        self.break_line();
        self.write("}");
    }

    // === Declarations ===

    fn attributes_on_own_lines(&mut self, node: &PhpSyntaxNode) {
        for attrs in node
            .children()
            .filter(|c| c.kind() == PhpSyntaxKind::AttributeList)
        {
            self.attribute_list(&attrs);
            self.break_line();
        }
    }

    fn attribute_list(&mut self, node: &PhpSyntaxNode) {
        self.write("#[");
        let mut first = true;
        for attr in node
            .children()
            .filter(|c| c.kind() == PhpSyntaxKind::Attribute)
        {
            if !first {
                self.write(", ");
            }
            first = false;
            for element in attr.children_with_tokens() {
                match element {
                    PhpSyntaxElement::Node(n) if n.kind() == PhpSyntaxKind::ArgList => {
                        self.arg_list(&n)
                    }
                    PhpSyntaxElement::Node(n) => self.expr(&n),
                    PhpSyntaxElement::Token(t)
                        if matches!(
                            t.kind(),
                            PhpSyntaxKind::Ident | PhpSyntaxKind::Backslash
                        ) =>
                    {
                        self.write(t.text())
                    }
                    _ => {}
                }
            }
        }
        self.write("]");
    }

    fn function_decl(&mut self, node: &PhpSyntaxNode) {
        use PhpSyntaxKind::*;
        self.attributes_on_own_lines(node);
        self.write("function ");
        if token_in(node, Amp) {
            self.write("&");
        }
        if let Some(name) = direct_token_text(node, Ident) {
            self.write(&name);
        }
        self.signature_tail(node);
        if let Some(block) = node.children().find(|c| c.kind() == Block) {
            self.block(&block, false);
        }
    }

    fn method_decl(&mut self, node: &PhpSyntaxNode) {
        use PhpSyntaxKind::*;
        self.attributes_on_own_lines(node);
        for token in node.children_with_tokens().filter_map(|e| e.into_token()) {
            match token.kind() {
                PublicKw | ProtectedKw | PrivateKw | StaticKw | AbstractKw | FinalKw
                | ReadonlyKw => {
                    self.write(token.text());
                    self.write(" ");
                }
                FunctionKw => break,
                _ => {}
            }
        }
        self.write("function ");
        if token_in(node, Amp) {
            self.write("&");
        }
        // the method name follows `function`; it may be a keyword
        if let Some(name) = node
            .children_with_tokens()
            .filter_map(|e| e.into_token())
            .skip_while(|t| t.kind() != FunctionKw)
            .skip(1)
            .find(|t| !t.kind().is_trivia() && t.kind() != Amp)
        {
            if name.kind() != LParen {
                self.write(name.text());
            }
        }
        self.signature_tail(node);
        match node.children().find(|c| c.kind() == Block) {
            Some(block) => self.block(&block, false),
            None => self.write(";"),
        }
    }

    /// Parameter list plus optional `: ReturnType`.
    fn signature_tail(&mut self, node: &PhpSyntaxNode) {
        use PhpSyntaxKind::*;
        if let Some(params) = node.children().find(|c| c.kind() == ParamList) {
            self.param_list(&params);
        }
        if let Some(ty) = node.children().find(|c| {
            matches!(
                c.kind(),
                SimpleType | NullableType | UnionType | IntersectionType
            )
        }) {
            self.write(": ");
            self.expr(&ty);
        }
    }

    fn class_like(&mut self, node: &PhpSyntaxNode) {
        use PhpSyntaxKind::*;
        self.attributes_on_own_lines(node);
        let mut wrote_extends = false;
        let mut wrote_implements = false;
        for element in node.children_with_tokens() {
            match element {
                PhpSyntaxElement::Token(token) => match token.kind() {
                    AbstractKw | FinalKw | ReadonlyKw | ClassKw | InterfaceKw | TraitKw
                    | EnumKw => {
                        self.write(token.text());
                        self.write(" ");
                    }
                    Ident => {
                        self.write(token.text());
                    }
                    Colon => self.write(": "),
                    ExtendsKw => {
                        self.write(" extends ");
                        wrote_extends = true;
                    }
                    ImplementsKw => {
                        self.write(" implements ");
                        wrote_implements = true;
                    }
                    Comma if wrote_extends || wrote_implements => self.write(", "),
                    Backslash => self.write("\\"),
                    _ => {}
                },
                PhpSyntaxElement::Node(n) => match n.kind() {
                    ClassBody => {
                        self.break_line();
                        self.write("{");
                        self.indent += 1;
                        self.statement_list(&n);
                        self.indent -= 1;
                        self.break_line();
                        self.write("}");
                    }
                    AttributeList => {}
                    _ => self.expr(&n),
                },
            }
        }
    }

    fn namespace_decl(&mut self, node: &PhpSyntaxNode) {
        self.write("namespace");
        let mut has_name = false;
        for token in node.children_with_tokens().filter_map(|e| e.into_token()) {
            match token.kind() {
                PhpSyntaxKind::Ident => {
                    if !has_name {
                        self.write(" ");
                        has_name = true;
                    }
                    self.write(token.text());
                }
                PhpSyntaxKind::Backslash => self.write("\\"),
                _ => {}
            }
        }
        match node.children().find(|c| c.kind() == PhpSyntaxKind::Block) {
            Some(block) => self.block(&block, self.config.brace_on_same_line),
            None => self.write(";"),
        }
    }

    fn declare_stmt(&mut self, node: &PhpSyntaxNode) {
        use PhpSyntaxKind::*;
        self.write("declare(");
        let mut inside = false;
        for element in node.children_with_tokens() {
            match element {
                PhpSyntaxElement::Token(token) => match token.kind() {
                    LParen => inside = true,
                    RParen => inside = false,
                    Ident if inside => self.write(token.text()),
                    Equals if inside => self.write("="),
                    Comma if inside => self.write(", "),
                    _ => {}
                },
                PhpSyntaxElement::Node(n) => {
                    if inside {
                        self.expr(&n);
                    }
                }
            }
        }
        self.write(")");
        match node.children().find(|c| c.kind() == Block) {
            Some(block) => self.block(&block, self.config.brace_on_same_line),
            None => self.write(";"),
        }
    }

    // === Expressions ===

    fn expr(&mut self, node: &PhpSyntaxNode) {
        use PhpSyntaxKind::*;
        match node.kind() {
            Literal | VariableExpr | NameExpr | SimpleType | NullableType | UnionType
            | IntersectionType => self.compact(node),
            InterpolatedString | ErrorNode => self.verbatim(node),
            ParenExpr => {
                self.write("(");
                for element in node.children_with_tokens() {
                    match element {
                        PhpSyntaxElement::Node(n) => self.expr(&n),
                        PhpSyntaxElement::Token(t) if t.kind().is_comment() => {
                            self.inline_comment(&t)
                        }
                        _ => {}
                    }
                }
                self.trim_spaces();
                self.write(")");
            }
            BinaryExpr => self.binary(node),
            AssignExpr => self.assign(node),
            TernaryExpr => self.ternary(node),
            UnaryExpr | PostfixExpr | YieldExpr => self.inline_glue(node),
            CastExpr => {
                if let Some(cast) = direct_token_text(node, Cast) {
                    let compact: String =
                        cast.chars().filter(|c| !c.is_whitespace()).collect();
                    self.write(&compact);
                    self.write(" ");
                }
                for child in node.children() {
                    self.expr(&child);
                }
            }
            CallExpr | IssetExpr => {
                for element in node.children_with_tokens() {
                    match element {
                        PhpSyntaxElement::Node(n) if n.kind() == ArgList => self.arg_list(&n),
                        PhpSyntaxElement::Node(n) => self.expr(&n),
                        PhpSyntaxElement::Token(t) if t.kind() == IssetKw => {
                            self.write(t.text())
                        }
                        _ => {}
                    }
                }
            }
            MemberAccessExpr | ScopedAccessExpr | IndexExpr => self.access(node),
            NewExpr => self.new_expr(node),
            ArrayExpr => self.array_expr(node),
            ArrayItem => self.array_item(node),
            Closure => self.closure(node),
            ArrowFn => self.arrow_fn(node),
            MatchExpr => self.match_expr(node),
            Arg => self.arg(node),
            Param => self.param(node),
            ParamList => self.param_list(node),
            ArgList => self.arg_list(node),
            _ => self.inline_glue(node),
        }
    }

    /// Tokens joined with no spaces at all (names, literals, types).
    fn compact(&mut self, node: &PhpSyntaxNode) {
        for element in node.children_with_tokens() {
            match element {
                PhpSyntaxElement::Token(t) if !t.kind().is_trivia() => self.write(t.text()),
                PhpSyntaxElement::Token(t) if t.kind().is_comment() => self.inline_comment(&t),
                PhpSyntaxElement::Node(n) => self.compact(&n),
                _ => {}
            }
        }
    }

    fn binary(&mut self, node: &PhpSyntaxNode) {
        use PhpSyntaxKind::*;
        for element in node.children_with_tokens() {
            match element {
                PhpSyntaxElement::Node(n) => self.expr(&n),
                PhpSyntaxElement::Token(t) if t.kind().is_comment() => self.inline_comment(&t),
                PhpSyntaxElement::Token(t) if !t.kind().is_trivia() => {
                    if t.kind() == Dot && !self.config.space_around_concat {
                        self.write(".");
                    } else {
                        self.pad();
                        self.write(t.text());
                        self.write(" ");
                    }
                }
                _ => {}
            }
        }
    }

    fn assign(&mut self, node: &PhpSyntaxNode) {
        use PhpSyntaxKind::*;
        for element in node.children_with_tokens() {
            match element {
                PhpSyntaxElement::Node(n) => self.expr(&n),
                PhpSyntaxElement::Token(t) if t.kind().is_comment() => self.inline_comment(&t),
                PhpSyntaxElement::Token(t) if t.kind().is_assignment_op() => {
                    self.pad();
                    self.write(t.text());
                    self.write(" ");
                }
                PhpSyntaxElement::Token(t) if t.kind() == Amp => self.write("&"),
                _ => {}
            }
        }
    }

    fn ternary(&mut self, node: &PhpSyntaxNode) {
        use PhpSyntaxKind::*;
        // `$a ?: $b` when the middle operand is absent
        let short = node
            .children_with_tokens()
            .filter(|e| !e.as_token().is_some_and(|t| t.kind().is_trivia()))
            .collect::<Vec<_>>()
            .windows(2)
            .any(|w| {
                w[0].as_token().is_some_and(|t| t.kind() == Question)
                    && w[1].as_token().is_some_and(|t| t.kind() == Colon)
            });
        let mut skip_colon = false;
        for element in node.children_with_tokens() {
            match element {
                PhpSyntaxElement::Node(n) => self.expr(&n),
                PhpSyntaxElement::Token(t) => match t.kind() {
                    Question if short => {
                        self.write(" ?: ");
                        skip_colon = true;
                    }
                    Question => self.write(" ? "),
                    Colon if skip_colon => skip_colon = false,
                    Colon => self.write(" : "),
                    k if k.is_comment() => self.inline_comment(&t),
                    _ => {}
                },
            }
        }
    }

    /// `->`, `?->`, `::` chains and `[...]` indexing; everything attaches.
    fn access(&mut self, node: &PhpSyntaxNode) {
        for element in node.children_with_tokens() {
            match element {
                PhpSyntaxElement::Node(n) => self.expr(&n),
                PhpSyntaxElement::Token(t) if t.kind().is_comment() => self.inline_comment(&t),
                PhpSyntaxElement::Token(t) if !t.kind().is_trivia() => self.write(t.text()),
                _ => {}
            }
        }
    }

    fn new_expr(&mut self, node: &PhpSyntaxNode) {
        use PhpSyntaxKind::*;
        self.write("new ");
        for element in node.children_with_tokens() {
            match element {
                PhpSyntaxElement::Node(n) => match n.kind() {
                    ArgList => self.arg_list(&n),
                    ClassBody => {
                        // anonymous class body
                        self.pad();
                        self.write("{");
                        self.indent += 1;
                        self.statement_list(&n);
                        self.indent -= 1;
                        self.break_line();
                        self.write("}");
                    }
                    _ => self.expr(&n),
                },
                PhpSyntaxElement::Token(t) => match t.kind() {
                    ClassKw => self.write("class"),
                    ExtendsKw => self.write(" extends "),
                    ImplementsKw => self.write(" implements "),
                    Comma => self.write(", "),
                    Ident => self.write(t.text()),
                    Backslash => self.write("\\"),
                    _ => {}
                },
            }
        }
    }

    fn array_expr(&mut self, node: &PhpSyntaxNode) {
        let items: Vec<_> = node
            .children()
            .filter(|c| c.kind() == PhpSyntaxKind::ArrayItem)
            .collect();
        if items.is_empty() {
            self.write("[]");
            return;
        }
        if !self.force_inline {
            let inline = self.probe(node, |f, n| f.render_array_inline(n));
            if !self.fits(&inline) {
                self.write("[");
                self.indent += 1;
                let mut prev_end = node.text_range().start();
                for element in node.children_with_tokens() {
                    match element {
                        PhpSyntaxElement::Node(n) if n.kind() == PhpSyntaxKind::ArrayItem => {
                            self.break_line();
                            self.array_item(&n);
                            self.write(",");
                            prev_end = n.text_range().end();
                        }
                        PhpSyntaxElement::Token(t) if t.kind().is_comment() => {
                            self.entry_comment(&t, prev_end);
                            prev_end = t.text_range().end();
                        }
                        // whitespace never moves the anchor: a comment is
                        // trailing only relative to real content
                        PhpSyntaxElement::Token(t) if !t.kind().is_trivia() => {
                            prev_end = t.text_range().end()
                        }
                        _ => {}
                    }
                }
                self.indent -= 1;
                self.break_line();
                self.write("]");
                return;
            }
        }
        self.render_array_inline(node);
    }

    fn render_array_inline(&mut self, node: &PhpSyntaxNode) {
        self.write("[");
        for element in node.children_with_tokens() {
            match element {
                PhpSyntaxElement::Node(n) if n.kind() == PhpSyntaxKind::ArrayItem => {
                    self.array_item(&n)
                }
                PhpSyntaxElement::Token(t) => match t.kind() {
                    PhpSyntaxKind::Comma => {
                        self.trim_spaces();
                        self.write(", ");
                    }
                    k if k.is_comment() => self.inline_comment(&t),
                    _ => {}
                },
                _ => {}
            }
        }
        self.trim_list_tail();
        self.write("]");
    }

    fn array_item(&mut self, node: &PhpSyntaxNode) {
        use PhpSyntaxKind::*;
        for element in node.children_with_tokens() {
            match element {
                PhpSyntaxElement::Node(n) => self.expr(&n),
                PhpSyntaxElement::Token(t) => match t.kind() {
                    DoubleArrow => self.write(" => "),
                    Ellipsis => self.write("..."),
                    Amp => self.write("&"),
                    k if k.is_comment() => self.inline_comment(&t),
                    _ => {}
                },
            }
        }
    }

    fn arg_list(&mut self, node: &PhpSyntaxNode) {
        let args: Vec<_> = node
            .children()
            .filter(|c| c.kind() == PhpSyntaxKind::Arg)
            .collect();

        // first-class callable `f(...)`
        if args.is_empty() {
            if token_in(node, PhpSyntaxKind::Ellipsis) {
                self.write("(...)");
            } else {
                self.write("(");
                for element in node.children_with_tokens() {
                    if let PhpSyntaxElement::Token(t) = element {
                        if t.kind().is_comment() {
                            self.inline_comment(&t);
                        }
                    }
                }
                self.trim_spaces();
                self.write(")");
            }
            return;
        }

        if !self.force_inline {
            let inline = self.probe(node, |f, n| f.render_args_inline(n));
            if self.fits(&inline) {
                self.write(&inline);
                return;
            }
            // a single trailing multi-line argument (closure, match,
            // array) stays attached: foo($x, function () { ... })
            let last_is_structural = args.last().is_some_and(|a| {
                a.children().next().is_some_and(|c| {
                    matches!(
                        c.kind(),
                        PhpSyntaxKind::Closure | PhpSyntaxKind::MatchExpr | PhpSyntaxKind::ArrayExpr
                    )
                })
            });
            if last_is_structural {
                let head_ok = args[..args.len() - 1]
                    .iter()
                    .all(|a| !self.probe(a, |f, n| f.arg(n)).contains('\n'));
                if head_ok {
                    self.render_args_inline(node);
                    return;
                }
            }
            self.write("(");
            self.indent += 1;
            let mut prev_end = node.text_range().start();
            for element in node.children_with_tokens() {
                match element {
                    PhpSyntaxElement::Node(n) if n.kind() == PhpSyntaxKind::Arg => {
                        self.break_line();
                        self.arg(&n);
                        self.write(",");
                        prev_end = n.text_range().end();
                    }
                    PhpSyntaxElement::Token(t) if t.kind().is_comment() => {
                        self.entry_comment(&t, prev_end);
                        prev_end = t.text_range().end();
                    }
                    // whitespace never moves the anchor: a comment is
                    // trailing only relative to real content
                    PhpSyntaxElement::Token(t) if !t.kind().is_trivia() => {
                        prev_end = t.text_range().end()
                    }
                    _ => {}
                }
            }
            self.indent -= 1;
            self.break_line();
            self.write(")");
            return;
        }
        self.render_args_inline(node);
    }

    fn render_args_inline(&mut self, node: &PhpSyntaxNode) {
        self.write("(");
        for element in node.children_with_tokens() {
            match element {
                PhpSyntaxElement::Node(n) if n.kind() == PhpSyntaxKind::Arg => self.arg(&n),
                PhpSyntaxElement::Token(t) => match t.kind() {
                    PhpSyntaxKind::Comma => {
                        self.trim_spaces();
                        self.write(", ");
                    }
                    k if k.is_comment() => self.inline_comment(&t),
                    _ => {}
                },
                _ => {}
            }
        }
        self.trim_list_tail();
        self.write(")");
    }

    fn arg(&mut self, node: &PhpSyntaxNode) {
        use PhpSyntaxKind::*;
        for element in node.children_with_tokens() {
            match element {
                PhpSyntaxElement::Node(n) => self.expr(&n),
                PhpSyntaxElement::Token(t) => match t.kind() {
                    Ident => self.write(t.text()),
                    Colon => self.write(": "),
                    Ellipsis => self.write("..."),
                    Amp => self.write("&"),
                    k if k.is_comment() => self.inline_comment(&t),
                    _ => {}
                },
            }
        }
    }

    fn param_list(&mut self, node: &PhpSyntaxNode) {
        let params: Vec<_> = node
            .children()
            .filter(|c| c.kind() == PhpSyntaxKind::Param)
            .collect();
        if params.is_empty() {
            self.write("()");
            return;
        }
        if !self.force_inline {
            let inline = self.probe(node, |f, n| f.render_params_inline(n));
            if !self.fits(&inline) {
                self.write("(");
                self.indent += 1;
                let mut prev_end = node.text_range().start();
                for element in node.children_with_tokens() {
                    match element {
                        PhpSyntaxElement::Node(n) if n.kind() == PhpSyntaxKind::Param => {
                            self.break_line();
                            self.param(&n);
                            self.write(",");
                            prev_end = n.text_range().end();
                        }
                        PhpSyntaxElement::Token(t) if t.kind().is_comment() => {
                            self.entry_comment(&t, prev_end);
                            prev_end = t.text_range().end();
                        }
                        // whitespace never moves the anchor: a comment is
                        // trailing only relative to real content
                        PhpSyntaxElement::Token(t) if !t.kind().is_trivia() => {
                            prev_end = t.text_range().end()
                        }
                        _ => {}
                    }
                }
                self.indent -= 1;
                self.break_line();
                self.write(")");
                return;
            }
        }
        self.render_params_inline(node);
    }

    fn render_params_inline(&mut self, node: &PhpSyntaxNode) {
        self.write("(");
        for element in node.children_with_tokens() {
            match element {
                PhpSyntaxElement::Node(n) if n.kind() == PhpSyntaxKind::Param => self.param(&n),
                PhpSyntaxElement::Token(t) => match t.kind() {
                    PhpSyntaxKind::Comma => {
                        self.trim_spaces();
                        self.write(", ");
                    }
                    k if k.is_comment() => self.inline_comment(&t),
                    _ => {}
                },
                _ => {}
            }
        }
        self.trim_list_tail();
        self.write(")");
    }

    fn param(&mut self, node: &PhpSyntaxNode) {
        use PhpSyntaxKind::*;
        for element in node.children_with_tokens() {
            match element {
                PhpSyntaxElement::Node(n) => match n.kind() {
                    AttributeList => {
                        self.attribute_list(&n);
                        self.write(" ");
                    }
                    SimpleType | NullableType | UnionType | IntersectionType => {
                        self.expr(&n);
                        self.write(" ");
                    }
                    _ => self.expr(&n),
                },
                PhpSyntaxElement::Token(t) => match t.kind() {
                    PublicKw | ProtectedKw | PrivateKw | ReadonlyKw => {
                        self.write(t.text());
                        self.write(" ");
                    }
                    Amp => self.write("&"),
                    Ellipsis => self.write("..."),
                    Variable => self.write(t.text()),
                    Equals => self.write(" = "),
                    k if k.is_comment() => self.inline_comment(&t),
                    _ => {}
                },
            }
        }
    }

    fn closure(&mut self, node: &PhpSyntaxNode) {
        use PhpSyntaxKind::*;
        for attrs in node.children().filter(|c| c.kind() == AttributeList) {
            self.attribute_list(&attrs);
            self.write(" ");
        }
        if token_in(node, StaticKw) {
            self.write("static ");
        }
        self.write("function ");
        if token_in(node, Amp) {
            self.write("&");
        }
        if let Some(params) = node.children().find(|c| c.kind() == ParamList) {
            self.param_list(&params);
        }
        if let Some(uses) = node.children().find(|c| c.kind() == ClosureUse) {
            self.write(" use (");
            let mut by_ref = false;
            let mut first = true;
            for token in uses.children_with_tokens().filter_map(|e| e.into_token()) {
                match token.kind() {
                    Amp => by_ref = true,
                    Variable => {
                        if !first {
                            self.write(", ");
                        }
                        first = false;
                        if by_ref {
                            self.write("&");
                            by_ref = false;
                        }
                        self.write(token.text());
                    }
                    _ => {}
                }
            }
            self.write(")");
        }
        if let Some(ty) = node.children().find(|c| {
            matches!(
                c.kind(),
                SimpleType | NullableType | UnionType | IntersectionType
            )
        }) {
            self.write(": ");
            self.expr(&ty);
        }
        if let Some(block) = node.children().find(|c| c.kind() == Block) {
            self.block(&block, true);
        }
    }

    fn arrow_fn(&mut self, node: &PhpSyntaxNode) {
        use PhpSyntaxKind::*;
        if token_in(node, StaticKw) {
            self.write("static ");
        }
        self.write("fn");
        if token_in(node, Amp) {
            self.write("&");
        }
        if let Some(params) = node.children().find(|c| c.kind() == ParamList) {
            self.param_list(&params);
        }
        if let Some(ty) = node.children().find(|c| {
            matches!(
                c.kind(),
                SimpleType | NullableType | UnionType | IntersectionType
            )
        }) {
            self.write(": ");
            self.expr(&ty);
        }
        self.write(" => ");
        if let Some(body) = node
            .children()
            .filter(|c| is_expression_kind(c.kind()))
            .last()
        {
            self.expr(&body);
        }
    }

    fn match_expr(&mut self, node: &PhpSyntaxNode) {
        use PhpSyntaxKind::*;
        self.write("match (");
        let mut in_body = false;
        let mut prev_end = node.text_range().start();
        for element in node.children_with_tokens() {
            match element {
                PhpSyntaxElement::Node(n) => {
                    if n.kind() == MatchArm {
                        self.break_line();
                        self.match_arm(&n);
                        self.trim_spaces();
                        self.write(",");
                    } else if !in_body {
                        self.expr(&n); // the subject
                    }
                    prev_end = n.text_range().end();
                }
                PhpSyntaxElement::Token(t) => {
                    match t.kind() {
                        LBrace => {
                            self.trim_spaces();
                            self.write(") {");
                            self.indent += 1;
                            in_body = true;
                        }
                        k if k.is_comment() && in_body => self.entry_comment(&t, prev_end),
                        k if k.is_comment() => self.inline_comment(&t),
                        _ => {}
                    }
                    if !t.kind().is_trivia() || t.kind().is_comment() {
                        prev_end = t.text_range().end();
                    }
                }
            }
        }
        self.indent -= 1;
        self.break_line();
        self.write("}");
    }

    fn match_arm(&mut self, arm: &PhpSyntaxNode) {
        use PhpSyntaxKind::*;
        for element in arm.children_with_tokens() {
            match element {
                PhpSyntaxElement::Node(n) => self.expr(&n),
                PhpSyntaxElement::Token(t) => match t.kind() {
                    DefaultKw => self.write("default"),
                    Comma => {
                        self.trim_spaces();
                        self.write(", ");
                    }
                    DoubleArrow => {
                        self.trim_spaces();
                        self.write(" => ");
                    }
                    k if k.is_comment() => self.inline_comment(&t),
                    _ => {}
                },
            }
        }
    }

    /// Generic renderer for statement-shaped nodes made of keywords,
    /// names, separators and expressions. Word tokens get single-space
    /// separation; punctuation attaches.
    fn inline_glue(&mut self, node: &PhpSyntaxNode) {
        use PhpSyntaxKind::*;
        for element in node.children_with_tokens() {
            match element {
                PhpSyntaxElement::Node(n) => {
                    if n.kind() == AttributeList {
                        continue; // rendered on its own line by the caller
                    }
                    if self.glue_needs_space(first_char_of_node(&n)) {
                        self.out.push(' ');
                    }
                    self.expr(&n);
                }
                PhpSyntaxElement::Token(t) => {
                    if t.kind().is_trivia() {
                        if t.kind().is_comment() {
                            self.pad();
                            self.write(t.text());
                            self.write(" ");
                        }
                        continue;
                    }
                    match t.kind() {
                        Semicolon => self.write(";"),
                        Comma => self.write(", "),
                        DoubleArrow => self.write(" => "),
                        k if k.is_assignment_op() => {
                            self.pad();
                            self.write(t.text());
                            self.write(" ");
                        }
                        _ => {
                            if self.glue_needs_space(t.text().chars().next()) {
                                self.out.push(' ');
                            }
                            self.write(t.text());
                        }
                    }
                }
            }
        }
    }

    fn glue_needs_space(&self, next_first: Option<char>) -> bool {
        let Some(next) = next_first else { return false };
        let Some(last) = self.out.chars().last() else {
            return false;
        };
        let word_end = last.is_alphanumeric() || last == '_' || last == '$' || last == '\'' || last == '"';
        let word_start = next.is_alphanumeric() || next == '_' || next == '$' || next == '\'' || next == '"';
        word_end && word_start
    }
}

// === Free helpers ===

fn keyword_text(kind: PhpSyntaxKind) -> &'static str {
    use PhpSyntaxKind::*;
    match kind {
        ReturnStmt => "return",
        ThrowStmt => "throw",
        BreakStmt => "break",
        ContinueStmt => "continue",
        WhileStmt => "while",
        ForStmt => "for",
        ForeachStmt => "foreach",
        _ => "",
    }
}

fn first_token_is(node: &PhpSyntaxNode, kind: PhpSyntaxKind) -> bool {
    node.children_with_tokens()
        .filter_map(|e| e.into_token())
        .find(|t| !t.kind().is_trivia())
        .is_some_and(|t| t.kind() == kind)
}

fn token_in(node: &PhpSyntaxNode, kind: PhpSyntaxKind) -> bool {
    node.children_with_tokens()
        .filter_map(|e| e.into_token())
        .any(|t| t.kind() == kind)
}

fn direct_token_text(node: &PhpSyntaxNode, kind: PhpSyntaxKind) -> Option<String> {
    node.children_with_tokens()
        .filter_map(|e| e.into_token())
        .find(|t| t.kind() == kind)
        .map(|t| t.text().to_string())
}

fn first_char_of_node(node: &PhpSyntaxNode) -> Option<char> {
    node.text().to_string().chars().next()
}

/// The statement executed by a control-structure header: its first
/// non-clause statement child.
fn then_branch(node: &PhpSyntaxNode) -> Option<PhpSyntaxNode> {
    node.children().find(|c| {
        !is_expression_kind(c.kind())
            && !matches!(
                c.kind(),
                PhpSyntaxKind::ElseifClause | PhpSyntaxKind::ElseClause
            )
    })
}

fn clause_body(clause: &PhpSyntaxNode) -> Option<PhpSyntaxNode> {
    clause
        .children()
        .find(|c| !is_expression_kind(c.kind()))
}

fn uses_alternate_syntax(node: &PhpSyntaxNode) -> bool {
    use PhpSyntaxKind::*;
    matches!(
        node.kind(),
        IfStmt | WhileStmt | ForStmt | ForeachStmt | SwitchStmt
    ) && node.children_with_tokens().filter_map(|e| e.into_token()).any(|t| {
        matches!(
            t.kind(),
            EndifKw | EndwhileKw | EndforKw | EndforeachKw | EndswitchKw
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fmt(src: &str) -> String {
        format_source(src, &FormatterConfig::default(), PhpVersion::default()).formatted
    }

    fn fmt_with(src: &str, config: &FormatterConfig) -> String {
        format_source(src, config, PhpVersion::default()).formatted
    }

    #[test]
    fn normalizes_spacing() {
        assert_eq!(fmt("<?php $a=1+2*3;"), "<?php\n$a = 1 + 2 * 3;\n");
        assert_eq!(fmt("<?php echo   $a  ,$b ;"), "<?php\necho $a, $b;\n");
    }

    #[test]
    fn keeps_already_formatted_input() {
        let src = "<?php\n$total = $price * $qty;\n";
        let result = format_source(src, &FormatterConfig::default(), PhpVersion::default());
        assert_eq!(result.formatted, src);
        assert!(!result.changed);
    }

    #[test]
    fn idempotent_on_varied_input() {
        let src = r#"<?php
function sum(array $xs): int
{
    $acc = 0;
    foreach ($xs as $x) {
        $acc += $x;
    }
    return $acc;
}

$f = fn($x) => $x * 2;
$m = match ($x) {
    1 => 'one',
    default => 'many',
};
"#;
        let once = fmt(src);
        let twice = fmt(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn passthrough_on_parse_error() {
        let src = "<?php $a = ;";
        let result = format_source(src, &FormatterConfig::default(), PhpVersion::default());
        assert!(result.skipped);
        assert!(!result.changed);
        assert_eq!(result.formatted, src);
    }

    #[test]
    fn collapse_rule_disabled_vs_enabled() {
        let src = "<?php\nif (\n    $a && $b\n) {\n    run();\n}\n";

        let collapse = FormatterConfig {
            preserve_breaking_condition_statement: false,
            ..FormatterConfig::default()
        };
        assert_eq!(
            fmt_with(src, &collapse),
            "<?php\nif ($a && $b) {\n    run();\n}\n"
        );

        let preserve = FormatterConfig {
            preserve_breaking_condition_statement: true,
            ..FormatterConfig::default()
        };
        let out = fmt_with(src, &preserve);
        assert!(out.contains("if (\n    $a && $b\n)"), "{out}");
        // and preserved output is stable
        assert_eq!(fmt_with(&out, &preserve), out);
    }

    #[test]
    fn blank_lines_collapse_to_one() {
        let src = "<?php\n$a = 1;\n\n\n\n$b = 2;\n";
        assert_eq!(fmt(src), "<?php\n$a = 1;\n\n$b = 2;\n");
    }

    #[test]
    fn comments_are_replayed() {
        let src = "<?php\n// setup\n$a = 1; // trailing\n\n/* block */\n$b = 2;\n";
        let out = fmt(src);
        assert_eq!(
            out,
            "<?php\n// setup\n$a = 1; // trailing\n\n/* block */\n$b = 2;\n"
        );
    }

    #[test]
    fn comments_inside_argument_lists_survive() {
        assert_eq!(
            fmt("<?php f($a, /* keep */ $b);\n"),
            "<?php\nf($a, /* keep */ $b);\n"
        );
    }

    #[test]
    fn comments_inside_binary_expressions_survive() {
        assert_eq!(
            fmt("<?php $x = $a + /* why */ $b;"),
            "<?php\n$x = $a + /* why */ $b;\n"
        );
    }

    #[test]
    fn comments_inside_condition_headers_survive() {
        assert_eq!(
            fmt("<?php if (/* guard */ $a) { y(); }"),
            "<?php\nif (/* guard */ $a) {\n    y();\n}\n"
        );
    }

    #[test]
    fn line_comment_breaks_the_enclosing_list() {
        let out = fmt("<?php f($first, // explain\n$second);");
        assert_eq!(
            out,
            "<?php\nf(\n    $first, // explain\n    $second,\n);\n"
        );
        assert_eq!(fmt(&out), out);
    }

    #[test]
    fn comments_between_match_arms_survive() {
        let src = "<?php $v = match ($x) {\n    // low band\n    1 => 'one',\n    default => 'many',\n};\n";
        assert_eq!(fmt(src), src);
    }

    #[test]
    fn long_argument_lists_break() {
        let config = FormatterConfig {
            line_width: 40,
            ..FormatterConfig::default()
        };
        let src = "<?php dispatch($firstArgument, $secondArgument, $thirdArgument);";
        let out = fmt_with(src, &config);
        assert_eq!(
            out,
            "<?php\ndispatch(\n    $firstArgument,\n    $secondArgument,\n    $thirdArgument,\n);\n"
        );
        assert_eq!(fmt_with(&out, &config), out);
    }

    #[test]
    fn short_argument_lists_stay_inline() {
        assert_eq!(fmt("<?php f( $a , $b );"), "<?php\nf($a, $b);\n");
    }

    #[test]
    fn trailing_closure_stays_attached() {
        let src = "<?php $app->get('/cb', function () { return 1; });";
        let out = fmt(src);
        assert_eq!(
            out,
            "<?php\n$app->get('/cb', function () {\n    return 1;\n});\n"
        );
        assert_eq!(fmt(&out), out);
    }

    #[test]
    fn class_braces_on_own_line() {
        let src = "<?php class A { public function b() { return 1; } }";
        let out = fmt(src);
        assert_eq!(
            out,
            "<?php\nclass A\n{\n    public function b()\n    {\n        return 1;\n    }\n}\n"
        );
        assert_eq!(fmt(&out), out);
    }

    #[test]
    fn control_braces_follow_config() {
        let src = "<?php if ($a) { one(); } else { two(); }";
        assert_eq!(
            fmt(src),
            "<?php\nif ($a) {\n    one();\n} else {\n    two();\n}\n"
        );

        let next_line = FormatterConfig {
            brace_on_same_line: false,
            ..FormatterConfig::default()
        };
        let out = fmt_with(src, &next_line);
        assert_eq!(
            out,
            "<?php\nif ($a)\n{\n    one();\n}\nelse\n{\n    two();\n}\n"
        );
        assert_eq!(fmt_with(&out, &next_line), out);
    }

    #[test]
    fn tabs_indentation() {
        let config = FormatterConfig {
            indentation: IndentStyle::Tabs,
            ..FormatterConfig::default()
        };
        let out = fmt_with("<?php if ($a) { b(); }", &config);
        assert_eq!(out, "<?php\nif ($a) {\n\tb();\n}\n");
    }

    #[test]
    fn concat_spacing_option() {
        assert_eq!(fmt("<?php $x = $a.$b;"), "<?php\n$x = $a . $b;\n");
        let tight = FormatterConfig {
            space_around_concat: false,
            ..FormatterConfig::default()
        };
        assert_eq!(fmt_with("<?php $x = $a . $b;", &tight), "<?php\n$x = $a.$b;\n");
    }

    #[test]
    fn strings_are_untouched() {
        let src = "<?php\n$s = \"keep  $spacing {$inside->strings()}\";\n$h = <<<EOT\n  raw\nEOT;\n";
        assert_eq!(fmt(src), src);
    }

    #[test]
    fn alternate_syntax_is_verbatim() {
        let src = "<?php if ($a): ?>\n<p>hi</p>\n<?php endif; ?>";
        let out = fmt(src);
        assert!(out.contains("if ($a): ?>"));
        assert!(out.contains("endif;"));
        assert_eq!(fmt(&out), out);
    }

    #[test]
    fn switch_layout() {
        let src = "<?php switch ($x) { case 1: a(); break; default: b(); }";
        let out = fmt(src);
        assert_eq!(
            out,
            "<?php\nswitch ($x) {\n    case 1:\n        a();\n        break;\n    default:\n        b();\n}\n"
        );
        assert_eq!(fmt(&out), out);
    }

    #[test]
    fn match_arms_one_per_line() {
        let src = "<?php $v = match ($x) { 1, 2 => 'low', default => 'high' };";
        let out = fmt(src);
        assert_eq!(
            out,
            "<?php\n$v = match ($x) {\n    1, 2 => 'low',\n    default => 'high',\n};\n"
        );
        assert_eq!(fmt(&out), out);
    }

    #[test]
    fn declare_is_compact() {
        assert_eq!(
            fmt("<?php declare( strict_types = 1 ) ;"),
            "<?php\ndeclare(strict_types=1);\n"
        );
    }

    #[test]
    fn deterministic() {
        let src = "<?php foreach ($xs as $k => $v) { $out[$k] = $v * 2; }";
        assert_eq!(fmt(src), fmt(src));
    }
}
