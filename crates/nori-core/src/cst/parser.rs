//! Recursive-descent PHP parser producing a lossless CST
//!
//! Statements are parsed by plain recursive descent; expressions use
//! precedence climbing over a binding-power table. Every token from the
//! lexer, trivia included, ends up in the tree exactly once, so
//! `root.text() == source` always holds.
//!
//! The parser never fails: unexpected input is recorded as a [`ParseError`]
//! and wrapped in an `ErrorNode`, then parsing resynchronizes at the next
//! statement boundary (`;`, `}`, or a statement keyword).

use rowan::{Checkpoint, GreenNodeBuilder, Language};

use crate::version::PhpVersion;

use super::lexer::{CstSpan, CstToken, LexerError, lex_with_trivia};
use super::{PhpLanguage, PhpSyntaxKind, PhpSyntaxNode};

/// A syntax error found while parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
    pub span: CstSpan,
    pub code: &'static str,
}

impl ParseError {
    fn new(message: impl Into<String>, span: CstSpan) -> Self {
        Self {
            message: message.into(),
            span,
            code: "syntax/unexpected-token",
        }
    }
}

/// The outcome of parsing one source file.
#[derive(Debug, Clone)]
pub struct Parse {
    pub root: PhpSyntaxNode,
    pub lexer_errors: Vec<LexerError>,
    pub errors: Vec<ParseError>,
}

impl Parse {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
            || self
                .lexer_errors
                .iter()
                .any(|e| e.severity == crate::diagnostics::Severity::Error)
    }
}

/// Parse a whole PHP source file.
pub fn parse_php(source: &str, version: PhpVersion) -> Parse {
    let (tokens, lexer_errors) = lex_with_trivia(source, version);
    let mut parser = Parser {
        tokens,
        pos: 0,
        builder: GreenNodeBuilder::new(),
        errors: Vec::new(),
        version,
    };
    parser.parse_program();
    let green = parser.builder.finish();
    Parse {
        root: PhpSyntaxNode::new_root(green),
        lexer_errors,
        errors: parser.errors,
    }
}

// binding powers, loosest to tightest; right-associative operators get a
// right power one below their left power
const BP_LOGICAL_OR_KW: (u8, u8) = (1, 2);
const BP_LOGICAL_XOR_KW: (u8, u8) = (3, 4);
const BP_LOGICAL_AND_KW: (u8, u8) = (5, 6);
const BP_ASSIGN: (u8, u8) = (9, 8);
const BP_PRINT: u8 = 10;
const BP_TERNARY: u8 = 11;
const BP_COALESCE: (u8, u8) = (14, 13);
const BP_PIPELINE: (u8, u8) = (15, 16);
const BP_OR: (u8, u8) = (17, 18);
const BP_AND: (u8, u8) = (19, 20);
const BP_BIT_OR: (u8, u8) = (21, 22);
const BP_BIT_XOR: (u8, u8) = (23, 24);
const BP_BIT_AND: (u8, u8) = (25, 26);
const BP_EQUALITY: (u8, u8) = (27, 28);
const BP_RELATIONAL: (u8, u8) = (29, 30);
const BP_CONCAT: (u8, u8) = (31, 32);
const BP_SHIFT: (u8, u8) = (33, 34);
const BP_ADDITIVE: (u8, u8) = (35, 36);
const BP_MULTIPLICATIVE: (u8, u8) = (37, 38);
const BP_NOT: u8 = 39;
const BP_INSTANCEOF: (u8, u8) = (41, 42);
const BP_UNARY: u8 = 43;
const BP_POW: (u8, u8) = (46, 45);

fn is_non_associative(kind: PhpSyntaxKind) -> bool {
    use PhpSyntaxKind::*;
    matches!(
        kind,
        EqEq | EqEqEq | NotEq | NotEqEq | Spaceship | Lt | Le | Gt | Ge | InstanceofKw
    )
}

fn infix_binding_power(kind: PhpSyntaxKind) -> Option<(u8, u8)> {
    use PhpSyntaxKind::*;
    let bp = match kind {
        OrKw => BP_LOGICAL_OR_KW,
        XorKw => BP_LOGICAL_XOR_KW,
        AndKw => BP_LOGICAL_AND_KW,
        QuestionQuestion => BP_COALESCE,
        Pipeline => BP_PIPELINE,
        PipePipe => BP_OR,
        AmpAmp => BP_AND,
        PipeOp => BP_BIT_OR,
        CaretOp => BP_BIT_XOR,
        Amp => BP_BIT_AND,
        EqEq | EqEqEq | NotEq | NotEqEq | Spaceship => BP_EQUALITY,
        Lt | Le | Gt | Ge => BP_RELATIONAL,
        Dot => BP_CONCAT,
        Shl | Shr => BP_SHIFT,
        Plus | Minus => BP_ADDITIVE,
        Star | Slash | Percent => BP_MULTIPLICATIVE,
        InstanceofKw => BP_INSTANCEOF,
        Pow => BP_POW,
        _ => return None,
    };
    Some(bp)
}

struct Parser {
    tokens: Vec<CstToken>,
    pos: usize,
    builder: GreenNodeBuilder<'static>,
    errors: Vec<ParseError>,
    version: PhpVersion,
}

impl Parser {
    // === Token access ===

    fn nth_nontrivia(&self, n: usize) -> &CstToken {
        let mut seen = 0;
        let mut i = self.pos;
        loop {
            let token = &self.tokens[i.min(self.tokens.len() - 1)];
            if token.kind == PhpSyntaxKind::Eof {
                return token;
            }
            if !token.kind.is_trivia() {
                if seen == n {
                    return token;
                }
                seen += 1;
            }
            i += 1;
        }
    }

    fn peek(&self) -> PhpSyntaxKind {
        self.nth_nontrivia(0).kind
    }

    fn peek_nth(&self, n: usize) -> PhpSyntaxKind {
        self.nth_nontrivia(n).kind
    }

    fn peek_text(&self) -> &str {
        &self.nth_nontrivia(0).text
    }

    fn at(&self, kind: PhpSyntaxKind) -> bool {
        self.peek() == kind
    }

    fn current_span(&self) -> CstSpan {
        self.nth_nontrivia(0).span.clone()
    }

    // === Tree building ===

    fn push_token(&mut self) {
        let token = &self.tokens[self.pos];
        self.builder
            .token(PhpLanguage::kind_to_raw(token.kind), &token.text);
        self.pos += 1;
    }

    /// Attach pending trivia to the currently open node.
    fn consume_trivia(&mut self) {
        while self.pos < self.tokens.len() && self.tokens[self.pos].kind.is_trivia() {
            self.push_token();
        }
    }

    /// Consume trivia, then the next token.
    fn bump(&mut self) {
        self.consume_trivia();
        if self.pos < self.tokens.len() && self.tokens[self.pos].kind != PhpSyntaxKind::Eof {
            self.push_token();
        }
    }

    fn start(&mut self, kind: PhpSyntaxKind) {
        self.consume_trivia();
        self.builder.start_node(PhpLanguage::kind_to_raw(kind));
    }

    fn finish(&mut self) {
        self.builder.finish_node();
    }

    /// A checkpoint placed after any pending trivia, so trivia between
    /// statements stays in the enclosing node.
    fn checkpoint(&mut self) -> Checkpoint {
        self.consume_trivia();
        self.builder.checkpoint()
    }

    fn start_at(&mut self, checkpoint: Checkpoint, kind: PhpSyntaxKind) {
        self.builder
            .start_node_at(checkpoint, PhpLanguage::kind_to_raw(kind));
    }

    // === Errors ===

    fn error(&mut self, message: impl Into<String>) {
        let span = self.current_span();
        self.errors.push(ParseError::new(message, span));
    }

    fn expect(&mut self, kind: PhpSyntaxKind, what: &str) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            let found = self.peek_text().to_string();
            if found.is_empty() {
                self.error(format!("expected {what}, found end of file"));
            } else {
                self.error(format!("expected {what}, found '{found}'"));
            }
            false
        }
    }

    /// Wrap unparseable input in an `ErrorNode` and skip to the next
    /// statement boundary. A trailing `;` is swallowed into the node.
    fn error_and_recover(&mut self, message: impl Into<String>) {
        self.error(message);
        self.start(PhpSyntaxKind::ErrorNode);
        loop {
            let kind = self.peek();
            if kind == PhpSyntaxKind::Eof
                || kind == PhpSyntaxKind::RBrace
                || kind == PhpSyntaxKind::CloseTag
                || kind.starts_statement()
            {
                break;
            }
            if kind == PhpSyntaxKind::Semicolon {
                self.bump();
                break;
            }
            self.bump();
        }
        self.finish();
    }

    fn require_version(&mut self, supported: bool, feature: &str, since: &str) {
        if !supported {
            let span = self.current_span();
            self.errors.push(ParseError {
                message: format!(
                    "{feature} requires PHP {since}, but the target version is PHP {}",
                    self.version
                ),
                span,
                code: "syntax/version-gated-feature",
            });
        }
    }

    // === Program structure ===

    fn parse_program(&mut self) {
        self.builder
            .start_node(PhpLanguage::kind_to_raw(PhpSyntaxKind::Program));
        loop {
            self.consume_trivia();
            let before = self.pos;
            match self.peek() {
                PhpSyntaxKind::Eof => break,
                PhpSyntaxKind::InlineHtml => {
                    self.start(PhpSyntaxKind::InlineHtmlStmt);
                    self.bump();
                    self.finish();
                }
                PhpSyntaxKind::OpenTag | PhpSyntaxKind::CloseTag => self.bump(),
                PhpSyntaxKind::OpenTagEcho => self.parse_echo_tag(),
                _ => self.parse_statement(),
            }
            if self.pos == before {
                // guarantee progress on stray tokens
                self.start(PhpSyntaxKind::ErrorNode);
                self.bump();
                self.finish();
            }
        }
        self.finish();
    }

    /// `<?= expr, expr ?>` - the close tag is left for the caller.
    fn parse_echo_tag(&mut self) {
        self.start(PhpSyntaxKind::EchoStmt);
        self.bump(); // <?=
        self.parse_expr();
        while self.at(PhpSyntaxKind::Comma) {
            self.bump();
            self.parse_expr();
        }
        if self.at(PhpSyntaxKind::Semicolon) {
            self.bump();
        }
        self.finish();
    }

    // === Statements ===

    fn parse_statement(&mut self) {
        use PhpSyntaxKind::*;
        let cp = self.checkpoint();

        while self.at(AttributeStart) {
            self.parse_attribute_list();
        }

        match self.peek() {
            LBrace => self.parse_block_at(cp),
            IfKw => self.parse_if(cp),
            WhileKw => self.parse_while(cp),
            DoKw => self.parse_do_while(cp),
            ForKw => self.parse_for(cp),
            ForeachKw => self.parse_foreach(cp),
            SwitchKw => self.parse_switch(cp),
            BreakKw => self.parse_break_continue(cp, BreakStmt),
            ContinueKw => self.parse_break_continue(cp, ContinueStmt),
            ReturnKw => {
                self.start_at(cp, ReturnStmt);
                self.bump();
                if !matches!(self.peek(), Semicolon | CloseTag | Eof) {
                    self.parse_expr();
                }
                self.finish_simple_stmt();
                self.finish();
            }
            ThrowKw => {
                self.start_at(cp, ThrowStmt);
                self.bump();
                self.parse_expr();
                self.finish_simple_stmt();
                self.finish();
            }
            TryKw => self.parse_try(cp),
            EchoKw => {
                self.start_at(cp, EchoStmt);
                self.bump();
                self.parse_expr();
                while self.at(Comma) {
                    self.bump();
                    self.parse_expr();
                }
                self.finish_simple_stmt();
                self.finish();
            }
            GlobalKw => {
                self.start_at(cp, GlobalStmt);
                self.bump();
                self.expect(Variable, "a variable");
                while self.at(Comma) {
                    self.bump();
                    self.expect(Variable, "a variable");
                }
                self.finish_simple_stmt();
                self.finish();
            }
            StaticKw if self.peek_nth(1) == Variable => self.parse_static_vars(cp),
            UnsetKw => {
                self.start_at(cp, UnsetStmt);
                self.bump();
                self.expect(LParen, "'('");
                self.parse_expr();
                while self.at(Comma) {
                    self.bump();
                    if self.at(RParen) {
                        break;
                    }
                    self.parse_expr();
                }
                self.expect(RParen, "')'");
                self.finish_simple_stmt();
                self.finish();
            }
            DeclareKw => self.parse_declare(cp),
            NamespaceKw => self.parse_namespace(cp),
            UseKw => self.parse_use(cp),
            ConstKw => self.parse_const(cp),
            FunctionKw
                if self.peek_nth(1) == Ident
                    || (self.peek_nth(1) == Amp && self.peek_nth(2) == Ident) =>
            {
                self.parse_function_decl(cp)
            }
            ClassKw => self.parse_class_like(cp, ClassDecl),
            InterfaceKw => self.parse_class_like(cp, InterfaceDecl),
            TraitKw => self.parse_class_like(cp, TraitDecl),
            EnumKw if self.peek_nth(1) == Ident => {
                self.require_version(self.version.supports_enums(), "enums", "8.1");
                self.parse_class_like(cp, EnumDecl)
            }
            AbstractKw | FinalKw | ReadonlyKw => {
                let mut n = 0;
                while matches!(self.peek_nth(n), AbstractKw | FinalKw | ReadonlyKw) {
                    n += 1;
                }
                if self.peek_nth(n) == ClassKw {
                    self.parse_class_like(cp, ClassDecl);
                } else {
                    self.parse_expression_stmt(cp);
                }
            }
            Semicolon => {
                // empty statement
                self.start_at(cp, ExpressionStmt);
                self.bump();
                self.finish();
            }
            InlineHtml => {
                self.start_at(cp, InlineHtmlStmt);
                self.bump();
                self.finish();
            }
            OpenTag | CloseTag => self.bump(),
            OpenTagEcho => self.parse_echo_tag(),
            Eof => {}
            _ => self.parse_expression_stmt(cp),
        }
    }

    fn parse_expression_stmt(&mut self, cp: Checkpoint) {
        self.start_at(cp, PhpSyntaxKind::ExpressionStmt);
        self.parse_expr();
        self.finish_simple_stmt();
        self.finish();
    }

    /// Statements end at `;`, or implicitly before `?>` and EOF.
    fn finish_simple_stmt(&mut self) {
        match self.peek() {
            PhpSyntaxKind::Semicolon => self.bump(),
            PhpSyntaxKind::CloseTag | PhpSyntaxKind::Eof => {}
            _ => self.error_and_recover("expected ';'"),
        }
    }

    fn parse_block_at(&mut self, cp: Checkpoint) {
        self.start_at(cp, PhpSyntaxKind::Block);
        self.bump(); // {
        self.parse_statements_until(&[PhpSyntaxKind::RBrace]);
        self.expect(PhpSyntaxKind::RBrace, "'}'");
        self.finish();
    }

    fn parse_block(&mut self) {
        let cp = self.checkpoint();
        if self.at(PhpSyntaxKind::LBrace) {
            self.parse_block_at(cp);
        } else {
            self.error_and_recover("expected '{'");
        }
    }

    fn parse_statements_until(&mut self, terminators: &[PhpSyntaxKind]) {
        loop {
            self.consume_trivia();
            let kind = self.peek();
            if kind == PhpSyntaxKind::Eof || terminators.contains(&kind) {
                break;
            }
            let before = self.pos;
            self.parse_statement();
            if self.pos == before {
                self.start(PhpSyntaxKind::ErrorNode);
                self.bump();
                self.finish();
            }
        }
    }

    fn parse_if(&mut self, cp: Checkpoint) {
        use PhpSyntaxKind::*;
        self.start_at(cp, IfStmt);
        self.bump(); // if
        self.expect(LParen, "'('");
        self.parse_expr();
        self.expect(RParen, "')'");

        if self.at(Colon) {
            // alternate syntax: if (...): ... elseif (...): ... else: ... endif;
            self.bump();
            self.parse_statements_until(&[ElseifKw, ElseKw, EndifKw]);
            while self.at(ElseifKw) {
                self.start(ElseifClause);
                self.bump();
                self.expect(LParen, "'('");
                self.parse_expr();
                self.expect(RParen, "')'");
                self.expect(Colon, "':'");
                self.parse_statements_until(&[ElseifKw, ElseKw, EndifKw]);
                self.finish();
            }
            if self.at(ElseKw) {
                self.start(ElseClause);
                self.bump();
                self.expect(Colon, "':'");
                self.parse_statements_until(&[EndifKw]);
                self.finish();
            }
            self.expect(EndifKw, "'endif'");
            self.finish_simple_stmt();
        } else {
            self.parse_statement();
            while self.at(ElseifKw) {
                self.start(ElseifClause);
                self.bump();
                self.expect(LParen, "'('");
                self.parse_expr();
                self.expect(RParen, "')'");
                self.parse_statement();
                self.finish();
            }
            if self.at(ElseKw) {
                self.start(ElseClause);
                self.bump();
                self.parse_statement();
                self.finish();
            }
        }
        self.finish();
    }

    fn parse_while(&mut self, cp: Checkpoint) {
        use PhpSyntaxKind::*;
        self.start_at(cp, WhileStmt);
        self.bump();
        self.expect(LParen, "'('");
        self.parse_expr();
        self.expect(RParen, "')'");
        if self.at(Colon) {
            self.bump();
            self.parse_statements_until(&[EndwhileKw]);
            self.expect(EndwhileKw, "'endwhile'");
            self.finish_simple_stmt();
        } else {
            self.parse_statement();
        }
        self.finish();
    }

    fn parse_do_while(&mut self, cp: Checkpoint) {
        use PhpSyntaxKind::*;
        self.start_at(cp, DoWhileStmt);
        self.bump(); // do
        self.parse_statement();
        self.expect(WhileKw, "'while'");
        self.expect(LParen, "'('");
        self.parse_expr();
        self.expect(RParen, "')'");
        self.finish_simple_stmt();
        self.finish();
    }

    fn parse_for(&mut self, cp: Checkpoint) {
        use PhpSyntaxKind::*;
        self.start_at(cp, ForStmt);
        self.bump();
        self.expect(LParen, "'('");
        for section in 0..3 {
            let terminator = if section < 2 { Semicolon } else { RParen };
            if !self.at(terminator) {
                self.parse_expr();
                while self.at(Comma) {
                    self.bump();
                    self.parse_expr();
                }
            }
            if section < 2 {
                self.expect(Semicolon, "';'");
            }
        }
        self.expect(RParen, "')'");
        if self.at(Colon) {
            self.bump();
            self.parse_statements_until(&[EndforKw]);
            self.expect(EndforKw, "'endfor'");
            self.finish_simple_stmt();
        } else {
            self.parse_statement();
        }
        self.finish();
    }

    fn parse_foreach(&mut self, cp: Checkpoint) {
        use PhpSyntaxKind::*;
        self.start_at(cp, ForeachStmt);
        self.bump();
        self.expect(LParen, "'('");
        self.parse_expr();
        self.expect(AsKw, "'as'");
        if self.at(Amp) {
            self.bump();
        }
        self.parse_expr();
        if self.at(DoubleArrow) {
            self.bump();
            if self.at(Amp) {
                self.bump();
            }
            self.parse_expr();
        }
        self.expect(RParen, "')'");
        if self.at(Colon) {
            self.bump();
            self.parse_statements_until(&[EndforeachKw]);
            self.expect(EndforeachKw, "'endforeach'");
            self.finish_simple_stmt();
        } else {
            self.parse_statement();
        }
        self.finish();
    }

    fn parse_switch(&mut self, cp: Checkpoint) {
        use PhpSyntaxKind::*;
        self.start_at(cp, SwitchStmt);
        self.bump();
        self.expect(LParen, "'('");
        self.parse_expr();
        self.expect(RParen, "')'");

        let alternate = self.at(Colon);
        if alternate {
            self.bump();
        } else {
            self.expect(LBrace, "'{'");
        }
        let end = if alternate { EndswitchKw } else { RBrace };
        loop {
            self.consume_trivia();
            match self.peek() {
                CaseKw => {
                    self.start(SwitchCase);
                    self.bump();
                    self.parse_expr();
                    if self.at(Colon) || self.at(Semicolon) {
                        self.bump();
                    } else {
                        self.error("expected ':' after case value");
                    }
                    self.parse_statements_until(&[CaseKw, DefaultKw, RBrace, EndswitchKw]);
                    self.finish();
                }
                DefaultKw => {
                    self.start(SwitchCase);
                    self.bump();
                    if self.at(Colon) || self.at(Semicolon) {
                        self.bump();
                    } else {
                        self.error("expected ':' after 'default'");
                    }
                    self.parse_statements_until(&[CaseKw, DefaultKw, RBrace, EndswitchKw]);
                    self.finish();
                }
                k if k == end || k == Eof => break,
                _ => {
                    self.error_and_recover("expected 'case' or 'default'");
                }
            }
        }
        if alternate {
            self.expect(EndswitchKw, "'endswitch'");
            self.finish_simple_stmt();
        } else {
            self.expect(RBrace, "'}'");
        }
        self.finish();
    }

    fn parse_break_continue(&mut self, cp: Checkpoint, kind: PhpSyntaxKind) {
        self.start_at(cp, kind);
        self.bump();
        if !matches!(
            self.peek(),
            PhpSyntaxKind::Semicolon | PhpSyntaxKind::CloseTag | PhpSyntaxKind::Eof
        ) {
            self.parse_expr();
        }
        self.finish_simple_stmt();
        self.finish();
    }

    fn parse_try(&mut self, cp: Checkpoint) {
        use PhpSyntaxKind::*;
        self.start_at(cp, TryStmt);
        self.bump();
        self.parse_block();
        while self.at(CatchKw) {
            self.start(CatchClause);
            self.bump();
            self.expect(LParen, "'('");
            self.parse_type();
            if self.at(Variable) {
                self.bump();
            }
            self.expect(RParen, "')'");
            self.parse_block();
            self.finish();
        }
        if self.at(FinallyKw) {
            self.start(FinallyClause);
            self.bump();
            self.parse_block();
            self.finish();
        }
        self.finish();
    }

    fn parse_static_vars(&mut self, cp: Checkpoint) {
        use PhpSyntaxKind::*;
        self.start_at(cp, StaticVarStmt);
        self.bump(); // static
        loop {
            self.expect(Variable, "a variable");
            if self.at(Equals) {
                self.bump();
                self.parse_expr();
            }
            if self.at(Comma) {
                self.bump();
            } else {
                break;
            }
        }
        self.finish_simple_stmt();
        self.finish();
    }

    fn parse_declare(&mut self, cp: Checkpoint) {
        use PhpSyntaxKind::*;
        self.start_at(cp, DeclareStmt);
        self.bump();
        self.expect(LParen, "'('");
        loop {
            self.expect(Ident, "a directive name");
            self.expect(Equals, "'='");
            self.parse_expr();
            if self.at(Comma) {
                self.bump();
            } else {
                break;
            }
        }
        self.expect(RParen, "')'");
        if self.at(LBrace) {
            self.parse_block();
        } else {
            self.finish_simple_stmt();
        }
        self.finish();
    }

    fn parse_namespace(&mut self, cp: Checkpoint) {
        use PhpSyntaxKind::*;
        self.start_at(cp, NamespaceDecl);
        self.bump();
        if self.at(Ident) {
            self.parse_name_path();
        }
        if self.at(LBrace) {
            self.parse_block();
        } else {
            self.finish_simple_stmt();
        }
        self.finish();
    }

    fn parse_use(&mut self, cp: Checkpoint) {
        use PhpSyntaxKind::*;
        self.start_at(cp, UseDecl);
        self.bump();
        if self.at(FunctionKw) || self.at(ConstKw) {
            self.bump();
        }
        loop {
            self.parse_name_path();
            if self.at(Backslash) && self.peek_nth(1) == LBrace {
                // group use: Foo\{Bar, Baz as Qux}
                self.bump();
                self.bump();
                loop {
                    if self.at(FunctionKw) || self.at(ConstKw) {
                        self.bump();
                    }
                    self.parse_name_path();
                    if self.at(AsKw) {
                        self.bump();
                        self.expect(Ident, "an alias");
                    }
                    if self.at(Comma) {
                        self.bump();
                        if self.at(RBrace) {
                            break;
                        }
                    } else {
                        break;
                    }
                }
                self.expect(RBrace, "'}'");
            } else if self.at(AsKw) {
                self.bump();
                self.expect(Ident, "an alias");
            }
            if self.at(Comma) {
                self.bump();
            } else {
                break;
            }
        }
        self.finish_simple_stmt();
        self.finish();
    }

    fn parse_const(&mut self, cp: Checkpoint) {
        use PhpSyntaxKind::*;
        self.start_at(cp, ConstDecl);
        self.bump(); // const
        // typed constants: `const int FOO = 1`
        if self.at(Ident) && self.peek_nth(1) == Ident {
            self.parse_type();
        }
        loop {
            self.expect(Ident, "a constant name");
            self.expect(Equals, "'='");
            self.parse_expr();
            if self.at(Comma) {
                self.bump();
            } else {
                break;
            }
        }
        self.finish_simple_stmt();
        self.finish();
    }

    // === Declarations ===

    fn parse_attribute_list(&mut self) {
        use PhpSyntaxKind::*;
        self.require_version(self.version.supports_attributes(), "attributes", "8.0");
        self.start(AttributeList);
        self.bump(); // #[
        loop {
            self.start(Attribute);
            self.parse_name_path();
            if self.at(LParen) {
                self.parse_arg_list();
            }
            self.finish();
            if self.at(Comma) {
                self.bump();
                if self.at(RBracket) {
                    break;
                }
            } else {
                break;
            }
        }
        self.expect(RBracket, "']'");
        self.finish();
    }

    fn parse_function_decl(&mut self, cp: Checkpoint) {
        use PhpSyntaxKind::*;
        self.start_at(cp, FunctionDecl);
        self.bump(); // function
        if self.at(Amp) {
            self.bump();
        }
        self.expect(Ident, "a function name");
        self.parse_param_list();
        if self.at(Colon) {
            self.bump();
            self.parse_type();
        }
        self.parse_block();
        self.finish();
    }

    fn parse_param_list(&mut self) {
        use PhpSyntaxKind::*;
        self.start(ParamList);
        self.expect(LParen, "'('");
        while !self.at(RParen) && !self.at(Eof) {
            self.parse_param();
            if self.at(Comma) {
                self.bump();
            } else {
                break;
            }
        }
        self.expect(RParen, "')'");
        self.finish();
    }

    fn parse_param(&mut self) {
        use PhpSyntaxKind::*;
        self.start(Param);
        while self.at(AttributeStart) {
            self.parse_attribute_list();
        }
        let mut promoted = false;
        while self.peek().is_visibility_modifier() || self.at(ReadonlyKw) {
            promoted = true;
            if self.at(ReadonlyKw) {
                self.require_version(
                    self.version.supports_readonly_properties(),
                    "readonly properties",
                    "8.1",
                );
            }
            self.bump();
        }
        if promoted {
            self.require_version(
                self.version.supports_promoted_properties(),
                "constructor property promotion",
                "8.0",
            );
        }
        if self.type_starts_here() {
            self.parse_type();
        }
        if self.at(Amp) {
            self.bump();
        }
        if self.at(Ellipsis) {
            self.bump();
        }
        self.expect(Variable, "a parameter");
        if self.at(Equals) {
            self.bump();
            self.parse_expr();
        }
        self.finish();
    }

    fn type_starts_here(&self) -> bool {
        use PhpSyntaxKind::*;
        matches!(
            self.peek(),
            Question | Ident | Backslash | StaticKw | NullKw | TrueKw | FalseKw
        )
    }

    fn parse_class_like(&mut self, cp: Checkpoint, kind: PhpSyntaxKind) {
        use PhpSyntaxKind::*;
        self.start_at(cp, kind);
        while matches!(self.peek(), AbstractKw | FinalKw | ReadonlyKw) {
            if self.at(ReadonlyKw) {
                self.require_version(
                    self.version.supports_readonly_classes(),
                    "readonly classes",
                    "8.2",
                );
            }
            self.bump();
        }
        self.bump(); // class / interface / trait / enum
        self.expect(Ident, "a name");
        // enum backing type
        if kind == EnumDecl && self.at(Colon) {
            self.bump();
            self.parse_type();
        }
        if self.at(ExtendsKw) {
            self.bump();
            self.parse_name_path();
            while self.at(Comma) {
                self.bump();
                self.parse_name_path();
            }
        }
        if self.at(ImplementsKw) {
            self.bump();
            self.parse_name_path();
            while self.at(Comma) {
                self.bump();
                self.parse_name_path();
            }
        }
        self.parse_class_body();
        self.finish();
    }

    fn parse_class_body(&mut self) {
        use PhpSyntaxKind::*;
        self.start(ClassBody);
        self.expect(LBrace, "'{'");
        loop {
            self.consume_trivia();
            if self.at(RBrace) || self.at(Eof) {
                break;
            }
            let before = self.pos;
            self.parse_class_member();
            if self.pos == before {
                self.start(ErrorNode);
                self.bump();
                self.finish();
            }
        }
        self.expect(RBrace, "'}'");
        self.finish();
    }

    fn parse_class_member(&mut self) {
        use PhpSyntaxKind::*;
        let cp = self.checkpoint();
        while self.at(AttributeStart) {
            self.parse_attribute_list();
        }
        if self.at(UseKw) {
            self.parse_trait_use(cp);
            return;
        }
        if self.at(CaseKw) {
            self.start_at(cp, EnumCase);
            self.bump();
            self.expect(Ident, "a case name");
            if self.at(Equals) {
                self.bump();
                self.parse_expr();
            }
            self.finish_simple_stmt();
            self.finish();
            return;
        }

        while matches!(
            self.peek(),
            PublicKw | ProtectedKw | PrivateKw | StaticKw | AbstractKw | FinalKw | VarKw
        ) || (self.at(ReadonlyKw) && self.peek_nth(1) != LParen)
        {
            if self.at(ReadonlyKw) {
                self.require_version(
                    self.version.supports_readonly_properties(),
                    "readonly properties",
                    "8.1",
                );
            }
            self.bump();
        }

        match self.peek() {
            FunctionKw => {
                self.start_at(cp, MethodDecl);
                self.bump();
                if self.at(Amp) {
                    self.bump();
                }
                if self.at(Ident) || PhpSyntaxKind::from_keyword(self.peek_text()).is_some() {
                    self.bump();
                } else {
                    self.error("expected a method name");
                }
                self.parse_param_list();
                if self.at(Colon) {
                    self.bump();
                    self.parse_type();
                }
                if self.at(LBrace) {
                    self.parse_block();
                } else {
                    self.finish_simple_stmt();
                }
                self.finish();
            }
            ConstKw => {
                self.start_at(cp, ConstDecl);
                self.bump();
                if self.at(Ident) && self.peek_nth(1) == Ident {
                    self.parse_type();
                }
                loop {
                    self.expect(Ident, "a constant name");
                    self.expect(Equals, "'='");
                    self.parse_expr();
                    if self.at(Comma) {
                        self.bump();
                    } else {
                        break;
                    }
                }
                self.finish_simple_stmt();
                self.finish();
            }
            Variable => {
                self.start_at(cp, PropertyDecl);
                self.parse_property_entries();
                self.finish();
            }
            _ if self.type_starts_here() => {
                self.start_at(cp, PropertyDecl);
                self.parse_type();
                self.parse_property_entries();
                self.finish();
            }
            _ => {
                self.error_and_recover("expected a class member");
            }
        }
    }

    fn parse_property_entries(&mut self) {
        use PhpSyntaxKind::*;
        loop {
            self.expect(Variable, "a property");
            if self.at(Equals) {
                self.bump();
                self.parse_expr();
            }
            if self.at(Comma) {
                self.bump();
            } else {
                break;
            }
        }
        self.finish_simple_stmt();
    }

    fn parse_trait_use(&mut self, cp: Checkpoint) {
        use PhpSyntaxKind::*;
        self.start_at(cp, TraitUse);
        self.bump(); // use
        self.parse_name_path();
        while self.at(Comma) {
            self.bump();
            self.parse_name_path();
        }
        if self.at(LBrace) {
            // conflict-resolution block; kept as raw tokens
            self.bump();
            while !self.at(RBrace) && !self.at(Eof) {
                self.bump();
            }
            self.expect(RBrace, "'}'");
        } else {
            self.finish_simple_stmt();
        }
        self.finish();
    }

    // === Types ===

    fn parse_type(&mut self) {
        use PhpSyntaxKind::*;
        let cp = self.checkpoint();
        if self.at(Question) {
            self.start_at(cp, NullableType);
            self.bump();
            self.parse_type_atom();
            self.finish();
            return;
        }
        self.parse_type_atom();
        if self.at(PipeOp) {
            self.require_version(self.version.supports_union_types(), "union types", "8.0");
            self.start_at(cp, UnionType);
            while self.at(PipeOp) {
                self.bump();
                self.parse_type_atom();
            }
            self.finish();
        } else if self.at(Amp) && !matches!(self.peek_nth(1), Variable | Ellipsis) {
            self.require_version(
                self.version.supports_intersection_types(),
                "intersection types",
                "8.1",
            );
            self.start_at(cp, IntersectionType);
            while self.at(Amp) && !matches!(self.peek_nth(1), Variable | Ellipsis) {
                self.bump();
                self.parse_type_atom();
            }
            self.finish();
        }
    }

    fn parse_type_atom(&mut self) {
        use PhpSyntaxKind::*;
        self.start(SimpleType);
        match self.peek() {
            Ident | Backslash => self.parse_name_path_tokens(),
            StaticKw | NullKw | TrueKw | FalseKw => self.bump(),
            _ => self.error("expected a type"),
        }
        self.finish();
    }

    /// `Foo`, `\Foo\Bar`, `Foo\Bar` - bumped as raw tokens.
    fn parse_name_path_tokens(&mut self) {
        use PhpSyntaxKind::*;
        if self.at(Backslash) {
            self.bump();
        }
        self.expect(Ident, "a name");
        while self.at(Backslash) && self.peek_nth(1) == Ident {
            self.bump();
            self.bump();
        }
    }

    fn parse_name_path(&mut self) {
        self.parse_name_path_tokens();
    }

    // === Expressions ===

    fn parse_expr(&mut self) {
        self.parse_expr_bp(0);
    }

    fn parse_expr_bp(&mut self, min_bp: u8) {
        use PhpSyntaxKind::*;
        let cp = self.checkpoint();
        self.parse_primary();
        self.parse_postfix(cp);

        let mut prev_infix: Option<PhpSyntaxKind> = None;
        loop {
            let kind = self.peek();

            if kind.is_assignment_op() {
                if BP_ASSIGN.0 < min_bp {
                    break;
                }
                prev_infix = None;
                self.start_at(cp, AssignExpr);
                self.bump();
                // `= &$x` reference assignment
                if self.at(Amp) {
                    self.bump();
                }
                self.parse_expr_bp(BP_ASSIGN.1);
                self.finish();
                continue;
            }

            if kind == Question {
                if BP_TERNARY < min_bp {
                    break;
                }
                prev_infix = None;
                self.start_at(cp, TernaryExpr);
                self.bump();
                if self.at(Colon) {
                    self.bump(); // short ternary ?:
                } else {
                    self.parse_expr();
                    self.expect(Colon, "':'");
                }
                self.parse_expr_bp(BP_TERNARY + 1);
                self.finish();
                continue;
            }

            let Some((l_bp, r_bp)) = infix_binding_power(kind) else {
                break;
            };
            if l_bp < min_bp {
                break;
            }
            // comparison and `instanceof` operators do not associate:
            // `$a == $b == $c` is a parse error in PHP
            if is_non_associative(kind)
                && prev_infix.is_some_and(|p| {
                    is_non_associative(p)
                        && infix_binding_power(p).is_some_and(|bp| bp.0 == l_bp)
                })
            {
                let span = self.current_span();
                let found = self.peek_text().to_string();
                self.errors.push(ParseError {
                    message: format!("operator '{found}' cannot be chained"),
                    span,
                    code: "syntax/non-associative-operator",
                });
            }
            prev_infix = Some(kind);
            self.start_at(cp, BinaryExpr);
            self.bump();
            if kind == InstanceofKw {
                // rhs is a class reference, not a full expression
                let rcp = self.checkpoint();
                self.parse_primary();
                self.parse_postfix(rcp);
            } else {
                self.parse_expr_bp(r_bp);
            }
            self.finish();
        }
    }

    /// Tightest-binding suffixes: calls, indexing, member and scoped
    /// access, postfix `++`/`--`.
    fn parse_postfix(&mut self, cp: Checkpoint) {
        use PhpSyntaxKind::*;
        loop {
            match self.peek() {
                LParen => {
                    self.start_at(cp, CallExpr);
                    self.parse_arg_list();
                    self.finish();
                }
                LBracket => {
                    self.start_at(cp, IndexExpr);
                    self.bump();
                    if !self.at(RBracket) {
                        self.parse_expr();
                    }
                    self.expect(RBracket, "']'");
                    self.finish();
                }
                Arrow | NullsafeArrow => {
                    if self.at(NullsafeArrow) {
                        self.require_version(
                            self.version.supports_nullsafe_operator(),
                            "the nullsafe operator",
                            "8.0",
                        );
                    }
                    self.start_at(cp, MemberAccessExpr);
                    self.bump();
                    self.parse_member_name();
                    self.finish();
                }
                DoubleColon => {
                    self.start_at(cp, ScopedAccessExpr);
                    self.bump();
                    self.parse_member_name();
                    self.finish();
                }
                Inc | Dec => {
                    self.start_at(cp, PostfixExpr);
                    self.bump();
                    self.finish();
                }
                _ => break,
            }
        }
    }

    /// Member names after `->`, `?->` and `::`: identifiers, variables,
    /// `{expr}`, `class`, or any keyword used as a name.
    fn parse_member_name(&mut self) {
        use PhpSyntaxKind::*;
        match self.peek() {
            Ident | Variable | ClassKw => self.bump(),
            LBrace => {
                self.bump();
                self.parse_expr();
                self.expect(RBrace, "'}'");
            }
            Dollar => {
                self.parse_primary();
            }
            kind if PhpSyntaxKind::from_keyword(self.peek_text()).is_some()
                && kind != Eof =>
            {
                self.bump()
            }
            _ => self.error("expected a member name"),
        }
    }

    fn parse_arg_list(&mut self) {
        use PhpSyntaxKind::*;
        self.start(ArgList);
        self.expect(LParen, "'('");
        // first-class callable: f(...)
        if self.at(Ellipsis) && self.peek_nth(1) == RParen {
            self.require_version(
                self.version.supports_first_class_callables(),
                "first-class callable syntax",
                "8.1",
            );
            self.bump();
            self.bump();
            self.finish();
            return;
        }
        while !self.at(RParen) && !self.at(Eof) {
            self.start(Arg);
            if self.at(Ident) && self.peek_nth(1) == Colon && self.peek_nth(2) != Colon {
                self.require_version(
                    self.version.supports_named_arguments(),
                    "named arguments",
                    "8.0",
                );
                self.bump();
                self.bump();
            }
            if self.at(Ellipsis) {
                self.bump();
            }
            if self.at(Amp) {
                self.bump();
            }
            self.parse_expr();
            self.finish();
            if self.at(Comma) {
                self.bump();
            } else {
                break;
            }
        }
        self.expect(RParen, "')'");
        self.finish();
    }

    fn parse_primary(&mut self) {
        use PhpSyntaxKind::*;
        let cp = self.checkpoint();
        match self.peek() {
            Bang => self.parse_unary(BP_NOT),
            Minus | Plus | Tilde | At | Inc | Dec => self.parse_unary(BP_UNARY),
            Cast => {
                self.start(CastExpr);
                self.bump();
                self.parse_expr_bp(BP_UNARY);
                self.finish();
            }
            Amp | Ellipsis => self.parse_unary(BP_UNARY),
            Variable => {
                self.start(VariableExpr);
                self.bump();
                self.finish();
            }
            Dollar => {
                self.start(UnaryExpr);
                self.bump();
                if self.at(LBrace) {
                    self.bump();
                    self.parse_expr();
                    self.expect(RBrace, "'}'");
                } else {
                    self.parse_primary();
                }
                self.finish();
            }
            Integer | Float | SingleQuoteString | TrueKw | FalseKw | NullKw => {
                self.start(Literal);
                self.bump();
                self.finish();
            }
            StringStart => self.parse_interpolated(StringEnd),
            HeredocStart => self.parse_interpolated(HeredocEnd),
            LParen => {
                self.start(ParenExpr);
                self.bump();
                self.parse_expr();
                self.expect(RParen, "')'");
                self.finish();
            }
            LBracket => self.parse_array_literal(),
            Ident | Backslash => {
                let text = self.peek_text();
                if matches!(
                    text.to_ascii_lowercase().as_str(),
                    "print" | "include" | "include_once" | "require" | "require_once"
                ) {
                    self.start(UnaryExpr);
                    self.bump();
                    self.parse_expr_bp(BP_PRINT);
                    self.finish();
                } else {
                    self.start(NameExpr);
                    self.parse_name_path_tokens();
                    self.finish();
                }
            }
            NewKw => self.parse_new(),
            FunctionKw => self.parse_closure(cp),
            FnKw => self.parse_arrow_fn(cp),
            StaticKw => match self.peek_nth(1) {
                FunctionKw => {
                    self.parse_closure(cp);
                }
                FnKw => {
                    self.parse_arrow_fn(cp);
                }
                _ => {
                    self.start(NameExpr);
                    self.bump();
                    self.finish();
                }
            },
            AttributeStart => {
                while self.at(AttributeStart) {
                    self.parse_attribute_list();
                }
                match self.peek() {
                    FunctionKw | StaticKw => self.parse_closure(cp),
                    FnKw => self.parse_arrow_fn(cp),
                    _ => self.error("expected a closure after attributes"),
                }
            }
            MatchKw => self.parse_match(),
            IssetKw => {
                self.start(IssetExpr);
                self.bump();
                self.parse_arg_list();
                self.finish();
            }
            Error => {
                self.start(ErrorNode);
                self.bump();
                self.finish();
            }
            _ => self.parse_primary_keyword_prefix(),
        }
    }

    /// `clone`, `throw`, `yield` and the error fallback live here to keep
    /// the main dispatch readable.
    fn parse_primary_keyword_prefix(&mut self) {
        use PhpSyntaxKind::*;
        match self.peek() {
            CloneKw => {
                self.start(UnaryExpr);
                self.bump();
                self.parse_expr_bp(BP_UNARY);
                self.finish();
            }
            ThrowKw => {
                self.start(UnaryExpr);
                self.bump();
                self.parse_expr_bp(BP_PRINT);
                self.finish();
            }
            YieldKw => {
                self.start(YieldExpr);
                self.bump();
                // `yield from expr`
                if self.at(Ident) && self.peek_text().eq_ignore_ascii_case("from") {
                    self.bump();
                    self.parse_expr_bp(BP_PRINT);
                } else if !matches!(
                    self.peek(),
                    Semicolon | RParen | RBracket | Comma | CloseTag | Eof
                ) {
                    self.parse_expr_bp(BP_PRINT);
                }
                self.finish();
            }
            _ => {
                let found = self.peek_text().to_string();
                if found.is_empty() {
                    self.error("expected an expression, found end of file");
                } else {
                    self.error(format!("expected an expression, found '{found}'"));
                }
                self.start(ErrorNode);
                if !matches!(
                    self.peek(),
                    Semicolon | RParen | RBrace | RBracket | Comma | CloseTag | Eof
                ) {
                    self.bump();
                }
                self.finish();
            }
        }
    }

    fn parse_unary(&mut self, bp: u8) {
        self.start(PhpSyntaxKind::UnaryExpr);
        self.bump();
        self.parse_expr_bp(bp);
        self.finish();
    }

    fn parse_new(&mut self) {
        use PhpSyntaxKind::*;
        self.start(NewExpr);
        self.bump(); // new
        if self.at(ClassKw) {
            // anonymous class
            self.bump();
            if self.at(LParen) {
                self.parse_arg_list();
            }
            if self.at(ExtendsKw) {
                self.bump();
                self.parse_name_path();
            }
            if self.at(ImplementsKw) {
                self.bump();
                self.parse_name_path();
                while self.at(Comma) {
                    self.bump();
                    self.parse_name_path();
                }
            }
            self.parse_class_body();
            self.finish();
            return;
        }
        match self.peek() {
            Ident | Backslash => {
                self.start(NameExpr);
                self.parse_name_path_tokens();
                self.finish();
            }
            StaticKw => {
                self.start(NameExpr);
                self.bump();
                self.finish();
            }
            Variable => {
                let cp = self.checkpoint();
                self.start(VariableExpr);
                self.bump();
                self.finish();
                // new $factory->class(...) style references
                while matches!(self.peek(), Arrow | NullsafeArrow | DoubleColon | LBracket) {
                    self.parse_postfix(cp);
                    break;
                }
            }
            LParen => {
                self.start(ParenExpr);
                self.bump();
                self.parse_expr();
                self.expect(RParen, "')'");
                self.finish();
            }
            _ => self.error("expected a class name after 'new'"),
        }
        if self.at(LParen) {
            self.parse_arg_list();
        }
        self.finish();
    }

    fn parse_array_literal(&mut self) {
        use PhpSyntaxKind::*;
        self.start(ArrayExpr);
        self.bump(); // [
        while !self.at(RBracket) && !self.at(Eof) {
            self.parse_array_item();
            if self.at(Comma) {
                self.bump();
            } else {
                break;
            }
        }
        self.expect(RBracket, "']'");
        self.finish();
    }

    fn parse_array_item(&mut self) {
        use PhpSyntaxKind::*;
        self.start(ArrayItem);
        if self.at(Ellipsis) {
            self.bump();
            self.parse_expr();
            self.finish();
            return;
        }
        if self.at(Amp) {
            self.bump();
        }
        self.parse_expr();
        if self.at(DoubleArrow) {
            self.bump();
            if self.at(Amp) {
                self.bump();
            }
            self.parse_expr();
        }
        self.finish();
    }

    fn parse_closure(&mut self, cp: Checkpoint) {
        use PhpSyntaxKind::*;
        self.start_at(cp, Closure);
        if self.at(StaticKw) {
            self.bump();
        }
        self.expect(FunctionKw, "'function'");
        if self.at(Amp) {
            self.bump();
        }
        self.parse_param_list();
        if self.at(UseKw) {
            self.start(ClosureUse);
            self.bump();
            self.expect(LParen, "'('");
            while !self.at(RParen) && !self.at(Eof) {
                if self.at(Amp) {
                    self.bump();
                }
                self.expect(Variable, "a variable");
                if self.at(Comma) {
                    self.bump();
                } else {
                    break;
                }
            }
            self.expect(RParen, "')'");
            self.finish();
        }
        if self.at(Colon) {
            self.bump();
            self.parse_type();
        }
        self.parse_block();
        self.finish();
    }

    fn parse_arrow_fn(&mut self, cp: Checkpoint) {
        use PhpSyntaxKind::*;
        self.require_version(
            self.version.supports_arrow_functions(),
            "arrow functions",
            "7.4",
        );
        self.start_at(cp, ArrowFn);
        if self.at(StaticKw) {
            self.bump();
        }
        self.expect(FnKw, "'fn'");
        if self.at(Amp) {
            self.bump();
        }
        self.parse_param_list();
        if self.at(Colon) {
            self.bump();
            self.parse_type();
        }
        self.expect(DoubleArrow, "'=>'");
        self.parse_expr_bp(BP_ASSIGN.1);
        self.finish();
    }

    fn parse_match(&mut self) {
        use PhpSyntaxKind::*;
        self.require_version(self.version.supports_match(), "`match` expressions", "8.0");
        self.start(MatchExpr);
        self.bump(); // match
        self.expect(LParen, "'('");
        self.parse_expr();
        self.expect(RParen, "')'");
        self.expect(LBrace, "'{'");
        while !self.at(RBrace) && !self.at(Eof) {
            self.start(MatchArm);
            if self.at(DefaultKw) {
                self.bump();
            } else {
                self.parse_expr();
                while self.at(Comma) && self.peek_nth(1) != RBrace {
                    self.bump();
                    if self.at(DoubleArrow) {
                        break;
                    }
                    self.parse_expr();
                }
            }
            self.expect(DoubleArrow, "'=>'");
            self.parse_expr();
            self.finish();
            if self.at(Comma) {
                self.bump();
            } else {
                break;
            }
        }
        self.expect(RBrace, "'}'");
        self.finish();
    }

    fn parse_interpolated(&mut self, end: PhpSyntaxKind) {
        use PhpSyntaxKind::*;
        self.start(InterpolatedString);
        self.bump(); // opening " or <<<LABEL
        loop {
            match self.peek() {
                StringText => self.bump(),
                Variable => {
                    // simple interpolation; `->prop` and `[dim]` tokens were
                    // produced by the lexer and belong to the string
                    self.bump();
                    if self.at(Arrow) {
                        self.bump();
                        self.expect(Ident, "a property name");
                    } else if self.at(LBracket) {
                        self.bump();
                        if matches!(self.peek(), Ident | Variable | Integer) {
                            self.bump();
                        }
                        self.expect(RBracket, "']'");
                    }
                }
                InterpolationStart => {
                    self.bump();
                    self.parse_expr();
                    self.expect(InterpolationEnd, "'}'");
                }
                kind if kind == end => {
                    self.bump();
                    break;
                }
                Eof => break,
                _ => {
                    // stray token inside the string; keep it and move on
                    self.bump();
                }
            }
        }
        self.finish();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> Parse {
        parse_php(src, PhpVersion::default())
    }

    fn assert_lossless(src: &str) -> Parse {
        let parse = parse(src);
        assert_eq!(parse.root.text().to_string(), src, "round-trip failed");
        parse
    }

    fn find_node(parse: &Parse, kind: PhpSyntaxKind) -> Option<PhpSyntaxNode> {
        parse.root.descendants().find(|n| n.kind() == kind)
    }

    #[test]
    fn empty_and_html_only_inputs() {
        let parse = assert_lossless("");
        assert_eq!(parse.root.kind(), PhpSyntaxKind::Program);
        assert!(parse.errors.is_empty());

        let parse = assert_lossless("<h1>No PHP here</h1>");
        assert!(parse.errors.is_empty());
        assert!(find_node(&parse, PhpSyntaxKind::InlineHtmlStmt).is_some());
    }

    #[test]
    fn statements_round_trip() {
        let src = r#"<?php

namespace App\Service;

use App\Contracts\{Cache, Logger as Log};

function resolve(?string $name = null, int ...$rest): array
{
    static $memo = [];
    if (isset($memo[$name])) {
        return $memo[$name];
    }
    foreach ($rest as $i => $value) {
        $memo[$name][] = $value * 2;
    }
    return $memo[$name] ?? [];
}
"#;
        let parse = assert_lossless(src);
        assert!(parse.errors.is_empty(), "{:?}", parse.errors);
        assert!(find_node(&parse, PhpSyntaxKind::NamespaceDecl).is_some());
        assert!(find_node(&parse, PhpSyntaxKind::UseDecl).is_some());
        assert!(find_node(&parse, PhpSyntaxKind::FunctionDecl).is_some());
        assert!(find_node(&parse, PhpSyntaxKind::ForeachStmt).is_some());
    }

    #[test]
    fn class_members() {
        let src = r#"<?php
final class Order extends Model implements Arrayable
{
    use HasTimestamps;

    public const STATUS_OPEN = 'open';

    private readonly int $total;
    protected static ?string $connection = null;

    public function __construct(private array $lines = [])
    {
        $this->total = 0;
    }

    abstract protected function refresh(): void;
}
"#;
        let parse = assert_lossless(src);
        assert!(parse.errors.is_empty(), "{:?}", parse.errors);
        assert!(find_node(&parse, PhpSyntaxKind::TraitUse).is_some());
        assert!(find_node(&parse, PhpSyntaxKind::ConstDecl).is_some());
        assert_eq!(
            parse
                .root
                .descendants()
                .filter(|n| n.kind() == PhpSyntaxKind::PropertyDecl)
                .count(),
            2
        );
        assert_eq!(
            parse
                .root
                .descendants()
                .filter(|n| n.kind() == PhpSyntaxKind::MethodDecl)
                .count(),
            2
        );
    }

    #[test]
    fn precedence_shapes_the_tree() {
        // 1 + 2 * 3 parses as 1 + (2 * 3)
        let parse = assert_lossless("<?php $x = 1 + 2 * 3;");
        let assign = find_node(&parse, PhpSyntaxKind::AssignExpr).unwrap();
        let outer = assign
            .children()
            .filter(|n| n.kind() == PhpSyntaxKind::BinaryExpr)
            .last()
            .unwrap();
        let inner = outer
            .children()
            .find(|n| n.kind() == PhpSyntaxKind::BinaryExpr)
            .unwrap();
        assert_eq!(inner.text().to_string().trim(), "2 * 3");
    }

    #[test]
    fn concat_binds_looser_than_addition() {
        let parse = assert_lossless("<?php $x = 'n=' . 1 + 2;");
        // since PHP 8: 'n=' . (1 + 2)
        let outer = find_node(&parse, PhpSyntaxKind::BinaryExpr).unwrap();
        assert!(outer.children_with_tokens().any(|e| {
            e.as_token().is_some_and(|t| t.kind() == PhpSyntaxKind::Dot)
        }));
    }

    #[test]
    fn power_is_right_associative() {
        let parse = assert_lossless("<?php $x = 2 ** 3 ** 2;");
        let outer = find_node(&parse, PhpSyntaxKind::BinaryExpr).unwrap();
        let inner = outer
            .children()
            .find(|n| n.kind() == PhpSyntaxKind::BinaryExpr)
            .unwrap();
        assert_eq!(inner.text().to_string().trim(), "3 ** 2");
    }

    #[test]
    fn chained_non_associative_operators_are_reported() {
        for src in [
            "<?php $x = $a == $b == $c;",
            "<?php $x = $a < $b < $c;",
            "<?php $x = $a <=> $b <=> $c;",
            "<?php $x = $a instanceof B instanceof C;",
        ] {
            let parse = assert_lossless(src);
            assert!(
                parse
                    .errors
                    .iter()
                    .any(|e| e.code == "syntax/non-associative-operator"),
                "{src}"
            );
        }
        // different precedence levels associate fine
        assert!(parse("<?php $x = $a < $b == $c;").errors.is_empty());
    }

    #[test]
    fn assignment_is_right_associative() {
        let parse = assert_lossless("<?php $a = $b = 1;");
        let outer = find_node(&parse, PhpSyntaxKind::AssignExpr).unwrap();
        assert!(
            outer
                .children()
                .any(|n| n.kind() == PhpSyntaxKind::AssignExpr)
        );
    }

    #[test]
    fn ternary_and_coalesce() {
        assert_lossless("<?php $x = $a ? $b : $c;");
        assert_lossless("<?php $x = $a ?: $c;");
        let parse = assert_lossless("<?php $x = $a ?? $b ?? $c;");
        // right associative: $a ?? ($b ?? $c)
        let outer = find_node(&parse, PhpSyntaxKind::BinaryExpr).unwrap();
        let inner = outer
            .children()
            .find(|n| n.kind() == PhpSyntaxKind::BinaryExpr)
            .unwrap();
        assert_eq!(inner.text().to_string().trim(), "$b ?? $c");
    }

    #[test]
    fn call_chains() {
        let parse = assert_lossless("<?php $r = $obj->query()->where('a', 1)?->first()[0];");
        assert!(parse.errors.is_empty(), "{:?}", parse.errors);
        assert!(find_node(&parse, PhpSyntaxKind::IndexExpr).is_some());
        assert!(find_node(&parse, PhpSyntaxKind::MemberAccessExpr).is_some());
    }

    #[test]
    fn closures_and_arrow_fns() {
        let src =
            "<?php $f = static function ($x) use (&$acc): int { return $acc += $x; };\n$g = fn($y) => $y * 2;";
        let parse = assert_lossless(src);
        assert!(parse.errors.is_empty(), "{:?}", parse.errors);
        assert!(find_node(&parse, PhpSyntaxKind::Closure).is_some());
        assert!(find_node(&parse, PhpSyntaxKind::ClosureUse).is_some());
        assert!(find_node(&parse, PhpSyntaxKind::ArrowFn).is_some());
    }

    #[test]
    fn match_expression() {
        let src = r#"<?php
$label = match ($status) {
    200, 204 => 'ok',
    404 => 'missing',
    default => 'unknown',
};
"#;
        let parse = assert_lossless(src);
        assert!(parse.errors.is_empty(), "{:?}", parse.errors);
        assert_eq!(
            parse
                .root
                .descendants()
                .filter(|n| n.kind() == PhpSyntaxKind::MatchArm)
                .count(),
            3
        );
    }

    #[test]
    fn match_gated_below_php80() {
        let parse = parse_php("<?php $x = match ($a) { default => 1 };", PhpVersion::Php74);
        assert!(
            parse
                .errors
                .iter()
                .any(|e| e.code == "syntax/version-gated-feature")
        );
        // still fully parsed
        assert!(
            parse
                .root
                .descendants()
                .any(|n| n.kind() == PhpSyntaxKind::MatchExpr)
        );
    }

    #[test]
    fn arrow_fns_gated_below_php74() {
        let src = "<?php $f = fn($x) => $x + 1;";
        let parse = parse_php(src, PhpVersion::Php73);
        assert!(
            parse
                .errors
                .iter()
                .any(|e| e.code == "syntax/version-gated-feature")
        );
        assert!(
            parse
                .root
                .descendants()
                .any(|n| n.kind() == PhpSyntaxKind::ArrowFn)
        );
        assert!(parse_php(src, PhpVersion::Php74).errors.is_empty());
    }

    #[test]
    fn enums_gated_below_php81() {
        let src = "<?php enum Suit { case Hearts; case Spades; }";
        let parse = parse_php(src, PhpVersion::Php80);
        assert!(
            parse
                .errors
                .iter()
                .any(|e| e.code == "syntax/version-gated-feature")
        );
        let parse = parse_php(src, PhpVersion::Php81);
        assert!(parse.errors.is_empty(), "{:?}", parse.errors);
        assert_eq!(
            parse
                .root
                .descendants()
                .filter(|n| n.kind() == PhpSyntaxKind::EnumCase)
                .count(),
            2
        );
    }

    #[test]
    fn attributes_and_named_arguments() {
        let src = "<?php #[Route('/home', methods: ['GET'])] function home() {}";
        let parse = assert_lossless(src);
        assert!(parse.errors.is_empty(), "{:?}", parse.errors);
        assert!(find_node(&parse, PhpSyntaxKind::AttributeList).is_some());

        let parse = parse_php(src, PhpVersion::Php74);
        let gated: Vec<_> = parse
            .errors
            .iter()
            .filter(|e| e.code == "syntax/version-gated-feature")
            .collect();
        assert_eq!(gated.len(), 2); // attributes + named arguments
    }

    #[test]
    fn first_class_callables_gated() {
        let src = "<?php $len = strlen(...);";
        let parse = parse_php(src, PhpVersion::Php80);
        assert!(
            parse
                .errors
                .iter()
                .any(|e| e.code == "syntax/version-gated-feature")
        );
        assert!(parse_php(src, PhpVersion::Php81).errors.is_empty());
    }

    #[test]
    fn alternate_control_syntax() {
        let src = "<?php if ($a): ?>\n<p>yes</p>\n<?php else: ?>\n<p>no</p>\n<?php endif; ?>";
        let parse = assert_lossless(src);
        assert!(parse.errors.is_empty(), "{:?}", parse.errors);
        assert!(find_node(&parse, PhpSyntaxKind::ElseClause).is_some());
    }

    #[test]
    fn error_recovery_keeps_following_statements() {
        let src = "<?php $a = ;\n$b = 2;\necho $b;";
        let parse = assert_lossless(src);
        assert!(!parse.errors.is_empty());
        assert!(find_node(&parse, PhpSyntaxKind::ErrorNode).is_some());
        // the two good statements still parse
        assert!(
            parse
                .root
                .descendants()
                .filter(|n| n.kind() == PhpSyntaxKind::AssignExpr)
                .any(|n| n.text().to_string().contains("$b = 2"))
        );
        assert!(find_node(&parse, PhpSyntaxKind::EchoStmt).is_some());
    }

    #[test]
    fn unclosed_brace_recovers() {
        let src = "<?php function f() { if ($a) { echo 1;";
        let parse = assert_lossless(src);
        assert!(!parse.errors.is_empty());
        assert!(find_node(&parse, PhpSyntaxKind::FunctionDecl).is_some());
    }

    #[test]
    fn try_catch_finally() {
        let src = r#"<?php
try {
    risky();
} catch (IOException | NetworkException $e) {
    report($e);
} finally {
    cleanup();
}
"#;
        let parse = assert_lossless(src);
        assert!(parse.errors.is_empty(), "{:?}", parse.errors);
        assert!(find_node(&parse, PhpSyntaxKind::CatchClause).is_some());
        assert!(find_node(&parse, PhpSyntaxKind::FinallyClause).is_some());
        assert!(find_node(&parse, PhpSyntaxKind::UnionType).is_some());
    }

    #[test]
    fn heredoc_expression() {
        let src = "<?php $q = <<<SQL\nselect {$cols} from t\nSQL;\n";
        let parse = assert_lossless(src);
        assert!(parse.errors.is_empty(), "{:?}", parse.errors);
        assert!(find_node(&parse, PhpSyntaxKind::InterpolatedString).is_some());
    }

    #[test]
    fn instanceof_takes_a_class_reference() {
        let parse = assert_lossless("<?php $ok = $x instanceof \\App\\Model && $y;");
        assert!(parse.errors.is_empty(), "{:?}", parse.errors);
    }

    #[test]
    fn short_echo_tag() {
        let parse = assert_lossless("<p><?= $title ?></p>");
        assert!(parse.errors.is_empty(), "{:?}", parse.errors);
        assert!(find_node(&parse, PhpSyntaxKind::EchoStmt).is_some());
    }

    #[test]
    fn parse_is_deterministic() {
        let src = "<?php class A { public function b() { return [1 => 'x']; } }";
        let a = parse(src);
        let b = parse(src);
        assert_eq!(format!("{:#?}", a.root), format!("{:#?}", b.root));
        assert_eq!(a.errors, b.errors);
    }
}
