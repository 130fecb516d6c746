//! Trivia-preserving PHP lexer
//!
//! Produces a flat token stream in which whitespace, newlines, comments and
//! inline HTML are ordinary tokens, so that the CST built from it is
//! lossless: concatenating every token's text reproduces the input
//! byte-for-byte.
//!
//! The lexer is a pull-based scanner over the source with a small mode
//! stack for the context-sensitive parts of PHP:
//!
//! - inline mode: text outside `<?php` / `<?=` becomes `InlineHtml`
//! - script mode: ordinary PHP tokens
//! - double-quoted string / interpolating heredoc: literal runs are
//!   `StringText`, `$var` and `{$...}` re-enter script mode
//! - nowdoc: the whole body is a single `StringText`
//!
//! Lexing never aborts: unterminated constructs emit an error spanning the
//! opening delimiter and synthesize a best-effort token to EOF.

use std::ops::Range;

use crate::diagnostics::Severity;
use crate::version::PhpVersion;

use super::PhpSyntaxKind;

/// Byte range in the original source.
pub type CstSpan = Range<usize>;

/// A lexer error. Carries the diagnostic code and severity so the caller
/// can surface it without re-classifying.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexerError {
    pub message: String,
    pub span: CstSpan,
    pub code: &'static str,
    pub severity: Severity,
}

impl LexerError {
    pub fn new(message: impl Into<String>, span: CstSpan, code: &'static str) -> Self {
        Self {
            message: message.into(),
            span,
            code,
            severity: Severity::Error,
        }
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }
}

/// A token with its syntax kind, text and span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CstToken {
    pub kind: PhpSyntaxKind,
    pub text: String,
    pub span: CstSpan,
}

impl CstToken {
    pub fn new(kind: PhpSyntaxKind, text: impl Into<String>, span: CstSpan) -> Self {
        Self {
            kind,
            text: text.into(),
            span,
        }
    }
}

/// Result returned by the lexer.
pub type LexResult = (Vec<CstToken>, Vec<LexerError>);

#[derive(Debug, Clone, PartialEq, Eq)]
enum Mode {
    Inline,
    Script {
        /// true when this frame was entered from a string interpolation
        interp: bool,
        brace_depth: u32,
    },
    DoubleQuote {
        /// Offset of the opening `"`, so errors can point at the delimiter.
        opened: usize,
    },
    Heredoc {
        label: String,
    },
}

/// Lex PHP source preserving all trivia.
pub fn lex_with_trivia(source: &str, version: PhpVersion) -> LexResult {
    let mut lexer = Lexer {
        src: source,
        pos: 0,
        tokens: Vec::new(),
        errors: Vec::new(),
        modes: vec![Mode::Inline],
        version,
    };
    lexer.run();
    (lexer.tokens, lexer.errors)
}

struct Lexer<'a> {
    src: &'a str,
    pos: usize,
    tokens: Vec<CstToken>,
    errors: Vec<LexerError>,
    modes: Vec<Mode>,
    version: PhpVersion,
}

impl<'a> Lexer<'a> {
    fn run(&mut self) {
        while self.pos < self.src.len() {
            match self.modes.last().cloned() {
                Some(Mode::Inline) => self.lex_inline(),
                Some(Mode::Script { .. }) => self.lex_script_token(),
                Some(Mode::DoubleQuote { opened }) => self.lex_double_quote(opened),
                Some(Mode::Heredoc { label }) => self.lex_heredoc_body(&label),
                None => break,
            }
        }
        let end = self.src.len();
        self.tokens
            .push(CstToken::new(PhpSyntaxKind::Eof, "", end..end));
    }

    fn push(&mut self, kind: PhpSyntaxKind, start: usize) {
        let end = self.pos;
        self.tokens
            .push(CstToken::new(kind, &self.src[start..end], start..end));
    }

    fn error(&mut self, message: impl Into<String>, span: CstSpan, code: &'static str) {
        self.errors.push(LexerError::new(message, span, code));
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.src.get(self.pos + offset..)?.chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn starts_with(&self, s: &str) -> bool {
        self.src[self.pos..].starts_with(s)
    }

    fn eat(&mut self, s: &str) -> bool {
        if self.starts_with(s) {
            self.pos += s.len();
            true
        } else {
            false
        }
    }

    // === Inline mode ===

    fn lex_inline(&mut self) {
        let start = self.pos;
        while self.pos < self.src.len() {
            if self.starts_with("<?php") {
                let after = self.src[self.pos + 5..].chars().next();
                if after.is_none() || after.is_some_and(|c| c.is_whitespace()) {
                    self.flush_inline(start);
                    let tag_start = self.pos;
                    self.pos += 5;
                    self.push(PhpSyntaxKind::OpenTag, tag_start);
                    let top = self.modes.len() - 1;
                    self.modes[top] = Mode::Script {
                        interp: false,
                        brace_depth: 0,
                    };
                    return;
                }
            }
            if self.starts_with("<?=") {
                self.flush_inline(start);
                let tag_start = self.pos;
                self.pos += 3;
                self.push(PhpSyntaxKind::OpenTagEcho, tag_start);
                let top = self.modes.len() - 1;
                self.modes[top] = Mode::Script {
                    interp: false,
                    brace_depth: 0,
                };
                return;
            }
            if self.starts_with("<php?") {
                // A common typo. Report it once at the offending offset and
                // keep treating the text as inline HTML, exactly as PHP would.
                let span = self.pos..self.pos + 5;
                self.errors.push(
                    LexerError::new(
                        "'<php?' is not a PHP open tag; did you mean '<?php'?",
                        span,
                        "lexer/invalid-open-tag",
                    )
                    .with_severity(Severity::Help),
                );
                self.pos += 5;
                continue;
            }
            self.bump();
        }
        self.flush_inline(start);
    }

    fn flush_inline(&mut self, start: usize) {
        if self.pos > start {
            self.push(PhpSyntaxKind::InlineHtml, start);
        }
    }

    // === Script mode ===

    fn lex_script_token(&mut self) {
        let start = self.pos;
        let Some(ch) = self.peek() else { return };

        match ch {
            c if c == ' ' || c == '\t' => {
                while matches!(self.peek(), Some(' ') | Some('\t')) {
                    self.bump();
                }
                self.push(PhpSyntaxKind::Whitespace, start);
            }
            '\n' => {
                self.bump();
                self.push(PhpSyntaxKind::Newline, start);
            }
            '\r' => {
                self.bump();
                if self.peek() == Some('\n') {
                    self.bump();
                }
                self.push(PhpSyntaxKind::Newline, start);
            }
            '?' => {
                if self.eat("?>") {
                    self.push(PhpSyntaxKind::CloseTag, start);
                    let top = self.modes.len() - 1;
                    self.modes[top] = Mode::Inline;
                } else if self.eat("?->") {
                    self.push(PhpSyntaxKind::NullsafeArrow, start);
                } else if self.eat("??=") {
                    self.push(PhpSyntaxKind::QuestionQuestionEquals, start);
                } else if self.eat("??") {
                    self.push(PhpSyntaxKind::QuestionQuestion, start);
                } else {
                    self.bump();
                    self.push(PhpSyntaxKind::Question, start);
                }
            }
            '/' => self.lex_slash(start),
            '#' => {
                if self.eat("#[") {
                    self.push(PhpSyntaxKind::AttributeStart, start);
                } else {
                    self.lex_line_comment(start);
                }
            }
            '$' => {
                self.bump();
                if self
                    .peek()
                    .is_some_and(|c| c == '_' || c.is_alphabetic())
                {
                    while self
                        .peek()
                        .is_some_and(|c| c == '_' || c.is_alphanumeric())
                    {
                        self.bump();
                    }
                    self.push(PhpSyntaxKind::Variable, start);
                } else {
                    self.push(PhpSyntaxKind::Dollar, start);
                }
            }
            '\'' => self.lex_single_quote(start),
            '"' => {
                self.bump();
                self.push(PhpSyntaxKind::StringStart, start);
                self.modes.push(Mode::DoubleQuote { opened: start });
            }
            '`' => self.lex_backtick(start),
            '<' => self.lex_lt(start),
            '>' => {
                if self.eat(">>=") {
                    self.push(PhpSyntaxKind::ShrEquals, start);
                } else if self.eat(">>") {
                    self.push(PhpSyntaxKind::Shr, start);
                } else if self.eat(">=") {
                    self.push(PhpSyntaxKind::Ge, start);
                } else {
                    self.bump();
                    self.push(PhpSyntaxKind::Gt, start);
                }
            }
            '=' => {
                if self.eat("===") {
                    self.push(PhpSyntaxKind::EqEqEq, start);
                } else if self.eat("==") {
                    self.push(PhpSyntaxKind::EqEq, start);
                } else if self.eat("=>") {
                    self.push(PhpSyntaxKind::DoubleArrow, start);
                } else {
                    self.bump();
                    self.push(PhpSyntaxKind::Equals, start);
                }
            }
            '!' => {
                if self.eat("!==") {
                    self.push(PhpSyntaxKind::NotEqEq, start);
                } else if self.eat("!=") {
                    self.push(PhpSyntaxKind::NotEq, start);
                } else {
                    self.bump();
                    self.push(PhpSyntaxKind::Bang, start);
                }
            }
            '+' => {
                if self.eat("++") {
                    self.push(PhpSyntaxKind::Inc, start);
                } else if self.eat("+=") {
                    self.push(PhpSyntaxKind::PlusEquals, start);
                } else {
                    self.bump();
                    self.push(PhpSyntaxKind::Plus, start);
                }
            }
            '-' => {
                if self.eat("--") {
                    self.push(PhpSyntaxKind::Dec, start);
                } else if self.eat("->") {
                    self.push(PhpSyntaxKind::Arrow, start);
                } else if self.eat("-=") {
                    self.push(PhpSyntaxKind::MinusEquals, start);
                } else {
                    self.bump();
                    self.push(PhpSyntaxKind::Minus, start);
                }
            }
            '*' => {
                if self.eat("**=") {
                    self.push(PhpSyntaxKind::PowEquals, start);
                } else if self.eat("**") {
                    self.push(PhpSyntaxKind::Pow, start);
                } else if self.eat("*=") {
                    self.push(PhpSyntaxKind::StarEquals, start);
                } else {
                    self.bump();
                    self.push(PhpSyntaxKind::Star, start);
                }
            }
            '%' => {
                if self.eat("%=") {
                    self.push(PhpSyntaxKind::PercentEquals, start);
                } else {
                    self.bump();
                    self.push(PhpSyntaxKind::Percent, start);
                }
            }
            '.' => {
                if self.eat("...") {
                    self.push(PhpSyntaxKind::Ellipsis, start);
                } else if self.eat(".=") {
                    self.push(PhpSyntaxKind::DotEquals, start);
                } else if self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
                    self.lex_number(start);
                } else {
                    self.bump();
                    self.push(PhpSyntaxKind::Dot, start);
                }
            }
            '&' => {
                if self.eat("&&") {
                    self.push(PhpSyntaxKind::AmpAmp, start);
                } else if self.eat("&=") {
                    self.push(PhpSyntaxKind::AmpEquals, start);
                } else {
                    self.bump();
                    self.push(PhpSyntaxKind::Amp, start);
                }
            }
            '|' => {
                if self.eat("||") {
                    self.push(PhpSyntaxKind::PipePipe, start);
                } else if self.eat("|=") {
                    self.push(PhpSyntaxKind::PipeEquals, start);
                } else if self.version.supports_pipe_operator() && self.eat("|>") {
                    self.push(PhpSyntaxKind::Pipeline, start);
                } else {
                    self.bump();
                    self.push(PhpSyntaxKind::PipeOp, start);
                }
            }
            '^' => {
                if self.eat("^=") {
                    self.push(PhpSyntaxKind::CaretEquals, start);
                } else {
                    self.bump();
                    self.push(PhpSyntaxKind::CaretOp, start);
                }
            }
            '~' => {
                self.bump();
                self.push(PhpSyntaxKind::Tilde, start);
            }
            '@' => {
                self.bump();
                self.push(PhpSyntaxKind::At, start);
            }
            '\\' => {
                self.bump();
                self.push(PhpSyntaxKind::Backslash, start);
            }
            '(' => {
                if let Some(end) = self.scan_cast() {
                    self.pos = end;
                    self.push(PhpSyntaxKind::Cast, start);
                } else {
                    self.bump();
                    self.push(PhpSyntaxKind::LParen, start);
                }
            }
            ')' => {
                self.bump();
                self.push(PhpSyntaxKind::RParen, start);
            }
            '[' => {
                self.bump();
                self.push(PhpSyntaxKind::LBracket, start);
            }
            ']' => {
                self.bump();
                self.push(PhpSyntaxKind::RBracket, start);
            }
            '{' => {
                self.bump();
                self.push(PhpSyntaxKind::LBrace, start);
                if let Some(Mode::Script { brace_depth, .. }) = self.modes.last_mut() {
                    *brace_depth += 1;
                }
            }
            '}' => {
                self.bump();
                let closes_interp = match self.modes.last_mut() {
                    Some(Mode::Script {
                        interp,
                        brace_depth,
                    }) => {
                        if *brace_depth > 0 {
                            *brace_depth -= 1;
                            false
                        } else {
                            *interp
                        }
                    }
                    _ => false,
                };
                if closes_interp {
                    self.push(PhpSyntaxKind::InterpolationEnd, start);
                    self.modes.pop();
                } else {
                    self.push(PhpSyntaxKind::RBrace, start);
                }
            }
            ';' => {
                self.bump();
                self.push(PhpSyntaxKind::Semicolon, start);
            }
            ',' => {
                self.bump();
                self.push(PhpSyntaxKind::Comma, start);
            }
            ':' => {
                if self.eat("::") {
                    self.push(PhpSyntaxKind::DoubleColon, start);
                } else {
                    self.bump();
                    self.push(PhpSyntaxKind::Colon, start);
                }
            }
            c if c.is_ascii_digit() => self.lex_number(start),
            c if c == '_' || c.is_alphabetic() => {
                while self
                    .peek()
                    .is_some_and(|c| c == '_' || c.is_alphanumeric())
                {
                    self.bump();
                }
                let word = &self.src[start..self.pos];
                let kind = PhpSyntaxKind::from_keyword(word).unwrap_or(PhpSyntaxKind::Ident);
                self.push(kind, start);
            }
            c => {
                self.bump();
                self.error(
                    format!("unexpected character '{c}'"),
                    start..self.pos,
                    "lexer/unexpected-character",
                );
                self.push(PhpSyntaxKind::Error, start);
            }
        }
    }

    /// `//`, `/* */`, `/** */`, `/=` or plain `/`.
    fn lex_slash(&mut self, start: usize) {
        if self.starts_with("//") {
            self.lex_line_comment(start);
        } else if self.starts_with("/*") {
            // `/**/` is an empty block comment, `/**` followed by anything
            // else opens a doc comment.
            let doc = self.starts_with("/**") && !self.starts_with("/**/");
            self.pos += 2;
            let mut terminated = false;
            while self.pos < self.src.len() {
                if self.eat("*/") {
                    terminated = true;
                    break;
                }
                self.bump();
            }
            if !terminated {
                self.error(
                    "unterminated block comment",
                    start..self.src.len(),
                    "lexer/unterminated-comment",
                );
            }
            let kind = if doc {
                PhpSyntaxKind::DocComment
            } else {
                PhpSyntaxKind::CommentBlock
            };
            self.push(kind, start);
        } else if self.eat("/=") {
            self.push(PhpSyntaxKind::SlashEquals, start);
        } else {
            self.bump();
            self.push(PhpSyntaxKind::Slash, start);
        }
    }

    /// A `//` or `#` comment runs to the end of line or to `?>`.
    fn lex_line_comment(&mut self, start: usize) {
        while let Some(c) = self.peek() {
            if c == '\n' || c == '\r' || self.starts_with("?>") {
                break;
            }
            self.bump();
        }
        self.push(PhpSyntaxKind::CommentLine, start);
    }

    fn lex_single_quote(&mut self, start: usize) {
        self.bump(); // opening quote
        loop {
            match self.bump() {
                Some('\'') => break,
                Some('\\') => {
                    self.bump();
                }
                Some(_) => {}
                None => {
                    self.error(
                        "unterminated string literal",
                        start..self.src.len(),
                        "lexer/unterminated-string",
                    );
                    break;
                }
            }
        }
        self.push(PhpSyntaxKind::SingleQuoteString, start);
    }

    /// Shell-exec strings are lexed as one opaque literal; nothing in the
    /// formatter or rules needs their interpolation structure.
    fn lex_backtick(&mut self, start: usize) {
        self.bump();
        loop {
            match self.bump() {
                Some('`') => break,
                Some('\\') => {
                    self.bump();
                }
                Some(_) => {}
                None => {
                    self.error(
                        "unterminated shell-exec string",
                        start..self.src.len(),
                        "lexer/unterminated-string",
                    );
                    break;
                }
            }
        }
        self.push(PhpSyntaxKind::SingleQuoteString, start);
    }

    fn lex_lt(&mut self, start: usize) {
        if self.starts_with("<<<") {
            self.lex_heredoc_start(start);
        } else if self.eat("<<=") {
            self.push(PhpSyntaxKind::ShlEquals, start);
        } else if self.eat("<=>") {
            self.push(PhpSyntaxKind::Spaceship, start);
        } else if self.eat("<<") {
            self.push(PhpSyntaxKind::Shl, start);
        } else if self.eat("<=") {
            self.push(PhpSyntaxKind::Le, start);
        } else if self.eat("<>") {
            self.push(PhpSyntaxKind::NotEq, start);
        } else {
            self.bump();
            self.push(PhpSyntaxKind::Lt, start);
        }
    }

    /// `<<<LABEL`, `<<<"LABEL"` (interpolating) or `<<<'LABEL'` (nowdoc).
    /// The start token runs through the end of the line.
    fn lex_heredoc_start(&mut self, start: usize) {
        self.pos += 3;
        while matches!(self.peek(), Some(' ') | Some('\t')) {
            self.bump();
        }
        let (quote, nowdoc) = match self.peek() {
            Some('\'') => (true, true),
            Some('"') => (true, false),
            _ => (false, false),
        };
        if quote {
            self.bump();
        }
        let label_start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c == '_' || c.is_alphanumeric())
        {
            self.bump();
        }
        let label = self.src[label_start..self.pos].to_string();
        if quote {
            self.bump(); // closing quote
        }
        if label.is_empty() {
            self.error(
                "expected heredoc label after '<<<'",
                start..self.pos,
                "lexer/malformed-heredoc",
            );
            self.push(PhpSyntaxKind::Error, start);
            return;
        }
        // Consume through the end of line; heredoc bodies start on the next line.
        if self.peek() == Some('\r') {
            self.bump();
        }
        if self.peek() == Some('\n') {
            self.bump();
        }
        self.push(PhpSyntaxKind::HeredocStart, start);

        if nowdoc {
            self.lex_nowdoc_body(&label);
        } else {
            self.modes.push(Mode::Heredoc { label });
        }
    }

    /// Find the terminator line for `label` starting at `from`. Returns
    /// (content_end, end_token_start, end_token_end): the end token covers
    /// the closing indentation plus the label, per PHP 7.3 rules.
    fn find_heredoc_end(&self, from: usize, label: &str) -> Option<(usize, usize, usize)> {
        let bytes = self.src.as_bytes();
        let mut line_start = from;
        loop {
            if line_start >= self.src.len() {
                return None;
            }
            let mut i = line_start;
            while i < self.src.len() && (bytes[i] == b' ' || bytes[i] == b'\t') {
                i += 1;
            }
            if self.src[i..].starts_with(label) {
                let after = i + label.len();
                let boundary = self.src[after..]
                    .chars()
                    .next()
                    .is_none_or(|c| !(c == '_' || c.is_alphanumeric()));
                if boundary {
                    return Some((line_start, line_start, after));
                }
            }
            // advance to the next line
            match self.src[line_start..].find('\n') {
                Some(rel) => line_start += rel + 1,
                None => return None,
            }
        }
    }

    fn lex_nowdoc_body(&mut self, label: &str) {
        let start = self.pos;
        match self.find_heredoc_end(start, label) {
            Some((content_end, end_start, end_end)) => {
                if content_end > start {
                    self.pos = content_end;
                    self.push(PhpSyntaxKind::StringText, start);
                }
                self.pos = end_end;
                self.tokens.push(CstToken::new(
                    PhpSyntaxKind::HeredocEnd,
                    &self.src[end_start..end_end],
                    end_start..end_end,
                ));
            }
            None => {
                self.error(
                    format!("unterminated nowdoc; expected closing label '{label}'"),
                    start..self.src.len(),
                    "lexer/unterminated-heredoc",
                );
                self.pos = self.src.len();
                if self.pos > start {
                    self.push(PhpSyntaxKind::StringText, start);
                }
            }
        }
    }

    // === Interpolating string bodies ===

    fn lex_double_quote(&mut self, opened: usize) {
        let start = self.pos;
        loop {
            match self.peek() {
                None => {
                    if self.pos > start {
                        self.push(PhpSyntaxKind::StringText, start);
                    }
                    self.error(
                        "unterminated string literal",
                        opened..self.src.len(),
                        "lexer/unterminated-string",
                    );
                    self.modes.pop();
                    return;
                }
                Some('"') => {
                    if self.pos > start {
                        self.push(PhpSyntaxKind::StringText, start);
                    }
                    let q = self.pos;
                    self.bump();
                    self.push(PhpSyntaxKind::StringEnd, q);
                    self.modes.pop();
                    return;
                }
                Some('\\') => {
                    self.bump();
                    self.bump();
                }
                Some('$') if self.peek_at(1).is_some_and(|c| c == '_' || c.is_alphabetic()) => {
                    if self.pos > start {
                        self.push(PhpSyntaxKind::StringText, start);
                    }
                    self.lex_string_interpolation_simple();
                    return;
                }
                Some('{') if self.peek_at(1) == Some('$') => {
                    if self.pos > start {
                        self.push(PhpSyntaxKind::StringText, start);
                    }
                    self.enter_complex_interpolation();
                    return;
                }
                Some('$') if self.peek_at(1) == Some('{') => {
                    if self.pos > start {
                        self.push(PhpSyntaxKind::StringText, start);
                    }
                    self.enter_complex_interpolation();
                    return;
                }
                Some(_) => {
                    self.bump();
                }
            }
        }
    }

    fn lex_heredoc_body(&mut self, label: &str) {
        // The terminator only exists at the start of a line, so first find
        // it; everything before it is subject to interpolation.
        let region_end = self
            .find_heredoc_end(self.pos, label)
            .map(|(content_end, _, _)| content_end);

        let limit = region_end.unwrap_or(self.src.len());
        let start = self.pos;

        while self.pos < limit {
            match self.peek() {
                Some('\\') => {
                    self.bump();
                    self.bump();
                }
                Some('$') if self.peek_at(1).is_some_and(|c| c == '_' || c.is_alphabetic()) => {
                    if self.pos > start {
                        self.push(PhpSyntaxKind::StringText, start);
                    }
                    self.lex_string_interpolation_simple();
                    return;
                }
                Some('{') if self.peek_at(1) == Some('$') => {
                    if self.pos > start {
                        self.push(PhpSyntaxKind::StringText, start);
                    }
                    self.enter_complex_interpolation();
                    return;
                }
                Some('$') if self.peek_at(1) == Some('{') => {
                    if self.pos > start {
                        self.push(PhpSyntaxKind::StringText, start);
                    }
                    self.enter_complex_interpolation();
                    return;
                }
                Some(_) => {
                    self.bump();
                }
                None => break,
            }
        }

        if self.pos > start {
            self.push(PhpSyntaxKind::StringText, start);
        }

        match self.find_heredoc_end(self.pos, label) {
            Some((_, end_start, end_end)) => {
                self.pos = end_end;
                self.tokens.push(CstToken::new(
                    PhpSyntaxKind::HeredocEnd,
                    &self.src[end_start..end_end],
                    end_start..end_end,
                ));
                self.modes.pop();
            }
            None => {
                self.error(
                    format!("unterminated heredoc; expected closing label '{label}'"),
                    self.pos..self.src.len(),
                    "lexer/unterminated-heredoc",
                );
                self.pos = self.src.len();
                self.modes.pop();
            }
        }
    }

    /// Simple `$var` interpolation, optionally followed by one `->prop` or
    /// `[dim]` per PHP's simple syntax. The tokens are emitted in place and
    /// control returns to the surrounding string mode.
    fn lex_string_interpolation_simple(&mut self) {
        let start = self.pos;
        self.bump(); // $
        while self
            .peek()
            .is_some_and(|c| c == '_' || c.is_alphanumeric())
        {
            self.bump();
        }
        self.push(PhpSyntaxKind::Variable, start);

        if self.starts_with("->") && self.peek_at(2).is_some_and(|c| c == '_' || c.is_alphabetic())
        {
            let arrow = self.pos;
            self.pos += 2;
            self.push(PhpSyntaxKind::Arrow, arrow);
            let prop = self.pos;
            while self
                .peek()
                .is_some_and(|c| c == '_' || c.is_alphanumeric())
            {
                self.bump();
            }
            self.push(PhpSyntaxKind::Ident, prop);
        } else if self.peek() == Some('[') {
            let lb = self.pos;
            self.bump();
            self.push(PhpSyntaxKind::LBracket, lb);
            // simple syntax allows a name, a variable, or a (negative) integer
            let dim = self.pos;
            match self.peek() {
                Some('$') => {
                    self.bump();
                    while self
                        .peek()
                        .is_some_and(|c| c == '_' || c.is_alphanumeric())
                    {
                        self.bump();
                    }
                    self.push(PhpSyntaxKind::Variable, dim);
                }
                Some('-') => {
                    self.bump();
                    while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                        self.bump();
                    }
                    self.push(PhpSyntaxKind::Integer, dim);
                }
                Some(c) if c.is_ascii_digit() => {
                    while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                        self.bump();
                    }
                    self.push(PhpSyntaxKind::Integer, dim);
                }
                _ => {
                    while self
                        .peek()
                        .is_some_and(|c| c == '_' || c.is_alphanumeric())
                    {
                        self.bump();
                    }
                    if self.pos > dim {
                        self.push(PhpSyntaxKind::Ident, dim);
                    }
                }
            }
            if self.peek() == Some(']') {
                let rb = self.pos;
                self.bump();
                self.push(PhpSyntaxKind::RBracket, rb);
            }
        }
    }

    /// `{$...}` or `${...}`: emit the opener and push a script frame; the
    /// matching `}` is emitted as `InterpolationEnd` by the script lexer.
    fn enter_complex_interpolation(&mut self) {
        let start = self.pos;
        self.pos += 2;
        // `{$` - the `$` belongs to the inner expression, back up over it
        if &self.src[start..start + 2] == "{$" {
            self.pos = start + 1;
        }
        self.push(PhpSyntaxKind::InterpolationStart, start);
        self.modes.push(Mode::Script {
            interp: true,
            brace_depth: 0,
        });
    }

    // === Numbers ===

    fn lex_number(&mut self, start: usize) {
        if self.starts_with("0x") || self.starts_with("0X") {
            self.pos += 2;
            while self
                .peek()
                .is_some_and(|c| c.is_ascii_hexdigit() || c == '_')
            {
                self.bump();
            }
            self.push(PhpSyntaxKind::Integer, start);
            return;
        }
        if self.starts_with("0b") || self.starts_with("0B") {
            self.pos += 2;
            while self.peek().is_some_and(|c| c == '0' || c == '1' || c == '_') {
                self.bump();
            }
            self.push(PhpSyntaxKind::Integer, start);
            return;
        }
        if self.starts_with("0o") || self.starts_with("0O") {
            self.pos += 2;
            while self
                .peek()
                .is_some_and(|c| ('0'..='7').contains(&c) || c == '_')
            {
                self.bump();
            }
            self.push(PhpSyntaxKind::Integer, start);
            return;
        }

        let mut is_float = false;
        while self.peek().is_some_and(|c| c.is_ascii_digit() || c == '_') {
            self.bump();
        }
        // `.5` arrives here with the dot still unconsumed
        if self.peek() == Some('.') && self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
            is_float = true;
            self.bump();
            while self.peek().is_some_and(|c| c.is_ascii_digit() || c == '_') {
                self.bump();
            }
        }
        if matches!(self.peek(), Some('e') | Some('E')) {
            let mut lookahead = 1;
            if matches!(self.peek_at(1), Some('+') | Some('-')) {
                lookahead = 2;
            }
            if self.peek_at(lookahead).is_some_and(|c| c.is_ascii_digit()) {
                is_float = true;
                self.bump();
                if matches!(self.peek(), Some('+') | Some('-')) {
                    self.bump();
                }
                while self.peek().is_some_and(|c| c.is_ascii_digit() || c == '_') {
                    self.bump();
                }
            }
        }
        let kind = if is_float {
            PhpSyntaxKind::Float
        } else {
            PhpSyntaxKind::Integer
        };
        self.push(kind, start);
    }

    /// Try to match a cast like `(int)` at the current `(`. Returns the end
    /// offset on success. PHP lexes casts as single tokens, which sidesteps
    /// the parenthesized-expression ambiguity entirely.
    fn scan_cast(&mut self) -> Option<usize> {
        const CAST_NAMES: [&str; 10] = [
            "int", "integer", "bool", "boolean", "float", "double", "real", "string", "array",
            "object",
        ];
        let rest = &self.src[self.pos..];
        let mut i = 1; // past '('
        let bytes = rest.as_bytes();
        while i < bytes.len() && (bytes[i] == b' ' || bytes[i] == b'\t') {
            i += 1;
        }
        let word_start = i;
        while i < bytes.len() && bytes[i].is_ascii_alphabetic() {
            i += 1;
        }
        let word = &rest[word_start..i];
        if !CAST_NAMES.iter().any(|c| word.eq_ignore_ascii_case(c)) {
            return None;
        }
        while i < bytes.len() && (bytes[i] == b' ' || bytes[i] == b'\t') {
            i += 1;
        }
        if i < bytes.len() && bytes[i] == b')' {
            Some(self.pos + i + 1)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(src: &str) -> LexResult {
        lex_with_trivia(src, PhpVersion::default())
    }

    fn kinds(tokens: &[CstToken]) -> Vec<PhpSyntaxKind> {
        tokens.iter().map(|t| t.kind).collect()
    }

    #[test]
    fn lossless_reconstruction() {
        let input = "<?php\n// note\n$a = 1 + 2;  /* mid */ echo $a;\n?>\n<b>done</b>";
        let (tokens, errors) = lex(input);
        assert!(errors.is_empty());
        let reconstructed: String = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(reconstructed, input);
    }

    #[test]
    fn inline_html_outside_tags() {
        let (tokens, _) = lex("<html>\n<?php echo 1; ?>\n</html>");
        assert_eq!(tokens[0].kind, PhpSyntaxKind::InlineHtml);
        assert_eq!(tokens[0].text, "<html>\n");
        assert_eq!(tokens[1].kind, PhpSyntaxKind::OpenTag);
        assert!(tokens.iter().any(|t| t.kind == PhpSyntaxKind::CloseTag));
        let last_html = tokens
            .iter()
            .rev()
            .find(|t| t.kind == PhpSyntaxKind::InlineHtml)
            .unwrap();
        assert_eq!(last_html.text, "\n</html>");
    }

    #[test]
    fn misspelled_open_tag_is_a_help_diagnostic() {
        let (tokens, errors) = lex("<php?\n echo 1;");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].span, 0..5);
        assert_eq!(errors[0].severity, Severity::Help);
        assert_eq!(errors[0].code, "lexer/invalid-open-tag");
        // the whole input stays inline HTML
        assert_eq!(tokens[0].kind, PhpSyntaxKind::InlineHtml);
        assert_eq!(tokens[0].text, "<php?\n echo 1;");
    }

    #[test]
    fn doc_comment_is_distinct_from_block_comment() {
        let (tokens, _) = lex("<?php /** @param int $a */ /* plain */ /**/");
        let kinds = kinds(&tokens);
        assert!(kinds.contains(&PhpSyntaxKind::DocComment));
        assert_eq!(
            kinds
                .iter()
                .filter(|k| **k == PhpSyntaxKind::CommentBlock)
                .count(),
            2 // `/* plain */` and the degenerate `/**/`
        );
    }

    #[test]
    fn hash_comment_vs_attribute() {
        let (tokens, _) = lex("<?php # comment\n#[Attr] $x;");
        assert!(tokens.iter().any(|t| t.kind == PhpSyntaxKind::CommentLine
            && t.text == "# comment"));
        assert!(tokens.iter().any(|t| t.kind == PhpSyntaxKind::AttributeStart));
    }

    #[test]
    fn numeric_literals() {
        let (tokens, errors) = lex("<?php 123 1_000_000 0x1F 0b1010 0o777 0755 1.5e-3 .5;");
        assert!(errors.is_empty());
        let nums: Vec<_> = tokens
            .iter()
            .filter(|t| matches!(t.kind, PhpSyntaxKind::Integer | PhpSyntaxKind::Float))
            .map(|t| (t.kind, t.text.as_str()))
            .collect();
        assert_eq!(
            nums,
            vec![
                (PhpSyntaxKind::Integer, "123"),
                (PhpSyntaxKind::Integer, "1_000_000"),
                (PhpSyntaxKind::Integer, "0x1F"),
                (PhpSyntaxKind::Integer, "0b1010"),
                (PhpSyntaxKind::Integer, "0o777"),
                (PhpSyntaxKind::Integer, "0755"),
                (PhpSyntaxKind::Float, "1.5e-3"),
                (PhpSyntaxKind::Float, ".5"),
            ]
        );
    }

    #[test]
    fn double_quote_interpolation_parts() {
        let (tokens, errors) = lex(r#"<?php "pre $name mid {$obj->m()} post";"#);
        assert!(errors.is_empty());
        let ks = kinds(&tokens);
        assert!(ks.contains(&PhpSyntaxKind::StringStart));
        assert!(ks.contains(&PhpSyntaxKind::Variable));
        assert!(ks.contains(&PhpSyntaxKind::InterpolationStart));
        assert!(ks.contains(&PhpSyntaxKind::InterpolationEnd));
        assert!(ks.contains(&PhpSyntaxKind::StringEnd));
        let reconstructed: String = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(reconstructed, r#"<?php "pre $name mid {$obj->m()} post";"#);
    }

    #[test]
    fn simple_interpolation_with_property() {
        let (tokens, errors) = lex(r#"<?php "hello $user->name!";"#);
        assert!(errors.is_empty());
        let ks = kinds(&tokens);
        let var_idx = ks.iter().position(|k| *k == PhpSyntaxKind::Variable).unwrap();
        assert_eq!(ks[var_idx + 1], PhpSyntaxKind::Arrow);
        assert_eq!(ks[var_idx + 2], PhpSyntaxKind::Ident);
    }

    #[test]
    fn heredoc_with_interpolation() {
        let src = "<?php $s = <<<EOT\nline $a\n  more\n  EOT;\n";
        let (tokens, errors) = lex(src);
        assert!(errors.is_empty(), "{errors:?}");
        let ks = kinds(&tokens);
        assert!(ks.contains(&PhpSyntaxKind::HeredocStart));
        assert!(ks.contains(&PhpSyntaxKind::Variable));
        let end = tokens
            .iter()
            .find(|t| t.kind == PhpSyntaxKind::HeredocEnd)
            .unwrap();
        assert_eq!(end.text, "  EOT");
        let reconstructed: String = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(reconstructed, src);
    }

    #[test]
    fn nowdoc_is_a_single_text_run() {
        let src = "<?php $s = <<<'EOT'\nno $interp here\nEOT;\n";
        let (tokens, errors) = lex(src);
        assert!(errors.is_empty());
        let texts: Vec<_> = tokens
            .iter()
            .filter(|t| t.kind == PhpSyntaxKind::StringText)
            .collect();
        assert_eq!(texts.len(), 1);
        assert_eq!(texts[0].text, "no $interp here\n");
        assert!(!tokens.iter().any(|t| t.kind == PhpSyntaxKind::Variable));
    }

    #[test]
    fn unterminated_heredoc_recovers_at_eof() {
        let src = "<?php $s = <<<EOT\nnever closed";
        let (tokens, errors) = lex(src);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, "lexer/unterminated-heredoc");
        assert_eq!(tokens.last().unwrap().kind, PhpSyntaxKind::Eof);
        let reconstructed: String = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(reconstructed, src);
    }

    #[test]
    fn unterminated_string_error_starts_at_the_quote() {
        let src = "<?php $s = \"never closed";
        let (tokens, errors) = lex(src);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, "lexer/unterminated-string");
        assert_eq!(errors[0].span.start, 11); // the opening delimiter
        let reconstructed: String = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(reconstructed, src);
    }

    #[test]
    fn multichar_operators() {
        let (tokens, _) = lex("<?php $a <=> $b ?? $c ??= $d ** $e ?-> f;");
        let ks = kinds(&tokens);
        assert!(ks.contains(&PhpSyntaxKind::Spaceship));
        assert!(ks.contains(&PhpSyntaxKind::QuestionQuestion));
        assert!(ks.contains(&PhpSyntaxKind::QuestionQuestionEquals));
        assert!(ks.contains(&PhpSyntaxKind::Pow));
        assert!(ks.contains(&PhpSyntaxKind::NullsafeArrow));
    }

    #[test]
    fn pipe_operator_is_version_gated() {
        let (tokens, _) = lex_with_trivia("<?php $a |> strlen(...);", PhpVersion::Php85);
        assert!(kinds(&tokens).contains(&PhpSyntaxKind::Pipeline));

        let (tokens, _) = lex_with_trivia("<?php $a |> $b;", PhpVersion::Php84);
        let ks = kinds(&tokens);
        assert!(!ks.contains(&PhpSyntaxKind::Pipeline));
        assert!(ks.contains(&PhpSyntaxKind::PipeOp));
        assert!(ks.contains(&PhpSyntaxKind::Gt));
    }

    #[test]
    fn cast_tokens() {
        let (tokens, _) = lex("<?php (int) $a; (string)$b; ( bool ) $c; (foo) $d;");
        let casts: Vec<_> = tokens
            .iter()
            .filter(|t| t.kind == PhpSyntaxKind::Cast)
            .map(|t| t.text.as_str())
            .collect();
        assert_eq!(casts, vec!["(int)", "(string)", "( bool )"]);
    }

    #[test]
    fn keywords_case_insensitive() {
        let (tokens, _) = lex("<?php ECHO 1; Match (1) {};");
        let ks = kinds(&tokens);
        assert!(ks.contains(&PhpSyntaxKind::EchoKw));
        assert!(ks.contains(&PhpSyntaxKind::MatchKw));
    }

    #[test]
    fn determinism() {
        let src = "<?php $x = [1, 2, 3]; // trail\n";
        let a = lex(src);
        let b = lex(src);
        assert_eq!(a, b);
    }
}
