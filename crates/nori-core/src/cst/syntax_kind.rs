//! Syntax kinds for the PHP concrete syntax tree
//!
//! One flat enum covers trivia, tokens, and composite node kinds, which is
//! what Rowan expects. The lexer only ever produces token kinds; the parser
//! introduces the node kinds when building the tree.

/// All syntax kinds, tokens and nodes alike.
///
/// The enum is contiguous (no explicit discriminants) so converting from a
/// raw `u16` only needs a bounds check against [`PhpSyntaxKind::Tombstone`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
pub enum PhpSyntaxKind {
    // === Trivia ===
    Whitespace,
    Newline,
    /// `// ...` or `# ...` (but not `#[`)
    CommentLine,
    /// `/* ... */`
    CommentBlock,
    /// `/** ... */` - kept distinct so doc-driven consumers can find it
    DocComment,

    // === Tags and raw text ===
    /// Text outside `<?php ... ?>`
    InlineHtml,
    /// `<?php`
    OpenTag,
    /// `<?=`
    OpenTagEcho,
    /// `?>`
    CloseTag,

    // === Keywords ===
    AbstractKw,
    AsKw,
    BreakKw,
    CaseKw,
    CatchKw,
    ClassKw,
    CloneKw,
    ConstKw,
    ContinueKw,
    DeclareKw,
    DefaultKw,
    DoKw,
    EchoKw,
    ElseKw,
    ElseifKw,
    EndforKw,
    EndforeachKw,
    EndifKw,
    EndswitchKw,
    EndwhileKw,
    EnumKw,
    ExtendsKw,
    FinalKw,
    FinallyKw,
    FnKw,
    ForKw,
    ForeachKw,
    FunctionKw,
    GlobalKw,
    IfKw,
    ImplementsKw,
    InstanceofKw,
    InterfaceKw,
    IssetKw,
    MatchKw,
    NamespaceKw,
    NewKw,
    PrivateKw,
    ProtectedKw,
    PublicKw,
    ReadonlyKw,
    ReturnKw,
    StaticKw,
    SwitchKw,
    ThrowKw,
    TraitKw,
    TryKw,
    UnsetKw,
    UseKw,
    VarKw,
    WhileKw,
    YieldKw,
    /// textual `and` (lower precedence than `&&`)
    AndKw,
    /// textual `or`
    OrKw,
    /// textual `xor`
    XorKw,
    TrueKw,
    FalseKw,
    NullKw,

    // === Punctuation and operators ===
    Semicolon,
    Comma,
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    /// `->`
    Arrow,
    /// `?->`
    NullsafeArrow,
    /// `=>`
    DoubleArrow,
    /// `::`
    DoubleColon,
    Colon,
    Question,
    /// `??`
    QuestionQuestion,
    /// `??=`
    QuestionQuestionEquals,
    Equals,
    PlusEquals,
    MinusEquals,
    StarEquals,
    SlashEquals,
    PercentEquals,
    DotEquals,
    /// `**=`
    PowEquals,
    AmpEquals,
    PipeEquals,
    CaretEquals,
    /// `<<=`
    ShlEquals,
    /// `>>=`
    ShrEquals,
    /// `==`
    EqEq,
    /// `===`
    EqEqEq,
    /// `!=` or `<>`
    NotEq,
    /// `!==`
    NotEqEq,
    Lt,
    Gt,
    /// `<=`
    Le,
    /// `>=`
    Ge,
    /// `<=>`
    Spaceship,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    /// `**`
    Pow,
    Dot,
    Bang,
    /// `&&`
    AmpAmp,
    /// `||`
    PipePipe,
    Amp,
    PipeOp,
    CaretOp,
    Tilde,
    /// `<<`
    Shl,
    /// `>>`
    Shr,
    /// `++`
    Inc,
    /// `--`
    Dec,
    At,
    Dollar,
    Backslash,
    /// `...`
    Ellipsis,
    /// `#[` - opens an attribute group
    AttributeStart,
    /// `|>` (PHP 8.5 pipe operator)
    Pipeline,
    /// `(int)`, `(string)`, etc. lexed as a single token like PHP itself does
    Cast,

    // === Literals and names ===
    Ident,
    /// `$name`
    Variable,
    Integer,
    Float,
    /// `'...'` - never interpolates
    SingleQuoteString,
    /// opening `"` of an interpolating string
    StringStart,
    /// literal run inside an interpolating string
    StringText,
    /// closing `"`
    StringEnd,
    /// `<<<LABEL` or `<<<'LABEL'` with the trailing newline
    HeredocStart,
    /// closing label line, including any closing indentation
    HeredocEnd,
    /// `{$` or `${` inside an interpolating string
    InterpolationStart,
    /// the matching `}`
    InterpolationEnd,

    // === Special tokens ===
    Error,
    Eof,

    // === Nodes: root and statements ===
    Program,
    InlineHtmlStmt,
    ExpressionStmt,
    EchoStmt,
    IfStmt,
    ElseifClause,
    ElseClause,
    WhileStmt,
    DoWhileStmt,
    ForStmt,
    ForeachStmt,
    SwitchStmt,
    SwitchCase,
    BreakStmt,
    ContinueStmt,
    ReturnStmt,
    ThrowStmt,
    TryStmt,
    CatchClause,
    FinallyClause,
    Block,
    GlobalStmt,
    StaticVarStmt,
    UnsetStmt,
    DeclareStmt,
    NamespaceDecl,
    UseDecl,
    ErrorNode,

    // === Nodes: declarations ===
    FunctionDecl,
    ParamList,
    Param,
    ClassDecl,
    InterfaceDecl,
    TraitDecl,
    TraitUse,
    EnumDecl,
    EnumCase,
    ClassBody,
    MethodDecl,
    PropertyDecl,
    ConstDecl,
    AttributeList,
    Attribute,

    // === Nodes: types ===
    SimpleType,
    NullableType,
    UnionType,
    IntersectionType,

    // === Nodes: expressions ===
    Literal,
    VariableExpr,
    NameExpr,
    ParenExpr,
    UnaryExpr,
    PostfixExpr,
    BinaryExpr,
    AssignExpr,
    TernaryExpr,
    CallExpr,
    ArgList,
    Arg,
    NewExpr,
    MemberAccessExpr,
    ScopedAccessExpr,
    IndexExpr,
    ArrayExpr,
    ArrayItem,
    Closure,
    ClosureUse,
    ArrowFn,
    MatchExpr,
    MatchArm,
    IssetExpr,
    CastExpr,
    InterpolatedString,
    YieldExpr,

    /// Placeholder; must stay last for the raw-kind bounds check.
    Tombstone,
}

impl PhpSyntaxKind {
    /// Trivia never affects grammar decisions; the parser attaches it to
    /// whatever node is currently open.
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            PhpSyntaxKind::Whitespace
                | PhpSyntaxKind::Newline
                | PhpSyntaxKind::CommentLine
                | PhpSyntaxKind::CommentBlock
                | PhpSyntaxKind::DocComment
        )
    }

    pub fn is_comment(self) -> bool {
        matches!(
            self,
            PhpSyntaxKind::CommentLine | PhpSyntaxKind::CommentBlock | PhpSyntaxKind::DocComment
        )
    }

    /// Keywords that can begin a statement. Used as synchronization points
    /// during error recovery.
    pub fn starts_statement(self) -> bool {
        matches!(
            self,
            PhpSyntaxKind::IfKw
                | PhpSyntaxKind::WhileKw
                | PhpSyntaxKind::DoKw
                | PhpSyntaxKind::ForKw
                | PhpSyntaxKind::ForeachKw
                | PhpSyntaxKind::SwitchKw
                | PhpSyntaxKind::BreakKw
                | PhpSyntaxKind::ContinueKw
                | PhpSyntaxKind::ReturnKw
                | PhpSyntaxKind::ThrowKw
                | PhpSyntaxKind::TryKw
                | PhpSyntaxKind::EchoKw
                | PhpSyntaxKind::GlobalKw
                | PhpSyntaxKind::UnsetKw
                | PhpSyntaxKind::FunctionKw
                | PhpSyntaxKind::ClassKw
                | PhpSyntaxKind::InterfaceKw
                | PhpSyntaxKind::TraitKw
                | PhpSyntaxKind::EnumKw
                | PhpSyntaxKind::NamespaceKw
                | PhpSyntaxKind::UseKw
                | PhpSyntaxKind::ConstKw
        )
    }

    pub fn is_visibility_modifier(self) -> bool {
        matches!(
            self,
            PhpSyntaxKind::PublicKw | PhpSyntaxKind::ProtectedKw | PhpSyntaxKind::PrivateKw
        )
    }

    /// All compound assignment operators plus plain `=`.
    pub fn is_assignment_op(self) -> bool {
        matches!(
            self,
            PhpSyntaxKind::Equals
                | PhpSyntaxKind::PlusEquals
                | PhpSyntaxKind::MinusEquals
                | PhpSyntaxKind::StarEquals
                | PhpSyntaxKind::SlashEquals
                | PhpSyntaxKind::PercentEquals
                | PhpSyntaxKind::DotEquals
                | PhpSyntaxKind::PowEquals
                | PhpSyntaxKind::AmpEquals
                | PhpSyntaxKind::PipeEquals
                | PhpSyntaxKind::CaretEquals
                | PhpSyntaxKind::ShlEquals
                | PhpSyntaxKind::ShrEquals
                | PhpSyntaxKind::QuestionQuestionEquals
        )
    }

    /// Keyword lookup. PHP keywords are case-insensitive, so `ECHO` and
    /// `echo` both map to [`PhpSyntaxKind::EchoKw`].
    pub fn from_keyword(word: &str) -> Option<PhpSyntaxKind> {
        let lower = word.to_ascii_lowercase();
        let kind = match lower.as_str() {
            "abstract" => PhpSyntaxKind::AbstractKw,
            "and" => PhpSyntaxKind::AndKw,
            "as" => PhpSyntaxKind::AsKw,
            "break" => PhpSyntaxKind::BreakKw,
            "case" => PhpSyntaxKind::CaseKw,
            "catch" => PhpSyntaxKind::CatchKw,
            "class" => PhpSyntaxKind::ClassKw,
            "clone" => PhpSyntaxKind::CloneKw,
            "const" => PhpSyntaxKind::ConstKw,
            "continue" => PhpSyntaxKind::ContinueKw,
            "declare" => PhpSyntaxKind::DeclareKw,
            "default" => PhpSyntaxKind::DefaultKw,
            "do" => PhpSyntaxKind::DoKw,
            "echo" => PhpSyntaxKind::EchoKw,
            "else" => PhpSyntaxKind::ElseKw,
            "elseif" => PhpSyntaxKind::ElseifKw,
            "endfor" => PhpSyntaxKind::EndforKw,
            "endforeach" => PhpSyntaxKind::EndforeachKw,
            "endif" => PhpSyntaxKind::EndifKw,
            "endswitch" => PhpSyntaxKind::EndswitchKw,
            "endwhile" => PhpSyntaxKind::EndwhileKw,
            "enum" => PhpSyntaxKind::EnumKw,
            "extends" => PhpSyntaxKind::ExtendsKw,
            "false" => PhpSyntaxKind::FalseKw,
            "final" => PhpSyntaxKind::FinalKw,
            "finally" => PhpSyntaxKind::FinallyKw,
            "fn" => PhpSyntaxKind::FnKw,
            "for" => PhpSyntaxKind::ForKw,
            "foreach" => PhpSyntaxKind::ForeachKw,
            "function" => PhpSyntaxKind::FunctionKw,
            "global" => PhpSyntaxKind::GlobalKw,
            "if" => PhpSyntaxKind::IfKw,
            "implements" => PhpSyntaxKind::ImplementsKw,
            "instanceof" => PhpSyntaxKind::InstanceofKw,
            "interface" => PhpSyntaxKind::InterfaceKw,
            "isset" => PhpSyntaxKind::IssetKw,
            "match" => PhpSyntaxKind::MatchKw,
            "namespace" => PhpSyntaxKind::NamespaceKw,
            "new" => PhpSyntaxKind::NewKw,
            "null" => PhpSyntaxKind::NullKw,
            "or" => PhpSyntaxKind::OrKw,
            "private" => PhpSyntaxKind::PrivateKw,
            "protected" => PhpSyntaxKind::ProtectedKw,
            "public" => PhpSyntaxKind::PublicKw,
            "readonly" => PhpSyntaxKind::ReadonlyKw,
            "return" => PhpSyntaxKind::ReturnKw,
            "static" => PhpSyntaxKind::StaticKw,
            "switch" => PhpSyntaxKind::SwitchKw,
            "throw" => PhpSyntaxKind::ThrowKw,
            "trait" => PhpSyntaxKind::TraitKw,
            "true" => PhpSyntaxKind::TrueKw,
            "try" => PhpSyntaxKind::TryKw,
            "unset" => PhpSyntaxKind::UnsetKw,
            "use" => PhpSyntaxKind::UseKw,
            "var" => PhpSyntaxKind::VarKw,
            "while" => PhpSyntaxKind::WhileKw,
            "xor" => PhpSyntaxKind::XorKw,
            "yield" => PhpSyntaxKind::YieldKw,
            _ => return None,
        };
        Some(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_are_case_insensitive() {
        assert_eq!(
            PhpSyntaxKind::from_keyword("ECHO"),
            Some(PhpSyntaxKind::EchoKw)
        );
        assert_eq!(
            PhpSyntaxKind::from_keyword("Match"),
            Some(PhpSyntaxKind::MatchKw)
        );
        assert_eq!(PhpSyntaxKind::from_keyword("frobnicate"), None);
    }

    #[test]
    fn trivia_classification() {
        assert!(PhpSyntaxKind::Whitespace.is_trivia());
        assert!(PhpSyntaxKind::DocComment.is_trivia());
        assert!(!PhpSyntaxKind::InlineHtml.is_trivia());
        assert!(!PhpSyntaxKind::Ident.is_trivia());
    }

    #[test]
    fn assignment_ops() {
        assert!(PhpSyntaxKind::QuestionQuestionEquals.is_assignment_op());
        assert!(!PhpSyntaxKind::EqEq.is_assignment_op());
    }
}
