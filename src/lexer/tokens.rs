use lazy_static::lazy_static;
use std::{collections::HashMap, fmt::Display};

use crate::Span;

lazy_static! {
    pub static ref RESERVED_LOOKUP: HashMap<&'static str, TokenKind> = {
        let mut map = HashMap::new();
        map.insert("and", TokenKind::And);
        map.insert("as", TokenKind::As);
        map.insert("assert", TokenKind::Assert);
        map.insert("async", TokenKind::Async);
        map.insert("await", TokenKind::Await);
        map.insert("break", TokenKind::Break);
        map.insert("class", TokenKind::Class);
        map.insert("continue", TokenKind::Continue);
        map.insert("def", TokenKind::Def);
        map.insert("del", TokenKind::Del);
        map.insert("elif", TokenKind::Elif);
        map.insert("else", TokenKind::Else);
        map.insert("except", TokenKind::Except);
        map.insert("False", TokenKind::False);
        map.insert("finally", TokenKind::Finally);
        map.insert("for", TokenKind::For);
        map.insert("from", TokenKind::From);
        map.insert("global", TokenKind::Global);
        map.insert("if", TokenKind::If);
        map.insert("import", TokenKind::Import);
        map.insert("in", TokenKind::In);
        map.insert("is", TokenKind::Is);
        map.insert("lambda", TokenKind::Lambda);
        map.insert("None", TokenKind::None);
        map.insert("nonlocal", TokenKind::Nonlocal);
        map.insert("not", TokenKind::Not);
        map.insert("or", TokenKind::Or);
        map.insert("pass", TokenKind::Pass);
        map.insert("raise", TokenKind::Raise);
        map.insert("return", TokenKind::Return);
        map.insert("True", TokenKind::True);
        map.insert("try", TokenKind::Try);
        map.insert("while", TokenKind::While);
        map.insert("with", TokenKind::With);
        map.insert("yield", TokenKind::Yield);
        map.insert("view", TokenKind::View);
        map
    };
}

/// Identifiers that act as keywords only in statement position.
pub const SOFT_KEYWORDS: [&str; 3] = ["match", "case", "type"];

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum TokenKind {
    EOF,
    /// Placeholder used to report characters the lexer cannot tokenize.
    Invalid,
    Newline,
    Indent,
    Dedent,

    Number,
    String,
    /// An f-string; the token's literal holds the raw, undecoded body.
    FString,
    Identifier,

    OpenBracket,
    CloseBracket,
    OpenCurly,
    CloseCurly,
    OpenParen,
    CloseParen,

    Assignment, // =
    Walrus,     // :=
    Equals,     // ==
    NotEquals,  // !=

    Less,
    LessEquals,
    Greater,
    GreaterEquals,

    Dot,
    Ellipsis,
    Semicolon,
    Colon,
    Comma,
    Arrow,
    At,

    PlusEquals,
    MinusEquals,
    StarEquals,
    SlashEquals,
    DoubleSlashEquals,
    PercentEquals,
    DoubleStarEquals,
    AtEquals,
    AmpersandEquals,
    PipeEquals,
    CaretEquals,
    LeftShiftEquals,
    RightShiftEquals,

    Plus,
    Dash,
    Star,
    DoubleStar,
    Slash,
    DoubleSlash,
    Percent,
    Tilde,
    Pipe,
    Ampersand,
    Caret,
    LeftShift,
    RightShift,

    // Reserved
    And,
    As,
    Assert,
    Async,
    Await,
    Break,
    Class,
    Continue,
    Def,
    Del,
    Elif,
    Else,
    Except,
    False,
    Finally,
    For,
    From,
    Global,
    If,
    Import,
    In,
    Is,
    Lambda,
    None,
    Nonlocal,
    Not,
    Or,
    Pass,
    Raise,
    Return,
    True,
    Try,
    While,
    With,
    Yield,
    View,

    // Composite
    IsNot,
    NotIn,

    // Markup
    TagOpen,       // <
    TagClose,      // >
    TagSelfClose,  // />
    TagCloseStart, // </
    HtmlText,
    HtmlInterpolationStart,
    HtmlInterpolationEnd,
}

impl TokenKind {
    /// Augmented assignment operators (`+=`, `//=`, ...).
    pub fn is_augmented_assignment(&self) -> bool {
        matches!(
            self,
            TokenKind::PlusEquals
                | TokenKind::MinusEquals
                | TokenKind::StarEquals
                | TokenKind::SlashEquals
                | TokenKind::DoubleSlashEquals
                | TokenKind::PercentEquals
                | TokenKind::DoubleStarEquals
                | TokenKind::AtEquals
                | TokenKind::AmpersandEquals
                | TokenKind::PipeEquals
                | TokenKind::CaretEquals
                | TokenKind::LeftShiftEquals
                | TokenKind::RightShiftEquals
        )
    }

    pub fn is_layout(&self) -> bool {
        matches!(
            self,
            TokenKind::Newline | TokenKind::Indent | TokenKind::Dedent | TokenKind::EOF
        )
    }
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Decoded value of a literal token.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(u64),
    Float(f64),
    Imaginary(f64),
    Str(String),
    Bytes(Vec<u8>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    pub literal: Option<Literal>,
    pub span: Span,
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Token {{\nkind: {},\nvalue: {}}}", self.kind, self.value)
    }
}

impl Token {
    fn is_one_of_many(&self, tokens: &[TokenKind]) -> bool {
        tokens.contains(&self.kind)
    }

    /// True for an identifier spelled like the given soft keyword.
    pub fn is_soft_keyword(&self, keyword: &str) -> bool {
        self.kind == TokenKind::Identifier && self.value == keyword
    }

    pub fn debug(&self) -> String {
        if self.is_one_of_many(&[
            TokenKind::String,
            TokenKind::FString,
            TokenKind::Identifier,
            TokenKind::Number,
            TokenKind::HtmlText,
        ]) {
            format!("{} ({})", self.kind, self.value)
        } else {
            format!("{} ()", self.kind)
        }
    }
}
