use std::fmt::Display;

use thiserror::Error;

use crate::{
    lexer::tokens::{Token, TokenKind},
    Position, Span,
};

/// A syntax error attached to the token where it was detected.
#[derive(Debug, Clone, PartialEq)]
pub struct Error {
    internal_error: ErrorImpl,
    token: Token,
}

impl Error {
    pub fn new(error_impl: ErrorImpl, token: Token) -> Self {
        Error {
            internal_error: error_impl,
            token,
        }
    }

    pub fn get_token(&self) -> &Token {
        &self.token
    }

    pub fn get_span(&self) -> Span {
        self.token.span
    }

    pub fn get_position(&self) -> Position {
        self.token.span.start
    }

    pub fn get_impl(&self) -> &ErrorImpl {
        &self.internal_error
    }

    /// The bare message, without the token prefix.
    pub fn message(&self) -> String {
        self.internal_error.to_string()
    }

    pub fn get_error_name(&self) -> &str {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } => "UnrecognisedToken",
            ErrorImpl::UnterminatedString => "UnterminatedString",
            ErrorImpl::UnterminatedComment => "UnterminatedComment",
            ErrorImpl::InconsistentIndentation => "InconsistentIndentation",
            ErrorImpl::NumberParseError { .. } => "NumberParseError",
            ErrorImpl::InvalidEscape { .. } => "InvalidEscape",
            ErrorImpl::UnexpectedToken { .. } => "UnexpectedToken",
            ErrorImpl::Expected { .. } => "Expected",
            ErrorImpl::InvalidTarget { .. } => "InvalidTarget",
            ErrorImpl::MultipleStarredTargets => "MultipleStarredTargets",
            ErrorImpl::ElseWithoutExcept => "ElseWithoutExcept",
            ErrorImpl::ClauseAfterFinally { .. } => "ClauseAfterFinally",
            ErrorImpl::MismatchedClosingTag { .. } => "MismatchedClosingTag",
            ErrorImpl::FunctionInHtmlContent => "FunctionInHtmlContent",
            ErrorImpl::HtmlOutsideView => "HtmlOutsideView",
            ErrorImpl::InvalidDecoratorTarget => "InvalidDecoratorTarget",
            ErrorImpl::StarredInGroup => "StarredInGroup",
            ErrorImpl::InvalidInterpolation { .. } => "InvalidInterpolation",
            ErrorImpl::UnmatchedBrace { .. } => "UnmatchedBrace",
            ErrorImpl::InvalidParameters { .. } => "InvalidParameters",
            ErrorImpl::MaxDepthExceeded { .. } => "MaxDepthExceeded",
            ErrorImpl::Syntax { .. } => "Syntax",
        }
    }

    pub fn get_tip(&self) -> ErrorTip {
        match &self.internal_error {
            ErrorImpl::UnterminatedString => {
                ErrorTip::Suggestion(String::from("Close the string with its opening quote"))
            }
            ErrorImpl::InconsistentIndentation => ErrorTip::Suggestion(String::from(
                "Dedent to the same column as an enclosing block",
            )),
            ErrorImpl::InvalidTarget { .. } => ErrorTip::Suggestion(String::from(
                "Only names, attributes, subscripts and tuples or lists of them can be assigned",
            )),
            ErrorImpl::MultipleStarredTargets => ErrorTip::Suggestion(String::from(
                "Keep a single `*name` per unpacking sequence",
            )),
            ErrorImpl::ElseWithoutExcept => ErrorTip::Suggestion(String::from(
                "Add an `except` clause before `else`, or move the code into `finally`",
            )),
            ErrorImpl::ClauseAfterFinally { .. } => {
                ErrorTip::Suggestion(String::from("`finally` must be the last clause of a `try`"))
            }
            ErrorImpl::MismatchedClosingTag { expected, .. } => {
                ErrorTip::Suggestion(format!("Close the element with `</{}>`", expected))
            }
            ErrorImpl::FunctionInHtmlContent => ErrorTip::Suggestion(String::from(
                "Move the definition above the element, into the view body",
            )),
            ErrorImpl::InvalidDecoratorTarget => ErrorTip::Suggestion(String::from(
                "Decorators must be followed by `def`, `class`, `view` or another decorator",
            )),
            ErrorImpl::MaxDepthExceeded { .. } => ErrorTip::Suggestion(String::from(
                "Split the construct up or raise `ParserOptions::max_depth`",
            )),
            _ => ErrorTip::None,
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.token.kind {
            TokenKind::EOF => write!(f, "at end: {}", self.internal_error)?,
            TokenKind::Newline => write!(f, "at end of line: {}", self.internal_error)?,
            TokenKind::Indent => write!(f, "at indent: {}", self.internal_error)?,
            TokenKind::Dedent => write!(f, "at dedent: {}", self.internal_error)?,
            _ => write!(f, "at '{}': {}", self.token.value, self.internal_error)?,
        }
        write!(f, " ({})", self.token.span.start)
    }
}

impl std::error::Error for Error {}

pub enum ErrorTip {
    None,
    Suggestion(String),
}

impl Display for ErrorTip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorTip::None => write!(f, ""),
            ErrorTip::Suggestion(suggestion) => write!(f, "{}", suggestion),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ErrorImpl {
    #[error("unrecognised character {token:?}")]
    UnrecognisedToken { token: String },
    #[error("unterminated string literal")]
    UnterminatedString,
    #[error("unterminated HTML comment")]
    UnterminatedComment,
    #[error("inconsistent indentation")]
    InconsistentIndentation,
    #[error("invalid number literal {token:?}")]
    NumberParseError { token: String },
    #[error("invalid escape sequence {sequence:?}")]
    InvalidEscape { sequence: String },
    #[error("unexpected token {token:?}")]
    UnexpectedToken { token: String },
    #[error("{message}")]
    Expected { message: String },
    #[error("{message}")]
    InvalidTarget { message: String },
    #[error("multiple starred expressions in assignment")]
    MultipleStarredTargets,
    #[error("'else' clause requires at least one 'except' clause")]
    ElseWithoutExcept,
    #[error("'{clause}' clause cannot appear after 'finally'")]
    ClauseAfterFinally { clause: String },
    #[error("closing tag name doesn't match opening tag: expected </{expected}>, found </{found}>")]
    MismatchedClosingTag { expected: String, found: String },
    #[error("function definitions are not allowed inside HTML content")]
    FunctionInHtmlContent,
    #[error("HTML elements are only allowed inside view bodies")]
    HtmlOutsideView,
    #[error("only class and function definitions can be decorated")]
    InvalidDecoratorTarget,
    #[error("starred expression cannot appear in a group")]
    StarredInGroup,
    #[error("invalid expression in interpolation: {message}")]
    InvalidInterpolation { message: String },
    #[error("unmatched '{brace}' in attribute value")]
    UnmatchedBrace { brace: char },
    #[error("{message}")]
    InvalidParameters { message: String },
    #[error("maximum nesting depth of {limit} exceeded")]
    MaxDepthExceeded { limit: usize },
    #[error("{message}")]
    Syntax { message: String },
}
