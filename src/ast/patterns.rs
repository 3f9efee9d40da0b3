use crate::Span;

use super::{ast::Identifier, expressions::Expr};

/// A `case` pattern.
#[derive(Debug, Clone, PartialEq)]
pub enum Pattern {
    /// Numbers (including `-1` and `1+2j`), strings, `None`, `True`, `False`.
    Literal {
        value: Expr,
        span: Span,
    },
    Capture(Identifier),
    /// `_`
    Wildcard {
        span: Span,
    },
    /// A dotted name such as `Color.RED`.
    Value {
        value: Expr,
        span: Span,
    },
    Group {
        pattern: Box<Pattern>,
        span: Span,
    },
    Sequence {
        patterns: Vec<Pattern>,
        is_tuple: bool,
        span: Span,
    },
    /// `*name`, or `*_` with no name.
    Star {
        name: Option<Identifier>,
        span: Span,
    },
    Mapping {
        items: Vec<MappingItem>,
        rest: Option<Identifier>,
        span: Span,
    },
    Class {
        cls: Expr,
        patterns: Vec<Pattern>,
        keywords: Vec<KeywordPattern>,
        span: Span,
    },
    As {
        pattern: Box<Pattern>,
        name: Identifier,
        span: Span,
    },
    Or {
        patterns: Vec<Pattern>,
        span: Span,
    },
}

impl Pattern {
    pub fn get_span(&self) -> Span {
        match self {
            Pattern::Capture(identifier) => identifier.span,
            Pattern::Literal { span, .. }
            | Pattern::Wildcard { span }
            | Pattern::Value { span, .. }
            | Pattern::Group { span, .. }
            | Pattern::Sequence { span, .. }
            | Pattern::Star { span, .. }
            | Pattern::Mapping { span, .. }
            | Pattern::Class { span, .. }
            | Pattern::As { span, .. }
            | Pattern::Or { span, .. } => *span,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MappingItem {
    pub key: Expr,
    pub pattern: Pattern,
}

/// `name=pattern` inside a class pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct KeywordPattern {
    pub name: Identifier,
    pub pattern: Pattern,
    pub span: Span,
}
