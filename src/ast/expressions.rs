use crate::Span;

use super::ast::{BinaryOp, BoolOperator, CompareOp, ExprType, Identifier, UnaryOp};

/// Value of a literal expression.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    True,
    False,
    None,
    Int(u64),
    Float(f64),
    Imaginary(f64),
    Str(String),
    Bytes(Vec<u8>),
    Ellipsis,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Name(Identifier),
    Literal {
        value: LiteralValue,
        span: Span,
    },
    /// A formatted string: literal text interleaved with replacement fields.
    FString {
        parts: Vec<FStringPart>,
        span: Span,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
        span: Span,
    },
    Binary {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
        span: Span,
    },
    BoolOp {
        op: BoolOperator,
        left: Box<Expr>,
        right: Box<Expr>,
        span: Span,
    },
    /// A single pairwise comparison. Chains become `and`-ed pairs.
    Compare {
        left: Box<Expr>,
        op: CompareOp,
        right: Box<Expr>,
        span: Span,
    },
    /// `body if condition else orelse`
    Ternary {
        condition: Box<Expr>,
        body: Box<Expr>,
        orelse: Box<Expr>,
        span: Span,
    },
    Call {
        callee: Box<Expr>,
        arguments: Vec<Argument>,
        span: Span,
    },
    Attribute {
        value: Box<Expr>,
        attr: Identifier,
        span: Span,
    },
    /// `value[i, j:k]`; each index is an expression or an `Expr::Slice`.
    Subscript {
        value: Box<Expr>,
        indices: Vec<Expr>,
        span: Span,
    },
    Slice {
        lower: Option<Box<Expr>>,
        upper: Option<Box<Expr>>,
        step: Option<Box<Expr>>,
        span: Span,
    },
    Group {
        inner: Box<Expr>,
        span: Span,
    },
    Tuple {
        elements: Vec<Expr>,
        span: Span,
    },
    List {
        elements: Vec<Expr>,
        span: Span,
    },
    Set {
        elements: Vec<Expr>,
        span: Span,
    },
    Dict {
        items: Vec<DictItem>,
        span: Span,
    },
    ListComp {
        element: Box<Expr>,
        clauses: Vec<ComprehensionClause>,
        span: Span,
    },
    SetComp {
        element: Box<Expr>,
        clauses: Vec<ComprehensionClause>,
        span: Span,
    },
    DictComp {
        key: Box<Expr>,
        value: Box<Expr>,
        clauses: Vec<ComprehensionClause>,
        span: Span,
    },
    GeneratorExp {
        element: Box<Expr>,
        clauses: Vec<ComprehensionClause>,
        span: Span,
    },
    Lambda {
        parameters: ParameterList,
        body: Box<Expr>,
        span: Span,
    },
    Star {
        value: Box<Expr>,
        span: Span,
    },
    /// `name := value`
    NamedExpr {
        target: Identifier,
        value: Box<Expr>,
        span: Span,
    },
    Await {
        value: Box<Expr>,
        span: Span,
    },
    Yield {
        value: Option<Box<Expr>>,
        is_from: bool,
        span: Span,
    },
}

impl Expr {
    pub fn get_span(&self) -> Span {
        match self {
            Expr::Name(identifier) => identifier.span,
            Expr::Literal { span, .. }
            | Expr::FString { span, .. }
            | Expr::Unary { span, .. }
            | Expr::Binary { span, .. }
            | Expr::BoolOp { span, .. }
            | Expr::Compare { span, .. }
            | Expr::Ternary { span, .. }
            | Expr::Call { span, .. }
            | Expr::Attribute { span, .. }
            | Expr::Subscript { span, .. }
            | Expr::Slice { span, .. }
            | Expr::Group { span, .. }
            | Expr::Tuple { span, .. }
            | Expr::List { span, .. }
            | Expr::Set { span, .. }
            | Expr::Dict { span, .. }
            | Expr::ListComp { span, .. }
            | Expr::SetComp { span, .. }
            | Expr::DictComp { span, .. }
            | Expr::GeneratorExp { span, .. }
            | Expr::Lambda { span, .. }
            | Expr::Star { span, .. }
            | Expr::NamedExpr { span, .. }
            | Expr::Await { span, .. }
            | Expr::Yield { span, .. } => *span,
        }
    }

    pub fn get_expr_type(&self) -> ExprType {
        match self {
            Expr::Name(_) => ExprType::Name,
            Expr::Literal { .. } => ExprType::Literal,
            Expr::FString { .. } => ExprType::FString,
            Expr::Unary { .. } => ExprType::Unary,
            Expr::Binary { .. } => ExprType::Binary,
            Expr::BoolOp { .. } => ExprType::BoolOp,
            Expr::Compare { .. } => ExprType::Compare,
            Expr::Ternary { .. } => ExprType::Ternary,
            Expr::Call { .. } => ExprType::Call,
            Expr::Attribute { .. } => ExprType::Attribute,
            Expr::Subscript { .. } => ExprType::Subscript,
            Expr::Slice { .. } => ExprType::Slice,
            Expr::Group { .. } => ExprType::Group,
            Expr::Tuple { .. } => ExprType::Tuple,
            Expr::List { .. } => ExprType::List,
            Expr::Set { .. } => ExprType::Set,
            Expr::Dict { .. } => ExprType::Dict,
            Expr::ListComp { .. } => ExprType::ListComp,
            Expr::SetComp { .. } => ExprType::SetComp,
            Expr::DictComp { .. } => ExprType::DictComp,
            Expr::GeneratorExp { .. } => ExprType::GeneratorExp,
            Expr::Lambda { .. } => ExprType::Lambda,
            Expr::Star { .. } => ExprType::Star,
            Expr::NamedExpr { .. } => ExprType::NamedExpr,
            Expr::Await { .. } => ExprType::Await,
            Expr::Yield { .. } => ExprType::Yield,
        }
    }
}

/// One piece of an f-string.
#[derive(Debug, Clone, PartialEq)]
pub enum FStringPart {
    Literal {
        value: String,
        span: Span,
    },
    /// `{expr[=][!conv][:spec]}`
    Field {
        expr: Box<Expr>,
        debug: bool,
        conversion: Option<char>,
        format_spec: Vec<FStringPart>,
        span: Span,
    },
}

impl FStringPart {
    pub fn get_span(&self) -> Span {
        match self {
            FStringPart::Literal { span, .. } | FStringPart::Field { span, .. } => *span,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ArgumentKind {
    Positional,
    Keyword(Identifier),
    /// `*iterable`
    Star,
    /// `**mapping`
    DoubleStar,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Argument {
    pub kind: ArgumentKind,
    pub value: Expr,
    pub span: Span,
}

/// A dict display entry; `key` is `None` for `**mapping` unpacking.
#[derive(Debug, Clone, PartialEq)]
pub struct DictItem {
    pub key: Option<Expr>,
    pub value: Expr,
}

/// `[async] for target in iter [if cond]*`
#[derive(Debug, Clone, PartialEq)]
pub struct ComprehensionClause {
    pub target: Expr,
    pub iter: Expr,
    pub conditions: Vec<Expr>,
    pub is_async: bool,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterKind {
    Normal,
    /// `*args`
    VarPositional,
    /// `**kwargs`
    VarKeyword,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: Identifier,
    pub annotation: Option<Expr>,
    pub default: Option<Expr>,
    pub kind: ParameterKind,
    pub span: Span,
}

/// Parameters of a `def`, `view` or `lambda`.
///
/// `slash_index` is the number of positional-only parameters when a `/`
/// marker is present; `keyword_only_marker` is the index at which a bare
/// `*` appeared.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterList {
    pub parameters: Vec<Parameter>,
    pub slash_index: Option<usize>,
    pub keyword_only_marker: Option<usize>,
    pub span: Span,
}

impl ParameterList {
    pub fn empty(span: Span) -> Self {
        ParameterList {
            parameters: vec![],
            slash_index: None,
            keyword_only_marker: None,
            span,
        }
    }
}
