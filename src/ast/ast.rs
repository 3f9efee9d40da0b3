use std::fmt::Display;

use crate::Span;

use super::statements::Stmt;

/// A parsed source file.
#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    pub body: Vec<Stmt>,
    pub span: Span,
}

/// A name together with where it was written.
///
/// Dotted module paths in imports are stored as a single identifier whose
/// name contains the dots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identifier {
    pub name: String,
    pub span: Span,
}

impl Identifier {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Identifier {
            name: name.into(),
            span,
        }
    }
}

/// Expression Types
///
/// Fieldless mirror of the `Expr` variants, handy for assertions and messages.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum ExprType {
    Name,
    Literal,
    FString,
    Unary,
    Binary,
    BoolOp,
    Compare,
    Ternary,
    Call,
    Attribute,
    Subscript,
    Slice,
    Group,
    Tuple,
    List,
    Set,
    Dict,
    ListComp,
    SetComp,
    DictComp,
    GeneratorExp,
    Lambda,
    Star,
    NamedExpr,
    Await,
    Yield,
}

/// Statement Types
///
/// Fieldless mirror of the `Stmt` variants.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum StmtType {
    Expr,
    Assign,
    AnnAssign,
    AugAssign,
    If,
    While,
    For,
    Try,
    With,
    Match,
    FunctionDef,
    ClassDef,
    Decorated,
    Import,
    ImportFrom,
    Return,
    Raise,
    Pass,
    Break,
    Continue,
    Delete,
    Global,
    Nonlocal,
    Assert,
    TypeAlias,
    View,
    Html,
    HtmlContent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Not,
    Negate,
    Plus,
    Invert,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    FloorDivide,
    Modulo,
    Power,
    MatMul,
    LeftShift,
    RightShift,
    BitOr,
    BitXor,
    BitAnd,
}

impl BinaryOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::FloorDivide => "//",
            BinaryOp::Modulo => "%",
            BinaryOp::Power => "**",
            BinaryOp::MatMul => "@",
            BinaryOp::LeftShift => "<<",
            BinaryOp::RightShift => ">>",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
            BinaryOp::BitAnd => "&",
        }
    }
}

impl Display for BinaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Short-circuiting `and` / `or`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoolOperator {
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    Is,
    IsNot,
    In,
    NotIn,
}
