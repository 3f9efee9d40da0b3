use crate::Span;

use super::{
    ast::{BinaryOp, Identifier, StmtType},
    expressions::{Argument, Expr, ParameterList},
    html::{HtmlContentPart, HtmlElement},
    patterns::Pattern,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Expr {
        value: Expr,
        span: Span,
    },
    /// `a = b = value`; one entry in `targets` per `=`.
    Assign {
        targets: Vec<Expr>,
        value: Expr,
        span: Span,
    },
    AnnAssign {
        target: Expr,
        annotation: Expr,
        value: Option<Expr>,
        span: Span,
    },
    AugAssign {
        target: Expr,
        op: BinaryOp,
        value: Expr,
        span: Span,
    },
    /// `elif` chains are nested `If` statements in `orelse`.
    If {
        condition: Expr,
        body: Vec<Stmt>,
        orelse: Vec<Stmt>,
        span: Span,
    },
    While {
        condition: Expr,
        body: Vec<Stmt>,
        orelse: Vec<Stmt>,
        span: Span,
    },
    For {
        target: Expr,
        iter: Expr,
        body: Vec<Stmt>,
        orelse: Vec<Stmt>,
        is_async: bool,
        span: Span,
    },
    Try {
        body: Vec<Stmt>,
        handlers: Vec<ExceptHandler>,
        orelse: Vec<Stmt>,
        finalbody: Vec<Stmt>,
        span: Span,
    },
    With {
        items: Vec<WithItem>,
        body: Vec<Stmt>,
        is_async: bool,
        span: Span,
    },
    Match {
        subject: Expr,
        cases: Vec<MatchCase>,
        span: Span,
    },
    FunctionDef {
        name: Identifier,
        type_params: Vec<TypeParam>,
        parameters: ParameterList,
        returns: Option<Expr>,
        body: Vec<Stmt>,
        is_async: bool,
        span: Span,
    },
    ClassDef {
        name: Identifier,
        type_params: Vec<TypeParam>,
        arguments: Vec<Argument>,
        body: Vec<Stmt>,
        span: Span,
    },
    /// `@decorator` applied to a def, class, view or another decorated statement.
    Decorated {
        decorator: Expr,
        target: Box<Stmt>,
        span: Span,
    },
    Import {
        names: Vec<Alias>,
        span: Span,
    },
    /// `from ..module import a as b`; `level` counts the leading dots.
    ImportFrom {
        module: Option<Identifier>,
        level: usize,
        names: Vec<Alias>,
        is_wildcard: bool,
        span: Span,
    },
    Return {
        value: Option<Expr>,
        span: Span,
    },
    Raise {
        exception: Option<Expr>,
        cause: Option<Expr>,
        span: Span,
    },
    Pass {
        span: Span,
    },
    Break {
        span: Span,
    },
    Continue {
        span: Span,
    },
    Delete {
        targets: Vec<Expr>,
        span: Span,
    },
    Global {
        names: Vec<Identifier>,
        span: Span,
    },
    Nonlocal {
        names: Vec<Identifier>,
        span: Span,
    },
    Assert {
        test: Expr,
        message: Option<Expr>,
        span: Span,
    },
    TypeAlias {
        name: Identifier,
        type_params: Vec<TypeParam>,
        value: Expr,
        span: Span,
    },
    /// A template definition whose body may contain HTML elements.
    View {
        name: Identifier,
        type_params: Vec<TypeParam>,
        parameters: ParameterList,
        returns: Option<Expr>,
        body: Vec<Stmt>,
        is_async: bool,
        span: Span,
    },
    Html(HtmlElement),
    /// A run of text and `{expr}` interpolations inside an element.
    HtmlContent {
        parts: Vec<HtmlContentPart>,
        span: Span,
    },
}

impl Stmt {
    pub fn get_span(&self) -> Span {
        match self {
            Stmt::Html(element) => element.span,
            Stmt::Expr { span, .. }
            | Stmt::Assign { span, .. }
            | Stmt::AnnAssign { span, .. }
            | Stmt::AugAssign { span, .. }
            | Stmt::If { span, .. }
            | Stmt::While { span, .. }
            | Stmt::For { span, .. }
            | Stmt::Try { span, .. }
            | Stmt::With { span, .. }
            | Stmt::Match { span, .. }
            | Stmt::FunctionDef { span, .. }
            | Stmt::ClassDef { span, .. }
            | Stmt::Decorated { span, .. }
            | Stmt::Import { span, .. }
            | Stmt::ImportFrom { span, .. }
            | Stmt::Return { span, .. }
            | Stmt::Raise { span, .. }
            | Stmt::Pass { span }
            | Stmt::Break { span }
            | Stmt::Continue { span }
            | Stmt::Delete { span, .. }
            | Stmt::Global { span, .. }
            | Stmt::Nonlocal { span, .. }
            | Stmt::Assert { span, .. }
            | Stmt::TypeAlias { span, .. }
            | Stmt::View { span, .. }
            | Stmt::HtmlContent { span, .. } => *span,
        }
    }

    pub fn get_stmt_type(&self) -> StmtType {
        match self {
            Stmt::Expr { .. } => StmtType::Expr,
            Stmt::Assign { .. } => StmtType::Assign,
            Stmt::AnnAssign { .. } => StmtType::AnnAssign,
            Stmt::AugAssign { .. } => StmtType::AugAssign,
            Stmt::If { .. } => StmtType::If,
            Stmt::While { .. } => StmtType::While,
            Stmt::For { .. } => StmtType::For,
            Stmt::Try { .. } => StmtType::Try,
            Stmt::With { .. } => StmtType::With,
            Stmt::Match { .. } => StmtType::Match,
            Stmt::FunctionDef { .. } => StmtType::FunctionDef,
            Stmt::ClassDef { .. } => StmtType::ClassDef,
            Stmt::Decorated { .. } => StmtType::Decorated,
            Stmt::Import { .. } => StmtType::Import,
            Stmt::ImportFrom { .. } => StmtType::ImportFrom,
            Stmt::Return { .. } => StmtType::Return,
            Stmt::Raise { .. } => StmtType::Raise,
            Stmt::Pass { .. } => StmtType::Pass,
            Stmt::Break { .. } => StmtType::Break,
            Stmt::Continue { .. } => StmtType::Continue,
            Stmt::Delete { .. } => StmtType::Delete,
            Stmt::Global { .. } => StmtType::Global,
            Stmt::Nonlocal { .. } => StmtType::Nonlocal,
            Stmt::Assert { .. } => StmtType::Assert,
            Stmt::TypeAlias { .. } => StmtType::TypeAlias,
            Stmt::View { .. } => StmtType::View,
            Stmt::Html(_) => StmtType::Html,
            Stmt::HtmlContent { .. } => StmtType::HtmlContent,
        }
    }
}

/// `except [*] [type [as name]]: body`
#[derive(Debug, Clone, PartialEq)]
pub struct ExceptHandler {
    pub exception_type: Option<Expr>,
    pub name: Option<Identifier>,
    pub body: Vec<Stmt>,
    pub is_star: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WithItem {
    pub context: Expr,
    pub target: Option<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchCase {
    pub pattern: Pattern,
    pub guard: Option<Expr>,
    pub body: Vec<Stmt>,
    pub span: Span,
}

/// `name [as asname]` in an import list.
#[derive(Debug, Clone, PartialEq)]
pub struct Alias {
    pub name: Identifier,
    pub asname: Option<Identifier>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeParamKind {
    TypeVar,
    /// `*Ts`
    TypeVarTuple,
    /// `**P`
    ParamSpec,
}

/// An entry of a `[T: bound = default, *Ts, **P]` list.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeParam {
    pub name: Identifier,
    pub kind: TypeParamKind,
    pub bound: Option<Expr>,
    pub default: Option<Expr>,
    pub span: Span,
}
