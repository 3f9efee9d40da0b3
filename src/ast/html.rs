use crate::Span;

use super::{ast::Identifier, expressions::Expr, statements::Stmt};

/// How an element's content was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    /// `<br />`
    SelfClosing,
    /// `<p>text {value}</p>`, including empty `<p></p>`
    SingleLine,
    /// Content on indented lines below the opening tag.
    Multiline,
}

/// `name` or `name=value`. String values containing `{` are stored as
/// `Expr::FString`.
#[derive(Debug, Clone, PartialEq)]
pub struct HtmlAttribute {
    pub name: Identifier,
    pub value: Option<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HtmlElement {
    pub tag_name: Identifier,
    pub attributes: Vec<HtmlAttribute>,
    /// Nested statements, elements and `Stmt::HtmlContent` runs.
    pub content: Vec<Stmt>,
    pub kind: ElementKind,
    /// `None` for self-closing elements.
    pub closing_tag: Option<Identifier>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum HtmlContentPart {
    Text { text: String, span: Span },
    Interpolation { expr: Expr, span: Span },
}

impl HtmlContentPart {
    pub fn get_span(&self) -> Span {
        match self {
            HtmlContentPart::Text { span, .. } | HtmlContentPart::Interpolation { span, .. } => {
                *span
            }
        }
    }
}
