//! Shared helpers for the integration and property tests.

#![allow(dead_code)]

use pyview_parser::{
    ast::{
        expressions::{Expr, FStringPart, ParameterList},
        html::{HtmlContentPart, HtmlElement},
        patterns::Pattern,
        statements::{Stmt, TypeParam},
    },
    Span,
};

/// Collects a description of every child whose span escapes its parent's.
#[derive(Default)]
pub struct SpanChecker {
    pub violations: Vec<String>,
    pub nodes: usize,
}

impl SpanChecker {
    fn check(&mut self, parent: Span, child: Span, what: &str) {
        self.nodes += 1;
        if !parent.contains(&child) {
            self.violations.push(format!(
                "{} {}-{} escapes parent {}-{}",
                what, child.start, child.end, parent.start, parent.end
            ));
        }
    }

    pub fn module(&mut self, span: Span, body: &[Stmt]) {
        self.stmts(span, body);
    }

    fn stmts(&mut self, parent: Span, body: &[Stmt]) {
        for stmt in body {
            self.check(parent, stmt.get_span(), "statement");
            self.stmt(stmt);
        }
    }

    fn opt_expr(&mut self, parent: Span, expr: &Option<Expr>) {
        if let Some(expr) = expr {
            self.expr_in(parent, expr);
        }
    }

    fn expr_in(&mut self, parent: Span, expr: &Expr) {
        self.check(parent, expr.get_span(), "expression");
        self.expr(expr);
    }

    fn exprs_in(&mut self, parent: Span, exprs: &[Expr]) {
        for expr in exprs {
            self.expr_in(parent, expr);
        }
    }

    fn type_params(&mut self, parent: Span, params: &[TypeParam]) {
        for param in params {
            self.check(parent, param.span, "type parameter");
            self.check(param.span, param.name.span, "type parameter name");
            self.opt_expr(param.span, &param.bound);
            self.opt_expr(param.span, &param.default);
        }
    }

    fn parameters(&mut self, parent: Span, parameters: &ParameterList) {
        self.check(parent, parameters.span, "parameter list");
        for parameter in &parameters.parameters {
            self.check(parameters.span, parameter.span, "parameter");
            self.opt_expr(parameter.span, &parameter.annotation);
            self.opt_expr(parameter.span, &parameter.default);
        }
    }

    pub fn stmt(&mut self, stmt: &Stmt) {
        let span = stmt.get_span();
        match stmt {
            Stmt::Expr { value, .. } => self.expr_in(span, value),
            Stmt::Assign { targets, value, .. } => {
                self.exprs_in(span, targets);
                self.expr_in(span, value);
            }
            Stmt::AnnAssign {
                target,
                annotation,
                value,
                ..
            } => {
                self.expr_in(span, target);
                self.expr_in(span, annotation);
                self.opt_expr(span, value);
            }
            Stmt::AugAssign { target, value, .. } => {
                self.expr_in(span, target);
                self.expr_in(span, value);
            }
            Stmt::If {
                condition,
                body,
                orelse,
                ..
            }
            | Stmt::While {
                condition,
                body,
                orelse,
                ..
            } => {
                self.expr_in(span, condition);
                self.stmts(span, body);
                self.stmts(span, orelse);
            }
            Stmt::For {
                target,
                iter,
                body,
                orelse,
                ..
            } => {
                self.expr_in(span, target);
                self.expr_in(span, iter);
                self.stmts(span, body);
                self.stmts(span, orelse);
            }
            Stmt::Try {
                body,
                handlers,
                orelse,
                finalbody,
                ..
            } => {
                self.stmts(span, body);
                for handler in handlers {
                    self.check(span, handler.span, "except handler");
                    self.opt_expr(handler.span, &handler.exception_type);
                    self.stmts(handler.span, &handler.body);
                }
                self.stmts(span, orelse);
                self.stmts(span, finalbody);
            }
            Stmt::With { items, body, .. } => {
                for item in items {
                    self.check(span, item.span, "with item");
                    self.expr_in(item.span, &item.context);
                    self.opt_expr(item.span, &item.target);
                }
                self.stmts(span, body);
            }
            Stmt::Match { subject, cases, .. } => {
                self.expr_in(span, subject);
                for case in cases {
                    self.check(span, case.span, "case");
                    self.pattern_in(case.span, &case.pattern);
                    self.opt_expr(case.span, &case.guard);
                    self.stmts(case.span, &case.body);
                }
            }
            Stmt::FunctionDef {
                name,
                type_params,
                parameters,
                returns,
                body,
                ..
            }
            | Stmt::View {
                name,
                type_params,
                parameters,
                returns,
                body,
                ..
            } => {
                self.check(span, name.span, "name");
                self.type_params(span, type_params);
                self.parameters(span, parameters);
                self.opt_expr(span, returns);
                self.stmts(span, body);
            }
            Stmt::ClassDef {
                name,
                type_params,
                arguments,
                body,
                ..
            } => {
                self.check(span, name.span, "name");
                self.type_params(span, type_params);
                for argument in arguments {
                    self.check(span, argument.span, "argument");
                    self.expr_in(argument.span, &argument.value);
                }
                self.stmts(span, body);
            }
            Stmt::Decorated {
                decorator, target, ..
            } => {
                self.expr_in(span, decorator);
                self.check(span, target.get_span(), "decorated target");
                self.stmt(target);
            }
            Stmt::Import { names, .. } | Stmt::ImportFrom { names, .. } => {
                for alias in names {
                    self.check(span, alias.span, "alias");
                }
            }
            Stmt::Return { value, .. } => self.opt_expr(span, value),
            Stmt::Raise {
                exception, cause, ..
            } => {
                self.opt_expr(span, exception);
                self.opt_expr(span, cause);
            }
            Stmt::Pass { .. } | Stmt::Break { .. } | Stmt::Continue { .. } => {}
            Stmt::Delete { targets, .. } => self.exprs_in(span, targets),
            Stmt::Global { names, .. } | Stmt::Nonlocal { names, .. } => {
                for name in names {
                    self.check(span, name.span, "name");
                }
            }
            Stmt::Assert { test, message, .. } => {
                self.expr_in(span, test);
                self.opt_expr(span, message);
            }
            Stmt::TypeAlias {
                name,
                type_params,
                value,
                ..
            } => {
                self.check(span, name.span, "name");
                self.type_params(span, type_params);
                self.expr_in(span, value);
            }
            Stmt::Html(element) => self.element(element),
            Stmt::HtmlContent { parts, .. } => self.content_parts(span, parts),
        }
    }

    fn element(&mut self, element: &HtmlElement) {
        let span = element.span;
        self.check(span, element.tag_name.span, "tag name");
        for attribute in &element.attributes {
            self.check(span, attribute.span, "attribute");
            self.opt_expr(attribute.span, &attribute.value);
        }
        self.stmts(span, &element.content);
        if let Some(closing) = &element.closing_tag {
            self.check(span, closing.span, "closing tag");
        }
    }

    fn content_parts(&mut self, parent: Span, parts: &[HtmlContentPart]) {
        for part in parts {
            self.check(parent, part.get_span(), "content part");
            if let HtmlContentPart::Interpolation { expr, span } = part {
                self.expr_in(*span, expr);
            }
        }
    }

    fn fstring_parts(&mut self, parent: Span, parts: &[FStringPart]) {
        for part in parts {
            self.check(parent, part.get_span(), "f-string part");
            if let FStringPart::Field {
                expr,
                format_spec,
                span,
                ..
            } = part
            {
                self.expr_in(*span, expr);
                self.fstring_parts(*span, format_spec);
            }
        }
    }

    pub fn expr(&mut self, expr: &Expr) {
        let span = expr.get_span();
        match expr {
            Expr::Name(_) | Expr::Literal { .. } => {}
            Expr::FString { parts, .. } => self.fstring_parts(span, parts),
            Expr::Unary { operand, .. } => self.expr_in(span, operand),
            Expr::Binary { left, right, .. }
            | Expr::BoolOp { left, right, .. }
            | Expr::Compare { left, right, .. } => {
                self.expr_in(span, left);
                self.expr_in(span, right);
            }
            Expr::Ternary {
                condition,
                body,
                orelse,
                ..
            } => {
                self.expr_in(span, condition);
                self.expr_in(span, body);
                self.expr_in(span, orelse);
            }
            Expr::Call {
                callee, arguments, ..
            } => {
                self.expr_in(span, callee);
                for argument in arguments {
                    self.check(span, argument.span, "argument");
                    self.expr_in(argument.span, &argument.value);
                }
            }
            Expr::Attribute { value, attr, .. } => {
                self.expr_in(span, value);
                self.check(span, attr.span, "attribute name");
            }
            Expr::Subscript { value, indices, .. } => {
                self.expr_in(span, value);
                self.exprs_in(span, indices);
            }
            Expr::Slice {
                lower, upper, step, ..
            } => {
                for part in [lower, upper, step].into_iter().flatten() {
                    self.expr_in(span, part);
                }
            }
            Expr::Group { inner, .. } => self.expr_in(span, inner),
            Expr::Tuple { elements, .. }
            | Expr::List { elements, .. }
            | Expr::Set { elements, .. } => self.exprs_in(span, elements),
            Expr::Dict { items, .. } => {
                for item in items {
                    self.opt_expr(span, &item.key);
                    self.expr_in(span, &item.value);
                }
            }
            Expr::ListComp {
                element, clauses, ..
            }
            | Expr::SetComp {
                element, clauses, ..
            }
            | Expr::GeneratorExp {
                element, clauses, ..
            } => {
                self.expr_in(span, element);
                for clause in clauses {
                    self.check(span, clause.span, "comprehension clause");
                    self.expr_in(clause.span, &clause.target);
                    self.expr_in(clause.span, &clause.iter);
                    self.exprs_in(clause.span, &clause.conditions);
                }
            }
            Expr::DictComp {
                key,
                value,
                clauses,
                ..
            } => {
                self.expr_in(span, key);
                self.expr_in(span, value);
                for clause in clauses {
                    self.check(span, clause.span, "comprehension clause");
                    self.expr_in(clause.span, &clause.target);
                    self.expr_in(clause.span, &clause.iter);
                    self.exprs_in(clause.span, &clause.conditions);
                }
            }
            Expr::Lambda {
                parameters, body, ..
            } => {
                self.parameters(span, parameters);
                self.expr_in(span, body);
            }
            Expr::Star { value, .. } | Expr::Await { value, .. } => self.expr_in(span, value),
            Expr::NamedExpr { target, value, .. } => {
                self.check(span, target.span, "walrus target");
                self.expr_in(span, value);
            }
            Expr::Yield { value, .. } => {
                if let Some(value) = value {
                    self.expr_in(span, value);
                }
            }
        }
    }

    fn pattern_in(&mut self, parent: Span, pattern: &Pattern) {
        self.check(parent, pattern.get_span(), "pattern");
        let span = pattern.get_span();
        match pattern {
            Pattern::Literal { value, .. } | Pattern::Value { value, .. } => {
                self.expr_in(span, value)
            }
            Pattern::Capture(_) | Pattern::Wildcard { .. } | Pattern::Star { .. } => {}
            Pattern::Group { pattern, .. } | Pattern::As { pattern, .. } => {
                self.pattern_in(span, pattern)
            }
            Pattern::Sequence { patterns, .. } | Pattern::Or { patterns, .. } => {
                for pattern in patterns {
                    self.pattern_in(span, pattern);
                }
            }
            Pattern::Mapping { items, .. } => {
                for item in items {
                    self.expr_in(span, &item.key);
                    self.pattern_in(span, &item.pattern);
                }
            }
            Pattern::Class {
                cls,
                patterns,
                keywords,
                ..
            } => {
                self.expr_in(span, cls);
                for pattern in patterns {
                    self.pattern_in(span, pattern);
                }
                for keyword in keywords {
                    self.check(span, keyword.span, "keyword pattern");
                    self.pattern_in(keyword.span, &keyword.pattern);
                }
            }
        }
    }
}
