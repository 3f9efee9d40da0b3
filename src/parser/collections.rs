//! Bracketed atoms: groups, tuples, lists, sets, dicts and comprehensions.

use crate::{
    ast::expressions::{ComprehensionClause, DictItem, Expr},
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
};

use super::{
    expr::{
        parse_bitwise_or, parse_disjunction, parse_expr, parse_star_named_expr,
        parse_yield_expr, starts_comprehension,
    },
    parser::Parser,
    targets::parse_star_targets,
};

/// `()`, `(x)`, `(x,)`, `(x for ...)` or `(yield ...)`.
pub fn parse_paren_atom(parser: &mut Parser) -> Result<Expr, Error> {
    parser.nested(|parser| {
        let start = parser.expect(TokenKind::OpenParen, "expected '('")?.span.start;

        if parser.eat(TokenKind::CloseParen).is_some() {
            return Ok(Expr::Tuple {
                elements: vec![],
                span: parser.span_from(start),
            });
        }

        if parser.check(TokenKind::Yield) {
            let inner = parse_yield_expr(parser)?;
            parser.expect(TokenKind::CloseParen, "expected ')'")?;
            return Ok(Expr::Group {
                inner: Box::new(inner),
                span: parser.span_from(start),
            });
        }

        let first_token = parser.current_token().clone();
        let first = parse_star_named_expr(parser)?;

        if starts_comprehension(parser) {
            let clauses = parse_comprehension_clauses(parser)?;
            parser.expect(TokenKind::CloseParen, "expected ')' after generator expression")?;
            return Ok(Expr::GeneratorExp {
                element: Box::new(first),
                clauses,
                span: parser.span_from(start),
            });
        }

        if parser.check(TokenKind::Comma) {
            let elements = parse_elements(parser, first, TokenKind::CloseParen)?;
            parser.expect(TokenKind::CloseParen, "expected ')'")?;
            return Ok(Expr::Tuple {
                elements,
                span: parser.span_from(start),
            });
        }

        parser.expect(TokenKind::CloseParen, "expected ')'")?;
        if matches!(first, Expr::Star { .. }) {
            return Err(Error::new(ErrorImpl::StarredInGroup, first_token));
        }

        Ok(Expr::Group {
            inner: Box::new(first),
            span: parser.span_from(start),
        })
    })
}

/// `[...]` list displays and list comprehensions.
pub fn parse_list_atom(parser: &mut Parser) -> Result<Expr, Error> {
    parser.nested(|parser| {
        let start = parser.expect(TokenKind::OpenBracket, "expected '['")?.span.start;

        if parser.eat(TokenKind::CloseBracket).is_some() {
            return Ok(Expr::List {
                elements: vec![],
                span: parser.span_from(start),
            });
        }

        let first = parse_star_named_expr(parser)?;

        if starts_comprehension(parser) {
            let clauses = parse_comprehension_clauses(parser)?;
            parser.expect(TokenKind::CloseBracket, "expected ']'")?;
            return Ok(Expr::ListComp {
                element: Box::new(first),
                clauses,
                span: parser.span_from(start),
            });
        }

        let elements = parse_elements(parser, first, TokenKind::CloseBracket)?;
        parser.expect(TokenKind::CloseBracket, "expected ']'")?;
        Ok(Expr::List {
            elements,
            span: parser.span_from(start),
        })
    })
}

/// `{...}`: an empty dict, a dict or set display, or a dict or set
/// comprehension, told apart by what follows the first element.
pub fn parse_curly_atom(parser: &mut Parser) -> Result<Expr, Error> {
    parser.nested(|parser| {
        let start = parser.expect(TokenKind::OpenCurly, "expected '{'")?.span.start;

        if parser.eat(TokenKind::CloseCurly).is_some() {
            return Ok(Expr::Dict {
                items: vec![],
                span: parser.span_from(start),
            });
        }

        if parser.eat(TokenKind::DoubleStar).is_some() {
            let value = parse_bitwise_or(parser)?;
            let items = parse_dict_items(parser, DictItem { key: None, value })?;
            parser.expect(TokenKind::CloseCurly, "expected '}'")?;
            return Ok(Expr::Dict {
                items,
                span: parser.span_from(start),
            });
        }

        let first = parse_star_named_expr(parser)?;

        if parser.eat(TokenKind::Colon).is_some() {
            let value = parse_expr(parser)?;

            if starts_comprehension(parser) {
                let clauses = parse_comprehension_clauses(parser)?;
                parser.expect(TokenKind::CloseCurly, "expected '}'")?;
                return Ok(Expr::DictComp {
                    key: Box::new(first),
                    value: Box::new(value),
                    clauses,
                    span: parser.span_from(start),
                });
            }

            let items = parse_dict_items(
                parser,
                DictItem {
                    key: Some(first),
                    value,
                },
            )?;
            parser.expect(TokenKind::CloseCurly, "expected '}'")?;
            return Ok(Expr::Dict {
                items,
                span: parser.span_from(start),
            });
        }

        if starts_comprehension(parser) {
            let clauses = parse_comprehension_clauses(parser)?;
            parser.expect(TokenKind::CloseCurly, "expected '}'")?;
            return Ok(Expr::SetComp {
                element: Box::new(first),
                clauses,
                span: parser.span_from(start),
            });
        }

        let elements = parse_elements(parser, first, TokenKind::CloseCurly)?;
        parser.expect(TokenKind::CloseCurly, "expected '}'")?;
        Ok(Expr::Set {
            elements,
            span: parser.span_from(start),
        })
    })
}

/// The rest of a comma-separated display after its first element. Stops
/// before `close`.
fn parse_elements(parser: &mut Parser, first: Expr, close: TokenKind) -> Result<Vec<Expr>, Error> {
    let mut elements = vec![first];
    while parser.eat(TokenKind::Comma).is_some() {
        if parser.check(close) {
            break;
        }
        elements.push(parse_star_named_expr(parser)?);
    }
    Ok(elements)
}

fn parse_dict_items(parser: &mut Parser, first: DictItem) -> Result<Vec<DictItem>, Error> {
    let mut items = vec![first];
    while parser.eat(TokenKind::Comma).is_some() {
        if parser.check(TokenKind::CloseCurly) {
            break;
        }

        if parser.eat(TokenKind::DoubleStar).is_some() {
            let value = parse_bitwise_or(parser)?;
            items.push(DictItem { key: None, value });
            continue;
        }

        let key = parse_expr(parser)?;
        parser.expect(TokenKind::Colon, "expected ':' after dictionary key")?;
        let value = parse_expr(parser)?;
        items.push(DictItem {
            key: Some(key),
            value,
        });
    }
    Ok(items)
}

/// One or more `[async] for targets in iter [if cond]*` clauses.
pub fn parse_comprehension_clauses(parser: &mut Parser) -> Result<Vec<ComprehensionClause>, Error> {
    let mut clauses = vec![];

    while starts_comprehension(parser) {
        let start = parser.current_token().span.start;
        let is_async = parser.eat(TokenKind::Async).is_some();
        parser.expect(TokenKind::For, "expected 'for'")?;

        let target = parse_star_targets(parser)?;
        parser.expect(TokenKind::In, "expected 'in' in comprehension")?;
        let iter = parse_disjunction(parser)?;

        let mut conditions = vec![];
        while parser.eat(TokenKind::If).is_some() {
            conditions.push(parse_disjunction(parser)?);
        }

        clauses.push(ComprehensionClause {
            target,
            iter,
            conditions,
            is_async,
            span: parser.span_from(start),
        });
    }

    Ok(clauses)
}
