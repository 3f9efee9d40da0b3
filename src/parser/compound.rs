//! Compound statements. Each grammar is shared by every block flavor and
//! hands its flavor on to nested bodies, except that function and class
//! bodies reset to the ordinary flavor and view bodies use the view flavor.

use tracing::trace;

use crate::{
    ast::{
        ast::Identifier,
        expressions::{Expr, ParameterList},
        statements::{ExceptHandler, MatchCase, Stmt, TypeParam, WithItem},
    },
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
    Position,
};

use super::{
    block::{parse_block, BlockFlavor},
    expr::{parse_arguments, parse_expr, parse_named_expr, parse_star_expressions},
    params::{parse_parameters, ParamStyle},
    parser::Parser,
    patterns::parse_case_pattern,
    stmt::parse_stmt,
    targets::{parse_star_target, parse_star_targets},
    types::parse_type_params,
};

fn syntax(parser: &Parser, message: &str) -> Error {
    parser.error(ErrorImpl::Syntax {
        message: message.to_string(),
    })
}

pub fn parse_if_stmt(parser: &mut Parser, flavor: BlockFlavor) -> Result<Stmt, Error> {
    let start = parser.advance().span.start;
    parse_if_rest(parser, flavor, start)
}

/// Condition, body and `elif`/`else` tail of an `if` or `elif`.
fn parse_if_rest(parser: &mut Parser, flavor: BlockFlavor, start: Position) -> Result<Stmt, Error> {
    let condition = parse_named_expr(parser)?;
    parser.expect(TokenKind::Colon, "expected ':' after condition")?;
    let body = parse_block(parser, flavor)?;

    let orelse = if let Some(elif) = parser.eat(TokenKind::Elif) {
        vec![parse_if_rest(parser, flavor, elif.span.start)?]
    } else {
        parse_else_block(parser, flavor)?
    };

    Ok(Stmt::If {
        condition,
        body,
        orelse,
        span: parser.span_from(start),
    })
}

fn parse_else_block(parser: &mut Parser, flavor: BlockFlavor) -> Result<Vec<Stmt>, Error> {
    if parser.eat(TokenKind::Else).is_none() {
        return Ok(vec![]);
    }
    parser.expect(TokenKind::Colon, "expected ':' after 'else'")?;
    parse_block(parser, flavor)
}

pub fn parse_while_stmt(parser: &mut Parser, flavor: BlockFlavor) -> Result<Stmt, Error> {
    let start = parser.advance().span.start;
    let condition = parse_named_expr(parser)?;
    parser.expect(TokenKind::Colon, "expected ':' after condition")?;
    let body = parse_block(parser, flavor)?;
    let orelse = parse_else_block(parser, flavor)?;

    Ok(Stmt::While {
        condition,
        body,
        orelse,
        span: parser.span_from(start),
    })
}

pub fn parse_for_stmt(parser: &mut Parser, flavor: BlockFlavor) -> Result<Stmt, Error> {
    let start = parser.current_token().span.start;
    parse_for_rest(parser, flavor, start, false)
}

fn parse_for_rest(
    parser: &mut Parser,
    flavor: BlockFlavor,
    start: Position,
    is_async: bool,
) -> Result<Stmt, Error> {
    parser.expect(TokenKind::For, "expected 'for'")?;
    let target = parse_star_targets(parser)?;
    parser.expect(TokenKind::In, "expected 'in' after for-loop target")?;
    let iter = parse_star_expressions(parser)?;
    parser.expect(TokenKind::Colon, "expected ':' after for-loop header")?;
    let body = parse_block(parser, flavor)?;
    let orelse = parse_else_block(parser, flavor)?;

    Ok(Stmt::For {
        target,
        iter,
        body,
        orelse,
        is_async,
        span: parser.span_from(start),
    })
}

/// `try` with `except`, `except*`, `else` and `finally` clauses. Clause order
/// is checked as the clauses are read.
pub fn parse_try_stmt(parser: &mut Parser, flavor: BlockFlavor) -> Result<Stmt, Error> {
    let start = parser.advance().span.start;
    parser.expect(TokenKind::Colon, "expected ':' after 'try'")?;
    let body = parse_block(parser, flavor)?;

    let mut handlers: Vec<ExceptHandler> = vec![];
    let mut orelse = vec![];
    let mut finalbody = vec![];
    let mut seen_else = false;
    let mut seen_finally = false;

    loop {
        match parser.current_token_kind() {
            TokenKind::Except => {
                if seen_finally {
                    return Err(parser.error(ErrorImpl::ClauseAfterFinally {
                        clause: "except".to_string(),
                    }));
                }
                if seen_else {
                    return Err(syntax(parser, "'except' clause cannot appear after 'else'"));
                }
                let handler = parse_except_handler(parser, flavor)?;
                if handlers.first().map_or(false, |first| first.is_star != handler.is_star) {
                    return Err(Error::new(
                        ErrorImpl::Syntax {
                            message: "cannot have both 'except' and 'except*' on the same 'try'"
                                .to_string(),
                        },
                        parser.token_at(handler.span.start),
                    ));
                }
                handlers.push(handler);
            }
            TokenKind::Else => {
                if seen_finally {
                    return Err(parser.error(ErrorImpl::ClauseAfterFinally {
                        clause: "else".to_string(),
                    }));
                }
                if handlers.is_empty() {
                    return Err(parser.error(ErrorImpl::ElseWithoutExcept));
                }
                if seen_else {
                    return Err(syntax(parser, "duplicate 'else' clause"));
                }
                seen_else = true;
                parser.advance();
                parser.expect(TokenKind::Colon, "expected ':' after 'else'")?;
                orelse = parse_block(parser, flavor)?;
            }
            TokenKind::Finally => {
                if seen_finally {
                    return Err(syntax(parser, "duplicate 'finally' clause"));
                }
                seen_finally = true;
                parser.advance();
                parser.expect(TokenKind::Colon, "expected ':' after 'finally'")?;
                finalbody = parse_block(parser, flavor)?;
            }
            _ => break,
        }
    }

    if handlers.is_empty() && !seen_finally {
        return Err(parser.expected("expected 'except' or 'finally' after try block"));
    }

    Ok(Stmt::Try {
        body,
        handlers,
        orelse,
        finalbody,
        span: parser.span_from(start),
    })
}

/// `except [*] [type [as name]]: body`
fn parse_except_handler(parser: &mut Parser, flavor: BlockFlavor) -> Result<ExceptHandler, Error> {
    let start = parser.advance().span.start;
    let is_star = parser.eat(TokenKind::Star).is_some();

    let mut exception_type = None;
    let mut name = None;
    if !parser.check(TokenKind::Colon) {
        exception_type = Some(parse_star_expressions(parser)?);
        if parser.eat(TokenKind::As).is_some() {
            let token = parser.expect(TokenKind::Identifier, "expected name after 'as'")?;
            name = Some(Identifier::new(token.value, token.span));
        }
    } else if is_star {
        return Err(parser.expected("expected exception type after 'except*'"));
    }

    parser.expect(TokenKind::Colon, "expected ':' after except clause")?;
    let body = parse_block(parser, flavor)?;

    Ok(ExceptHandler {
        exception_type,
        name,
        body,
        is_star,
        span: parser.span_from(start),
    })
}

pub fn parse_with_stmt(parser: &mut Parser, flavor: BlockFlavor) -> Result<Stmt, Error> {
    let start = parser.current_token().span.start;
    parse_with_rest(parser, flavor, start, false)
}

fn parse_with_rest(
    parser: &mut Parser,
    flavor: BlockFlavor,
    start: Position,
    is_async: bool,
) -> Result<Stmt, Error> {
    parser.expect(TokenKind::With, "expected 'with'")?;

    let parenthesized = parser.attempt(|parser| {
        parser.expect(TokenKind::OpenParen, "expected '('")?;
        let mut items = vec![parse_with_item(parser)?];
        while parser.eat(TokenKind::Comma).is_some() {
            if parser.check(TokenKind::CloseParen) {
                break;
            }
            items.push(parse_with_item(parser)?);
        }
        parser.expect(TokenKind::CloseParen, "expected ')'")?;
        parser.expect(TokenKind::Colon, "expected ':'")?;
        Ok(items)
    });

    let items = match parenthesized {
        Some(items) => items,
        None => {
            let mut items = vec![parse_with_item(parser)?];
            while parser.eat(TokenKind::Comma).is_some() {
                items.push(parse_with_item(parser)?);
            }
            parser.expect(TokenKind::Colon, "expected ':' after with items")?;
            items
        }
    };

    let body = parse_block(parser, flavor)?;
    Ok(Stmt::With {
        items,
        body,
        is_async,
        span: parser.span_from(start),
    })
}

/// `context [as target]`
fn parse_with_item(parser: &mut Parser) -> Result<WithItem, Error> {
    let context = parse_expr(parser)?;
    let target = if parser.eat(TokenKind::As).is_some() {
        Some(parse_star_target(parser)?)
    } else {
        None
    };

    let start = context.get_span().start;
    Ok(WithItem {
        context,
        target,
        span: parser.span_from(start),
    })
}

/// `match subject:` followed by an indented block of `case` clauses.
pub fn parse_match_stmt(parser: &mut Parser, flavor: BlockFlavor) -> Result<Stmt, Error> {
    let start = parser.advance().span.start;
    let subject = parse_star_expressions(parser)?;
    parser.expect(TokenKind::Colon, "expected ':' after match subject")?;
    parser.expect(TokenKind::Newline, "expected newline after 'match'")?;
    parser.skip_newlines();
    parser.expect(TokenKind::Indent, "expected indented block")?;

    let mut cases = vec![];
    parser.skip_newlines();
    while parser.current_token().is_soft_keyword("case") {
        cases.push(parse_case_block(parser, flavor)?);
        parser.skip_newlines();
    }

    if cases.is_empty() {
        return Err(parser.expected("expected 'case' block"));
    }
    parser.expect(TokenKind::Dedent, "expected 'case' block")?;

    Ok(Stmt::Match {
        subject,
        cases,
        span: parser.span_from(start),
    })
}

fn parse_case_block(parser: &mut Parser, flavor: BlockFlavor) -> Result<MatchCase, Error> {
    let start = parser.advance().span.start;
    let pattern = parse_case_pattern(parser)?;
    let guard = if parser.eat(TokenKind::If).is_some() {
        Some(parse_named_expr(parser)?)
    } else {
        None
    };
    parser.expect(TokenKind::Colon, "expected ':' after case pattern")?;
    let body = parse_block(parser, flavor)?;

    Ok(MatchCase {
        pattern,
        guard,
        body,
        span: parser.span_from(start),
    })
}

/// Name, type parameters, parameter list and return annotation shared by
/// `def` and `view`.
struct Signature {
    name: Identifier,
    type_params: Vec<TypeParam>,
    parameters: ParameterList,
    returns: Option<Expr>,
}

fn parse_signature(parser: &mut Parser, what: &str) -> Result<Signature, Error> {
    let name = parser.expect(TokenKind::Identifier, &format!("expected {what} name"))?;
    let type_params = parse_type_params(parser)?;

    parser.expect(TokenKind::OpenParen, &format!("expected '(' after {what} name"))?;
    let parameters = parse_parameters(parser, ParamStyle::Function)?;
    parser.expect(TokenKind::CloseParen, "expected ')' after parameters")?;

    let returns = if parser.eat(TokenKind::Arrow).is_some() {
        Some(parse_expr(parser)?)
    } else {
        None
    };
    parser.expect(TokenKind::Colon, &format!("expected ':' after {what} signature"))?;

    Ok(Signature {
        name: Identifier::new(name.value, name.span),
        type_params,
        parameters,
        returns,
    })
}

pub fn parse_function_def(parser: &mut Parser, _flavor: BlockFlavor) -> Result<Stmt, Error> {
    let start = parser.current_token().span.start;
    parse_function_rest(parser, start, false)
}

fn parse_function_rest(parser: &mut Parser, start: Position, is_async: bool) -> Result<Stmt, Error> {
    parser.expect(TokenKind::Def, "expected 'def'")?;
    let signature = parse_signature(parser, "function")?;
    let body = parse_block(parser, BlockFlavor::ORDINARY)?;

    Ok(Stmt::FunctionDef {
        name: signature.name,
        type_params: signature.type_params,
        parameters: signature.parameters,
        returns: signature.returns,
        body,
        is_async,
        span: parser.span_from(start),
    })
}

pub fn parse_view_def(parser: &mut Parser, _flavor: BlockFlavor) -> Result<Stmt, Error> {
    let start = parser.current_token().span.start;
    parse_view_rest(parser, start, false)
}

fn parse_view_rest(parser: &mut Parser, start: Position, is_async: bool) -> Result<Stmt, Error> {
    parser.expect(TokenKind::View, "expected 'view'")?;
    let signature = parse_signature(parser, "view")?;
    trace!(view = %signature.name.name, "parsing view body");
    let body = parse_block(parser, BlockFlavor::VIEW)?;

    Ok(Stmt::View {
        name: signature.name,
        type_params: signature.type_params,
        parameters: signature.parameters,
        returns: signature.returns,
        body,
        is_async,
        span: parser.span_from(start),
    })
}

pub fn parse_class_def(parser: &mut Parser, _flavor: BlockFlavor) -> Result<Stmt, Error> {
    let start = parser.advance().span.start;
    let name = parser.expect(TokenKind::Identifier, "expected class name")?;
    let type_params = parse_type_params(parser)?;

    let arguments = if parser.check(TokenKind::OpenParen) {
        parse_arguments(parser)?
    } else {
        vec![]
    };
    parser.expect(TokenKind::Colon, "expected ':' after class definition")?;
    let body = parse_block(parser, BlockFlavor::ORDINARY)?;

    Ok(Stmt::ClassDef {
        name: Identifier::new(name.value, name.span),
        type_params,
        arguments,
        body,
        span: parser.span_from(start),
    })
}

/// `async def`, `async view`, `async for` or `async with`.
pub fn parse_async_stmt(parser: &mut Parser, flavor: BlockFlavor) -> Result<Stmt, Error> {
    let start = parser.advance().span.start;

    match parser.current_token_kind() {
        TokenKind::Def => parse_function_rest(parser, start, true),
        TokenKind::View => parse_view_rest(parser, start, true),
        TokenKind::For => parse_for_rest(parser, flavor, start, true),
        TokenKind::With => parse_with_rest(parser, flavor, start, true),
        _ => Err(parser.expected("expected 'def', 'with' or 'for' after 'async'")),
    }
}

/// `@decorator NEWLINE` followed by a definition or another decorator.
pub fn parse_decorated(parser: &mut Parser, flavor: BlockFlavor) -> Result<Stmt, Error> {
    let start = parser.advance().span.start;
    let decorator = parse_named_expr(parser)?;
    parser.expect(TokenKind::Newline, "expected newline after decorator")?;
    parser.skip_newlines();

    let decoratable = match parser.current_token_kind() {
        TokenKind::At | TokenKind::Def | TokenKind::Class | TokenKind::View => true,
        TokenKind::Async => matches!(parser.peek_kind(1), TokenKind::Def | TokenKind::View),
        _ => false,
    };
    if !decoratable {
        return Err(parser.error(ErrorImpl::InvalidDecoratorTarget));
    }

    let target = parse_stmt(parser, flavor)?;
    Ok(Stmt::Decorated {
        decorator,
        target: Box::new(target),
        span: parser.span_from(start),
    })
}
