use crate::{
    ast::{
        ast::Identifier,
        expressions::Expr,
        statements::{Alias, Stmt},
    },
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
    Position, Span,
};

use super::{
    block::{end_simple_stmt, BlockFlavor},
    compound::parse_match_stmt,
    expr::{can_start_expression, parse_expr, parse_star_expressions, parse_yield_expr},
    html::{parse_content_line, parse_html_element},
    lookups::{AUGMENTED_LOOKUP, COMPOUND_STMT_LOOKUP, SIMPLE_STMT_LOOKUP},
    parser::Parser,
    targets::{parse_del_targets, parse_single_target, parse_star_targets, validate_target},
    types::parse_type_alias,
};

/// Parses one statement, including its terminating NEWLINE.
pub fn parse_stmt(parser: &mut Parser, flavor: BlockFlavor) -> Result<Stmt, Error> {
    parser.nested(|parser| {
        let kind = parser.current_token_kind();

        if matches!(
            kind,
            TokenKind::TagOpen | TokenKind::HtmlText | TokenKind::HtmlInterpolationStart
        ) {
            if !flavor.allow_html {
                return Err(parser.error(ErrorImpl::HtmlOutsideView));
            }
            if kind != TokenKind::TagOpen {
                return parse_content_line(parser);
            }
            let element = parse_html_element(parser)?;
            parser.eat(TokenKind::Newline);
            return Ok(Stmt::Html(element));
        }

        if !flavor.allow_function_defs && defines_function(parser) {
            return Err(parser.error(ErrorImpl::FunctionInHtmlContent));
        }

        if let Some(handler) = COMPOUND_STMT_LOOKUP.get(&kind) {
            return handler(parser, flavor);
        }

        if starts_match_stmt(parser) {
            return parse_match_stmt(parser, flavor);
        }

        let stmt = parse_simple_stmt(parser)?;
        // Statements after a `;` are picked up by the caller's loop.
        end_simple_stmt(parser)?;
        Ok(stmt)
    })
}

fn defines_function(parser: &Parser) -> bool {
    match parser.current_token_kind() {
        TokenKind::Def | TokenKind::View => true,
        TokenKind::Async => matches!(parser.peek_kind(1), TokenKind::Def | TokenKind::View),
        _ => false,
    }
}

/// `match` is a keyword only when a `match subject:` header followed by a
/// newline parses here.
fn starts_match_stmt(parser: &mut Parser) -> bool {
    if !parser.current_token().is_soft_keyword("match") {
        return false;
    }

    parser.lookahead(|parser| {
        parser.advance();
        parse_star_expressions(parser)?;
        parser.expect(TokenKind::Colon, "expected ':'")?;
        parser.expect(TokenKind::Newline, "expected newline")
    })
}

/// A simple statement without its terminator.
pub fn parse_simple_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    if let Some(handler) = SIMPLE_STMT_LOOKUP.get(&parser.current_token_kind()) {
        return handler(parser);
    }

    if parser.current_token().is_soft_keyword("type") && parser.peek_kind(1) == TokenKind::Identifier {
        return parse_type_alias(parser);
    }

    if parser.check(TokenKind::Yield) {
        let value = parse_yield_expr(parser)?;
        return Ok(Stmt::Expr {
            span: value.get_span(),
            value,
        });
    }

    parse_assignment_or_expr(parser)
}

/// Assignment forms are tried in order (annotated, chained, augmented); when
/// none applies the line is an expression statement.
fn parse_assignment_or_expr(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.current_token().span.start;
    let may_be_target = parser.check_any(&[
        TokenKind::Identifier,
        TokenKind::OpenParen,
        TokenKind::OpenBracket,
        TokenKind::Star,
    ]);

    if may_be_target {
        if let Some(stmt) = try_annotated_assignment(parser, start)? {
            return Ok(stmt);
        }

        let mut targets = vec![];
        while let Some(target) = parser.attempt(|parser| {
            let target = parse_star_targets(parser)?;
            parser.expect(TokenKind::Assignment, "expected '='")?;
            Ok(target)
        }) {
            targets.push(target);
        }

        if !targets.is_empty() {
            let value = parse_assigned_value(parser)?;
            return Ok(Stmt::Assign {
                targets,
                value,
                span: parser.span_from(start),
            });
        }

        let augmented = parser.attempt(|parser| {
            let target = parse_single_target(parser)?;
            match AUGMENTED_LOOKUP.get(&parser.current_token_kind()) {
                Some(&op) => {
                    parser.advance();
                    Ok((target, op))
                }
                None => Err(parser.expected("expected augmented assignment operator")),
            }
        });
        if let Some((target, op)) = augmented {
            let value = parse_assigned_value(parser)?;
            return Ok(Stmt::AugAssign {
                target,
                op,
                value,
                span: parser.span_from(start),
            });
        }
    }

    let value = parse_star_expressions(parser)?;
    let kind = parser.current_token_kind();
    if kind == TokenKind::Assignment || kind == TokenKind::Colon || kind.is_augmented_assignment() {
        validate_target(parser, &value)?;
        return Err(parser.error(ErrorImpl::Syntax {
            message: "invalid syntax".to_string(),
        }));
    }

    Ok(Stmt::Expr {
        value,
        span: parser.span_from(start),
    })
}

fn try_annotated_assignment(parser: &mut Parser, start: Position) -> Result<Option<Stmt>, Error> {
    let target = if parser.check(TokenKind::Identifier) && parser.peek_kind(1) == TokenKind::Colon {
        let name = parser.advance();
        parser.advance();
        Expr::Name(Identifier::new(name.value, name.span))
    } else {
        let target = parser.attempt(|parser| {
            let target = parse_single_target(parser)?;
            parser.expect(TokenKind::Colon, "expected ':'")?;
            Ok(target)
        });
        match target {
            Some(target) => target,
            None => return Ok(None),
        }
    };

    let annotation = parse_expr(parser)?;
    let value = if parser.eat(TokenKind::Assignment).is_some() {
        Some(parse_assigned_value(parser)?)
    } else {
        None
    };

    Ok(Some(Stmt::AnnAssign {
        target,
        annotation,
        value,
        span: parser.span_from(start),
    }))
}

fn parse_assigned_value(parser: &mut Parser) -> Result<Expr, Error> {
    if parser.check(TokenKind::Yield) {
        parse_yield_expr(parser)
    } else {
        parse_star_expressions(parser)
    }
}

pub fn parse_return_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.start;
    let value = if can_start_expression(parser.current_token_kind()) {
        Some(parse_star_expressions(parser)?)
    } else {
        None
    };

    Ok(Stmt::Return {
        value,
        span: parser.span_from(start),
    })
}

/// `raise [exception [from cause]]`
pub fn parse_raise_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.start;
    let mut exception = None;
    let mut cause = None;

    if can_start_expression(parser.current_token_kind()) {
        exception = Some(parse_expr(parser)?);
        if parser.eat(TokenKind::From).is_some() {
            cause = Some(parse_expr(parser)?);
        }
    }

    Ok(Stmt::Raise {
        exception,
        cause,
        span: parser.span_from(start),
    })
}

pub fn parse_pass_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    Ok(Stmt::Pass {
        span: parser.advance().span,
    })
}

pub fn parse_break_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    Ok(Stmt::Break {
        span: parser.advance().span,
    })
}

pub fn parse_continue_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    Ok(Stmt::Continue {
        span: parser.advance().span,
    })
}

pub fn parse_del_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.start;
    let targets = parse_del_targets(parser)?;
    Ok(Stmt::Delete {
        targets,
        span: parser.span_from(start),
    })
}

fn parse_name_list(parser: &mut Parser) -> Result<Vec<Identifier>, Error> {
    let mut names = vec![];
    loop {
        let name = parser.expect(TokenKind::Identifier, "expected name")?;
        names.push(Identifier::new(name.value, name.span));
        if parser.eat(TokenKind::Comma).is_none() {
            return Ok(names);
        }
    }
}

pub fn parse_global_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.start;
    let names = parse_name_list(parser)?;
    Ok(Stmt::Global {
        names,
        span: parser.span_from(start),
    })
}

pub fn parse_nonlocal_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.start;
    let names = parse_name_list(parser)?;
    Ok(Stmt::Nonlocal {
        names,
        span: parser.span_from(start),
    })
}

/// `assert test [, message]`
pub fn parse_assert_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.start;
    let test = parse_expr(parser)?;
    let message = if parser.eat(TokenKind::Comma).is_some() {
        Some(parse_expr(parser)?)
    } else {
        None
    };

    Ok(Stmt::Assert {
        test,
        message,
        span: parser.span_from(start),
    })
}

/// `a.b.c` as a single identifier spanning the whole path.
fn parse_dotted_name(parser: &mut Parser) -> Result<Identifier, Error> {
    let first = parser.expect(TokenKind::Identifier, "expected module name")?;
    let mut name = first.value;
    let mut span = first.span;

    while parser.check(TokenKind::Dot) && parser.peek_kind(1) == TokenKind::Identifier {
        parser.advance();
        let part = parser.advance();
        name.push('.');
        name.push_str(&part.value);
        span = Span::new(span.start, part.span.end);
    }

    Ok(Identifier::new(name, span))
}

fn parse_alias(parser: &mut Parser, dotted: bool) -> Result<Alias, Error> {
    let name = if dotted {
        parse_dotted_name(parser)?
    } else {
        let token = parser.expect(TokenKind::Identifier, "expected name to import")?;
        Identifier::new(token.value, token.span)
    };

    let asname = if parser.eat(TokenKind::As).is_some() {
        let token = parser.expect(TokenKind::Identifier, "expected name after 'as'")?;
        Some(Identifier::new(token.value, token.span))
    } else {
        None
    };

    let start = name.span.start;
    Ok(Alias {
        name,
        asname,
        span: parser.span_from(start),
    })
}

/// `import a.b as c, d`
pub fn parse_import_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.start;
    let mut names = vec![parse_alias(parser, true)?];
    while parser.eat(TokenKind::Comma).is_some() {
        names.push(parse_alias(parser, true)?);
    }

    Ok(Stmt::Import {
        names,
        span: parser.span_from(start),
    })
}

/// `from [.]*module import names`, `from . import (a, b,)` or `from m import *`
pub fn parse_import_from_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.start;

    let mut level = 0;
    loop {
        match parser.current_token_kind() {
            TokenKind::Dot => level += 1,
            TokenKind::Ellipsis => level += 3,
            _ => break,
        }
        parser.advance();
    }

    let module = if level == 0 || parser.check(TokenKind::Identifier) {
        Some(parse_dotted_name(parser)?)
    } else {
        None
    };

    parser.expect(TokenKind::Import, "expected 'import'")?;

    if parser.eat(TokenKind::Star).is_some() {
        return Ok(Stmt::ImportFrom {
            module,
            level,
            names: vec![],
            is_wildcard: true,
            span: parser.span_from(start),
        });
    }

    let parenthesized = parser.eat(TokenKind::OpenParen).is_some();
    let mut names = vec![parse_alias(parser, false)?];
    while parser.eat(TokenKind::Comma).is_some() {
        if parenthesized && parser.check(TokenKind::CloseParen) {
            break;
        }
        names.push(parse_alias(parser, false)?);
    }
    if parenthesized {
        parser.expect(TokenKind::CloseParen, "expected ')' after imported names")?;
    }

    Ok(Stmt::ImportFrom {
        module,
        level,
        names,
        is_wildcard: false,
        span: parser.span_from(start),
    })
}
