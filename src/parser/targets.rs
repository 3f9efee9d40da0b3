//! Assignment, `for`, `with ... as` and `del` targets.

use crate::{
    ast::expressions::Expr,
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::{Token, TokenKind},
};

use super::{
    expr::{can_start_expression, is_accessor_start, parse_primary},
    parser::Parser,
};

fn invalid_target(token: Token, message: &str) -> Error {
    Error::new(
        ErrorImpl::InvalidTarget {
            message: message.to_string(),
        },
        token,
    )
}

/// The complaint for an expression that cannot be assigned to, or `None`.
fn target_complaint(expr: &Expr) -> Option<&'static str> {
    match expr {
        Expr::Name(_) | Expr::Attribute { .. } | Expr::Subscript { .. } => None,
        Expr::Call { .. } => Some("cannot assign to function call"),
        Expr::Literal { .. } | Expr::FString { .. } => Some("cannot assign to literal"),
        _ => Some("cannot assign to expression"),
    }
}

/// A primary expression whose last accessor is `.name` or `[index]`.
fn parse_primary_target(parser: &mut Parser) -> Result<Expr, Error> {
    let token = parser.current_token().clone();
    let expr = parse_primary(parser)?;
    match target_complaint(&expr) {
        None => Ok(expr),
        Some(message) => Err(invalid_target(token, message)),
    }
}

/// `NAME`, `obj.attr`, `obj[index]` or a parenthesized single target.
pub fn parse_single_target(parser: &mut Parser) -> Result<Expr, Error> {
    if parser.check(TokenKind::OpenParen) {
        let grouped = parser.attempt(|parser| {
            parser.advance();
            let inner = parser.nested(parse_single_target)?;
            parser.expect(TokenKind::CloseParen, "expected ')'")?;
            Ok(inner)
        });
        if let Some(target) = grouped {
            return Ok(target);
        }
    }
    parse_primary_target(parser)
}

/// A comma-separated target list; several elements make a tuple. At most
/// one element may be starred.
pub fn parse_star_targets(parser: &mut Parser) -> Result<Expr, Error> {
    let first_token = parser.current_token().clone();
    let first = parse_star_target(parser)?;

    if !parser.check(TokenKind::Comma) {
        if matches!(first, Expr::Star { .. }) {
            return Err(invalid_target(
                first_token,
                "starred assignment target must be in a list or tuple",
            ));
        }
        return Ok(first);
    }

    let start = first.get_span().start;
    let mut elements = vec![(first_token, first)];
    while parser.eat(TokenKind::Comma).is_some() {
        if !can_start_expression(parser.current_token_kind()) {
            break;
        }
        let token = parser.current_token().clone();
        elements.push((token, parse_star_target(parser)?));
    }

    Ok(Expr::Tuple {
        elements: check_single_star(elements)?,
        span: parser.span_from(start),
    })
}

fn check_single_star(elements: Vec<(Token, Expr)>) -> Result<Vec<Expr>, Error> {
    let mut seen_star = false;
    let mut checked = Vec::with_capacity(elements.len());
    for (token, element) in elements {
        if matches!(element, Expr::Star { .. }) {
            if seen_star {
                return Err(Error::new(ErrorImpl::MultipleStarredTargets, token));
            }
            seen_star = true;
        }
        checked.push(element);
    }
    Ok(checked)
}

/// `*target` or a plain target.
pub fn parse_star_target(parser: &mut Parser) -> Result<Expr, Error> {
    if parser.check(TokenKind::DoubleStar) {
        return Err(invalid_target(
            parser.current_token().clone(),
            "cannot use ** in target expressions",
        ));
    }

    let Some(star) = parser.eat(TokenKind::Star) else {
        return parse_target_with_star_atom(parser, true);
    };

    if parser.check_any(&[TokenKind::Star, TokenKind::DoubleStar]) {
        return Err(invalid_target(
            parser.current_token().clone(),
            "cannot use starred expression here",
        ));
    }
    let value = parse_target_with_star_atom(parser, true)?;
    Ok(Expr::Star {
        span: star.span.to(value.get_span()),
        value: Box::new(value),
    })
}

/// A name, attribute or subscript target, or a parenthesized or bracketed
/// sequence of targets.
pub fn parse_target_with_star_atom(parser: &mut Parser, allow_star: bool) -> Result<Expr, Error> {
    parser.nested(|parser| {
        if parser.check_any(&[TokenKind::OpenParen, TokenKind::OpenBracket]) {
            let atom = parser.attempt(|parser| {
                let atom = parse_star_atom(parser, allow_star)?;
                if is_accessor_start(parser.current_token_kind()) {
                    return Err(parser.expected("expected target"));
                }
                Ok(atom)
            });
            if let Some(atom) = atom {
                return Ok(atom);
            }
        }
        parse_primary_target(parser)
    })
}

/// `NAME`, `(target)`, `(targets, ...)` or `[targets, ...]`.
fn parse_star_atom(parser: &mut Parser, allow_star: bool) -> Result<Expr, Error> {
    let (open, close) = match parser.current_token_kind() {
        TokenKind::OpenParen => (TokenKind::OpenParen, TokenKind::CloseParen),
        TokenKind::OpenBracket => (TokenKind::OpenBracket, TokenKind::CloseBracket),
        _ => return parse_primary_target(parser),
    };

    let start = parser.expect(open, "expected target")?.span.start;
    let mut elements = vec![];
    let mut had_comma = false;

    while !parser.check(close) {
        let token = parser.current_token().clone();
        let element = if allow_star {
            parse_star_target(parser)?
        } else if parser.check(TokenKind::Star) {
            return Err(invalid_target(token, "cannot delete starred"));
        } else {
            parse_target_with_star_atom(parser, false)?
        };
        elements.push((token, element));

        if parser.eat(TokenKind::Comma).is_none() {
            break;
        }
        had_comma = true;
    }

    let close_message = if close == TokenKind::CloseParen {
        "expected ')'"
    } else {
        "expected ']'"
    };
    parser.expect(close, close_message)?;
    let span = parser.span_from(start);

    if open == TokenKind::OpenParen && elements.len() == 1 && !had_comma {
        let (token, inner) = elements.remove(0);
        if matches!(inner, Expr::Star { .. }) {
            return Err(Error::new(ErrorImpl::StarredInGroup, token));
        }
        return Ok(Expr::Group {
            inner: Box::new(inner),
            span,
        });
    }

    let elements = check_single_star(elements)?;
    if open == TokenKind::OpenParen {
        Ok(Expr::Tuple { elements, span })
    } else {
        Ok(Expr::List { elements, span })
    }
}

/// `del` targets: like assignment targets, without stars.
pub fn parse_del_targets(parser: &mut Parser) -> Result<Vec<Expr>, Error> {
    let mut targets = vec![];
    loop {
        if parser.check(TokenKind::Star) {
            return Err(invalid_target(
                parser.current_token().clone(),
                "cannot delete starred",
            ));
        }
        targets.push(parse_target_with_star_atom(parser, false)?);

        if parser.eat(TokenKind::Comma).is_none() || !can_start_expression(parser.current_token_kind()) {
            return Ok(targets);
        }
    }
}

/// Checks that an already-parsed expression can be assigned to. Used to turn
/// a failed assignment parse into a precise diagnostic.
pub fn validate_target(parser: &Parser, expr: &Expr) -> Result<(), Error> {
    match expr {
        Expr::Star { value, .. } => validate_target(parser, value),
        Expr::Group { inner, .. } => validate_target(parser, inner),
        Expr::Tuple { elements, .. } | Expr::List { elements, .. } => {
            let mut seen_star = false;
            for element in elements {
                if matches!(element, Expr::Star { .. }) {
                    if seen_star {
                        let token = parser.token_at(element.get_span().start);
                        return Err(Error::new(ErrorImpl::MultipleStarredTargets, token));
                    }
                    seen_star = true;
                }
                validate_target(parser, element)?;
            }
            Ok(())
        }
        _ => match target_complaint(expr) {
            None => Ok(()),
            Some(message) => Err(invalid_target(parser.token_at(expr.get_span().start), message)),
        },
    }
}
