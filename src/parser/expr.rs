use crate::{
    ast::{
        ast::{BinaryOp, BoolOperator, Identifier, UnaryOp},
        expressions::{Argument, ArgumentKind, Expr, LiteralValue},
    },
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::{Literal, TokenKind},
    Span,
};

use super::{
    collections::{parse_comprehension_clauses, parse_curly_atom, parse_list_atom, parse_paren_atom},
    fstring::parse_string_atom,
    lookups::{BindingPower, BINARY_LOOKUP, COMPARISON_LOOKUP},
    params::{parse_parameters, ParamStyle},
    parser::Parser,
};

/// True for tokens that can begin an expression.
pub fn can_start_expression(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Identifier
            | TokenKind::Number
            | TokenKind::String
            | TokenKind::FString
            | TokenKind::True
            | TokenKind::False
            | TokenKind::None
            | TokenKind::Ellipsis
            | TokenKind::OpenParen
            | TokenKind::OpenBracket
            | TokenKind::OpenCurly
            | TokenKind::Dash
            | TokenKind::Plus
            | TokenKind::Tilde
            | TokenKind::Not
            | TokenKind::Lambda
            | TokenKind::Await
            | TokenKind::Star
    )
}

/// `disjunction ['if' disjunction 'else' expression] | lambda`
pub fn parse_expr(parser: &mut Parser) -> Result<Expr, Error> {
    parser.nested(|parser| {
        if parser.check(TokenKind::Lambda) {
            return parse_lambda(parser);
        }

        let body = parse_disjunction(parser)?;
        if parser.eat(TokenKind::If).is_none() {
            return Ok(body);
        }

        let condition = parse_disjunction(parser)?;
        parser.expect(TokenKind::Else, "expected 'else' in conditional expression")?;
        let orelse = parse_expr(parser)?;

        Ok(Expr::Ternary {
            span: body.get_span().to(orelse.get_span()),
            condition: Box::new(condition),
            body: Box::new(body),
            orelse: Box::new(orelse),
        })
    })
}

/// `NAME ':=' expression | expression`
pub fn parse_named_expr(parser: &mut Parser) -> Result<Expr, Error> {
    if !(parser.check(TokenKind::Identifier) && parser.peek_kind(1) == TokenKind::Walrus) {
        return parse_expr(parser);
    }

    let name = parser.advance();
    parser.advance();
    let value = parse_expr(parser)?;

    Ok(Expr::NamedExpr {
        span: name.span.to(value.get_span()),
        target: Identifier::new(name.value, name.span),
        value: Box::new(value),
    })
}

fn parse_starred(parser: &mut Parser) -> Result<Expr, Error> {
    let star = parser.advance();
    let value = parse_bitwise_or(parser)?;
    Ok(Expr::Star {
        span: star.span.to(value.get_span()),
        value: Box::new(value),
    })
}

/// `'*' bitwise_or | expression`
pub fn parse_star_expr(parser: &mut Parser) -> Result<Expr, Error> {
    if parser.check(TokenKind::Star) {
        parse_starred(parser)
    } else {
        parse_expr(parser)
    }
}

/// `'*' bitwise_or | named_expression`, the element form of displays.
pub fn parse_star_named_expr(parser: &mut Parser) -> Result<Expr, Error> {
    if parser.check(TokenKind::Star) {
        parse_starred(parser)
    } else {
        parse_named_expr(parser)
    }
}

/// A comma-separated list of star expressions; more than one element (or a
/// trailing comma) makes an unparenthesized tuple.
pub fn parse_star_expressions(parser: &mut Parser) -> Result<Expr, Error> {
    let first = parse_star_expr(parser)?;
    if !parser.check(TokenKind::Comma) {
        return Ok(first);
    }

    let start = first.get_span().start;
    let mut elements = vec![first];
    while parser.eat(TokenKind::Comma).is_some() {
        if !can_start_expression(parser.current_token_kind()) {
            break;
        }
        elements.push(parse_star_expr(parser)?);
    }

    Ok(Expr::Tuple {
        elements,
        span: parser.span_from(start),
    })
}

/// `conjunction ('or' conjunction)*`
pub fn parse_disjunction(parser: &mut Parser) -> Result<Expr, Error> {
    let mut left = parse_conjunction(parser)?;
    while parser.eat(TokenKind::Or).is_some() {
        let right = parse_conjunction(parser)?;
        left = Expr::BoolOp {
            span: left.get_span().to(right.get_span()),
            op: BoolOperator::Or,
            left: Box::new(left),
            right: Box::new(right),
        };
    }
    Ok(left)
}

fn parse_conjunction(parser: &mut Parser) -> Result<Expr, Error> {
    let mut left = parse_inversion(parser)?;
    while parser.eat(TokenKind::And).is_some() {
        let right = parse_inversion(parser)?;
        left = Expr::BoolOp {
            span: left.get_span().to(right.get_span()),
            op: BoolOperator::And,
            left: Box::new(left),
            right: Box::new(right),
        };
    }
    Ok(left)
}

fn parse_inversion(parser: &mut Parser) -> Result<Expr, Error> {
    if !parser.check(TokenKind::Not) {
        return parse_comparison(parser);
    }

    parser.nested(|parser| {
        let not = parser.advance();
        let operand = parse_inversion(parser)?;
        Ok(Expr::Unary {
            span: not.span.to(operand.get_span()),
            op: UnaryOp::Not,
            operand: Box::new(operand),
        })
    })
}

/// `a < b < c` is folded into `(a < b) and (b < c)`.
fn parse_comparison(parser: &mut Parser) -> Result<Expr, Error> {
    let mut left = parse_bitwise_or(parser)?;
    let mut chain: Option<Expr> = None;

    while let Some(&op) = COMPARISON_LOOKUP.get(&parser.current_token_kind()) {
        parser.advance();
        let right = parse_bitwise_or(parser)?;
        let compare = Expr::Compare {
            span: left.get_span().to(right.get_span()),
            left: Box::new(left),
            op,
            right: Box::new(right.clone()),
        };

        chain = Some(match chain {
            None => compare,
            Some(previous) => Expr::BoolOp {
                span: previous.get_span().to(compare.get_span()),
                op: BoolOperator::And,
                left: Box::new(previous),
                right: Box::new(compare),
            },
        });
        left = right;
    }

    Ok(chain.unwrap_or(left))
}

pub fn parse_bitwise_or(parser: &mut Parser) -> Result<Expr, Error> {
    parse_binary_expr(parser, BindingPower::BitwiseOr)
}

/// Precedence climbing over the binary operator table. Operators binding
/// looser than `min_bp` are left for the caller.
pub fn parse_binary_expr(parser: &mut Parser, min_bp: BindingPower) -> Result<Expr, Error> {
    let mut left = parse_factor(parser)?;

    while let Some(&(bp, op)) = BINARY_LOOKUP.get(&parser.current_token_kind()) {
        if bp < min_bp {
            break;
        }
        parser.advance();
        let right = parse_binary_expr(parser, bp.next())?;
        left = Expr::Binary {
            span: left.get_span().to(right.get_span()),
            left: Box::new(left),
            op,
            right: Box::new(right),
        };
    }

    Ok(left)
}

/// Prefix `+`, `-` and `~`.
fn parse_factor(parser: &mut Parser) -> Result<Expr, Error> {
    let op = match parser.current_token_kind() {
        TokenKind::Dash => UnaryOp::Negate,
        TokenKind::Plus => UnaryOp::Plus,
        TokenKind::Tilde => UnaryOp::Invert,
        _ => return parse_power(parser),
    };

    parser.nested(|parser| {
        let operator = parser.advance();
        let operand = parse_factor(parser)?;
        Ok(Expr::Unary {
            span: operator.span.to(operand.get_span()),
            op,
            operand: Box::new(operand),
        })
    })
}

/// `**` binds tighter than a unary operator on its left and looser than one
/// on its right: `-2 ** -1` is `-(2 ** (-1))`.
fn parse_power(parser: &mut Parser) -> Result<Expr, Error> {
    let base = parse_await_primary(parser)?;
    if parser.eat(TokenKind::DoubleStar).is_none() {
        return Ok(base);
    }

    let exponent = parser.nested(parse_factor)?;
    Ok(Expr::Binary {
        span: base.get_span().to(exponent.get_span()),
        left: Box::new(base),
        op: BinaryOp::Power,
        right: Box::new(exponent),
    })
}

fn parse_await_primary(parser: &mut Parser) -> Result<Expr, Error> {
    let Some(await_token) = parser.eat(TokenKind::Await) else {
        return parse_primary(parser);
    };

    let value = parse_primary(parser)?;
    Ok(Expr::Await {
        span: await_token.span.to(value.get_span()),
        value: Box::new(value),
    })
}

pub fn is_accessor_start(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Dot | TokenKind::OpenBracket | TokenKind::OpenParen
    )
}

/// An atom followed by any number of `.name`, `[index]` and `(args)`.
pub fn parse_primary(parser: &mut Parser) -> Result<Expr, Error> {
    let mut expr = parse_atom(parser)?;
    while is_accessor_start(parser.current_token_kind()) {
        expr = parse_accessor(parser, expr)?;
    }
    Ok(expr)
}

/// Applies a single accessor to `value`.
pub fn parse_accessor(parser: &mut Parser, value: Expr) -> Result<Expr, Error> {
    let start = value.get_span().start;

    match parser.current_token_kind() {
        TokenKind::Dot => {
            parser.advance();
            let name = parser.expect(TokenKind::Identifier, "expected identifier after '.'")?;
            Ok(Expr::Attribute {
                span: Span::new(start, name.span.end),
                value: Box::new(value),
                attr: Identifier::new(name.value, name.span),
            })
        }
        TokenKind::OpenBracket => {
            parser.advance();
            let mut indices = vec![parse_slice(parser)?];
            while parser.eat(TokenKind::Comma).is_some() {
                if parser.check(TokenKind::CloseBracket) {
                    break;
                }
                indices.push(parse_slice(parser)?);
            }
            parser.expect(TokenKind::CloseBracket, "expected ']' after index")?;
            Ok(Expr::Subscript {
                span: parser.span_from(start),
                value: Box::new(value),
                indices,
            })
        }
        TokenKind::OpenParen => {
            let arguments = parse_arguments(parser)?;
            Ok(Expr::Call {
                span: parser.span_from(start),
                callee: Box::new(value),
                arguments,
            })
        }
        _ => Err(parser.expected("expected '.', '[' or '('")),
    }
}

/// `[lower] ':' [upper] [':' [step]]`, or a plain index.
fn parse_slice(parser: &mut Parser) -> Result<Expr, Error> {
    let start = parser.current_token().span.start;

    let lower = if parser.check(TokenKind::Colon) {
        None
    } else {
        let index = parse_star_named_expr(parser)?;
        if !parser.check(TokenKind::Colon) {
            return Ok(index);
        }
        Some(Box::new(index))
    };

    parser.expect(TokenKind::Colon, "expected ':' in slice")?;
    let upper = if ends_slice_part(parser) {
        None
    } else {
        Some(Box::new(parse_expr(parser)?))
    };

    let mut step = None;
    if parser.eat(TokenKind::Colon).is_some() && !ends_slice_part(parser) {
        step = Some(Box::new(parse_expr(parser)?));
    }

    Ok(Expr::Slice {
        lower,
        upper,
        step,
        span: parser.span_from(start),
    })
}

fn ends_slice_part(parser: &Parser) -> bool {
    parser.check_any(&[TokenKind::Colon, TokenKind::Comma, TokenKind::CloseBracket])
}

/// Call arguments, from `(` through `)`.
pub fn parse_arguments(parser: &mut Parser) -> Result<Vec<Argument>, Error> {
    parser.expect(TokenKind::OpenParen, "expected '('")?;

    let mut arguments: Vec<Argument> = vec![];
    let mut seen_keyword = false;

    while !parser.check(TokenKind::CloseParen) {
        let start = parser.current_token().span.start;

        let argument = if parser.eat(TokenKind::Star).is_some() {
            let value = parse_expr(parser)?;
            Argument {
                kind: ArgumentKind::Star,
                value,
                span: parser.span_from(start),
            }
        } else if parser.eat(TokenKind::DoubleStar).is_some() {
            seen_keyword = true;
            let value = parse_expr(parser)?;
            Argument {
                kind: ArgumentKind::DoubleStar,
                value,
                span: parser.span_from(start),
            }
        } else if parser.check(TokenKind::Identifier) && parser.peek_kind(1) == TokenKind::Assignment {
            seen_keyword = true;
            let name = parser.advance();
            parser.advance();
            let value = parse_expr(parser)?;
            Argument {
                kind: ArgumentKind::Keyword(Identifier::new(name.value, name.span)),
                value,
                span: parser.span_from(start),
            }
        } else {
            let token = parser.current_token().clone();
            let mut value = parse_named_expr(parser)?;

            if starts_comprehension(parser) {
                let clauses = parse_comprehension_clauses(parser)?;
                value = Expr::GeneratorExp {
                    span: parser.span_from(start),
                    element: Box::new(value),
                    clauses,
                };
                if !arguments.is_empty() || !parser.check(TokenKind::CloseParen) {
                    return Err(Error::new(
                        ErrorImpl::Syntax {
                            message: "generator expression must be parenthesized".to_string(),
                        },
                        token,
                    ));
                }
            }

            if parser.check(TokenKind::Assignment) {
                return Err(parser.error(ErrorImpl::Syntax {
                    message: "unexpected '=' in argument".to_string(),
                }));
            }
            if seen_keyword {
                return Err(Error::new(
                    ErrorImpl::Syntax {
                        message: "positional argument follows keyword argument".to_string(),
                    },
                    token,
                ));
            }

            Argument {
                kind: ArgumentKind::Positional,
                value,
                span: parser.span_from(start),
            }
        };

        arguments.push(argument);
        if parser.eat(TokenKind::Comma).is_none() {
            break;
        }
    }

    parser.expect(TokenKind::CloseParen, "expected ')' after arguments")?;
    Ok(arguments)
}

/// `for` or `async for` at the cursor.
pub fn starts_comprehension(parser: &Parser) -> bool {
    parser.check(TokenKind::For)
        || (parser.check(TokenKind::Async) && parser.peek_kind(1) == TokenKind::For)
}

fn parse_atom(parser: &mut Parser) -> Result<Expr, Error> {
    let span = parser.current_token().span;
    let constant = |value: LiteralValue| Expr::Literal { value, span };

    match parser.current_token_kind() {
        TokenKind::Identifier => {
            let name = parser.advance();
            Ok(Expr::Name(Identifier::new(name.value, name.span)))
        }
        TokenKind::Number => {
            let token = parser.current_token().clone();
            let value = match token.literal {
                Some(Literal::Int(value)) => LiteralValue::Int(value),
                Some(Literal::Float(value)) => LiteralValue::Float(value),
                Some(Literal::Imaginary(value)) => LiteralValue::Imaginary(value),
                _ => {
                    return Err(parser.error(ErrorImpl::NumberParseError { token: token.value }))
                }
            };
            parser.advance();
            Ok(constant(value))
        }
        TokenKind::String | TokenKind::FString => parse_string_atom(parser),
        TokenKind::True => {
            parser.advance();
            Ok(constant(LiteralValue::True))
        }
        TokenKind::False => {
            parser.advance();
            Ok(constant(LiteralValue::False))
        }
        TokenKind::None => {
            parser.advance();
            Ok(constant(LiteralValue::None))
        }
        TokenKind::Ellipsis => {
            parser.advance();
            Ok(constant(LiteralValue::Ellipsis))
        }
        TokenKind::OpenParen => parse_paren_atom(parser),
        TokenKind::OpenBracket => parse_list_atom(parser),
        TokenKind::OpenCurly => parse_curly_atom(parser),
        _ => Err(parser.expected("expected expression")),
    }
}

/// `lambda [params]: body`
pub fn parse_lambda(parser: &mut Parser) -> Result<Expr, Error> {
    let lambda = parser.expect(TokenKind::Lambda, "expected 'lambda'")?;
    let parameters = parse_parameters(parser, ParamStyle::Lambda)?;
    parser.expect(TokenKind::Colon, "expected ':' after lambda parameters")?;
    let body = parse_expr(parser)?;

    Ok(Expr::Lambda {
        span: lambda.span.to(body.get_span()),
        parameters,
        body: Box::new(body),
    })
}

/// `yield [star_expressions]` or `yield from expression`.
pub fn parse_yield_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let start = parser.expect(TokenKind::Yield, "expected 'yield'")?.span.start;

    if parser.eat(TokenKind::From).is_some() {
        let value = parse_expr(parser)?;
        return Ok(Expr::Yield {
            span: Span::new(start, value.get_span().end),
            value: Some(Box::new(value)),
            is_from: true,
        });
    }

    let value = if can_start_expression(parser.current_token_kind()) {
        Some(Box::new(parse_star_expressions(parser)?))
    } else {
        None
    };

    Ok(Expr::Yield {
        value,
        is_from: false,
        span: parser.span_from(start),
    })
}
