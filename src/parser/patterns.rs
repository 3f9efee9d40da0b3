//! `case` patterns.

use crate::{
    ast::{
        ast::{BinaryOp, Identifier, UnaryOp},
        expressions::{Expr, LiteralValue},
        patterns::{KeywordPattern, MappingItem, Pattern},
    },
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::{Literal, TokenKind},
    Span,
};

use super::{fstring::parse_string_atom, parser::Parser};

/// The pattern of a `case` clause. A top-level comma makes an
/// unparenthesized tuple pattern.
pub fn parse_case_pattern(parser: &mut Parser) -> Result<Pattern, Error> {
    let start = parser.current_token().span.start;
    let first = parse_maybe_star_pattern(parser)?;
    if !parser.check(TokenKind::Comma) {
        if matches!(first, Pattern::Star { .. }) {
            return Err(parser.expected("expected ',' after star pattern"));
        }
        return Ok(first);
    }

    let mut patterns = vec![first];
    while parser.eat(TokenKind::Comma).is_some() {
        if parser.check_any(&[TokenKind::Colon, TokenKind::If]) {
            break;
        }
        patterns.push(parse_maybe_star_pattern(parser)?);
    }

    Ok(Pattern::Sequence {
        patterns,
        is_tuple: true,
        span: parser.span_from(start),
    })
}

fn parse_maybe_star_pattern(parser: &mut Parser) -> Result<Pattern, Error> {
    let Some(star) = parser.eat(TokenKind::Star) else {
        return parse_pattern(parser);
    };

    let name = parser.expect(TokenKind::Identifier, "expected name after '*'")?;
    Ok(Pattern::Star {
        span: star.span.to(name.span),
        name: (name.value != "_").then(|| Identifier::new(name.value, name.span)),
    })
}

/// `or_pattern ['as' NAME]`
pub fn parse_pattern(parser: &mut Parser) -> Result<Pattern, Error> {
    parser.nested(|parser| {
        let pattern = parse_or_pattern(parser)?;
        if parser.eat(TokenKind::As).is_none() {
            return Ok(pattern);
        }

        let name = parser.expect(TokenKind::Identifier, "expected name after 'as'")?;
        if name.value == "_" {
            return Err(Error::new(
                ErrorImpl::InvalidTarget {
                    message: "cannot use '_' as a target".to_string(),
                },
                name,
            ));
        }

        Ok(Pattern::As {
            span: pattern.get_span().to(name.span),
            pattern: Box::new(pattern),
            name: Identifier::new(name.value, name.span),
        })
    })
}

fn parse_or_pattern(parser: &mut Parser) -> Result<Pattern, Error> {
    let first = parse_closed_pattern(parser)?;
    if !parser.check(TokenKind::Pipe) {
        return Ok(first);
    }

    let start = first.get_span().start;
    let mut patterns = vec![first];
    while parser.eat(TokenKind::Pipe).is_some() {
        patterns.push(parse_closed_pattern(parser)?);
    }

    Ok(Pattern::Or {
        patterns,
        span: parser.span_from(start),
    })
}

fn parse_closed_pattern(parser: &mut Parser) -> Result<Pattern, Error> {
    match parser.current_token_kind() {
        TokenKind::Number | TokenKind::Dash => {
            let value = parse_signed_number(parser)?;
            Ok(Pattern::Literal {
                span: value.get_span(),
                value,
            })
        }
        TokenKind::String | TokenKind::FString => {
            let value = parse_string_atom(parser)?;
            Ok(Pattern::Literal {
                span: value.get_span(),
                value,
            })
        }
        TokenKind::None | TokenKind::True | TokenKind::False => {
            let token = parser.advance();
            let value = match token.kind {
                TokenKind::None => LiteralValue::None,
                TokenKind::True => LiteralValue::True,
                _ => LiteralValue::False,
            };
            Ok(Pattern::Literal {
                value: Expr::Literal {
                    value,
                    span: token.span,
                },
                span: token.span,
            })
        }
        TokenKind::Identifier => parse_name_pattern(parser),
        TokenKind::OpenParen | TokenKind::OpenBracket => parse_sequence_pattern(parser),
        TokenKind::OpenCurly => parse_mapping_pattern(parser),
        _ => Err(parser.expected("expected pattern")),
    }
}

fn number_literal(parser: &Parser) -> Result<Expr, Error> {
    let token = parser.current_token();
    let value = match token.literal {
        Some(Literal::Int(value)) => LiteralValue::Int(value),
        Some(Literal::Float(value)) => LiteralValue::Float(value),
        Some(Literal::Imaginary(value)) => LiteralValue::Imaginary(value),
        _ => return Err(parser.expected("expected number")),
    };
    Ok(Expr::Literal {
        value,
        span: token.span,
    })
}

/// `[-]number [(+|-) imaginary]`
fn parse_signed_number(parser: &mut Parser) -> Result<Expr, Error> {
    let minus = parser.eat(TokenKind::Dash);
    let mut value = number_literal(parser)?;
    parser.advance();

    if let Some(minus) = minus {
        value = Expr::Unary {
            span: minus.span.to(value.get_span()),
            op: UnaryOp::Negate,
            operand: Box::new(value),
        };
    }

    let op = match parser.current_token_kind() {
        TokenKind::Plus => BinaryOp::Add,
        TokenKind::Dash => BinaryOp::Subtract,
        _ => return Ok(value),
    };
    parser.advance();

    let imaginary = number_literal(parser)?;
    if !matches!(
        imaginary,
        Expr::Literal {
            value: LiteralValue::Imaginary(_),
            ..
        }
    ) {
        return Err(parser.expected("expected imaginary number in complex literal pattern"));
    }
    parser.advance();

    Ok(Expr::Binary {
        span: value.get_span().to(imaginary.get_span()),
        left: Box::new(value),
        op,
        right: Box::new(imaginary),
    })
}

/// Capture, wildcard, dotted value or class pattern.
fn parse_name_pattern(parser: &mut Parser) -> Result<Pattern, Error> {
    let first = parser.advance();
    let mut value = Expr::Name(Identifier::new(first.value.clone(), first.span));
    let mut dotted = false;

    while parser.eat(TokenKind::Dot).is_some() {
        let attr = parser.expect(TokenKind::Identifier, "expected identifier after '.'")?;
        value = Expr::Attribute {
            span: value.get_span().to(attr.span),
            value: Box::new(value),
            attr: Identifier::new(attr.value, attr.span),
        };
        dotted = true;
    }

    if parser.check(TokenKind::OpenParen) {
        return parse_class_pattern(parser, value);
    }

    if dotted {
        return Ok(Pattern::Value {
            span: value.get_span(),
            value,
        });
    }

    if first.value == "_" {
        return Ok(Pattern::Wildcard { span: first.span });
    }
    Ok(Pattern::Capture(Identifier::new(first.value, first.span)))
}

/// `Cls(p1, p2, key=p3)`; positional patterns must come first.
fn parse_class_pattern(parser: &mut Parser, cls: Expr) -> Result<Pattern, Error> {
    parser.expect(TokenKind::OpenParen, "expected '('")?;

    let mut patterns = vec![];
    let mut keywords: Vec<KeywordPattern> = vec![];

    while !parser.check(TokenKind::CloseParen) {
        if parser.check(TokenKind::Identifier) && parser.peek_kind(1) == TokenKind::Assignment {
            let name = parser.advance();
            parser.advance();
            let pattern = parse_pattern(parser)?;
            keywords.push(KeywordPattern {
                span: name.span.to(pattern.get_span()),
                name: Identifier::new(name.value, name.span),
                pattern,
            });
        } else {
            if !keywords.is_empty() {
                return Err(parser.error(ErrorImpl::Syntax {
                    message: "positional patterns follow keyword patterns".to_string(),
                }));
            }
            patterns.push(parse_pattern(parser)?);
        }

        if parser.eat(TokenKind::Comma).is_none() {
            break;
        }
    }

    parser.expect(TokenKind::CloseParen, "expected ')' after class pattern arguments")?;
    let start = cls.get_span().start;
    Ok(Pattern::Class {
        cls,
        patterns,
        keywords,
        span: parser.span_from(start),
    })
}

/// `(p)`, `(p,)`, `()`, `[p, *rest]`
fn parse_sequence_pattern(parser: &mut Parser) -> Result<Pattern, Error> {
    let open = parser.advance();
    let is_tuple = open.kind == TokenKind::OpenParen;
    let (close, message) = if is_tuple {
        (TokenKind::CloseParen, "expected ')'")
    } else {
        (TokenKind::CloseBracket, "expected ']'")
    };

    let mut patterns = vec![];
    let mut had_comma = false;
    while !parser.check(close) {
        patterns.push(parse_maybe_star_pattern(parser)?);
        if parser.eat(TokenKind::Comma).is_none() {
            break;
        }
        had_comma = true;
    }
    parser.expect(close, message)?;
    let span = Span::new(open.span.start, parser.previous_end());

    if is_tuple && patterns.len() == 1 && !had_comma {
        let pattern = patterns.remove(0);
        if matches!(pattern, Pattern::Star { .. }) {
            return Err(Error::new(ErrorImpl::StarredInGroup, open));
        }
        return Ok(Pattern::Group {
            pattern: Box::new(pattern),
            span,
        });
    }

    Ok(Pattern::Sequence {
        patterns,
        is_tuple,
        span,
    })
}

/// `{key: pattern, ..., **rest}`
fn parse_mapping_pattern(parser: &mut Parser) -> Result<Pattern, Error> {
    let start = parser.advance().span.start;
    let mut items = vec![];
    let mut rest = None;

    while !parser.check(TokenKind::CloseCurly) {
        if parser.eat(TokenKind::DoubleStar).is_some() {
            let name = parser.expect(TokenKind::Identifier, "expected name after '**'")?;
            rest = Some(Identifier::new(name.value, name.span));
            parser.eat(TokenKind::Comma);
            break;
        }

        let key = parse_mapping_key(parser)?;
        parser.expect(TokenKind::Colon, "expected ':' after mapping pattern key")?;
        let pattern = parse_pattern(parser)?;
        items.push(MappingItem { key, pattern });

        if parser.eat(TokenKind::Comma).is_none() {
            break;
        }
    }

    parser.expect(TokenKind::CloseCurly, "expected '}' after mapping pattern")?;
    Ok(Pattern::Mapping {
        items,
        rest,
        span: parser.span_from(start),
    })
}

/// Literal or dotted-name keys only.
fn parse_mapping_key(parser: &mut Parser) -> Result<Expr, Error> {
    match parser.current_token_kind() {
        TokenKind::Number | TokenKind::Dash => parse_signed_number(parser),
        TokenKind::String | TokenKind::FString => parse_string_atom(parser),
        TokenKind::None | TokenKind::True | TokenKind::False => {
            let token = parser.advance();
            let value = match token.kind {
                TokenKind::None => LiteralValue::None,
                TokenKind::True => LiteralValue::True,
                _ => LiteralValue::False,
            };
            Ok(Expr::Literal {
                value,
                span: token.span,
            })
        }
        TokenKind::Identifier => {
            let first = parser.advance();
            let mut value = Expr::Name(Identifier::new(first.value, first.span));
            let mut dotted = false;
            while parser.eat(TokenKind::Dot).is_some() {
                let attr = parser.expect(TokenKind::Identifier, "expected identifier after '.'")?;
                value = Expr::Attribute {
                    span: value.get_span().to(attr.span),
                    value: Box::new(value),
                    attr: Identifier::new(attr.value, attr.span),
                };
                dotted = true;
            }
            if !dotted {
                return Err(Error::new(
                    ErrorImpl::Syntax {
                        message: "mapping pattern keys may only match literals and attribute lookups"
                            .to_string(),
                    },
                    parser.token_at(value.get_span().start),
                ));
            }
            Ok(value)
        }
        _ => Err(parser.expected("expected mapping pattern key")),
    }
}
