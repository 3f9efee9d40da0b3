use crate::{
    ast::{
        ast::Identifier,
        statements::{Stmt, TypeParam, TypeParamKind},
    },
    errors::errors::Error,
    lexer::tokens::TokenKind,
};

use super::{expr::parse_expr, parser::Parser};

/// `[T, *Ts, **P, U: bound = default]` after a def, class, view or type
/// alias name. Returns an empty list when no `[` follows.
pub fn parse_type_params(parser: &mut Parser) -> Result<Vec<TypeParam>, Error> {
    if parser.eat(TokenKind::OpenBracket).is_none() {
        return Ok(vec![]);
    }

    let mut params = vec![];
    while !parser.check(TokenKind::CloseBracket) {
        params.push(parse_type_param(parser)?);
        if parser.eat(TokenKind::Comma).is_none() {
            break;
        }
    }

    if params.is_empty() {
        return Err(parser.expected("expected type parameter"));
    }
    parser.expect(TokenKind::CloseBracket, "expected ']' after type parameters")?;
    Ok(params)
}

fn parse_type_param(parser: &mut Parser) -> Result<TypeParam, Error> {
    let start = parser.current_token().span.start;
    let kind = if parser.eat(TokenKind::Star).is_some() {
        TypeParamKind::TypeVarTuple
    } else if parser.eat(TokenKind::DoubleStar).is_some() {
        TypeParamKind::ParamSpec
    } else {
        TypeParamKind::TypeVar
    };

    let name = parser.expect(TokenKind::Identifier, "expected type parameter name")?;

    let bound = if kind == TypeParamKind::TypeVar && parser.eat(TokenKind::Colon).is_some() {
        Some(parse_expr(parser)?)
    } else {
        None
    };
    let default = if parser.eat(TokenKind::Assignment).is_some() {
        Some(parse_expr(parser)?)
    } else {
        None
    };

    Ok(TypeParam {
        name: Identifier::new(name.value, name.span),
        kind,
        bound,
        default,
        span: parser.span_from(start),
    })
}

/// `type Name[params] = value`; the caller has checked the soft keyword.
pub fn parse_type_alias(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.start;
    let name = parser.expect(TokenKind::Identifier, "expected type alias name")?;
    let type_params = parse_type_params(parser)?;
    parser.expect(TokenKind::Assignment, "expected '=' in type alias")?;
    let value = parse_expr(parser)?;

    Ok(Stmt::TypeAlias {
        name: Identifier::new(name.value, name.span),
        type_params,
        value,
        span: parser.span_from(start),
    })
}
