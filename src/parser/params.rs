use crate::{
    ast::{
        ast::Identifier,
        expressions::{Parameter, ParameterKind, ParameterList},
    },
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::{Token, TokenKind},
    Span,
};

use super::{expr::parse_expr, parser::Parser};

/// `def`/`view` parameters may be annotated and end at `)`; lambda
/// parameters may not and end at `:`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamStyle {
    Function,
    Lambda,
}

impl ParamStyle {
    fn terminator(self) -> TokenKind {
        match self {
            ParamStyle::Function => TokenKind::CloseParen,
            ParamStyle::Lambda => TokenKind::Colon,
        }
    }
}

fn invalid(token: Token, message: &str) -> Error {
    Error::new(
        ErrorImpl::InvalidParameters {
            message: message.to_string(),
        },
        token,
    )
}

/// Parses a parameter list up to (not including) its terminator.
pub fn parse_parameters(parser: &mut Parser, style: ParamStyle) -> Result<ParameterList, Error> {
    let terminator = style.terminator();
    let start = parser.current_token().span.start;
    let first = parser.position();

    let mut parameters: Vec<Parameter> = vec![];
    let mut slash_index = None;
    let mut keyword_only_marker = None;
    let mut seen_star = false;
    let mut seen_double_star = false;
    let mut seen_default = false;

    while !parser.check(terminator) {
        let token = parser.current_token().clone();

        if seen_double_star {
            return Err(invalid(token, "'**' parameter must be last"));
        }

        match token.kind {
            TokenKind::Slash => {
                if slash_index.is_some() {
                    return Err(invalid(token, "multiple '/'"));
                }
                if seen_star {
                    return Err(invalid(token, "'/' after *args"));
                }
                if parameters.is_empty() {
                    return Err(invalid(token, "'/' without preceding parameters"));
                }
                parser.advance();
                slash_index = Some(parameters.len());
            }
            TokenKind::Star => {
                if seen_star {
                    return Err(invalid(token, "multiple '*'"));
                }
                seen_star = true;
                parser.advance();

                if parser.check(TokenKind::Identifier) {
                    parameters.push(parse_parameter(parser, style, ParameterKind::VarPositional)?);
                } else {
                    let next = parser.peek_kind(1);
                    let ends_list = parser.check(terminator)
                        || (parser.check(TokenKind::Comma)
                            && (next == terminator || next == TokenKind::DoubleStar));
                    if ends_list {
                        return Err(invalid(token, "named arguments must follow bare *"));
                    }
                    keyword_only_marker = Some(parameters.len());
                }
            }
            TokenKind::DoubleStar => {
                parser.advance();
                parameters.push(parse_parameter(parser, style, ParameterKind::VarKeyword)?);
                seen_double_star = true;
            }
            TokenKind::Identifier => {
                let parameter = parse_parameter(parser, style, ParameterKind::Normal)?;
                if parameter.default.is_some() {
                    seen_default = true;
                } else if seen_default && !seen_star {
                    return Err(invalid(token, "non-default parameter follows default parameter"));
                }
                parameters.push(parameter);
            }
            _ => return Err(invalid(token, "expected parameter name")),
        }

        if parser.eat(TokenKind::Comma).is_none() {
            break;
        }
    }

    let span = if parser.position() == first {
        Span::new(start, start)
    } else {
        parser.span_from(start)
    };

    Ok(ParameterList {
        parameters,
        slash_index,
        keyword_only_marker,
        span,
    })
}

/// `name [: annotation] [= default]`; stars were consumed by the caller.
fn parse_parameter(
    parser: &mut Parser,
    style: ParamStyle,
    kind: ParameterKind,
) -> Result<Parameter, Error> {
    let name = parser.expect(TokenKind::Identifier, "expected parameter name")?;

    let annotation = if style == ParamStyle::Function && parser.eat(TokenKind::Colon).is_some() {
        Some(parse_expr(parser)?)
    } else {
        None
    };

    let default = if kind == ParameterKind::Normal && parser.eat(TokenKind::Assignment).is_some() {
        Some(parse_expr(parser)?)
    } else {
        None
    };

    let start = name.span.start;
    Ok(Parameter {
        name: Identifier::new(name.value, name.span),
        annotation,
        default,
        kind,
        span: parser.span_from(start),
    })
}
