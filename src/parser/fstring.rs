//! String atoms and templates.
//!
//! Adjacent string tokens are concatenated into one atom. F-string bodies
//! and interpolated attribute values share one template scanner: literal
//! runs become `FStringPart::Literal`, and each `{...}` run is lexed and
//! parsed by an independent sub-parser whose errors are re-anchored on the
//! enclosing string token.

use tracing::trace;

use crate::{
    ast::expressions::{Expr, FStringPart, LiteralValue},
    errors::errors::{Error, ErrorImpl},
    lexer::{
        lexer::{decode_escapes, tokenize_expression},
        tokens::{Literal, Token, TokenKind},
    },
    Position, Span,
};

use super::parser::{parse_expression, Parser};

/// Which template dialect is being scanned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateKind {
    /// An f-string body; fields may carry `=`, `!conv` and `:spec`.
    FString { raw: bool },
    /// An HTML attribute value; fields are bare expressions.
    Attribute,
}

enum Problem {
    Unclosed,
    StrayClose,
    Empty,
    Other(String),
}

fn template_error(anchor: &Token, kind: TemplateKind, problem: Problem) -> Error {
    let error = match (kind, problem) {
        (TemplateKind::Attribute, Problem::Unclosed) => ErrorImpl::UnmatchedBrace { brace: '{' },
        (TemplateKind::Attribute, Problem::StrayClose) => ErrorImpl::UnmatchedBrace { brace: '}' },
        (TemplateKind::Attribute, Problem::Empty) => ErrorImpl::InvalidInterpolation {
            message: "empty expression".to_string(),
        },
        (TemplateKind::Attribute, Problem::Other(message)) => {
            ErrorImpl::InvalidInterpolation { message }
        }
        (TemplateKind::FString { .. }, problem) => ErrorImpl::Syntax {
            message: match problem {
                Problem::Unclosed => "f-string: expecting '}'".to_string(),
                Problem::StrayClose => "f-string: single '}' is not allowed".to_string(),
                Problem::Empty => "f-string: empty expression not allowed".to_string(),
                Problem::Other(message) => format!("f-string: {message}"),
            },
        },
    };
    Error::new(error, anchor.clone())
}

/// One or more adjacent String/FString tokens.
pub fn parse_string_atom(parser: &mut Parser) -> Result<Expr, Error> {
    let start = parser.current_token().span.start;

    let mut parts: Vec<FStringPart> = vec![];
    let mut bytes: Option<Vec<u8>> = None;
    let mut has_text = false;
    let mut is_fstring = false;

    while parser.check_any(&[TokenKind::String, TokenKind::FString]) {
        let token = parser.advance();
        let mixed = match &token.literal {
            Some(Literal::Bytes(_)) => has_text,
            _ => bytes.is_some(),
        };
        if mixed {
            return Err(Error::new(
                ErrorImpl::Syntax {
                    message: "cannot mix bytes and nonbytes literals".to_string(),
                },
                token,
            ));
        }

        match (&token.kind, &token.literal) {
            (TokenKind::FString, Some(Literal::Str(body))) => {
                has_text = true;
                is_fstring = true;
                let (raw, origin) = fstring_body_origin(&token);
                let body_parts =
                    parse_template(parser, &token, body, origin, TemplateKind::FString { raw })?;
                for part in body_parts {
                    push_part(&mut parts, part);
                }
            }
            (_, Some(Literal::Bytes(value))) => {
                bytes.get_or_insert_with(Vec::new).extend_from_slice(value);
            }
            (_, Some(Literal::Str(value))) => {
                has_text = true;
                push_part(
                    &mut parts,
                    FStringPart::Literal {
                        value: value.clone(),
                        span: token.span,
                    },
                );
            }
            _ => return Err(parser.expected("expected string")),
        }
    }

    let span = parser.span_from(start);
    if let Some(bytes) = bytes {
        return Ok(Expr::Literal {
            value: LiteralValue::Bytes(bytes),
            span,
        });
    }

    if is_fstring {
        return Ok(Expr::FString { parts, span });
    }

    let text = parts
        .into_iter()
        .map(|part| match part {
            FStringPart::Literal { value, .. } => value,
            FStringPart::Field { .. } => String::new(),
        })
        .collect();
    Ok(Expr::Literal {
        value: LiteralValue::Str(text),
        span,
    })
}

/// Appends a part, merging adjacent literal text.
fn push_part(parts: &mut Vec<FStringPart>, part: FStringPart) {
    if let (
        Some(FStringPart::Literal {
            value: previous,
            span: previous_span,
        }),
        FStringPart::Literal { value, span },
    ) = (parts.last_mut(), &part)
    {
        previous.push_str(value);
        *previous_span = previous_span.to(*span);
        return;
    }
    parts.push(part);
}

/// Whether the f-string is raw, and where its body starts.
fn fstring_body_origin(token: &Token) -> (bool, Position) {
    let prefix_len = token
        .value
        .find(|c: char| c == '"' || c == '\'')
        .unwrap_or(0);
    let prefix = &token.value[..prefix_len];
    let rest = &token.value[prefix_len..];
    let quote_len = if rest.starts_with("\"\"\"") || rest.starts_with("'''") {
        3
    } else {
        1
    };
    let opening = &token.value[..(prefix_len + quote_len).min(token.value.len())];

    (
        prefix.contains(|c: char| c == 'r' || c == 'R'),
        token.span.start.advanced_by(opening),
    )
}

/// Scans a template body into literal and field parts.
pub fn parse_template(
    parser: &mut Parser,
    anchor: &Token,
    body: &str,
    origin: Position,
    kind: TemplateKind,
) -> Result<Vec<FStringPart>, Error> {
    let raw = matches!(kind, TemplateKind::FString { raw: true });
    let at = |index: usize| origin.advanced_by(&body[..index]);

    let mut parts = vec![];
    let mut literal = String::new();
    let mut literal_start = 0;
    let mut index = 0;

    while let Some(ch) = body[index..].chars().next() {
        match ch {
            '{' if body[index + 1..].starts_with('{') => {
                literal.push('{');
                index += 2;
            }
            '}' if body[index + 1..].starts_with('}') => {
                literal.push('}');
                index += 2;
            }
            '}' => return Err(template_error(anchor, kind, Problem::StrayClose)),
            '{' => {
                let literal_span = Span::new(at(literal_start), at(index));
                flush_literal(anchor, kind, raw, &mut parts, &mut literal, literal_span)?;

                let Some(close) = find_closing_brace(body, index) else {
                    return Err(template_error(anchor, kind, Problem::Unclosed));
                };
                let inner = &body[index + 1..close];
                let span = Span::new(at(index), at(close + 1));
                parts.push(parse_field(parser, anchor, inner, at(index + 1), span, kind)?);

                index = close + 1;
                literal_start = index;
            }
            _ => {
                literal.push(ch);
                index += ch.len_utf8();
            }
        }
    }

    let literal_span = Span::new(at(literal_start), at(index));
    flush_literal(anchor, kind, raw, &mut parts, &mut literal, literal_span)?;
    Ok(parts)
}

fn flush_literal(
    anchor: &Token,
    kind: TemplateKind,
    raw: bool,
    parts: &mut Vec<FStringPart>,
    literal: &mut String,
    span: Span,
) -> Result<(), Error> {
    if literal.is_empty() {
        return Ok(());
    }

    let text = std::mem::take(literal);
    let value = if raw {
        text
    } else {
        decode_escapes(&text).map_err(|sequence| {
            let message = format!("invalid escape sequence {sequence:?}");
            template_error(anchor, kind, Problem::Other(message))
        })?
    };
    parts.push(FStringPart::Literal { value, span });
    Ok(())
}

/// Index of the `}` closing the field opened at `open`, skipping nested
/// brackets and quoted strings.
pub fn find_closing_brace(body: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut chars = body[open + 1..].char_indices();

    while let Some((offset, ch)) = chars.next() {
        if let Some(q) = quote {
            if ch == '\\' {
                chars.next();
            } else if ch == q {
                quote = None;
            }
            continue;
        }

        match ch {
            '\'' | '"' => quote = Some(ch),
            '(' | '[' | '{' => depth += 1,
            ')' | ']' => depth = depth.saturating_sub(1),
            '}' if depth == 0 => return Some(open + 1 + offset),
            '}' => depth -= 1,
            _ => {}
        }
    }
    None
}

/// Splits `expr!conv:spec` at the first top-level `!` (not `!=`) or `:`.
fn split_field(inner: &str) -> (&str, &str) {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut chars = inner.char_indices().peekable();

    while let Some((index, ch)) = chars.next() {
        if let Some(q) = quote {
            if ch == q {
                quote = None;
            }
            continue;
        }

        match ch {
            '\'' | '"' => quote = Some(ch),
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth = depth.saturating_sub(1),
            '!' if depth == 0 && chars.peek().map(|(_, next)| *next) != Some('=') => {
                return (&inner[..index], &inner[index..]);
            }
            ':' if depth == 0 => return (&inner[..index], &inner[index..]),
            _ => {}
        }
    }
    (inner, "")
}

fn parse_field(
    parser: &mut Parser,
    anchor: &Token,
    inner: &str,
    origin: Position,
    span: Span,
    kind: TemplateKind,
) -> Result<FStringPart, Error> {
    let (expression, mut rest) = match kind {
        TemplateKind::Attribute => (inner, ""),
        TemplateKind::FString { .. } => split_field(inner),
    };

    let trimmed = expression.trim_end();
    let debug = matches!(kind, TemplateKind::FString { .. })
        && trimmed.ends_with('=')
        && !["==", "!=", "<=", ">="].iter().any(|op| trimmed.ends_with(op));
    let expression = if debug {
        &trimmed[..trimmed.len() - 1]
    } else {
        expression
    };

    if expression.trim().is_empty() {
        return Err(template_error(anchor, kind, Problem::Empty));
    }

    let mut conversion = None;
    if let Some(after) = rest.strip_prefix('!') {
        let mut chars = after.chars();
        match chars.next() {
            Some(c @ ('s' | 'r' | 'a')) => conversion = Some(c),
            _ => {
                return Err(template_error(
                    anchor,
                    kind,
                    Problem::Other("invalid conversion character".to_string()),
                ))
            }
        }
        rest = chars.as_str();
    }

    let mut format_spec = vec![];
    if let Some(spec) = rest.strip_prefix(':') {
        let spec_origin = origin.advanced_by(&inner[..inner.len() - spec.len()]);
        format_spec = parse_template(parser, anchor, spec, spec_origin, kind)?;
    } else if !rest.is_empty() {
        return Err(template_error(anchor, kind, Problem::Unclosed));
    }

    let expr = parse_embedded_expression(parser, anchor, expression, origin, kind)?;
    Ok(FStringPart::Field {
        expr: Box::new(expr),
        debug,
        conversion,
        format_spec,
        span,
    })
}

/// Lexes and parses `text` with a fresh parser. The sub-parse inherits the
/// remaining depth budget; its errors are re-anchored on `anchor`.
pub fn parse_embedded_expression(
    parser: &Parser,
    anchor: &Token,
    text: &str,
    origin: Position,
    kind: TemplateKind,
) -> Result<Expr, Error> {
    trace!(%origin, text, "parsing embedded expression");

    let remap = |error: Error| match error.get_impl() {
        ErrorImpl::MaxDepthExceeded { .. } => Error::new(error.get_impl().clone(), anchor.clone()),
        _ => template_error(anchor, kind, Problem::Other(error.message())),
    };

    let tokens = tokenize_expression(text, None, origin).map_err(remap)?;
    let options = parser.options().with_max_depth(parser.remaining_depth());
    parse_expression(&tokens, options).map_err(remap)
}
