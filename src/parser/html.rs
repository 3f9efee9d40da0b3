//! HTML elements inside view bodies.

use tracing::trace;

use crate::{
    ast::{
        ast::Identifier,
        expressions::{Expr, LiteralValue},
        html::{ElementKind, HtmlAttribute, HtmlContentPart, HtmlElement},
        statements::Stmt,
    },
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::{Literal, Token, TokenKind},
    Span,
};

use super::{
    block::BlockFlavor,
    expr::parse_named_expr,
    fstring::{parse_template, TemplateKind},
    parser::Parser,
    stmt::parse_stmt,
};

/// `<name attrs>content</name>` or `<name attrs />`. The NEWLINE after the
/// element is left for the caller.
pub fn parse_html_element(parser: &mut Parser) -> Result<HtmlElement, Error> {
    parser.nested(|parser| {
        let start = parser.expect(TokenKind::TagOpen, "expected '<'")?.span.start;
        let name = parser.expect(TokenKind::Identifier, "expected tag name")?;
        let tag_name = Identifier::new(name.value.clone(), name.span);

        let mut attributes = vec![];
        while parser.check_any(&[TokenKind::Identifier, TokenKind::True, TokenKind::False]) {
            attributes.push(parse_attribute(parser)?);
        }

        if parser.eat(TokenKind::TagSelfClose).is_some() {
            return Ok(HtmlElement {
                tag_name,
                attributes,
                content: vec![],
                kind: ElementKind::SelfClosing,
                closing_tag: None,
                span: parser.span_from(start),
            });
        }
        parser.expect(TokenKind::TagClose, "expected '>' or '/>'")?;
        trace!(tag = %tag_name.name, "parsing element content");

        let mut content = vec![];
        let mut kind = ElementKind::SingleLine;

        if is_content_start(parser.current_token_kind()) {
            parse_inline_content(parser, &mut content)?;
        }

        if parser.check(TokenKind::Newline) {
            match parser.peek_kind(1) {
                TokenKind::Indent => {
                    parser.advance();
                    parse_multiline_body(parser, &mut content)?;
                    kind = ElementKind::Multiline;
                }
                TokenKind::TagCloseStart => {
                    parser.advance();
                }
                _ => {}
            }
        }

        let closing_tag = parse_closing_tag(parser, &name)?;
        Ok(HtmlElement {
            tag_name,
            attributes,
            content: merge_adjacent_content(content),
            kind,
            closing_tag: Some(closing_tag),
            span: parser.span_from(start),
        })
    })
}

fn is_content_start(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::HtmlText | TokenKind::HtmlInterpolationStart | TokenKind::TagOpen
    )
}

/// `name` or `name=value`.
fn parse_attribute(parser: &mut Parser) -> Result<HtmlAttribute, Error> {
    let name = parser.advance();
    let start = name.span.start;
    let name = Identifier::new(name.value, name.span);

    if parser.eat(TokenKind::Assignment).is_none() {
        return Ok(HtmlAttribute {
            span: name.span,
            name,
            value: None,
        });
    }

    let token = parser.current_token().clone();
    let value = match token.kind {
        TokenKind::String => {
            parser.advance();
            parse_attribute_string(parser, &token)?
        }
        TokenKind::Number => {
            parser.advance();
            let value = match token.literal {
                Some(Literal::Int(value)) => LiteralValue::Int(value),
                Some(Literal::Float(value)) => LiteralValue::Float(value),
                _ => return Err(Error::new(ErrorImpl::NumberParseError { token: token.value.clone() }, token)),
            };
            Expr::Literal {
                value,
                span: token.span,
            }
        }
        TokenKind::True | TokenKind::False => {
            parser.advance();
            let value = if token.kind == TokenKind::True {
                LiteralValue::True
            } else {
                LiteralValue::False
            };
            Expr::Literal {
                value,
                span: token.span,
            }
        }
        TokenKind::HtmlInterpolationStart => parse_interpolation(parser)?.0,
        _ => {
            return Err(parser.expected(
                "expected string, number, boolean, or expression for attribute value",
            ))
        }
    };

    Ok(HtmlAttribute {
        name,
        value: Some(value),
        span: parser.span_from(start),
    })
}

/// True when `body` holds an unescaped `{` closed by a later `}`. Any other
/// brace is literal text.
fn contains_interpolation(body: &str) -> bool {
    let mut chars = body.chars().peekable();
    let mut in_braces = false;
    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
            }
            '{' => in_braces = true,
            '}' if in_braces => return true,
            _ => {}
        }
    }
    false
}

/// A quoted attribute value. Values with a `{...}` run become f-strings.
fn parse_attribute_string(parser: &mut Parser, token: &Token) -> Result<Expr, Error> {
    let quote_len = token.value.chars().next().map_or(0, char::len_utf8);
    let raw_body = token
        .value
        .get(quote_len..token.value.len().saturating_sub(quote_len))
        .unwrap_or_default();

    if !contains_interpolation(raw_body) {
        let text = match &token.literal {
            Some(Literal::Str(text)) => text.clone(),
            _ => raw_body.to_string(),
        };
        return Ok(Expr::Literal {
            value: LiteralValue::Str(text),
            span: token.span,
        });
    }

    trace!(value = %token.value, "interpolating attribute value");
    let origin = token.span.start.advanced_by(&token.value[..quote_len]);
    let parts = parse_template(parser, token, raw_body, origin, TemplateKind::Attribute)?;
    Ok(Expr::FString {
        parts,
        span: token.span,
    })
}

/// `{expr}` in content or an attribute. Returns the expression and the span
/// including the braces.
fn parse_interpolation(parser: &mut Parser) -> Result<(Expr, Span), Error> {
    let start = parser
        .expect(TokenKind::HtmlInterpolationStart, "expected '{'")?
        .span
        .start;
    let expr = parse_named_expr(parser)?;
    parser.expect(TokenKind::HtmlInterpolationEnd, "expected '}' after interpolation")?;
    Ok((expr, parser.span_from(start)))
}

/// A run of text and interpolations, up to a tag or the end of the line.
fn parse_content_parts(parser: &mut Parser) -> Result<Vec<HtmlContentPart>, Error> {
    let mut parts = vec![];
    loop {
        match parser.current_token_kind() {
            TokenKind::HtmlText => {
                let token = parser.advance();
                let text = match token.literal {
                    Some(Literal::Str(text)) => text,
                    _ => token.value,
                };
                parts.push(HtmlContentPart::Text {
                    text,
                    span: token.span,
                });
            }
            TokenKind::HtmlInterpolationStart => {
                let (expr, span) = parse_interpolation(parser)?;
                parts.push(HtmlContentPart::Interpolation { expr, span });
            }
            _ => return Ok(parts),
        }
    }
}

fn content_stmt(parts: Vec<HtmlContentPart>) -> Option<Stmt> {
    let first = parts.first()?.get_span();
    let last = parts.last()?.get_span();
    Some(Stmt::HtmlContent {
        span: first.to(last),
        parts,
    })
}

/// Text, interpolations and nested elements on the opening tag's line.
fn parse_inline_content(parser: &mut Parser, content: &mut Vec<Stmt>) -> Result<(), Error> {
    loop {
        match parser.current_token_kind() {
            TokenKind::HtmlText | TokenKind::HtmlInterpolationStart => {
                let parts = parse_content_parts(parser)?;
                content.extend(content_stmt(parts));
            }
            TokenKind::TagOpen => {
                content.push(Stmt::Html(parse_html_element(parser)?));
            }
            _ => return Ok(()),
        }
    }
}

/// A content line inside an element body (or a block nested in one).
pub fn parse_content_line(parser: &mut Parser) -> Result<Stmt, Error> {
    let parts = parse_content_parts(parser)?;
    let Some(stmt) = content_stmt(parts) else {
        return Err(parser.expected("expected HTML content"));
    };
    parser.eat(TokenKind::Newline);
    Ok(stmt)
}

/// NEWLINE was consumed; reads INDENT statements DEDENT.
fn parse_multiline_body(parser: &mut Parser, content: &mut Vec<Stmt>) -> Result<(), Error> {
    parser.expect(TokenKind::Indent, "expected indented element content")?;

    parser.skip_newlines();
    while !parser.check_any(&[TokenKind::Dedent, TokenKind::EOF]) {
        content.push(parse_stmt(parser, BlockFlavor::HTML_CONTENT)?);
        parser.skip_newlines();
    }
    parser.eat(TokenKind::Dedent);
    parser.skip_newlines();
    Ok(())
}

/// `</name>`, which must repeat the opening tag's name.
fn parse_closing_tag(parser: &mut Parser, open: &Token) -> Result<Identifier, Error> {
    let message = format!("expected closing tag </{}>", open.value);
    parser.expect(TokenKind::TagCloseStart, &message)?;

    let name = parser.expect(TokenKind::Identifier, "expected tag name")?;
    if name.value != open.value {
        return Err(Error::new(
            ErrorImpl::MismatchedClosingTag {
                expected: open.value.clone(),
                found: name.value.clone(),
            },
            name,
        ));
    }
    parser.expect(TokenKind::TagClose, "expected '>'")?;

    Ok(Identifier::new(name.value, name.span))
}

/// Joins each run of adjacent content statements into one, with a single
/// space between the joined runs.
pub fn merge_adjacent_content(content: Vec<Stmt>) -> Vec<Stmt> {
    let mut merged: Vec<Stmt> = Vec::with_capacity(content.len());

    for stmt in content {
        match stmt {
            Stmt::HtmlContent {
                parts: next_parts,
                span: next_span,
            } => {
                if let Some(Stmt::HtmlContent { parts, span }) = merged.last_mut() {
                    parts.push(HtmlContentPart::Text {
                        text: " ".to_string(),
                        span: Span::new(span.end, next_span.start),
                    });
                    parts.extend(next_parts);
                    *span = span.to(next_span);
                } else {
                    merged.push(Stmt::HtmlContent {
                        parts: next_parts,
                        span: next_span,
                    });
                }
            }
            other => merged.push(other),
        }
    }

    merged
}
