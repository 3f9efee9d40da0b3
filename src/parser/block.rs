use crate::{ast::statements::Stmt, errors::errors::Error, lexer::tokens::TokenKind};

use super::{
    html::parse_html_element,
    parser::Parser,
    stmt::{parse_simple_stmt, parse_stmt},
};

/// What a block may contain.
///
/// Ordinary Python blocks hold neither elements nor restrictions; view bodies
/// (and everything nested in them) may hold elements; element content may not
/// define functions or views.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockFlavor {
    pub allow_html: bool,
    pub allow_function_defs: bool,
}

impl BlockFlavor {
    pub const ORDINARY: BlockFlavor = BlockFlavor {
        allow_html: false,
        allow_function_defs: true,
    };

    pub const VIEW: BlockFlavor = BlockFlavor {
        allow_html: true,
        allow_function_defs: true,
    };

    pub const HTML_CONTENT: BlockFlavor = BlockFlavor {
        allow_html: true,
        allow_function_defs: false,
    };
}

/// Parses the body that follows a `:`.
///
/// Either simple statements on the same line (`if x: a; b`), or NEWLINE
/// INDENT statements DEDENT.
pub fn parse_block(parser: &mut Parser, flavor: BlockFlavor) -> Result<Vec<Stmt>, Error> {
    if !parser.check(TokenKind::Newline) {
        return parse_inline_block(parser, flavor);
    }

    parser.advance();
    parser.skip_newlines();
    parser.expect(TokenKind::Indent, "expected indented block")?;

    let mut body = vec![];
    parser.skip_newlines();
    while !parser.check_any(&[TokenKind::Dedent, TokenKind::EOF]) {
        body.push(parse_stmt(parser, flavor)?);
        parser.skip_newlines();
    }
    parser.eat(TokenKind::Dedent);

    Ok(body)
}

fn parse_inline_block(parser: &mut Parser, flavor: BlockFlavor) -> Result<Vec<Stmt>, Error> {
    if flavor.allow_html && parser.check(TokenKind::TagOpen) {
        let element = parse_html_element(parser)?;
        parser.eat(TokenKind::Newline);
        return Ok(vec![Stmt::Html(element)]);
    }

    let mut body = vec![];
    loop {
        body.push(parse_simple_stmt(parser)?);
        if !end_simple_stmt(parser)? {
            return Ok(body);
        }
    }
}

/// Consumes what follows a simple statement. Returns true when another simple
/// statement follows on the same line.
pub fn end_simple_stmt(parser: &mut Parser) -> Result<bool, Error> {
    match parser.current_token_kind() {
        TokenKind::Semicolon => {
            parser.advance();
            match parser.current_token_kind() {
                TokenKind::Newline => {
                    parser.advance();
                    Ok(false)
                }
                TokenKind::EOF | TokenKind::Dedent => Ok(false),
                _ => Ok(true),
            }
        }
        TokenKind::Newline => {
            parser.advance();
            Ok(false)
        }
        TokenKind::EOF | TokenKind::Dedent => Ok(false),
        _ => Err(parser.expected("expected newline after statement")),
    }
}
