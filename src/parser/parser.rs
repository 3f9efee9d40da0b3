//! Parser state and entry points.
//!
//! The `Parser` borrows a token slice and walks it with a plain index. Every
//! grammar function takes `&mut Parser` and either returns a node or an
//! `Error`. Ambiguous constructs are resolved with `speculate`: the attempt
//! runs in place, and on failure the cursor, depth and error list are put
//! back exactly as they were.
//!
//! Entry points:
//! - `parse` for a whole module (errors accumulate across statements)
//! - `parse_expression`, `parse_statement` and `parse_targets` for fragments

use tracing::{debug, trace};

use crate::{
    ast::{ast::Module, expressions::Expr, statements::Stmt},
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::{Token, TokenKind},
    Position, Span, MK_TOKEN,
};

use super::{
    block::BlockFlavor,
    expr::parse_star_expressions,
    stmt::parse_stmt,
    targets::parse_star_targets,
};

/// Tunables shared by every entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserOptions {
    /// Deepest allowed nesting of expressions, statements and elements.
    pub max_depth: usize,
}

impl Default for ParserOptions {
    fn default() -> Self {
        ParserOptions { max_depth: 100 }
    }
}

impl ParserOptions {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// The main parser structure that maintains parsing state.
pub struct Parser<'t> {
    /// The tokens to parse, normally terminated by EOF
    tokens: &'t [Token],
    /// Index of the current token
    pos: usize,
    /// Current nesting depth, bounded by `options.max_depth`
    depth: usize,
    /// Errors recorded by the module-level recovery loop
    errors: Vec<Error>,
    options: ParserOptions,
    /// Returned once the slice is exhausted
    eof: Token,
}

impl<'t> Parser<'t> {
    pub fn new(tokens: &'t [Token], options: ParserOptions) -> Self {
        let end = tokens
            .last()
            .map_or(Position::new(1, 1), |token| token.span.end);

        Parser {
            tokens,
            pos: 0,
            depth: 0,
            errors: vec![],
            options,
            eof: MK_TOKEN!(TokenKind::EOF, String::from("EOF"), Span::new(end, end)),
        }
    }

    pub fn options(&self) -> ParserOptions {
        self.options
    }

    /// Returns the current token without advancing.
    pub fn current_token(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&self.eof)
    }

    /// Returns the kind of the current token.
    pub fn current_token_kind(&self) -> TokenKind {
        self.current_token().kind
    }

    /// Kind of the token `n` places after the current one.
    pub fn peek_kind(&self, n: usize) -> TokenKind {
        self.tokens
            .get(self.pos + n)
            .map_or(TokenKind::EOF, |token| token.kind)
    }

    /// End of the most recently consumed token, skipping layout tokens.
    pub fn previous_end(&self) -> Position {
        self.tokens[..self.pos.min(self.tokens.len())]
            .iter()
            .rev()
            .find(|token| !token.kind.is_layout())
            .map_or(self.current_token().span.start, |token| token.span.end)
    }

    /// Span from `start` to the end of the most recently consumed token.
    pub fn span_from(&self, start: Position) -> Span {
        let end = self.previous_end();
        Span::new(start, if end < start { start } else { end })
    }

    /// Advances to the next token and returns the one consumed.
    pub fn advance(&mut self) -> Token {
        let token = self.current_token().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    pub fn check(&self, kind: TokenKind) -> bool {
        self.current_token_kind() == kind
    }

    pub fn check_any(&self, kinds: &[TokenKind]) -> bool {
        kinds.contains(&self.current_token_kind())
    }

    /// Consumes the current token if it has the given kind.
    pub fn eat(&mut self, kind: TokenKind) -> Option<Token> {
        if self.check(kind) {
            Some(self.advance())
        } else {
            None
        }
    }

    /// Expects a token of the specified kind, failing with `message`.
    pub fn expect(&mut self, kind: TokenKind, message: &str) -> Result<Token, Error> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.expected(message))
        }
    }

    /// Checks if there are more tokens to parse.
    pub fn has_tokens(&self) -> bool {
        self.pos < self.tokens.len() && self.current_token_kind() != TokenKind::EOF
    }

    pub fn skip_newlines(&mut self) {
        while self.eat(TokenKind::Newline).is_some() {}
    }

    /// Index of the current token.
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn errors(&self) -> &[Error] {
        &self.errors
    }

    /// Records a recoverable error.
    pub fn report(&mut self, error: Error) {
        self.errors.push(error);
    }

    pub fn error(&self, error: ErrorImpl) -> Error {
        Error::new(error, self.current_token().clone())
    }

    pub fn expected(&self, message: &str) -> Error {
        self.error(ErrorImpl::Expected {
            message: message.to_string(),
        })
    }

    /// The consumed token that starts at `start`, used to anchor errors on
    /// nodes that were already built.
    pub fn token_at(&self, start: Position) -> Token {
        self.tokens[..self.pos.min(self.tokens.len())]
            .iter()
            .rev()
            .find(|token| token.span.start == start && !token.kind.is_layout())
            .cloned()
            .unwrap_or_else(|| self.current_token().clone())
    }

    /// Runs `f`; if it fails, the parser is restored to its prior state.
    pub fn speculate<T>(
        &mut self,
        f: impl FnOnce(&mut Parser<'t>) -> Result<T, Error>,
    ) -> Result<T, Error> {
        let (pos, depth, error_count) = (self.pos, self.depth, self.errors.len());
        let result = f(self);

        if let Err(error) = &result {
            trace!(at = %self.current_token().span.start, %error, "backtracking");
            self.pos = pos;
            self.depth = depth;
            self.errors.truncate(error_count);
        }
        result
    }

    /// `speculate` that discards the error.
    pub fn attempt<T>(&mut self, f: impl FnOnce(&mut Parser<'t>) -> Result<T, Error>) -> Option<T> {
        self.speculate(f).ok()
    }

    /// Reports whether `f` would succeed here, without consuming anything.
    pub fn lookahead<T>(&mut self, f: impl FnOnce(&mut Parser<'t>) -> Result<T, Error>) -> bool {
        let (pos, depth, error_count) = (self.pos, self.depth, self.errors.len());
        let succeeded = f(self).is_ok();
        self.pos = pos;
        self.depth = depth;
        self.errors.truncate(error_count);
        succeeded
    }

    /// Runs `f` one level deeper, failing once `max_depth` is reached.
    pub fn nested<T>(
        &mut self,
        f: impl FnOnce(&mut Parser<'t>) -> Result<T, Error>,
    ) -> Result<T, Error> {
        if self.depth >= self.options.max_depth {
            return Err(self.error(ErrorImpl::MaxDepthExceeded {
                limit: self.options.max_depth,
            }));
        }

        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    /// Depth budget left for a nested sub-parse.
    pub fn remaining_depth(&self) -> usize {
        self.options.max_depth.saturating_sub(self.depth)
    }

    /// Skips the remainder of a failed top-level statement, starting from its
    /// first token: nested blocks are skipped whole, and continuation clauses
    /// (`elif`, `else`, `except`, `finally`, `case`) stay with their statement.
    fn synchronize(&mut self) {
        let mut depth = 0usize;

        loop {
            match self.current_token_kind() {
                TokenKind::EOF => return,
                TokenKind::Indent => {
                    depth += 1;
                    self.advance();
                }
                TokenKind::Dedent => {
                    depth = depth.saturating_sub(1);
                    self.advance();
                    if depth == 0 && !self.at_continuation_clause() {
                        return;
                    }
                }
                TokenKind::Newline => {
                    self.advance();
                    if depth == 0 && !self.check(TokenKind::Indent) {
                        if self.at_continuation_clause() {
                            continue;
                        }
                        return;
                    }
                }
                _ => {
                    self.advance();
                }
            }
        }
    }

    fn at_continuation_clause(&self) -> bool {
        self.check_any(&[
            TokenKind::Elif,
            TokenKind::Else,
            TokenKind::Except,
            TokenKind::Finally,
        ]) || self.current_token().is_soft_keyword("case")
    }

    fn expect_end(&mut self) -> Result<(), Error> {
        self.skip_newlines();
        if self.has_tokens() {
            let token = self.current_token().value.clone();
            return Err(self.error(ErrorImpl::UnexpectedToken { token }));
        }
        Ok(())
    }
}

/// Parses a whole token stream into a `Module`.
///
/// Each top-level statement is parsed fail-fast; after a failure the parser
/// skips to the next top-level statement and carries on, so every broken
/// statement contributes exactly one error.
pub fn parse(tokens: &[Token], options: ParserOptions) -> Result<Module, Vec<Error>> {
    debug!(tokens = tokens.len(), max_depth = options.max_depth, "parsing module");
    let mut parser = Parser::new(tokens, options);
    let mut body = vec![];
    let start = parser.current_token().span.start;

    parser.skip_newlines();
    while parser.has_tokens() {
        let statement_start = parser.pos;
        match parse_stmt(&mut parser, BlockFlavor::ORDINARY) {
            Ok(stmt) => body.push(stmt),
            Err(error) => {
                debug!(%error, "statement failed, resynchronizing");
                parser.report(error);
                parser.pos = statement_start;
                parser.depth = 0;
                parser.synchronize();
            }
        }
        parser.skip_newlines();
    }

    if !parser.errors.is_empty() {
        debug!(errors = parser.errors.len(), "module has errors");
        return Err(parser.errors);
    }

    let end = parser.current_token().span.end;
    Ok(Module {
        body,
        span: Span::new(start, if end < start { start } else { end }),
    })
}

/// Parses a single expression (a bare tuple is allowed) filling the stream.
pub fn parse_expression(tokens: &[Token], options: ParserOptions) -> Result<Expr, Error> {
    let mut parser = Parser::new(tokens, options);
    parser.skip_newlines();
    let expr = parse_star_expressions(&mut parser)?;
    parser.expect_end()?;
    Ok(expr)
}

/// Parses one statement under the given block flavor.
pub fn parse_statement(
    tokens: &[Token],
    flavor: BlockFlavor,
    options: ParserOptions,
) -> Result<Stmt, Error> {
    let mut parser = Parser::new(tokens, options);
    parser.skip_newlines();
    let stmt = parse_stmt(&mut parser, flavor)?;
    parser.expect_end()?;
    Ok(stmt)
}

/// Parses an assignment target list such as `a, *b, c.d`.
pub fn parse_targets(tokens: &[Token], options: ParserOptions) -> Result<Expr, Error> {
    let mut parser = Parser::new(tokens, options);
    parser.skip_newlines();
    let targets = parse_star_targets(&mut parser)?;
    parser.expect_end()?;
    Ok(targets)
}
