#![allow(clippy::module_inception)]

use std::fmt::Display;

use crate::{ast::ast::Module, errors::errors::Error};

pub mod ast;
pub mod errors;
pub mod lexer;
pub mod macros;
pub mod parser;

extern crate regex;

pub use lexer::lexer::{tokenize, tokenize_expression};
pub use parser::{
    block::BlockFlavor,
    parser::{parse, parse_expression, parse_statement, parse_targets, ParserOptions},
};

/// A 1-based line/column location in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub fn new(line: u32, column: u32) -> Self {
        Position { line, column }
    }

    /// Returns the position reached after reading `text` starting here.
    pub fn advanced_by(self, text: &str) -> Self {
        let mut position = self;
        for ch in text.chars() {
            if ch == '\n' {
                position.line += 1;
                position.column = 1;
            } else {
                position.column += 1;
            }
        }
        position
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        Span { start, end }
    }

    /// Span from the start of `self` to the end of `other`.
    pub fn to(&self, other: Span) -> Span {
        Span {
            start: self.start,
            end: other.end,
        }
    }

    pub fn contains(&self, other: &Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

/// Tokenizes and parses a whole source file with default options.
pub fn parse_source(source: &str, file: Option<String>) -> Result<Module, Vec<Error>> {
    parse_source_with_options(source, file, ParserOptions::default())
}

pub fn parse_source_with_options(
    source: &str,
    file: Option<String>,
    options: ParserOptions,
) -> Result<Module, Vec<Error>> {
    let tokens = tokenize(source.to_string(), file).map_err(|error| vec![error])?;
    parse(&tokens, options)
}
