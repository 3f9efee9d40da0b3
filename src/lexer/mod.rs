//! Lexical analysis for the view language.
//!
//! This module turns source text into the token stream the parser consumes.
//! It handles:
//!
//! - Python tokens through an ordered regex handler table
//! - NEWLINE / INDENT / DEDENT layout tokens
//! - HTML tags, text runs and `{...}` interpolations inside view bodies
//! - Escape decoding for string literals

pub mod lexer;
pub mod tokens;
