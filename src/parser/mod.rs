//! Parser module for building the syntax tree.
//!
//! This module turns the lexer's token stream into a `Module`. It is a
//! hand-written recursive-descent parser with bounded backtracking:
//!
//! - Binary operators are parsed by precedence climbing over binding powers
//!   held in lookup tables, as are the statement dispatch tables
//! - Assignment targets, parenthesized `with` items and decorators are
//!   resolved by speculative parsing that restores the cursor on failure
//! - F-string fields and interpolated attribute values are parsed by
//!   independent sub-parsers
//! - View bodies may hold HTML elements, whose content is parsed as a block
//!   of statements and text runs
//! - Errors in one top-level statement do not stop the rest of the module

pub mod block;
pub mod collections;
pub mod compound;
pub mod expr;
pub mod fstring;
pub mod html;
pub mod lookups;
pub mod params;
pub mod parser;
pub mod patterns;
pub mod stmt;
pub mod targets;
pub mod types;

#[cfg(test)]
mod tests;
