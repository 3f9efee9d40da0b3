//! Error types for lexing and parsing.
//!
//! Every error produced by the front end is a (token, cause) pair:
//!
//! - `ErrorImpl` enumerates the causes (expectation failures, grammar-shape
//!   violations, lexical problems)
//! - `Error` binds a cause to the offending token and formats it as
//!   `at '<lexeme>': <message>` or `at end: <message>`
//! - `ErrorTip` carries an optional fix-it suggestion

pub mod errors;
