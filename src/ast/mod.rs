/// AST (Abstract Syntax Tree) module
/// Contains all definitions related to the AST structure
///
/// Submodules:
/// - ast: Module, identifiers, operators and node-kind enums
/// - expressions: Expression nodes, arguments, comprehensions, parameters
/// - statements: Statement nodes and their clauses
/// - patterns: `match` statement patterns
/// - html: Elements, attributes and content runs of view bodies
pub mod ast;
pub mod expressions;
pub mod html;
pub mod patterns;
pub mod statements;
