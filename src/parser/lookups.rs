use std::collections::HashMap;

use lazy_static::lazy_static;

use crate::{
    ast::{
        ast::{BinaryOp, CompareOp},
        statements::Stmt,
    },
    errors::errors::Error,
    lexer::tokens::TokenKind,
};

use super::{block::BlockFlavor, compound::*, parser::Parser, stmt::*};

/// Binding powers of the binary operator levels, lowest first. `Unary` is a
/// sentinel above every binary operator.
#[derive(PartialEq, PartialOrd, Eq, Ord, Clone, Copy, Debug)]
pub enum BindingPower {
    BitwiseOr,
    BitwiseXor,
    BitwiseAnd,
    Shift,
    Additive,
    Multiplicative,
    Unary,
}

impl BindingPower {
    /// The next tighter level; right operands are parsed at this power so
    /// that equal-power operators associate to the left.
    pub fn next(self) -> BindingPower {
        match self {
            BindingPower::BitwiseOr => BindingPower::BitwiseXor,
            BindingPower::BitwiseXor => BindingPower::BitwiseAnd,
            BindingPower::BitwiseAnd => BindingPower::Shift,
            BindingPower::Shift => BindingPower::Additive,
            BindingPower::Additive => BindingPower::Multiplicative,
            BindingPower::Multiplicative | BindingPower::Unary => BindingPower::Unary,
        }
    }
}

pub type StmtHandler = fn(&mut Parser, BlockFlavor) -> Result<Stmt, Error>;
pub type SimpleStmtHandler = fn(&mut Parser) -> Result<Stmt, Error>;

pub type StmtLookup = HashMap<TokenKind, StmtHandler>;
pub type SimpleStmtLookup = HashMap<TokenKind, SimpleStmtHandler>;
pub type BPLookup = HashMap<TokenKind, (BindingPower, BinaryOp)>;

lazy_static! {
    pub static ref BINARY_LOOKUP: BPLookup = create_binary_lookup();
    pub static ref COMPARISON_LOOKUP: HashMap<TokenKind, CompareOp> = create_comparison_lookup();
    pub static ref AUGMENTED_LOOKUP: HashMap<TokenKind, BinaryOp> = create_augmented_lookup();
    pub static ref COMPOUND_STMT_LOOKUP: StmtLookup = create_compound_stmt_lookup();
    pub static ref SIMPLE_STMT_LOOKUP: SimpleStmtLookup = create_simple_stmt_lookup();
}

fn create_binary_lookup() -> BPLookup {
    let mut lookup = HashMap::new();

    lookup.insert(TokenKind::Pipe, (BindingPower::BitwiseOr, BinaryOp::BitOr));
    lookup.insert(TokenKind::Caret, (BindingPower::BitwiseXor, BinaryOp::BitXor));
    lookup.insert(TokenKind::Ampersand, (BindingPower::BitwiseAnd, BinaryOp::BitAnd));

    lookup.insert(TokenKind::LeftShift, (BindingPower::Shift, BinaryOp::LeftShift));
    lookup.insert(TokenKind::RightShift, (BindingPower::Shift, BinaryOp::RightShift));

    // Additive and multiplicative
    lookup.insert(TokenKind::Plus, (BindingPower::Additive, BinaryOp::Add));
    lookup.insert(TokenKind::Dash, (BindingPower::Additive, BinaryOp::Subtract));
    lookup.insert(TokenKind::Star, (BindingPower::Multiplicative, BinaryOp::Multiply));
    lookup.insert(TokenKind::Slash, (BindingPower::Multiplicative, BinaryOp::Divide));
    lookup.insert(TokenKind::DoubleSlash, (BindingPower::Multiplicative, BinaryOp::FloorDivide));
    lookup.insert(TokenKind::Percent, (BindingPower::Multiplicative, BinaryOp::Modulo));
    lookup.insert(TokenKind::At, (BindingPower::Multiplicative, BinaryOp::MatMul));

    lookup
}

fn create_comparison_lookup() -> HashMap<TokenKind, CompareOp> {
    let mut lookup = HashMap::new();

    lookup.insert(TokenKind::Equals, CompareOp::Equal);
    lookup.insert(TokenKind::NotEquals, CompareOp::NotEqual);
    lookup.insert(TokenKind::Less, CompareOp::Less);
    lookup.insert(TokenKind::LessEquals, CompareOp::LessEqual);
    lookup.insert(TokenKind::Greater, CompareOp::Greater);
    lookup.insert(TokenKind::GreaterEquals, CompareOp::GreaterEqual);
    lookup.insert(TokenKind::Is, CompareOp::Is);
    lookup.insert(TokenKind::IsNot, CompareOp::IsNot);
    lookup.insert(TokenKind::In, CompareOp::In);
    lookup.insert(TokenKind::NotIn, CompareOp::NotIn);

    lookup
}

fn create_augmented_lookup() -> HashMap<TokenKind, BinaryOp> {
    let mut lookup = HashMap::new();

    lookup.insert(TokenKind::PlusEquals, BinaryOp::Add);
    lookup.insert(TokenKind::MinusEquals, BinaryOp::Subtract);
    lookup.insert(TokenKind::StarEquals, BinaryOp::Multiply);
    lookup.insert(TokenKind::SlashEquals, BinaryOp::Divide);
    lookup.insert(TokenKind::DoubleSlashEquals, BinaryOp::FloorDivide);
    lookup.insert(TokenKind::PercentEquals, BinaryOp::Modulo);
    lookup.insert(TokenKind::DoubleStarEquals, BinaryOp::Power);
    lookup.insert(TokenKind::AtEquals, BinaryOp::MatMul);
    lookup.insert(TokenKind::AmpersandEquals, BinaryOp::BitAnd);
    lookup.insert(TokenKind::PipeEquals, BinaryOp::BitOr);
    lookup.insert(TokenKind::CaretEquals, BinaryOp::BitXor);
    lookup.insert(TokenKind::LeftShiftEquals, BinaryOp::LeftShift);
    lookup.insert(TokenKind::RightShiftEquals, BinaryOp::RightShift);

    lookup
}

fn create_compound_stmt_lookup() -> StmtLookup {
    let mut lookup: StmtLookup = HashMap::new();

    lookup.insert(TokenKind::If, parse_if_stmt);
    lookup.insert(TokenKind::While, parse_while_stmt);
    lookup.insert(TokenKind::For, parse_for_stmt);
    lookup.insert(TokenKind::Try, parse_try_stmt);
    lookup.insert(TokenKind::With, parse_with_stmt);
    lookup.insert(TokenKind::Def, parse_function_def);
    lookup.insert(TokenKind::Class, parse_class_def);
    lookup.insert(TokenKind::View, parse_view_def);
    lookup.insert(TokenKind::Async, parse_async_stmt);
    lookup.insert(TokenKind::At, parse_decorated);

    lookup
}

fn create_simple_stmt_lookup() -> SimpleStmtLookup {
    let mut lookup: SimpleStmtLookup = HashMap::new();

    lookup.insert(TokenKind::Return, parse_return_stmt);
    lookup.insert(TokenKind::Import, parse_import_stmt);
    lookup.insert(TokenKind::From, parse_import_from_stmt);
    lookup.insert(TokenKind::Raise, parse_raise_stmt);
    lookup.insert(TokenKind::Pass, parse_pass_stmt);
    lookup.insert(TokenKind::Break, parse_break_stmt);
    lookup.insert(TokenKind::Continue, parse_continue_stmt);
    lookup.insert(TokenKind::Del, parse_del_stmt);
    lookup.insert(TokenKind::Global, parse_global_stmt);
    lookup.insert(TokenKind::Nonlocal, parse_nonlocal_stmt);
    lookup.insert(TokenKind::Assert, parse_assert_stmt);

    lookup
}
