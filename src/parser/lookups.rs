use std::collections::HashMap;

use crate::{
    ast::{expressions::Expr, statements::Stmt},
    errors::errors::Diagnostic,
    lexer::tokens::TokenKind,
};

use super::{expr::*, parser::Parser, stmt::*};

#[derive(PartialEq, PartialOrd, Clone, Copy, Debug)]
pub enum BindingPower {
    Default,
    Or,
    And,
    Comparison,
    BinaryCommand,
    Additive,
    Multiplicative,
    Power,
    Unary,
    Select,
    Primary,
}

pub type StmtHandler = fn(&mut Parser) -> Result<Stmt, Diagnostic>;
pub type NUDHandler = fn(&mut Parser) -> Result<Expr, Diagnostic>;
pub type LEDHandler = fn(&mut Parser, Expr, BindingPower) -> Result<Expr, Diagnostic>;

/// Precedence of a binary command word. Most share one tier; a few behave
/// like the arithmetic operators.
pub fn command_binding_power(name: &str) -> BindingPower {
    match name {
        "max" | "min" => BindingPower::Additive,
        "mod" | "atan2" => BindingPower::Multiplicative,
        _ => BindingPower::BinaryCommand,
    }
}

pub fn create_token_lookups(parser: &mut Parser) {
    // Logical
    parser.led(TokenKind::Or, BindingPower::Or, parse_bool_expr);
    parser.led(TokenKind::And, BindingPower::And, parse_bool_expr);

    // Comparison
    parser.led(TokenKind::Equals, BindingPower::Comparison, parse_binary_expr);
    parser.led(TokenKind::NotEquals, BindingPower::Comparison, parse_binary_expr);
    parser.led(TokenKind::Less, BindingPower::Comparison, parse_binary_expr);
    parser.led(TokenKind::LessEquals, BindingPower::Comparison, parse_binary_expr);
    parser.led(TokenKind::Greater, BindingPower::Comparison, parse_binary_expr);
    parser.led(TokenKind::GreaterEquals, BindingPower::Comparison, parse_binary_expr);
    parser.led(TokenKind::ConfigPath, BindingPower::Comparison, parse_binary_expr);

    // Command words; the binding power is looked up per name
    parser.led(TokenKind::Identifier, BindingPower::BinaryCommand, parse_binary_expr);

    // Arithmetic
    parser.led(TokenKind::Plus, BindingPower::Additive, parse_binary_expr);
    parser.led(TokenKind::Dash, BindingPower::Additive, parse_binary_expr);
    parser.led(TokenKind::Star, BindingPower::Multiplicative, parse_binary_expr);
    parser.led(TokenKind::Slash, BindingPower::Multiplicative, parse_binary_expr);
    parser.led(TokenKind::Percent, BindingPower::Multiplicative, parse_binary_expr);
    parser.led(TokenKind::Caret, BindingPower::Power, parse_binary_expr);
    parser.led(TokenKind::Hash, BindingPower::Select, parse_binary_expr);

    // Literals and symbols
    parser.nud(TokenKind::Number, parse_primary_expr);
    parser.nud(TokenKind::String, parse_primary_expr);
    parser.nud(TokenKind::Identifier, parse_identifier_expr);
    parser.nud(TokenKind::OpenParen, parse_grouping_expr);
    parser.nud(TokenKind::OpenBracket, parse_array_expr);
    parser.nud(TokenKind::OpenCurly, parse_code_block_expr);
    parser.nud(TokenKind::Not, parse_prefix_expr);
    parser.nud(TokenKind::Dash, parse_prefix_expr);
    parser.nud(TokenKind::Plus, parse_prefix_expr);
    parser.nud(TokenKind::Private, parse_prefix_expr);

    // Control constructs are expressions too
    parser.nud(TokenKind::If, parse_control_expr);
    parser.nud(TokenKind::While, parse_control_expr);
    parser.nud(TokenKind::For, parse_control_expr);
    parser.nud(TokenKind::Switch, parse_control_expr);
    parser.nud(TokenKind::Case, parse_control_expr);
    parser.nud(TokenKind::Default, parse_control_expr);

    // Statements
    parser.stmt(TokenKind::Private, parse_private_stmt);
    parser.stmt(TokenKind::If, parse_control_stmt);
    parser.stmt(TokenKind::While, parse_control_stmt);
    parser.stmt(TokenKind::For, parse_control_stmt);
    parser.stmt(TokenKind::Switch, parse_control_stmt);
    parser.stmt(TokenKind::Case, parse_control_stmt);
    parser.stmt(TokenKind::Default, parse_control_stmt);
}

// Lookup tables inside parser struct, so it's easier
pub type StmtLookup = HashMap<TokenKind, StmtHandler>;
pub type NUDLookup = HashMap<TokenKind, NUDHandler>;
pub type LEDLookup = HashMap<TokenKind, LEDHandler>;
pub type BPLookup = HashMap<TokenKind, BindingPower>;
