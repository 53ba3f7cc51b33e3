use crate::Span;

use super::statements::{ControlStmt, Stmt};

// LITERALS

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Number(f64),
    String(String),
}

/// Number or string literal.
#[derive(Debug, Clone, PartialEq)]
pub struct LiteralExpr {
    pub value: Literal,
    pub span: Span,
}

/// A bare identifier in operand position: a local (`_x`), a global or a
/// nular command such as `player`. Which one is decided by the checker.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableExpr {
    pub name: String,
    pub span: Span,
}

impl VariableExpr {
    pub fn is_local(&self) -> bool {
        self.name.starts_with('_')
    }

    /// SQF names are case-insensitive.
    pub fn normalized(&self) -> String {
        self.name.to_ascii_lowercase()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayExpr {
    pub elements: Vec<Expr>,
    pub span: Span,
}

/// `{ ... }`. Every code block is its own local scope, keyed by `id`.
#[derive(Debug, Clone, PartialEq)]
pub struct CodeBlock {
    pub statements: Vec<Stmt>,
    pub id: u32,
    pub span: Span,
}

// COMMANDS

/// The operator or command word of a unary or binary expression.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandName {
    pub name: String,
    pub span: Span,
}

impl CommandName {
    pub fn normalized(&self) -> String {
        self.name.to_ascii_lowercase()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnaryExpr {
    pub command: CommandName,
    pub operand: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpr {
    pub left: Box<Expr>,
    pub command: CommandName,
    pub right: Box<Expr>,
    pub span: Span,
}

/// Placeholder for input that could not be parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorNode {
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(LiteralExpr),
    Variable(VariableExpr),
    Array(ArrayExpr),
    CodeBlock(CodeBlock),
    Unary(UnaryExpr),
    Binary(BinaryExpr),
    /// `a && b`, `a and b`
    BoolAnd(BinaryExpr),
    /// `a || b`, `a or b`
    BoolOr(BinaryExpr),
    /// Control construct used for its value, as in `_v = if (c) then {1} else {2}`.
    Control(Box<ControlStmt>),
    Error(ErrorNode),
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::Literal(literal) => literal.span,
            Expr::Variable(variable) => variable.span,
            Expr::Array(array) => array.span,
            Expr::CodeBlock(block) => block.span,
            Expr::Unary(unary) => unary.span,
            Expr::Binary(binary) | Expr::BoolAnd(binary) | Expr::BoolOr(binary) => binary.span,
            Expr::Control(control) => control.span(),
            Expr::Error(error) => error.span,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Expr::Error(_))
    }
}
