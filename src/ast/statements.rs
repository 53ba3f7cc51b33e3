use crate::Span;

use super::expressions::{CodeBlock, ErrorNode, Expr, VariableExpr};

#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionStmt {
    pub expression: Expr,
    pub span: Span,
}

/// `name = value` or `private _name = value`.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentStmt {
    pub is_private: bool,
    pub target: VariableExpr,
    pub value: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IfKind {
    Then,
    ExitWith,
}

/// `if COND then A [else B]` or `if COND exitWith {..}`.
///
/// `condition` is absent when it failed to parse. A then-branch that could
/// not be parsed is an `Expr::Error` placeholder.
#[derive(Debug, Clone, PartialEq)]
pub struct IfStmt {
    pub condition: Option<Expr>,
    pub kind: IfKind,
    pub then_branch: Expr,
    pub else_branch: Option<Expr>,
    pub span: Span,
}

impl IfStmt {
    pub fn get_condition(&self) -> Option<&Expr> {
        self.condition.as_ref()
    }

    pub fn get_then(&self) -> &Expr {
        &self.then_branch
    }

    pub fn get_else(&self) -> Option<&Expr> {
        self.else_branch.as_ref()
    }
}

/// `while {COND} do {..}`
#[derive(Debug, Clone, PartialEq)]
pub struct WhileStmt {
    pub condition: Option<Expr>,
    pub body: Option<CodeBlock>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ForHeader {
    /// `for "_i" from A to B [step C]`
    Range {
        variable: Option<VariableExpr>,
        from: Option<Expr>,
        to: Option<Expr>,
        step: Option<Expr>,
    },
    /// `for [{init}, {cond}, {step}]`
    Classic {
        init: Option<Expr>,
        condition: Option<Expr>,
        step: Option<Expr>,
    },
    Missing,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForStmt {
    pub header: ForHeader,
    pub body: Option<CodeBlock>,
    pub span: Span,
}

/// `switch (SUBJECT) do {..}`
#[derive(Debug, Clone, PartialEq)]
pub struct SwitchStmt {
    pub subject: Option<Expr>,
    pub body: Option<CodeBlock>,
    pub span: Span,
}

/// `case COND: {..}` or `default {..}`. Both parts may legally be absent.
#[derive(Debug, Clone, PartialEq)]
pub struct CaseStmt {
    pub condition: Option<Expr>,
    pub block: Option<CodeBlock>,
    pub is_default: bool,
    pub span: Span,
}

impl CaseStmt {
    pub fn get_condition(&self) -> Option<&Expr> {
        self.condition.as_ref()
    }

    pub fn get_block(&self) -> Option<&CodeBlock> {
        self.block.as_ref()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ControlStmt {
    If(IfStmt),
    While(WhileStmt),
    For(ForStmt),
    Switch(SwitchStmt),
    Case(CaseStmt),
}

impl ControlStmt {
    pub fn span(&self) -> Span {
        match self {
            ControlStmt::If(stmt) => stmt.span,
            ControlStmt::While(stmt) => stmt.span,
            ControlStmt::For(stmt) => stmt.span,
            ControlStmt::Switch(stmt) => stmt.span,
            ControlStmt::Case(stmt) => stmt.span,
        }
    }

    /// Keyword naming the construct, used in diagnostics.
    pub fn construct_name(&self) -> &'static str {
        match self {
            ControlStmt::If(_) => "if",
            ControlStmt::While(_) => "while",
            ControlStmt::For(_) => "for",
            ControlStmt::Switch(_) => "switch",
            ControlStmt::Case(case) if case.is_default => "default",
            ControlStmt::Case(_) => "case",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Expression(ExpressionStmt),
    Assignment(AssignmentStmt),
    Control(ControlStmt),
    Error(ErrorNode),
}

impl Stmt {
    pub fn span(&self) -> Span {
        match self {
            Stmt::Expression(stmt) => stmt.span,
            Stmt::Assignment(stmt) => stmt.span,
            Stmt::Control(stmt) => stmt.span(),
            Stmt::Error(error) => error.span,
        }
    }
}

/// A parsed source file.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub statements: Vec<Stmt>,
    pub span: Span,
}
