use crate::Span;

use super::{
    expressions::{CodeBlock, Expr},
    statements::{ControlStmt, ForHeader, Program, Stmt},
};

/// Borrowed view of any tree node, for generic traversal.
///
/// Children are listed in source order. Absent optional parts are skipped.
#[derive(Debug, Clone, Copy)]
pub enum Node<'a> {
    Program(&'a Program),
    Stmt(&'a Stmt),
    Expr(&'a Expr),
    Block(&'a CodeBlock),
}

impl<'a> Node<'a> {
    pub fn span(&self) -> Span {
        match self {
            Node::Program(program) => program.span,
            Node::Stmt(stmt) => stmt.span(),
            Node::Expr(expr) => expr.span(),
            Node::Block(block) => block.span,
        }
    }

    pub fn children(&self) -> Vec<Node<'a>> {
        match *self {
            Node::Program(program) => program.statements.iter().map(Node::Stmt).collect(),
            Node::Block(block) => block.statements.iter().map(Node::Stmt).collect(),
            Node::Stmt(stmt) => match stmt {
                Stmt::Expression(expression) => vec![Node::Expr(&expression.expression)],
                Stmt::Assignment(assignment) => vec![Node::Expr(&assignment.value)],
                Stmt::Control(control) => control_children(control),
                Stmt::Error(_) => vec![],
            },
            Node::Expr(expr) => match expr {
                Expr::Literal(_) | Expr::Variable(_) | Expr::Error(_) => vec![],
                Expr::Array(array) => array.elements.iter().map(Node::Expr).collect(),
                Expr::CodeBlock(block) => block.statements.iter().map(Node::Stmt).collect(),
                Expr::Unary(unary) => vec![Node::Expr(&unary.operand)],
                Expr::Binary(binary) | Expr::BoolAnd(binary) | Expr::BoolOr(binary) => {
                    vec![Node::Expr(&binary.left), Node::Expr(&binary.right)]
                }
                Expr::Control(control) => control_children(control),
            },
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(
            self,
            Node::Stmt(Stmt::Error(_)) | Node::Expr(Expr::Error(_))
        )
    }

    /// Visits this node and all descendants, parents before children.
    pub fn walk<F: FnMut(Node<'a>)>(&self, f: &mut F) {
        f(*self);
        for child in self.children() {
            child.walk(f);
        }
    }

    /// Spans of every placeholder node inserted by error recovery.
    pub fn error_spans(&self) -> Vec<Span> {
        let mut spans = vec![];
        self.walk(&mut |node| {
            if node.is_error() {
                spans.push(node.span());
            }
        });
        spans
    }
}

fn control_children(control: &ControlStmt) -> Vec<Node<'_>> {
    let mut children = vec![];

    match control {
        ControlStmt::If(stmt) => {
            children.extend(stmt.condition.iter().map(Node::Expr));
            children.push(Node::Expr(&stmt.then_branch));
            children.extend(stmt.else_branch.iter().map(Node::Expr));
        }
        ControlStmt::While(stmt) => {
            children.extend(stmt.condition.iter().map(Node::Expr));
            children.extend(stmt.body.iter().map(Node::Block));
        }
        ControlStmt::For(stmt) => {
            match &stmt.header {
                ForHeader::Range { from, to, step, .. } => {
                    for part in [from, to, step] {
                        children.extend(part.iter().map(Node::Expr));
                    }
                }
                ForHeader::Classic {
                    init,
                    condition,
                    step,
                } => {
                    for part in [init, condition, step] {
                        children.extend(part.iter().map(Node::Expr));
                    }
                }
                ForHeader::Missing => {}
            }
            children.extend(stmt.body.iter().map(Node::Block));
        }
        ControlStmt::Switch(stmt) => {
            children.extend(stmt.subject.iter().map(Node::Expr));
            children.extend(stmt.body.iter().map(Node::Block));
        }
        ControlStmt::Case(stmt) => {
            children.extend(stmt.condition.iter().map(Node::Expr));
            children.extend(stmt.block.iter().map(Node::Block));
        }
    }

    children
}

impl Program {
    pub fn as_node(&self) -> Node<'_> {
        Node::Program(self)
    }

    pub fn has_errors(&self) -> bool {
        !self.as_node().error_spans().is_empty()
    }
}
