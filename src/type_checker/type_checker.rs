use std::collections::HashSet;

use log::{debug, trace};
use serde::Deserialize;

use crate::{
    ast::{
        expressions::{BinaryExpr, CodeBlock, Expr, Literal, UnaryExpr, VariableExpr},
        statements::{
            CaseStmt, ControlStmt, ForHeader, ForStmt, IfKind, IfStmt, Program, Stmt, SwitchStmt,
            WhileStmt,
        },
        types::{ExpandedValueType, ValueType},
    },
    commands::signatures::{Arity, CommandTable, Resolution},
    errors::errors::{Diagnostic, DiagnosticKind},
    Span,
};

use super::scope::ScopeTree;

/// Locals the engine defines implicitly.
const MAGIC_VARIABLES: [&str; 5] = [
    "_this",
    "_x",
    "_foreachindex",
    "_thiseventhandler",
    "_exception",
];

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CheckerConfig {
    /// Report reads of locals that were never assigned.
    pub warn_undefined_locals: bool,
    /// Global names typed as `Code`, usually collected from `CfgFunctions`.
    pub known_functions: HashSet<String>,
}

impl CheckerConfig {
    pub fn add_function(&mut self, name: &str) {
        self.known_functions.insert(name.to_ascii_lowercase());
    }

    pub fn is_function(&self, name: &str) -> bool {
        self.known_functions.contains(&name.to_ascii_lowercase())
    }
}

#[derive(Debug, Clone)]
pub struct CheckResult {
    pub diagnostics: Vec<Diagnostic>,
    pub scopes: ScopeTree,
}

pub struct TypeChecker<'a> {
    table: &'a CommandTable,
    config: &'a CheckerConfig,
    file: String,
    diagnostics: Vec<Diagnostic>,
    scopes: ScopeTree,
    environment_path: Vec<usize>,
}

impl<'a> TypeChecker<'a> {
    pub fn new(table: &'a CommandTable, config: &'a CheckerConfig, file: &str) -> Self {
        let mut scopes = ScopeTree::default();
        let root = scopes.add_environment(0, None);

        TypeChecker {
            table,
            config,
            file: file.to_string(),
            diagnostics: vec![],
            scopes,
            environment_path: vec![root],
        }
    }

    fn report(&mut self, kind: DiagnosticKind, span: Span) {
        let diagnostic = Diagnostic::new(kind, span, &self.file);
        debug!("{}", diagnostic);
        self.diagnostics.push(diagnostic);
    }

    fn current_environment(&self) -> usize {
        self.environment_path[self.environment_path.len() - 1]
    }

    fn push_environment(&mut self, id: u32) {
        let parent = self.current_environment();
        let index = self.scopes.add_environment(id, Some(parent));
        trace!("entering scope {} (parent {})", id, parent);
        self.environment_path.push(index);
    }

    fn pop_environment(&mut self) {
        self.environment_path.pop();
    }

    fn declare_local(&mut self, name: &str, value_type: ValueType) {
        let current = self.current_environment();
        self.scopes.get_mut(current).declare_variable(name, value_type);
    }

    /// `_x = value` rebinds the nearest scope that has `_x`, else declares it
    /// in the current scope.
    fn assign_local(&mut self, name: &str, value_type: ValueType) {
        let target = self
            .scopes
            .resolve(self.current_environment(), name)
            .map(|(index, _)| index)
            .unwrap_or_else(|| self.current_environment());
        self.scopes.get_mut(target).declare_variable(name, value_type);
    }

    fn check_type(&mut self, expected: &ValueType, received: &ValueType, span: Span) {
        if !expected.accepts(received) {
            self.report(
                DiagnosticKind::TypeMatchError {
                    expected: expected.get_display_name(),
                    received: received.get_display_name(),
                },
                span,
            );
        }
    }

    pub fn type_check_program(&mut self, program: &Program) {
        for stmt in &program.statements {
            self.type_check_stmt(stmt);
        }
    }

    /// Checks a statement and returns the value it leaves behind.
    pub fn type_check_stmt(&mut self, stmt: &Stmt) -> ValueType {
        match stmt {
            Stmt::Expression(stmt) => self.type_check_expr(&stmt.expression),
            Stmt::Assignment(assignment) => {
                let value_type = self.type_check_expr(&assignment.value);
                let target = &assignment.target;

                if assignment.is_private {
                    self.declare_local(&target.name, value_type);
                } else if target.is_local() {
                    self.assign_local(&target.name, value_type);
                }
                ValueType::NOTHING
            }
            Stmt::Control(control) => self.type_check_control(control),
            Stmt::Error(_) => ValueType::ANY,
        }
    }

    pub fn type_check_expr(&mut self, expr: &Expr) -> ValueType {
        match expr {
            Expr::Literal(literal) => match literal.value {
                Literal::Number(_) => ValueType::NUMBER,
                Literal::String(_) => ValueType::STRING,
            },
            Expr::Variable(variable) => self.type_check_variable(variable),
            Expr::Array(array) => {
                let element_types: Vec<ValueType> = array
                    .elements
                    .iter()
                    .map(|element| self.type_check_expr(element))
                    .collect();
                infer_array_type(element_types)
            }
            Expr::CodeBlock(block) => {
                self.type_check_block(block, &[]);
                ValueType::CODE
            }
            Expr::Unary(unary) => self.type_check_unary(unary),
            Expr::Binary(binary) | Expr::BoolAnd(binary) | Expr::BoolOr(binary) => {
                self.type_check_binary(binary)
            }
            Expr::Control(control) => self.type_check_control(control),
            Expr::Error(_) => ValueType::ANY,
        }
    }

    /// Checks the statements of `block` in a new scope holding `locals`.
    /// Returns the type of the last statement.
    pub fn type_check_block(&mut self, block: &CodeBlock, locals: &[(&str, ValueType)]) -> ValueType {
        self.push_environment(block.id);
        for (name, value_type) in locals {
            self.declare_local(name, value_type.clone());
        }

        let mut value_type = ValueType::NOTHING;
        for stmt in &block.statements {
            value_type = self.type_check_stmt(stmt);
        }

        self.pop_environment();
        value_type
    }

    /// Value of a branch: the block's last statement, or the expression itself.
    fn type_check_branch(&mut self, branch: &Expr) -> ValueType {
        match branch {
            Expr::CodeBlock(block) => self.type_check_block(block, &[]),
            other => self.type_check_expr(other),
        }
    }

    fn type_check_variable(&mut self, variable: &VariableExpr) -> ValueType {
        let name = variable.normalized();

        if variable.is_local() {
            if MAGIC_VARIABLES.contains(&name.as_str()) {
                return ValueType::ANY;
            }
            if let Some((_, value_type)) = self.scopes.resolve(self.current_environment(), &name) {
                return value_type.clone();
            }
            if self.config.warn_undefined_locals {
                self.report(
                    DiagnosticKind::UndefinedVariable {
                        variable: variable.name.clone(),
                    },
                    variable.span,
                );
            }
            return ValueType::ANY;
        }

        if let Some(nular) = self.table.lookup(&name, Arity::Nular).first() {
            return nular.return_type.clone();
        }
        if self.config.is_function(&name) {
            return ValueType::CODE;
        }
        if self.table.is_known(&name) {
            self.report(
                DiagnosticKind::UnsupportedArity {
                    command: variable.name.clone(),
                    arity: Arity::Nular.to_string(),
                },
                variable.span,
            );
        }

        // Plain global variable
        ValueType::ANY
    }

    /// Reports an unknown command or a missing arity. Returns false when
    /// there is nothing to resolve against.
    fn check_command_exists(&mut self, name: &str, arity: Arity, span: Span) -> bool {
        if !self.table.lookup(name, arity).is_empty() {
            return true;
        }

        let kind = if self.table.is_known(name) {
            DiagnosticKind::UnsupportedArity {
                command: name.to_string(),
                arity: arity.to_string(),
            }
        } else {
            DiagnosticKind::UnknownCommand {
                command: name.to_string(),
            }
        };
        self.report(kind, span);
        false
    }

    fn resolve_command(
        &mut self,
        name: &str,
        arity: Arity,
        supplied: &[ValueType],
        argument_spans: &[Span],
    ) -> ValueType {
        let table = self.table;
        match table.resolve(name, arity, supplied) {
            Resolution::Match(signature) => signature.return_type.clone(),
            Resolution::NoMatch { closest, argument } => {
                let expected = closest
                    .parameters()
                    .get(argument)
                    .map(|parameter| parameter.value_type.get_display_name())
                    .unwrap_or_default();
                let received = supplied
                    .get(argument)
                    .map(ValueType::get_display_name)
                    .unwrap_or_default();
                let span = argument_spans.get(argument).copied().unwrap_or_default();

                self.report(
                    DiagnosticKind::NoApplicableOverload {
                        command: name.to_string(),
                        argument: Some(argument),
                        expected,
                        received,
                    },
                    span,
                );
                ValueType::ANY
            }
            // Already reported by check_command_exists
            Resolution::Unknown | Resolution::UnsupportedArity => ValueType::ANY,
        }
    }

    fn type_check_unary(&mut self, unary: &UnaryExpr) -> ValueType {
        let name = &unary.command.name;
        let exists = self.check_command_exists(name, Arity::Unary, unary.command.span);

        // `private _x` declares before the operand is read
        self.declare_command_locals(&unary.command.normalized(), &unary.operand);
        let operand = self.type_check_expr(&unary.operand);

        if !exists {
            return ValueType::ANY;
        }
        self.resolve_command(name, Arity::Unary, &[operand], &[unary.operand.span()])
    }

    fn type_check_binary(&mut self, binary: &BinaryExpr) -> ValueType {
        let name = &binary.command.name;

        let left = self.type_check_expr(&binary.left);
        let exists = self.check_command_exists(name, Arity::Binary, binary.command.span);
        let right = self.type_check_expr(&binary.right);
        self.declare_command_locals(&binary.command.normalized(), &binary.right);

        if !exists {
            return ValueType::ANY;
        }
        self.resolve_command(
            name,
            Arity::Binary,
            &[left, right],
            &[binary.left.span(), binary.right.span()],
        )
    }

    /// `params [...]` and `private [...]` declare locals in the current scope.
    fn declare_command_locals(&mut self, command: &str, operand: &Expr) {
        if command != "params" && command != "private" {
            return;
        }

        let names: Vec<&Expr> = match operand {
            Expr::Array(array) => array.elements.iter().collect(),
            other => vec![other],
        };

        for element in names {
            let name = match element {
                Expr::Literal(literal) => match &literal.value {
                    Literal::String(name) => Some(name.as_str()),
                    _ => None,
                },
                // params [["_name", default, ...]]
                Expr::Array(entry) => match entry.elements.first() {
                    Some(Expr::Literal(literal)) => match &literal.value {
                        Literal::String(name) => Some(name.as_str()),
                        _ => None,
                    },
                    _ => None,
                },
                // private _x;
                Expr::Variable(variable) if variable.is_local() => Some(variable.name.as_str()),
                _ => None,
            };

            if let Some(name) = name.filter(|name| name.starts_with('_')) {
                self.declare_local(name, ValueType::ANY);
            }
        }
    }

    fn type_check_control(&mut self, control: &ControlStmt) -> ValueType {
        match control {
            ControlStmt::If(stmt) => self.type_check_if(stmt),
            ControlStmt::While(stmt) => self.type_check_while(stmt),
            ControlStmt::For(stmt) => self.type_check_for(stmt),
            ControlStmt::Switch(stmt) => self.type_check_switch(stmt),
            ControlStmt::Case(stmt) => self.type_check_case(stmt),
        }
    }

    fn missing_condition(&mut self, construct: &str, span: Span) {
        self.report(
            DiagnosticKind::MissingCondition {
                construct: construct.to_string(),
            },
            span,
        );
    }

    fn missing_body(&mut self, construct: &str, span: Span) {
        self.report(
            DiagnosticKind::MissingBody {
                construct: construct.to_string(),
            },
            span,
        );
    }

    fn type_check_if(&mut self, stmt: &IfStmt) -> ValueType {
        match stmt.get_condition() {
            Some(condition) => {
                let condition_type = self.type_check_expr(condition);
                self.check_type(&ValueType::BOOLEAN, &condition_type, condition.span());
            }
            None => self.missing_condition("if", stmt.span),
        }

        let then_type = self.type_check_branch(stmt.get_then());
        let else_type = stmt.get_else().map(|branch| self.type_check_branch(branch));

        match (stmt.kind, else_type) {
            (IfKind::Then, Some(else_type)) if else_type == then_type => then_type,
            _ => ValueType::ANY,
        }
    }

    fn type_check_while(&mut self, stmt: &WhileStmt) -> ValueType {
        match &stmt.condition {
            Some(Expr::CodeBlock(block)) => {
                let condition_type = self.type_check_block(block, &[]);
                self.check_type(&ValueType::BOOLEAN, &condition_type, block.span);
            }
            Some(other) => {
                let condition_type = self.type_check_expr(other);
                self.check_type(&ValueType::CODE, &condition_type, other.span());
            }
            None => self.missing_condition("while", stmt.span),
        }

        match &stmt.body {
            Some(body) => {
                self.type_check_block(body, &[]);
            }
            None => self.missing_body("while", stmt.span),
        }
        ValueType::NOTHING
    }

    fn type_check_for(&mut self, stmt: &ForStmt) -> ValueType {
        match &stmt.header {
            ForHeader::Range {
                variable,
                from,
                to,
                step,
            } => {
                if from.is_none() || to.is_none() {
                    self.missing_condition("for", stmt.span);
                }
                for bound in [from, to, step].into_iter().flatten() {
                    let bound_type = self.type_check_expr(bound);
                    self.check_type(&ValueType::NUMBER, &bound_type, bound.span());
                }

                let locals: Vec<(&str, ValueType)> = variable
                    .iter()
                    .map(|variable| (variable.name.as_str(), ValueType::NUMBER))
                    .collect();
                self.type_check_loop_body(stmt, &locals);
            }
            ForHeader::Classic {
                init,
                condition,
                step,
            } => {
                // Locals from the init block stay visible in the rest of the loop.
                let scope_id = match init {
                    Some(Expr::CodeBlock(block)) => block.id,
                    _ => stmt.body.as_ref().map(|body| body.id).unwrap_or_default(),
                };
                self.push_environment(scope_id);

                match init {
                    Some(Expr::CodeBlock(block)) => {
                        for init_stmt in &block.statements {
                            self.type_check_stmt(init_stmt);
                        }
                    }
                    Some(other) => {
                        self.type_check_expr(other);
                    }
                    None => {}
                }

                match condition {
                    Some(Expr::CodeBlock(block)) => {
                        let condition_type = self.type_check_block(block, &[]);
                        self.check_type(&ValueType::BOOLEAN, &condition_type, block.span);
                    }
                    Some(other) => {
                        let condition_type = self.type_check_expr(other);
                        self.check_type(&ValueType::CODE, &condition_type, other.span());
                    }
                    None => self.missing_condition("for", stmt.span),
                }

                if let Some(step) = step {
                    self.type_check_expr(step);
                }
                self.type_check_loop_body(stmt, &[]);
                self.pop_environment();
            }
            ForHeader::Missing => {
                self.missing_condition("for", stmt.span);
                self.type_check_loop_body(stmt, &[]);
            }
        }

        ValueType::NOTHING
    }

    fn type_check_loop_body(&mut self, stmt: &ForStmt, locals: &[(&str, ValueType)]) {
        match &stmt.body {
            Some(body) => {
                self.type_check_block(body, locals);
            }
            None => self.missing_body("for", stmt.span),
        }
    }

    fn type_check_switch(&mut self, stmt: &SwitchStmt) -> ValueType {
        match &stmt.subject {
            Some(subject) => {
                self.type_check_expr(subject);
            }
            None => self.missing_condition("switch", stmt.span),
        }

        match &stmt.body {
            Some(body) => {
                self.type_check_block(body, &[]);
            }
            None => self.missing_body("switch", stmt.span),
        }
        ValueType::ANY
    }

    /// Absent condition or block is legal for `case`; nothing to report.
    fn type_check_case(&mut self, stmt: &CaseStmt) -> ValueType {
        if let Some(condition) = stmt.get_condition() {
            self.type_check_expr(condition);
        }
        if let Some(block) = stmt.get_block() {
            self.type_check_block(block, &[]);
        }
        ValueType::NOTHING
    }
}

/// `[]` is the empty array, a single element is a generic array, longer
/// literals keep each element's type.
pub fn infer_array_type(element_types: Vec<ValueType>) -> ValueType {
    match element_types.len() {
        0 => ValueType::Expanded(ExpandedValueType::empty_array()),
        1 => ValueType::ARRAY,
        _ => ValueType::Expanded(ExpandedValueType::new(false, element_types)),
    }
}

/// Checks a parsed program against `table`.
///
/// Walks the tree depth-first and never stops early: every problem found is
/// returned, in traversal order.
pub fn type_check(
    program: &Program,
    table: &CommandTable,
    config: &CheckerConfig,
    file: &str,
) -> CheckResult {
    let mut type_checker = TypeChecker::new(table, config, file);
    type_checker.type_check_program(program);

    debug!(
        "checked {}: {} scopes, {} diagnostics",
        file,
        type_checker.scopes.len(),
        type_checker.diagnostics.len()
    );

    CheckResult {
        diagnostics: type_checker.diagnostics,
        scopes: type_checker.scopes,
    }
}
