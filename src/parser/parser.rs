//! Parser implementation for building the SQF syntax tree.
//!
//! This module contains the main Parser struct and the `parse` entry point.
//! The parser uses a Pratt parser approach with NUD/LED handlers for
//! expression parsing and specialized functions for statements and control
//! constructs.
//!
//! It maintains lookup tables for:
//! - Statement handlers
//! - NUD (null denotation) handlers for prefix expressions
//! - LED (left denotation) handlers for infix expressions
//! - Binding powers for operator precedence
//!
//! Identifiers are classified with the command table: a name the table
//! knows as binary is an infix operator, with a binding power that depends on
//! the name.

use std::collections::HashMap;

use log::debug;

use crate::{
    ast::{
        expressions::ErrorNode,
        statements::{Program, Stmt},
    },
    commands::signatures::{Arity, CommandTable},
    errors::errors::{Diagnostic, DiagnosticKind},
    lexer::tokens::{Token, TokenKind},
    Span,
};

use super::{
    lookups::{
        command_binding_power, create_token_lookups, BPLookup, BindingPower, LEDHandler,
        LEDLookup, NUDHandler, NUDLookup, StmtHandler, StmtLookup,
    },
    stmt::parse_stmt,
};

/// Deepest nesting of expressions and code blocks the parser descends into.
pub const MAX_NESTING_DEPTH: usize = 128;

/// The main parser structure that maintains parsing state.
pub struct Parser<'t> {
    /// The list of tokens to parse, always ending with `EOF`
    tokens: Vec<Token>,
    /// Current position in the token stream
    pos: usize,
    /// End offset of the last consumed token
    last_end: u32,
    /// The name of the source file being parsed
    file: String,
    /// Lookup table for statement parsing handlers
    stmt_lookup: StmtLookup,
    /// Lookup table for null denotation (prefix) expression handlers
    nud_lookup: NUDLookup,
    /// Lookup table for left denotation (infix) expression handlers
    led_lookup: LEDLookup,
    /// Lookup table for expression binding powers (precedence)
    binding_power_lookup: BPLookup,
    /// Commands known to the parser, used to classify identifiers
    table: &'t CommandTable,
    /// Problems found so far; parsing never stops at the first one
    diagnostics: Vec<Diagnostic>,
    /// Counter for code block ids
    current_id: u32,
    /// Expressions and code blocks currently being parsed
    depth: usize,
}

impl<'t> Parser<'t> {
    pub fn new(mut tokens: Vec<Token>, file: &str, table: &'t CommandTable) -> Self {
        if tokens.last().map(|token| token.kind) != Some(TokenKind::EOF) {
            let end = tokens.last().map(|token| token.span.end).unwrap_or(0);
            tokens.push(Token {
                kind: TokenKind::EOF,
                value: String::from("EOF"),
                span: Span::new(end, end),
            });
        }

        Parser {
            tokens,
            pos: 0,
            last_end: 0,
            file: file.to_string(),
            stmt_lookup: HashMap::new(),
            nud_lookup: HashMap::new(),
            led_lookup: HashMap::new(),
            binding_power_lookup: HashMap::new(),
            table,
            diagnostics: vec![],
            current_id: 1,
            depth: 0,
        }
    }

    /// Returns the current token without advancing.
    pub fn current_token(&self) -> &Token {
        &self.tokens[self.pos]
    }

    /// Returns the kind of the current token.
    pub fn current_token_kind(&self) -> TokenKind {
        self.tokens[self.pos].kind
    }

    /// Returns the token `offset` positions ahead, clamped to `EOF`.
    pub fn peek(&self, offset: usize) -> &Token {
        let index = (self.pos + offset).min(self.tokens.len() - 1);
        &self.tokens[index]
    }

    /// Advances to the next token and returns the previous token.
    /// Stays on `EOF` once it is reached.
    pub fn advance(&mut self) -> &Token {
        let index = self.pos;
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        self.last_end = self.tokens[index].span.end;
        &self.tokens[index]
    }

    /// Expects a token of the specified kind, consuming it on success.
    pub fn expect_detailed(&mut self, expected_kind: TokenKind, message: &str) -> Result<Token, Diagnostic> {
        if self.current_token_kind() != expected_kind {
            return Err(self.unexpected(message));
        }
        Ok(self.advance().clone())
    }

    /// Builds the diagnostic for an unexpected current token.
    pub fn unexpected(&self, message: &str) -> Diagnostic {
        let token = self.current_token();
        let kind = match token.kind {
            TokenKind::EOF => DiagnosticKind::UnexpectedEof {
                expected: message.trim_start_matches("expected ").to_string(),
            },
            _ => DiagnosticKind::UnexpectedTokenDetailed {
                token: token.value.clone(),
                message: message.to_string(),
            },
        };
        Diagnostic::new(kind, token.span, &self.file)
    }

    pub fn error(&self, kind: DiagnosticKind, span: Span) -> Diagnostic {
        Diagnostic::new(kind, span, &self.file)
    }

    pub fn report(&mut self, diagnostic: Diagnostic) {
        debug!("{}", diagnostic);
        self.diagnostics.push(diagnostic);
    }

    /// Checks if there are more tokens to parse.
    pub fn has_tokens(&self) -> bool {
        self.current_token_kind() != TokenKind::EOF
    }

    pub fn get_pos(&self) -> usize {
        self.pos
    }

    /// Span from `start` to the end of the last consumed token.
    pub fn span_from(&self, start: Span) -> Span {
        Span::new(start.start, self.last_end.max(start.end))
    }

    pub fn get_table(&self) -> &'t CommandTable {
        self.table
    }

    /// Returns a reference to the statement lookup table.
    pub fn get_stmt_lookup(&self) -> &StmtLookup {
        &self.stmt_lookup
    }

    /// Returns a reference to the NUD (null denotation) lookup table.
    pub fn get_nud_lookup(&self) -> &NUDLookup {
        &self.nud_lookup
    }

    /// Returns a reference to the LED (left denotation) lookup table.
    pub fn get_led_lookup(&self) -> &LEDLookup {
        &self.led_lookup
    }

    /// Binding power of the current token in operator position.
    pub fn current_binding_power(&self) -> BindingPower {
        let token = self.current_token();
        match token.kind {
            TokenKind::Identifier if self.table.has_binary(&token.value) => {
                command_binding_power(&token.normalized())
            }
            TokenKind::Identifier => BindingPower::Default,
            kind => self
                .binding_power_lookup
                .get(&kind)
                .copied()
                .unwrap_or(BindingPower::Default),
        }
    }

    /// Registers a left denotation (infix) handler for a token.
    pub fn led(&mut self, kind: TokenKind, binding_power: BindingPower, led_fn: LEDHandler) {
        self.binding_power_lookup.insert(kind, binding_power);
        self.led_lookup.insert(kind, led_fn);
    }

    /// Registers a null denotation (prefix) handler for a token.
    pub fn nud(&mut self, kind: TokenKind, nud_fn: NUDHandler) {
        self.nud_lookup.insert(kind, nud_fn);
    }

    /// Registers a statement handler for a token.
    pub fn stmt(&mut self, kind: TokenKind, stmt_fn: StmtHandler) {
        self.stmt_lookup.insert(kind, stmt_fn);
    }

    /// Advances the internal ID counter and returns the previous value.
    pub fn advance_id(&mut self) -> u32 {
        let id = self.current_id;
        self.current_id += 1;
        id
    }

    /// Whether the token `offset` ahead can begin the operand of a unary
    /// command.
    ///
    /// A name the table knows as binary only starts an operand when it also
    /// has a unary form and is itself followed by an operand, as `count` in
    /// `hint count _list`.
    pub fn starts_operand(&self, mut offset: usize) -> bool {
        loop {
            let token = self.peek(offset);
            match token.kind {
                TokenKind::Number
                | TokenKind::String
                | TokenKind::OpenParen
                | TokenKind::OpenBracket
                | TokenKind::OpenCurly
                | TokenKind::Not => return true,
                TokenKind::Identifier if token.value.starts_with('_') => return true,
                TokenKind::Identifier if !self.table.has_binary(&token.value) => return true,
                // A command with both forms starts an operand only if its own
                // operand follows
                TokenKind::Identifier
                    if !self.table.lookup(&token.value, Arity::Unary).is_empty() =>
                {
                    offset += 1
                }
                _ => return false,
            }
        }
    }

    /// Skips the rest of a malformed statement.
    ///
    /// Stops after a `;` outside of nested braces, after a `,` outside of any
    /// nested brackets, or before a `}` or `EOF` closing the enclosing block.
    /// Brackets the statement opened before failing count as nesting. Returns
    /// the span of the skipped tokens, or an empty span at the current token
    /// when nothing was consumed.
    pub fn synchronize(&mut self, start: usize) -> Span {
        let mut curly = 0_usize;
        let mut groups = self.tokens[start..self.pos]
            .iter()
            .fold(0_usize, |depth, token| match token.kind {
                TokenKind::OpenParen | TokenKind::OpenBracket => depth + 1,
                TokenKind::CloseParen | TokenKind::CloseBracket => depth.saturating_sub(1),
                _ => depth,
            });

        loop {
            match self.current_token_kind() {
                TokenKind::EOF => break,
                TokenKind::CloseCurly if curly == 0 => break,
                TokenKind::CloseCurly => curly -= 1,
                TokenKind::OpenCurly => curly += 1,
                TokenKind::OpenParen | TokenKind::OpenBracket => groups += 1,
                TokenKind::CloseParen | TokenKind::CloseBracket => {
                    groups = groups.saturating_sub(1)
                }
                // `;` never appears inside brackets outside of a code block
                TokenKind::Semicolon if curly == 0 => {
                    self.advance();
                    break;
                }
                TokenKind::Comma if curly == 0 && groups == 0 => {
                    self.advance();
                    break;
                }
                _ => {}
            }
            self.advance();
        }

        let first = self.tokens[start].span;
        if self.pos > start {
            Span::new(first.start, self.last_end)
        } else {
            Span::new(first.start, first.start)
        }
    }

    pub fn get_depth(&self) -> usize {
        self.depth
    }

    pub fn enter_nested(&mut self) {
        self.depth += 1;
    }

    pub fn leave_nested(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Reports nesting past `MAX_NESTING_DEPTH` and skips the nested region
    /// starting at the current token, up to the closer of the enclosing group
    /// (not consumed), a `;` or `,` outside of it, or `EOF`.
    pub fn skip_nested(&mut self) -> Span {
        let start = self.current_token().span;
        let diagnostic = self.error(
            DiagnosticKind::NestingTooDeep {
                limit: MAX_NESTING_DEPTH,
            },
            start,
        );
        self.report(diagnostic);

        let first = self.pos;
        let mut depth = 0_usize;
        loop {
            match self.current_token_kind() {
                TokenKind::EOF => break,
                TokenKind::CloseCurly | TokenKind::CloseParen | TokenKind::CloseBracket
                    if depth == 0 =>
                {
                    break
                }
                TokenKind::Semicolon | TokenKind::Comma if depth == 0 => break,
                TokenKind::OpenCurly | TokenKind::OpenParen | TokenKind::OpenBracket => depth += 1,
                TokenKind::CloseCurly | TokenKind::CloseParen | TokenKind::CloseBracket => {
                    depth -= 1
                }
                _ => {}
            }
            self.advance();
        }

        if self.pos > first {
            Span::new(start.start, self.last_end)
        } else {
            Span::new(start.start, start.start)
        }
    }

    /// Skips to the next token of one of `kinds`, without crossing a statement
    /// boundary. Used to find the keyword after a malformed condition.
    pub fn skip_until(&mut self, kinds: &[TokenKind]) {
        let mut depth = 0_usize;

        loop {
            let kind = self.current_token_kind();
            if depth == 0 && kinds.contains(&kind) {
                break;
            }
            match kind {
                TokenKind::EOF => break,
                TokenKind::Semicolon | TokenKind::Comma | TokenKind::CloseCurly if depth == 0 => {
                    break
                }
                TokenKind::OpenCurly | TokenKind::OpenParen | TokenKind::OpenBracket => depth += 1,
                TokenKind::CloseCurly | TokenKind::CloseParen | TokenKind::CloseBracket => {
                    depth = depth.saturating_sub(1)
                }
                _ => {}
            }
            self.advance();
        }
    }

    /// Parses statements up to `terminator` (not consumed) or `EOF`.
    ///
    /// Statements are separated by `;` or `,`. A statement that fails to
    /// parse is reported and replaced by a `Stmt::Error` placeholder.
    pub fn parse_statements(&mut self, terminator: TokenKind) -> Vec<Stmt> {
        let mut statements = vec![];

        loop {
            while matches!(
                self.current_token_kind(),
                TokenKind::Semicolon | TokenKind::Comma
            ) {
                self.advance();
            }

            let kind = self.current_token_kind();
            if kind == terminator || kind == TokenKind::EOF {
                break;
            }

            if kind == TokenKind::CloseCurly {
                let token = self.advance().clone();
                let diagnostic = self.error(
                    DiagnosticKind::UnexpectedToken { token: token.value },
                    token.span,
                );
                self.report(diagnostic);
                statements.push(Stmt::Error(ErrorNode { span: token.span }));
                continue;
            }

            let start = self.pos;
            match parse_stmt(self) {
                Ok(stmt) => {
                    statements.push(stmt);
                    self.expect_separator(terminator);
                }
                Err(diagnostic) => {
                    self.report(diagnostic);
                    let span = self.synchronize(start);
                    statements.push(Stmt::Error(ErrorNode { span }));
                }
            }
        }

        statements
    }

    fn expect_separator(&mut self, terminator: TokenKind) {
        match self.current_token_kind() {
            TokenKind::Semicolon | TokenKind::Comma => {
                self.advance();
            }
            TokenKind::EOF | TokenKind::CloseCurly => {}
            kind if kind == terminator => {}
            _ => {
                let token = self.current_token().clone();
                let diagnostic = self.error(
                    DiagnosticKind::MissingSeparator { token: token.value },
                    token.span,
                );
                self.report(diagnostic);
            }
        }
    }
}

/// Result of parsing one source text: always a tree, plus any syntax problems.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseResult {
    pub program: Program,
    pub diagnostics: Vec<Diagnostic>,
}

/// Parses a stream of tokens into a syntax tree.
///
/// This is the main entry point for parsing. It creates a parser instance,
/// initializes all lookup tables, and parses all statements until EOF.
/// Malformed input never aborts the parse.
pub fn parse(tokens: Vec<Token>, file: &str, table: &CommandTable) -> ParseResult {
    let mut parser = Parser::new(tokens, file, table);
    create_token_lookups(&mut parser);

    let statements = parser.parse_statements(TokenKind::EOF);
    let end = parser.current_token().span.end;

    debug!(
        "parsed {}: {} statements, {} diagnostics",
        parser.file,
        statements.len(),
        parser.diagnostics.len()
    );

    ParseResult {
        program: Program {
            statements,
            span: Span::new(0, end),
        },
        diagnostics: parser.diagnostics,
    }
}
