use log::debug;

use crate::{
    errors::errors::{Diagnostic, DiagnosticKind},
    lexer::{
        lexer::tokenize,
        tokens::{Token, TokenKind},
    },
    parser::{expr::parse_number, parser::MAX_NESTING_DEPTH},
    Span,
};

use super::models::{HeaderClass, HeaderEntry, HeaderFile, HeaderProperty, HeaderValue};

#[derive(Debug, Clone, PartialEq)]
pub struct HeaderParseResult {
    pub file: HeaderFile,
    pub diagnostics: Vec<Diagnostic>,
}

struct HeaderParser<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    pos: usize,
    file: String,
    diagnostics: Vec<Diagnostic>,
    /// Classes and arrays currently being parsed
    depth: usize,
}

impl<'a> HeaderParser<'a> {
    fn new(source: &'a str, tokens: Vec<Token>, file: &str) -> Self {
        HeaderParser {
            source,
            tokens,
            pos: 0,
            file: file.to_string(),
            diagnostics: vec![],
            depth: 0,
        }
    }

    fn current_token(&self) -> &Token {
        let index = self.pos.min(self.tokens.len() - 1);
        &self.tokens[index]
    }

    fn current_token_kind(&self) -> TokenKind {
        self.current_token().kind
    }

    fn advance(&mut self) -> Token {
        let token = self.current_token().clone();
        if token.kind != TokenKind::EOF {
            self.pos += 1;
        }
        token
    }

    /// Class and property names may collide with SQF keywords.
    fn at_name(&self) -> bool {
        let kind = self.current_token_kind();
        kind == TokenKind::Identifier || kind.is_keyword()
    }

    fn unexpected(&self, message: &str) -> Diagnostic {
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

    fn report(&mut self, diagnostic: Diagnostic) {
        debug!("{}", diagnostic);
        self.diagnostics.push(diagnostic);
    }

    fn expect(&mut self, kind: TokenKind, message: &str) -> Result<Token, Diagnostic> {
        if self.current_token_kind() != kind {
            return Err(self.unexpected(message));
        }
        Ok(self.advance())
    }

    fn expect_name(&mut self, message: &str) -> Result<Token, Diagnostic> {
        if !self.at_name() {
            return Err(self.unexpected(message));
        }
        Ok(self.advance())
    }

    /// A missing `;` after an entry is reported but not fatal.
    fn expect_terminator(&mut self, after: Span) {
        if self.current_token_kind() == TokenKind::Semicolon {
            self.advance();
            return;
        }

        let token = self.current_token().clone();
        let kind = DiagnosticKind::MissingSeparator { token: token.value };
        let diagnostic = Diagnostic::new(kind, Span::new(after.end, after.end), &self.file);
        self.report(diagnostic);
    }

    /// Skips past the next `;`, or up to the `}` closing the current class.
    /// Braces the failed entry opened from `start` on count as nesting.
    fn synchronize(&mut self, start: usize) {
        let mut depth = self.tokens[start..self.pos]
            .iter()
            .fold(0usize, |depth, token| match token.kind {
                TokenKind::OpenCurly => depth + 1,
                TokenKind::CloseCurly => depth.saturating_sub(1),
                _ => depth,
            });
        loop {
            match self.current_token_kind() {
                TokenKind::EOF => return,
                TokenKind::Semicolon if depth == 0 => {
                    self.advance();
                    return;
                }
                TokenKind::CloseCurly if depth == 0 => return,
                TokenKind::OpenCurly => depth += 1,
                TokenKind::CloseCurly => depth -= 1,
                _ => {}
            }
            self.advance();
        }
    }

    /// Fails at the current `{` when it would nest past `MAX_NESTING_DEPTH`.
    fn check_depth(&self) -> Result<(), Diagnostic> {
        if self.depth < MAX_NESTING_DEPTH {
            return Ok(());
        }

        Err(Diagnostic::new(
            DiagnosticKind::NestingTooDeep {
                limit: MAX_NESTING_DEPTH,
            },
            self.current_token().span,
            &self.file,
        ))
    }

    fn parse_entries(&mut self) -> Vec<HeaderEntry> {
        let mut entries = vec![];

        loop {
            match self.current_token_kind() {
                TokenKind::EOF | TokenKind::CloseCurly => break,
                TokenKind::Semicolon => {
                    self.advance();
                    continue;
                }
                _ => {}
            }

            let start = self.pos;
            let entry = if !self.at_name() {
                Err(self.unexpected("expected `class` or a property"))
            } else if self.current_token().value.eq_ignore_ascii_case("class") {
                self.parse_class().map(HeaderEntry::Class)
            } else {
                self.parse_property().map(HeaderEntry::Property)
            };

            match entry {
                Ok(entry) => entries.push(entry),
                Err(diagnostic) => {
                    self.report(diagnostic);
                    self.synchronize(start);
                    if self.pos == start {
                        self.advance();
                    }
                }
            }
        }

        entries
    }

    fn parse_class(&mut self) -> Result<HeaderClass, Diagnostic> {
        let start = self.advance().span;
        let name = self.expect_name("expected a class name")?;

        let parent = if self.current_token_kind() == TokenKind::Colon {
            self.advance();
            Some(self.expect_name("expected a base class name")?.value)
        } else {
            None
        };

        if self.current_token_kind() == TokenKind::Semicolon {
            let end = self.advance().span;
            return Ok(HeaderClass {
                name: name.value,
                parent,
                entries: vec![],
                is_forward: true,
                span: start.to(end),
            });
        }

        if self.current_token_kind() == TokenKind::OpenCurly {
            self.check_depth()?;
        }
        self.expect(TokenKind::OpenCurly, "expected `{` or `;`")?;
        self.depth += 1;
        let entries = self.parse_entries();
        self.depth -= 1;

        let close = match self.expect(TokenKind::CloseCurly, "expected `}`") {
            Ok(token) => {
                self.expect_terminator(token.span);
                token.span
            }
            Err(diagnostic) => {
                let at = diagnostic.get_span();
                self.report(diagnostic);
                at
            }
        };

        Ok(HeaderClass {
            name: name.value,
            parent,
            entries,
            is_forward: false,
            span: start.to(close),
        })
    }

    fn parse_property(&mut self) -> Result<HeaderProperty, Diagnostic> {
        let name = self.advance();

        let is_array = self.current_token_kind() == TokenKind::OpenBracket;
        if is_array {
            self.advance();
            self.expect(TokenKind::CloseBracket, "expected `]`")?;
        }

        let appends = match self.current_token_kind() {
            TokenKind::Assignment => false,
            TokenKind::PlusEquals if is_array => true,
            _ => return Err(self.unexpected("expected `=`")),
        };
        self.advance();

        if is_array && self.current_token_kind() != TokenKind::OpenCurly {
            return Err(self.unexpected("expected `{`"));
        }
        let value = self.parse_value()?;

        let end = self.tokens[self.pos.saturating_sub(1)].span;
        self.expect_terminator(end);

        Ok(HeaderProperty {
            name: name.value,
            value,
            is_array,
            appends,
            span: name.span.to(end),
        })
    }

    fn parse_value(&mut self) -> Result<HeaderValue, Diagnostic> {
        match self.current_token_kind() {
            TokenKind::String => Ok(HeaderValue::String(self.advance().value)),
            TokenKind::Number => self.parse_number(false),
            TokenKind::Dash => {
                self.advance();
                self.parse_number(true)
            }
            TokenKind::OpenCurly => self.parse_array(),
            TokenKind::Semicolon | TokenKind::Comma | TokenKind::CloseCurly | TokenKind::EOF => {
                Err(self.unexpected("expected a value"))
            }
            _ => Ok(self.parse_word()),
        }
    }

    fn parse_number(&mut self, negative: bool) -> Result<HeaderValue, Diagnostic> {
        let token = self.expect(TokenKind::Number, "expected a number")?;

        match parse_number(&token.value) {
            Some(value) if negative => Ok(HeaderValue::Number(-value)),
            Some(value) => Ok(HeaderValue::Number(value)),
            None => Err(Diagnostic::new(
                DiagnosticKind::NumberParseError { token: token.value },
                token.span,
                &self.file,
            )),
        }
    }

    fn parse_array(&mut self) -> Result<HeaderValue, Diagnostic> {
        self.check_depth()?;
        self.advance();

        self.depth += 1;
        let values = self.parse_array_values();
        self.depth -= 1;

        let values = values?;
        self.advance();
        Ok(HeaderValue::Array(values))
    }

    fn parse_array_values(&mut self) -> Result<Vec<HeaderValue>, Diagnostic> {
        let mut values = vec![];

        while self.current_token_kind() != TokenKind::CloseCurly {
            values.push(self.parse_value()?);

            match self.current_token_kind() {
                TokenKind::Comma => {
                    self.advance();
                }
                TokenKind::CloseCurly => break,
                _ => return Err(self.unexpected("expected `,` or `}`")),
            }
        }

        Ok(values)
    }

    /// Raw text up to the end of the value, e.g. `QUOTE(x)`.
    fn parse_word(&mut self) -> HeaderValue {
        let start = self.current_token().span.start;
        let mut end = start;

        while !matches!(
            self.current_token_kind(),
            TokenKind::Semicolon | TokenKind::Comma | TokenKind::CloseCurly | TokenKind::EOF
        ) {
            end = self.advance().span.end;
        }

        let text = self
            .source
            .get(start as usize..end as usize)
            .unwrap_or_default()
            .trim();
        HeaderValue::Word(text.to_string())
    }
}

/// Parses a config/header file (`description.ext`, `config.cpp`, `.hpp`).
///
/// Like the SQF parser this never fails outright: malformed entries are
/// reported and skipped, and the rest of the file is still read.
pub fn parse_header(source: &str, file: &str) -> HeaderParseResult {
    let (tokens, mut diagnostics) = tokenize(source, Some(file));
    let mut parser = HeaderParser::new(source, tokens, file);

    let mut entries = parser.parse_entries();
    while parser.current_token_kind() != TokenKind::EOF {
        // Unbalanced `}` at the top level
        let diagnostic = parser.unexpected("expected `class` or a property");
        parser.report(diagnostic);
        parser.advance();
        entries.append(&mut parser.parse_entries());
    }

    diagnostics.append(&mut parser.diagnostics);
    diagnostics.sort_by_key(|d| d.get_span().start);
    debug!(
        "parsed header {}: {} top-level entries, {} diagnostics",
        file,
        entries.len(),
        diagnostics.len()
    );

    HeaderParseResult {
        file: HeaderFile { entries },
        diagnostics,
    }
}
