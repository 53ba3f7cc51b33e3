use lazy_static::lazy_static;
use log::trace;
use regex::Regex;

use crate::{
    errors::errors::{Diagnostic, DiagnosticKind},
    Span, MK_DEFAULT_HANDLER, MK_TOKEN,
};

use super::tokens::{Token, TokenKind, RESERVED_LOOKUP};

pub type RegexHandler = fn(&mut Lexer, &Regex);

pub struct RegexPattern {
    regex: Regex,
    handler: RegexHandler,
}

lazy_static! {
    // Order matters: the first pattern matching at the cursor wins, so longer
    // operators come before their prefixes.
    static ref PATTERNS: Vec<RegexPattern> = vec![
        RegexPattern { regex: Regex::new(r"^\s+").unwrap(), handler: skip_handler },
        RegexPattern { regex: Regex::new(r"^//[^\n]*").unwrap(), handler: skip_handler },
        RegexPattern { regex: Regex::new(r"^/\*").unwrap(), handler: block_comment_handler },
        RegexPattern { regex: Regex::new(r"^#").unwrap(), handler: hash_handler },
        RegexPattern { regex: Regex::new(r"^(0[xX]|\$)[0-9a-fA-F]+").unwrap(), handler: number_handler },
        RegexPattern { regex: Regex::new(r"^([0-9]+(\.[0-9]+)?|\.[0-9]+)([eE][+-]?[0-9]+)?").unwrap(), handler: number_handler },
        RegexPattern { regex: Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_]*").unwrap(), handler: symbol_handler },
        RegexPattern { regex: Regex::new("^[\"']").unwrap(), handler: string_handler },
        RegexPattern { regex: Regex::new(r"^\[").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::OpenBracket, "[") },
        RegexPattern { regex: Regex::new(r"^\]").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::CloseBracket, "]") },
        RegexPattern { regex: Regex::new(r"^\{").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::OpenCurly, "{") },
        RegexPattern { regex: Regex::new(r"^\}").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::CloseCurly, "}") },
        RegexPattern { regex: Regex::new(r"^\(").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::OpenParen, "(") },
        RegexPattern { regex: Regex::new(r"^\)").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::CloseParen, ")") },
        RegexPattern { regex: Regex::new(r"^==").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Equals, "==") },
        RegexPattern { regex: Regex::new(r"^!=").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::NotEquals, "!=") },
        RegexPattern { regex: Regex::new(r"^!").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Not, "!") },
        RegexPattern { regex: Regex::new(r"^=").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Assignment, "=") },
        RegexPattern { regex: Regex::new(r"^<=").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::LessEquals, "<=") },
        RegexPattern { regex: Regex::new(r"^<").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Less, "<") },
        RegexPattern { regex: Regex::new(r"^>>").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::ConfigPath, ">>") },
        RegexPattern { regex: Regex::new(r"^>=").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::GreaterEquals, ">=") },
        RegexPattern { regex: Regex::new(r"^>").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Greater, ">") },
        RegexPattern { regex: Regex::new(r"^\|\|").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Or, "||") },
        RegexPattern { regex: Regex::new(r"^&&").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::And, "&&") },
        RegexPattern { regex: Regex::new(r"^;").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Semicolon, ";") },
        RegexPattern { regex: Regex::new(r"^:").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Colon, ":") },
        RegexPattern { regex: Regex::new(r"^,").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Comma, ",") },
        RegexPattern { regex: Regex::new(r"^\+=").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::PlusEquals, "+=") },
        RegexPattern { regex: Regex::new(r"^\+").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Plus, "+") },
        RegexPattern { regex: Regex::new(r"^-").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Dash, "-") },
        RegexPattern { regex: Regex::new(r"^/").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Slash, "/") },
        RegexPattern { regex: Regex::new(r"^\*").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Star, "*") },
        RegexPattern { regex: Regex::new(r"^%").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Percent, "%") },
        RegexPattern { regex: Regex::new(r"^\^").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Caret, "^") },
    ];
}

pub struct Lexer {
    tokens: Vec<Token>,
    diagnostics: Vec<Diagnostic>,
    source: String,
    pos: usize,
    file: String,
}

impl Lexer {
    pub fn new(source: &str, file: Option<&str>) -> Lexer {
        Lexer {
            pos: 0,
            tokens: vec![],
            diagnostics: vec![],
            source: source.to_string(),
            file: file.unwrap_or("shell").to_string(),
        }
    }

    pub fn advance_n(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.source.len());
    }

    pub fn push(&mut self, token: Token) {
        self.tokens.push(token);
    }

    pub fn report(&mut self, kind: DiagnosticKind, span: Span) {
        self.diagnostics.push(Diagnostic::new(kind, span, &self.file));
    }

    pub fn at(&self) -> Option<char> {
        self.remainder().chars().next()
    }

    pub fn remainder(&self) -> &str {
        &self.source[self.pos..]
    }

    pub fn at_eof(&self) -> bool {
        self.pos >= self.source.len()
    }

    /// True when only blanks precede the cursor on its line.
    fn at_line_start(&self) -> bool {
        self.source[..self.pos]
            .chars()
            .rev()
            .take_while(|c| *c != '\n')
            .all(|c| c == ' ' || c == '\t')
    }

    fn span_from(&self, start: usize) -> Span {
        Span::new(start as u32, self.pos as u32)
    }
}

fn matched_len(lexer: &Lexer, regex: &Regex) -> usize {
    regex.find(lexer.remainder()).map(|m| m.end()).unwrap_or(0)
}

fn skip_handler(lexer: &mut Lexer, regex: &Regex) {
    let matched = matched_len(lexer, regex);
    lexer.advance_n(matched);
}

fn block_comment_handler(lexer: &mut Lexer, _regex: &Regex) {
    let start = lexer.pos;
    match lexer.remainder()[2..].find("*/") {
        Some(end) => lexer.advance_n(end + 4),
        None => {
            lexer.report(
                DiagnosticKind::UnterminatedComment,
                Span::new(start as u32, start as u32 + 2),
            );
            let rest = lexer.remainder().len();
            lexer.advance_n(rest);
        }
    }
}

// `#define`, `#include` and friends at the start of a line are preprocessor
// directives and are skipped along with their `\` continuations. Anywhere
// else `#` is the select operator.
fn hash_handler(lexer: &mut Lexer, _regex: &Regex) {
    let is_directive = lexer.at_line_start()
        && lexer.remainder()[1..]
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic());

    if !is_directive {
        let start = lexer.pos;
        lexer.push(MK_TOKEN!(
            TokenKind::Hash,
            String::from("#"),
            Span::new(start as u32, start as u32 + 1)
        ));
        lexer.advance_n(1);
        return;
    }

    loop {
        let line_len = lexer.remainder().find('\n').unwrap_or(lexer.remainder().len());
        let continued = lexer.remainder()[..line_len].trim_end().ends_with('\\');
        lexer.advance_n(line_len + 1);
        if !continued || lexer.at_eof() {
            break;
        }
    }
}

fn number_handler(lexer: &mut Lexer, regex: &Regex) {
    let start = lexer.pos;
    let matched = matched_len(lexer, regex);
    let value = lexer.remainder()[..matched].to_string();

    lexer.advance_n(matched);
    let span = lexer.span_from(start);
    lexer.push(MK_TOKEN!(TokenKind::Number, value, span));
}

/// SQF strings have no backslash escapes; a doubled quote stands for one quote.
fn string_handler(lexer: &mut Lexer, _regex: &Regex) {
    let start = lexer.pos;
    let quote = match lexer.at() {
        Some(quote) => quote,
        None => return,
    };

    let mut value = String::new();
    let mut chars = lexer.remainder()[1..].char_indices().peekable();
    let mut closed_at = None;

    while let Some((index, ch)) = chars.next() {
        if ch == quote {
            if chars.peek().map(|(_, next)| *next) == Some(quote) {
                value.push(quote);
                chars.next();
            } else {
                closed_at = Some(index);
                break;
            }
        } else {
            value.push(ch);
        }
    }

    match closed_at {
        Some(index) => lexer.advance_n(index + 2),
        None => {
            let rest = lexer.remainder().len();
            lexer.advance_n(rest);
            let span = lexer.span_from(start);
            lexer.report(DiagnosticKind::UnterminatedString, span);
        }
    }

    let span = lexer.span_from(start);
    lexer.push(MK_TOKEN!(TokenKind::String, value, span));
}

fn symbol_handler(lexer: &mut Lexer, regex: &Regex) {
    let start = lexer.pos;
    let matched = matched_len(lexer, regex);
    let value = lexer.remainder()[..matched].to_string();

    let kind = RESERVED_LOOKUP
        .get(value.to_ascii_lowercase().as_str())
        .copied()
        .unwrap_or(TokenKind::Identifier);

    lexer.advance_n(matched);
    let span = lexer.span_from(start);
    lexer.push(MK_TOKEN!(kind, value, span));
}

/// Splits SQF or header source into tokens.
///
/// Never fails: characters that start no token are skipped and reported,
/// so the returned list always ends with an `EOF` token.
pub fn tokenize(source: &str, file: Option<&str>) -> (Vec<Token>, Vec<Diagnostic>) {
    let mut lex = Lexer::new(source, file);

    while !lex.at_eof() {
        let mut matched = false;

        for pattern in PATTERNS.iter() {
            if pattern.regex.is_match(lex.remainder()) {
                (pattern.handler)(&mut lex, &pattern.regex);
                matched = true;
                break;
            }
        }

        if !matched {
            let start = lex.pos;
            let ch = lex.at().unwrap_or('\0');
            lex.advance_n(ch.len_utf8());
            let span = lex.span_from(start);
            lex.report(
                DiagnosticKind::UnrecognisedToken {
                    token: ch.to_string(),
                },
                span,
            );
        }
    }

    let end = lex.pos as u32;
    lex.push(MK_TOKEN!(TokenKind::EOF, String::from("EOF"), Span::new(end, end)));

    trace!(
        "tokenized {} into {} tokens ({} diagnostics)",
        lex.file,
        lex.tokens.len(),
        lex.diagnostics.len()
    );

    (lex.tokens, lex.diagnostics)
}
