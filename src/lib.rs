#![allow(clippy::module_inception)]

use serde::{Deserialize, Serialize};

use crate::{
    commands::signatures::CommandTable,
    errors::errors::Diagnostic,
    lexer::lexer::tokenize,
    parser::parser::{parse, ParseResult},
    type_checker::type_checker::{type_check, CheckerConfig},
};

pub mod ast;
pub mod cache;
pub mod commands;
pub mod errors;
pub mod header;
pub mod lexer;
pub mod macros;
pub mod parser;
pub mod type_checker;

extern crate regex;

/// Byte range into the source text a node or token was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    pub fn new(start: u32, end: u32) -> Self {
        Span { start, end }
    }

    pub fn null() -> Self {
        Span { start: 0, end: 0 }
    }

    pub fn len(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Smallest span covering both `self` and `other`.
    pub fn to(&self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

/// Parses SQF source with the bundled command table.
///
/// Always returns a tree, even for malformed input; syntax problems are
/// reported through `ParseResult::diagnostics`.
pub fn parse_source(source: &str, file: &str) -> ParseResult {
    let (tokens, lex_diagnostics) = tokenize(source, Some(file));
    let mut result = parse(tokens, file, CommandTable::global());

    let mut diagnostics = lex_diagnostics;
    diagnostics.append(&mut result.diagnostics);
    diagnostics.sort_by_key(|d| d.get_span().start);
    result.diagnostics = diagnostics;

    result
}

/// Parses and checks SQF source with the bundled command table and default
/// checker settings. Syntax diagnostics come first, then semantic ones.
pub fn check_source(source: &str, file: &str) -> Vec<Diagnostic> {
    let parsed = parse_source(source, file);
    let checked = type_check(
        &parsed.program,
        CommandTable::global(),
        &CheckerConfig::default(),
        file,
    );

    let mut diagnostics = parsed.diagnostics;
    diagnostics.extend(checked.diagnostics);
    diagnostics
}

/// Finds the line containing byte offset `position`.
///
/// Returns the 1-based line number, the line text and the offset of
/// `position` within that line. Offsets past the end resolve to the last line.
pub fn get_line_at_position(source: &str, position: u32) -> (usize, String, usize) {
    let pos = (position as usize).min(source.len());

    let mut start = 0;
    let mut line_number = 1;
    let mut last = (1, String::new(), 0);

    for line in source.split_inclusive('\n') {
        let end = start + line.len();

        if (start..end).contains(&pos) {
            return (line_number, line.to_string(), pos - start);
        }

        last = (line_number, line.to_string(), line.len());
        start = end;
        line_number += 1;
    }

    if source.ends_with('\n') || source.is_empty() {
        (line_number, String::new(), 0)
    } else {
        last
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_line_at_position() {
        let source = "Hello, world!\nsecond line\n\nTesting { }\n";

        let (line_number, line, line_pos) = get_line_at_position(source, 10);
        assert_eq!(line_number, 1);
        assert_eq!(line, "Hello, world!\n");
        assert_eq!(line_pos, 10);

        let (line_number, line, line_pos) = get_line_at_position(source, 35);
        assert_eq!(line_number, 4);
        assert_eq!(line, "Testing { }\n");
        assert_eq!(line_pos, 8);
    }

    #[test]
    fn test_get_line_past_end() {
        let (line_number, line, line_pos) = get_line_at_position("abc", 10);
        assert_eq!(line_number, 1);
        assert_eq!(line, "abc");
        assert_eq!(line_pos, 3);
    }

    #[test]
    fn test_span_join() {
        let joined = Span::new(4, 6).to(Span::new(1, 3));
        assert_eq!(joined, Span::new(1, 6));
        assert_eq!(joined.len(), 5);
        assert!(Span::null().is_empty());
    }
}
