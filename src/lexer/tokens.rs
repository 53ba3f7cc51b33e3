use lazy_static::lazy_static;
use std::{collections::HashMap, fmt::Display};

use crate::Span;

lazy_static! {
    /// Keywords, keyed by lowercase spelling. SQF keywords are case-insensitive.
    pub static ref RESERVED_LOOKUP: HashMap<&'static str, TokenKind> = {
        let mut map = HashMap::new();
        map.insert("if", TokenKind::If);
        map.insert("then", TokenKind::Then);
        map.insert("else", TokenKind::Else);
        map.insert("exitwith", TokenKind::ExitWith);
        map.insert("while", TokenKind::While);
        map.insert("do", TokenKind::Do);
        map.insert("for", TokenKind::For);
        map.insert("from", TokenKind::From);
        map.insert("to", TokenKind::To);
        map.insert("step", TokenKind::Step);
        map.insert("switch", TokenKind::Switch);
        map.insert("case", TokenKind::Case);
        map.insert("default", TokenKind::Default);
        map.insert("private", TokenKind::Private);
        map.insert("and", TokenKind::And);
        map.insert("or", TokenKind::Or);
        map.insert("not", TokenKind::Not);
        map
    };
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum TokenKind {
    EOF,
    Number,
    String,
    Identifier,

    OpenBracket,
    CloseBracket,
    OpenCurly,
    CloseCurly,
    OpenParen,
    CloseParen,

    Assignment, // =
    Equals,     // ==
    Not,        // ! / not
    NotEquals,  // !=

    Less,
    LessEquals,
    Greater,
    GreaterEquals,
    ConfigPath, // >>

    Or,
    And,

    Semicolon,
    Colon,
    Comma,

    PlusEquals,
    Plus,
    Dash,
    Slash,
    Star,
    Percent,
    Caret,
    Hash,

    // Reserved
    If,
    Then,
    Else,
    ExitWith,
    While,
    Do,
    For,
    From,
    To,
    Step,
    Switch,
    Case,
    Default,
    Private,
}

impl TokenKind {
    /// True for word-like keywords, which the header parser accepts as names.
    pub fn is_keyword(&self) -> bool {
        matches!(
            self,
            TokenKind::If
                | TokenKind::Then
                | TokenKind::Else
                | TokenKind::ExitWith
                | TokenKind::While
                | TokenKind::Do
                | TokenKind::For
                | TokenKind::From
                | TokenKind::To
                | TokenKind::Step
                | TokenKind::Switch
                | TokenKind::Case
                | TokenKind::Default
                | TokenKind::Private
                | TokenKind::And
                | TokenKind::Or
                | TokenKind::Not
        )
    }
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    pub span: Span,
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            TokenKind::EOF => write!(f, "end of input"),
            TokenKind::String => write!(f, "\"{}\"", self.value),
            _ => write!(f, "{}", self.value),
        }
    }
}

impl Token {
    pub fn is_one_of_many(&self, kinds: &[TokenKind]) -> bool {
        kinds.contains(&self.kind)
    }

    /// Lowercased text, the form used for command and keyword lookups.
    pub fn normalized(&self) -> String {
        self.value.to_ascii_lowercase()
    }
}
