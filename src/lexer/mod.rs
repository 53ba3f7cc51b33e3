//! Lexical analysis for SQF and header files.
//!
//! This module contains the lexer that converts source text into a stream
//! of tokens for parsing. It handles:
//!
//! - Tokenization using anchored regex patterns
//! - Case-insensitive keyword recognition
//! - Decimal and hexadecimal numbers, both string quote styles
//! - Skipping comments, whitespace and preprocessor lines

pub mod lexer;
pub mod tokens;
