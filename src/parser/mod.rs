//! Parser module for building the SQF syntax tree.
//!
//! This module contains the parser that transforms a stream of tokens
//! into a syntax tree. It uses a Pratt parser for expressions with
//! SQF's operator precedence and handles:
//!
//! - Statements (assignments, expression statements)
//! - Control constructs (if, while, for, switch, case)
//! - Unary and binary commands, classified with the command table
//! - Error recovery: malformed input yields placeholder nodes and
//!   diagnostics, never a missing tree
//!
//! The parser uses NUD (null denotation) and LED (left denotation) functions
//! for expression parsing with binding power for precedence handling.

pub mod expr;
pub mod lookups;
pub mod parser;
pub mod stmt;
