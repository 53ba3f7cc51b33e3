//! Diagnostics and error types for the front-end.
//!
//! This module defines:
//!
//! - `Diagnostic`, the positioned problem report produced by the lexer,
//!   parser, header parser and checker
//! - `DiagnosticKind`, one variant per kind of problem
//! - rendering of a diagnostic against its source text
//! - the fail-fast error types for value-type construction, command table
//!   loading and the module cache

pub mod errors;
