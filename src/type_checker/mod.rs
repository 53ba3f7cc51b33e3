//! Syntax and type checking of a parsed SQF program.
//!
//! The checker walks the tree once, depth-first, and collects diagnostics
//! instead of stopping at the first problem:
//!
//! - Commands are resolved against the command table by name, arity and
//!   operand types
//! - Local variables are tracked per code block scope
//! - Control constructs are checked for missing conditions and bodies
//!
//! Nodes the parser replaced with error placeholders type as `Any` and are
//! not reported twice.

pub mod scope;
pub mod type_checker;

#[cfg(test)]
mod tests;
