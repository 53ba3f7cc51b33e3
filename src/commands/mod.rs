//! Command signature table.
//!
//! Every SQF operator and command word is a command with one or more
//! signatures per arity (nular, unary, binary). The table is loaded once from
//! the bundled descriptor list and is read-only afterwards.

pub mod descriptors;
pub mod signatures;
