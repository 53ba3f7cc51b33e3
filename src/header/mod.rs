//! Parser for config/header files (`description.ext`, `config.cpp`, `.hpp`).
//!
//! Reuses the SQF lexer and produces a tree of classes and properties that
//! can be queried by path. `CfgFunctions` declarations are exposed as
//! [`models::ConfigFunction`]s so the checker can treat them as known code.

pub mod models;
pub mod parser;

#[cfg(test)]
mod tests;
