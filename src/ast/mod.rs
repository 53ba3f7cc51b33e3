/// AST (Abstract Syntax Tree) module
/// Contains all definitions related to the SQF syntax tree
///
/// Submodules:
/// - ast: Borrowed node view and generic traversal
/// - expressions: Expression node kinds
/// - statements: Statement and control construct node kinds
/// - types: Value types of expressions and command parameters
pub mod ast;
pub mod expressions;
pub mod statements;
pub mod types;

#[cfg(test)]
mod tests;
