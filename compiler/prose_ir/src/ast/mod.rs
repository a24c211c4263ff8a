//! Syntax tree for Prose programs.
//!
//! Expressions and statements are closed tagged unions; every consumer
//! (type checker, interpreter) matches on them exhaustively.

mod expr;
mod operators;
mod stmt;
mod type_node;

pub use expr::{Expr, Ident, Literal};
pub use operators::{BinaryOp, UnaryOp};
pub use stmt::{
    AssignTarget, Block, CondBlock, FieldDecl, FunctionDecl, ImportDecl, Param, Program, Stmt,
    StructDecl,
};
pub use type_node::TypeNode;

#[cfg(test)]
mod tests;
