//! Prose IR - shared data structures for every stage of the toolchain.
//!
//! - [`Position`] and [`LineIndex`] for 1-based source locations
//! - [`Token`], [`TokenKind`] and [`TokenList`] for lexer output
//! - The syntax tree in [`ast`]: [`Program`], [`Stmt`], [`Expr`], [`TypeNode`]
//!
//! Everything in this crate is created once by the lexer or parser and never
//! mutated afterwards. Runtime state lives in `prose_eval`.

pub mod ast;
mod position;
mod token;

pub use ast::{
    AssignTarget, BinaryOp, Block, CondBlock, Expr, FieldDecl, FunctionDecl, Ident, ImportDecl,
    Literal, Param, Program, Stmt, StructDecl, TypeNode, UnaryOp,
};
pub use position::{LineIndex, Position};
pub use token::{Token, TokenKind, TokenList};
