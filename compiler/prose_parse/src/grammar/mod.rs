//! Grammar productions, split by syntactic category.

mod decl;
mod expr;
mod operators;
mod stmt;
mod ty;
