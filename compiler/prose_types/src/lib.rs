//! Type model for Prose.
//!
//! - [`Type`]: the closed set of static types and their compatibility rules
//! - [`natives`]: signatures of the built-in functions
//! - [`SymbolTable`]: the scoped declaration registry the parser fills in
//! - [`StaticType`]: per-expression type inference
//! - [`check_program`]: an optional full pass reporting static type errors
//!
//! Execution does not depend on the check pass. The interpreter coerces
//! values at runtime; [`check_program`] exists for callers that want errors
//! reported before anything runs.

mod check;
pub mod natives;
mod static_type;
mod symbol_table;
mod ty;

pub use check::{check_program, TypeError, TypeErrorKind};
pub use natives::{native, NativeSignature, Receiver};
pub use static_type::StaticType;
pub use symbol_table::{Symbol, SymbolError, SymbolTable};
pub use ty::{FunctionSignature, StructType, Type};
