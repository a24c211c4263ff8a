//! Prose Eval - tree-walking interpreter for Prose programs.
//!
//! # Architecture
//!
//! - [`Environment`]: an arena of scopes addressed by [`ScopeId`]; closures
//!   hold the id of their declaring scope
//! - [`Value`] and [`TypedValue`]: runtime values paired with their resolved
//!   type, which drives integer-to-rational widening on assignment
//! - [`Interpreter`]: statement execution, calls, natives and module loading
//! - [`PrintHandlerImpl`] and [`InputHandlerImpl`]: where `write` goes and
//!   where `read` comes from, swappable for tests
//! - [`ModuleLoader`]: how `import m` finds `m.prose`

mod environment;
pub mod errors;
mod input_handler;
pub mod interpreter;
mod module_loader;
mod operators;
mod print_handler;
mod value;

pub use environment::{Binding, Capture, Environment, ScopeId};
pub use errors::{EvalError, EvalErrorKind, EvalResult};
pub use input_handler::{scripted_handler, stdin_handler, InputHandlerImpl, SharedInputHandler};
pub use interpreter::{
    Flow, Interpreter, InterpreterBuilder, ScopedInterpreter, DEFAULT_MAX_CALL_DEPTH,
};
pub use module_loader::{
    module_path, FsLoader, LoadError, LoadedModule, MemoryLoader, ModuleLoader, SOURCE_EXTENSION,
};
pub use print_handler::{
    buffer_handler, silent_handler, stdout_handler, BufferPrintHandler, PrintHandlerImpl,
    SharedPrintHandler, StdoutPrintHandler,
};
pub use value::{Closure, ListRef, Module, StructInstance, TypedValue, Value};
