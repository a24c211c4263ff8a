//! Diagnostics for every stage of the Prose toolchain.
//!
//! Lexer, parser, checker and interpreter errors each convert into a
//! [`Diagnostic`]: a stable [`ErrorCode`], a message and the 1-based source
//! position of the offending token. The [`TerminalEmitter`] renders them with
//! the offending source line and a caret.

mod diagnostic;
mod emitter;
mod error_code;

pub use diagnostic::{Diagnostic, Severity};
pub use emitter::{ColorMode, DiagnosticEmitter, TerminalEmitter};
pub use error_code::ErrorCode;
