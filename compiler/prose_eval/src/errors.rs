//! Runtime error types.
//!
//! Errors are built through the `#[cold]` factory functions below and then
//! tagged with the position of the expression or statement that failed via
//! [`EvalError::at`]. Nothing inside the interpreter recovers from an
//! error; it propagates to whoever called [`crate::Interpreter::run`].

use std::path::{Path, PathBuf};

use prose_diagnostic::{Diagnostic, ErrorCode};
use prose_ir::{BinaryOp, Position, UnaryOp};
use thiserror::Error;

/// Result of evaluating an expression or running a program.
pub type EvalResult<T> = Result<T, EvalError>;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum EvalErrorKind {
    #[error("`{name}` is not defined")]
    Undefined { name: String },
    #[error("a value of type {found} is not callable")]
    NotCallable { found: String },
    #[error("`{name}` expects {expected} argument(s) but {found} were given")]
    WrongArgCount {
        name: String,
        expected: usize,
        found: usize,
    },
    #[error("index {index} is out of range for length {len}")]
    IndexOutOfRange { index: i64, len: usize },
    #[error("division by zero")]
    DivisionByZero,
    #[error("module `{module}` not found (looked for {path})")]
    ModuleNotFound { module: String, path: String },
    #[error("{on} has no member `{member}`")]
    UnknownMember { member: String, on: String },
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },
    #[error("operator `{op}` cannot be applied to {left} and {right}")]
    InvalidOperands {
        op: BinaryOp,
        left: String,
        right: String,
    },
    #[error("operator `{op}` cannot be applied to {operand}")]
    InvalidUnary { op: UnaryOp, operand: String },
    #[error("cannot assign to constant `{name}`")]
    AssignToConstant { name: String },
    #[error("cannot assign to `{member}` of module `{module}`: module members are read-only")]
    ReadOnlyMember { member: String, module: String },
    #[error("module `{module}` has no member named `{name}`")]
    MissingImport { name: String, module: String },
    #[error("circular import of module `{module}`")]
    CircularImport { module: String },
    #[error("invalid input {input:?}: expected a value of type {expected}")]
    InvalidInput { input: String, expected: String },
    #[error("maximum call depth exceeded (limit: {limit})")]
    CallDepthExceeded { limit: usize },
    #[error("module `{module}` failed to compile: {message}")]
    ModuleSyntax { module: String, message: String },
    #[error("{message}")]
    Io { message: String },
    #[error("integer overflow in {operation}")]
    IntegerOverflow { operation: &'static str },
}

impl EvalErrorKind {
    pub fn code(&self) -> ErrorCode {
        match self {
            EvalErrorKind::Undefined { .. } => ErrorCode::E3001,
            EvalErrorKind::NotCallable { .. } => ErrorCode::E3002,
            EvalErrorKind::WrongArgCount { .. } => ErrorCode::E3003,
            EvalErrorKind::IndexOutOfRange { .. } => ErrorCode::E3004,
            EvalErrorKind::DivisionByZero => ErrorCode::E3005,
            EvalErrorKind::ModuleNotFound { .. } => ErrorCode::E3006,
            EvalErrorKind::UnknownMember { .. } => ErrorCode::E3007,
            EvalErrorKind::TypeMismatch { .. } => ErrorCode::E3008,
            EvalErrorKind::InvalidOperands { .. } | EvalErrorKind::InvalidUnary { .. } => {
                ErrorCode::E3009
            }
            EvalErrorKind::AssignToConstant { .. } | EvalErrorKind::ReadOnlyMember { .. } => {
                ErrorCode::E3010
            }
            EvalErrorKind::MissingImport { .. } => ErrorCode::E3011,
            EvalErrorKind::CircularImport { .. } => ErrorCode::E3012,
            EvalErrorKind::InvalidInput { .. } => ErrorCode::E3013,
            EvalErrorKind::CallDepthExceeded { .. } => ErrorCode::E3014,
            EvalErrorKind::ModuleSyntax { .. } => ErrorCode::E3015,
            EvalErrorKind::Io { .. } => ErrorCode::E3016,
            EvalErrorKind::IntegerOverflow { .. } => ErrorCode::E3017,
        }
    }
}

/// A runtime error with the position of the offending token.
#[derive(Clone, Debug, PartialEq, Error)]
#[error("{kind}")]
pub struct EvalError {
    pub kind: EvalErrorKind,
    pub pos: Position,
    /// Source file `pos` points into when the error was raised inside an
    /// imported module; `None` for the main program.
    pub origin: Option<PathBuf>,
    /// Extra context, such as the module the error was raised in.
    pub notes: Vec<String>,
}

impl EvalError {
    fn from_kind(kind: EvalErrorKind) -> Self {
        EvalError {
            kind,
            pos: Position::START,
            origin: None,
            notes: Vec::new(),
        }
    }

    /// Attach the position the error is reported at.
    #[must_use]
    pub fn at(mut self, pos: Position) -> Self {
        self.pos = pos;
        self
    }

    /// Record the module file the error was raised in. The innermost
    /// module wins.
    #[must_use]
    pub fn in_module(mut self, path: &Path) -> Self {
        if self.origin.is_none() {
            self.origin = Some(path.to_path_buf());
        }
        self
    }

    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn code(&self) -> ErrorCode {
        self.kind.code()
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        self.notes.iter().fold(
            Diagnostic::error(self.code(), self.kind.to_string(), self.pos),
            |diag, note| diag.with_note(note.clone()),
        )
    }
}

// Name resolution

#[cold]
pub fn undefined(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::Undefined { name: name.into() })
}

#[cold]
pub fn unknown_member(member: &str, on: impl Into<String>) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UnknownMember {
        member: member.into(),
        on: on.into(),
    })
}

#[cold]
pub fn read_only_member(member: &str, module: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ReadOnlyMember {
        member: member.into(),
        module: module.into(),
    })
}

#[cold]
pub fn assign_to_constant(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::AssignToConstant { name: name.into() })
}

// Calls

#[cold]
pub fn not_callable(found: impl Into<String>) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NotCallable {
        found: found.into(),
    })
}

#[cold]
pub fn wrong_arg_count(name: &str, expected: usize, found: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::WrongArgCount {
        name: name.into(),
        expected,
        found,
    })
}

#[cold]
pub fn call_depth_exceeded(limit: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::CallDepthExceeded { limit })
}

// Values and operators

#[cold]
pub fn type_mismatch(expected: impl Into<String>, found: impl Into<String>) -> EvalError {
    EvalError::from_kind(EvalErrorKind::TypeMismatch {
        expected: expected.into(),
        found: found.into(),
    })
}

#[cold]
pub fn invalid_operands(op: BinaryOp, left: impl Into<String>, right: impl Into<String>) -> EvalError {
    EvalError::from_kind(EvalErrorKind::InvalidOperands {
        op,
        left: left.into(),
        right: right.into(),
    })
}

#[cold]
pub fn invalid_unary(op: UnaryOp, operand: impl Into<String>) -> EvalError {
    EvalError::from_kind(EvalErrorKind::InvalidUnary {
        op,
        operand: operand.into(),
    })
}

#[cold]
pub fn division_by_zero() -> EvalError {
    EvalError::from_kind(EvalErrorKind::DivisionByZero)
}

#[cold]
pub fn integer_overflow(operation: &'static str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::IntegerOverflow { operation })
}

#[cold]
pub fn index_out_of_range(index: i64, len: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::IndexOutOfRange { index, len })
}

// Input

#[cold]
pub fn invalid_input(input: &str, expected: impl Into<String>) -> EvalError {
    EvalError::from_kind(EvalErrorKind::InvalidInput {
        input: input.into(),
        expected: expected.into(),
    })
}

#[cold]
pub fn io_error(message: impl Into<String>) -> EvalError {
    EvalError::from_kind(EvalErrorKind::Io {
        message: message.into(),
    })
}

// Modules

#[cold]
pub fn module_not_found(module: &str, path: impl Into<String>) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ModuleNotFound {
        module: module.into(),
        path: path.into(),
    })
}

#[cold]
pub fn missing_import(name: &str, module: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::MissingImport {
        name: name.into(),
        module: module.into(),
    })
}

#[cold]
pub fn circular_import(module: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::CircularImport {
        module: module.into(),
    })
}

#[cold]
pub fn module_syntax(module: &str, message: impl Into<String>) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ModuleSyntax {
        module: module.into(),
        message: message.into(),
    })
}
