//! Parse error types.
//!
//! Parsing stops at the first error; there is no recovery. Every error
//! carries the position and text of the offending token.

use prose_diagnostic::{Diagnostic, ErrorCode};
use prose_ir::{Ident, Position, Token, TokenKind};
use prose_types::SymbolError;
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    #[error("expected {expected}, found {found}")]
    UnexpectedToken { expected: String, found: TokenKind },
    #[error("expected an expression, found {found}")]
    ExpectedExpression { found: TokenKind },
    #[error("expected a type, found {found}")]
    ExpectedType { found: TokenKind },
    #[error("{0}")]
    Declaration(SymbolError),
    #[error("struct `{name}` has {expected} field(s) but {found} value(s) were given")]
    StructArity {
        name: String,
        expected: usize,
        found: usize,
    },
    #[error("{what} is only allowed {place}")]
    Misplaced {
        what: &'static str,
        place: &'static str,
    },
    #[error("`{name}` is declared twice in the same list")]
    DuplicateName { name: String },
    #[error("only variables, struct fields and list elements can be assigned")]
    InvalidAssignTarget,
    #[error("invalid numeric literal `{lexeme}`")]
    InvalidNumber { lexeme: String },
}

impl ParseErrorKind {
    pub fn code(&self) -> ErrorCode {
        match self {
            ParseErrorKind::UnexpectedToken { .. } | ParseErrorKind::InvalidNumber { .. } => {
                ErrorCode::E1001
            }
            ParseErrorKind::ExpectedExpression { .. } => ErrorCode::E1002,
            ParseErrorKind::ExpectedType { .. } => ErrorCode::E1003,
            ParseErrorKind::Declaration(err) => match err {
                SymbolError::AlreadyDeclared { .. } => ErrorCode::E1004,
                SymbolError::DuplicateFunction { .. }
                | SymbolError::DuplicateStruct { .. }
                | SymbolError::ReservedNative { .. } => ErrorCode::E1005,
                SymbolError::UnknownType { .. } | SymbolError::VoidNotAllowed { .. } => {
                    ErrorCode::E1006
                }
            },
            ParseErrorKind::StructArity { .. } => ErrorCode::E1007,
            ParseErrorKind::Misplaced { .. } => ErrorCode::E1008,
            ParseErrorKind::DuplicateName { .. } => ErrorCode::E1009,
            ParseErrorKind::InvalidAssignTarget => ErrorCode::E1010,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{kind}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub pos: Position,
    /// Source text of the offending token.
    pub lexeme: String,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, pos: Position, lexeme: impl Into<String>) -> Self {
        ParseError {
            kind,
            pos,
            lexeme: lexeme.into(),
        }
    }

    pub fn at_token(kind: ParseErrorKind, token: &Token) -> Self {
        Self::new(kind, token.pos, token.lexeme.clone())
    }

    pub fn at_ident(kind: ParseErrorKind, ident: &Ident) -> Self {
        Self::new(kind, ident.pos, ident.name.clone())
    }

    /// A symbol-table rejection reported at the name that caused it.
    pub fn declaration(err: SymbolError, ident: &Ident) -> Self {
        let (pos, lexeme) = match &err {
            SymbolError::UnknownType { name, pos } => (*pos, name.clone()),
            SymbolError::VoidNotAllowed { pos } => (*pos, "void".to_string()),
            _ => (ident.pos, ident.name.clone()),
        };
        Self::new(ParseErrorKind::Declaration(err), pos, lexeme)
    }

    pub fn code(&self) -> ErrorCode {
        self.kind.code()
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::error(self.code(), self.kind.to_string(), self.pos)
    }
}
