//! Core diagnostic type.

use std::fmt;

use prose_ir::Position;

use crate::ErrorCode;

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Severity {
    Error,
    Note,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Note => write!(f, "note"),
        }
    }
}

/// A reportable problem at one source position.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Diagnostic {
    pub code: ErrorCode,
    pub severity: Severity,
    pub message: String,
    pub pos: Position,
    /// Extra lines printed after the snippet.
    pub notes: Vec<String>,
}

impl Diagnostic {
    pub fn error(code: ErrorCode, message: impl Into<String>, pos: Position) -> Self {
        Diagnostic {
            code,
            severity: Severity::Error,
            message: message.into(),
            pos,
            notes: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// One-line form: `error[E3005]: division by zero at 3:9`.
impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}[{}]: {} at {}",
            self.severity, self.code, self.message, self.pos
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn one_line_display() {
        let diag = Diagnostic::error(ErrorCode::E3005, "division by zero", Position::new(3, 9));
        assert_eq!(diag.to_string(), "error[E3005]: division by zero at 3:9");
        assert!(diag.is_error());
    }

    #[test]
    fn notes_accumulate() {
        let diag = Diagnostic::error(ErrorCode::E1004, "`x` is already declared", Position::START)
            .with_note("first")
            .with_note("second");
        assert_eq!(diag.notes, vec!["first".to_string(), "second".to_string()]);
    }
}
