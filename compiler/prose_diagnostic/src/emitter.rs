//! Terminal emitter.
//!
//! ```text
//! error[E3005]: division by zero
//!   --> main.prose:3:9
//!    |
//!  3 | write 5 / 0;
//!    |         ^
//! ```

use std::io::{self, Write};

use prose_ir::LineIndex;

use crate::{Diagnostic, Severity};

mod colors {
    pub const ERROR: &str = "\x1b[1;31m"; // Bold red
    pub const NOTE: &str = "\x1b[1;36m"; // Bold cyan
    pub const BOLD: &str = "\x1b[1m";
    pub const GUTTER: &str = "\x1b[1;34m"; // Bold blue
    pub const RESET: &str = "\x1b[0m";
}

/// Sink for rendered diagnostics.
pub trait DiagnosticEmitter {
    /// Render one diagnostic. `source` is the text of the unit it points
    /// into, when available.
    fn emit(&mut self, diagnostic: &Diagnostic, path: &str, source: Option<&str>);

    fn flush(&mut self);
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorMode {
    /// Colors when the output is a terminal.
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorMode {
    pub fn should_use_colors(self, is_tty: bool) -> bool {
        match self {
            ColorMode::Auto => is_tty,
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

/// Human-readable output with optional ANSI colors.
pub struct TerminalEmitter<W: Write> {
    writer: W,
    colors: bool,
}

impl<W: Write> TerminalEmitter<W> {
    pub fn with_color_mode(writer: W, mode: ColorMode, is_tty: bool) -> Self {
        TerminalEmitter {
            writer,
            colors: mode.should_use_colors(is_tty),
        }
    }

    pub fn stderr(mode: ColorMode, is_tty: bool) -> TerminalEmitter<io::Stderr> {
        TerminalEmitter {
            writer: io::stderr(),
            colors: mode.should_use_colors(is_tty),
        }
    }

    /// Give back the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn paint(&mut self, text: &str, color: &str) {
        if self.colors {
            let _ = write!(self.writer, "{color}{text}{}", colors::RESET);
        } else {
            let _ = write!(self.writer, "{text}");
        }
    }

    fn write_snippet(&mut self, diagnostic: &Diagnostic, source: &str) {
        let index = LineIndex::new(source);
        let Some(text) = index.line_text(diagnostic.pos.line) else {
            return;
        };
        let number = diagnostic.pos.line.to_string();
        let pad = " ".repeat(number.len());

        self.paint(&format!("{pad} |"), colors::GUTTER);
        let _ = writeln!(self.writer);
        self.paint(&format!("{number} |"), colors::GUTTER);
        let _ = writeln!(self.writer, " {text}");
        self.paint(&format!("{pad} |"), colors::GUTTER);

        // Tabs in the prefix keep their width so the caret lines up.
        let column = usize::try_from(diagnostic.pos.column).unwrap_or(1);
        let prefix: String = text
            .chars()
            .take(column.saturating_sub(1))
            .map(|c| if c == '\t' { '\t' } else { ' ' })
            .collect();
        let _ = write!(self.writer, " {prefix}");
        self.paint("^", colors::ERROR);
        let _ = writeln!(self.writer);
    }
}

impl<W: Write> DiagnosticEmitter for TerminalEmitter<W> {
    fn emit(&mut self, diagnostic: &Diagnostic, path: &str, source: Option<&str>) {
        let (label, color) = match diagnostic.severity {
            Severity::Error => ("error", colors::ERROR),
            Severity::Note => ("note", colors::NOTE),
        };
        self.paint(label, color);
        self.paint(&format!("[{}]", diagnostic.code), colors::BOLD);
        let _ = writeln!(self.writer, ": {}", diagnostic.message);

        self.paint("  -->", colors::GUTTER);
        let _ = writeln!(self.writer, " {path}:{}", diagnostic.pos);

        if let Some(source) = source {
            self.write_snippet(diagnostic, source);
        }

        for note in &diagnostic.notes {
            let _ = write!(self.writer, "   = ");
            self.paint("note", colors::NOTE);
            let _ = writeln!(self.writer, ": {note}");
        }
    }

    fn flush(&mut self) {
        let _ = self.writer.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorCode;
    use pretty_assertions::assert_eq;
    use prose_ir::Position;

    fn render(diagnostic: &Diagnostic, source: Option<&str>) -> String {
        let mut emitter = TerminalEmitter::with_color_mode(Vec::new(), ColorMode::Never, false);
        emitter.emit(diagnostic, "main.prose", source);
        String::from_utf8(emitter.into_inner()).unwrap_or_default()
    }

    #[test]
    fn renders_snippet_with_caret() {
        let diag = Diagnostic::error(ErrorCode::E3005, "division by zero", Position::new(2, 9));
        let out = render(&diag, Some("create integer variable a;\nwrite 5 / 0;\n"));
        assert_eq!(
            out,
            "error[E3005]: division by zero\n  --> main.prose:2:9\n  |\n2 | write 5 / 0;\n  |         ^\n"
        );
    }

    #[test]
    fn renders_without_source() {
        let diag = Diagnostic::error(ErrorCode::E3006, "module `m` not found", Position::new(1, 8))
            .with_note("searched m.prose");
        let out = render(&diag, None);
        assert_eq!(
            out,
            "error[E3006]: module `m` not found\n  --> main.prose:1:8\n   = note: searched m.prose\n"
        );
    }

    #[test]
    fn color_mode_resolution() {
        assert!(ColorMode::Auto.should_use_colors(true));
        assert!(!ColorMode::Auto.should_use_colors(false));
        assert!(ColorMode::Always.should_use_colors(false));
        assert!(!ColorMode::Never.should_use_colors(true));
    }
}
