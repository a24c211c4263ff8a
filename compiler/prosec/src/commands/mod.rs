//! Command implementations for the `prose` binary.
//!
//! Commands render failures to stderr themselves and return the process
//! exit code.

mod repl;
mod run;

use std::fs;
use std::io::{self, IsTerminal, Write};
use std::path::Path;

use prose_diagnostic::{ColorMode, DiagnosticEmitter, TerminalEmitter};
use prose_eval::SOURCE_EXTENSION;

use crate::Failure;

pub use repl::{repl, Repl};
pub use run::run_file;

/// Emitter for stderr, colored when stderr is a terminal.
pub fn stderr_emitter() -> TerminalEmitter<io::Stderr> {
    TerminalEmitter::with_color_mode(io::stderr(), ColorMode::Auto, io::stderr().is_terminal())
}

/// Read a script, insisting on the `.prose` extension.
pub fn read_source(path: &Path) -> Result<String, String> {
    if path.extension().and_then(|ext| ext.to_str()) != Some(SOURCE_EXTENSION) {
        return Err(format!(
            "'{}' is not a .{SOURCE_EXTENSION} file",
            path.display()
        ));
    }
    fs::read_to_string(path).map_err(|err| format!("cannot read '{}': {err}", path.display()))
}

/// Render every diagnostic of `failure`.
///
/// Runtime errors raised inside a module point into that module's file, so
/// their snippet comes from there rather than from `source`.
pub fn report<W: Write>(
    emitter: &mut TerminalEmitter<W>,
    failure: &Failure,
    path: &str,
    source: &str,
) {
    let origin = failure.as_eval().and_then(|err| err.origin.as_deref());
    let module_source = origin.and_then(|origin| fs::read_to_string(origin).ok());
    let (path, source) = match origin {
        Some(origin) => (origin.display().to_string(), module_source.as_deref()),
        None => (path.to_string(), Some(source)),
    };
    for diagnostic in failure.diagnostics() {
        emitter.emit(&diagnostic, &path, source);
    }
    emitter.flush();
}
