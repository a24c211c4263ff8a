//! `prose <file>` and `prose --check <file>`.

use std::path::Path;
use std::process::ExitCode;

use prose_eval::InterpreterBuilder;
use prose_types::SymbolTable;
use tracing::debug;

use super::{read_source, report, stderr_emitter};
use crate::run_source;

/// Run a script with its own directory as the module base.
pub fn run_file(path: &str, check: bool) -> ExitCode {
    let file = Path::new(path);
    let source = match read_source(file) {
        Ok(source) => source,
        Err(message) => {
            eprintln!("error: {message}");
            return ExitCode::FAILURE;
        }
    };
    let base_dir = file
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    debug!(path, base = %base_dir.display(), check, "running script");

    let mut interpreter = InterpreterBuilder::new().base_dir(base_dir).build();
    match run_source(&mut interpreter, &source, &mut SymbolTable::new(), check) {
        Ok(()) => ExitCode::SUCCESS,
        Err(failure) => {
            report(&mut stderr_emitter(), &failure, path, &source);
            ExitCode::FAILURE
        }
    }
}
