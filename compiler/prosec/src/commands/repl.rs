//! Interactive read-eval-print loop.

use std::io::{self, Write};
use std::process::ExitCode;

use prose_diagnostic::TerminalEmitter;
use prose_eval::Interpreter;
use prose_types::SymbolTable;
use tracing::debug;

use super::{report, stderr_emitter};
use crate::run_source;

const PROMPT: &str = "> ";
const REPL_PATH: &str = "<repl>";

/// One interactive session: a persistent interpreter and the declarations
/// of every line accepted so far.
pub struct Repl {
    interpreter: Interpreter,
    table: SymbolTable,
}

impl Repl {
    pub fn new(interpreter: Interpreter) -> Self {
        Repl {
            interpreter,
            table: SymbolTable::new(),
        }
    }

    /// Run one line. A line that fails leaves no declarations behind, so it
    /// can be corrected and entered again.
    pub fn eval_line<W: Write>(&mut self, line: &str, emitter: &mut TerminalEmitter<W>) -> bool {
        let mut table = self.table.clone();
        match run_source(&mut self.interpreter, line, &mut table, false) {
            Ok(()) => {
                self.table = table;
                true
            }
            Err(failure) => {
                report(emitter, &failure, REPL_PATH, line);
                false
            }
        }
    }

    /// Evaluate lines from `lines` until `exit` or the lines run out,
    /// writing a prompt before each one. A prompt that cannot be written
    /// ends the session.
    pub fn run<I, P, W>(&mut self, lines: I, prompt: &mut P, emitter: &mut TerminalEmitter<W>)
    where
        I: IntoIterator<Item = String>,
        P: Write,
        W: Write,
    {
        let mut lines = lines.into_iter();
        loop {
            if let Err(err) = write!(prompt, "{PROMPT}").and_then(|()| prompt.flush()) {
                debug!(%err, "prompt not writable, ending session");
                break;
            }
            let Some(line) = lines.next() else {
                break;
            };
            let trimmed = line.trim();
            if trimmed == "exit" {
                break;
            }
            if !trimmed.is_empty() {
                self.eval_line(trimmed, emitter);
            }
        }
    }
}

/// Lines of stdin. The lock is taken per line, so `read` statements in the
/// session can use stdin as well.
fn stdin_lines() -> impl Iterator<Item = String> {
    std::iter::from_fn(|| {
        let mut line = String::new();
        match io::stdin().read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line),
        }
    })
}

/// `prose` with no arguments.
pub fn repl() -> ExitCode {
    let mut session = Repl::new(Interpreter::new());
    session.run(stdin_lines(), &mut io::stdout(), &mut stderr_emitter());
    ExitCode::SUCCESS
}
