//! Source-to-result pipeline.

use prose_diagnostic::Diagnostic;
use prose_eval::{EvalError, Interpreter};
use prose_ir::Program;
use prose_lexer::LexError;
use prose_parse::ParseError;
use prose_types::{check_program, SymbolTable, TypeError};
use thiserror::Error;
use tracing::debug;

/// Why a unit of source did not run to completion.
#[derive(Debug, Error)]
pub enum Failure {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("{} static error(s)", .0.len())]
    Check(Vec<TypeError>),
    #[error(transparent)]
    Eval(#[from] EvalError),
}

impl Failure {
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        match self {
            Failure::Lex(err) => vec![err.to_diagnostic()],
            Failure::Parse(err) => vec![err.to_diagnostic()],
            Failure::Check(errors) => errors.iter().map(TypeError::to_diagnostic).collect(),
            Failure::Eval(err) => vec![err.to_diagnostic()],
        }
    }

    /// The runtime error, if the failure happened while running.
    pub fn as_eval(&self) -> Option<&EvalError> {
        match self {
            Failure::Eval(err) => Some(err),
            _ => None,
        }
    }
}

/// Lex and parse `source`, declaring its names in `table`.
pub fn compile(source: &str, table: &mut SymbolTable) -> Result<Program, Failure> {
    let tokens = prose_lexer::lex(source)?;
    debug!(tokens = tokens.len(), "lexed");
    let program = prose_parse::parse(&tokens, table)?;
    debug!(statements = program.statements.len(), "parsed");
    Ok(program)
}

/// Compile `source` and run it on `interpreter`. With `check`, the static
/// checker runs first and any error stops the unit before it executes.
pub fn run_source(
    interpreter: &mut Interpreter,
    source: &str,
    table: &mut SymbolTable,
    check: bool,
) -> Result<(), Failure> {
    let program = compile(source, table)?;
    if check {
        check_program(&program).map_err(Failure::Check)?;
        debug!("static check passed");
    }
    interpreter.run(&program)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use prose_diagnostic::ErrorCode;
    use prose_eval::{buffer_handler, InterpreterBuilder};

    fn interpreter() -> (Interpreter, prose_eval::SharedPrintHandler) {
        let print = buffer_handler();
        let interpreter = InterpreterBuilder::new().print_handler(print.clone()).build();
        (interpreter, print)
    }

    #[test]
    fn runs_a_program() {
        let (mut interp, print) = interpreter();
        let result = run_source(&mut interp, "writeln 6 * 7;", &mut SymbolTable::new(), false);
        assert!(result.is_ok());
        assert_eq!(print.output(), "42\n");
    }

    #[test]
    fn each_stage_reports_its_own_code() {
        let (mut interp, _) = interpreter();
        let code = |interp: &mut Interpreter, source: &str, check: bool| {
            run_source(interp, source, &mut SymbolTable::new(), check)
                .err()
                .map(|failure| failure.diagnostics()[0].code)
        };
        assert_eq!(code(&mut interp, "write $;", false), Some(ErrorCode::E0001));
        assert!(matches!(code(&mut interp, "create integer;", false), Some(c) if c.as_str().starts_with("E1")));
        assert_eq!(code(&mut interp, "writeln 1 / 0;", false), Some(ErrorCode::E3005));
        assert!(matches!(
            code(&mut interp, r#"create integer variable x to "s";"#, true),
            Some(c) if c.as_str().starts_with("E2")
        ));
    }

    #[test]
    fn check_stops_before_running() {
        let (mut interp, print) = interpreter();
        let source = r#"writeln "side effect"; create integer variable x to "s";"#;
        let result = run_source(&mut interp, source, &mut SymbolTable::new(), true);
        assert!(matches!(result, Err(Failure::Check(_))));
        assert_eq!(print.output(), "");
    }
}
