//! Recursive descent parser for Prose.
//!
//! Blocks have no braces: every control structure opens with a keyword and
//! closes with `end` (or `while ... end` for do-while). Expressions use
//! precedence climbing over [`prose_ir::BinaryOp::precedence`].
//!
//! While building the tree the parser fills in a [`SymbolTable`] and rejects
//! declaration errors as they appear: same-scope redeclaration, duplicate
//! function or struct names, unknown type names and struct literals with the
//! wrong number of values. Expression types are not checked here; see
//! [`prose_types::check_program`].

mod cursor;
mod error;
mod grammar;

use prose_ir::{Program, TokenList};
use prose_types::SymbolTable;

pub use cursor::Cursor;
pub use error::{ParseError, ParseErrorKind};

/// Parser state for one source unit.
pub struct Parser<'a, 't> {
    cursor: Cursor<'a>,
    table: &'t mut SymbolTable,
    /// Enclosing function declarations; `return` needs at least one.
    function_depth: usize,
}

impl<'a, 't> Parser<'a, 't> {
    pub fn new(tokens: &'a TokenList, table: &'t mut SymbolTable) -> Self {
        Parser {
            cursor: Cursor::new(tokens.as_slice()),
            table,
            function_depth: 0,
        }
    }

    /// Parse every statement up to end of input.
    ///
    /// On error, block scopes opened by the failed statement are closed
    /// again so the table is back at its root scope.
    pub fn parse_program(&mut self) -> Result<Program, ParseError> {
        let mut statements = Vec::new();
        while !self.cursor.is_at_end() {
            match self.parse_statement() {
                Ok(stmt) => statements.push(stmt),
                Err(err) => {
                    while !self.table.is_root() {
                        self.table.pop_scope();
                    }
                    return Err(err);
                }
            }
        }
        Ok(Program { statements })
    }
}

/// Parse a token stream, declaring into `table`.
///
/// On error the table may hold declarations from the statements parsed so
/// far; callers that keep the table across units (the REPL) should parse
/// into a clone and keep it only on success.
pub fn parse(tokens: &TokenList, table: &mut SymbolTable) -> Result<Program, ParseError> {
    Parser::new(tokens, table).parse_program()
}
