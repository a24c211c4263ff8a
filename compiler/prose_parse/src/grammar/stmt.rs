//! Statements and blocks.

use prose_ir::{AssignTarget, Block, CondBlock, Expr, Ident, Stmt, TokenKind};
use prose_stack::ensure_sufficient_stack;
use prose_types::{StaticType, Type};
use tracing::debug;

use crate::{ParseError, ParseErrorKind, Parser};

/// Which keyword may close the block being parsed.
#[derive(Copy, Clone, PartialEq, Eq)]
pub(crate) enum BlockEnd {
    /// `end`, `elif` or `else`.
    Keyword,
    /// Body of `do`: a `while` that is not followed by `do` closes it.
    DoWhile,
}

impl Parser<'_, '_> {
    pub(crate) fn parse_statement(&mut self) -> Result<Stmt, ParseError> {
        ensure_sufficient_stack(|| self.parse_statement_inner())
    }

    fn parse_statement_inner(&mut self) -> Result<Stmt, ParseError> {
        match self.cursor.current_kind() {
            TokenKind::Create if self.cursor.peek_kind(1) == TokenKind::Type => {
                self.parse_struct_decl()
            }
            TokenKind::Function => self.parse_function_decl(),
            TokenKind::Import | TokenKind::From => self.parse_import(),
            TokenKind::If => self.parse_if(),
            TokenKind::While => self.parse_while(),
            TokenKind::Do => self.parse_do_while(),
            TokenKind::For => self.parse_for(),
            _ => {
                let stmt = self.parse_simple()?;
                self.cursor.expect(TokenKind::Semicolon)?;
                Ok(stmt)
            }
        }
    }

    /// Statements up to the block's closing keyword, in a fresh scope.
    /// The closing keyword is left for the caller.
    pub(crate) fn parse_block(&mut self, end: BlockEnd) -> Result<Block, ParseError> {
        self.table.push_scope();
        let block = self.parse_block_in_scope(end);
        self.table.pop_scope();
        block
    }

    pub(crate) fn parse_block_in_scope(&mut self, end: BlockEnd) -> Result<Block, ParseError> {
        let mut block = Vec::new();
        loop {
            let kind = self.cursor.current_kind();
            if kind == TokenKind::While {
                if end == BlockEnd::DoWhile && self.at_do_while_condition() {
                    break;
                }
            } else if kind.ends_block() {
                break;
            }
            block.push(self.parse_statement()?);
        }
        Ok(block)
    }

    /// Inside a `do` body, `while` either opens a nested loop
    /// (`while c do .. end`) or starts the closing condition
    /// (`while c end`). Look past the condition to tell them apart.
    fn at_do_while_condition(&mut self) -> bool {
        let start = self.cursor.position();
        self.cursor.advance();
        let closes = self.parse_expr().is_err() || !self.cursor.check(TokenKind::Do);
        self.cursor.set_position(start);
        closes
    }

    fn parse_if(&mut self) -> Result<Stmt, ParseError> {
        self.cursor.expect(TokenKind::If)?;
        let mut branches = Vec::new();
        loop {
            let cond = self.parse_expr()?;
            self.cursor.expect(TokenKind::Then)?;
            let body = self.parse_block(BlockEnd::Keyword)?;
            branches.push(CondBlock { cond, body });
            if !self.cursor.eat(TokenKind::Elif) {
                break;
            }
        }
        let else_body = if self.cursor.eat(TokenKind::Else) {
            Some(self.parse_block(BlockEnd::Keyword)?)
        } else {
            None
        };
        self.cursor.expect(TokenKind::End)?;
        Ok(Stmt::If {
            branches,
            else_body,
        })
    }

    fn parse_while(&mut self) -> Result<Stmt, ParseError> {
        self.cursor.expect(TokenKind::While)?;
        let cond = self.parse_expr()?;
        self.cursor.expect(TokenKind::Do)?;
        let body = self.parse_block(BlockEnd::Keyword)?;
        self.cursor.expect(TokenKind::End)?;
        Ok(Stmt::While { cond, body })
    }

    fn parse_do_while(&mut self) -> Result<Stmt, ParseError> {
        self.cursor.expect(TokenKind::Do)?;
        let body = self.parse_block(BlockEnd::DoWhile)?;
        self.cursor.expect(TokenKind::While)?;
        let cond = self.parse_expr()?;
        self.cursor.expect(TokenKind::End)?;
        Ok(Stmt::DoWhile { body, cond })
    }

    /// `for x in e do .. end`. The loop variable is a constant sharing a
    /// scope with the body; its type is the element type of `e` when that
    /// is known.
    fn parse_for(&mut self) -> Result<Stmt, ParseError> {
        self.cursor.expect(TokenKind::For)?;
        let var = self.parse_ident()?;
        self.cursor.expect(TokenKind::In)?;
        let iterable = self.parse_expr()?;
        self.cursor.expect(TokenKind::Do)?;

        let element = iterable
            .static_type(self.table)
            .ok()
            .flatten()
            .and_then(|ty| ty.element_type())
            .unwrap_or(Type::Void);
        self.table.push_scope();
        let body = self
            .table
            .declare(&var.name, element, true, var.pos)
            .map_err(|err| ParseError::declaration(err, &var))
            .and_then(|()| self.parse_block_in_scope(BlockEnd::Keyword));
        self.table.pop_scope();
        let body = body?;

        self.cursor.expect(TokenKind::End)?;
        Ok(Stmt::For {
            var,
            iterable,
            body,
        })
    }

    /// A statement that ends in `;`. The semicolon is left for the caller.
    fn parse_simple(&mut self) -> Result<Stmt, ParseError> {
        match self.cursor.current_kind() {
            TokenKind::Create => self.parse_create(),
            TokenKind::Set => self.parse_set(),
            TokenKind::Read => {
                self.cursor.advance();
                let target = self.parse_ident()?;
                let prompt = if self.cursor.check(TokenKind::Semicolon) {
                    None
                } else {
                    Some(self.parse_expr()?)
                };
                Ok(Stmt::Read { target, prompt })
            }
            TokenKind::Write | TokenKind::Writeln => {
                let newline = self.cursor.advance().kind == TokenKind::Writeln;
                let value = self.parse_expr()?;
                Ok(Stmt::Write { value, newline })
            }
            TokenKind::Return => {
                let keyword = self.cursor.advance();
                if self.function_depth == 0 {
                    return Err(ParseError::at_token(
                        ParseErrorKind::Misplaced {
                            what: "`return`",
                            place: "inside a function",
                        },
                        keyword,
                    ));
                }
                let value = if self.cursor.check(TokenKind::Semicolon) {
                    None
                } else {
                    Some(self.parse_expr()?)
                };
                Ok(Stmt::Return {
                    value,
                    pos: keyword.pos,
                })
            }
            _ => Ok(Stmt::Expr(self.parse_expr()?)),
        }
    }

    /// `create T variable|constant name [to init]`
    fn parse_create(&mut self) -> Result<Stmt, ParseError> {
        self.cursor.expect(TokenKind::Create)?;
        let ty = self.parse_type()?;
        let constant = match self.cursor.current_kind() {
            TokenKind::Variable => false,
            TokenKind::Constant => true,
            _ => return Err(self.cursor.unexpected("`variable` or `constant`")),
        };
        self.cursor.advance();
        let name = self.parse_ident()?;
        let init = if self.cursor.eat(TokenKind::To) {
            Some(self.parse_expr()?)
        } else {
            None
        };

        let resolved = self
            .table
            .resolve_type(&ty)
            .map_err(|err| ParseError::declaration(err, &name))?;
        self.table
            .declare(&name.name, resolved, constant, name.pos)
            .map_err(|err| ParseError::declaration(err, &name))?;
        debug!(name = %name.name, ty = %ty, constant, "declared variable");

        Ok(Stmt::Create {
            ty,
            constant,
            name,
            init,
        })
    }

    /// `set target to value`
    fn parse_set(&mut self) -> Result<Stmt, ParseError> {
        let pos = self.cursor.expect(TokenKind::Set)?.pos;
        let target_token = self.cursor.current();
        let target = match self.parse_postfix()? {
            Expr::Identifier(ident) => AssignTarget::Variable(ident),
            Expr::Member { object, member } => AssignTarget::Member {
                object: *object,
                member,
            },
            Expr::Index { target, index, pos } => AssignTarget::Index {
                target: *target,
                index: *index,
                pos,
            },
            _ => {
                return Err(ParseError::at_token(
                    ParseErrorKind::InvalidAssignTarget,
                    target_token,
                ))
            }
        };
        self.cursor.expect(TokenKind::To)?;
        let value = self.parse_expr()?;
        Ok(Stmt::Assign { target, value, pos })
    }

    pub(crate) fn parse_ident(&mut self) -> Result<Ident, ParseError> {
        let token = self.cursor.expect(TokenKind::Identifier)?;
        Ok(Ident::new(token.lexeme.clone(), token.pos))
    }
}
