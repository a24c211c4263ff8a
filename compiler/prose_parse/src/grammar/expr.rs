//! Expression parsing.
//!
//! Binary operators are parsed by precedence climbing: an operand is
//! followed by any operator whose precedence is at least the current
//! minimum, and the right operand is parsed at one level higher, which
//! makes every level left-associative. Unary operators bind tighter than
//! any binary operator; postfix call, member and index bind tightest.

use prose_ir::{Expr, Ident, Literal, TokenKind};
use prose_stack::ensure_sufficient_stack;

use crate::{ParseError, ParseErrorKind, Parser};

impl Parser<'_, '_> {
    /// Parse an expression.
    ///
    /// Uses `ensure_sufficient_stack` so deeply nested input grows the stack
    /// instead of overflowing it.
    pub(crate) fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        ensure_sufficient_stack(|| self.parse_binary(1))
    }

    fn parse_binary(&mut self, min_precedence: u8) -> Result<Expr, ParseError> {
        let mut left = self.parse_unary()?;
        while let Some(op) = self.match_binary_op() {
            let precedence = op.precedence();
            if precedence < min_precedence {
                break;
            }
            let pos = self.cursor.advance().pos;
            let right = self.parse_binary(precedence + 1)?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
                pos,
            };
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        if let Some(op) = self.match_unary_op() {
            let pos = self.cursor.advance().pos;
            let operand = ensure_sufficient_stack(|| self.parse_unary())?;
            return Ok(Expr::Unary {
                op,
                operand: Box::new(operand),
                pos,
            });
        }
        self.parse_postfix()
    }

    /// `primary { "(" args ")" | "." IDENT | "[" expr "]" }`
    pub(crate) fn parse_postfix(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_primary()?;
        loop {
            match self.cursor.current_kind() {
                TokenKind::LParen => {
                    let pos = self.cursor.advance().pos;
                    let args = self.parse_args()?;
                    self.check_struct_literal(&expr, args.len())?;
                    expr = Expr::Call {
                        callee: Box::new(expr),
                        args,
                        pos,
                    };
                }
                TokenKind::Dot => {
                    self.cursor.advance();
                    let member = self.cursor.expect(TokenKind::Identifier)?;
                    expr = Expr::Member {
                        object: Box::new(expr),
                        member: Ident::new(member.lexeme.clone(), member.pos),
                    };
                }
                TokenKind::LBracket => {
                    let pos = self.cursor.advance().pos;
                    let index = self.parse_expr()?;
                    self.cursor.expect(TokenKind::RBracket)?;
                    expr = Expr::Index {
                        target: Box::new(expr),
                        index: Box::new(index),
                        pos,
                    };
                }
                _ => return Ok(expr),
            }
        }
    }

    /// Arguments after an opening parenthesis, through the closing one.
    fn parse_args(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut args = Vec::new();
        if !self.cursor.check(TokenKind::RParen) {
            args.push(self.parse_expr()?);
            while self.cursor.eat(TokenKind::Comma) {
                args.push(self.parse_expr()?);
            }
        }
        self.cursor.expect(TokenKind::RParen)?;
        Ok(args)
    }

    /// `Point(1, 2)` must supply exactly one value per declared field.
    ///
    /// Only structs whose fields are known here are checked; a local
    /// binding with the same name shadows the struct.
    fn check_struct_literal(&self, callee: &Expr, found: usize) -> Result<(), ParseError> {
        let Some(ident) = callee.as_identifier() else {
            return Ok(());
        };
        if self.table.lookup(&ident.name).is_some() {
            return Ok(());
        }
        match self.table.struct_def(&ident.name) {
            Some(def) if !def.is_opaque() && def.fields.len() != found => {
                Err(ParseError::at_ident(
                    ParseErrorKind::StructArity {
                        name: ident.name.clone(),
                        expected: def.fields.len(),
                        found,
                    },
                    ident,
                ))
            }
            _ => Ok(()),
        }
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let token = self.cursor.current();
        let pos = token.pos;
        let literal = |value| Expr::Literal { value, pos };
        match token.kind {
            TokenKind::Integer => {
                self.cursor.advance();
                let value = token.lexeme.parse::<i64>().map_err(|_| {
                    ParseError::at_token(
                        ParseErrorKind::InvalidNumber {
                            lexeme: token.lexeme.clone(),
                        },
                        token,
                    )
                })?;
                Ok(literal(Literal::Integer(value)))
            }
            TokenKind::Rational => {
                self.cursor.advance();
                let value = token.lexeme.parse::<f64>().map_err(|_| {
                    ParseError::at_token(
                        ParseErrorKind::InvalidNumber {
                            lexeme: token.lexeme.clone(),
                        },
                        token,
                    )
                })?;
                Ok(literal(Literal::Rational(value)))
            }
            TokenKind::Str => {
                self.cursor.advance();
                Ok(literal(Literal::Str(token.lexeme.clone())))
            }
            TokenKind::True | TokenKind::False => {
                self.cursor.advance();
                Ok(literal(Literal::Boolean(token.kind == TokenKind::True)))
            }
            TokenKind::Identifier => {
                self.cursor.advance();
                Ok(Expr::Identifier(Ident::new(token.lexeme.clone(), pos)))
            }
            TokenKind::LParen => {
                self.cursor.advance();
                let inner = self.parse_expr()?;
                self.cursor.expect(TokenKind::RParen)?;
                Ok(inner)
            }
            TokenKind::LBracket => {
                self.cursor.advance();
                let mut elements = Vec::new();
                if !self.cursor.check(TokenKind::RBracket) {
                    elements.push(self.parse_expr()?);
                    while self.cursor.eat(TokenKind::Comma) {
                        elements.push(self.parse_expr()?);
                    }
                }
                self.cursor.expect(TokenKind::RBracket)?;
                Ok(Expr::List { elements, pos })
            }
            found => Err(ParseError::at_token(
                ParseErrorKind::ExpectedExpression { found },
                token,
            )),
        }
    }
}
