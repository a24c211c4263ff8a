//! Type annotations.

use prose_ir::{Ident, TokenKind, TypeNode};

use crate::{ParseError, ParseErrorKind, Parser};

impl Parser<'_, '_> {
    /// `integer | rational | string | boolean | void | list<T>
    ///  | function(T, ..) -> T | StructName`
    pub(crate) fn parse_type(&mut self) -> Result<TypeNode, ParseError> {
        let token = self.cursor.current();
        match token.kind {
            TokenKind::ListType => {
                self.cursor.advance();
                self.cursor.expect(TokenKind::Lt)?;
                let element = self.parse_type()?;
                self.cursor.expect(TokenKind::Gt)?;
                Ok(TypeNode::List(Box::new(element)))
            }
            TokenKind::Function => {
                self.cursor.advance();
                self.cursor.expect(TokenKind::LParen)?;
                let mut params = Vec::new();
                if !self.cursor.check(TokenKind::RParen) {
                    params.push(self.parse_type()?);
                    while self.cursor.eat(TokenKind::Comma) {
                        params.push(self.parse_type()?);
                    }
                }
                self.cursor.expect(TokenKind::RParen)?;
                self.cursor.expect(TokenKind::Arrow)?;
                let ret = self.parse_type()?;
                Ok(TypeNode::Function {
                    params,
                    ret: Box::new(ret),
                })
            }
            kind if kind.is_type_keyword() || kind == TokenKind::Identifier => {
                self.cursor.advance();
                Ok(TypeNode::Simple(Ident::new(token.lexeme.clone(), token.pos)))
            }
            found => Err(ParseError::at_token(
                ParseErrorKind::ExpectedType { found },
                token,
            )),
        }
    }
}
