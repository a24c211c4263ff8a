//! Struct, function and import declarations.

use std::rc::Rc;

use prose_ir::{
    FieldDecl, FunctionDecl, Ident, ImportDecl, Param, Stmt, StructDecl, Token, TokenKind, TypeNode,
};
use prose_types::{FunctionSignature, StructType, Type};
use rustc_hash::FxHashSet;
use tracing::debug;

use super::stmt::BlockEnd;
use crate::{ParseError, ParseErrorKind, Parser};

impl Parser<'_, '_> {
    fn at_top_level(&self) -> bool {
        self.table.is_root() && self.function_depth == 0
    }

    #[cold]
    fn misplaced(what: &'static str, token: &Token) -> ParseError {
        ParseError::at_token(
            ParseErrorKind::Misplaced {
                what,
                place: "at top level",
            },
            token,
        )
    }

    /// `create type Name(T a, U b);`
    pub(crate) fn parse_struct_decl(&mut self) -> Result<Stmt, ParseError> {
        let keyword = self.cursor.expect(TokenKind::Create)?;
        if !self.at_top_level() {
            return Err(Self::misplaced("a struct declaration", keyword));
        }
        self.cursor.expect(TokenKind::Type)?;
        let name = self.parse_ident()?;
        self.cursor.expect(TokenKind::LParen)?;

        let mut fields = Vec::new();
        loop {
            let ty = self.parse_type()?;
            let field = self.parse_ident()?;
            fields.push(FieldDecl { ty, name: field });
            if !self.cursor.eat(TokenKind::Comma) {
                break;
            }
        }
        self.cursor.expect(TokenKind::RParen)?;
        self.cursor.expect(TokenKind::Semicolon)?;

        let mut seen = FxHashSet::default();
        let mut resolved = Vec::with_capacity(fields.len());
        for field in &fields {
            if !seen.insert(field.name.name.as_str()) {
                return Err(ParseError::at_ident(
                    ParseErrorKind::DuplicateName {
                        name: field.name.name.clone(),
                    },
                    &field.name,
                ));
            }
            let ty = self
                .table
                .resolve_type(&field.ty)
                .map_err(|err| ParseError::declaration(err, &field.name))?;
            resolved.push((field.name.name.clone(), ty));
        }
        self.table
            .declare_struct(StructType::new(name.name.clone(), resolved))
            .map_err(|err| ParseError::declaration(err, &name))?;
        debug!(name = %name.name, fields = fields.len(), "declared struct");

        Ok(Stmt::Struct(StructDecl { name, fields }))
    }

    /// `function name(T a, U b) [-> R] body end`
    ///
    /// The function is declared before its body is parsed so it can call
    /// itself. Parameters live in the body's scope.
    pub(crate) fn parse_function_decl(&mut self) -> Result<Stmt, ParseError> {
        self.cursor.expect(TokenKind::Function)?;
        let name = self.parse_ident()?;
        self.cursor.expect(TokenKind::LParen)?;
        let mut params = Vec::new();
        if !self.cursor.check(TokenKind::RParen) {
            loop {
                let ty = self.parse_type()?;
                let param = self.parse_ident()?;
                params.push(Param { ty, name: param });
                if !self.cursor.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.cursor.expect(TokenKind::RParen)?;
        let ret = if self.cursor.eat(TokenKind::Arrow) {
            Some(self.parse_type()?)
        } else {
            None
        };

        let signature = self.signature(&name, &params, ret.as_ref())?;
        self.table
            .declare_function(&name.name, signature.clone(), name.pos)
            .map_err(|err| ParseError::declaration(err, &name))?;
        debug!(name = %name.name, params = params.len(), ret = %signature.ret, "declared function");

        self.table.push_scope();
        self.function_depth += 1;
        let body = self.parse_function_body(&params, &signature);
        self.function_depth -= 1;
        self.table.pop_scope();
        let body = body?;
        self.cursor.expect(TokenKind::End)?;

        Ok(Stmt::Function(Rc::new(FunctionDecl {
            name,
            params,
            ret,
            body,
        })))
    }

    fn signature(
        &self,
        name: &Ident,
        params: &[Param],
        ret: Option<&TypeNode>,
    ) -> Result<FunctionSignature, ParseError> {
        let mut seen = FxHashSet::default();
        let mut types = Vec::with_capacity(params.len());
        for param in params {
            if !seen.insert(param.name.name.as_str()) {
                return Err(ParseError::at_ident(
                    ParseErrorKind::DuplicateName {
                        name: param.name.name.clone(),
                    },
                    &param.name,
                ));
            }
            types.push(
                self.table
                    .resolve_type(&param.ty)
                    .map_err(|err| ParseError::declaration(err, &param.name))?,
            );
        }
        let ret = match ret {
            Some(node) => self
                .table
                .resolve_return_type(node)
                .map_err(|err| ParseError::declaration(err, name))?,
            None => Type::Void,
        };
        Ok(FunctionSignature::new(types, ret))
    }

    fn parse_function_body(
        &mut self,
        params: &[Param],
        signature: &FunctionSignature,
    ) -> Result<Vec<Stmt>, ParseError> {
        for (param, ty) in params.iter().zip(&signature.params) {
            self.table
                .declare(&param.name.name, ty.clone(), false, param.name.pos)
                .map_err(|err| ParseError::declaration(err, &param.name))?;
        }
        self.parse_block_in_scope(BlockEnd::Keyword)
    }

    /// `import m;` or `from m import a, b;`
    pub(crate) fn parse_import(&mut self) -> Result<Stmt, ParseError> {
        let keyword = self.cursor.current();
        if !self.at_top_level() {
            return Err(Self::misplaced("an import", keyword));
        }
        let decl = if self.cursor.eat(TokenKind::Import) {
            let module = self.parse_ident()?;
            self.table
                .declare_module(&module.name, module.pos)
                .map_err(|err| ParseError::declaration(err, &module))?;
            ImportDecl::Module { module }
        } else {
            self.cursor.expect(TokenKind::From)?;
            let module = self.parse_ident()?;
            self.cursor.expect(TokenKind::Import)?;
            let mut names = vec![self.parse_ident()?];
            while self.cursor.eat(TokenKind::Comma) {
                names.push(self.parse_ident()?);
            }
            let mut seen = FxHashSet::default();
            for name in &names {
                if !seen.insert(name.name.as_str()) {
                    return Err(ParseError::at_ident(
                        ParseErrorKind::DuplicateName {
                            name: name.name.clone(),
                        },
                        name,
                    ));
                }
                self.table
                    .declare_imported(&name.name, name.pos)
                    .map_err(|err| ParseError::declaration(err, name))?;
            }
            ImportDecl::Selective { module, names }
        };
        self.cursor.expect(TokenKind::Semicolon)?;
        debug!(module = %decl.module().name, "recorded import");
        Ok(Stmt::Import(decl))
    }
}
