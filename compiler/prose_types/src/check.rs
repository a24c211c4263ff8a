//! Optional whole-program type check.
//!
//! Runs over a parsed [`Program`] before execution and collects every static
//! type error instead of stopping at the first. Top-level structs, function
//! signatures and imports are registered first, then top-level statements
//! run in order, then the bodies of top-level functions are checked against
//! the complete global scope.

use std::rc::Rc;

use prose_diagnostic::{Diagnostic, ErrorCode};
use prose_ir::{AssignTarget, Block, Expr, FunctionDecl, ImportDecl, Position, Program, Stmt};
use prose_stack::ensure_sufficient_stack;
use thiserror::Error;
use tracing::debug;

use crate::static_type::{index_type, member_type};
use crate::{
    native, FunctionSignature, NativeSignature, Receiver, StaticType, StructType, SymbolError,
    SymbolTable, Type,
};

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum TypeErrorKind {
    #[error("expected `{expected}`, found `{found}`")]
    Mismatch { expected: String, found: String },
    #[error("operator `{op}` cannot be applied to `{left}` and `{right}`")]
    InvalidOperands {
        op: &'static str,
        left: String,
        right: String,
    },
    #[error("operator `{op}` cannot be applied to `{operand}`")]
    InvalidUnary { op: &'static str, operand: String },
    #[error("condition must be `boolean`, found `{found}`")]
    NonBooleanCondition { found: String },
    #[error("`{found}` is not callable")]
    NotCallable { found: String },
    #[error("`{name}` expects {expected} argument(s), found {found}")]
    WrongArgCount {
        name: String,
        expected: usize,
        found: usize,
    },
    #[error("undefined name `{name}`")]
    Undefined { name: String },
    #[error("`{ty}` has no member `{member}`")]
    UnknownMember { ty: String, member: String },
    #[error("cannot assign to constant `{name}`")]
    AssignToConstant { name: String },
    #[error("`return` outside of a function")]
    ReturnOutsideFunction,
    #[error("`{found}` cannot be indexed or iterated")]
    NotIndexable { found: String },
    #[error("cannot read input into a value of type `{ty}`")]
    InvalidReadTarget { ty: String },
    #[error("{0}")]
    Declaration(SymbolError),
}

impl TypeErrorKind {
    pub fn code(&self) -> ErrorCode {
        match self {
            TypeErrorKind::Mismatch { .. } | TypeErrorKind::InvalidReadTarget { .. } => {
                ErrorCode::E2001
            }
            TypeErrorKind::InvalidOperands { .. } | TypeErrorKind::InvalidUnary { .. } => {
                ErrorCode::E2002
            }
            TypeErrorKind::NonBooleanCondition { .. } => ErrorCode::E2003,
            TypeErrorKind::NotCallable { .. } => ErrorCode::E2004,
            TypeErrorKind::WrongArgCount { .. } => ErrorCode::E2005,
            TypeErrorKind::Undefined { .. } => ErrorCode::E2006,
            TypeErrorKind::UnknownMember { .. } => ErrorCode::E2007,
            TypeErrorKind::AssignToConstant { .. } => ErrorCode::E2008,
            TypeErrorKind::ReturnOutsideFunction => ErrorCode::E2009,
            TypeErrorKind::NotIndexable { .. } => ErrorCode::E2010,
            TypeErrorKind::Declaration(err) => match err {
                SymbolError::AlreadyDeclared { .. } => ErrorCode::E1004,
                SymbolError::DuplicateFunction { .. }
                | SymbolError::DuplicateStruct { .. }
                | SymbolError::ReservedNative { .. } => ErrorCode::E1005,
                SymbolError::UnknownType { .. } | SymbolError::VoidNotAllowed { .. } => {
                    ErrorCode::E1006
                }
            },
        }
    }
}

/// A static type error at one source position.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{kind}")]
pub struct TypeError {
    pub kind: TypeErrorKind,
    pub pos: Position,
}

impl TypeError {
    pub fn new(kind: TypeErrorKind, pos: Position) -> Self {
        TypeError { kind, pos }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::error(self.kind.code(), self.kind.to_string(), self.pos)
    }
}

/// Check `program`, returning every static type error found.
pub fn check_program(program: &Program) -> Result<(), Vec<TypeError>> {
    let mut checker = Checker::default();
    checker.run(program);
    debug!(errors = checker.errors.len(), "type check finished");
    if checker.errors.is_empty() {
        Ok(())
    } else {
        Err(checker.errors)
    }
}

#[derive(Default)]
struct Checker {
    table: SymbolTable,
    errors: Vec<TypeError>,
    /// Declared return types of the enclosing functions, innermost last.
    returns: Vec<Type>,
}

impl Checker {
    fn run(&mut self, program: &Program) {
        let mut deferred = Vec::new();
        for stmt in &program.statements {
            match stmt {
                Stmt::Struct(decl) => {
                    let fields = decl
                        .fields
                        .iter()
                        .filter_map(|field| {
                            let ty = self.resolve(|t| t.resolve_type(&field.ty), field.name.pos)?;
                            Some((field.name.name.clone(), ty))
                        })
                        .collect();
                    let def = StructType::new(decl.name.name.clone(), fields);
                    if let Err(err) = self.table.declare_struct(def) {
                        self.declaration_error(err, decl.name.pos);
                    }
                }
                Stmt::Function(decl) => {
                    if self.declare_function(decl) {
                        deferred.push(Rc::clone(decl));
                    }
                }
                Stmt::Import(import) => self.declare_import(import),
                _ => {}
            }
        }

        for stmt in program.statements.iter().filter(|s| !s.is_declaration()) {
            self.check_stmt(stmt);
        }

        for decl in deferred {
            self.check_function_body(&decl);
        }
    }

    fn resolve<F>(&mut self, resolve: F, pos: Position) -> Option<Type>
    where
        F: FnOnce(&SymbolTable) -> Result<Type, SymbolError>,
    {
        match resolve(&self.table) {
            Ok(ty) => Some(ty),
            Err(err) => {
                self.declaration_error(err, pos);
                None
            }
        }
    }

    fn declaration_error(&mut self, err: SymbolError, pos: Position) {
        let pos = match &err {
            SymbolError::UnknownType { pos, .. } | SymbolError::VoidNotAllowed { pos } => *pos,
            _ => pos,
        };
        self.errors
            .push(TypeError::new(TypeErrorKind::Declaration(err), pos));
    }

    fn error(&mut self, kind: TypeErrorKind, pos: Position) {
        self.errors.push(TypeError::new(kind, pos));
    }

    fn signature(&mut self, decl: &FunctionDecl) -> Option<FunctionSignature> {
        let mut params = Vec::with_capacity(decl.params.len());
        for param in &decl.params {
            params.push(self.resolve(|t| t.resolve_type(&param.ty), param.name.pos)?);
        }
        let ret = match &decl.ret {
            Some(node) => self.resolve(|t| t.resolve_return_type(node), decl.name.pos)?,
            None => Type::Void,
        };
        Some(FunctionSignature::new(params, ret))
    }

    /// Register a function's signature; false if it could not be resolved.
    fn declare_function(&mut self, decl: &FunctionDecl) -> bool {
        let Some(signature) = self.signature(decl) else {
            return false;
        };
        if let Err(err) = self
            .table
            .declare_function(&decl.name.name, signature, decl.name.pos)
        {
            self.declaration_error(err, decl.name.pos);
        }
        true
    }

    fn declare_import(&mut self, import: &ImportDecl) {
        let result = match import {
            ImportDecl::Module { module } => self.table.declare_module(&module.name, module.pos),
            ImportDecl::Selective { names, .. } => names
                .iter()
                .try_for_each(|name| self.table.declare_imported(&name.name, name.pos)),
        };
        if let Err(err) = result {
            self.declaration_error(err, import.module().pos);
        }
    }

    fn check_function_body(&mut self, decl: &FunctionDecl) {
        let Some(signature) = self.signature(decl) else {
            return;
        };
        self.table.push_scope();
        for (param, ty) in decl.params.iter().zip(signature.params) {
            if let Err(err) = self.table.declare(&param.name.name, ty, false, param.name.pos) {
                self.declaration_error(err, param.name.pos);
            }
        }
        self.returns.push(signature.ret);
        for stmt in &decl.body {
            self.check_stmt(stmt);
        }
        self.returns.pop();
        self.table.pop_scope();
    }

    fn check_block(&mut self, block: &Block) {
        self.table.push_scope();
        for stmt in block {
            self.check_stmt(stmt);
        }
        self.table.pop_scope();
    }

    fn check_stmt(&mut self, stmt: &Stmt) {
        ensure_sufficient_stack(|| self.check_stmt_inner(stmt));
    }

    fn check_stmt_inner(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Expr(expr) => {
                self.type_of(expr);
            }
            Stmt::Create {
                ty,
                constant,
                name,
                init,
            } => {
                let declared = self.resolve(|t| t.resolve_type(ty), name.pos);
                if let Some(init) = init {
                    let actual = self.type_of(init);
                    if let (Some(expected), Some(actual)) = (&declared, actual) {
                        self.expect_accepts(expected, &actual, init.pos());
                    }
                }
                let declared = declared.unwrap_or(Type::Void);
                if let Err(err) = self.table.declare(&name.name, declared, *constant, name.pos) {
                    self.declaration_error(err, name.pos);
                }
            }
            Stmt::Assign { target, value, .. } => {
                let expected = self.target_type(target);
                let actual = self.type_of(value);
                if let (Some(expected), Some(actual)) = (expected, actual) {
                    self.expect_accepts(&expected, &actual, value.pos());
                }
            }
            Stmt::Read { target, prompt } => {
                if let Some(prompt) = prompt {
                    self.type_of(prompt);
                }
                match self.table.lookup(&target.name).cloned() {
                    Some(symbol) if symbol.constant => self.error(
                        TypeErrorKind::AssignToConstant {
                            name: target.name.clone(),
                        },
                        target.pos,
                    ),
                    Some(symbol) => {
                        let readable = matches!(
                            symbol.ty,
                            Type::Integer | Type::Rational | Type::String | Type::Boolean | Type::Void
                        );
                        if !readable {
                            self.error(
                                TypeErrorKind::InvalidReadTarget {
                                    ty: symbol.ty.to_string(),
                                },
                                target.pos,
                            );
                        }
                    }
                    None if self.table.is_imported(&target.name) => {}
                    None => self.error(
                        TypeErrorKind::Undefined {
                            name: target.name.clone(),
                        },
                        target.pos,
                    ),
                }
            }
            Stmt::Write { value, .. } => {
                self.type_of(value);
            }
            Stmt::If {
                branches,
                else_body,
            } => {
                for branch in branches {
                    self.condition(&branch.cond);
                    self.check_block(&branch.body);
                }
                if let Some(body) = else_body {
                    self.check_block(body);
                }
            }
            Stmt::While { cond, body } | Stmt::DoWhile { body, cond } => {
                self.condition(cond);
                self.check_block(body);
            }
            Stmt::For {
                var,
                iterable,
                body,
            } => {
                let element = match self.type_of(iterable) {
                    Some(ty) => ty.element_type().or_else(|| {
                        self.error(
                            TypeErrorKind::NotIndexable {
                                found: ty.to_string(),
                            },
                            iterable.pos(),
                        );
                        None
                    }),
                    None => None,
                };
                self.table.push_scope();
                if let Err(err) = self.table.declare(
                    &var.name,
                    element.unwrap_or(Type::Void),
                    true,
                    var.pos,
                ) {
                    self.declaration_error(err, var.pos);
                }
                self.check_block(body);
                self.table.pop_scope();
            }
            Stmt::Function(decl) => {
                // Nested declarations are scoped like variables.
                if self.declare_function(decl) {
                    self.check_function_body(decl);
                }
            }
            Stmt::Return { value, pos } => {
                let actual = match value {
                    Some(expr) => self.type_of(expr),
                    None => Some(Type::Void),
                };
                match self.returns.last().cloned() {
                    None => self.error(TypeErrorKind::ReturnOutsideFunction, *pos),
                    Some(expected) => {
                        if let Some(actual) = actual {
                            let at = value.as_ref().map_or(*pos, Expr::pos);
                            self.expect_accepts(&expected, &actual, at);
                        }
                    }
                }
            }
            Stmt::Struct(_) | Stmt::Import(_) => {}
        }
    }

    fn expect_accepts(&mut self, expected: &Type, actual: &Type, pos: Position) {
        if !expected.accepts(actual) {
            self.error(
                TypeErrorKind::Mismatch {
                    expected: expected.to_string(),
                    found: actual.to_string(),
                },
                pos,
            );
        }
    }

    fn condition(&mut self, cond: &Expr) {
        if let Some(ty) = self.type_of(cond) {
            if ty != Type::Boolean {
                self.error(
                    TypeErrorKind::NonBooleanCondition {
                        found: ty.to_string(),
                    },
                    cond.pos(),
                );
            }
        }
    }

    /// Declared type of an assignment target, reporting constants.
    fn target_type(&mut self, target: &AssignTarget) -> Option<Type> {
        match target {
            AssignTarget::Variable(ident) => match self.table.lookup(&ident.name).cloned() {
                Some(symbol) if symbol.constant => {
                    self.error(
                        TypeErrorKind::AssignToConstant {
                            name: ident.name.clone(),
                        },
                        ident.pos,
                    );
                    None
                }
                Some(symbol) => (symbol.ty != Type::Void).then_some(symbol.ty),
                None if self.table.is_imported(&ident.name) => None,
                None => {
                    self.error(
                        TypeErrorKind::Undefined {
                            name: ident.name.clone(),
                        },
                        ident.pos,
                    );
                    None
                }
            },
            AssignTarget::Member { object, member } => {
                let object_ty = self.type_of(object);
                if let Some(ty @ (Type::List(_) | Type::String)) = &object_ty {
                    self.error(
                        TypeErrorKind::UnknownMember {
                            ty: ty.to_string(),
                            member: member.name.clone(),
                        },
                        member.pos,
                    );
                    return None;
                }
                self.absorb(member_type(object_ty.as_ref(), member, &self.table))
            }
            AssignTarget::Index { target, index, pos } => {
                let target_ty = self.type_of(target);
                self.index_operand(index);
                if let Some(ty @ Type::String) = &target_ty {
                    self.error(
                        TypeErrorKind::NotIndexable {
                            found: ty.to_string(),
                        },
                        *pos,
                    );
                    return None;
                }
                self.absorb(index_type(target_ty.as_ref(), *pos))
            }
        }
    }

    fn index_operand(&mut self, index: &Expr) {
        if let Some(ty) = self.type_of(index) {
            if ty != Type::Integer {
                self.error(
                    TypeErrorKind::Mismatch {
                        expected: Type::Integer.to_string(),
                        found: ty.to_string(),
                    },
                    index.pos(),
                );
            }
        }
    }

    fn absorb(&mut self, result: Result<Option<Type>, TypeError>) -> Option<Type> {
        match result {
            Ok(ty) => ty,
            Err(err) => {
                self.errors.push(err);
                None
            }
        }
    }

    /// Infer `expr`, also checking every call inside it.
    fn type_of(&mut self, expr: &Expr) -> Option<Type> {
        self.check_calls(expr);
        let result = expr.static_type(&self.table);
        self.absorb(result)
    }

    fn check_calls(&mut self, expr: &Expr) {
        ensure_sufficient_stack(|| match expr {
            Expr::Literal { .. } | Expr::Identifier(_) => {}
            Expr::Unary { operand, .. } => self.check_calls(operand),
            Expr::Binary { left, right, .. } => {
                self.check_calls(left);
                self.check_calls(right);
            }
            Expr::Member { object, .. } => self.check_calls(object),
            Expr::Index { target, index, .. } => {
                self.check_calls(target);
                self.check_calls(index);
            }
            Expr::List { elements, .. } => elements.iter().for_each(|e| self.check_calls(e)),
            Expr::Call { callee, args, pos } => {
                self.check_calls(callee);
                args.iter().for_each(|a| self.check_calls(a));
                self.check_call(callee, args, *pos);
            }
        });
    }

    fn check_call(&mut self, callee: &Expr, args: &[Expr], pos: Position) {
        let arg_types: Vec<Option<Type>> = args
            .iter()
            .map(|arg| arg.static_type(&self.table).ok().flatten())
            .collect();

        let (name, params) = match callee {
            Expr::Identifier(ident) if self.table.lookup(&ident.name).is_none() => {
                if let Some(def) = self.table.struct_def(&ident.name) {
                    let params = def.fields.iter().map(|(_, ty)| ty.clone()).collect();
                    (ident.name.clone(), params)
                } else if let Some(sig) = native(&ident.name) {
                    self.check_native(sig, &ident.name, args, &arg_types, pos);
                    return;
                } else {
                    return;
                }
            }
            _ => match callee.static_type(&self.table) {
                Ok(Some(Type::Function(sig))) => {
                    let name = callee
                        .as_identifier()
                        .map_or_else(|| "function".to_string(), |i| i.name.clone());
                    (name, sig.params.clone())
                }
                _ => return,
            },
        };

        if params.len() != args.len() {
            self.error(
                TypeErrorKind::WrongArgCount {
                    name,
                    expected: params.len(),
                    found: args.len(),
                },
                pos,
            );
            return;
        }
        for ((param, arg), actual) in params.iter().zip(args).zip(arg_types) {
            if let Some(actual) = actual {
                self.expect_accepts(param, &actual, arg.pos());
            }
        }
    }

    fn check_native(
        &mut self,
        sig: &NativeSignature,
        name: &str,
        args: &[Expr],
        arg_types: &[Option<Type>],
        pos: Position,
    ) {
        if sig.arity != args.len() {
            self.error(
                TypeErrorKind::WrongArgCount {
                    name: name.to_string(),
                    expected: sig.arity,
                    found: args.len(),
                },
                pos,
            );
            return;
        }
        if let (Some(first), Some(Some(receiver))) = (args.first(), arg_types.first()) {
            if !sig.receivers.is_empty() && !sig.accepts_receiver(receiver) {
                let expected = sig
                    .receivers
                    .iter()
                    .map(|r| match r {
                        Receiver::List => "list",
                        Receiver::String => "string",
                    })
                    .collect::<Vec<_>>()
                    .join(" or ");
                self.error(
                    TypeErrorKind::Mismatch {
                        expected,
                        found: receiver.to_string(),
                    },
                    first.pos(),
                );
            }
        }
    }
}
