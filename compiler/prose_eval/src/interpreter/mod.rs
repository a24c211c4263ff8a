//! Tree-walking interpreter.
//!
//! A program runs in two sweeps over its top-level statements: first every
//! struct, function and import declaration, so top-level functions can
//! refer to each other regardless of order, then everything else in
//! source order.
//!
//! Statement execution returns a [`Flow`]; `return` travels back to the
//! call as [`Flow::Return`] rather than through an error path. The current
//! scope is a field that [`ScopedInterpreter`] sets and
//! restores on every exit path.

mod builder;
mod expr;
mod modules;
mod natives;
mod scope_guard;

use std::path::{Path, PathBuf};
use std::rc::Rc;

use prose_ir::{AssignTarget, Block, Expr, FunctionDecl, Program, Stmt, TypeNode};
use prose_stack::ensure_sufficient_stack;
use prose_types::{FunctionSignature, StructType, Type};
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::errors::{
    assign_to_constant, invalid_input, io_error, read_only_member, type_mismatch, undefined,
    unknown_member,
};
use crate::{
    Binding, Closure, Environment, EvalResult, Module, ModuleLoader, ScopeId, SharedInputHandler,
    SharedPrintHandler, TypedValue, Value,
};

pub use builder::{InterpreterBuilder, DEFAULT_MAX_CALL_DEPTH};
pub use scope_guard::ScopedInterpreter;

/// How a statement finished.
#[derive(Debug)]
pub enum Flow {
    Normal,
    Return(TypedValue),
}

pub struct Interpreter {
    env: Environment,
    /// Top-level scope of the main program; persists across `run` calls.
    globals: ScopeId,
    scope: ScopeId,
    /// Directory imports of the running unit resolve against.
    base_dir: PathBuf,
    modules: FxHashMap<String, Rc<Module>>,
    /// Modules whose top level is running, outermost first.
    loading: Vec<String>,
    loader: Box<dyn ModuleLoader>,
    print_handler: SharedPrintHandler,
    input_handler: SharedInputHandler,
    /// Declared return types of the active calls, innermost last.
    returns: Vec<Type>,
    max_call_depth: usize,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    /// An interpreter writing to stdout, reading stdin and loading modules
    /// from the current directory.
    pub fn new() -> Self {
        InterpreterBuilder::new().build()
    }

    /// Run a program against the global scope.
    ///
    /// Globals persist between calls, so a REPL can feed one line at a time.
    pub fn run(&mut self, program: &Program) -> EvalResult<()> {
        self.scope = self.globals;
        self.returns.clear();
        self.run_unit(program)
    }

    fn run_unit(&mut self, program: &Program) -> EvalResult<()> {
        debug!(
            statements = program.statements.len(),
            "running declaration sweep"
        );
        for stmt in program.statements.iter().filter(|s| s.is_declaration()) {
            self.exec_stmt(stmt)?;
        }
        debug!("running statement sweep");
        for stmt in program.statements.iter().filter(|s| !s.is_declaration()) {
            if let Flow::Return(_) = self.exec_stmt(stmt)? {
                break;
            }
        }
        Ok(())
    }

    /// Value of a top-level binding.
    pub fn global(&self, name: &str) -> Option<TypedValue> {
        self.env
            .lookup_local(self.globals, name)
            .map(Binding::typed_value)
    }

    pub fn print_handler(&self) -> &SharedPrintHandler {
        &self.print_handler
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Change the directory imports of the main program resolve against.
    pub fn set_base_dir(&mut self, dir: impl Into<PathBuf>) {
        self.base_dir = dir.into();
    }

    /// Scopes currently held by the arena.
    pub fn live_scopes(&self) -> usize {
        self.env.live_scopes()
    }

    // Statements

    fn exec_stmt(&mut self, stmt: &Stmt) -> EvalResult<Flow> {
        ensure_sufficient_stack(|| self.exec_stmt_inner(stmt))
    }

    fn exec_stmt_inner(&mut self, stmt: &Stmt) -> EvalResult<Flow> {
        match stmt {
            Stmt::Expr(expr) => {
                self.eval(expr)?;
            }
            Stmt::Create {
                ty,
                constant,
                name,
                init,
            } => {
                let declared = self.resolve_type(ty)?;
                let value = match init {
                    Some(init) => {
                        let value = self.eval(init)?;
                        coerce(&declared, value).map_err(|e| e.at(init.pos()))?
                    }
                    None => TypedValue::new(Value::zero(&declared), declared),
                };
                self.env.define(
                    self.scope,
                    name.name.clone(),
                    Binding::new(value.value, value.ty, *constant),
                );
            }
            Stmt::Assign { target, value, .. } => self.exec_assign(target, value)?,
            Stmt::Read { target, prompt } => {
                if let Some(prompt) = prompt {
                    let text = self.eval(prompt)?.value.to_string();
                    self.print_handler.print(&text);
                }
                let (ty, constant) = match self.env.lookup(self.scope, &target.name) {
                    Some(binding) => (binding.ty.clone(), binding.constant),
                    None => return Err(undefined(&target.name).at(target.pos)),
                };
                if constant {
                    return Err(assign_to_constant(&target.name).at(target.pos));
                }
                let line = self.read_line().map_err(|e| e.at(target.pos))?;
                let value = parse_input(&line, &ty).map_err(|e| e.at(target.pos))?;
                if let Some(binding) = self.env.lookup_mut(self.scope, &target.name) {
                    binding.value = value;
                }
            }
            Stmt::Write { value, newline } => {
                let text = self.eval(value)?.value.to_string();
                if *newline {
                    self.print_handler.println(&text);
                } else {
                    self.print_handler.print(&text);
                }
            }
            Stmt::If {
                branches,
                else_body,
            } => {
                for branch in branches {
                    if self.condition(&branch.cond)? {
                        return self.exec_block(&branch.body);
                    }
                }
                if let Some(body) = else_body {
                    return self.exec_block(body);
                }
            }
            Stmt::While { cond, body } => {
                while self.condition(cond)? {
                    if let flow @ Flow::Return(_) = self.exec_block(body)? {
                        return Ok(flow);
                    }
                }
            }
            Stmt::DoWhile { body, cond } => loop {
                if let flow @ Flow::Return(_) = self.exec_block(body)? {
                    return Ok(flow);
                }
                if !self.condition(cond)? {
                    break;
                }
            },
            Stmt::For {
                var,
                iterable,
                body,
            } => {
                for item in self.iteration_items(iterable)? {
                    let flow = self.with_env_scope(|scoped| {
                        let scope = scoped.scope;
                        scoped.env.define(
                            scope,
                            var.name.clone(),
                            Binding::new(item.value, item.ty, true),
                        );
                        scoped.exec_stmts(body)
                    })?;
                    if let Flow::Return(_) = flow {
                        return Ok(flow);
                    }
                }
            }
            Stmt::Function(decl) => self.declare_function(decl)?,
            Stmt::Return { value, pos } => {
                let at = value.as_ref().map_or(*pos, Expr::pos);
                let value = match value {
                    Some(expr) => self.eval(expr)?,
                    None => TypedValue::void(),
                };
                let value = match self.returns.last() {
                    Some(expected) => coerce(expected, value).map_err(|e| e.at(at))?,
                    None => value,
                };
                return Ok(Flow::Return(value));
            }
            Stmt::Struct(decl) => {
                let fields = decl
                    .fields
                    .iter()
                    .map(|field| Ok((field.name.name.clone(), self.resolve_type(&field.ty)?)))
                    .collect::<EvalResult<Vec<_>>>()?;
                let def = Rc::new(StructType::new(decl.name.name.clone(), fields));
                debug!(name = %def.name, "declared struct");
                self.env.define_struct(self.scope, def);
            }
            Stmt::Import(decl) => self.exec_import(decl)?,
        }
        Ok(Flow::Normal)
    }

    /// Run a block in a fresh child scope.
    fn exec_block(&mut self, body: &Block) -> EvalResult<Flow> {
        self.with_env_scope(|scoped| scoped.exec_stmts(body))
    }

    /// Run statements in the current scope, stopping at `return`.
    fn exec_stmts(&mut self, body: &[Stmt]) -> EvalResult<Flow> {
        for stmt in body {
            if let flow @ Flow::Return(_) = self.exec_stmt(stmt)? {
                return Ok(flow);
            }
        }
        Ok(Flow::Normal)
    }

    fn condition(&mut self, cond: &Expr) -> EvalResult<bool> {
        let value = self.eval(cond)?;
        value
            .value
            .as_bool()
            .ok_or_else(|| type_mismatch("boolean", value.ty.to_string()).at(cond.pos()))
    }

    /// Elements of a list, or characters of a string, in order. The list is
    /// copied first so the body may modify it.
    fn iteration_items(&mut self, iterable: &Expr) -> EvalResult<Vec<TypedValue>> {
        let value = self.eval(iterable)?;
        match &value.value {
            Value::List(items) => Ok(items
                .borrow()
                .iter()
                .map(|item| value.element(item.clone()))
                .collect()),
            Value::Str(s) => Ok(s
                .chars()
                .map(|c| TypedValue::new(Value::Str(c.to_string()), Type::String))
                .collect()),
            _ => Err(type_mismatch("list or string", value.ty.to_string()).at(iterable.pos())),
        }
    }

    fn declare_function(&mut self, decl: &Rc<FunctionDecl>) -> EvalResult<()> {
        let params = decl
            .params
            .iter()
            .map(|param| self.resolve_type(&param.ty))
            .collect::<EvalResult<Vec<_>>>()?;
        let ret = match &decl.ret {
            Some(node) => self.resolve_type(node)?,
            None => Type::Void,
        };
        let signature = Rc::new(FunctionSignature::new(params, ret));
        let closure = Closure {
            decl: Rc::clone(decl),
            signature: Rc::clone(&signature),
            capture: self.env.capture(self.scope),
        };
        self.env.define(
            self.scope,
            decl.name.name.clone(),
            Binding::new(
                Value::Function(Rc::new(closure)),
                Type::Function(signature),
                true,
            ),
        );
        debug!(name = %decl.name.name, "declared function");
        Ok(())
    }

    fn exec_assign(&mut self, target: &AssignTarget, value: &Expr) -> EvalResult<()> {
        match target {
            AssignTarget::Variable(ident) => {
                let new = self.eval(value)?;
                let Some(binding) = self.env.lookup_mut(self.scope, &ident.name) else {
                    return Err(undefined(&ident.name).at(ident.pos));
                };
                if binding.constant {
                    return Err(assign_to_constant(&ident.name).at(ident.pos));
                }
                binding.value = coerce(&binding.ty, new).map_err(|e| e.at(value.pos()))?.value;
            }
            AssignTarget::Member { object, member } => {
                let object = self.eval(object)?;
                if let Value::Module(module) = &object.value {
                    return Err(read_only_member(&member.name, &module.name).at(member.pos));
                }
                let new = self.eval(value)?;
                let Value::Struct(instance) = &object.value else {
                    return Err(type_mismatch("struct", object.ty.to_string()).at(member.pos));
                };
                let Some(index) = instance.def.field_index(&member.name) else {
                    let on = format!("struct {}", instance.def.name);
                    return Err(unknown_member(&member.name, on).at(member.pos));
                };
                let field_ty = &instance.def.fields[index].1;
                let new = coerce(field_ty, new).map_err(|e| e.at(value.pos()))?;
                instance.fields.borrow_mut()[index] = new.value;
            }
            AssignTarget::Index { target, index, pos } => {
                let list = self.eval(target)?;
                let position = self.eval_index(index)?;
                let new = self.eval(value)?;
                let Value::List(items) = &list.value else {
                    return Err(type_mismatch("list", list.ty.to_string()).at(*pos));
                };
                let len = items.borrow().len();
                let slot = natives::checked_index(position, len).map_err(|e| e.at(index.pos()))?;
                let new = match &list.ty {
                    Type::List(elem) if !list.ty.is_placeholder_list() => {
                        coerce(elem, new).map_err(|e| e.at(value.pos()))?
                    }
                    _ => new,
                };
                items.borrow_mut()[slot] = new.value;
            }
        }
        Ok(())
    }

    fn read_line(&self) -> EvalResult<String> {
        match self.input_handler.read_line() {
            Ok(Some(line)) => Ok(line),
            Ok(None) => Err(io_error("unexpected end of input")),
            Err(err) => Err(io_error(format!("could not read input: {err}"))),
        }
    }

    // Types

    /// Resolve a type annotation against the structs visible from the
    /// current scope.
    fn resolve_type(&self, node: &TypeNode) -> EvalResult<Type> {
        match node {
            TypeNode::Simple(ident) => match ident.name.as_str() {
                "integer" => Ok(Type::Integer),
                "rational" => Ok(Type::Rational),
                "string" => Ok(Type::String),
                "boolean" => Ok(Type::Boolean),
                "void" => Ok(Type::Void),
                name => self
                    .env
                    .struct_def(self.scope, name)
                    .map(|def| Type::Struct(Rc::clone(def)))
                    .ok_or_else(|| undefined(name).at(ident.pos)),
            },
            TypeNode::List(elem) => Ok(Type::list(self.resolve_type(elem)?)),
            TypeNode::Function { params, ret } => {
                let params = params
                    .iter()
                    .map(|p| self.resolve_type(p))
                    .collect::<EvalResult<Vec<_>>>()?;
                Ok(Type::function(params, self.resolve_type(ret)?))
            }
        }
    }
}

/// Convert `actual` for storage where `expected` is declared: an integer
/// widens to a rational, anything else incompatible is a mismatch.
pub(crate) fn coerce(expected: &Type, actual: TypedValue) -> EvalResult<TypedValue> {
    if !expected.accepts(&actual.ty) {
        return Err(type_mismatch(expected.to_string(), actual.ty.to_string()));
    }
    let value = if *expected == actual.ty {
        actual.value
    } else {
        widen(expected, actual.value)
    };
    let ty = if expected.is_placeholder_list() {
        actual.ty
    } else {
        expected.clone()
    };
    Ok(TypedValue::new(value, ty))
}

/// Convert integers to rationals where `expected` asks for them. A list
/// that needs converting is copied, so the original keeps its type.
fn widen(expected: &Type, value: Value) -> Value {
    match (expected, value) {
        #[allow(clippy::cast_precision_loss)]
        (Type::Rational, Value::Integer(n)) => Value::Rational(n as f64),
        (Type::List(elem), Value::List(items)) => {
            let items = items.borrow().iter().map(|item| widen(elem, item.clone())).collect();
            Value::list(items)
        }
        (_, value) => value,
    }
}

/// Parse one line of input as a value of type `ty`.
fn parse_input(line: &str, ty: &Type) -> EvalResult<Value> {
    let trimmed = line.trim();
    let invalid = || invalid_input(line, ty.to_string());
    match ty {
        Type::Integer => trimmed.parse().map(Value::Integer).map_err(|_| invalid()),
        Type::Rational => trimmed.parse().map(Value::Rational).map_err(|_| invalid()),
        Type::Boolean => match trimmed.to_ascii_lowercase().as_str() {
            "true" => Ok(Value::Boolean(true)),
            "false" => Ok(Value::Boolean(false)),
            _ => Err(invalid()),
        },
        Type::String => Ok(Value::Str(line.to_string())),
        other => Err(type_mismatch(
            "integer, rational, string or boolean",
            other.to_string(),
        )),
    }
}

#[cfg(test)]
mod tests;
