//! Expression evaluation and calls.

use std::rc::Rc;

use prose_ir::{BinaryOp, Expr, Ident, Literal, Position};
use prose_stack::ensure_sufficient_stack;
use prose_types::{native, StructType, Type};
use tracing::debug;

use super::{coerce, natives, Flow, Interpreter};
use crate::errors::{
    call_depth_exceeded, not_callable, type_mismatch, undefined, unknown_member, wrong_arg_count,
};
use crate::operators::{eval_binary, eval_unary};
use crate::{Binding, Closure, EvalErrorKind, EvalResult, StructInstance, TypedValue, Value};

/// An evaluated argument and where it was written.
pub(super) type Arg = (TypedValue, Position);

impl Interpreter {
    pub(super) fn eval(&mut self, expr: &Expr) -> EvalResult<TypedValue> {
        ensure_sufficient_stack(|| self.eval_inner(expr))
    }

    fn eval_inner(&mut self, expr: &Expr) -> EvalResult<TypedValue> {
        match expr {
            Expr::Literal { value, .. } => Ok(TypedValue::natural(match value {
                Literal::Integer(n) => Value::Integer(*n),
                Literal::Rational(r) => Value::Rational(*r),
                Literal::Str(s) => Value::Str(s.clone()),
                Literal::Boolean(b) => Value::Boolean(*b),
            })),
            Expr::Identifier(ident) => self
                .env
                .lookup(self.scope, &ident.name)
                .map(Binding::typed_value)
                .ok_or_else(|| undefined(&ident.name).at(ident.pos)),
            Expr::Unary { op, operand, pos } => {
                let operand = self.eval(operand)?;
                eval_unary(*op, &operand).map_err(|e| e.at(*pos))
            }
            Expr::Binary {
                op: op @ (BinaryOp::And | BinaryOp::Or),
                left,
                right,
                ..
            } => self.eval_logical(*op, left, right),
            Expr::Binary {
                op,
                left,
                right,
                pos,
            } => {
                let left = self.eval(left)?;
                let right = self.eval(right)?;
                eval_binary(*op, &left, &right).map_err(|e| e.at(*pos))
            }
            Expr::Member { object, member } => {
                let object = self.eval(object)?;
                self.member(&object, member)
            }
            Expr::Index { target, index, pos } => {
                let target = self.eval(target)?;
                let position = self.eval_index(index)?;
                natives::element_at(&target, position).map_err(|e| {
                    let at = match e.kind {
                        EvalErrorKind::IndexOutOfRange { .. } => index.pos(),
                        _ => *pos,
                    };
                    e.at(at)
                })
            }
            Expr::List { elements, .. } => self.eval_list(elements),
            Expr::Call { callee, args, pos } => self.eval_call(callee, args, *pos),
        }
    }

    /// `&&` and `||` evaluate the right operand only when needed. Both
    /// operands must be boolean.
    fn eval_logical(&mut self, op: BinaryOp, left: &Expr, right: &Expr) -> EvalResult<TypedValue> {
        let lhs = self.operand_bool(left)?;
        let decided = match op {
            BinaryOp::And => !lhs,
            _ => lhs,
        };
        let result = if decided { lhs } else { self.operand_bool(right)? };
        Ok(TypedValue::new(Value::Boolean(result), Type::Boolean))
    }

    fn operand_bool(&mut self, expr: &Expr) -> EvalResult<bool> {
        let value = self.eval(expr)?;
        value
            .value
            .as_bool()
            .ok_or_else(|| type_mismatch("boolean", value.ty.to_string()).at(expr.pos()))
    }

    pub(super) fn eval_index(&mut self, index: &Expr) -> EvalResult<i64> {
        let value = self.eval(index)?;
        match value.value {
            Value::Integer(n) => Ok(n),
            _ => Err(type_mismatch("integer", value.ty.to_string()).at(index.pos())),
        }
    }

    fn member(&self, object: &TypedValue, member: &Ident) -> EvalResult<TypedValue> {
        let found = match &object.value {
            Value::Struct(instance) => instance.get(&member.name),
            Value::Module(module) => self
                .env
                .lookup_local(module.root, &member.name)
                .map(Binding::typed_value),
            Value::List(items) if member.name == "length" => {
                Some(natives::length_value(items.borrow().len()))
            }
            Value::Str(s) if member.name == "length" => {
                Some(natives::length_value(s.chars().count()))
            }
            _ => None,
        };
        found.ok_or_else(|| {
            let on = match &object.value {
                Value::Struct(instance) => format!("struct {}", instance.def.name),
                Value::Module(module) => format!("module `{}`", module.name),
                _ => object.ty.to_string(),
            };
            unknown_member(&member.name, on).at(member.pos)
        })
    }

    /// Elements settle on the widest type among them (integer widens to
    /// rational) and are converted to it. An empty literal has the
    /// placeholder type.
    fn eval_list(&mut self, elements: &[Expr]) -> EvalResult<TypedValue> {
        let mut elem_ty: Option<Type> = None;
        let mut values = Vec::with_capacity(elements.len());
        for element in elements {
            let value = self.eval(element)?;
            elem_ty = match elem_ty {
                None => Some(value.ty.clone()),
                Some(ty) => Some(ty.common(&value.ty).ok_or_else(|| {
                    type_mismatch(ty.to_string(), value.ty.to_string()).at(element.pos())
                })?),
            };
            values.push(value);
        }
        let Some(elem_ty) = elem_ty else {
            return Ok(TypedValue::new(Value::list(Vec::new()), Type::placeholder_list()));
        };
        let items = values
            .into_iter()
            .map(|value| Ok(coerce(&elem_ty, value)?.value))
            .collect::<EvalResult<Vec<_>>>()?;
        Ok(TypedValue::new(Value::list(items), Type::list(elem_ty)))
    }

    fn eval_args(&mut self, args: &[Expr]) -> EvalResult<Vec<Arg>> {
        args.iter()
            .map(|arg| Ok((self.eval(arg)?, arg.pos())))
            .collect()
    }

    /// A call on a bare name that is not bound to a value constructs a
    /// struct or calls a native; anything else must evaluate to a function.
    fn eval_call(&mut self, callee: &Expr, args: &[Expr], pos: Position) -> EvalResult<TypedValue> {
        if let Some(ident) = callee.as_identifier() {
            if self.env.lookup(self.scope, &ident.name).is_none() {
                if let Some(def) = self.env.struct_def(self.scope, &ident.name) {
                    let def = Rc::clone(def);
                    let args = self.eval_args(args)?;
                    return construct(def, args, pos);
                }
                if let Some(sig) = native(&ident.name) {
                    let args = self.eval_args(args)?;
                    return self.call_native(sig, args, pos);
                }
                return Err(undefined(&ident.name).at(ident.pos));
            }
        }
        let function = self.eval(callee)?;
        let Value::Function(closure) = &function.value else {
            return Err(not_callable(function.ty.to_string()).at(pos));
        };
        let args = self.eval_args(args)?;
        self.call_closure(closure, args, pos)
    }

    /// Run a user function. Its body executes in a fresh scope whose parent
    /// is the scope the function was declared in.
    pub(super) fn call_closure(
        &mut self,
        closure: &Closure,
        args: Vec<Arg>,
        pos: Position,
    ) -> EvalResult<TypedValue> {
        let name = &closure.decl.name.name;
        let params = &closure.decl.params;
        if args.len() != params.len() {
            return Err(wrong_arg_count(name, params.len(), args.len()).at(pos));
        }
        if self.returns.len() >= self.max_call_depth {
            return Err(call_depth_exceeded(self.max_call_depth).at(pos));
        }
        let bindings = params
            .iter()
            .zip(&closure.signature.params)
            .zip(args)
            .map(|((param, ty), (value, at))| {
                let value = coerce(ty, value).map_err(|e| e.at(at))?;
                Ok((param.name.name.clone(), Binding::new(value.value, value.ty, false)))
            })
            .collect::<EvalResult<Vec<_>>>()?;

        debug!(function = %name, depth = self.returns.len() + 1, "call");
        self.returns.push(closure.signature.ret.clone());
        let flow = self.with_scope_at(closure.scope(), |scoped| {
            let scope = scoped.scope;
            for (param, binding) in bindings {
                scoped.env.define(scope, param, binding);
            }
            scoped.exec_stmts(&closure.decl.body)
        });
        self.returns.pop();
        match flow? {
            Flow::Return(value) => Ok(value),
            Flow::Normal => Ok(TypedValue::void()),
        }
    }
}

fn construct(def: Rc<StructType>, args: Vec<Arg>, pos: Position) -> EvalResult<TypedValue> {
    if args.len() != def.fields.len() {
        return Err(wrong_arg_count(&def.name, def.fields.len(), args.len()).at(pos));
    }
    let fields = def
        .fields
        .iter()
        .zip(args)
        .map(|((_, ty), (value, at))| Ok(coerce(ty, value).map_err(|e| e.at(at))?.value))
        .collect::<EvalResult<Vec<_>>>()?;
    let instance = StructInstance::new(Rc::clone(&def), fields);
    Ok(TypedValue::new(
        Value::Struct(Rc::new(instance)),
        Type::Struct(def),
    ))
}
