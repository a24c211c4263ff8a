//! Built-in functions.
//!
//! Natives are not values: they are found by name at a call site when the
//! name is not bound. The first argument is the receiver and picks the
//! behaviour (`length` of a list or of a string).

use prose_types::{NativeSignature, Type};

use super::expr::Arg;
use super::{coerce, Interpreter};
use crate::errors::{index_out_of_range, io_error, type_mismatch, wrong_arg_count};
use crate::{EvalResult, TypedValue, Value};

/// Convert a user index to a slot in a sequence of length `len`.
pub(super) fn checked_index(index: i64, len: usize) -> EvalResult<usize> {
    usize::try_from(index)
        .ok()
        .filter(|&i| i < len)
        .ok_or_else(|| index_out_of_range(index, len))
}

pub(super) fn length_value(len: usize) -> TypedValue {
    TypedValue::new(
        Value::Integer(i64::try_from(len).unwrap_or(i64::MAX)),
        Type::Integer,
    )
}

/// `target[index]` for a list or a string.
pub(super) fn element_at(target: &TypedValue, index: i64) -> EvalResult<TypedValue> {
    match &target.value {
        Value::List(items) => {
            let items = items.borrow();
            let slot = checked_index(index, items.len())?;
            Ok(target.element(items[slot].clone()))
        }
        Value::Str(s) => {
            let len = s.chars().count();
            let slot = checked_index(index, len)?;
            let c = s.chars().nth(slot).map(String::from).unwrap_or_default();
            Ok(TypedValue::new(Value::Str(c), Type::String))
        }
        _ => Err(type_mismatch("list or string", target.ty.to_string())),
    }
}

fn integer_arg(arg: &Arg) -> EvalResult<i64> {
    match arg.0.value {
        Value::Integer(n) => Ok(n),
        _ => Err(type_mismatch("integer", arg.0.ty.to_string()).at(arg.1)),
    }
}

fn receiver_kinds(sig: &NativeSignature) -> String {
    sig.receivers
        .iter()
        .map(|r| match r {
            prose_types::Receiver::List => "list",
            prose_types::Receiver::String => "string",
        })
        .collect::<Vec<_>>()
        .join(" or ")
}

impl Interpreter {
    pub(super) fn call_native(
        &mut self,
        sig: &NativeSignature,
        args: Vec<Arg>,
        pos: prose_ir::Position,
    ) -> EvalResult<TypedValue> {
        if args.len() != sig.arity {
            return Err(wrong_arg_count(sig.name, sig.arity, args.len()).at(pos));
        }
        if let Some((receiver, at)) = args.first() {
            if !sig.receivers.is_empty() && !sig.accepts_receiver(&receiver.ty) {
                return Err(type_mismatch(receiver_kinds(sig), receiver.ty.to_string()).at(*at));
            }
        }
        match (sig.name, args.as_slice()) {
            ("length", [(receiver, _)]) => Ok(match &receiver.value {
                Value::List(items) => length_value(items.borrow().len()),
                Value::Str(s) => length_value(s.chars().count()),
                _ => length_value(0),
            }),
            ("add", [(list, _), (item, at)]) => {
                let item = match &list.ty {
                    Type::List(elem) if !list.ty.is_placeholder_list() => {
                        coerce(elem, item.clone()).map_err(|e| e.at(*at))?
                    }
                    _ => item.clone(),
                };
                if let Value::List(items) = &list.value {
                    items.borrow_mut().push(item.value);
                }
                Ok(TypedValue::void())
            }
            ("get", [(receiver, _), index]) => {
                let position = integer_arg(index)?;
                element_at(receiver, position).map_err(|e| e.at(index.1))
            }
            ("remove", [(list, _), index]) => {
                let position = integer_arg(index)?;
                if let Value::List(items) = &list.value {
                    let len = items.borrow().len();
                    let slot = checked_index(position, len).map_err(|e| e.at(index.1))?;
                    items.borrow_mut().remove(slot);
                }
                Ok(TypedValue::void())
            }
            ("uppercase" | "lowercase", [(receiver, _)]) => {
                let s = receiver.value.to_string();
                let converted = if sig.name == "uppercase" {
                    s.to_uppercase()
                } else {
                    s.to_lowercase()
                };
                Ok(TypedValue::new(Value::Str(converted), Type::String))
            }
            ("substring", [(receiver, _), start, end]) => {
                let s = receiver.value.to_string();
                let len = s.chars().count();
                let from = integer_arg(start)?;
                let to = integer_arg(end)?;
                let first = usize::try_from(from)
                    .ok()
                    .filter(|&i| i <= len)
                    .ok_or_else(|| index_out_of_range(from, len).at(start.1))?;
                let last = usize::try_from(to)
                    .ok()
                    .filter(|&i| i >= first && i <= len)
                    .ok_or_else(|| index_out_of_range(to, len).at(end.1))?;
                let sub: String = s.chars().skip(first).take(last - first).collect();
                Ok(TypedValue::new(Value::Str(sub), Type::String))
            }
            ("readme", [(prompt, _)]) => {
                self.print_handler.print(&prompt.value.to_string());
                let line = self.read_line().map_err(|e| e.at(pos))?;
                Ok(TypedValue::new(Value::Str(line), Type::String))
            }
            _ => Err(io_error(format!("native `{}` is not available", sig.name)).at(pos)),
        }
    }
}
