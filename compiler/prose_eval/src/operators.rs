//! Binary and unary operator evaluation.
//!
//! `&&` and `||` short-circuit, so the interpreter evaluates them itself;
//! every other operator arrives here with both operands evaluated.

use prose_ir::{BinaryOp, UnaryOp};
use prose_types::Type;

use crate::errors::{division_by_zero, integer_overflow, invalid_operands, invalid_unary};
use crate::{EvalResult, TypedValue, Value};

pub fn eval_binary(op: BinaryOp, left: &TypedValue, right: &TypedValue) -> EvalResult<TypedValue> {
    match op {
        BinaryOp::Add if is_string(left) || is_string(right) => Ok(TypedValue::new(
            Value::Str(format!("{}{}", left.value, right.value)),
            Type::String,
        )),
        BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Mod => arithmetic(op, left, right),
        BinaryOp::Div => divide(left, right),
        BinaryOp::Eq => Ok(boolean(left.value.equals(&right.value))),
        BinaryOp::NotEq => Ok(boolean(!left.value.equals(&right.value))),
        BinaryOp::Lt | BinaryOp::LtEq | BinaryOp::Gt | BinaryOp::GtEq => compare(op, left, right),
        BinaryOp::And | BinaryOp::Or => match (left.value.as_bool(), right.value.as_bool()) {
            (Some(a), Some(b)) => Ok(boolean(if op == BinaryOp::And { a && b } else { a || b })),
            _ => Err(operand_error(op, left, right)),
        },
    }
}

pub fn eval_unary(op: UnaryOp, operand: &TypedValue) -> EvalResult<TypedValue> {
    match (op, &operand.value) {
        (UnaryOp::Neg, Value::Integer(n)) => n
            .checked_neg()
            .map(|n| TypedValue::new(Value::Integer(n), Type::Integer))
            .ok_or_else(|| integer_overflow("negation")),
        (UnaryOp::Neg, Value::Rational(r)) => Ok(TypedValue::new(Value::Rational(-r), Type::Rational)),
        (UnaryOp::Not, Value::Boolean(b)) => Ok(boolean(!b)),
        _ => Err(invalid_unary(op, operand.ty.to_string())),
    }
}

fn boolean(b: bool) -> TypedValue {
    TypedValue::new(Value::Boolean(b), Type::Boolean)
}

fn is_string(v: &TypedValue) -> bool {
    matches!(v.value, Value::Str(_))
}

#[cold]
fn operand_error(op: BinaryOp, left: &TypedValue, right: &TypedValue) -> crate::EvalError {
    invalid_operands(op, left.ty.to_string(), right.ty.to_string())
}

fn arithmetic(op: BinaryOp, left: &TypedValue, right: &TypedValue) -> EvalResult<TypedValue> {
    if let (Value::Integer(a), Value::Integer(b)) = (&left.value, &right.value) {
        let (a, b) = (*a, *b);
        let result = match op {
            BinaryOp::Add => a.checked_add(b).ok_or_else(|| integer_overflow("addition"))?,
            BinaryOp::Sub => a.checked_sub(b).ok_or_else(|| integer_overflow("subtraction"))?,
            BinaryOp::Mul => a.checked_mul(b).ok_or_else(|| integer_overflow("multiplication"))?,
            _ => floored_rem_int(a, b)?,
        };
        return Ok(TypedValue::new(Value::Integer(result), Type::Integer));
    }
    let (Some(a), Some(b)) = (left.value.as_f64(), right.value.as_f64()) else {
        return Err(operand_error(op, left, right));
    };
    let result = match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        _ => {
            if b == 0.0 {
                return Err(division_by_zero());
            }
            floored_rem(a, b)
        }
    };
    Ok(TypedValue::new(Value::Rational(result), Type::Rational))
}

/// Remainder with the sign of the divisor.
fn floored_rem_int(a: i64, b: i64) -> EvalResult<i64> {
    if b == 0 {
        return Err(division_by_zero());
    }
    let r = a.checked_rem(b).ok_or_else(|| integer_overflow("remainder"))?;
    Ok(if r != 0 && (r < 0) != (b < 0) { r + b } else { r })
}

fn floored_rem(a: f64, b: f64) -> f64 {
    let r = a % b;
    if r != 0.0 && (r < 0.0) != (b < 0.0) {
        r + b
    } else {
        r
    }
}

/// Division always produces a rational.
fn divide(left: &TypedValue, right: &TypedValue) -> EvalResult<TypedValue> {
    let (Some(a), Some(b)) = (left.value.as_f64(), right.value.as_f64()) else {
        return Err(operand_error(BinaryOp::Div, left, right));
    };
    if b == 0.0 {
        return Err(division_by_zero());
    }
    Ok(TypedValue::new(Value::Rational(a / b), Type::Rational))
}

fn compare(op: BinaryOp, left: &TypedValue, right: &TypedValue) -> EvalResult<TypedValue> {
    let ordering = match (&left.value, &right.value) {
        (Value::Integer(a), Value::Integer(b)) => a.partial_cmp(b),
        (Value::Str(a), Value::Str(b)) => a.partial_cmp(b),
        (a, b) => match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => x.partial_cmp(&y),
            _ => return Err(operand_error(op, left, right)),
        },
    };
    // NaN compares false under every ordering operator.
    let result = ordering.is_some_and(|ord| match op {
        BinaryOp::Lt => ord.is_lt(),
        BinaryOp::LtEq => ord.is_le(),
        BinaryOp::Gt => ord.is_gt(),
        _ => ord.is_ge(),
    });
    Ok(boolean(result))
}
