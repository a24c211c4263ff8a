//! Static type inference for expressions.
//!
//! Inference answers `Ok(None)` when the type cannot be known before the
//! program runs: names brought in by a selective import, members of an
//! imported module, elements of an empty list. A binding whose recorded type
//! is [`Type::Void`] is treated the same way; no declared variable can have
//! that type, so the parser and checker use it for loop variables over such
//! values.

use prose_ir::{BinaryOp, Expr, Ident, Literal, Position, UnaryOp};
use prose_stack::ensure_sufficient_stack;

use crate::{native, SymbolTable, Type, TypeError, TypeErrorKind};

/// Expressions that can compute their own type from a symbol table.
pub trait StaticType {
    fn static_type(&self, table: &SymbolTable) -> Result<Option<Type>, TypeError>;
}

impl StaticType for Expr {
    fn static_type(&self, table: &SymbolTable) -> Result<Option<Type>, TypeError> {
        ensure_sufficient_stack(|| infer(self, table))
    }
}

fn infer(expr: &Expr, table: &SymbolTable) -> Result<Option<Type>, TypeError> {
    match expr {
        Expr::Literal { value, .. } => Ok(Some(literal_type(value))),
        Expr::Identifier(ident) => identifier_type(ident, table),
        Expr::Unary { op, operand, pos } => {
            let operand = operand.static_type(table)?;
            unary_type(*op, operand.as_ref()).map_err(|kind| TypeError::new(kind, *pos))
        }
        Expr::Binary {
            op,
            left,
            right,
            pos,
        } => {
            let left = left.static_type(table)?;
            let right = right.static_type(table)?;
            binary_type(*op, left.as_ref(), right.as_ref()).map_err(|kind| TypeError::new(kind, *pos))
        }
        Expr::Member { object, member } => {
            let object = object.static_type(table)?;
            member_type(object.as_ref(), member, table)
        }
        Expr::Index { target, index, pos } => {
            let target = target.static_type(table)?;
            let index_ty = index.static_type(table)?;
            if let Some(ty) = index_ty.filter(|ty| *ty != Type::Integer) {
                return Err(TypeError::new(
                    TypeErrorKind::Mismatch {
                        expected: Type::Integer.to_string(),
                        found: ty.to_string(),
                    },
                    index.pos(),
                ));
            }
            index_type(target.as_ref(), *pos)
        }
        Expr::List { elements, .. } => list_type(elements, table),
        Expr::Call { callee, args, pos } => call_type(callee, args, *pos, table),
    }
}

pub(crate) fn literal_type(literal: &Literal) -> Type {
    match literal {
        Literal::Integer(_) => Type::Integer,
        Literal::Rational(_) => Type::Rational,
        Literal::Str(_) => Type::String,
        Literal::Boolean(_) => Type::Boolean,
    }
}

fn identifier_type(ident: &Ident, table: &SymbolTable) -> Result<Option<Type>, TypeError> {
    match table.lookup(&ident.name) {
        Some(symbol) => Ok(known(symbol.ty.clone())),
        None if table.is_imported(&ident.name) => Ok(None),
        None => Err(TypeError::new(
            TypeErrorKind::Undefined {
                name: ident.name.clone(),
            },
            ident.pos,
        )),
    }
}

/// `Void` stands for "not known yet".
fn known(ty: Type) -> Option<Type> {
    match ty {
        Type::Void => None,
        other => Some(other),
    }
}

pub(crate) fn unary_type(op: UnaryOp, operand: Option<&Type>) -> Result<Option<Type>, TypeErrorKind> {
    match (op, operand) {
        (UnaryOp::Neg, None) => Ok(None),
        (UnaryOp::Neg, Some(ty)) if ty.is_numeric() => Ok(Some(ty.clone())),
        (UnaryOp::Not, None | Some(Type::Boolean)) => Ok(Some(Type::Boolean)),
        (op, Some(ty)) => Err(TypeErrorKind::InvalidUnary {
            op: op.as_symbol(),
            operand: ty.to_string(),
        }),
    }
}

/// Result type of `left op right`.
pub(crate) fn binary_type(
    op: BinaryOp,
    left: Option<&Type>,
    right: Option<&Type>,
) -> Result<Option<Type>, TypeErrorKind> {
    let invalid = || TypeErrorKind::InvalidOperands {
        op: op.as_symbol(),
        left: left.map_or_else(|| "?".to_string(), ToString::to_string),
        right: right.map_or_else(|| "?".to_string(), ToString::to_string),
    };

    match op {
        BinaryOp::And | BinaryOp::Or => {
            let boolean = |ty: Option<&Type>| ty.map_or(true, |ty| *ty == Type::Boolean);
            if boolean(left) && boolean(right) {
                Ok(Some(Type::Boolean))
            } else {
                Err(invalid())
            }
        }
        BinaryOp::Eq | BinaryOp::NotEq => Ok(Some(Type::Boolean)),
        BinaryOp::Lt | BinaryOp::LtEq | BinaryOp::Gt | BinaryOp::GtEq => match (left, right) {
            (Some(l), Some(r))
                if !((l.is_numeric() && r.is_numeric()) || (*l == Type::String && *r == Type::String)) =>
            {
                Err(invalid())
            }
            _ => Ok(Some(Type::Boolean)),
        },
        BinaryOp::Add if left == Some(&Type::String) || right == Some(&Type::String) => {
            Ok(Some(Type::String))
        }
        BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => {
            match (left, right) {
                (Some(l), Some(r)) if l.is_numeric() && r.is_numeric() => {
                    let both_integer = *l == Type::Integer && *r == Type::Integer;
                    if op == BinaryOp::Div || !both_integer {
                        Ok(Some(Type::Rational))
                    } else {
                        Ok(Some(Type::Integer))
                    }
                }
                (Some(l), _) | (_, Some(l)) if !l.is_numeric() => Err(invalid()),
                _ => Ok(None),
            }
        }
    }
}

pub(crate) fn member_type(
    object: Option<&Type>,
    member: &Ident,
    table: &SymbolTable,
) -> Result<Option<Type>, TypeError> {
    let unknown_member = |ty: &Type| {
        TypeError::new(
            TypeErrorKind::UnknownMember {
                ty: ty.to_string(),
                member: member.name.clone(),
            },
            member.pos,
        )
    };

    match object {
        None | Some(Type::Module(_)) => Ok(None),
        Some(Type::Struct(def)) => {
            let def = if def.is_opaque() {
                match table.struct_def(&def.name) {
                    Some(full) => full,
                    None => return Ok(None),
                }
            } else {
                def
            };
            def.field(&member.name)
                .map(|ty| Some(ty.clone()))
                .ok_or_else(|| unknown_member(&Type::Struct(def.clone())))
        }
        Some(ty @ (Type::List(_) | Type::String)) => {
            if member.name == "length" {
                Ok(Some(Type::Integer))
            } else {
                Err(unknown_member(ty))
            }
        }
        Some(other) => Err(unknown_member(other)),
    }
}

pub(crate) fn index_type(target: Option<&Type>, pos: Position) -> Result<Option<Type>, TypeError> {
    match target {
        None => Ok(None),
        Some(ty) => match ty.element_type() {
            Some(elem) => Ok(known(elem)),
            None => Err(TypeError::new(
                TypeErrorKind::NotIndexable {
                    found: ty.to_string(),
                },
                pos,
            )),
        },
    }
}

fn list_type(elements: &[Expr], table: &SymbolTable) -> Result<Option<Type>, TypeError> {
    let mut element: Option<Type> = None;
    let mut unknown = false;
    for expr in elements {
        let Some(ty) = expr.static_type(table)? else {
            unknown = true;
            continue;
        };
        element = match element {
            None => Some(ty),
            Some(current) => Some(current.common(&ty).ok_or_else(|| {
                TypeError::new(
                    TypeErrorKind::Mismatch {
                        expected: current.to_string(),
                        found: ty.to_string(),
                    },
                    expr.pos(),
                )
            })?),
        };
    }
    match element {
        Some(ty) => Ok(Some(Type::list(ty))),
        None if unknown => Ok(None),
        None => Ok(Some(Type::placeholder_list())),
    }
}

fn call_type(
    callee: &Expr,
    args: &[Expr],
    pos: Position,
    table: &SymbolTable,
) -> Result<Option<Type>, TypeError> {
    if let Expr::Identifier(ident) = callee {
        if table.lookup(&ident.name).is_none() {
            if let Some(def) = table.struct_def(&ident.name) {
                return Ok(Some(Type::Struct(def.clone())));
            }
            if table.is_imported(&ident.name) {
                return Ok(None);
            }
            if let Some(sig) = native(&ident.name) {
                let receiver = match args.first() {
                    Some(first) => first.static_type(table)?,
                    None => None,
                };
                let ret = sig.return_type(receiver.as_ref());
                // `get` on an empty list literal has no element type yet
                return Ok(if sig.name == "get" { known(ret) } else { Some(ret) });
            }
        }
    }

    match callee.static_type(table)? {
        None => Ok(None),
        Some(Type::Function(sig)) => Ok(Some(sig.ret.clone())),
        Some(other) => Err(TypeError::new(
            TypeErrorKind::NotCallable {
                found: other.to_string(),
            },
            pos,
        )),
    }
}
