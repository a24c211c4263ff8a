//! Expression nodes.

use crate::{BinaryOp, Position, UnaryOp};

/// A name as written at a use or declaration site.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Ident {
    pub name: String,
    pub pos: Position,
}

impl Ident {
    pub fn new(name: impl Into<String>, pos: Position) -> Self {
        Ident {
            name: name.into(),
            pos,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.name
    }
}

/// Literal values, already decoded from their lexemes.
#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    Integer(i64),
    Rational(f64),
    Str(String),
    Boolean(bool),
}

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Literal {
        value: Literal,
        pos: Position,
    },
    Identifier(Ident),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
        pos: Position,
    },
    /// `pos` is the operator's position.
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
        pos: Position,
    },
    /// `object.member`
    Member {
        object: Box<Expr>,
        member: Ident,
    },
    /// `target[index]`; `pos` is the opening bracket.
    Index {
        target: Box<Expr>,
        index: Box<Expr>,
        pos: Position,
    },
    /// `[a, b, c]`
    List {
        elements: Vec<Expr>,
        pos: Position,
    },
    /// `callee(args)`; `pos` is the opening parenthesis.
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
        pos: Position,
    },
}

impl Expr {
    /// Position reported for errors about this expression.
    pub fn pos(&self) -> Position {
        match self {
            Expr::Literal { pos, .. }
            | Expr::Unary { pos, .. }
            | Expr::Binary { pos, .. }
            | Expr::Index { pos, .. }
            | Expr::List { pos, .. }
            | Expr::Call { pos, .. } => *pos,
            Expr::Identifier(ident) => ident.pos,
            Expr::Member { member, .. } => member.pos,
        }
    }

    /// The identifier this expression names, if it is a bare identifier.
    pub fn as_identifier(&self) -> Option<&Ident> {
        match self {
            Expr::Identifier(ident) => Some(ident),
            _ => None,
        }
    }
}
