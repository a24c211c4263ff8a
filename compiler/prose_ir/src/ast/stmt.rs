//! Statement and declaration nodes.

use std::rc::Rc;

use crate::{Expr, Ident, Position, TypeNode};

/// A parsed source unit: top-level statements in source order.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Program {
    pub statements: Vec<Stmt>,
}

/// Statements between a block opener and its terminator.
pub type Block = Vec<Stmt>;

#[derive(Clone, Debug, PartialEq)]
pub enum Stmt {
    Expr(Expr),
    /// `create T variable|constant name [to init]`
    Create {
        ty: TypeNode,
        constant: bool,
        name: Ident,
        init: Option<Expr>,
    },
    /// `set target to value`
    Assign {
        target: AssignTarget,
        value: Expr,
        pos: Position,
    },
    /// `read name [prompt]`
    Read {
        target: Ident,
        prompt: Option<Expr>,
    },
    /// `write value` or `writeln value`
    Write {
        value: Expr,
        newline: bool,
    },
    /// `if c then .. elif c then .. else .. end`; branches are tried in order.
    If {
        branches: Vec<CondBlock>,
        else_body: Option<Block>,
    },
    While {
        cond: Expr,
        body: Block,
    },
    /// `do body while cond end`
    DoWhile {
        body: Block,
        cond: Expr,
    },
    /// `for var in iterable do body end`
    For {
        var: Ident,
        iterable: Expr,
        body: Block,
    },
    Function(Rc<FunctionDecl>),
    Return {
        value: Option<Expr>,
        pos: Position,
    },
    Struct(StructDecl),
    Import(ImportDecl),
}

impl Stmt {
    /// Function, struct and import declarations. The interpreter runs these
    /// before any other top-level statement.
    pub fn is_declaration(&self) -> bool {
        matches!(self, Stmt::Function(_) | Stmt::Struct(_) | Stmt::Import(_))
    }
}

/// One `if`/`elif` arm.
#[derive(Clone, Debug, PartialEq)]
pub struct CondBlock {
    pub cond: Expr,
    pub body: Block,
}

/// Left-hand side of `set`.
#[derive(Clone, Debug, PartialEq)]
pub enum AssignTarget {
    Variable(Ident),
    Member { object: Expr, member: Ident },
    Index { target: Expr, index: Expr, pos: Position },
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Param {
    pub ty: TypeNode,
    pub name: Ident,
}

/// `function name(T a, U b) -> R ... end`
///
/// Shared behind `Rc` so closures can hold the declaration without cloning
/// the body.
#[derive(Clone, Debug, PartialEq)]
pub struct FunctionDecl {
    pub name: Ident,
    pub params: Vec<Param>,
    /// `None` when the `-> type` clause is absent (a void function).
    pub ret: Option<TypeNode>,
    pub body: Block,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FieldDecl {
    pub ty: TypeNode,
    pub name: Ident,
}

/// `create type Name(T a, U b);`
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct StructDecl {
    pub name: Ident,
    pub fields: Vec<FieldDecl>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ImportDecl {
    /// `import m;` binds the module under its own name.
    Module { module: Ident },
    /// `from m import a, b;` binds each listed name directly.
    Selective { module: Ident, names: Vec<Ident> },
}

impl ImportDecl {
    pub fn module(&self) -> &Ident {
        match self {
            ImportDecl::Module { module } | ImportDecl::Selective { module, .. } => module,
        }
    }
}
