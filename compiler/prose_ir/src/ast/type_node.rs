//! Type annotations as written in source, before resolution.

use std::fmt;

use crate::Ident;

/// A syntactic type. Struct names stay unresolved until they are looked up
/// in a symbol table.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeNode {
    /// A built-in type keyword or a struct name.
    Simple(Ident),
    /// `list<T>`
    List(Box<TypeNode>),
    /// `function(T, U) -> R`
    Function {
        params: Vec<TypeNode>,
        ret: Box<TypeNode>,
    },
}

impl fmt::Display for TypeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeNode::Simple(ident) => f.write_str(&ident.name),
            TypeNode::List(elem) => write!(f, "list<{elem}>"),
            TypeNode::Function { params, ret } => {
                f.write_str("function(")?;
                for (i, param) in params.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{param}")?;
                }
                write!(f, ") -> {ret}")
            }
        }
    }
}
