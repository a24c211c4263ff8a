//! Built-in function signatures.
//!
//! Natives are resolved by name and then by the kind of their first
//! argument (the receiver): `length` accepts a list or a string, `add` only
//! a list.

use crate::Type;

/// Kind of value a native accepts as its first argument.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Receiver {
    List,
    String,
}

impl Receiver {
    pub fn matches(self, ty: &Type) -> bool {
        matches!(
            (self, ty),
            (Receiver::List, Type::List(_)) | (Receiver::String, Type::String)
        )
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct NativeSignature {
    pub name: &'static str,
    /// Total argument count, receiver included.
    pub arity: usize,
    /// Accepted receiver kinds. Empty for natives without a receiver.
    pub receivers: &'static [Receiver],
}

impl NativeSignature {
    pub fn accepts_receiver(&self, ty: &Type) -> bool {
        self.receivers.iter().any(|r| r.matches(ty))
    }

    /// Result type for a call whose first argument has type `receiver`.
    pub fn return_type(&self, receiver: Option<&Type>) -> Type {
        match self.name {
            "length" => Type::Integer,
            "add" | "remove" => Type::Void,
            "get" => match receiver {
                Some(Type::List(elem)) => (**elem).clone(),
                _ => Type::String,
            },
            _ => Type::String,
        }
    }
}

const LIST_OR_STRING: &[Receiver] = &[Receiver::List, Receiver::String];

/// Every native function.
pub const NATIVES: &[NativeSignature] = &[
    NativeSignature {
        name: "length",
        arity: 1,
        receivers: LIST_OR_STRING,
    },
    NativeSignature {
        name: "add",
        arity: 2,
        receivers: &[Receiver::List],
    },
    NativeSignature {
        name: "get",
        arity: 2,
        receivers: LIST_OR_STRING,
    },
    NativeSignature {
        name: "remove",
        arity: 2,
        receivers: &[Receiver::List],
    },
    NativeSignature {
        name: "uppercase",
        arity: 1,
        receivers: &[Receiver::String],
    },
    NativeSignature {
        name: "lowercase",
        arity: 1,
        receivers: &[Receiver::String],
    },
    NativeSignature {
        name: "substring",
        arity: 3,
        receivers: &[Receiver::String],
    },
    NativeSignature {
        name: "readme",
        arity: 1,
        receivers: &[],
    },
];

pub fn native(name: &str) -> Option<&'static NativeSignature> {
    NATIVES.iter().find(|sig| sig.name == name)
}
