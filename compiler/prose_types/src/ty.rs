//! The closed set of Prose types.

use std::fmt;
use std::rc::Rc;

/// A resolved type.
///
/// Equality is structural with two relaxations: a list whose element type
/// is the placeholder [`Type::Void`] equals any list, and structs compare
/// by name only. Assignment compatibility ([`Type::accepts`]) additionally
/// lets an integer stand in for a rational.
#[derive(Clone, Debug)]
pub enum Type {
    Integer,
    Rational,
    String,
    Boolean,
    Void,
    List(Box<Type>),
    Struct(Rc<StructType>),
    Function(Rc<FunctionSignature>),
    Module(String),
}

/// A struct definition: name plus fields in declaration order.
///
/// A struct named by a selective import is known only by name until the
/// module runs; it has no fields here.
#[derive(Clone, Debug, PartialEq)]
pub struct StructType {
    pub name: String,
    pub fields: Vec<(String, Type)>,
}

impl StructType {
    pub fn new(name: impl Into<String>, fields: Vec<(String, Type)>) -> Self {
        StructType {
            name: name.into(),
            fields,
        }
    }

    /// A struct known only by name.
    pub fn opaque(name: impl Into<String>) -> Self {
        StructType {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    pub fn is_opaque(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field(&self, name: &str) -> Option<&Type> {
        self.fields
            .iter()
            .find_map(|(field, ty)| (field == name).then_some(ty))
    }

    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|(field, _)| field == name)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FunctionSignature {
    pub params: Vec<Type>,
    pub ret: Type,
}

impl FunctionSignature {
    pub fn new(params: Vec<Type>, ret: Type) -> Self {
        FunctionSignature { params, ret }
    }
}

impl Type {
    pub fn list(element: Type) -> Type {
        Type::List(Box::new(element))
    }

    /// Type of an empty list literal; compatible with every list.
    pub fn placeholder_list() -> Type {
        Type::List(Box::new(Type::Void))
    }

    pub fn structure(def: StructType) -> Type {
        Type::Struct(Rc::new(def))
    }

    pub fn function(params: Vec<Type>, ret: Type) -> Type {
        Type::Function(Rc::new(FunctionSignature::new(params, ret)))
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Type::Integer | Type::Rational)
    }

    /// True for a list whose element type is still the placeholder.
    pub fn is_placeholder_list(&self) -> bool {
        matches!(self, Type::List(elem) if matches!(**elem, Type::Void))
    }

    /// Type of one element when iterating or indexing: the element type for
    /// lists, a one-character string for strings.
    pub fn element_type(&self) -> Option<Type> {
        match self {
            Type::List(elem) => Some((**elem).clone()),
            Type::String => Some(Type::String),
            _ => None,
        }
    }

    /// Whether a value of type `actual` may be stored where `self` is
    /// declared.
    pub fn accepts(&self, actual: &Type) -> bool {
        match (self, actual) {
            (Type::Rational, Type::Integer) => true,
            (Type::List(expected), Type::List(elem)) => self == actual || expected.accepts(elem),
            _ => self == actual,
        }
    }

    /// The type both `self` and `other` widen to, if either accepts the
    /// other. Elements of a list literal settle on this type.
    pub fn common(&self, other: &Type) -> Option<Type> {
        if self.accepts(other) {
            Some(self.clone())
        } else if other.accepts(self) {
            Some(other.clone())
        } else {
            None
        }
    }

    /// Short name of the variant, for messages about value kinds.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Type::Integer => "integer",
            Type::Rational => "rational",
            Type::String => "string",
            Type::Boolean => "boolean",
            Type::Void => "void",
            Type::List(_) => "list",
            Type::Struct(_) => "struct",
            Type::Function(_) => "function",
            Type::Module(_) => "module",
        }
    }
}

impl PartialEq for Type {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Type::Integer, Type::Integer)
            | (Type::Rational, Type::Rational)
            | (Type::String, Type::String)
            | (Type::Boolean, Type::Boolean)
            | (Type::Void, Type::Void) => true,
            (Type::List(a), Type::List(b)) => {
                matches!(**a, Type::Void) || matches!(**b, Type::Void) || a == b
            }
            (Type::Struct(a), Type::Struct(b)) => a.name == b.name,
            (Type::Function(a), Type::Function(b)) => a == b,
            (Type::Module(a), Type::Module(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Integer => f.write_str("integer"),
            Type::Rational => f.write_str("rational"),
            Type::String => f.write_str("string"),
            Type::Boolean => f.write_str("boolean"),
            Type::Void => f.write_str("void"),
            Type::List(elem) => write!(f, "list<{elem}>"),
            Type::Struct(def) => f.write_str(&def.name),
            Type::Function(sig) => {
                f.write_str("function(")?;
                for (i, param) in sig.params.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{param}")?;
                }
                write!(f, ") -> {}", sig.ret)
            }
            Type::Module(name) => write!(f, "module {name}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn point() -> Type {
        Type::structure(StructType::new(
            "Point",
            vec![("x".into(), Type::Integer), ("y".into(), Type::Integer)],
        ))
    }

    #[test]
    fn integer_widens_to_rational_only() {
        assert!(Type::Rational.accepts(&Type::Integer));
        assert!(!Type::Integer.accepts(&Type::Rational));
        assert_ne!(Type::Rational, Type::Integer);
    }

    #[test]
    fn lists_widen_elementwise() {
        let rationals = Type::list(Type::Rational);
        assert!(rationals.accepts(&Type::list(Type::Integer)));
        assert!(Type::list(rationals.clone()).accepts(&Type::list(Type::list(Type::Integer))));
        assert!(!Type::list(Type::Integer).accepts(&rationals));
        assert_eq!(Type::Integer.common(&Type::Rational), Some(Type::Rational));
        assert_eq!(Type::String.common(&Type::Integer), None);
    }

    #[test]
    fn placeholder_list_matches_any_list() {
        let ints = Type::list(Type::Integer);
        let strs = Type::list(Type::String);
        assert_eq!(ints, Type::placeholder_list());
        assert_eq!(Type::placeholder_list(), strs);
        assert_ne!(ints, strs);
        assert!(ints.accepts(&Type::placeholder_list()));
        assert!(!ints.accepts(&Type::Integer));
    }

    #[test]
    fn structs_compare_by_name() {
        let opaque = Type::structure(StructType::opaque("Point"));
        assert_eq!(point(), opaque);
        assert_ne!(point(), Type::structure(StructType::opaque("Pair")));
    }

    #[test]
    fn functions_compare_by_signature() {
        let f = Type::function(vec![Type::Integer], Type::Boolean);
        assert_eq!(f, Type::function(vec![Type::Integer], Type::Boolean));
        assert_ne!(f, Type::function(vec![Type::Rational], Type::Boolean));
        assert_ne!(f, Type::function(vec![Type::Integer], Type::Void));
    }

    #[test]
    fn field_lookup_keeps_declaration_order() {
        let Type::Struct(def) = point() else {
            panic!("expected struct");
        };
        assert_eq!(def.field_index("y"), Some(1));
        assert_eq!(def.field("x"), Some(&Type::Integer));
        assert_eq!(def.field("z"), None);
        assert!(!def.is_opaque());
    }

    #[test]
    fn display_forms() {
        assert_eq!(Type::list(Type::list(Type::Rational)).to_string(), "list<list<rational>>");
        assert_eq!(
            Type::function(vec![Type::Integer, Type::String], Type::Void).to_string(),
            "function(integer, string) -> void"
        );
        assert_eq!(point().to_string(), "Point");
        assert_eq!(Type::Module("math".into()).to_string(), "module math");
    }

    #[test]
    fn element_types() {
        assert_eq!(Type::list(Type::Boolean).element_type(), Some(Type::Boolean));
        assert_eq!(Type::String.element_type(), Some(Type::String));
        assert_eq!(Type::Integer.element_type(), None);
    }
}
