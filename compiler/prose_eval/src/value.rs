//! Runtime values.
//!
//! Lists and struct instances have reference semantics: copying a value
//! shares the underlying storage, so `add(xs, 1)` is visible through every
//! binding of `xs`. Everything else is copied.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use prose_ir::FunctionDecl;
use prose_types::{FunctionSignature, StructType, Type};

use crate::{Capture, ScopeId};

pub type ListRef = Rc<RefCell<Vec<Value>>>;

#[derive(Clone, Debug)]
pub enum Value {
    Integer(i64),
    Rational(f64),
    Str(String),
    Boolean(bool),
    Void,
    List(ListRef),
    Struct(Rc<StructInstance>),
    Function(Rc<Closure>),
    Module(Rc<Module>),
}

impl Value {
    pub fn list(items: Vec<Value>) -> Value {
        Value::List(Rc::new(RefCell::new(items)))
    }

    /// The type a value has on its own. Lists report the placeholder
    /// element type since their elements are not inspected.
    pub fn natural_type(&self) -> Type {
        match self {
            Value::Integer(_) => Type::Integer,
            Value::Rational(_) => Type::Rational,
            Value::Str(_) => Type::String,
            Value::Boolean(_) => Type::Boolean,
            Value::Void => Type::Void,
            Value::List(_) => Type::placeholder_list(),
            Value::Struct(instance) => Type::Struct(Rc::clone(&instance.def)),
            Value::Function(closure) => Type::Function(Rc::clone(&closure.signature)),
            Value::Module(module) => Type::Module(module.name.clone()),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Numeric value widened to `f64`.
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(n) => Some(*n as f64),
            Value::Rational(r) => Some(*r),
            _ => None,
        }
    }

    /// Structural equality. Integers and rationals compare numerically;
    /// lists and structs compare element by element; functions by identity.
    #[allow(clippy::float_cmp)]
    pub fn equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Void, Value::Void) => true,
            (Value::List(a), Value::List(b)) => {
                Rc::ptr_eq(a, b) || {
                    let (a, b) = (a.borrow(), b.borrow());
                    a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.equals(y))
                }
            }
            (Value::Struct(a), Value::Struct(b)) => {
                Rc::ptr_eq(a, b)
                    || (a.def.name == b.def.name && {
                        let (a, b) = (a.fields.borrow(), b.fields.borrow());
                        a.iter().zip(b.iter()).all(|(x, y)| x.equals(y))
                    })
            }
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Module(a), Value::Module(b)) => a.name == b.name,
            (a, b) => match (a.as_f64(), b.as_f64()) {
                (Some(x), Some(y)) => x == y,
                _ => false,
            },
        }
    }

    /// Zero value for a declaration without an initializer.
    pub fn zero(ty: &Type) -> Value {
        match ty {
            Type::Integer => Value::Integer(0),
            Type::Rational => Value::Rational(0.0),
            Type::String => Value::Str(String::new()),
            Type::Boolean => Value::Boolean(false),
            Type::List(_) => Value::list(Vec::new()),
            Type::Struct(def) => Value::Struct(Rc::new(StructInstance::zeroed(Rc::clone(def)))),
            Type::Void | Type::Function(_) | Type::Module(_) => Value::Void,
        }
    }
}

/// Formats the way `write` prints: strings raw, everything else in its
/// literal form. Strings nested in a list are quoted.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => f.write_str(s),
            other => write_nested(other, f),
        }
    }
}

#[allow(clippy::float_cmp)]
fn write_nested(value: &Value, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match value {
        Value::Integer(n) => write!(f, "{n}"),
        Value::Rational(r) => {
            if r.is_finite() && r.fract() == 0.0 {
                write!(f, "{r:.1}")
            } else {
                write!(f, "{r}")
            }
        }
        Value::Str(s) => write!(f, "{s:?}"),
        Value::Boolean(b) => write!(f, "{b}"),
        Value::Void => f.write_str("void"),
        Value::List(items) => {
            f.write_str("[")?;
            for (i, item) in items.borrow().iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write_nested(item, f)?;
            }
            f.write_str("]")
        }
        Value::Struct(instance) => write!(f, "<object {}>", instance.def.name),
        Value::Function(closure) => write!(f, "<function {}>", closure.decl.name.name),
        Value::Module(module) => write!(f, "<module {}>", module.name),
    }
}

/// A value paired with its resolved type.
///
/// The type is the declared type where one exists (a variable, a field, a
/// list's element type) and the value's natural type otherwise.
#[derive(Clone, Debug)]
pub struct TypedValue {
    pub value: Value,
    pub ty: Type,
}

impl TypedValue {
    pub fn new(value: Value, ty: Type) -> Self {
        TypedValue { value, ty }
    }

    /// A value typed by its natural type.
    pub fn natural(value: Value) -> Self {
        let ty = value.natural_type();
        TypedValue { value, ty }
    }

    pub fn void() -> Self {
        TypedValue::new(Value::Void, Type::Void)
    }

    /// Element type of a list value; the element's natural type when the
    /// list's element type is still the placeholder.
    pub fn element(&self, item: Value) -> TypedValue {
        match &self.ty {
            Type::List(elem) if !matches!(**elem, Type::Void) => {
                TypedValue::new(item, (**elem).clone())
            }
            _ => TypedValue::natural(item),
        }
    }
}

/// An instance of a user struct. Fields are stored in declaration order.
#[derive(Debug)]
pub struct StructInstance {
    pub def: Rc<StructType>,
    pub fields: RefCell<Vec<Value>>,
}

impl StructInstance {
    pub fn new(def: Rc<StructType>, fields: Vec<Value>) -> Self {
        StructInstance {
            def,
            fields: RefCell::new(fields),
        }
    }

    /// Every field set to the zero value of its type.
    pub fn zeroed(def: Rc<StructType>) -> Self {
        let fields = def.fields.iter().map(|(_, ty)| Value::zero(ty)).collect();
        StructInstance::new(def, fields)
    }

    pub fn get(&self, name: &str) -> Option<TypedValue> {
        let index = self.def.field_index(name)?;
        let value = self.fields.borrow().get(index)?.clone();
        Some(TypedValue::new(value, self.def.fields[index].1.clone()))
    }
}

/// A user function with the scope it was declared in.
#[derive(Debug)]
pub struct Closure {
    pub decl: Rc<FunctionDecl>,
    pub signature: Rc<FunctionSignature>,
    pub capture: Capture,
}

impl Closure {
    /// The scope the function body runs under.
    pub fn scope(&self) -> ScopeId {
        self.capture.scope()
    }
}

/// A loaded module: its name and its top-level scope.
#[derive(Debug)]
pub struct Module {
    pub name: String,
    pub root: ScopeId,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn point() -> Rc<StructType> {
        Rc::new(StructType::new(
            "Point",
            vec![
                ("label".into(), Type::String),
                ("x".into(), Type::Rational),
                ("visible".into(), Type::Boolean),
                ("tags".into(), Type::list(Type::String)),
            ],
        ))
    }

    #[test]
    fn write_formatting() {
        assert_eq!(Value::Integer(-3).to_string(), "-3");
        assert_eq!(Value::Rational(2.0).to_string(), "2.0");
        assert_eq!(Value::Rational(1.5).to_string(), "1.5");
        assert_eq!(Value::Str("hi".into()).to_string(), "hi");
        assert_eq!(Value::Boolean(true).to_string(), "true");
        assert_eq!(Value::Void.to_string(), "void");
        let list = Value::list(vec![
            Value::Integer(1),
            Value::Str("a".into()),
            Value::list(vec![Value::Rational(0.5)]),
        ]);
        assert_eq!(list.to_string(), r#"[1, "a", [0.5]]"#);
    }

    #[test]
    fn struct_formatting_uses_type_name() {
        let p = Value::Struct(Rc::new(StructInstance::zeroed(point())));
        assert_eq!(p.to_string(), "<object Point>");
    }

    #[test]
    fn zero_fields_follow_their_types() {
        let instance = StructInstance::zeroed(point());
        let fields: Vec<String> = instance.fields.borrow().iter().map(ToString::to_string).collect();
        assert_eq!(fields, vec!["", "0.0", "false", "[]"]);
    }

    #[test]
    fn numeric_equality_crosses_kinds() {
        assert!(Value::Integer(2).equals(&Value::Rational(2.0)));
        assert!(!Value::Integer(2).equals(&Value::Str("2".into())));
    }

    #[test]
    fn lists_compare_structurally_and_share_storage() {
        let a = Value::list(vec![Value::Integer(1)]);
        let b = Value::list(vec![Value::Integer(1)]);
        assert!(a.equals(&b));

        let alias = a.clone();
        if let Value::List(items) = &alias {
            items.borrow_mut().push(Value::Integer(2));
        }
        assert_eq!(a.to_string(), "[1, 2]");
        assert!(!a.equals(&b));
    }

    #[test]
    fn element_of_placeholder_list_uses_natural_type() {
        let list = TypedValue::new(Value::list(Vec::new()), Type::placeholder_list());
        assert_eq!(list.element(Value::Boolean(true)).ty, Type::Boolean);
        let ints = TypedValue::new(Value::list(Vec::new()), Type::list(Type::Rational));
        assert_eq!(ints.element(Value::Rational(1.0)).ty, Type::Rational);
    }
}
