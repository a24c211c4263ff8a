//! Scoped declaration registry.
//!
//! The parser pushes a scope per block and declares every variable,
//! parameter, function, struct and import as it goes. The root scope also
//! owns the function-signature and struct-definition tables; natives come
//! from the static table in [`crate::natives`].

use std::rc::Rc;

use prose_ir::{Position, TypeNode};
use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::{native, FunctionSignature, StructType, Type};

/// One declared name.
#[derive(Clone, Debug, PartialEq)]
pub struct Symbol {
    pub ty: Type,
    pub constant: bool,
    pub pos: Position,
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SymbolError {
    #[error("`{name}` is already declared in this scope (first declared at {previous})")]
    AlreadyDeclared { name: String, previous: Position },
    #[error("function `{name}` is already declared")]
    DuplicateFunction { name: String },
    #[error("struct `{name}` is already declared")]
    DuplicateStruct { name: String },
    #[error("`{name}` is a built-in function and cannot be redeclared")]
    ReservedNative { name: String },
    #[error("unknown type `{name}`")]
    UnknownType { name: String, pos: Position },
    #[error("`void` is only allowed as a function return type")]
    VoidNotAllowed { pos: Position },
}

#[derive(Clone, Debug)]
pub struct SymbolTable {
    /// `scopes[0]` is the root.
    scopes: Vec<FxHashMap<String, Symbol>>,
    functions: FxHashMap<String, Rc<FunctionSignature>>,
    structs: FxHashMap<String, Rc<StructType>>,
    /// Names brought in by `from m import ...`; their types are unknown
    /// until the module runs.
    imported: FxHashMap<String, Position>,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    pub fn new() -> Self {
        SymbolTable {
            scopes: vec![FxHashMap::default()],
            functions: FxHashMap::default(),
            structs: FxHashMap::default(),
            imported: FxHashMap::default(),
        }
    }

    // Scopes

    pub fn push_scope(&mut self) {
        self.scopes.push(FxHashMap::default());
    }

    /// Leave the innermost scope. The root scope is never popped.
    pub fn pop_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    /// Number of open scopes; 1 at top level.
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_root(&self) -> bool {
        self.scopes.len() == 1
    }

    // Declarations

    /// Declare a variable in the innermost scope. Shadowing an outer name
    /// is allowed; redeclaring one in the same scope is not.
    pub fn declare(
        &mut self,
        name: &str,
        ty: Type,
        constant: bool,
        pos: Position,
    ) -> Result<(), SymbolError> {
        if self.is_root() && native(name).is_some() {
            return Err(SymbolError::ReservedNative { name: name.into() });
        }
        if self.is_root() {
            if let Some(&previous) = self.imported.get(name) {
                return Err(SymbolError::AlreadyDeclared {
                    name: name.into(),
                    previous,
                });
            }
        }
        let scope = self.innermost();
        if let Some(existing) = scope.get(name) {
            return Err(SymbolError::AlreadyDeclared {
                name: name.into(),
                previous: existing.pos,
            });
        }
        scope.insert(
            name.to_string(),
            Symbol {
                ty,
                constant,
                pos,
            },
        );
        Ok(())
    }

    /// Declare a function. At top level its signature is also recorded in
    /// the root function table; nested functions are ordinary bindings.
    pub fn declare_function(
        &mut self,
        name: &str,
        signature: FunctionSignature,
        pos: Position,
    ) -> Result<(), SymbolError> {
        if native(name).is_some() {
            return Err(SymbolError::ReservedNative { name: name.into() });
        }
        if self.is_root() && (self.functions.contains_key(name) || self.structs.contains_key(name))
        {
            return Err(SymbolError::DuplicateFunction { name: name.into() });
        }
        let signature = Rc::new(signature);
        self.declare(name, Type::Function(Rc::clone(&signature)), true, pos)?;
        if self.is_root() {
            self.functions.insert(name.to_string(), signature);
        }
        Ok(())
    }

    /// Register a struct definition. Structs only exist at top level.
    pub fn declare_struct(&mut self, def: StructType) -> Result<Rc<StructType>, SymbolError> {
        let name = def.name.clone();
        if native(&name).is_some() {
            return Err(SymbolError::ReservedNative { name });
        }
        if self.structs.contains_key(&name)
            || self.functions.contains_key(&name)
            || self.scopes[0].contains_key(&name)
            || self.imported.contains_key(&name)
        {
            return Err(SymbolError::DuplicateStruct { name });
        }
        let def = Rc::new(def);
        self.structs.insert(name, Rc::clone(&def));
        Ok(def)
    }

    /// Bind a whole module under its own name. Importing the same module
    /// twice is allowed.
    pub fn declare_module(&mut self, name: &str, pos: Position) -> Result<(), SymbolError> {
        if let Some(existing) = self.scopes[0].get(name) {
            if matches!(&existing.ty, Type::Module(m) if m == name) {
                return Ok(());
            }
        }
        self.declare(name, Type::Module(name.to_string()), true, pos)
    }

    /// Record a name brought in by a selective import.
    pub fn declare_imported(&mut self, name: &str, pos: Position) -> Result<(), SymbolError> {
        if let Some(existing) = self.scopes[0].get(name) {
            return Err(SymbolError::AlreadyDeclared {
                name: name.into(),
                previous: existing.pos,
            });
        }
        if self.structs.contains_key(name) || self.functions.contains_key(name) {
            return Err(SymbolError::DuplicateFunction { name: name.into() });
        }
        self.imported.insert(name.to_string(), pos);
        Ok(())
    }

    // Lookup

    /// Innermost binding named `name`.
    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    /// Binding named `name` in the innermost scope only.
    pub fn lookup_local(&self, name: &str) -> Option<&Symbol> {
        self.scopes.last().and_then(|scope| scope.get(name))
    }

    pub fn function(&self, name: &str) -> Option<&Rc<FunctionSignature>> {
        self.functions.get(name)
    }

    pub fn struct_def(&self, name: &str) -> Option<&Rc<StructType>> {
        self.structs.get(name)
    }

    pub fn is_imported(&self, name: &str) -> bool {
        self.imported.contains_key(name)
    }

    // Type resolution

    /// Resolve a type annotation. `void` is rejected; use
    /// [`SymbolTable::resolve_return_type`] where it is allowed.
    pub fn resolve_type(&self, node: &TypeNode) -> Result<Type, SymbolError> {
        match node {
            TypeNode::Simple(ident) => match ident.name.as_str() {
                "integer" => Ok(Type::Integer),
                "rational" => Ok(Type::Rational),
                "string" => Ok(Type::String),
                "boolean" => Ok(Type::Boolean),
                "void" => Err(SymbolError::VoidNotAllowed { pos: ident.pos }),
                name => {
                    if let Some(def) = self.structs.get(name) {
                        Ok(Type::Struct(Rc::clone(def)))
                    } else if self.imported.contains_key(name) {
                        Ok(Type::structure(StructType::opaque(name)))
                    } else {
                        Err(SymbolError::UnknownType {
                            name: name.to_string(),
                            pos: ident.pos,
                        })
                    }
                }
            },
            TypeNode::List(elem) => Ok(Type::list(self.resolve_type(elem)?)),
            TypeNode::Function { params, ret } => {
                let params = params
                    .iter()
                    .map(|p| self.resolve_type(p))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Type::function(params, self.resolve_return_type(ret)?))
            }
        }
    }

    /// Resolve a function return annotation; `void` is allowed here.
    pub fn resolve_return_type(&self, node: &TypeNode) -> Result<Type, SymbolError> {
        match node {
            TypeNode::Simple(ident) if ident.name == "void" => Ok(Type::Void),
            other => self.resolve_type(other),
        }
    }

    fn innermost(&mut self) -> &mut FxHashMap<String, Symbol> {
        let last = self.scopes.len() - 1;
        &mut self.scopes[last]
    }
}
