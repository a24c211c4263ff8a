//! Scope arena for the interpreter.
//!
//! Scopes are records in one arena addressed by [`ScopeId`]; each record
//! knows its parent. A block scope is closed when the block exits. A closed
//! scope is freed, and its slot reused, once it has no open child and no
//! closure outside its own bindings captures it. Closed scopes that are
//! still captured are retained and looked at again on the next sweep.
//!
//! Root scopes (one per program or loaded module) are never freed. They
//! also own the struct definitions declared in that unit.

use std::rc::Rc;

use prose_types::{StructType, Type};
use rustc_hash::FxHashMap;
use tracing::trace;

use crate::{Closure, TypedValue, Value};

/// Retained scopes tolerated before the first sweep.
const MIN_SWEEP: usize = 64;

/// Handle to one scope in the arena.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ScopeId(u32);

impl ScopeId {
    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// A closure's hold on the scope it was declared in. The scope is not
/// freed while a capture outside the scope's own bindings exists.
#[derive(Debug)]
pub struct Capture {
    scope: ScopeId,
    token: Rc<()>,
}

impl Capture {
    pub fn scope(&self) -> ScopeId {
        self.scope
    }
}

/// A name's value, declared type and mutability.
#[derive(Clone, Debug)]
pub struct Binding {
    pub value: Value,
    pub ty: Type,
    pub constant: bool,
}

impl Binding {
    pub fn new(value: Value, ty: Type, constant: bool) -> Self {
        Binding {
            value,
            ty,
            constant,
        }
    }

    pub fn typed_value(&self) -> TypedValue {
        TypedValue::new(self.value.clone(), self.ty.clone())
    }
}

#[derive(Default)]
struct ScopeRecord {
    parent: Option<ScopeId>,
    bindings: FxHashMap<String, Binding>,
    structs: FxHashMap<String, Rc<StructType>>,
    /// One strong count per live [`Capture`], plus the record's own.
    token: Rc<()>,
    children: usize,
    closed: bool,
    live: bool,
}

impl ScopeRecord {
    /// Captures held by something other than this scope's own bindings.
    fn outside_captures(&self) -> usize {
        let mut held_here: FxHashMap<*const Closure, (&Rc<Closure>, usize)> = FxHashMap::default();
        for binding in self.bindings.values() {
            if let Value::Function(closure) = &binding.value {
                if Rc::ptr_eq(&closure.capture.token, &self.token) {
                    held_here.entry(Rc::as_ptr(closure)).or_insert((closure, 0)).1 += 1;
                }
            }
        }
        let internal = held_here
            .values()
            .filter(|(closure, count)| Rc::strong_count(closure) == *count)
            .count();
        (Rc::strong_count(&self.token) - 1).saturating_sub(internal)
    }
}

pub struct Environment {
    scopes: Vec<ScopeRecord>,
    free: Vec<ScopeId>,
    retained: Vec<ScopeId>,
    next_sweep: usize,
}

impl Default for Environment {
    fn default() -> Self {
        Environment {
            scopes: Vec::new(),
            free: Vec::new(),
            retained: Vec::new(),
            next_sweep: MIN_SWEEP,
        }
    }
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    /// A scope without a parent: the top level of a program or module.
    pub fn new_root(&mut self) -> ScopeId {
        self.alloc(None)
    }

    /// Open a child scope of `parent`.
    pub fn push(&mut self, parent: ScopeId) -> ScopeId {
        self.scopes[parent.index()].children += 1;
        self.alloc(Some(parent))
    }

    fn alloc(&mut self, parent: Option<ScopeId>) -> ScopeId {
        let record = ScopeRecord {
            parent,
            live: true,
            ..ScopeRecord::default()
        };
        if let Some(id) = self.free.pop() {
            self.scopes[id.index()] = record;
            trace!(scope = id.0, "reuse scope");
            id
        } else {
            let id = ScopeId(u32::try_from(self.scopes.len()).unwrap_or(u32::MAX));
            self.scopes.push(record);
            id
        }
    }

    /// Close a scope on block exit. It is freed now if nothing keeps it,
    /// retained otherwise.
    pub fn release(&mut self, id: ScopeId) {
        let record = &mut self.scopes[id.index()];
        if !record.live || record.parent.is_none() {
            return;
        }
        record.closed = true;
        if !self.try_free(id) {
            self.retained.push(id);
            if self.retained.len() >= self.next_sweep {
                self.sweep();
            }
        }
    }

    /// Record a closure's capture of `scope`.
    pub fn capture(&self, scope: ScopeId) -> Capture {
        Capture {
            scope,
            token: Rc::clone(&self.scopes[scope.index()].token),
        }
    }

    /// Free every retained scope that nothing keeps any more.
    pub fn sweep(&mut self) {
        let mut pending = std::mem::take(&mut self.retained);
        pending.sort_unstable();
        pending.dedup();
        let before = pending.len();
        for id in pending {
            let record = &self.scopes[id.index()];
            if record.live && record.closed && !self.try_free(id) {
                self.retained.push(id);
            }
        }
        self.next_sweep = MIN_SWEEP.max(self.retained.len() * 2);
        trace!(before, after = self.retained.len(), "swept scopes");
    }

    fn collectable(&self, id: ScopeId) -> bool {
        let record = &self.scopes[id.index()];
        record.live
            && record.closed
            && record.parent.is_some()
            && record.children == 0
            && record.outside_captures() == 0
    }

    /// Free `id` if it is collectable, then any closed ancestors that it
    /// was the last thing keeping.
    fn try_free(&mut self, id: ScopeId) -> bool {
        if !self.collectable(id) {
            return false;
        }
        let mut freed = Vec::new();
        let mut current = Some(id);
        while let Some(id) = current.filter(|&id| self.collectable(id)) {
            let record = std::mem::take(&mut self.scopes[id.index()]);
            self.free.push(id);
            current = record.parent;
            if let Some(parent) = record.parent {
                let parent = &mut self.scopes[parent.index()];
                parent.children = parent.children.saturating_sub(1);
            }
            freed.push(record);
        }
        // Bindings drop here, after the arena is consistent again.
        drop(freed);
        true
    }

    /// Scopes currently allocated, open or retained.
    pub fn live_scopes(&self) -> usize {
        self.scopes.iter().filter(|s| s.live).count()
    }

    // Bindings

    /// Bind `name` in `scope`, replacing a binding of the same name there.
    pub fn define(&mut self, scope: ScopeId, name: impl Into<String>, binding: Binding) {
        self.scopes[scope.index()]
            .bindings
            .insert(name.into(), binding);
    }

    /// Innermost binding of `name` visible from `scope`.
    pub fn lookup(&self, scope: ScopeId, name: &str) -> Option<&Binding> {
        self.owner(scope, name)
            .and_then(|owner| self.scopes[owner.index()].bindings.get(name))
    }

    pub fn lookup_local(&self, scope: ScopeId, name: &str) -> Option<&Binding> {
        self.scopes[scope.index()].bindings.get(name)
    }

    /// The binding of `name` visible from `scope`, for mutation in the
    /// scope that owns it.
    pub fn lookup_mut(&mut self, scope: ScopeId, name: &str) -> Option<&mut Binding> {
        let owner = self.owner(scope, name)?;
        self.scopes[owner.index()].bindings.get_mut(name)
    }

    fn owner(&self, scope: ScopeId, name: &str) -> Option<ScopeId> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let record = &self.scopes[id.index()];
            if record.bindings.contains_key(name) {
                return Some(id);
            }
            current = record.parent;
        }
        None
    }

    /// Names bound directly in `scope`.
    pub fn names(&self, scope: ScopeId) -> impl Iterator<Item = &str> {
        self.scopes[scope.index()].bindings.keys().map(String::as_str)
    }

    // Struct definitions

    /// The root scope `scope` descends from.
    pub fn root_of(&self, scope: ScopeId) -> ScopeId {
        let mut current = scope;
        while let Some(parent) = self.scopes[current.index()].parent {
            current = parent;
        }
        current
    }

    /// Register a struct definition in the root of `scope`.
    pub fn define_struct(&mut self, scope: ScopeId, def: Rc<StructType>) {
        let root = self.root_of(scope);
        self.scopes[root.index()]
            .structs
            .insert(def.name.clone(), def);
    }

    /// Struct definition visible from `scope`.
    pub fn struct_def(&self, scope: ScopeId, name: &str) -> Option<&Rc<StructType>> {
        self.scopes[self.root_of(scope).index()].structs.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn int(n: i64) -> Binding {
        Binding::new(Value::Integer(n), Type::Integer, false)
    }

    fn value_of(env: &Environment, scope: ScopeId, name: &str) -> Option<String> {
        env.lookup(scope, name).map(|b| b.value.to_string())
    }

    #[test]
    fn child_reads_parent_bindings() {
        let mut env = Environment::new();
        let root = env.new_root();
        env.define(root, "x", int(1));
        let child = env.push(root);
        assert_eq!(value_of(&env, child, "x"), Some("1".into()));
        assert!(env.lookup_local(child, "x").is_none());
    }

    #[test]
    fn shadowing_resolves_to_inner_binding() {
        let mut env = Environment::new();
        let root = env.new_root();
        env.define(root, "x", int(1));
        let child = env.push(root);
        env.define(child, "x", int(2));
        assert_eq!(value_of(&env, child, "x"), Some("2".into()));
        assert_eq!(value_of(&env, root, "x"), Some("1".into()));
    }

    #[test]
    fn mutation_reaches_the_owning_scope() {
        let mut env = Environment::new();
        let root = env.new_root();
        env.define(root, "x", int(1));
        let child = env.push(root);
        if let Some(binding) = env.lookup_mut(child, "x") {
            binding.value = Value::Integer(5);
        }
        env.release(child);
        assert_eq!(value_of(&env, root, "x"), Some("5".into()));
    }

    #[test]
    fn released_scopes_are_reused() {
        let mut env = Environment::new();
        let root = env.new_root();
        let child = env.push(root);
        env.define(child, "tmp", int(0));
        env.release(child);
        assert_eq!(env.live_scopes(), 1);
        let again = env.push(root);
        assert_eq!(again, child);
        assert!(env.lookup(again, "tmp").is_none());
    }

    #[test]
    fn captured_scopes_survive_release() {
        let mut env = Environment::new();
        let root = env.new_root();
        let outer = env.push(root);
        let inner = env.push(outer);
        env.define(outer, "captured", int(7));
        let capture = env.capture(inner);
        env.release(inner);
        env.release(outer);
        assert_eq!(env.live_scopes(), 3);
        assert_eq!(value_of(&env, capture.scope(), "captured"), Some("7".into()));

        drop(capture);
        env.sweep();
        assert_eq!(env.live_scopes(), 1);
    }

    #[test]
    fn open_children_keep_a_closed_parent() {
        let mut env = Environment::new();
        let root = env.new_root();
        let outer = env.push(root);
        let inner = env.push(outer);
        env.release(outer);
        assert_eq!(env.live_scopes(), 3);
        env.release(inner);
        assert_eq!(env.live_scopes(), 1);
    }

    #[test]
    fn roots_are_never_freed() {
        let mut env = Environment::new();
        let root = env.new_root();
        env.release(root);
        env.sweep();
        assert_eq!(env.live_scopes(), 1);
    }

    #[test]
    fn structs_live_in_the_root() {
        let mut env = Environment::new();
        let root = env.new_root();
        let block = env.push(root);
        env.define_struct(block, Rc::new(StructType::new("P", vec![("x".into(), Type::Integer)])));
        assert!(env.struct_def(root, "P").is_some());
        assert!(env.struct_def(block, "P").is_some());

        let other = env.new_root();
        assert!(env.struct_def(other, "P").is_none());
    }
}
