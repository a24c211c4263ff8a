//! Scope guard for the interpreter.
//!
//! [`ScopedInterpreter`] opens a child scope, makes it current, and on drop
//! releases it and restores the previous scope. Early returns through `?`
//! therefore never leave the interpreter in a block's scope.
//!
//! ```text
//! self.with_env_scope(|scoped| {
//!     let scope = scoped.scope;
//!     scoped.env.define(scope, name, binding);
//!     scoped.exec_stmts(body)
//! })
//! ```

use std::ops::{Deref, DerefMut};

use super::Interpreter;
use crate::ScopeId;

/// Guard holding the interpreter inside a child scope.
///
/// Derefs to [`Interpreter`], so every interpreter method is available
/// through it.
pub struct ScopedInterpreter<'guard> {
    interpreter: &'guard mut Interpreter,
    previous: ScopeId,
}

impl Drop for ScopedInterpreter<'_> {
    fn drop(&mut self) {
        let scope = self.interpreter.scope;
        self.interpreter.env.release(scope);
        self.interpreter.scope = self.previous;
    }
}

impl Deref for ScopedInterpreter<'_> {
    type Target = Interpreter;

    fn deref(&self) -> &Self::Target {
        self.interpreter
    }
}

impl DerefMut for ScopedInterpreter<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.interpreter
    }
}

impl Interpreter {
    /// Enter a child of the current scope.
    pub fn scoped(&mut self) -> ScopedInterpreter<'_> {
        self.scoped_at(self.scope)
    }

    /// Enter a child of `parent`, which need not be the current scope.
    /// Calls use this to run a body under the closure's scope.
    pub fn scoped_at(&mut self, parent: ScopeId) -> ScopedInterpreter<'_> {
        let previous = self.scope;
        self.scope = self.env.push(parent);
        ScopedInterpreter {
            interpreter: self,
            previous,
        }
    }

    pub fn with_env_scope<T, F>(&mut self, f: F) -> T
    where
        F: FnOnce(&mut ScopedInterpreter<'_>) -> T,
    {
        let mut scoped = self.scoped();
        f(&mut scoped)
    }

    pub fn with_scope_at<T, F>(&mut self, parent: ScopeId, f: F) -> T
    where
        F: FnOnce(&mut ScopedInterpreter<'_>) -> T,
    {
        let mut scoped = self.scoped_at(parent);
        f(&mut scoped)
    }
}
