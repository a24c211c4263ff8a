//! Module loading and imports.
//!
//! A module is loaded once per name per interpreter. Its top level runs in
//! a fresh root scope with the module file's directory as the base for its
//! own imports; the loaded root scope then backs every import of it.

use std::mem;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use prose_ir::{Ident, ImportDecl};
use prose_types::{SymbolTable, Type};
use tracing::debug;

use super::Interpreter;
use crate::errors::{circular_import, io_error, missing_import, module_not_found, module_syntax};
use crate::{Binding, EvalResult, LoadError, Module, ScopeId, Value};

impl Interpreter {
    pub(super) fn exec_import(&mut self, decl: &ImportDecl) -> EvalResult<()> {
        let module = self.load_module(decl.module())?;
        match decl {
            ImportDecl::Module { module: ident } => {
                let binding = Binding::new(
                    Value::Module(Rc::clone(&module)),
                    Type::Module(module.name.clone()),
                    true,
                );
                self.env.define(self.scope, ident.name.clone(), binding);
            }
            ImportDecl::Selective { names, .. } => {
                for name in names {
                    self.import_name(&module, name)?;
                }
            }
        }
        Ok(())
    }

    /// Copy one binding or struct definition out of a loaded module. A
    /// copied binding keeps its type and constant flag.
    fn import_name(&mut self, module: &Module, name: &Ident) -> EvalResult<()> {
        if let Some(binding) = self.env.lookup_local(module.root, &name.name).cloned() {
            self.env.define(self.scope, name.name.clone(), binding);
            return Ok(());
        }
        if let Some(def) = self.env.struct_def(module.root, &name.name).cloned() {
            self.env.define_struct(self.scope, def);
            return Ok(());
        }
        Err(missing_import(&name.name, &module.name).at(name.pos))
    }

    fn load_module(&mut self, ident: &Ident) -> EvalResult<Rc<Module>> {
        let name = &ident.name;
        if let Some(module) = self.modules.get(name) {
            debug!(module = %name, "module already loaded");
            return Ok(Rc::clone(module));
        }
        if self.loading.iter().any(|loading| loading == name) {
            return Err(circular_import(name).at(ident.pos));
        }

        let loaded = self
            .loader
            .load(&self.base_dir, name)
            .map_err(|err| {
                match err {
                    LoadError::NotFound { path } => module_not_found(name, path.display().to_string()),
                    other @ LoadError::Io { .. } => io_error(other.to_string()),
                }
                .at(ident.pos)
            })?;
        debug!(module = %name, path = %loaded.path.display(), "loading module");

        let tokens = prose_lexer::lex(&loaded.source)
            .map_err(|err| module_syntax(name, format!("{err} at {}", err.pos())).at(ident.pos))?;
        let program = prose_parse::parse(&tokens, &mut SymbolTable::new())
            .map_err(|err| module_syntax(name, format!("{err} at {}", err.pos)).at(ident.pos))?;

        let root = self.env.new_root();
        let dir = loaded
            .path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        self.loading.push(name.clone());
        let result = self.in_unit(root, dir, |interp| interp.run_unit(&program));
        self.loading.pop();
        result.map_err(|err| {
            err.in_module(&loaded.path).with_note(format!(
                "raised in module `{name}` ({})",
                loaded.path.display()
            ))
        })?;

        let module = Rc::new(Module {
            name: name.clone(),
            root,
        });
        self.modules.insert(name.clone(), Rc::clone(&module));
        debug!(module = %name, "module loaded");
        Ok(module)
    }

    /// Run `f` with `root` as the current scope and `dir` as the import
    /// base, restoring both afterwards.
    fn in_unit<T>(
        &mut self,
        root: ScopeId,
        dir: PathBuf,
        f: impl FnOnce(&mut Self) -> T,
    ) -> T {
        let scope = mem::replace(&mut self.scope, root);
        let base_dir = mem::replace(&mut self.base_dir, dir);
        let result = f(self);
        self.scope = scope;
        self.base_dir = base_dir;
        result
    }
}
