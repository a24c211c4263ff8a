//! `InterpreterBuilder` for configuring I/O, module loading and limits.

use std::path::PathBuf;

use rustc_hash::FxHashMap;

use super::Interpreter;
use crate::{
    stdin_handler, stdout_handler, Environment, FsLoader, ModuleLoader, SharedInputHandler,
    SharedPrintHandler,
};

/// Calls nested deeper than this fail with a call-depth error.
pub const DEFAULT_MAX_CALL_DEPTH: usize = 1000;

/// Builder for [`Interpreter`].
///
/// Defaults: stdout for `write`, stdin for `read`, modules from the file
/// system relative to the current directory.
pub struct InterpreterBuilder {
    print_handler: Option<SharedPrintHandler>,
    input_handler: Option<SharedInputHandler>,
    loader: Option<Box<dyn ModuleLoader>>,
    base_dir: PathBuf,
    max_call_depth: usize,
}

impl Default for InterpreterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl InterpreterBuilder {
    pub fn new() -> Self {
        InterpreterBuilder {
            print_handler: None,
            input_handler: None,
            loader: None,
            base_dir: PathBuf::from("."),
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
        }
    }

    /// Where `write` and `writeln` go.
    #[must_use]
    pub fn print_handler(mut self, handler: SharedPrintHandler) -> Self {
        self.print_handler = Some(handler);
        self
    }

    /// Where `read` and `readme` take lines from.
    #[must_use]
    pub fn input_handler(mut self, handler: SharedInputHandler) -> Self {
        self.input_handler = Some(handler);
        self
    }

    #[must_use]
    pub fn module_loader(mut self, loader: impl ModuleLoader + 'static) -> Self {
        self.loader = Some(Box::new(loader));
        self
    }

    /// Directory the main program's imports resolve against, normally the
    /// directory of the script being run.
    #[must_use]
    pub fn base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = dir.into();
        self
    }

    #[must_use]
    pub fn max_call_depth(mut self, depth: usize) -> Self {
        self.max_call_depth = depth;
        self
    }

    pub fn build(self) -> Interpreter {
        let mut env = Environment::new();
        let globals = env.new_root();
        Interpreter {
            env,
            globals,
            scope: globals,
            base_dir: self.base_dir,
            modules: FxHashMap::default(),
            loading: Vec::new(),
            loader: self.loader.unwrap_or_else(|| Box::new(FsLoader)),
            print_handler: self.print_handler.unwrap_or_else(stdout_handler),
            input_handler: self.input_handler.unwrap_or_else(stdin_handler),
            returns: Vec::new(),
            max_call_depth: self.max_call_depth,
        }
    }
}
