//! Locating and reading module source.
//!
//! `import name` looks for `name.prose` in the importing unit's directory.
//! The interpreter only sees a [`ModuleLoader`]; the filesystem loader is
//! the default and [`MemoryLoader`] serves tests and embedders.

use std::io;
use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;
use thiserror::Error;

/// Source file extension for Prose programs and modules.
pub const SOURCE_EXTENSION: &str = "prose";

/// Module source plus the path it was read from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadedModule {
    pub path: PathBuf,
    pub source: String,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("{} does not exist", path.display())]
    NotFound { path: PathBuf },
    #[error("could not read {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },
}

pub trait ModuleLoader {
    /// Load module `name` for a unit whose directory is `base`.
    fn load(&self, base: &Path, name: &str) -> Result<LoadedModule, LoadError>;
}

/// Path of module `name` relative to `base`.
pub fn module_path(base: &Path, name: &str) -> PathBuf {
    base.join(format!("{name}.{SOURCE_EXTENSION}"))
}

/// Reads modules from disk.
#[derive(Copy, Clone, Debug, Default)]
pub struct FsLoader;

impl ModuleLoader for FsLoader {
    fn load(&self, base: &Path, name: &str) -> Result<LoadedModule, LoadError> {
        let path = module_path(base, name);
        match std::fs::read_to_string(&path) {
            Ok(source) => Ok(LoadedModule { path, source }),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Err(LoadError::NotFound { path }),
            Err(source) => Err(LoadError::Io { path, source }),
        }
    }
}

/// Serves modules from memory, keyed by path.
#[derive(Clone, Debug, Default)]
pub struct MemoryLoader {
    modules: FxHashMap<PathBuf, String>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `name` in directory `base`.
    #[must_use]
    pub fn with_module(mut self, base: impl AsRef<Path>, name: &str, source: impl Into<String>) -> Self {
        self.modules
            .insert(module_path(base.as_ref(), name), source.into());
        self
    }
}

impl ModuleLoader for MemoryLoader {
    fn load(&self, base: &Path, name: &str) -> Result<LoadedModule, LoadError> {
        let path = module_path(base, name);
        match self.modules.get(&path) {
            Some(source) => Ok(LoadedModule {
                source: source.clone(),
                path,
            }),
            None => Err(LoadError::NotFound { path }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn fs_loader_reads_sibling_file() {
        let Ok(dir) = tempfile::tempdir() else {
            panic!("could not create a temp dir");
        };
        let path = dir.path().join("math.prose");
        if let Err(err) = std::fs::write(&path, "create integer constant one to 1;") {
            panic!("could not write module: {err}");
        }
        let Ok(loaded) = FsLoader.load(dir.path(), "math") else {
            panic!("module should load");
        };
        assert_eq!(loaded.path, path);
        assert_eq!(loaded.source, "create integer constant one to 1;");
    }

    #[test]
    fn fs_loader_reports_missing_file() {
        let Ok(dir) = tempfile::tempdir() else {
            panic!("could not create a temp dir");
        };
        let result = FsLoader.load(dir.path(), "nothing");
        assert!(matches!(result, Err(LoadError::NotFound { path }) if path.ends_with("nothing.prose")));
    }

    #[test]
    fn memory_loader_is_keyed_by_directory() {
        let loader = MemoryLoader::new().with_module("lib", "util", "write 1;");
        assert!(loader.load(Path::new("lib"), "util").is_ok());
        assert!(loader.load(Path::new("."), "util").is_err());
    }
}
