//! Discovering the public names a module exports.
//!
//! [`NamespaceChecker`](crate::NamespaceChecker) only needs to know, for a
//! module identifier such as `pkg.sub.mod`, whether the module declares an
//! explicit export list and what it contains. How that is found out is
//! behind [`ExportResolver`].

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::python::{ExtractError, PythonExtractor};

/// Errors raised while resolving a module.
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum ResolveError {
    /// No source exists for the module.
    #[error("module not found (looked in {searched:?})")]
    #[diagnostic(code(cardboard::resolve::not_found))]
    NotFound {
        /// Candidate paths that were tried.
        searched: Vec<PathBuf>,
    },

    /// The module source exists but could not be read.
    #[error("failed to read {path}: {source}")]
    #[diagnostic(code(cardboard::resolve::io))]
    Io {
        /// Source file.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// The module source could not be parsed.
    #[error("failed to parse {path}: {source}")]
    #[diagnostic(code(cardboard::resolve::parse))]
    Parse {
        /// Source file.
        path: PathBuf,
        /// Underlying parser error.
        source: ExtractError,
    },
}

/// Looks up a module's explicit export list.
pub trait ExportResolver: Send + Sync {
    /// Returns the module's declared exports, or `None` if it declares none.
    ///
    /// # Errors
    ///
    /// Returns an error if the module cannot be found or read.
    fn resolve(&self, module: &str) -> Result<Option<Vec<String>>, ResolveError>;
}

/// A fixed table of modules and their exports.
#[derive(Debug, Clone, Default)]
pub struct StaticExports {
    modules: HashMap<String, Option<Vec<String>>>,
}

impl StaticExports {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a module with an explicit export list.
    #[must_use]
    pub fn with_exports<I, S>(mut self, module: impl Into<String>, exports: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.modules.insert(
            module.into(),
            Some(exports.into_iter().map(Into::into).collect()),
        );
        self
    }

    /// Registers a module that declares no export list.
    #[must_use]
    pub fn without_exports(mut self, module: impl Into<String>) -> Self {
        self.modules.insert(module.into(), None);
        self
    }
}

impl ExportResolver for StaticExports {
    fn resolve(&self, module: &str) -> Result<Option<Vec<String>>, ResolveError> {
        self.modules
            .get(module)
            .cloned()
            .ok_or_else(|| ResolveError::NotFound {
                searched: Vec::new(),
            })
    }
}

/// Reads `__all__` declarations from Python sources under a root directory.
///
/// `pkg.mod` is looked up as `pkg/mod.py`, then `pkg/mod.pyx`, then
/// `pkg/mod/__init__.py`.
#[derive(Debug, Clone)]
pub struct SourceExports {
    root: PathBuf,
    extractor: PythonExtractor,
}

impl SourceExports {
    /// Creates a resolver rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            extractor: PythonExtractor::new(),
        }
    }

    /// Returns the search root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn candidates(&self, module: &str) -> Vec<PathBuf> {
        let base = module
            .split('.')
            .fold(self.root.clone(), |path, part| path.join(part));
        vec![
            base.with_extension("py"),
            base.with_extension("pyx"),
            base.join("__init__.py"),
        ]
    }
}

impl ExportResolver for SourceExports {
    fn resolve(&self, module: &str) -> Result<Option<Vec<String>>, ResolveError> {
        let candidates = self.candidates(module);
        let Some(path) = candidates.iter().find(|p| p.is_file()) else {
            return Err(ResolveError::NotFound {
                searched: candidates,
            });
        };

        debug!("Resolving {module} from {}", path.display());
        let bytes = std::fs::read(path).map_err(|e| ResolveError::Io {
            path: path.clone(),
            source: e,
        })?;
        self.extractor
            .exports(&String::from_utf8_lossy(&bytes))
            .map_err(|e| ResolveError::Parse {
                path: path.clone(),
                source: e,
            })
    }
}
