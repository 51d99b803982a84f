//! Linter for namespace collisions.
//!
//! Every selected module must declare its public names with `__all__`.
//! Names exported by more than one module collide once the package
//! re-exports its modules into a single namespace, so each such name is
//! reported together with the modules exporting it.
//!
//! # Configuration
//!
//! - `directories`: directories to scan, relative to the project root
//! - `include`: filename patterns to check (default `["*.py"]`)
//! - `exclude`: filename patterns to skip; also names that must never be
//!   exported
//! - `root`: directory module identifiers are resolved against

use std::collections::HashMap;
use std::path::Path;

use cardboard_core::{
    string_array, FileFilter, LintError, LintTarget, Linter, LinterConfig, LinterFlags, Message,
};
use tracing::{debug, info};

use crate::resolver::{ExportResolver, SourceExports};

/// Linter name for namespace.
pub const NAME: &str = "namespace";

/// Exported names recorded per module, in first-seen order.
#[derive(Debug, Default)]
pub struct NamespaceTable {
    order: Vec<String>,
    modules: HashMap<String, Vec<String>>,
}

impl NamespaceTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `module` exports `name`.
    pub fn record(&mut self, name: &str, module: &str) {
        match self.modules.get_mut(name) {
            Some(modules) => modules.push(module.to_string()),
            None => {
                self.order.push(name.to_string());
                self.modules
                    .insert(name.to_string(), vec![module.to_string()]);
            }
        }
    }

    /// Returns names exported by more than one module, with those modules.
    pub fn collisions(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.order.iter().filter_map(|name| {
            let modules = self.modules.get(name)?;
            (modules.len() > 1).then_some((name.as_str(), modules.as_slice()))
        })
    }
}

/// Derives a dotted module identifier from a `/`-separated filename.
///
/// `pkg/sub/mod.py` becomes `pkg.sub.mod`. A leading dot in the file name
/// is not treated as an extension.
#[must_use]
pub fn module_name(filename: &str) -> String {
    let base_start = filename.rfind('/').map_or(0, |i| i + 1);
    let stem = match filename[base_start..].rfind('.') {
        Some(dot) if dot > 0 => &filename[..base_start + dot],
        _ => filename,
    };
    stem.replace('/', ".")
}

/// Reports modules without `__all__` and names exported by several modules.
pub struct NamespaceChecker {
    resolver: Option<Box<dyn ExportResolver>>,
}

impl Default for NamespaceChecker {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for NamespaceChecker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NamespaceChecker")
            .field("custom_resolver", &self.resolver.is_some())
            .finish()
    }
}

impl NamespaceChecker {
    /// Creates a linter that reads `__all__` from source files under the
    /// configured `root`.
    #[must_use]
    pub fn new() -> Self {
        Self { resolver: None }
    }

    /// Uses `resolver` instead of reading sources.
    #[must_use]
    pub fn with_resolver(resolver: impl ExportResolver + 'static) -> Self {
        Self {
            resolver: Some(Box::new(resolver)),
        }
    }

    /// Checks the given files.
    ///
    /// `excluded_names` lists names that must not be exported.
    ///
    /// # Errors
    ///
    /// Returns an error if a module cannot be resolved.
    pub fn check_files(
        &self,
        resolver: &dyn ExportResolver,
        files: &[String],
        excluded_names: &[String],
    ) -> Result<Vec<Message>, LintError> {
        let mut messages = Vec::new();
        let mut table = NamespaceTable::new();

        for filename in files {
            let module = module_name(filename);
            debug!("Checking namespace of {module}");

            let exports = resolver
                .resolve(&module)
                .map_err(|e| LintError::Resolve {
                    module: module.clone(),
                    message: e.to_string(),
                })?;

            let Some(mut exports) = exports else {
                messages.push(Message::in_file(filename.as_str(), "Missing __all__")?);
                continue;
            };

            exports.sort();
            exports.dedup();
            for name in &exports {
                table.record(name, &module);
                if excluded_names.contains(name) {
                    messages.push(Message::in_file(
                        filename.as_str(),
                        format!("Invalid name in namespace: {name}"),
                    )?);
                }
            }
        }

        for (name, modules) in table.collisions() {
            messages.push(Message::project(format!(
                "Name '{name}' found in modules {}",
                modules.join(" ")
            ))?);
        }

        info!(
            "Namespace check: {} file(s), {} message(s)",
            files.len(),
            messages.len()
        );
        Ok(messages)
    }
}

impl Linter for NamespaceChecker {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Requires __all__ and forbids names exported by several modules"
    }

    fn flags(&self) -> LinterFlags {
        LinterFlags {
            static_: false,
            dynamic: true,
            python: true,
            cpp: false,
        }
    }

    fn default_config(&self) -> toml::Table {
        let mut table = toml::Table::new();
        table.insert("directories".into(), string_array(["."]));
        table.insert("include".into(), string_array(["*.py"]));
        table.insert("exclude".into(), string_array(Vec::<String>::new()));
        table.insert("root".into(), toml::Value::String(".".into()));
        table
    }

    fn run(&self, config: &LinterConfig, target: &LintTarget<'_>) -> Result<Vec<Message>, LintError> {
        let directories = config.get_str_array("directories")?;
        let include = config.get_str_array("include")?;
        let exclude = config.get_str_array("exclude")?;

        let filter = FileFilter::from_include_exclude(&include, &exclude)?;
        let files = filter.select(target.root, &directories, target.modified)?;

        match &self.resolver {
            Some(resolver) => self.check_files(resolver.as_ref(), &files, &exclude),
            None => {
                let root = target.root.join(Path::new(config.get_str("root", ".")));
                self.check_files(&SourceExports::new(root), &files, &exclude)
            }
        }
    }
}
