//! Driver for running configured linters and aggregating their messages.

use crate::config::LinterConfig;
use crate::linter::{LintError, LintTarget, Linter, LinterBox};
use crate::select::LinterEntry;
use crate::types::{LintReport, ModifiedLines};

use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Directories searched for a linter's `filefilter`, relative to the root.
const DEFAULT_DIRECTORIES: &[&str] = &["."];

/// Builder for configuring a [`Driver`].
#[derive(Default)]
pub struct DriverBuilder {
    root: Option<PathBuf>,
    entries: Vec<LinterEntry>,
    modified: Option<ModifiedLines>,
}

impl DriverBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the project root. Filenames in messages are relative to it.
    #[must_use]
    pub fn root(mut self, path: impl Into<PathBuf>) -> Self {
        self.root = Some(path.into());
        self
    }

    /// Adds a linter with its default options.
    #[must_use]
    pub fn linter<L: Linter + 'static>(mut self, linter: L) -> Self {
        self.entries
            .push(LinterEntry::new(Box::new(linter), toml::Table::new()));
        self
    }

    /// Adds a boxed linter with user options.
    #[must_use]
    pub fn linter_box(mut self, linter: LinterBox, options: toml::Table) -> Self {
        self.entries.push(LinterEntry::new(linter, options));
        self
    }

    /// Adds already-selected linter entries.
    #[must_use]
    pub fn entries<I: IntoIterator<Item = LinterEntry>>(mut self, entries: I) -> Self {
        self.entries.extend(entries);
        self
    }

    /// Restricts the run to files and lines touched by a change.
    #[must_use]
    pub fn modified(mut self, modified: ModifiedLines) -> Self {
        self.modified = Some(modified);
        self
    }

    /// Builds the driver.
    ///
    /// # Errors
    ///
    /// Returns an error if the current directory cannot be determined for a
    /// relative root.
    pub fn build(self) -> Result<Driver, LintError> {
        let root = self.root.unwrap_or_else(|| PathBuf::from("."));

        let root = if root.is_absolute() {
            root
        } else {
            std::env::current_dir()
                .map_err(|e| LintError::io(&root, e))?
                .join(&root)
        };

        Ok(Driver {
            root,
            entries: self.entries,
            modified: self.modified,
        })
    }
}

/// Runs linters and collects their messages.
///
/// Use [`Driver::builder()`] to construct an instance.
pub struct Driver {
    root: PathBuf,
    entries: Vec<LinterEntry>,
    modified: Option<ModifiedLines>,
}

impl Driver {
    /// Creates a new builder for configuring a driver.
    #[must_use]
    pub fn builder() -> DriverBuilder {
        DriverBuilder::new()
    }

    /// Returns the project root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the number of configured linters.
    #[must_use]
    pub fn linter_count(&self) -> usize {
        self.entries.len()
    }

    /// Runs every linter and returns the sorted messages.
    ///
    /// When modified lines are set, messages outside them are dropped.
    ///
    /// # Errors
    ///
    /// Returns the first fatal error raised by a linter. Messages gathered
    /// before it are discarded.
    pub fn run(&self) -> Result<LintReport, LintError> {
        info!("Running {} linter(s) at {:?}", self.entries.len(), self.root);

        let mut report = LintReport::new();
        for entry in &self.entries {
            report.extend(self.run_entry(entry)?);
        }
        report.sort();

        info!(
            "Lint complete: {} message(s) from {} linter(s)",
            report.messages.len(),
            report.linters_run.len()
        );

        Ok(report)
    }

    /// Runs a single linter entry.
    fn run_entry(&self, entry: &LinterEntry) -> Result<LintReport, LintError> {
        let linter = &entry.linter;
        let config = LinterConfig::resolve(linter.name(), &linter.default_config(), &entry.options)?;

        let files = match config.filefilter()? {
            Some(filter) => filter.select(&self.root, DEFAULT_DIRECTORIES, self.modified.as_ref())?,
            None => Vec::new(),
        };
        debug!("{}: {} file(s) selected", linter.name(), files.len());

        let target = LintTarget::new(&self.root, &files).with_modified(self.modified.as_ref());
        let mut messages = linter.run(&config, &target)?;

        if let Some(modified) = &self.modified {
            let before = messages.len();
            messages.retain(|m| m.in_diff(modified));
            debug!(
                "{}: dropped {} message(s) outside the diff",
                linter.name(),
                before - messages.len()
            );
        }

        Ok(LintReport {
            messages,
            linters_run: vec![linter.name().to_string()],
        })
    }
}
