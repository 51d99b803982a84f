//! Running the linters configured for a project.

use cardboard_core::{
    select_linters, ConfigError, Driver, LintError, LintReport, ModifiedLines, ProjectConfig,
};
use cardboard_linters::entries_from_sections;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Config file names to search for, in priority order.
const CONFIG_CANDIDATES: &[&str] = &[".cardboardlint.toml", "cardboardlint.toml"];

/// Errors from [`run_project`].
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum RunError {
    /// The project configuration is invalid.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    /// A linter failed.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Lint(#[from] LintError),
}

/// Options for [`run_project`].
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Explicit config file; relative paths are resolved against the root.
    pub config: Option<PathBuf>,
    /// Restrict the run to these files and lines.
    pub modified: Option<ModifiedLines>,
    /// Only run linters with these names (all when empty).
    pub selection: Vec<String>,
    /// Flag requirements, e.g. `"python"` or `"not dynamic"`.
    pub flags: Vec<String>,
    /// Part selector `N/M`; empty runs every linter.
    pub part: String,
}

/// Loads the project configuration and runs the selected linters.
///
/// Without a config file no linters run and the report is empty.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or a linter fails.
pub fn run_project(root: &Path, options: RunOptions) -> Result<LintReport, RunError> {
    let config = match find_config(root, options.config.as_deref()) {
        Some(path) => {
            info!("Using config: {}", path.display());
            ProjectConfig::from_file(&path)?
        }
        None => {
            debug!("No config found under {}", root.display());
            ProjectConfig::default()
        }
    };

    let entries = entries_from_sections(&config.linters)?;
    let entries = select_linters(entries, &options.selection, &options.flags, &options.part)?;

    let mut builder = Driver::builder().root(root).entries(entries);
    if let Some(modified) = options.modified {
        builder = builder.modified(modified);
    }

    Ok(builder.build()?.run()?)
}

/// Finds the config file: the explicit path if given, else the first
/// candidate present in `root`.
fn find_config(root: &Path, explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(if path.is_absolute() {
            path.to_path_buf()
        } else {
            root.join(path)
        });
    }

    CONFIG_CANDIDATES
        .iter()
        .map(|name| root.join(name))
        .find(|candidate| candidate.is_file())
}
