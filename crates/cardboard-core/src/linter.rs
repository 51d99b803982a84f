//! Linter trait and the errors a linter run can raise.

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::{ConfigError, LinterConfig};
use crate::types::{Message, MessageError, ModifiedLines};

/// Errors that abort a linter run.
///
/// Anticipated per-item problems (bad encoding, a forbidden import) are
/// reported as [`Message`]s instead.
#[derive(Debug, Error, miette::Diagnostic)]
pub enum LintError {
    /// IO error reading a file.
    #[error("IO error reading {path}: {source}")]
    #[diagnostic(code(cardboard::lint::io))]
    Io {
        /// File that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Error walking a directory tree.
    #[error("Failed to walk directory: {0}")]
    #[diagnostic(code(cardboard::lint::walk))]
    Walk(#[from] ignore::Error),

    /// A module's exports could not be resolved.
    #[error("Failed to resolve module {module}: {message}")]
    #[diagnostic(
        code(cardboard::lint::resolve),
        help("check that the module exists under the configured root")
    )]
    Resolve {
        /// Module identifier, e.g. `pkg.mod`.
        module: String,
        /// Resolver error message.
        message: String,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    /// A linter tried to build an invalid message.
    #[error("Invalid message: {0}")]
    #[diagnostic(code(cardboard::lint::message))]
    Message(#[from] MessageError),
}

impl LintError {
    /// Wraps an IO error with the path it concerns.
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Classification flags used to select linters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(clippy::struct_excessive_bools)]
pub struct LinterFlags {
    /// Analyzes source text without executing it.
    pub static_: bool,
    /// Loads or executes project code.
    pub dynamic: bool,
    /// Targets Python sources.
    pub python: bool,
    /// Targets C++ sources.
    pub cpp: bool,
}

impl Default for LinterFlags {
    fn default() -> Self {
        Self {
            static_: true,
            dynamic: false,
            python: false,
            cpp: false,
        }
    }
}

impl LinterFlags {
    /// Creates flags from optional static/dynamic settings.
    ///
    /// With neither set the linter is static. Setting only one makes the
    /// other its negation.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ConflictingFlags`] if both are set.
    pub fn new(static_: Option<bool>, dynamic: Option<bool>) -> Result<Self, ConfigError> {
        let (static_, dynamic) = match (static_, dynamic) {
            (None, None) => (true, false),
            (Some(s), None) => (s, !s),
            (None, Some(d)) => (!d, d),
            (Some(_), Some(_)) => return Err(ConfigError::ConflictingFlags),
        };
        Ok(Self {
            static_,
            dynamic,
            python: false,
            cpp: false,
        })
    }

    /// Marks the linter as targeting Python.
    #[must_use]
    pub fn python(mut self) -> Self {
        self.python = true;
        self
    }

    /// Marks the linter as targeting C++.
    #[must_use]
    pub fn cpp(mut self) -> Self {
        self.cpp = true;
        self
    }

    /// Looks up a flag by name (`static`, `dynamic`, `python`, `cpp`).
    #[must_use]
    pub fn get(&self, name: &str) -> Option<bool> {
        match name {
            "static" => Some(self.static_),
            "dynamic" => Some(self.dynamic),
            "python" => Some(self.python),
            "cpp" => Some(self.cpp),
            _ => None,
        }
    }
}

/// The files handed to a linter run.
#[derive(Debug, Clone, Copy)]
pub struct LintTarget<'a> {
    /// Directory that filenames are relative to.
    pub root: &'a Path,
    /// Files selected by the linter's `filefilter`, in order.
    pub files: &'a [String],
    /// Lines touched by the change under review, when linting a diff.
    pub modified: Option<&'a ModifiedLines>,
}

impl<'a> LintTarget<'a> {
    /// Creates a target without a modified-lines restriction.
    #[must_use]
    pub fn new(root: &'a Path, files: &'a [String]) -> Self {
        Self {
            root,
            files,
            modified: None,
        }
    }

    /// Attaches modified lines.
    #[must_use]
    pub fn with_modified(mut self, modified: Option<&'a ModifiedLines>) -> Self {
        self.modified = modified;
        self
    }

    /// Resolves a root-relative filename to a path on disk.
    #[must_use]
    pub fn path_of(&self, filename: &str) -> PathBuf {
        self.root.join(filename)
    }
}

/// A pluggable check mapping configuration and files to messages.
///
/// # Example
///
/// ```ignore
/// use cardboard_core::{LintError, LintTarget, Linter, LinterConfig, Message};
///
/// pub struct NoTabs;
///
/// impl Linter for NoTabs {
///     fn name(&self) -> &'static str { "no-tabs" }
///
///     fn default_config(&self) -> toml::Table {
///         let mut t = toml::Table::new();
///         t.insert("filefilter".into(), cardboard_core::string_array(["+ *.py"]));
///         t
///     }
///
///     fn run(&self, _config: &LinterConfig, target: &LintTarget<'_>) -> Result<Vec<Message>, LintError> {
///         // ...
///         Ok(Vec::new())
///     }
/// }
/// ```
pub trait Linter: Send + Sync {
    /// Returns the name used to refer to this linter in configuration.
    fn name(&self) -> &'static str;

    /// Returns a brief description of what this linter checks.
    fn description(&self) -> &'static str {
        ""
    }

    /// Returns the selection flags for this linter.
    fn flags(&self) -> LinterFlags {
        LinterFlags::default()
    }

    /// Returns the default options. User options must use these keys.
    fn default_config(&self) -> toml::Table;

    /// Runs the linter.
    ///
    /// Messages come back in file order, then line order within a file.
    ///
    /// # Errors
    ///
    /// Returns an error for failures that are not per-item findings, such as
    /// unreadable files.
    fn run(&self, config: &LinterConfig, target: &LintTarget<'_>) -> Result<Vec<Message>, LintError>;
}

/// Type alias for boxed Linter trait objects.
pub type LinterBox = Box<dyn Linter>;

#[cfg(test)]
mod tests {
    use super::*;

    struct TestLinter;

    impl Linter for TestLinter {
        fn name(&self) -> &'static str {
            "test-linter"
        }

        fn default_config(&self) -> toml::Table {
            toml::Table::new()
        }

        fn run(
            &self,
            _config: &LinterConfig,
            target: &LintTarget<'_>,
        ) -> Result<Vec<Message>, LintError> {
            target
                .files
                .iter()
                .map(|f| Message::in_file(f.as_str(), "Test message").map_err(Into::into))
                .collect()
        }
    }

    #[test]
    fn test_linter_trait() {
        let linter = TestLinter;
        assert_eq!(linter.name(), "test-linter");
        assert_eq!(linter.description(), "");
        assert_eq!(linter.flags(), LinterFlags::default());

        let files = vec!["a.py".to_string()];
        let target = LintTarget::new(Path::new("."), &files);
        let messages = linter.run(&LinterConfig::default(), &target).unwrap();
        assert_eq!(messages.len(), 1);
    }

    #[test]
    fn test_flags_default_static() {
        let flags = LinterFlags::new(None, None).unwrap();
        assert!(flags.static_);
        assert!(!flags.dynamic);
    }

    #[test]
    fn test_flags_negation() {
        let flags = LinterFlags::new(None, Some(true)).unwrap();
        assert!(!flags.static_);
        assert!(flags.dynamic);

        let flags = LinterFlags::new(Some(false), None).unwrap();
        assert!(flags.dynamic);
    }

    #[test]
    fn test_flags_conflict() {
        assert!(matches!(
            LinterFlags::new(Some(true), Some(false)),
            Err(ConfigError::ConflictingFlags)
        ));
    }

    #[test]
    fn test_flags_by_name() {
        let flags = LinterFlags::default().python();
        assert_eq!(flags.get("python"), Some(true));
        assert_eq!(flags.get("cpp"), Some(false));
        assert_eq!(flags.get("static"), Some(true));
        assert_eq!(flags.get("rust"), None);
    }
}
