//! Configuration types for cardboardlint.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::filter::FileFilter;

/// Name of the option holding a linter's filename rules.
pub const FILEFILTER: &str = "filefilter";

/// Project configuration, usually read from `.cardboardlint.toml`.
///
/// ```toml
/// [[linters]]
/// name = "import"
/// packages = ["mypkg"]
///
/// [[linters]]
/// name = "namespace"
/// directories = ["mypkg"]
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Linters to run, in order. The same linter may appear more than once.
    #[serde(default)]
    pub linters: Vec<LinterSection>,
}

impl ProjectConfig {
    /// Creates an empty configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }
}

/// One `[[linters]]` entry: a linter name and its user options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinterSection {
    /// Linter name (e.g., "import").
    pub name: String,

    /// Linter-specific options as key-value pairs.
    #[serde(flatten)]
    pub options: toml::Table,
}

/// Validated options for a single linter run.
///
/// Built by [`LinterConfig::resolve`], which starts from the linter defaults
/// and overlays the user options. Every key a linter reads is therefore
/// present.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinterConfig {
    options: toml::Table,
}

impl LinterConfig {
    /// Merges user options over a linter's defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if a user option is unknown to the linter or has a
    /// different type than its default.
    pub fn resolve(
        linter: &str,
        defaults: &toml::Table,
        user: &toml::Table,
    ) -> Result<Self, ConfigError> {
        let mut options = defaults.clone();
        for (key, value) in user {
            let Some(default) = defaults.get(key) else {
                return Err(ConfigError::UnknownOption {
                    linter: linter.to_string(),
                    key: key.clone(),
                });
            };
            if default.type_str() != value.type_str() {
                return Err(ConfigError::InvalidOption {
                    linter: linter.to_string(),
                    key: key.clone(),
                    message: format!("expected {}, found {}", default.type_str(), value.type_str()),
                });
            }
            options.insert(key.clone(), value.clone());
        }
        Ok(Self { options })
    }

    /// Wraps a table without validation.
    #[must_use]
    pub fn from_table(options: toml::Table) -> Self {
        Self { options }
    }

    /// Returns the raw option value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&toml::Value> {
        self.options.get(key)
    }

    /// Gets an option as a list of strings. A missing key yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not an array of strings.
    pub fn get_str_array(&self, key: &str) -> Result<Vec<String>, ConfigError> {
        let Some(value) = self.options.get(key) else {
            return Ok(Vec::new());
        };
        let invalid = || ConfigError::InvalidOption {
            linter: String::new(),
            key: key.to_string(),
            message: "expected an array of strings".to_string(),
        };
        value
            .as_array()
            .ok_or_else(invalid)?
            .iter()
            .map(|v| v.as_str().map(String::from).ok_or_else(invalid))
            .collect()
    }

    /// Gets a string option with a default value.
    #[must_use]
    pub fn get_str<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.options
            .get(key)
            .and_then(toml::Value::as_str)
            .unwrap_or(default)
    }

    /// Builds the linter's file filter, if it declares one.
    ///
    /// # Errors
    ///
    /// Returns an error if the rules are malformed.
    pub fn filefilter(&self) -> Result<Option<FileFilter>, ConfigError> {
        if self.options.contains_key(FILEFILTER) {
            FileFilter::parse(self.get_str_array(FILEFILTER)?).map(Some)
        } else {
            Ok(None)
        }
    }
}

/// Builds a TOML array of strings, for writing linter defaults.
#[must_use]
pub fn string_array<I, S>(items: I) -> toml::Value
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    toml::Value::Array(
        items
            .into_iter()
            .map(|s| toml::Value::String(s.into()))
            .collect(),
    )
}

/// Configuration errors.
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum ConfigError {
    /// IO error reading config file.
    #[error("Failed to read config file {path}: {source}")]
    #[diagnostic(code(cardboard::config::io))]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Parse error in config file.
    #[error("Failed to parse config: {message}")]
    #[diagnostic(code(cardboard::config::parse))]
    Parse {
        /// Parse error message.
        message: String,
    },

    /// Option not known to the linter.
    #[error("Unknown option '{key}' for linter '{linter}'")]
    #[diagnostic(
        code(cardboard::config::unknown_option),
        help("check the option name against the linter's defaults")
    )]
    UnknownOption {
        /// Linter name.
        linter: String,
        /// Offending key.
        key: String,
    },

    /// Option with the wrong shape.
    #[error("Invalid value for option '{key}': {message}")]
    #[diagnostic(code(cardboard::config::invalid_option))]
    InvalidOption {
        /// Linter name, empty when unknown.
        linter: String,
        /// Offending key.
        key: String,
        /// What was wrong.
        message: String,
    },

    /// Malformed filename rule.
    #[error("Invalid filter rule '{rule}': {message}")]
    #[diagnostic(
        code(cardboard::config::invalid_rule),
        help("rules look like \"+ *.py\" or \"- */test_*.py\"")
    )]
    InvalidRule {
        /// The rule as written.
        rule: String,
        /// What was wrong.
        message: String,
    },

    /// No linter with this name is registered.
    #[error("Unknown linter: {0}")]
    #[diagnostic(code(cardboard::config::unknown_linter))]
    UnknownLinter(String),

    /// Malformed `N/M` part selector.
    #[error("Could not parse part '{part}': {message}")]
    #[diagnostic(code(cardboard::config::invalid_part))]
    InvalidPart {
        /// The selector as given.
        part: String,
        /// What was wrong.
        message: String,
    },

    /// Both `static` and `dynamic` were set on a linter.
    #[error("A linter cannot set both static and dynamic flags")]
    #[diagnostic(code(cardboard::config::conflicting_flags))]
    ConflictingFlags,

    /// A directory to scan lies outside the project root.
    #[error("Directory '{directory}' is outside the project root {}", root.display())]
    #[diagnostic(
        code(cardboard::config::outside_root),
        help("list directories relative to the project root")
    )]
    DirectoryOutsideRoot {
        /// The directory as configured.
        directory: String,
        /// Project root it was resolved against.
        root: PathBuf,
    },
}
