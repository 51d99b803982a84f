//! Include/exclude filename rules and file discovery.
//!
//! Rules are written as `"+ pattern"` (include) or `"- pattern"` (exclude)
//! and evaluated in authored order. The first rule whose pattern matches a
//! path decides whether it is selected; a path matched by no rule is
//! excluded, so an empty rule list selects nothing.
//!
//! Patterns follow `fnmatch` conventions: matching is case-sensitive and `*`
//! may cross `/`. A run of stars means the same as a single `*`, so `**` has
//! no special directory meaning. Paths are anchored at the filter root, so a
//! pattern is tried against both `sub/a.py` and `./sub/a.py`. This lets
//! `*/test_*.py` catch test files at the top level as well as in
//! subdirectories.
//!
//! Discovery skips hidden entries (`.git`, `.venv`, ...) and anything listed
//! in `.gitignore` or `.ignore` files.

use glob::{MatchOptions, Pattern};
use ignore::WalkBuilder;
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

use crate::config::ConfigError;
use crate::linter::LintError;
use crate::types::ModifiedLines;

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// Whether a rule includes or excludes the paths it matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sign {
    /// Matching paths are selected.
    Include,
    /// Matching paths are dropped.
    Exclude,
}

impl Sign {
    fn symbol(self) -> char {
        match self {
            Self::Include => '+',
            Self::Exclude => '-',
        }
    }
}

/// A single include or exclude rule.
#[derive(Debug, Clone)]
pub struct FilterRule {
    sign: Sign,
    pattern: Pattern,
}

impl FilterRule {
    /// Creates a rule from a sign and a glob pattern.
    ///
    /// Runs of `*` are collapsed before compiling, so `a**b` is accepted
    /// and means `a*b`.
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern is not a valid glob.
    pub fn new(sign: Sign, pattern: &str) -> Result<Self, ConfigError> {
        let compiled = Pattern::new(&collapse_stars(pattern)).map_err(|e| {
            ConfigError::InvalidRule {
                rule: format!("{} {pattern}", sign.symbol()),
                message: e.to_string(),
            }
        })?;
        Ok(Self {
            sign,
            pattern: compiled,
        })
    }

    /// Parses a rule in its authored form, e.g. `"- */test_*.py"`.
    ///
    /// # Errors
    ///
    /// Returns an error if the rule does not start with `+` or `-`, has an
    /// empty pattern, or the pattern is not a valid glob.
    pub fn parse(rule: &str) -> Result<Self, ConfigError> {
        let invalid = |message: &str| ConfigError::InvalidRule {
            rule: rule.to_string(),
            message: message.to_string(),
        };

        let mut chars = rule.chars();
        let sign = match chars.next() {
            Some('+') => Sign::Include,
            Some('-') => Sign::Exclude,
            _ => return Err(invalid("rule must start with '+' or '-'")),
        };
        let pattern = chars.as_str().trim();
        if pattern.is_empty() {
            return Err(invalid("rule has an empty pattern"));
        }
        Self::new(sign, pattern)
    }

    /// Returns the sign of this rule.
    #[must_use]
    pub fn sign(&self) -> Sign {
        self.sign
    }

    /// Returns the glob pattern as written.
    #[must_use]
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// Tests the pattern against a root-relative path.
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        if self.pattern.matches_with(path, MATCH_OPTIONS) {
            return true;
        }
        !path.starts_with("./") && self.pattern.matches_with(&format!("./{path}"), MATCH_OPTIONS)
    }
}

impl fmt::Display for FilterRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.sign.symbol(), self.pattern.as_str())
    }
}

/// An ordered list of [`FilterRule`]s.
#[derive(Debug, Clone, Default)]
pub struct FileFilter {
    rules: Vec<FilterRule>,
}

impl FileFilter {
    /// Creates a filter from already-built rules.
    #[must_use]
    pub fn new(rules: Vec<FilterRule>) -> Self {
        Self { rules }
    }

    /// Parses a list of authored rules, preserving their order.
    ///
    /// # Errors
    ///
    /// Returns an error if any rule is malformed.
    pub fn parse<I, S>(rules: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let rules = rules
            .into_iter()
            .map(|r| FilterRule::parse(r.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rules })
    }

    /// Builds a filter that selects paths matching any `include` pattern
    /// and no `exclude` pattern.
    ///
    /// # Errors
    ///
    /// Returns an error if any pattern is not a valid glob.
    pub fn from_include_exclude<S: AsRef<str>>(
        include: &[S],
        exclude: &[S],
    ) -> Result<Self, ConfigError> {
        let excludes = exclude
            .iter()
            .map(|p| FilterRule::new(Sign::Exclude, p.as_ref()));
        let includes = include
            .iter()
            .map(|p| FilterRule::new(Sign::Include, p.as_ref()));
        let rules = excludes.chain(includes).collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rules })
    }

    /// Returns the rules in evaluation order.
    #[must_use]
    pub fn rules(&self) -> &[FilterRule] {
        &self.rules
    }

    /// Returns true if the path is selected by the rules.
    ///
    /// Folding from the last rule back to the first leaves the verdict of
    /// the first matching rule.
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        self.rules.iter().rev().fold(false, |selected, rule| {
            if rule.matches(path) {
                rule.sign == Sign::Include
            } else {
                selected
            }
        })
    }

    /// Filters an existing list of paths, preserving order.
    #[must_use]
    pub fn filter_paths<S: AsRef<str>>(&self, paths: &[S]) -> Vec<String> {
        paths
            .iter()
            .map(AsRef::as_ref)
            .filter(|p| self.matches(p))
            .map(String::from)
            .collect()
    }

    /// Discovers files under `directories` and returns the selected ones.
    ///
    /// Directories are resolved against `root` and visited in lexicographic
    /// order, each walked depth-first with entries sorted by name. Hidden
    /// and git-ignored entries are skipped. Returned paths are relative to
    /// `root`, `/`-separated.
    ///
    /// When `modified` is given and non-empty, files absent from it are
    /// skipped. Files present are selected whole; their line scope is left
    /// to the linter.
    ///
    /// # Errors
    ///
    /// Returns an error if a directory does not exist, resolves outside
    /// `root`, or cannot be walked.
    pub fn select<S: AsRef<str>>(
        &self,
        root: &Path,
        directories: &[S],
        modified: Option<&ModifiedLines>,
    ) -> Result<Vec<String>, LintError> {
        let directories: BTreeSet<&str> = directories.iter().map(AsRef::as_ref).collect();
        let modified = modified.filter(|m| !m.is_empty());
        let root = root.canonicalize().map_err(|e| LintError::io(root, e))?;

        let mut seen = HashSet::new();
        let mut selected = Vec::new();

        for directory in directories {
            let base = resolve_directory(&root, directory)?;

            let mut builder = WalkBuilder::new(&base);
            builder
                .hidden(true)
                .git_ignore(true)
                .require_git(false)
                .sort_by_file_name(|a, b| a.cmp(b));

            for entry in builder.build() {
                let entry = entry?;
                if !entry.file_type().is_some_and(|t| t.is_file()) {
                    continue;
                }

                let Some(relative) = relative_path(entry.path(), &root) else {
                    continue;
                };
                if !seen.insert(relative.clone()) {
                    continue;
                }
                if let Some(modified) = modified {
                    if !modified.contains(&relative) {
                        continue;
                    }
                }
                if self.matches(&relative) {
                    selected.push(relative);
                } else {
                    debug!("Filtered out: {relative}");
                }
            }
        }

        debug!("Selected {} file(s) with {} rule(s)", selected.len(), self.rules.len());
        Ok(selected)
    }
}

/// Collapses each run of `*` into a single star.
fn collapse_stars(pattern: &str) -> String {
    let mut collapsed = String::with_capacity(pattern.len());
    for c in pattern.chars() {
        if c == '*' && collapsed.ends_with('*') {
            continue;
        }
        collapsed.push(c);
    }
    collapsed
}

/// Resolves a configured directory against the canonical `root`.
fn resolve_directory(root: &Path, directory: &str) -> Result<PathBuf, LintError> {
    let joined = root.join(directory);
    let base = joined.canonicalize().map_err(|e| LintError::io(&joined, e))?;
    if !base.starts_with(root) {
        return Err(ConfigError::DirectoryOutsideRoot {
            directory: directory.to_string(),
            root: root.to_path_buf(),
        }
        .into());
    }
    Ok(base)
}

/// Converts a discovered path into a `/`-separated path relative to `root`.
fn relative_path(path: &Path, root: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Vec<&str> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => s.to_str(),
            _ => None,
        })
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}
