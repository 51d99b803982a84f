//! Linter for import conventions.
//!
//! # Rationale
//!
//! Inside a package, modules should import their siblings relatively. An
//! absolute import of the package itself, as in
//!
//! ```python
//! from package import foo
//! ```
//!
//! picks up an installed copy instead of the source tree under review.
//!
//! # Detected Patterns
//!
//! - Any line containing `from <package> import`, for every configured package
//!
//! # Allowed Patterns
//!
//! - A line that is exactly `from <package> import __version__`
//!
//! # Configuration
//!
//! - `filefilter`: filename rules (default `["- */test_*.py", "+ *.py", "+ *.pyx"]`)
//! - `packages`: package names to check. The linter does nothing while this
//!   list is empty.

use cardboard_core::{
    string_array, LintError, LintTarget, Linter, LinterConfig, LinterFlags, Message, FILEFILTER,
};
use tracing::{debug, warn};

/// Linter name for import.
pub const NAME: &str = "import";

/// Option holding the package names to check.
pub const PACKAGES: &str = "packages";

/// Filename rules applied when the user gives none.
const DEFAULT_FILEFILTER: &[&str] = &["- */test_*.py", "+ *.py", "+ *.pyx"];

/// Flags absolute imports of the project's own packages.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImportChecker;

impl ImportChecker {
    /// Creates a new linter.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Checks `filenames` for imports from `packages`.
    ///
    /// Files that are not valid UTF-8 produce one message without a line
    /// number and are not scanned further.
    ///
    /// # Errors
    ///
    /// Returns an error if a file cannot be read.
    pub fn check_files(
        &self,
        target: &LintTarget<'_>,
        packages: &[String],
    ) -> Result<Vec<Message>, LintError> {
        let mut messages = Vec::new();
        if packages.is_empty() {
            debug!("No packages configured, skipping import check");
            return Ok(messages);
        }

        let rules: Vec<PackageRule> = packages.iter().map(|p| PackageRule::new(p)).collect();
        for filename in target.files {
            let path = target.path_of(filename);
            debug!("Checking imports: {}", path.display());

            let bytes = std::fs::read(&path).map_err(|e| LintError::io(&path, e))?;
            match std::str::from_utf8(&bytes) {
                Ok(content) => check_content(filename, content, &rules, &mut messages)?,
                Err(err) => {
                    warn!("Failed to decode {filename}: {err}");
                    messages.push(Message::in_file(filename.as_str(), err.to_string())?);
                }
            }
        }

        Ok(messages)
    }
}

impl Linter for ImportChecker {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Forbids absolute imports from the project's own packages"
    }

    fn flags(&self) -> LinterFlags {
        LinterFlags::default().python()
    }

    fn default_config(&self) -> toml::Table {
        let mut table = toml::Table::new();
        table.insert(FILEFILTER.into(), string_array(DEFAULT_FILEFILTER.iter().copied()));
        table.insert(PACKAGES.into(), string_array(Vec::<String>::new()));
        table
    }

    fn run(&self, config: &LinterConfig, target: &LintTarget<'_>) -> Result<Vec<Message>, LintError> {
        let packages = config.get_str_array(PACKAGES)?;
        self.check_files(target, &packages)
    }
}

/// Precomputed strings for one package.
struct PackageRule<'a> {
    package: &'a str,
    needle: String,
    version_line: String,
}

impl<'a> PackageRule<'a> {
    fn new(package: &'a str) -> Self {
        Self {
            package,
            needle: format!("from {package} import"),
            version_line: format!("from {package} import __version__\n"),
        }
    }
}

/// Scans one decoded file. Lines keep their terminator, so only a version
/// import followed by a newline is allowed.
fn check_content(
    filename: &str,
    content: &str,
    rules: &[PackageRule<'_>],
    messages: &mut Vec<Message>,
) -> Result<(), LintError> {
    for (index, line) in lines_with_ends(content).into_iter().enumerate() {
        for rule in rules {
            if line == rule.version_line {
                continue;
            }
            if line.contains(&rule.needle) {
                messages.push(Message::at_line(
                    filename,
                    index + 1,
                    format!("Wrong import from {}", rule.package),
                )?);
            }
        }
    }
    Ok(())
}

const LINE_BREAKS: &[char] = &[
    '\n', '\r', '\x0b', '\x0c', '\x1c', '\x1d', '\x1e', '\u{85}', '\u{2028}', '\u{2029}',
];

/// Splits text into lines, keeping terminators.
///
/// Breaks on the same characters as Python's `str.splitlines`, with `\r\n`
/// kept together as one terminator.
fn lines_with_ends(content: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut chars = content.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if !LINE_BREAKS.contains(&c) {
            continue;
        }
        let mut end = i + c.len_utf8();
        if c == '\r' {
            if let Some(&(j, '\n')) = chars.peek() {
                end = j + 1;
                chars.next();
            }
        }
        lines.push(&content[start..end]);
        start = end;
    }
    if start < content.len() {
        lines.push(&content[start..]);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn packages(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| (*s).to_string()).collect()
    }

    fn check(files: &[(&str, &[u8])], pkgs: &[&str]) -> Vec<Message> {
        let tmp = TempDir::new().unwrap();
        for (name, content) in files {
            let path = tmp.path().join(name);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        }
        let filenames: Vec<String> = files.iter().map(|(n, _)| (*n).to_string()).collect();
        let target = LintTarget::new(tmp.path(), &filenames);
        ImportChecker::new()
            .check_files(&target, &packages(pkgs))
            .unwrap()
    }

    #[test]
    fn test_detects_absolute_import() {
        let messages = check(
            &[("pkg/a.py", b"import os\nfrom pkg import foo\n")],
            &["pkg"],
        );
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].filename(), Some("pkg/a.py"));
        assert_eq!(messages[0].line_number(), Some(2));
        assert_eq!(messages[0].char_number(), None);
        insta::assert_snapshot!(messages[0].text(), @"Wrong import from pkg");
    }

    #[test]
    fn test_allows_version_import() {
        let messages = check(&[("a.py", b"from pkg import __version__\n")], &["pkg"]);
        assert!(messages.is_empty());
    }

    #[test]
    fn test_version_import_without_newline_is_flagged() {
        let messages = check(&[("a.py", b"x = 1\nfrom pkg import __version__")], &["pkg"]);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].line_number(), Some(2));
    }

    #[test]
    fn test_lines_split_like_python() {
        assert_eq!(
            lines_with_ends("a\r\nb\rc\x0cd\u{2028}e\n\nf"),
            vec!["a\r\n", "b\r", "c\x0c", "d\u{2028}", "e\n", "\n", "f"]
        );
        assert!(lines_with_ends("").is_empty());
    }

    #[test]
    fn test_line_numbers_follow_carriage_returns() {
        let messages = check(
            &[("a.py", b"import os\rx = 1\x0cfrom pkg import foo\n")],
            &["pkg"],
        );
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].line_number(), Some(3));
    }

    #[test]
    fn test_crlf_version_import_is_flagged() {
        let messages = check(&[("a.py", b"from pkg import __version__\r\n")], &["pkg"]);
        assert_eq!(messages.len(), 1);
    }

    #[test]
    fn test_indented_version_import_is_flagged() {
        let messages = check(&[("a.py", b"    from pkg import __version__\n")], &["pkg"]);
        assert_eq!(messages.len(), 1);
    }

    #[test]
    fn test_inert_without_packages() {
        let messages = check(&[("a.py", b"from pkg import foo\n")], &[]);
        assert!(messages.is_empty());
    }

    #[test]
    fn test_inert_without_packages_ignores_missing_files() {
        let files = vec!["does_not_exist.py".to_string()];
        let target = LintTarget::new(Path::new("/nonexistent"), &files);
        let messages = ImportChecker::new().check_files(&target, &[]).unwrap();
        assert!(messages.is_empty());
    }

    #[test]
    fn test_each_package_checked_independently() {
        let messages = check(
            &[("a.py", b"from pkg import x  # from pkg.sub import y\n")],
            &["pkg", "pkg.sub"],
        );
        let texts: Vec<&str> = messages.iter().map(Message::text).collect();
        assert_eq!(texts, vec!["Wrong import from pkg", "Wrong import from pkg.sub"]);
        assert!(messages.iter().all(|m| m.line_number() == Some(1)));
    }

    #[test]
    fn test_duplicate_messages_for_repeated_package() {
        let messages = check(&[("a.py", b"from pkg import x\n")], &["pkg", "pkg"]);
        assert_eq!(messages.len(), 2);
    }

    #[test]
    fn test_invalid_utf8_reported_and_run_continues() {
        let messages = check(
            &[
                ("bad.py", b"from pkg import x\n\xff\xfe\n"),
                ("good.py", b"from pkg import y\n"),
            ],
            &["pkg"],
        );
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].filename(), Some("bad.py"));
        assert_eq!(messages[0].line_number(), None);
        assert!(!messages[0].text().is_empty());
        assert_eq!(messages[1].filename(), Some("good.py"));
        assert_eq!(messages[1].line_number(), Some(1));
    }

    #[test]
    fn test_missing_file_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let files = vec!["missing.py".to_string()];
        let target = LintTarget::new(tmp.path(), &files);
        let result = ImportChecker::new().check_files(&target, &packages(&["pkg"]));
        assert!(matches!(result, Err(LintError::Io { .. })));
    }

    #[test]
    fn test_messages_in_file_then_line_order() {
        let messages = check(
            &[
                ("b.py", b"from pkg import a\nfrom pkg import b\n"),
                ("a.py", b"\n\nfrom pkg import c\n"),
            ],
            &["pkg"],
        );
        let locations: Vec<(Option<&str>, Option<usize>)> = messages
            .iter()
            .map(|m| (m.filename(), m.line_number()))
            .collect();
        assert_eq!(
            locations,
            vec![
                (Some("b.py"), Some(1)),
                (Some("b.py"), Some(2)),
                (Some("a.py"), Some(3)),
            ]
        );
    }

    #[test]
    fn test_run_reads_packages_from_config() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.py"), "from pkg import foo\n").unwrap();
        let files = vec!["a.py".to_string()];
        let target = LintTarget::new(tmp.path(), &files);

        let linter = ImportChecker::new();
        let mut user = toml::Table::new();
        user.insert(PACKAGES.into(), string_array(["pkg"]));
        let config = LinterConfig::resolve(NAME, &linter.default_config(), &user).unwrap();

        let first = linter.run(&config, &target).unwrap();
        let second = linter.run(&config, &target).unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(first, second);
    }

    #[test]
    fn test_default_filefilter() {
        let linter = ImportChecker::new();
        let config =
            LinterConfig::resolve(NAME, &linter.default_config(), &toml::Table::new()).unwrap();
        let filter = config.filefilter().unwrap().unwrap();
        assert_eq!(
            filter.filter_paths(&["a.py", "test_a.py", "pkg/test_b.py", "ext.pyx", "a.txt"]),
            vec!["a.py", "ext.pyx"]
        );
    }
}
