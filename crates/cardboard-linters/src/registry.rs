//! Lookup of built-in linters by name.

use crate::{import, namespace, ImportChecker, NamespaceChecker};
use cardboard_core::{ConfigError, LinterBox, LinterEntry, LinterSection};

/// Names of all built-in linters.
pub const LINTER_NAMES: &[&str] = &[import::NAME, namespace::NAME];

/// Creates a built-in linter by name.
///
/// # Errors
///
/// Returns [`ConfigError::UnknownLinter`] for names not in [`LINTER_NAMES`].
pub fn linter_by_name(name: &str) -> Result<LinterBox, ConfigError> {
    match name {
        import::NAME => Ok(Box::new(ImportChecker::new())),
        namespace::NAME => Ok(Box::new(NamespaceChecker::new())),
        other => Err(ConfigError::UnknownLinter(other.to_string())),
    }
}

/// Turns `[[linters]]` sections into runnable entries, preserving order.
///
/// # Errors
///
/// Returns an error if a section names an unknown linter.
pub fn entries_from_sections(sections: &[LinterSection]) -> Result<Vec<LinterEntry>, ConfigError> {
    sections
        .iter()
        .map(|s| -> Result<LinterEntry, ConfigError> {
            Ok(LinterEntry::new(linter_by_name(&s.name)?, s.options.clone()))
        })
        .collect()
}

/// Returns every built-in linter with default options.
#[must_use]
pub fn all_linters() -> Vec<LinterBox> {
    vec![
        Box::new(ImportChecker::new()),
        Box::new(NamespaceChecker::new()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_name_resolves() {
        for name in LINTER_NAMES {
            assert_eq!(linter_by_name(name).unwrap().name(), *name);
        }
        assert_eq!(all_linters().len(), LINTER_NAMES.len());
    }

    #[test]
    fn test_unknown_name() {
        assert!(matches!(
            linter_by_name("pylint"),
            Err(ConfigError::UnknownLinter(ref n)) if n == "pylint"
        ));
    }

    #[test]
    fn test_entries_keep_order_and_options() {
        let config = cardboard_core::ProjectConfig::parse(
            r#"
[[linters]]
name = "namespace"

[[linters]]
name = "import"
packages = ["pkg"]
"#,
        )
        .unwrap();

        let entries = entries_from_sections(&config.linters).unwrap();
        let names: Vec<&str> = entries.iter().map(LinterEntry::name).collect();
        assert_eq!(names, vec!["namespace", "import"]);
        assert!(entries[1].options.contains_key("packages"));
    }
}
