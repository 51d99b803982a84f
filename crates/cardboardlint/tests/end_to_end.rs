//! Integration test: config file → linter selection → driver → report.
//!
//! Builds a small Python project in a temporary directory and checks the
//! messages both linters produce through [`run_project`].

use cardboardlint::{run_project, ModifiedLines, RunOptions};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const CONFIG: &str = r#"
[[linters]]
name = "import"
packages = ["horton"]

[[linters]]
name = "namespace"
directories = ["horton"]
exclude = ["*/test_*.py", "*/__init__.py", "np"]
"#;

fn write(root: &Path, rel: &str, content: &[u8]) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().expect("fixture path has a parent"))
        .expect("fixture dir should be created");
    fs::write(path, content).expect("fixture file should be written");
}

fn fixture() -> TempDir {
    let tmp = TempDir::new().expect("tempdir should be created");
    let root = tmp.path();
    write(root, ".cardboardlint.toml", CONFIG.as_bytes());
    write(root, "horton/__init__.py", b"from horton import __version__\n");
    write(
        root,
        "horton/grid.py",
        b"__all__ = ['Grid', 'np']\nimport numpy as np\nfrom horton import log\n",
    );
    write(root, "horton/log.py", b"__all__ = ['Grid', 'log']\n");
    write(root, "horton/bare.py", b"x = 1\n");
    write(root, "horton/test_grid.py", b"from horton import Grid\n");
    write(root, "horton/latin1.py", b"__all__ = []\n# caf\xe9\n");
    tmp
}

fn rendered(options: RunOptions, root: &Path) -> Vec<String> {
    let report = run_project(root, options).expect("run should succeed");
    report.messages.iter().map(ToString::to_string).collect()
}

#[test]
fn reports_all_findings_sorted() {
    let tmp = fixture();
    let messages = rendered(RunOptions::default(), tmp.path());

    assert_eq!(
        messages,
        vec![
            "Name 'Grid' found in modules horton.grid horton.log",
            "horton/bare.py: Missing __all__",
            "horton/grid.py: Invalid name in namespace: np",
            "horton/grid.py:3: Wrong import from horton",
            "horton/latin1.py: invalid utf-8 sequence of 1 bytes from index 18",
        ]
    );
}

#[test]
fn selection_limits_linters() {
    let tmp = fixture();
    let options = RunOptions {
        selection: vec!["import".to_string()],
        ..RunOptions::default()
    };
    let report = run_project(tmp.path(), options).expect("run should succeed");
    assert_eq!(report.linters_run, vec!["import"]);
    assert_eq!(report.messages.len(), 2);
}

#[test]
fn static_flag_skips_namespace() {
    let tmp = fixture();
    let options = RunOptions {
        flags: vec!["static".to_string()],
        ..RunOptions::default()
    };
    let report = run_project(tmp.path(), options).expect("run should succeed");
    assert_eq!(report.linters_run, vec!["import"]);
}

#[test]
fn modified_lines_restrict_messages() {
    let tmp = fixture();
    let mut modified = ModifiedLines::new();
    modified.insert_lines("horton/grid.py", [1]);
    modified.insert_lines("horton/log.py", [1]);

    let options = RunOptions {
        modified: Some(modified),
        ..RunOptions::default()
    };
    let messages = rendered(options, tmp.path());

    // The import on line 3 was not touched; file-wide and project-wide
    // messages are kept.
    assert_eq!(
        messages,
        vec![
            "Name 'Grid' found in modules horton.grid horton.log",
            "horton/grid.py: Invalid name in namespace: np",
        ]
    );
}

#[test]
fn repeated_runs_are_identical() {
    let tmp = fixture();
    let first = rendered(RunOptions::default(), tmp.path());
    let second = rendered(RunOptions::default(), tmp.path());
    assert_eq!(first, second);
}

#[test]
fn hidden_and_ignored_trees_are_not_linted() {
    let tmp = fixture();
    let root = tmp.path();
    write(root, ".venv/lib/site-packages/dep/mod.py", b"from horton import x\n");
    write(root, ".git/hook.py", b"from horton import x\n");
    write(root, "build/copy.py", b"from horton import x\n");
    write(root, ".gitignore", b"build/\n");

    let options = RunOptions {
        selection: vec!["import".to_string()],
        ..RunOptions::default()
    };
    let messages = rendered(options, root);
    assert_eq!(
        messages,
        vec![
            "horton/grid.py:3: Wrong import from horton",
            "horton/latin1.py: invalid utf-8 sequence of 1 bytes from index 18",
        ]
    );
}
