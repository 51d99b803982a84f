//! # cardboardlint
//!
//! Cheap lint solution for pull requests.
//!
//! This is the main facade crate that re-exports the core framework and the
//! built-in linters, and runs a project's configured linters.
//!
//! ## Configuration
//!
//! Linters are listed in `.cardboardlint.toml` at the project root, in the
//! order they run:
//!
//! ```toml
//! [[linters]]
//! name = "import"
//! packages = ["mypkg"]
//!
//! [[linters]]
//! name = "namespace"
//! directories = ["mypkg"]
//! exclude = ["*/test_*.py", "*/__init__.py"]
//! ```
//!
//! ## Programmatic Usage
//!
//! ```rust,ignore
//! use cardboardlint::{run_project, ModifiedLines, RunOptions};
//!
//! let mut modified = ModifiedLines::new();
//! modified.insert_lines("mypkg/core.py", [10, 11, 12]);
//!
//! let report = run_project(Path::new("."), RunOptions {
//!     modified: Some(modified),
//!     ..RunOptions::default()
//! })?;
//! report.print_report();
//! ```

#![forbid(unsafe_code)]

// Re-export core types and traits
pub use cardboard_core::*;

/// Built-in linters and export resolvers.
pub mod linters {
    pub use cardboard_linters::*;
}

mod runner;

pub use runner::{run_project, RunError, RunOptions};
