//! # cardboard-linters
//!
//! Built-in linters for cardboardlint.
//!
//! ## Available Linters
//!
//! | Name | Description |
//! |------|-------------|
//! | `import` | Forbids absolute imports from the project's own packages |
//! | `namespace` | Requires `__all__` and reports names exported by several modules |
//!
//! ## Usage
//!
//! ```ignore
//! use cardboard_core::Driver;
//! use cardboard_linters::{ImportChecker, NamespaceChecker};
//!
//! let driver = Driver::builder()
//!     .root(".")
//!     .linter(ImportChecker::new())
//!     .linter(NamespaceChecker::new())
//!     .build()?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod import;
pub mod namespace;
pub mod python;
mod registry;
pub mod resolver;

pub use import::ImportChecker;
pub use namespace::{module_name, NamespaceChecker, NamespaceTable};
pub use registry::{all_linters, entries_from_sections, linter_by_name, LINTER_NAMES};
pub use python::{ExtractError, PythonExtractor};
pub use resolver::{ExportResolver, ResolveError, SourceExports, StaticExports};

/// Re-export core types for convenience.
pub use cardboard_core::{Linter, Message};
