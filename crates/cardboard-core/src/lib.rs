//! # cardboard-core
//!
//! Core framework for cheap, diff-aware linting.
//!
//! This crate provides the shared data model and plumbing that linters plug
//! into. It includes:
//!
//! - [`Message`] for representing lint findings
//! - [`FileFilter`] for selecting files with ordered include/exclude rules
//! - [`Linter`] trait for pluggable checks
//! - [`Driver`] for running linters and aggregating their messages
//!
//! ## Example
//!
//! ```ignore
//! use cardboard_core::{Driver, ModifiedLines};
//!
//! let mut modified = ModifiedLines::new();
//! modified.insert_lines("pkg/mod.py", [3, 4]);
//!
//! let driver = Driver::builder()
//!     .root(".")
//!     .linter(MyLinter::new())
//!     .modified(modified)
//!     .build()?;
//!
//! let report = driver.run()?;
//! report.print_report();
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod driver;
mod filter;
mod linter;
mod select;
mod types;

pub use config::{string_array, ConfigError, LinterConfig, LinterSection, ProjectConfig, FILEFILTER};
pub use driver::{Driver, DriverBuilder};
pub use filter::{FileFilter, FilterRule, Sign};
pub use linter::{LintError, LintTarget, Linter, LinterBox, LinterFlags};
pub use select::{parse_part, select_linters, LinterEntry};
pub use types::{LineScope, LintReport, Message, MessageError, ModifiedLines};
