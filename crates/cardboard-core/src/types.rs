//! Core types for lint messages, modified-line scopes and reports.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Errors raised when constructing a [`Message`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, miette::Diagnostic)]
pub enum MessageError {
    /// The message text was empty.
    #[error("message text must not be empty")]
    #[diagnostic(code(cardboard::message::empty_text))]
    EmptyText,
}

/// A single diagnostic produced by a linter.
///
/// `filename` and `line_number` are absent for file-wide or project-wide
/// findings. The text is never empty.
///
/// Messages order by `(filename, line_number, char_number, text)`, with
/// absent values sorting before present ones.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawMessage")]
pub struct Message {
    filename: Option<String>,
    line_number: Option<usize>,
    char_number: Option<usize>,
    text: String,
}

/// Unchecked form of [`Message`] read by serde.
#[derive(Deserialize)]
struct RawMessage {
    #[serde(default)]
    filename: Option<String>,
    #[serde(default)]
    line_number: Option<usize>,
    #[serde(default)]
    char_number: Option<usize>,
    text: String,
}

impl TryFrom<RawMessage> for Message {
    type Error = MessageError;

    fn try_from(raw: RawMessage) -> Result<Self, Self::Error> {
        Self::new(raw.filename, raw.line_number, raw.char_number, raw.text)
    }
}

impl Message {
    /// Creates a new message.
    ///
    /// # Errors
    ///
    /// Returns [`MessageError::EmptyText`] if `text` is empty.
    pub fn new(
        filename: Option<String>,
        line_number: Option<usize>,
        char_number: Option<usize>,
        text: impl Into<String>,
    ) -> Result<Self, MessageError> {
        let text = text.into();
        if text.is_empty() {
            return Err(MessageError::EmptyText);
        }
        Ok(Self {
            filename,
            line_number,
            char_number,
            text,
        })
    }

    /// Creates a project-wide message without a location.
    ///
    /// # Errors
    ///
    /// Returns [`MessageError::EmptyText`] if `text` is empty.
    pub fn project(text: impl Into<String>) -> Result<Self, MessageError> {
        Self::new(None, None, None, text)
    }

    /// Creates a file-wide message without a line number.
    ///
    /// # Errors
    ///
    /// Returns [`MessageError::EmptyText`] if `text` is empty.
    pub fn in_file(filename: impl Into<String>, text: impl Into<String>) -> Result<Self, MessageError> {
        Self::new(Some(filename.into()), None, None, text)
    }

    /// Creates a message attached to a 1-based line of a file.
    ///
    /// # Errors
    ///
    /// Returns [`MessageError::EmptyText`] if `text` is empty.
    pub fn at_line(
        filename: impl Into<String>,
        line_number: usize,
        text: impl Into<String>,
    ) -> Result<Self, MessageError> {
        Self::new(Some(filename.into()), Some(line_number), None, text)
    }

    /// Returns the file this message refers to, if any.
    #[must_use]
    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    /// Returns the 1-based line number, if any.
    #[must_use]
    pub fn line_number(&self) -> Option<usize> {
        self.line_number
    }

    /// Returns the character position, if any.
    #[must_use]
    pub fn char_number(&self) -> Option<usize> {
        self.char_number
    }

    /// Returns the message text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns true if this message falls inside the modified lines.
    ///
    /// A message is in the diff when its file is present and either the whole
    /// file is in scope, the message has no line number, or its line was
    /// modified. Project-wide messages (no filename) are always kept.
    #[must_use]
    pub fn in_diff(&self, modified: &ModifiedLines) -> bool {
        let Some(filename) = &self.filename else {
            return true;
        };
        match modified.get(filename) {
            None => false,
            Some(LineScope::All) => true,
            Some(LineScope::Lines(lines)) => self
                .line_number
                .map_or(true, |line| lines.contains(&line)),
        }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(filename) = &self.filename {
            write!(f, "{filename}")?;
            if let Some(line) = self.line_number {
                write!(f, ":{line}")?;
                if let Some(ch) = self.char_number {
                    write!(f, ":{ch}")?;
                }
            }
            write!(f, ": ")?;
        }
        write!(f, "{}", self.text)
    }
}

/// Which lines of a file are in scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineScope {
    /// The whole file is in scope.
    All,
    /// Only these 1-based line numbers were touched.
    Lines(BTreeSet<usize>),
}

/// Mapping from filename to the lines touched by a change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifiedLines {
    files: BTreeMap<String, LineScope>,
}

impl ModifiedLines {
    /// Creates an empty mapping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a whole file as modified.
    pub fn insert_file(&mut self, filename: impl Into<String>) {
        self.files.insert(filename.into(), LineScope::All);
    }

    /// Adds modified line numbers for a file.
    ///
    /// Lines are merged into any existing set. A file already marked as
    /// whole-file stays whole-file.
    pub fn insert_lines<I>(&mut self, filename: impl Into<String>, lines: I)
    where
        I: IntoIterator<Item = usize>,
    {
        let scope = self
            .files
            .entry(filename.into())
            .or_insert_with(|| LineScope::Lines(BTreeSet::new()));
        if let LineScope::Lines(set) = scope {
            set.extend(lines);
        }
    }

    /// Returns the scope recorded for a file.
    #[must_use]
    pub fn get(&self, filename: &str) -> Option<&LineScope> {
        self.files.get(filename)
    }

    /// Returns true if the file is present in the mapping.
    #[must_use]
    pub fn contains(&self, filename: &str) -> bool {
        self.files.contains_key(filename)
    }

    /// Returns true if no files are recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Returns the number of files recorded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Iterates over the recorded files in lexicographic order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &LineScope)> {
        self.files.iter().map(|(name, scope)| (name.as_str(), scope))
    }
}

/// Aggregated result of running one or more linters.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct LintReport {
    /// All messages, sorted.
    pub messages: Vec<Message>,
    /// Names of the linters that ran, in execution order.
    pub linters_run: Vec<String>,
}

impl LintReport {
    /// Creates a new empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if any message was produced, which signals lint failure.
    #[must_use]
    pub fn has_messages(&self) -> bool {
        !self.messages.is_empty()
    }

    /// Sorts messages by location, then text.
    pub fn sort(&mut self) {
        self.messages.sort();
    }

    /// Adds messages from another report.
    pub fn extend(&mut self, other: Self) {
        self.messages.extend(other.messages);
        self.linters_run.extend(other.linters_run);
    }

    /// Prints every message to stdout, followed by a summary line.
    pub fn print_report(&self) {
        for message in &self.messages {
            println!("{message}");
        }

        println!(
            "\nFound {} message(s) from {} linter(s)",
            self.messages.len(),
            self.linters_run.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn modified() -> ModifiedLines {
        let mut m = ModifiedLines::new();
        m.insert_lines("a.py", [3, 5]);
        m.insert_file("b.py");
        m
    }

    #[test]
    fn deserialize_goes_through_constructor() {
        let err = toml::from_str::<Message>("text = ''").unwrap_err();
        assert!(err.to_string().contains("must not be empty"));

        let m: Message = toml::from_str("filename = 'a.py'\nline_number = 3\ntext = 'x'").unwrap();
        assert_eq!(m, Message::at_line("a.py", 3, "x").unwrap());
    }

    #[test]
    fn empty_text_is_rejected() {
        assert_eq!(Message::project(""), Err(MessageError::EmptyText));
        assert_eq!(Message::at_line("a.py", 1, ""), Err(MessageError::EmptyText));
    }

    #[test]
    fn display_with_line() {
        let m = Message::at_line("pkg/a.py", 12, "Wrong import from pkg").unwrap();
        assert_eq!(m.to_string(), "pkg/a.py:12: Wrong import from pkg");
    }

    #[test]
    fn display_with_char() {
        let m = Message::new(Some("a.py".into()), Some(2), Some(7), "bad").unwrap();
        assert_eq!(m.to_string(), "a.py:2:7: bad");
    }

    #[test]
    fn display_file_only() {
        let m = Message::in_file("a.py", "Missing __all__").unwrap();
        assert_eq!(m.to_string(), "a.py: Missing __all__");
    }

    #[test]
    fn display_project_wide() {
        let m = Message::project("Name 'foo' found in modules a b").unwrap();
        insta::assert_snapshot!(m.to_string(), @"Name 'foo' found in modules a b");
    }

    #[test]
    fn ordering_puts_absent_values_first() {
        let project = Message::project("z").unwrap();
        let file = Message::in_file("a.py", "y").unwrap();
        let line1 = Message::at_line("a.py", 1, "x").unwrap();
        let line2 = Message::at_line("a.py", 2, "a").unwrap();
        let other = Message::at_line("b.py", 1, "a").unwrap();

        let mut messages = vec![
            other.clone(),
            line2.clone(),
            project.clone(),
            line1.clone(),
            file.clone(),
        ];
        messages.sort();
        assert_eq!(messages, vec![project, file, line1, line2, other]);
    }

    #[test]
    fn in_diff_respects_line_sets() {
        let m = modified();
        assert!(Message::at_line("a.py", 3, "x").unwrap().in_diff(&m));
        assert!(!Message::at_line("a.py", 4, "x").unwrap().in_diff(&m));
        assert!(Message::in_file("a.py", "x").unwrap().in_diff(&m));
    }

    #[test]
    fn in_diff_whole_file_and_missing_file() {
        let m = modified();
        assert!(Message::at_line("b.py", 99, "x").unwrap().in_diff(&m));
        assert!(!Message::at_line("c.py", 1, "x").unwrap().in_diff(&m));
    }

    #[test]
    fn in_diff_keeps_project_messages() {
        let m = modified();
        assert!(Message::project("collision").unwrap().in_diff(&m));
    }

    #[test]
    fn insert_lines_does_not_narrow_whole_file() {
        let mut m = ModifiedLines::new();
        m.insert_file("a.py");
        m.insert_lines("a.py", [1]);
        assert_eq!(m.get("a.py"), Some(&LineScope::All));
    }

    #[test]
    fn insert_lines_merges() {
        let mut m = ModifiedLines::new();
        m.insert_lines("a.py", [1, 2]);
        m.insert_lines("a.py", [2, 9]);
        assert_eq!(
            m.get("a.py"),
            Some(&LineScope::Lines(BTreeSet::from([1, 2, 9])))
        );
        assert_eq!(m.len(), 1);
    }
}
