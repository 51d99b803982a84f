//! Python `__all__` extractor using Tree-sitter.
//!
//! Only statements at module level are considered. The recognised forms are
//!
//! ```python
//! __all__ = ["a", "b"]            # also tuples, `__all__: list[str] = ...`
//! __all__ += ["c"]
//! __all__.extend(["d"])
//! __all__.append("e")
//! ```
//!
//! A plain assignment replaces the names collected so far; the other forms
//! add to them. String literals are collected from lists, tuples, sets and
//! `+` concatenations; anything computed at runtime is ignored.

use tree_sitter::{Language, Node, Parser};

/// Errors raised while parsing Python source.
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum ExtractError {
    /// The grammar could not be loaded into the parser.
    #[error("failed to load the Python grammar: {0}")]
    #[diagnostic(code(cardboard::extract::language))]
    Language(String),

    /// The parser gave up without producing a tree.
    #[error("the Python parser produced no syntax tree")]
    #[diagnostic(code(cardboard::extract::parse))]
    Parse,
}

/// Extracts the explicit export list of a Python module.
#[derive(Debug, Clone, Copy, Default)]
pub struct PythonExtractor;

impl PythonExtractor {
    /// Creates a new Python extractor.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Returns the names listed in `__all__`, or `None` if the module never
    /// assigns it.
    ///
    /// # Errors
    ///
    /// Returns an error if the grammar cannot be loaded or parsing fails.
    pub fn exports(&self, source: &str) -> Result<Option<Vec<String>>, ExtractError> {
        let language: Language = tree_sitter_python::LANGUAGE.into();
        let mut parser = Parser::new();
        parser
            .set_language(&language)
            .map_err(|e| ExtractError::Language(e.to_string()))?;

        let src = source.as_bytes();
        let tree = parser.parse(src, None).ok_or(ExtractError::Parse)?;
        let root = tree.root_node();

        let mut exports: Option<Vec<String>> = None;
        let mut cursor = root.walk();
        for statement in root.children(&mut cursor) {
            if statement.kind() != "expression_statement" {
                continue;
            }
            let Some(expr) = statement.named_child(0) else {
                continue;
            };

            match expr.kind() {
                "assignment" if Self::targets_all(&expr, src) => {
                    // `__all__: list[str]` alone declares nothing.
                    if let Some(value) = expr.child_by_field_name("right") {
                        Self::collect_strings(&value, src, exports.insert(Vec::new()));
                    }
                }
                "augmented_assignment" if Self::targets_all(&expr, src) => {
                    let is_add = expr
                        .child_by_field_name("operator")
                        .is_some_and(|op| Self::text(&op, src) == "+=");
                    if let (true, Some(value)) = (is_add, expr.child_by_field_name("right")) {
                        Self::collect_strings(&value, src, exports.get_or_insert_with(Vec::new));
                    }
                }
                "call" => {
                    if let Some(arguments) = Self::list_method_arguments(&expr, src) {
                        Self::collect_strings(
                            &arguments,
                            src,
                            exports.get_or_insert_with(Vec::new),
                        );
                    }
                }
                _ => {}
            }
        }

        Ok(exports)
    }

    fn text<'a>(node: &Node<'_>, src: &'a [u8]) -> &'a str {
        node.utf8_text(src).unwrap_or("")
    }

    fn is_all(node: &Node<'_>, src: &[u8]) -> bool {
        node.kind() == "identifier" && Self::text(node, src) == "__all__"
    }

    fn targets_all(node: &Node<'_>, src: &[u8]) -> bool {
        let left = node.child_by_field_name("left");
        left.is_some_and(|left| Self::is_all(&left, src))
    }

    /// Arguments of `__all__.extend(...)` or `__all__.append(...)`.
    fn list_method_arguments<'tree>(call: &Node<'tree>, src: &[u8]) -> Option<Node<'tree>> {
        let function = call.child_by_field_name("function")?;
        if function.kind() != "attribute" {
            return None;
        }
        let object = function.child_by_field_name("object")?;
        let method = function.child_by_field_name("attribute")?;
        let is_list_method = matches!(Self::text(&method, src), "extend" | "append");
        (Self::is_all(&object, src) && is_list_method)
            .then(|| call.child_by_field_name("arguments"))
            .flatten()
    }

    fn collect_strings(node: &Node<'_>, src: &[u8], names: &mut Vec<String>) {
        match node.kind() {
            "string" => names.extend(Self::string_value(node, src)),
            "concatenated_string" => {
                let mut cursor = node.walk();
                let joined: String = node
                    .named_children(&mut cursor)
                    .filter_map(|part| Self::string_value(&part, src))
                    .collect();
                names.push(joined);
            }
            "list" | "tuple" | "set" | "expression_list" | "parenthesized_expression"
            | "binary_operator" | "argument_list" => {
                let mut cursor = node.walk();
                for child in node.named_children(&mut cursor) {
                    Self::collect_strings(&child, src, names);
                }
            }
            _ => {}
        }
    }

    /// Contents of a string literal, without prefix and quotes.
    fn string_value(node: &Node<'_>, src: &[u8]) -> Option<String> {
        let body = Self::text(node, src).trim_start_matches(|c: char| c.is_ascii_alphabetic());
        ["\"\"\"", "'''", "\"", "'"].iter().find_map(|quote| {
            body.strip_prefix(quote)
                .and_then(|rest| rest.strip_suffix(quote))
                .map(String::from)
        })
    }
}
