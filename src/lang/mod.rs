//! Language abstraction over tree-sitter grammars.

mod python;

pub use python::Python;

use crate::error::{ModelgenError, Result};
use std::path::Path;
use tree_sitter::{Language as TsLanguage, Node, Parser, Tree};

/// A source language the rewriter can parse.
pub trait Language: Send + Sync {
    /// Returns the name of the language.
    fn name(&self) -> &'static str;

    /// Returns the file extensions associated with this language.
    fn extensions(&self) -> &[&'static str];

    /// Returns the tree-sitter language grammar.
    fn grammar(&self) -> TsLanguage;

    /// Describes why `node` is invalid, for constructs the grammar accepts
    /// but the language itself does not.
    fn rejects(&self, _node: Node<'_>) -> Option<&'static str> {
        None
    }

    /// Parses source code into a tree-sitter AST.
    ///
    /// Unlike a plain tree-sitter parse, a tree containing `ERROR` or
    /// `MISSING` nodes, or a node [`Language::rejects`], is an error
    /// reported at the position of the first one.
    fn parse(&self, source: &str, path: &Path) -> Result<Tree> {
        let mut parser = Parser::new();
        parser
            .set_language(&self.grammar())
            .map_err(|e| ModelgenError::Parse {
                path: path.to_path_buf(),
                message: format!("Failed to set language: {e}"),
            })?;

        let tree = parser
            .parse(source, None)
            .ok_or_else(|| ModelgenError::Parse {
                path: path.to_path_buf(),
                message: "Failed to parse source".to_string(),
            })?;

        let invalid = match first_error(tree.root_node()) {
            Some(node) if node.is_missing() => Some((node, format!("missing '{}'", node.kind()))),
            Some(node) => Some((node, "invalid syntax".to_string())),
            None => first_rejected(self, tree.root_node())
                .map(|(node, what)| (node, what.to_string())),
        };

        if let Some((node, what)) = invalid {
            let pos = node.start_position();
            return Err(ModelgenError::Parse {
                path: path.to_path_buf(),
                message: format!("{what} at line {}, column {}", pos.row + 1, pos.column + 1),
            });
        }

        Ok(tree)
    }

    /// Checks if this language handles the given file extension.
    fn matches_extension(&self, ext: &str) -> bool {
        self.extensions().iter().any(|e| e.eq_ignore_ascii_case(ext))
    }
}

/// Finds the first node the language rejects, in document order.
fn first_rejected<'t, L: Language + ?Sized>(
    language: &L,
    node: Node<'t>,
) -> Option<(Node<'t>, &'static str)> {
    if let Some(what) = language.rejects(node) {
        return Some((node, what));
    }
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if let Some(found) = first_rejected(language, child) {
            return Some(found);
        }
    }
    None
}

/// Finds the first `ERROR` or `MISSING` node in document order.
fn first_error(node: Node<'_>) -> Option<Node<'_>> {
    if !node.has_error() {
        return None;
    }
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if let Some(found) = first_error(child) {
            return Some(found);
        }
    }
    Some(node)
}
