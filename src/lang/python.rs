//! Python, the dialect sqlacodegen emits.

use super::Language;
use tree_sitter::{Language as TsLanguage, Node};

/// Python source, parsed with the tree-sitter grammar.
pub struct Python;

impl Python {
    /// Returns true if `name` is a valid (ASCII) Python identifier that is not a keyword.
    pub fn is_identifier(name: &str) -> bool {
        let mut chars = name.chars();
        let starts_ok = chars
            .next()
            .is_some_and(|c| c == '_' || c.is_ascii_alphabetic());
        starts_ok
            && chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
            && !KEYWORDS.contains(&name)
    }
}

const KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global",
    "if", "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return",
    "try", "while", "with", "yield",
];

impl Language for Python {
    fn name(&self) -> &'static str {
        "python"
    }

    fn extensions(&self) -> &[&'static str] {
        &["py", "pyi"]
    }

    fn grammar(&self) -> TsLanguage {
        tree_sitter_python::LANGUAGE.into()
    }

    fn rejects(&self, node: Node<'_>) -> Option<&'static str> {
        match node.kind() {
            // the grammar still accepts Python 2 statements
            "print_statement" => Some("Python 2 print statement"),
            "exec_statement" => Some("Python 2 exec statement"),
            "block" if !has_statement(node) => Some("expected an indented block"),
            _ => None,
        }
    }
}

fn has_statement(block: Node<'_>) -> bool {
    let mut cursor = block.walk();
    block
        .named_children(&mut cursor)
        .any(|child| child.kind() != "comment")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ModelgenError;
    use std::path::Path;

    fn parse_error(source: &str) -> String {
        match Python.parse(source, Path::new("model.py")) {
            Err(ModelgenError::Parse { message, .. }) => message,
            other => panic!("expected a parse error for {source:?}, got {other:?}"),
        }
    }

    #[test]
    fn test_python2_statements_are_rejected() {
        assert!(parse_error("print \"x\"\n").contains("print statement"));
        assert!(parse_error("exec \"x = 1\"\n").contains("exec statement"));
        assert!(parse_error("class A(Base):\n    print 'hi'\n").contains("print statement"));
    }

    #[test]
    fn test_python3_calls_are_accepted() {
        let source = "print(\"x\")\nexec(\"x = 1\")\n";
        assert!(Python.parse(source, Path::new("model.py")).is_ok());
    }

    #[test]
    fn test_unindented_body_is_rejected() {
        assert!(parse_error("class A(Base):\nx = 1\n").contains("indented block"));
        assert!(parse_error("if True:\nx = 1\n").contains("indented block"));
    }

    #[test]
    fn test_is_identifier() {
        assert!(Python::is_identifier("OMOPCDMModelBase"));
        assert!(Python::is_identifier("_Base2"));
        assert!(!Python::is_identifier("2Base"));
        assert!(!Python::is_identifier("Model Base"));
        assert!(!Python::is_identifier("class"));
        assert!(!Python::is_identifier(""));
    }
}
