//! Docstring content and the accessor used to read existing docstrings.

use crate::syntax::{ClassNode, clean_docstring};

/// Reads a class's docstring the way documentation tooling sees it.
pub trait DocstringAccessor {
    /// Returns the docstring, or `None` if the class has none.
    fn docstring(&self, class: &ClassNode) -> Option<String>;
}

/// The first body statement, when it is a bare string literal, with the
/// common indentation of its continuation lines removed.
#[derive(Debug, Default, Clone, Copy)]
pub struct CleanDocstring;

impl DocstringAccessor for CleanDocstring {
    fn docstring(&self, class: &ClassNode) -> Option<String> {
        class
            .leading_string()
            .map(|literal| clean_docstring(literal.value()))
    }
}

/// The docstring a class should carry after rewriting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocstringSpec {
    /// The shared base class: its description and the documentation page.
    Base { description: String, url: String },
    /// A table class: the table description and a link to its section.
    Model {
        description: String,
        url: String,
        fragment: String,
    },
}

impl DocstringSpec {
    /// The docstring value: the description and link, each followed by a
    /// blank-line separator, after a leading newline.
    ///
    /// Whitespace-only lines of the description are emptied, since docstring
    /// readers drop that whitespace.
    pub fn content(&self) -> String {
        match self {
            DocstringSpec::Base { description, url } => {
                format!("\n{}\n\n{url}\n", blank_empty_lines(description))
            }
            DocstringSpec::Model {
                description,
                url,
                fragment,
            } => format!("\n{}\n\n{url}#{fragment}\n", blank_empty_lines(description)),
        }
    }
}

fn blank_empty_lines(text: &str) -> String {
    text.split('\n')
        .map(|line| if line.trim().is_empty() { "" } else { line })
        .collect::<Vec<_>>()
        .join("\n")
}
