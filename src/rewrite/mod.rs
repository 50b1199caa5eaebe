//! The model rewriter: base class renaming and table docstrings.
//!
//! For every class definition in a generated module the rewriter
//!
//! 1. renames the generated `Base` class to the configured base class name,
//! 2. points the first base of every other class at that name,
//! 3. replaces or inserts the class docstring with the table description
//!    and a link into the documentation.
//!
//! ```rust
//! use modelgen::prelude::*;
//!
//! let config = RewriteConfig::new("OMOPCDMModelBase", "Base class.", "https://example.org/cdm");
//! let mut descriptions = DescriptionMap::new();
//! descriptions.insert("person".to_string(), "People.".to_string());
//!
//! let source = "class Base(DeclarativeBase):\n    pass\n\n\nclass Person(Base):\n    person_id = 1\n";
//! let rewritten = rewrite(source, &config, &descriptions)?;
//!
//! assert!(rewritten.contains("class Person(OMOPCDMModelBase):"));
//! assert!(rewritten.contains("https://example.org/cdm#PERSON"));
//! # Ok::<(), modelgen::error::ModelgenError>(())
//! ```

mod docstring;

pub use docstring::{CleanDocstring, DocstringAccessor, DocstringSpec};

use crate::case::camel_to_snake;
use crate::describe::DescriptionMap;
use crate::error::{ModelgenError, Result};
use crate::syntax::{BaseRef, ClassNode, StringLiteral, SyntaxTree, clean_docstring};
use crate::transform::Transform;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Name of the base class emitted by sqlacodegen.
pub const GENERATED_BASE_NAME: &str = "Base";

pub const DEFAULT_BASE_CLASS_NAME: &str = "OMOPCDMModelBase";
pub const DEFAULT_BASE_CLASS_DESC: &str = "Base class for the OMOP Common Data Model v5.4 tables";
pub const DEFAULT_BASE_DOC_URL: &str = "https://ohdsi.github.io/CommonDataModel/cdm54.html";

/// Settings for one rewrite pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewriteConfig {
    /// Name given to the generated base class.
    pub base_class_name: String,

    /// Docstring text for the base class.
    pub base_class_desc: String,

    /// Documentation page; table anchors are appended as `#TABLE_NAME`.
    pub base_doc_url: String,
}

impl Default for RewriteConfig {
    fn default() -> Self {
        Self {
            base_class_name: DEFAULT_BASE_CLASS_NAME.to_string(),
            base_class_desc: DEFAULT_BASE_CLASS_DESC.to_string(),
            base_doc_url: DEFAULT_BASE_DOC_URL.to_string(),
        }
    }
}

impl RewriteConfig {
    pub fn new(
        base_class_name: impl Into<String>,
        base_class_desc: impl Into<String>,
        base_doc_url: impl Into<String>,
    ) -> Self {
        Self {
            base_class_name: base_class_name.into(),
            base_class_desc: base_class_desc.into(),
            base_doc_url: base_doc_url.into(),
        }
    }
}

/// Rewrites generated model source.
///
/// Fails with [`ModelgenError::Parse`] on invalid source,
/// [`ModelgenError::Lookup`] when a model class has no description and
/// [`ModelgenError::InvariantViolation`] when an existing docstring does not
/// agree with the class's first statement.
pub fn rewrite(source: &str, config: &RewriteConfig, descriptions: &DescriptionMap) -> Result<String> {
    ModelRewriter::new(config, descriptions).rewrite(source)
}

/// Class visitor applying the rename and docstring rules.
pub struct ModelRewriter<'a, A = CleanDocstring> {
    config: &'a RewriteConfig,
    descriptions: &'a DescriptionMap,
    accessor: A,
}

impl<'a> ModelRewriter<'a> {
    /// Creates a rewriter reading docstrings with [`CleanDocstring`].
    pub fn new(config: &'a RewriteConfig, descriptions: &'a DescriptionMap) -> Self {
        Self {
            config,
            descriptions,
            accessor: CleanDocstring,
        }
    }
}

impl<'a, A: DocstringAccessor> ModelRewriter<'a, A> {
    /// Replaces the docstring accessor.
    pub fn with_accessor<B: DocstringAccessor>(self, accessor: B) -> ModelRewriter<'a, B> {
        ModelRewriter {
            config: self.config,
            descriptions: self.descriptions,
            accessor,
        }
    }

    /// Rewrites `source`, naming `<source>` in parse errors.
    pub fn rewrite(&self, source: &str) -> Result<String> {
        self.rewrite_with_path(source, Path::new("<source>"))
    }

    /// Rewrites `source`, naming `path` in parse errors.
    pub fn rewrite_with_path(&self, source: &str, path: &Path) -> Result<String> {
        let mut tree = SyntaxTree::parse_with_path(source, path)?;
        for class in tree.classes_mut() {
            self.visit_class(class)?;
        }
        Ok(tree.to_source())
    }

    /// Applies the rules to one class.
    pub fn visit_class(&self, class: &mut ClassNode) -> Result<()> {
        debug!(class = %class.name, "visiting class");
        let base_name = &self.config.base_class_name;

        if class.name == GENERATED_BASE_NAME {
            class.name = base_name.clone();
        }

        if !class.bases.is_empty() && class.name != *base_name {
            class.bases[0] = BaseRef::name(base_name);
        }

        let content = self.docstring_spec(class)?.content();
        self.place_docstring(class, content)
    }

    /// Computes the docstring a class should carry.
    pub fn docstring_spec(&self, class: &ClassNode) -> Result<DocstringSpec> {
        if class.name == self.config.base_class_name {
            return Ok(DocstringSpec::Base {
                description: self.config.base_class_desc.clone(),
                url: self.config.base_doc_url.clone(),
            });
        }

        let key = camel_to_snake(&class.name);
        let description = self
            .descriptions
            .get(&key)
            .ok_or_else(|| ModelgenError::Lookup {
                class: class.name.clone(),
                key: key.clone(),
            })?;

        Ok(DocstringSpec::Model {
            description: description.clone(),
            url: self.config.base_doc_url.clone(),
            fragment: key.to_uppercase(),
        })
    }

    fn place_docstring(&self, class: &mut ClassNode, content: String) -> Result<()> {
        let Some(current) = self.accessor.docstring(class) else {
            class.insert_string(0, StringLiteral::new(content));
            return Ok(());
        };

        let literal = class
            .leading_string()
            .map(|l| clean_docstring(l.value()))
            .unwrap_or_default();
        if current.trim() != literal.trim() {
            return Err(ModelgenError::InvariantViolation {
                class: class.name.clone(),
                accessor: current.trim().to_string(),
                literal: literal.trim().to_string(),
            });
        }

        match class.body_mut().first_mut().and_then(|s| s.string_literal_mut()) {
            Some(existing) => existing.set_value(content),
            None => class.insert_string(0, StringLiteral::new(content)),
        }
        Ok(())
    }
}

impl<A: DocstringAccessor> Transform for ModelRewriter<'_, A> {
    fn apply(&self, source: &str, path: &Path) -> Result<String> {
        self.rewrite_with_path(source, path)
    }

    fn describe(&self) -> String {
        format!(
            "rename base class to '{}' and document {} table(s) from {}",
            self.config.base_class_name,
            self.descriptions.len(),
            self.config.base_doc_url
        )
    }
}
