//! # modelgen
//!
//! Post-processing for SQLAlchemy models generated by `sqlacodegen`.
//!
//! The generator emits one `Base` class and a class per table. This crate
//! rewrites that output so that:
//! - the base class gets a project-specific name,
//! - every table class inherits from that name,
//! - every class carries a docstring with the table's description and a link
//!   to its section in the data model documentation.
//!
//! ## Quick Start
//!
//! ```rust
//! use modelgen::prelude::*;
//!
//! let config = RewriteConfig::new(
//!     "OMOPCDMModelBase",
//!     "Base class for OMOP CDM tables",
//!     "https://example.org/cdm",
//! );
//! let descriptions = DescriptionMap::from([(
//!     "condition_era".to_string(),
//!     "Records of condition eras.".to_string(),
//! )]);
//!
//! let source = "class Base(DeclarativeBase):\n    pass\n\n\nclass ConditionEra(Base):\n    condition_era_id = 1\n";
//! let rewritten = rewrite(source, &config, &descriptions)?;
//!
//! assert!(rewritten.contains("class ConditionEra(OMOPCDMModelBase):"));
//! assert!(rewritten.contains("https://example.org/cdm#CONDITION_ERA"));
//! # Ok::<(), modelgen::error::ModelgenError>(())
//! ```
//!
//! ## Rewriting a file
//!
//! ```rust,no_run
//! use modelgen::prelude::*;
//!
//! let config = Config::load("modelgen.yaml")?;
//! let descriptions = MappingFile::new("descriptions.yaml");
//!
//! let change = ModelPipeline::new(&config).dry_run().rewrite(&descriptions)?;
//! println!("{}", change.diff());
//! # Ok::<(), modelgen::error::ModelgenError>(())
//! ```

pub mod case;
pub mod config;
pub mod describe;
pub mod diff;
pub mod error;
pub mod generate;
pub mod lang;
pub mod pipeline;
pub mod rewrite;
pub mod syntax;
pub mod transform;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::case::camel_to_snake;
    pub use crate::config::{Config, DescriptionsConfig};
    pub use crate::describe::{DescriptionMap, DescriptionSource, MappingFile, RemoteMapping};
    pub use crate::diff::DiffSummary;
    pub use crate::error::{ModelgenError, Result};
    pub use crate::generate::{Generator, GeneratorConfig};
    pub use crate::lang::{Language, Python};
    pub use crate::pipeline::ModelPipeline;
    pub use crate::rewrite::{
        CleanDocstring, DocstringAccessor, DocstringSpec, ModelRewriter, RewriteConfig, rewrite,
    };
    pub use crate::syntax::{BaseRef, ClassNode, Statement, StatementKind, StringLiteral, SyntaxTree};
    pub use crate::transform::{FileChange, Transform};
}

pub use prelude::*;
