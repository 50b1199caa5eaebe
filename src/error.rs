//! Error types for the model post-processor.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for model generation and rewriting.
#[derive(Error, Debug)]
pub enum ModelgenError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Parse error in {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("No description for class {class}: key '{key}' is missing from the description map")]
    Lookup { class: String, key: String },

    #[error(
        "Docstring of class {class} is not the first body statement: {accessor:?} vs {literal:?}"
    )]
    InvariantViolation {
        class: String,
        accessor: String,
        literal: String,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Model generator failed: {message}")]
    Generator { message: String },
}

impl ModelgenError {
    /// Short name of the failure kind, used in CLI diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            ModelgenError::Io(_) => "io",
            ModelgenError::Json(_) => "json",
            ModelgenError::Yaml(_) => "yaml",
            ModelgenError::Http(_) => "http",
            ModelgenError::Parse { .. } => "parse",
            ModelgenError::Lookup { .. } => "lookup",
            ModelgenError::InvariantViolation { .. } => "invariant-violation",
            ModelgenError::InvalidConfig(_) => "config",
            ModelgenError::Generator { .. } => "generator",
        }
    }
}

/// A specialized Result type for modelgen operations.
pub type Result<T> = std::result::Result<T, ModelgenError>;
