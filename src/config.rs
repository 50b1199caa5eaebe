//! Serializable configuration for generating and rewriting a model file.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::describe::{DescriptionSource, MappingFile, RemoteMapping};
use crate::error::{ModelgenError, Result};
use crate::generate::GeneratorConfig;
use crate::lang::Python;
use crate::rewrite::RewriteConfig;

/// Where table descriptions come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DescriptionsConfig {
    /// A local JSON or YAML mapping file.
    File { path: PathBuf },
    /// A JSON mapping fetched over HTTP; defaults to the documentation URL.
    Remote {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        url: Option<String>,
    },
}

impl Default for DescriptionsConfig {
    fn default() -> Self {
        DescriptionsConfig::Remote { url: None }
    }
}

impl DescriptionsConfig {
    /// Builds the description source this configuration names.
    pub fn source(&self) -> Box<dyn DescriptionSource> {
        match self {
            DescriptionsConfig::File { path } => Box::new(MappingFile::new(path)),
            DescriptionsConfig::Remote { url: Some(url) } => {
                Box::new(RemoteMapping::new().url(url))
            }
            DescriptionsConfig::Remote { url: None } => Box::new(RemoteMapping::new()),
        }
    }
}

/// The complete modelgen configuration.
///
/// # Example YAML
///
/// ```yaml
/// output_file: model.py
/// rewrite:
///   base_class_name: OMOPCDMModelBase
///   base_class_desc: Base class for the OMOP CDM tables
///   base_doc_url: https://ohdsi.github.io/CommonDataModel/cdm54.html
/// descriptions:
///   type: file
///   path: descriptions.yaml
/// generator:
///   db_host: localhost
///   db_name: cdm
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Model file written by the generator and rewritten in place.
    pub output_file: PathBuf,

    pub rewrite: RewriteConfig,

    pub descriptions: DescriptionsConfig,

    pub generator: GeneratorConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_file: PathBuf::from("model.py"),
            rewrite: RewriteConfig::default(),
            descriptions: DescriptionsConfig::default(),
            generator: GeneratorConfig::default(),
        }
    }
}

impl Config {
    /// Load config from a file, as JSON for `.json` and YAML otherwise.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));

        if is_json {
            Self::from_json(path)
        } else {
            Self::from_yaml(path)
        }
    }

    /// Load config from a YAML file.
    pub fn from_yaml(path: impl AsRef<Path>) -> Result<Self> {
        let content = read_config(path.as_ref())?;
        serde_yaml::from_str(&content).map_err(|e| {
            ModelgenError::InvalidConfig(format!("Failed to parse YAML config: {}", e))
        })
    }

    /// Load config from a JSON file.
    pub fn from_json(path: impl AsRef<Path>) -> Result<Self> {
        let content = read_config(path.as_ref())?;
        serde_json::from_str(&content).map_err(|e| {
            ModelgenError::InvalidConfig(format!("Failed to parse JSON config: {}", e))
        })
    }

    /// Serialize the config as YAML.
    pub fn to_yaml_string(&self) -> Result<String> {
        serde_yaml::to_string(self)
            .map_err(|e| ModelgenError::InvalidConfig(format!("Failed to serialize config: {}", e)))
    }

    /// Checks the settings the rewriter relies on.
    pub fn validate(&self) -> Result<()> {
        let name = &self.rewrite.base_class_name;
        if !Python::is_identifier(name) {
            return Err(ModelgenError::InvalidConfig(format!(
                "base_class_name '{name}' is not a valid Python identifier"
            )));
        }

        url::Url::parse(&self.rewrite.base_doc_url).map_err(|e| {
            ModelgenError::InvalidConfig(format!(
                "base_doc_url '{}' is not a valid URL: {e}",
                self.rewrite.base_doc_url
            ))
        })?;

        if self.output_file.as_os_str().is_empty() {
            return Err(ModelgenError::InvalidConfig(
                "output_file must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

fn read_config(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| {
        ModelgenError::Io(std::io::Error::new(
            e.kind(),
            format!("Failed to read config file: {}", e),
        ))
    })
}
