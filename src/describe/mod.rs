//! Table descriptions used for model docstrings.
//!
//! A [`DescriptionMap`] maps snake_case table identifiers (`condition_era`)
//! to free-text descriptions. It is built once, before rewriting, by a
//! [`DescriptionSource`].

use crate::error::{ModelgenError, Result};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::{debug, info};

/// Table identifier → description.
pub type DescriptionMap = BTreeMap<String, String>;

/// Something that can produce the description map for a documentation page.
pub trait DescriptionSource {
    /// Resolves descriptions for the documentation at `base_doc_url`.
    fn resolve(&self, base_doc_url: &str) -> Result<DescriptionMap>;

    /// Returns a description of where descriptions come from.
    fn describe(&self) -> String;
}

impl DescriptionSource for DescriptionMap {
    fn resolve(&self, _base_doc_url: &str) -> Result<DescriptionMap> {
        Ok(self.clone())
    }

    fn describe(&self) -> String {
        format!("{} in-memory description(s)", self.len())
    }
}

/// Lowercases keys so that `CONDITION_ERA` and `condition_era` both match,
/// and trims surrounding whitespace from descriptions.
pub fn normalize(raw: BTreeMap<String, String>) -> Result<DescriptionMap> {
    let mut map = DescriptionMap::new();
    for (key, description) in raw {
        let normalized = key.trim().to_lowercase();
        if map
            .insert(normalized.clone(), description.trim().to_string())
            .is_some()
        {
            return Err(ModelgenError::InvalidConfig(format!(
                "Duplicate description for table '{normalized}'"
            )));
        }
    }
    Ok(map)
}

/// Descriptions stored in a local JSON or YAML file.
///
/// Files ending in `.json` are read as JSON; anything else as YAML.
///
/// ```yaml
/// condition_era: A Condition Era is defined as a span of time ...
/// person: This table serves as the central identity management ...
/// ```
#[derive(Debug, Clone)]
pub struct MappingFile {
    path: PathBuf,
}

impl MappingFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Parses mapping file contents.
    pub fn parse(content: &str, json: bool) -> Result<DescriptionMap> {
        let raw: BTreeMap<String, String> = if json {
            serde_json::from_str(content)?
        } else {
            serde_yaml::from_str(content)?
        };
        normalize(raw)
    }

    fn is_json(&self) -> bool {
        self.path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"))
    }
}

impl DescriptionSource for MappingFile {
    fn resolve(&self, _base_doc_url: &str) -> Result<DescriptionMap> {
        let content = std::fs::read_to_string(&self.path).map_err(|e| {
            ModelgenError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read descriptions {}: {}", self.path.display(), e),
            ))
        })?;

        let map = Self::parse(&content, self.is_json())?;
        info!(path = %self.path.display(), tables = map.len(), "loaded table descriptions");
        Ok(map)
    }

    fn describe(&self) -> String {
        format!("descriptions from {}", self.path.display())
    }
}

/// Descriptions served as a JSON object over HTTP.
///
/// Without an explicit URL the documentation URL itself is fetched.
#[derive(Debug, Clone, Default)]
pub struct RemoteMapping {
    url: Option<String>,
}

impl RemoteMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetches from `url` instead of the documentation URL.
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    fn target<'a>(&'a self, base_doc_url: &'a str) -> &'a str {
        self.url.as_deref().unwrap_or(base_doc_url)
    }

    /// Parses a fetched body. Anything but a JSON object of strings (such as
    /// the HTML documentation page itself) is a configuration error.
    fn parse_body(url: &str, body: &str) -> Result<DescriptionMap> {
        let raw: BTreeMap<String, String> = serde_json::from_str(body).map_err(|e| {
            ModelgenError::InvalidConfig(format!(
                "{url} did not return a JSON object of table descriptions ({e}); \
                 set `descriptions` to a mapping file or a JSON URL"
            ))
        })?;
        normalize(raw)
    }
}

impl DescriptionSource for RemoteMapping {
    fn resolve(&self, base_doc_url: &str) -> Result<DescriptionMap> {
        let url = self.target(base_doc_url);
        debug!(%url, "fetching table descriptions");

        let body = reqwest::blocking::get(url)?.error_for_status()?.text()?;

        let map = Self::parse_body(url, &body)?;
        info!(%url, tables = map.len(), "fetched table descriptions");
        Ok(map)
    }

    fn describe(&self) -> String {
        match &self.url {
            Some(url) => format!("descriptions from {url}"),
            None => "descriptions from the documentation URL".to_string(),
        }
    }
}
