//! Main entry point: generate the model file, then rewrite it in place.

use crate::config::Config;
use crate::describe::DescriptionSource;
use crate::error::Result;
use crate::generate::Generator;
use crate::lang::{Language, Python};
use crate::rewrite::ModelRewriter;
use crate::transform::{FileChange, Transform};
use tracing::{info, warn};

/// Generation and rewriting of one model file.
pub struct ModelPipeline<'a> {
    config: &'a Config,
    dry_run: bool,
}

impl<'a> ModelPipeline<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self {
            config,
            dry_run: false,
        }
    }

    /// Computes the rewrite without writing the file.
    pub fn dry_run(mut self) -> Self {
        self.dry_run = true;
        self
    }

    /// Runs the model generator into the configured output file.
    pub fn generate(&self) -> Result<()> {
        self.config.validate()?;
        Generator::new(&self.config.generator).run(&self.config.output_file)
    }

    /// Rewrites the configured output file.
    ///
    /// Descriptions are resolved once before any class is visited. On error
    /// the file is not modified.
    pub fn rewrite(&self, descriptions: &dyn DescriptionSource) -> Result<FileChange> {
        self.config.validate()?;
        let rewrite = &self.config.rewrite;
        let output = &self.config.output_file;

        let is_python = output
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| Python.matches_extension(e));
        if !is_python {
            warn!(path = %output.display(), "model file does not have a Python extension");
        }

        info!(source = %descriptions.describe(), "resolving table descriptions");
        let map = descriptions.resolve(&rewrite.base_doc_url)?;

        let rewriter = ModelRewriter::new(rewrite, &map);
        info!(path = %output.display(), "{}", rewriter.describe());
        let change = FileChange::compute(output, &rewriter)?;

        if !self.dry_run {
            change.apply()?;
        }
        Ok(change)
    }

    /// Generates the model file and then rewrites it.
    pub fn run(&self, descriptions: &dyn DescriptionSource) -> Result<FileChange> {
        self.generate()?;
        self.rewrite(descriptions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::describe::DescriptionMap;
    use std::fs;

    fn config_for(path: &std::path::Path) -> Config {
        Config {
            output_file: path.to_path_buf(),
            ..Default::default()
        }
    }

    #[test]
    fn test_rewrite_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.py");
        fs::write(&path, "class Person(Base):\n    person_id = 1\n").unwrap();
        let descriptions = DescriptionMap::from([("person".to_string(), "People.".to_string())]);

        let config = config_for(&path);
        let change = ModelPipeline::new(&config).rewrite(&descriptions).unwrap();

        assert!(change.is_modified());
        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(written, change.transformed);
        assert!(written.starts_with("class Person(OMOPCDMModelBase):\n    \"\"\"\n    People.\n"));
    }

    #[test]
    fn test_dry_run_leaves_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.py");
        let source = "class Person(Base):\n    person_id = 1\n";
        fs::write(&path, source).unwrap();
        let descriptions = DescriptionMap::from([("person".to_string(), "People.".to_string())]);

        let config = config_for(&path);
        let change = ModelPipeline::new(&config)
            .dry_run()
            .rewrite(&descriptions)
            .unwrap();

        assert!(change.diff().contains("+class Person(OMOPCDMModelBase):"));
        assert_eq!(fs::read_to_string(&path).unwrap(), source);
    }

    #[test]
    fn test_invalid_config_is_rejected_before_reading() {
        let mut config = config_for(std::path::Path::new("/nonexistent/model.py"));
        config.rewrite.base_class_name = "not valid".to_string();

        let err = ModelPipeline::new(&config)
            .rewrite(&DescriptionMap::new())
            .unwrap_err();
        assert!(matches!(err, crate::error::ModelgenError::InvalidConfig(_)));
    }
}
