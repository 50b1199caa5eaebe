//! Running sqlacodegen to produce the initial model file.

use crate::error::{ModelgenError, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::info;

/// Connection and invocation settings for sqlacodegen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Path to the sqlacodegen executable.
    pub command: String,

    pub db_host: String,
    pub db_port: u16,
    pub db_name: String,
    pub db_user: String,
    pub db_password: String,

    /// Value for `--options`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<String>,

    /// Value for `--generator`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generator: Option<String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            command: "/usr/local/bin/sqlacodegen".to_string(),
            db_host: "localhost".to_string(),
            db_port: 5432,
            db_name: "postgres".to_string(),
            db_user: "postgres".to_string(),
            db_password: "postgres".to_string(),
            options: None,
            generator: None,
        }
    }
}

impl GeneratorConfig {
    /// The database URL passed to sqlacodegen.
    pub fn database_url(&self) -> String {
        format!(
            "postgresql://{}:{}@{}:{}/{}",
            self.db_user, self.db_password, self.db_host, self.db_port, self.db_name
        )
    }

    /// The database URL with the password masked, for logs.
    pub fn redacted_url(&self) -> String {
        format!(
            "postgresql://{}:***@{}:{}/{}",
            self.db_user, self.db_host, self.db_port, self.db_name
        )
    }

    /// Arguments following the command name.
    pub fn args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(generator) = &self.generator {
            args.push("--generator".to_string());
            args.push(generator.clone());
        }
        if let Some(options) = &self.options {
            args.push("--options".to_string());
            args.push(options.clone());
        }
        args.push(self.database_url());
        args
    }
}

/// Runs the model generator, capturing its output in a file.
pub struct Generator<'a> {
    config: &'a GeneratorConfig,
}

impl<'a> Generator<'a> {
    pub fn new(config: &'a GeneratorConfig) -> Self {
        Self { config }
    }

    /// Builds the generator command with stdout going to `output`.
    pub fn command(&self, output: File) -> Command {
        let mut command = Command::new(&self.config.command);
        command
            .args(self.config.args())
            .stdin(Stdio::null())
            .stdout(Stdio::from(output));
        command
    }

    /// Runs the generator and writes the model to `output_file`.
    pub fn run(&self, output_file: &Path) -> Result<()> {
        let output = File::create(output_file)?;
        info!(
            command = %self.config.command,
            database = %self.config.redacted_url(),
            "running model generator"
        );

        let status = self
            .command(output)
            .status()
            .map_err(|e| ModelgenError::Generator {
                message: format!("failed to start {}: {e}", self.config.command),
            })?;

        if !status.success() {
            return Err(ModelgenError::Generator {
                message: format!("{} exited with {status}", self.config.command),
            });
        }

        info!(path = %output_file.display(), "wrote model");
        Ok(())
    }
}
