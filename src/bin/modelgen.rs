//! CLI for generating and post-processing ORM model files.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use modelgen::prelude::*;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "modelgen")]
#[command(author, version, about = "Generate SQLAlchemy models and document them", long_about = None)]
struct Cli {
    /// Configuration file (YAML, or JSON with a .json extension)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run sqlacodegen and write the model file
    Generate {
        /// Model file to write
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Rename the base class and add table docstrings to a model file
    Rewrite {
        /// Model file to rewrite in place
        file: Option<PathBuf>,

        #[command(flatten)]
        options: RewriteArgs,
    },

    /// Generate the model file, then rewrite it
    Run {
        /// Model file to write
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        options: RewriteArgs,
    },

    /// Print the effective configuration
    ShowConfig,
}

#[derive(Args)]
struct RewriteArgs {
    /// Mapping file of table name to description (JSON or YAML)
    #[arg(short, long, conflicts_with = "descriptions_url")]
    descriptions: Option<PathBuf>,

    /// URL serving a JSON mapping of table name to description
    #[arg(long)]
    descriptions_url: Option<String>,

    /// Name for the generated base class
    #[arg(long)]
    base_class_name: Option<String>,

    /// Docstring text for the base class
    #[arg(long)]
    base_class_desc: Option<String>,

    /// Documentation URL used for docstring links
    #[arg(long)]
    base_doc_url: Option<String>,

    /// Preview changes without applying
    #[arg(long)]
    dry_run: bool,
}

impl RewriteArgs {
    fn apply_to(&self, config: &mut Config) {
        if let Some(path) = &self.descriptions {
            config.descriptions = DescriptionsConfig::File { path: path.clone() };
        }
        if let Some(url) = &self.descriptions_url {
            config.descriptions = DescriptionsConfig::Remote {
                url: Some(url.clone()),
            };
        }
        if let Some(name) = &self.base_class_name {
            config.rewrite.base_class_name = name.clone();
        }
        if let Some(desc) = &self.base_class_desc {
            config.rewrite.base_class_desc = desc.clone();
        }
        if let Some(url) = &self.base_doc_url {
            config.rewrite.base_doc_url = url.clone();
        }
    }
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => Config::default(),
    };

    match cli.command {
        Commands::Generate { output } => {
            if let Some(output) = output {
                config.output_file = output;
            }
            cmd_generate(&config)
        }
        Commands::Rewrite { file, options } => {
            if let Some(file) = file {
                config.output_file = file;
            }
            options.apply_to(&mut config);
            cmd_rewrite(&config, options.dry_run, false)
        }
        Commands::Run { output, options } => {
            if let Some(output) = output {
                config.output_file = output;
            }
            options.apply_to(&mut config);
            cmd_rewrite(&config, options.dry_run, true)
        }
        Commands::ShowConfig => cmd_show_config(&config),
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("modelgen=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_generate(config: &Config) -> Result<()> {
    ModelPipeline::new(config)
        .generate()
        .context("Model generation failed")?;
    println!("==> Wrote model to {} <==", config.output_file.display());
    Ok(())
}

fn cmd_rewrite(config: &Config, dry_run: bool, generate_first: bool) -> Result<()> {
    let mut pipeline = ModelPipeline::new(config);
    if dry_run {
        pipeline = pipeline.dry_run();
    }

    let source = config.descriptions.source();
    let change = if generate_first {
        pipeline.run(source.as_ref())
    } else {
        pipeline.rewrite(source.as_ref())
    }
    .map_err(|e| {
        let kind = e.kind();
        anyhow::Error::new(e).context(format!(
            "Rewriting {} failed ({kind})",
            config.output_file.display()
        ))
    })?;

    if dry_run {
        println!("{}", change.colorized_diff());
        println!("\n{}", change.summary());
    } else if change.is_modified() {
        println!("Rewrote {} ({})", change.path.display(), change.summary());
    } else {
        println!("{} is already up to date", change.path.display());
    }

    Ok(())
}

fn cmd_show_config(config: &Config) -> Result<()> {
    print!("{}", config.to_yaml_string()?);
    Ok(())
}
