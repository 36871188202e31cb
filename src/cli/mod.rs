pub mod completions;
pub mod init;
pub mod migrate;
pub mod report;
pub mod slice;
pub mod validate;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::discovery::{MigrationConfig, CONFIG_FILENAME};
use crate::error::Result;
use crate::output::{display_path, Printer};

/// assetmig - Raw 2D asset extraction to engine-ready resources
#[derive(Parser, Debug)]
#[command(name = "assetmig")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Print extra detail (build notes, per-file results)
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Suppress log output
    #[arg(long, short, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the full migration: validate, copy, slice, animate, report
    Migrate(migrate::MigrateArgs),

    /// Check an extraction root before migrating
    Validate(validate::ValidateArgs),

    /// Rebuild the migration report from an output root
    Report(report::ReportArgs),

    /// Slice a single sprite sheet into frames
    Slice(slice::SliceArgs),

    /// Initialize a migration project (generates assetmig.yaml)
    Init(init::InitArgs),

    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

/// Options shared by the commands that read assetmig.yaml.
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// Configuration file (default: ./assetmig.yaml if present)
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Extraction root, overriding the configuration
    #[arg(long, short)]
    pub input: Option<PathBuf>,

    /// Output root, overriding the configuration
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

impl ConfigArgs {
    /// Load the configuration and apply command-line overrides.
    pub fn load(&self, printer: &Printer) -> Result<MigrationConfig> {
        let mut config = match &self.config {
            Some(path) => {
                printer.verbose("Config", &display_path(path));
                MigrationConfig::load(path)?
            }
            None => {
                let (config, found) = MigrationConfig::discover(&PathBuf::from("."))?;
                if found {
                    printer.verbose("Config", CONFIG_FILENAME);
                }
                config
            }
        };

        if let Some(input) = &self.input {
            config.extraction_root = input.clone();
        }
        if let Some(output) = &self.output {
            config.output_root = output.clone();
        }
        Ok(config)
    }
}
