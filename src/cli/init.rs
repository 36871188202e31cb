//! Init command implementation.
//!
//! Writes an `assetmig.yaml` with every option at its default, pointing at
//! the given extraction and output roots.

use std::fs;
use std::path::PathBuf;

use clap::Args;

use crate::discovery::{discover, MigrationConfig, CONFIG_FILENAME};
use crate::error::{MigrateError, Result};
use crate::output::{display_path, plural, Printer};

/// Initialize a migration project by generating assetmig.yaml
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Project directory (default: current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Extraction root, relative to the project directory
    #[arg(long, default_value = "extracted")]
    pub input: PathBuf,

    /// Output root, relative to the project directory
    #[arg(long, default_value = "migrated")]
    pub output: PathBuf,

    /// Overwrite an existing assetmig.yaml
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: InitArgs, printer: &Printer) -> Result<()> {
    let config_path = args.path.join(CONFIG_FILENAME);

    if config_path.exists() && !args.force {
        return Err(MigrateError::Build {
            message: format!("{} already exists", CONFIG_FILENAME),
            help: Some("Use --force to overwrite".to_string()),
        });
    }

    let config = MigrationConfig {
        extraction_root: args.input.clone(),
        output_root: args.output.clone(),
        ..Default::default()
    };

    let yaml = serde_yaml::to_string(&config).map_err(|e| MigrateError::Build {
        message: format!("Failed to serialize config: {}", e),
        help: None,
    })?;

    fs::create_dir_all(&args.path)
        .map_err(|e| MigrateError::io(&args.path, format!("Failed to create directory: {}", e)))?;
    fs::write(&config_path, yaml)
        .map_err(|e| MigrateError::io(&config_path, format!("Failed to write config: {}", e)))?;

    // Report what the new config would pick up
    let input = args.path.join(&args.input);
    if input.is_dir() {
        printer.status("Scanning", &display_path(&input));
        let discovery = discover(&input, &config)?;
        for (category, files) in &discovery.scan.files {
            printer.info(category.name(), &plural(files.len(), "file", "files"));
        }
        printer.success(
            "Created",
            &format!(
                "{} ({} found)",
                CONFIG_FILENAME,
                plural(discovery.scan.total(), "asset", "assets")
            ),
        );
    } else {
        printer.success("Created", CONFIG_FILENAME);
        printer.warning(
            "Warning",
            &format!("extraction root {} does not exist yet", display_path(&input)),
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn args(path: PathBuf, force: bool) -> InitArgs {
        InitArgs {
            path,
            input: PathBuf::from("extracted"),
            output: PathBuf::from("migrated"),
            force,
        }
    }

    #[test]
    fn test_init_creates_loadable_config() {
        let dir = tempdir().unwrap();
        run(args(dir.path().to_path_buf(), false), &Printer::new()).unwrap();

        let config_path = dir.path().join(CONFIG_FILENAME);
        let content = fs::read_to_string(&config_path).unwrap();
        assert!(content.contains("output_root: migrated"));

        let config = MigrationConfig::load(&config_path).unwrap();
        assert_eq!(config.extraction_root, dir.path().join("extracted"));
        assert_eq!(config.animation.frame_rate, 12.0);
    }

    #[test]
    fn test_init_errors_if_config_exists() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILENAME), "output_root: build").unwrap();

        assert!(run(args(dir.path().to_path_buf(), false), &Printer::new()).is_err());
    }

    #[test]
    fn test_init_force_overwrites() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILENAME), "output_root: build").unwrap();

        run(args(dir.path().to_path_buf(), true), &Printer::new()).unwrap();

        let content = fs::read_to_string(dir.path().join(CONFIG_FILENAME)).unwrap();
        assert!(content.contains("output_root: migrated"));
    }

    #[test]
    fn test_init_scans_existing_input() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("extracted/UI")).unwrap();
        fs::write(dir.path().join("extracted/UI/ok.png"), b"x").unwrap();

        run(args(dir.path().to_path_buf(), false), &Printer::new()).unwrap();
        assert!(dir.path().join(CONFIG_FILENAME).is_file());
    }
}
