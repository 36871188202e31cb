//! Discovery of raw assets: configuration, classification and scanning.
//!
//! # Example
//!
//! ```ignore
//! use assetmig::discovery::{discover, MigrationConfig};
//!
//! let config = MigrationConfig::default();
//! let result = discover("./extracted", &config)?;
//! println!("Found {} assets", result.scan.total());
//! ```

mod classifier;
mod config;
mod scanner;

use std::path::{Path, PathBuf};

use crate::error::{MigrateError, Result};

pub use classifier::{
    audio_bucket, classify, classify_file, classify_path, is_supported, ClassificationResult,
};
pub use config::{
    default_expectations, AnimationConfig, CategoryToggles, GridConfig, MigrationConfig,
    ReportConfig, DEFAULT_ESSENTIAL_ASSETS, MAX_GRID_CELLS,
};
pub use scanner::{count_files, scan_directory, ScanResult};

/// The name of the configuration file.
pub const CONFIG_FILENAME: &str = "assetmig.yaml";

/// Result of discovering the files of an extraction root.
#[derive(Debug)]
pub struct DiscoveryResult {
    /// The extraction root that was scanned.
    pub root: PathBuf,

    /// Scan results with classified files.
    pub scan: ScanResult,
}

/// Discover and classify every migratable file under `root`.
///
/// Fails only when the root does not exist.
pub fn discover(root: impl AsRef<Path>, config: &MigrationConfig) -> Result<DiscoveryResult> {
    let root = root.as_ref().to_path_buf();

    if !root.is_dir() {
        return Err(MigrateError::Precondition {
            message: format!("extraction root {} does not exist", root.display()),
            help: Some("Set extraction_root in assetmig.yaml or pass --input".to_string()),
        });
    }

    let scan = scan_directory(&root, config);
    log::info!(
        "discovered {} file(s) under {} ({} skipped)",
        scan.total(),
        root.display(),
        scan.skipped.len()
    );

    Ok(DiscoveryResult { root, scan })
}
