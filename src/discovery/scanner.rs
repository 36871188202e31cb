//! File system scanner for raw extraction trees.
//!
//! Recursively walks a root, classifies every supported file and returns the
//! files grouped by category in a stable (sorted) order.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::types::AssetCategory;

use super::classifier::{classify_file, is_supported, ClassificationResult};
use super::config::MigrationConfig;

/// Result of scanning an extraction root.
#[derive(Debug, Default)]
pub struct ScanResult {
    /// Classified files per category, sorted by source path.
    pub files: BTreeMap<AssetCategory, Vec<ClassificationResult>>,
    /// Files with extensions the pipeline does not handle.
    pub skipped: Vec<PathBuf>,
}

impl ScanResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of classified files.
    pub fn total(&self) -> usize {
        self.files.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Files of one category.
    pub fn files_of_kind(&self, category: AssetCategory) -> &[ClassificationResult] {
        self.files.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every classified file, in category then path order.
    pub fn iter(&self) -> impl Iterator<Item = &ClassificationResult> {
        self.files.values().flatten()
    }

    pub fn push(&mut self, result: ClassificationResult) {
        self.files.entry(result.category).or_default().push(result);
    }

    /// Merge another scan result into this one.
    pub fn merge(&mut self, other: ScanResult) {
        for (_, results) in other.files {
            for result in results {
                self.push(result);
            }
        }
        self.skipped.extend(other.skipped);
        self.sort();
    }

    fn sort(&mut self) {
        for results in self.files.values_mut() {
            results.sort_by(|a, b| a.source_path.cmp(&b.source_path));
        }
        self.skipped.sort();
    }
}

/// Scan a directory for migratable files.
///
/// Disabled categories and excluded paths are left out. A missing root yields
/// an empty result.
pub fn scan_directory(root: &Path, config: &MigrationConfig) -> ScanResult {
    let mut result = ScanResult::new();

    if !root.exists() {
        return result;
    }

    for entry in WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();

        if entry.file_type().is_dir() {
            continue;
        }

        let relative = path.strip_prefix(root).unwrap_or(path);
        if config.is_excluded(relative) {
            continue;
        }

        if !is_supported(path) {
            result.skipped.push(path.to_path_buf());
            continue;
        }

        let classified = classify_file(root, path);
        if config.categories.enabled(classified.category) {
            result.push(classified);
        }
    }

    result.sort();
    result
}

/// Count files with one of `extensions` below `dir`, recursively.
pub fn count_files(dir: &Path, extensions: &[&str]) -> usize {
    WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| extensions.contains(&crate::types::extension_of(e.path()).as_str()))
        .count()
}
