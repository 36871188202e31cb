//! Extraction completeness check.
//!
//! Runs before any processing: counts raw files per category against the
//! expected minimums and spot-checks character folders. The resulting score
//! gates whether the (slow) migration starts.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::animation::{map_direction, IDLE_LABELS, MOVE_LABELS};
use crate::discovery::{count_files, MigrationConfig};
use crate::sprite::parse_frame_name;
use crate::types::{extension_of, AssetCategory, Compass, NativeDirection, IMAGE_EXTENSIONS, SHEET_ROWS};

use super::diagnostic::{Diagnostic, Diagnostics, Level};

/// Categories whose source folder must exist.
pub const REQUIRED_CATEGORIES: [AssetCategory; 3] =
    [AssetCategory::Characters, AssetCategory::Maps, AssetCategory::Ui];

/// File count for one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryCount {
    pub category: AssetCategory,
    /// Source folder, if present.
    pub folder: Option<PathBuf>,
    pub found: usize,
    pub expected: u32,
    /// `min(found / expected, 1)`; 1 when nothing is expected.
    pub score: f32,
}

/// Spot check of one character folder.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CharacterCheck {
    pub name: String,
    pub sprites: usize,
    pub has_idle: bool,
    pub has_walk: bool,
    /// Compass directions named by pre-sliced frame files. Empty when the
    /// character only ships sheets.
    pub directions: BTreeSet<Compass>,
}

impl CharacterCheck {
    /// Native facings with no art, counting mirrored twins as coverage.
    pub fn missing_facings(&self) -> Vec<NativeDirection> {
        let covered: BTreeSet<NativeDirection> =
            self.directions.iter().map(|&d| map_direction(d).native).collect();
        let all: BTreeSet<NativeDirection> =
            SHEET_ROWS.iter().map(|&d| map_direction(d).native).collect();
        all.difference(&covered).copied().collect()
    }
}

/// Outcome of validating an extraction root.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionSummary {
    pub root: PathBuf,
    pub per_category: Vec<CategoryCount>,
    pub characters: Vec<CharacterCheck>,
    pub diagnostics: Diagnostics,
    pub overall_score: f32,
}

impl ExtractionSummary {
    pub fn errors(&self) -> Vec<&str> {
        self.diagnostics
            .of_level(Level::Error)
            .map(|d| d.message.as_str())
            .collect()
    }

    pub fn warnings(&self) -> Vec<&str> {
        self.diagnostics
            .of_level(Level::Warning)
            .map(|d| d.message.as_str())
            .collect()
    }

    pub fn category(&self, category: AssetCategory) -> Option<&CategoryCount> {
        self.per_category.iter().find(|c| c.category == category)
    }
}

fn ratio(found: usize, expected: u32) -> f32 {
    if expected == 0 {
        return 1.0;
    }
    (found as f32 / expected as f32).min(1.0)
}

/// Find a direct child directory named like the category (case-insensitive).
fn category_folder(root: &Path, category: AssetCategory) -> Option<PathBuf> {
    let wanted = category.name().to_ascii_lowercase();
    let mut dirs: Vec<PathBuf> = fs::read_dir(root)
        .ok()?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_dir())
        .collect();
    dirs.sort();
    dirs.into_iter().find(|p| {
        p.file_name()
            .map(|n| n.to_string_lossy().to_ascii_lowercase() == wanted)
            .unwrap_or(false)
    })
}

fn has_label(stems: &[String], labels: &[&str]) -> bool {
    stems.iter().any(|stem| {
        stem.split(|c: char| !c.is_ascii_alphanumeric())
            .any(|token| labels.iter().any(|l| token.starts_with(l)))
    })
}

fn check_character(dir: &Path) -> CharacterCheck {
    let stems: Vec<String> = walkdir::WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| IMAGE_EXTENSIONS.contains(&extension_of(e.path()).as_str()))
        .filter_map(|e| e.path().file_stem().map(|s| s.to_string_lossy().to_ascii_lowercase()))
        .collect();

    CharacterCheck {
        name: dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
        sprites: stems.len(),
        has_idle: has_label(&stems, IDLE_LABELS),
        has_walk: has_label(&stems, MOVE_LABELS),
        directions: stems
            .iter()
            .filter_map(|stem| parse_frame_name(stem)?.compass())
            .collect(),
    }
}

/// Validate a raw extraction root against the configured expectations.
pub fn validate_extraction(root: &Path, config: &MigrationConfig) -> ExtractionSummary {
    let mut summary = ExtractionSummary {
        root: root.to_path_buf(),
        per_category: Vec::new(),
        characters: Vec::new(),
        diagnostics: Diagnostics::new(),
        overall_score: 0.0,
    };

    if !root.is_dir() {
        summary.diagnostics.push(
            Diagnostic::error(
                "assetmig::extract::missing-root",
                format!("extraction root {} does not exist", root.display()),
            )
            .with_help("Point extraction_root at the folder holding the raw assets"),
        );
        return summary;
    }

    for (&category, &expected) in &config.expectations {
        let folder = category_folder(root, category);
        let found = folder
            .as_deref()
            .map(|dir| count_files(dir, category.extensions()))
            .unwrap_or(0);

        match &folder {
            None if REQUIRED_CATEGORIES.contains(&category) => {
                summary.diagnostics.push(Diagnostic::error(
                    "assetmig::extract::missing-folder",
                    format!("required {} folder is missing", category),
                ));
            }
            None => {
                summary.diagnostics.push(Diagnostic::warning(
                    "assetmig::extract::missing-folder",
                    format!("optional {} folder is missing", category),
                ));
            }
            Some(_) if (found as u64) < u64::from(expected) => {
                summary.diagnostics.push(Diagnostic::warning(
                    "assetmig::extract::below-minimum",
                    format!("{}: found {} file(s), expected at least {}", category, found, expected),
                ));
            }
            Some(_) => {}
        }

        summary.per_category.push(CategoryCount {
            category,
            folder,
            found,
            expected,
            score: ratio(found, expected),
        });
    }

    if let Some(chars_dir) = category_folder(root, AssetCategory::Characters) {
        let mut dirs: Vec<PathBuf> = fs::read_dir(&chars_dir)
            .map(|rd| {
                rd.filter_map(|e| e.ok())
                    .map(|e| e.path())
                    .filter(|p| p.is_dir())
                    .collect()
            })
            .unwrap_or_default();
        dirs.sort();

        for dir in dirs {
            let check = check_character(&dir);
            if check.sprites < config.min_sprites_per_character as usize {
                summary.diagnostics.push(Diagnostic::warning(
                    "assetmig::extract::few-sprites",
                    format!(
                        "character {} has {} sprite(s), expected at least {}",
                        check.name, check.sprites, config.min_sprites_per_character
                    ),
                ));
            }
            let missing: Vec<&str> = [("idle", check.has_idle), ("walk", check.has_walk)]
                .into_iter()
                .filter(|(_, present)| !present)
                .map(|(label, _)| label)
                .collect();
            if !missing.is_empty() {
                summary.diagnostics.push(Diagnostic::warning(
                    "assetmig::extract::missing-animation",
                    format!("character {} has no {} sprites", check.name, missing.join("/")),
                ));
            }
            let missing_facings = check.missing_facings();
            if !check.directions.is_empty() && !missing_facings.is_empty() {
                let names: Vec<&str> = missing_facings.iter().map(|f| f.code()).collect();
                summary.diagnostics.push(Diagnostic::warning(
                    "assetmig::extract::missing-directions",
                    format!(
                        "character {} has frames for {} of 8 directions, no art facing {}",
                        check.name,
                        check.directions.len(),
                        names.join("/")
                    ),
                ));
            }
            summary.characters.push(check);
        }
    }

    let score = if summary.per_category.is_empty() {
        1.0
    } else {
        summary.per_category.iter().map(|c| c.score).sum::<f32>() / summary.per_category.len() as f32
    };
    summary.overall_score = if summary.diagnostics.has_errors() {
        score / 2.0
    } else {
        score
    };

    log::info!(
        "extraction score {:.2} ({} error(s), {} warning(s))",
        summary.overall_score,
        summary.diagnostics.error_count(),
        summary.diagnostics.warning_count()
    );

    summary
}
