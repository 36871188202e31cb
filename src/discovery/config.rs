//! Migration configuration (assetmig.yaml) parsing.
//!
//! Every field is optional; an empty file (or no file) gives the defaults.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::animation::GeneratorOptions;
use crate::error::{MigrateError, Result};
use crate::sprite::{GridDetection, GridDetector, GridMatch, NamingConvention, DEFAULT_CANDIDATES};
use crate::types::{Alignment, AssetCategory, GridSpec};

/// Playable classes whose absence from the output is a critical finding.
pub const DEFAULT_ESSENTIAL_ASSETS: [&str; 12] = [
    "Feca", "Osamodas", "Enutrof", "Sram", "Xelor", "Ecaflip", "Eniripsa", "Iop", "Cra", "Sadida",
    "Sacrier", "Pandawa",
];

/// Largest grid a configuration may describe.
pub const MAX_GRID_CELLS: u64 = 65_536;

/// Migration configuration loaded from assetmig.yaml.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MigrationConfig {
    /// Raw extraction root.
    pub extraction_root: PathBuf,

    /// Output root for migrated assets.
    pub output_root: PathBuf,

    pub categories: CategoryToggles,

    pub grid: GridConfig,

    pub naming: NamingConvention,

    pub animation: AnimationConfig,

    /// Expected minimum file counts per category in the extraction root.
    pub expectations: BTreeMap<AssetCategory, u32>,

    /// Minimum sprite count for each character folder.
    pub min_sprites_per_character: u32,

    /// Extraction score below which the run does not start.
    pub min_extraction_score: f32,

    /// Worker threads for per-file work; defaults to available parallelism.
    pub workers: Option<usize>,

    /// Patterns (relative to the extraction root) to leave out.
    pub excludes: Vec<String>,

    pub report: ReportConfig,
}

/// Per-category enable flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryToggles {
    pub characters: bool,
    pub maps: bool,
    pub ui: bool,
    pub effects: bool,
    pub audio: bool,
    pub monsters: bool,
    pub data: bool,
}

impl Default for CategoryToggles {
    fn default() -> Self {
        Self {
            characters: true,
            maps: true,
            ui: true,
            effects: true,
            audio: true,
            monsters: true,
            data: true,
        }
    }
}

impl CategoryToggles {
    pub fn enabled(&self, category: AssetCategory) -> bool {
        match category {
            AssetCategory::Characters => self.characters,
            AssetCategory::Maps => self.maps,
            AssetCategory::Ui => self.ui,
            AssetCategory::Effects => self.effects,
            AssetCategory::Audio => self.audio,
            AssetCategory::Monsters => self.monsters,
            AssetCategory::Data => self.data,
        }
    }
}

/// Sprite sheet grid settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub auto_detect: bool,
    pub rows: Option<u32>,
    pub columns: Option<u32>,
    pub cell_width: Option<u32>,
    pub cell_height: Option<u32>,
    /// Square cell sizes tried by auto-detection.
    pub candidates: Vec<u32>,
    /// Pivot of sliced frames.
    pub alignment: Alignment,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            auto_detect: true,
            rows: None,
            columns: None,
            cell_width: None,
            cell_height: None,
            candidates: DEFAULT_CANDIDATES.to_vec(),
            alignment: Alignment::BottomCenter,
        }
    }
}

impl GridConfig {
    /// Grid from the manual overrides, if they describe one.
    ///
    /// Rows and columns are required; missing cell sizes are derived from the
    /// image size.
    pub fn explicit(&self, width: u32, height: u32) -> Option<GridSpec> {
        let rows = self.rows.filter(|&r| r > 0)?;
        let columns = self.columns.filter(|&c| c > 0)?;
        let cell_width = self.cell_width.unwrap_or(width / columns);
        let cell_height = self.cell_height.unwrap_or(height / rows);
        Some(GridSpec::new(rows, columns, cell_width, cell_height))
    }

    /// Reject manual overrides that no sheet could match.
    pub fn validate(&self) -> Result<()> {
        let invalid = |message: String| MigrateError::Parse {
            message,
            help: Some("Check the grid section of assetmig.yaml".to_string()),
        };

        if let (Some(rows), Some(columns)) = (self.rows, self.columns) {
            let cells = u64::from(rows) * u64::from(columns);
            if cells > MAX_GRID_CELLS {
                return Err(invalid(format!(
                    "grid {}x{} has {} cells, at most {} allowed",
                    rows, columns, cells, MAX_GRID_CELLS
                )));
            }
        }
        for (count, cell, axis) in [
            (self.columns, self.cell_width, "width"),
            (self.rows, self.cell_height, "height"),
        ] {
            if let (Some(count), Some(cell)) = (count, cell) {
                if count.checked_mul(cell).is_none() {
                    return Err(invalid(format!(
                        "grid {} {} x {}px does not fit in an image",
                        axis, count, cell
                    )));
                }
            }
        }
        Ok(())
    }

    /// Resolve the grid for an image: manual overrides when auto-detection is
    /// off (or nothing else is possible), detection otherwise.
    pub fn resolve(&self, width: u32, height: u32) -> GridDetection {
        if !self.auto_detect {
            if let Some(grid) = self.explicit(width, height) {
                return GridDetection {
                    grid,
                    matched: GridMatch::Configured,
                };
            }
            log::warn!("grid auto-detection disabled without rows/columns, detecting anyway");
        }
        GridDetector::new(self.candidates.iter().copied()).detect(width, height)
    }
}

/// Animation synthesis settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    pub create_idle: bool,
    pub create_movement: bool,
    pub create_combat: bool,
    pub create_emote: bool,
    pub use_8_directions: bool,
    pub use_blend_spaces: bool,
    pub frame_rate: f32,
    /// Fail on unknown direction names instead of falling back to front.
    pub strict_directions: bool,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            create_idle: true,
            create_movement: true,
            create_combat: true,
            create_emote: true,
            use_8_directions: true,
            use_blend_spaces: true,
            frame_rate: 12.0,
            strict_directions: false,
        }
    }
}

impl AnimationConfig {
    pub fn generator_options(&self) -> GeneratorOptions {
        GeneratorOptions {
            create_idle: self.create_idle,
            create_movement: self.create_movement,
            create_combat: self.create_combat,
            create_emote: self.create_emote,
            use_8_directions: self.use_8_directions,
            use_blend_spaces: self.use_blend_spaces,
        }
    }
}

/// Migration report thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Largest texture side before a Medium finding.
    pub max_texture_size: u32,
    /// Clips below this frame rate get a Low finding.
    pub min_frame_rate: f32,
    /// Audio longer than this gets a Medium finding.
    pub max_audio_seconds: f32,
    /// Identifiers that must appear under the character outputs.
    pub essential_assets: Vec<String>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            max_texture_size: 2048,
            min_frame_rate: 8.0,
            max_audio_seconds: 300.0,
            essential_assets: DEFAULT_ESSENTIAL_ASSETS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Default expected file counts per category.
pub fn default_expectations() -> BTreeMap<AssetCategory, u32> {
    BTreeMap::from([
        (AssetCategory::Characters, 100),
        (AssetCategory::Maps, 50),
        (AssetCategory::Ui, 50),
        (AssetCategory::Effects, 20),
        (AssetCategory::Audio, 20),
        (AssetCategory::Monsters, 50),
    ])
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            extraction_root: PathBuf::from("extracted"),
            output_root: PathBuf::from("migrated"),
            categories: CategoryToggles::default(),
            grid: GridConfig::default(),
            naming: NamingConvention::default(),
            animation: AnimationConfig::default(),
            expectations: default_expectations(),
            min_sprites_per_character: 16,
            min_extraction_score: 0.0,
            workers: None,
            excludes: vec![],
            report: ReportConfig::default(),
        }
    }
}

impl MigrationConfig {
    /// Load configuration from an assetmig.yaml file.
    ///
    /// Relative roots are resolved against the file's directory.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| MigrateError::Io {
            path: path.to_path_buf(),
            message: format!("Failed to read config: {}", e),
        })?;

        let mut config = Self::parse(&content)?;
        if let Some(base) = path.parent() {
            config.resolve_relative_to(base);
        }
        Ok(config)
    }

    /// Parse configuration from a YAML string.
    pub fn parse(content: &str) -> Result<Self> {
        // serde_yaml rejects a fully empty document for a struct
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(content).map_err(|e| MigrateError::Parse {
            message: format!("Invalid config: {}", e),
            help: Some("Check assetmig.yaml syntax".to_string()),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check settings serde cannot: grid overrides must describe a real sheet.
    pub fn validate(&self) -> Result<()> {
        self.grid.validate()
    }

    /// Load `assetmig.yaml` from `dir` if present, else the defaults.
    pub fn discover(dir: &Path) -> Result<(Self, bool)> {
        let path = dir.join(super::CONFIG_FILENAME);
        if path.exists() {
            Ok((Self::load(&path)?, true))
        } else {
            Ok((Self::default(), false))
        }
    }

    fn resolve_relative_to(&mut self, base: &Path) {
        if self.extraction_root.is_relative() {
            self.extraction_root = base.join(&self.extraction_root);
        }
        if self.output_root.is_relative() {
            self.output_root = base.join(&self.output_root);
        }
    }

    /// Expected minimum for a category (0 when not listed).
    pub fn expected(&self, category: AssetCategory) -> u32 {
        self.expectations.get(&category).copied().unwrap_or(0)
    }

    /// Check if a path should be excluded based on exclude patterns.
    pub fn is_excluded(&self, path: &Path) -> bool {
        let path_str = path.to_string_lossy().replace('\\', "/");

        self.excludes
            .iter()
            .any(|pattern| Self::matches_pattern(&path_str, pattern))
    }

    /// Simple glob pattern matching.
    fn matches_pattern(path: &str, pattern: &str) -> bool {
        if let Some(suffix) = pattern.strip_prefix("**/") {
            // **/dir/* matches anything inside dir anywhere in the path
            if let Some(dir) = suffix.strip_suffix("/*") {
                return path.starts_with(&format!("{}/", dir))
                    || path.contains(&format!("/{}/", dir));
            }
            return path.contains(suffix);
        }

        if let Some(suffix) = pattern.strip_prefix('*') {
            if !pattern.contains('/') {
                return path.ends_with(suffix);
            }
        }

        if let Some(prefix) = pattern.strip_suffix("/*") {
            return path.starts_with(&format!("{}/", prefix))
                || path.contains(&format!("/{}/", prefix));
        }

        path.contains(pattern)
    }

    /// Worker count for the thread pool.
    pub fn effective_workers(&self) -> usize {
        self.workers.filter(|&w| w > 0).unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_empty_config() {
        let config = MigrationConfig::parse("").unwrap();
        assert_eq!(config.output_root, PathBuf::from("migrated"));
        assert_eq!(config.naming, NamingConvention::TypeDirectionFrame);
        assert_eq!(config.report.essential_assets.len(), 12);
    }

    #[test]
    fn test_parse_partial_config() {
        let yaml = r#"
extraction_root: raw
naming: direction_first
animation:
  use_8_directions: false
  frame_rate: 10
grid:
  auto_detect: false
  rows: 8
  columns: 6
expectations:
  Characters: 12
  UI: 3
"#;
        let config = MigrationConfig::parse(yaml).unwrap();

        assert_eq!(config.extraction_root, PathBuf::from("raw"));
        assert_eq!(config.naming, NamingConvention::DirectionFirst);
        assert!(!config.animation.use_8_directions);
        assert!(config.animation.create_combat);
        assert_eq!(config.animation.frame_rate, 10.0);
        assert_eq!(config.expected(AssetCategory::Characters), 12);
        assert_eq!(config.expected(AssetCategory::Ui), 3);
        assert_eq!(config.expected(AssetCategory::Maps), 0);
        assert_eq!(config.grid.candidates, DEFAULT_CANDIDATES.to_vec());
    }

    #[test]
    fn test_parse_invalid_config() {
        let err = MigrationConfig::parse("naming: sideways").unwrap_err();
        assert!(matches!(err, MigrateError::Parse { .. }));
    }

    #[test]
    fn test_round_trip_defaults() {
        let config = MigrationConfig::default();
        let yaml = serde_yaml::to_string(&config).unwrap();
        let parsed = MigrationConfig::parse(&yaml).unwrap();
        assert_eq!(parsed.expectations, config.expectations);
        assert_eq!(parsed.grid, config.grid);
        assert_eq!(parsed.report, config.report);
    }

    #[test]
    fn test_load_resolves_relative_roots() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("assetmig.yaml"), "extraction_root: raw\n").unwrap();

        let (config, found) = MigrationConfig::discover(dir.path()).unwrap();
        assert!(found);
        assert_eq!(config.extraction_root, dir.path().join("raw"));
        assert_eq!(config.output_root, dir.path().join("migrated"));
    }

    #[test]
    fn test_discover_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let (config, found) = MigrationConfig::discover(dir.path()).unwrap();
        assert!(!found);
        assert_eq!(config.min_sprites_per_character, 16);
    }

    #[test]
    fn test_rejects_oversized_grid() {
        let yaml = "grid:\n  auto_detect: false\n  rows: 70000\n  columns: 70000\n";
        let err = MigrationConfig::parse(yaml).unwrap_err();
        assert!(matches!(err, MigrateError::Parse { .. }));
        assert!(err.to_string().contains("cells"));
    }

    #[test]
    fn test_rejects_overflowing_cell_size() {
        let yaml = "grid:\n  rows: 1\n  columns: 2\n  cell_width: 3000000000\n";
        assert!(MigrationConfig::parse(yaml).is_err());

        let yaml = "grid:\n  rows: 8\n  columns: 8\n  cell_width: 64\n  cell_height: 64\n";
        assert!(MigrationConfig::parse(yaml).is_ok());
    }

    #[test]
    fn test_grid_resolve() {
        let mut grid = GridConfig::default();
        let detected = grid.resolve(512, 512);
        assert!(detected.is_exact());

        grid.auto_detect = false;
        grid.rows = Some(8);
        grid.columns = Some(4);
        let configured = grid.resolve(512, 512);
        assert_eq!(configured.matched, GridMatch::Configured);
        assert_eq!(configured.grid, GridSpec::new(8, 4, 128, 64));
    }

    #[test]
    fn test_grid_resolve_without_overrides_detects() {
        let grid = GridConfig {
            auto_detect: false,
            ..Default::default()
        };
        assert!(grid.resolve(512, 512).is_exact());
    }

    #[test]
    fn test_category_toggles() {
        let toggles = CategoryToggles {
            audio: false,
            ..Default::default()
        };
        assert!(!toggles.enabled(AssetCategory::Audio));
        assert!(toggles.enabled(AssetCategory::Ui));
    }

    #[test]
    fn test_is_excluded_extension() {
        let config = MigrationConfig {
            excludes: vec!["*.bak".to_string()],
            ..Default::default()
        };

        assert!(config.is_excluded(Path::new("file.bak")));
        assert!(config.is_excluded(Path::new("path/to/file.bak")));
        assert!(!config.is_excluded(Path::new("file.png")));
    }

    #[test]
    fn test_is_excluded_directory() {
        let config = MigrationConfig {
            excludes: vec!["**/backup/*".to_string(), "Data/*".to_string()],
            ..Default::default()
        };

        assert!(config.is_excluded(Path::new("backup/foo.png")));
        assert!(config.is_excluded(Path::new("UI/backup/bar.png")));
        assert!(config.is_excluded(Path::new("Data/items.json")));
        assert!(!config.is_excluded(Path::new("UI/ok.png")));
    }

    #[test]
    fn test_effective_workers() {
        let config = MigrationConfig {
            workers: Some(3),
            ..Default::default()
        };
        assert_eq!(config.effective_workers(), 3);
        assert!(MigrationConfig::default().effective_workers() >= 1);
    }
}
