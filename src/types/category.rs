//! Asset categories assigned by the path classifier.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Image file extensions the pipeline understands.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// Audio file extensions the pipeline understands.
pub const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "ogg"];

/// Structured data file extensions.
pub const DATA_EXTENSIONS: &[&str] = &["xml", "json"];

/// Flash archives show up in raw extractions but need an external converter.
pub const SWF_EXTENSION: &str = "swf";

/// The category of a raw or migrated asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AssetCategory {
    Characters,
    Maps,
    #[serde(rename = "UI")]
    Ui,
    Effects,
    Audio,
    Monsters,
    Data,
}

impl AssetCategory {
    /// Every category, in report order.
    pub const ALL: [AssetCategory; 7] = [
        AssetCategory::Characters,
        AssetCategory::Monsters,
        AssetCategory::Maps,
        AssetCategory::Ui,
        AssetCategory::Effects,
        AssetCategory::Audio,
        AssetCategory::Data,
    ];

    /// Display name, also used as the folder name.
    pub fn name(&self) -> &'static str {
        match self {
            AssetCategory::Characters => "Characters",
            AssetCategory::Maps => "Maps",
            AssetCategory::Ui => "UI",
            AssetCategory::Effects => "Effects",
            AssetCategory::Audio => "Audio",
            AssetCategory::Monsters => "Monsters",
            AssetCategory::Data => "Data",
        }
    }

    /// Parse a category from its display name (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        let lower = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|c| c.name().to_ascii_lowercase() == lower)
    }

    /// Whether assets of this category are images (and get sprite output).
    pub fn is_sprite(&self) -> bool {
        matches!(
            self,
            AssetCategory::Characters
                | AssetCategory::Monsters
                | AssetCategory::Maps
                | AssetCategory::Ui
                | AssetCategory::Effects
        )
    }

    /// Whether this category carries multi-directional animated sheets.
    pub fn is_animated(&self) -> bool {
        matches!(self, AssetCategory::Characters | AssetCategory::Monsters)
    }

    /// File extensions counted for this category.
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            AssetCategory::Audio => AUDIO_EXTENSIONS,
            AssetCategory::Data => DATA_EXTENSIONS,
            _ => IMAGE_EXTENSIONS,
        }
    }

    /// Whether a (lower-case) extension belongs to this category.
    pub fn accepts_extension(&self, ext: &str) -> bool {
        self.extensions().contains(&ext)
    }
}

impl fmt::Display for AssetCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Lower-case extension of a path, or an empty string.
pub fn extension_of(path: &std::path::Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default()
}
