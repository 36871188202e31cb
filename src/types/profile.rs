//! Per-category import profiles.
//!
//! Profiles describe how the host engine should import a migrated file.
//! The pipeline writes them as JSON sidecars next to each copied image.

use serde::{Deserialize, Serialize};

use super::category::AssetCategory;

/// Texture storage compression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Compression {
    None,
    Compressed,
}

/// Texture sampling filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterMode {
    Point,
    Bilinear,
}

/// Import settings applied to a migrated asset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImportProfile {
    pub compression: Compression,
    pub filtering: FilterMode,
    pub pixels_per_unit: f32,
    /// Largest texture side the engine should keep; 0 for non-texture assets.
    pub max_dimension: u32,
    pub mipmaps: bool,
}

/// Isometric tile width of the source maps, used as the map pixel density.
pub const ISO_TILE_WIDTH: f32 = 86.0;

const PIXEL_PERFECT: ImportProfile = ImportProfile {
    compression: Compression::None,
    filtering: FilterMode::Point,
    pixels_per_unit: 100.0,
    max_dimension: 2048,
    mipmaps: false,
};

const PROFILES: [(AssetCategory, ImportProfile); 7] = [
    (AssetCategory::Characters, PIXEL_PERFECT),
    (AssetCategory::Monsters, PIXEL_PERFECT),
    (
        AssetCategory::Maps,
        ImportProfile {
            compression: Compression::Compressed,
            filtering: FilterMode::Bilinear,
            pixels_per_unit: ISO_TILE_WIDTH,
            max_dimension: 512,
            mipmaps: false,
        },
    ),
    (
        AssetCategory::Ui,
        ImportProfile {
            compression: Compression::Compressed,
            filtering: FilterMode::Bilinear,
            pixels_per_unit: 100.0,
            max_dimension: 1024,
            mipmaps: false,
        },
    ),
    (
        AssetCategory::Effects,
        ImportProfile {
            compression: Compression::Compressed,
            filtering: FilterMode::Bilinear,
            pixels_per_unit: 100.0,
            max_dimension: 1024,
            mipmaps: false,
        },
    ),
    (
        AssetCategory::Audio,
        ImportProfile {
            compression: Compression::None,
            filtering: FilterMode::Bilinear,
            pixels_per_unit: 100.0,
            max_dimension: 0,
            mipmaps: false,
        },
    ),
    (
        AssetCategory::Data,
        ImportProfile {
            compression: Compression::None,
            filtering: FilterMode::Bilinear,
            pixels_per_unit: 100.0,
            max_dimension: 0,
            mipmaps: false,
        },
    ),
];

/// Look up the import profile for a category.
pub fn resolve_profile(category: AssetCategory) -> ImportProfile {
    PROFILES
        .iter()
        .find(|(c, _)| *c == category)
        .map(|(_, p)| *p)
        .unwrap_or(PIXEL_PERFECT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_category_has_profile() {
        for category in AssetCategory::ALL {
            assert!(PROFILES.iter().any(|(c, _)| *c == category), "{category}");
        }
    }

    #[test]
    fn test_characters_are_pixel_perfect() {
        let p = resolve_profile(AssetCategory::Characters);
        assert_eq!(p.filtering, FilterMode::Point);
        assert_eq!(p.compression, Compression::None);
        assert!(!p.mipmaps);
    }

    #[test]
    fn test_maps_tuned_to_tile_size() {
        let p = resolve_profile(AssetCategory::Maps);
        assert_eq!(p.pixels_per_unit, ISO_TILE_WIDTH);
        assert!(p.max_dimension < resolve_profile(AssetCategory::Characters).max_dimension);
    }

    #[test]
    fn test_ui_is_compressed_bilinear() {
        let p = resolve_profile(AssetCategory::Ui);
        assert_eq!(p.compression, Compression::Compressed);
        assert_eq!(p.filtering, FilterMode::Bilinear);
    }

    #[test]
    fn test_sidecar_names() {
        let p = resolve_profile(AssetCategory::Ui);
        let json = serde_json::to_value(p).unwrap();
        assert_eq!(json["compression"], "compressed");
        assert_eq!(json["filtering"], "bilinear");
        assert!(serde_json::from_str::<FilterMode>("\"trilinear\"").is_err());
        assert!(serde_json::from_str::<Compression>("\"high_quality\"").is_err());
    }
}
