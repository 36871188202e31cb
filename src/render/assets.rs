//! JSON artifacts: animation clips, controllers and import sidecars.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{MigrateError, Result};
use crate::types::{AnimationClip, AssetCategory, ImportProfile, StateMachineSpec};

use super::write::write_json;

/// File suffix of serialized clips.
pub const CLIP_SUFFIX: &str = ".anim.json";

/// File suffix of serialized state machines.
pub const CONTROLLER_SUFFIX: &str = ".controller.json";

/// File suffix of import profile sidecars.
pub const IMPORT_SUFFIX: &str = ".import.json";

/// Path of the import sidecar for an asset: `<file>.import.json`.
pub fn sidecar_path(asset: &Path) -> PathBuf {
    let mut name = asset
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(IMPORT_SUFFIX);
    asset.with_file_name(name)
}

#[derive(Serialize)]
struct ImportSidecar<'a> {
    category: AssetCategory,
    #[serde(flatten)]
    profile: &'a ImportProfile,
}

/// Write the import profile sidecar next to `asset`.
pub fn write_import_sidecar(asset: &Path, category: AssetCategory, profile: &ImportProfile) -> Result<PathBuf> {
    let path = sidecar_path(asset);
    write_json(&path, &ImportSidecar { category, profile })?;
    Ok(path)
}

/// Write a clip to `<dir>/<name>.anim.json`.
pub fn write_clip(dir: &Path, clip: &AnimationClip) -> Result<PathBuf> {
    let path = dir.join(format!("{}{}", clip.name, CLIP_SUFFIX));
    write_json(&path, clip)?;
    Ok(path)
}

/// Read a clip back.
pub fn read_clip(path: &Path) -> Result<AnimationClip> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| MigrateError::io(path, format!("Failed to read clip: {}", e)))?;
    serde_json::from_str(&content).map_err(|e| MigrateError::Parse {
        message: format!("Invalid clip {}: {}", path.display(), e),
        help: None,
    })
}

/// Write a state machine to `<dir>/<name>.controller.json`.
pub fn write_state_machine(dir: &Path, spec: &StateMachineSpec) -> Result<PathBuf> {
    let path = dir.join(format!("{}{}", spec.name, CONTROLLER_SUFFIX));
    write_json(&path, spec)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{resolve_profile, ClipFrame, Compass, NativeDirection};
    use tempfile::tempdir;

    #[test]
    fn test_sidecar_path() {
        assert_eq!(
            sidecar_path(Path::new("Sprites/UI/ok.png")),
            PathBuf::from("Sprites/UI/ok.png.import.json")
        );
    }

    #[test]
    fn test_write_import_sidecar() {
        let dir = tempdir().unwrap();
        let asset = dir.path().join("tile.png");
        let path = write_import_sidecar(&asset, AssetCategory::Maps, &resolve_profile(AssetCategory::Maps)).unwrap();

        let json: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(json["category"], "Maps");
        assert_eq!(json["pixels_per_unit"], 86.0);
        assert_eq!(json["max_dimension"], 512);
    }

    #[test]
    fn test_clip_round_trip() {
        let dir = tempdir().unwrap();
        let clip = AnimationClip {
            name: "walk_side".to_string(),
            label: "walk".to_string(),
            native: NativeDirection::Side,
            source: Compass::E,
            frame_rate: 10.0,
            looping: true,
            frames: vec![ClipFrame {
                sprite: "Sprites/Characters/Iop/iop_walk_E_00.png".to_string(),
                time: 0.0,
            }],
            valid: true,
        };

        let path = write_clip(dir.path(), &clip).unwrap();
        assert!(path.ends_with("walk_side.anim.json"));

        let json: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["loop"], true);
        assert_eq!(json["native"], "side");

        assert_eq!(read_clip(&path).unwrap(), clip);
    }

    #[test]
    fn test_read_clip_invalid() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.anim.json");
        std::fs::write(&path, "{").unwrap();
        assert!(matches!(read_clip(&path), Err(MigrateError::Parse { .. })));
    }

    #[test]
    fn test_write_state_machine() {
        let dir = tempdir().unwrap();
        let spec = StateMachineSpec::new("Iop");
        let path = write_state_machine(dir.path(), &spec).unwrap();
        assert!(path.ends_with("Iop.controller.json"));
    }
}
