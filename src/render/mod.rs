//! Output of migrated artifacts.
//!
//! Frame PNGs, sheet and atlas metadata, clip and controller JSON, and import
//! sidecars. All writes are atomic per file.

mod assets;
mod png;
mod sheet;
mod write;

pub use assets::{
    read_clip, sidecar_path, write_clip, write_import_sidecar, write_state_machine, CLIP_SUFFIX,
    CONTROLLER_SUFFIX, IMPORT_SUFFIX,
};
pub use png::{crop_frame, crop_frames, encode_png, is_blank, load_rgba, write_png, CroppedFrames};
pub use sheet::{write_sheet_json, Frame, SheetMeta, SheetPacker};
pub use write::{copy_atomic, write_atomic, write_json};
