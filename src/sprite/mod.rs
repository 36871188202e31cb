//! Sprite sheet geometry: grid detection, slicing and frame naming.

mod grid;
pub mod naming;
mod slicer;

pub use grid::{detect_grid, GridDetection, GridDetector, GridMatch, DEFAULT_CANDIDATES, FALLBACK_COLUMNS};
pub use naming::{
    direction_code, parse_frame_name, parse_sheet_stem, sheet_label, FrameKey, NamingConvention,
    DEFAULT_LABEL,
};
pub use slicer::{slice, Slicer};
