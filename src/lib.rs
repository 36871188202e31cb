//! assetmig - 2D game asset migration pipeline
//!
//! A library for turning a raw, loosely organized asset extraction into
//! sliced frames, animation clips, layered state machines and a scored
//! migration report.

pub mod animation;
pub mod cli;
pub mod discovery;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod render;
pub mod sprite;
pub mod types;
pub mod validation;

pub use animation::{
    assemble, assemble_all, generate, map_direction, ClipLibrary, DirectionMapper,
    GeneratedStateMachine, GeneratorOptions, LabeledFrame,
};
pub use discovery::{classify, discover, DiscoveryResult, MigrationConfig, ScanResult};
pub use error::{MigrateError, Result};
pub use pipeline::{CancelToken, MigrationSummary, NoProgress, Pipeline, ProcessingResult, ProgressSink, Stage};
pub use render::{write_png, write_sheet_json, SheetMeta, SheetPacker};
pub use sprite::{detect_grid, slice, GridDetector, NamingConvention, Slicer};
pub use types::{
    resolve_profile, AnimationClip, AssetCategory, Compass, DirectionMapping, GridSpec,
    ImportProfile, NativeDirection, SpriteFrame, StateMachineSpec,
};
pub use validation::{build_report, validate_extraction, ExtractionSummary, MigrationReport, Severity};
