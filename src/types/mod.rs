//! Core domain types for assetmig.
//!
//! Engine-neutral value types produced by the pipeline:
//! - `AssetCategory` - classifier output
//! - `SpriteFrame`, `GridSpec` - sprite sheet geometry
//! - `Compass`, `NativeDirection` - direction vocabularies
//! - `AnimationClip`, `StateMachineSpec` - animation output
//! - `ImportProfile` - per-category import settings

mod category;
mod clip;
mod direction;
mod frame;
mod profile;
mod state_machine;

pub use category::{
    extension_of, AssetCategory, AUDIO_EXTENSIONS, DATA_EXTENSIONS, IMAGE_EXTENSIONS,
    SWF_EXTENSION,
};
pub use clip::{AnimationClip, ClipFrame};
pub use direction::{Compass, DirectionMapping, NativeDirection, CARDINALS, SHEET_ROWS};
pub use frame::{Alignment, BorderInsets, GridSpec, Rect, SpriteFrame};
pub use profile::{resolve_profile, Compression, FilterMode, ImportProfile, ISO_TILE_WIDTH};
pub use state_machine::{
    BlendChild, BlendSpace, ClipRef, Comparator, Condition, Layer, LayerBlending, Motion,
    ParamType, Parameter, State, StateMachineSpec, Transition,
};
