//! Animation synthesis: direction mapping, clip assembly and state machine
//! generation.

mod assembler;
mod direction;
mod state_machine;

pub use assembler::{
    assemble, assemble_all, Assembly, ClipKey, ClipLibrary, DefaultLoopPolicy, LabeledFrame,
    LoopPolicy, ONE_SHOT_KEYWORDS,
};
pub use direction::{canonical_direction, map_direction, DirectionMapper, FALLBACK_MAPPING};
pub use state_machine::{
    generate, GeneratedStateMachine, GeneratorOptions, BASE_LAYER, COMBAT_ACTIONS, COMBAT_LAYER,
    EMOTE_LAYER, EMOTE_PREFIX, EMPTY_STATE, IDLE_LABELS, MOVE_LABELS, PARAM_EMOTE,
    PARAM_EMOTE_INDEX, PARAM_IS_MOVING, PARAM_MOVE_X, PARAM_MOVE_Y, PARAM_RESET, PARAM_SPEED,
};
