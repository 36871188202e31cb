//! Animation clips assembled from ordered sprite frames.

use serde::{Deserialize, Serialize};

use super::direction::{Compass, NativeDirection};

/// One keyframe of a clip: a sprite reference and the time it fires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipFrame {
    /// Sprite path relative to the output root.
    pub sprite: String,
    /// Seconds from clip start.
    pub time: f32,
}

/// A playable sprite animation for one label and direction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationClip {
    pub name: String,
    pub label: String,
    pub native: NativeDirection,
    /// Compass direction the frames were drawn facing.
    pub source: Compass,
    pub frame_rate: f32,
    #[serde(rename = "loop")]
    pub looping: bool,
    pub frames: Vec<ClipFrame>,
    pub valid: bool,
}

impl AnimationClip {
    /// An invalid clip with no frames, standing in for missing art.
    pub fn empty(
        name: impl Into<String>,
        label: impl Into<String>,
        native: NativeDirection,
        source: Compass,
    ) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            native,
            source,
            frame_rate: 0.0,
            looping: false,
            frames: Vec::new(),
            valid: false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Clip length in seconds (last frame's time plus one frame).
    pub fn duration(&self) -> f32 {
        if self.frames.is_empty() || self.frame_rate <= 0.0 {
            return 0.0;
        }
        self.frames.len() as f32 / self.frame_rate
    }
}
