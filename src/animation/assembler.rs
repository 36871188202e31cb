//! Animation clip assembly.
//!
//! Frames are grouped per (label, native direction). Each group becomes one
//! clip whose keyframes fire at `index / frame_rate`. Missing art never fails
//! assembly: an empty group yields an invalid, frameless clip.

use std::collections::{BTreeMap, BTreeSet};

use crate::types::{AnimationClip, ClipFrame, ClipRef, Compass, NativeDirection};

use super::direction::{canonical_direction, map_direction};

/// Labels containing any of these keywords play once.
pub const ONE_SHOT_KEYWORDS: &[&str] = &[
    "death", "die", "hit", "attack", "cast", "skill", "emote", "jump",
];

/// Decides whether clips for a label loop.
pub trait LoopPolicy {
    fn loops(&self, label: &str) -> bool;
}

impl<F: Fn(&str) -> bool> LoopPolicy for F {
    fn loops(&self, label: &str) -> bool {
        self(label)
    }
}

/// Locomotion and idles loop; actions play once.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultLoopPolicy;

impl LoopPolicy for DefaultLoopPolicy {
    fn loops(&self, label: &str) -> bool {
        let label = label.to_ascii_lowercase();
        !ONE_SHOT_KEYWORDS.iter().any(|k| label.contains(k))
    }
}

/// A frame tagged with its animation label, facing and frame index.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledFrame {
    pub label: String,
    pub direction: Compass,
    pub index: u32,
    /// Sprite path relative to the output root.
    pub sprite: String,
    /// Art the frame was cut from: a sheet path or a frame series name.
    pub source: String,
}

/// Identity of a clip.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ClipKey {
    pub label: String,
    pub native: NativeDirection,
    /// Facing the frames were drawn for.
    pub source: Compass,
}

impl ClipKey {
    pub fn new(label: impl Into<String>, source: Compass) -> Self {
        Self {
            label: label.into(),
            native: map_direction(source).native,
            source,
        }
    }

    /// Clip name, e.g. `walk_front_side`.
    pub fn clip_name(&self) -> String {
        format!("{}_{}", self.label, self.native.code())
    }
}

/// Assemble already-ordered frames into a clip.
///
/// Frames are not re-sorted. A frame rate that is not a positive finite
/// number, or an empty frame list, yields an invalid empty clip.
pub fn assemble(
    key: &ClipKey,
    frames: &[LabeledFrame],
    frame_rate: f32,
    policy: &impl LoopPolicy,
) -> AnimationClip {
    let name = key.clip_name();
    if frames.is_empty() || !frame_rate.is_finite() || frame_rate <= 0.0 {
        return AnimationClip::empty(name, key.label.clone(), key.native, key.source);
    }

    let frames = frames
        .iter()
        .enumerate()
        .map(|(i, f)| ClipFrame {
            sprite: f.sprite.clone(),
            time: i as f32 / frame_rate,
        })
        .collect();

    AnimationClip {
        name,
        label: key.label.clone(),
        native: key.native,
        source: key.source,
        frame_rate,
        looping: policy.loops(&key.label),
        frames,
        valid: true,
    }
}

/// Clips for one character, keyed by (label, native direction).
#[derive(Debug, Clone, Default)]
pub struct ClipLibrary {
    clips: BTreeMap<(String, NativeDirection), AnimationClip>,
    /// Directory (relative to the output root) clip assets are written to.
    asset_dir: String,
}

impl ClipLibrary {
    pub fn new(asset_dir: impl Into<String>) -> Self {
        Self {
            clips: BTreeMap::new(),
            asset_dir: asset_dir.into(),
        }
    }

    pub fn insert(&mut self, clip: AnimationClip) {
        self.clips.insert((clip.label.clone(), clip.native), clip);
    }

    pub fn get(&self, label: &str, native: NativeDirection) -> Option<&AnimationClip> {
        self.clips.get(&(label.to_string(), native))
    }

    /// Find the clip presenting `label` facing `direction`, and whether it
    /// must be mirrored to do so. Invalid clips are not returned.
    pub fn resolve(&self, label: &str, direction: Compass) -> Option<(&AnimationClip, bool)> {
        let mapping = map_direction(direction);
        let clip = self.get(label, mapping.native)?;
        if !clip.valid {
            return None;
        }
        Some((clip, clip.source != direction))
    }

    /// All labels with at least one valid clip, sorted.
    pub fn labels(&self) -> BTreeSet<&str> {
        self.clips
            .values()
            .filter(|c| c.valid)
            .map(|c| c.label.as_str())
            .collect()
    }

    pub fn has_label(&self, label: &str) -> bool {
        self.clips.values().any(|c| c.valid && c.label == label)
    }

    pub fn clips(&self) -> impl Iterator<Item = &AnimationClip> {
        self.clips.values()
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    pub fn asset_dir(&self) -> &str {
        &self.asset_dir
    }

    /// Path of a clip asset relative to the output root.
    pub fn clip_path(&self, clip: &AnimationClip) -> String {
        if self.asset_dir.is_empty() {
            format!("{}.anim.json", clip.name)
        } else {
            format!("{}/{}.anim.json", self.asset_dir, clip.name)
        }
    }

    pub fn clip_ref(&self, clip: &AnimationClip) -> ClipRef {
        ClipRef {
            clip: clip.name.clone(),
            path: self.clip_path(clip),
        }
    }
}

/// Result of assembling every frame of a character.
#[derive(Debug, Clone, Default)]
pub struct Assembly {
    pub library: ClipLibrary,
    pub notes: Vec<String>,
}

/// Group labelled frames into clips.
///
/// Within a (label, native) group the unmirrored facing is preferred; when
/// only the mirrored twin was drawn its frames are used and the clip records
/// that facing as its source. A clip takes its frames from a single source,
/// the first one seen; frames of later sources are dropped with a note.
/// Frames are ordered by frame index.
pub fn assemble_all(
    frames: Vec<LabeledFrame>,
    asset_dir: impl Into<String>,
    frame_rate: f32,
    policy: &impl LoopPolicy,
) -> Assembly {
    let mut groups: BTreeMap<(String, NativeDirection), BTreeMap<Compass, Vec<LabeledFrame>>> =
        BTreeMap::new();

    for frame in frames {
        let native = map_direction(frame.direction).native;
        groups
            .entry((frame.label.clone(), native))
            .or_default()
            .entry(frame.direction)
            .or_default()
            .push(frame);
    }

    let mut assembly = Assembly {
        library: ClipLibrary::new(asset_dir),
        notes: Vec::new(),
    };

    for ((label, native), mut by_direction) in groups {
        let canonical = canonical_direction(native);
        let source = if by_direction.contains_key(&canonical) {
            canonical
        } else {
            canonical.mirror_twin()
        };

        let mut chosen = by_direction.remove(&source).unwrap_or_default();
        if let Some(first) = chosen.first().map(|f| f.source.clone()) {
            let others: BTreeSet<String> = chosen
                .iter()
                .filter(|f| f.source != first)
                .map(|f| f.source.clone())
                .collect();
            if !others.is_empty() {
                chosen.retain(|f| f.source == first);
                for other in others {
                    assembly.notes.push(format!(
                        "{}_{}: frames from {} ignored, clip uses {}",
                        label, source, other, first
                    ));
                }
            }
        }
        for (ignored, frames) in &by_direction {
            assembly.notes.push(format!(
                "{}: {} frame(s) facing {} ignored, drawn by mirroring {}",
                label,
                frames.len(),
                ignored,
                source
            ));
        }

        chosen.sort_by_key(|f| f.index);
        if let Some(dup) = chosen.windows(2).find(|w| w[0].index == w[1].index) {
            assembly.notes.push(format!(
                "{}_{}: duplicate frame index {}",
                label, source, dup[0].index
            ));
        }

        let key = ClipKey {
            label,
            native,
            source,
        };
        let clip = assemble(&key, &chosen, frame_rate, policy);
        if !clip.valid {
            assembly
                .notes
                .push(format!("{}: no playable frames", clip.name));
        }
        assembly.library.insert(clip);
    }

    assembly
}
