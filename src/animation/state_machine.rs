//! Procedural state machine generation.
//!
//! Builds up to three layers from a character's clip library:
//!
//! - **Base Layer**: Idle and Move, driven by `isMoving`, each a directional
//!   blend space over (`moveX`, `moveY`) or a single front-facing clip.
//! - **Combat**: trigger-entered one-shot actions on top of an empty resting
//!   state. Death only leaves through `reset`.
//! - **Emote**: emote clips selected by `emoteIndex` and fired by `emote`.
//!
//! Missing art never fails generation; it removes states and leaves a note.

use crate::types::{
    BlendChild, BlendSpace, Compass, Comparator, Condition, Layer, Motion, ParamType, Parameter,
    State, StateMachineSpec, Transition, CARDINALS, SHEET_ROWS,
};

use super::assembler::ClipLibrary;

pub const BASE_LAYER: &str = "Base Layer";
pub const COMBAT_LAYER: &str = "Combat";
pub const EMOTE_LAYER: &str = "Emote";

pub const PARAM_MOVE_X: &str = "moveX";
pub const PARAM_MOVE_Y: &str = "moveY";
pub const PARAM_SPEED: &str = "speed";
pub const PARAM_IS_MOVING: &str = "isMoving";
pub const PARAM_RESET: &str = "reset";
pub const PARAM_EMOTE: &str = "emote";
pub const PARAM_EMOTE_INDEX: &str = "emoteIndex";

/// Resting state name for the action layers.
pub const EMPTY_STATE: &str = "Empty";

/// Labels recognised as idles, in preference order.
pub const IDLE_LABELS: &[&str] = &["idle", "static", "stand"];

/// Labels recognised as locomotion, in preference order.
pub const MOVE_LABELS: &[&str] = &["walk", "run", "move"];

/// Combat actions: (state name, trigger parameter, candidate labels).
pub const COMBAT_ACTIONS: &[(&str, &str, &[&str])] = &[
    ("Attack", "attack", &["attack"]),
    ("Cast", "cast", &["cast", "spell", "skill"]),
    ("Hit", "hit", &["hit", "hurt", "damage"]),
    ("Death", "death", &["death", "die", "dead"]),
];

/// Prefix of emote labels.
pub const EMOTE_PREFIX: &str = "emote";

const STATE_BLEND: f32 = 0.1;
const ACTION_ENTER_BLEND: f32 = 0.05;
const ACTION_EXIT_TIME: f32 = 1.0;
const EMOTE_EXIT_TIME: f32 = 0.9;

/// Which parts of the state machine to generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratorOptions {
    pub create_idle: bool,
    pub create_movement: bool,
    pub create_combat: bool,
    pub create_emote: bool,
    pub use_8_directions: bool,
    pub use_blend_spaces: bool,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            create_idle: true,
            create_movement: true,
            create_combat: true,
            create_emote: true,
            use_8_directions: true,
            use_blend_spaces: true,
        }
    }
}

/// A generated state machine plus the build log of skipped content.
#[derive(Debug, Clone)]
pub struct GeneratedStateMachine {
    pub spec: StateMachineSpec,
    pub notes: Vec<String>,
}

/// Find the library label for a set of candidates: exact matches first, then
/// the first (sorted) label starting with a candidate.
fn find_label(library: &ClipLibrary, candidates: &[&str]) -> Option<String> {
    if let Some(exact) = candidates.iter().find(|c| library.has_label(c)) {
        return Some(exact.to_string());
    }
    let labels = library.labels();
    candidates.iter().find_map(|c| {
        labels
            .iter()
            .find(|l| l.starts_with(c))
            .map(|l| l.to_string())
    })
}

struct Generator<'a> {
    library: &'a ClipLibrary,
    options: GeneratorOptions,
    notes: Vec<String>,
}

impl<'a> Generator<'a> {
    fn directions(&self) -> &'static [Compass] {
        if self.options.use_8_directions {
            &SHEET_ROWS
        } else {
            &CARDINALS
        }
    }

    /// Motion presenting `label` in every configured direction.
    fn directional_motion(&mut self, label: &str) -> Option<Motion> {
        if self.options.use_blend_spaces {
            let mut children = Vec::new();
            for &dir in self.directions() {
                match self.library.resolve(label, dir) {
                    Some((clip, mirror)) => children.push(BlendChild {
                        motion: self.library.clip_ref(clip),
                        position: dir.unit_vector(),
                        mirror,
                    }),
                    None => self.notes.push(format!("{}: no clip facing {}", label, dir)),
                }
            }
            if children.is_empty() {
                return None;
            }
            return Some(Motion::BlendSpace(BlendSpace {
                parameter_x: PARAM_MOVE_X.to_string(),
                parameter_y: PARAM_MOVE_Y.to_string(),
                children,
            }));
        }

        let (clip, mirror) = self
            .directions()
            .iter()
            .find_map(|&dir| self.library.resolve(label, dir))?;
        Some(Motion::Clip {
            clip: self.library.clip_ref(clip),
            mirror,
        })
    }

    fn base_layer(&mut self) -> Layer {
        let mut layer = Layer::new(BASE_LAYER, 1.0);
        layer
            .add_parameter(Parameter::new(PARAM_MOVE_X, ParamType::Float))
            .add_parameter(Parameter::new(PARAM_MOVE_Y, ParamType::Float))
            .add_parameter(Parameter::new(PARAM_SPEED, ParamType::Float))
            .add_parameter(Parameter::new(PARAM_IS_MOVING, ParamType::Bool));

        let idle = if self.options.create_idle {
            self.locomotion_state("Idle", IDLE_LABELS)
        } else {
            None
        };
        let movement = if self.options.create_movement {
            self.locomotion_state("Move", MOVE_LABELS)
        } else {
            None
        };

        let has_both = idle.is_some() && movement.is_some();
        if let Some(state) = idle {
            layer.add_state(state);
        }
        if let Some(state) = movement {
            layer.add_state(state);
        }

        if layer.states.is_empty() {
            self.notes
                .push("Base Layer: no idle or movement clips, using an empty Idle state".to_string());
            layer.add_state(State::empty("Idle"));
        }

        if has_both {
            layer
                .add_transition(Transition::on(
                    "Idle",
                    "Move",
                    vec![Condition::when(PARAM_IS_MOVING)],
                    STATE_BLEND,
                ))
                .add_transition(Transition::on(
                    "Move",
                    "Idle",
                    vec![Condition::unless(PARAM_IS_MOVING)],
                    STATE_BLEND,
                ));
        }

        layer
    }

    fn locomotion_state(&mut self, name: &str, candidates: &[&str]) -> Option<State> {
        let Some(label) = find_label(self.library, candidates) else {
            self.notes
                .push(format!("{}: no clip labelled {}", name, candidates.join("/")));
            return None;
        };
        let motion = self.directional_motion(&label)?;
        Some(State::new(name, motion))
    }

    fn combat_layer(&mut self) -> Option<Layer> {
        let mut layer = Layer::new(COMBAT_LAYER, 1.0);
        layer.add_state(State::empty(EMPTY_STATE));

        for &(state_name, trigger, candidates) in COMBAT_ACTIONS {
            let Some(label) = find_label(self.library, candidates) else {
                self.notes
                    .push(format!("Combat: no {} clip, skipping {}", trigger, state_name));
                continue;
            };
            let Some(motion) = self.directional_motion(&label) else {
                continue;
            };

            layer
                .add_parameter(Parameter::new(trigger, ParamType::Trigger))
                .add_state(State::new(state_name, motion))
                .add_transition(Transition::on(
                    EMPTY_STATE,
                    state_name,
                    vec![Condition::when(trigger)],
                    ACTION_ENTER_BLEND,
                ));

            if state_name == "Death" {
                layer
                    .add_parameter(Parameter::new(PARAM_RESET, ParamType::Trigger))
                    .add_transition(Transition::on(
                        state_name,
                        EMPTY_STATE,
                        vec![Condition::when(PARAM_RESET)],
                        0.0,
                    ));
            } else {
                layer.add_transition(Transition::after(
                    state_name,
                    EMPTY_STATE,
                    ACTION_EXIT_TIME,
                    STATE_BLEND,
                ));
            }
        }

        if layer.states.len() == 1 {
            self.notes
                .push("Combat: no combat clips, layer omitted".to_string());
            return None;
        }
        Some(layer)
    }

    fn emote_layer(&mut self) -> Option<Layer> {
        let emotes: Vec<String> = self
            .library
            .labels()
            .into_iter()
            .filter(|l| l.starts_with(EMOTE_PREFIX))
            .map(|l| l.to_string())
            .collect();

        if emotes.is_empty() {
            self.notes.push("Emote: no emote clips, layer omitted".to_string());
            return None;
        }

        let mut layer = Layer::new(EMOTE_LAYER, 1.0);
        layer
            .add_parameter(Parameter::new(PARAM_EMOTE, ParamType::Trigger))
            .add_parameter(Parameter::new(PARAM_EMOTE_INDEX, ParamType::Int))
            .add_state(State::empty(EMPTY_STATE));

        for (index, label) in emotes.iter().enumerate() {
            let Some(motion) = self.directional_motion(label) else {
                continue;
            };
            layer
                .add_state(State::new(label.as_str(), motion))
                .add_transition(Transition::on(
                    EMPTY_STATE,
                    label.as_str(),
                    vec![
                        Condition::when(PARAM_EMOTE),
                        Condition::new(PARAM_EMOTE_INDEX, Comparator::Equals, index as f32),
                    ],
                    STATE_BLEND,
                ))
                .add_transition(Transition::after(
                    label.as_str(),
                    EMPTY_STATE,
                    EMOTE_EXIT_TIME,
                    STATE_BLEND,
                ));
        }

        if layer.states.len() == 1 {
            return None;
        }
        Some(layer)
    }
}

/// Generate the layered state machine for one character.
pub fn generate(
    name: &str,
    library: &ClipLibrary,
    options: GeneratorOptions,
) -> GeneratedStateMachine {
    let mut generator = Generator {
        library,
        options,
        notes: Vec::new(),
    };

    let mut spec = StateMachineSpec::new(name);
    spec.layers.push(generator.base_layer());

    if options.create_combat {
        if let Some(layer) = generator.combat_layer() {
            spec.layers.push(layer);
        }
    }

    if options.create_emote {
        if let Some(layer) = generator.emote_layer() {
            spec.layers.push(layer);
        }
    }

    for note in &generator.notes {
        log::debug!("{}: {}", name, note);
    }

    GeneratedStateMachine {
        spec,
        notes: generator.notes,
    }
}
