//! Layered animation state machine description.
//!
//! A `StateMachineSpec` is an engine-neutral value: the host engine binding
//! turns it into a real controller asset. Layers are evaluated concurrently
//! (locomotion and combat run side by side), each with a single entry state.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Parameter value types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamType {
    Float,
    Int,
    Bool,
    Trigger,
}

/// A named controller parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ParamType,
}

impl Parameter {
    pub fn new(name: impl Into<String>, kind: ParamType) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// Condition comparators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparator {
    /// Bool true / trigger set.
    If,
    /// Bool false.
    IfNot,
    Greater,
    Less,
    Equals,
    NotEqual,
}

/// One transition condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub parameter: String,
    pub comparator: Comparator,
    #[serde(default)]
    pub value: f32,
}

impl Condition {
    pub fn new(parameter: impl Into<String>, comparator: Comparator, value: f32) -> Self {
        Self {
            parameter: parameter.into(),
            comparator,
            value,
        }
    }

    /// Trigger/bool-true condition.
    pub fn when(parameter: impl Into<String>) -> Self {
        Self::new(parameter, Comparator::If, 0.0)
    }

    /// Bool-false condition.
    pub fn unless(parameter: impl Into<String>) -> Self {
        Self::new(parameter, Comparator::IfNot, 0.0)
    }
}

/// A clip reference inside a state machine (by clip name and asset path).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipRef {
    pub clip: String,
    pub path: String,
}

/// A blend space child positioned in parameter space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlendChild {
    pub motion: ClipRef,
    pub position: (f32, f32),
    /// Present the clip flipped horizontally.
    pub mirror: bool,
}

/// 2D directional blend space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlendSpace {
    pub parameter_x: String,
    pub parameter_y: String,
    pub children: Vec<BlendChild>,
}

/// What a state plays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Motion {
    Clip {
        clip: ClipRef,
        mirror: bool,
    },
    BlendSpace(BlendSpace),
    /// Resting state with no motion (layer passes through).
    Empty,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct State {
    pub name: String,
    pub motion: Motion,
}

impl State {
    pub fn new(name: impl Into<String>, motion: Motion) -> Self {
        Self {
            name: name.into(),
            motion,
        }
    }

    pub fn empty(name: impl Into<String>) -> Self {
        Self::new(name, Motion::Empty)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub from: String,
    pub to: String,
    pub conditions: Vec<Condition>,
    pub has_exit_time: bool,
    pub exit_time: f32,
    pub duration: f32,
}

impl Transition {
    /// Immediate transition gated by conditions.
    pub fn on(
        from: impl Into<String>,
        to: impl Into<String>,
        conditions: Vec<Condition>,
        duration: f32,
    ) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            conditions,
            has_exit_time: false,
            exit_time: 0.0,
            duration,
        }
    }

    /// Transition taken once the source state reaches `exit_time`.
    pub fn after(
        from: impl Into<String>,
        to: impl Into<String>,
        exit_time: f32,
        duration: f32,
    ) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            conditions: Vec::new(),
            has_exit_time: true,
            exit_time,
            duration,
        }
    }
}

/// How a layer composites over the layers below it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerBlending {
    Override,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub name: String,
    pub weight: f32,
    pub blending: LayerBlending,
    pub default_state: String,
    pub states: Vec<State>,
    pub parameters: Vec<Parameter>,
    pub transitions: Vec<Transition>,
}

impl Layer {
    pub fn new(name: impl Into<String>, weight: f32) -> Self {
        Self {
            name: name.into(),
            weight,
            blending: LayerBlending::Override,
            default_state: String::new(),
            states: Vec::new(),
            parameters: Vec::new(),
            transitions: Vec::new(),
        }
    }

    /// Add a state; the first state added becomes the default.
    pub fn add_state(&mut self, state: State) -> &mut Self {
        if self.states.is_empty() {
            self.default_state = state.name.clone();
        }
        self.states.push(state);
        self
    }

    pub fn add_parameter(&mut self, parameter: Parameter) -> &mut Self {
        if !self.parameters.iter().any(|p| p.name == parameter.name) {
            self.parameters.push(parameter);
        }
        self
    }

    pub fn add_transition(&mut self, transition: Transition) -> &mut Self {
        self.transitions.push(transition);
        self
    }

    pub fn state(&self, name: &str) -> Option<&State> {
        self.states.iter().find(|s| s.name == name)
    }

    pub fn transitions_from<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Transition> {
        self.transitions.iter().filter(move |t| t.from == name)
    }
}

/// A complete layered state machine for one character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateMachineSpec {
    pub name: String,
    pub layers: Vec<Layer>,
}

impl StateMachineSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            layers: Vec::new(),
        }
    }

    pub fn layer(&self, name: &str) -> Option<&Layer> {
        self.layers.iter().find(|l| l.name == name)
    }

    /// Check structural invariants, returning one message per violation.
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();

        for layer in &self.layers {
            let state_names: BTreeSet<&str> = layer.states.iter().map(|s| s.name.as_str()).collect();
            let param_names: BTreeSet<&str> =
                layer.parameters.iter().map(|p| p.name.as_str()).collect();

            if state_names.len() != layer.states.len() {
                problems.push(format!("layer '{}' has duplicate state names", layer.name));
            }

            if !state_names.contains(layer.default_state.as_str()) {
                problems.push(format!(
                    "layer '{}' default state '{}' does not exist",
                    layer.name, layer.default_state
                ));
            }

            for t in &layer.transitions {
                for end in [&t.from, &t.to] {
                    if !state_names.contains(end.as_str()) {
                        problems.push(format!(
                            "layer '{}': transition {} -> {} references unknown state '{}'",
                            layer.name, t.from, t.to, end
                        ));
                    }
                }
                for c in &t.conditions {
                    if !param_names.contains(c.parameter.as_str()) {
                        problems.push(format!(
                            "layer '{}': transition {} -> {} uses undeclared parameter '{}'",
                            layer.name, t.from, t.to, c.parameter
                        ));
                    }
                }
            }

            for state in &layer.states {
                if let Motion::BlendSpace(bs) = &state.motion {
                    if bs.children.is_empty() {
                        problems.push(format!(
                            "layer '{}': state '{}' has a blend space with no children",
                            layer.name, state.name
                        ));
                    }
                }
            }
        }

        problems
    }
}
