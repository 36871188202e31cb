//! Compass and native direction vocabularies.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the eight compass points used by the runtime movement model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Compass {
    S,
    SW,
    W,
    NW,
    N,
    NE,
    E,
    SE,
}

/// Sheet row order: row `r` of a directional sprite sheet faces `SHEET_ROWS[r]`.
pub const SHEET_ROWS: [Compass; 8] = [
    Compass::S,
    Compass::SW,
    Compass::W,
    Compass::NW,
    Compass::N,
    Compass::NE,
    Compass::E,
    Compass::SE,
];

/// The four cardinal directions, for 4-way animation sets.
pub const CARDINALS: [Compass; 4] = [Compass::S, Compass::W, Compass::N, Compass::E];

const DIAGONAL: f32 = std::f32::consts::FRAC_1_SQRT_2;

impl Compass {
    /// Short code used in frame names.
    pub fn code(&self) -> &'static str {
        match self {
            Compass::S => "S",
            Compass::SW => "SW",
            Compass::W => "W",
            Compass::NW => "NW",
            Compass::N => "N",
            Compass::NE => "NE",
            Compass::E => "E",
            Compass::SE => "SE",
        }
    }

    /// Parse a compass code or long name ("sw", "south_west", "SouthWest").
    pub fn parse(s: &str) -> Option<Self> {
        let key: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match key.as_str() {
            "s" | "south" | "down" | "front" => Some(Compass::S),
            "sw" | "southwest" => Some(Compass::SW),
            "w" | "west" | "left" => Some(Compass::W),
            "nw" | "northwest" => Some(Compass::NW),
            "n" | "north" | "up" | "back" => Some(Compass::N),
            "ne" | "northeast" => Some(Compass::NE),
            "e" | "east" | "right" => Some(Compass::E),
            "se" | "southeast" => Some(Compass::SE),
            _ => None,
        }
    }

    /// Exact short code match, as written by the slicer ("SW", not "sw").
    pub fn from_code(code: &str) -> Option<Self> {
        SHEET_ROWS.into_iter().find(|d| d.code() == code)
    }

    /// Direction for a sheet row, if the row is within the compass table.
    pub fn from_row(row: u32) -> Option<Self> {
        SHEET_ROWS.get(row as usize).copied()
    }

    /// Unit vector in (x right, y up) space, for blend space placement.
    pub fn unit_vector(&self) -> (f32, f32) {
        match self {
            Compass::S => (0.0, -1.0),
            Compass::SW => (-DIAGONAL, -DIAGONAL),
            Compass::W => (-1.0, 0.0),
            Compass::NW => (-DIAGONAL, DIAGONAL),
            Compass::N => (0.0, 1.0),
            Compass::NE => (DIAGONAL, DIAGONAL),
            Compass::E => (1.0, 0.0),
            Compass::SE => (DIAGONAL, -DIAGONAL),
        }
    }

    /// The direction reflected across the vertical axis (E <-> W).
    pub fn mirror_twin(&self) -> Self {
        match self {
            Compass::S => Compass::S,
            Compass::SW => Compass::SE,
            Compass::W => Compass::E,
            Compass::NW => Compass::NE,
            Compass::N => Compass::N,
            Compass::NE => Compass::NW,
            Compass::E => Compass::W,
            Compass::SE => Compass::SW,
        }
    }
}

impl fmt::Display for Compass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Unique directions present in the source art.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NativeDirection {
    Front,
    FrontSide,
    Side,
    BackSide,
    Back,
}

impl NativeDirection {
    pub fn code(&self) -> &'static str {
        match self {
            NativeDirection::Front => "front",
            NativeDirection::FrontSide => "front_side",
            NativeDirection::Side => "side",
            NativeDirection::BackSide => "back_side",
            NativeDirection::Back => "back",
        }
    }
}

impl fmt::Display for NativeDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// How a compass direction is drawn with the source art.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectionMapping {
    pub native: NativeDirection,
    pub mirror: bool,
}
