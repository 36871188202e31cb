//! Compass to native direction mapping.
//!
//! The source art has five unique facings. Westward facings reuse the
//! eastward art flipped horizontally.

use crate::error::{MigrateError, Result};
use crate::types::{Compass, DirectionMapping, NativeDirection};

const fn mapping(native: NativeDirection, mirror: bool) -> DirectionMapping {
    DirectionMapping { native, mirror }
}

const DIRECTION_TABLE: [(Compass, DirectionMapping); 8] = [
    (Compass::S, mapping(NativeDirection::Front, false)),
    (Compass::SE, mapping(NativeDirection::FrontSide, false)),
    (Compass::E, mapping(NativeDirection::Side, false)),
    (Compass::NE, mapping(NativeDirection::BackSide, false)),
    (Compass::N, mapping(NativeDirection::Back, false)),
    (Compass::NW, mapping(NativeDirection::BackSide, true)),
    (Compass::W, mapping(NativeDirection::Side, true)),
    (Compass::SW, mapping(NativeDirection::FrontSide, true)),
];

/// Mapping used for direction names that cannot be parsed.
pub const FALLBACK_MAPPING: DirectionMapping = mapping(NativeDirection::Front, false);

/// Map a compass direction to its native art and mirror flag.
pub fn map_direction(direction: Compass) -> DirectionMapping {
    DIRECTION_TABLE
        .iter()
        .find(|(d, _)| *d == direction)
        .map(|(_, m)| *m)
        .unwrap_or(FALLBACK_MAPPING)
}

/// The compass direction a native facing is drawn for without mirroring.
pub fn canonical_direction(native: NativeDirection) -> Compass {
    DIRECTION_TABLE
        .iter()
        .find(|(_, m)| m.native == native && !m.mirror)
        .map(|(d, _)| *d)
        .unwrap_or(Compass::S)
}

/// Direction mapper for direction names coming from file names or config.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectionMapper {
    strict: bool,
}

impl DirectionMapper {
    /// Unknown names map to the front facing with a logged warning.
    pub fn lenient() -> Self {
        Self { strict: false }
    }

    /// Unknown names are an error.
    pub fn strict() -> Self {
        Self { strict: true }
    }

    pub fn new(strict: bool) -> Self {
        Self { strict }
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    pub fn map(&self, direction: Compass) -> DirectionMapping {
        map_direction(direction)
    }

    /// Map a direction name such as "SW" or "south_west".
    pub fn map_name(&self, name: &str) -> Result<DirectionMapping> {
        match Compass::parse(name) {
            Some(direction) => Ok(map_direction(direction)),
            None if self.strict => Err(MigrateError::UnknownDirection {
                name: name.to_string(),
            }),
            None => {
                log::warn!(
                    "unknown direction '{}', using {} unmirrored",
                    name,
                    FALLBACK_MAPPING.native
                );
                Ok(FALLBACK_MAPPING)
            }
        }
    }
}
