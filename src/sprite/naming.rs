//! Frame naming conventions.
//!
//! Sliced frames get deterministic names built from a base name, an
//! animation label, the sheet row's compass code and the column index.
//! The parser reverses the process for pre-sliced frame files.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::Compass;

/// Label used when a name or sheet carries no animation label.
pub const DEFAULT_LABEL: &str = "idle";

/// How sliced frames are named.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamingConvention {
    /// `base_DIR_FF`
    DirectionFirst,
    /// `base_FF_DIR`
    FrameFirst,
    /// `base_TYPE_DIR_FF`
    #[default]
    TypeDirectionFrame,
    /// `base_NNN`
    IndexOnly,
}

impl NamingConvention {
    pub const ALL: [NamingConvention; 4] = [
        NamingConvention::DirectionFirst,
        NamingConvention::FrameFirst,
        NamingConvention::TypeDirectionFrame,
        NamingConvention::IndexOnly,
    ];

    /// Parse a convention from its config/CLI spelling.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "direction_first" | "dir_frame" => Some(NamingConvention::DirectionFirst),
            "frame_first" | "frame_dir" => Some(NamingConvention::FrameFirst),
            "type_direction_frame" | "type_dir_frame" => Some(NamingConvention::TypeDirectionFrame),
            "index_only" | "index" => Some(NamingConvention::IndexOnly),
            _ => None,
        }
    }

    /// Build the name of the frame at (`row`, `column`).
    pub fn frame_name(&self, base: &str, label: &str, row: u32, column: u32, columns: u32) -> String {
        let base = sanitize_base(base);
        let dir = direction_code(row);
        match self {
            NamingConvention::DirectionFirst => format!("{}_{}_{:02}", base, dir, column),
            NamingConvention::FrameFirst => format!("{}_{:02}_{}", base, column, dir),
            NamingConvention::TypeDirectionFrame => {
                format!("{}_{}_{}_{:02}", base, sanitize_label(label), dir, column)
            }
            NamingConvention::IndexOnly => {
                let index = u64::from(row) * u64::from(columns) + u64::from(column);
                format!("{}_{:03}", base, index)
            }
        }
    }
}

impl fmt::Display for NamingConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NamingConvention::DirectionFirst => "direction_first",
            NamingConvention::FrameFirst => "frame_first",
            NamingConvention::TypeDirectionFrame => "type_direction_frame",
            NamingConvention::IndexOnly => "index_only",
        };
        write!(f, "{}", s)
    }
}

/// Compass code for a sheet row; rows past the compass table become `R<row>`.
pub fn direction_code(row: u32) -> String {
    match Compass::from_row(row) {
        Some(dir) => dir.code().to_string(),
        None => format!("R{}", row),
    }
}

/// Base names are a single name token: underscores and spaces become dashes.
pub fn sanitize_base(base: &str) -> String {
    let cleaned: String = base
        .trim()
        .chars()
        .map(|c| if c == '_' || c.is_whitespace() { '-' } else { c })
        .collect();
    if cleaned.is_empty() {
        "sprite".to_string()
    } else {
        cleaned
    }
}

/// Labels are lower-case; spaces become underscores.
pub fn sanitize_label(label: &str) -> String {
    let cleaned: String = label
        .trim()
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c.to_ascii_lowercase() })
        .collect();
    if cleaned.is_empty() {
        DEFAULT_LABEL.to_string()
    } else {
        cleaned
    }
}

/// Identity of a frame recovered from its file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameKey {
    pub base: String,
    pub label: Option<String>,
    /// Direction token as written, upper-cased. Not necessarily a compass code.
    pub direction: String,
    pub index: u32,
}

impl FrameKey {
    /// The animation label, defaulting to idle.
    pub fn label_or_default(&self) -> &str {
        self.label.as_deref().unwrap_or(DEFAULT_LABEL)
    }

    /// The compass direction, when the token is a compass code.
    pub fn compass(&self) -> Option<Compass> {
        parse_dir(&self.direction)
    }

    /// Name shared by every frame of one (base, label, direction) series.
    pub fn series(&self) -> String {
        format!("{}_{}_{}", self.base, self.label_or_default(), self.direction)
    }
}

fn parse_index(token: &str) -> Option<u32> {
    if token.is_empty() || !token.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    token.parse().ok()
}

fn parse_dir(token: &str) -> Option<Compass> {
    Compass::from_code(&token.to_ascii_uppercase())
}

/// Upper-case alphanumeric tokens (`UP`, `R8`) read as directions even when
/// they are not compass codes. Labels are lower-case.
fn is_direction_token(token: &str) -> bool {
    token.chars().any(|c| c.is_ascii_uppercase())
        && token
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
}

/// Parse a frame file stem written with a directional naming convention.
///
/// Accepts `base_DIR_FF`, `base_TYPE_DIR_FF` and `base_FF_DIR` forms.
/// `base_TYPE_DIR_FF` also accepts direction tokens outside the compass
/// table; resolving those is left to the direction mapper. Index-only names
/// carry no direction and return `None`.
pub fn parse_frame_name(stem: &str) -> Option<FrameKey> {
    let tokens: Vec<&str> = stem.split('_').filter(|t| !t.is_empty()).collect();
    if tokens.len() < 3 {
        return None;
    }

    let n = tokens.len();
    let dir_then_index = parse_index(tokens[n - 1]).filter(|_| {
        let dir = tokens[n - 2];
        parse_dir(dir).is_some() || (n >= 4 && is_direction_token(dir))
    });
    let (direction, index) = match dir_then_index {
        Some(index) => (tokens[n - 2], index),
        None => match (parse_index(tokens[n - 2]), parse_dir(tokens[n - 1])) {
            (Some(index), Some(_)) => (tokens[n - 1], index),
            _ => return None,
        },
    };

    let rest = &tokens[..n - 2];
    let base = rest[0].to_string();
    let label = if rest.len() > 1 {
        Some(rest[1..].join("_").to_ascii_lowercase())
    } else {
        None
    };

    Some(FrameKey {
        base,
        label,
        direction: direction.to_ascii_uppercase(),
        index,
    })
}

/// The label part of a sheet file stem, if it has one: `feca_walk` -> `walk`.
pub fn sheet_label(stem: &str) -> Option<String> {
    let tokens: Vec<&str> = stem.split('_').filter(|t| !t.is_empty()).collect();
    match tokens.split_first() {
        Some((_, rest)) if !rest.is_empty() => Some(sanitize_label(&rest.join("_"))),
        _ => None,
    }
}

/// Split a sheet file stem into (base, label): `feca_walk` -> (`feca`, `walk`).
pub fn parse_sheet_stem(stem: &str) -> (String, String) {
    let base = stem
        .split('_')
        .find(|t| !t.is_empty())
        .unwrap_or("sprite")
        .to_string();
    let label = sheet_label(stem).unwrap_or_else(|| DEFAULT_LABEL.to_string());
    (base, label)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_frame_names_per_convention() {
        assert_eq!(
            NamingConvention::DirectionFirst.frame_name("feca", "walk", 1, 3, 8),
            "feca_SW_03"
        );
        assert_eq!(
            NamingConvention::FrameFirst.frame_name("feca", "walk", 1, 3, 8),
            "feca_03_SW"
        );
        assert_eq!(
            NamingConvention::TypeDirectionFrame.frame_name("feca", "walk", 1, 3, 8),
            "feca_walk_SW_03"
        );
        assert_eq!(
            NamingConvention::IndexOnly.frame_name("feca", "walk", 1, 3, 8),
            "feca_011"
        );
    }

    #[test]
    fn test_names_unique_and_reproducible_across_grid() {
        for convention in NamingConvention::ALL {
            let names: Vec<String> = (0..8)
                .flat_map(|r| (0..8).map(move |c| (r, c)))
                .map(|(r, c)| convention.frame_name("feca", "idle", r, c, 8))
                .collect();
            let unique: HashSet<&String> = names.iter().collect();
            assert_eq!(unique.len(), 64, "{convention}");

            let again: Vec<String> = (0..8)
                .flat_map(|r| (0..8).map(move |c| (r, c)))
                .map(|(r, c)| convention.frame_name("feca", "idle", r, c, 8))
                .collect();
            assert_eq!(names, again);
        }
    }

    #[test]
    fn test_rows_past_compass_table_stay_unique() {
        assert_eq!(direction_code(8), "R8");
        let a = NamingConvention::DirectionFirst.frame_name("x", "", 0, 0, 1);
        let b = NamingConvention::DirectionFirst.frame_name("x", "", 8, 0, 1);
        assert_ne!(a, b);
    }

    #[test]
    fn test_base_with_underscore_is_sanitized() {
        let name = NamingConvention::TypeDirectionFrame.frame_name("big boss_v2", "Walk", 0, 0, 1);
        assert_eq!(name, "big-boss-v2_walk_S_00");
    }

    #[test]
    fn test_parse_type_direction_frame() {
        let key = parse_frame_name("feca_walk_SW_03").unwrap();
        assert_eq!(key.base, "feca");
        assert_eq!(key.label.as_deref(), Some("walk"));
        assert_eq!(key.compass(), Some(Compass::SW));
        assert_eq!(key.index, 3);
        assert_eq!(key.series(), "feca_walk_SW");
    }

    #[test]
    fn test_parse_direction_first_has_default_label() {
        let key = parse_frame_name("feca_N_07").unwrap();
        assert_eq!(key.label, None);
        assert_eq!(key.label_or_default(), "idle");
        assert_eq!(key.compass(), Some(Compass::N));
        assert_eq!(key.index, 7);
    }

    #[test]
    fn test_parse_frame_first() {
        let key = parse_frame_name("feca_12_e").unwrap();
        assert_eq!(key.direction, "E");
        assert_eq!(key.compass(), Some(Compass::E));
        assert_eq!(key.index, 12);
    }

    #[test]
    fn test_parse_multi_token_label() {
        let key = parse_frame_name("feca_emote_wave_S_00").unwrap();
        assert_eq!(key.label.as_deref(), Some("emote_wave"));
    }

    #[test]
    fn test_parse_round_trips_generated_names() {
        for convention in [
            NamingConvention::DirectionFirst,
            NamingConvention::FrameFirst,
            NamingConvention::TypeDirectionFrame,
        ] {
            for row in 0..8 {
                let name = convention.frame_name("feca", "attack", row, 5, 8);
                let key = parse_frame_name(&name).unwrap();
                assert_eq!(key.compass(), Compass::from_row(row));
                assert_eq!(key.index, 5);
            }
        }
    }

    #[test]
    fn test_parse_rejects_unstructured_names() {
        assert_eq!(parse_frame_name("feca_012"), None);
        assert_eq!(parse_frame_name("background"), None);
        assert_eq!(parse_frame_name("feca_walk_sheet"), None);
        assert_eq!(parse_frame_name(""), None);
        assert_eq!(parse_frame_name("feca_walk_01"), None);
    }

    #[test]
    fn test_parse_unknown_direction_token() {
        let key = parse_frame_name("feca_idle_UP_00").unwrap();
        assert_eq!(key.base, "feca");
        assert_eq!(key.label.as_deref(), Some("idle"));
        assert_eq!(key.direction, "UP");
        assert_eq!(key.compass(), None);
        assert_eq!(key.series(), "feca_idle_UP");

        // Without a label an unknown token is not trusted as a direction
        assert_eq!(parse_frame_name("feca_UP_00"), None);
    }

    #[test]
    fn test_index_only_name_does_not_overflow() {
        let name = NamingConvention::IndexOnly.frame_name("big", "idle", 70_000, 1, 70_000);
        assert_eq!(name, "big_4900000001");
    }

    #[test]
    fn test_sheet_label() {
        assert_eq!(sheet_label("iop_walk").as_deref(), Some("walk"));
        assert_eq!(sheet_label("portrait"), None);
        assert_eq!(sheet_label("_portrait_"), None);
    }

    #[test]
    fn test_parse_sheet_stem() {
        assert_eq!(parse_sheet_stem("feca_walk"), ("feca".to_string(), "walk".to_string()));
        assert_eq!(parse_sheet_stem("feca"), ("feca".to_string(), "idle".to_string()));
        assert_eq!(
            parse_sheet_stem("iop_Emote_Wave"),
            ("iop".to_string(), "emote_wave".to_string())
        );
    }

    #[test]
    fn test_parse_convention_spelling() {
        assert_eq!(
            NamingConvention::parse("type-direction-frame"),
            Some(NamingConvention::TypeDirectionFrame)
        );
        assert_eq!(NamingConvention::parse("index"), Some(NamingConvention::IndexOnly));
        assert_eq!(NamingConvention::parse("zzz"), None);
    }
}
