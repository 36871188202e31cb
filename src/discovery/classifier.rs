//! Path classification into asset categories.
//!
//! Classification is a first-match walk over an ordered rule table. Each rule
//! pairs keywords with an extension filter so that, for example, a voice line
//! stored next to a character's sprites still lands in Audio.

use std::path::{Component, Path, PathBuf};

use crate::types::{extension_of, AssetCategory, AUDIO_EXTENSIONS, DATA_EXTENSIONS, IMAGE_EXTENSIONS, SWF_EXTENSION};

/// Keywords of this length or shorter must match a whole path token.
const SHORT_KEYWORD_LEN: usize = 3;

/// Which files a rule may claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExtFilter {
    /// Image, swf or extensionless.
    Images,
    /// Audio or extensionless.
    Audio,
}

impl ExtFilter {
    fn accepts(&self, ext: &str) -> bool {
        if ext.is_empty() {
            return true;
        }
        match self {
            ExtFilter::Images => IMAGE_EXTENSIONS.contains(&ext) || ext == SWF_EXTENSION,
            ExtFilter::Audio => AUDIO_EXTENSIONS.contains(&ext),
        }
    }
}

struct Rule {
    category: AssetCategory,
    keywords: &'static [&'static str],
    filter: ExtFilter,
}

const RULES: &[Rule] = &[
    Rule {
        category: AssetCategory::Audio,
        keywords: &["audio", "sound", "music", "sfx", "bgm", "ambient", "voice"],
        filter: ExtFilter::Audio,
    },
    Rule {
        category: AssetCategory::Monsters,
        keywords: &["monster", "mob", "enemy", "creature", "boss"],
        filter: ExtFilter::Images,
    },
    Rule {
        category: AssetCategory::Characters,
        keywords: &["character", "class", "player", "hero"],
        filter: ExtFilter::Images,
    },
    Rule {
        category: AssetCategory::Maps,
        keywords: &["map", "tile", "background", "bg", "terrain"],
        filter: ExtFilter::Images,
    },
    Rule {
        category: AssetCategory::Ui,
        keywords: &["ui", "hud", "gui", "interface", "icon", "button", "menu"],
        filter: ExtFilter::Images,
    },
    Rule {
        category: AssetCategory::Effects,
        keywords: &["effect", "fx", "vfx", "particle", "spell"],
        filter: ExtFilter::Images,
    },
    Rule {
        category: AssetCategory::Characters,
        keywords: &["sprite"],
        filter: ExtFilter::Images,
    },
];

/// Audio output buckets: (folder, keywords). The last bucket is the default.
const AUDIO_BUCKETS: &[(&str, &[&str])] = &[
    ("Music", &["music", "bgm", "theme", "song"]),
    ("Ambient", &["ambient", "amb", "ambience"]),
];
const DEFAULT_AUDIO_BUCKET: &str = "SFX";

/// Source folder names stripped from the front of output paths besides the
/// category names themselves.
const SOURCE_FOLDER_ALIASES: &[&str] = &["sprites", "sounds", "sound", "monster", "character"];

/// A classified source file and where it goes in the output tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationResult {
    pub source_path: PathBuf,
    pub category: AssetCategory,
    /// Output path relative to the output root, always `/`-separated.
    pub output_relative_path: PathBuf,
}

fn tokens(path: &str) -> impl Iterator<Item = &str> {
    path.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|t| !t.is_empty())
}

fn keyword_matches(lower: &str, keyword: &str) -> bool {
    if keyword.len() <= SHORT_KEYWORD_LEN {
        tokens(lower).any(|t| t == keyword)
    } else {
        lower.contains(keyword)
    }
}

fn extension_of_str(lower: &str) -> &str {
    let file = lower.rsplit(['/', '\\']).next().unwrap_or(lower);
    match file.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => ext,
        _ => "",
    }
}

/// Classify a path (or bare file name).
///
/// Total over all strings; anything unrecognised is `Data`.
pub fn classify(path: &str) -> AssetCategory {
    let lower = path.to_ascii_lowercase();
    let ext = extension_of_str(&lower);

    for rule in RULES {
        if !rule.filter.accepts(ext) {
            continue;
        }
        if rule.keywords.iter().any(|k| keyword_matches(&lower, k)) {
            return rule.category;
        }
    }

    if AUDIO_EXTENSIONS.contains(&ext) {
        return AssetCategory::Audio;
    }
    if DATA_EXTENSIONS.contains(&ext) {
        return AssetCategory::Data;
    }
    AssetCategory::Data
}

/// Classify a filesystem path.
pub fn classify_path(path: &Path) -> AssetCategory {
    classify(&path.to_string_lossy().replace('\\', "/"))
}

/// Output sub-folder of `Audio/` for a path.
pub fn audio_bucket(path: &str) -> &'static str {
    let lower = path.to_ascii_lowercase();
    AUDIO_BUCKETS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| keyword_matches(&lower, k)))
        .map(|(bucket, _)| *bucket)
        .unwrap_or(DEFAULT_AUDIO_BUCKET)
}

fn is_source_folder(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    AssetCategory::parse(&lower).is_some() || SOURCE_FOLDER_ALIASES.contains(&lower.as_str())
}

fn is_audio_bucket(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    lower == DEFAULT_AUDIO_BUCKET.to_ascii_lowercase()
        || AUDIO_BUCKETS
            .iter()
            .any(|(bucket, _)| bucket.to_ascii_lowercase() == lower)
}

/// Classify a file under `root` and derive its output location.
pub fn classify_file(root: &Path, path: &Path) -> ClassificationResult {
    let relative = path.strip_prefix(root).unwrap_or(path);
    let mut parts: Vec<String> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();

    let joined = parts.join("/");
    let category = classify(&joined);

    // Strip the loose source folder; the output layout has its own.
    if parts.len() > 1 && is_source_folder(&parts[0]) {
        parts.remove(0);
    }
    if category == AssetCategory::Audio && parts.len() > 1 && is_audio_bucket(&parts[0]) {
        parts.remove(0);
    }

    let mut output = match category {
        AssetCategory::Audio => PathBuf::from("Audio").join(audio_bucket(&joined)),
        AssetCategory::Data => PathBuf::from("Data"),
        sprite => PathBuf::from("Sprites").join(sprite.name()),
    };
    for part in &parts {
        output.push(part);
    }

    ClassificationResult {
        source_path: path.to_path_buf(),
        category,
        output_relative_path: output,
    }
}

/// Whether the pipeline knows how to handle this file at all.
pub fn is_supported(path: &Path) -> bool {
    let ext = extension_of(path);
    IMAGE_EXTENSIONS.contains(&ext.as_str())
        || AUDIO_EXTENSIONS.contains(&ext.as_str())
        || DATA_EXTENSIONS.contains(&ext.as_str())
        || ext == SWF_EXTENSION
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_by_folder() {
        assert_eq!(classify("Characters/Feca/feca_idle_S_00.png"), AssetCategory::Characters);
        assert_eq!(classify("Maps/Incarnam/tile_001.png"), AssetCategory::Maps);
        assert_eq!(classify("UI/buttons/ok.png"), AssetCategory::Ui);
        assert_eq!(classify("Effects/fire.png"), AssetCategory::Effects);
        assert_eq!(classify("Monsters/Bouftou/idle.png"), AssetCategory::Monsters);
        assert_eq!(classify("Audio/theme.mp3"), AssetCategory::Audio);
    }

    #[test]
    fn test_classify_rule_order() {
        // Monsters outrank the generic sprite keyword
        assert_eq!(classify("sprites/monster_gobball.png"), AssetCategory::Monsters);
        assert_eq!(classify("sprites/misc.png"), AssetCategory::Characters);
        // Characters outrank effects
        assert_eq!(classify("characters/cra/spell_arrow.png"), AssetCategory::Characters);
    }

    #[test]
    fn test_audio_beats_image_keywords() {
        assert_eq!(classify("Characters/Iop/voice_attack.ogg"), AssetCategory::Audio);
        assert_eq!(classify("characters/iop/hit.wav"), AssetCategory::Audio);
    }

    #[test]
    fn test_image_rules_ignore_data_files() {
        assert_eq!(classify("Characters/Feca/feca.xml"), AssetCategory::Data);
        assert_eq!(classify("maps/world.json"), AssetCategory::Data);
    }

    #[test]
    fn test_short_keywords_are_whole_tokens() {
        assert_eq!(classify("docs/guide.png"), AssetCategory::Data);
        assert_eq!(classify("ui/guide.png"), AssetCategory::Ui);
        assert_eq!(classify("art/bg_forest.jpg"), AssetCategory::Maps);
        assert_eq!(classify("art/fx-smoke.png"), AssetCategory::Effects);
    }

    #[test]
    fn test_extension_fallbacks() {
        assert_eq!(classify("song.mp3"), AssetCategory::Audio);
        assert_eq!(classify("items.json"), AssetCategory::Data);
        assert_eq!(classify("random.png"), AssetCategory::Data);
    }

    #[test]
    fn test_classify_total_over_garbage() {
        assert_eq!(classify(""), AssetCategory::Data);
        assert_eq!(classify("...."), AssetCategory::Data);
        assert_eq!(classify("\u{1F600}/\0"), AssetCategory::Data);
        assert_eq!(classify(".hidden"), AssetCategory::Data);
    }

    #[test]
    fn test_classify_case_insensitive() {
        assert_eq!(classify("CHARACTERS/FECA.PNG"), AssetCategory::Characters);
    }

    #[test]
    fn test_audio_bucket() {
        assert_eq!(audio_bucket("audio/bgm_town.ogg"), "Music");
        assert_eq!(audio_bucket("audio/theme.mp3"), "Music");
        assert_eq!(audio_bucket("audio/ambient_cave.ogg"), "Ambient");
        assert_eq!(audio_bucket("audio/hit.wav"), "SFX");
    }

    #[test]
    fn test_classify_file_layout() {
        let root = Path::new("/raw");

        let r = classify_file(root, Path::new("/raw/Characters/Feca/feca_idle.png"));
        assert_eq!(r.category, AssetCategory::Characters);
        assert_eq!(r.output_relative_path, PathBuf::from("Sprites/Characters/Feca/feca_idle.png"));

        let r = classify_file(root, Path::new("/raw/UI/ok.png"));
        assert_eq!(r.output_relative_path, PathBuf::from("Sprites/UI/ok.png"));

        let r = classify_file(root, Path::new("/raw/Audio/Music/theme.mp3"));
        assert_eq!(r.output_relative_path, PathBuf::from("Audio/Music/theme.mp3"));

        let r = classify_file(root, Path::new("/raw/Audio/door.wav"));
        assert_eq!(r.output_relative_path, PathBuf::from("Audio/SFX/door.wav"));

        let r = classify_file(root, Path::new("/raw/Data/items.json"));
        assert_eq!(r.output_relative_path, PathBuf::from("Data/items.json"));
    }

    #[test]
    fn test_classify_file_outside_root() {
        let r = classify_file(Path::new("/raw"), Path::new("button.png"));
        assert_eq!(r.category, AssetCategory::Ui);
        assert_eq!(r.output_relative_path, PathBuf::from("Sprites/UI/button.png"));
    }

    #[test]
    fn test_is_supported() {
        assert!(is_supported(Path::new("a.PNG")));
        assert!(is_supported(Path::new("a.swf")));
        assert!(is_supported(Path::new("a.ogg")));
        assert!(!is_supported(Path::new("a.txt")));
        assert!(!is_supported(Path::new("README")));
    }
}
