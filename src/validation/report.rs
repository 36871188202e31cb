//! Migration report: validation of the processed output tree.
//!
//! The builder re-scans the output root (never the raw input), validates each
//! asset with type-specific rules and aggregates the results per category.
//! Findings carry a severity:
//!
//! - **Critical**: the asset failed to load.
//! - **High**: structurally missing data (no pixels, empty clip, broken
//!   sprite reference).
//! - **Medium**: oversized texture or overlong audio.
//! - **Low**: everything else, such as a low frame rate.
//!
//! An asset is valid when it has no Critical or High finding.

use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::io::BufReader;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use rayon::prelude::*;
use rodio::{Decoder, Source};
use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::discovery::MigrationConfig;
use crate::error::{MigrateError, Result};
use crate::render::{read_clip, write_atomic, write_json, CLIP_SUFFIX, CONTROLLER_SUFFIX};
use crate::types::{extension_of, AssetCategory, StateMachineSpec, AUDIO_EXTENSIONS, IMAGE_EXTENSIONS};

/// File name of the JSON report in the output root.
pub const REPORT_JSON: &str = "migration_report.json";

/// File name of the HTML report in the output root.
pub const REPORT_HTML: &str = "validation_report.html";

/// Finding severity, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn name(&self) -> &'static str {
        match self {
            Severity::Low => "Low",
            Severity::Medium => "Medium",
            Severity::High => "High",
            Severity::Critical => "Critical",
        }
    }

    /// Whether a finding of this severity makes the asset invalid.
    pub fn invalidates(&self) -> bool {
        *self >= Severity::High
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Kind of validated asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    Image,
    Clip,
    Controller,
    Audio,
}

/// Validation result for one output file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationEntry {
    /// Path relative to the output root, `/`-separated.
    pub path: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: AssetKind,
    pub is_valid: bool,
    pub file_size_bytes: u64,
    pub issues: Vec<String>,
    /// Highest finding severity, if any.
    pub severity: Option<Severity>,
    /// Sprite references that do not resolve (clips only).
    #[serde(default)]
    pub broken_references: usize,
}

impl ValidationEntry {
    fn new(path: String, kind: AssetKind, file_size_bytes: u64) -> Self {
        let name = path
            .rsplit('/')
            .next()
            .unwrap_or(path.as_str())
            .to_string();
        Self {
            path,
            name,
            kind,
            is_valid: true,
            file_size_bytes,
            issues: Vec::new(),
            severity: None,
            broken_references: 0,
        }
    }

    fn finding(&mut self, severity: Severity, message: impl Into<String>) {
        self.issues.push(format!("[{}] {}", severity, message.into()));
        self.severity = self.severity.max(Some(severity));
        if severity.invalidates() {
            self.is_valid = false;
        }
    }
}

/// Per-category aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryReport {
    pub name: String,
    #[serde(rename = "type")]
    pub category: AssetCategory,
    pub assets: Vec<ValidationEntry>,
    pub expected: u32,
    pub valid_count: usize,
    /// `valid_count / expected`, capped at 1.
    pub progress: f32,
}

/// An asset that should exist but does not, or is unusable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissingAsset {
    pub identifier: String,
    pub severity: Severity,
    pub reason: String,
}

/// Top-level report artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MigrationReport {
    pub generated_at: String,
    pub categories: Vec<CategoryReport>,
    pub total_assets: usize,
    pub valid_assets: usize,
    pub missing_texture_count: usize,
    pub broken_reference_count: usize,
    pub total_file_size_bytes: u64,
    pub overall_progress: f32,
    pub missing_assets: Vec<MissingAsset>,
}

impl MigrationReport {
    pub fn category(&self, name: &str) -> Option<&CategoryReport> {
        self.categories.iter().find(|c| c.name == name)
    }

    pub fn entries(&self) -> impl Iterator<Item = &ValidationEntry> {
        self.categories.iter().flat_map(|c| c.assets.iter())
    }

    /// Entries with a finding of exactly `severity`.
    pub fn count_with_severity(&self, severity: Severity) -> usize {
        self.entries().filter(|e| e.severity == Some(severity)).count()
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        write_json(path, self)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| MigrateError::io(path, format!("Failed to read report: {}", e)))?;
        serde_json::from_str(&content).map_err(|e| MigrateError::Parse {
            message: format!("Invalid report {}: {}", path.display(), e),
            help: Some("Regenerate it with `assetmig report`".to_string()),
        })
    }

    pub fn write_html(&self, path: &Path) -> Result<()> {
        write_atomic(path, self.to_html().as_bytes())
    }

    /// Render a standalone HTML page.
    pub fn to_html(&self) -> String {
        let mut html = String::new();
        html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
        html.push_str("<title>Migration Validation Report</title>\n<style>\n");
        html.push_str("body{font-family:sans-serif;margin:2em}table{border-collapse:collapse}");
        html.push_str("td,th{border:1px solid #ccc;padding:4px 8px}.invalid{background:#fdd}");
        html.push_str(".Critical{color:#b00}.High{color:#d60}.Medium{color:#a80}.Low{color:#666}\n");
        html.push_str("</style>\n</head>\n<body>\n");
        html.push_str("<h1>Migration Validation Report</h1>\n");
        html.push_str(&format!(
            "<p>Generated {}. {} of {} assets valid, {} bytes. Overall progress {:.1}%.</p>\n",
            escape(&self.generated_at),
            self.valid_assets,
            self.total_assets,
            self.total_file_size_bytes,
            self.overall_progress * 100.0
        ));
        html.push_str(&format!(
            "<p>Missing textures: {}. Broken references: {}.</p>\n",
            self.missing_texture_count, self.broken_reference_count
        ));

        if !self.missing_assets.is_empty() {
            html.push_str("<h2>Missing assets</h2>\n<table>\n<tr><th>Severity</th><th>Asset</th><th>Reason</th></tr>\n");
            for missing in &self.missing_assets {
                html.push_str(&format!(
                    "<tr><td class=\"{sev}\">{sev}</td><td>{}</td><td>{}</td></tr>\n",
                    escape(&missing.identifier),
                    escape(&missing.reason),
                    sev = missing.severity
                ));
            }
            html.push_str("</table>\n");
        }

        for category in &self.categories {
            html.push_str(&format!(
                "<h2>{}</h2>\n<p>{} valid of {} expected ({:.1}%)</p>\n",
                escape(&category.name),
                category.valid_count,
                category.expected,
                category.progress * 100.0
            ));
            if category.assets.is_empty() {
                continue;
            }
            html.push_str("<table>\n<tr><th>Asset</th><th>Type</th><th>Size</th><th>Issues</th></tr>\n");
            for entry in &category.assets {
                let class = if entry.is_valid { "" } else { " class=\"invalid\"" };
                html.push_str(&format!(
                    "<tr{}><td>{}</td><td>{:?}</td><td>{}</td><td>{}</td></tr>\n",
                    class,
                    escape(&entry.path),
                    entry.kind,
                    entry.file_size_bytes,
                    escape(&entry.issues.join("; "))
                ));
            }
            html.push_str("</table>\n");
        }

        html.push_str("</body>\n</html>\n");
        html
    }
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

// --- Audio inspection ---

/// Decode an audio file and measure how long it plays.
///
/// The container's declared length is used when it has one; otherwise
/// decoded samples are counted. Counting stops just past `limit`, so a
/// duration above `limit` means "at least this long". A file that yields no
/// samples is an error.
pub fn audio_duration(path: &Path, limit: Duration) -> std::result::Result<Duration, String> {
    let file = fs::File::open(path).map_err(|e| e.to_string())?;
    let mut decoder: Decoder<BufReader<fs::File>> =
        Decoder::try_from(file).map_err(|e| e.to_string())?;
    let declared = decoder.total_duration();
    let per_second = f64::from(decoder.sample_rate().max(1)) * f64::from(decoder.channels().max(1));

    if decoder.next().is_none() {
        return Err("no decodable audio".to_string());
    }
    if let Some(total) = declared {
        return Ok(total);
    }

    let cap = (limit.as_secs_f64() * per_second).ceil() as usize;
    let samples = 1 + decoder.take(cap).count();
    Ok(Duration::from_secs_f64(samples as f64 / per_second))
}

// --- Per-asset validation ---

fn validate_image(root: &Path, rel: &str, size: u64, max_texture: u32) -> ValidationEntry {
    let mut entry = ValidationEntry::new(rel.to_string(), AssetKind::Image, size);
    match image::open(root.join(rel)) {
        Err(e) => entry.finding(Severity::Critical, format!("failed to load: {}", e)),
        Ok(img) => {
            let rgba = img.to_rgba8();
            if rgba.width() == 0 || rgba.height() == 0 || rgba.pixels().all(|p| p.0[3] == 0) {
                entry.finding(Severity::High, "no pixel data");
            }
            let longest = rgba.width().max(rgba.height());
            if longest > max_texture {
                entry.finding(
                    Severity::Medium,
                    format!(
                        "oversized texture {}x{} (max {})",
                        rgba.width(),
                        rgba.height(),
                        max_texture
                    ),
                );
            }
        }
    }
    entry
}

fn validate_clip(root: &Path, rel: &str, size: u64, min_frame_rate: f32) -> ValidationEntry {
    let mut entry = ValidationEntry::new(rel.to_string(), AssetKind::Clip, size);
    let clip = match read_clip(&root.join(rel)) {
        Ok(clip) => clip,
        Err(e) => {
            entry.finding(Severity::Critical, format!("failed to load: {}", e));
            return entry;
        }
    };

    if clip.frames.is_empty() || clip.duration() <= 0.0 {
        entry.finding(Severity::High, "empty clip");
    }

    let broken: Vec<&str> = clip
        .frames
        .iter()
        .map(|f| f.sprite.as_str())
        .filter(|sprite| !root.join(sprite).is_file())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    if !broken.is_empty() {
        entry.broken_references = broken.len();
        entry.finding(
            Severity::High,
            format!("broken reference: {}", broken.join(", ")),
        );
    }

    if !clip.frames.is_empty() && clip.frame_rate < min_frame_rate {
        entry.finding(
            Severity::Low,
            format!("low frame rate {} fps (min {})", clip.frame_rate, min_frame_rate),
        );
    }
    entry
}

fn validate_controller(root: &Path, rel: &str, size: u64) -> ValidationEntry {
    let mut entry = ValidationEntry::new(rel.to_string(), AssetKind::Controller, size);
    let parsed = fs::read_to_string(root.join(rel))
        .map_err(|e| e.to_string())
        .and_then(|s| serde_json::from_str::<StateMachineSpec>(&s).map_err(|e| e.to_string()));
    match parsed {
        Err(e) => entry.finding(Severity::Critical, format!("failed to load: {}", e)),
        Ok(spec) => {
            for problem in spec.validate() {
                entry.finding(Severity::High, problem);
            }
            if spec.layers.iter().all(|l| l.states.is_empty()) {
                entry.finding(Severity::High, "state machine has no states");
            }
        }
    }
    entry
}

fn validate_audio(root: &Path, rel: &str, size: u64, max_seconds: f32) -> ValidationEntry {
    let mut entry = ValidationEntry::new(rel.to_string(), AssetKind::Audio, size);
    if size == 0 {
        entry.finding(Severity::High, "no audio data");
        return entry;
    }

    let limit = Duration::try_from_secs_f32(max_seconds).unwrap_or(Duration::MAX);
    match audio_duration(&root.join(rel), limit) {
        Err(e) => entry.finding(Severity::Critical, format!("failed to decode: {}", e)),
        Ok(length) if length > limit => entry.finding(
            Severity::Medium,
            format!(
                "audio too long: {:.1}s (max {:.0}s)",
                length.as_secs_f32(),
                max_seconds
            ),
        ),
        Ok(_) => {}
    }
    entry
}

// --- Tree scan ---

/// Top-level output folders that are validated.
const SCANNED_ROOTS: [&str; 3] = ["Sprites", "Animations", "Audio"];

struct Candidate {
    rel: String,
    category: AssetCategory,
    kind: AssetKind,
    size: u64,
}

fn to_relative(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = rel
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    Some(parts.join("/"))
}

fn classify_output(rel: &str) -> Option<(AssetCategory, AssetKind)> {
    let mut parts = rel.split('/');
    let top = parts.next()?;
    let lower = rel.to_ascii_lowercase();

    match top {
        "Audio" => {
            let ext = extension_of(Path::new(rel));
            AUDIO_EXTENSIONS
                .contains(&ext.as_str())
                .then_some((AssetCategory::Audio, AssetKind::Audio))
        }
        "Sprites" => {
            let category = AssetCategory::parse(parts.next()?)?;
            let ext = extension_of(Path::new(rel));
            IMAGE_EXTENSIONS
                .contains(&ext.as_str())
                .then_some((category, AssetKind::Image))
        }
        "Animations" => {
            let category = AssetCategory::parse(parts.next()?)?;
            if lower.ends_with(CLIP_SUFFIX) {
                Some((category, AssetKind::Clip))
            } else if lower.ends_with(CONTROLLER_SUFFIX) {
                Some((category, AssetKind::Controller))
            } else {
                None
            }
        }
        _ => None,
    }
}

fn collect_candidates(root: &Path) -> Vec<Candidate> {
    let mut candidates = Vec::new();
    for top in SCANNED_ROOTS {
        let dir = root.join(top);
        if !dir.is_dir() {
            continue;
        }
        for entry in WalkDir::new(&dir)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
        {
            let Some(rel) = to_relative(root, entry.path()) else {
                continue;
            };
            let Some((category, kind)) = classify_output(&rel) else {
                continue;
            };
            let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
            candidates.push(Candidate {
                rel,
                category,
                kind,
                size,
            });
        }
    }
    candidates
}

/// Lower-cased names of the per-character folders in the output.
fn character_identifiers(root: &Path) -> BTreeSet<String> {
    let mut found = BTreeSet::new();
    for base in ["Sprites/Characters", "Animations/Characters"] {
        let Ok(read) = fs::read_dir(root.join(base)) else {
            continue;
        };
        for entry in read.filter_map(|e| e.ok()) {
            if entry.path().is_dir() {
                found.insert(entry.file_name().to_string_lossy().to_ascii_lowercase());
            }
        }
    }
    found
}

/// Build a report over a processed output tree.
///
/// `generated_at` is stamped verbatim so repeated runs over an unchanged tree
/// produce identical reports.
pub fn build_report(root: &Path, config: &MigrationConfig, generated_at: &str) -> Result<MigrationReport> {
    if !root.is_dir() {
        return Err(MigrateError::Precondition {
            message: format!("output root {} does not exist", root.display()),
            help: Some("Run `assetmig migrate` first".to_string()),
        });
    }

    let options = &config.report;
    let candidates = collect_candidates(root);
    log::debug!("validating {} output file(s)", candidates.len());

    // par_iter keeps input order in the collected Vec
    let entries: Vec<(AssetCategory, ValidationEntry)> = candidates
        .par_iter()
        .map(|c| {
            let entry = match c.kind {
                AssetKind::Image => validate_image(root, &c.rel, c.size, options.max_texture_size),
                AssetKind::Clip => validate_clip(root, &c.rel, c.size, options.min_frame_rate),
                AssetKind::Controller => validate_controller(root, &c.rel, c.size),
                AssetKind::Audio => validate_audio(root, &c.rel, c.size, options.max_audio_seconds),
            };
            (c.category, entry)
        })
        .collect();

    let mut categories: Vec<CategoryReport> = AssetCategory::ALL
        .into_iter()
        .filter(|c| *c != AssetCategory::Data)
        .map(|category| CategoryReport {
            name: category.name().to_string(),
            category,
            assets: Vec::new(),
            expected: config.expected(category),
            valid_count: 0,
            progress: 0.0,
        })
        .collect();

    for (category, entry) in entries {
        if let Some(report) = categories.iter_mut().find(|r| r.category == category) {
            report.assets.push(entry);
        }
    }

    let mut missing_assets = Vec::new();
    for report in &mut categories {
        report.valid_count = report.assets.iter().filter(|e| e.is_valid).count();
        report.progress = if report.expected == 0 {
            if report.assets.is_empty() { 0.0 } else { 1.0 }
        } else {
            (report.valid_count as f32 / report.expected as f32).min(1.0)
        };
        if report.expected > 0 && report.assets.is_empty() {
            missing_assets.push(MissingAsset {
                identifier: report.name.clone(),
                severity: Severity::High,
                reason: format!("no {} assets in the output", report.name),
            });
        }
        for entry in report.assets.iter().filter(|e| !e.is_valid) {
            missing_assets.push(MissingAsset {
                identifier: entry.path.clone(),
                severity: entry.severity.unwrap_or(Severity::High),
                reason: entry.issues.join("; "),
            });
        }
    }

    let present = character_identifiers(root);
    for id in &options.essential_assets {
        if !present.contains(&id.to_ascii_lowercase()) {
            missing_assets.push(MissingAsset {
                identifier: id.clone(),
                severity: Severity::Critical,
                reason: "essential asset missing".to_string(),
            });
        }
    }

    missing_assets.sort_by(|a, b| {
        b.severity
            .cmp(&a.severity)
            .then_with(|| a.identifier.cmp(&b.identifier))
    });

    let all: Vec<&ValidationEntry> = categories.iter().flat_map(|c| c.assets.iter()).collect();
    let tracked: Vec<&CategoryReport> = categories.iter().filter(|c| c.expected > 0).collect();
    let overall_progress = if tracked.is_empty() {
        0.0
    } else {
        tracked.iter().map(|c| c.progress).sum::<f32>() / tracked.len() as f32
    };

    let report = MigrationReport {
        generated_at: generated_at.to_string(),
        total_assets: all.len(),
        valid_assets: all.iter().filter(|e| e.is_valid).count(),
        missing_texture_count: all
            .iter()
            .filter(|e| e.kind == AssetKind::Image && !e.is_valid)
            .count(),
        broken_reference_count: all.iter().map(|e| e.broken_references).sum(),
        total_file_size_bytes: all.iter().map(|e| e.file_size_bytes).sum(),
        overall_progress,
        missing_assets,
        categories,
    };

    log::info!(
        "report: {}/{} valid, progress {:.2}",
        report.valid_assets,
        report.total_assets,
        report.overall_progress
    );

    Ok(report)
}

/// Paths of the JSON and HTML report inside an output root.
pub fn report_paths(root: &Path) -> (PathBuf, PathBuf) {
    (root.join(REPORT_JSON), root.join(REPORT_HTML))
}
