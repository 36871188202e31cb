//! Migration pipeline orchestration.
//!
//! Stages run in order: extraction check, per-file copy, per-unit animation
//! synthesis, report. Per-file work runs on a bounded rayon pool; character
//! and monster units are independent of each other and run in parallel, each
//! one sequentially. Per-file failures become `ProcessingResult`s and never
//! abort the run.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use image::RgbaImage;
use rayon::prelude::*;
use serde::Serialize;

use crate::animation::{
    assemble_all, canonical_direction, generate, DefaultLoopPolicy, DirectionMapper, LabeledFrame,
};
use crate::discovery::{discover, ClassificationResult, MigrationConfig};
use crate::error::{MigrateError, Result};
use crate::render::{
    copy_atomic, crop_frames, load_rgba, write_clip, write_import_sidecar, write_png,
    write_sheet_json, write_state_machine, SheetMeta, SheetPacker,
};
use crate::sprite::{
    direction_code, parse_frame_name, parse_sheet_stem, sheet_label, FrameKey, GridMatch, Slicer,
};
use crate::types::{
    extension_of, resolve_profile, AssetCategory, Compass, IMAGE_EXTENSIONS, SHEET_ROWS,
    SWF_EXTENSION,
};
use crate::validation::{
    build_report, report_paths, validate_extraction, ExtractionSummary, MigrationReport,
};

/// Padding between frames in per-unit atlases.
const ATLAS_PADDING: u32 = 2;

/// Pipeline stage, reported with progress updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Validate,
    Copy,
    Animate,
    Report,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Validate => "Validating",
            Stage::Copy => "Copying",
            Stage::Animate => "Animating",
            Stage::Report => "Reporting",
        };
        write!(f, "{}", name)
    }
}

/// Receives progress updates. Called from worker threads.
pub trait ProgressSink: Sync {
    /// `fraction` is the completed share of `stage`, in `0..=1`.
    fn on_progress(&self, stage: Stage, fraction: f32);
}

impl<F: Fn(Stage, f32) + Sync> ProgressSink for F {
    fn on_progress(&self, stage: Stage, fraction: f32) {
        self(stage, fraction)
    }
}

/// Progress sink that discards updates.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn on_progress(&self, _stage: Stage, _fraction: f32) {}
}

/// Shared cancellation flag, checked between file-level units of work.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Outcome for one source file or sheet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessingResult {
    pub source: PathBuf,
    pub output: Option<PathBuf>,
    pub error: Option<String>,
}

impl ProcessingResult {
    fn ok(source: &Path, output: PathBuf) -> Self {
        Self {
            source: source.to_path_buf(),
            output: Some(output),
            error: None,
        }
    }

    fn failed(source: &Path, error: impl Into<String>) -> Self {
        Self {
            source: source.to_path_buf(),
            output: None,
            error: Some(error.into()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Result of a pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct MigrationSummary {
    pub files_processed: usize,
    pub files_failed: usize,
    /// Overall progress from the report; 0 when the run was cancelled.
    pub final_score: f32,
    pub cancelled: bool,
    pub results: Vec<ProcessingResult>,
    pub extraction: ExtractionSummary,
    pub notes: Vec<String>,
    #[serde(skip)]
    pub report: Option<MigrationReport>,
}

impl MigrationSummary {
    pub fn failures(&self) -> impl Iterator<Item = &ProcessingResult> {
        self.results.iter().filter(|r| !r.is_ok())
    }
}

/// One animated asset: a character or monster folder.
struct Unit<'a> {
    category: AssetCategory,
    name: String,
    files: Vec<&'a ClassificationResult>,
}

#[derive(Default)]
struct UnitOutcome {
    results: Vec<ProcessingResult>,
    notes: Vec<String>,
}

/// Path relative to the output root, `/`-separated.
fn rel_string(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn is_image(path: &Path) -> bool {
    IMAGE_EXTENSIONS.contains(&extension_of(path).as_str())
}

/// Unit name: the folder below `Sprites/<Category>/`, else the file's base.
fn unit_name(file: &ClassificationResult) -> String {
    let parts: Vec<_> = file.output_relative_path.components().collect();
    if parts.len() >= 4 {
        if let Component::Normal(name) = parts[2] {
            return name.to_string_lossy().into_owned();
        }
    }
    let stem = file_stem(&file.source_path);
    match parse_frame_name(&stem) {
        Some(key) => key.base,
        None => parse_sheet_stem(&stem).0,
    }
}

/// Group the animated files of a scan into units, sorted by category then name.
fn collect_units<'a>(files: &[&'a ClassificationResult]) -> Vec<Unit<'a>> {
    let mut units: BTreeMap<(AssetCategory, String), Vec<&ClassificationResult>> = BTreeMap::new();
    for &file in files {
        if file.category.is_animated() && is_image(&file.source_path) {
            units
                .entry((file.category, unit_name(file)))
                .or_default()
                .push(file);
        }
    }
    units
        .into_iter()
        .map(|((category, name), files)| Unit {
            category,
            name,
            files,
        })
        .collect()
}

/// The migration pipeline.
pub struct Pipeline {
    config: MigrationConfig,
}

impl Pipeline {
    pub fn new(config: MigrationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MigrationConfig {
        &self.config
    }

    /// Run every stage.
    ///
    /// Fails only on preconditions: missing extraction root, an extraction
    /// score below `min_extraction_score`, or an output root that cannot be
    /// created. `generated_at` is stamped into the report.
    pub fn run(
        &self,
        generated_at: &str,
        progress: &dyn ProgressSink,
        cancel: &CancelToken,
    ) -> Result<MigrationSummary> {
        let config = &self.config;
        let input = &config.extraction_root;
        let output = &config.output_root;
        config.validate()?;

        progress.on_progress(Stage::Validate, 0.0);
        let extraction = validate_extraction(input, config);
        let discovery = discover(input, config)?;
        if extraction.overall_score < config.min_extraction_score {
            return Err(MigrateError::Precondition {
                message: format!(
                    "extraction score {:.2} is below the minimum {:.2}",
                    extraction.overall_score, config.min_extraction_score
                ),
                help: Some("Run `assetmig validate` to see what is missing".to_string()),
            });
        }
        progress.on_progress(Stage::Validate, 1.0);

        std::fs::create_dir_all(output).map_err(|e| MigrateError::Precondition {
            message: format!("cannot create output root {}: {}", output.display(), e),
            help: None,
        })?;

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.effective_workers())
            .build()
            .map_err(|e| MigrateError::Build {
                message: format!("Failed to start worker pool: {}", e),
                help: None,
            })?;

        let files: Vec<&ClassificationResult> = discovery.scan.iter().collect();
        log::info!(
            "migrating {} file(s) from {} to {}",
            files.len(),
            input.display(),
            output.display()
        );

        let mut summary = MigrationSummary {
            files_processed: 0,
            files_failed: 0,
            final_score: 0.0,
            cancelled: false,
            results: Vec::new(),
            extraction,
            notes: Vec::new(),
            report: None,
        };

        // Copy
        let done = AtomicUsize::new(0);
        let copied: Vec<Option<ProcessingResult>> = pool.install(|| {
            files
                .par_iter()
                .map(|file| {
                    if cancel.is_cancelled() {
                        return None;
                    }
                    let result = self.copy_file(file);
                    let n = done.fetch_add(1, Ordering::Relaxed) + 1;
                    progress.on_progress(Stage::Copy, n as f32 / files.len() as f32);
                    Some(result)
                })
                .collect()
        });
        summary.cancelled |= copied.iter().any(Option::is_none);
        summary.results.extend(copied.into_iter().flatten());

        // Animate
        if !summary.cancelled {
            let units = collect_units(&files);
            let done = AtomicUsize::new(0);
            let outcomes: Vec<Option<UnitOutcome>> = pool.install(|| {
                units
                    .par_iter()
                    .map(|unit| {
                        if cancel.is_cancelled() {
                            return None;
                        }
                        let outcome = self.process_unit(unit);
                        let n = done.fetch_add(1, Ordering::Relaxed) + 1;
                        progress.on_progress(Stage::Animate, n as f32 / units.len() as f32);
                        Some(outcome)
                    })
                    .collect()
            });
            summary.cancelled |= outcomes.iter().any(Option::is_none);
            for outcome in outcomes.into_iter().flatten() {
                summary.results.extend(outcome.results);
                summary.notes.extend(outcome.notes);
            }
        }

        summary.files_processed = summary.results.iter().filter(|r| r.is_ok()).count();
        summary.files_failed = summary.results.len() - summary.files_processed;

        if summary.cancelled {
            log::warn!("migration cancelled after {} file(s)", summary.results.len());
            return Ok(summary);
        }

        // Report
        progress.on_progress(Stage::Report, 0.0);
        let report = build_report(output, config, generated_at)?;
        let (json_path, html_path) = report_paths(output);
        report.write_json(&json_path)?;
        report.write_html(&html_path)?;
        progress.on_progress(Stage::Report, 1.0);

        summary.final_score = report.overall_progress;
        summary.report = Some(report);

        log::info!(
            "migration finished: {} processed, {} failed, score {:.2}",
            summary.files_processed,
            summary.files_failed,
            summary.final_score
        );
        Ok(summary)
    }

    /// Copy one classified file into the output tree.
    fn copy_file(&self, file: &ClassificationResult) -> ProcessingResult {
        let source = &file.source_path;
        if extension_of(source) == SWF_EXTENSION {
            return ProcessingResult::failed(
                source,
                "unsupported: swf archives need an external converter",
            );
        }

        let target = self.config.output_root.join(&file.output_relative_path);
        if let Err(e) = copy_atomic(source, &target) {
            return ProcessingResult::failed(source, e.to_string());
        }

        if file.category.is_sprite() && is_image(source) {
            let profile = resolve_profile(file.category);
            if let Err(e) = write_import_sidecar(&target, file.category, &profile) {
                return ProcessingResult::failed(source, e.to_string());
            }
        }

        ProcessingResult::ok(source, target)
    }

    /// Slice, assemble and wire up the state machine for one unit.
    fn process_unit(&self, unit: &Unit<'_>) -> UnitOutcome {
        let config = &self.config;
        let output = &config.output_root;
        let mapper = DirectionMapper::new(config.animation.strict_directions);
        let sprite_dir = PathBuf::from("Sprites")
            .join(unit.category.name())
            .join(&unit.name);

        let mut outcome = UnitOutcome::default();
        let mut frames: Vec<LabeledFrame> = Vec::new();
        let mut atlas: Vec<(String, RgbaImage)> = Vec::new();

        for file in &unit.files {
            let stem = file_stem(&file.source_path);

            if let Some(key) = parse_frame_name(&stem) {
                let direction = match resolve_direction(&key, &stem, &mapper) {
                    Ok((direction, note)) => {
                        outcome.notes.extend(note);
                        direction
                    }
                    Err(e) => {
                        outcome
                            .results
                            .push(ProcessingResult::failed(&file.source_path, e.to_string()));
                        continue;
                    }
                };
                match load_rgba(&file.source_path) {
                    Ok(img) => atlas.push((stem.clone(), img)),
                    Err(e) => outcome.notes.push(format!("{}: {}", unit.name, e)),
                }
                frames.push(LabeledFrame {
                    label: key.label_or_default().to_string(),
                    direction,
                    index: key.index,
                    sprite: rel_string(&file.output_relative_path),
                    source: key.series(),
                });
                continue;
            }

            match self.slice_sheet(file, &stem, &sprite_dir, &mapper) {
                Ok(Some(sheet)) => {
                    frames.extend(sheet.frames);
                    atlas.extend(sheet.crops);
                    outcome.notes.extend(sheet.notes);
                    outcome
                        .results
                        .push(ProcessingResult::ok(&file.source_path, sheet.meta_path));
                }
                Ok(None) => outcome
                    .notes
                    .push(format!("{}: not a sprite sheet, left unsliced", stem)),
                Err(e) => outcome
                    .results
                    .push(ProcessingResult::failed(&file.source_path, e.to_string())),
            }
        }

        if frames.is_empty() {
            outcome
                .notes
                .push(format!("{}: no directional frames, skipped animation", unit.name));
            return outcome;
        }

        let anim_dir = format!("Animations/{}/{}", unit.category.name(), unit.name);
        let assembly = assemble_all(
            frames,
            anim_dir.as_str(),
            config.animation.frame_rate,
            &DefaultLoopPolicy,
        );
        outcome
            .notes
            .extend(assembly.notes.iter().map(|n| format!("{}: {}", unit.name, n)));

        let anim_path = output.join(&anim_dir);
        for clip in assembly.library.clips() {
            if !clip.valid {
                outcome
                    .notes
                    .push(format!("{}: clip {} has no frames, not written", unit.name, clip.name));
                continue;
            }
            match write_clip(&anim_path, clip) {
                Ok(path) => outcome.results.push(ProcessingResult::ok(&anim_path, path)),
                Err(e) => outcome
                    .results
                    .push(ProcessingResult::failed(&anim_path, e.to_string())),
            }
        }

        let generated = generate(
            &unit.name,
            &assembly.library,
            config.animation.generator_options(),
        );
        outcome
            .notes
            .extend(generated.notes.iter().map(|n| format!("{}: {}", unit.name, n)));
        match write_state_machine(&anim_path, &generated.spec) {
            Ok(path) => outcome.results.push(ProcessingResult::ok(&anim_path, path)),
            Err(e) => outcome
                .results
                .push(ProcessingResult::failed(&anim_path, e.to_string())),
        }

        let atlas_dir = output.join("Atlases").join(unit.category.name());
        let image_name = format!("{}.png", unit.name);
        let (sheet, meta) = SheetPacker::new(ATLAS_PADDING).pack(&atlas, &image_name);
        let written = write_png(&sheet, &atlas_dir.join(&image_name)).and_then(|_| {
            write_sheet_json(&meta, &atlas_dir.join(format!("{}.json", unit.name)))
        });
        if let Err(e) = written {
            outcome.notes.push(format!("{}: atlas not written: {}", unit.name, e));
        }

        log::debug!(
            "{}: {} clip(s), {} layer(s)",
            unit.name,
            assembly.library.len(),
            generated.spec.layers.len()
        );
        outcome
    }

    /// Slice a sheet image into per-frame PNGs plus sheet metadata.
    ///
    /// Returns `None` when the image is not a sheet: a single cell, or a
    /// fallback grid on an image whose name carries no animation label.
    /// Rows without a compass direction are resolved before anything is
    /// written: an error in strict mode, dropped otherwise.
    fn slice_sheet(
        &self,
        file: &ClassificationResult,
        stem: &str,
        sprite_dir: &Path,
        mapper: &DirectionMapper,
    ) -> Result<Option<SlicedSheet>> {
        let config = &self.config;
        let img = load_rgba(&file.source_path)?;
        let (width, height) = img.dimensions();

        let detection = config.grid.resolve(width, height);
        let grid = detection.grid;
        if grid.is_degenerate() || grid.cell_count() <= 1 {
            return Ok(None);
        }
        if detection.matched == GridMatch::Fallback && sheet_label(stem).is_none() {
            return Ok(None);
        }

        let (base, label) = parse_sheet_stem(stem);
        let slices = Slicer::new(config.naming)
            .with_alignment(config.grid.alignment)
            .slice(width, height, &grid, &base, &label);

        let mut notes = Vec::new();
        if !detection.is_exact() {
            notes.push(format!(
                "{}: no candidate cell size fits {}x{}, using {:?} grid {}x{}",
                stem, width, height, detection.matched, grid.rows, grid.columns
            ));
        }

        let extra_rows = grid.rows.saturating_sub(SHEET_ROWS.len() as u32);
        if extra_rows > 0 {
            let first = SHEET_ROWS.len() as u32;
            if mapper.is_strict() {
                return Err(MigrateError::UnknownDirection {
                    name: direction_code(first),
                });
            }
            log::warn!("{}: {} row(s) past the compass rows dropped", stem, extra_rows);
            notes.push(format!(
                "{}: rows {}..{} have no compass direction, skipped",
                stem,
                direction_code(first),
                direction_code(grid.rows - 1)
            ));
        }
        let slices: Vec<_> = slices
            .into_iter()
            .filter(|frame| Compass::from_row(frame.row).is_some())
            .collect();

        let cropped = crop_frames(&img, slices);
        if cropped.blank > 0 {
            notes.push(format!("{}: {} transparent frame(s) skipped", stem, cropped.blank));
        }

        let frame_dir = sprite_dir.join(stem);
        let source = rel_string(&file.output_relative_path);
        let kept = cropped.frames();
        let mut sheet = SlicedSheet {
            frames: Vec::with_capacity(kept.len()),
            crops: Vec::with_capacity(kept.len()),
            notes,
            meta_path: PathBuf::new(),
        };
        for (frame, crop) in cropped.kept {
            let Some(direction) = Compass::from_row(frame.row) else {
                continue;
            };
            let rel = frame_dir.join(format!("{}.png", frame.name));
            write_png(&crop, &config.output_root.join(&rel))?;
            sheet.frames.push(LabeledFrame {
                label: label.clone(),
                direction,
                index: frame.column,
                sprite: rel_string(&rel),
                source: source.clone(),
            });
            sheet.crops.push((frame.name, crop));
        }

        let image_name = file
            .source_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let meta = SheetMeta::from_slices(image_name, (width, height), grid, &kept);
        let meta_path = config
            .output_root
            .join(&frame_dir)
            .join(format!("{}.sheet.json", stem));
        write_sheet_json(&meta, &meta_path)?;
        sheet.meta_path = meta_path;

        Ok(Some(sheet))
    }
}

/// Compass direction of a pre-sliced frame. Tokens that are not compass
/// codes go through the mapper, which fails in strict mode.
fn resolve_direction(
    key: &FrameKey,
    stem: &str,
    mapper: &DirectionMapper,
) -> Result<(Compass, Option<String>)> {
    if let Some(direction) = key.compass() {
        return Ok((direction, None));
    }
    let mapping = mapper.map_name(&key.direction)?;
    let direction = canonical_direction(mapping.native);
    let note = format!(
        "{}: unknown direction '{}', using {}",
        stem, key.direction, mapping.native
    );
    Ok((direction, Some(note)))
}

struct SlicedSheet {
    frames: Vec<LabeledFrame>,
    crops: Vec<(String, RgbaImage)>,
    notes: Vec<String>,
    meta_path: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::BASE_LAYER;
    use crate::render::read_clip;
    use crate::types::{Motion, StateMachineSpec, SHEET_ROWS};
    use crate::validation::Severity;
    use image::Rgba;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::tempdir;

    fn solid(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_pixel(w, h, Rgba([200, 40, 40, 255]))
    }

    fn config(input: &Path, output: &Path) -> MigrationConfig {
        let mut config = MigrationConfig {
            extraction_root: input.to_path_buf(),
            output_root: output.to_path_buf(),
            workers: Some(2),
            ..Default::default()
        };
        config.report.essential_assets = vec!["Feca".to_string()];
        config
    }

    /// Feca with 8 directions x (idle, walk) x 8 frames, one file per frame.
    fn feca_tree(root: &Path) {
        let dir = root.join("Characters/Feca");
        for label in ["idle", "walk"] {
            for direction in SHEET_ROWS {
                for i in 0..8 {
                    let path = dir.join(format!("feca_{}_{}_{:02}.png", label, direction, i));
                    write_png(&solid(16, 16), &path).unwrap();
                }
            }
        }
        write_png(&solid(32, 32), &root.join("UI/ok.png")).unwrap();
    }

    /// A character with 8 directions x (idle, walk) x `count` frames.
    fn character_tree(root: &Path, name: &str, count: u32) {
        let dir = root.join("Characters").join(name);
        let base = name.to_lowercase();
        for label in ["idle", "walk"] {
            for direction in SHEET_ROWS {
                for i in 0..count {
                    let path = dir.join(format!("{}_{}_{}_{:02}.png", base, label, direction, i));
                    write_png(&solid(16, 16), &path).unwrap();
                }
            }
        }
    }

    fn load_controller(path: &Path) -> StateMachineSpec {
        serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
    }

    #[test]
    fn test_feca_end_to_end() {
        let input = tempdir().unwrap();
        let output = tempdir().unwrap();
        feca_tree(input.path());

        let pipeline = Pipeline::new(config(input.path(), output.path()));
        let summary = pipeline
            .run("2026-01-01T00:00:00Z", &NoProgress, &CancelToken::new())
            .unwrap();

        assert!(!summary.cancelled);
        assert_eq!(summary.files_failed, 0, "{:?}", summary.failures().collect::<Vec<_>>());

        let out = output.path();
        assert!(out.join("Sprites/Characters/Feca/feca_idle_S_00.png").is_file());
        assert!(out.join("Sprites/Characters/Feca/feca_idle_S_00.png.import.json").is_file());
        assert!(out.join("Sprites/UI/ok.png").is_file());

        // Five native facings per label
        let clip = read_clip(&out.join("Animations/Characters/Feca/walk_side.anim.json")).unwrap();
        assert_eq!(clip.frames.len(), 8);
        assert_eq!(clip.source, Compass::E);
        assert!(clip.looping);

        let spec = load_controller(&out.join("Animations/Characters/Feca/Feca.controller.json"));
        assert!(spec.validate().is_empty());
        let base = spec.layer(BASE_LAYER).unwrap();
        for state in ["Idle", "Move"] {
            let Motion::BlendSpace(bs) = &base.state(state).unwrap().motion else {
                panic!("{} should be a blend space", state);
            };
            assert_eq!(bs.children.len(), 8);
        }

        assert!(out.join("Atlases/Characters/Feca.png").is_file());

        let report = summary.report.as_ref().unwrap();
        assert!(report.category("Characters").unwrap().progress > 0.0);
        assert_eq!(report.count_with_severity(Severity::Critical), 0);
        assert!(report.missing_assets.iter().all(|m| m.identifier != "Feca"));
        assert!(summary.final_score > 0.0);
    }

    #[test]
    fn test_rerun_is_idempotent() {
        let input = tempdir().unwrap();
        let output = tempdir().unwrap();
        feca_tree(input.path());
        let pipeline = Pipeline::new(config(input.path(), output.path()));
        let (json, html) = report_paths(output.path());

        pipeline.run("t", &NoProgress, &CancelToken::new()).unwrap();
        let first = (fs::read(&json).unwrap(), fs::read(&html).unwrap());
        pipeline.run("t", &NoProgress, &CancelToken::new()).unwrap();
        let second = (fs::read(&json).unwrap(), fs::read(&html).unwrap());

        assert_eq!(first, second);
    }

    #[test]
    fn test_sheet_is_sliced() {
        let input = tempdir().unwrap();
        let output = tempdir().unwrap();
        // 2 rows x 4 columns of 64px cells; bottom-right cell transparent
        let mut sheet = solid(256, 128);
        for y in 64..128 {
            for x in 192..256 {
                sheet.put_pixel(x, y, Rgba([0, 0, 0, 0]));
            }
        }
        write_png(&sheet, &input.path().join("Characters/Iop/iop_walk.png")).unwrap();

        let pipeline = Pipeline::new(config(input.path(), output.path()));
        let summary = pipeline.run("t", &NoProgress, &CancelToken::new()).unwrap();

        let frames = output.path().join("Sprites/Characters/Iop/iop_walk");
        // Row 0 (S) is the bottom raster band; its last column is transparent
        assert!(frames.join("iop_walk_S_00.png").is_file());
        assert!(!frames.join("iop_walk_S_03.png").exists());
        assert!(frames.join("iop_walk_SW_03.png").is_file());
        assert!(frames.join("iop_walk.sheet.json").is_file());
        assert!(summary.notes.iter().any(|n| n.contains("1 transparent frame")));

        let clip = read_clip(
            &output
                .path()
                .join("Animations/Characters/Iop/walk_front.anim.json"),
        )
        .unwrap();
        assert_eq!(clip.frames.len(), 3);
    }

    #[test]
    fn test_swf_is_a_per_file_failure() {
        let input = tempdir().unwrap();
        let output = tempdir().unwrap();
        feca_tree(input.path());
        fs::write(input.path().join("UI/menu.swf"), b"FWS").unwrap();

        let pipeline = Pipeline::new(config(input.path(), output.path()));
        let summary = pipeline.run("t", &NoProgress, &CancelToken::new()).unwrap();

        assert_eq!(summary.files_failed, 1);
        let failure = summary.failures().next().unwrap();
        assert!(failure.source.ends_with("menu.swf"));
        assert!(failure.error.as_deref().unwrap().contains("unsupported"));
        assert!(summary.report.is_some());
    }

    #[test]
    fn test_missing_root_is_precondition() {
        let output = tempdir().unwrap();
        let pipeline = Pipeline::new(config(Path::new("/nonexistent/raw"), output.path()));
        let err = pipeline
            .run("t", &NoProgress, &CancelToken::new())
            .unwrap_err();
        assert!(matches!(err, MigrateError::Precondition { .. }));
    }

    #[test]
    fn test_score_gate() {
        let input = tempdir().unwrap();
        let output = tempdir().unwrap();
        feca_tree(input.path());
        let mut cfg = config(input.path(), output.path());
        cfg.min_extraction_score = 1.1;

        let err = Pipeline::new(cfg)
            .run("t", &NoProgress, &CancelToken::new())
            .unwrap_err();
        assert!(matches!(err, MigrateError::Precondition { .. }));
    }

    #[test]
    fn test_cancelled_before_start() {
        let input = tempdir().unwrap();
        let output = tempdir().unwrap();
        feca_tree(input.path());
        let cancel = CancelToken::new();
        cancel.cancel();

        let summary = Pipeline::new(config(input.path(), output.path()))
            .run("t", &NoProgress, &cancel)
            .unwrap();

        assert!(summary.cancelled);
        assert!(summary.results.is_empty());
        assert!(summary.report.is_none());
        assert!(!report_paths(output.path()).0.exists());
    }

    #[test]
    fn test_progress_reaches_every_stage() {
        let input = tempdir().unwrap();
        let output = tempdir().unwrap();
        feca_tree(input.path());
        let seen = Mutex::new(Vec::new());
        let sink = |stage: Stage, fraction: f32| {
            if fraction >= 1.0 {
                seen.lock().unwrap().push(stage);
            }
        };

        Pipeline::new(config(input.path(), output.path()))
            .run("t", &sink, &CancelToken::new())
            .unwrap();

        let seen = seen.into_inner().unwrap();
        for stage in [Stage::Validate, Stage::Copy, Stage::Animate, Stage::Report] {
            assert!(seen.contains(&stage), "{} missing", stage);
        }
    }

    #[test]
    fn test_stray_images_stay_out_of_clips() {
        let input = tempdir().unwrap();
        let output = tempdir().unwrap();
        feca_tree(input.path());
        let feca = input.path().join("Characters/Feca");
        // Cuts into a 2x2 grid labelled idle, but is not idle art
        write_png(&solid(128, 128), &feca.join("portrait.png")).unwrap();
        // No candidate size fits and the name has no label
        write_png(&solid(100, 30), &feca.join("banner.png")).unwrap();

        let summary = Pipeline::new(config(input.path(), output.path()))
            .run("t", &NoProgress, &CancelToken::new())
            .unwrap();

        let anim = output.path().join("Animations/Characters/Feca");
        let clip = read_clip(&anim.join("idle_front.anim.json")).unwrap();
        assert_eq!(clip.frames.len(), 8);
        assert!(clip.frames.iter().all(|f| f.sprite.contains("feca_idle_S_")));
        assert!(summary
            .notes
            .iter()
            .any(|n| n.contains("portrait.png ignored, clip uses feca_idle_S")));

        assert!(summary
            .notes
            .iter()
            .any(|n| n == "banner: not a sprite sheet, left unsliced"));
        assert!(!output.path().join("Sprites/Characters/Feca/banner").exists());
        assert!(output.path().join("Sprites/Characters/Feca/banner.png").is_file());
    }

    /// 2 columns x 10 rows of 64px cells: two rows past the compass rows.
    fn tall_sheet(root: &Path) {
        write_png(&solid(128, 640), &root.join("Characters/Iop/iop_walk.png")).unwrap();
    }

    #[test]
    fn test_rows_past_compass_dropped() {
        let input = tempdir().unwrap();
        let output = tempdir().unwrap();
        tall_sheet(input.path());

        let summary = Pipeline::new(config(input.path(), output.path()))
            .run("t", &NoProgress, &CancelToken::new())
            .unwrap();

        assert_eq!(summary.files_failed, 0, "{:?}", summary.failures().collect::<Vec<_>>());
        assert!(summary
            .notes
            .iter()
            .any(|n| n == "iop_walk: rows R8..R9 have no compass direction, skipped"));

        let frames = output.path().join("Sprites/Characters/Iop/iop_walk");
        assert!(frames.join("iop_walk_S_01.png").is_file());
        assert!(frames.join("iop_walk_SE_01.png").is_file());
        assert!(!frames.join("iop_walk_R8_00.png").exists());
        assert!(!frames.join("iop_walk_R9_01.png").exists());

        let meta: serde_json::Value = serde_json::from_str(
            &fs::read_to_string(frames.join("iop_walk.sheet.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(meta["frames"].as_object().map(|f| f.len()), Some(16));

        let clip = read_clip(
            &output
                .path()
                .join("Animations/Characters/Iop/walk_front.anim.json"),
        )
        .unwrap();
        assert_eq!(clip.frames.len(), 2);
    }

    #[test]
    fn test_rows_past_compass_fail_strict_before_writing() {
        let input = tempdir().unwrap();
        let output = tempdir().unwrap();
        tall_sheet(input.path());
        let mut cfg = config(input.path(), output.path());
        cfg.animation.strict_directions = true;

        let summary = Pipeline::new(cfg)
            .run("t", &NoProgress, &CancelToken::new())
            .unwrap();

        let failure = summary.failures().next().unwrap();
        assert!(failure.source.ends_with("iop_walk.png"));
        assert_eq!(failure.error.as_deref(), Some("Unknown direction 'R8'"));
        assert!(!output.path().join("Sprites/Characters/Iop/iop_walk").exists());
        assert!(!output.path().join("Animations/Characters/Iop").exists());
    }

    fn unknown_direction_tree(root: &Path) {
        feca_tree(root);
        for i in 0..2 {
            let path = root.join(format!("Characters/Feca/feca_hit_UP_{:02}.png", i));
            write_png(&solid(16, 16), &path).unwrap();
        }
    }

    #[test]
    fn test_unknown_frame_direction_is_mapped() {
        let input = tempdir().unwrap();
        let output = tempdir().unwrap();
        unknown_direction_tree(input.path());

        let summary = Pipeline::new(config(input.path(), output.path()))
            .run("t", &NoProgress, &CancelToken::new())
            .unwrap();

        assert_eq!(summary.files_failed, 0);
        assert!(summary
            .notes
            .iter()
            .any(|n| n == "feca_hit_UP_00: unknown direction 'UP', using front"));
        let clip = read_clip(
            &output
                .path()
                .join("Animations/Characters/Feca/hit_front.anim.json"),
        )
        .unwrap();
        assert_eq!(clip.frames.len(), 2);
    }

    #[test]
    fn test_unknown_frame_direction_fails_strict() {
        let input = tempdir().unwrap();
        let output = tempdir().unwrap();
        unknown_direction_tree(input.path());
        let mut cfg = config(input.path(), output.path());
        cfg.animation.strict_directions = true;

        let summary = Pipeline::new(cfg)
            .run("t", &NoProgress, &CancelToken::new())
            .unwrap();

        assert_eq!(summary.files_failed, 2);
        assert!(summary
            .failures()
            .all(|f| f.error.as_deref() == Some("Unknown direction 'UP'")));
        assert!(!output
            .path()
            .join("Animations/Characters/Feca/hit_front.anim.json")
            .exists());
    }

    #[test]
    fn test_oversized_grid_config_is_rejected() {
        let input = tempdir().unwrap();
        let output = tempdir().unwrap();
        feca_tree(input.path());
        let mut cfg = config(input.path(), output.path());
        cfg.grid.rows = Some(70_000);
        cfg.grid.columns = Some(70_000);

        let err = Pipeline::new(cfg)
            .run("t", &NoProgress, &CancelToken::new())
            .unwrap_err();
        assert!(matches!(err, MigrateError::Parse { .. }));
        assert!(fs::read_dir(output.path()).unwrap().next().is_none());
    }

    #[test]
    fn test_cancel_during_animation_leaves_whole_units() {
        let input = tempdir().unwrap();
        let output = tempdir().unwrap();
        let names = ["Eni", "Feca", "Iop", "Sram"];
        for name in names {
            character_tree(input.path(), name, 2);
        }
        let mut cfg = config(input.path(), output.path());
        cfg.workers = Some(1);
        let cancel = CancelToken::new();
        let sink = |stage: Stage, fraction: f32| {
            if stage == Stage::Animate && fraction > 0.0 {
                cancel.cancel();
            }
        };

        let summary = Pipeline::new(cfg).run("t", &sink, &cancel).unwrap();

        assert!(summary.cancelled);
        assert!(summary.report.is_none());
        assert!(!report_paths(output.path()).0.exists());

        let anim = output.path().join("Animations/Characters");
        let finished: Vec<_> = names
            .iter()
            .filter(|name| anim.join(name).join(format!("{}.controller.json", name)).is_file())
            .collect();
        assert!(!finished.is_empty());
        assert!(finished.len() < names.len());
        for name in &finished {
            for label in ["idle", "walk"] {
                for native in ["front", "front_side", "side", "back_side", "back"] {
                    let clip = anim.join(name).join(format!("{}_{}.anim.json", label, native));
                    assert!(read_clip(&clip).is_ok(), "{} incomplete", name);
                }
            }
        }
        for name in names.iter().filter(|n| !finished.contains(n)) {
            assert!(!anim.join(name).exists(), "{} partly animated", name);
        }

        let leftovers: Vec<_> = walkdir::WalkDir::new(output.path())
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty(), "{:?}", leftovers);
    }
}
