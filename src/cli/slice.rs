//! Slice command implementation.
//!
//! Slices one PNG sprite sheet into per-frame PNGs plus sheet metadata,
//! outside of a full migration.

use std::path::{Path, PathBuf};

use clap::Args;

use crate::discovery::GridConfig;
use crate::error::{MigrateError, Result};
use crate::output::{display_path, plural, Printer};
use crate::render::{crop_frames, load_rgba, write_png, write_sheet_json, SheetMeta};
use crate::sprite::{parse_sheet_stem, GridMatch, NamingConvention, Slicer};
use crate::types::{Alignment, GridSpec, SpriteFrame};

/// A single frame cut from a sheet.
pub struct SlicedCell {
    pub frame: SpriteFrame,
    pub image: image::RgbaImage,
}

/// Slice a sprite sheet into frames
#[derive(Args, Debug)]
pub struct SliceArgs {
    /// PNG sprite sheet to slice
    #[arg(required = true)]
    pub input: PathBuf,

    /// Cell size as WxH (e.g. 64x64); auto-detected when omitted
    #[arg(long)]
    pub cell: Option<String>,

    /// Output directory for frames (default: current directory)
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Base name for frames (default: from the input file name)
    #[arg(long)]
    pub name: Option<String>,

    /// Animation label (default: from the input file name)
    #[arg(long)]
    pub label: Option<String>,

    /// Frame naming: direction_first, frame_first, type_direction_frame, index_only
    #[arg(long, default_value = "type_direction_frame")]
    pub naming: String,
}

/// Parse a "WxH" dimension string into (width, height).
fn parse_dimensions(s: &str) -> Result<(u32, u32)> {
    let parts: Vec<&str> = s.splitn(2, |c| c == 'x' || c == 'X').collect();
    if parts.len() != 2 {
        return Err(MigrateError::Parse {
            message: format!("Invalid dimensions '{}': expected WxH (e.g. 64x64)", s),
            help: Some("Use the format WxH, for example: 64x64, 96x128".to_string()),
        });
    }

    let w: u32 = parts[0].parse().map_err(|_| MigrateError::Parse {
        message: format!("Invalid width '{}' in dimensions '{}'", parts[0], s),
        help: Some("Width must be a positive integer".to_string()),
    })?;

    let h: u32 = parts[1].parse().map_err(|_| MigrateError::Parse {
        message: format!("Invalid height '{}' in dimensions '{}'", parts[1], s),
        help: Some("Height must be a positive integer".to_string()),
    })?;

    if w == 0 || h == 0 {
        return Err(MigrateError::Parse {
            message: format!("Dimensions must be non-zero, got {}x{}", w, h),
            help: Some("Both width and height must be at least 1".to_string()),
        });
    }

    Ok((w, h))
}

/// Resolve the grid: explicit cell size when given, detection otherwise.
fn resolve_grid(width: u32, height: u32, cell: Option<(u32, u32)>, printer: &Printer) -> GridSpec {
    if let Some((cw, ch)) = cell {
        if width % cw != 0 || height % ch != 0 {
            printer.warning(
                "Warning",
                &format!(
                    "Image {}x{} is not a multiple of {}x{}; partial cells dropped",
                    width, height, cw, ch
                ),
            );
        }
        return GridSpec::new(height / ch, width / cw, cw, ch);
    }

    let detection = GridConfig::default().resolve(width, height);
    match detection.matched {
        GridMatch::Exact { cell_size } => {
            printer.verbose("Detected", &format!("{}px cells", cell_size));
        }
        GridMatch::Fallback => printer.warning(
            "Warning",
            "No standard cell size fits; assuming 8 frames per row",
        ),
        GridMatch::Degenerate | GridMatch::Configured => {}
    }
    detection.grid
}

/// Cut every non-transparent frame out of a sheet.
fn slice_cells(
    img: &image::RgbaImage,
    grid: &GridSpec,
    slicer: &Slicer,
    base: &str,
    label: &str,
) -> (Vec<SlicedCell>, usize) {
    let frames = slicer.slice(img.width(), img.height(), grid, base, label);
    let cropped = crop_frames(img, frames);
    let cells = cropped
        .kept
        .into_iter()
        .map(|(frame, image)| SlicedCell { frame, image })
        .collect();
    (cells, cropped.blank)
}

pub fn run(args: SliceArgs, printer: &Printer) -> Result<Vec<SlicedCell>> {
    let path = &args.input;
    let display = display_path(path);

    if !path.exists() {
        return Err(MigrateError::Io {
            path: path.clone(),
            message: format!("File not found: {}", display),
        });
    }

    if path.extension().and_then(|e| e.to_str()) != Some("png") {
        printer.warning("Warning", &format!("{} does not have a .png extension", display));
    }

    let naming = NamingConvention::parse(&args.naming).ok_or_else(|| MigrateError::Parse {
        message: format!("Unknown naming convention '{}'", args.naming),
        help: Some(
            "Use direction_first, frame_first, type_direction_frame or index_only".to_string(),
        ),
    })?;

    printer.status("Loading", &display);
    let img = load_rgba(path)?;
    let (w, h) = img.dimensions();

    if w == 0 || h == 0 {
        return Err(MigrateError::Build {
            message: format!("Image has zero dimensions ({}x{})", w, h),
            help: Some("Input image must have non-zero width and height".to_string()),
        });
    }

    let cell = args.cell.as_deref().map(parse_dimensions).transpose()?;
    let grid = resolve_grid(w, h, cell, printer);

    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("sprite");
    let (stem_base, stem_label) = parse_sheet_stem(stem);
    let base = args.name.clone().unwrap_or(stem_base);
    let label = args.label.clone().unwrap_or(stem_label);

    let slicer = Slicer::new(naming).with_alignment(Alignment::BottomCenter);
    let (cells, skipped) = slice_cells(&img, &grid, &slicer, &base, &label);

    printer.status(
        "Slicing",
        &format!("{}x{} grid ({}x{} cells)", grid.columns, grid.rows, grid.cell_width, grid.cell_height),
    );

    let output = args.output.clone().unwrap_or_else(|| PathBuf::from("."));
    for cell in &cells {
        write_png(&cell.image, &output.join(format!("{}.png", cell.frame.name)))?;
    }

    let kept: Vec<SpriteFrame> = cells.iter().map(|c| c.frame.clone()).collect();
    let image_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let meta = SheetMeta::from_slices(image_name, (w, h), grid, &kept);
    write_sheet_json(&meta, &sheet_json_path(&output, stem))?;

    let summary = if skipped > 0 {
        format!("{} ({} empty, skipped)", plural(cells.len(), "frame", "frames"), skipped)
    } else {
        plural(cells.len(), "frame", "frames")
    };
    printer.success("Finished", &summary);

    Ok(cells)
}

fn sheet_json_path(output: &Path, stem: &str) -> PathBuf {
    output.join(format!("{}.sheet.json", stem))
}
