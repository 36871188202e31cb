//! Sprite sheet metadata and atlas packing.
//!
//! Sliced sheets and packed atlases are both described in TexturePacker's
//! JSON Hash format (top-left frame origin) extended with a normalized pivot.

use std::collections::BTreeMap;
use std::path::Path;

use image::{imageops, RgbaImage};
use serde::Serialize;

use crate::error::Result;
use crate::types::{GridSpec, SpriteFrame};

use super::write::write_json;

/// A frame in a sheet, in top-left raster coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub name: String,
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
    pub pivot: (f32, f32),
}

/// Sprite sheet metadata.
#[derive(Debug, Clone)]
pub struct SheetMeta {
    pub frames: Vec<Frame>,
    pub image: String,
    pub size: (u32, u32),
    pub grid: Option<GridSpec>,
}

impl SheetMeta {
    /// Metadata for a sliced sheet. Frames that do not fit are left out.
    pub fn from_slices(image: impl Into<String>, size: (u32, u32), grid: GridSpec, frames: &[SpriteFrame]) -> Self {
        let frames = frames
            .iter()
            .filter_map(|f| {
                let y = f.rect.top_left_y(size.1)?;
                Some(Frame {
                    name: f.name.clone(),
                    x: f.rect.x,
                    y,
                    w: f.rect.w,
                    h: f.rect.h,
                    pivot: f.pivot,
                })
            })
            .collect();

        Self {
            frames,
            image: image.into(),
            size,
            grid: Some(grid),
        }
    }
}

/// Atlas packer using shelf (row-based) packing.
pub struct SheetPacker {
    pub padding: u32,
}

impl SheetPacker {
    pub fn new(padding: u32) -> Self {
        Self { padding }
    }

    /// Pack named frames into one atlas image.
    ///
    /// Returns the composited image and frame metadata (in input order).
    pub fn pack(&self, sprites: &[(String, RgbaImage)], image_name: &str) -> (RgbaImage, SheetMeta) {
        if sprites.is_empty() {
            let meta = SheetMeta {
                frames: vec![],
                image: image_name.to_string(),
                size: (0, 0),
                grid: None,
            };
            return (RgbaImage::new(0, 0), meta);
        }

        // Tallest first; ties keep input order
        let mut indices: Vec<usize> = (0..sprites.len()).collect();
        indices.sort_by(|&a, &b| {
            sprites[b]
                .1
                .height()
                .cmp(&sprites[a].1.height())
                .then_with(|| a.cmp(&b))
        });

        let max_w = sprites.iter().map(|(_, s)| s.width()).max().unwrap_or(1);
        let total_area: u64 = sprites
            .iter()
            .map(|(_, s)| u64::from(s.width() + self.padding) * u64::from(s.height() + self.padding))
            .sum();
        let sqrt_area = (total_area as f64).sqrt().ceil() as u32;
        let sheet_width = next_power_of_two(max_w.max(sqrt_area));

        let mut cursor_x: u32 = 0;
        let mut cursor_y: u32 = 0;
        let mut row_height: u32 = 0;
        let mut placements: Vec<(u32, u32)> = vec![(0, 0); sprites.len()];

        for &idx in &indices {
            let (w, h) = sprites[idx].1.dimensions();

            if cursor_x + w > sheet_width && cursor_x > 0 {
                cursor_y += row_height + self.padding;
                cursor_x = 0;
                row_height = 0;
            }

            placements[idx] = (cursor_x, cursor_y);
            row_height = row_height.max(h);
            cursor_x += w + self.padding;
        }

        let sheet_height = cursor_y + row_height;
        let mut atlas = RgbaImage::new(sheet_width, sheet_height);
        let mut frames = Vec::with_capacity(sprites.len());

        for ((name, sprite), &(x, y)) in sprites.iter().zip(&placements) {
            imageops::replace(&mut atlas, sprite, i64::from(x), i64::from(y));
            frames.push(Frame {
                name: name.clone(),
                x,
                y,
                w: sprite.width(),
                h: sprite.height(),
                pivot: (0.5, 0.0),
            });
        }

        let meta = SheetMeta {
            frames,
            image: image_name.to_string(),
            size: (sheet_width, sheet_height),
            grid: None,
        };

        (atlas, meta)
    }
}

/// Write sheet metadata as TexturePacker-compatible JSON Hash format.
pub fn write_sheet_json(meta: &SheetMeta, path: &Path) -> Result<()> {
    write_json(path, &TexturePackerJson::from_meta(meta))
}

fn next_power_of_two(n: u32) -> u32 {
    if n == 0 {
        return 1;
    }
    n.next_power_of_two()
}

// --- TexturePacker JSON serialization types ---

#[derive(Serialize)]
struct TexturePackerJson {
    frames: BTreeMap<String, TPFrame>,
    meta: TPMeta,
}

#[derive(Serialize)]
struct TPFrame {
    frame: TPRect,
    rotated: bool,
    trimmed: bool,
    #[serde(rename = "spriteSourceSize")]
    sprite_source_size: TPRect,
    #[serde(rename = "sourceSize")]
    source_size: TPSize,
    pivot: TPPoint,
}

#[derive(Serialize)]
struct TPRect {
    x: u32,
    y: u32,
    w: u32,
    h: u32,
}

#[derive(Serialize)]
struct TPSize {
    w: u32,
    h: u32,
}

#[derive(Serialize)]
struct TPPoint {
    x: f32,
    y: f32,
}

#[derive(Serialize)]
struct TPGrid {
    rows: u32,
    columns: u32,
    #[serde(rename = "cellWidth")]
    cell_width: u32,
    #[serde(rename = "cellHeight")]
    cell_height: u32,
}

#[derive(Serialize)]
struct TPMeta {
    app: String,
    version: String,
    image: String,
    size: TPSize,
    scale: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    grid: Option<TPGrid>,
}

impl TexturePackerJson {
    fn from_meta(meta: &SheetMeta) -> Self {
        let mut frames = BTreeMap::new();
        for f in &meta.frames {
            frames.insert(
                f.name.clone(),
                TPFrame {
                    frame: TPRect {
                        x: f.x,
                        y: f.y,
                        w: f.w,
                        h: f.h,
                    },
                    rotated: false,
                    trimmed: false,
                    sprite_source_size: TPRect {
                        x: 0,
                        y: 0,
                        w: f.w,
                        h: f.h,
                    },
                    source_size: TPSize { w: f.w, h: f.h },
                    pivot: TPPoint {
                        x: f.pivot.0,
                        y: f.pivot.1,
                    },
                },
            );
        }

        TexturePackerJson {
            frames,
            meta: TPMeta {
                app: "assetmig".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                image: meta.image.clone(),
                size: TPSize {
                    w: meta.size.0,
                    h: meta.size.1,
                },
                scale: "1".to_string(),
                grid: meta.grid.map(|g| TPGrid {
                    rows: g.rows,
                    columns: g.columns,
                    cell_width: g.cell_width,
                    cell_height: g.cell_height,
                }),
            },
        }
    }
}
