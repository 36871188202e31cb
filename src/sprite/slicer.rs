//! Grid slicing into named sprite frames.
//!
//! Frame rects use a bottom-left raster origin, while sheet rows count from
//! the top. Row 0 therefore lands in the bottom-most raster band:
//! `rect.y = image_height - (row + 1) * cell_height`.

use crate::types::{Alignment, BorderInsets, GridSpec, Rect, SpriteFrame};

use super::naming::NamingConvention;

/// Slicing settings shared by every frame of a sheet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Slicer {
    pub naming: NamingConvention,
    pub alignment: Alignment,
    pub border: BorderInsets,
}

impl Default for Slicer {
    fn default() -> Self {
        Self::new(NamingConvention::default())
    }
}

impl Slicer {
    pub fn new(naming: NamingConvention) -> Self {
        Self {
            naming,
            alignment: Alignment::Center,
            border: BorderInsets::default(),
        }
    }

    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    pub fn with_border(mut self, border: BorderInsets) -> Self {
        self.border = border;
        self
    }

    /// Slice an image of the given size into frames, row-major.
    ///
    /// Cells that do not fit inside the image are skipped, so the work done
    /// is bounded by the image size whatever the grid claims.
    pub fn slice(
        &self,
        image_width: u32,
        image_height: u32,
        grid: &GridSpec,
        base: &str,
        label: &str,
    ) -> Vec<SpriteFrame> {
        if grid.is_degenerate() {
            return Vec::new();
        }

        // Rows and columns that fit, so every product below stays in bounds
        let rows = grid.rows.min(image_height / grid.cell_height);
        let columns = grid.columns.min(image_width / grid.cell_width);
        let mut frames = Vec::with_capacity(rows as usize * columns as usize);
        let pivot = self.alignment.pivot();

        for row in 0..rows {
            let bottom = image_height - (row + 1) * grid.cell_height;
            for column in 0..columns {
                frames.push(SpriteFrame {
                    name: self
                        .naming
                        .frame_name(base, label, row, column, grid.columns),
                    rect: Rect::new(
                        column * grid.cell_width,
                        bottom,
                        grid.cell_width,
                        grid.cell_height,
                    ),
                    pivot,
                    alignment: self.alignment,
                    border: self.border,
                    row,
                    column,
                });
            }
        }

        frames
    }
}

/// Slice with default alignment and no borders.
pub fn slice(
    image_width: u32,
    image_height: u32,
    grid: &GridSpec,
    naming: NamingConvention,
    base: &str,
    label: &str,
) -> Vec<SpriteFrame> {
    Slicer::new(naming).slice(image_width, image_height, grid, base, label)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_slice_512_with_8x8_grid() {
        let grid = GridSpec::new(8, 8, 64, 64);
        let frames = slice(512, 512, &grid, NamingConvention::TypeDirectionFrame, "feca", "idle");

        assert_eq!(frames.len(), 64);
        for frame in &frames {
            assert_eq!((frame.rect.w, frame.rect.h), (64, 64));
        }
    }

    #[test]
    fn test_row_zero_maps_to_bottom_raster_band() {
        let grid = GridSpec::new(8, 8, 64, 64);
        let frames = slice(512, 512, &grid, NamingConvention::DirectionFirst, "feca", "idle");

        let first = &frames[0];
        assert_eq!((first.row, first.column), (0, 0));
        assert_eq!(first.rect.x, 0);
        assert_eq!(first.rect.y, 448);

        let last = frames.last().unwrap();
        assert_eq!((last.row, last.column), (7, 7));
        assert_eq!(last.rect.x, 448);
        assert_eq!(last.rect.y, 0);
    }

    #[test]
    fn test_border_carried_to_every_frame() {
        let border = BorderInsets { left: 2, bottom: 1, right: 2, top: 0 };
        let slicer = Slicer::new(NamingConvention::IndexOnly).with_border(border);
        let frames = slicer.slice(32, 16, &GridSpec::new(1, 2, 16, 16), "ui", "button");

        assert_eq!(frames.len(), 2);
        assert!(frames.iter().all(|f| f.border == border));
    }

    #[test]
    fn test_oversized_grid_is_clipped_to_image() {
        let grid = GridSpec::new(70_000, 70_000, 64, 64);
        let frames = slice(128, 128, &grid, NamingConvention::IndexOnly, "x", "idle");
        assert_eq!(frames.len(), 4);
        assert_eq!(frames[3].name, "x_70001");

        let huge_cells = GridSpec::new(2, 2, 3_000_000_000, 3_000_000_000);
        assert!(slice(128, 128, &huge_cells, NamingConvention::IndexOnly, "x", "idle").is_empty());
    }

    #[test]
    fn test_row_major_order() {
        let grid = GridSpec::new(2, 3, 10, 10);
        let frames = slice(30, 20, &grid, NamingConvention::DirectionFirst, "x", "idle");
        let coords: Vec<(u32, u32)> = frames.iter().map(|f| (f.row, f.column)).collect();
        assert_eq!(coords, vec![(0, 0), (0, 1), (0, 2), (1, 0), (1, 1), (1, 2)]);
        assert_eq!(frames[0].name, "x_S_00");
        assert_eq!(frames[3].name, "x_SW_00");
    }

    #[test]
    fn test_non_square_cells() {
        let grid = GridSpec::new(5, 8, 62, 60);
        let frames = slice(500, 300, &grid, NamingConvention::IndexOnly, "sheet", "idle");
        assert_eq!(frames.len(), 40);
        assert_eq!(frames[0].rect, Rect::new(0, 240, 62, 60));
        assert_eq!(frames[39].name, "sheet_039");
    }

    #[test]
    fn test_cells_outside_image_skipped() {
        // 8 columns of 1px over a 4px wide image: only 4 fit
        let grid = GridSpec::new(1, 8, 1, 4);
        let frames = slice(4, 4, &grid, NamingConvention::IndexOnly, "tiny", "idle");
        assert_eq!(frames.len(), 4);

        // More rows than the image can hold
        let grid = GridSpec::new(3, 1, 4, 4);
        let frames = slice(4, 8, &grid, NamingConvention::IndexOnly, "tiny", "idle");
        assert_eq!(frames.len(), 2);
    }

    #[test]
    fn test_degenerate_grid_yields_nothing() {
        let grid = GridSpec::new(8, 8, 0, 0);
        assert!(slice(0, 0, &grid, NamingConvention::IndexOnly, "x", "idle").is_empty());
    }

    #[test]
    fn test_names_unique_per_convention() {
        let grid = GridSpec::new(8, 8, 64, 64);
        for convention in NamingConvention::ALL {
            let frames = slice(512, 512, &grid, convention, "feca", "walk");
            let names: HashSet<&str> = frames.iter().map(|f| f.name.as_str()).collect();
            assert_eq!(names.len(), frames.len(), "{convention}");
        }
    }

    #[test]
    fn test_alignment_sets_pivot() {
        let grid = GridSpec::new(1, 1, 64, 64);
        let frames = Slicer::new(NamingConvention::IndexOnly)
            .with_alignment(Alignment::BottomCenter)
            .slice(64, 64, &grid, "x", "idle");
        assert_eq!(frames[0].pivot, (0.5, 0.0));
        assert_eq!(frames[0].alignment, Alignment::BottomCenter);
    }
}
