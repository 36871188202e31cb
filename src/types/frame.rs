//! Sprite frame and grid geometry.

use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in source pixels.
///
/// `y` is measured from the bottom of the image (bottom-left raster origin),
/// matching how engines store sprite sub-regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    /// Y coordinate of the rect's top edge in top-left raster space.
    ///
    /// Returns `None` when the rect does not fit inside an image of
    /// `image_height` pixels.
    pub fn top_left_y(&self, image_height: u32) -> Option<u32> {
        image_height
            .checked_sub(self.y)
            .and_then(|v| v.checked_sub(self.h))
    }
}

/// Named pivot positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    #[default]
    Center,
    TopLeft,
    TopCenter,
    TopRight,
    LeftCenter,
    RightCenter,
    BottomLeft,
    BottomCenter,
    BottomRight,
}

impl Alignment {
    /// Normalized pivot (0..1, 0..1) with the origin at the bottom-left.
    pub fn pivot(&self) -> (f32, f32) {
        match self {
            Alignment::Center => (0.5, 0.5),
            Alignment::TopLeft => (0.0, 1.0),
            Alignment::TopCenter => (0.5, 1.0),
            Alignment::TopRight => (1.0, 1.0),
            Alignment::LeftCenter => (0.0, 0.5),
            Alignment::RightCenter => (1.0, 0.5),
            Alignment::BottomLeft => (0.0, 0.0),
            Alignment::BottomCenter => (0.5, 0.0),
            Alignment::BottomRight => (1.0, 0.0),
        }
    }
}

/// Nine-slice border insets in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BorderInsets {
    pub left: u32,
    pub bottom: u32,
    pub right: u32,
    pub top: u32,
}

/// A named sub-region of a sprite sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpriteFrame {
    pub name: String,
    pub rect: Rect,
    pub pivot: (f32, f32),
    pub alignment: Alignment,
    #[serde(default)]
    pub border: BorderInsets,
    /// Grid row (direction index).
    pub row: u32,
    /// Grid column (frame index).
    pub column: u32,
}

/// Row/column layout of a sprite sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSpec {
    pub rows: u32,
    pub columns: u32,
    pub cell_width: u32,
    pub cell_height: u32,
}

impl GridSpec {
    pub fn new(rows: u32, columns: u32, cell_width: u32, cell_height: u32) -> Self {
        Self {
            rows,
            columns,
            cell_width,
            cell_height,
        }
    }

    /// Total number of cells.
    pub fn cell_count(&self) -> u64 {
        u64::from(self.rows) * u64::from(self.columns)
    }

    /// Pixel size covered by the whole grid, `None` if it overflows `u32`.
    pub fn extent(&self) -> Option<(u32, u32)> {
        Some((
            self.columns.checked_mul(self.cell_width)?,
            self.rows.checked_mul(self.cell_height)?,
        ))
    }

    /// True when the grid cannot produce any non-empty frame.
    pub fn is_degenerate(&self) -> bool {
        self.rows == 0 || self.columns == 0 || self.cell_width == 0 || self.cell_height == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top_left_y() {
        let rect = Rect::new(0, 448, 64, 64);
        assert_eq!(rect.top_left_y(512), Some(0));

        let rect = Rect::new(0, 0, 64, 64);
        assert_eq!(rect.top_left_y(512), Some(448));

        let rect = Rect::new(0, 500, 64, 64);
        assert_eq!(rect.top_left_y(512), None);
    }

    #[test]
    fn test_alignment_pivots() {
        assert_eq!(Alignment::Center.pivot(), (0.5, 0.5));
        assert_eq!(Alignment::BottomCenter.pivot(), (0.5, 0.0));
        assert_eq!(Alignment::TopRight.pivot(), (1.0, 1.0));
    }

    #[test]
    fn test_degenerate_grid() {
        assert!(GridSpec::new(8, 8, 0, 0).is_degenerate());
        assert!(!GridSpec::new(8, 8, 64, 64).is_degenerate());
        assert_eq!(GridSpec::new(8, 4, 64, 64).cell_count(), 32);
    }

    #[test]
    fn test_large_grid_arithmetic() {
        let grid = GridSpec::new(70_000, 70_000, 64, 64);
        assert_eq!(grid.cell_count(), 4_900_000_000);
        assert_eq!(grid.extent(), Some((4_480_000, 4_480_000)));
        assert_eq!(GridSpec::new(1, 2, 3_000_000_000, 8).extent(), None);
    }
}
