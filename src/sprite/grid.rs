//! Sprite sheet grid auto-detection.
//!
//! Directional sheets are laid out with one row per facing and one column per
//! animation frame. The detector only sees pixel dimensions, so it tries a set
//! of common square cell sizes and falls back to an 8-column layout.

use crate::types::GridSpec;

/// Square cell sizes tried in ascending order.
pub const DEFAULT_CANDIDATES: [u32; 4] = [64, 96, 128, 256];

/// Column count assumed when no candidate divides the image.
pub const FALLBACK_COLUMNS: u32 = 8;

/// How a grid was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridMatch {
    /// A candidate cell size divided both dimensions.
    Exact { cell_size: u32 },
    /// No candidate matched; 8 columns with derived rows.
    Fallback,
    /// The image has a zero dimension.
    Degenerate,
    /// Taken from configuration instead of detected.
    Configured,
}

/// Detected grid plus how it was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridDetection {
    pub grid: GridSpec,
    pub matched: GridMatch,
}

impl GridDetection {
    pub fn is_exact(&self) -> bool {
        matches!(self.matched, GridMatch::Exact { .. })
    }
}

/// Grid detector with a configurable candidate list.
#[derive(Debug, Clone)]
pub struct GridDetector {
    candidates: Vec<u32>,
}

impl Default for GridDetector {
    fn default() -> Self {
        Self::new(DEFAULT_CANDIDATES)
    }
}

impl GridDetector {
    /// Create a detector. Candidates are sorted ascending; zeros are dropped.
    pub fn new(candidates: impl IntoIterator<Item = u32>) -> Self {
        let mut candidates: Vec<u32> = candidates.into_iter().filter(|&c| c > 0).collect();
        candidates.sort_unstable();
        candidates.dedup();
        Self { candidates }
    }

    pub fn candidates(&self) -> &[u32] {
        &self.candidates
    }

    /// Detect the grid for an image of the given size.
    pub fn detect(&self, width: u32, height: u32) -> GridDetection {
        if width == 0 || height == 0 {
            return GridDetection {
                grid: GridSpec::new(FALLBACK_COLUMNS, FALLBACK_COLUMNS, 0, 0),
                matched: GridMatch::Degenerate,
            };
        }

        for &size in &self.candidates {
            if width % size == 0 && height % size == 0 {
                return GridDetection {
                    grid: GridSpec::new(height / size, width / size, size, size),
                    matched: GridMatch::Exact { cell_size: size },
                };
            }
        }

        let cell_width = (width / FALLBACK_COLUMNS).max(1);
        let rows = height.div_ceil(cell_width).max(1);
        let cell_height = (height / rows).max(1);

        GridDetection {
            grid: GridSpec::new(rows, FALLBACK_COLUMNS, cell_width, cell_height),
            matched: GridMatch::Fallback,
        }
    }
}

/// Detect a sheet grid with the default candidate sizes.
pub fn detect_grid(width: u32, height: u32) -> GridSpec {
    GridDetector::default().detect(width, height).grid
}
