//! Optimal tile geometry.
//!
//! Calculates the layout (most area used) of a number of equally sized,
//! fixed-aspect boxes within a larger frame, with a fixed spacing reserved
//! between adjacent boxes on both axes.

use serde::{Deserialize, Serialize};

/// One tile-grid layout candidate: `cols x rows` tiles of
/// `width x height` pixels each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TileLayout {
    /// Number of columns.
    pub cols: u32,
    /// Number of rows.
    pub rows: u32,
    /// Tile width in whole pixels.
    pub width: u32,
    /// Tile height in whole pixels.
    pub height: u32,
    /// Area of one tile; the maximized objective.
    pub area: u64,
}

/// Find the tile dimensions maximizing used area.
///
/// Tries each candidate column count from 1 to `box_count`; for each, packs
/// the frame by removing inter-tile spacing, then sizes tiles from whichever
/// axis binds first (width divided across columns, or height across rows,
/// the other derived from `aspect_ratio`). Dimensions are floored to whole
/// pixels. Ties keep the first candidate seen, so lower column counts win.
///
/// Degenerate inputs produce degenerate-but-defined output: a frame too
/// small for the requested spacing (or zero-sized to begin with) yields a
/// zero-area layout, never an error, and dimensions are never negative.
/// Callers must tolerate zero-sized tiles.
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)] // dimensions are floored and clamped non-negative before casting
pub fn optimal_tiles(
    frame_width: f64,
    frame_height: f64,
    box_count: usize,
    aspect_ratio: f64,
    spacing: f64,
) -> TileLayout {
    let mut best = TileLayout::default();

    for cols in 1..=box_count {
        let rows = box_count.div_ceil(cols);

        // Pack the boxes together by removing the spacing between them.
        let packed_width = frame_width - spacing * (cols as f64 - 1.0);
        let packed_height = frame_height - spacing * (rows as f64 - 1.0);

        let h_scale = packed_width / (cols as f64 * aspect_ratio);
        let v_scale = packed_height / rows as f64;

        let (width, height) = if h_scale <= v_scale {
            let width = (packed_width / cols as f64).floor();
            let height = (width / aspect_ratio).floor();
            (width, height)
        } else {
            let height = (packed_height / rows as f64).floor();
            let width = (height * aspect_ratio).floor();
            (width, height)
        };

        let width = width.max(0.0) as u32;
        let height = height.max(0.0) as u32;
        let area = u64::from(width) * u64::from(height);

        if area > best.area {
            best = TileLayout {
                cols: cols as u32,
                rows: rows as u32,
                width,
                height,
                area,
            };
        }
    }

    best
}
