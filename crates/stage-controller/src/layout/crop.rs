//! Fixed proportional positions for the cropped small-gallery mode.
//!
//! Crop mode places a small, capped number of participants in fixed
//! fractional boxes rather than solver-derived tiles. Each orientation has
//! its own position table, indexed by `count - 1`; the table length is the
//! participant cap for that orientation.

use super::Orientation;
use serde::{Deserialize, Serialize};

/// One fractional box: coordinates and size as fractions of the surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropBox {
    /// Left edge, fraction of surface width.
    pub x: f64,
    /// Top edge, fraction of surface height.
    pub y: f64,
    /// Width, fraction of surface width.
    pub w: f64,
    /// Height, fraction of surface height.
    pub h: f64,
}

const fn boxed(x: f64, y: f64, w: f64, h: f64) -> CropBox {
    CropBox { x, y, w, h }
}

const FULL: CropBox = boxed(0.0, 0.0, 1.0, 1.0);

/// Landscape positions, up to four tiles.
static LANDSCAPE: [&[CropBox]; 4] = [
    &[FULL],
    &[boxed(0.0, 0.0, 0.5, 1.0), boxed(0.5, 0.0, 0.5, 1.0)],
    &[
        boxed(0.0, 0.0, 0.5, 1.0),
        boxed(0.5, 0.0, 0.5, 0.5),
        boxed(0.5, 0.5, 0.5, 0.5),
    ],
    &[
        boxed(0.0, 0.0, 0.5, 0.5),
        boxed(0.5, 0.0, 0.5, 0.5),
        boxed(0.0, 0.5, 0.5, 0.5),
        boxed(0.5, 0.5, 0.5, 0.5),
    ],
];

/// Square positions, up to four tiles.
static SQUARE: [&[CropBox]; 4] = [
    &[FULL],
    &[boxed(0.0, 0.0, 1.0, 0.5), boxed(0.0, 0.5, 1.0, 0.5)],
    &[
        boxed(0.0, 0.0, 1.0, 0.5),
        boxed(0.0, 0.5, 0.5, 0.5),
        boxed(0.5, 0.5, 0.5, 0.5),
    ],
    &[
        boxed(0.0, 0.0, 0.5, 0.5),
        boxed(0.5, 0.0, 0.5, 0.5),
        boxed(0.0, 0.5, 0.5, 0.5),
        boxed(0.5, 0.5, 0.5, 0.5),
    ],
];

/// Portrait positions, up to three tiles.
static PORTRAIT: [&[CropBox]; 3] = [
    &[FULL],
    &[boxed(0.0, 0.0, 1.0, 0.5), boxed(0.0, 0.5, 1.0, 0.5)],
    &[
        boxed(0.0, 0.0, 1.0, 0.5),
        boxed(0.0, 0.5, 0.5, 0.5),
        boxed(0.5, 0.5, 0.5, 0.5),
    ],
];

fn table(orientation: Orientation) -> &'static [&'static [CropBox]] {
    match orientation {
        Orientation::Landscape => &LANDSCAPE,
        Orientation::Square => &SQUARE,
        Orientation::Portrait => &PORTRAIT,
    }
}

/// Maximum tiles the crop table supports for an orientation.
#[must_use]
pub fn max_crop_tiles(orientation: Orientation) -> usize {
    table(orientation).len()
}

/// Positions for `count` tiles, capped at the orientation's table size.
/// Zero participants yield an empty slice.
#[must_use]
pub fn crop_positions(orientation: Orientation, count: usize) -> &'static [CropBox] {
    let positions = table(orientation);
    let capped = count.min(positions.len());
    match capped.checked_sub(1) {
        Some(index) => positions.get(index).copied().unwrap_or_default(),
        None => &[],
    }
}

/// The cropped arrangement handed to the render tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropArrangement {
    /// One box per displayed participant, roster order.
    pub boxes: Vec<CropBox>,
}

impl CropArrangement {
    /// Build the arrangement for an orientation and participant count.
    #[must_use]
    pub fn for_surface(orientation: Orientation, count: usize) -> Self {
        Self {
            boxes: crop_positions(orientation, count).to_vec(),
        }
    }
}
