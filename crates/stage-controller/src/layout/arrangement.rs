//! Layout mode dispatch.
//!
//! Selects which rendering arrangement consumes the roster and solver
//! output, given the user-selected mode, viewport orientation, and whether a
//! screen share is focused. Re-evaluated on every render trigger; no state.

use super::crop::CropArrangement;
use super::geometry::{optimal_tiles, TileLayout};
use super::{Orientation, Viewport};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// User-selected rendering mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayoutMode {
    /// Equal tiles from the geometry solver.
    Grid,
    /// One focused participant rendered large.
    SpeakerFocus,
    /// Fixed small gallery with proportional boxes.
    Crop,
}

impl fmt::Display for LayoutMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LayoutMode::Grid => "grid",
            LayoutMode::SpeakerFocus => "speaker",
            LayoutMode::Crop => "crop",
        };
        f.write_str(name)
    }
}

impl FromStr for LayoutMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "grid" => Ok(LayoutMode::Grid),
            "speaker" => Ok(LayoutMode::SpeakerFocus),
            "crop" => Ok(LayoutMode::Crop),
            other => Err(format!("unknown layout mode: {other}")),
        }
    }
}

/// Solver-driven equal-tile grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridArrangement {
    /// Tile grid computed by the geometry solver.
    pub tile: TileLayout,
    /// Gap between adjacent tiles, pixels.
    pub gap: u32,
    /// Padding around the whole grid, pixels.
    pub padding: u32,
    /// Tile aspect ratio fed to the solver.
    pub aspect_ratio: f64,
    /// Whether tiles render with rounded corners.
    pub rounded: bool,
}

/// Screen share beside a fixed-width participant column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideRailArrangement {
    /// Width of the participant column, pixels.
    pub rail_width: u32,
    /// Gap between rail tiles, pixels.
    pub gap: u32,
    /// Padding around the whole surface, pixels.
    pub padding: u32,
    /// Rail grid rows; each cell holds the participant index it displays
    /// (an index spanning adjacent cells spans those columns) or `None` for
    /// an empty cell.
    pub slot_rows: Vec<Vec<Option<usize>>>,
}

/// Picture-in-picture window for the focused participant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PipWindow {
    /// Window width, pixels.
    pub width: f64,
    /// Window height, pixels.
    pub height: f64,
    /// Inset from the surface corner, pixels.
    pub corner_offset: u32,
}

/// Focused participant rendered large, optionally alongside or over a
/// screen share.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeakerArrangement {
    /// Whether the focused participant overlays the share (portrait/square
    /// surfaces, and whenever crop mode defers to speaker focus).
    pub overlay: bool,
    /// Fixed-width participant column beside the share; only set when the
    /// share renders side by side instead of overlaid.
    pub rail_width: Option<u32>,
    /// The focused participant's window when overlaying.
    pub pip: PipWindow,
    /// Whether the focused tile renders square.
    pub square_tile: bool,
}

/// A rendering arrangement for the external render tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Arrangement {
    /// Equal-tile grid.
    Grid(GridArrangement),
    /// Share beside a participant rail.
    SideRail(SideRailArrangement),
    /// Focused participant large.
    Speaker(SpeakerArrangement),
    /// Fixed proportional boxes.
    Crop(CropArrangement),
}

/// Choose the arrangement for the current render trigger.
#[must_use]
pub fn select_arrangement(
    mode: LayoutMode,
    has_share: bool,
    viewport: Viewport,
    visible_count: usize,
) -> Arrangement {
    match mode {
        LayoutMode::Grid => {
            if viewport.orientation() == Orientation::Landscape {
                if has_share {
                    Arrangement::SideRail(side_rail_arrangement(visible_count))
                } else {
                    Arrangement::Grid(grid_arrangement(viewport, visible_count))
                }
            } else if has_share {
                // A grid cannot usefully coexist with a share in portrait.
                Arrangement::Speaker(speaker_arrangement(viewport, true, false))
            } else {
                Arrangement::Grid(grid_arrangement(viewport, visible_count))
            }
        }
        LayoutMode::SpeakerFocus => {
            Arrangement::Speaker(speaker_arrangement(viewport, has_share, false))
        }
        LayoutMode::Crop => {
            if has_share {
                Arrangement::Speaker(speaker_arrangement(viewport, true, true))
            } else {
                Arrangement::Crop(CropArrangement::for_surface(
                    viewport.orientation(),
                    visible_count,
                ))
            }
        }
    }
}

/// Grid parameters per orientation, tile dimensions from the solver.
fn grid_arrangement(viewport: Viewport, visible_count: usize) -> GridArrangement {
    let (gap, padding, aspect_ratio, rounded) = match viewport.orientation() {
        Orientation::Landscape => (30u32, 60u32, 16.0 / 9.0, true),
        Orientation::Square => (10, 10, 1.0, false),
        Orientation::Portrait => {
            let aspect = if visible_count <= 4 { 16.0 / 9.0 } else { 1.0 };
            (10, 0, aspect, false)
        }
    };

    let frame_width = f64::from(viewport.width.saturating_sub(padding * 2));
    let frame_height = f64::from(viewport.height.saturating_sub(padding * 2));
    let tile = optimal_tiles(
        frame_width,
        frame_height,
        visible_count,
        aspect_ratio,
        f64::from(gap),
    );

    GridArrangement {
        tile,
        gap,
        padding,
        aspect_ratio,
        rounded,
    }
}

/// Side-rail parameters: rail widens past five participants.
fn side_rail_arrangement(visible_count: usize) -> SideRailArrangement {
    SideRailArrangement {
        rail_width: if visible_count > 5 { 600 } else { 400 },
        gap: 30,
        padding: 60,
        slot_rows: rail_slot_rows(visible_count),
    }
}

/// Rail slot template per participant count.
///
/// Counts of six and up interleave two columns; seven and nine centre their
/// odd participant on a half-width bottom row.
fn rail_slot_rows(count: usize) -> Vec<Vec<Option<usize>>> {
    match count {
        0 => Vec::new(),
        1..=5 => (0..count).map(|i| vec![Some(i)]).collect(),
        6 => vec![
            vec![Some(0), Some(1)],
            vec![Some(2), Some(3)],
            vec![Some(4), Some(5)],
        ],
        7 => vec![
            vec![Some(0), Some(0), Some(1), Some(1)],
            vec![Some(2), Some(2), Some(3), Some(3)],
            vec![Some(4), Some(4), Some(5), Some(5)],
            vec![None, Some(6), Some(6), None],
        ],
        8 => vec![
            vec![Some(0), Some(1)],
            vec![Some(2), Some(3)],
            vec![Some(4), Some(5)],
            vec![Some(6), Some(7)],
        ],
        9 => vec![
            vec![Some(0), Some(0), Some(1), Some(1)],
            vec![Some(2), Some(2), Some(3), Some(3)],
            vec![Some(4), Some(4), Some(5), Some(5)],
            vec![Some(6), Some(6), Some(7), Some(7)],
            vec![None, Some(8), Some(8), None],
        ],
        _ => vec![
            vec![Some(0), Some(1)],
            vec![Some(2), Some(3)],
            vec![Some(4), Some(5)],
            vec![Some(6), Some(7)],
            vec![Some(8), Some(9)],
        ],
    }
}

/// Speaker arrangement parameters per orientation.
fn speaker_arrangement(viewport: Viewport, has_share: bool, via_crop: bool) -> SpeakerArrangement {
    let orientation = viewport.orientation();
    let overlay = has_share && (orientation != Orientation::Landscape || via_crop);

    let pip = match orientation {
        Orientation::Landscape => PipWindow {
            width: 383.0,
            height: 215.44,
            corner_offset: if via_crop { 0 } else { 36 },
        },
        Orientation::Square => PipWindow {
            width: 240.0,
            height: 240.0,
            corner_offset: if via_crop { 0 } else { 60 },
        },
        Orientation::Portrait => PipWindow {
            width: 360.0,
            height: 360.0,
            corner_offset: if via_crop { 0 } else { 36 },
        },
    };

    let square_tile = if overlay {
        viewport.height >= viewport.width
    } else {
        viewport.width == viewport.height
    };

    SpeakerArrangement {
        overlay,
        rail_width: (has_share && !overlay).then_some(400),
        pip,
        square_tile,
    }
}
