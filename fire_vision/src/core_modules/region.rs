// THEORY:
// A `Region` is one spatially coherent patch of fire-colored pixels in a single
// frame. Like `Frame`, it is a "dumb" data container: the extractor fills it in,
// the scorer sums it up, and alert consumers draw it. It has no identity across
// frames.

use serde::{Deserialize, Serialize};

/// Axis-aligned box in pixel coordinates: top-left corner plus size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    /// Builds a box from inclusive corner coordinates.
    pub fn from_corners(min_x: u32, min_y: u32, max_x: u32, max_y: u32) -> Self {
        Self {
            x: min_x,
            y: min_y,
            width: max_x - min_x + 1,
            height: max_y - min_y + 1,
        }
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

/// A connected group of candidate pixels that passed the minimum-area filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub bounding_box: BoundingBox,
    /// Number of pixels in the component.
    pub area: u32,
    /// Mean pixel position of the component, `(x, y)`.
    pub centroid: (f64, f64),
}

impl Region {
    /// How much of the bounding box the component actually covers, in (0, 1].
    pub fn fill_ratio(&self) -> f64 {
        self.area as f64 / self.bounding_box.area() as f64
    }
}
