//! Tile block tessellation.
//!
//! Splits a block of tiles at one zoom level into rectangles that are each
//! rendered by a single plotting call. Groups never overlap, cover the block
//! exactly, and hold at most `group_width * group_height` tiles.

use serde::{Deserialize, Serialize};

use forecast_common::tile::block_bounds;
use forecast_common::{BoundingBox, TileCoord, TileRange};

use crate::error::{PlanError, Result};

/// A rectangle of tiles rendered together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileGroup {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl TileGroup {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    /// Tiles covered by this group, row by row.
    pub fn tiles(&self, zoom: u32) -> impl Iterator<Item = TileCoord> + '_ {
        let (x, width) = (self.x, self.width);
        (self.y..self.y + self.height)
            .flat_map(move |y| (x..x + width).map(move |x| TileCoord::new(zoom, x, y)))
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        (self.x..self.x + self.width).contains(&x) && (self.y..self.y + self.height).contains(&y)
    }

    pub fn overlaps(&self, other: &TileGroup) -> bool {
        self.x < other.x + other.width
            && other.x < self.x + self.width
            && self.y < other.y + other.height
            && other.y < self.y + self.height
    }

    /// Geographic extent of the group.
    pub fn bounds(&self, zoom: u32) -> BoundingBox {
        block_bounds(zoom, self.x, self.y, self.width, self.height)
    }
}

/// Partition the block `x ∈ [x0, x0+width)`, `y ∈ [y0, y0+height)` into
/// tile groups.
///
/// Rows of `group_height` tiles are cut from the top, each split into
/// columns of `group_width` tiles with the last column clipped. A shorter
/// trailing row may use wider columns as long as each group stays within
/// `group_width * group_height` tiles, so
/// `tessellate(0, 10, 0, 10, 8, 8)` gives `(0,0,8,8)`, `(8,0,2,8)` and
/// `(0,8,10,2)`.
pub fn tessellate(
    x0: u32,
    width: u32,
    y0: u32,
    height: u32,
    group_width: u32,
    group_height: u32,
) -> Result<Vec<TileGroup>> {
    if group_width == 0 || group_height == 0 {
        return Err(PlanError::InvalidGroupSize {
            width: group_width,
            height: group_height,
        });
    }
    if width == 0 || height == 0 {
        return Ok(Vec::new());
    }

    let x_end = x0.checked_add(width);
    let y_end = y0.checked_add(height);
    let (Some(x_end), Some(y_end)) = (x_end, y_end) else {
        return Err(PlanError::InvalidConfig(format!(
            "tile block at ({x0}, {y0}) of {width}x{height} exceeds the index range"
        )));
    };

    let capacity = u64::from(group_width) * u64::from(group_height);
    let mut groups = Vec::new();

    let mut y = y0;
    while y < y_end {
        let band = group_height.min(y_end - y);
        let column = if band == group_height {
            group_width
        } else {
            // Never wider than the block, so this fits back into a u32
            let widest = (capacity / u64::from(band)).min(u64::from(width)) as u32;
            group_width.max(widest)
        };

        let mut x = x0;
        while x < x_end {
            let w = column.min(x_end - x);
            groups.push(TileGroup::new(x, y, w, band));
            x += w;
        }
        y += band;
    }

    Ok(groups)
}

/// Tessellate a tile range computed by [`forecast_common::tile_range`].
pub fn tessellate_range(
    range: &TileRange,
    group_width: u32,
    group_height: u32,
) -> Result<Vec<TileGroup>> {
    tessellate(
        range.x_min,
        range.width(),
        range.y_min,
        range.height(),
        group_width,
        group_height,
    )
}
