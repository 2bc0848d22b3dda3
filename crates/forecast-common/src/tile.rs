//! Slippy-map (Web Mercator) tile coordinates.
//!
//! Converts geographic bounding boxes to tile index ranges and tile indices
//! back to the longitude/latitude of their top-left corner. The two
//! directions agree at tile-corner granularity: the corners returned by
//! [`tile_to_lonlat`] map back to the same indices through [`tile_range`].

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::{BoundingBox, CommonError, CommonResult};

/// Web Mercator valid latitude range
pub const MAX_LAT: f64 = 85.051_128_779_806_6;
pub const MIN_LAT: f64 = -MAX_LAT;

/// Highest zoom level whose corner indices still fit in a u32.
pub const MAX_ZOOM: u32 = 30;

/// Fractional tile positions closer than this to a tile edge are treated as
/// lying on the edge.
const EDGE_EPSILON: f64 = 1e-6;

/// A tile coordinate (z/x/y).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TileCoord {
    /// Zoom level
    pub z: u32,
    /// Column (x), 0 at the antimeridian west edge
    pub x: u32,
    /// Row (y), 0 at the north edge
    pub y: u32,
}

impl TileCoord {
    pub fn new(z: u32, x: u32, y: u32) -> Self {
        Self { z, x, y }
    }

    /// Relative path of the tile image, `z/x/y`.
    pub fn path(&self) -> String {
        format!("{}/{}/{}", self.z, self.x, self.y)
    }

    /// Geographic extent of this tile.
    pub fn bounds(&self) -> BoundingBox {
        block_bounds(self.z, self.x, self.y, 1, 1)
    }
}

/// Half-open block of tile indices at one zoom level:
/// `x ∈ [x_min, x_max)`, `y ∈ [y_min, y_max)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileRange {
    pub zoom: u32,
    pub x_min: u32,
    pub x_max: u32,
    pub y_min: u32,
    pub y_max: u32,
}

impl TileRange {
    pub fn width(&self) -> u32 {
        self.x_max - self.x_min
    }

    pub fn height(&self) -> u32 {
        self.y_max - self.y_min
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Number of tiles in the block.
    pub fn len(&self) -> u64 {
        u64::from(self.width()) * u64::from(self.height())
    }

    /// All tiles in the block, row by row.
    pub fn tiles(&self) -> impl Iterator<Item = TileCoord> + '_ {
        (self.y_min..self.y_max)
            .flat_map(move |y| (self.x_min..self.x_max).map(move |x| TileCoord::new(self.zoom, x, y)))
    }
}

fn tiles_per_side(zoom: u32) -> f64 {
    2.0_f64.powi(zoom as i32)
}

/// Snap values within [`EDGE_EPSILON`] of an integer onto it.
fn snap(v: f64) -> f64 {
    let rounded = v.round();
    if (v - rounded).abs() < EDGE_EPSILON {
        rounded
    } else {
        v
    }
}

/// Fractional tile column of a longitude.
fn lon_to_tile_x(lon: f64, n: f64) -> f64 {
    (lon + 180.0) / 360.0 * n
}

/// Fractional tile row of a latitude, clamped to the Web Mercator range.
fn lat_to_tile_y(lat: f64, n: f64) -> f64 {
    let lat_rad = lat.clamp(MIN_LAT, MAX_LAT).to_radians();
    (1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / PI) / 2.0 * n
}

/// Compute the tile index block covering `bbox` at `zoom`.
///
/// Edges falling exactly on tile boundaries do not pull in the neighbouring
/// tile, so a bbox built from tile corners maps back onto exactly those tiles.
/// The block is never empty: a point or line lying on a tile edge covers the
/// tile to its east or south (west or north at the far edge of the grid).
pub fn tile_range(bbox: &BoundingBox, zoom: u32) -> CommonResult<TileRange> {
    if zoom > MAX_ZOOM {
        return Err(CommonError::InvalidZoom {
            zoom,
            max: MAX_ZOOM,
        });
    }

    let n = tiles_per_side(zoom);
    let last = (1u32 << zoom) - 1;
    let clamp = |v: f64| v.clamp(0.0, n) as u32;

    let x_min = clamp(snap(lon_to_tile_x(bbox.lon_min, n)).floor()).min(last);
    let x_max = clamp(snap(lon_to_tile_x(bbox.lon_max, n)).ceil());
    // Rows grow southwards: the north edge gives the first row.
    let y_min = clamp(snap(lat_to_tile_y(bbox.lat_max, n)).floor()).min(last);
    let y_max = clamp(snap(lat_to_tile_y(bbox.lat_min, n)).ceil());

    Ok(TileRange {
        zoom,
        x_min,
        x_max: x_max.max(x_min + 1),
        y_min,
        y_max: y_max.max(y_min + 1),
    })
}

/// Longitude/latitude of the top-left corner of tile `(x, y)` at `zoom`.
///
/// Indices up to `2^zoom` inclusive are accepted so the far corners of the
/// last row and column can be computed.
pub fn tile_to_lonlat(x: u32, y: u32, zoom: u32) -> (f64, f64) {
    let n = tiles_per_side(zoom);
    let lon = f64::from(x) / n * 360.0 - 180.0;
    let lat = (PI * (1.0 - 2.0 * f64::from(y) / n))
        .sinh()
        .atan()
        .to_degrees();
    (lon, lat)
}

/// Geographic extent of a `width` × `height` block of tiles starting at `(x, y)`.
pub fn block_bounds(zoom: u32, x: u32, y: u32, width: u32, height: u32) -> BoundingBox {
    let (lon_min, lat_max) = tile_to_lonlat(x, y, zoom);
    let (lon_max, lat_min) = tile_to_lonlat(x + width, y + height, zoom);
    BoundingBox {
        lon_min,
        lat_min,
        lon_max,
        lat_max,
    }
}
