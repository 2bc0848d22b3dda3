//! Common types and utilities shared across the forecast map planner.

pub mod bbox;
pub mod error;
pub mod instant;
pub mod step;
pub mod tile;

pub use bbox::BoundingBox;
pub use error::{CommonError, CommonResult, ErrorKind};
pub use instant::Instant;
pub use step::{ModelStep, StepError, TimeUnit};
pub use tile::{tile_range, tile_to_lonlat, TileCoord, TileRange};
