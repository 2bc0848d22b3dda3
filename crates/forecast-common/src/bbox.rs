//! Geographic bounding boxes.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CommonError, CommonResult};

/// A geographic bounding box in degrees (EPSG:4326).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub lon_min: f64,
    pub lat_min: f64,
    pub lon_max: f64,
    pub lat_max: f64,
}

impl BoundingBox {
    /// Create a bounding box, checking that the corners are ordered and in range.
    pub fn new(lon_min: f64, lat_min: f64, lon_max: f64, lat_max: f64) -> CommonResult<Self> {
        let bbox = Self {
            lon_min,
            lat_min,
            lon_max,
            lat_max,
        };
        bbox.validate()?;
        Ok(bbox)
    }

    fn validate(&self) -> CommonResult<()> {
        let values = [self.lon_min, self.lat_min, self.lon_max, self.lat_max];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(CommonError::InvalidBbox(format!("{self:?} has non-finite corners")));
        }
        if !(-180.0..=180.0).contains(&self.lon_min) || !(-180.0..=180.0).contains(&self.lon_max) {
            return Err(CommonError::InvalidBbox(format!(
                "longitude outside [-180, 180]: {} .. {}",
                self.lon_min, self.lon_max
            )));
        }
        if !(-90.0..=90.0).contains(&self.lat_min) || !(-90.0..=90.0).contains(&self.lat_max) {
            return Err(CommonError::InvalidBbox(format!(
                "latitude outside [-90, 90]: {} .. {}",
                self.lat_min, self.lat_max
            )));
        }
        if self.lon_min > self.lon_max || self.lat_min > self.lat_max {
            return Err(CommonError::InvalidBbox(format!(
                "min corner ({}, {}) is past max corner ({}, {})",
                self.lon_min, self.lat_min, self.lon_max, self.lat_max
            )));
        }
        Ok(())
    }

    /// Width in degrees of longitude.
    pub fn width(&self) -> f64 {
        self.lon_max - self.lon_min
    }

    /// Height in degrees of latitude.
    pub fn height(&self) -> f64 {
        self.lat_max - self.lat_min
    }

    /// Check if a point is contained within this bbox.
    pub fn contains_point(&self, lon: f64, lat: f64) -> bool {
        lon >= self.lon_min && lon <= self.lon_max && lat >= self.lat_min && lat <= self.lat_max
    }
}

impl FromStr for BoundingBox {
    type Err = CommonError;

    /// Parse `"lon_min,lat_min,lon_max,lat_max"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 4 {
            return Err(CommonError::InvalidBbox(format!(
                "{s}: expected 'lon_min,lat_min,lon_max,lat_max'"
            )));
        }

        let mut values = [0.0; 4];
        for (value, part) in values.iter_mut().zip(&parts) {
            *value = part
                .parse()
                .map_err(|_| CommonError::InvalidBbox(format!("invalid number: {part}")))?;
        }

        Self::new(values[0], values[1], values[2], values[3])
    }
}
