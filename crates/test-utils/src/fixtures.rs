//! Common test fixtures for planner tests.
//!
//! Reference times, regions and the recipe/flavour/inventory documents used
//! across the workspace's tests and benches.

use chrono::{DateTime, TimeZone, Utc};
use forecast_common::{BoundingBox, Instant};

/// Model run reference times.
pub mod reftime {
    use super::*;

    /// Reference time as written in output paths.
    pub const RUN_00Z_STR: &str = "2024-01-15T00:00:00";

    pub fn run_00z() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap()
    }

    pub fn run_12z() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap()
    }
}

/// Instant of the 00Z run at `step` hours.
pub fn instant(step: u32) -> Instant {
    Instant::new(reftime::run_00z(), step)
}

/// Instants of the 00Z run for each step.
pub fn instants(steps: &[u32]) -> Vec<Instant> {
    steps.iter().map(|&s| instant(s)).collect()
}

/// Regions as `(lon_min, lat_min, lon_max, lat_max)`.
pub mod region {
    /// Covers tiles x 16..18, y 11..13 at zoom 5
    pub const ITALY: (f64, f64, f64, f64) = (6.0, 36.0, 19.0, 47.5);

    pub const EUROPE: (f64, f64, f64, f64) = (-15.0, 35.0, 45.0, 72.0);

    pub const GLOBAL: (f64, f64, f64, f64) = (-180.0, -90.0, 180.0, 90.0);
}

pub fn bbox(region: (f64, f64, f64, f64)) -> BoundingBox {
    BoundingBox::new(region.0, region.1, region.2, region.3).unwrap()
}

/// Recipe, flavour and inventory documents.
pub mod docs {
    /// Temperature shading with a legend-bearing contour step.
    pub const T2M_RECIPE: &str = r#"
description: 2m temperature
steps:
  - step: add_basemap
  - step: add_grib
    grib: t2m
  - step: add_contour
    id: isotherm
    grib: t2m
    params:
      legend: true
  - step: add_coastlines_fill
"#;

    /// Wind over surface pressure, reading two instant-keyed inputs and a
    /// static orography field.
    pub const WIND_RECIPE: &str = r#"
steps:
  - step: add_grib
    grib: orography
  - step: add_contour
    id: pressure
    grib: mslp
  - step: add_wind
    grib: wind10m
  - step: add_gridlines
"#;

    /// One plain flavour, one tiled flavour restricted to temperature maps.
    pub const FLAVOURS: &str = r#"
- name: web
  steps:
    add_gridlines:
      skip: true
- name: tiles
  recipes_filter: ["t2m*"]
  tile:
    zoom_min: 5
    zoom_max: 6
    lat_min: 36.0
    lat_max: 47.5
    lon_min: 6.0
    lon_max: 19.0
    group_width: 4
    group_height: 4
"#;
}

/// Build an inventory document for the 00Z run.
///
/// `keyed` lists inputs with the steps they have files for; `statics` lists
/// inputs with a single file valid for any instant.
pub fn inventory_yaml(keyed: &[(&str, &[u32])], statics: &[&str]) -> String {
    let mut out = String::new();
    for (input, steps) in keyed {
        for step in *steps {
            out.push_str(&format!(
                "- input: {input}\n  path: data/{input}+{step:03}.grib\n  reftime: \"{}\"\n  step: {step}h\n",
                reftime::RUN_00Z_STR
            ));
        }
    }
    for input in statics {
        out.push_str(&format!("- input: {input}\n  path: static/{input}.grib\n"));
    }
    if out.is_empty() {
        out.push_str("[]\n");
    }
    out
}
