//! Flavour definitions.
//!
//! A flavour is a per-run set of overrides applied on top of every recipe it
//! allows. A flavour with a `tile` section produces tiled output instead of
//! single map images.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use serde::Deserialize;

use forecast_common::tile::MAX_ZOOM;
use forecast_common::BoundingBox;

use crate::error::{PlanError, Result};
use crate::pattern::GlobPattern;
use crate::recipe::{Params, RecipeStep};

/// Group size used when a tile spec does not set one.
pub const DEFAULT_GROUP_SIZE: u32 = 8;

/// Per-step flavour configuration, keyed by step id.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FlavourStep {
    /// Leave the step out entirely for this flavour
    #[serde(default)]
    pub skip: bool,
    /// Parameters overriding the recipe's own
    #[serde(default)]
    pub params: Params,
}

/// Tile section as written in YAML. Every field is optional here so that a
/// missing one can be reported by name.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawTileSpec {
    pub zoom_min: Option<u32>,
    pub zoom_max: Option<u32>,
    pub lat_min: Option<f64>,
    pub lat_max: Option<f64>,
    pub lon_min: Option<f64>,
    pub lon_max: Option<f64>,
    pub group_width: Option<u32>,
    pub group_height: Option<u32>,
}

/// Validated tiled-output settings.
#[derive(Debug, Clone, PartialEq)]
pub struct TileSpec {
    pub zoom_min: u32,
    pub zoom_max: u32,
    pub bbox: BoundingBox,
    /// Maximum tiles per rendering call, horizontally
    pub group_width: u32,
    /// Maximum tiles per rendering call, vertically
    pub group_height: u32,
}

impl TileSpec {
    pub fn from_raw(flavour: &str, raw: RawTileSpec) -> Result<Self> {
        let missing = |field: &'static str| PlanError::IncompleteTileSpec {
            flavour: flavour.to_string(),
            field,
        };
        let invalid = |message: String| PlanError::InvalidTileSpec {
            flavour: flavour.to_string(),
            message,
        };

        let zoom_min = raw.zoom_min.ok_or_else(|| missing("zoom_min"))?;
        let zoom_max = raw.zoom_max.ok_or_else(|| missing("zoom_max"))?;
        let lat_min = raw.lat_min.ok_or_else(|| missing("lat_min"))?;
        let lat_max = raw.lat_max.ok_or_else(|| missing("lat_max"))?;
        let lon_min = raw.lon_min.ok_or_else(|| missing("lon_min"))?;
        let lon_max = raw.lon_max.ok_or_else(|| missing("lon_max"))?;

        if zoom_min > zoom_max {
            return Err(invalid(format!(
                "zoom_min {zoom_min} is greater than zoom_max {zoom_max}"
            )));
        }
        if zoom_max > MAX_ZOOM {
            return Err(invalid(format!(
                "zoom_max {zoom_max} exceeds the maximum of {MAX_ZOOM}"
            )));
        }

        let bbox = BoundingBox::new(lon_min, lat_min, lon_max, lat_max)
            .map_err(|e| invalid(e.to_string()))?;

        let group_width = raw.group_width.unwrap_or(DEFAULT_GROUP_SIZE);
        let group_height = raw.group_height.unwrap_or(DEFAULT_GROUP_SIZE);
        if group_width == 0 || group_height == 0 {
            return Err(PlanError::InvalidGroupSize {
                width: group_width,
                height: group_height,
            });
        }

        Ok(Self {
            zoom_min,
            zoom_max,
            bbox,
            group_width,
            group_height,
        })
    }

    pub fn zooms(&self) -> impl Iterator<Item = u32> {
        self.zoom_min..=self.zoom_max
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawFlavour {
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    recipes_filter: Vec<GlobPattern>,
    #[serde(default)]
    steps: BTreeMap<String, FlavourStep>,
    #[serde(default)]
    tile: Option<RawTileSpec>,
}

/// A named bundle of rendering overrides, optionally producing tiles.
#[derive(Debug, Clone, PartialEq)]
pub struct Flavour {
    pub name: String,
    pub description: Option<String>,
    /// Recipe name patterns; empty means every recipe
    pub recipes_filter: Vec<GlobPattern>,
    pub steps: BTreeMap<String, FlavourStep>,
    pub tile: Option<TileSpec>,
}

impl Flavour {
    /// A plain map flavour with no overrides.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            recipes_filter: Vec::new(),
            steps: BTreeMap::new(),
            tile: None,
        }
    }

    fn validate(raw: RawFlavour) -> Result<Self> {
        if raw.name.is_empty() {
            return Err(PlanError::InvalidConfig("flavour name is empty".into()));
        }
        let tile = raw
            .tile
            .map(|t| TileSpec::from_raw(&raw.name, t))
            .transpose()?;

        Ok(Self {
            name: raw.name,
            description: raw.description,
            recipes_filter: raw.recipes_filter,
            steps: raw.steps,
            tile,
        })
    }

    /// Parse a YAML list of flavours, rejecting duplicate names.
    pub fn list_from_yaml_str(path: &Path, text: &str) -> Result<Vec<Self>> {
        let raw: Vec<RawFlavour> = serde_yaml::from_str(text).map_err(|e| PlanError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let flavours = raw
            .into_iter()
            .map(Self::validate)
            .collect::<Result<Vec<_>>>()?;

        let mut seen = HashSet::new();
        for flavour in &flavours {
            if !seen.insert(flavour.name.as_str()) {
                return Err(PlanError::DuplicateFlavour(flavour.name.clone()));
            }
        }
        Ok(flavours)
    }

    pub fn is_tiled(&self) -> bool {
        self.tile.is_some()
    }

    pub fn allows_recipe(&self, recipe: &str) -> bool {
        self.recipes_filter.is_empty() || self.recipes_filter.iter().any(|p| p.matches(recipe))
    }

    pub fn is_skipped(&self, step_id: &str) -> bool {
        self.steps.get(step_id).is_some_and(|s| s.skip)
    }

    /// Recipe parameters for `step` with this flavour's overrides applied.
    pub fn effective_params(&self, step: &RecipeStep) -> Params {
        let mut params = step.params.clone();
        if let Some(overrides) = self.steps.get(&step.id) {
            for (key, value) in &overrides.params {
                params.insert(key.clone(), value.clone());
            }
        }
        params
    }

    /// Whether `step` should get a legend image under this flavour.
    pub fn wants_legend(&self, step: &RecipeStep) -> bool {
        if !step.is_contour() || self.is_skipped(&step.id) {
            return false;
        }
        match self.effective_params(step).get("legend") {
            Some(serde_json::Value::Bool(b)) => *b,
            Some(serde_json::Value::String(s)) => s == "on",
            _ => false,
        }
    }
}
