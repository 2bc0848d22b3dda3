//! Flattened render job handed to rendering workers.

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use forecast_common::{BoundingBox, ModelStep};

use crate::recipe::{Params, StepName};

/// What a job produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobKind {
    Map,
    Tile,
    Legend,
}

/// One plotting step with the flavour's overrides already applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobStep {
    pub id: String,
    pub step: StepName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,
    #[serde(default, skip_serializing_if = "Params::is_empty")]
    pub params: Params,
}

/// Destination of one tile cut from a batched tile render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileOutput {
    pub z: u32,
    pub x: u32,
    pub y: u32,
    pub path: String,
}

/// A self-contained unit of rendering work.
///
/// Carries only plain data so it can be written to disk or a queue and
/// picked up by a worker with no access to the recipe or flavour files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderJob {
    /// Stable identifier, identical across planning runs
    pub id: String,
    pub kind: JobKind,
    pub recipe: String,
    pub flavour: String,
    pub reftime: DateTime<Utc>,
    pub step: ModelStep,
    /// Output path relative to the output directory
    pub output: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zoom: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<BoundingBox>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tiles: Vec<TileOutput>,
    pub steps: Vec<JobStep>,
    /// Input name to data file
    pub inputs: BTreeMap<String, PathBuf>,
}
