//! Writing plan results to the output directory.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use render_planner::{PairFailure, RenderJob, RenderPlan};

/// Job list consumed by the rendering workers.
pub const PLAN_FILE: &str = "plan.json";
/// Input files used by the run, per input name.
pub const INPUTS_FILE: &str = "inputs.json";

/// Contents of `plan.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanDocument {
    pub jobs: Vec<RenderJob>,
    #[serde(default)]
    pub failures: Vec<PairFailure>,
}

/// Paths written by [`write_plan`].
#[derive(Debug, Clone)]
pub struct PlanFiles {
    pub plan: PathBuf,
    pub inputs: PathBuf,
}

/// Write `plan.json` and `inputs.json` into `output_dir`, creating it if needed.
pub fn write_plan(plan: &RenderPlan, output_dir: &Path) -> Result<PlanFiles> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output directory {:?}", output_dir))?;

    let document = PlanDocument {
        jobs: plan.jobs(),
        failures: plan.failures.clone(),
    };
    let inputs: BTreeMap<String, Vec<PathBuf>> = plan.inputs_summary();

    let files = PlanFiles {
        plan: output_dir.join(PLAN_FILE),
        inputs: output_dir.join(INPUTS_FILE),
    };
    write_json(&files.plan, &document)?;
    write_json(&files.inputs, &inputs)?;

    info!(
        plan = %files.plan.display(),
        jobs = document.jobs.len(),
        inputs = inputs.len(),
        "Wrote plan"
    );
    Ok(files)
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)
        .with_context(|| format!("Failed to serialize {:?}", path))?;
    fs::write(path, json).with_context(|| format!("Failed to write {:?}", path))
}
