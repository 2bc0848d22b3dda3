//! Planner service: loads a planning configuration, plans the run and writes
//! the resulting job list for the rendering workers.

pub mod output;

pub use output::{write_plan, PlanDocument, PlanFiles, INPUTS_FILE, PLAN_FILE};
