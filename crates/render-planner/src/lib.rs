//! Render planning for forecast map products.
//!
//! Given recipes, flavours and the data available per input, decides which
//! instants can be rendered and produces the orders to render them, tiled
//! flavours being split into batched tile groups.

pub mod config;
pub mod error;
pub mod flavour;
pub mod inputs;
pub mod job;
pub mod matcher;
pub mod orders;
pub mod pattern;
pub mod planner;
pub mod recipe;
pub mod tessellate;

pub use config::{LogFormat, LoggingConfig, PlannerConfig};
pub use error::{PlanError, Result};
pub use forecast_common::ErrorKind;
pub use flavour::{Flavour, FlavourStep, RawTileSpec, TileSpec};
pub use inputs::{AvailabilitySource, InputAvailability, InputFile, Inventory};
pub use job::{JobKind, JobStep, RenderJob, TileOutput};
pub use matcher::{list_required_inputs, match_instants, MatchedInstants, ResolvedInputs};
pub use orders::{build_orders, Order, OrderKind};
pub use pattern::GlobPattern;
pub use planner::{PairFailure, Planner, RenderPlan};
pub use recipe::{Params, Recipe, RecipeStep, StepKind, StepName};
pub use tessellate::{tessellate, tessellate_range, TileGroup};
