//! Render planner
//!
//! Reads `planner.yaml`, matches every (recipe, flavour) pair against the
//! input inventory and writes the render jobs to `plan.json`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use planner::write_plan;
use render_planner::{LogFormat, PlannerConfig};

/// Forecast map render planner
#[derive(Parser, Debug)]
#[command(name = "planner")]
#[command(about = "Plan forecast map render jobs from recipes, flavours and available data")]
struct Args {
    /// Path to planner.yaml
    #[arg(short, long, default_value = "config/planner.yaml", env = "PLANNER_CONFIG")]
    config: PathBuf,

    /// Output directory, overriding the configured one
    #[arg(short, long, env = "PLANNER_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Log level, overriding the configured one
    #[arg(long, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Human-readable logs instead of JSON
    #[arg(long)]
    pretty: bool,
}

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let config = PlannerConfig::load(&args.config)
        .with_context(|| format!("Failed to load configuration from {:?}", args.config))?;

    init_tracing(&args, &config);
    info!(config = %args.config.display(), "Starting render planner");

    let planner = config.planner().context("Failed to load planning inputs")?;
    let plan = planner.plan();

    for failure in &plan.failures {
        warn!(
            recipe = %failure.recipe,
            flavour = %failure.flavour,
            error = %failure.error,
            "Pair not planned"
        );
    }

    let output_dir = args.output_dir.unwrap_or(config.output_dir);
    let files = write_plan(&plan, &output_dir)?;

    info!(
        orders = plan.orders.len(),
        failures = plan.failures.len(),
        plan = %files.plan.display(),
        inputs = %files.inputs.display(),
        "Planning finished"
    );
    Ok(())
}

fn init_tracing(args: &Args, config: &PlannerConfig) {
    let level = args
        .log_level
        .clone()
        .unwrap_or_else(|| config.logging.level.clone());
    let filter = EnvFilter::try_new(&level).unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = fmt().with_env_filter(filter).with_target(true);
    if args.pretty || config.logging.format == LogFormat::Pretty {
        builder.pretty().init();
    } else {
        builder.json().init();
    }
}
