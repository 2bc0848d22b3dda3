//! Planner configuration loading.
//!
//! `planner.yaml` names the recipe directory, the flavour list, the input
//! inventory and the output directory. `${VAR}` and `${VAR:-default}` are
//! expanded from the environment before parsing. Relative paths are taken
//! relative to the directory holding the configuration file.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{PlanError, Result};
use crate::flavour::Flavour;
use crate::inputs::Inventory;
use crate::planner::Planner;
use crate::recipe::Recipe;

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Top-level planner configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlannerConfig {
    /// Directory with one recipe document per file
    pub recipes_dir: PathBuf,
    /// YAML list of flavours
    pub flavours: PathBuf,
    /// YAML or JSON list of input files
    pub inventory: PathBuf,
    /// Where plan.json and inputs.json are written
    pub output_dir: PathBuf,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl PlannerConfig {
    /// Load `planner.yaml` with environment expansion and path resolution.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = read_config_text(path)?;

        let mut config: PlannerConfig =
            serde_yaml::from_str(&text).map_err(|e| PlanError::Parse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        config.validate()?;

        let base = path.parent().unwrap_or_else(|| Path::new("."));
        config.recipes_dir = resolve(base, &config.recipes_dir);
        config.flavours = resolve(base, &config.flavours);
        config.inventory = resolve(base, &config.inventory);
        config.output_dir = resolve(base, &config.output_dir);

        debug!(config = ?config, "Loaded planner configuration");
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("recipes_dir", &self.recipes_dir),
            ("flavours", &self.flavours),
            ("inventory", &self.inventory),
            ("output_dir", &self.output_dir),
        ] {
            if value.as_os_str().is_empty() {
                return Err(PlanError::InvalidConfig(format!("'{field}' cannot be empty")));
            }
        }

        let level = self.logging.level.to_ascii_lowercase();
        if !["trace", "debug", "info", "warn", "error"].contains(&level.as_str()) {
            return Err(PlanError::InvalidConfig(format!(
                "unknown log level '{}'",
                self.logging.level
            )));
        }
        Ok(())
    }

    /// Load recipes, flavours and inventory and build a planner from them.
    pub fn planner(&self) -> Result<Planner<Inventory>> {
        let recipes = load_recipes(&self.recipes_dir)?;
        let flavours = load_flavours(&self.flavours)?;
        let inventory = load_inventory(&self.inventory)?;
        info!(
            recipes = recipes.len(),
            flavours = flavours.len(),
            inputs = inventory.len(),
            "Loaded planning inputs"
        );
        Planner::new(recipes, flavours, inventory)
    }
}

fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| PlanError::FileRead {
        path: path.to_path_buf(),
        source,
    })
}

/// Load every `.yaml`/`.yml` recipe in `dir`, in file name order.
pub fn load_recipes<P: AsRef<Path>>(dir: P) -> Result<Vec<Recipe>> {
    let dir = dir.as_ref();
    let read_err = |source| PlanError::FileRead {
        path: dir.to_path_buf(),
        source,
    };

    let mut paths = Vec::new();
    for entry in fs::read_dir(dir).map_err(read_err)? {
        let path = entry.map_err(read_err)?.path();
        if matches!(
            path.extension().and_then(|s| s.to_str()),
            Some("yaml") | Some("yml")
        ) {
            paths.push(path);
        }
    }
    paths.sort();

    let mut names = HashSet::new();
    let mut recipes = Vec::with_capacity(paths.len());
    for path in paths {
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();
        let recipe = Recipe::from_yaml_str(&stem, &read_file(&path)?).map_err(|e| match e {
            // Report the real file rather than the recipe name
            PlanError::Parse { message, .. } => PlanError::Parse {
                path: path.clone(),
                message,
            },
            other => other,
        })?;

        if !names.insert(recipe.name.clone()) {
            return Err(PlanError::DuplicateRecipe(recipe.name));
        }
        debug!(recipe = %recipe.name, path = %path.display(), steps = recipe.steps.len(), "Loaded recipe");
        recipes.push(recipe);
    }
    Ok(recipes)
}

pub fn load_flavours<P: AsRef<Path>>(path: P) -> Result<Vec<Flavour>> {
    let path = path.as_ref();
    Flavour::list_from_yaml_str(path, &read_config_text(path)?)
}

pub fn load_inventory<P: AsRef<Path>>(path: P) -> Result<Inventory> {
    let path = path.as_ref();
    Inventory::from_yaml_str(path, &read_config_text(path)?)
}

/// Read a configuration document with `${VAR}` and `${VAR:-default}`
/// substituted from the environment.
fn read_config_text(path: &Path) -> Result<String> {
    let text = read_file(path)?;
    substitute_env(&text)
        .map_err(|message| PlanError::InvalidConfig(format!("{}: {message}", path.display())))
}

fn substitute_env(text: &str) -> std::result::Result<String, String> {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let reference = &rest[start + 2..];
        let end = reference.find('}').ok_or_else(|| {
            let offset = text.len() - rest.len() + start;
            format!("unterminated variable reference at byte {offset}")
        })?;
        out.push_str(&lookup_env(&reference[..end])?);
        rest = &reference[end + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

/// An empty variable counts as unset when a fallback is given.
fn lookup_env(reference: &str) -> std::result::Result<String, String> {
    let (name, fallback) = match reference.split_once(":-") {
        Some((name, fallback)) => (name.trim(), Some(fallback)),
        None => (reference.trim(), None),
    };
    match std::env::var(name) {
        Ok(value) if !value.is_empty() => Ok(value),
        found => match fallback {
            Some(fallback) => Ok(fallback.to_string()),
            None => found.map_err(|_| format!("environment variable '{name}' is not set")),
        },
    }
}
