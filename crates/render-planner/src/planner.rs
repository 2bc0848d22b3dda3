//! Plans every (recipe, flavour) pair against the available data.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::PathBuf;
use std::sync::Arc;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use forecast_common::ErrorKind;
use tracing::{debug, error, info};

use crate::error::{PlanError, Result};
use crate::flavour::Flavour;
use crate::inputs::AvailabilitySource;
use crate::job::RenderJob;
use crate::matcher::{list_required_inputs, match_instants};
use crate::orders::{build_orders, Order};
use crate::recipe::Recipe;

/// A (recipe, flavour) pair that could not be planned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairFailure {
    pub recipe: String,
    pub flavour: String,
    pub kind: ErrorKind,
    pub error: String,
}

/// Result of planning a whole run.
#[derive(Debug, Default)]
pub struct RenderPlan {
    pub orders: Vec<Order>,
    pub failures: Vec<PairFailure>,
}

impl RenderPlan {
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn jobs(&self) -> Vec<RenderJob> {
        self.orders.iter().map(Order::render_job).collect()
    }

    /// Every input used by the plan with the files it reads, sorted.
    pub fn inputs_summary(&self) -> BTreeMap<String, Vec<PathBuf>> {
        let mut used: BTreeMap<String, BTreeSet<PathBuf>> = BTreeMap::new();
        for order in &self.orders {
            for (name, file) in &order.inputs {
                used.entry(name.clone())
                    .or_default()
                    .insert(file.path.clone());
            }
        }
        used.into_iter()
            .map(|(name, files)| (name, files.into_iter().collect()))
            .collect()
    }
}

/// Matches recipes and flavours against an availability source.
pub struct Planner<S> {
    recipes: Vec<Arc<Recipe>>,
    flavours: Vec<Arc<Flavour>>,
    source: S,
}

impl<S: AvailabilitySource> Planner<S> {
    pub fn new(recipes: Vec<Recipe>, flavours: Vec<Flavour>, source: S) -> Result<Self> {
        let mut names = HashSet::new();
        for recipe in &recipes {
            if !names.insert(recipe.name.clone()) {
                return Err(PlanError::DuplicateRecipe(recipe.name.clone()));
            }
        }
        let mut names = HashSet::new();
        for flavour in &flavours {
            if !names.insert(flavour.name.clone()) {
                return Err(PlanError::DuplicateFlavour(flavour.name.clone()));
            }
        }

        Ok(Self {
            recipes: recipes.into_iter().map(Arc::new).collect(),
            flavours: flavours.into_iter().map(Arc::new).collect(),
            source,
        })
    }

    pub fn recipes(&self) -> &[Arc<Recipe>] {
        &self.recipes
    }

    pub fn flavours(&self) -> &[Arc<Flavour>] {
        &self.flavours
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Pairs allowed by the flavours' recipe filters, flavour by flavour.
    pub fn pairs(&self) -> Vec<(Arc<Recipe>, Arc<Flavour>)> {
        self.flavours
            .iter()
            .flat_map(|flavour| {
                self.recipes
                    .iter()
                    .filter(|recipe| flavour.allows_recipe(&recipe.name))
                    .map(|recipe| (Arc::clone(recipe), Arc::clone(flavour)))
            })
            .collect()
    }

    /// Plan a single pair.
    pub fn plan_pair(&self, recipe: &Arc<Recipe>, flavour: &Arc<Flavour>) -> Result<Vec<Order>> {
        let required = list_required_inputs(recipe, flavour);
        let matched = match_instants(&required, &self.source);
        if matched.is_empty() {
            info!(
                recipe = %recipe.name,
                flavour = %flavour.name,
                inputs = ?required,
                "Insufficient data, skipping"
            );
            return Ok(Vec::new());
        }

        let orders = build_orders(recipe, flavour, &matched)?;
        debug!(
            recipe = %recipe.name,
            flavour = %flavour.name,
            instants = matched.len(),
            orders = orders.len(),
            "Planned pair"
        );
        Ok(orders)
    }

    /// Plan every allowed pair.
    ///
    /// Pairs are planned in parallel; the result keeps pair order, so
    /// planning the same inputs twice gives the same plan. A failing pair is
    /// recorded and does not stop the others.
    pub fn plan(&self) -> RenderPlan {
        let pairs = self.pairs();
        let results: Vec<_> = pairs
            .par_iter()
            .map(|(recipe, flavour)| self.plan_pair(recipe, flavour))
            .collect();

        let mut plan = RenderPlan::default();
        for ((recipe, flavour), result) in pairs.iter().zip(results) {
            match result {
                Ok(orders) => plan.orders.extend(orders),
                Err(e) => {
                    error!(
                        recipe = %recipe.name,
                        flavour = %flavour.name,
                        error = %e,
                        "Failed to plan pair"
                    );
                    plan.failures.push(PairFailure {
                        recipe: recipe.name.clone(),
                        flavour: flavour.name.clone(),
                        kind: e.kind(),
                        error: e.to_string(),
                    });
                }
            }
        }

        info!(
            pairs = pairs.len(),
            orders = plan.orders.len(),
            failures = plan.failures.len(),
            "Planning complete"
        );
        plan
    }
}
