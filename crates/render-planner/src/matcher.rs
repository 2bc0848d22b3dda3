//! Availability matching.
//!
//! Finds the instants for which every input a (recipe, flavour) pair needs
//! has data. Instant-keyed inputs are intersected; inputs valid for any
//! instant never constrain the result and are attached to every survivor.

use std::collections::{BTreeMap, HashMap};

use tracing::{debug, info};

use forecast_common::Instant;

use crate::flavour::Flavour;
use crate::inputs::{AvailabilitySource, InputFile};
use crate::recipe::Recipe;

/// Input name to the file used for one instant.
pub type ResolvedInputs = BTreeMap<String, InputFile>;

/// Every instant with complete data, in instant order.
pub type MatchedInstants = BTreeMap<Instant, ResolvedInputs>;

/// Names of the inputs `recipe` reads under `flavour`, in first-use order.
///
/// Steps the flavour skips contribute nothing.
pub fn list_required_inputs(recipe: &Recipe, flavour: &Flavour) -> Vec<String> {
    let mut inputs: Vec<String> = Vec::new();
    for step in &recipe.steps {
        if flavour.is_skipped(&step.id) {
            continue;
        }
        if let Some(input) = step.input() {
            if !inputs.iter().any(|i| i == input) {
                inputs.push(input.to_string());
            }
        }
    }
    inputs
}

/// Compute the instants for which all `required` inputs are available.
///
/// An input that has an any-instant file is treated as valid everywhere,
/// even when it also lists instant-specific files. A missing input, or a
/// set of instant-keyed inputs with no instant in common, yields an empty
/// result. So does a request where no input is instant-keyed, since there
/// is then no instant to render.
pub fn match_instants<S>(required: &[String], source: &S) -> MatchedInstants
where
    S: AvailabilitySource + ?Sized,
{
    let mut static_files = ResolvedInputs::new();
    let mut candidates: Option<HashMap<Instant, ResolvedInputs>> = None;

    for name in required {
        let availability = match source.availability(name) {
            Some(a) if !a.is_empty() => a,
            _ => {
                info!(input = %name, "Insufficient data: input has no files");
                return MatchedInstants::new();
            }
        };

        if let Some(file) = &availability.any_instant {
            if !availability.by_instant.is_empty() {
                debug!(
                    input = %name,
                    ignored = availability.by_instant.len(),
                    "Any-instant file overrides instant-specific files"
                );
            }
            static_files.insert(name.clone(), file.clone());
            continue;
        }

        match candidates.as_mut() {
            None => {
                let seeded = availability
                    .by_instant
                    .iter()
                    .map(|(instant, file)| {
                        let mut files = ResolvedInputs::new();
                        files.insert(name.clone(), file.clone());
                        (*instant, files)
                    })
                    .collect();
                candidates = Some(seeded);
            }
            Some(current) => {
                current.retain(|instant, files| match availability.by_instant.get(instant) {
                    Some(file) => {
                        files.insert(name.clone(), file.clone());
                        true
                    }
                    None => false,
                });
            }
        }

        if candidates.as_ref().is_some_and(HashMap::is_empty) {
            info!(input = %name, "Insufficient data: no instant common to all inputs");
            return MatchedInstants::new();
        }
    }

    let Some(candidates) = candidates else {
        debug!(inputs = required.len(), "No instant-keyed inputs; nothing to match");
        return MatchedInstants::new();
    };

    candidates
        .into_iter()
        .map(|(instant, mut files)| {
            files.extend(static_files.iter().map(|(k, v)| (k.clone(), v.clone())));
            (instant, files)
        })
        .collect()
}
