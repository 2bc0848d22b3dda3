//! Per-input data availability.
//!
//! Each named input maps instants to the file holding its data. A file with
//! no instant is valid for any instant (static fields, shapefiles, ...).

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use forecast_common::instant::parse_reftime;
use forecast_common::{Instant, ModelStep};

use crate::error::{PlanError, Result};

/// One file of one input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InputFile {
    pub input: String,
    pub path: PathBuf,
    /// `None` when the file is valid for any instant
    pub instant: Option<Instant>,
}

/// All files known for a single input.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputAvailability {
    pub any_instant: Option<InputFile>,
    pub by_instant: HashMap<Instant, InputFile>,
}

impl InputAvailability {
    pub fn is_empty(&self) -> bool {
        self.any_instant.is_none() && self.by_instant.is_empty()
    }

    /// Add a file, rejecting a second file for the same instant.
    pub fn insert(&mut self, file: InputFile) -> Result<()> {
        let slot = match file.instant {
            None => {
                if self.any_instant.is_some() {
                    return Err(PlanError::DuplicateInput {
                        input: file.input,
                        instant: "any instant".into(),
                    });
                }
                self.any_instant = Some(file);
                return Ok(());
            }
            Some(instant) => instant,
        };

        if self.by_instant.contains_key(&slot) {
            return Err(PlanError::DuplicateInput {
                input: file.input,
                instant: slot.to_string(),
            });
        }
        self.by_instant.insert(slot, file);
        Ok(())
    }
}

/// Source of availability information, one input at a time.
pub trait AvailabilitySource: Sync {
    fn availability(&self, input: &str) -> Option<&InputAvailability>;
}

impl AvailabilitySource for HashMap<String, InputAvailability> {
    fn availability(&self, input: &str) -> Option<&InputAvailability> {
        self.get(input)
    }
}

impl AvailabilitySource for BTreeMap<String, InputAvailability> {
    fn availability(&self, input: &str) -> Option<&InputAvailability> {
        self.get(input)
    }
}

/// Inventory entry as listed in the inventory document.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InventoryEntry {
    pub input: String,
    pub path: PathBuf,
    #[serde(default)]
    pub reftime: Option<String>,
    #[serde(default)]
    pub step: Option<ModelStep>,
}

impl InventoryEntry {
    fn into_file(self) -> Result<InputFile> {
        let instant = match (self.reftime, self.step) {
            (Some(reftime), Some(step)) => Some(Instant::new(parse_reftime(&reftime)?, step)),
            (None, None) => None,
            _ => {
                return Err(PlanError::InvalidConfig(format!(
                    "inventory entry for '{}' ({}) must set both reftime and step, or neither",
                    self.input,
                    self.path.display()
                )))
            }
        };
        Ok(InputFile {
            input: self.input,
            path: self.path,
            instant,
        })
    }
}

/// In-memory availability for every known input.
#[derive(Debug, Clone, Default)]
pub struct Inventory {
    inputs: HashMap<String, InputAvailability>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, file: InputFile) -> Result<()> {
        self.inputs
            .entry(file.input.clone())
            .or_default()
            .insert(file)
    }

    pub fn from_entries(entries: impl IntoIterator<Item = InventoryEntry>) -> Result<Self> {
        let mut inventory = Self::new();
        for entry in entries {
            inventory.insert(entry.into_file()?)?;
        }
        Ok(inventory)
    }

    /// Parse an inventory document. JSON documents are accepted as well.
    pub fn from_yaml_str(path: &Path, text: &str) -> Result<Self> {
        let entries: Vec<InventoryEntry> =
            serde_yaml::from_str(text).map_err(|e| PlanError::Parse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        Self::from_entries(entries)
    }

    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }
}

impl AvailabilitySource for Inventory {
    fn availability(&self, input: &str) -> Option<&InputAvailability> {
        self.inputs.get(input)
    }
}
