//! Recipe definitions.
//!
//! A recipe is an ordered list of plotting steps. Steps that draw data name
//! the input they read; decorative steps (basemap, coastlines, ...) need none.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{PlanError, Result};

/// Free-form plotting parameters passed through to the renderer.
pub type Params = serde_json::Map<String, serde_json::Value>;

/// Step names as written in recipe documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepName {
    AddBasemap,
    AddCoastlinesBg,
    AddCoastlinesFill,
    AddBoundaries,
    AddGridlines,
    AddGrib,
    AddContour,
    AddWind,
    AddSymbols,
    AddUserBoundaries,
}

impl StepName {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepName::AddBasemap => "add_basemap",
            StepName::AddCoastlinesBg => "add_coastlines_bg",
            StepName::AddCoastlinesFill => "add_coastlines_fill",
            StepName::AddBoundaries => "add_boundaries",
            StepName::AddGridlines => "add_gridlines",
            StepName::AddGrib => "add_grib",
            StepName::AddContour => "add_contour",
            StepName::AddWind => "add_wind",
            StepName::AddSymbols => "add_symbols",
            StepName::AddUserBoundaries => "add_user_boundaries",
        }
    }
}

/// What a step does, with the input it reads where it reads one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepKind {
    Basemap,
    CoastlinesBg,
    CoastlinesFill,
    Boundaries,
    Gridlines,
    /// Shaded field from a gridded input
    Grib { input: String },
    /// Contour lines from a gridded input
    Contour { input: String },
    /// Wind arrows/flags from a vector input
    Wind { input: String },
    /// Symbols from a gridded input
    Symbols { input: String },
    /// Boundaries from a user-provided shapefile input
    UserBoundaries { input: String },
}

impl StepKind {
    pub fn name(&self) -> StepName {
        match self {
            StepKind::Basemap => StepName::AddBasemap,
            StepKind::CoastlinesBg => StepName::AddCoastlinesBg,
            StepKind::CoastlinesFill => StepName::AddCoastlinesFill,
            StepKind::Boundaries => StepName::AddBoundaries,
            StepKind::Gridlines => StepName::AddGridlines,
            StepKind::Grib { .. } => StepName::AddGrib,
            StepKind::Contour { .. } => StepName::AddContour,
            StepKind::Wind { .. } => StepName::AddWind,
            StepKind::Symbols { .. } => StepName::AddSymbols,
            StepKind::UserBoundaries { .. } => StepName::AddUserBoundaries,
        }
    }

    /// Name of the input this step reads, if any.
    pub fn input(&self) -> Option<&str> {
        match self {
            StepKind::Grib { input }
            | StepKind::Contour { input }
            | StepKind::Wind { input }
            | StepKind::Symbols { input }
            | StepKind::UserBoundaries { input } => Some(input),
            _ => None,
        }
    }
}

/// One validated recipe step.
#[derive(Debug, Clone, PartialEq)]
pub struct RecipeStep {
    /// Unique within the recipe; flavours address steps by this id
    pub id: String,
    pub kind: StepKind,
    pub params: Params,
}

impl RecipeStep {
    pub fn name(&self) -> StepName {
        self.kind.name()
    }

    pub fn input(&self) -> Option<&str> {
        self.kind.input()
    }

    pub fn is_contour(&self) -> bool {
        matches!(self.kind, StepKind::Contour { .. })
    }
}

/// A step as written in YAML, before validation.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawStep {
    step: StepName,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    grib: Option<String>,
    #[serde(default)]
    shape: Option<String>,
    #[serde(default)]
    params: Params,
}

impl RawStep {
    fn validate(self, recipe: &str) -> Result<RecipeStep> {
        let id = self.id.unwrap_or_else(|| self.step.as_str().to_string());
        let invalid = |message: String| {
            PlanError::InvalidConfig(format!("recipe '{recipe}', step '{id}': {message}"))
        };

        let kind = match self.step {
            StepName::AddGrib
            | StepName::AddContour
            | StepName::AddWind
            | StepName::AddSymbols => {
                if self.shape.is_some() {
                    return Err(invalid("'shape' is only valid for add_user_boundaries".into()));
                }
                let input = self
                    .grib
                    .ok_or_else(|| invalid("missing 'grib' input".into()))?;
                match self.step {
                    StepName::AddGrib => StepKind::Grib { input },
                    StepName::AddContour => StepKind::Contour { input },
                    StepName::AddWind => StepKind::Wind { input },
                    _ => StepKind::Symbols { input },
                }
            }
            StepName::AddUserBoundaries => {
                if self.grib.is_some() {
                    return Err(invalid("'grib' is not valid for add_user_boundaries".into()));
                }
                let input = self
                    .shape
                    .ok_or_else(|| invalid("missing 'shape' input".into()))?;
                StepKind::UserBoundaries { input }
            }
            other => {
                if self.grib.is_some() || self.shape.is_some() {
                    return Err(invalid(format!("{} takes no input", other.as_str())));
                }
                match other {
                    StepName::AddBasemap => StepKind::Basemap,
                    StepName::AddCoastlinesBg => StepKind::CoastlinesBg,
                    StepName::AddCoastlinesFill => StepKind::CoastlinesFill,
                    StepName::AddBoundaries => StepKind::Boundaries,
                    _ => StepKind::Gridlines,
                }
            }
        };

        if kind.input().is_some_and(str::is_empty) {
            return Err(invalid("input name is empty".into()));
        }

        Ok(RecipeStep {
            id,
            kind,
            params: self.params,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRecipe {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    steps: Vec<RawStep>,
}

/// A named sequence of rendering steps.
#[derive(Debug, Clone, PartialEq)]
pub struct Recipe {
    pub name: String,
    pub description: Option<String>,
    pub steps: Vec<RecipeStep>,
}

impl Recipe {
    /// Parse a recipe document.
    ///
    /// `default_name` (usually the file stem) is used when the document has
    /// no `name` field.
    pub fn from_yaml_str(default_name: &str, text: &str) -> Result<Self> {
        let raw: RawRecipe = serde_yaml::from_str(text).map_err(|e| PlanError::Parse {
            path: default_name.into(),
            message: e.to_string(),
        })?;

        let name = raw.name.unwrap_or_else(|| default_name.to_string());
        if name.is_empty() {
            return Err(PlanError::InvalidConfig("recipe name is empty".into()));
        }

        let steps = raw
            .steps
            .into_iter()
            .map(|step| step.validate(&name))
            .collect::<Result<Vec<_>>>()?;

        let mut seen = HashSet::new();
        for step in &steps {
            if !seen.insert(step.id.as_str()) {
                return Err(PlanError::DuplicateStepId {
                    recipe: name.clone(),
                    step: step.id.clone(),
                });
            }
        }

        Ok(Self {
            name,
            description: raw.description,
            steps,
        })
    }

    pub fn step(&self, id: &str) -> Option<&RecipeStep> {
        self.steps.iter().find(|s| s.id == id)
    }
}
