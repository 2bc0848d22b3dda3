//! Render orders.
//!
//! An order is one unit of rendering work for a (recipe, flavour, instant):
//! a whole map image, one group of tiles at one zoom level, or a legend.

use std::sync::Arc;

use tracing::debug;

use forecast_common::{tile_range, BoundingBox, Instant, TileCoord};

use crate::error::Result;
use crate::flavour::Flavour;
use crate::job::{JobKind, JobStep, RenderJob, TileOutput};
use crate::matcher::{MatchedInstants, ResolvedInputs};
use crate::recipe::{Recipe, RecipeStep};
use crate::tessellate::{tessellate_range, TileGroup};

#[derive(Debug, Clone, PartialEq)]
pub enum OrderKind {
    /// One image for the whole map
    Map,
    /// One batched render of a tile group
    Tile { zoom: u32, group: TileGroup },
    /// Legend for a contour step
    Legend { step_id: String },
}

/// A planned rendering of a recipe with a flavour at one instant.
#[derive(Debug, Clone)]
pub struct Order {
    pub recipe: Arc<Recipe>,
    pub flavour: Arc<Flavour>,
    pub instant: Instant,
    pub inputs: ResolvedInputs,
    pub kind: OrderKind,
}

impl Order {
    fn product(&self) -> String {
        format!("{}_{}", self.recipe.name, self.flavour.name)
    }

    /// Directory holding this order's output, relative to the output root.
    pub fn relpath(&self) -> String {
        let reftime = self.instant.reftime_str();
        match self.kind {
            OrderKind::Tile { .. } => format!(
                "{}/{}{}",
                reftime,
                self.product(),
                self.instant.step.file_suffix()
            ),
            OrderKind::Map | OrderKind::Legend { .. } => format!("{}/{}", reftime, self.product()),
        }
    }

    /// Output path without extension. Unique within a plan.
    pub fn identity(&self) -> String {
        match &self.kind {
            OrderKind::Map => format!(
                "{}/{}{}",
                self.relpath(),
                self.recipe.name,
                self.instant.step.file_suffix()
            ),
            OrderKind::Tile { zoom, group } => format!(
                "{}/{}/group_{}_{}_{}x{}",
                self.relpath(),
                zoom,
                group.x,
                group.y,
                group.width,
                group.height
            ),
            OrderKind::Legend { .. } => format!("{}/legend", self.relpath()),
        }
    }

    /// Image produced by the renderer for this order.
    ///
    /// For tile orders this is the batched image, later cut into the paths
    /// given by [`Order::tile_output_path`].
    pub fn output_path(&self) -> String {
        format!("{}.png", self.identity())
    }

    /// Tiles rendered by this order. Empty unless it is a tile order.
    pub fn tiles(&self) -> Vec<TileCoord> {
        match &self.kind {
            OrderKind::Tile { zoom, group } => group.tiles(*zoom).collect(),
            _ => Vec::new(),
        }
    }

    /// Final path of one tile of this order, or `None` if the order does
    /// not render that tile.
    pub fn tile_output_path(&self, tile: &TileCoord) -> Option<String> {
        match &self.kind {
            OrderKind::Tile { zoom, group } if tile.z == *zoom && group.contains(tile.x, tile.y) => {
                Some(format!("{}/{}.png", self.relpath(), tile.path()))
            }
            _ => None,
        }
    }

    /// Geographic extent of the rendered image.
    pub fn bounds(&self) -> Option<BoundingBox> {
        match &self.kind {
            OrderKind::Tile { zoom, group } => Some(group.bounds(*zoom)),
            _ => None,
        }
    }

    /// Recipe steps drawn by this order, flavour-skipped steps removed.
    pub fn steps(&self) -> Vec<&RecipeStep> {
        match &self.kind {
            OrderKind::Legend { step_id } => self.recipe.step(step_id).into_iter().collect(),
            _ => self
                .recipe
                .steps
                .iter()
                .filter(|s| !self.flavour.is_skipped(&s.id))
                .collect(),
        }
    }

    /// Flatten into a self-contained job.
    pub fn render_job(&self) -> RenderJob {
        let (kind, zoom) = match &self.kind {
            OrderKind::Map => (JobKind::Map, None),
            OrderKind::Tile { zoom, .. } => (JobKind::Tile, Some(*zoom)),
            OrderKind::Legend { .. } => (JobKind::Legend, None),
        };

        let tiles = self
            .tiles()
            .into_iter()
            .filter_map(|t| {
                self.tile_output_path(&t).map(|path| TileOutput {
                    z: t.z,
                    x: t.x,
                    y: t.y,
                    path,
                })
            })
            .collect();

        let steps = self
            .steps()
            .into_iter()
            .map(|s| JobStep {
                id: s.id.clone(),
                step: s.name(),
                input: s.input().map(str::to_string),
                params: self.flavour.effective_params(s),
            })
            .collect();

        RenderJob {
            id: self.identity(),
            kind,
            recipe: self.recipe.name.clone(),
            flavour: self.flavour.name.clone(),
            reftime: self.instant.reftime,
            step: self.instant.step,
            output: self.output_path(),
            zoom,
            bounds: self.bounds(),
            tiles,
            steps,
            inputs: self
                .inputs
                .iter()
                .map(|(name, file)| (name.clone(), file.path.clone()))
                .collect(),
        }
    }
}

/// Build the orders for one (recipe, flavour) pair.
///
/// Plain flavours get one map order per matched instant. Tiled flavours get
/// one order per tile group, for every instant and zoom level, plus a legend
/// order for the first instant when a contour step asks for one.
pub fn build_orders(
    recipe: &Arc<Recipe>,
    flavour: &Arc<Flavour>,
    matched: &MatchedInstants,
) -> Result<Vec<Order>> {
    let order = |instant: &Instant, inputs: &ResolvedInputs, kind: OrderKind| Order {
        recipe: Arc::clone(recipe),
        flavour: Arc::clone(flavour),
        instant: *instant,
        inputs: inputs.clone(),
        kind,
    };

    let Some(tile) = &flavour.tile else {
        return Ok(matched
            .iter()
            .map(|(instant, inputs)| order(instant, inputs, OrderKind::Map))
            .collect());
    };

    // The tile block depends only on zoom, so tessellate once per level
    let mut levels = Vec::new();
    for zoom in tile.zooms() {
        let range = tile_range(&tile.bbox, zoom)?;
        let groups = tessellate_range(&range, tile.group_width, tile.group_height)?;
        debug!(
            recipe = %recipe.name,
            flavour = %flavour.name,
            zoom,
            tiles = range.len(),
            groups = groups.len(),
            "Tessellated tile block"
        );
        levels.push((zoom, groups));
    }

    let mut orders = Vec::new();
    for (instant, inputs) in matched {
        for (zoom, groups) in &levels {
            orders.extend(groups.iter().map(|group| {
                order(
                    instant,
                    inputs,
                    OrderKind::Tile {
                        zoom: *zoom,
                        group: *group,
                    },
                )
            }));
        }
    }

    let legend_step = recipe.steps.iter().find(|s| flavour.wants_legend(s));
    if let (Some(step), Some((instant, inputs))) = (legend_step, matched.iter().next()) {
        orders.push(order(
            instant,
            inputs,
            OrderKind::Legend {
                step_id: step.id.clone(),
            },
        ));
    }

    Ok(orders)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flavour::{FlavourStep, RawTileSpec, TileSpec};
    use crate::inputs::InputFile;
    use chrono::{TimeZone, Utc};

    fn recipe() -> Arc<Recipe> {
        Arc::new(
            Recipe::from_yaml_str(
                "t2m",
                "steps:\n  - step: add_grib\n    grib: t2m\n  - step: add_contour\n    id: isotherm\n    grib: t2m\n    params:\n      legend: true\n",
            )
            .unwrap(),
        )
    }

    fn matched(steps: &[u32]) -> MatchedInstants {
        let reftime = Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap();
        steps
            .iter()
            .map(|&step| {
                let instant = Instant::new(reftime, step);
                let file = InputFile {
                    input: "t2m".into(),
                    path: format!("t2m{}.grib", instant.step.file_suffix()).into(),
                    instant: Some(instant),
                };
                (instant, ResolvedInputs::from([("t2m".to_string(), file)]))
            })
            .collect()
    }

    fn tile_flavour(name: &str, lon: (f64, f64), lat: (f64, f64)) -> Flavour {
        let mut flavour = Flavour::new(name);
        flavour.tile = Some(
            TileSpec::from_raw(
                name,
                RawTileSpec {
                    zoom_min: Some(5),
                    zoom_max: Some(5),
                    lat_min: Some(lat.0),
                    lat_max: Some(lat.1),
                    lon_min: Some(lon.0),
                    lon_max: Some(lon.1),
                    ..Default::default()
                },
            )
            .unwrap(),
        );
        flavour
    }

    fn tiled(name: &str) -> Arc<Flavour> {
        Arc::new(tile_flavour(name, (6.0, 19.0), (36.0, 47.5)))
    }

    fn legends(orders: &[Order]) -> usize {
        orders
            .iter()
            .filter(|o| matches!(o.kind, OrderKind::Legend { .. }))
            .count()
    }

    #[test]
    fn test_map_orders() {
        let flavour = Arc::new(Flavour::new("web"));
        let orders = build_orders(&recipe(), &flavour, &matched(&[0, 12])).unwrap();
        assert_eq!(orders.len(), 2);
        assert_eq!(
            orders[1].output_path(),
            "2024-01-15T00:00:00/t2m_web/t2m+012.png"
        );
        assert!(orders[1].tiles().is_empty());
        // Plain flavours never get a legend
        assert!(orders.iter().all(|o| o.kind == OrderKind::Map));
    }

    #[test]
    fn test_tile_orders_with_legend() {
        let orders = build_orders(&recipe(), &tiled("tiles"), &matched(&[0, 6])).unwrap();

        // Italy at zoom 5 is a 2x2 block: one group per instant, plus a legend
        assert_eq!(orders.len(), 3);
        assert_eq!(
            orders[0].kind,
            OrderKind::Tile {
                zoom: 5,
                group: TileGroup::new(16, 11, 2, 2)
            }
        );
        assert_eq!(orders[0].tiles().len(), 4);
        assert_eq!(
            orders[0].tile_output_path(&TileCoord::new(5, 17, 12)).unwrap(),
            "2024-01-15T00:00:00/t2m_tiles+000/5/17/12.png"
        );
        assert!(orders[0].tile_output_path(&TileCoord::new(5, 18, 12)).is_none());

        let legend = &orders[2];
        assert_eq!(legend.kind, OrderKind::Legend { step_id: "isotherm".into() });
        assert_eq!(legend.instant.step, 0);
        assert_eq!(legend.output_path(), "2024-01-15T00:00:00/t2m_tiles/legend.png");
        assert_eq!(legend.steps().len(), 1);
    }

    #[test]
    fn test_no_legend_without_contour_request() {
        let plain = Arc::new(
            Recipe::from_yaml_str(
                "t2m",
                "steps:\n  - step: add_grib\n    grib: t2m\n  - step: add_contour\n    id: isotherm\n    grib: t2m\n    params:\n      legend: false\n",
            )
            .unwrap(),
        );
        let orders = build_orders(&plain, &tiled("tiles"), &matched(&[0, 6])).unwrap();
        assert_eq!(orders.len(), 2);
        assert_eq!(legends(&orders), 0);

        let no_contour = Arc::new(
            Recipe::from_yaml_str("t2m", "steps:\n  - step: add_grib\n    grib: t2m\n").unwrap(),
        );
        let orders = build_orders(&no_contour, &tiled("tiles"), &matched(&[0, 6])).unwrap();
        assert_eq!(orders.len(), 2);
        assert_eq!(legends(&orders), 0);
    }

    #[test]
    fn test_no_legend_when_contour_skipped() {
        let mut flavour = tile_flavour("tiles", (6.0, 19.0), (36.0, 47.5));
        flavour.steps.insert(
            "isotherm".into(),
            FlavourStep {
                skip: true,
                ..Default::default()
            },
        );
        let orders = build_orders(&recipe(), &Arc::new(flavour), &matched(&[0, 6])).unwrap();

        assert_eq!(orders.len(), 2);
        assert_eq!(legends(&orders), 0);
        assert!(orders.iter().all(|o| o.steps().len() == 1));
    }

    #[test]
    fn test_point_tile_spec_on_tile_edge() {
        // Zero-size box on the corner of four zoom-5 tiles still renders one
        let flavour = Arc::new(tile_flavour("point", (0.0, 0.0), (0.0, 0.0)));
        let orders = build_orders(&recipe(), &flavour, &matched(&[0])).unwrap();

        assert_eq!(orders.len(), 2);
        assert_eq!(
            orders[0].kind,
            OrderKind::Tile {
                zoom: 5,
                group: TileGroup::new(16, 16, 1, 1)
            }
        );
        assert_eq!(legends(&orders), 1);
    }

    #[test]
    fn test_no_instants_no_orders() {
        let orders = build_orders(&recipe(), &tiled("tiles"), &MatchedInstants::new()).unwrap();
        assert!(orders.is_empty());
    }

    #[test]
    fn test_render_job() {
        let orders = build_orders(&recipe(), &tiled("tiles"), &matched(&[12])).unwrap();
        let job = orders[0].render_job();
        assert_eq!(job.kind, JobKind::Tile);
        assert_eq!(job.zoom, Some(5));
        assert_eq!(job.id, "2024-01-15T00:00:00/t2m_tiles+012/5/group_16_11_2x2");
        assert_eq!(job.tiles.len(), 4);
        assert_eq!(job.steps.len(), 2);
        assert_eq!(job.inputs["t2m"], std::path::PathBuf::from("t2m+012.grib"));
        assert!(job.bounds.is_some());
    }
}
