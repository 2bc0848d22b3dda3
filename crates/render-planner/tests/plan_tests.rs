//! End-to-end planning over in-memory recipes, flavours and inventory.

use std::path::{Path, PathBuf};

use forecast_common::ErrorKind;

use render_planner::{
    build_orders, list_required_inputs, match_instants, Flavour, Inventory, JobKind, OrderKind,
    Planner, Recipe, TileSpec,
};
use test_utils::{bbox, docs, inventory_yaml, region};

fn recipes() -> Vec<Recipe> {
    vec![
        Recipe::from_yaml_str("t2m", docs::T2M_RECIPE).unwrap(),
        Recipe::from_yaml_str("wind", docs::WIND_RECIPE).unwrap(),
    ]
}

fn flavours() -> Vec<Flavour> {
    Flavour::list_from_yaml_str(Path::new("flavours.yaml"), docs::FLAVOURS).unwrap()
}

fn inventory() -> Inventory {
    let text = inventory_yaml(
        &[
            ("t2m", &[0, 6, 12]),
            ("mslp", &[0, 6]),
            ("wind10m", &[6, 12]),
        ],
        &["orography"],
    );
    Inventory::from_yaml_str(Path::new("inventory.yaml"), &text).unwrap()
}

fn planner() -> Planner<Inventory> {
    Planner::new(recipes(), flavours(), inventory()).unwrap()
}

#[test]
fn test_pairs_follow_recipe_filters() {
    let pairs: Vec<_> = planner()
        .pairs()
        .iter()
        .map(|(r, f)| (r.name.clone(), f.name.clone()))
        .collect();
    assert_eq!(
        pairs,
        vec![
            ("t2m".to_string(), "web".to_string()),
            ("wind".to_string(), "web".to_string()),
            ("t2m".to_string(), "tiles".to_string()),
        ]
    );
}

#[test]
fn test_full_plan() {
    let plan = planner().plan();
    assert!(plan.failures.is_empty());

    let jobs = plan.jobs();
    let count = |kind: JobKind| jobs.iter().filter(|j| j.kind == kind).count();
    // t2m/web: +0h, +6h, +12h; wind/web: only +6h has every input
    assert_eq!(count(JobKind::Map), 4);
    // Italy is one group at zoom 5 and one at zoom 6, for three instants
    assert_eq!(count(JobKind::Tile), 6);
    assert_eq!(count(JobKind::Legend), 1);
    assert_eq!(jobs.len(), 11);

    let wind = jobs.iter().find(|j| j.recipe == "wind").unwrap();
    assert_eq!(wind.output, "2024-01-15T00:00:00/wind_web/wind+006.png");
    assert_eq!(wind.inputs["orography"], PathBuf::from("static/orography.grib"));
    // The web flavour skips gridlines
    assert!(wind.steps.iter().all(|s| s.id != "add_gridlines"));
    assert_eq!(wind.steps.len(), 3);
}

#[test]
fn test_inputs_summary() {
    let summary = planner().plan().inputs_summary();
    assert_eq!(
        summary.keys().map(String::as_str).collect::<Vec<_>>(),
        vec!["mslp", "orography", "t2m", "wind10m"]
    );
    assert_eq!(summary["t2m"].len(), 3);
    assert_eq!(summary["mslp"], vec![PathBuf::from("data/mslp+006.grib")]);
}

#[test]
fn test_plan_is_idempotent() {
    let first = planner().plan().jobs();
    let second = planner().plan().jobs();
    assert_eq!(first, second);

    let ids: std::collections::HashSet<_> = first.iter().map(|j| j.id.as_str()).collect();
    assert_eq!(ids.len(), first.len(), "job ids must be unique");
}

#[test]
fn test_build_orders_is_idempotent() {
    let planner = planner();
    let (recipe, flavour) = planner.pairs()[2].clone();
    let required = list_required_inputs(&recipe, &flavour);
    let matched = match_instants(&required, planner.source());

    let a = build_orders(&recipe, &flavour, &matched).unwrap();
    let b = build_orders(&recipe, &flavour, &matched).unwrap();
    let paths = |orders: &[render_planner::Order]| {
        orders.iter().map(|o| o.output_path()).collect::<Vec<_>>()
    };
    assert_eq!(paths(&a), paths(&b));
    assert!(matches!(a.last().unwrap().kind, OrderKind::Legend { .. }));
}

#[test]
fn test_tile_paths_per_tile() {
    let plan = planner().plan();
    let tile_order = plan
        .orders
        .iter()
        .find(|o| matches!(o.kind, OrderKind::Tile { zoom: 6, .. }))
        .unwrap();

    let tiles = tile_order.tiles();
    assert!(!tiles.is_empty());
    for tile in &tiles {
        let path = tile_order.tile_output_path(tile).unwrap();
        assert!(path.starts_with("2024-01-15T00:00:00/t2m_tiles+000/6/"));
        assert!(path.ends_with(&format!("{}/{}.png", tile.x, tile.y)));
    }
}

#[test]
fn test_failing_pair_does_not_stop_others() {
    let mut broken = Flavour::new("broken");
    broken.tile = Some(TileSpec {
        zoom_min: 40,
        zoom_max: 40,
        bbox: bbox(region::ITALY),
        group_width: 8,
        group_height: 8,
    });
    let mut flavours = flavours();
    flavours.push(broken);

    let plan = Planner::new(recipes(), flavours, inventory()).unwrap().plan();
    assert_eq!(plan.failures.len(), 2);
    assert!(plan.failures.iter().all(|f| f.flavour == "broken"));
    assert!(plan.failures.iter().all(|f| f.kind == ErrorKind::Configuration));
    assert_eq!(plan.orders.len(), 11);
}

#[test]
fn test_insufficient_data_yields_no_orders() {
    let inventory =
        Inventory::from_yaml_str(Path::new("i.yaml"), &inventory_yaml(&[("mslp", &[0])], &[]))
            .unwrap();
    let plan = Planner::new(recipes(), flavours(), inventory).unwrap().plan();
    assert!(plan.is_empty());
    assert!(plan.failures.is_empty());
}

#[test]
fn test_duplicate_recipe_names_rejected() {
    let mut recipes = recipes();
    recipes.push(Recipe::from_yaml_str("t2m", docs::T2M_RECIPE).unwrap());
    assert!(Planner::new(recipes, flavours(), inventory()).is_err());
}
