//! Partition properties of tile block tessellation.

use std::collections::HashSet;

use forecast_common::tile_range;
use proptest::prelude::*;
use render_planner::{tessellate, tessellate_range, PlanError};
use test_utils::{assert_approx_eq, bbox, region};

#[test]
fn test_italy_block_at_zoom_5() {
    let range = tile_range(&bbox(region::ITALY), 5).unwrap();
    let groups = tessellate_range(&range, 8, 8).unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(
        (groups[0].x, groups[0].y, groups[0].width, groups[0].height),
        (16, 11, 2, 2)
    );

    let bounds = groups[0].bounds(5);
    assert_approx_eq!(bounds.lon_min, 0.0, 1e-9);
    assert_approx_eq!(bounds.lon_max, 22.5, 1e-9);
    assert_approx_eq!(bounds.lat_max, 48.922_499_263_758, 1e-9);
    assert_approx_eq!(bounds.lat_min, 31.952_162_238_025, 1e-9);
}

#[test]
fn test_europe_block_partitions_range() {
    let range = tile_range(&bbox(region::EUROPE), 7).unwrap();
    let groups = tessellate_range(&range, 8, 8).unwrap();

    let covered: u64 = groups.iter().map(|g| g.area()).sum();
    assert_eq!(covered, range.len());

    let from_groups: HashSet<_> = groups.iter().flat_map(|g| g.tiles(7)).collect();
    let from_range: HashSet<_> = range.tiles().collect();
    assert_eq!(from_groups, from_range);
}

#[test]
fn test_index_overflow_rejected() {
    assert!(matches!(
        tessellate(u32::MAX - 1, 4, 0, 4, 8, 8),
        Err(PlanError::InvalidConfig(_))
    ));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Groups never overlap, stay within the group size and cover the block.
    #[test]
    fn groups_partition_block(
        x0 in 0u32..1000,
        y0 in 0u32..1000,
        width in 0u32..40,
        height in 0u32..40,
        gw in 1u32..12,
        gh in 1u32..12,
    ) {
        let groups = tessellate(x0, width, y0, height, gw, gh).unwrap();

        let area: u64 = groups.iter().map(|g| g.area()).sum();
        prop_assert_eq!(area, u64::from(width) * u64::from(height));

        for (i, a) in groups.iter().enumerate() {
            prop_assert!(a.width > 0 && a.height > 0);
            prop_assert!(a.area() <= u64::from(gw) * u64::from(gh));
            prop_assert!(a.height <= gh);
            prop_assert!(a.x >= x0 && a.x + a.width <= x0 + width);
            prop_assert!(a.y >= y0 && a.y + a.height <= y0 + height);
            for b in &groups[i + 1..] {
                prop_assert!(!a.overlaps(b), "{:?} overlaps {:?}", a, b);
            }
        }
    }

    /// The same block always gives the same groups.
    #[test]
    fn tessellation_is_deterministic(
        width in 0u32..30,
        height in 0u32..30,
        gw in 1u32..10,
        gh in 1u32..10,
    ) {
        prop_assert_eq!(
            tessellate(3, width, 7, height, gw, gh).unwrap(),
            tessellate(3, width, 7, height, gw, gh).unwrap()
        );
    }
}
