//! Tessellation integration tests
//!
//! Covers determinism, first-claim-wins overlap resolution in both orders,
//! degenerate boundaries inside a batch, and the bundled university seed.

use std::collections::BTreeSet;

use proptest::prelude::*;

use hexwar::core::config::SimulationConfig;
use hexwar::core::types::RegionId;
use hexwar::data::{BuiltinSeed, RegionSource};
use hexwar::geometry::{to_mercator, Boundary, HexCoord, Tessellator};
use hexwar::territory::{Region, TerritoryStore};

fn tessellator() -> Tessellator {
    Tessellator::from_config(&SimulationConfig::default())
}

fn circle(id: &str, lon: f64, lat: f64, radius_km: f64) -> Region {
    Region::new(id, id, Boundary::circle(lon, lat, radius_km), 1000, 1000).unwrap()
}

fn ids(region: &Region) -> BTreeSet<HexCoord> {
    tessellator().tessellate(region).iter().map(|t| t.id).collect()
}

#[test]
fn test_tessellation_is_deterministic() {
    let region = circle("ku", 100.5696, 13.8476, 1.5);
    let first = tessellator().tessellate(&region);
    let second = tessellator().tessellate(&region);
    assert_eq!(first, second);
}

#[test]
fn test_overlap_first_claim_wins_both_orders() {
    let a = circle("a", 100.500, 13.750, 0.6);
    let b = circle("b", 100.508, 13.750, 0.6);

    let contested: BTreeSet<HexCoord> = ids(&a).intersection(&ids(&b)).copied().collect();
    assert!(!contested.is_empty(), "test regions must overlap");

    let t = tessellator();
    let ab = t.tessellate_all(&[a.clone(), b.clone()]);
    let ba = t.tessellate_all(&[b, a]);

    for cell in &contested {
        assert_eq!(ab.owner_of(cell), Some(&RegionId::new("a")));
        assert_eq!(ba.owner_of(cell), Some(&RegionId::new("b")));
    }
    assert_eq!(ab.dropped.len(), contested.len());
    assert_eq!(ba.dropped.len(), contested.len());
    assert_eq!(ab.tile_count(), ba.tile_count());
}

#[test]
fn test_cell_ids_are_global() {
    let a = circle("a", 100.500, 13.750, 0.6);
    let far = circle("far", 100.900, 13.900, 0.6);

    let batch = tessellator().tessellate_all(&[a.clone(), far.clone()]);
    let in_batch: BTreeSet<HexCoord> = batch.tiles_for(&far.id).iter().copied().collect();
    assert_eq!(in_batch, ids(&far));
    assert!(ids(&a).is_disjoint(&ids(&far)));
}

#[test]
fn test_degenerate_region_does_not_abort_batch() {
    let bowtie = Region::new(
        "bowtie",
        "Bowtie",
        Boundary::from_ring(&[[100.0, 13.0], [100.01, 13.01], [100.01, 13.0], [100.0, 13.01]]),
        10,
        10,
    )
    .unwrap();
    let good = circle("good", 100.5, 13.75, 0.5);

    let batch = tessellator().tessellate_all(&[bowtie.clone(), good.clone()]);
    assert!(batch.tiles_for(&bowtie.id).is_empty());
    assert_eq!(batch.tiles_for(&good.id).len(), ids(&good).len());
}

#[test]
fn test_builtin_universities_all_get_tiles() {
    let regions = BuiltinSeed.list_regions().unwrap();
    let store = TerritoryStore::bootstrap(regions, tessellator()).unwrap();

    let mut total = 0;
    for region in store.regions() {
        let tiles = store.tiles_for(&region.id).unwrap();
        assert!(!tiles.is_empty(), "{} has no tiles", region.id);
        assert!(tiles.iter().all(|t| t.region == region.id));
        total += tiles.len();
    }
    assert_eq!(total, store.tile_count());
}

#[test]
fn test_parallel_and_sequential_batches_agree() {
    let regions: Vec<Region> = (0..10)
        .map(|i| circle(&format!("r{}", i), 100.50 + i as f64 * 0.004, 13.75, 0.5))
        .collect();

    let mut sequential_config = SimulationConfig::default();
    sequential_config.lattice.parallel_threshold = usize::MAX;
    let mut parallel_config = SimulationConfig::default();
    parallel_config.lattice.parallel_threshold = 1;

    let sequential = Tessellator::from_config(&sequential_config).tessellate_all(&regions);
    let parallel = Tessellator::from_config(&parallel_config).tessellate_all(&regions);
    assert_eq!(sequential.tiles, parallel.tiles);
    assert_eq!(sequential.claims, parallel.claims);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn test_center_cell_is_always_claimed(
        lon in 100.0f64..101.0,
        lat in 13.0f64..14.5,
        radius_km in 0.2f64..1.5,
    ) {
        let t = tessellator();
        let region = circle("p", lon, lat, radius_km);
        let tiles = t.tessellate(&region);
        let center = t.lattice().cell_at(to_mercator(region.boundary.anchor()));
        prop_assert!(tiles.iter().any(|tile| tile.id == center));
    }
}
