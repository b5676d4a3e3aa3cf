//! The region/tile store: single source of truth for territory state

use std::collections::BTreeMap;

use ahash::AHashMap;

use super::region::{HealthChange, Region};
use super::tile::{HexTile, TileId};
use crate::core::error::{Result, TerritoryError};
use crate::core::types::RegionId;
use crate::geometry::{Boundary, TessellationBatch, Tessellator};

/// All regions and the tiles they own
///
/// Regions keep their bootstrap order. Tiles are keyed by lattice
/// coordinate, so each cell has exactly one owner.
#[derive(Debug, Clone)]
pub struct TerritoryStore {
    tessellator: Tessellator,
    regions: Vec<Region>,
    index: AHashMap<RegionId, usize>,
    tiles: BTreeMap<TileId, HexTile>,
    claims: AHashMap<RegionId, Vec<TileId>>,
}

impl TerritoryStore {
    /// Empty store using the given tessellator for every region
    pub fn new(tessellator: Tessellator) -> Self {
        Self {
            tessellator,
            regions: Vec::new(),
            index: AHashMap::new(),
            tiles: BTreeMap::new(),
            claims: AHashMap::new(),
        }
    }

    /// Tessellate all regions as one batch, first claim wins
    pub fn bootstrap(regions: Vec<Region>, tessellator: Tessellator) -> Result<Self> {
        check_unique(&regions)?;
        let batch = tessellator.tessellate_all(&regions);
        Self::from_batch(regions, batch, tessellator)
    }

    /// Build a store from regions and an already merged batch
    pub fn from_batch(
        regions: Vec<Region>,
        batch: TessellationBatch,
        tessellator: Tessellator,
    ) -> Result<Self> {
        check_unique(&regions)?;
        let mut store = Self::new(tessellator);
        for (i, region) in regions.iter().enumerate() {
            store.index.insert(region.id.clone(), i);
        }
        store.regions = regions;
        store.tiles = batch.tiles;
        store.claims = batch.claims.into_iter().collect();
        for region in &store.regions {
            store.claims.entry(region.id.clone()).or_default();
        }

        tracing::info!(
            "Territory store ready: {} regions, {} tiles ({} contested cells dropped)",
            store.regions.len(),
            store.tiles.len(),
            batch.dropped.len()
        );
        Ok(store)
    }

    /// Build a store from tiles computed elsewhere
    ///
    /// Regions missing from `precomputed` are tessellated in-process. All
    /// tile sets are merged in region order, first claim wins, and heights
    /// are reset from each owner's current health.
    pub fn with_precomputed_tiles(
        regions: Vec<Region>,
        mut precomputed: AHashMap<RegionId, Vec<HexTile>>,
        tessellator: Tessellator,
    ) -> Result<Self> {
        check_unique(&regions)?;
        let max_extrusion = tessellator.max_extrusion_m();
        let claims = regions
            .iter()
            .map(|region| {
                let tiles = match precomputed.remove(&region.id) {
                    Some(mut tiles) => {
                        let height = region.height(max_extrusion);
                        for tile in &mut tiles {
                            if tile.region != region.id {
                                tracing::warn!(
                                    "Tile {} filed under {} claims region {}; reassigning",
                                    tile.id,
                                    region.id,
                                    tile.region
                                );
                                tile.region = region.id.clone();
                            }
                            tile.height = height;
                        }
                        tiles.sort_by_key(|t| t.id);
                        tiles
                    }
                    None => tessellator.tessellate(region),
                };
                (region.id.clone(), tiles)
            })
            .collect();

        if !precomputed.is_empty() {
            tracing::warn!(
                "Ignoring precomputed tiles for {} unknown regions",
                precomputed.len()
            );
        }

        let batch = tessellator.merge_claims(claims);
        Self::from_batch(regions, batch, tessellator)
    }

    pub fn tessellator(&self) -> &Tessellator {
        &self.tessellator
    }

    pub fn get_region(&self, id: &RegionId) -> Result<&Region> {
        self.index_of(id).map(|i| &self.regions[i])
    }

    /// Regions in bootstrap order
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn region_count(&self) -> usize {
        self.regions.len()
    }

    /// Every tile, ordered by lattice coordinate
    pub fn tiles(&self) -> impl Iterator<Item = &HexTile> {
        self.tiles.values()
    }

    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    pub fn tile(&self, id: &TileId) -> Result<&HexTile> {
        self.tiles
            .get(id)
            .ok_or_else(|| TerritoryError::TileNotFound(id.to_string()))
    }

    /// Tiles owned by a region, ordered by lattice coordinate
    pub fn tiles_for(&self, id: &RegionId) -> Result<Vec<&HexTile>> {
        self.index_of(id)?;
        Ok(self
            .claims
            .get(id)
            .map(|ids| ids.iter().filter_map(|t| self.tiles.get(t)).collect())
            .unwrap_or_default())
    }

    /// Apply a signed health delta, clamped, and refresh tile heights
    pub fn apply_health_delta(&mut self, id: &RegionId, delta: i64) -> Result<HealthChange> {
        let i = self.index_of(id)?;
        let change = self.regions[i].apply_delta(delta, self.tessellator.max_extrusion_m());

        if let Some(owned) = self.claims.get(id) {
            for tile_id in owned {
                if let Some(tile) = self.tiles.get_mut(tile_id) {
                    tile.height = change.height;
                }
            }
        }
        Ok(change)
    }

    /// Replace a region's tile set; returns the new tile count
    ///
    /// Cells owned by any other region stay with that region.
    pub fn retessellate(&mut self, id: &RegionId) -> Result<usize> {
        let i = self.index_of(id)?;
        let fresh = self.tessellator.tessellate(&self.regions[i]);

        if let Some(old) = self.claims.remove(id) {
            for tile_id in old {
                self.tiles.remove(&tile_id);
            }
        }

        let mut won = Vec::with_capacity(fresh.len());
        for tile in fresh {
            if self.tiles.contains_key(&tile.id) {
                continue;
            }
            won.push(tile.id);
            self.tiles.insert(tile.id, tile);
        }

        let count = won.len();
        self.claims.insert(id.clone(), won);
        tracing::debug!("Retessellated {}: {} tiles", id, count);
        Ok(count)
    }

    /// Change a region's boundary and retessellate it
    pub fn set_boundary(&mut self, id: &RegionId, boundary: Boundary) -> Result<usize> {
        let i = self.index_of(id)?;
        self.regions[i].boundary = boundary;
        self.retessellate(id)
    }

    /// Add a region after bootstrap; it only gets cells nobody owns yet
    pub fn add_region(&mut self, region: Region) -> Result<usize> {
        if self.index.contains_key(&region.id) {
            return Err(TerritoryError::DuplicateRegion(region.id));
        }
        let id = region.id.clone();
        self.index.insert(id.clone(), self.regions.len());
        self.regions.push(region);
        self.retessellate(&id)
    }

    fn index_of(&self, id: &RegionId) -> Result<usize> {
        self.index
            .get(id)
            .copied()
            .ok_or_else(|| TerritoryError::RegionNotFound(id.clone()))
    }
}

fn check_unique(regions: &[Region]) -> Result<()> {
    let mut seen = ahash::AHashSet::with_capacity(regions.len());
    for region in regions {
        if !seen.insert(&region.id) {
            return Err(TerritoryError::DuplicateRegion(region.id.clone()));
        }
    }
    Ok(())
}
