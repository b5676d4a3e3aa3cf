//! Hex tessellation of region boundaries
//!
//! Tessellation is pure: the same region and lattice always produce the same
//! tiles in the same (q, r) order. Batches resolve overlaps with
//! first-claim-wins in the caller's region order.

use std::collections::BTreeMap;

use geo::{BoundingRect, Intersects};
use rayon::prelude::*;

use super::hex::HexLattice;
use super::validation::GeometryError;
use crate::core::config::{LatticeConfig, RenderConfig, SimulationConfig};
use crate::core::types::RegionId;
use crate::territory::{HexTile, Region, TileId};

/// A cell a later region wanted but an earlier region already owned
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedClaim {
    pub tile: TileId,
    pub region: RegionId,
    pub owner: RegionId,
}

/// Merged output of tessellating several regions
#[derive(Debug, Clone, Default)]
pub struct TessellationBatch {
    /// Every surviving tile, keyed and ordered by lattice coordinate
    pub tiles: BTreeMap<TileId, HexTile>,
    /// Tiles won by each region, in the order regions were supplied
    pub claims: Vec<(RegionId, Vec<TileId>)>,
    /// Claims lost to an earlier region
    pub dropped: Vec<DroppedClaim>,
}

impl TessellationBatch {
    pub fn owner_of(&self, tile: &TileId) -> Option<&RegionId> {
        self.tiles.get(tile).map(|t| &t.region)
    }

    pub fn tiles_for(&self, region: &RegionId) -> &[TileId] {
        self.claims
            .iter()
            .find(|(id, _)| id == region)
            .map(|(_, tiles)| tiles.as_slice())
            .unwrap_or(&[])
    }

    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }
}

/// Stateless tessellation engine configured with a lattice
#[derive(Debug, Clone)]
pub struct Tessellator {
    lattice: HexLattice,
    circle_steps: usize,
    parallel_threshold: usize,
    max_extrusion_m: f64,
}

impl Tessellator {
    pub fn new(lattice: &LatticeConfig, render: &RenderConfig) -> Self {
        Self {
            lattice: HexLattice::new(lattice.cell_side_km, lattice.reference_latitude),
            circle_steps: lattice.circle_steps,
            parallel_threshold: lattice.parallel_threshold,
            max_extrusion_m: render.max_extrusion_m,
        }
    }

    pub fn from_config(config: &SimulationConfig) -> Self {
        Self::new(&config.lattice, &config.render)
    }

    pub fn lattice(&self) -> &HexLattice {
        &self.lattice
    }

    /// Extrusion height of a tile whose region is at full health
    pub fn max_extrusion_m(&self) -> f64 {
        self.max_extrusion_m
    }

    /// Tessellate one region, reporting why a boundary was unusable
    pub fn try_tessellate(&self, region: &Region) -> Result<Vec<HexTile>, GeometryError> {
        let boundary = region.boundary.to_polygon(self.circle_steps)?;
        let bounds = boundary
            .bounding_rect()
            .ok_or(GeometryError::TooFewVertices { count: 0 })?;
        let height = region.height(self.max_extrusion_m);

        let tiles = self
            .lattice
            .cells_covering(bounds)
            .into_iter()
            .filter_map(|coord| {
                let hex = self.lattice.cell_polygon(coord);
                hex.intersects(&boundary)
                    .then(|| HexTile::new(coord, region.id.clone(), hex, height))
            })
            .collect();

        Ok(tiles)
    }

    /// Tessellate one region; a degenerate boundary yields no tiles
    pub fn tessellate(&self, region: &Region) -> Vec<HexTile> {
        match self.try_tessellate(region) {
            Ok(tiles) => tiles,
            Err(err) => {
                tracing::warn!("Region {} has a degenerate boundary: {}", region.id, err);
                Vec::new()
            }
        }
    }

    /// Tessellate every region and resolve overlaps, first claim wins
    ///
    /// A cell intersecting several regions belongs to whichever comes first
    /// in `regions`. Reordering the slice reassigns contested cells.
    pub fn tessellate_all(&self, regions: &[Region]) -> TessellationBatch {
        let per_region: Vec<Vec<HexTile>> = if regions.len() >= self.parallel_threshold {
            regions.par_iter().map(|r| self.tessellate(r)).collect()
        } else {
            regions.iter().map(|r| self.tessellate(r)).collect()
        };

        let claims = regions
            .iter()
            .map(|r| r.id.clone())
            .zip(per_region)
            .collect();
        self.merge_claims(claims)
    }

    /// Merge per-region tile sets in order, first claim wins
    pub fn merge_claims(&self, claims: Vec<(RegionId, Vec<HexTile>)>) -> TessellationBatch {
        let mut batch = TessellationBatch::default();

        for (region, tiles) in claims {
            let mut won = Vec::with_capacity(tiles.len());
            for mut tile in tiles {
                if let Some(existing) = batch.tiles.get(&tile.id) {
                    batch.dropped.push(DroppedClaim {
                        tile: tile.id,
                        region: region.clone(),
                        owner: existing.region.clone(),
                    });
                    continue;
                }
                tile.region = region.clone();
                won.push(tile.id);
                batch.tiles.insert(tile.id, tile);
            }
            batch.claims.push((region, won));
        }

        if !batch.dropped.is_empty() {
            tracing::debug!(
                "Tessellation dropped {} overlapping claims ({} tiles kept)",
                batch.dropped.len(),
                batch.tiles.len()
            );
        }

        batch
    }
}
