//! Hex tiles produced by tessellation

use geo_types::Polygon;

use crate::core::types::RegionId;
use crate::geometry::HexCoord;

/// Tiles are identified by their lattice coordinate
pub type TileId = HexCoord;

/// One hexagonal cell owned by exactly one region
#[derive(Debug, Clone, PartialEq)]
pub struct HexTile {
    pub id: TileId,
    pub region: RegionId,
    /// Closed lon/lat ring
    pub polygon: Polygon<f64>,
    /// Extrusion height in meters, follows the owner's health
    pub height: f64,
}

impl HexTile {
    pub fn new(id: TileId, region: RegionId, polygon: Polygon<f64>, height: f64) -> Self {
        Self {
            id,
            region,
            polygon,
            height,
        }
    }

    /// Exterior ring as `[lon, lat]` pairs
    pub fn ring(&self) -> Vec<[f64; 2]> {
        self.polygon.exterior().coords().map(|c| [c.x, c.y]).collect()
    }
}
