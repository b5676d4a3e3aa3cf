//! Serialisable point-in-time views of the territory

use serde::Serialize;
use serde_json::{json, Value};

use crate::core::types::{ActorId, Faction, RegionId, Sequence};
use crate::simulation::{EnergyLedger, SimulationState};
use crate::territory::TerritoryStore;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionView {
    pub id: RegionId,
    pub name: String,
    pub faction: Faction,
    pub color: String,
    pub health: u32,
    pub max_health: u32,
    pub height: f64,
    pub captured: bool,
    pub tile_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TileView {
    /// `"q:r"`
    pub id: String,
    pub region: RegionId,
    pub height: f64,
    /// Closed `[lon, lat]` ring
    pub ring: Vec<[f64; 2]>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActorView {
    pub id: ActorId,
    pub faction: Faction,
    pub energy: u32,
    pub cap: u32,
}

/// Consistent copy of regions, tiles and actors at one sequence number
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TerritorySnapshot {
    /// Last event sequence included in this snapshot
    pub sequence: Sequence,
    pub regions: Vec<RegionView>,
    pub tiles: Vec<TileView>,
    pub actors: Vec<ActorView>,
}

impl TerritorySnapshot {
    pub fn capture(state: &SimulationState) -> Self {
        Self::build(&state.store, &state.energy, state.last_sequence())
    }

    /// Snapshot of a bare store, with no actors
    pub fn from_store(store: &TerritoryStore) -> Self {
        Self::build(store, &EnergyLedger::new(), 0)
    }

    fn build(store: &TerritoryStore, energy: &EnergyLedger, sequence: Sequence) -> Self {
        let max_extrusion = store.tessellator().max_extrusion_m();
        let regions = store
            .regions()
            .iter()
            .map(|r| RegionView {
                id: r.id.clone(),
                name: r.name.clone(),
                faction: r.faction.clone(),
                color: r.color.clone(),
                health: r.health(),
                max_health: r.max_health(),
                height: r.height(max_extrusion),
                captured: r.is_captured(),
                tile_count: store.tiles_for(&r.id).map(|t| t.len()).unwrap_or(0),
            })
            .collect();

        let tiles = store
            .tiles()
            .map(|t| TileView {
                id: t.id.to_string(),
                region: t.region.clone(),
                height: t.height,
                ring: t.ring(),
            })
            .collect();

        let actors = energy
            .actors()
            .map(|(id, a)| ActorView {
                id: id.clone(),
                faction: a.faction.clone(),
                energy: a.pool.current(),
                cap: a.pool.cap(),
            })
            .collect();

        Self {
            sequence,
            regions,
            tiles,
            actors,
        }
    }

    pub fn region(&self, id: &RegionId) -> Option<&RegionView> {
        self.regions.iter().find(|r| &r.id == id)
    }

    /// Tiles as a GeoJSON FeatureCollection for the map layer
    pub fn to_feature_collection(&self) -> Value {
        let features: Vec<Value> = self
            .tiles
            .iter()
            .map(|tile| {
                let owner = self.region(&tile.region);
                json!({
                    "type": "Feature",
                    "id": tile.id,
                    "geometry": {
                        "type": "Polygon",
                        "coordinates": [tile.ring],
                    },
                    "properties": {
                        "regionId": tile.region,
                        "color": owner.map(|r| r.color.as_str()).unwrap_or_default(),
                        "height": tile.height,
                        "health": owner.map(|r| r.health).unwrap_or_default(),
                    },
                })
            })
            .collect();

        json!({
            "type": "FeatureCollection",
            "features": features,
        })
    }
}
