//! Seed documents describing regions (and optionally their tiles)

use geo_types::{LineString, Polygon};
use serde::{Deserialize, Serialize};

use crate::core::error::{Result, TerritoryError};
use crate::core::types::RegionId;
use crate::geometry::{Boundary, HexCoord};
use crate::territory::{HexTile, Region};

/// Geographic center of a circular region
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CenterSeed {
    pub lat: f64,
    pub lng: f64,
}

/// One region as written in a seed file
///
/// A region is either a circle (`center` + `radius_km`) or a `polygon` ring
/// of `[lon, lat]` pairs. The polygon wins when both are given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionSeed {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub center: Option<CenterSeed>,
    #[serde(default)]
    pub radius_km: Option<f64>,
    #[serde(default)]
    pub polygon: Option<Vec<[f64; 2]>>,
    pub health: u32,
    pub max_health: u32,
    #[serde(default)]
    pub color: Option<String>,
    /// Defaults to the region id
    #[serde(default)]
    pub faction: Option<String>,
}

impl RegionSeed {
    pub fn to_region(&self) -> Result<Region> {
        let boundary = match (&self.polygon, self.center, self.radius_km) {
            (Some(ring), _, _) => Boundary::from_ring(ring),
            (None, Some(center), Some(radius_km)) => {
                Boundary::circle(center.lng, center.lat, radius_km)
            }
            _ => {
                return Err(TerritoryError::InvalidRegion {
                    id: RegionId::new(self.id.clone()),
                    reason: "needs a polygon or a center with radius_km".into(),
                })
            }
        };

        let mut region = Region::new(
            self.id.clone(),
            self.name.clone(),
            boundary,
            self.health,
            self.max_health,
        )?;
        if let Some(faction) = &self.faction {
            region = region.with_faction(faction.clone());
        }
        if let Some(color) = &self.color {
            region = region.with_color(color.clone());
        }
        Ok(region)
    }
}

/// A tile computed outside this process
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileSeed {
    /// Lattice coordinate, `"q:r"`
    pub id: String,
    pub region: String,
    pub ring: Vec<[f64; 2]>,
}

impl TileSeed {
    pub fn to_tile(&self) -> Result<HexTile> {
        let coord: HexCoord = self
            .id
            .parse()
            .map_err(|reason| TerritoryError::InvalidTile {
                id: self.id.clone(),
                reason,
            })?;
        let ring: Vec<(f64, f64)> = self.ring.iter().map(|[x, y]| (*x, *y)).collect();
        let polygon = Polygon::new(LineString::from(ring), vec![]);
        Ok(HexTile::new(coord, RegionId::new(self.region.clone()), polygon, 0.0))
    }
}

/// Top-level seed document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeedDocument {
    pub regions: Vec<RegionSeed>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tiles: Vec<TileSeed>,
}

impl SeedDocument {
    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circle_seed() {
        let seed: RegionSeed = serde_json::from_str(
            r##"{"id":"cu","name":"Chula","center":{"lat":13.7384,"lng":100.5315},
                "radius_km":1.2,"health":5000,"max_health":5000,"color":"#f55b98"}"##,
        )
        .unwrap();
        let region = seed.to_region().unwrap();
        assert_eq!(region.faction, "cu");
        assert_eq!(region.color, "#f55b98");
        assert_eq!(region.boundary, Boundary::circle(100.5315, 13.7384, 1.2));
    }

    #[test]
    fn test_polygon_seed_from_toml() {
        let doc = SeedDocument::from_toml_str(
            r#"
            [[regions]]
            id = "box"
            name = "Box"
            polygon = [[100.0, 13.0], [100.01, 13.0], [100.01, 13.01], [100.0, 13.01]]
            health = 10
            max_health = 20
            faction = "blue"
            "#,
        )
        .unwrap();
        let region = doc.regions[0].to_region().unwrap();
        assert_eq!(region.faction, "blue");
        assert!(matches!(region.boundary, Boundary::Polygon(_)));
    }

    #[test]
    fn test_zero_max_health_rejected() {
        let seed = RegionSeed {
            id: "x".into(),
            name: "X".into(),
            center: Some(CenterSeed { lat: 0.0, lng: 0.0 }),
            radius_km: Some(1.0),
            polygon: None,
            health: 0,
            max_health: 0,
            color: None,
            faction: None,
        };
        assert!(matches!(seed.to_region(), Err(TerritoryError::InvalidRegion { .. })));
    }

    #[test]
    fn test_missing_shape_rejected() {
        let seed = RegionSeed {
            id: "x".into(),
            name: "X".into(),
            center: None,
            radius_km: Some(1.0),
            polygon: None,
            health: 1,
            max_health: 1,
            color: None,
            faction: None,
        };
        assert!(seed.to_region().is_err());
    }

    #[test]
    fn test_malformed_tile_id_is_invalid_tile() {
        let seed = TileSeed {
            id: "a:b".into(),
            region: "cu".into(),
            ring: vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]],
        };
        match seed.to_tile() {
            Err(TerritoryError::InvalidTile { id, .. }) => assert_eq!(id, "a:b"),
            other => panic!("unexpected result {:?}", other),
        }
    }
}
