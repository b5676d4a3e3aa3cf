//! Regions: named territories with health and a geographic boundary

use serde::Serialize;

use crate::core::error::{Result, TerritoryError};
use crate::core::types::{Faction, RegionId};
use crate::geometry::Boundary;

/// A contested territory
///
/// Health is private so the `0 <= health <= max_health` bound can only be
/// changed through [`Region::apply_delta`], which clamps.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub id: RegionId,
    pub name: String,
    pub boundary: Boundary,
    health: u32,
    max_health: u32,
    /// Owning faction tag, defaults to the region id
    pub faction: Faction,
    /// Display color carried through to the renderer
    pub color: String,
}

/// Outcome of a single health mutation
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HealthChange {
    pub previous: u32,
    pub new_health: u32,
    pub max_health: u32,
    /// Signed change actually applied after clamping
    pub applied: i64,
    /// True when the requested delta was cut short by a bound
    pub was_clamped: bool,
    /// Tile extrusion height for the new health
    pub height: f64,
}

impl Region {
    /// Create a region, clamping `health` into `[0, max_health]`
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        boundary: Boundary,
        health: u32,
        max_health: u32,
    ) -> Result<Self> {
        let id = RegionId::new(id);
        if max_health == 0 {
            return Err(TerritoryError::InvalidRegion {
                id,
                reason: "max_health must be positive".into(),
            });
        }
        Ok(Self {
            faction: id.as_str().to_string(),
            id,
            name: name.into(),
            boundary,
            health: health.min(max_health),
            max_health,
            color: String::from("#888888"),
        })
    }

    pub fn with_faction(mut self, faction: impl Into<Faction>) -> Self {
        self.faction = faction.into();
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    pub fn health(&self) -> u32 {
        self.health
    }

    pub fn max_health(&self) -> u32 {
        self.max_health
    }

    /// A region at zero health is captured; it stays on the map
    pub fn is_captured(&self) -> bool {
        self.health == 0
    }

    pub fn health_ratio(&self) -> f64 {
        self.health as f64 / self.max_health as f64
    }

    /// Extrusion height of this region's tiles
    pub fn height(&self, max_extrusion_m: f64) -> f64 {
        self.health_ratio() * max_extrusion_m
    }

    /// Apply a signed health delta, clamped to `[0, max_health]`
    pub(crate) fn apply_delta(&mut self, delta: i64, max_extrusion_m: f64) -> HealthChange {
        let previous = self.health;
        let requested = (previous as i64).saturating_add(delta);
        let clamped = requested.clamp(0, self.max_health as i64);
        self.health = clamped as u32;

        HealthChange {
            previous,
            new_health: self.health,
            max_health: self.max_health,
            applied: clamped - previous as i64,
            was_clamped: clamped != requested,
            height: self.height(max_extrusion_m),
        }
    }
}
