//! Simulation configuration with documented constants
//!
//! All tunable numbers are collected here. Every field has a default, so a
//! TOML file only needs to name the values it overrides.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::error::{Result, TerritoryError};
use crate::core::types::{ActorId, Faction};

/// Top-level configuration for a simulation session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Seed for the session random source. `None` draws one from the OS.
    pub seed: Option<u64>,
    pub clock: ClockConfig,
    pub actions: ActionConfig,
    pub lattice: LatticeConfig,
    pub render: RenderConfig,
    /// Actors registered with an energy pool at session start
    pub actors: Vec<ActorConfig>,
}

/// Periodic transitions driven by the simulation clock
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    // === ENERGY REGEN ===
    /// Milliseconds between energy regen ticks
    ///
    /// At 2000 ms and 5 energy per tick, an empty pool refills in 40 s.
    pub energy_regen_interval_ms: u64,

    /// Energy added to every pool per regen tick
    pub energy_regen_amount: u32,

    /// Upper bound of every energy pool
    pub energy_cap: u32,

    // === SKIRMISH ===
    /// Milliseconds between random skirmish ticks
    pub skirmish_interval_ms: u64,

    /// Health removed from the defender of a skirmish
    ///
    /// At 50 every 800 ms a 5000 health region survives roughly 80
    /// skirmishes aimed at it.
    pub skirmish_damage: u32,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            energy_regen_interval_ms: 2000,
            energy_regen_amount: 5,
            energy_cap: 100,
            skirmish_interval_ms: 800,
            skirmish_damage: 50,
        }
    }
}

impl ClockConfig {
    pub fn energy_regen_interval(&self) -> Duration {
        Duration::from_millis(self.energy_regen_interval_ms)
    }

    pub fn skirmish_interval(&self) -> Duration {
        Duration::from_millis(self.skirmish_interval_ms)
    }
}

/// Costs and randomized amounts for player actions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionConfig {
    /// Energy debited by every accepted action
    pub action_cost: u32,

    /// Inclusive bounds of the fortify heal roll
    pub heal_min: u32,
    pub heal_max: u32,

    /// Inclusive bounds of the attack damage roll
    pub damage_min: u32,
    pub damage_max: u32,
}

impl Default for ActionConfig {
    fn default() -> Self {
        Self {
            action_cost: 10,
            heal_min: 200,
            heal_max: 299,
            damage_min: 300,
            damage_max: 599,
        }
    }
}

/// Hex lattice used for tessellation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LatticeConfig {
    /// Hexagon side length (center to corner) in kilometers
    pub cell_side_km: f64,

    /// Latitude at which `cell_side_km` is exact
    ///
    /// The lattice lives in Web Mercator space so cell ids are global.
    /// Ground size of a cell drifts away from this latitude.
    pub reference_latitude: f64,

    /// Number of vertices used to approximate a circular boundary
    pub circle_steps: usize,

    /// Minimum region count before tessellating a batch in parallel
    pub parallel_threshold: usize,
}

impl Default for LatticeConfig {
    fn default() -> Self {
        Self {
            cell_side_km: 0.15,
            reference_latitude: 13.75,
            circle_steps: 64,
            parallel_threshold: 8,
        }
    }
}

/// Derived visual values published alongside health
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Extrusion height in meters of a tile whose region is at full health
    pub max_extrusion_m: f64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            max_extrusion_m: 1500.0,
        }
    }
}

/// An actor registered at session start
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorConfig {
    pub id: ActorId,
    pub faction: Faction,
    #[serde(default = "default_starting_energy")]
    pub starting_energy: u32,
}

fn default_starting_energy() -> u32 {
    100
}

impl SimulationConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a TOML document and validate it
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: SimulationConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a TOML file from disk and validate it
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Actors to register, falling back to a single default player
    /// fighting for `cu` when the config names none
    pub fn actors_or_default(&self) -> Vec<ActorConfig> {
        if self.actors.is_empty() {
            vec![ActorConfig {
                id: ActorId::new("player-1"),
                faction: "cu".to_string(),
                starting_energy: self.clock.energy_cap,
            }]
        } else {
            self.actors.clone()
        }
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        let clock = &self.clock;
        if clock.energy_regen_interval_ms == 0 || clock.skirmish_interval_ms == 0 {
            return Err(TerritoryError::Config(
                "clock intervals must be greater than zero".into(),
            ));
        }
        if clock.energy_cap == 0 {
            return Err(TerritoryError::Config("energy_cap must be positive".into()));
        }

        let actions = &self.actions;
        if actions.heal_min > actions.heal_max {
            return Err(TerritoryError::Config(format!(
                "heal_min ({}) should be <= heal_max ({})",
                actions.heal_min, actions.heal_max
            )));
        }
        if actions.damage_min > actions.damage_max {
            return Err(TerritoryError::Config(format!(
                "damage_min ({}) should be <= damage_max ({})",
                actions.damage_min, actions.damage_max
            )));
        }

        let lattice = &self.lattice;
        if !(lattice.cell_side_km.is_finite() && lattice.cell_side_km > 0.0) {
            return Err(TerritoryError::Config(format!(
                "cell_side_km ({}) must be a positive number",
                lattice.cell_side_km
            )));
        }
        if !(lattice.reference_latitude.abs() < 85.0) {
            return Err(TerritoryError::Config(format!(
                "reference_latitude ({}) must be within +/-85 degrees",
                lattice.reference_latitude
            )));
        }
        if lattice.circle_steps < 6 {
            return Err(TerritoryError::Config(format!(
                "circle_steps ({}) should be at least 6",
                lattice.circle_steps
            )));
        }

        if !(self.render.max_extrusion_m.is_finite() && self.render.max_extrusion_m >= 0.0) {
            return Err(TerritoryError::Config(
                "max_extrusion_m must be a non-negative number".into(),
            ));
        }

        for actor in &self.actors {
            if actor.starting_energy > clock.energy_cap {
                return Err(TerritoryError::Config(format!(
                    "actor {} starts with {} energy, above the cap of {}",
                    actor.id, actor.starting_energy, clock.energy_cap
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = SimulationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.clock.energy_regen_amount, 5);
        assert_eq!(config.clock.skirmish_damage, 50);
        assert_eq!(config.actions.action_cost, 10);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = SimulationConfig::from_toml_str(
            r#"
            seed = 7

            [clock]
            skirmish_damage = 75

            [[actors]]
            id = "alice"
            faction = "tu"
            "#,
        )
        .unwrap();

        assert_eq!(config.seed, Some(7));
        assert_eq!(config.clock.skirmish_damage, 75);
        assert_eq!(config.clock.energy_cap, 100);
        assert_eq!(config.actors.len(), 1);
        assert_eq!(config.actors[0].starting_energy, 100);
    }

    #[test]
    fn test_inverted_range_rejected() {
        let mut config = SimulationConfig::default();
        config.actions.damage_min = 600;
        assert!(matches!(config.validate(), Err(TerritoryError::Config(_))));
    }

    #[test]
    fn test_zero_interval_rejected() {
        let result = SimulationConfig::from_toml_str("[clock]\nskirmish_interval_ms = 0\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_default_actor_fights_for_cu() {
        let actors = SimulationConfig::default().actors_or_default();
        assert_eq!(actors.len(), 1);
        assert_eq!(actors[0].faction, "cu");
        assert_eq!(actors[0].starting_energy, 100);
    }
}
