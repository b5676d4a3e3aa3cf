//! Immutable descriptions of state changes

use serde::{Deserialize, Serialize};

use crate::core::types::{ActorId, RegionId, Sequence};
use crate::territory::HealthChange;

/// What caused a state change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateKind {
    Attack,
    Fortify,
    RegenTick,
    Skirmish,
    Retessellate,
}

/// The part of the state that changed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StateChange {
    RegionHealth {
        region: RegionId,
        new_health: u32,
        max_health: u32,
        height: f64,
        applied: i64,
        was_clamped: bool,
    },
    Energy {
        actor: ActorId,
        energy: u32,
    },
    Tiles {
        region: RegionId,
        tile_count: usize,
    },
}

impl StateChange {
    pub fn region_health(region: RegionId, change: &HealthChange) -> Self {
        StateChange::RegionHealth {
            region,
            new_health: change.new_health,
            max_health: change.max_health,
            height: change.height,
            applied: change.applied,
            was_clamped: change.was_clamped,
        }
    }

    /// Region touched by this change, if any
    pub fn region(&self) -> Option<&RegionId> {
        match self {
            StateChange::RegionHealth { region, .. } | StateChange::Tiles { region, .. } => {
                Some(region)
            }
            StateChange::Energy { .. } => None,
        }
    }
}

/// One published state change, ordered by `sequence`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateEvent {
    pub sequence: Sequence,
    pub kind: UpdateKind,
    pub change: StateChange,
}

impl UpdateEvent {
    pub fn new(sequence: Sequence, kind: UpdateKind, change: StateChange) -> Self {
        Self {
            sequence,
            kind,
            change,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_json_shape() {
        let event = UpdateEvent::new(
            7,
            UpdateKind::Attack,
            StateChange::RegionHealth {
                region: RegionId::new("cu"),
                new_health: 4550,
                max_health: 5000,
                height: 1365.0,
                applied: -450,
                was_clamped: false,
            },
        );
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["sequence"], 7);
        assert_eq!(json["kind"], "attack");
        assert_eq!(json["change"]["type"], "region_health");
        assert_eq!(json["change"]["region"], "cu");
        assert_eq!(json["change"]["new_health"], 4550);
    }
}
