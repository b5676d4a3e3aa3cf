//! Player actions: attack and fortify
//!
//! Actions are validated and applied inside a single state mutation, then
//! published. A rejected action changes nothing and publishes nothing.

pub mod gateway;
pub mod roll;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::types::{ActorId, RegionId, Sequence};
use crate::events::UpdateKind;
use crate::territory::HealthChange;

pub use gateway::ActionGateway;
pub use roll::{AmountRange, CombatRoller, RngRoller};

/// What an actor can do to a region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Damage a region of another faction
    Attack,
    /// Heal a region of the actor's own faction
    Fortify,
}

impl ActionKind {
    pub fn update_kind(self) -> UpdateKind {
        match self {
            ActionKind::Attack => UpdateKind::Attack,
            ActionKind::Fortify => UpdateKind::Fortify,
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionKind::Attack => write!(f, "attack"),
            ActionKind::Fortify => write!(f, "fortify"),
        }
    }
}

impl FromStr for ActionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "attack" => Ok(ActionKind::Attack),
            "fortify" => Ok(ActionKind::Fortify),
            other => Err(format!("unknown action '{}'", other)),
        }
    }
}

/// Why an action was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("unknown actor {0}")]
    UnknownActor(ActorId),

    #[error("target region {0} not found")]
    TargetNotFound(RegionId),

    #[error("cannot {kind} {target}: {reason}")]
    InvalidActionForTarget {
        kind: ActionKind,
        target: RegionId,
        reason: String,
    },

    #[error("insufficient energy: need {required}, have {available}")]
    InsufficientEnergy { required: u32, available: u32 },
}

/// Outcome of an accepted action
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionReport {
    pub actor: ActorId,
    pub kind: ActionKind,
    pub target: RegionId,
    /// Rolled heal or damage before clamping
    pub amount: u32,
    pub change: HealthChange,
    pub remaining_energy: u32,
    pub sequence: Sequence,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_kind_parse() {
        assert_eq!("Attack".parse::<ActionKind>(), Ok(ActionKind::Attack));
        assert_eq!("fortify".parse::<ActionKind>(), Ok(ActionKind::Fortify));
        assert!("heal".parse::<ActionKind>().is_err());
    }

    #[test]
    fn test_error_messages() {
        let err = ActionError::InsufficientEnergy {
            required: 10,
            available: 5,
        };
        assert_eq!(err.to_string(), "insufficient energy: need 10, have 5");
    }
}
