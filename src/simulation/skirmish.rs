//! Random skirmishes between regions

use rand::Rng;

use super::state::SimulationState;
use crate::events::{StateChange, UpdateEvent, UpdateKind};

/// Result of one skirmish tick
#[derive(Debug, Clone, PartialEq)]
pub enum SkirmishOutcome {
    /// The defender lost health
    Hit(UpdateEvent),
    /// Attacker and defender were the same region
    SameRegion,
    /// The defender is already at zero health
    DefenderDown,
    /// There is nothing to fight over
    NoRegions,
}

impl SkirmishOutcome {
    pub fn event(self) -> Option<UpdateEvent> {
        match self {
            SkirmishOutcome::Hit(event) => Some(event),
            _ => None,
        }
    }
}

/// Resolve a skirmish between two regions picked by index
///
/// Same-region picks and zero-health defenders are no-ops. No retry.
pub fn resolve_skirmish(
    state: &mut SimulationState,
    attacker: usize,
    defender: usize,
    damage: u32,
) -> SkirmishOutcome {
    let regions = state.store.regions();
    let (Some(source), Some(target)) = (regions.get(attacker), regions.get(defender)) else {
        return SkirmishOutcome::NoRegions;
    };
    if attacker == defender {
        return SkirmishOutcome::SameRegion;
    }
    if target.is_captured() {
        return SkirmishOutcome::DefenderDown;
    }

    let source = source.id.clone();
    let target = target.id.clone();
    match state.store.apply_health_delta(&target, -(damage as i64)) {
        Ok(change) => {
            tracing::debug!(
                "Skirmish: {} -> {} ({} -> {})",
                source,
                target,
                change.previous,
                change.new_health
            );
            let event = state.emit(
                UpdateKind::Skirmish,
                StateChange::region_health(target, &change),
            );
            SkirmishOutcome::Hit(event)
        }
        Err(err) => {
            tracing::warn!("Skirmish target vanished: {}", err);
            SkirmishOutcome::NoRegions
        }
    }
}

/// Draw attacker and defender independently and resolve
pub fn skirmish_tick<R: Rng + ?Sized>(
    state: &mut SimulationState,
    rng: &mut R,
    damage: u32,
) -> SkirmishOutcome {
    let count = state.store.region_count();
    if count == 0 {
        return SkirmishOutcome::NoRegions;
    }
    let attacker = rng.gen_range(0..count);
    let defender = rng.gen_range(0..count);
    resolve_skirmish(state, attacker, defender, damage)
}
