//! Mutable simulation state and its single mutation point

use std::sync::{Arc, PoisonError, RwLock};

use super::energy::EnergyLedger;
use crate::core::types::Sequence;
use crate::events::{StateChange, UpdateEvent, UpdateKind};
use crate::territory::TerritoryStore;

/// Everything the clock and the gateway mutate
#[derive(Debug)]
pub struct SimulationState {
    pub store: TerritoryStore,
    pub energy: EnergyLedger,
    next_sequence: Sequence,
}

impl SimulationState {
    pub fn new(store: TerritoryStore, energy: EnergyLedger) -> Self {
        Self {
            store,
            energy,
            next_sequence: 1,
        }
    }

    /// Sequence of the most recent event (0 before any)
    pub fn last_sequence(&self) -> Sequence {
        self.next_sequence - 1
    }

    /// Build the event for a change that has just been applied
    ///
    /// Must be called inside the mutation that made the change, so
    /// sequence order matches mutation order. Every event built here has to
    /// be published, or the broadcaster holds later events back.
    pub(crate) fn emit(&mut self, kind: UpdateKind, change: StateChange) -> UpdateEvent {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        UpdateEvent::new(sequence, kind, change)
    }
}

/// Shared handle; every write goes through [`SharedState::mutate`]
#[derive(Debug, Clone)]
pub struct SharedState {
    inner: Arc<RwLock<SimulationState>>,
}

impl SharedState {
    pub fn new(state: SimulationState) -> Self {
        Self {
            inner: Arc::new(RwLock::new(state)),
        }
    }

    /// Run `f` under the write lock
    ///
    /// `f` is synchronous so the lock is never held across an await point.
    pub fn mutate<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut SimulationState) -> R,
    {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    /// Run `f` against a consistent view of the state
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&SimulationState) -> R,
    {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::SimulationConfig;
    use crate::core::types::ActorId;
    use crate::geometry::Tessellator;

    #[test]
    fn test_sequences_are_consecutive() {
        let config = SimulationConfig::default();
        let store = TerritoryStore::new(Tessellator::from_config(&config));
        let shared = SharedState::new(SimulationState::new(store, EnergyLedger::default()));

        let change = StateChange::Energy {
            actor: ActorId::new("p"),
            energy: 1,
        };
        let first = shared.mutate(|s| s.emit(UpdateKind::RegenTick, change.clone()));
        let second = shared.mutate(|s| s.emit(UpdateKind::RegenTick, change.clone()));
        assert_eq!(first.sequence, 1);
        assert_eq!(second.sequence, 2);
        assert_eq!(shared.read(|s| s.last_sequence()), 2);
    }
}
