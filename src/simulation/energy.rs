//! Per-actor energy pools and the regen transition

use std::collections::BTreeMap;

use serde::Serialize;

use super::state::SimulationState;
use crate::core::config::SimulationConfig;
use crate::core::types::{ActorId, Faction};
use crate::events::{StateChange, UpdateEvent, UpdateKind};

/// Energy bounded to `[0, cap]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EnergyPool {
    current: u32,
    cap: u32,
}

impl EnergyPool {
    pub fn new(current: u32, cap: u32) -> Self {
        Self {
            current: current.min(cap),
            cap,
        }
    }

    pub fn current(&self) -> u32 {
        self.current
    }

    pub fn cap(&self) -> u32 {
        self.cap
    }

    pub fn is_full(&self) -> bool {
        self.current >= self.cap
    }

    /// Spend `cost`; on shortfall returns the available energy unchanged
    pub fn try_spend(&mut self, cost: u32) -> Result<u32, u32> {
        if self.current < cost {
            return Err(self.current);
        }
        self.current -= cost;
        Ok(self.current)
    }

    /// Add `amount` up to the cap; true if the pool changed
    pub fn regen(&mut self, amount: u32) -> bool {
        let next = self.current.saturating_add(amount).min(self.cap);
        let changed = next != self.current;
        self.current = next;
        changed
    }
}

/// An actor's pool and the faction it fights for
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActorEnergy {
    pub faction: Faction,
    pub pool: EnergyPool,
}

/// All registered actors, ordered by id
#[derive(Debug, Clone, Default)]
pub struct EnergyLedger {
    actors: BTreeMap<ActorId, ActorEnergy>,
}

impl EnergyLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the configured actors (or the default player)
    pub fn from_config(config: &SimulationConfig) -> Self {
        let mut ledger = Self::new();
        for actor in config.actors_or_default() {
            ledger.register(
                actor.id,
                actor.faction,
                actor.starting_energy,
                config.clock.energy_cap,
            );
        }
        ledger
    }

    pub fn register(&mut self, id: ActorId, faction: Faction, starting: u32, cap: u32) {
        self.actors.insert(
            id,
            ActorEnergy {
                faction,
                pool: EnergyPool::new(starting, cap),
            },
        );
    }

    pub fn get(&self, id: &ActorId) -> Option<&ActorEnergy> {
        self.actors.get(id)
    }

    pub fn get_mut(&mut self, id: &ActorId) -> Option<&mut ActorEnergy> {
        self.actors.get_mut(id)
    }

    pub fn energy(&self, id: &ActorId) -> Option<u32> {
        self.actors.get(id).map(|a| a.pool.current())
    }

    pub fn actors(&self) -> impl Iterator<Item = (&ActorId, &ActorEnergy)> {
        self.actors.iter()
    }

    pub fn len(&self) -> usize {
        self.actors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }

    /// Regen every pool; returns the actors whose energy changed
    fn regen_all(&mut self, amount: u32) -> Vec<(ActorId, u32)> {
        self.actors
            .iter_mut()
            .filter_map(|(id, actor)| {
                actor
                    .pool
                    .regen(amount)
                    .then(|| (id.clone(), actor.pool.current()))
            })
            .collect()
    }
}

/// One regen tick: one event per pool that grew, none for full pools
pub fn regen_energy(state: &mut SimulationState, amount: u32) -> Vec<UpdateEvent> {
    let changed = state.energy.regen_all(amount);
    changed
        .into_iter()
        .map(|(actor, energy)| state.emit(UpdateKind::RegenTick, StateChange::Energy { actor, energy }))
        .collect()
}
