//! A running simulation: store, clock, gateway and observers
//!
//! `Session` is what a transport layer talks to. It owns the shared state
//! and hands out snapshots and observer subscriptions.

pub mod snapshot;

use ahash::AHashMap;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::actions::{ActionError, ActionGateway, ActionKind, ActionReport, RngRoller};
use crate::core::config::SimulationConfig;
use crate::core::error::Result;
use crate::core::types::{ActorId, RegionId};
use crate::data::RegionSource;
use crate::events::{Broadcaster, Observer, ObserverId, StateChange, UpdateKind};
use crate::geometry::{Boundary, Tessellator};
use crate::simulation::{ClockHandle, EnergyLedger, SharedState, SimulationClock, SimulationState};
use crate::territory::{Region, TerritoryStore};

pub use snapshot::{ActorView, RegionView, TerritorySnapshot, TileView};

pub struct Session {
    config: SimulationConfig,
    seed: u64,
    shared: SharedState,
    broadcaster: Broadcaster,
    gateway: ActionGateway,
    clock: Option<ClockHandle>,
}

impl Session {
    /// Load regions, tessellate them and register actors
    ///
    /// The clock is not running until [`Session::start`] is called.
    pub fn bootstrap(config: SimulationConfig, source: &dyn RegionSource) -> Result<Self> {
        config.validate()?;
        let tessellator = Tessellator::from_config(&config);
        let regions = source.list_regions()?;

        let mut precomputed = AHashMap::new();
        for region in &regions {
            if let Some(tiles) = source.list_tiles_by_region(&region.id)? {
                precomputed.insert(region.id.clone(), tiles);
            }
        }

        let store = if precomputed.is_empty() {
            TerritoryStore::bootstrap(regions, tessellator)?
        } else {
            TerritoryStore::with_precomputed_tiles(regions, precomputed, tessellator)?
        };
        let energy = EnergyLedger::from_config(&config);
        let state = SimulationState::new(store, energy);

        let broadcaster = Broadcaster::starting_at(state.last_sequence() + 1);
        let shared = SharedState::new(state);

        let seed = config.seed.unwrap_or_else(rand::random);
        let gateway = ActionGateway::new(
            shared.clone(),
            broadcaster.clone(),
            config.actions.clone(),
            RngRoller::new(ChaCha8Rng::seed_from_u64(seed)),
        );

        tracing::info!(
            "Session bootstrapped with seed {} ({} actors)",
            seed,
            shared.read(|s| s.energy.len())
        );

        Ok(Self {
            config,
            seed,
            shared,
            broadcaster,
            gateway,
            clock: None,
        })
    }

    /// Start the regen and skirmish timers; must run inside a tokio runtime
    pub fn start(&mut self) {
        if self.clock.is_some() {
            return;
        }
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        rng.set_stream(1);
        self.clock = Some(SimulationClock::start(
            self.shared.clone(),
            self.broadcaster.clone(),
            &self.config.clock,
            rng,
        ));
    }

    pub fn is_running(&self) -> bool {
        self.clock.is_some()
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn shared(&self) -> &SharedState {
        &self.shared
    }

    pub fn broadcaster(&self) -> &Broadcaster {
        &self.broadcaster
    }

    pub fn gateway(&self) -> &ActionGateway {
        &self.gateway
    }

    pub fn submit_action(
        &self,
        actor: &ActorId,
        kind: ActionKind,
        target: &RegionId,
    ) -> std::result::Result<ActionReport, ActionError> {
        self.gateway.submit_action(actor, kind, target)
    }

    pub fn subscribe(&self) -> Observer {
        self.broadcaster.subscribe()
    }

    pub fn unsubscribe(&self, id: ObserverId) -> bool {
        self.broadcaster.unsubscribe(id)
    }

    pub fn snapshot(&self) -> TerritorySnapshot {
        self.shared.read(TerritorySnapshot::capture)
    }

    /// Change a region's boundary and publish its new tile count
    pub fn set_boundary(&self, id: &RegionId, boundary: Boundary) -> Result<usize> {
        self.retessellate_with(id.clone(), |store| store.set_boundary(id, boundary))
    }

    /// Add a region mid-session; it only claims unowned cells
    pub fn add_region(&self, region: Region) -> Result<usize> {
        let id = region.id.clone();
        self.retessellate_with(id, |store| store.add_region(region))
    }

    fn retessellate_with<F>(&self, id: RegionId, f: F) -> Result<usize>
    where
        F: FnOnce(&mut TerritoryStore) -> Result<usize>,
    {
        let (count, event) = self.shared.mutate(|state| -> Result<_> {
            let count = f(&mut state.store)?;
            let event = state.emit(
                UpdateKind::Retessellate,
                StateChange::Tiles {
                    region: id,
                    tile_count: count,
                },
            );
            Ok((count, event))
        })?;
        self.broadcaster.publish(event);
        Ok(count)
    }

    /// Stop the timers; observers stay subscribed until dropped
    pub async fn shutdown(mut self) {
        if let Some(clock) = self.clock.take() {
            clock.shutdown().await;
        }
        tracing::info!(
            "Session shut down at sequence {}",
            self.shared.read(|s| s.last_sequence())
        );
    }
}
