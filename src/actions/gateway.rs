//! Entry point for player actions

use std::sync::{Mutex, PoisonError};

use rand_chacha::ChaCha8Rng;

use super::roll::{AmountRange, CombatRoller, RngRoller};
use super::{ActionError, ActionKind, ActionReport};
use crate::core::config::ActionConfig;
use crate::core::types::{ActorId, RegionId};
use crate::events::{Broadcaster, StateChange, UpdateEvent};
use crate::simulation::{SharedState, SimulationState};

/// Validates, applies and publishes actions
pub struct ActionGateway<C = RngRoller<ChaCha8Rng>> {
    shared: SharedState,
    broadcaster: Broadcaster,
    config: ActionConfig,
    roller: Mutex<C>,
}

impl<C: CombatRoller> ActionGateway<C> {
    pub fn new(
        shared: SharedState,
        broadcaster: Broadcaster,
        config: ActionConfig,
        roller: C,
    ) -> Self {
        Self {
            shared,
            broadcaster,
            config,
            roller: Mutex::new(roller),
        }
    }

    /// Submit an action for `actor` against `target`
    ///
    /// Checks run in order: actor, energy, target, kind vs. faction. The
    /// first failure is returned and nothing changes; energy is only
    /// debited once every check has passed.
    pub fn submit_action(
        &self,
        actor: &ActorId,
        kind: ActionKind,
        target: &RegionId,
    ) -> Result<ActionReport, ActionError> {
        let (report, event) = self
            .shared
            .mutate(|state| self.apply(state, actor, kind, target))?;

        tracing::debug!(
            "{} {} {} for {} ({} -> {})",
            actor,
            kind,
            target,
            report.amount,
            report.change.previous,
            report.change.new_health
        );
        self.broadcaster.publish(event);
        Ok(report)
    }

    fn apply(
        &self,
        state: &mut SimulationState,
        actor: &ActorId,
        kind: ActionKind,
        target: &RegionId,
    ) -> Result<(ActionReport, UpdateEvent), ActionError> {
        let (faction, available) = state
            .energy
            .get(actor)
            .map(|a| (a.faction.clone(), a.pool.current()))
            .ok_or_else(|| ActionError::UnknownActor(actor.clone()))?;

        let required = self.config.action_cost;
        if available < required {
            return Err(ActionError::InsufficientEnergy {
                required,
                available,
            });
        }

        let region = state
            .store
            .get_region(target)
            .map_err(|_| ActionError::TargetNotFound(target.clone()))?;

        let own = region.faction == faction;
        let reason = match (kind, own) {
            (ActionKind::Fortify, false) => Some("region belongs to another faction"),
            (ActionKind::Attack, true) => Some("region belongs to your own faction"),
            _ => None,
        };
        if let Some(reason) = reason {
            return Err(ActionError::InvalidActionForTarget {
                kind,
                target: target.clone(),
                reason: reason.to_string(),
            });
        }

        let remaining_energy = state
            .energy
            .get_mut(actor)
            .ok_or_else(|| ActionError::UnknownActor(actor.clone()))?
            .pool
            .try_spend(required)
            .map_err(|available| ActionError::InsufficientEnergy {
                required,
                available,
            })?;

        let (range, sign) = match kind {
            ActionKind::Attack => (AmountRange::damage(&self.config), -1),
            ActionKind::Fortify => (AmountRange::heal(&self.config), 1),
        };
        let amount = self
            .roller
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .roll(range);

        let change = state
            .store
            .apply_health_delta(target, sign * amount as i64)
            .map_err(|_| ActionError::TargetNotFound(target.clone()))?;

        let event = state.emit(
            kind.update_kind(),
            StateChange::region_health(target.clone(), &change),
        );
        let report = ActionReport {
            actor: actor.clone(),
            kind,
            target: target.clone(),
            amount,
            change,
            remaining_energy,
            sequence: event.sequence,
        };
        Ok((report, event))
    }

    pub fn broadcaster(&self) -> &Broadcaster {
        &self.broadcaster
    }

    pub fn config(&self) -> &ActionConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::SimulationConfig;
    use crate::geometry::{Boundary, Tessellator};
    use crate::simulation::EnergyLedger;
    use crate::territory::{Region, TerritoryStore};

    /// Rolls a fixed amount, clamped into the requested range
    struct FixedRoller(u32);

    impl CombatRoller for FixedRoller {
        fn roll(&mut self, range: AmountRange) -> u32 {
            self.0.clamp(range.min(), range.max())
        }
    }

    fn gateway_with(
        energy: u32,
        broadcaster: Broadcaster,
    ) -> (ActionGateway<FixedRoller>, SharedState) {
        let config = SimulationConfig::default();
        let regions = vec![
            Region::new("cu", "Chula", Boundary::circle(100.5315, 13.7384, 1.2), 4950, 5000)
                .unwrap(),
            Region::new("tu", "Thammasat", Boundary::circle(100.4897, 13.757, 1.0), 5000, 5000)
                .unwrap(),
        ];
        let store = TerritoryStore::bootstrap(regions, Tessellator::from_config(&config)).unwrap();
        let mut ledger = EnergyLedger::new();
        ledger.register(ActorId::new("p1"), "cu".into(), energy, 100);
        let shared = SharedState::new(SimulationState::new(store, ledger));
        let gateway = ActionGateway::new(shared.clone(), broadcaster, config.actions, FixedRoller(450));
        (gateway, shared)
    }

    fn gateway(energy: u32) -> (ActionGateway<FixedRoller>, SharedState) {
        gateway_with(energy, Broadcaster::new())
    }

    #[test]
    fn test_validation_order() {
        let (gw, _) = gateway(5);
        let p1 = ActorId::new("p1");
        let low = Err(ActionError::InsufficientEnergy {
            required: 10,
            available: 5,
        });

        assert_eq!(
            gw.submit_action(&ActorId::new("ghost"), ActionKind::Attack, &RegionId::new("zz")),
            Err(ActionError::UnknownActor(ActorId::new("ghost")))
        );
        // Energy is checked before the target is resolved
        assert_eq!(gw.submit_action(&p1, ActionKind::Attack, &RegionId::new("zz")), low);
        assert_eq!(gw.submit_action(&p1, ActionKind::Attack, &RegionId::new("cu")), low);
        assert_eq!(gw.submit_action(&p1, ActionKind::Fortify, &RegionId::new("tu")), low);
        assert_eq!(gw.submit_action(&p1, ActionKind::Attack, &RegionId::new("tu")), low);

        let (gw, _) = gateway(100);
        assert_eq!(
            gw.submit_action(&p1, ActionKind::Attack, &RegionId::new("zz")),
            Err(ActionError::TargetNotFound(RegionId::new("zz")))
        );
        assert!(matches!(
            gw.submit_action(&p1, ActionKind::Attack, &RegionId::new("cu")),
            Err(ActionError::InvalidActionForTarget { .. })
        ));
    }

    #[test]
    fn test_low_energy_wrong_target_leaves_state_alone() {
        let (gw, shared) = gateway(5);
        let p1 = ActorId::new("p1");
        let _ = gw.submit_action(&p1, ActionKind::Fortify, &RegionId::new("tu"));
        let _ = gw.submit_action(&p1, ActionKind::Attack, &RegionId::new("cu"));
        shared.read(|s| {
            assert_eq!(s.energy.energy(&p1), Some(5));
            assert_eq!(s.last_sequence(), 0);
            assert_eq!(s.store.get_region(&RegionId::new("tu")).unwrap().health(), 5000);
        });
    }

    #[test]
    fn test_fortify_other_faction_rejected() {
        let (gw, shared) = gateway(100);
        let result = gw.submit_action(&ActorId::new("p1"), ActionKind::Fortify, &RegionId::new("tu"));
        assert!(matches!(result, Err(ActionError::InvalidActionForTarget { .. })));
        assert_eq!(shared.read(|s| s.energy.energy(&ActorId::new("p1"))), Some(100));
    }

    #[test]
    fn test_attack_debits_energy_and_reports() {
        let (gw, shared) = gateway(100);
        let report = gw
            .submit_action(&ActorId::new("p1"), ActionKind::Attack, &RegionId::new("tu"))
            .unwrap();
        assert_eq!(report.amount, 450);
        assert_eq!(report.change.new_health, 4550);
        assert_eq!(report.remaining_energy, 90);
        assert_eq!(report.sequence, 1);
        assert_eq!(shared.read(|s| s.last_sequence()), 1);
    }

    #[test]
    fn test_unpublished_sequence_does_not_stall_actions() {
        let broadcaster = Broadcaster::with_reorder_limit(1, 3);
        let mut observer = broadcaster.subscribe();
        let (gw, shared) = gateway_with(100, broadcaster);

        // Sequence 1 is taken but never published
        shared.mutate(|s| {
            s.emit(
                crate::events::UpdateKind::RegenTick,
                StateChange::Energy {
                    actor: ActorId::new("p1"),
                    energy: 100,
                },
            )
        });

        for _ in 0..4 {
            gw.submit_action(&ActorId::new("p1"), ActionKind::Attack, &RegionId::new("tu"))
                .unwrap();
        }
        let delivered: Vec<_> = observer.drain().iter().map(|e| e.sequence).collect();
        assert_eq!(delivered, vec![2, 3, 4, 5]);
    }
}
