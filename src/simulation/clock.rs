//! Background timers driving energy regen and skirmishes

use std::time::Duration;

use rand::RngCore;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use super::energy::regen_energy;
use super::skirmish::skirmish_tick;
use super::state::SharedState;
use crate::core::config::ClockConfig;
use crate::events::Broadcaster;

/// Starts the periodic transitions
pub struct SimulationClock;

/// Owns the running timers; both stop together
#[derive(Debug)]
pub struct ClockHandle {
    stop: watch::Sender<bool>,
    tasks: Vec<JoinHandle<()>>,
}

impl SimulationClock {
    /// Spawn the regen and skirmish tasks on the current tokio runtime
    pub fn start<R>(
        shared: SharedState,
        broadcaster: Broadcaster,
        config: &ClockConfig,
        rng: R,
    ) -> ClockHandle
    where
        R: RngCore + Send + 'static,
    {
        let (stop, stop_rx) = watch::channel(false);

        let regen = tokio::spawn(run_regen(
            shared.clone(),
            broadcaster.clone(),
            config.energy_regen_interval(),
            config.energy_regen_amount,
            stop_rx.clone(),
        ));
        let skirmish = tokio::spawn(run_skirmish(
            shared,
            broadcaster,
            config.skirmish_interval(),
            config.skirmish_damage,
            rng,
            stop_rx,
        ));

        tracing::info!(
            "Simulation clock started (regen every {:?}, skirmish every {:?})",
            config.energy_regen_interval(),
            config.skirmish_interval()
        );

        ClockHandle {
            stop,
            tasks: vec![regen, skirmish],
        }
    }
}

impl ClockHandle {
    /// Cancel both timers and wait for them to finish
    pub async fn shutdown(self) {
        let _ = self.stop.send(true);
        for task in self.tasks {
            if let Err(err) = task.await {
                tracing::warn!("Clock task ended abnormally: {}", err);
            }
        }
        tracing::info!("Simulation clock stopped");
    }
}

fn ticker(period: Duration) -> time::Interval {
    let mut interval = time::interval_at(time::Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

async fn run_regen(
    shared: SharedState,
    broadcaster: Broadcaster,
    period: Duration,
    amount: u32,
    mut stop: watch::Receiver<bool>,
) {
    let mut interval = ticker(period);
    loop {
        tokio::select! {
            _ = interval.tick() => {
                let events = shared.mutate(|state| regen_energy(state, amount));
                if !events.is_empty() {
                    tracing::debug!("Regen tick: {} pools grew", events.len());
                }
                broadcaster.publish_all(events);
            }
            _ = stop.changed() => break,
        }
    }
}

async fn run_skirmish<R: RngCore>(
    shared: SharedState,
    broadcaster: Broadcaster,
    period: Duration,
    damage: u32,
    mut rng: R,
    mut stop: watch::Receiver<bool>,
) {
    let mut interval = ticker(period);
    loop {
        tokio::select! {
            _ = interval.tick() => {
                let outcome = shared.mutate(|state| skirmish_tick(state, &mut rng, damage));
                if let Some(event) = outcome.event() {
                    broadcaster.publish(event);
                }
            }
            _ = stop.changed() => break,
        }
    }
}
