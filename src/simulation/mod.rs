//! Simulation state and the clock that advances it
//!
//! The clock and the action gateway both mutate [`SimulationState`] through
//! [`SharedState::mutate`]. Events are built inside the mutation and
//! published after the lock is released.

pub mod clock;
pub mod energy;
pub mod skirmish;
pub mod state;

pub use clock::{ClockHandle, SimulationClock};
pub use energy::{regen_energy, ActorEnergy, EnergyLedger, EnergyPool};
pub use skirmish::{resolve_skirmish, skirmish_tick, SkirmishOutcome};
pub use state::{SharedState, SimulationState};
