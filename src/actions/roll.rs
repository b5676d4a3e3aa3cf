//! Random amounts for fortify and attack

use rand::{Rng, RngCore};

use crate::core::config::ActionConfig;

/// Inclusive range of a rolled amount, always `min <= max`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmountRange {
    min: u32,
    max: u32,
}

impl AmountRange {
    pub fn new(a: u32, b: u32) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    pub fn heal(config: &ActionConfig) -> Self {
        Self::new(config.heal_min, config.heal_max)
    }

    pub fn damage(config: &ActionConfig) -> Self {
        Self::new(config.damage_min, config.damage_max)
    }

    pub fn min(&self) -> u32 {
        self.min
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    pub fn contains(&self, amount: u32) -> bool {
        (self.min..=self.max).contains(&amount)
    }
}

/// Source of heal and damage amounts
pub trait CombatRoller: Send {
    /// Pick an amount in `range`
    fn roll(&mut self, range: AmountRange) -> u32;
}

/// Roller backed by any `RngCore`, sampling uniformly
#[derive(Debug, Clone)]
pub struct RngRoller<R> {
    rng: R,
}

impl<R: RngCore> RngRoller<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: RngCore + Send> CombatRoller for RngRoller<R> {
    fn roll(&mut self, range: AmountRange) -> u32 {
        self.rng.gen_range(range.min..=range.max)
    }
}
