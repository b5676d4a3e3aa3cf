//! Hexwar - contested hex territory simulation
//!
//! Regions are tessellated into hex tiles on a global lattice, fought over by
//! a background clock and by player actions, and every change is fanned out
//! to subscribed observers.

pub mod actions;
pub mod core;
pub mod data;
pub mod events;
pub mod geometry;
pub mod session;
pub mod simulation;
pub mod territory;
