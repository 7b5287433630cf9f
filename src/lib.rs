//! Warband - military decision layer for an RTS skirmish AI
//!
//! Friendly units are pooled into groups, hostile firepower is tracked on a
//! per-domain threat field, and a registry decides each tick which idle
//! group attacks what.

pub mod ai;
pub mod core;
pub mod engine;
pub mod military;
pub mod sandbox;
pub mod spatial;
pub mod threat;
pub mod units;

pub use crate::ai::MilitaryAi;
pub use crate::core::{MilitaryConfig, Result, WarbandError};
