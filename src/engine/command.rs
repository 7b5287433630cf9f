//! Orders handed to the engine for individual units

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::core::types::UnitId;

/// A single order for one unit
///
/// `enqueue` chains the order after the unit's current queue instead of
/// replacing it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    Move { pos: Vec3, enqueue: bool },
    Attack { target: UnitId, enqueue: bool },
    Build { pos: Vec3, unit_type: String },
    Guard { target: UnitId, enqueue: bool },
    Stop,
    Repair { target: UnitId, enqueue: bool },
    Reclaim { target: UnitId, enqueue: bool },
    /// Toggle the engine's wait state
    Wait,
    /// Switch on/off abilities (cloak, activation)
    Abilities { on: bool },
}

impl Command {
    pub fn move_to(pos: Vec3) -> Self {
        Self::Move { pos, enqueue: false }
    }

    pub fn attack(target: UnitId) -> Self {
        Self::Attack { target, enqueue: false }
    }

    pub fn guard(target: UnitId) -> Self {
        Self::Guard { target, enqueue: false }
    }

    /// Unit targeted by this order, if any
    pub fn target_unit(&self) -> Option<UnitId> {
        match self {
            Self::Attack { target, .. }
            | Self::Guard { target, .. }
            | Self::Repair { target, .. }
            | Self::Reclaim { target, .. } => Some(*target),
            _ => None,
        }
    }
}
