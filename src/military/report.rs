//! Per-tick summary of military decisions

use serde::Serialize;

use crate::core::types::{GroupKey, Priority, Tick, UnitId};
use crate::engine::TaskId;
use crate::units::UnitCategory;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AssignmentKind {
    /// Scout group sent against a harassment target
    Scout,
    /// Engagement group committed to its own attack
    Attack,
    /// Engagement group sent to back up a running attack
    Assist,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assignment {
    pub group: GroupKey,
    pub kind: AssignmentKind,
    /// Attacked unit; for assists, the target of the assisted task
    pub target: Option<UnitId>,
    pub task: TaskId,
    /// Threat measured at the target when the decision was made
    pub threat: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProductionRequest {
    #[serde(with = "crate::units::category::category_bits")]
    pub categories: UnitCategory,
    pub priority: Priority,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TickReport {
    pub tick: Tick,
    pub assignments: Vec<Assignment>,
    pub production: Vec<ProductionRequest>,
}

impl TickReport {
    pub fn new(tick: Tick) -> Self {
        Self {
            tick,
            ..Default::default()
        }
    }

    pub fn count(&self, kind: AssignmentKind) -> usize {
        self.assignments.iter().filter(|a| a.kind == kind).count()
    }

    pub fn is_quiet(&self) -> bool {
        self.assignments.is_empty()
    }
}
