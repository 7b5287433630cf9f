//! Interfaces to the collaborators around the military layer
//!
//! Architecture: the decision layer only reads from and writes to these
//! traits. The engine, intelligence, task bookkeeping and production queue
//! are owned elsewhere and handed in per call through `DecisionContext`.

pub mod command;

pub use command::Command;

use std::sync::Arc;

use derive_more::Display;
use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::core::types::{GroupKey, Priority, Tick, UnitId};
use crate::military::group::Group;
use crate::units::{UnitCategory, UnitType};

/// Read access to the simulation
pub trait GameView {
    /// Current simulation frame
    fn frame(&self) -> Tick;

    /// Current world position of a unit, `None` if unknown or dead
    fn position(&self, unit: UnitId) -> Option<Vec3>;

    /// Hostile units currently known (visible or remembered)
    fn enemy_units(&self) -> Vec<UnitId>;

    /// Type metadata of any known unit
    fn unit_type(&self, unit: UnitId) -> Option<Arc<UnitType>>;
}

/// Order issuing
pub trait CommandSink {
    fn give_order(&mut self, unit: UnitId, command: Command);
}

/// Full engine handle
pub trait Engine: GameView + CommandSink {}

impl<T: GameView + CommandSink + ?Sized> Engine for T {}

/// Intelligence classes of hostile units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetClass {
    EnergyMakers,
    Factories,
    Attackers,
    MobileBuilders,
    MetalMakers,
    /// Anything not matching the other classes
    Rest,
}

/// Classified knowledge about the enemy
pub trait Intel {
    /// Known hostile units of one class
    fn targets(&self, class: TargetClass) -> &[UnitId];

    /// Production preference table: (weight, category), weights summing to 1
    fn production_roulette(&self) -> &[(f32, UnitCategory)];
}

/// Identifier of a task held by the task tracker
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[display(fmt = "task#{}", _0)]
pub struct TaskId(pub u32);

/// Summary of an active attack task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttackTaskInfo {
    pub id: TaskId,
    pub target: UnitId,
    pub group: GroupKey,
}

/// Bookkeeping of attack and assist tasks
pub trait TaskTracker {
    fn active_attack_tasks(&self) -> Vec<AttackTaskInfo>;

    /// Bind `group` to a new attack on `target`, issuing its orders
    fn add_attack_task(
        &mut self,
        target: UnitId,
        group: &mut Group,
        engine: &mut dyn Engine,
    ) -> Option<TaskId>;

    /// Bind `group` to assist an existing attack task
    fn add_assist_task(&mut self, task: TaskId, group: &mut Group, engine: &mut dyn Engine) -> bool;
}

/// Production request queue
pub trait WishList {
    fn push(&mut self, categories: UnitCategory, priority: Priority);
}

/// Anything that must drop its references when a group goes away
pub trait GroupObserver {
    fn on_group_removed(&mut self, key: GroupKey);
}

/// Collaborators borrowed for one decision pass
pub struct DecisionContext<'a> {
    pub engine: &'a mut dyn Engine,
    pub intel: &'a dyn Intel,
    pub tasks: &'a mut dyn TaskTracker,
    pub wishlist: &'a mut dyn WishList,
}
