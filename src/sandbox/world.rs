//! In-memory engine stand-in
//!
//! Holds friendly and hostile placements, classifies hostiles for intel,
//! records every issued order and runs a crude movement/damage step so a
//! skirmish can play out without a real game.

use std::collections::BTreeMap;
use std::sync::Arc;

use ahash::AHashMap;
use glam::Vec3;
use serde::Serialize;

use crate::core::types::{distance_2d, Tick, UnitId, FOOTPRINT_TO_WORLD};
use crate::engine::{Command, CommandSink, GameView, Intel, TargetClass};
use crate::units::{UnitCategory, UnitType};

/// Default production preference: mostly assault, some artillery and flak
pub const DEFAULT_ROULETTE: [(f32, UnitCategory); 3] = [
    (0.5, UnitCategory::ASSAULT),
    (0.3, UnitCategory::ARTILLERY),
    (0.2, UnitCategory::ANTIAIR),
];

/// Orders kept in the log before the oldest are dropped
pub const ORDER_LOG_CAPACITY: usize = 4096;

/// An order as the engine received it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IssuedOrder {
    pub frame: Tick,
    pub unit: UnitId,
    pub command: Command,
}

#[derive(Debug, Clone)]
struct Placed {
    unit_type: Arc<UnitType>,
    pos: Vec3,
    hp: f32,
}

/// Intel class a hostile of the given categories falls into
pub fn classify(categories: UnitCategory) -> TargetClass {
    if categories.contains(UnitCategory::FACTORY) {
        TargetClass::Factories
    } else if categories.contains(UnitCategory::EMAKER) {
        TargetClass::EnergyMakers
    } else if categories.intersects(UnitCategory::MEXTRACTOR | UnitCategory::MMAKER) {
        TargetClass::MetalMakers
    } else if categories.contains(UnitCategory::MOBILE | UnitCategory::BUILDER) {
        TargetClass::MobileBuilders
    } else if categories.intersects(UnitCategory::ARMED) {
        TargetClass::Attackers
    } else {
        TargetClass::Rest
    }
}

/// Classified hostile lists and production preference
///
/// Kept apart from the world so a decision pass can read intel while the
/// world is borrowed mutably as the engine.
#[derive(Debug, Clone)]
pub struct IntelSnapshot {
    classes: AHashMap<TargetClass, Vec<UnitId>>,
    roulette: Vec<(f32, UnitCategory)>,
}

impl Default for IntelSnapshot {
    fn default() -> Self {
        Self {
            classes: AHashMap::new(),
            roulette: DEFAULT_ROULETTE.to_vec(),
        }
    }
}

impl IntelSnapshot {
    /// Total hostiles across classes
    pub fn len(&self) -> usize {
        self.classes.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Intel for IntelSnapshot {
    fn targets(&self, class: TargetClass) -> &[UnitId] {
        self.classes.get(&class).map(Vec::as_slice).unwrap_or(&[])
    }

    fn production_roulette(&self) -> &[(f32, UnitCategory)] {
        &self.roulette
    }
}

#[derive(Debug)]
pub struct SandboxWorld {
    frame: Tick,
    width: f32,
    depth: f32,
    friendly: AHashMap<UnitId, Placed>,
    enemies: BTreeMap<UnitId, Placed>,
    intel: IntelSnapshot,
    orders: Vec<IssuedOrder>,
    order_capacity: usize,
    /// Last replacing order per friendly unit
    standing: AHashMap<UnitId, Command>,
}

impl SandboxWorld {
    pub fn new(width: f32, depth: f32) -> Self {
        Self {
            frame: 0,
            width,
            depth,
            friendly: AHashMap::new(),
            enemies: BTreeMap::new(),
            intel: IntelSnapshot::default(),
            orders: Vec::new(),
            order_capacity: ORDER_LOG_CAPACITY,
            standing: AHashMap::new(),
        }
    }

    /// Map extent (X, Z)
    pub fn dimensions(&self) -> (f32, f32) {
        (self.width, self.depth)
    }

    pub fn set_frame(&mut self, frame: Tick) {
        self.frame = frame;
    }

    pub fn set_roulette(&mut self, table: Vec<(f32, UnitCategory)>) {
        self.intel.roulette = table;
    }

    pub fn place_friendly(&mut self, id: UnitId, unit_type: Arc<UnitType>, pos: Vec3) {
        let hp = unit_type.cost.max(1.0);
        self.friendly.insert(id, Placed { unit_type, pos, hp });
    }

    /// Place a hostile and file it under its intel class
    pub fn place_enemy(&mut self, id: UnitId, unit_type: Arc<UnitType>, pos: Vec3) {
        let class = classify(unit_type.categories);
        self.place_enemy_as(id, unit_type, pos, class);
    }

    /// Place a hostile under an explicit intel class
    pub fn place_enemy_as(&mut self, id: UnitId, unit_type: Arc<UnitType>, pos: Vec3, class: TargetClass) {
        self.kill(id);
        let hp = unit_type.cost.max(1.0);
        self.enemies.insert(id, Placed { unit_type, pos, hp });
        self.intel.classes.entry(class).or_default().push(id);
    }

    /// Remove a unit from the world; returns whether it existed
    pub fn kill(&mut self, id: UnitId) -> bool {
        self.standing.remove(&id);
        let friendly = self.friendly.remove(&id).is_some();
        let enemy = self.enemies.remove(&id).is_some();
        if enemy {
            for ids in self.intel.classes.values_mut() {
                ids.retain(|other| *other != id);
            }
        }
        friendly || enemy
    }

    pub fn move_unit(&mut self, id: UnitId, pos: Vec3) {
        if let Some(placed) = self.friendly.get_mut(&id).or_else(|| self.enemies.get_mut(&id)) {
            placed.pos = pos;
        }
    }

    pub fn intel(&self) -> &IntelSnapshot {
        &self.intel
    }

    /// Copy of the current intel for use alongside a mutable world borrow
    pub fn intel_snapshot(&self) -> IntelSnapshot {
        self.intel.clone()
    }

    pub fn is_alive(&self, id: UnitId) -> bool {
        self.friendly.contains_key(&id) || self.enemies.contains_key(&id)
    }

    pub fn friendly_count(&self) -> usize {
        self.friendly.len()
    }

    pub fn enemy_count(&self) -> usize {
        self.enemies.len()
    }

    pub fn orders(&self) -> &[IssuedOrder] {
        &self.orders
    }

    /// Commands received by one unit, oldest first
    pub fn orders_for(&self, id: UnitId) -> Vec<Command> {
        self.orders
            .iter()
            .filter(|order| order.unit == id)
            .map(|order| order.command.clone())
            .collect()
    }

    pub fn clear_orders(&mut self) {
        self.orders.clear();
    }

    /// Keep at most `capacity` of the most recent orders
    pub fn set_order_log_capacity(&mut self, capacity: usize) {
        self.order_capacity = capacity.max(1);
        self.trim_orders();
    }

    fn trim_orders(&mut self) {
        if self.orders.len() > self.order_capacity {
            let excess = self.orders.len() - self.order_capacity;
            self.orders.drain(..excess);
        }
    }

    /// Advance the clock by `ticks`, moving friendlies along their standing
    /// orders and applying weapon damage. Returns hostiles destroyed.
    pub fn step(&mut self, ticks: Tick) -> Vec<UnitId> {
        self.frame += ticks;
        let dt = ticks as f32;

        let friendly_pos: AHashMap<UnitId, Vec3> =
            self.friendly.iter().map(|(id, placed)| (*id, placed.pos)).collect();
        let mut damage: BTreeMap<UnitId, f32> = BTreeMap::new();
        for (id, placed) in self.friendly.iter_mut() {
            let Some(command) = self.standing.get(id) else {
                continue;
            };
            let (goal, target) = match command {
                Command::Move { pos, .. } => (Some(*pos), None),
                Command::Attack { target, .. } => (self.enemies.get(target).map(|e| e.pos), Some(*target)),
                Command::Guard { target, .. } => (friendly_pos.get(target).copied(), None),
                _ => (None, None),
            };
            let Some(goal) = goal else {
                continue;
            };

            let reach = placed.unit_type.weapon_range.max(placed.unit_type.footprint * FOOTPRINT_TO_WORLD);
            let gap = distance_2d(placed.pos, goal);
            let stop_at = if target.is_some() { reach } else { 0.0 };
            if gap > stop_at {
                let travel = (placed.unit_type.speed * dt).min(gap - stop_at);
                let dir = Vec3::new(goal.x - placed.pos.x, 0.0, goal.z - placed.pos.z) / gap;
                placed.pos += dir * travel;
            }
            if let Some(target) = target {
                if distance_2d(placed.pos, goal) <= reach {
                    *damage.entry(target).or_insert(0.0) += placed.unit_type.power * dt;
                }
            }
        }

        let mut destroyed = Vec::new();
        for (target, amount) in damage {
            if let Some(enemy) = self.enemies.get_mut(&target) {
                enemy.hp -= amount;
                if enemy.hp <= 0.0 {
                    destroyed.push(target);
                }
            }
        }
        for id in &destroyed {
            self.kill(*id);
            tracing::debug!("Sandbox: {} destroyed at frame {}", id, self.frame);
        }
        destroyed
    }
}

impl GameView for SandboxWorld {
    fn frame(&self) -> Tick {
        self.frame
    }

    fn position(&self, unit: UnitId) -> Option<Vec3> {
        self.friendly
            .get(&unit)
            .or_else(|| self.enemies.get(&unit))
            .map(|placed| placed.pos)
    }

    fn enemy_units(&self) -> Vec<UnitId> {
        self.enemies.keys().copied().collect()
    }

    fn unit_type(&self, unit: UnitId) -> Option<Arc<UnitType>> {
        self.friendly
            .get(&unit)
            .or_else(|| self.enemies.get(&unit))
            .map(|placed| placed.unit_type.clone())
    }
}

impl CommandSink for SandboxWorld {
    fn give_order(&mut self, unit: UnitId, command: Command) {
        let replaces = match &command {
            Command::Move { enqueue, .. }
            | Command::Attack { enqueue, .. }
            | Command::Guard { enqueue, .. }
            | Command::Repair { enqueue, .. }
            | Command::Reclaim { enqueue, .. } => !*enqueue,
            Command::Build { .. } | Command::Stop => true,
            Command::Wait | Command::Abilities { .. } => false,
        };
        if replaces {
            if command == Command::Stop {
                self.standing.remove(&unit);
            } else {
                self.standing.insert(unit, command.clone());
            }
        }
        self.orders.push(IssuedOrder {
            frame: self.frame,
            unit,
            command,
        });
        self.trim_orders();
    }
}

impl Intel for SandboxWorld {
    fn targets(&self, class: TargetClass) -> &[UnitId] {
        self.intel.targets(class)
    }

    fn production_roulette(&self) -> &[(f32, UnitCategory)] {
        self.intel.production_roulette()
    }
}
