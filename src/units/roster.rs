//! Friendly units known to the military layer
//!
//! A `Unit` points at its group through a plain key. The group in turn only
//! keeps membership accounting; unit lifetime stays with the engine, and the
//! roster is the index that resolves both directions.

use std::sync::Arc;

use ahash::AHashMap;

use super::unit_type::UnitType;
use crate::core::types::{GroupKey, UnitId};

/// A friendly unit handle
#[derive(Debug, Clone)]
pub struct Unit {
    pub id: UnitId,
    pub unit_type: Arc<UnitType>,
    /// Factory or builder that produced this unit
    pub builder: Option<UnitId>,
    /// Owning group, if any (non-owning back-reference)
    pub group: Option<GroupKey>,
}

impl Unit {
    pub fn new(id: UnitId, unit_type: Arc<UnitType>) -> Self {
        Self {
            id,
            unit_type,
            builder: None,
            group: None,
        }
    }

    pub fn built_by(mut self, builder: UnitId) -> Self {
        self.builder = Some(builder);
        self
    }
}

/// Id-indexed table of live friendly units
#[derive(Debug, Default)]
pub struct UnitRoster {
    units: AHashMap<UnitId, Unit>,
}

impl UnitRoster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a unit
    pub fn insert(&mut self, unit: Unit) {
        self.units.insert(unit.id, unit);
    }

    pub fn remove(&mut self, id: UnitId) -> Option<Unit> {
        self.units.remove(&id)
    }

    pub fn get(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(&id)
    }

    pub fn get_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        self.units.get_mut(&id)
    }

    pub fn contains(&self, id: UnitId) -> bool {
        self.units.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Unit> {
        self.units.values()
    }

    /// Units currently without a group
    pub fn ungrouped(&self) -> impl Iterator<Item = &Unit> {
        self.units.values().filter(|u| u.group.is_none())
    }
}
