//! Unit type metadata as reported by the engine

use serde::{Deserialize, Serialize};

use super::category::{DomainMask, MovementDomain, UnitCategory};

/// Static description of a unit type
///
/// Built once by whoever owns the unit table and shared between units via
/// `Arc`.
#[derive(Debug, Clone)]
pub struct UnitType {
    pub name: String,
    pub categories: UnitCategory,
    /// Combat strength
    pub power: f32,
    pub speed: f32,
    pub build_speed: f32,
    pub cost: f32,
    pub metal_cost: f32,
    /// Footprint edge in engine squares
    pub footprint: f32,
    pub weapon_range: f32,
    pub build_range: f32,
    pub sight_range: f32,
    /// Engine move type, `None` for static structures
    pub move_type: Option<MoveType>,
    pub tech_level: u8,
    /// Domains this type's weapons can reach
    pub hits: DomainMask,
}

/// Engine movement class of a mobile unit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MoveType {
    pub id: u32,
    /// Steepest slope this move type can climb
    pub max_slope: f32,
}

impl UnitType {
    pub fn new(name: impl Into<String>, categories: UnitCategory) -> Self {
        Self {
            name: name.into(),
            categories,
            power: 0.0,
            speed: 0.0,
            build_speed: 0.0,
            cost: 0.0,
            metal_cost: 0.0,
            footprint: 2.0,
            weapon_range: 0.0,
            build_range: 0.0,
            sight_range: 0.0,
            move_type: None,
            tech_level: categories.tech_level(),
            hits: DomainMask::reached_by(categories),
        }
    }

    pub fn with_power(mut self, power: f32) -> Self {
        self.power = power;
        self
    }

    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    pub fn with_cost(mut self, cost: f32, metal_cost: f32) -> Self {
        self.cost = cost;
        self.metal_cost = metal_cost;
        self
    }

    pub fn with_footprint(mut self, footprint: f32) -> Self {
        self.footprint = footprint;
        self
    }

    pub fn with_ranges(mut self, weapon: f32, build: f32, sight: f32) -> Self {
        self.weapon_range = weapon;
        self.build_range = build;
        self.sight_range = sight;
        self
    }

    pub fn with_build_speed(mut self, build_speed: f32) -> Self {
        self.build_speed = build_speed;
        self
    }

    pub fn with_move_type(mut self, id: u32, max_slope: f32) -> Self {
        self.move_type = Some(MoveType { id, max_slope });
        self
    }

    pub fn domain(&self) -> MovementDomain {
        MovementDomain::of(self.categories)
    }

    pub fn is_mobile(&self) -> bool {
        self.categories.contains(UnitCategory::MOBILE)
    }
}
