//! Groups: sets of friendly units acting as one decision unit
//!
//! A group is either all builders or all combatants, and either all
//! water-bound or all land-capable. `can_add`/`can_merge` enforce this and
//! every mutation checks them first.
//!
//! State machine:
//! - IDLE -> BUSY when an order binds the group to a task
//! - BUSY -> IDLE when the task completes, on `stop()`, or on a non-queued
//!   `move_to()`
//! - `micro(true)` puts the group under manual control; the per-tick
//!   assignment loop leaves it alone until `micro(false)`

use std::cell::Cell;
use std::f32::consts::SQRT_2;
use std::sync::Arc;

use ahash::{AHashMap, AHashSet};
use glam::Vec3;
use ordered_float::OrderedFloat;

use crate::core::types::{distance_2d, GroupKey, UnitId, ERR_POSITION, FOOTPRINT_TO_WORLD};
use crate::engine::{Command, Engine, GameView};
use crate::military::targets::TargetsFilter;
use crate::threat::ThreatField;
use crate::units::{MoveType, MovementDomain, Unit, UnitCategory, UnitRoster, UnitType};

/// Aggregate properties over the current members
#[derive(Debug, Clone, Default)]
pub struct GroupStats {
    /// Move type with the smallest slope tolerance among members
    pub move_type: Option<MoveType>,
    pub strength: f32,
    pub speed: f32,
    pub build_speed: f32,
    pub cost: f32,
    pub metal_cost: f32,
    /// Largest member footprint (engine squares)
    pub size: f32,
    pub range: f32,
    pub build_range: f32,
    pub sight_range: f32,
    pub categories: UnitCategory,
    pub tech_level: u8,
}

impl GroupStats {
    fn absorb(&mut self, unit_type: &UnitType) {
        if let Some(mt) = unit_type.move_type {
            let steeper = self.move_type.map_or(true, |cur| mt.max_slope < cur.max_slope);
            if steeper {
                self.move_type = Some(mt);
            }
        }
        self.strength += unit_type.power;
        self.speed += unit_type.speed;
        self.build_speed += unit_type.build_speed;
        self.cost += unit_type.cost;
        self.metal_cost += unit_type.metal_cost;
        self.size = self.size.max(unit_type.footprint);
        self.range = self.range.max(unit_type.weapon_range);
        self.build_range = self.build_range.max(unit_type.build_range);
        self.sight_range = self.sight_range.max(unit_type.sight_range);
        self.categories |= unit_type.categories;
        self.tech_level = self.tech_level.max(unit_type.tech_level);
    }

    /// Steepest slope every member can climb
    pub fn max_slope(&self) -> Option<f32> {
        self.move_type.map(|mt| mt.max_slope)
    }
}

#[derive(Debug, Clone)]
pub struct Group {
    key: GroupKey,
    units: AHashMap<UnitId, Arc<UnitType>>,
    waiters: AHashMap<UnitId, bool>,
    stats: GroupStats,
    radius: Cell<Option<f32>>,
    anchor: Cell<Vec3>,
    busy: bool,
    micro: bool,
}

impl Group {
    pub fn new(key: GroupKey) -> Self {
        Self {
            key,
            units: AHashMap::new(),
            waiters: AHashMap::new(),
            stats: GroupStats::default(),
            radius: Cell::new(None),
            anchor: Cell::new(ERR_POSITION),
            busy: false,
            micro: false,
        }
    }

    /// Empty group seeded with one unit
    pub fn with_unit(key: GroupKey, unit: &mut Unit) -> Self {
        let mut group = Self::new(key);
        group.add_unit(unit);
        group
    }

    /// Return to the empty default state under a new key
    pub fn reset(&mut self, key: GroupKey) {
        self.key = key;
        self.units.clear();
        self.waiters.clear();
        self.stats = GroupStats::default();
        self.radius.set(None);
        self.anchor.set(ERR_POSITION);
        self.busy = false;
        self.micro = false;
    }

    pub fn key(&self) -> GroupKey {
        self.key
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn contains(&self, unit: UnitId) -> bool {
        self.units.contains_key(&unit)
    }

    pub fn members(&self) -> impl Iterator<Item = UnitId> + '_ {
        self.units.keys().copied()
    }

    /// Lowest member id, used as the guard target when assisting
    pub fn leader(&self) -> Option<UnitId> {
        self.units.keys().min().copied()
    }

    pub fn stats(&self) -> &GroupStats {
        &self.stats
    }

    pub fn strength(&self) -> f32 {
        self.stats.strength
    }

    pub fn tech_level(&self) -> u8 {
        self.stats.tech_level
    }

    pub fn categories(&self) -> UnitCategory {
        self.stats.categories
    }

    pub fn domain(&self) -> MovementDomain {
        MovementDomain::of(self.stats.categories)
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn set_busy(&mut self, busy: bool) {
        self.busy = busy;
    }

    pub fn is_microing(&self) -> bool {
        self.micro
    }

    /// Enter or leave manual control
    pub fn micro(&mut self, on: bool) {
        self.micro = on;
    }

    pub fn is_waiting(&self, unit: UnitId) -> bool {
        self.waiters.get(&unit).copied().unwrap_or(false)
    }

    /// Could `unit` join without mixing water/land or builder/combat roles
    pub fn can_add(&self, unit: &Unit) -> bool {
        if self.units.is_empty() {
            return true;
        }
        compatible(self.stats.categories, unit.unit_type.categories)
    }

    /// Could `other` be merged into this group
    pub fn can_merge(&self, other: &Group) -> bool {
        if self.key == other.key {
            return false;
        }
        if self.units.is_empty() || other.units.is_empty() {
            return true;
        }
        compatible(self.stats.categories, other.stats.categories)
    }

    /// Add a unit; false if it is already a member or incompatible
    pub fn add_unit(&mut self, unit: &mut Unit) -> bool {
        if self.units.contains_key(&unit.id) || !self.can_add(unit) {
            return false;
        }
        self.stats.absorb(&unit.unit_type);
        self.units.insert(unit.id, unit.unit_type.clone());
        self.radius.set(None);
        unit.group = Some(self.key);
        true
    }

    /// Detach one member; the unit itself lives on, group-less
    pub fn remove_unit(&mut self, unit: &mut Unit) -> bool {
        if self.units.remove(&unit.id).is_none() {
            return false;
        }
        self.waiters.remove(&unit.id);
        if unit.group == Some(self.key) {
            unit.group = None;
        }
        self.recompute();
        true
    }

    /// Detach every member, leaving them group-less
    pub fn detach_all(&mut self, roster: &mut UnitRoster) {
        for id in self.units.keys() {
            if let Some(unit) = roster.get_mut(*id) {
                if unit.group == Some(self.key) {
                    unit.group = None;
                }
            }
        }
        self.units.clear();
        self.waiters.clear();
        self.stats = GroupStats::default();
        self.radius.set(None);
    }

    /// Move all members of `other` into this group, leaving `other` empty
    pub fn merge(&mut self, other: &mut Group, roster: &mut UnitRoster) -> bool {
        if !self.can_merge(other) {
            return false;
        }
        for (id, unit_type) in other.units.drain() {
            self.stats.absorb(&unit_type);
            self.units.insert(id, unit_type);
            if let Some(unit) = roster.get_mut(id) {
                unit.group = Some(self.key);
            }
        }
        self.waiters.extend(other.waiters.drain());
        other.stats = GroupStats::default();
        other.radius.set(None);
        self.radius.set(None);
        true
    }

    /// Centroid of member positions
    ///
    /// With no positioned members this is `ERR_POSITION`, or the last known
    /// centroid when `force_valid` is set.
    pub fn pos<V: GameView + ?Sized>(&self, view: &V, force_valid: bool) -> Vec3 {
        let mut sum = Vec3::ZERO;
        let mut count = 0;
        for id in self.units.keys() {
            if let Some(p) = view.position(*id) {
                sum += p;
                count += 1;
            }
        }
        if count > 0 {
            let centroid = sum / count as f32;
            self.anchor.set(centroid);
            return centroid;
        }
        if force_valid {
            self.anchor.get()
        } else {
            ERR_POSITION
        }
    }

    /// Half the diagonal of the smallest square holding all footprints
    pub fn radius(&self) -> f32 {
        if let Some(r) = self.radius.get() {
            return r;
        }
        let n = self.units.len();
        let r = if n == 0 {
            0.0
        } else {
            let side = (n as f32).sqrt().ceil() * self.stats.size * FOOTPRINT_TO_WORLD;
            side * SQRT_2 / 2.0
        };
        self.radius.set(Some(r));
        r
    }

    /// Length of the members lined up footprint to footprint
    pub fn max_length(&self) -> f32 {
        self.units
            .values()
            .map(|ut| ut.footprint * FOOTPRINT_TO_WORLD)
            .sum()
    }

    /// Rank `candidates` by distance plus weighted threat
    ///
    /// Occupied candidates and those failing the filter's masks or ceilings
    /// are skipped. The winner and the threat measured at it are written back
    /// into `filter`.
    pub fn select_target<V: GameView + ?Sized>(
        &self,
        candidates: &[UnitId],
        occupied: &AHashSet<UnitId>,
        filter: &mut TargetsFilter,
        view: &V,
        threat: &ThreatField,
    ) -> Option<UnitId> {
        filter.best_target = None;
        filter.threat_value = 0.0;

        let pos = self.pos(view, true);
        let domain = self.domain();
        let mut best: Option<(OrderedFloat<f32>, UnitId, f32)> = None;
        let mut examined = 0;

        for &candidate in candidates {
            if examined >= filter.candidates_limit {
                break;
            }
            if occupied.contains(&candidate) {
                continue;
            }
            let Some(unit_type) = view.unit_type(candidate) else {
                continue;
            };
            if !filter.accepts(unit_type.categories) {
                continue;
            }
            let Some(target_pos) = view.position(candidate) else {
                continue;
            };
            examined += 1;

            let danger = threat.get_threat(target_pos, filter.threat_radius, domain);
            if danger > filter.threat_ceiling {
                continue;
            }
            let score = distance_2d(pos, target_pos) + filter.threat_factor * danger;
            if score > filter.score_ceiling {
                continue;
            }
            if best.map_or(true, |(s, _, _)| OrderedFloat(score) < s) {
                best = Some((OrderedFloat(score), candidate, danger));
            }
        }

        let (_, target, danger) = best?;
        filter.best_target = Some(target);
        filter.threat_value = danger;
        Some(target)
    }

    pub fn attack(&mut self, target: UnitId, enqueue: bool, engine: &mut dyn Engine) {
        self.issue(engine, Command::Attack { target, enqueue });
        self.busy = true;
    }

    pub fn build(&mut self, pos: Vec3, unit_type: &UnitType, engine: &mut dyn Engine) {
        self.issue(
            engine,
            Command::Build {
                pos,
                unit_type: unit_type.name.clone(),
            },
        );
        self.busy = true;
    }

    pub fn move_to(&mut self, pos: Vec3, enqueue: bool, engine: &mut dyn Engine) {
        self.issue(engine, Command::Move { pos, enqueue });
        if !enqueue {
            self.busy = false;
        }
    }

    pub fn guard(&mut self, target: UnitId, enqueue: bool, engine: &mut dyn Engine) {
        self.issue(engine, Command::Guard { target, enqueue });
        self.busy = true;
    }

    pub fn stop(&mut self, engine: &mut dyn Engine) {
        self.issue(engine, Command::Stop);
        self.busy = false;
    }

    pub fn repair(&mut self, target: UnitId, engine: &mut dyn Engine) {
        self.issue(engine, Command::Repair { target, enqueue: false });
        self.busy = true;
    }

    pub fn reclaim(&mut self, target: UnitId, engine: &mut dyn Engine) {
        self.issue(engine, Command::Reclaim { target, enqueue: false });
        self.busy = true;
    }

    /// Follow another group by guarding its leader
    pub fn assist(&mut self, leader: UnitId, engine: &mut dyn Engine) {
        self.guard(leader, false, engine);
    }

    /// Put every non-waiting member on hold
    pub fn wait(&mut self, engine: &mut dyn Engine) {
        for id in self.units.keys() {
            let waiting = self.waiters.entry(*id).or_insert(false);
            if !*waiting {
                engine.give_order(*id, Command::Wait);
                *waiting = true;
            }
        }
    }

    /// Release every waiting member
    pub fn unwait(&mut self, engine: &mut dyn Engine) {
        for (id, waiting) in self.waiters.iter_mut() {
            if *waiting {
                engine.give_order(*id, Command::Wait);
                *waiting = false;
            }
        }
    }

    pub fn abilities(&self, on: bool, engine: &mut dyn Engine) {
        self.issue(engine, Command::Abilities { on });
    }

    fn issue(&self, engine: &mut dyn Engine, command: Command) {
        for id in self.units.keys() {
            engine.give_order(*id, command.clone());
        }
    }

    fn recompute(&mut self) {
        self.stats = self.units.values().fold(GroupStats::default(), |mut stats, ut| {
            stats.absorb(ut);
            stats
        });
        self.radius.set(None);
    }
}

fn compatible(group: UnitCategory, candidate: UnitCategory) -> bool {
    group.is_water_only() == candidate.is_water_only() && group.is_builder() == candidate.is_builder()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::ThreatConfig;
    use crate::sandbox::SandboxWorld;
    use crate::units::DomainMask;

    fn tank(power: f32) -> Arc<UnitType> {
        Arc::new(
            UnitType::new(
                "tank",
                UnitCategory::MOBILE | UnitCategory::LAND | UnitCategory::ASSAULT | UnitCategory::TECH1,
            )
            .with_power(power)
            .with_speed(2.0)
            .with_footprint(2.0)
            .with_move_type(1, 0.5),
        )
    }

    fn boat() -> Arc<UnitType> {
        Arc::new(
            UnitType::new("boat", UnitCategory::MOBILE | UnitCategory::SEA | UnitCategory::ATTACKER)
                .with_power(50.0)
                .with_move_type(2, 0.0),
        )
    }

    fn roster_with(types: &[(u32, Arc<UnitType>)]) -> UnitRoster {
        let mut roster = UnitRoster::new();
        for (id, ut) in types {
            roster.insert(Unit::new(UnitId(*id), ut.clone()));
        }
        roster
    }

    fn add(group: &mut Group, roster: &mut UnitRoster, id: u32) -> bool {
        let unit = roster.get_mut(UnitId(id)).unwrap();
        group.add_unit(unit)
    }

    #[test]
    fn test_add_aggregates_and_back_reference() {
        let mut roster = roster_with(&[(1, tank(10.0)), (2, tank(15.0))]);
        let mut group = Group::new(GroupKey::next());
        assert!(add(&mut group, &mut roster, 1));
        assert!(add(&mut group, &mut roster, 2));
        assert_eq!(group.len(), 2);
        assert!((group.strength() - 25.0).abs() < 1e-6);
        assert!((group.stats().speed - 4.0).abs() < 1e-6);
        assert_eq!(roster.get(UnitId(1)).unwrap().group, Some(group.key()));
        assert_eq!(group.tech_level(), 1);
    }

    #[test]
    fn test_add_twice_is_noop() {
        let mut roster = roster_with(&[(1, tank(10.0))]);
        let mut group = Group::new(GroupKey::next());
        assert!(add(&mut group, &mut roster, 1));
        assert!(!add(&mut group, &mut roster, 1));
        assert!((group.strength() - 10.0).abs() < 1e-6);
    }

    #[test]
    fn test_water_unit_rejected_by_land_group() {
        let mut roster = roster_with(&[(1, tank(10.0)), (2, boat())]);
        let mut group = Group::new(GroupKey::next());
        add(&mut group, &mut roster, 1);
        assert!(!group.can_add(roster.get(UnitId(2)).unwrap()));
        assert!(!add(&mut group, &mut roster, 2));
        assert_eq!(group.len(), 1);
        assert_eq!(roster.get(UnitId(2)).unwrap().group, None);
    }

    #[test]
    fn test_builder_rejected_by_combat_group() {
        let builder = Arc::new(UnitType::new(
            "con",
            UnitCategory::MOBILE | UnitCategory::LAND | UnitCategory::BUILDER,
        ));
        let mut roster = roster_with(&[(1, tank(10.0)), (2, builder)]);
        let mut group = Group::new(GroupKey::next());
        add(&mut group, &mut roster, 1);
        assert!(!add(&mut group, &mut roster, 2));
    }

    #[test]
    fn test_remove_recomputes() {
        let slow = Arc::new(
            UnitType::new("walker", UnitCategory::MOBILE | UnitCategory::LAND | UnitCategory::TECH2)
                .with_power(5.0)
                .with_move_type(7, 0.2),
        );
        let mut roster = roster_with(&[(1, tank(10.0)), (2, slow)]);
        let mut group = Group::new(GroupKey::next());
        add(&mut group, &mut roster, 1);
        add(&mut group, &mut roster, 2);
        assert_eq!(group.stats().move_type.map(|m| m.id), Some(7));
        assert_eq!(group.tech_level(), 2);

        let unit = roster.get_mut(UnitId(2)).unwrap();
        assert!(group.remove_unit(unit));
        assert_eq!(unit.group, None);
        assert_eq!(group.stats().move_type.map(|m| m.id), Some(1));
        assert_eq!(group.tech_level(), 1);
        assert!((group.strength() - 10.0).abs() < 1e-6);

        let unit = roster.get_mut(UnitId(2)).unwrap();
        assert!(!group.remove_unit(unit));
    }

    #[test]
    fn test_merge_moves_members() {
        let mut roster = roster_with(&[(1, tank(10.0)), (2, tank(20.0)), (3, tank(30.0))]);
        let mut a = Group::new(GroupKey::next());
        let mut b = Group::new(GroupKey::next());
        add(&mut a, &mut roster, 1);
        add(&mut b, &mut roster, 2);
        add(&mut b, &mut roster, 3);

        assert!(a.merge(&mut b, &mut roster));
        assert_eq!(a.len(), 3);
        assert!(b.is_empty());
        assert_eq!(b.strength(), 0.0);
        assert!((a.strength() - 60.0).abs() < 1e-6);
        for id in [1, 2, 3] {
            assert_eq!(roster.get(UnitId(id)).unwrap().group, Some(a.key()));
        }
    }

    #[test]
    fn test_merge_incompatible_rejected() {
        let mut roster = roster_with(&[(1, tank(10.0)), (2, boat())]);
        let mut land = Group::new(GroupKey::next());
        let mut sea = Group::new(GroupKey::next());
        add(&mut land, &mut roster, 1);
        add(&mut sea, &mut roster, 2);
        assert!(!land.can_merge(&sea));
        assert!(!land.merge(&mut sea, &mut roster));
        assert_eq!(land.len(), 1);
        assert_eq!(sea.len(), 1);
    }

    #[test]
    fn test_merge_same_key_rejected() {
        let mut roster = roster_with(&[(1, tank(10.0))]);
        let key = GroupKey::next();
        let mut a = Group::new(key);
        let mut twin = Group::new(key);
        add(&mut twin, &mut roster, 1);
        assert!(!a.merge(&mut twin, &mut roster));
    }

    #[test]
    fn test_detach_all_preserves_units() {
        let mut roster = roster_with(&[(1, tank(10.0)), (2, tank(10.0))]);
        let mut group = Group::new(GroupKey::next());
        add(&mut group, &mut roster, 1);
        add(&mut group, &mut roster, 2);
        group.detach_all(&mut roster);
        assert!(group.is_empty());
        assert_eq!(roster.len(), 2);
        assert_eq!(roster.ungrouped().count(), 2);
    }

    #[test]
    fn test_radius_lazy_and_invalidated() {
        let mut roster = roster_with(&[(1, tank(1.0)), (2, tank(1.0)), (3, tank(1.0))]);
        let mut group = Group::new(GroupKey::next());
        assert_eq!(group.radius(), 0.0);
        add(&mut group, &mut roster, 1);
        let one = group.radius();
        // side = 1 * 2 * 8 = 16, half diagonal = 16 * sqrt(2) / 2
        assert!((one - 16.0 * SQRT_2 / 2.0).abs() < 1e-4);
        add(&mut group, &mut roster, 2);
        add(&mut group, &mut roster, 3);
        // ceil(sqrt(3)) = 2 footprints per side
        assert!((group.radius() - 32.0 * SQRT_2 / 2.0).abs() < 1e-4);
        assert!((group.max_length() - 48.0).abs() < 1e-4);
    }

    #[test]
    fn test_pos_centroid_and_fallback() {
        let mut world = SandboxWorld::new(1000.0, 1000.0);
        world.place_friendly(UnitId(1), tank(1.0), Vec3::new(0.0, 0.0, 0.0));
        world.place_friendly(UnitId(2), tank(1.0), Vec3::new(100.0, 0.0, 50.0));
        let mut roster = roster_with(&[(1, tank(1.0)), (2, tank(1.0))]);
        let mut group = Group::new(GroupKey::next());
        assert_eq!(group.pos(&world, false), ERR_POSITION);

        add(&mut group, &mut roster, 1);
        add(&mut group, &mut roster, 2);
        let c = group.pos(&world, false);
        assert_eq!((c.x, c.z), (50.0, 25.0));

        world.kill(UnitId(1));
        world.kill(UnitId(2));
        assert_eq!(group.pos(&world, false), ERR_POSITION);
        let anchor = group.pos(&world, true);
        assert_eq!((anchor.x, anchor.z), (50.0, 25.0));
    }

    #[test]
    fn test_orders_drive_busy_state() {
        let mut world = SandboxWorld::new(1000.0, 1000.0);
        let mut roster = roster_with(&[(1, tank(1.0)), (2, tank(1.0))]);
        let mut group = Group::new(GroupKey::next());
        add(&mut group, &mut roster, 1);
        add(&mut group, &mut roster, 2);

        group.attack(UnitId(99), false, &mut world);
        assert!(group.is_busy());
        assert_eq!(world.orders_for(UnitId(1)), vec![Command::attack(UnitId(99))]);

        group.move_to(Vec3::new(10.0, 0.0, 10.0), true, &mut world);
        assert!(group.is_busy());
        group.move_to(Vec3::new(10.0, 0.0, 10.0), false, &mut world);
        assert!(!group.is_busy());

        group.guard(UnitId(5), false, &mut world);
        assert!(group.is_busy());
        group.stop(&mut world);
        assert!(!group.is_busy());

        group.micro(true);
        assert!(group.is_microing());
        group.micro(false);
        assert!(!group.is_microing());
    }

    #[test]
    fn test_wait_toggles_once() {
        let mut world = SandboxWorld::new(1000.0, 1000.0);
        let mut roster = roster_with(&[(1, tank(1.0))]);
        let mut group = Group::new(GroupKey::next());
        add(&mut group, &mut roster, 1);

        group.wait(&mut world);
        group.wait(&mut world);
        assert!(group.is_waiting(UnitId(1)));
        assert_eq!(world.orders_for(UnitId(1)).len(), 1);

        group.unwait(&mut world);
        assert!(!group.is_waiting(UnitId(1)));
        assert_eq!(world.orders_for(UnitId(1)).len(), 2);
    }

    #[test]
    fn test_select_target_filters_and_writes_back() {
        let mut world = SandboxWorld::new(1000.0, 1000.0);
        world.place_friendly(UnitId(1), tank(50.0), Vec3::new(0.0, 0.0, 0.0));
        let factory = Arc::new(
            UnitType::new("factory", UnitCategory::STATIC | UnitCategory::FACTORY),
        );
        let turret = Arc::new(
            UnitType::new("turret", UnitCategory::STATIC | UnitCategory::ATTACKER)
                .with_power(500.0),
        );
        world.place_enemy(UnitId(10), factory.clone(), Vec3::new(100.0, 0.0, 0.0));
        world.place_enemy(UnitId(11), factory.clone(), Vec3::new(300.0, 0.0, 0.0));
        world.place_enemy(UnitId(12), factory, Vec3::new(50.0, 0.0, 0.0));
        world.place_enemy(UnitId(13), turret, Vec3::new(20.0, 0.0, 0.0));

        let mut threat = ThreatField::new(1000.0, 1000.0, &ThreatConfig::default());
        threat.add_power(Vec3::new(20.0, 0.0, 0.0), 500.0, 32.0, DomainMask::SURFACE);

        let mut roster = roster_with(&[(1, tank(50.0))]);
        let mut group = Group::new(GroupKey::next());
        add(&mut group, &mut roster, 1);

        let mut occupied = AHashSet::new();
        occupied.insert(UnitId(12));

        let mut filter = TargetsFilter {
            include: UnitCategory::FACTORY,
            threat_ceiling: 100.0,
            ..Default::default()
        };
        let candidates = [UnitId(13), UnitId(12), UnitId(11), UnitId(10)];
        let best = group.select_target(&candidates, &occupied, &mut filter, &world, &threat);
        assert_eq!(best, Some(UnitId(10)));
        assert_eq!(filter.best_target, Some(UnitId(10)));
        assert!(filter.threat_value < 100.0);

        // Only the first evaluated candidate counts with a limit of one
        let mut limited = TargetsFilter {
            include: UnitCategory::FACTORY,
            candidates_limit: 1,
            ..Default::default()
        };
        let best = group.select_target(&candidates, &occupied, &mut limited, &world, &threat);
        assert_eq!(best, Some(UnitId(11)));

        // Everything rejected by the score ceiling
        let mut strict = TargetsFilter {
            score_ceiling: 10.0,
            ..Default::default()
        };
        assert_eq!(group.select_target(&candidates, &occupied, &mut strict, &world, &threat), None);
        assert_eq!(strict.best_target, None);
    }
}
