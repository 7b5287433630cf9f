//! Decision loop integration tests against the sandbox collaborators

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use glam::Vec3;

use warband::core::types::{GroupKey, Priority, Tick, UnitId};
use warband::engine::{Command, DecisionContext, GameView, Intel, TargetClass, TaskTracker};
use warband::military::{AssignmentKind, GroupKind, GroupRegistry, TickReport};
use warband::sandbox::{ProductionQueue, SandboxWorld, TaskBoard};
use warband::threat::ThreatField;
use warband::units::{DomainMask, MovementDomain, Unit, UnitCategory, UnitType};
use warband::MilitaryConfig;

const MAP: f32 = 2048.0;

struct Harness {
    registry: GroupRegistry,
    world: SandboxWorld,
    board: Rc<RefCell<TaskBoard>>,
    queue: ProductionQueue,
    threat: ThreatField,
}

impl Harness {
    fn new() -> Self {
        let config = MilitaryConfig::default();
        let threat = ThreatField::new(MAP, MAP, &config.threat);
        let mut registry = GroupRegistry::new(config);
        let board = Rc::new(RefCell::new(TaskBoard::new()));
        registry.add_observer(board.clone());
        Self {
            registry,
            world: SandboxWorld::new(MAP, MAP),
            board,
            queue: ProductionQueue::new(),
            threat,
        }
    }

    fn spawn(&mut self, id: u32, unit_type: &Arc<UnitType>, pos: Vec3, source: u32) -> GroupKey {
        self.world.place_friendly(UnitId(id), unit_type.clone(), pos);
        self.registry
            .add_unit(Unit::new(UnitId(id), unit_type.clone()).built_by(UnitId(source)))
            .unwrap()
    }

    fn tick(&mut self, tick: Tick) -> TickReport {
        let intel = self.world.intel_snapshot();
        let mut tasks = self.board.borrow_mut();
        let mut ctx = DecisionContext {
            engine: &mut self.world,
            intel: &intel,
            tasks: &mut *tasks,
            wishlist: &mut self.queue,
        };
        self.registry.update(tick, &self.threat, &mut ctx)
    }
}

fn tank() -> Arc<UnitType> {
    Arc::new(
        UnitType::new(
            "stumpy",
            UnitCategory::MOBILE | UnitCategory::LAND | UnitCategory::ASSAULT | UnitCategory::TECH1,
        )
        .with_power(10.0),
    )
}

fn flea() -> Arc<UnitType> {
    Arc::new(
        UnitType::new("flea", UnitCategory::MOBILE | UnitCategory::LAND | UnitCategory::SCOUTER)
            .with_power(4.0),
    )
}

fn mex() -> Arc<UnitType> {
    Arc::new(UnitType::new("mex", UnitCategory::STATIC | UnitCategory::MEXTRACTOR))
}

fn lab() -> Arc<UnitType> {
    Arc::new(UnitType::new("lab", UnitCategory::STATIC | UnitCategory::FACTORY))
}

/// Center of the threat cell with indices (x, z) at the default resolution
fn cell(x: u32, z: u32) -> Vec3 {
    Vec3::new(32.0 + 64.0 * x as f32, 0.0, 32.0 + 64.0 * z as f32)
}

#[test]
fn test_pool_reuse_resets_group() {
    let mut h = Harness::new();
    let t = tank();
    let first = h.spawn(1, &t, Vec3::ZERO, 100);
    h.spawn(2, &t, Vec3::ZERO, 100);
    let slot = h.registry.slot_of(first).unwrap();
    h.registry.group_mut(first).unwrap().set_busy(true);

    h.registry.unit_destroyed(UnitId(1));
    h.registry.unit_destroyed(UnitId(2));
    assert!(h.registry.group(first).is_none());

    let second = h.registry.request_group(GroupKind::Engage);
    assert_ne!(first, second);
    assert_eq!(h.registry.slot_of(second), Some(slot));
    let group = h.registry.group(second).unwrap();
    assert!(group.is_empty());
    assert_eq!(group.strength(), 0.0);
    assert!(!group.is_busy());
    assert!(group.categories().is_empty());
}

#[test]
fn test_at_most_one_assignment_per_kind_per_tick() {
    let mut h = Harness::new();
    let (t, f, m) = (tank(), flea(), mex());
    let mut id = 1;
    for scout in 0..5 {
        h.spawn(id, &f, Vec3::new(100.0 + scout as f32 * 10.0, 0.0, 100.0), 900);
        id += 1;
    }
    for source in 0..5 {
        for _ in 0..3 {
            h.spawn(id, &t, Vec3::new(150.0, 0.0, 150.0), 100 + source);
            id += 1;
        }
    }
    for i in 0..10 {
        h.world
            .place_enemy(UnitId(500 + i), m.clone(), Vec3::new(600.0 + 40.0 * i as f32, 0.0, 900.0));
    }
    assert_eq!(h.registry.scout_groups().count(), 5);
    assert_eq!(h.registry.engage_groups().count(), 5);

    for tick in 1..=3 {
        let report = h.tick(tick);
        assert_eq!(report.count(AssignmentKind::Scout), 1);
        assert_eq!(report.count(AssignmentKind::Attack) + report.count(AssignmentKind::Assist), 1);
    }
    assert_eq!(h.board.borrow().active_attack_tasks().len(), 6);

    // Groups are taken in ascending key order
    let busy_scouts: Vec<GroupKey> = h
        .registry
        .scout_groups()
        .filter(|k| h.registry.group(*k).unwrap().is_busy())
        .collect();
    let first_scouts: Vec<GroupKey> = h.registry.scout_groups().take(3).collect();
    assert_eq!(busy_scouts, first_scouts);
    let busy_engaged = h
        .registry
        .engage_groups()
        .filter(|k| h.registry.group(*k).unwrap().is_busy())
        .count();
    assert_eq!(busy_engaged, 3);
}

#[test]
fn test_scout_prefers_weakly_defended_target() {
    let mut h = Harness::new();
    let m = mex();
    // Equal distance (800) to both targets
    let key = h.spawn(1, &flea(), Vec3::new(480.0, 0.0, 1024.0), 900);
    let defended = cell(7, 28);
    let exposed = cell(7, 3);
    h.world.place_enemy(UnitId(10), m.clone(), defended);
    h.world.place_enemy(UnitId(11), m, exposed);
    h.threat.add_power(defended, 50.0, 32.0, DomainMask::SURFACE);
    h.threat.add_power(exposed, 2.0, 32.0, DomainMask::SURFACE);

    let strength = h.registry.group(key).unwrap().strength();
    assert!(h.threat.get_threat(exposed, 0.0, MovementDomain::Surface) < strength);
    assert!(h.threat.get_threat(defended, 0.0, MovementDomain::Surface) > strength);

    let report = h.tick(1);
    assert_eq!(report.count(AssignmentKind::Scout), 1);
    assert_eq!(report.assignments[0].target, Some(UnitId(11)));
    assert_eq!(h.world.orders_for(UnitId(1)), vec![Command::attack(UnitId(11))]);
}

#[test]
fn test_scout_never_sent_into_stronger_threat() {
    let mut h = Harness::new();
    let key = h.spawn(1, &flea(), cell(7, 16), 900);
    let defended = cell(7, 28);
    h.world.place_enemy(UnitId(10), mex(), defended);
    h.threat.add_power(defended, 50.0, 32.0, DomainMask::SURFACE);

    for tick in 1..=3 {
        let report = h.tick(tick);
        assert_eq!(report.count(AssignmentKind::Scout), 0);
    }
    assert!(!h.registry.group(key).unwrap().is_busy());
    assert!(h.world.orders_for(UnitId(1)).is_empty());
}

#[test]
fn test_scout_falls_back_to_any_target_without_economy() {
    let mut h = Harness::new();
    let key = h.spawn(1, &flea(), cell(7, 16), 900);
    let wreck = Arc::new(UnitType::new("wreck", UnitCategory::STATIC).with_power(1.0));
    let pos = cell(7, 20);
    h.world.place_enemy_as(UnitId(10), wreck, pos, TargetClass::Rest);
    h.threat.add_power(pos, 1.0, 32.0, DomainMask::SURFACE);
    assert!(h.world.targets(TargetClass::MetalMakers).is_empty());
    assert!(h.world.targets(TargetClass::Factories).is_empty());

    let report = h.tick(1);
    assert_eq!(report.count(AssignmentKind::Scout), 1);
    let assignment = &report.assignments[0];
    assert_eq!(assignment.group, key);
    assert_eq!(assignment.target, Some(UnitId(10)));
    assert!(h.registry.group(key).unwrap().is_busy());
    assert_eq!(h.world.orders_for(UnitId(1)), vec![Command::attack(UnitId(10))]);
}

#[test]
fn test_engagement_picks_nearest_of_three_factories() {
    let mut h = Harness::new();
    let t = tank();
    let base = Vec3::new(100.0, 0.0, 100.0);
    let key = h.spawn(1, &t, base, 100);
    h.spawn(2, &t, base, 100);
    h.spawn(3, &t, base, 100);

    let l = lab();
    h.world.place_enemy(UnitId(30), l.clone(), Vec3::new(400.0, 0.0, 100.0));
    h.world.place_enemy(UnitId(20), l.clone(), Vec3::new(100.0, 0.0, 300.0));
    h.world.place_enemy(UnitId(10), l, Vec3::new(200.0, 0.0, 100.0));

    let report = h.tick(1);
    assert_eq!(report.count(AssignmentKind::Attack), 1);
    let assignment = &report.assignments[0];
    assert_eq!(assignment.group, key);
    assert_eq!(assignment.target, Some(UnitId(10)));
    assert!(h.registry.group(key).unwrap().is_busy());
    for id in 1..=3 {
        assert_eq!(h.world.orders_for(UnitId(id)), vec![Command::attack(UnitId(10))]);
    }
}

#[test]
fn test_nothing_known_still_requests_production() {
    let mut h = Harness::new();
    h.spawn(1, &tank(), Vec3::ZERO, 100);
    for tick in 1..=3 {
        let report = h.tick(tick);
        assert!(report.is_quiet());
        assert_eq!(report.production.len(), 2);
        assert_eq!(report.production[0].priority, Priority::High);
        assert!(report.production[0].categories.contains(UnitCategory::SCOUTER));
        assert_eq!(report.production[1].priority, Priority::Normal);
        assert!(report.production[1].categories.contains(UnitCategory::MOBILE));
    }
    assert_eq!(h.queue.count(Priority::High), 3);
    assert_eq!(h.queue.count(Priority::Normal), 3);
    assert!(h.board.borrow().is_empty());
}

#[test]
fn test_enough_scouts_skips_scout_request() {
    let mut h = Harness::new();
    let f = flea();
    h.spawn(1, &f, Vec3::ZERO, 900);
    h.spawn(2, &f, Vec3::ZERO, 900);
    let report = h.tick(1);
    assert_eq!(report.production.len(), 1);
    assert_eq!(report.production[0].priority, Priority::Normal);
}

#[test]
fn test_undersized_current_group_does_not_block_others() {
    let mut h = Harness::new();
    let t = tank();
    let small = h.spawn(1, &t, Vec3::new(100.0, 0.0, 100.0), 100);
    h.spawn(2, &t, Vec3::new(100.0, 0.0, 100.0), 100);
    let full = h.spawn(3, &t, Vec3::new(900.0, 0.0, 900.0), 101);
    h.spawn(4, &t, Vec3::new(900.0, 0.0, 900.0), 101);
    h.spawn(5, &t, Vec3::new(900.0, 0.0, 900.0), 101);
    assert!(small < full);
    h.world.place_enemy(UnitId(50), lab(), Vec3::new(200.0, 0.0, 100.0));

    let report = h.tick(1);
    assert_eq!(report.count(AssignmentKind::Attack), 1);
    assert_eq!(report.assignments[0].group, full);
    assert!(!h.registry.group(small).unwrap().is_busy());
}

#[test]
fn test_weak_group_holds_back() {
    let mut h = Harness::new();
    let t = tank();
    for id in 1..=3 {
        h.spawn(id, &t, cell(2, 2), 100);
    }
    let fortified = cell(10, 2);
    h.world.place_enemy(UnitId(50), lab(), fortified);
    h.threat.add_power(fortified, 200.0, 32.0, DomainMask::SURFACE);

    let report = h.tick(1);
    assert!(report.is_quiet());
    assert!(h.board.borrow().is_empty());
}

#[test]
fn test_idle_group_assists_when_all_targets_taken() {
    let mut h = Harness::new();
    let t = tank();
    for id in 1..=3 {
        h.spawn(id, &t, Vec3::new(100.0, 0.0, 100.0), 100);
    }
    h.world.place_enemy(UnitId(50), lab(), Vec3::new(600.0, 0.0, 100.0));
    let first = h.tick(1);
    assert_eq!(first.count(AssignmentKind::Attack), 1);

    let helpers = h.spawn(4, &t, Vec3::new(300.0, 0.0, 300.0), 101);
    h.spawn(5, &t, Vec3::new(300.0, 0.0, 300.0), 101);
    h.spawn(6, &t, Vec3::new(300.0, 0.0, 300.0), 101);

    let second = h.tick(2);
    assert_eq!(second.count(AssignmentKind::Assist), 1);
    assert_eq!(second.assignments[0].group, helpers);
    assert_eq!(second.assignments[0].target, Some(UnitId(50)));
    // Helpers guard the attacking group's leader
    assert_eq!(h.world.orders_for(UnitId(4)), vec![Command::guard(UnitId(1))]);
    assert!(h.registry.group(helpers).unwrap().is_busy());
}

#[test]
fn test_micro_group_left_alone() {
    let mut h = Harness::new();
    let t = tank();
    let key = h.spawn(1, &t, Vec3::ZERO, 100);
    h.spawn(2, &t, Vec3::ZERO, 100);
    h.spawn(3, &t, Vec3::ZERO, 100);
    h.world.place_enemy(UnitId(50), lab(), Vec3::new(100.0, 0.0, 0.0));
    h.registry.group_mut(key).unwrap().micro(true);

    assert!(h.tick(1).is_quiet());
    h.registry.group_mut(key).unwrap().micro(false);
    assert_eq!(h.tick(2).count(AssignmentKind::Attack), 1);
}

#[test]
fn test_group_removal_reaches_task_board() {
    let mut h = Harness::new();
    let t = tank();
    let key = h.spawn(1, &t, Vec3::ZERO, 100);
    h.spawn(2, &t, Vec3::ZERO, 100);
    h.spawn(3, &t, Vec3::ZERO, 100);
    h.world.place_enemy(UnitId(50), lab(), Vec3::new(100.0, 0.0, 0.0));
    h.tick(1);
    assert!(h.board.borrow().task_of(key).is_some());

    for id in 1..=3 {
        h.world.kill(UnitId(id));
        h.registry.unit_destroyed(UnitId(id));
    }
    assert!(h.registry.group(key).is_none());
    assert!(h.board.borrow().is_empty());

    // Target is free again for the next group
    for id in 4..=6 {
        h.spawn(id, &t, Vec3::ZERO, 100);
    }
    let report = h.tick(2);
    assert_eq!(report.assignments[0].target, Some(UnitId(50)));
}

#[test]
fn test_task_completion_frees_group() {
    let mut h = Harness::new();
    let t = tank();
    let key = h.spawn(1, &t, Vec3::ZERO, 100);
    h.spawn(2, &t, Vec3::ZERO, 100);
    h.spawn(3, &t, Vec3::ZERO, 100);
    h.world.place_enemy(UnitId(50), lab(), Vec3::new(100.0, 0.0, 0.0));
    h.tick(1);
    assert!(h.registry.group(key).unwrap().is_busy());

    h.world.kill(UnitId(50));
    assert_eq!(h.world.position(UnitId(50)), None);
    let finished = h.board.borrow_mut().sweep(&h.world, &mut h.registry);
    assert_eq!(finished.len(), 1);
    assert!(!h.registry.group(key).unwrap().is_busy());
    assert_eq!(h.board.borrow().completed(), 1);
}
