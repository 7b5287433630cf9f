//! Group registry: pooled group storage, unit routing and the per-tick
//! decision pass
//!
//! Groups live in a slot pool that only grows; removed groups return their
//! slot to a free stack and the next request reuses it under a fresh key.
//! Scout and engagement groups are additionally indexed in ordered sets so a
//! decision pass always visits them in ascending key order.
//!
//! Throttling: one `update` issues at most one scout assignment and at most
//! one engagement assignment, however many groups are idle.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

use ahash::AHashMap;
use glam::Vec3;
use ordered_float::OrderedFloat;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::core::config::MilitaryConfig;
use crate::core::error::{Result, WarbandError};
use crate::core::types::{distance_2d, GroupKey, Priority, Tick, UnitId};
use crate::engine::{DecisionContext, GameView, GroupObserver, Intel, TaskTracker};
use crate::military::group::Group;
use crate::military::report::{Assignment, AssignmentKind, ProductionRequest, TickReport};
use crate::military::targets::TargetLists;
use crate::threat::ThreatField;
use crate::units::{MovementDomain, Unit, UnitCategory, UnitRoster};

/// Which active set a requested group joins
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GroupKind {
    Scout,
    Engage,
    /// Registered in the lookup only; membership is managed by the caller
    Manual,
}

pub struct GroupRegistry {
    config: MilitaryConfig,
    groups: Vec<Group>,
    free: Vec<usize>,
    lookup: AHashMap<GroupKey, usize>,
    scouts: BTreeSet<GroupKey>,
    engaged: BTreeSet<GroupKey>,
    /// Group still taking reinforcements, per production source
    current: AHashMap<Option<UnitId>, GroupKey>,
    roster: UnitRoster,
    observers: Vec<Rc<RefCell<dyn GroupObserver>>>,
    rng: ChaCha8Rng,
}

impl GroupRegistry {
    pub fn new(config: MilitaryConfig) -> Self {
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        Self {
            config,
            groups: Vec::new(),
            free: Vec::new(),
            lookup: AHashMap::new(),
            scouts: BTreeSet::new(),
            engaged: BTreeSet::new(),
            current: AHashMap::new(),
            roster: UnitRoster::new(),
            observers: Vec::new(),
            rng,
        }
    }

    pub fn config(&self) -> &MilitaryConfig {
        &self.config
    }

    /// Register something to be told about every group removal
    pub fn add_observer(&mut self, observer: Rc<RefCell<dyn GroupObserver>>) {
        self.observers.push(observer);
    }

    /// Take a group from the free stack, or grow the pool
    pub fn request_group(&mut self, kind: GroupKind) -> GroupKey {
        let key = GroupKey::next();
        let index = match self.free.pop() {
            Some(index) => {
                self.groups[index].reset(key);
                index
            }
            None => {
                self.groups.push(Group::new(key));
                self.groups.len() - 1
            }
        };
        self.lookup.insert(key, index);
        match kind {
            GroupKind::Scout => {
                self.scouts.insert(key);
            }
            GroupKind::Engage => {
                self.engaged.insert(key);
            }
            GroupKind::Manual => {}
        }
        tracing::debug!("Requested {:?} {} in slot {}", kind, key, index);
        key
    }

    /// Route a newly finished unit into a group
    ///
    /// Static units are not tracked. Scouts each get a fresh scout group;
    /// everything else joins the current group of its production source
    /// while that group is idle and compatible, otherwise starts a new
    /// engagement group that becomes current for the source.
    pub fn add_unit(&mut self, unit: Unit) -> Option<GroupKey> {
        if let Some(existing) = self.roster.get(unit.id).and_then(|u| u.group) {
            return Some(existing);
        }
        let categories = unit.unit_type.categories;
        if !categories.contains(UnitCategory::MOBILE) {
            tracing::trace!("Ignoring static {}", unit.id);
            return None;
        }

        let id = unit.id;
        let source = unit.builder;
        self.roster.insert(unit);

        let key = if categories.contains(UnitCategory::SCOUTER) {
            self.request_group(GroupKind::Scout)
        } else {
            let reusable = self.current.get(&source).copied().filter(|key| {
                match (self.group(*key), self.roster.get(id)) {
                    (Some(group), Some(unit)) => !group.is_busy() && group.can_add(unit),
                    _ => false,
                }
            });
            match reusable {
                Some(key) => key,
                None => {
                    let key = self.request_group(GroupKind::Engage);
                    self.current.insert(source, key);
                    key
                }
            }
        };

        let index = *self.lookup.get(&key)?;
        let unit = self.roster.get_mut(id)?;
        self.groups[index].add_unit(unit);
        tracing::debug!("{} joined {} ({} members)", id, key, self.groups[index].len());
        Some(key)
    }

    /// Engine reported a friendly death; empty groups are removed
    pub fn unit_destroyed(&mut self, id: UnitId) {
        let Some(mut unit) = self.roster.remove(id) else {
            return;
        };
        let Some(key) = unit.group else {
            return;
        };
        let Some(&index) = self.lookup.get(&key) else {
            return;
        };
        let group = &mut self.groups[index];
        group.remove_unit(&mut unit);
        if group.is_empty() {
            self.remove(key);
        }
    }

    /// Unregister a group and recycle its slot; members become group-less
    pub fn remove(&mut self, key: GroupKey) -> bool {
        let Some(index) = self.lookup.remove(&key) else {
            return false;
        };
        self.groups[index].detach_all(&mut self.roster);
        self.free.push(index);
        self.scouts.remove(&key);
        self.engaged.remove(&key);
        self.current.retain(|_, current| *current != key);

        for observer in &self.observers {
            observer.borrow_mut().on_group_removed(key);
        }
        tracing::debug!("Removed {}, slot {} free", key, index);
        true
    }

    /// Move every member of `from` into `into` and recycle `from`
    pub fn merge_groups(&mut self, into: GroupKey, from: GroupKey) -> Result<()> {
        if into == from {
            return Err(WarbandError::IncompatibleMerge(into, from));
        }
        let i = *self.lookup.get(&into).ok_or(WarbandError::GroupNotFound(into))?;
        let j = *self.lookup.get(&from).ok_or(WarbandError::GroupNotFound(from))?;

        let (target, source) = pair_mut(&mut self.groups, i, j);
        if !target.merge(source, &mut self.roster) {
            return Err(WarbandError::IncompatibleMerge(into, from));
        }
        self.remove(from);
        tracing::debug!("Merged {} into {}", from, into);
        Ok(())
    }

    /// Cheapest candidate by `distance + factor * threat`
    ///
    /// Scouts weigh threat so heavily that distance only breaks ties.
    /// Candidates without a known position are skipped.
    #[allow(clippy::too_many_arguments)]
    pub fn select_target<V: GameView + ?Sized>(
        &self,
        our_pos: Vec3,
        radius: f32,
        is_scout: bool,
        domain: MovementDomain,
        targets: &[UnitId],
        view: &V,
        threat: &ThreatField,
    ) -> Option<UnitId> {
        let factor = if is_scout {
            self.config.scouts.threat_factor
        } else {
            self.config.engage.threat_factor
        };
        targets
            .iter()
            .filter_map(|&target| {
                let pos = view.position(target)?;
                let score = distance_2d(our_pos, pos) + factor * threat.get_threat(pos, radius, domain);
                Some((OrderedFloat(score), target))
            })
            .min_by_key(|(score, _)| *score)
            .map(|(_, target)| target)
    }

    pub fn prepare_targets(&self, intel: &dyn Intel, tasks: &dyn TaskTracker) -> TargetLists {
        TargetLists::prepare(intel, tasks)
    }

    /// Roulette pick over `(weight, category)`; always a mobile category
    pub fn request_unit(&mut self, roulette: &[(f32, UnitCategory)]) -> UnitCategory {
        let r: f32 = self.rng.gen();
        let mut sum = 0.0;
        for &(weight, category) in roulette {
            sum += weight;
            if r <= sum {
                return UnitCategory::MOBILE | category;
            }
        }
        UnitCategory::MOBILE | UnitCategory::ASSAULT
    }

    /// One decision pass
    pub fn update(&mut self, tick: Tick, threat: &ThreatField, ctx: &mut DecisionContext<'_>) -> TickReport {
        let targets = self.prepare_targets(ctx.intel, &*ctx.tasks);
        let mut report = TickReport::new(tick);

        self.assign_scout(threat, &targets, ctx, &mut report);
        self.assign_engagement(threat, &targets, ctx, &mut report);

        if self.scouts.len() < self.config.min_scouts() {
            self.wish(ctx, UnitCategory::MOBILE | UnitCategory::SCOUTER, Priority::High, &mut report);
        }
        let category = self.request_unit(ctx.intel.production_roulette());
        self.wish(ctx, category, Priority::Normal, &mut report);

        tracing::debug!(
            "Tick {}: {} assignment(s), {} scout group(s), {} engage group(s)",
            tick,
            report.assignments.len(),
            self.scouts.len(),
            self.engaged.len()
        );
        report
    }

    fn assign_scout(
        &mut self,
        threat: &ThreatField,
        targets: &TargetLists,
        ctx: &mut DecisionContext<'_>,
        report: &mut TickReport,
    ) {
        let radius = self.config.scouts.harass_radius;
        let keys: Vec<GroupKey> = self.scouts.iter().copied().collect();
        for key in keys {
            let Some(&index) = self.lookup.get(&key) else {
                continue;
            };
            let group = &self.groups[index];
            if !is_available(group) {
                continue;
            }

            let pos = group.pos(&*ctx.engine, true);
            let domain = group.domain();
            let target = self
                .select_target(pos, radius, true, domain, &targets.harassable, &*ctx.engine, threat)
                .or_else(|| self.select_target(pos, radius, true, domain, &targets.all, &*ctx.engine, threat));
            let Some(target) = target else {
                tracing::trace!("No scout target for {}", key);
                break;
            };

            let danger = ctx
                .engine
                .position(target)
                .map_or(0.0, |p| threat.get_threat(p, 0.0, domain));
            let group = &mut self.groups[index];
            if danger < group.strength() {
                if let Some(task) = ctx.tasks.add_attack_task(target, group, &mut *ctx.engine) {
                    tracing::info!("Scout {} harasses {} (threat {:.1})", key, target, danger);
                    report.assignments.push(Assignment {
                        group: key,
                        kind: AssignmentKind::Scout,
                        target: Some(target),
                        task,
                        threat: danger,
                    });
                }
            } else {
                tracing::trace!("Scout {} too weak for {} ({:.1})", key, target, danger);
            }
            break;
        }
    }

    fn assign_engagement(
        &mut self,
        threat: &ThreatField,
        targets: &TargetLists,
        ctx: &mut DecisionContext<'_>,
        report: &mut TickReport,
    ) {
        let keys: Vec<GroupKey> = self.engaged.iter().copied().collect();
        for key in keys {
            let Some(&index) = self.lookup.get(&key) else {
                continue;
            };
            let group = &self.groups[index];
            if !is_available(group) {
                continue;
            }

            let is_current = self.current.values().any(|current| *current == key);
            let pos = group.pos(&*ctx.engine, true);
            let domain = group.domain();
            let Some(target) = self.select_target(pos, 0.0, false, domain, &targets.all, &*ctx.engine, threat)
            else {
                self.assist_random(key, index, ctx, report);
                break;
            };

            let danger = ctx
                .engine
                .position(target)
                .map_or(0.0, |p| threat.get_threat(p, 0.0, domain));
            let min_size = self.config.min_group_size(group.tech_level());
            if (is_current && group.len() < min_size) || group.strength() < danger {
                tracing::trace!(
                    "{} holds back from {}: {} members, strength {:.1} vs threat {:.1}",
                    key,
                    target,
                    group.len(),
                    group.strength(),
                    danger
                );
                continue;
            }

            let group = &mut self.groups[index];
            if let Some(task) = ctx.tasks.add_attack_task(target, group, &mut *ctx.engine) {
                tracing::info!("{} attacks {} (threat {:.1})", key, target, danger);
                report.assignments.push(Assignment {
                    group: key,
                    kind: AssignmentKind::Attack,
                    target: Some(target),
                    task,
                    threat: danger,
                });
            }
            break;
        }
    }

    /// Nothing to attack: back up a random running attack, if any
    fn assist_random(&mut self, key: GroupKey, index: usize, ctx: &mut DecisionContext<'_>, report: &mut TickReport) {
        let active = ctx.tasks.active_attack_tasks();
        if active.is_empty() {
            tracing::debug!("{} idle: no targets and no attacks to assist", key);
            return;
        }
        let pick = active[self.rng.gen_range(0..active.len())];
        let group = &mut self.groups[index];
        if ctx.tasks.add_assist_task(pick.id, group, &mut *ctx.engine) {
            tracing::info!("{} assists {} on {}", key, pick.group, pick.target);
            report.assignments.push(Assignment {
                group: key,
                kind: AssignmentKind::Assist,
                target: Some(pick.target),
                task: pick.id,
                threat: 0.0,
            });
        }
    }

    fn wish(
        &self,
        ctx: &mut DecisionContext<'_>,
        categories: UnitCategory,
        priority: Priority,
        report: &mut TickReport,
    ) {
        ctx.wishlist.push(categories, priority);
        report.production.push(ProductionRequest { categories, priority });
    }

    pub fn group(&self, key: GroupKey) -> Option<&Group> {
        self.lookup.get(&key).map(|&index| &self.groups[index])
    }

    pub fn group_mut(&mut self, key: GroupKey) -> Option<&mut Group> {
        let index = *self.lookup.get(&key)?;
        self.groups.get_mut(index)
    }

    /// Pool slot a live group occupies
    pub fn slot_of(&self, key: GroupKey) -> Option<usize> {
        self.lookup.get(&key).copied()
    }

    /// Keys of every live group, ascending
    pub fn keys(&self) -> Vec<GroupKey> {
        let mut keys: Vec<GroupKey> = self.lookup.keys().copied().collect();
        keys.sort();
        keys
    }

    pub fn scout_groups(&self) -> impl Iterator<Item = GroupKey> + '_ {
        self.scouts.iter().copied()
    }

    pub fn engage_groups(&self) -> impl Iterator<Item = GroupKey> + '_ {
        self.engaged.iter().copied()
    }

    /// Group collecting reinforcements from `source`
    pub fn current_group_for(&self, source: Option<UnitId>) -> Option<GroupKey> {
        self.current.get(&source).copied()
    }

    pub fn is_current(&self, key: GroupKey) -> bool {
        self.current.values().any(|current| *current == key)
    }

    /// Slots ever allocated
    pub fn pool_len(&self) -> usize {
        self.groups.len()
    }

    pub fn free_slots(&self) -> usize {
        self.free.len()
    }

    pub fn len(&self) -> usize {
        self.lookup.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lookup.is_empty()
    }

    pub fn roster(&self) -> &UnitRoster {
        &self.roster
    }
}

fn is_available(group: &Group) -> bool {
    !group.is_busy() && !group.is_microing() && !group.is_empty()
}

fn pair_mut(groups: &mut [Group], a: usize, b: usize) -> (&mut Group, &mut Group) {
    if a < b {
        let (left, right) = groups.split_at_mut(b);
        (&mut left[a], &mut right[0])
    } else {
        let (left, right) = groups.split_at_mut(a);
        (&mut right[0], &mut left[b])
    }
}
