//! Target selection parameters and candidate lists

use ahash::AHashSet;

use crate::core::types::UnitId;
use crate::engine::{Intel, TargetClass, TaskTracker};
use crate::units::UnitCategory;

/// Parameters for `Group::select_target`
///
/// `best_target` and `threat_value` are outputs, written back after a
/// selection.
#[derive(Debug, Clone)]
pub struct TargetsFilter {
    /// Candidates must carry at least one of these flags (`all()` = any)
    pub include: UnitCategory,
    /// Candidates carrying any of these flags are rejected
    pub exclude: UnitCategory,
    /// Stop after evaluating this many candidates
    pub candidates_limit: usize,
    /// Radius over which threat is measured at a candidate
    pub threat_radius: f32,
    /// Candidates measuring more threat than this are rejected
    pub threat_ceiling: f32,
    /// Candidates scoring above this are rejected
    pub score_ceiling: f32,
    /// Weight of threat against distance in the score
    pub threat_factor: f32,
    pub best_target: Option<UnitId>,
    pub threat_value: f32,
}

impl Default for TargetsFilter {
    fn default() -> Self {
        Self {
            include: UnitCategory::all(),
            exclude: UnitCategory::empty(),
            candidates_limit: usize::MAX,
            threat_radius: 0.0,
            threat_ceiling: f32::MAX,
            score_ceiling: f32::MAX,
            threat_factor: 1.0,
            best_target: None,
            threat_value: 0.0,
        }
    }
}

impl TargetsFilter {
    /// True if a candidate with `categories` passes the include/exclude masks
    pub fn accepts(&self, categories: UnitCategory) -> bool {
        if categories.intersects(self.exclude) {
            return false;
        }
        self.include.is_all() || categories.intersects(self.include)
    }
}

/// Intel classes making up the full candidate list, in order
pub const ALL_TARGET_CLASSES: [TargetClass; 6] = [
    TargetClass::EnergyMakers,
    TargetClass::Factories,
    TargetClass::Attackers,
    TargetClass::Rest,
    TargetClass::MobileBuilders,
    TargetClass::MetalMakers,
];

/// Economic classes preferred for scout harassment, in order
pub const HARASS_TARGET_CLASSES: [TargetClass; 4] = [
    TargetClass::MetalMakers,
    TargetClass::MobileBuilders,
    TargetClass::EnergyMakers,
    TargetClass::Factories,
];

/// Unoccupied candidates for one decision pass
#[derive(Debug, Default, Clone)]
pub struct TargetLists {
    pub all: Vec<UnitId>,
    pub harassable: Vec<UnitId>,
    /// Targets already under an active attack task
    pub occupied: AHashSet<UnitId>,
}

impl TargetLists {
    /// Collect candidates from intel, leaving out targets already attacked
    pub fn prepare(intel: &dyn Intel, tasks: &dyn TaskTracker) -> Self {
        let occupied: AHashSet<UnitId> = tasks
            .active_attack_tasks()
            .into_iter()
            .map(|task| task.target)
            .collect();

        let collect = |classes: &[TargetClass]| -> Vec<UnitId> {
            classes
                .iter()
                .flat_map(|&class| intel.targets(class).iter().copied())
                .filter(|target| !occupied.contains(target))
                .collect()
        };

        let all = collect(&ALL_TARGET_CLASSES);
        let harassable = collect(&HARASS_TARGET_CLASSES);

        Self {
            all,
            harassable,
            occupied,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.all.is_empty() && self.harassable.is_empty()
    }
}
