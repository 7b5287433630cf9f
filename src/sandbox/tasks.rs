//! Attack/assist bookkeeping for the sandbox

use std::collections::BTreeMap;

use serde::Serialize;

use crate::core::types::{GroupKey, Tick, UnitId};
use crate::engine::{AttackTaskInfo, Engine, GameView, GroupObserver, TaskId, TaskTracker};
use crate::military::group::Group;
use crate::military::registry::GroupRegistry;

#[derive(Debug, Clone, Serialize)]
pub struct AttackTask {
    pub id: TaskId,
    pub target: UnitId,
    pub group: GroupKey,
    /// Member the assisting groups guard
    pub leader: Option<UnitId>,
    pub assisting: Vec<GroupKey>,
    pub created: Tick,
}

/// Task tracker and group observer in one
#[derive(Debug, Default)]
pub struct TaskBoard {
    next_id: u32,
    attacks: BTreeMap<TaskId, AttackTask>,
    completed: usize,
}

impl TaskBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn task(&self, id: TaskId) -> Option<&AttackTask> {
        self.attacks.get(&id)
    }

    pub fn tasks(&self) -> impl Iterator<Item = &AttackTask> {
        self.attacks.values()
    }

    pub fn len(&self) -> usize {
        self.attacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attacks.is_empty()
    }

    /// Tasks finished so far
    pub fn completed(&self) -> usize {
        self.completed
    }

    /// Task the group is attacking with or assisting, if any
    pub fn task_of(&self, group: GroupKey) -> Option<TaskId> {
        self.attacks
            .values()
            .find(|task| task.group == group || task.assisting.contains(&group))
            .map(|task| task.id)
    }

    /// Close a task and release its groups
    pub fn complete_task(&mut self, id: TaskId, registry: &mut GroupRegistry) -> bool {
        let Some(task) = self.attacks.remove(&id) else {
            return false;
        };
        for key in std::iter::once(task.group).chain(task.assisting.iter().copied()) {
            if let Some(group) = registry.group_mut(key) {
                group.set_busy(false);
            }
        }
        self.completed += 1;
        tracing::debug!("{} on {} complete", id, task.target);
        true
    }

    /// Complete tasks whose target is gone, then release busy groups that no
    /// task references anymore
    pub fn sweep<V: GameView + ?Sized>(&mut self, view: &V, registry: &mut GroupRegistry) -> Vec<TaskId> {
        let finished: Vec<TaskId> = self
            .attacks
            .values()
            .filter(|task| view.position(task.target).is_none())
            .map(|task| task.id)
            .collect();
        for id in &finished {
            self.complete_task(*id, registry);
        }

        for key in registry.keys() {
            if self.task_of(key).is_some() {
                continue;
            }
            if let Some(group) = registry.group_mut(key) {
                if group.is_busy() {
                    group.set_busy(false);
                }
            }
        }
        finished
    }
}

impl TaskTracker for TaskBoard {
    fn active_attack_tasks(&self) -> Vec<AttackTaskInfo> {
        self.attacks
            .values()
            .map(|task| AttackTaskInfo {
                id: task.id,
                target: task.target,
                group: task.group,
            })
            .collect()
    }

    fn add_attack_task(&mut self, target: UnitId, group: &mut Group, engine: &mut dyn Engine) -> Option<TaskId> {
        if group.is_empty() {
            return None;
        }
        self.next_id += 1;
        let id = TaskId(self.next_id);
        group.attack(target, false, engine);
        self.attacks.insert(
            id,
            AttackTask {
                id,
                target,
                group: group.key(),
                leader: group.leader(),
                assisting: Vec::new(),
                created: engine.frame(),
            },
        );
        tracing::debug!("{}: {} attacks {}", id, group.key(), target);
        Some(id)
    }

    fn add_assist_task(&mut self, task: TaskId, group: &mut Group, engine: &mut dyn Engine) -> bool {
        let Some(attack) = self.attacks.get_mut(&task) else {
            return false;
        };
        if group.is_empty() || attack.group == group.key() {
            return false;
        }
        match attack.leader {
            Some(leader) => group.assist(leader, engine),
            None => group.attack(attack.target, false, engine),
        }
        attack.assisting.push(group.key());
        tracing::debug!("{}: {} assists {}", task, group.key(), attack.group);
        true
    }
}

impl GroupObserver for TaskBoard {
    fn on_group_removed(&mut self, key: GroupKey) {
        let before = self.attacks.len();
        self.attacks.retain(|_, task| task.group != key);
        for task in self.attacks.values_mut() {
            task.assisting.retain(|other| *other != key);
        }
        let dropped = before - self.attacks.len();
        if dropped > 0 {
            tracing::debug!("Dropped {} task(s) of removed {}", dropped, key);
        }
    }
}
