//! Engine-facing entry point of the military layer
//!
//! Wires the threat field and the group registry together and times both
//! halves of every decision pass.

use std::cell::RefCell;
use std::rc::Rc;

use crate::core::config::MilitaryConfig;
use crate::core::error::Result;
use crate::core::profiling::Profiler;
use crate::core::types::{GroupKey, Tick, UnitId};
use crate::engine::{DecisionContext, GroupObserver};
use crate::military::registry::GroupRegistry;
use crate::military::report::TickReport;
use crate::threat::ThreatField;
use crate::units::Unit;

pub struct MilitaryAi {
    threat: ThreatField,
    registry: GroupRegistry,
    profiler: Profiler,
}

impl MilitaryAi {
    /// Build for a map of `map_width` x `map_depth` world units
    pub fn new(config: MilitaryConfig, map_width: f32, map_depth: f32) -> Result<Self> {
        config.validate()?;
        tracing::info!(
            "Military AI '{}' on {}x{} map (seed {})",
            config.name,
            map_width,
            map_depth,
            config.seed
        );
        Ok(Self {
            threat: ThreatField::new(map_width, map_depth, &config.threat),
            registry: GroupRegistry::new(config),
            profiler: Profiler::new(),
        })
    }

    /// Build from a profile under `data/military/`
    pub fn from_profile(name: &str, map_width: f32, map_depth: f32) -> Result<Self> {
        Self::new(MilitaryConfig::load_named(name)?, map_width, map_depth)
    }

    pub fn add_observer(&mut self, observer: Rc<RefCell<dyn GroupObserver>>) {
        self.registry.add_observer(observer);
    }

    /// A friendly unit finished construction
    pub fn unit_created(&mut self, unit: Unit) -> Option<GroupKey> {
        self.registry.add_unit(unit)
    }

    /// A friendly unit died
    pub fn unit_destroyed(&mut self, id: UnitId) {
        self.registry.unit_destroyed(id);
    }

    /// Refresh the threat field if due, then run the decision pass
    pub fn update(&mut self, tick: Tick, ctx: &mut DecisionContext<'_>) -> TickReport {
        {
            let _timer = self.profiler.scope("threat");
            self.threat.update(tick, &*ctx.engine);
        }
        let _timer = self.profiler.scope("military");
        self.registry.update(tick, &self.threat, ctx)
    }

    pub fn config(&self) -> &MilitaryConfig {
        self.registry.config()
    }

    pub fn threat(&self) -> &ThreatField {
        &self.threat
    }

    pub fn registry(&self) -> &GroupRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut GroupRegistry {
        &mut self.registry
    }

    pub fn profiler(&self) -> &Profiler {
        &self.profiler
    }
}
