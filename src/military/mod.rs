//! Military decision layer: groups, target lists and the group registry

pub mod group;
pub mod registry;
pub mod report;
pub mod targets;

pub use group::{Group, GroupStats};
pub use registry::{GroupKind, GroupRegistry};
pub use report::{Assignment, AssignmentKind, ProductionRequest, TickReport};
pub use targets::{TargetLists, TargetsFilter};
