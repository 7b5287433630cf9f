//! Self-contained collaborators for running the military layer offline
//!
//! Used by the skirmish binary, the integration tests and the benches.

pub mod production;
pub mod tasks;
pub mod world;

pub use production::{ProductionQueue, Request};
pub use tasks::{AttackTask, TaskBoard};
pub use world::{classify, IntelSnapshot, IssuedOrder, SandboxWorld, DEFAULT_ROULETTE};
