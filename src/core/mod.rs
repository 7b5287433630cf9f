pub mod config;
pub mod error;
pub mod profiling;
pub mod types;

pub use config::MilitaryConfig;
pub use error::{Result, WarbandError};
pub use types::{GroupKey, Priority, Tick, UnitId};
