//! Unit metadata, categories and the friendly unit roster

pub mod category;
pub mod roster;
pub mod unit_type;

pub use category::{DomainMask, MovementDomain, UnitCategory};
pub use roster::{Unit, UnitRoster};
pub use unit_type::{MoveType, UnitType};
