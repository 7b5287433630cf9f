//! Core type definitions used throughout the codebase

use std::sync::atomic::{AtomicU32, Ordering};

use derive_more::Display;
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Engine-assigned identifier for a unit (friendly or hostile)
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[display(fmt = "unit#{}", _0)]
pub struct UnitId(pub u32);

/// Unique key of a group
///
/// Keys are drawn from a process-wide counter and only ever increase, so a
/// recycled pool slot never comes back under a key somebody might still hold.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[display(fmt = "group#{}", _0)]
pub struct GroupKey(pub u32);

static NEXT_GROUP_KEY: AtomicU32 = AtomicU32::new(1);

impl GroupKey {
    /// Draw the next key from the global counter
    pub fn next() -> Self {
        Self(NEXT_GROUP_KEY.fetch_add(1, Ordering::Relaxed))
    }
}

/// Game tick counter (simulation frame)
pub type Tick = u64;

/// Sentinel returned for positions that cannot be determined
pub const ERR_POSITION: Vec3 = Vec3::new(-1.0, 0.0, 0.0);

/// Footprint units (engine squares) to world units
pub const FOOTPRINT_TO_WORLD: f32 = 8.0;

/// Distance on the ground plane, ignoring height
#[inline]
pub fn distance_2d(a: Vec3, b: Vec3) -> f32 {
    let dx = a.x - b.x;
    let dz = a.z - b.z;
    (dx * dx + dz * dz).sqrt()
}

/// True when `pos` is the error sentinel
#[inline]
pub fn is_err_position(pos: Vec3) -> bool {
    pos == ERR_POSITION
}

/// Priority of a production request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Priority {
    Low,
    Normal,
    High,
}
