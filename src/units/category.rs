//! Unit category flags and movement domains

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Role, chassis and tier flags of a unit type
    pub struct UnitCategory: u64 {
        const TECH1 = 1 << 0;
        const TECH2 = 1 << 1;
        const TECH3 = 1 << 2;

        const AIR = 1 << 3;
        const SEA = 1 << 4;
        const LAND = 1 << 5;
        const SUB = 1 << 6;

        const STATIC = 1 << 7;
        const MOBILE = 1 << 8;

        const FACTORY = 1 << 9;
        const BUILDER = 1 << 10;
        const ASSISTER = 1 << 11;
        const COMMANDER = 1 << 12;
        const ATTACKER = 1 << 13;
        const ANTIAIR = 1 << 14;
        const SCOUTER = 1 << 15;
        const ARTILLERY = 1 << 16;
        const SNIPER = 1 << 17;
        const ASSAULT = 1 << 18;
        const TORPEDO = 1 << 19;

        const MEXTRACTOR = 1 << 20;
        const MMAKER = 1 << 21;
        const EMAKER = 1 << 22;

        const KBOT = 1 << 23;
        const VEHICLE = 1 << 24;
        const HOVER = 1 << 25;
        const AIRCRAFT = 1 << 26;
        const NAVAL = 1 << 27;

        const TECH = Self::TECH1.bits | Self::TECH2.bits | Self::TECH3.bits;
        const NAVAL_ONLY = Self::SEA.bits | Self::SUB.bits;
        const ECONOMIC = Self::MEXTRACTOR.bits | Self::MMAKER.bits | Self::EMAKER.bits
            | Self::FACTORY.bits | Self::BUILDER.bits;
        const ARMED = Self::ATTACKER.bits | Self::ANTIAIR.bits | Self::ARTILLERY.bits
            | Self::SNIPER.bits | Self::ASSAULT.bits | Self::TORPEDO.bits | Self::COMMANDER.bits;
    }
}

impl UnitCategory {
    /// Tech tier encoded in the flags (1 when no tier flag is set)
    pub fn tech_level(self) -> u8 {
        if self.contains(Self::TECH3) {
            3
        } else if self.contains(Self::TECH2) {
            2
        } else {
            1
        }
    }

    /// Confined to water: sea or sub without a hover chassis
    pub fn is_water_only(self) -> bool {
        self.intersects(Self::NAVAL_ONLY) && !self.contains(Self::HOVER)
    }

    pub fn is_builder(self) -> bool {
        self.contains(Self::BUILDER)
    }
}

impl Default for UnitCategory {
    fn default() -> Self {
        Self::empty()
    }
}

/// Serde adapter storing category flags as their raw bits
pub mod category_bits {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::UnitCategory;

    pub fn serialize<S: Serializer>(categories: &UnitCategory, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(categories.bits())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<UnitCategory, D::Error> {
        let bits = u64::deserialize(deserializer)?;
        Ok(UnitCategory::from_bits_truncate(bits))
    }
}

/// Movement domain a unit lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MovementDomain {
    Air,
    Surface,
    Underwater,
}

impl MovementDomain {
    pub const ALL: [MovementDomain; 3] = [Self::Air, Self::Surface, Self::Underwater];

    /// Domain of a unit with the given categories
    pub fn of(categories: UnitCategory) -> Self {
        if categories.contains(UnitCategory::AIR) {
            Self::Air
        } else if categories.contains(UnitCategory::SUB) {
            Self::Underwater
        } else {
            Self::Surface
        }
    }

    pub fn index(self) -> usize {
        match self {
            Self::Air => 0,
            Self::Surface => 1,
            Self::Underwater => 2,
        }
    }

    pub fn mask(self) -> DomainMask {
        match self {
            Self::Air => DomainMask::AIR,
            Self::Surface => DomainMask::SURFACE,
            Self::Underwater => DomainMask::UNDERWATER,
        }
    }
}

bitflags! {
    /// Set of movement domains, e.g. the domains a weapon can reach
    pub struct DomainMask: u8 {
        const AIR = 1 << 0;
        const SURFACE = 1 << 1;
        const UNDERWATER = 1 << 2;
    }
}

impl DomainMask {
    /// Domains reached by the weapons of a unit with the given categories
    pub fn reached_by(categories: UnitCategory) -> Self {
        let mut mask = Self::empty();
        if categories.contains(UnitCategory::ANTIAIR) {
            mask |= Self::AIR;
        }
        if categories.contains(UnitCategory::TORPEDO) {
            mask |= Self::UNDERWATER;
        }
        if categories.intersects(
            UnitCategory::ATTACKER
                | UnitCategory::ARTILLERY
                | UnitCategory::SNIPER
                | UnitCategory::ASSAULT
                | UnitCategory::COMMANDER,
        ) {
            mask |= Self::SURFACE;
        }
        mask
    }

    pub fn domains(self) -> impl Iterator<Item = MovementDomain> {
        MovementDomain::ALL
            .into_iter()
            .filter(move |d| self.contains(d.mask()))
    }
}
