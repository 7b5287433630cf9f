//! Military configuration loaded from TOML
//!
//! All tunable thresholds of the decision layer live here. Every section is
//! optional in the file; missing values fall back to the defaults below.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::error::{Result, WarbandError};

/// Group formation thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupConfig {
    /// Minimum members before a "current" group may commit to an attack,
    /// indexed by tech tier (tier 1 first)
    ///
    /// Tiers past the end of the list use the last entry.
    pub min_size: Vec<usize>,
}

impl Default for GroupConfig {
    fn default() -> Self {
        Self {
            min_size: vec![3, 4, 5],
        }
    }
}

/// Scouting behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoutConfig {
    /// Below this many active scout groups a high priority scout is requested
    pub min_count: usize,
    /// Radius over which threat is measured when ranking scout targets
    pub harass_radius: f32,
    /// Threat weight in the scout ranking score
    ///
    /// Large enough that scouts pick the least defended target almost
    /// regardless of distance.
    pub threat_factor: f32,
}

impl Default for ScoutConfig {
    fn default() -> Self {
        Self {
            min_count: 2,
            harass_radius: 300.0,
            threat_factor: 10000.0,
        }
    }
}

/// Engagement group behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngageConfig {
    /// Threat weight in the engagement ranking score (1.0 = distance and
    /// threat traded evenly)
    pub threat_factor: f32,
}

impl Default for EngageConfig {
    fn default() -> Self {
        Self { threat_factor: 1.0 }
    }
}

/// Threat field layout and refresh cadence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreatConfig {
    /// Cell edge length in world units
    pub resolution: f32,
    /// Ticks between full rebuilds
    pub refresh_interval: u64,
    /// Gaussian sigma as a fraction of a hostile's weapon range
    pub spread: f32,
    /// Lower bound for the gaussian sigma in world units
    pub min_sigma: f32,
}

impl Default for ThreatConfig {
    fn default() -> Self {
        Self {
            resolution: 64.0,
            refresh_interval: 15,
            spread: 0.5,
            min_sigma: 32.0,
        }
    }
}

/// Complete military configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MilitaryConfig {
    /// Name of this profile (set from filename when loaded by name)
    #[serde(default)]
    pub name: String,
    /// Seed for roulette and assist selection
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default)]
    pub groups: GroupConfig,
    #[serde(default)]
    pub scouts: ScoutConfig,
    #[serde(default)]
    pub engage: EngageConfig,
    #[serde(default)]
    pub threat: ThreatConfig,
}

fn default_seed() -> u64 {
    42
}

impl Default for MilitaryConfig {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            seed: default_seed(),
            groups: GroupConfig::default(),
            scouts: ScoutConfig::default(),
            engage: EngageConfig::default(),
            threat: ThreatConfig::default(),
        }
    }
}

impl MilitaryConfig {
    /// Minimum group size for a group of the given tech tier
    pub fn min_group_size(&self, tech_level: u8) -> usize {
        let idx = (tech_level.max(1) - 1) as usize;
        self.groups
            .min_size
            .get(idx)
            .or_else(|| self.groups.min_size.last())
            .copied()
            .unwrap_or(1)
    }

    /// Minimum number of active scout groups
    pub fn min_scouts(&self) -> usize {
        self.scouts.min_count
    }

    /// Parse a config from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: MilitaryConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        let mut config = Self::from_toml_str(&contents)?;
        if config.name.is_empty() {
            config.name = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
        }
        Ok(config)
    }

    /// Load a named profile from `data/military/{name}.toml`
    pub fn load_named(name: &str) -> Result<Self> {
        let mut config = Self::load(profile_path(name))?;
        config.name = name.to_string();
        Ok(config)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.groups.min_size.is_empty() {
            return Err(WarbandError::InvalidConfig(
                "groups.min_size must list at least one tier".into(),
            ));
        }
        if self.groups.min_size.iter().any(|&n| n == 0) {
            return Err(WarbandError::InvalidConfig(
                "groups.min_size entries must be at least 1".into(),
            ));
        }
        if self.threat.resolution <= 0.0 {
            return Err(WarbandError::InvalidConfig(format!(
                "threat.resolution ({}) must be positive",
                self.threat.resolution
            )));
        }
        if self.threat.refresh_interval == 0 {
            return Err(WarbandError::InvalidConfig(
                "threat.refresh_interval must be at least 1".into(),
            ));
        }
        if self.threat.spread <= 0.0 || self.threat.min_sigma <= 0.0 {
            return Err(WarbandError::InvalidConfig(
                "threat.spread and threat.min_sigma must be positive".into(),
            ));
        }
        if self.scouts.threat_factor < 0.0 || self.engage.threat_factor < 0.0 {
            return Err(WarbandError::InvalidConfig("threat factors must not be negative".into()));
        }
        Ok(())
    }
}

fn profile_path(name: &str) -> PathBuf {
    PathBuf::from("data/military").join(format!("{}.toml", name))
}
