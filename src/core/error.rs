use thiserror::Error;

use crate::core::types::GroupKey;

#[derive(Error, Debug)]
pub enum WarbandError {
    #[error("Group not found: {0}")]
    GroupNotFound(GroupKey),

    #[error("Groups cannot be merged: {0} into {1}")]
    IncompatibleMerge(GroupKey, GroupKey),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, WarbandError>;
