//! Spatial estimate of hostile firepower

pub mod field;

pub use field::ThreatField;
