//! Error types for island construction, parameter updates and placement.
//!
//! All three core kinds are deterministic input errors raised at the call
//! that caused them. Once a simulation is running, yearly transitions cannot
//! fail.

use crate::animal::Species;
use thiserror::Error;

/// Malformed or inconsistent island description.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("island map is empty")]
    EmptyMap,

    #[error("row {row} has length {found}, expected {expected}")]
    UnequalRows {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("unknown terrain code '{code}' at ({row}, {col})")]
    UnknownTerrain { row: usize, col: usize, code: char },

    #[error("boundary cell ({row}, {col}) must be water, found '{code}'")]
    NonWaterBoundary { row: usize, col: usize, code: char },

    #[error("invalid year cycle: {0}")]
    InvalidCycle(String),
}

/// Rejected parameter update. The target table is left untouched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParameterError {
    #[error("unknown parameter '{key}' for {table}")]
    UnknownKey { table: String, key: String },

    #[error("parameter '{key}' must be finite and non-negative, got {value}")]
    Negative { key: String, value: f64 },

    #[error("parameter '{key}' must be strictly positive, got {value}")]
    NotPositive { key: String, value: f64 },

    #[error("parameter '{key}' must not exceed 1, got {value}")]
    AboveOne { key: String, value: f64 },

    #[error("unknown species '{0}'")]
    UnknownSpecies(String),

    #[error("unknown terrain code '{0}'")]
    UnknownTerrain(char),

    #[error("terrain '{0}' has no configurable parameters")]
    Immutable(char),
}

/// Rejected population placement. Nothing from the batch is applied.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlacementError {
    #[error("coordinate ({row}, {col}) is outside the island")]
    OutOfRange { row: usize, col: usize },

    #[error("cell ({row}, {col}) is not traversable")]
    NotTraversable { row: usize, col: usize },

    #[error("animal weight must be finite and positive, got {0}")]
    InvalidWeight(f64),

    #[error("no positive birth weight can be drawn for {0}")]
    NoBirthWeight(Species),
}

/// Top-level error for the configuration, facade and CLI layer.
#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Parameter(#[from] ParameterError),

    #[error(transparent)]
    Placement(#[from] PlacementError),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
