//! Simulation error types.

use thiserror::Error;

/// Errors surfaced by configuration parsing and by stepping the simulation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimError {
    /// A selector name (scheme, scene, view, solver) that is not recognised.
    #[error("unknown {kind} `{value}`")]
    UnknownSelection { kind: &'static str, value: String },

    /// Configuration values that cannot drive a stable simulation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Per-step input that would poison the fields.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl SimError {
    pub(crate) fn unknown(kind: &'static str, value: &str) -> Self {
        SimError::UnknownSelection {
            kind,
            value: value.to_string(),
        }
    }
}
