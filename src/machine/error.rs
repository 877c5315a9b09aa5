//! Runtime errors surfaced while driving a machine.

use thiserror::Error;

/// Errors that can occur while resolving state or firing events.
///
/// `InvalidTransition` is only produced by the strict fire variants; a
/// fire that finds no applicable transition is an expected `false`
/// outcome, not an error.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MachineError {
    #[error("Unknown event '{name}'")]
    UnknownEvent { name: String },

    #[error("Unknown state '{name}'")]
    UnknownState { name: String },

    #[error("State attribute '{attribute}' is unset; initialize the object or configure an initial state")]
    NoInitialState { attribute: String },

    #[error("Cannot fire '{event}' from state '{state}'")]
    InvalidTransition { event: String, state: String },
}
