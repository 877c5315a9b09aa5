//! Build errors for machine and transition builders.
//!
//! Whole-configuration validation does not stop at the first problem:
//! every violation found at `build()` time is collected and reported in
//! one pass.

use crate::core::StateValue;
use thiserror::Error;

/// Errors that can occur when building machines and transition rules.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("State accessor not specified. Call .accessor(..) before .build()")]
    MissingAccessor,

    #[error("Transition target state not specified. Call .to(state)")]
    MissingToState,

    #[error("Invalid machine configuration ({} violations)", .0.len())]
    Invalid(Vec<ConfigViolation>),
}

/// A single configuration problem found during whole-machine validation.
///
/// Transition rules, callback filters, and the initial-state resolver may
/// only reference registered names; stored values must be unique so the
/// attribute maps back to exactly one state.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigViolation {
    #[error("event '{event}' transitions to unknown state '{state}'")]
    UnknownTargetState { event: String, state: String },

    #[error("event '{event}' transitions from unknown state '{state}'")]
    UnknownOriginState { event: String, state: String },

    #[error("initial state '{state}' is not registered")]
    UnknownInitialState { state: String },

    #[error("states '{first}' and '{second}' share stored value '{value}'")]
    DuplicateStateValue {
        first: String,
        second: String,
        value: StateValue,
    },

    #[error("callback filter references unknown state '{state}'")]
    UnknownFilterState { state: String },

    #[error("callback filter references unknown event '{event}'")]
    UnknownFilterEvent { event: String },
}
