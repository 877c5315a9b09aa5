//! Transition rules and the in-flight transition instance.
//!
//! A [`TransitionRule`] is declarative configuration: a set of origin
//! states mapped to one destination for one event, optionally guarded.
//! An [`ActiveTransition`] is the ephemeral value built per fire attempt
//! and handed to guards and callbacks.

use super::guard::Guard;
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;

/// The origin states a transition rule applies from.
///
/// Membership checks are constant-time for the set-backed variants.
#[derive(Clone, Debug)]
pub enum OriginSet {
    /// Applies from every state.
    Any,
    /// Applies from exactly these states.
    In(HashSet<String>),
    /// Applies from every state except these.
    Except(HashSet<String>),
}

impl OriginSet {
    pub fn contains(&self, state: &str) -> bool {
        match self {
            Self::Any => true,
            Self::In(states) => states.contains(state),
            Self::Except(states) => !states.contains(state),
        }
    }

    /// State names this origin set mentions, for build-time validation.
    pub(crate) fn referenced(&self) -> Vec<&str> {
        match self {
            Self::Any => Vec::new(),
            Self::In(states) | Self::Except(states) => {
                states.iter().map(String::as_str).collect()
            }
        }
    }
}

/// A single guarded rule mapping origin states to one destination.
///
/// Rules are owned by an event and consulted in declaration order; the
/// first rule whose origin set contains the current state and whose guard
/// passes wins.
pub struct TransitionRule<T> {
    origins: OriginSet,
    to: String,
    guard: Option<Guard<T>>,
}

impl<T> TransitionRule<T> {
    pub fn new(origins: OriginSet, to: impl Into<String>) -> Self {
        Self {
            origins,
            to: to.into(),
            guard: None,
        }
    }

    pub fn with_guard(mut self, guard: Guard<T>) -> Self {
        self.guard = Some(guard);
        self
    }

    pub fn origins(&self) -> &OriginSet {
        &self.origins
    }

    pub fn to(&self) -> &str {
        &self.to
    }

    pub fn guard(&self) -> Option<&Guard<T>> {
        self.guard.as_ref()
    }

    /// Whether the guard (if any) admits this prospective transition.
    pub fn guard_passes(&self, object: &T, prospective: &ActiveTransition) -> bool {
        match &self.guard {
            Some(guard) => guard.check(object, prospective),
            None => true,
        }
    }
}

impl<T> Clone for TransitionRule<T> {
    fn clone(&self) -> Self {
        Self {
            origins: self.origins.clone(),
            to: self.to.clone(),
            guard: self.guard.clone(),
        }
    }
}

impl<T> fmt::Debug for TransitionRule<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitionRule")
            .field("origins", &self.origins)
            .field("to", &self.to)
            .field("guarded", &self.guard.is_some())
            .finish()
    }
}

/// The ephemeral value built per fire attempt.
///
/// Owned exclusively by the executor's call stack and handed by reference
/// to guards and callbacks. `event` and `from` are absent for the
/// initial-state assignment; the "no transition applies" pseudo-instance
/// carries `to == from`. Extra fire arguments ride along in `args`.
#[derive(Clone, Debug, PartialEq)]
pub struct ActiveTransition {
    /// Name of the attribute the owning machine manages.
    pub attribute: String,
    /// The fired event, absent for the initial-state assignment.
    pub event: Option<String>,
    /// Origin state, absent for the initial-state assignment.
    pub from: Option<String>,
    /// Destination state.
    pub to: String,
    /// Extra arguments passed at fire time.
    pub args: Vec<Value>,
    /// Set once the mutation and persistence action have succeeded.
    pub success: bool,
}

impl ActiveTransition {
    pub fn new(
        attribute: &str,
        event: &str,
        from: &str,
        to: &str,
        args: Vec<Value>,
    ) -> Self {
        Self {
            attribute: attribute.to_string(),
            event: Some(event.to_string()),
            from: Some(from.to_string()),
            to: to.to_string(),
            args,
            success: false,
        }
    }

    /// Instance for the initial-state assignment: no event, no origin.
    pub fn initial(attribute: &str, to: &str) -> Self {
        Self {
            attribute: attribute.to_string(),
            event: None,
            from: None,
            to: to.to_string(),
            args: Vec::new(),
            success: false,
        }
    }

    /// Pseudo-instance for a fire that resolved to no transition. The
    /// destination mirrors the origin so from/on callback filters match.
    pub fn refused(attribute: &str, event: &str, from: &str, args: Vec<Value>) -> Self {
        Self {
            attribute: attribute.to_string(),
            event: Some(event.to_string()),
            from: Some(from.to_string()),
            to: from.to_string(),
            args,
            success: false,
        }
    }

    /// A loopback keeps the object in its current state and skips all
    /// state-level enter/exit slots.
    pub fn is_loopback(&self) -> bool {
        self.from.as_deref() == Some(self.to.as_str())
    }
}
