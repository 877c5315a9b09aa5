//! Machine-level callback chain with phase and filter semantics.
//!
//! Callbacks are registered with a phase (before/after/failure) and an
//! optional from/to/on filter. Before-callbacks may halt the whole
//! transition by returning `false`; after- and failure-callback return
//! values are ignored.

use super::transition::ActiveTransition;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// Non-halting callback invocable; return values are not consulted.
/// Used by the four state-level slots and event-level after callbacks.
pub type HookFn<T> = Arc<dyn Fn(&mut T, &ActiveTransition) + Send + Sync>;

/// Halting-capable callback invocable used by the machine-level chain.
/// Only the before phase consults the returned value.
pub type CallbackFn<T> = Arc<dyn Fn(&mut T, &ActiveTransition) -> bool + Send + Sync>;

/// Point in the firing protocol at which a callback runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallbackPhase {
    /// Before the attribute mutation; a `false` return halts the fire.
    Before,
    /// After the mutation and persistence action succeeded.
    After,
    /// When resolution found nothing, a before-callback halted, or the
    /// persistence action failed.
    Failure,
}

/// Inclusion filter deciding whether a callback applies to a transition.
///
/// Each component is a set matched by inclusion; an absent component
/// matches everything. Filters are pure: a non-matching callback is
/// skipped silently.
///
/// # Example
///
/// ```rust
/// use statecraft::core::{ActiveTransition, CallbackFilter};
///
/// let filter = CallbackFilter::any()
///     .from_states(["parked"])
///     .on_events(["ignite"]);
///
/// let ignite = ActiveTransition::new("state", "ignite", "parked", "idling", Vec::new());
/// let park = ActiveTransition::new("state", "park", "idling", "parked", Vec::new());
///
/// assert!(filter.matches(&ignite));
/// assert!(!filter.matches(&park));
/// ```
#[derive(Clone, Debug, Default)]
pub struct CallbackFilter {
    pub(crate) from: Option<HashSet<String>>,
    pub(crate) to: Option<HashSet<String>>,
    pub(crate) on: Option<HashSet<String>>,
}

impl CallbackFilter {
    /// A filter that matches every transition.
    pub fn any() -> Self {
        Self::default()
    }

    /// Restrict to transitions leaving one of these states.
    pub fn from_states<I, S>(mut self, states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.from = Some(states.into_iter().map(Into::into).collect());
        self
    }

    /// Restrict to transitions entering one of these states.
    pub fn to_states<I, S>(mut self, states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.to = Some(states.into_iter().map(Into::into).collect());
        self
    }

    /// Restrict to transitions fired by one of these events.
    pub fn on_events<I, S>(mut self, events: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.on = Some(events.into_iter().map(Into::into).collect());
        self
    }

    /// Whether this filter admits the given transition instance.
    ///
    /// A `from` or `on` component never matches the initial-state
    /// assignment (which has no origin and no event).
    pub fn matches(&self, transition: &ActiveTransition) -> bool {
        if let Some(from) = &self.from {
            match &transition.from {
                Some(state) if from.contains(state) => {}
                _ => return false,
            }
        }
        if let Some(to) = &self.to {
            if !to.contains(&transition.to) {
                return false;
            }
        }
        if let Some(on) = &self.on {
            match &transition.event {
                Some(event) if on.contains(event) => {}
                _ => return false,
            }
        }
        true
    }

    pub(crate) fn referenced_states(&self) -> Vec<&str> {
        let mut names = Vec::new();
        if let Some(from) = &self.from {
            names.extend(from.iter().map(String::as_str));
        }
        if let Some(to) = &self.to {
            names.extend(to.iter().map(String::as_str));
        }
        names
    }

    pub(crate) fn referenced_events(&self) -> Vec<&str> {
        match &self.on {
            Some(on) => on.iter().map(String::as_str).collect(),
            None => Vec::new(),
        }
    }
}

/// A single registered callback: phase, filter, and the invocable.
pub struct Callback<T> {
    pub(crate) phase: CallbackPhase,
    pub(crate) filter: CallbackFilter,
    pub(crate) action: CallbackFn<T>,
}

impl<T> Callback<T> {
    pub fn phase(&self) -> CallbackPhase {
        self.phase
    }

    pub fn filter(&self) -> &CallbackFilter {
        &self.filter
    }
}

impl<T> Clone for Callback<T> {
    fn clone(&self) -> Self {
        Self {
            phase: self.phase,
            filter: self.filter.clone(),
            action: Arc::clone(&self.action),
        }
    }
}

impl<T> fmt::Debug for Callback<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callback")
            .field("phase", &self.phase)
            .field("filter", &self.filter)
            .finish_non_exhaustive()
    }
}

/// Ordered collection of machine-level callbacks.
///
/// Callbacks run in registration order within their phase. The first
/// before-callback returning `false` halts the chain; the transition is
/// then treated as failed with no state mutation. After- and
/// failure-callbacks never halt.
pub struct CallbackChain<T> {
    callbacks: Vec<Callback<T>>,
}

impl<T> CallbackChain<T> {
    pub fn new() -> Self {
        Self {
            callbacks: Vec::new(),
        }
    }

    /// Register a before-callback; returning `false` halts the fire.
    pub fn before<F>(&mut self, filter: CallbackFilter, action: F)
    where
        F: Fn(&mut T, &ActiveTransition) -> bool + Send + Sync + 'static,
    {
        self.callbacks.push(Callback {
            phase: CallbackPhase::Before,
            filter,
            action: Arc::new(action),
        });
    }

    /// Register an after-callback; its return value is ignored.
    pub fn after<F>(&mut self, filter: CallbackFilter, action: F)
    where
        F: Fn(&mut T, &ActiveTransition) + Send + Sync + 'static,
    {
        self.callbacks.push(Callback {
            phase: CallbackPhase::After,
            filter,
            action: Arc::new(move |object, transition| {
                action(object, transition);
                true
            }),
        });
    }

    /// Register a failure-callback; it runs whenever a fire fails and
    /// never blocks.
    pub fn on_failure<F>(&mut self, filter: CallbackFilter, action: F)
    where
        F: Fn(&mut T, &ActiveTransition) + Send + Sync + 'static,
    {
        self.callbacks.push(Callback {
            phase: CallbackPhase::Failure,
            filter,
            action: Arc::new(move |object, transition| {
                action(object, transition);
                true
            }),
        });
    }

    /// Run every matching callback of the phase in registration order.
    ///
    /// Returns `false` only when a before-callback halted the chain; the
    /// remaining before-callbacks are not invoked.
    pub fn run(
        &self,
        phase: CallbackPhase,
        object: &mut T,
        transition: &ActiveTransition,
    ) -> bool {
        for callback in self.callbacks.iter().filter(|c| c.phase == phase) {
            if !callback.filter.matches(transition) {
                continue;
            }
            let outcome = (callback.action)(object, transition);
            if phase == CallbackPhase::Before && !outcome {
                return false;
            }
        }
        true
    }

    /// Run the failure phase; failure-callbacks never halt.
    pub fn run_failure(&self, object: &mut T, transition: &ActiveTransition) {
        self.run(CallbackPhase::Failure, object, transition);
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Callback<T>> {
        self.callbacks.iter()
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }
}

impl<T> Default for CallbackChain<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for CallbackChain<T> {
    fn clone(&self) -> Self {
        Self {
            callbacks: self.callbacks.clone(),
        }
    }
}
