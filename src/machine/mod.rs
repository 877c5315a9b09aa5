//! The machine aggregate and the event-firing protocol.
//!
//! A [`Machine`] is built once per (owning type, attribute) pair and
//! shared read-only across every instance it drives. It owns the state
//! graph, the event registry, the machine-level callback chain, the
//! initial-state resolver, and the collaborator adapters. Firing and
//! resolution live in their own submodules; this module carries the
//! aggregate and its introspection surface.

mod adapters;
mod error;
mod executor;
mod resolver;

pub use adapters::{
    FieldAccessor, FnRecorder, HistoryRecorder, PersistenceAction, StateAccessor,
};
pub use error::MachineError;
pub use resolver::TransitionRequirements;

use crate::builder::MachineBuilder;
use crate::core::{CallbackChain, EventRegistry, StateDef, StateGraph, StateValue};
use std::fmt;
use std::sync::Arc;

/// How the initial state is resolved for an object whose attribute is
/// unset.
pub enum InitialState<T> {
    /// A fixed state name.
    Static(String),
    /// A per-object function yielding a state name.
    Dynamic(Arc<dyn Fn(&T) -> String + Send + Sync>),
}

impl<T> Clone for InitialState<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Static(name) => Self::Static(name.clone()),
            Self::Dynamic(resolver) => Self::Dynamic(Arc::clone(resolver)),
        }
    }
}

impl<T> fmt::Debug for InitialState<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(name) => f.debug_tuple("Static").field(name).finish(),
            Self::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

/// A finite-state machine driving one attribute of an owning type.
///
/// Configuration is immutable after build and safe to share across
/// threads; per-object state is owned by each object, and the engine
/// assumes single-writer-per-object discipline from the caller.
pub struct Machine<T> {
    pub(crate) attribute: String,
    pub(crate) states: StateGraph<T>,
    pub(crate) events: EventRegistry<T>,
    pub(crate) callbacks: CallbackChain<T>,
    pub(crate) initial: Option<InitialState<T>>,
    pub(crate) accessor: Arc<dyn StateAccessor<T>>,
    pub(crate) action: Option<Arc<dyn PersistenceAction<T>>>,
    pub(crate) recorder: Option<Arc<dyn HistoryRecorder<T>>>,
}

impl<T> Machine<T> {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn assemble(
        attribute: String,
        states: StateGraph<T>,
        events: EventRegistry<T>,
        callbacks: CallbackChain<T>,
        initial: Option<InitialState<T>>,
        accessor: Arc<dyn StateAccessor<T>>,
        action: Option<Arc<dyn PersistenceAction<T>>>,
        recorder: Option<Arc<dyn HistoryRecorder<T>>>,
    ) -> Self {
        Self {
            attribute,
            states,
            events,
            callbacks,
            initial,
            accessor,
            action,
            recorder,
        }
    }

    /// Name of the attribute this machine manages.
    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    pub fn states(&self) -> &StateGraph<T> {
        &self.states
    }

    pub fn events(&self) -> &EventRegistry<T> {
        &self.events
    }

    pub fn callbacks(&self) -> &CallbackChain<T> {
        &self.callbacks
    }

    /// The raw attribute value, `None` when unset.
    pub fn current_value(&self, object: &T) -> Option<StateValue> {
        self.accessor.get(object)
    }

    /// Resolve the object's current state definition.
    ///
    /// Errors with `NoInitialState` when the attribute is unset and with
    /// `UnknownState` when the stored value maps to no registered state.
    pub fn current_state(&self, object: &T) -> Result<&StateDef<T>, MachineError> {
        let value = self
            .accessor
            .get(object)
            .ok_or_else(|| MachineError::NoInitialState {
                attribute: self.attribute.clone(),
            })?;
        self.states
            .state_for_value(&value)
            .ok_or_else(|| MachineError::UnknownState {
                name: value.to_string(),
            })
    }

    /// Name of the object's current state.
    pub fn current_state_name(&self, object: &T) -> Result<&str, MachineError> {
        self.current_state(object).map(StateDef::name)
    }

    /// Human-readable label of the object's current state.
    pub fn human_state_name(&self, object: &T) -> Result<&str, MachineError> {
        self.current_state(object).map(StateDef::human_name)
    }

    /// Whether the object currently sits in the named state.
    ///
    /// Errors with `UnknownState` when the name is not registered, so a
    /// misspelled query never silently reads as `false`.
    pub fn is_state(&self, object: &T, name: &str) -> Result<bool, MachineError> {
        if !self.states.contains(name) {
            return Err(MachineError::UnknownState {
                name: name.to_string(),
            });
        }
        Ok(self.current_state_name(object)? == name)
    }

    /// Human-readable label of a registered event.
    pub fn human_event_name(&self, event: &str) -> Result<&str, MachineError> {
        self.events
            .get(event)
            .map(|def| def.human_name())
            .ok_or_else(|| MachineError::UnknownEvent {
                name: event.to_string(),
            })
    }

    /// Start a builder seeded with a deep copy of this machine's
    /// configuration, for layering additional states and events.
    ///
    /// Callback lists are shared by reference between the copies until
    /// one side registers more.
    pub fn extend(&self) -> MachineBuilder<T> {
        MachineBuilder::from_machine(self)
    }

    pub(crate) fn initial(&self) -> Option<&InitialState<T>> {
        self.initial.as_ref()
    }

    pub(crate) fn write_value(&self, object: &mut T, value: StateValue) {
        self.accessor.set(object, value);
    }
}

impl<T> Clone for Machine<T> {
    fn clone(&self) -> Self {
        Self {
            attribute: self.attribute.clone(),
            states: self.states.clone(),
            events: self.events.clone(),
            callbacks: self.callbacks.clone(),
            initial: self.initial.clone(),
            accessor: Arc::clone(&self.accessor),
            action: self.action.clone(),
            recorder: self.recorder.clone(),
        }
    }
}

impl<T> fmt::Debug for Machine<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Machine")
            .field("attribute", &self.attribute)
            .field("states", &self.states.len())
            .field("events", &self.events.len())
            .field("callbacks", &self.callbacks.len())
            .finish_non_exhaustive()
    }
}
