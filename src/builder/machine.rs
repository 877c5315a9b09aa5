//! Builder for assembling machines.
//!
//! `build()` validates the whole configuration and collects every
//! violation instead of stopping at the first: a misdeclared machine is
//! reported once, completely.

use crate::builder::error::{BuildError, ConfigViolation};
use crate::builder::transition::EventBuilder;
use crate::core::{
    ActiveTransition, CallbackChain, CallbackFilter, EventRegistry, StateDef, StateGraph,
};
use crate::machine::{
    HistoryRecorder, InitialState, Machine, PersistenceAction, StateAccessor,
};
use std::sync::Arc;
use tracing::debug;

/// Builder for constructing machines with a fluent API.
///
/// One machine drives one attribute of one owning type. The accessor is
/// required; the initial state, persistence action, and history recorder
/// are optional.
pub struct MachineBuilder<T> {
    attribute: String,
    accessor: Option<Arc<dyn StateAccessor<T>>>,
    states: StateGraph<T>,
    events: EventRegistry<T>,
    callbacks: CallbackChain<T>,
    initial: Option<InitialState<T>>,
    action: Option<Arc<dyn PersistenceAction<T>>>,
    recorder: Option<Arc<dyn HistoryRecorder<T>>>,
}

impl<T> MachineBuilder<T> {
    /// Create a builder for the named attribute.
    pub fn new(attribute: impl Into<String>) -> Self {
        Self {
            attribute: attribute.into(),
            accessor: None,
            states: StateGraph::new(),
            events: EventRegistry::new(),
            callbacks: CallbackChain::new(),
            initial: None,
            action: None,
            recorder: None,
        }
    }

    /// Seed a builder from an existing machine's configuration.
    pub(crate) fn from_machine(machine: &Machine<T>) -> Self {
        Self {
            attribute: machine.attribute.clone(),
            accessor: Some(Arc::clone(&machine.accessor)),
            states: machine.states.clone(),
            events: machine.events.clone(),
            callbacks: machine.callbacks.clone(),
            initial: machine.initial.clone(),
            action: machine.action.clone(),
            recorder: machine.recorder.clone(),
        }
    }

    /// Set the attribute accessor (required).
    pub fn accessor(mut self, accessor: impl StateAccessor<T> + 'static) -> Self {
        self.accessor = Some(Arc::new(accessor));
        self
    }

    /// Register a state with default value and label.
    pub fn state(mut self, name: impl Into<String>) -> Self {
        self.states.insert(StateDef::new(name));
        self
    }

    /// Register several states with default values and labels.
    pub fn states<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in names {
            self.states.insert(StateDef::new(name));
        }
        self
    }

    /// Register a fully-configured state, replacing any earlier
    /// definition with the same name.
    pub fn state_def(mut self, state: StateDef<T>) -> Self {
        self.states.insert(state);
        self
    }

    /// Set a fixed initial state.
    pub fn initial(mut self, name: impl Into<String>) -> Self {
        self.initial = Some(InitialState::Static(name.into()));
        self
    }

    /// Set a per-object initial-state resolver.
    pub fn initial_with<F>(mut self, resolver: F) -> Self
    where
        F: Fn(&T) -> String + Send + Sync + 'static,
    {
        self.initial = Some(InitialState::Dynamic(Arc::new(resolver)));
        self
    }

    /// Register an event, replacing any earlier definition with the same
    /// name.
    pub fn event(mut self, builder: EventBuilder<T>) -> Self {
        self.events.insert(builder.into_def());
        self
    }

    /// Register a machine-level before-callback; returning `false` halts
    /// the fire.
    pub fn before_transition<F>(mut self, filter: CallbackFilter, callback: F) -> Self
    where
        F: Fn(&mut T, &ActiveTransition) -> bool + Send + Sync + 'static,
    {
        self.callbacks.before(filter, callback);
        self
    }

    /// Register a machine-level after-callback.
    pub fn after_transition<F>(mut self, filter: CallbackFilter, callback: F) -> Self
    where
        F: Fn(&mut T, &ActiveTransition) + Send + Sync + 'static,
    {
        self.callbacks.after(filter, callback);
        self
    }

    /// Register a machine-level failure-callback.
    pub fn on_failure<F>(mut self, filter: CallbackFilter, callback: F) -> Self
    where
        F: Fn(&mut T, &ActiveTransition) + Send + Sync + 'static,
    {
        self.callbacks.on_failure(filter, callback);
        self
    }

    /// Set the persistence action invoked after each mutation.
    pub fn persistence(mut self, action: impl PersistenceAction<T> + 'static) -> Self {
        self.action = Some(Arc::new(action));
        self
    }

    /// Set the history recorder notified of each successful transition.
    pub fn recorder(mut self, recorder: impl HistoryRecorder<T> + 'static) -> Self {
        self.recorder = Some(Arc::new(recorder));
        self
    }

    /// Validate the whole configuration and assemble the machine.
    ///
    /// Every violation is collected; the error reports them all at once.
    pub fn build(self) -> Result<Machine<T>, BuildError> {
        let mut violations = Vec::new();
        self.check_stored_values(&mut violations);
        self.check_rule_references(&mut violations);
        self.check_filter_references(&mut violations);
        self.check_initial_reference(&mut violations);

        if !violations.is_empty() {
            return Err(BuildError::Invalid(violations));
        }

        let accessor = self.accessor.ok_or(BuildError::MissingAccessor)?;
        debug!(
            attribute = %self.attribute,
            states = self.states.len(),
            events = self.events.len(),
            "machine built"
        );
        Ok(Machine::assemble(
            self.attribute,
            self.states,
            self.events,
            self.callbacks,
            self.initial,
            accessor,
            self.action,
            self.recorder,
        ))
    }

    fn check_stored_values(&self, violations: &mut Vec<ConfigViolation>) {
        let states: Vec<&StateDef<T>> = self.states.iter().collect();
        for (position, state) in states.iter().enumerate() {
            for earlier in &states[..position] {
                if earlier.stored_value() == state.stored_value() {
                    violations.push(ConfigViolation::DuplicateStateValue {
                        first: earlier.name().to_string(),
                        second: state.name().to_string(),
                        value: state.stored_value().clone(),
                    });
                }
            }
        }
    }

    fn check_rule_references(&self, violations: &mut Vec<ConfigViolation>) {
        for event in self.events.iter() {
            for rule in event.rules() {
                if !self.states.contains(rule.to()) {
                    violations.push(ConfigViolation::UnknownTargetState {
                        event: event.name().to_string(),
                        state: rule.to().to_string(),
                    });
                }
                for origin in rule.origins().referenced() {
                    if !self.states.contains(origin) {
                        violations.push(ConfigViolation::UnknownOriginState {
                            event: event.name().to_string(),
                            state: origin.to_string(),
                        });
                    }
                }
            }
        }
    }

    fn check_filter_references(&self, violations: &mut Vec<ConfigViolation>) {
        for callback in self.callbacks.iter() {
            for state in callback.filter().referenced_states() {
                if !self.states.contains(state) {
                    violations.push(ConfigViolation::UnknownFilterState {
                        state: state.to_string(),
                    });
                }
            }
            for event in callback.filter().referenced_events() {
                if !self.events.contains(event) {
                    violations.push(ConfigViolation::UnknownFilterEvent {
                        event: event.to_string(),
                    });
                }
            }
        }
    }

    fn check_initial_reference(&self, violations: &mut Vec<ConfigViolation>) {
        if let Some(InitialState::Static(name)) = &self.initial {
            if !self.states.contains(name) {
                violations.push(ConfigViolation::UnknownInitialState {
                    state: name.clone(),
                });
            }
        }
    }
}
