//! Named states and the per-machine state registry.
//!
//! States are identified by name. Each state additionally carries the value
//! actually stored in the owning object's attribute (defaulting to the
//! name itself), a human-readable label, and four callback slots invoked
//! around entering and leaving the state.

use super::callback::HookFn;
use super::transition::ActiveTransition;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// The value stored in the owning object's state attribute.
///
/// Distinct from the state's name: a machine may map the state named
/// `"parked"` to the stored integer `0`, for example, so that the owning
/// object's column stays compact while configuration stays readable.
/// Defaults to the string form of the state's name.
///
/// # Example
///
/// ```rust
/// use statecraft::core::StateValue;
///
/// let by_name = StateValue::Str("parked".to_string());
/// let compact = StateValue::Int(0);
///
/// assert_eq!(by_name.to_string(), "parked");
/// assert_eq!(compact.to_string(), "0");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StateValue {
    /// A string value, the default representation.
    Str(String),
    /// An integer value, for compact storage columns.
    Int(i64),
}

impl fmt::Display for StateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => f.write_str(s),
            Self::Int(i) => write!(f, "{i}"),
        }
    }
}

impl From<&str> for StateValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for StateValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<i64> for StateValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

pub(crate) fn humanize(name: &str) -> String {
    name.replace('_', " ")
}

/// Declared behavior of a single named state.
///
/// A state owns its stored value, its human-readable label, and four
/// callback slots: before-enter and after-enter straddle the attribute
/// mutation when the state is entered, before-exit and after-exit straddle
/// it when the state is left. Loopback transitions (destination equals
/// origin) run none of the four slots.
///
/// Slot callbacks are non-halting; halting belongs to the machine-level
/// before chain.
///
/// # Example
///
/// ```rust
/// use statecraft::core::{StateDef, StateValue};
///
/// let state: StateDef<()> = StateDef::new("first_gear")
///     .value(StateValue::Int(1))
///     .human("1st gear");
///
/// assert_eq!(state.name(), "first_gear");
/// assert_eq!(state.stored_value(), &StateValue::Int(1));
/// assert_eq!(state.human_name(), "1st gear");
/// ```
pub struct StateDef<T> {
    name: String,
    value: StateValue,
    human_name: String,
    before_enter: Vec<HookFn<T>>,
    after_enter: Vec<HookFn<T>>,
    before_exit: Vec<HookFn<T>>,
    after_exit: Vec<HookFn<T>>,
}

impl<T> StateDef<T> {
    /// Create a state with the default stored value (the name itself) and
    /// the default human name (the name with underscores spaced out).
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            value: StateValue::Str(name.clone()),
            human_name: humanize(&name),
            name,
            before_enter: Vec::new(),
            after_enter: Vec::new(),
            before_exit: Vec::new(),
            after_exit: Vec::new(),
        }
    }

    /// Override the stored value.
    pub fn value(mut self, value: impl Into<StateValue>) -> Self {
        self.value = value.into();
        self
    }

    /// Override the human-readable label.
    pub fn human(mut self, label: impl Into<String>) -> Self {
        self.human_name = label.into();
        self
    }

    /// Append a callback run before the attribute is mutated on entry.
    pub fn before_enter<F>(mut self, callback: F) -> Self
    where
        F: Fn(&mut T, &ActiveTransition) + Send + Sync + 'static,
    {
        self.before_enter.push(Arc::new(callback));
        self
    }

    /// Append a callback run after the attribute is mutated on entry.
    pub fn after_enter<F>(mut self, callback: F) -> Self
    where
        F: Fn(&mut T, &ActiveTransition) + Send + Sync + 'static,
    {
        self.after_enter.push(Arc::new(callback));
        self
    }

    /// Append a callback run before the attribute is mutated on exit.
    pub fn before_exit<F>(mut self, callback: F) -> Self
    where
        F: Fn(&mut T, &ActiveTransition) + Send + Sync + 'static,
    {
        self.before_exit.push(Arc::new(callback));
        self
    }

    /// Append a callback run after the attribute is mutated on exit.
    pub fn after_exit<F>(mut self, callback: F) -> Self
    where
        F: Fn(&mut T, &ActiveTransition) + Send + Sync + 'static,
    {
        self.after_exit.push(Arc::new(callback));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn stored_value(&self) -> &StateValue {
        &self.value
    }

    pub fn human_name(&self) -> &str {
        &self.human_name
    }

    pub(crate) fn run_before_enter(&self, object: &mut T, transition: &ActiveTransition) {
        for callback in &self.before_enter {
            callback(object, transition);
        }
    }

    pub(crate) fn run_after_enter(&self, object: &mut T, transition: &ActiveTransition) {
        for callback in &self.after_enter {
            callback(object, transition);
        }
    }

    pub(crate) fn run_before_exit(&self, object: &mut T, transition: &ActiveTransition) {
        for callback in &self.before_exit {
            callback(object, transition);
        }
    }

    pub(crate) fn run_after_exit(&self, object: &mut T, transition: &ActiveTransition) {
        for callback in &self.after_exit {
            callback(object, transition);
        }
    }
}

impl<T> Clone for StateDef<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            value: self.value.clone(),
            human_name: self.human_name.clone(),
            before_enter: self.before_enter.clone(),
            after_enter: self.after_enter.clone(),
            before_exit: self.before_exit.clone(),
            after_exit: self.after_exit.clone(),
        }
    }
}

impl<T> fmt::Debug for StateDef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateDef")
            .field("name", &self.name)
            .field("value", &self.value)
            .field("human_name", &self.human_name)
            .finish_non_exhaustive()
    }
}

/// Registry of the named states declared on a machine.
///
/// Names are unique; re-inserting a name replaces the earlier definition,
/// which is how layered configurations override inherited states.
/// Declaration order is preserved for introspection.
pub struct StateGraph<T> {
    states: Vec<StateDef<T>>,
    index: HashMap<String, usize>,
}

impl<T> StateGraph<T> {
    pub fn new() -> Self {
        Self {
            states: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Register a state, replacing any earlier definition with the same name.
    pub fn insert(&mut self, state: StateDef<T>) {
        if let Some(&position) = self.index.get(state.name()) {
            self.states[position] = state;
        } else {
            self.index.insert(state.name().to_string(), self.states.len());
            self.states.push(state);
        }
    }

    pub fn get(&self, name: &str) -> Option<&StateDef<T>> {
        self.index.get(name).map(|&position| &self.states[position])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Find the state whose stored value matches the given attribute value.
    pub fn state_for_value(&self, value: &StateValue) -> Option<&StateDef<T>> {
        self.states.iter().find(|state| state.stored_value() == value)
    }

    pub fn iter(&self) -> impl Iterator<Item = &StateDef<T>> {
        self.states.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.states.iter().map(|state| state.name())
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

impl<T> Default for StateGraph<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for StateGraph<T> {
    fn clone(&self) -> Self {
        Self {
            states: self.states.clone(),
            index: self.index.clone(),
        }
    }
}
