//! Named events and the per-machine event registry.
//!
//! An event owns an ordered list of transition rules, consulted in
//! declaration order at fire time, plus optional callbacks that run after
//! the event fires successfully.

use super::callback::HookFn;
use super::state::humanize;
use super::transition::{ActiveTransition, TransitionRule};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A named trigger owning its transition rules.
pub struct EventDef<T> {
    name: String,
    human_name: String,
    rules: Vec<TransitionRule<T>>,
    after: Vec<HookFn<T>>,
}

impl<T> EventDef<T> {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            human_name: humanize(&name),
            name,
            rules: Vec::new(),
            after: Vec::new(),
        }
    }

    pub fn set_human_name(&mut self, label: impl Into<String>) {
        self.human_name = label.into();
    }

    /// Append a rule. Declaration order is resolution order.
    pub fn add_rule(&mut self, rule: TransitionRule<T>) {
        self.rules.push(rule);
    }

    /// Append a callback run after this event fires successfully.
    pub fn add_after<F>(&mut self, callback: F)
    where
        F: Fn(&mut T, &ActiveTransition) + Send + Sync + 'static,
    {
        self.after.push(Arc::new(callback));
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn human_name(&self) -> &str {
        &self.human_name
    }

    pub fn rules(&self) -> &[TransitionRule<T>] {
        &self.rules
    }

    pub(crate) fn run_after(&self, object: &mut T, transition: &ActiveTransition) {
        for callback in &self.after {
            callback(object, transition);
        }
    }
}

impl<T> Clone for EventDef<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            human_name: self.human_name.clone(),
            rules: self.rules.clone(),
            after: self.after.clone(),
        }
    }
}

impl<T> fmt::Debug for EventDef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventDef")
            .field("name", &self.name)
            .field("rules", &self.rules)
            .finish_non_exhaustive()
    }
}

/// Registry of the named events declared on a machine.
///
/// Mirrors [`StateGraph`](super::StateGraph): names are unique,
/// re-inserting replaces, declaration order is preserved.
pub struct EventRegistry<T> {
    events: Vec<EventDef<T>>,
    index: HashMap<String, usize>,
}

impl<T> EventRegistry<T> {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Register an event, replacing any earlier definition with the same name.
    pub fn insert(&mut self, event: EventDef<T>) {
        if let Some(&position) = self.index.get(event.name()) {
            self.events[position] = event;
        } else {
            self.index.insert(event.name().to_string(), self.events.len());
            self.events.push(event);
        }
    }

    pub fn get(&self, name: &str) -> Option<&EventDef<T>> {
        self.index.get(name).map(|&position| &self.events[position])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &EventDef<T>> {
        self.events.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.events.iter().map(|event| event.name())
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl<T> Default for EventRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for EventRegistry<T> {
    fn clone(&self) -> Self {
        Self {
            events: self.events.clone(),
            index: self.index.clone(),
        }
    }
}
