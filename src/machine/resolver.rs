//! Transition resolution queries.
//!
//! Resolution walks an event's rules in declaration order and selects the
//! first whose origin set contains the current state and whose guard
//! passes. First-match-wins is the defined tie-break: a later rule that
//! could also match is never consulted, which is what makes idioms like
//! declaring a `stalled -> stalled` self-loop ahead of a broader rule
//! work.

use super::{Machine, MachineError};
use crate::core::{ActiveTransition, EventDef, TransitionRule};
use serde_json::Value;
use std::collections::HashSet;

/// Optional narrowing applied by
/// [`available_transitions`](Machine::available_transitions).
///
/// Each component is a set matched by inclusion; an absent component
/// admits everything.
#[derive(Clone, Debug, Default)]
pub struct TransitionRequirements {
    on: Option<HashSet<String>>,
    to: Option<HashSet<String>>,
}

impl TransitionRequirements {
    pub fn any() -> Self {
        Self::default()
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

    /// Restrict to transitions entering one of these states.
    pub fn to_states<I, S>(mut self, states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.to = Some(states.into_iter().map(Into::into).collect());
        self
    }

    fn admits_event(&self, event: &str) -> bool {
        self.on.as_ref().map_or(true, |on| on.contains(event))
    }

    fn admits_target(&self, state: &str) -> bool {
        self.to.as_ref().map_or(true, |to| to.contains(state))
    }
}

impl<T> Machine<T> {
    /// Find the transition the named event would take from the object's
    /// current state, without firing it.
    ///
    /// Errors with `UnknownEvent` when the event is not registered.
    /// `None` means no rule applies: an event with zero rules, no rule
    /// covering the current state, or every covering rule's guard
    /// refusing.
    pub fn find_transition(
        &self,
        object: &T,
        event: &str,
    ) -> Result<Option<ActiveTransition>, MachineError> {
        let event_def = self
            .events
            .get(event)
            .ok_or_else(|| MachineError::UnknownEvent {
                name: event.to_string(),
            })?;
        let from = self.current_state_name(object)?;
        Ok(self
            .resolve(object, event_def, from, &[])
            .map(|(_, prospective)| prospective))
    }

    /// Whether firing the named event would find a transition.
    pub fn can_fire(&self, object: &T, event: &str) -> Result<bool, MachineError> {
        Ok(self.find_transition(object, event)?.is_some())
    }

    /// Every transition whose origin contains the current state and whose
    /// guard passes, narrowed by the requirements. Introspection only;
    /// firing always goes through first-match resolution.
    pub fn available_transitions(
        &self,
        object: &T,
        requirements: &TransitionRequirements,
    ) -> Result<Vec<ActiveTransition>, MachineError> {
        let from = self.current_state_name(object)?;
        let mut available = Vec::new();
        for event_def in self.events.iter() {
            if !requirements.admits_event(event_def.name()) {
                continue;
            }
            for rule in event_def.rules() {
                if !rule.origins().contains(from) {
                    continue;
                }
                if !requirements.admits_target(rule.to()) {
                    continue;
                }
                let prospective = ActiveTransition::new(
                    &self.attribute,
                    event_def.name(),
                    from,
                    rule.to(),
                    Vec::new(),
                );
                if rule.guard_passes(object, &prospective) {
                    available.push(prospective);
                }
            }
        }
        Ok(available)
    }

    /// Declaration-order, first-match rule selection for one event.
    pub(crate) fn resolve<'m>(
        &self,
        object: &T,
        event_def: &'m EventDef<T>,
        from: &str,
        args: &[Value],
    ) -> Option<(&'m TransitionRule<T>, ActiveTransition)> {
        for rule in event_def.rules() {
            if !rule.origins().contains(from) {
                continue;
            }
            let prospective = ActiveTransition::new(
                &self.attribute,
                event_def.name(),
                from,
                rule.to(),
                args.to_vec(),
            );
            if rule.guard_passes(object, &prospective) {
                return Some((rule, prospective));
            }
        }
        None
    }
}
