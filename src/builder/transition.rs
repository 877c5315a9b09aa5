//! Builders for events and their transition rules.

use crate::builder::error::BuildError;
use crate::core::{
    ActiveTransition, EventDef, Guard, OriginSet, TransitionRule,
};

/// Builder for a single guarded transition rule.
///
/// Origins default to every state; call `.from(..)` or `.except(..)` to
/// narrow them. The destination is required.
pub struct TransitionRuleBuilder<T> {
    origins: OriginSet,
    to: Option<String>,
    guard: Option<Guard<T>>,
}

impl<T> TransitionRuleBuilder<T> {
    pub fn new() -> Self {
        Self {
            origins: OriginSet::Any,
            to: None,
            guard: None,
        }
    }

    /// Restrict origins to exactly these states.
    pub fn from<I, S>(mut self, states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.origins = OriginSet::In(states.into_iter().map(Into::into).collect());
        self
    }

    /// Apply from every state.
    pub fn from_any(mut self) -> Self {
        self.origins = OriginSet::Any;
        self
    }

    /// Apply from every state except these.
    pub fn except<I, S>(mut self, states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.origins = OriginSet::Except(states.into_iter().map(Into::into).collect());
        self
    }

    /// Set the destination state (required).
    pub fn to(mut self, state: impl Into<String>) -> Self {
        self.to = Some(state.into());
        self
    }

    /// Attach a guard.
    pub fn guard(mut self, guard: Guard<T>) -> Self {
        self.guard = Some(guard);
        self
    }

    /// Attach a guard from a closure.
    pub fn when<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&T, &ActiveTransition) -> bool + Send + Sync + 'static,
    {
        self.guard = Some(Guard::new(predicate));
        self
    }

    /// Build the rule.
    pub fn build(self) -> Result<TransitionRule<T>, BuildError> {
        let to = self.to.ok_or(BuildError::MissingToState)?;
        let mut rule = TransitionRule::new(self.origins, to);
        if let Some(guard) = self.guard {
            rule = rule.with_guard(guard);
        }
        Ok(rule)
    }
}

impl<T> Default for TransitionRuleBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for a named event and its ordered transition rules.
pub struct EventBuilder<T> {
    event: EventDef<T>,
}

impl<T> EventBuilder<T> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            event: EventDef::new(name),
        }
    }

    /// Override the human-readable label.
    pub fn human(mut self, label: impl Into<String>) -> Self {
        self.event.set_human_name(label);
        self
    }

    /// Append a transition rule via its builder.
    /// Returns an error if the builder fails validation.
    pub fn transition(mut self, builder: TransitionRuleBuilder<T>) -> Result<Self, BuildError> {
        self.event.add_rule(builder.build()?);
        Ok(self)
    }

    /// Append a pre-built transition rule.
    pub fn rule(mut self, rule: TransitionRule<T>) -> Self {
        self.event.add_rule(rule);
        self
    }

    /// Append a callback run after this event fires successfully, once
    /// the machine-level after chain has finished.
    pub fn after_fire<F>(mut self, callback: F) -> Self
    where
        F: Fn(&mut T, &ActiveTransition) + Send + Sync + 'static,
    {
        self.event.add_after(callback);
        self
    }

    pub(crate) fn into_def(self) -> EventDef<T> {
        self.event
    }
}
