//! Collaborator seams the engine is given adapters for.
//!
//! The engine never talks to storage directly. It reads and writes the
//! state attribute through a [`StateAccessor`], commits through an
//! optional [`PersistenceAction`], and reports completed transitions to
//! an optional [`HistoryRecorder`]. Each seam is a narrow trait selected
//! by explicit configuration, with closure-backed implementations for
//! the common cases.

use crate::core::{StateValue, TransitionRecord};
use chrono::Utc;
use std::sync::Arc;

/// Access to the state-holding field of the owning object.
///
/// `get` returning `None` means the attribute is unset and triggers
/// initial-state assignment on the next fire.
pub trait StateAccessor<T>: Send + Sync {
    fn get(&self, object: &T) -> Option<StateValue>;
    fn set(&self, object: &mut T, value: StateValue);
}

/// Closure-backed [`StateAccessor`].
///
/// # Example
///
/// ```rust
/// use statecraft::machine::{FieldAccessor, StateAccessor};
/// use statecraft::core::StateValue;
///
/// struct Vehicle {
///     state: Option<StateValue>,
/// }
///
/// let accessor = FieldAccessor::new(
///     |vehicle: &Vehicle| vehicle.state.clone(),
///     |vehicle, value| vehicle.state = Some(value),
/// );
///
/// let mut vehicle = Vehicle { state: None };
/// assert!(accessor.get(&vehicle).is_none());
///
/// accessor.set(&mut vehicle, StateValue::Str("parked".to_string()));
/// assert_eq!(accessor.get(&vehicle), Some(StateValue::Str("parked".to_string())));
/// ```
pub struct FieldAccessor<T> {
    get: Arc<dyn Fn(&T) -> Option<StateValue> + Send + Sync>,
    set: Arc<dyn Fn(&mut T, StateValue) + Send + Sync>,
}

impl<T> FieldAccessor<T> {
    pub fn new<G, S>(get: G, set: S) -> Self
    where
        G: Fn(&T) -> Option<StateValue> + Send + Sync + 'static,
        S: Fn(&mut T, StateValue) + Send + Sync + 'static,
    {
        Self {
            get: Arc::new(get),
            set: Arc::new(set),
        }
    }
}

impl<T> StateAccessor<T> for FieldAccessor<T> {
    fn get(&self, object: &T) -> Option<StateValue> {
        (self.get)(object)
    }

    fn set(&self, object: &mut T, value: StateValue) {
        (self.set)(object, value)
    }
}

impl<T> Clone for FieldAccessor<T> {
    fn clone(&self) -> Self {
        Self {
            get: Arc::clone(&self.get),
            set: Arc::clone(&self.set),
        }
    }
}

/// Durably commits the in-memory state mutation.
///
/// Reporting `false` marks the fire as failed and runs the failure
/// chain; the engine does not roll the attribute back. Any underlying
/// error is the collaborator's to raise or swallow.
pub trait PersistenceAction<T>: Send + Sync {
    fn perform(&self, object: &mut T) -> bool;
}

impl<T, F> PersistenceAction<T> for F
where
    F: Fn(&mut T) -> bool + Send + Sync,
{
    fn perform(&self, object: &mut T) -> bool {
        self(object)
    }
}

/// Receives one record per successful transition, including the
/// initial-state assignment (no event, no origin).
pub trait HistoryRecorder<T>: Send + Sync {
    fn record(&self, object: &mut T, event: Option<&str>, from: Option<&str>, to: &str);

    /// Whether the object already carries transition history. Initial-state
    /// assignment skips enter callbacks and recording when it does.
    fn has_history(&self, object: &T) -> bool {
        let _ = object;
        false
    }
}

/// Closure-backed [`HistoryRecorder`] that stamps records with the
/// current time.
///
/// # Example
///
/// ```rust
/// use statecraft::core::{TransitionLog, TransitionRecord};
/// use statecraft::machine::{FnRecorder, HistoryRecorder};
///
/// struct Vehicle {
///     log: TransitionLog,
/// }
///
/// let recorder = FnRecorder::new(|vehicle: &mut Vehicle, record: TransitionRecord| {
///     vehicle.log = vehicle.log.record(record);
/// })
/// .with_presence(|vehicle: &Vehicle| !vehicle.log.is_empty());
///
/// let mut vehicle = Vehicle { log: TransitionLog::new() };
/// assert!(!recorder.has_history(&vehicle));
///
/// recorder.record(&mut vehicle, Some("ignite"), Some("parked"), "idling");
/// assert!(recorder.has_history(&vehicle));
/// ```
pub struct FnRecorder<T> {
    record: Arc<dyn Fn(&mut T, TransitionRecord) + Send + Sync>,
    presence: Option<Arc<dyn Fn(&T) -> bool + Send + Sync>>,
}

impl<T> FnRecorder<T> {
    pub fn new<F>(record: F) -> Self
    where
        F: Fn(&mut T, TransitionRecord) + Send + Sync + 'static,
    {
        Self {
            record: Arc::new(record),
            presence: None,
        }
    }

    /// Teach the recorder how to answer [`HistoryRecorder::has_history`].
    pub fn with_presence<F>(mut self, presence: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.presence = Some(Arc::new(presence));
        self
    }
}

impl<T> HistoryRecorder<T> for FnRecorder<T> {
    fn record(&self, object: &mut T, event: Option<&str>, from: Option<&str>, to: &str) {
        let record = TransitionRecord {
            event: event.map(String::from),
            from: from.map(String::from),
            to: to.to_string(),
            timestamp: Utc::now(),
        };
        (self.record)(object, record);
    }

    fn has_history(&self, object: &T) -> bool {
        match &self.presence {
            Some(presence) => presence(object),
            None => false,
        }
    }
}

impl<T> Clone for FnRecorder<T> {
    fn clone(&self) -> Self {
        Self {
            record: Arc::clone(&self.record),
            presence: self.presence.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::TransitionLog;

    #[derive(Default)]
    struct Vehicle {
        state: Option<StateValue>,
        log: TransitionLog,
        saves: usize,
    }

    #[test]
    fn field_accessor_reads_and_writes() {
        let accessor = FieldAccessor::new(
            |v: &Vehicle| v.state.clone(),
            |v, value| v.state = Some(value),
        );

        let mut vehicle = Vehicle::default();
        assert!(accessor.get(&vehicle).is_none());

        accessor.set(&mut vehicle, StateValue::Str("parked".to_string()));
        assert_eq!(
            accessor.get(&vehicle),
            Some(StateValue::Str("parked".to_string()))
        );
    }

    #[test]
    fn closures_are_persistence_actions() {
        let save = |vehicle: &mut Vehicle| {
            vehicle.saves += 1;
            true
        };

        let mut vehicle = Vehicle::default();
        assert!(PersistenceAction::perform(&save, &mut vehicle));
        assert_eq!(vehicle.saves, 1);
    }

    #[test]
    fn fn_recorder_appends_timestamped_records() {
        let recorder = FnRecorder::new(|vehicle: &mut Vehicle, record| {
            vehicle.log = vehicle.log.record(record);
        });

        let mut vehicle = Vehicle::default();
        recorder.record(&mut vehicle, Some("ignite"), Some("parked"), "idling");
        recorder.record(&mut vehicle, None, None, "parked");

        assert_eq!(vehicle.log.len(), 2);
        let first = &vehicle.log.records()[0];
        assert_eq!(first.event.as_deref(), Some("ignite"));
        assert_eq!(first.from.as_deref(), Some("parked"));
        assert_eq!(first.to, "idling");

        let initial = &vehicle.log.records()[1];
        assert!(initial.event.is_none());
        assert!(initial.from.is_none());
    }

    #[test]
    fn has_history_defaults_to_false() {
        let recorder = FnRecorder::new(|_: &mut Vehicle, _| {});
        assert!(!recorder.has_history(&Vehicle::default()));
    }

    #[test]
    fn presence_closure_answers_has_history() {
        let recorder = FnRecorder::new(|vehicle: &mut Vehicle, record| {
            vehicle.log = vehicle.log.record(record);
        })
        .with_presence(|vehicle: &Vehicle| !vehicle.log.is_empty());

        let mut vehicle = Vehicle::default();
        assert!(!recorder.has_history(&vehicle));

        recorder.record(&mut vehicle, None, None, "parked");
        assert!(recorder.has_history(&vehicle));
    }
}
