//! Transition history tracking.
//!
//! Records are keyed by state and event name. The log is immutable:
//! `record` returns a new log with the entry appended, so snapshots and
//! callers holding an older log are never surprised by later writes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Record of a single completed transition.
///
/// `event` and `from` are absent for the entry written by the
/// initial-state assignment.
///
/// # Example
///
/// ```rust
/// use statecraft::core::TransitionRecord;
/// use chrono::Utc;
///
/// let record = TransitionRecord {
///     event: Some("ignite".to_string()),
///     from: Some("parked".to_string()),
///     to: "idling".to_string(),
///     timestamp: Utc::now(),
/// };
/// assert_eq!(record.to, "idling");
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransitionRecord {
    /// The fired event, absent for the initial-state assignment.
    pub event: Option<String>,
    /// Origin state, absent for the initial-state assignment.
    pub from: Option<String>,
    /// Destination state.
    pub to: String,
    /// When the transition completed.
    pub timestamp: DateTime<Utc>,
}

/// Ordered history of completed transitions.
///
/// The log is immutable: `record` returns a new log with the entry
/// appended, leaving the original unchanged.
///
/// # Example
///
/// ```rust
/// use statecraft::core::{TransitionLog, TransitionRecord};
/// use chrono::Utc;
///
/// let log = TransitionLog::new();
/// let log = log.record(TransitionRecord {
///     event: None,
///     from: None,
///     to: "parked".to_string(),
///     timestamp: Utc::now(),
/// });
/// let log = log.record(TransitionRecord {
///     event: Some("ignite".to_string()),
///     from: Some("parked".to_string()),
///     to: "idling".to_string(),
///     timestamp: Utc::now(),
/// });
///
/// assert_eq!(log.get_path(), vec!["parked", "idling"]);
/// ```
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TransitionLog {
    records: Vec<TransitionRecord>,
}

impl TransitionLog {
    /// Create a new empty log.
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// Record a transition, returning a new log.
    pub fn record(&self, record: TransitionRecord) -> Self {
        let mut records = self.records.clone();
        records.push(record);
        Self { records }
    }

    /// The path of states traversed: the first record's origin (when
    /// present) followed by every destination in order.
    pub fn get_path(&self) -> Vec<&str> {
        let mut path = Vec::new();
        if let Some(first) = self.records.first() {
            if let Some(from) = &first.from {
                path.push(from.as_str());
            }
        }
        for record in &self.records {
            path.push(record.to.as_str());
        }
        path
    }

    /// Total duration from the first to the last record, `None` when the
    /// log is empty.
    pub fn duration(&self) -> Option<Duration> {
        if let (Some(first), Some(last)) = (self.records.first(), self.records.last()) {
            let duration = last.timestamp.signed_duration_since(first.timestamp);
            duration.to_std().ok()
        } else {
            None
        }
    }

    /// All recorded transitions in order.
    pub fn records(&self) -> &[TransitionRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(event: Option<&str>, from: Option<&str>, to: &str) -> TransitionRecord {
        TransitionRecord {
            event: event.map(String::from),
            from: from.map(String::from),
            to: to.to_string(),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn new_log_is_empty() {
        let log = TransitionLog::new();
        assert!(log.is_empty());
        assert!(log.get_path().is_empty());
        assert!(log.duration().is_none());
    }

    #[test]
    fn record_is_immutable() {
        let log = TransitionLog::new();
        let extended = log.record(entry(Some("ignite"), Some("parked"), "idling"));

        assert_eq!(log.len(), 0);
        assert_eq!(extended.len(), 1);
    }

    #[test]
    fn path_includes_the_first_origin() {
        let log = TransitionLog::new()
            .record(entry(Some("ignite"), Some("parked"), "idling"))
            .record(entry(Some("shift_up"), Some("idling"), "first_gear"));

        assert_eq!(log.get_path(), vec!["parked", "idling", "first_gear"]);
    }

    #[test]
    fn path_from_initial_assignment_has_no_origin() {
        let log = TransitionLog::new()
            .record(entry(None, None, "parked"))
            .record(entry(Some("ignite"), Some("parked"), "idling"));

        assert_eq!(log.get_path(), vec!["parked", "idling"]);
    }

    #[test]
    fn duration_spans_first_to_last() {
        let start = Utc::now();
        let log = TransitionLog::new()
            .record(TransitionRecord {
                event: None,
                from: None,
                to: "parked".to_string(),
                timestamp: start,
            })
            .record(TransitionRecord {
                event: Some("ignite".to_string()),
                from: Some("parked".to_string()),
                to: "idling".to_string(),
                timestamp: start + chrono::Duration::seconds(2),
            });

        assert_eq!(log.duration(), Some(Duration::from_secs(2)));
    }

    #[test]
    fn single_record_has_zero_duration() {
        let log = TransitionLog::new().record(entry(None, None, "parked"));
        assert_eq!(log.duration(), Some(Duration::from_secs(0)));
    }

    #[test]
    fn log_serializes_correctly() {
        let log = TransitionLog::new().record(entry(Some("ignite"), Some("parked"), "idling"));

        let json = serde_json::to_string(&log).unwrap();
        let decoded: TransitionLog = serde_json::from_str(&json).unwrap();

        assert_eq!(log.records(), decoded.records());
    }
}
