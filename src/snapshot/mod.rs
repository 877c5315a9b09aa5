//! Serializable per-object machine status.
//!
//! A snapshot captures where one object stands (its attribute value and
//! its transition log) in a versioned envelope that survives process
//! restarts. Machine configuration (states, events, callbacks) is not
//! serializable and is rebuilt by the host; restoring validates that the
//! captured value still maps onto a registered state.

use crate::core::{StateValue, TransitionLog};
use crate::machine::Machine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod error;

pub use error::SnapshotError;

/// Version identifier for the snapshot format
pub const SNAPSHOT_VERSION: u32 = 1;

/// Serializable capture of one object's machine status.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MachineSnapshot {
    /// Snapshot format version
    pub version: u32,

    /// Unique snapshot identifier
    pub id: String,

    /// When the snapshot was taken
    pub timestamp: DateTime<Utc>,

    /// Attribute the machine manages
    pub attribute: String,

    /// The object's stored state value
    pub state: StateValue,

    /// Transition log at capture time
    pub log: TransitionLog,
}

impl MachineSnapshot {
    /// Capture the object's current status.
    ///
    /// Fails validation when the attribute is unset; initialize the
    /// object first.
    pub fn capture<T>(
        machine: &Machine<T>,
        object: &T,
        log: &TransitionLog,
    ) -> Result<Self, SnapshotError> {
        let state = machine.current_value(object).ok_or_else(|| {
            SnapshotError::ValidationFailed(format!(
                "attribute '{}' is unset",
                machine.attribute()
            ))
        })?;
        Ok(Self {
            version: SNAPSHOT_VERSION,
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            attribute: machine.attribute().to_string(),
            state,
            log: log.clone(),
        })
    }

    /// Write the captured value back onto an object.
    ///
    /// Validates the version, the managed attribute, and that the value
    /// still maps onto a state registered with the machine. No callbacks
    /// run; restoring is not a transition.
    pub fn restore<T>(&self, machine: &Machine<T>, object: &mut T) -> Result<(), SnapshotError> {
        if self.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion {
                found: self.version,
                supported: SNAPSHOT_VERSION,
            });
        }
        if self.attribute != machine.attribute() {
            return Err(SnapshotError::ValidationFailed(format!(
                "snapshot captures attribute '{}', machine manages '{}'",
                self.attribute,
                machine.attribute()
            )));
        }
        let state = machine.states().state_for_value(&self.state).ok_or_else(|| {
            SnapshotError::ValidationFailed(format!(
                "stored value '{}' maps to no registered state",
                self.state
            ))
        })?;
        machine.write_value(object, state.stored_value().clone());
        Ok(())
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        serde_json::to_string(self).map_err(|e| SnapshotError::SerializationFailed(e.to_string()))
    }

    /// Deserialize from JSON, rejecting unsupported versions.
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        let snapshot: Self = serde_json::from_str(json)
            .map_err(|e| SnapshotError::DeserializationFailed(e.to_string()))?;
        snapshot.check_version()?;
        Ok(snapshot)
    }

    /// Serialize to a compact binary format.
    pub fn to_bytes(&self) -> Result<Vec<u8>, SnapshotError> {
        bincode::serialize(self).map_err(|e| SnapshotError::SerializationFailed(e.to_string()))
    }

    /// Deserialize from the binary format, rejecting unsupported versions.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SnapshotError> {
        let snapshot: Self = bincode::deserialize(bytes)
            .map_err(|e| SnapshotError::DeserializationFailed(e.to_string()))?;
        snapshot.check_version()?;
        Ok(snapshot)
    }

    fn check_version(&self) -> Result<(), SnapshotError> {
        if self.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion {
                found: self.version,
                supported: SNAPSHOT_VERSION,
            });
        }
        Ok(())
    }
}
