//! Statecraft: a declarative state machine engine
//!
//! A [`Machine`] is built once per (owning type, attribute) pair from a
//! declarative set of states, events, and guarded transitions. It drives
//! plain objects through state changes: resolution picks the first
//! matching transition in declaration order, ordered callback chains run
//! around the mutation with well-defined halting semantics, and an
//! optional persistence action commits each change.
//!
//! # Core Concepts
//!
//! - **States and events are named**: configuration is a runtime
//!   dispatch table, not an enum. One `fire(name)` / `is_state(name)`
//!   surface, with [`machine_methods!`] generating named wrappers where
//!   ergonomics matter.
//! - **First-match resolution**: an event's rules are consulted in
//!   declaration order; the first whose origin set and guard admit the
//!   current state wins.
//! - **Callback chains**: machine-level before/after/failure callbacks
//!   with from/to/on filters, plus four per-state slots around enter and
//!   exit. A before-callback returning `false` halts the fire with no
//!   mutation.
//! - **Narrow collaborator seams**: the attribute accessor, the
//!   persistence action, and the history recorder are traits selected by
//!   explicit configuration.
//!
//! # Example
//!
//! ```rust
//! use statecraft::builder::{EventBuilder, MachineBuilder, TransitionRuleBuilder};
//! use statecraft::core::StateValue;
//! use statecraft::machine::FieldAccessor;
//!
//! #[derive(Default)]
//! struct Vehicle {
//!     state: Option<StateValue>,
//! }
//!
//! let machine = MachineBuilder::new("state")
//!     .accessor(FieldAccessor::new(
//!         |vehicle: &Vehicle| vehicle.state.clone(),
//!         |vehicle, value| vehicle.state = Some(value),
//!     ))
//!     .initial("parked")
//!     .states(["parked", "idling", "stalled"])
//!     .event(
//!         EventBuilder::new("ignite")
//!             .transition(TransitionRuleBuilder::new().from(["stalled"]).to("stalled"))?
//!             .transition(TransitionRuleBuilder::new().from(["parked"]).to("idling"))?,
//!     )
//!     .build()?;
//!
//! let mut vehicle = Vehicle::default();
//! assert_eq!(machine.fire(&mut vehicle, "ignite").unwrap(), true);
//! assert_eq!(machine.current_state_name(&vehicle).unwrap(), "idling");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod builder;
pub mod core;
pub mod machine;
pub mod snapshot;

// Re-export commonly used types
pub use builder::{BuildError, ConfigViolation, EventBuilder, MachineBuilder, TransitionRuleBuilder};
pub use core::{
    ActiveTransition, CallbackFilter, CallbackPhase, Guard, StateDef, StateValue, TransitionLog,
    TransitionRecord,
};
pub use machine::{
    FieldAccessor, FnRecorder, HistoryRecorder, Machine, MachineError, PersistenceAction,
    StateAccessor, TransitionRequirements,
};
pub use snapshot::MachineSnapshot;
