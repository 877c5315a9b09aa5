//! The event-firing protocol.
//!
//! A fire walks a fixed sequence: resolve the transition, run the
//! machine-level before chain, run the from-state's exit slots and the
//! to-state's enter slots around the attribute mutation, invoke the
//! persistence action, record history, run the after chain. The failure
//! chain runs instead whenever resolution finds nothing, a before
//! callback halts, or the persistence action refuses.
//!
//! Firing is not reentrant-safe per object; callers serialize concurrent
//! fires on the same object externally.

use super::{InitialState, Machine, MachineError};
use crate::core::{ActiveTransition, CallbackPhase};
use serde_json::Value;
use tracing::{debug, trace};

impl<T> Machine<T> {
    /// Fire the named event on the object.
    ///
    /// `Ok(false)` is an expected business outcome: no applicable
    /// transition, a halting before-callback, or a refused persistence
    /// action. Errors are reserved for configuration problems: an
    /// unregistered event, an unmapped stored value, or a missing
    /// initial state.
    pub fn fire(&self, object: &mut T, event: &str) -> Result<bool, MachineError> {
        self.fire_with(object, event, Vec::new())
    }

    /// Fire with extra arguments, made available to guards and callbacks
    /// on the transition instance.
    pub fn fire_with(
        &self,
        object: &mut T,
        event: &str,
        args: Vec<Value>,
    ) -> Result<bool, MachineError> {
        self.initialize(object)?;
        let from = self.current_state_name(object)?.to_string();
        let event_def = self
            .events
            .get(event)
            .ok_or_else(|| MachineError::UnknownEvent {
                name: event.to_string(),
            })?;

        let Some((rule, mut transition)) = self.resolve(object, event_def, &from, &args) else {
            debug!(event, from = %from, "no transition applies");
            let refused = ActiveTransition::refused(&self.attribute, event, &from, args);
            self.callbacks.run_failure(object, &refused);
            return Ok(false);
        };
        let to = rule.to().to_string();
        debug!(event, from = %from, to = %to, "transition resolved");

        if !self.callbacks.run(CallbackPhase::Before, object, &transition) {
            debug!(event, from = %from, to = %to, "halted by before callback");
            self.callbacks.run_failure(object, &transition);
            return Ok(false);
        }

        let from_state = self
            .states
            .get(&from)
            .ok_or_else(|| MachineError::UnknownState { name: from.clone() })?;
        let to_state = self
            .states
            .get(&to)
            .ok_or_else(|| MachineError::UnknownState { name: to.clone() })?;

        let loopback = transition.is_loopback();
        if !loopback {
            trace!(from = %from, to = %to, "running exit and enter slots");
            from_state.run_before_exit(object, &transition);
            to_state.run_before_enter(object, &transition);
        }

        self.write_value(object, to_state.stored_value().clone());

        if !loopback {
            from_state.run_after_exit(object, &transition);
            to_state.run_after_enter(object, &transition);
        }

        if let Some(action) = &self.action {
            if !action.perform(object) {
                debug!(event, from = %from, to = %to, "persistence action refused");
                self.callbacks.run_failure(object, &transition);
                return Ok(false);
            }
        }

        transition.success = true;
        if let Some(recorder) = &self.recorder {
            recorder.record(object, Some(event), Some(from.as_str()), &to);
        }

        self.callbacks.run(CallbackPhase::After, object, &transition);
        event_def.run_after(object, &transition);
        Ok(true)
    }

    /// Like [`fire`](Self::fire), but a `false` outcome becomes
    /// `MachineError::InvalidTransition` carrying the event and the state
    /// the object was in.
    pub fn fire_strict(&self, object: &mut T, event: &str) -> Result<(), MachineError> {
        self.fire_strict_with(object, event, Vec::new())
    }

    /// Strict variant of [`fire_with`](Self::fire_with).
    pub fn fire_strict_with(
        &self,
        object: &mut T,
        event: &str,
        args: Vec<Value>,
    ) -> Result<(), MachineError> {
        self.initialize(object)?;
        let from = self.current_state_name(object)?.to_string();
        if self.fire_with(object, event, args)? {
            Ok(())
        } else {
            Err(MachineError::InvalidTransition {
                event: event.to_string(),
                state: from,
            })
        }
    }

    /// Assign the initial state if the attribute is unset.
    ///
    /// Resolves the configured initial state (static name or per-object
    /// function), writes its stored value, and, unless the recorder
    /// reports existing history, runs only the destination state's
    /// enter slots and records a history entry with no event and no
    /// origin. Fires perform this implicitly, so guards and callbacks
    /// always observe a populated attribute.
    pub fn initialize(&self, object: &mut T) -> Result<(), MachineError> {
        if self.accessor.get(object).is_some() {
            return Ok(());
        }
        let name = match self.initial() {
            Some(InitialState::Static(name)) => name.clone(),
            Some(InitialState::Dynamic(resolver)) => resolver(object),
            None => {
                return Err(MachineError::NoInitialState {
                    attribute: self.attribute.clone(),
                })
            }
        };
        let state = self
            .states
            .get(&name)
            .ok_or_else(|| MachineError::UnknownState { name: name.clone() })?;
        debug!(attribute = %self.attribute, state = %name, "assigning initial state");

        let fresh = self
            .recorder
            .as_ref()
            .map_or(true, |recorder| !recorder.has_history(object));
        let transition = ActiveTransition::initial(&self.attribute, &name);

        if fresh {
            state.run_before_enter(object, &transition);
        }
        self.write_value(object, state.stored_value().clone());
        if fresh {
            state.run_after_enter(object, &transition);
            if let Some(recorder) = &self.recorder {
                recorder.record(object, None, None, &name);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{EventBuilder, MachineBuilder, TransitionRuleBuilder};
    use crate::core::{CallbackFilter, StateDef, StateValue, TransitionLog};
    use crate::machine::{FieldAccessor, FnRecorder};

    #[derive(Default)]
    struct Vehicle {
        state: Option<StateValue>,
        shop_available: bool,
        seatbelt_on: bool,
        enters: usize,
        exits: usize,
        failures: usize,
        afters: usize,
        saves: usize,
        log: TransitionLog,
    }

    fn accessor() -> FieldAccessor<Vehicle> {
        FieldAccessor::new(
            |vehicle: &Vehicle| vehicle.state.clone(),
            |vehicle, value| vehicle.state = Some(value),
        )
    }

    fn builder() -> MachineBuilder<Vehicle> {
        MachineBuilder::new("state")
            .accessor(accessor())
            .initial("parked")
            .state("parked")
            .state_def(
                StateDef::new("idling")
                    .before_enter(|v: &mut Vehicle, _| v.enters += 1)
                    .after_enter(|v: &mut Vehicle, _| v.enters += 1),
            )
            .state_def(
                StateDef::new("stalled")
                    .before_enter(|v: &mut Vehicle, _| v.enters += 1)
                    .before_exit(|v: &mut Vehicle, _| v.exits += 1)
                    .after_exit(|v: &mut Vehicle, _| v.exits += 1),
            )
            .event(
                EventBuilder::new("ignite")
                    .transition(TransitionRuleBuilder::new().from(["stalled"]).to("stalled"))
                    .unwrap()
                    .transition(TransitionRuleBuilder::new().from(["parked"]).to("idling"))
                    .unwrap(),
            )
            .event(
                EventBuilder::new("crash")
                    .transition(
                        TransitionRuleBuilder::new()
                            .from(["parked", "idling"])
                            .to("stalled")
                            .when(|v: &Vehicle, _| v.shop_available),
                    )
                    .unwrap(),
            )
            .on_failure(CallbackFilter::any(), |v: &mut Vehicle, _| v.failures += 1)
    }

    fn state_of(vehicle: &Vehicle) -> &StateValue {
        vehicle.state.as_ref().unwrap()
    }

    #[test]
    fn fire_moves_through_the_first_matching_rule() {
        let machine = builder().build().unwrap();
        let mut vehicle = Vehicle::default();

        assert_eq!(machine.fire(&mut vehicle, "ignite"), Ok(true));
        assert_eq!(state_of(&vehicle), &StateValue::Str("idling".to_string()));
        // before-enter and after-enter on idling.
        assert_eq!(vehicle.enters, 2);
    }

    #[test]
    fn loopback_skips_enter_and_exit_slots() {
        let machine = builder().build().unwrap();
        let mut vehicle = Vehicle {
            state: Some(StateValue::Str("stalled".to_string())),
            ..Vehicle::default()
        };

        assert_eq!(machine.fire(&mut vehicle, "ignite"), Ok(true));
        assert_eq!(machine.fire(&mut vehicle, "ignite"), Ok(true));

        assert_eq!(state_of(&vehicle), &StateValue::Str("stalled".to_string()));
        assert_eq!(vehicle.enters, 0);
        assert_eq!(vehicle.exits, 0);
    }

    #[test]
    fn no_matching_transition_returns_false_without_mutation() {
        let machine = builder().build().unwrap();
        let mut vehicle = Vehicle {
            state: Some(StateValue::Str("idling".to_string())),
            ..Vehicle::default()
        };

        assert_eq!(machine.fire(&mut vehicle, "ignite"), Ok(false));
        assert_eq!(state_of(&vehicle), &StateValue::Str("idling".to_string()));
        assert_eq!(vehicle.failures, 1);
    }

    #[test]
    fn refused_guard_returns_false_without_mutation() {
        let machine = builder().build().unwrap();
        let mut vehicle = Vehicle::default();
        machine.initialize(&mut vehicle).unwrap();

        assert_eq!(machine.fire(&mut vehicle, "crash"), Ok(false));
        assert_eq!(state_of(&vehicle), &StateValue::Str("parked".to_string()));
        assert_eq!(vehicle.failures, 1);

        vehicle.shop_available = true;
        assert_eq!(machine.fire(&mut vehicle, "crash"), Ok(true));
        assert_eq!(state_of(&vehicle), &StateValue::Str("stalled".to_string()));
    }

    #[test]
    fn halting_before_callback_leaves_the_attribute_unchanged() {
        let machine = builder()
            .before_transition(CallbackFilter::any(), |v: &mut Vehicle, _| v.seatbelt_on)
            .build()
            .unwrap();
        let mut vehicle = Vehicle::default();

        assert_eq!(machine.fire(&mut vehicle, "ignite"), Ok(false));
        assert_eq!(state_of(&vehicle), &StateValue::Str("parked".to_string()));
        assert_eq!(vehicle.failures, 1);
        assert_eq!(vehicle.enters, 0);

        vehicle.seatbelt_on = true;
        assert_eq!(machine.fire(&mut vehicle, "ignite"), Ok(true));
        assert_eq!(state_of(&vehicle), &StateValue::Str("idling".to_string()));
    }

    #[test]
    fn after_callbacks_run_only_on_success() {
        let machine = builder()
            .after_transition(CallbackFilter::any(), |v: &mut Vehicle, t| {
                assert!(t.success);
                v.afters += 1;
            })
            .build()
            .unwrap();
        let mut vehicle = Vehicle::default();

        machine.fire(&mut vehicle, "ignite").unwrap();
        assert_eq!(vehicle.afters, 1);

        machine.fire(&mut vehicle, "ignite").unwrap();
        assert_eq!(vehicle.afters, 1);
        assert_eq!(vehicle.failures, 1);
    }

    #[test]
    fn failing_persistence_reports_false_and_keeps_the_mutation() {
        let machine = builder()
            .persistence(|_: &mut Vehicle| false)
            .after_transition(CallbackFilter::any(), |v: &mut Vehicle, _| v.afters += 1)
            .build()
            .unwrap();
        let mut vehicle = Vehicle::default();

        assert_eq!(machine.fire(&mut vehicle, "ignite"), Ok(false));
        // The attribute reflects the destination; rollback belongs to the
        // persistence collaborator.
        assert_eq!(state_of(&vehicle), &StateValue::Str("idling".to_string()));
        assert_eq!(vehicle.failures, 1);
        assert_eq!(vehicle.afters, 0);
    }

    #[test]
    fn successful_persistence_is_invoked_once_per_fire() {
        let machine = builder()
            .persistence(|v: &mut Vehicle| {
                v.saves += 1;
                true
            })
            .build()
            .unwrap();
        let mut vehicle = Vehicle::default();

        machine.fire(&mut vehicle, "ignite").unwrap();
        assert_eq!(vehicle.saves, 1);
    }

    #[test]
    fn fire_strict_converts_false_into_invalid_transition() {
        let machine = builder().build().unwrap();
        let mut vehicle = Vehicle {
            state: Some(StateValue::Str("idling".to_string())),
            ..Vehicle::default()
        };

        assert_eq!(machine.fire_strict(&mut vehicle, "ignite"), Err(
            MachineError::InvalidTransition {
                event: "ignite".to_string(),
                state: "idling".to_string(),
            }
        ));

        let mut parked = Vehicle::default();
        assert_eq!(machine.fire_strict(&mut parked, "ignite"), Ok(()));
    }

    #[test]
    fn unknown_event_propagates_before_any_callback_runs() {
        let machine = builder().build().unwrap();
        let mut vehicle = Vehicle::default();

        assert_eq!(
            machine.fire(&mut vehicle, "teleport"),
            Err(MachineError::UnknownEvent {
                name: "teleport".to_string()
            })
        );
        assert_eq!(vehicle.failures, 0);
    }

    #[test]
    fn fire_initializes_an_unset_attribute_first() {
        let machine = builder().build().unwrap();
        let mut vehicle = Vehicle::default();

        assert!(vehicle.state.is_none());
        machine.fire(&mut vehicle, "ignite").unwrap();
        assert_eq!(state_of(&vehicle), &StateValue::Str("idling".to_string()));
    }

    #[test]
    fn initialize_runs_enter_slots_and_records_history() {
        let machine = MachineBuilder::new("state")
            .accessor(accessor())
            .initial("stalled")
            .state("parked")
            .state_def(
                StateDef::new("stalled").before_enter(|v: &mut Vehicle, _| v.enters += 1),
            )
            .recorder(
                FnRecorder::new(|v: &mut Vehicle, record| v.log = v.log.record(record))
                    .with_presence(|v: &Vehicle| !v.log.is_empty()),
            )
            .build()
            .unwrap();

        let mut vehicle = Vehicle::default();
        machine.initialize(&mut vehicle).unwrap();

        assert_eq!(vehicle.enters, 1);
        assert_eq!(vehicle.log.len(), 1);
        let record = &vehicle.log.records()[0];
        assert!(record.event.is_none());
        assert!(record.from.is_none());
        assert_eq!(record.to, "stalled");

        // A second initialize is a no-op: the attribute is populated.
        machine.initialize(&mut vehicle).unwrap();
        assert_eq!(vehicle.enters, 1);
        assert_eq!(vehicle.log.len(), 1);
    }

    #[test]
    fn initialize_skips_enter_slots_when_history_exists() {
        let machine = MachineBuilder::new("state")
            .accessor(accessor())
            .initial("parked")
            .state_def(StateDef::new("parked").before_enter(|v: &mut Vehicle, _| v.enters += 1))
            .recorder(
                FnRecorder::new(|v: &mut Vehicle, record| v.log = v.log.record(record))
                    .with_presence(|v: &Vehicle| !v.log.is_empty()),
            )
            .build()
            .unwrap();

        let mut vehicle = Vehicle::default();
        vehicle.log = vehicle.log.record(crate::core::TransitionRecord {
            event: None,
            from: None,
            to: "parked".to_string(),
            timestamp: chrono::Utc::now(),
        });

        machine.initialize(&mut vehicle).unwrap();
        assert_eq!(vehicle.enters, 0);
        assert_eq!(vehicle.log.len(), 1);
        assert_eq!(state_of(&vehicle), &StateValue::Str("parked".to_string()));
    }

    #[test]
    fn dynamic_initial_state_consults_the_object() {
        let machine = MachineBuilder::new("state")
            .accessor(accessor())
            .initial_with(|vehicle: &Vehicle| {
                if vehicle.shop_available {
                    "idling".to_string()
                } else {
                    "parked".to_string()
                }
            })
            .states(["parked", "idling"])
            .build()
            .unwrap();

        let mut grounded = Vehicle::default();
        machine.initialize(&mut grounded).unwrap();
        assert_eq!(state_of(&grounded), &StateValue::Str("parked".to_string()));

        let mut ready = Vehicle {
            shop_available: true,
            ..Vehicle::default()
        };
        machine.initialize(&mut ready).unwrap();
        assert_eq!(state_of(&ready), &StateValue::Str("idling".to_string()));
    }

    #[test]
    fn missing_initial_state_is_reported() {
        let machine = MachineBuilder::new("state")
            .accessor(accessor())
            .states(["parked"])
            .build()
            .unwrap();

        let mut vehicle = Vehicle::default();
        assert_eq!(
            machine.fire(&mut vehicle, "ignite").unwrap_err(),
            MachineError::NoInitialState {
                attribute: "state".to_string()
            }
        );
    }

    #[test]
    fn dynamic_initial_resolving_to_unknown_state_errors() {
        let machine = MachineBuilder::new("state")
            .accessor(accessor())
            .initial_with(|_: &Vehicle| "flying".to_string())
            .states(["parked"])
            .build()
            .unwrap();

        let mut vehicle = Vehicle::default();
        assert_eq!(
            machine.initialize(&mut vehicle).unwrap_err(),
            MachineError::UnknownState {
                name: "flying".to_string()
            }
        );
    }

    #[test]
    fn recorder_sees_each_successful_transition() {
        let machine = builder()
            .recorder(FnRecorder::new(|v: &mut Vehicle, record| {
                v.log = v.log.record(record)
            }))
            .build()
            .unwrap();
        let mut vehicle = Vehicle::default();

        machine.fire(&mut vehicle, "ignite").unwrap();
        vehicle.shop_available = true;
        machine.fire(&mut vehicle, "crash").unwrap();
        // Refused fires leave no record.
        machine.fire(&mut vehicle, "crash").unwrap();

        let path = vehicle.log.get_path();
        assert_eq!(path, vec!["parked", "idling", "stalled", "stalled"]);
    }

    #[test]
    fn event_after_callbacks_run_last_on_success() {
        let machine = builder()
            .after_transition(CallbackFilter::any(), |v: &mut Vehicle, _| {
                v.afters += 1;
            })
            .event(
                EventBuilder::new("park")
                    .transition(TransitionRuleBuilder::new().from(["idling"]).to("parked"))
                    .unwrap()
                    .after_fire(|v: &mut Vehicle, t| {
                        assert_eq!(t.event.as_deref(), Some("park"));
                        // The machine-level after chain has already run.
                        assert_eq!(v.afters, 2);
                        v.afters *= 10;
                    }),
            )
            .build()
            .unwrap();

        let mut vehicle = Vehicle::default();
        machine.fire(&mut vehicle, "ignite").unwrap();
        machine.fire(&mut vehicle, "park").unwrap();
        assert_eq!(vehicle.afters, 20);
    }

    #[test]
    fn args_ride_along_on_the_transition_instance() {
        let machine = builder()
            .before_transition(CallbackFilter::any(), |_: &mut Vehicle, t: &ActiveTransition| {
                t.args.first().and_then(|arg| arg.as_bool()).unwrap_or(true)
            })
            .build()
            .unwrap();

        let mut vehicle = Vehicle::default();
        assert_eq!(
            machine.fire_with(&mut vehicle, "ignite", vec![serde_json::json!(false)]),
            Ok(false)
        );
        assert_eq!(
            machine.fire_with(&mut vehicle, "ignite", vec![serde_json::json!(true)]),
            Ok(true)
        );
    }
}
