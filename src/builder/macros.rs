//! Macros for ergonomic machine-driven APIs.

/// Generate named wrapper methods over the dispatch-table API.
///
/// The engine's surface is name-based (`fire("ignite")`,
/// `is_state("parked")`), which keeps configuration declarative but
/// reads poorly at call sites. This macro generates inherent methods on
/// the owning type that delegate to a machine expression (typically a
/// function returning a `&'static Machine`).
///
/// Each `state` arm generates a predicate; each `event` arm generates
/// the firing method, its strict variant, and a `can`-style query.
///
/// # Example
///
/// ```rust
/// use statecraft::machine_methods;
/// use statecraft::builder::{EventBuilder, MachineBuilder, TransitionRuleBuilder};
/// use statecraft::core::StateValue;
/// use statecraft::machine::{FieldAccessor, Machine};
/// use std::sync::OnceLock;
///
/// #[derive(Default)]
/// struct Vehicle {
///     state: Option<StateValue>,
/// }
///
/// fn vehicle_machine() -> &'static Machine<Vehicle> {
///     static MACHINE: OnceLock<Machine<Vehicle>> = OnceLock::new();
///     MACHINE.get_or_init(|| {
///         MachineBuilder::new("state")
///             .accessor(FieldAccessor::new(
///                 |v: &Vehicle| v.state.clone(),
///                 |v, value| v.state = Some(value),
///             ))
///             .initial("parked")
///             .states(["parked", "idling"])
///             .event(
///                 EventBuilder::new("ignite")
///                     .transition(TransitionRuleBuilder::new().from(["parked"]).to("idling"))
///                     .unwrap(),
///             )
///             .build()
///             .unwrap()
///     })
/// }
///
/// machine_methods! {
///     impl Vehicle { machine: vehicle_machine();
///         state "parked" => is_parked;
///         state "idling" => is_idling;
///         event "ignite" => ignite, ignite_strict, can_ignite;
///     }
/// }
///
/// let mut vehicle = Vehicle::default();
/// vehicle_machine().initialize(&mut vehicle).unwrap();
///
/// assert!(vehicle.is_parked());
/// assert!(vehicle.can_ignite());
/// assert_eq!(vehicle.ignite().unwrap(), true);
/// assert!(vehicle.is_idling());
/// ```
#[macro_export]
macro_rules! machine_methods {
    (
        impl $owner:ty { machine: $machine:expr;
            $( state $state:literal => $predicate:ident; )*
            $( event $event:literal => $fire:ident, $strict:ident, $can:ident; )*
        }
    ) => {
        impl $owner {
            $(
                pub fn $predicate(&self) -> bool {
                    ($machine).is_state(self, $state).unwrap_or(false)
                }
            )*
            $(
                pub fn $fire(&mut self) -> ::std::result::Result<bool, $crate::MachineError> {
                    ($machine).fire(self, $event)
                }

                pub fn $strict(&mut self) -> ::std::result::Result<(), $crate::MachineError> {
                    ($machine).fire_strict(self, $event)
                }

                pub fn $can(&self) -> bool {
                    ($machine).can_fire(self, $event).unwrap_or(false)
                }
            )*
        }
    };
}
