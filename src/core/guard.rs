//! Guard predicates for controlling state transitions.
//!
//! Guards are boolean functions over the owning object and the pending
//! transition. A transition rule whose guard returns `false` is skipped
//! during resolution and the next declared rule is consulted.

use super::transition::ActiveTransition;
use std::sync::Arc;

/// Predicate that determines whether a transition rule applies.
///
/// Guards are evaluated during resolution, before any callback runs. A
/// guard that panics propagates to the caller of `fire`; the engine does
/// not catch it and no failure callbacks run.
///
/// # Example
///
/// ```rust
/// use statecraft::core::{ActiveTransition, Guard};
///
/// struct Vehicle {
///     shop_available: bool,
/// }
///
/// let available_shop = Guard::new(|vehicle: &Vehicle, _| vehicle.shop_available);
///
/// let pending = ActiveTransition::new("state", "repair", "stalled", "parked", Vec::new());
/// assert!(available_shop.check(&Vehicle { shop_available: true }, &pending));
/// assert!(!available_shop.check(&Vehicle { shop_available: false }, &pending));
/// ```
pub struct Guard<T> {
    predicate: Arc<dyn Fn(&T, &ActiveTransition) -> bool + Send + Sync>,
}

impl<T> Guard<T> {
    /// Create a guard from a predicate over the object and the pending
    /// transition.
    ///
    /// The predicate must be thread-safe (`Send + Sync`); machines are
    /// shared read-only across threads after build.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&T, &ActiveTransition) -> bool + Send + Sync + 'static,
    {
        Guard {
            predicate: Arc::new(predicate),
        }
    }

    /// Evaluate the guard against the object and the pending transition.
    pub fn check(&self, object: &T, transition: &ActiveTransition) -> bool {
        (self.predicate)(object, transition)
    }
}

impl<T> Clone for Guard<T> {
    fn clone(&self) -> Self {
        Self {
            predicate: Arc::clone(&self.predicate),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Vehicle {
        fuel: u32,
    }

    fn pending() -> ActiveTransition {
        ActiveTransition::new("state", "ignite", "parked", "idling", Vec::new())
    }

    #[test]
    fn guard_consults_the_object() {
        let has_fuel = Guard::new(|vehicle: &Vehicle, _| vehicle.fuel > 0);

        assert!(has_fuel.check(&Vehicle { fuel: 10 }, &pending()));
        assert!(!has_fuel.check(&Vehicle { fuel: 0 }, &pending()));
    }

    #[test]
    fn guard_can_inspect_the_pending_transition() {
        let only_ignite =
            Guard::new(|_: &Vehicle, t: &ActiveTransition| t.event.as_deref() == Some("ignite"));

        assert!(only_ignite.check(&Vehicle { fuel: 0 }, &pending()));

        let other = ActiveTransition::new("state", "park", "idling", "parked", Vec::new());
        assert!(!only_ignite.check(&Vehicle { fuel: 0 }, &other));
    }

    #[test]
    fn guard_is_deterministic() {
        let vehicle = Vehicle { fuel: 5 };
        let guard = Guard::new(|v: &Vehicle, _| v.fuel > 3);

        let first = guard.check(&vehicle, &pending());
        let second = guard.check(&vehicle, &pending());

        assert_eq!(first, second);
    }

    #[test]
    fn cloned_guards_share_the_predicate() {
        let guard = Guard::new(|v: &Vehicle, _| v.fuel == 0);
        let copy = guard.clone();

        let empty = Vehicle { fuel: 0 };
        assert_eq!(guard.check(&empty, &pending()), copy.check(&empty, &pending()));
    }
}
