//! Builder API for ergonomic machine construction.
//!
//! This module provides fluent builders and macros for declaring
//! machines with minimal boilerplate, plus whole-configuration
//! validation that reports every problem in one pass.

pub mod error;
pub mod machine;
pub mod macros;
pub mod transition;

pub use error::{BuildError, ConfigViolation};
pub use machine::MachineBuilder;
pub use transition::{EventBuilder, TransitionRuleBuilder};

use crate::core::{ActiveTransition, TransitionRule};

/// Create an unguarded rule from the given origin states.
///
/// # Example
///
/// ```rust
/// use statecraft::builder::simple_rule;
/// use statecraft::core::TransitionRule;
///
/// let rule: TransitionRule<()> = simple_rule(["parked"], "idling");
/// assert_eq!(rule.to(), "idling");
/// ```
pub fn simple_rule<T, I, S>(origins: I, to: impl Into<String>) -> TransitionRule<T>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    TransitionRuleBuilder::new()
        .from(origins)
        .to(to)
        .build()
        .expect("simple rule should always build")
}

/// Create a guarded rule from the given origin states.
///
/// # Example
///
/// ```rust
/// use statecraft::builder::guarded_rule;
/// use statecraft::core::TransitionRule;
///
/// struct Vehicle {
///     shop_available: bool,
/// }
///
/// let rule: TransitionRule<Vehicle> =
///     guarded_rule(["idling"], "stalled", |v: &Vehicle, _| v.shop_available);
/// assert!(rule.guard().is_some());
/// ```
pub fn guarded_rule<T, I, S, F>(origins: I, to: impl Into<String>, guard: F) -> TransitionRule<T>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
    F: Fn(&T, &ActiveTransition) -> bool + Send + Sync + 'static,
{
    TransitionRuleBuilder::new()
        .from(origins)
        .to(to)
        .when(guard)
        .build()
        .expect("guarded rule should always build")
}
