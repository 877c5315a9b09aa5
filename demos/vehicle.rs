//! Vehicle State Machine
//!
//! This example demonstrates first-match transition resolution, guarded
//! transitions, loopbacks, and the named-wrapper macro.
//!
//! Key concepts:
//! - Declaration-order, first-match rule resolution
//! - A self-loop rule declared ahead of a broader rule
//! - Guards over the owning object
//! - Named wrappers generated over the dispatch-table API
//!
//! Run with: cargo run --example vehicle

use statecraft::builder::{EventBuilder, MachineBuilder, TransitionRuleBuilder};
use statecraft::core::StateValue;
use statecraft::machine::{FieldAccessor, Machine};
use statecraft::machine_methods;
use std::sync::OnceLock;

#[derive(Default)]
struct Vehicle {
    state: Option<StateValue>,
    shop_available: bool,
}

fn vehicle_machine() -> &'static Machine<Vehicle> {
    static MACHINE: OnceLock<Machine<Vehicle>> = OnceLock::new();
    MACHINE.get_or_init(|| {
        MachineBuilder::new("state")
            .accessor(FieldAccessor::new(
                |vehicle: &Vehicle| vehicle.state.clone(),
                |vehicle, value| vehicle.state = Some(value),
            ))
            .initial("parked")
            .states(["parked", "idling", "stalled"])
            .event(
                EventBuilder::new("ignite")
                    // A stalled engine turns over but stays stalled; the
                    // self-loop is declared first so it wins.
                    .transition(TransitionRuleBuilder::new().from(["stalled"]).to("stalled"))
                    .unwrap()
                    .transition(TransitionRuleBuilder::new().from(["parked"]).to("idling"))
                    .unwrap(),
            )
            .event(
                EventBuilder::new("crash")
                    .transition(
                        TransitionRuleBuilder::new()
                            .from(["idling"])
                            .to("stalled")
                            .when(|vehicle: &Vehicle, _| vehicle.shop_available),
                    )
                    .unwrap(),
            )
            .event(
                EventBuilder::new("repair")
                    .transition(TransitionRuleBuilder::new().from(["stalled"]).to("parked"))
                    .unwrap(),
            )
            .build()
            .unwrap()
    })
}

machine_methods! {
    impl Vehicle { machine: vehicle_machine();
        state "parked" => is_parked;
        state "idling" => is_idling;
        state "stalled" => is_stalled;
        event "ignite" => ignite, ignite_strict, can_ignite;
        event "crash" => crash, crash_strict, can_crash;
        event "repair" => repair, repair_strict, can_repair;
    }
}

fn main() {
    println!("=== Vehicle State Machine ===\n");

    let mut vehicle = Vehicle::default();
    vehicle_machine().initialize(&mut vehicle).unwrap();
    println!("Initial state: {:?}", vehicle.state);

    println!("\nIgnite from parked:");
    println!("  fired: {:?}", vehicle.ignite().unwrap());
    println!("  idling? {}", vehicle.is_idling());

    println!("\nCrash without a shop available:");
    println!("  can_crash? {}", vehicle.can_crash());
    println!("  fired: {:?}", vehicle.crash().unwrap());
    println!("  still idling? {}", vehicle.is_idling());

    println!("\nCrash once a shop opens up:");
    vehicle.shop_available = true;
    println!("  fired: {:?}", vehicle.crash().unwrap());
    println!("  stalled? {}", vehicle.is_stalled());

    println!("\nIgnite while stalled (loopback, declared first):");
    println!("  fired: {:?}", vehicle.ignite().unwrap());
    println!("  still stalled? {}", vehicle.is_stalled());

    println!("\nRepair and park:");
    println!("  fired: {:?}", vehicle.repair().unwrap());
    println!("  parked? {}", vehicle.is_parked());

    println!("\n=== Example Complete ===");
}
