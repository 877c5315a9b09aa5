//! Document Review Workflow
//!
//! This example demonstrates callback chains, a failing persistence
//! action, history recording, and snapshots.
//!
//! Key concepts:
//! - Machine-level before/after/failure callbacks with filters
//! - Persistence refusal reported as a false outcome
//! - History recorded per successful transition
//! - Snapshot capture and restore
//!
//! Run with: cargo run --example document_review

use statecraft::builder::{EventBuilder, MachineBuilder, TransitionRuleBuilder};
use statecraft::core::{CallbackFilter, StateValue, TransitionLog};
use statecraft::machine::{FieldAccessor, FnRecorder, Machine};
use statecraft::snapshot::MachineSnapshot;

#[derive(Default)]
struct Document {
    state: Option<StateValue>,
    body: String,
    storage_healthy: bool,
    log: TransitionLog,
}

fn review_machine() -> Machine<Document> {
    MachineBuilder::new("state")
        .accessor(FieldAccessor::new(
            |doc: &Document| doc.state.clone(),
            |doc, value| doc.state = Some(value),
        ))
        .initial("draft")
        .states(["draft", "in_review", "published", "rejected"])
        .event(
            EventBuilder::new("submit")
                .transition(TransitionRuleBuilder::new().from(["draft"]).to("in_review"))
                .unwrap(),
        )
        .event(
            EventBuilder::new("approve")
                .transition(
                    TransitionRuleBuilder::new()
                        .from(["in_review"])
                        .to("published"),
                )
                .unwrap(),
        )
        .event(
            EventBuilder::new("reject")
                .transition(TransitionRuleBuilder::new().from(["in_review"]).to("rejected"))
                .unwrap(),
        )
        // Empty documents never leave draft.
        .before_transition(
            CallbackFilter::any().on_events(["submit"]),
            |doc: &mut Document, _| !doc.body.is_empty(),
        )
        .after_transition(CallbackFilter::any().to_states(["published"]), |_, t| {
            println!("  [callback] published via {:?}", t.event.as_deref());
        })
        .on_failure(CallbackFilter::any(), |_, t| {
            println!("  [callback] failed to apply {:?}", t.event.as_deref());
        })
        .persistence(|doc: &mut Document| doc.storage_healthy)
        .recorder(
            FnRecorder::new(|doc: &mut Document, record| doc.log = doc.log.record(record))
                .with_presence(|doc: &Document| !doc.log.is_empty()),
        )
        .build()
        .unwrap()
}

fn main() {
    println!("=== Document Review Workflow ===\n");

    let machine = review_machine();
    let mut document = Document {
        storage_healthy: true,
        ..Document::default()
    };
    machine.initialize(&mut document).unwrap();
    println!("Initial state: {:?}", document.state);

    println!("\nSubmitting an empty document (halted by before callback):");
    let fired = machine.fire(&mut document, "submit").unwrap();
    println!("  fired: {fired}");
    println!("  state: {:?}", document.state);

    println!("\nSubmitting once there is content:");
    document.body = "state machines, declaratively".to_string();
    let fired = machine.fire(&mut document, "submit").unwrap();
    println!("  fired: {fired}");
    println!("  state: {:?}", document.state);

    println!("\nApproving while storage is down (persistence refuses):");
    document.storage_healthy = false;
    let fired = machine.fire(&mut document, "approve").unwrap();
    println!("  fired: {fired}");
    println!("  state kept in memory: {:?}", document.state);

    println!("\nHistory so far:");
    for record in document.log.records() {
        println!(
            "  {:?} -> {} (via {:?})",
            record.from.as_deref(),
            record.to,
            record.event.as_deref()
        );
    }

    println!("\nSnapshot round trip:");
    let snapshot = MachineSnapshot::capture(&machine, &document, &document.log).unwrap();
    let json = snapshot.to_json().unwrap();
    println!("  captured {} bytes of JSON", json.len());

    let restored = MachineSnapshot::from_json(&json).unwrap();
    let mut revived = Document::default();
    restored.restore(&machine, &mut revived).unwrap();
    println!(
        "  restored state: {}",
        machine.current_state_name(&revived).unwrap()
    );

    println!("\n=== Example Complete ===");
}
