//! Minimal end-to-end session run against the in-memory engine.

use mapsession::engine::memory::{MemoryEngine, MemoryView};
use mapsession::engine::version_report;
use mapsession::prelude::*;

fn main() -> Result<()> {
    env_logger::init();

    let engine = MemoryEngine::new();
    let mut registry = SessionRegistry::new();

    let options = SessionOptions::with_sample_cities().with_memory_hint(768);
    let (outcome, session) = registry.open(&engine, "main", options)?;
    println!(
        "opened '{}' ({:?}): {:?}, {} layers, reduce factor {}",
        session.id(),
        outcome,
        session.state(),
        session.layers().len(),
        session.profile().reduce_factor,
    );

    session.bind_view(Box::new(MemoryView::new()))?;
    session.restore_state(&ViewState::default());
    if let Some(state) = session.save_state() {
        println!(
            "view state: scale {}, center ({}, {})",
            state.scale, state.center_x, state.center_y
        );
    }

    println!("{}", version_report(&engine));

    registry.close_all()?;
    Ok(())
}
