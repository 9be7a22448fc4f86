//! Minimal MIND walkthrough: configure, learn, recall, introspect, persist.
//!
//! ```sh
//! RUST_LOG=mind_core=debug cargo run -p mind-core --example minimal
//! ```

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use mind_core::{MemoryConfig, Runtime};

fn section(title: &str) {
    println!("\n--- {title} ---");
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("MIND Cognitive Runtime v{}", mind_core::version());
    println!("{}", "=".repeat(41));

    section("Configuration");
    let memory = MemoryConfig::new(4, 8);
    println!("Dimension:  {}", memory.embedding_dim);
    println!("Max slots:  {}", memory.max_memory_slots);

    let runtime = Runtime::new(memory)?;
    let id = runtime.create_state()?;
    let state = runtime.state(id)?;

    section("Feeding Experience");
    // Close enough to share a slot.
    let pattern_a: [f32; 4] = [1.0, 0.0, 0.0, 0.0];
    let pattern_b: [f32; 4] = [0.98, 0.1, 0.0, 0.0];
    // Orthogonal: gets its own slot.
    let pattern_c: [f32; 4] = [0.0, 0.0, 1.0, 0.0];

    for _ in 0..10 {
        state.write().update(&pattern_a, 1.0)?;
    }
    println!("Fed pattern A x10 -> slots: {}", state.read().slot_count());
    for _ in 0..5 {
        state.write().update(&pattern_b, 1.0)?;
    }
    println!("Fed pattern B x5  -> slots: {}", state.read().slot_count());
    state.write().update(&pattern_c, 1.0)?;
    println!("Fed pattern C x1  -> slots: {}", state.read().slot_count());

    section("Querying");
    for (name, cue) in [("A", pattern_a), ("C", pattern_c), ("D", [0.0, 0.0, 0.0, 1.0])] {
        let hint = state.read().query(&cue)?;
        match &hint.vector {
            Some(v) => println!("Query {name}: match {v:?}, confidence {:.4}", hint.confidence),
            None => println!("Query {name}: no match"),
        }
    }

    section("Epistemic State");
    state.write().update(&pattern_a, 1.0)?;
    let s = state.read();
    let p = s.plasticity()?;
    println!("Plasticity: {:.4}", p.plasticity);
    println!("Stability:  {:.4}", p.stability);
    let t = s.temporal()?;
    println!("Age:        {:.1}", t.age);
    println!("Maturity:   {:.4}", t.maturity);
    println!("Velocity:   {:.6}", t.velocity);
    println!("Updates:    {}", t.total_updates);
    drop(s);

    section("Persistence");
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("minimal.mind");
    state.read().save(&path)?;
    println!("Saved to {}", path.display());

    let restored_id = runtime.create_state()?;
    let restored = runtime.state(restored_id)?;
    restored.write().load(&path)?;
    let before = state.read().query(&pattern_a)?.confidence;
    let after = restored.read().query(&pattern_a)?.confidence;
    println!("Restored: {} slots, confidence {after:.4} (was {before:.4})", restored.read().slot_count());

    section("Calibration Export");
    let calibration = state.read().calibration()?;
    println!("{}", serde_json::to_string_pretty(&calibration)?);

    runtime.destroy_state(restored_id)?;
    runtime.destroy_state(id)?;
    println!("\nDone.");
    Ok(())
}
