//! Integration Tests: End-to-End Learning Flows
//!
//! These tests drive the public API the way an embedding host would:
//! runtime → state → update/query/introspect → persist → restore.

use std::sync::Arc;

use mind_core::{
    MERCY_FLOOR, MemoryConfig, MemoryState, MindConfig, MindError, Runtime, Status,
};

const A: [f32; 4] = [1.0, 0.0, 0.0, 0.0];
const B: [f32; 4] = [0.0, 1.0, 0.0, 0.0];
const C: [f32; 4] = [0.0, 0.0, 1.0, 0.0];
const D: [f32; 4] = [0.0, 0.0, 0.0, 1.0];

fn runtime() -> Runtime {
    Runtime::new(MemoryConfig::new(4, 8)).expect("runtime")
}

// ---------------------------------------------------------------------------
// Repeated observation: one slot, growing confidence
// ---------------------------------------------------------------------------

#[test]
fn ten_repetitions_form_one_confident_slot() {
    let rt = runtime();
    let id = rt.create_state().expect("create");
    let state = rt.state(id).expect("state");

    for _ in 0..10 {
        state.write().update(&A, 1.0).expect("update");
    }

    let s = state.read();
    assert_eq!(s.slot_count(), 1);
    let t = s.temporal().expect("temporal");
    assert!((t.age - 10.0).abs() < 1e-12);
    assert_eq!(t.total_updates, 10);
    let hint = s.query(&A).expect("query");
    assert!(hint.is_match());
    assert_eq!(hint.dim, 4);
    assert!(hint.confidence > 0.0);
}

#[test]
fn thousand_repetitions_respect_mercy_floor() {
    let rt = runtime();
    let id = rt.create_state().expect("create");
    let state = rt.state(id).expect("state");

    let mut last_confidence = 0.0;
    for i in 0..1000 {
        let mut s = state.write();
        s.update(&A, 1.0).expect("update");
        let p = s.plasticity().expect("plasticity");
        assert!(p.plasticity >= MERCY_FLOOR && p.plasticity <= 1.0);
        if i % 100 == 0 {
            let c = s.query(&A).expect("query").confidence;
            assert!(c >= last_confidence);
            last_confidence = c;
        }
    }
    let s = state.read();
    assert_eq!(s.slot_count(), 1);
    let c = s.calibration().expect("calibration");
    assert!(c.maturity > 0.99 && c.maturity < 1.0);
    assert!((c.reinforcement_ratio - 0.999).abs() < 1e-12);
}

#[test]
fn interleaved_patterns_keep_separate_slots() {
    let rt = Runtime::new(MemoryConfig::new(4, 16)).expect("runtime");
    let id = rt.create_state().expect("create");
    let state = rt.state(id).expect("state");

    let patterns = [A, B, C];
    for i in 0..100 {
        state.write().update(&patterns[i % 3], 1.0).expect("update");
    }

    let s = state.read();
    assert!(s.slot_count() <= 3);
    assert_eq!(s.total_updates(), 100);
    assert_eq!(s.total_reinforcements(), 97);
    for p in &patterns {
        assert!(s.query(p).expect("query").confidence > 0.0);
    }
    assert!(!s.query(&D).expect("query").is_match());
}

#[test]
fn noisy_repetitions_converge_on_one_slot() {
    let mut state = MemoryState::new(Arc::new(MindConfig::with_memory(MemoryConfig::new(4, 8))))
        .expect("state");
    for i in 0..50u8 {
        let jitter = f32::from(i % 5) * 0.02;
        state.update(&[1.0, jitter, 0.0, 0.0], 0.5).expect("update");
    }
    assert_eq!(state.slot_count(), 1);
    assert!(state.query(&A).expect("query").confidence > 0.5);
}

// ---------------------------------------------------------------------------
// Capacity
// ---------------------------------------------------------------------------

#[test]
fn capacity_is_never_exceeded() {
    let rt = Runtime::new(MemoryConfig::new(8, 4)).expect("runtime");
    let id = rt.create_state().expect("create");
    let state = rt.state(id).expect("state");

    for i in 0..8 {
        let mut e = [0.0f32; 8];
        e[i] = 1.0;
        // Reinforce the first pattern often enough to outrank newcomers.
        state.write().update(&e, 1.0).expect("update");
        if i == 0 {
            for _ in 0..5 {
                state.write().update(&e, 1.0).expect("update");
            }
        }
        assert!(state.read().slot_count() <= 4);
    }

    let mut first = [0.0f32; 8];
    first[0] = 1.0;
    assert!(state.read().query(&first).expect("query").is_match());
}

// ---------------------------------------------------------------------------
// Determinism
// ---------------------------------------------------------------------------

#[test]
fn identical_sequences_are_bit_identical() {
    let rt = runtime();
    let a = rt.create_state().expect("create");
    let b = rt.create_state().expect("create");

    let seq = [(A, 0.5), (B, 1.5), (A, 0.25), (C, 2.0), (A, 1.0), (B, 0.75)];
    for id in [a, b] {
        let state = rt.state(id).expect("state");
        for _ in 0..20 {
            for (e, dt) in &seq {
                state.write().update(e, *dt).expect("update");
            }
        }
    }

    let sa = rt.state(a).expect("a");
    let sb = rt.state(b).expect("b");
    let (sa, sb) = (sa.read(), sb.read());
    assert_eq!(sa.slots(), sb.slots());
    for q in [A, B, C, D] {
        assert_eq!(
            sa.query(&q).expect("query").confidence.to_bits(),
            sb.query(&q).expect("query").confidence.to_bits()
        );
    }
    assert_eq!(sa.calibration().expect("c"), sb.calibration().expect("c"));
}

// ---------------------------------------------------------------------------
// Persistence: save → restore into another runtime
// ---------------------------------------------------------------------------

#[test]
fn save_and_restore_across_runtimes() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("learner.mind");

    let source = runtime();
    let id = source.create_state().expect("create");
    {
        let state = source.state(id).expect("state");
        let mut s = state.write();
        for _ in 0..25 {
            s.update(&A, 1.0).expect("update");
            s.update(&B, 2.0).expect("update");
        }
        s.save(&path).expect("save");
    }

    let target = runtime();
    let id2 = target.create_state().expect("create");
    let restored = target.state(id2).expect("state");
    restored.write().load(&path).expect("load");

    let original = source.state(id).expect("state");
    let (o, r) = (original.read(), restored.read());
    assert_eq!(o.slot_count(), r.slot_count());
    assert_eq!(o.total_updates(), r.total_updates());
    assert_eq!(o.temporal().expect("t"), r.temporal().expect("t"));
    for q in [A, B, C] {
        let (ho, hr) = (o.query(&q).expect("q"), r.query(&q).expect("q"));
        assert_eq!(ho.confidence.to_bits(), hr.confidence.to_bits());
        assert_eq!(ho.vector, hr.vector);
    }
}

#[test]
fn failed_load_keeps_learned_state() {
    let dir = tempfile::tempdir().expect("tempdir");
    let rt = runtime();
    let id = rt.create_state().expect("create");
    let state = rt.state(id).expect("state");
    for _ in 0..5 {
        state.write().update(&C, 1.0).expect("update");
    }
    let before = state.read().clone();

    std::fs::write(dir.path().join("junk.mind"), b"not a state file at all, clearly")
        .expect("write");
    let result = state.write().load(dir.path().join("junk.mind"));
    assert_eq!(Status::of(&result), Status::Corrupt);

    let result = state.write().load(dir.path().join("missing.mind"));
    assert_eq!(Status::of(&result), Status::FileNotFound);

    let after = state.read();
    assert_eq!(after.slots(), before.slots());
    assert_eq!(after.cumulative_age(), before.cumulative_age());
}

// ---------------------------------------------------------------------------
// Reset
// ---------------------------------------------------------------------------

#[test]
fn reset_state_behaves_like_new_one() {
    let rt = runtime();
    let used = rt.create_state().expect("create");
    let fresh = rt.create_state().expect("create");

    {
        let state = rt.state(used).expect("state");
        let mut s = state.write();
        for _ in 0..30 {
            s.update(&D, 0.3).expect("update");
        }
        s.reset();
        assert_eq!(s.slot_count(), 0);
        assert_eq!(Status::of(&s.temporal()), Status::NoData);
    }

    for id in [used, fresh] {
        let state = rt.state(id).expect("state");
        for _ in 0..4 {
            state.write().update(&B, 1.0).expect("update");
        }
    }
    let u = rt.state(used).expect("u");
    let f = rt.state(fresh).expect("f");
    assert_eq!(u.read().slots(), f.read().slots());
    assert_eq!(u.read().temporal().expect("t"), f.read().temporal().expect("t"));
}

// ---------------------------------------------------------------------------
// Error surface
// ---------------------------------------------------------------------------

#[test]
fn status_codes_cover_failure_modes() {
    assert_eq!(Status::Ok.code(), 0);

    let bad = Runtime::new(MemoryConfig::new(0, 8));
    assert_eq!(Status::of(&bad), Status::Validation);

    let rt = runtime();
    let id = rt.create_state().expect("create");
    let state = rt.state(id).expect("state");

    assert_eq!(Status::of(&state.read().plasticity()), Status::NoData);
    assert_eq!(
        Status::of(&state.write().update(&[1.0, 0.0], 1.0)),
        Status::Validation
    );
    assert_eq!(Status::of(&state.write().update(&A, 0.0)), Status::Validation);
    assert_eq!(Status::of(&state.read().query(&[1.0; 5])), Status::Validation);
    assert_eq!(Status::of(&state.write().update(&A, 1.0)), Status::Ok);

    rt.destroy_state(id).expect("destroy");
    let gone = rt.state(id);
    assert_eq!(Status::of(&gone), Status::InvalidHandle);
    assert!(matches!(gone, Err(MindError::UnknownState(_))));
}

#[test]
fn config_file_drives_runtime() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("mind.toml");
    std::fs::write(
        &path,
        "[memory]\nembedding_dim = 3\nmax_memory_slots = 2\n\n[persistence]\nsync_on_save = false\n",
    )
    .expect("write");

    let config = MindConfig::from_file(&path).expect("config");
    assert!(config.persistence.checksum_enabled);
    let rt = Runtime::from_config(config).expect("runtime");
    let id = rt.create_state().expect("create");
    let state = rt.state(id).expect("state");

    let mut s = state.write();
    s.update(&[1.0, 0.0, 0.0], 1.0).expect("update");
    s.update(&[0.0, 1.0, 0.0], 1.0).expect("update");
    s.update(&[0.0, 0.0, 1.0], 1.0).expect("update");
    assert_eq!(s.slot_count(), 2);

    let file = dir.path().join("tiny.mind");
    s.save(&file).expect("save");
    s.load(&file).expect("load");
    assert_eq!(s.slot_count(), 2);
}

// ---------------------------------------------------------------------------
// Concurrency: independent learners on separate threads
// ---------------------------------------------------------------------------

#[test]
fn states_learn_in_parallel() {
    let rt = runtime();
    let ids: Vec<_> = (0..4).map(|_| rt.create_state().expect("create")).collect();
    let patterns = [A, B, C, D];

    std::thread::scope(|scope| {
        for (id, pattern) in ids.iter().zip(patterns) {
            let rt = &rt;
            scope.spawn(move || {
                let state = rt.state(*id).expect("state");
                for _ in 0..200 {
                    state.write().update(&pattern, 1.0).expect("update");
                }
            });
        }
    });

    for (id, pattern) in ids.iter().zip(patterns) {
        let state = rt.state(*id).expect("state");
        let s = state.read();
        assert_eq!(s.slot_count(), 1);
        assert_eq!(s.total_updates(), 200);
        assert!(s.query(&pattern).expect("query").confidence > 0.9);
    }
}
