//! Benchmark: KeyRecorder ingestion and per-frame polling.
//!
//! Run with: `cargo bench -p rtkeys-core --bench recorder_bench`
//!
//! Experiment loops call `get_keys` once per frame against a buffer that may
//! hold thousands of events, so query cost over a full ring matters as much
//! as raw ingestion throughput.

use std::rc::Rc;

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use rtkeys_core::clock::{Clock, ManualTimeSource};
use rtkeys_core::config::RecorderConfig;
use rtkeys_core::recorder::{KeyQuery, KeyRecorder};

const CODES: [&str; 8] = [
    "KeyA", "KeyS", "KeyD", "KeyF", "KeyJ", "KeyK", "KeyL", "Space",
];

fn recorder(capacity: usize) -> (Rc<ManualTimeSource>, KeyRecorder) {
    let time = Rc::new(ManualTimeSource::new(0.0));
    let clock = Rc::new(Clock::with_source(time.clone()));
    let kb = KeyRecorder::with_clock(
        RecorderConfig::default().with_buffer_size(capacity),
        clock,
    )
    .expect("valid config");
    (time, kb)
}

fn fill(time: &ManualTimeSource, kb: &mut KeyRecorder, presses: usize) {
    for i in 0..presses {
        let code = CODES[i % CODES.len()];
        kb.on_key_down(code);
        time.advance(0.05);
        kb.on_key_up(code);
        time.advance(0.05);
    }
}

// ===========================================================================
// Ingestion
// ===========================================================================

fn bench_ingest(c: &mut Criterion) {
    let mut group = c.benchmark_group("ingest");

    for capacity in [64usize, 10_000] {
        group.bench_with_input(
            BenchmarkId::new("down_up_pairs", capacity),
            &capacity,
            |b, &capacity| {
                let (time, mut kb) = recorder(capacity);
                b.iter(|| fill(&time, &mut kb, black_box(100)));
            },
        );
    }

    group.bench_function("repeat_suppressed", |b| {
        let (_time, mut kb) = recorder(10_000);
        kb.on_key_down("KeyA");
        b.iter(|| kb.on_key_down(black_box("KeyA")));
    });

    group.finish();
}

// ===========================================================================
// Queries
// ===========================================================================

fn bench_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("get_keys");

    for capacity in [64usize, 1_000, 10_000] {
        let (time, mut kb) = recorder(capacity);
        fill(&time, &mut kb, capacity);

        group.bench_with_input(BenchmarkId::new("peek_all", capacity), &(), |b, _| {
            let query = KeyQuery::new().clear(false);
            b.iter(|| black_box(kb.get_keys(&query)));
        });

        group.bench_with_input(BenchmarkId::new("peek_filtered", capacity), &(), |b, _| {
            let query = KeyQuery::new().keys(["f", "j"]).clear(false);
            b.iter(|| black_box(kb.get_keys(&query)));
        });
    }

    group.bench_function("frame_poll_empty", |b| {
        let (_time, mut kb) = recorder(10_000);
        let query = KeyQuery::new().keys(["f", "j"]);
        b.iter(|| black_box(kb.get_keys(&query)));
    });

    group.finish();
}

criterion_group!(benches, bench_ingest, bench_query);
criterion_main!(benches);
