//! Execution loop overhead benchmarks
//!
//! Measures the per-tick cost of driving action trees through the loop:
//! - Flat sequences of instant actions
//! - Wide parallel groups advanced every tick
//! - The same trees with tracing enabled
//!
//! Run with: cargo bench --bench tick_loop

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::time::Duration;

use volt_core::{
    traced_volt_action, volt_action, ActionTracer, ExecutionLoop, FnAction, LoopConfig, NullSink,
    Robot, Status, TelemetryPacket,
};

/// Tree sizes to test
const TREE_SIZES: &[usize] = &[8, 64, 512];

struct BenchBot;
impl Robot for BenchBot {}

fn quiet_loop() -> ExecutionLoop {
    ExecutionLoop::new()
        .with_config(LoopConfig::quiet())
        .with_sink(NullSink)
}

/// One instant per tick until the sequence is exhausted
fn bench_sequence(c: &mut Criterion) {
    let mut group = c.benchmark_group("sequence_ticks");
    group.measurement_time(Duration::from_secs(5));

    for &size in TREE_SIZES {
        group.bench_with_input(BenchmarkId::new("instants", size), &size, |b, &size| {
            let mut exec = quiet_loop();
            b.iter(|| {
                let root = volt_action(&BenchBot, |s| {
                    for _ in 0..size {
                        s.instant(|| {});
                    }
                });
                black_box(exec.run(root).unwrap());
            });
        });
    }

    group.finish();
}

/// Every child of a parallel group runs for ten ticks
fn bench_parallel(c: &mut Criterion) {
    let mut group = c.benchmark_group("parallel_ticks");
    group.measurement_time(Duration::from_secs(5));

    for &size in TREE_SIZES {
        group.bench_with_input(BenchmarkId::new("ten_tick_children", size), &size, |b, &size| {
            let mut exec = quiet_loop();
            b.iter(|| {
                let root = volt_action(&BenchBot, |s| {
                    s.parallel(|p| {
                        for i in 0..size {
                            let mut n = 0;
                            p.include(FnAction::new("child", move |packet: &mut TelemetryPacket| {
                                n += 1;
                                packet.put(format!("child/{}", i), n);
                                Ok(Status::running_if(n < 10))
                            }));
                        }
                    });
                });
                black_box(exec.run(root).unwrap());
            });
        });
    }

    group.finish();
}

/// Sequence of instants with every item traced and history published
fn bench_traced(c: &mut Criterion) {
    let mut group = c.benchmark_group("traced_ticks");
    group.measurement_time(Duration::from_secs(5));

    for &size in TREE_SIZES {
        group.bench_with_input(BenchmarkId::new("instants", size), &size, |b, &size| {
            let tracer = ActionTracer::default();
            let mut exec = ExecutionLoop::new()
                .with_sink(NullSink)
                .with_tracer(tracer.clone());
            b.iter(|| {
                let root = traced_volt_action(&BenchBot, &tracer, |s| {
                    for _ in 0..size {
                        s.instant(|| {});
                    }
                });
                black_box(exec.run(root).unwrap());
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_sequence, bench_parallel, bench_traced);
criterion_main!(benches);
